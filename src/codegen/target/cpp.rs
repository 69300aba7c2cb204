use super::{CodeTarget, VariableScope};
use crate::metadata::Platform;

/// Headers every generated unit needs.
const BASE_INCLUDES: [&str; 5] = [
    "<map>",
    "<vector>",
    "<string>",
    "\"GDCpp/Runtime/RuntimeScene.h\"",
    "\"GDCpp/Runtime/RuntimeObject.h\"",
];

/// Native C++ for the desktop runtime.
#[derive(Debug, Clone, Copy, Default)]
pub struct CppTarget;

impl CodeTarget for CppTarget {
    fn platform(&self) -> Platform {
        Platform::Cpp
    }

    fn file_extension(&self) -> &'static str {
        "cpp"
    }

    /// `"a" + "b"` does not concatenate in C++.
    fn text_literal(&self, text: &str) -> String {
        format!("std::string({})", self.string_literal(text))
    }

    fn number_to_string(&self, code: &str) -> String {
        format!("ToString({code})")
    }

    fn declare_boolean(&self, name: &str, value: bool) -> String {
        format!("bool {name} = {};\n", self.boolean_literal(value))
    }

    fn declare_picked_list(&self, list: &str, object: &str) -> String {
        format!(
            "std::vector<RuntimeObject*> {list} = runtimeScene.objectsInstances.GetObjectsRawPointers({});\n",
            self.string_literal(object)
        )
    }

    fn declare_copied_list(&self, list: &str, source: &str) -> String {
        format!("std::vector<RuntimeObject*> {list} = {source};\n")
    }

    fn declare_empty_list(&self, list: &str) -> String {
        format!("std::vector<RuntimeObject*> {list};\n")
    }

    fn push_instance(&self, list: &str, instance: &str) -> String {
        format!("{list}.push_back({instance});\n")
    }

    fn list_is_empty(&self, list: &str) -> String {
        format!("{list}.empty()")
    }

    fn object_lists_map(&self, lists: &[(String, String)]) -> String {
        let entries: Vec<String> = lists
            .iter()
            .map(|(object, list)| format!("{{{}, &{list}}}", self.string_literal(object)))
            .collect();
        format!(
            "std::map<std::string, std::vector<RuntimeObject*>*>{{{}}}",
            entries.join(", ")
        )
    }

    fn method_call(&self, receiver: &str, method: &str, args: &[String]) -> String {
        format!("{receiver}->{method}({})", args.join(", "))
    }

    fn behavior_of(&self, instance: &str, behavior: &str) -> String {
        format!("{instance}->GetBehaviorRawPointer({})", self.string_literal(behavior))
    }

    fn variable(&self, scope: VariableScope<'_>, name: &str) -> String {
        let container = match scope {
            VariableScope::Scene => "runtimeScene.GetVariables()".to_string(),
            VariableScope::Global => "runtimeScene.game->GetVariables()".to_string(),
            VariableScope::Object(instance) => format!("{instance}->GetVariables()"),
        };
        format!("{container}.Get({})", self.string_literal(name))
    }

    fn child_variable(&self, parent: &str, child: &str) -> String {
        format!("{parent}.GetChild({child})")
    }

    fn bad_variable(&self) -> &'static str {
        "gd::Variable::badVariable"
    }

    fn filter_list(&self, list: &str, index: &str, predicate: &str, flag: &str) -> String {
        format!(
            "{{\nstd::size_t k = 0;\nfor (std::size_t {index} = 0; {index} < {list}.size(); ++{index}) {{\n\
             if ({predicate}) {{\n{flag} = true;\n{list}[k] = {list}[{index}];\n++k;\n}}\n}}\n\
             {list}.resize(k);\n}}\n"
        )
    }

    fn for_each_instance(&self, list: &str, index: &str, body: &str) -> String {
        format!(
            "for (std::size_t {index} = 0; {index} < {list}.size(); ++{index}) {{\n{body}}}\n"
        )
    }

    fn repeat_loop(&self, count: &str, index: &str, count_code: &str, body: &str) -> String {
        format!(
            "const int {count} = {count_code};\n\
             for (int {index} = 0; {index} < {count}; ++{index}) {{\n{body}}}\n"
        )
    }

    fn profiler_begin(&self, section: &str) -> String {
        format!(
            "if (runtimeScene.GetProfiler()) runtimeScene.GetProfiler()->Begin({});\n",
            self.string_literal(section)
        )
    }

    fn profiler_end(&self, section: &str) -> String {
        format!(
            "if (runtimeScene.GetProfiler()) runtimeScene.GetProfiler()->End({});\n",
            self.string_literal(section)
        )
    }

    fn complete_unit(&self, mangled_name: &str, includes: &[String], body: &str) -> String {
        let mut unit = String::new();
        for include in BASE_INCLUDES {
            unit.push_str(&format!("#include {include}\n"));
        }
        for include in includes {
            unit.push_str(&format!("#include \"{include}\"\n"));
        }
        unit.push_str(&format!(
            "\nextern \"C\" int GDSceneEvents{mangled_name}(RuntimeScene & runtimeScene)\n{{\n{body}return 0;\n}}\n"
        ));
        unit
    }
}
