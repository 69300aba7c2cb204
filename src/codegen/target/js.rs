use super::{CodeTarget, VariableScope};
use crate::metadata::Platform;

/// JavaScript for the web runtime (`gdjs`).
#[derive(Debug, Clone, Copy, Default)]
pub struct JsTarget;

impl CodeTarget for JsTarget {
    fn platform(&self) -> Platform {
        Platform::Js
    }

    fn file_extension(&self) -> &'static str {
        "js"
    }

    fn number_to_string(&self, code: &str) -> String {
        format!("String({code})")
    }

    fn declare_boolean(&self, name: &str, value: bool) -> String {
        format!("let {name} = {};\n", self.boolean_literal(value))
    }

    fn declare_picked_list(&self, list: &str, object: &str) -> String {
        format!(
            "const {list} = runtimeScene.getObjects({}).slice();\n",
            self.string_literal(object)
        )
    }

    fn declare_copied_list(&self, list: &str, source: &str) -> String {
        format!("const {list} = {source}.slice();\n")
    }

    fn declare_empty_list(&self, list: &str) -> String {
        format!("const {list} = [];\n")
    }

    fn push_instance(&self, list: &str, instance: &str) -> String {
        format!("{list}.push({instance});\n")
    }

    fn list_is_empty(&self, list: &str) -> String {
        format!("{list}.length === 0")
    }

    fn object_lists_map(&self, lists: &[(String, String)]) -> String {
        let entries: Vec<String> = lists
            .iter()
            .map(|(object, list)| format!("{}: {list}", self.string_literal(object)))
            .collect();
        format!("gdjs.Hashtable.newFrom({{{}}})", entries.join(", "))
    }

    fn method_call(&self, receiver: &str, method: &str, args: &[String]) -> String {
        format!("{receiver}.{method}({})", args.join(", "))
    }

    fn behavior_of(&self, instance: &str, behavior: &str) -> String {
        format!("{instance}.getBehavior({})", self.string_literal(behavior))
    }

    fn variable(&self, scope: VariableScope<'_>, name: &str) -> String {
        let container = match scope {
            VariableScope::Scene => "runtimeScene.getVariables()".to_string(),
            VariableScope::Global => "runtimeScene.getGame().getVariables()".to_string(),
            VariableScope::Object(instance) => format!("{instance}.getVariables()"),
        };
        format!("{container}.get({})", self.string_literal(name))
    }

    fn child_variable(&self, parent: &str, child: &str) -> String {
        format!("{parent}.getChild({child})")
    }

    fn bad_variable(&self) -> &'static str {
        "gdjs.VariablesContainer.badVariable"
    }

    fn filter_list(&self, list: &str, index: &str, predicate: &str, flag: &str) -> String {
        format!(
            "{{\nlet k = 0;\nfor (let {index} = 0; {index} < {list}.length; ++{index}) {{\n\
             if ({predicate}) {{\n{flag} = true;\n{list}[k] = {list}[{index}];\n++k;\n}}\n}}\n\
             {list}.length = k;\n}}\n"
        )
    }

    fn for_each_instance(&self, list: &str, index: &str, body: &str) -> String {
        format!("for (let {index} = 0; {index} < {list}.length; ++{index}) {{\n{body}}}\n")
    }

    fn repeat_loop(&self, count: &str, index: &str, count_code: &str, body: &str) -> String {
        format!(
            "const {count} = {count_code};\n\
             for (let {index} = 0; {index} < {count}; ++{index}) {{\n{body}}}\n"
        )
    }

    fn profiler_begin(&self, section: &str) -> String {
        format!(
            "if (runtimeScene.getProfiler()) {{ runtimeScene.getProfiler().begin({}); }}\n",
            self.string_literal(section)
        )
    }

    fn profiler_end(&self, section: &str) -> String {
        format!(
            "if (runtimeScene.getProfiler()) {{ runtimeScene.getProfiler().end({}); }}\n",
            self.string_literal(section)
        )
    }

    fn complete_unit(&self, mangled_name: &str, _includes: &[String], body: &str) -> String {
        let namespace = format!("gdjs.{mangled_name}Code");
        format!(
            "{namespace} = {{}};\n\n\
             {namespace}.func = function(runtimeScene) {{\n\
             {body}\
             return;\n\
             }};\n"
        )
    }
}
