//! Language-specific pieces of the generated code.
//!
//! The generator decides what to emit; a `CodeTarget` decides how it is
//! spelled. Statements returned here end with a newline.

mod cpp;
mod js;

pub use cpp::CppTarget;
pub use js::JsTarget;

use crate::metadata::Platform;

use super::escape;

/// Where a variable parameter looks its variable up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableScope<'a> {
    Scene,
    Global,
    /// Variables of one object instance.
    Object(&'a str),
}

pub trait CodeTarget: Send + Sync {
    fn platform(&self) -> Platform;

    fn file_extension(&self) -> &'static str;

    /// Runtime scene passed to the generated function.
    fn scene_handle(&self) -> &'static str {
        "runtimeScene"
    }

    /// Quoted literal used for names, keys and plain string arguments.
    fn string_literal(&self, text: &str) -> String {
        escape::quoted(text)
    }

    /// Literal usable as an operand of string expressions.
    fn text_literal(&self, text: &str) -> String {
        self.string_literal(text)
    }

    fn boolean_literal(&self, value: bool) -> &'static str {
        if value { "true" } else { "false" }
    }

    fn number_to_string(&self, code: &str) -> String;

    // Booleans.

    fn declare_boolean(&self, name: &str, value: bool) -> String;

    fn negate(&self, code: &str) -> String {
        format!("!({code})")
    }

    // Object lists.

    /// Declares `list` filled with every live instance of `object`.
    fn declare_picked_list(&self, list: &str, object: &str) -> String;

    fn declare_copied_list(&self, list: &str, source: &str) -> String;

    fn declare_empty_list(&self, list: &str) -> String;

    fn push_instance(&self, list: &str, instance: &str) -> String;

    fn list_is_empty(&self, list: &str) -> String;

    fn instance(&self, list: &str, index: &str) -> String {
        format!("{list}[{index}]")
    }

    /// Map from object names to their lists, for functions creating or
    /// reading several lists at once.
    fn object_lists_map(&self, lists: &[(String, String)]) -> String;

    // Calls.

    fn free_call(&self, function: &str, args: &[String]) -> String {
        format!("{function}({})", args.join(", "))
    }

    fn method_call(&self, receiver: &str, method: &str, args: &[String]) -> String;

    /// The behavior named `behavior` of an instance.
    fn behavior_of(&self, instance: &str, behavior: &str) -> String;

    /// Calls a function on the first instance of the lists, or gives
    /// `default` when they are all empty.
    fn first_instance_call(
        &self,
        lists: &[String],
        call: &dyn Fn(&str) -> String,
        default: &str,
    ) -> String {
        lists.iter().rev().fold(default.to_string(), |fallback, list| {
            format!(
                "({} ? {} : {})",
                self.list_is_empty(list),
                fallback,
                call(&self.instance(list, "0"))
            )
        })
    }

    // Variables.

    fn variable(&self, scope: VariableScope<'_>, name: &str) -> String;

    fn child_variable(&self, parent: &str, child: &str) -> String;

    fn bad_variable(&self) -> &'static str;

    // Control flow.

    /// Keeps the instances of `list` for which `predicate` holds and sets
    /// `flag` when at least one is kept. `predicate` reads `list[index]`.
    fn filter_list(&self, list: &str, index: &str, predicate: &str, flag: &str) -> String;

    fn for_each_instance(&self, list: &str, index: &str, body: &str) -> String;

    fn repeat_loop(&self, count: &str, index: &str, count_code: &str, body: &str) -> String;

    /// Runs `body` until it sets `stop`.
    fn do_while(&self, stop: &str, body: &str) -> String {
        format!("do {{\n{body}}} while (!{stop});\n")
    }

    fn if_block(&self, condition: &str, body: &str) -> String {
        format!("if ({condition}) {{\n{body}}}\n")
    }

    fn if_else_block(&self, condition: &str, then_body: &str, else_body: &str) -> String {
        format!("if ({condition}) {{\n{then_body}}} else {{\n{else_body}}}\n")
    }

    fn block(&self, body: &str) -> String {
        format!("{{\n{body}}}\n")
    }

    // Profiling.

    fn profiler_begin(&self, section: &str) -> String;

    fn profiler_end(&self, section: &str) -> String;

    /// Complete source file for one layout.
    fn complete_unit(&self, mangled_name: &str, includes: &[String], body: &str) -> String;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_shapes() {
        let targets: Vec<Box<dyn CodeTarget>> = vec![Box::new(JsTarget), Box::new(CppTarget)];
        for target in targets {
            assert_eq!(target.negate("a && b"), "!(a && b)");
            assert_eq!(target.free_call("f", &["1".into(), "x".into()]), "f(1, x)");
            assert_eq!(target.free_call("g", &[]), "g()");
            assert_eq!(target.string_literal("say \"hi\""), "\"say \\\"hi\\\"\"");
            assert_eq!(target.if_block("c", "x;\n"), "if (c) {\nx;\n}\n");
            assert_eq!(target.instance("GDAObjects1", "i"), "GDAObjects1[i]");
        }
    }

    #[test]
    fn first_instance_call_chains_lists() {
        let target = JsTarget;
        let call = |instance: &str| format!("{instance}.getX()");
        assert_eq!(
            target.first_instance_call(&["GDAObjects1".into()], &call, "0"),
            "(GDAObjects1.length === 0 ? 0 : GDAObjects1[0].getX())"
        );
        assert_eq!(
            target.first_instance_call(&["GDAObjects1".into(), "GDBObjects1".into()], &call, "0"),
            "(GDAObjects1.length === 0 ? (GDBObjects1.length === 0 ? 0 : GDBObjects1[0].getX()) : GDAObjects1[0].getX())"
        );
    }
}
