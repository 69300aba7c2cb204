//! Instructions and their parameters, turned into target code.
//!
//! `EventsCodeGenerator` is created for one layout. It reads the project and
//! the metadata registry, never writes them, and collects the includes the
//! generated code needs plus the diagnostics of everything it had to skip.

use super::context::CodeGenerationContext;
use super::diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
use super::mangler::object_list_name;
use super::target::CodeTarget;
use crate::metadata::{
    AccessType, InstructionMetadata, MetadataRegistry, ParameterMetadata, Scope, ValueType,
    is_object_type,
};
use crate::model::{Instruction, Layout, ObjectsContainers, Project};

/// Loop variable indexing the instance being filtered or acted upon.
pub const INSTANCE_INDEX: &str = "i";

/// Code of a conditions list and the flags it sets.
#[derive(Debug, Clone, Default)]
pub struct ConditionsCode {
    pub code: String,
    pub flags: Vec<String>,
}

impl ConditionsCode {
    /// Test that holds when every condition was true, `None` without conditions.
    pub fn all_true(&self) -> Option<String> {
        (!self.flags.is_empty()).then(|| self.flags.join(" && "))
    }
}

/// What an instruction is called on.
enum Receiver {
    Free,
    Object,
    Behavior(String),
}

pub struct EventsCodeGenerator<'a> {
    pub(super) project: &'a Project,
    pub(super) layout: &'a Layout,
    pub(super) registry: &'a MetadataRegistry,
    pub(super) target: &'a dyn CodeTarget,
    includes: Vec<String>,
    diagnostics: Diagnostics,
}

impl<'a> EventsCodeGenerator<'a> {
    pub fn new(
        project: &'a Project,
        layout: &'a Layout,
        registry: &'a MetadataRegistry,
        target: &'a dyn CodeTarget,
    ) -> Self {
        let mut diagnostics = Diagnostics::new();
        diagnostics.set_layout(Some(&layout.name));
        Self {
            project,
            layout,
            registry,
            target,
            includes: Vec::new(),
            diagnostics,
        }
    }

    pub fn containers(&self) -> ObjectsContainers<'a> {
        self.project.containers(self.layout)
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        self.diagnostics.entries()
    }

    /// Files required by the instructions generated so far, in first-use order.
    pub fn includes(&self) -> &[String] {
        &self.includes
    }

    pub fn into_parts(self) -> (Vec<String>, Vec<Diagnostic>) {
        (self.includes, self.diagnostics.into_entries())
    }

    pub(super) fn report(&mut self, kind: DiagnosticKind, message: impl Into<String>) {
        self.diagnostics.report(kind, message);
    }

    pub(super) fn diagnostics_mut(&mut self) -> &mut Diagnostics {
        &mut self.diagnostics
    }

    /// Forgets the includes added since `len` includes were known.
    pub(super) fn truncate_includes(&mut self, len: usize) {
        self.includes.truncate(len);
    }

    pub(super) fn add_includes(&mut self, files: &[String]) {
        for file in files {
            if !self.includes.contains(file) {
                self.includes.push(file.clone());
            }
        }
    }

    /// Variable holding the list of `object` as seen from `context`.
    pub fn list_name(&self, context: &CodeGenerationContext<'_>, object: &str) -> String {
        let level = context
            .declaration_level(object)
            .unwrap_or_else(|| context.scope_level());
        object_list_name(object, level)
    }

    /// Declarations of every list `context` must create, at the top of its block.
    pub fn generate_objects_declaration_code(&self, context: &CodeGenerationContext<'_>) -> String {
        self.generate_objects_declaration_code_except(context, &[])
    }

    pub(super) fn generate_objects_declaration_code_except(
        &self,
        context: &CodeGenerationContext<'_>,
        excluded: &[String],
    ) -> String {
        let level = context.scope_level();
        let from_parent = |name: &str| {
            context
                .parent()
                .and_then(|parent| parent.declaration_level(name))
                .map(|parent_level| object_list_name(name, parent_level))
        };
        let is_excluded = |name: &str| excluded.iter().any(|excluded| excluded == name);

        let mut code = String::new();
        for name in context.objects_lists_to_be_declared() {
            if is_excluded(name) {
                continue;
            }
            let list = object_list_name(name, level);
            code.push_str(&match from_parent(name) {
                Some(source) => self.target.declare_copied_list(&list, &source),
                None => self.target.declare_picked_list(&list, name),
            });
        }
        for name in context.empty_objects_lists_to_be_declared() {
            if is_excluded(name) {
                continue;
            }
            let list = object_list_name(name, level);
            code.push_str(&match from_parent(name) {
                Some(source) => self.target.declare_copied_list(&list, &source),
                None => self.target.declare_empty_list(&list),
            });
        }
        code
    }

    pub(super) fn first_unknown_condition<'i>(&self, conditions: &'i [Instruction]) -> Option<&'i str> {
        conditions
            .iter()
            .map(Instruction::instruction_type)
            .find(|name| self.registry.get_condition_metadata(name).is_none())
    }

    /// Evaluates `conditions` in order, each one only when all the previous
    /// ones were true. Flags are named after `prefix` and the scope level.
    pub fn generate_conditions_list_code(
        &mut self,
        conditions: &[Instruction],
        context: &mut CodeGenerationContext<'_>,
        prefix: &str,
    ) -> ConditionsCode {
        let flags: Vec<String> = (0..conditions.len())
            .map(|index| format!("{prefix}{index}IsTrue_{}", context.scope_level()))
            .collect();

        let mut code: String = flags
            .iter()
            .map(|flag| self.target.declare_boolean(flag, false))
            .collect();
        for (index, condition) in conditions.iter().enumerate() {
            let condition_code = self.generate_condition_code(condition, &flags[index], context);
            if index == 0 {
                code.push_str(&self.target.block(&condition_code));
            } else {
                code.push_str(&self.target.if_block(&flags[..index].join(" && "), &condition_code));
            }
        }
        ConditionsCode { code, flags }
    }

    /// Sets `flag` to the truth value of `condition`. Empty when the
    /// condition cannot be generated, leaving the flag false.
    pub fn generate_condition_code(
        &mut self,
        condition: &Instruction,
        flag: &str,
        context: &mut CodeGenerationContext<'_>,
    ) -> String {
        let registry = self.registry;
        let Some(metadata) = registry.get_condition_metadata(condition.instruction_type()) else {
            self.report(
                DiagnosticKind::UnknownCondition,
                format!("unknown condition `{}`", condition.instruction_type()),
            );
            return String::new();
        };
        let mut condition = condition.clone();
        condition.ensure_parameters(metadata.parameters.len());
        self.add_includes(metadata.include_files(self.target.platform()));

        let Some(receiver) = self.receiver_of(&condition, metadata) else {
            return String::new();
        };
        let negate = condition.is_inverted() && !metadata.takes_inversion_parameter();

        if let Receiver::Free = receiver {
            let Some(predicate) = self.condition_call(&condition, metadata, None, context) else {
                return String::new();
            };
            let predicate = if negate {
                self.target.negate(&predicate)
            } else {
                predicate
            };
            return format!("{flag} = {predicate};\n");
        }

        let object = condition.parameter_text(0).to_string();
        let members = self
            .containers()
            .expand_object_name(&object, context.current_object());
        let mut code = String::new();
        for member in &members {
            context.objects_list_needed(member);
            let list = self.list_name(context, member);
            let receiver_code = self.receiver_code(&list, &receiver);

            let previous = context.current_object().map(str::to_string);
            context.set_current_object(member);
            let predicate = self.condition_call(&condition, metadata, Some(&receiver_code), context);
            restore_current_object(context, previous);

            let Some(predicate) = predicate else {
                continue;
            };
            let predicate = if negate {
                self.target.negate(&predicate)
            } else {
                predicate
            };
            code.push_str(&self.target.filter_list(&list, INSTANCE_INDEX, &predicate, flag));
        }
        code
    }

    /// Each action in its own block. Unknown actions are skipped.
    pub fn generate_actions_list_code(
        &mut self,
        actions: &[Instruction],
        context: &mut CodeGenerationContext<'_>,
    ) -> String {
        let mut code = String::new();
        for action in actions {
            let action_code = self.generate_action_code(action, context);
            if !action_code.is_empty() {
                code.push_str(&self.target.block(&action_code));
            }
        }
        code
    }

    pub fn generate_action_code(
        &mut self,
        action: &Instruction,
        context: &mut CodeGenerationContext<'_>,
    ) -> String {
        let registry = self.registry;
        let Some(metadata) = registry.get_action_metadata(action.instruction_type()) else {
            self.report(
                DiagnosticKind::UnknownAction,
                format!("unknown action `{}`, skipped", action.instruction_type()),
            );
            return String::new();
        };
        let mut action = action.clone();
        action.ensure_parameters(metadata.parameters.len());
        self.add_includes(metadata.include_files(self.target.platform()));

        let Some(receiver) = self.receiver_of(&action, metadata) else {
            return String::new();
        };
        if let Receiver::Free = receiver {
            return self
                .action_statement(&action, metadata, None, context)
                .unwrap_or_default();
        }

        let object = action.parameter_text(0).to_string();
        let members = self
            .containers()
            .expand_object_name(&object, context.current_object());
        let mut code = String::new();
        for member in &members {
            context.objects_list_needed(member);
            let list = self.list_name(context, member);
            let receiver_code = self.receiver_code(&list, &receiver);

            let previous = context.current_object().map(str::to_string);
            context.set_current_object(member);
            let statement = self.action_statement(&action, metadata, Some(&receiver_code), context);
            restore_current_object(context, previous);

            if let Some(statement) = statement {
                code.push_str(&self.target.for_each_instance(&list, INSTANCE_INDEX, &statement));
            }
        }
        code
    }

    /// Checks the object (and behavior) an instruction applies to.
    fn receiver_of(
        &mut self,
        instruction: &Instruction,
        metadata: &InstructionMetadata,
    ) -> Option<Receiver> {
        match &metadata.scope {
            Scope::Free => Some(Receiver::Free),
            Scope::Object { object_type } => {
                self.check_object(instruction, object_type)?;
                Some(Receiver::Object)
            }
            Scope::Behavior { behavior_type } => {
                self.check_object(instruction, "")?;
                let behavior = instruction.parameter_text(1);
                let actual = self.containers().type_of_behavior(behavior);
                if actual != *behavior_type {
                    self.report(
                        DiagnosticKind::ObjectTypeMismatch,
                        format!(
                            "`{}` expects a `{behavior_type}` behavior, `{behavior}` is not one",
                            instruction.instruction_type()
                        ),
                    );
                    return None;
                }
                Some(Receiver::Behavior(behavior.to_string()))
            }
        }
    }

    fn check_object(&mut self, instruction: &Instruction, required_type: &str) -> Option<()> {
        let object = instruction.parameter_text(0);
        let containers = self.containers();
        if !containers.has_object_or_group_named(object) {
            self.report(
                DiagnosticKind::UnknownObject,
                format!(
                    "`{}` refers to unknown object `{object}`, skipped",
                    instruction.instruction_type()
                ),
            );
            return None;
        }
        if !required_type.is_empty() && containers.type_of_object(object) != required_type {
            self.report(
                DiagnosticKind::ObjectTypeMismatch,
                format!(
                    "`{}` needs a `{required_type}` object, `{object}` is not one",
                    instruction.instruction_type()
                ),
            );
            return None;
        }
        Some(())
    }

    fn receiver_code(&self, list: &str, receiver: &Receiver) -> String {
        let instance = self.target.instance(list, INSTANCE_INDEX);
        match receiver {
            Receiver::Behavior(behavior) => self.target.behavior_of(&instance, behavior),
            Receiver::Free | Receiver::Object => instance,
        }
    }

    fn call_code(&self, function: &str, receiver: Option<&str>, args: &[String]) -> String {
        match receiver {
            Some(receiver) => self.target.method_call(receiver, function, args),
            // Functionless comparisons read their operand directly.
            None if function.is_empty() => args.join(", "),
            None => self.target.free_call(function, args),
        }
    }

    /// The predicate of a condition, before inversion.
    fn condition_call(
        &mut self,
        condition: &Instruction,
        metadata: &InstructionMetadata,
        receiver: Option<&str>,
        context: &mut CodeGenerationContext<'_>,
    ) -> Option<String> {
        let first = receiver_parameters(metadata);
        let relational = if metadata.value_type.is_value() {
            metadata.parameter_index_of("relationalOperator", first)
        } else {
            None
        };
        let skipped: Vec<usize> = relational.map(|r| vec![r, r + 1]).unwrap_or_default();

        let args = self.arguments(condition, metadata, first, &skipped, context)?;
        let call = self.call_code(
            metadata.function_name(self.target.platform()),
            receiver,
            &args,
        );
        let Some(relational) = relational else {
            return Some(call);
        };

        let operator = self.relational_operator(condition.parameter_text(relational));
        let rhs = self.operand_code(condition, metadata, relational + 1, context)?;
        Some(format!("{call} {operator} ({rhs})"))
    }

    /// The statement of an action, operator forms included.
    fn action_statement(
        &mut self,
        action: &Instruction,
        metadata: &InstructionMetadata,
        receiver: Option<&str>,
        context: &mut CodeGenerationContext<'_>,
    ) -> Option<String> {
        let platform = self.target.platform();
        let first = receiver_parameters(metadata);
        let operator_index = if metadata.value_type.is_value() {
            metadata.parameter_index_of("operator", first)
        } else {
            None
        };
        let skipped: Vec<usize> = operator_index.map(|o| vec![o, o + 1]).unwrap_or_default();

        let mut args = self.arguments(action, metadata, first, &skipped, context)?;
        let function = metadata.function_name(platform);
        let Some(operator_index) = operator_index else {
            return Some(format!("{};\n", self.call_code(function, receiver, &args)));
        };

        let operator =
            self.assignment_operator(action.parameter_text(operator_index), metadata.value_type);
        let rhs = self.operand_code(action, metadata, operator_index + 1, context)?;
        let statement = match metadata.access_type {
            AccessType::MutatorAndOrAccessor => {
                let value = if operator == "=" {
                    rhs
                } else {
                    let getter = self.call_code(metadata.getter_name(platform), receiver, &args);
                    format!("{getter} {operator} ({rhs})")
                };
                args.push(value);
                format!("{};\n", self.call_code(function, receiver, &args))
            }
            AccessType::Reference => {
                let call = self.call_code(function, receiver, &args);
                if operator == "=" {
                    format!("{call} = ({rhs});\n")
                } else {
                    format!("{call} {operator}= ({rhs});\n")
                }
            }
        };
        Some(statement)
    }

    /// Codes of the parameters from `first` on, except `skipped` ones.
    /// `None` when one of them names an unknown object.
    fn arguments(
        &mut self,
        instruction: &Instruction,
        metadata: &InstructionMetadata,
        first: usize,
        skipped: &[usize],
        context: &mut CodeGenerationContext<'_>,
    ) -> Option<Vec<String>> {
        let mut args = Vec::with_capacity(metadata.parameters.len());
        for (index, parameter) in metadata.parameters.iter().enumerate().skip(first) {
            if skipped.contains(&index) {
                continue;
            }
            args.push(self.generate_parameter_code(
                parameter,
                instruction.parameter_text(index),
                instruction.is_inverted(),
                context,
            )?);
        }
        Some(args)
    }

    fn operand_code(
        &mut self,
        instruction: &Instruction,
        metadata: &InstructionMetadata,
        index: usize,
        context: &mut CodeGenerationContext<'_>,
    ) -> Option<String> {
        let expression = ParameterMetadata::new("expression");
        let parameter = metadata.parameters.get(index).unwrap_or(&expression);
        self.generate_parameter_code(
            parameter,
            instruction.parameter_text(index),
            instruction.is_inverted(),
            context,
        )
    }

    /// Code of one parameter according to its declared type.
    ///
    /// `None` only for object parameters naming no known object.
    pub fn generate_parameter_code(
        &mut self,
        parameter: &ParameterMetadata,
        text: &str,
        inverted: bool,
        context: &mut CodeGenerationContext<'_>,
    ) -> Option<String> {
        let text = if text.trim().is_empty() && !parameter.default_value.is_empty() {
            parameter.default_value.as_str()
        } else {
            text
        };

        let code = match parameter.parameter_type.as_str() {
            "expression" | "number" => {
                self.generate_expression_code(text, ValueType::Number, context)
            }
            "string" | "layer" | "color" | "file" | "joyaxis" => {
                self.generate_expression_code(text, ValueType::String, context)
            }
            "scenevar" | "globalvar" | "objectvar" => {
                self.generate_variable_parameter_code(text, &parameter.parameter_type, context)
            }
            object_type if is_object_type(object_type) => {
                return self.object_lists_code(text.trim(), object_type, context);
            }
            "behavior" | "key" | "mouse" | "police" | "soundfile" | "musicfile" | "imageFile" => {
                self.target.string_literal(text)
            }
            "relationalOperator" => {
                let operator = self.relational_operator(text);
                self.target.string_literal(operator)
            }
            "operator" => {
                let operator = self.assignment_operator(text, ValueType::Number);
                self.target.string_literal(operator)
            }
            "yesorno" => self
                .target
                .boolean_literal(matches!(text.trim(), "yes" | "oui"))
                .to_string(),
            "trueorfalse" => self
                .target
                .boolean_literal(matches!(text.trim(), "True" | "Vrai"))
                .to_string(),
            "inlineCode" => parameter.extra_info.clone(),
            "currentScene" => self.target.scene_handle().to_string(),
            "conditionInverted" => self.target.boolean_literal(inverted).to_string(),
            unknown => {
                self.report(
                    DiagnosticKind::UnknownParameterType,
                    format!("unknown parameter type `{unknown}`, passed as text"),
                );
                self.target.string_literal(text)
            }
        };
        Some(code)
    }

    /// Map of the lists behind an object or group parameter.
    pub(super) fn object_lists_code(
        &mut self,
        name: &str,
        parameter_type: &str,
        context: &mut CodeGenerationContext<'_>,
    ) -> Option<String> {
        let containers = self.containers();
        if !containers.has_object_or_group_named(name) {
            self.report(
                DiagnosticKind::UnknownObject,
                format!("unknown object `{name}`, instruction skipped"),
            );
            return None;
        }
        let lists: Vec<(String, String)> = containers
            .expand_object_name(name, context.current_object())
            .into_iter()
            .map(|member| {
                if parameter_type == "objectListOrEmptyIfJustDeclared" {
                    context.empty_objects_list_needed(&member);
                } else {
                    context.objects_list_needed(&member);
                }
                let list = self.list_name(context, &member);
                (member, list)
            })
            .collect();
        Some(self.target.object_lists_map(&lists))
    }

    fn relational_operator(&mut self, text: &str) -> &'static str {
        match text.trim() {
            "=" | "==" => "==",
            "<" => "<",
            ">" => ">",
            "<=" => "<=",
            ">=" => ">=",
            "!=" => "!=",
            other => {
                self.report(
                    DiagnosticKind::InvalidOperator,
                    format!("`{other}` is not a comparison, using `=`"),
                );
                "=="
            }
        }
    }

    fn assignment_operator(&mut self, text: &str, value_type: ValueType) -> &'static str {
        match (text.trim(), value_type) {
            ("=", _) => "=",
            ("+", _) => "+",
            ("-", ValueType::Number) => "-",
            ("*", ValueType::Number) => "*",
            ("/", ValueType::Number) => "/",
            (other, _) => {
                self.report(
                    DiagnosticKind::InvalidOperator,
                    format!("`{other}` cannot modify this value, using `=`"),
                );
                "="
            }
        }
    }
}

/// Parameters an object or behavior instruction takes from its receiver.
fn receiver_parameters(metadata: &InstructionMetadata) -> usize {
    match metadata.scope {
        Scope::Free => 0,
        Scope::Object { .. } => 1,
        Scope::Behavior { .. } => 2,
    }
}

fn restore_current_object(context: &mut CodeGenerationContext<'_>, previous: Option<String>) {
    match previous {
        Some(object) => context.set_current_object(&object),
        None => context.set_no_current_object(),
    }
}
