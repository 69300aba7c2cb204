//! Expressions, from parameter text to target code.

use super::context::CodeGenerationContext;
use super::diagnostics::DiagnosticKind;
use super::generator::{EventsCodeGenerator, INSTANCE_INDEX};
use super::target::VariableScope;
use crate::expression::{self, Accessor, ExpressionError, FunctionCall, Node, UnaryOp};
use crate::metadata::{ExpressionMetadata, ParameterMetadata, ValueType};

fn type_name(value_type: ValueType) -> &'static str {
    match value_type {
        ValueType::Number => "number",
        ValueType::String => "text",
        ValueType::None => "nothing",
    }
}

fn mismatch(expected: ValueType, found: ValueType) -> ExpressionError {
    ExpressionError::TypeMismatch {
        expected: type_name(expected),
        found: type_name(found),
    }
}

impl EventsCodeGenerator<'_> {
    /// Code of `text` as a `value_type` expression.
    ///
    /// Invalid expressions are reported and replaced by the default value of
    /// the type, so the instruction using them is still generated. The lists
    /// and includes they asked for before failing are dropped.
    pub fn generate_expression_code(
        &mut self,
        text: &str,
        value_type: ValueType,
        context: &mut CodeGenerationContext<'_>,
    ) -> String {
        let checkpoint = context.checkpoint();
        let includes = self.includes().len();
        let code = expression::parse(text).and_then(|node| self.node_code(&node, value_type, context));
        match code {
            Ok(code) => code,
            Err(error) => {
                context.rollback(checkpoint);
                self.truncate_includes(includes);
                self.report(
                    DiagnosticKind::InvalidExpression,
                    format!("invalid expression `{text}`: {error}"),
                );
                self.default_value(value_type)
            }
        }
    }

    /// Code of a variable parameter such as `score.best["x"]`.
    pub fn generate_variable_parameter_code(
        &mut self,
        text: &str,
        parameter_type: &str,
        context: &mut CodeGenerationContext<'_>,
    ) -> String {
        let checkpoint = context.checkpoint();
        let includes = self.includes().len();
        let code = expression::parse(text).and_then(|node| match node {
            Node::Empty => Ok(self.target.bad_variable().to_string()),
            node => self.variable_code(&node, parameter_type, context),
        });
        match code {
            Ok(code) => code,
            Err(error) => {
                context.rollback(checkpoint);
                self.truncate_includes(includes);
                self.report(
                    DiagnosticKind::InvalidExpression,
                    format!("invalid variable `{text}`: {error}"),
                );
                self.target.bad_variable().to_string()
            }
        }
    }

    fn default_value(&self, value_type: ValueType) -> String {
        match value_type {
            ValueType::String => self.target.text_literal(""),
            ValueType::Number | ValueType::None => "0".to_string(),
        }
    }

    fn node_code(
        &mut self,
        node: &Node,
        expected: ValueType,
        context: &mut CodeGenerationContext<'_>,
    ) -> Result<String, ExpressionError> {
        match node {
            Node::Number(number) => match expected {
                ValueType::String => Err(mismatch(expected, ValueType::Number)),
                _ => Ok(number.clone()),
            },
            Node::Text(text) => match expected {
                ValueType::String => Ok(self.target.text_literal(text)),
                _ => Err(mismatch(expected, ValueType::String)),
            },
            Node::Unary(op, operand) => {
                if expected == ValueType::String {
                    let symbol = match op {
                        UnaryOp::Plus => "+",
                        UnaryOp::Minus => "-",
                    };
                    return Err(ExpressionError::InvalidTextOperator(symbol));
                }
                let operand = self.node_code(operand, expected, context)?;
                Ok(match op {
                    UnaryOp::Plus => operand,
                    UnaryOp::Minus => format!("-({operand})"),
                })
            }
            Node::Binary(op, left, right) => {
                if expected == ValueType::String && op.symbol() != "+" {
                    return Err(ExpressionError::InvalidTextOperator(op.symbol()));
                }
                let left = self.node_code(left, expected, context)?;
                let right = self.node_code(right, expected, context)?;
                Ok(format!("{left} {} {right}", op.symbol()))
            }
            Node::Group(inner) => Ok(format!("({})", self.node_code(inner, expected, context)?)),
            Node::Identifier { name, .. } => Err(ExpressionError::NotAValue(name.clone())),
            Node::Call(call) => self.function_call_code(call, expected, context),
            Node::Empty => Ok(self.default_value(expected)),
        }
    }

    fn function_call_code(
        &mut self,
        call: &FunctionCall,
        expected: ValueType,
        context: &mut CodeGenerationContext<'_>,
    ) -> Result<String, ExpressionError> {
        let Some(object) = &call.object else {
            let registry = self.registry;
            let metadata = registry
                .get_expression_metadata(&call.name)
                .ok_or_else(|| ExpressionError::UnknownFunction(call.name.clone()))?;
            self.use_function(metadata, expected)?;
            let args = self.call_arguments(metadata, &call.args, context)?;
            return Ok(self
                .target
                .free_call(metadata.function_name(self.target.platform()), &args));
        };

        let containers = self.containers();
        if !containers.has_object_or_group_named(object) {
            return Err(ExpressionError::UnknownObject(object.clone()));
        }
        let registry = self.registry;
        let metadata = match &call.behavior {
            None => registry
                .get_object_expression_metadata(&containers.type_of_object(object), &call.name),
            Some(behavior) => {
                let behavior_type = containers.type_of_behavior(behavior);
                if behavior_type.is_empty() {
                    return Err(ExpressionError::UnknownBehavior {
                        object: object.clone(),
                        behavior: behavior.clone(),
                    });
                }
                registry.get_behavior_expression_metadata(&behavior_type, &call.name)
            }
        }
        .ok_or_else(|| ExpressionError::UnknownFunction(node_name(call)))?;
        self.use_function(metadata, expected)?;
        let args = self.call_arguments(metadata, &call.args, context)?;

        let target = self.target;
        let function = metadata.function_name(target.platform());
        let behavior = call.behavior.as_deref();
        let call_on = |instance: &str| -> String {
            match behavior {
                Some(behavior) => {
                    target.method_call(&target.behavior_of(instance, behavior), function, &args)
                }
                None => target.method_call(instance, function, &args),
            }
        };

        let members = containers.expand_object_name(object, context.current_object());
        if let [member] = members.as_slice() {
            if context.current_object() == Some(member.as_str()) {
                let list = self.list_name(context, member);
                return Ok(call_on(&target.instance(&list, INSTANCE_INDEX)));
            }
        }
        let lists: Vec<String> = members
            .iter()
            .map(|member| {
                context.objects_list_needed(member);
                self.list_name(context, member)
            })
            .collect();
        Ok(target.first_instance_call(&lists, &call_on, &self.default_value(expected)))
    }

    /// Checks the value a function returns and records its includes.
    fn use_function(
        &mut self,
        metadata: &ExpressionMetadata,
        expected: ValueType,
    ) -> Result<(), ExpressionError> {
        if metadata.return_type != expected {
            return Err(mismatch(expected, metadata.return_type));
        }
        self.add_includes(metadata.include_files.get(self.target.platform()));
        Ok(())
    }

    /// Codes of the arguments of a call. Code-only parameters are filled in,
    /// missing ones take their default value.
    fn call_arguments(
        &mut self,
        metadata: &ExpressionMetadata,
        args: &[Node],
        context: &mut CodeGenerationContext<'_>,
    ) -> Result<Vec<String>, ExpressionError> {
        let parameters = &metadata.parameters[metadata.user_parameters_start().min(metadata.parameters.len())..];
        let accepted = parameters.iter().filter(|p| !p.code_only).count();
        if args.len() > accepted {
            return Err(ExpressionError::TooManyArguments {
                name: metadata.name.clone(),
                max: accepted,
                got: args.len(),
            });
        }

        let mut args = args.iter();
        let mut codes = Vec::with_capacity(parameters.len());
        for parameter in parameters {
            let code = if parameter.code_only {
                self.generate_parameter_code(parameter, "", false, context)
                    .unwrap_or_default()
            } else {
                self.argument_code(parameter, args.next(), context)?
            };
            codes.push(code);
        }
        Ok(codes)
    }

    fn argument_code(
        &mut self,
        parameter: &ParameterMetadata,
        node: Option<&Node>,
        context: &mut CodeGenerationContext<'_>,
    ) -> Result<String, ExpressionError> {
        let empty = Node::Empty;
        let node = match node {
            Some(node) if !node.is_empty() => node,
            _ if !parameter.default_value.is_empty() => {
                return Ok(self
                    .generate_parameter_code(parameter, &parameter.default_value, false, context)
                    .unwrap_or_default());
            }
            _ => &empty,
        };

        match parameter.parameter_type.as_str() {
            "expression" | "number" => self.node_code(node, ValueType::Number, context),
            "string" | "layer" | "color" | "file" | "joyaxis" => {
                self.node_code(node, ValueType::String, context)
            }
            "scenevar" | "globalvar" | "objectvar" => {
                self.variable_code(node, &parameter.parameter_type, context)
            }
            _ => {
                let text = match node {
                    Node::Text(text) => text.clone(),
                    node => node.to_string(),
                };
                self.generate_parameter_code(parameter, &text, false, context)
                    .ok_or(ExpressionError::UnknownObject(text))
            }
        }
    }

    fn variable_code(
        &mut self,
        node: &Node,
        parameter_type: &str,
        context: &mut CodeGenerationContext<'_>,
    ) -> Result<String, ExpressionError> {
        let Node::Identifier { name, accessors } = node else {
            return Err(ExpressionError::NotAVariable(node.to_string()));
        };

        let instance;
        let scope = match parameter_type {
            "globalvar" => VariableScope::Global,
            "objectvar" => {
                let Some(object) = context.current_object().map(str::to_string) else {
                    return Ok(self.target.bad_variable().to_string());
                };
                instance = self
                    .target
                    .instance(&self.list_name(context, &object), INSTANCE_INDEX);
                VariableScope::Object(&instance)
            }
            _ => VariableScope::Scene,
        };
        let mut code = self.target.variable(scope, name);

        for accessor in accessors {
            let child = match accessor {
                Accessor::Child(child) => self.target.string_literal(child),
                Accessor::Index(index) => match self.node_code(index, ValueType::String, context) {
                    Ok(child) => child,
                    Err(ExpressionError::TypeMismatch { .. }) => {
                        let number = self.node_code(index, ValueType::Number, context)?;
                        self.target.number_to_string(&number)
                    }
                    Err(error) => return Err(error),
                },
            };
            code = self.target.child_variable(&code, &child);
        }
        Ok(code)
    }
}

fn node_name(call: &FunctionCall) -> String {
    match (&call.object, &call.behavior) {
        (Some(object), Some(behavior)) => format!("{object}.{behavior}::{}", call.name),
        (Some(object), None) => format!("{object}.{}", call.name),
        _ => call.name.clone(),
    }
}

#[cfg(test)]
mod tests {
    use crate::codegen::context::CodeGenerationContext;
    use crate::codegen::diagnostics::DiagnosticKind;
    use crate::codegen::generator::EventsCodeGenerator;
    use crate::codegen::target::{CppTarget, JsTarget};
    use crate::metadata::{MetadataRegistry, ValueType};
    use crate::model::{Layout, Object, ObjectGroup, Project};

    fn project() -> Project {
        let mut project = Project::new("Demo");
        let layout = project.insert_new_layout("Level", 0);
        layout.objects.push(
            Object::new("Player", "Sprite").with_behavior("Platformer", crate::metadata::builtin::PLATFORMER_BEHAVIOR),
        );
        layout.objects.push(Object::new("Enemy", "Sprite"));
        layout.object_groups.push(ObjectGroup {
            name: "Characters".into(),
            objects: vec!["Player".into(), "Enemy".into()],
        });
        project
    }

    fn layout(project: &Project) -> &Layout {
        &project.layouts[0]
    }

    #[test]
    fn test_number_expressions() {
        let project = project();
        let registry = MetadataRegistry::with_builtin_extensions();
        let mut generator = EventsCodeGenerator::new(&project, layout(&project), &registry, &JsTarget);
        let mut context = CodeGenerationContext::new();

        let test_cases = vec![
            ("1+2*3", "1 + 2 * 3"),
            ("-(4 - 1)", "-((4 - 1))"),
            ("", "0"),
            ("abs(-2)", "Math.abs(-(2))"),
            ("max(1, )", "Math.max(1, 0)"),
            ("TimeDelta()", "gdjs.evtTools.runtimeScene.getElapsedTimeInSeconds(runtimeScene)"),
            ("Variable(score)", "gdjs.evtTools.common.getVariableNumber(runtimeScene.getVariables().get(\"score\"))"),
            (
                "Variable(hiscores[\"alice\"].best)",
                "gdjs.evtTools.common.getVariableNumber(runtimeScene.getVariables().get(\"hiscores\").getChild(\"alice\").getChild(\"best\"))",
            ),
            (
                "Variable(levels[2])",
                "gdjs.evtTools.common.getVariableNumber(runtimeScene.getVariables().get(\"levels\").getChild(String(2)))",
            ),
        ];
        for (input, expected) in test_cases {
            assert_eq!(
                generator.generate_expression_code(input, ValueType::Number, &mut context),
                expected,
                "expression {input:?}"
            );
        }
        assert!(generator.diagnostics().is_empty());
    }

    #[test]
    fn test_string_expressions() {
        let project = project();
        let registry = MetadataRegistry::with_builtin_extensions();
        let mut generator = EventsCodeGenerator::new(&project, layout(&project), &registry, &CppTarget);
        let mut context = CodeGenerationContext::new();

        let test_cases = vec![
            ("\"a\" + \"b\"", "std::string(\"a\") + std::string(\"b\")"),
            ("\"say \\\"hi\\\"\"", "std::string(\"say \\\"hi\\\"\")"),
            ("ToString(1)", "ToString(1)"),
            ("", "std::string(\"\")"),
            ("SceneName()", "GetSceneName(runtimeScene)"),
        ];
        for (input, expected) in test_cases {
            assert_eq!(
                generator.generate_expression_code(input, ValueType::String, &mut context),
                expected,
                "expression {input:?}"
            );
        }
    }

    #[test]
    fn invalid_expressions_fall_back_to_defaults() {
        let project = project();
        let registry = MetadataRegistry::with_builtin_extensions();
        let mut generator = EventsCodeGenerator::new(&project, layout(&project), &registry, &JsTarget);
        let mut context = CodeGenerationContext::new();
        let deep = format!("{}1{}", "(".repeat(3000), ")".repeat(3000));

        let test_cases = vec![
            ("1 +", ValueType::Number, "0"),
            (deep.as_str(), ValueType::Number, "0"),
            ("Nope()", ValueType::Number, "0"),
            ("\"text\"", ValueType::Number, "0"),
            ("\"a\" - \"b\"", ValueType::String, "\"\""),
            ("SceneName()", ValueType::Number, "0"),
            ("abs(1, 2)", ValueType::Number, "0"),
            ("Ghost.X()", ValueType::Number, "0"),
            ("score", ValueType::Number, "0"),
        ];
        for (input, value_type, expected) in &test_cases {
            assert_eq!(
                generator.generate_expression_code(input, *value_type, &mut context),
                *expected,
                "expression {input:?}"
            );
        }
        assert_eq!(generator.diagnostics().len(), test_cases.len());
        assert!(
            generator
                .diagnostics()
                .iter()
                .all(|d| d.kind == DiagnosticKind::InvalidExpression)
        );
    }

    #[test]
    fn object_expressions_read_the_first_instance() {
        let project = project();
        let registry = MetadataRegistry::with_builtin_extensions();
        let mut generator = EventsCodeGenerator::new(&project, layout(&project), &registry, &JsTarget);
        let mut context = CodeGenerationContext::new();

        assert_eq!(
            generator.generate_expression_code("Player.X()", ValueType::Number, &mut context),
            "(GDPlayerObjects0.length === 0 ? 0 : GDPlayerObjects0[0].getX())"
        );
        assert_eq!(
            generator.generate_expression_code("Player.Platformer::JumpSpeed()", ValueType::Number, &mut context),
            "(GDPlayerObjects0.length === 0 ? 0 : GDPlayerObjects0[0].getBehavior(\"Platformer\").getJumpSpeed())"
        );
        assert_eq!(
            generator.generate_expression_code("Characters.Animation()", ValueType::Number, &mut context),
            "(GDPlayerObjects0.length === 0 ? (GDEnemyObjects0.length === 0 ? 0 : GDEnemyObjects0[0].getAnimation()) : GDPlayerObjects0[0].getAnimation())"
        );
        let mut needed = context.all_objects_to_be_declared();
        needed.sort();
        assert_eq!(needed, vec!["Enemy", "Player"]);
    }

    #[test]
    fn failed_expressions_need_nothing() {
        let project = project();
        let mut registry = MetadataRegistry::with_builtin_extensions();
        let clock = r#"{
            "name": "Clock",
            "expressions": [{
                "name": "Clock::Now",
                "returnType": "number",
                "functionName": { "cpp": "ClockNow", "js": "gdjs.clock.now" },
                "includeFiles": { "cpp": ["Clock/Clock.h"], "js": ["Extensions/Clock/clock.js"] }
            }]
        }"#;
        registry.load_extension_json(clock).unwrap();
        let mut generator = EventsCodeGenerator::new(&project, layout(&project), &registry, &JsTarget);
        let mut context = CodeGenerationContext::new();
        context.objects_list_needed("Enemy");

        let test_cases = vec![
            "Player.X() + Nope()",
            "Player.Platformer::JumpSpeed() + \"a\"",
            "Clock::Now() + Player.X() + Ghost.X()",
            "Variable(levels[Player.X() + Ghost.X()])",
        ];
        for input in &test_cases {
            assert_eq!(generator.generate_expression_code(input, ValueType::Number, &mut context), "0");
            assert_eq!(context.all_objects_to_be_declared(), vec!["Enemy"], "{input:?}");
            assert!(generator.includes().is_empty(), "{input:?}");
        }
        assert_eq!(
            generator.generate_variable_parameter_code("score[Player.X() + Nope()]", "scenevar", &mut context),
            generator.target.bad_variable()
        );
        assert_eq!(context.all_objects_to_be_declared(), vec!["Enemy"]);
        assert_eq!(generator.diagnostics().len(), test_cases.len() + 1);

        generator.generate_expression_code("Clock::Now() + Player.X()", ValueType::Number, &mut context);
        assert_eq!(generator.includes(), ["Extensions/Clock/clock.js"]);
        assert_eq!(context.all_objects_to_be_declared(), vec!["Enemy", "Player"]);
    }

    #[test]
    fn current_object_is_read_directly() {
        let project = project();
        let registry = MetadataRegistry::with_builtin_extensions();
        let mut generator = EventsCodeGenerator::new(&project, layout(&project), &registry, &JsTarget);
        let mut context = CodeGenerationContext::new();
        context.objects_list_needed("Enemy");
        context.set_current_object("Enemy");

        assert_eq!(
            generator.generate_expression_code("Characters.X() + Enemy.Y()", ValueType::Number, &mut context),
            "GDEnemyObjects0[i].getX() + GDEnemyObjects0[i].getY()"
        );
    }
}
