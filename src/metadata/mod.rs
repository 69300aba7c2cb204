//! Instruction and expression metadata: how each type name becomes code.
//!
//! The registry is filled once (builtin declarations plus optional JSON
//! extension files) and is only read while generating, so one registry can
//! serve any number of generators at the same time.

pub mod builtin;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("invalid extension declaration: {0}")]
    Json(#[from] serde_json::Error),
    #[error("extension `{extension}` declares `{name}` twice")]
    Duplicate { extension: String, name: String },
}

/// Code generation platforms.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Cpp,
    #[default]
    Js,
}

/// A value that differs between platforms (function names, includes).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerPlatform<T> {
    #[serde(default)]
    pub cpp: T,
    #[serde(default)]
    pub js: T,
}

impl<T> PerPlatform<T> {
    pub fn new(cpp: T, js: T) -> Self {
        Self { cpp, js }
    }

    pub fn get(&self, platform: Platform) -> &T {
        match platform {
            Platform::Cpp => &self.cpp,
            Platform::Js => &self.js,
        }
    }
}

impl PerPlatform<String> {
    pub fn names(cpp: &str, js: &str) -> Self {
        Self::new(cpp.to_string(), js.to_string())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterMetadata {
    #[serde(rename = "type")]
    pub parameter_type: String,
    /// Object type for `object` parameters, inserted code for `inlineCode`.
    #[serde(default)]
    pub extra_info: String,
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub default_value: String,
    /// Filled by the generator, never written by the user.
    #[serde(default)]
    pub code_only: bool,
}

impl ParameterMetadata {
    pub fn new(parameter_type: &str) -> Self {
        Self {
            parameter_type: parameter_type.to_string(),
            ..Self::default()
        }
    }

    pub fn is_object(&self) -> bool {
        is_object_type(&self.parameter_type)
    }

    pub fn is_behavior(&self) -> bool {
        self.parameter_type == "behavior"
    }
}

pub fn is_object_type(parameter_type: &str) -> bool {
    matches!(parameter_type, "object" | "objectListOrEmptyIfJustDeclared")
}

/// Which value an instruction compares or modifies, if any.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    #[default]
    None,
    Number,
    String,
}

impl ValueType {
    pub fn is_value(self) -> bool {
        self != ValueType::None
    }
}

/// How a number/string action writes its value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AccessType {
    /// `call(args) op= (rhs)`.
    #[default]
    Reference,
    /// `setter(args, getter(args) op (rhs))`.
    MutatorAndOrAccessor,
}

/// What an instruction or expression applies to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Scope {
    #[default]
    Free,
    /// Empty `object_type` means any object.
    Object {
        #[serde(default, rename = "objectType")]
        object_type: String,
    },
    Behavior {
        #[serde(rename = "behaviorType")]
        behavior_type: String,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstructionMetadata {
    pub name: String,
    #[serde(default)]
    pub scope: Scope,
    #[serde(default)]
    pub parameters: Vec<ParameterMetadata>,
    pub function_name: PerPlatform<String>,
    /// Getter paired with a mutator, for `MutatorAndOrAccessor` actions.
    #[serde(default)]
    pub getter_name: Option<PerPlatform<String>>,
    #[serde(default)]
    pub include_files: PerPlatform<Vec<String>>,
    #[serde(default)]
    pub value_type: ValueType,
    #[serde(default)]
    pub access_type: AccessType,
}

impl InstructionMetadata {
    pub fn is_object_instruction(&self) -> bool {
        matches!(self.scope, Scope::Object { .. })
    }

    pub fn is_behavior_instruction(&self) -> bool {
        matches!(self.scope, Scope::Behavior { .. })
    }

    pub fn function_name(&self, platform: Platform) -> &str {
        self.function_name.get(platform)
    }

    pub fn getter_name(&self, platform: Platform) -> &str {
        self.getter_name
            .as_ref()
            .map(|names| names.get(platform).as_str())
            .unwrap_or("")
    }

    pub fn include_files(&self, platform: Platform) -> &[String] {
        self.include_files.get(platform)
    }

    /// The condition handles inversion itself through a parameter.
    pub fn takes_inversion_parameter(&self) -> bool {
        self.parameters
            .iter()
            .any(|parameter| parameter.parameter_type == "conditionInverted")
    }

    pub fn parameter_index_of(&self, parameter_type: &str, start: usize) -> Option<usize> {
        self.parameters
            .iter()
            .enumerate()
            .skip(start)
            .find(|(_, parameter)| parameter.parameter_type == parameter_type)
            .map(|(index, _)| index)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpressionMetadata {
    pub name: String,
    pub return_type: ValueType,
    #[serde(default)]
    pub scope: Scope,
    #[serde(default)]
    pub parameters: Vec<ParameterMetadata>,
    pub function_name: PerPlatform<String>,
    #[serde(default)]
    pub include_files: PerPlatform<Vec<String>>,
}

impl ExpressionMetadata {
    pub fn function_name(&self, platform: Platform) -> &str {
        self.function_name.get(platform)
    }

    /// Parameters the user writes between the parentheses.
    ///
    /// Object and behavior expressions take their object (and behavior)
    /// from the call syntax, not from the argument list.
    pub fn user_parameters_start(&self) -> usize {
        match self.scope {
            Scope::Free => 0,
            Scope::Object { .. } => 1,
            Scope::Behavior { .. } => 2,
        }
    }
}

/// Declarations grouped the way an extension file lists them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtensionDeclaration {
    pub name: String,
    #[serde(default)]
    pub conditions: Vec<InstructionMetadata>,
    #[serde(default)]
    pub actions: Vec<InstructionMetadata>,
    #[serde(default)]
    pub expressions: Vec<ExpressionMetadata>,
}

type ExpressionKey = (String, String);

#[derive(Debug, Default, Clone)]
pub struct MetadataRegistry {
    conditions: HashMap<String, InstructionMetadata>,
    actions: HashMap<String, InstructionMetadata>,
    free_expressions: HashMap<String, ExpressionMetadata>,
    /// Keyed by (object type, name); "" is the base object type.
    object_expressions: HashMap<ExpressionKey, ExpressionMetadata>,
    behavior_expressions: HashMap<ExpressionKey, ExpressionMetadata>,
}

impl MetadataRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every builtin extension declared.
    pub fn with_builtin_extensions() -> Self {
        let mut registry = Self::new();
        for extension in builtin::extensions() {
            // Builtin declarations are unique by construction.
            registry.extend(extension).ok();
        }
        registry
    }

    pub fn get_condition_metadata(&self, instruction_type: &str) -> Option<&InstructionMetadata> {
        self.conditions.get(instruction_type)
    }

    pub fn get_action_metadata(&self, instruction_type: &str) -> Option<&InstructionMetadata> {
        self.actions.get(instruction_type)
    }

    pub fn get_expression_metadata(&self, name: &str) -> Option<&ExpressionMetadata> {
        self.free_expressions.get(name)
    }

    /// Looks up the object type first, then the base object.
    pub fn get_object_expression_metadata(
        &self,
        object_type: &str,
        name: &str,
    ) -> Option<&ExpressionMetadata> {
        self.object_expressions
            .get(&(object_type.to_string(), name.to_string()))
            .or_else(|| self.object_expressions.get(&(String::new(), name.to_string())))
    }

    pub fn get_behavior_expression_metadata(
        &self,
        behavior_type: &str,
        name: &str,
    ) -> Option<&ExpressionMetadata> {
        self.behavior_expressions
            .get(&(behavior_type.to_string(), name.to_string()))
    }

    pub fn conditions_count(&self) -> usize {
        self.conditions.len()
    }

    pub fn actions_count(&self) -> usize {
        self.actions.len()
    }

    /// Adds every declaration of `extension`.
    pub fn extend(&mut self, extension: ExtensionDeclaration) -> Result<(), MetadataError> {
        let duplicate = |name: &str| MetadataError::Duplicate {
            extension: extension.name.clone(),
            name: name.to_string(),
        };

        for condition in &extension.conditions {
            if self.conditions.contains_key(&condition.name) {
                return Err(duplicate(&condition.name));
            }
        }
        for action in &extension.actions {
            if self.actions.contains_key(&action.name) {
                return Err(duplicate(&action.name));
            }
        }

        for condition in &extension.conditions {
            self.conditions.insert(condition.name.clone(), condition.clone());
        }
        for action in &extension.actions {
            self.actions.insert(action.name.clone(), action.clone());
        }
        for expression in &extension.expressions {
            let name = expression.name.clone();
            match &expression.scope {
                Scope::Free => {
                    self.free_expressions.insert(name, expression.clone());
                }
                Scope::Object { object_type } => {
                    self.object_expressions
                        .insert((object_type.clone(), name), expression.clone());
                }
                Scope::Behavior { behavior_type } => {
                    self.behavior_expressions
                        .insert((behavior_type.clone(), name), expression.clone());
                }
            }
        }
        Ok(())
    }

    /// Adds the declarations of a JSON extension file.
    pub fn load_extension_json(&mut self, json: &str) -> Result<String, MetadataError> {
        let extension: ExtensionDeclaration = serde_json::from_str(json)?;
        let name = extension.name.clone();
        self.extend(extension)?;
        Ok(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXTENSION: &str = r#"{
        "name": "Dialogs",
        "actions": [{
            "name": "Dialogs::Open",
            "parameters": [{"type": "currentScene", "codeOnly": true}, {"type": "string"}],
            "functionName": {"cpp": "OpenDialog", "js": "gdjs.dialogs.open"},
            "includeFiles": {"cpp": ["Dialogs/Dialogs.h"], "js": ["Extensions/Dialogs/dialogs.js"]}
        }],
        "expressions": [{
            "name": "Dialogs::Count",
            "returnType": "number",
            "functionName": {"cpp": "DialogsCount", "js": "gdjs.dialogs.count"}
        }, {
            "name": "Line",
            "returnType": "string",
            "scope": {"kind": "object", "objectType": "Dialogs::Box"},
            "parameters": [{"type": "object"}],
            "functionName": {"cpp": "GetLine", "js": "getLine"}
        }]
    }"#;

    #[test]
    fn builtin_registry_knows_common_instructions() {
        let registry = MetadataRegistry::with_builtin_extensions();
        assert!(registry.get_condition_metadata("BuiltinKeyboard::KeyPressed").is_some());
        assert!(registry.get_action_metadata("ModVarScene").is_some());
        assert!(registry.get_expression_metadata("Random").is_some());
    }

    #[test]
    fn unknown_names_are_absent() {
        let registry = MetadataRegistry::with_builtin_extensions();
        assert!(registry.get_condition_metadata("Nope::Nothing").is_none());
        assert!(registry.get_action_metadata("").is_none());
        assert!(registry.get_expression_metadata("Nope").is_none());
        assert!(registry.get_behavior_expression_metadata("Nope", "Nope").is_none());
    }

    #[test]
    fn object_expressions_fall_back_to_base_object() {
        let mut registry = MetadataRegistry::with_builtin_extensions();
        registry.load_extension_json(EXTENSION).expect("valid extension");

        let x = registry.get_object_expression_metadata("Sprite", "X").expect("base X");
        assert_eq!(x.function_name(Platform::Js), "getX");

        let line = registry
            .get_object_expression_metadata("Dialogs::Box", "Line")
            .expect("typed expression");
        assert_eq!(line.return_type, ValueType::String);
        assert!(registry.get_object_expression_metadata("Sprite", "Line").is_none());
    }

    #[test]
    fn loads_extension_files() {
        let mut registry = MetadataRegistry::new();
        let name = registry.load_extension_json(EXTENSION).expect("valid extension");
        assert_eq!(name, "Dialogs");

        let open = registry.get_action_metadata("Dialogs::Open").unwrap();
        assert_eq!(open.function_name(Platform::Cpp), "OpenDialog");
        assert_eq!(open.include_files(Platform::Js), ["Extensions/Dialogs/dialogs.js"]);
        assert!(open.parameters[0].code_only);
        assert_eq!(open.scope, Scope::Free);
    }

    #[test]
    fn rejects_duplicates_and_bad_json() {
        let mut registry = MetadataRegistry::new();
        registry.load_extension_json(EXTENSION).unwrap();
        let err = registry.load_extension_json(EXTENSION).unwrap_err();
        assert!(matches!(err, MetadataError::Duplicate { .. }), "got {err}");

        let err = registry.load_extension_json("{ nope").unwrap_err();
        assert!(matches!(err, MetadataError::Json(_)));
    }

    #[test]
    fn operator_parameter_lookup() {
        let registry = MetadataRegistry::with_builtin_extensions();
        let set_x = registry.get_action_metadata("MettreX").unwrap();
        assert_eq!(set_x.parameter_index_of("operator", 0), Some(1));
        assert_eq!(set_x.parameter_index_of("operator", 2), None);
        assert_eq!(set_x.access_type, AccessType::MutatorAndOrAccessor);
    }
}
