//! Declarations of the builtin extensions.
//!
//! Only the instructions and expressions the generator has dedicated code
//! shapes for, plus the usual suspects every project uses. Anything else
//! comes from extension files.

use super::{
    AccessType, ExpressionMetadata, ExtensionDeclaration, InstructionMetadata, ParameterMetadata,
    PerPlatform, Scope, ValueType,
};

const CPP_COMMON_TOOLS: &str = "GDCpp/Extensions/Builtin/CommonInstructionsTools.h";
const CPP_KEYBOARD_TOOLS: &str = "GDCpp/Extensions/Builtin/KeyboardTools.h";
const CPP_MOUSE_TOOLS: &str = "GDCpp/Extensions/Builtin/MouseTools.h";
const CPP_RUNTIME_SCENE_TOOLS: &str = "GDCpp/Extensions/Builtin/RuntimeSceneTools.h";
const CPP_OBJECT_TOOLS: &str = "GDCpp/Extensions/Builtin/ObjectTools.h";
const CPP_VARIABLE_TOOLS: &str = "GDCpp/Extensions/Builtin/VariablesTools.h";
const CPP_SPRITE_OBJECT: &str = "GDCpp/Extensions/Builtin/SpriteExtension/RuntimeSpriteObject.h";
const CPP_PLATFORMER: &str = "PlatformBehavior/PlatformerObjectRuntimeBehavior.h";
const JS_PLATFORMER: &str = "Extensions/PlatformBehavior/platformerobjectruntimebehavior.js";

pub const COMPARE_NUMBERS: &str = "BuiltinCommonInstructions::CompareNumbers";
pub const COMPARE_STRINGS: &str = "BuiltinCommonInstructions::CompareStrings";
pub const PLATFORMER_BEHAVIOR: &str = "PlatformBehavior::PlatformerObjectBehavior";

fn param(parameter_type: &str) -> ParameterMetadata {
    ParameterMetadata::new(parameter_type)
}

fn code_only(parameter_type: &str) -> ParameterMetadata {
    ParameterMetadata {
        code_only: true,
        ..ParameterMetadata::new(parameter_type)
    }
}

fn optional(parameter_type: &str, default_value: &str) -> ParameterMetadata {
    ParameterMetadata {
        optional: true,
        default_value: default_value.to_string(),
        ..ParameterMetadata::new(parameter_type)
    }
}

fn inline_code(code: &str) -> ParameterMetadata {
    ParameterMetadata {
        extra_info: code.to_string(),
        ..code_only("inlineCode")
    }
}

fn object_of(object_type: &str) -> ParameterMetadata {
    ParameterMetadata {
        extra_info: object_type.to_string(),
        ..ParameterMetadata::new("object")
    }
}

fn instruction(
    name: &str,
    scope: Scope,
    parameters: Vec<ParameterMetadata>,
    cpp: &str,
    js: &str,
) -> InstructionMetadata {
    InstructionMetadata {
        name: name.to_string(),
        scope,
        parameters,
        function_name: PerPlatform::names(cpp, js),
        ..InstructionMetadata::default()
    }
}

fn includes(mut metadata: InstructionMetadata, cpp: &[&str], js: &[&str]) -> InstructionMetadata {
    metadata.include_files = PerPlatform::new(
        cpp.iter().map(|s| s.to_string()).collect(),
        js.iter().map(|s| s.to_string()).collect(),
    );
    metadata
}

fn valued(mut metadata: InstructionMetadata, value_type: ValueType) -> InstructionMetadata {
    metadata.value_type = value_type;
    metadata
}

fn with_getter(mut metadata: InstructionMetadata, cpp: &str, js: &str) -> InstructionMetadata {
    metadata.access_type = AccessType::MutatorAndOrAccessor;
    metadata.getter_name = Some(PerPlatform::names(cpp, js));
    metadata
}

fn expression(
    name: &str,
    return_type: ValueType,
    scope: Scope,
    parameters: Vec<ParameterMetadata>,
    cpp: &str,
    js: &str,
) -> ExpressionMetadata {
    ExpressionMetadata {
        name: name.to_string(),
        return_type,
        scope,
        parameters,
        function_name: PerPlatform::names(cpp, js),
        include_files: PerPlatform::default(),
    }
}

fn base_object() -> Scope {
    Scope::Object {
        object_type: String::new(),
    }
}

fn object_type(object_type: &str) -> Scope {
    Scope::Object {
        object_type: object_type.to_string(),
    }
}

fn behavior_type(behavior_type: &str) -> Scope {
    Scope::Behavior {
        behavior_type: behavior_type.to_string(),
    }
}

pub fn extensions() -> Vec<ExtensionDeclaration> {
    vec![
        common_instructions(),
        keyboard_and_mouse(),
        scene_and_variables(),
        base_object_extension(),
        sprite_extension(),
        platform_behavior(),
    ]
}

fn common_instructions() -> ExtensionDeclaration {
    // Comparisons have no function: the first operand is the left-hand side.
    let conditions = vec![
        valued(
            instruction(
                COMPARE_NUMBERS,
                Scope::Free,
                vec![param("expression"), param("relationalOperator"), param("expression")],
                "",
                "",
            ),
            ValueType::Number,
        ),
        valued(
            instruction(
                COMPARE_STRINGS,
                Scope::Free,
                vec![param("string"), param("relationalOperator"), param("string")],
                "",
                "",
            ),
            ValueType::String,
        ),
    ];

    let expressions = vec![
        expression("Random", ValueType::Number, Scope::Free, vec![param("expression")], "Random", "gdjs.random"),
        expression(
            "ToString",
            ValueType::String,
            Scope::Free,
            vec![param("expression")],
            "ToString",
            "gdjs.evtTools.common.toString",
        ),
        expression(
            "ToNumber",
            ValueType::Number,
            Scope::Free,
            vec![param("string")],
            "ToDouble",
            "gdjs.evtTools.common.toNumber",
        ),
        expression("abs", ValueType::Number, Scope::Free, vec![param("expression")], "std::abs", "Math.abs"),
        expression(
            "max",
            ValueType::Number,
            Scope::Free,
            vec![param("expression"), param("expression")],
            "std::max<double>",
            "Math.max",
        ),
        expression(
            "min",
            ValueType::Number,
            Scope::Free,
            vec![param("expression"), param("expression")],
            "std::min<double>",
            "Math.min",
        ),
    ];

    ExtensionDeclaration {
        name: "BuiltinCommonInstructions".into(),
        conditions: conditions
            .into_iter()
            .map(|c| includes(c, &[CPP_COMMON_TOOLS], &[]))
            .collect(),
        actions: Vec::new(),
        expressions,
    }
}

fn keyboard_and_mouse() -> ExtensionDeclaration {
    let conditions = vec![
        includes(
            instruction(
                "BuiltinKeyboard::KeyPressed",
                Scope::Free,
                vec![code_only("currentScene"), param("key")],
                "IsKeyPressed",
                "gdjs.evtTools.input.isKeyPressed",
            ),
            &[CPP_KEYBOARD_TOOLS],
            &[],
        ),
        includes(
            instruction(
                "BuiltinKeyboard::KeyReleased",
                Scope::Free,
                vec![code_only("currentScene"), param("key")],
                "WasKeyReleased",
                "gdjs.evtTools.input.wasKeyReleased",
            ),
            &[CPP_KEYBOARD_TOOLS],
            &[],
        ),
        includes(
            instruction(
                "SourisBouton",
                Scope::Free,
                vec![code_only("currentScene"), param("mouse")],
                "MouseButtonPressed",
                "gdjs.evtTools.input.isMouseButtonPressed",
            ),
            &[CPP_MOUSE_TOOLS],
            &[],
        ),
    ];

    ExtensionDeclaration {
        name: "BuiltinInput".into(),
        conditions,
        actions: Vec::new(),
        expressions: Vec::new(),
    }
}

fn scene_and_variables() -> ExtensionDeclaration {
    let conditions = vec![
        includes(
            instruction(
                "DepartScene",
                Scope::Free,
                vec![code_only("currentScene")],
                "SceneJustBegins",
                "gdjs.evtTools.runtimeScene.sceneJustBegins",
            ),
            &[CPP_RUNTIME_SCENE_TOOLS],
            &[],
        ),
        includes(
            valued(
                instruction(
                    "VarScene",
                    Scope::Free,
                    vec![param("scenevar"), param("relationalOperator"), param("expression")],
                    "GetVariableValue",
                    "gdjs.evtTools.common.getVariableNumber",
                ),
                ValueType::Number,
            ),
            &[CPP_VARIABLE_TOOLS],
            &[],
        ),
        includes(
            valued(
                instruction(
                    "VarSceneTxt",
                    Scope::Free,
                    vec![param("scenevar"), param("relationalOperator"), param("string")],
                    "GetVariableString",
                    "gdjs.evtTools.common.getVariableString",
                ),
                ValueType::String,
            ),
            &[CPP_VARIABLE_TOOLS],
            &[],
        ),
        includes(
            instruction(
                "VarSceneDef",
                Scope::Free,
                vec![code_only("currentScene"), param("string")],
                "SceneVariableDefined",
                "gdjs.evtTools.common.sceneVariableExists",
            ),
            &[CPP_VARIABLE_TOOLS],
            &[],
        ),
    ];

    let actions = vec![
        includes(
            with_getter(
                valued(
                    instruction(
                        "ModVarScene",
                        Scope::Free,
                        vec![param("scenevar"), param("operator"), param("expression")],
                        "SetVariableValue",
                        "gdjs.evtTools.common.setVariableNumber",
                    ),
                    ValueType::Number,
                ),
                "GetVariableValue",
                "gdjs.evtTools.common.getVariableNumber",
            ),
            &[CPP_VARIABLE_TOOLS],
            &[],
        ),
        includes(
            with_getter(
                valued(
                    instruction(
                        "ModVarSceneTxt",
                        Scope::Free,
                        vec![param("scenevar"), param("operator"), param("string")],
                        "SetVariableString",
                        "gdjs.evtTools.common.setVariableString",
                    ),
                    ValueType::String,
                ),
                "GetVariableString",
                "gdjs.evtTools.common.getVariableString",
            ),
            &[CPP_VARIABLE_TOOLS],
            &[],
        ),
        includes(
            with_getter(
                valued(
                    instruction(
                        "ModVarGlobal",
                        Scope::Free,
                        vec![param("globalvar"), param("operator"), param("expression")],
                        "SetVariableValue",
                        "gdjs.evtTools.common.setVariableNumber",
                    ),
                    ValueType::Number,
                ),
                "GetVariableValue",
                "gdjs.evtTools.common.getVariableNumber",
            ),
            &[CPP_VARIABLE_TOOLS],
            &[],
        ),
        includes(
            instruction(
                "Scene",
                Scope::Free,
                vec![code_only("currentScene"), param("string"), optional("yesorno", "no")],
                "ReplaceScene",
                "gdjs.evtTools.runtimeScene.replaceScene",
            ),
            &[CPP_RUNTIME_SCENE_TOOLS],
            &[],
        ),
        includes(
            instruction(
                "Create",
                Scope::Free,
                vec![
                    code_only("currentScene"),
                    param("objectListOrEmptyIfJustDeclared"),
                    param("expression"),
                    param("expression"),
                    optional("layer", "\"\""),
                ],
                "CreateObjectOnScene",
                "gdjs.evtTools.object.createObjectOnScene",
            ),
            &[CPP_OBJECT_TOOLS],
            &[],
        ),
    ];

    let expressions = vec![
        expression(
            "TimeDelta",
            ValueType::Number,
            Scope::Free,
            vec![code_only("currentScene")],
            "GetElapsedTimeInSeconds",
            "gdjs.evtTools.runtimeScene.getElapsedTimeInSeconds",
        ),
        expression(
            "Variable",
            ValueType::Number,
            Scope::Free,
            vec![param("scenevar")],
            "GetVariableValue",
            "gdjs.evtTools.common.getVariableNumber",
        ),
        expression(
            "VariableString",
            ValueType::String,
            Scope::Free,
            vec![param("scenevar")],
            "GetVariableString",
            "gdjs.evtTools.common.getVariableString",
        ),
        expression(
            "GlobalVariable",
            ValueType::Number,
            Scope::Free,
            vec![param("globalvar")],
            "GetVariableValue",
            "gdjs.evtTools.common.getVariableNumber",
        ),
        expression(
            "SceneName",
            ValueType::String,
            Scope::Free,
            vec![code_only("currentScene")],
            "GetSceneName",
            "gdjs.evtTools.runtimeScene.getSceneName",
        ),
    ];

    ExtensionDeclaration {
        name: "BuiltinScene".into(),
        conditions,
        actions,
        expressions,
    }
}

fn base_object_extension() -> ExtensionDeclaration {
    let conditions = vec![
        valued(
            instruction(
                "PosX",
                base_object(),
                vec![param("object"), param("relationalOperator"), param("expression")],
                "GetX",
                "getX",
            ),
            ValueType::Number,
        ),
        valued(
            instruction(
                "PosY",
                base_object(),
                vec![param("object"), param("relationalOperator"), param("expression")],
                "GetY",
                "getY",
            ),
            ValueType::Number,
        ),
        instruction(
            "Visible",
            base_object(),
            vec![param("object")],
            "IsVisible",
            "isVisible",
        ),
    ];

    let actions = vec![
        with_getter(
            valued(
                instruction(
                    "MettreX",
                    base_object(),
                    vec![param("object"), param("operator"), param("expression")],
                    "SetX",
                    "setX",
                ),
                ValueType::Number,
            ),
            "GetX",
            "getX",
        ),
        with_getter(
            valued(
                instruction(
                    "MettreY",
                    base_object(),
                    vec![param("object"), param("operator"), param("expression")],
                    "SetY",
                    "setY",
                ),
                ValueType::Number,
            ),
            "GetY",
            "getY",
        ),
        instruction(
            "Delete",
            base_object(),
            vec![param("object"), code_only("currentScene")],
            "DeleteFromScene",
            "deleteFromScene",
        ),
        instruction("Cache", base_object(), vec![param("object")], "Hide", "hide"),
        instruction(
            "Montre",
            base_object(),
            vec![param("object"), inline_code("false")],
            "Hide",
            "hide",
        ),
    ];

    let expressions = vec![
        expression("X", ValueType::Number, base_object(), vec![param("object")], "GetX", "getX"),
        expression("Y", ValueType::Number, base_object(), vec![param("object")], "GetY", "getY"),
        expression("Width", ValueType::Number, base_object(), vec![param("object")], "GetWidth", "getWidth"),
        expression("Height", ValueType::Number, base_object(), vec![param("object")], "GetHeight", "getHeight"),
        expression("ObjectName", ValueType::String, base_object(), vec![param("object")], "GetName", "getName"),
    ];

    ExtensionDeclaration {
        name: "BuiltinObject".into(),
        conditions: conditions
            .into_iter()
            .map(|c| includes(c, &[CPP_OBJECT_TOOLS], &[]))
            .collect(),
        actions,
        expressions,
    }
}

fn sprite_extension() -> ExtensionDeclaration {
    let sprite = || object_type("Sprite");
    let conditions = vec![valued(
        instruction(
            "Animation",
            sprite(),
            vec![object_of("Sprite"), param("relationalOperator"), param("expression")],
            "GetCurrentAnimation",
            "getAnimation",
        ),
        ValueType::Number,
    )];
    let actions = vec![with_getter(
        valued(
            instruction(
                "ChangeAnimation",
                sprite(),
                vec![object_of("Sprite"), param("operator"), param("expression")],
                "SetCurrentAnimation",
                "setAnimation",
            ),
            ValueType::Number,
        ),
        "GetCurrentAnimation",
        "getAnimation",
    )];
    let expressions = vec![expression(
        "Animation",
        ValueType::Number,
        sprite(),
        vec![object_of("Sprite")],
        "GetCurrentAnimation",
        "getAnimation",
    )];

    ExtensionDeclaration {
        name: "Sprite".into(),
        conditions: conditions
            .into_iter()
            .map(|c| includes(c, &[CPP_SPRITE_OBJECT], &[]))
            .collect(),
        actions: actions
            .into_iter()
            .map(|a| includes(a, &[CPP_SPRITE_OBJECT], &[]))
            .collect(),
        expressions,
    }
}

fn platform_behavior() -> ExtensionDeclaration {
    let behavior = || behavior_type(PLATFORMER_BEHAVIOR);
    let conditions = vec![
        instruction(
            "PlatformBehavior::IsJumping",
            behavior(),
            vec![param("object"), param("behavior")],
            "IsJumping",
            "isJumping",
        ),
        instruction(
            "PlatformBehavior::IsOnFloor",
            behavior(),
            vec![param("object"), param("behavior")],
            "IsOnFloor",
            "isOnFloor",
        ),
    ];
    let actions = vec![
        instruction(
            "PlatformBehavior::SimulateJumpKey",
            behavior(),
            vec![param("object"), param("behavior")],
            "SimulateJumpKey",
            "simulateJumpKey",
        ),
        with_getter(
            valued(
                instruction(
                    "PlatformBehavior::JumpSpeed",
                    behavior(),
                    vec![param("object"), param("behavior"), param("operator"), param("expression")],
                    "SetJumpSpeed",
                    "setJumpSpeed",
                ),
                ValueType::Number,
            ),
            "GetJumpSpeed",
            "getJumpSpeed",
        ),
    ];
    let expressions = vec![expression(
        "JumpSpeed",
        ValueType::Number,
        behavior(),
        vec![param("object"), param("behavior")],
        "GetJumpSpeed",
        "getJumpSpeed",
    )];

    ExtensionDeclaration {
        name: "PlatformBehavior".into(),
        conditions: conditions
            .into_iter()
            .map(|c| includes(c, &[CPP_PLATFORMER], &[JS_PLATFORMER]))
            .collect(),
        actions: actions
            .into_iter()
            .map(|a| includes(a, &[CPP_PLATFORMER], &[JS_PLATFORMER]))
            .collect(),
        expressions,
    }
}
