use gdcodegen::codegen::{DiagnosticKind, GeneratedCode, GeneratorOptions, generate_layout_code, generate_project_code};
use gdcodegen::metadata::{MetadataRegistry, Platform};
use gdcodegen::model::{Event, Instruction, Object, Project};
use gdcodegen::parser;
use gdcodegen::writer::report;
use serde_json::json;

fn platformer() -> Project {
    let contents = std::fs::read_to_string("tests/fixtures/platformer.json").unwrap();
    parser::load(&contents).unwrap()
}

fn generate(project: &Project, platform: Platform) -> Vec<GeneratedCode> {
    let registry = MetadataRegistry::with_builtin_extensions();
    let options = GeneratorOptions {
        platform,
        ..GeneratorOptions::default()
    };
    generate_project_code(project, &registry, &options)
}

fn kinds(unit: &GeneratedCode) -> Vec<DiagnosticKind> {
    unit.diagnostics.iter().map(|d| d.kind).collect()
}

fn strip_disabled(events: &mut Vec<Event>) {
    events.retain(|event| !event.disabled);
    for event in events.iter_mut() {
        if let Some(sub_events) = event.sub_events_mut() {
            strip_disabled(sub_events);
        }
    }
}

#[test]
fn test_platformer_js() {
    let project = platformer();
    let generated = generate(&project, Platform::Js);

    let files: Vec<_> = generated.iter().map(|g| g.file_name.as_str()).collect();
    assert_eq!(files, vec!["Level_321.js", "Menu.js"]);

    let level = &generated[0];
    let test_cases = vec![
        "gdjs.Level_321Code = {};\n",
        "gdjs.evtTools.input.isKeyPressed(runtimeScene, \"Space\")",
        ".getBehavior(\"Platformer\").isOnFloor()",
        ".getBehavior(\"Platformer\").simulateJumpKey();\n",
        "const GDPlayerObjects2 = GDPlayerObjects1.slice();\n",
        "gdjs.evtTools.common.setVariableNumber(runtimeScene.getVariables().get(\"jumps\"), gdjs.evtTools.common.getVariableNumber(runtimeScene.getVariables().get(\"jumps\")) + (1));\n",
        "const repeatCount1 = gdjs.evtTools.common.getVariableNumber(runtimeScene.getVariables().get(\"coins\"));\n",
        "gdjs.evtTools.object.createObjectOnScene(runtimeScene, gdjs.Hashtable.newFrom({\"Coin\": GDCoinObjects",
        "let stopDoWhile1 = false;\n",
        "[i].deleteFromScene(runtimeScene);\n",
    ];
    for expected in test_cases {
        assert!(level.code.contains(expected), "missing {expected:?} in\n{}", level.code);
    }

    // Comments, disabled events and the first shared event are not generated.
    let absent = vec!["Controls", "\"Escape\"", "\"Menu\"", "\"Missing\"", "GDHudObjects"];
    for text in absent {
        assert!(!level.code.contains(text), "unexpected {text:?}");
    }

    let mut diagnostics = kinds(level);
    diagnostics.sort_by_key(|kind| format!("{kind:?}"));
    assert_eq!(diagnostics, vec![DiagnosticKind::InvalidLink, DiagnosticKind::LinkCycle]);
    assert_eq!(level.invalid_links.len(), 1);

    let menu = &generated[1];
    assert!(menu.code.contains("gdjs.evtTools.input.isMouseButtonPressed(runtimeScene, \"Left\")"));
    assert!(menu.code.contains("gdjs.evtTools.runtimeScene.replaceScene(runtimeScene, \"Level 1\", true);\n"));
    assert!(menu.diagnostics.is_empty());
}

#[test]
fn test_platformer_cpp() {
    let project = platformer();
    let generated = generate(&project, Platform::Cpp);

    let level = &generated[0];
    assert_eq!(level.file_name, "Level_321.cpp");
    assert!(level.code.contains("GDSceneEventsLevel_321(RuntimeScene & runtimeScene)"));
    let includes = vec![
        "GDCpp/Extensions/Builtin/KeyboardTools.h",
        "PlatformBehavior/PlatformerObjectRuntimeBehavior.h",
        "GDCpp/Extensions/Builtin/VariablesTools.h",
        "GDCpp/Extensions/Builtin/ObjectTools.h",
    ];
    for include in includes {
        assert!(level.includes.iter().any(|i| i == include), "missing include {include}");
        assert!(level.code.contains(include), "{include} not included by the unit");
    }
    // The mouse is only used by the menu.
    assert!(!level.includes.iter().any(|i| i.ends_with("MouseTools.h")));
    assert_eq!(kinds(level).len(), 2);
}

#[test]
fn test_disabled_events_change_nothing() {
    let project = platformer();
    let mut stripped = project.clone();
    for layout in &mut stripped.layouts {
        strip_disabled(&mut layout.events);
    }
    for external in &mut stripped.external_events {
        strip_disabled(&mut external.events);
    }

    for platform in [Platform::Js, Platform::Cpp] {
        let with_disabled = generate(&project, platform);
        let without = generate(&stripped, platform);
        for (a, b) in with_disabled.iter().zip(&without) {
            assert_eq!(a.code, b.code, "{platform:?} {}", a.layout);
            assert_eq!(a.includes, b.includes);
        }
    }
}

#[test]
fn test_escaping() {
    let text = "Hello \"world\"!\nThis is a backslash \\";
    let expression = format!("\"{}\"", text.replace('\\', "\\\\").replace('"', "\\\""));
    let project = json!({
        "name": "Escapes",
        "layouts": [{
            "name": "Scene",
            "events": [{
                "type": "BuiltinCommonInstructions::Standard",
                "actions": [{ "type": { "value": "Scene" }, "parameters": ["", expression, ""] }]
            }]
        }]
    });
    let project = parser::load_from_value(&project).unwrap();

    for platform in [Platform::Js, Platform::Cpp] {
        let generated = generate(&project, platform);
        assert!(
            generated[0].code.contains(r#""Hello \"world\"!\nThis is a backslash \\""#),
            "{}",
            generated[0].code
        );
        assert!(generated[0].diagnostics.is_empty());
    }
}

#[test]
fn test_self_links_terminate() {
    let project = json!({
        "name": "Loops",
        "layouts": [{
            "name": "Main",
            "events": [
                { "type": "BuiltinCommonInstructions::Link", "target": "Main" },
                { "type": "BuiltinCommonInstructions::Link", "target": "A" }
            ]
        }],
        "externalEvents": [
            {
                "name": "A",
                "events": [
                    {
                        "type": "BuiltinCommonInstructions::Standard",
                        "actions": [{ "type": { "value": "ModVarScene" }, "parameters": ["a", "+", "1"] }]
                    },
                    { "type": "BuiltinCommonInstructions::Link", "target": "B" }
                ]
            },
            {
                "name": "B",
                "events": [
                    { "type": "BuiltinCommonInstructions::Link", "target": "A" },
                    { "type": "BuiltinCommonInstructions::Link", "target": "Main" }
                ]
            }
        ]
    });
    let project = parser::load_from_value(&project).unwrap();
    let generated = generate(&project, Platform::Js);

    assert_eq!(generated[0].code.matches("get(\"a\")").count(), 2);
    assert_eq!(kinds(&generated[0]), vec![DiagnosticKind::LinkCycle; 3]);
    assert!(generated[0].invalid_links.is_empty());
}

#[test]
fn test_layout_linking_external_events_of_the_same_name() {
    let project = json!({
        "name": "Names",
        "layouts": [{
            "name": "Level",
            "events": [{ "type": "BuiltinCommonInstructions::Link", "target": "Level" }]
        }],
        "externalEvents": [{
            "name": "Level",
            "associatedLayout": "Level",
            "events": [{
                "type": "BuiltinCommonInstructions::Standard",
                "actions": [{ "type": { "value": "Scene" }, "parameters": ["", "\"Menu\"", ""] }]
            }]
        }]
    });
    let project = parser::load_from_value(&project).unwrap();
    let generated = generate(&project, Platform::Js);

    assert!(generated[0].code.contains("replaceScene(runtimeScene, \"Menu\", false);\n"));
    assert!(generated[0].diagnostics.is_empty(), "{:?}", generated[0].diagnostics);
}

#[test]
fn test_deeply_nested_expressions() {
    let deep = format!("{}1{}", "(".repeat(3000), ")".repeat(3000));
    let project = json!({
        "name": "Deep",
        "layouts": [{
            "name": "Scene",
            "events": [{
                "type": "BuiltinCommonInstructions::Standard",
                "conditions": [{
                    "type": { "value": "BuiltinCommonInstructions::CompareNumbers" },
                    "parameters": [deep, "=", "2"]
                }],
                "actions": [{ "type": { "value": "ModVarScene" }, "parameters": ["hits", "+", "1"] }]
            }]
        }]
    });
    let project = parser::load_from_value(&project).unwrap();

    for platform in [Platform::Js, Platform::Cpp] {
        let generated = generate(&project, platform);
        assert_eq!(kinds(&generated[0]), vec![DiagnosticKind::InvalidExpression]);
        assert!(generated[0].code.contains("condition0IsTrue_1"));
        assert!(generated[0].code.contains("\"hits\""));
    }
}

#[test]
fn test_extension_files() {
    let project = platformer();
    let mut registry = MetadataRegistry::with_builtin_extensions();
    let contents = std::fs::read_to_string("tests/fixtures/extension.json").unwrap();
    assert_eq!(registry.load_extension_json(&contents).unwrap(), "Flash");
    assert!(registry.get_expression_metadata("Flash::Remaining").is_some());
    assert!(registry.load_extension_json(&contents).is_err());

    let mut layout = project.get_layout("Menu").unwrap().clone();
    layout.objects.push(Object::new("Logo", "Sprite"));
    layout.events = vec![Event::standard(
        Vec::new(),
        vec![Instruction::new("Flash::Flash").with_parameters(["Logo", "2", ""])],
    )];

    let generated = generate_layout_code(&project, &layout, &registry, &GeneratorOptions::default());
    assert!(generated.code.contains("GDLogoObjects1[i].flash("), "{}", generated.code);
    assert!(generated.code.contains("\"255;255;255\")"));
    assert_eq!(generated.includes, vec!["Extensions/Flash/flash.js".to_string()]);
    assert!(generated.diagnostics.is_empty());
}

#[test]
fn test_report() {
    let project = platformer();
    let generated = generate(&project, Platform::Js);
    let report: serde_json::Value = serde_json::from_str(&report::to_json(&generated).unwrap()).unwrap();

    assert_eq!(report[0]["layout"], "Level 1");
    assert_eq!(report[0]["file"], "Level_321.js");
    assert_eq!(report[0]["invalidLinks"], json!([generated[0].invalid_links[0].value()]));
    assert_eq!(report[0]["diagnostics"].as_array().map(Vec::len), Some(2));
    assert_eq!(report[0]["diagnostics"][0]["layout"], "Level 1");
    assert_eq!(report[1]["diagnostics"], json!([]));
}

#[test]
fn test_written_files() {
    let project = platformer();
    let generated = generate(&project, Platform::Cpp);
    let out_dir = std::env::temp_dir().join(format!("gdcodegen-{}", std::process::id()));
    std::fs::create_dir_all(&out_dir).unwrap();

    gdcodegen::writer::code::emit(&generated, &out_dir).unwrap();
    report::emit(&generated, &out_dir).unwrap();

    for unit in &generated {
        let written = std::fs::read_to_string(out_dir.join(&unit.file_name)).unwrap();
        assert_eq!(written, unit.code);
    }
    let written_report = std::fs::read_to_string(out_dir.join(report::REPORT_FILE)).unwrap();
    assert_eq!(written_report, report::to_json(&generated).unwrap());

    std::fs::remove_dir_all(&out_dir).unwrap();
}
