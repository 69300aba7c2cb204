use gdcodegen::model::{EventKind, IncludeConfig};
use gdcodegen::parser;

#[test]
fn test_platformer_project() {
    let contents = std::fs::read_to_string("tests/fixtures/platformer.json").unwrap();
    let project = parser::load(&contents).unwrap();

    assert_eq!(project.name, "Platformer");
    assert_eq!(project.objects.len(), 1);
    assert!(project.has_layout_named("Level 1"));
    assert!(project.has_layout_named("Menu"));
    assert_eq!(project.external_events.len(), 2);

    let level = project.get_layout("Level 1").unwrap();
    let containers = project.containers(level);
    assert_eq!(containers.type_of_object("Player"), "Sprite");
    assert_eq!(containers.type_of_object("Hud"), "TextObject::Text");
    assert!(containers.has_object_or_group_named("Characters"));
    assert_eq!(
        level.objects[0].behaviors[0].behavior_type,
        "PlatformBehavior::PlatformerObjectBehavior"
    );

    // The particle event has no known type and is left out.
    let type_names: Vec<_> = level.events.iter().map(|e| e.type_name()).collect();
    assert_eq!(
        type_names,
        vec![
            "BuiltinCommonInstructions::Comment",
            "BuiltinCommonInstructions::Standard",
            "BuiltinCommonInstructions::Standard",
            "BuiltinCommonInstructions::ForEach",
            "BuiltinCommonInstructions::Repeat",
            "BuiltinCommonInstructions::While",
            "BuiltinCommonInstructions::Group",
        ]
    );
    assert!(level.events[2].disabled);
    assert_eq!(level.events[1].sub_events().map(Vec::len), Some(1));

    let group = level.events[6].sub_events().unwrap();
    assert_eq!(
        group[0].kind,
        EventKind::Link {
            target: "Shared".into(),
            include: IncludeConfig::Range { start: 2, end: 2 },
        }
    );
    assert!(matches!(&group[2].kind, EventKind::Link { target, include: IncludeConfig::All } if target == "Loop"));

    let shared = project.get_external_events("Shared").unwrap();
    assert_eq!(shared.associated_layout, "Level 1");
    assert_eq!(shared.events.len(), 2);
}

#[test]
fn test_event_ids_are_unique() {
    let contents = std::fs::read_to_string("tests/fixtures/platformer.json").unwrap();
    let first = parser::load(&contents).unwrap();
    let second = parser::load(&contents).unwrap();

    let mut ids = Vec::new();
    for project in [&first, &second] {
        for layout in &project.layouts {
            let mut pending: Vec<_> = layout.events.iter().collect();
            while let Some(event) = pending.pop() {
                ids.push(event.id());
                pending.extend(event.sub_events().into_iter().flatten());
            }
        }
    }
    let count = ids.len();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), count);
}

#[test]
fn test_rejected_files() {
    let test_cases = vec![
        ("not json", "not valid JSON"),
        (r#"{"layouts": []}"#, "no `name`"),
        (r#"{"name": "P", "layouts": {}}"#, "`layouts` is not an array"),
        (r#"{"name": "P", "layouts": [{"events": []}]}"#, "missing `name`"),
        (
            r#"{"name": "P", "layouts": [{"name": "L", "events": [{"type": "BuiltinCommonInstructions::Link", "include": {"start": 1}}]}]}"#,
            "link range has no `end`",
        ),
    ];

    for (json, expected) in test_cases {
        let error = parser::load(json).unwrap_err();
        let chain = format!("{error:#}");
        assert!(chain.contains(expected), "{json}: {chain}");
    }
}
