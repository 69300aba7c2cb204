use anyhow::{Context, Result, anyhow};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::model::{
    Event, EventKind, EventsList, Expression, ExternalEvents, IncludeConfig, Instruction, Layout,
    Object, ObjectGroup, Project,
};

/// Parse a whole project file.
///
/// The file is expected to contain the project `name` and optional arrays
///   • `objects` / `objectsGroups`: global objects and groups
///   • `layouts`: `{ name, objects, objectsGroups, events }`
///   • `externalEvents`: `{ name, associatedLayout, events }`
///
/// Events of an unknown type are logged and left out; anything else that
/// does not match the expected shape is an error.
pub fn load(json: &str) -> Result<Project> {
    debug!(bytes = json.len(), "project file loaded");
    let root: Value = serde_json::from_str(json).context("project file is not valid JSON")?;
    let project = load_from_value(&root)?;
    info!(
        project = %project.name,
        layouts = project.layouts.len(),
        external_events = project.external_events.len(),
        "project parsed"
    );
    Ok(project)
}

pub fn load_from_value(root: &Value) -> Result<Project> {
    let name = root
        .get("name")
        .and_then(|n| n.as_str())
        .ok_or_else(|| anyhow!("project has no `name`"))?;

    let mut project = Project::new(name);
    project.objects = parse_objects(root.get("objects")).context("global objects")?;
    project.object_groups = parse_groups(root.get("objectsGroups")).context("global groups")?;

    for (i, layout_val) in array(root.get("layouts"), "layouts")?.iter().enumerate() {
        let layout = parse_layout(layout_val).with_context(|| format!("layout {i}"))?;
        project.layouts.push(layout);
    }
    for (i, external_val) in array(root.get("externalEvents"), "externalEvents")?
        .iter()
        .enumerate()
    {
        let external = parse_external_events(external_val)
            .with_context(|| format!("external events {i}"))?;
        project.external_events.push(external);
    }
    Ok(project)
}

/// A missing array is an empty one.
fn array<'v>(value: Option<&'v Value>, field: &str) -> Result<&'v [Value]> {
    match value {
        None | Some(Value::Null) => Ok(&[]),
        Some(Value::Array(items)) => Ok(items.as_slice()),
        Some(_) => Err(anyhow!("`{field}` is not an array")),
    }
}

fn string_field<'v>(value: &'v Value, field: &str) -> Result<&'v str> {
    value
        .get(field)
        .and_then(|v| v.as_str())
        .ok_or_else(|| anyhow!("missing `{field}`"))
}

fn optional_string(value: &Value, field: &str) -> String {
    value
        .get(field)
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string()
}

fn flag(value: &Value, field: &str) -> bool {
    value.get(field).and_then(|v| v.as_bool()).unwrap_or(false)
}

fn parse_objects(value: Option<&Value>) -> Result<Vec<Object>> {
    match value {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(objects) => Ok(serde_json::from_value(objects.clone())?),
    }
}

fn parse_groups(value: Option<&Value>) -> Result<Vec<ObjectGroup>> {
    match value {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(groups) => Ok(serde_json::from_value(groups.clone())?),
    }
}

fn parse_layout(value: &Value) -> Result<Layout> {
    let name = string_field(value, "name")?;
    let mut layout = Layout::new(name);
    layout.objects = parse_objects(value.get("objects"))
        .with_context(|| format!("objects of `{name}`"))?;
    layout.object_groups = parse_groups(value.get("objectsGroups"))
        .with_context(|| format!("groups of `{name}`"))?;
    layout.events = parse_events(value.get("events")).with_context(|| format!("events of `{name}`"))?;
    Ok(layout)
}

fn parse_external_events(value: &Value) -> Result<ExternalEvents> {
    let name = string_field(value, "name")?;
    Ok(ExternalEvents {
        name: name.to_string(),
        associated_layout: optional_string(value, "associatedLayout"),
        events: parse_events(value.get("events")).with_context(|| format!("events of `{name}`"))?,
    })
}

pub fn parse_events(value: Option<&Value>) -> Result<EventsList> {
    let mut events = Vec::new();
    for (i, event_val) in array(value, "events")?.iter().enumerate() {
        if let Some(event) = parse_event(event_val).with_context(|| format!("event {i}"))? {
            events.push(event);
        }
    }
    Ok(events)
}

/// `None` for events of a type nobody knows how to generate.
pub fn parse_event(value: &Value) -> Result<Option<Event>> {
    let type_name = string_field(value, "type")?;
    let Some(mut event) = Event::create(type_name) else {
        warn!(event_type = type_name, "unknown event type, event left out");
        return Ok(None);
    };
    event.disabled = flag(value, "disabled");
    event.folded = flag(value, "folded");

    match &mut event.kind {
        EventKind::Standard { conditions, actions, sub_events } => {
            *conditions = parse_instructions(value.get("conditions")).context("conditions")?;
            *actions = parse_instructions(value.get("actions")).context("actions")?;
            *sub_events = parse_events(value.get("events"))?;
        }
        EventKind::Repeat {
            repeat_expression,
            conditions,
            actions,
            sub_events,
        } => {
            *repeat_expression = Expression::from(optional_string(value, "repeatExpression"));
            *conditions = parse_instructions(value.get("conditions")).context("conditions")?;
            *actions = parse_instructions(value.get("actions")).context("actions")?;
            *sub_events = parse_events(value.get("events"))?;
        }
        EventKind::While {
            while_conditions,
            conditions,
            actions,
            sub_events,
        } => {
            *while_conditions =
                parse_instructions(value.get("whileConditions")).context("while conditions")?;
            *conditions = parse_instructions(value.get("conditions")).context("conditions")?;
            *actions = parse_instructions(value.get("actions")).context("actions")?;
            *sub_events = parse_events(value.get("events"))?;
        }
        EventKind::ForEach {
            object,
            conditions,
            actions,
            sub_events,
        } => {
            *object = optional_string(value, "object");
            *conditions = parse_instructions(value.get("conditions")).context("conditions")?;
            *actions = parse_instructions(value.get("actions")).context("actions")?;
            *sub_events = parse_events(value.get("events"))?;
        }
        EventKind::Link { target, include } => {
            *target = optional_string(value, "target");
            *include = parse_include(value.get("include"))?;
        }
        EventKind::Group { name, sub_events } => {
            *name = optional_string(value, "name");
            *sub_events = parse_events(value.get("events"))?;
        }
        EventKind::Comment { text } => {
            *text = optional_string(value, "comment");
        }
    }
    Ok(Some(event))
}

/// Missing means every event; otherwise `{ "start": 1, "end": 3 }`.
fn parse_include(value: Option<&Value>) -> Result<IncludeConfig> {
    let Some(range) = value.filter(|v| !v.is_null()) else {
        return Ok(IncludeConfig::All);
    };
    let bound = |field: &str| {
        range
            .get(field)
            .and_then(|v| v.as_u64())
            .map(|v| v as usize)
            .ok_or_else(|| anyhow!("link range has no `{field}`"))
    };
    Ok(IncludeConfig::Range {
        start: bound("start")?,
        end: bound("end")?,
    })
}

fn parse_instructions(value: Option<&Value>) -> Result<Vec<Instruction>> {
    array(value, "instructions")?
        .iter()
        .enumerate()
        .map(|(i, v)| parse_instruction(v).with_context(|| format!("instruction {i}")))
        .collect()
}

/// `{ "type": { "value": "Name", "inverted": false }, "parameters": [...] }`
pub fn parse_instruction(value: &Value) -> Result<Instruction> {
    let type_val = value
        .get("type")
        .ok_or_else(|| anyhow!("instruction has no `type`"))?;
    let instruction_type = string_field(type_val, "value")?;

    let parameters = array(value.get("parameters"), "parameters")?
        .iter()
        .enumerate()
        .map(|(i, p)| {
            p.as_str()
                .map(Expression::from)
                .ok_or_else(|| anyhow!("parameter {i} of `{instruction_type}` is not a string"))
        })
        .collect::<Result<Vec<_>>>()?;

    let mut instruction = Instruction::new(instruction_type).inverted(flag(type_val, "inverted"));
    instruction.set_parameters(parameters);
    Ok(instruction)
}
