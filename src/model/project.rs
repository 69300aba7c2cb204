//! Project, layouts and the objects their events refer to.

use serde::{Deserialize, Serialize};

use super::event::EventsList;
use crate::codegen::mangler;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Behavior {
    pub name: String,
    #[serde(rename = "type")]
    pub behavior_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Object {
    pub name: String,
    #[serde(rename = "type", default)]
    pub object_type: String,
    #[serde(default)]
    pub behaviors: Vec<Behavior>,
}

impl Object {
    pub fn new(name: impl Into<String>, object_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            object_type: object_type.into(),
            behaviors: Vec::new(),
        }
    }

    pub fn with_behavior(mut self, name: impl Into<String>, behavior_type: impl Into<String>) -> Self {
        self.behaviors.push(Behavior {
            name: name.into(),
            behavior_type: behavior_type.into(),
        });
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectGroup {
    pub name: String,
    #[serde(default)]
    pub objects: Vec<String>,
}

/// One scene: its own objects and its own event tree.
#[derive(Debug, Clone, Default)]
pub struct Layout {
    pub name: String,
    pub objects: Vec<Object>,
    pub object_groups: Vec<ObjectGroup>,
    pub events: EventsList,
}

impl Layout {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn mangled_name(&self) -> String {
        mangler::mangle_scene_name(&self.name)
    }
}

/// Events stored outside any layout, reachable through links.
#[derive(Debug, Clone, Default)]
pub struct ExternalEvents {
    pub name: String,
    pub associated_layout: String,
    pub events: EventsList,
}

#[derive(Debug, Clone, Default)]
pub struct Project {
    pub name: String,
    /// Global objects, visible from every layout.
    pub objects: Vec<Object>,
    pub object_groups: Vec<ObjectGroup>,
    pub layouts: Vec<Layout>,
    pub external_events: Vec<ExternalEvents>,
}

impl Project {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn has_layout_named(&self, name: &str) -> bool {
        self.get_layout(name).is_some()
    }

    pub fn get_layout(&self, name: &str) -> Option<&Layout> {
        self.layouts.iter().find(|layout| layout.name == name)
    }

    pub fn get_external_events(&self, name: &str) -> Option<&ExternalEvents> {
        self.external_events.iter().find(|events| events.name == name)
    }

    /// Inserts an empty layout at `position` (clamped) and returns it.
    pub fn insert_new_layout(&mut self, name: impl Into<String>, position: usize) -> &mut Layout {
        let position = position.min(self.layouts.len());
        self.layouts.insert(position, Layout::new(name));
        &mut self.layouts[position]
    }

    pub fn has_object_named(&self, name: &str) -> bool {
        self.get_object(name).is_some()
    }

    pub fn get_object(&self, name: &str) -> Option<&Object> {
        self.objects.iter().find(|object| object.name == name)
    }

    /// Objects and groups as seen from `layout`.
    pub fn containers<'a>(&'a self, layout: &'a Layout) -> ObjectsContainers<'a> {
        ObjectsContainers {
            project: self,
            layout,
        }
    }
}

/// Name resolution for one layout: layout objects shadow global ones.
#[derive(Debug, Clone, Copy)]
pub struct ObjectsContainers<'a> {
    project: &'a Project,
    layout: &'a Layout,
}

impl<'a> ObjectsContainers<'a> {
    pub fn get_object(&self, name: &str) -> Option<&'a Object> {
        self.layout
            .objects
            .iter()
            .find(|object| object.name == name)
            .or_else(|| self.project.get_object(name))
    }

    pub fn get_group(&self, name: &str) -> Option<&'a ObjectGroup> {
        self.layout
            .object_groups
            .iter()
            .find(|group| group.name == name)
            .or_else(|| self.project.object_groups.iter().find(|group| group.name == name))
    }

    pub fn has_object_or_group_named(&self, name: &str) -> bool {
        self.get_object(name).is_some() || self.get_group(name).is_some()
    }

    /// Type of an object, or the common type of a group's members.
    /// Empty when unknown or when group members differ.
    pub fn type_of_object(&self, name: &str) -> String {
        if let Some(object) = self.get_object(name) {
            return object.object_type.clone();
        }
        let Some(group) = self.get_group(name) else {
            return String::new();
        };
        // Members naming no object are ignored, as when expanding the group.
        let mut types = group
            .objects
            .iter()
            .filter_map(|member| self.get_object(member))
            .map(|object| object.object_type.as_str());
        match types.next() {
            Some(first) if types.all(|t| t == first) => first.to_string(),
            _ => String::new(),
        }
    }

    /// Type of the first behavior named `behavior_name` on any object.
    pub fn type_of_behavior(&self, behavior_name: &str) -> String {
        self.layout
            .objects
            .iter()
            .chain(self.project.objects.iter())
            .flat_map(|object| object.behaviors.iter())
            .find(|behavior| behavior.name == behavior_name)
            .map(|behavior| behavior.behavior_type.clone())
            .unwrap_or_default()
    }

    /// Concrete object names behind `name`.
    ///
    /// A group expands to its members. When `current_object` is one of them,
    /// only the current object is returned.
    pub fn expand_object_name(&self, name: &str, current_object: Option<&str>) -> Vec<String> {
        let mut objects = match self.get_group(name) {
            Some(group) if self.get_object(name).is_none() => group
                .objects
                .iter()
                .filter(|member| self.get_object(member).is_some())
                .cloned()
                .collect(),
            _ => vec![name.to_string()],
        };

        if let Some(current) = current_object {
            if objects.iter().any(|object| object == current) {
                objects = vec![current.to_string()];
            }
        }
        objects
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project() -> Project {
        let mut project = Project::new("Demo");
        project.objects.push(Object::new("Hud", "TextObject::Text"));
        project.object_groups.push(ObjectGroup {
            name: "Everything".into(),
            objects: vec!["Hud".into(), "Player".into()],
        });

        let layout = project.insert_new_layout("Level 1", 0);
        layout.objects.push(
            Object::new("Player", "Sprite").with_behavior("Platformer", "PlatformBehavior::PlatformerObjectBehavior"),
        );
        layout.objects.push(Object::new("Enemy", "Sprite"));
        layout.object_groups.push(ObjectGroup {
            name: "Characters".into(),
            objects: vec!["Player".into(), "Enemy".into(), "Ghost".into()],
        });
        layout.object_groups.push(ObjectGroup {
            name: "Phantoms".into(),
            objects: vec!["Ghost".into()],
        });
        project
    }

    #[test]
    fn layout_objects_and_globals_are_visible() {
        let project = project();
        let containers = project.containers(&project.layouts[0]);
        assert!(containers.has_object_or_group_named("Player"));
        assert!(containers.has_object_or_group_named("Hud"));
        assert!(containers.has_object_or_group_named("Characters"));
        assert!(!containers.has_object_or_group_named("Ghost"));
    }

    #[test]
    fn groups_expand_to_known_members() {
        let project = project();
        let containers = project.containers(&project.layouts[0]);
        assert_eq!(containers.expand_object_name("Characters", None), vec!["Player", "Enemy"]);
        assert_eq!(containers.expand_object_name("Characters", Some("Enemy")), vec!["Enemy"]);
        assert_eq!(containers.expand_object_name("Characters", Some("Hud")), vec!["Player", "Enemy"]);
        assert_eq!(containers.expand_object_name("Player", None), vec!["Player"]);
    }

    #[test]
    fn object_and_behavior_types() {
        let project = project();
        let containers = project.containers(&project.layouts[0]);
        assert_eq!(containers.type_of_object("Player"), "Sprite");
        assert_eq!(containers.type_of_object("Characters"), "Sprite");
        assert_eq!(containers.type_of_object("Everything"), "");
        assert_eq!(containers.type_of_object("Phantoms"), "");
        assert_eq!(containers.type_of_object("Nobody"), "");
        assert_eq!(
            containers.type_of_behavior("Platformer"),
            "PlatformBehavior::PlatformerObjectBehavior"
        );
        assert_eq!(containers.type_of_behavior("Missing"), "");
    }

    #[test]
    fn insert_new_layout_clamps_position() {
        let mut project = project();
        project.insert_new_layout("Menu", 0);
        project.insert_new_layout("Credits", 99);
        let names: Vec<_> = project.layouts.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["Menu", "Level 1", "Credits"]);
        assert!(project.has_layout_named("Credits"));
    }
}
