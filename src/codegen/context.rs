//! Scope tracking for object lists during code generation.
//!
//! Every event gets its own context, derived from the context of the list it
//! belongs to. A context knows which object lists are visible from outer
//! scopes and which ones it must declare itself, either by picking objects
//! or as lists deliberately left empty.

use std::collections::BTreeMap;

/// What a context knows about one object list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListState {
    /// Declared in an enclosing scope and readable as is.
    AlreadyDeclared,
    /// Must be declared here, filled with the objects picked so far.
    ToBeDeclared,
    /// Must be declared here as an empty list.
    EmptyToBeDeclared,
}

/// List states saved by [`CodeGenerationContext::checkpoint`].
#[derive(Debug, Clone)]
pub struct ListsCheckpoint(BTreeMap<String, ListState>);

/// One scope of the generated code.
///
/// A single map holds every name, so a name is in exactly one state at a time.
#[derive(Debug, Default)]
pub struct CodeGenerationContext<'p> {
    parent: Option<&'p CodeGenerationContext<'p>>,
    lists: BTreeMap<String, ListState>,
    scope_level: usize,
    current_object: Option<String>,
}

impl<'p> CodeGenerationContext<'p> {
    /// Root context of a generation pass.
    pub fn new() -> Self {
        Self::default()
    }

    /// Child scope for a nested event.
    ///
    /// Everything known to the parent, whatever its state, is already
    /// declared for the child. The parent is only read, never modified.
    pub fn inherits_from(parent: &'p CodeGenerationContext<'p>) -> Self {
        let lists = parent
            .lists
            .keys()
            .map(|name| (name.clone(), ListState::AlreadyDeclared))
            .collect();
        Self {
            parent: Some(parent),
            lists,
            scope_level: parent.scope_level + 1,
            current_object: parent.current_object.clone(),
        }
    }

    pub fn parent(&self) -> Option<&CodeGenerationContext<'p>> {
        self.parent
    }

    pub fn scope_level(&self) -> usize {
        self.scope_level
    }

    pub fn state_of(&self, name: &str) -> Option<ListState> {
        self.lists.get(name).copied()
    }

    /// Asks for a list filled with the picked objects.
    ///
    /// A list already proven empty in this scope stays empty.
    pub fn objects_list_needed(&mut self, name: &str) {
        match self.lists.get(name) {
            Some(ListState::EmptyToBeDeclared) | Some(ListState::ToBeDeclared) => {}
            Some(ListState::AlreadyDeclared) | None => {
                self.lists.insert(name.to_string(), ListState::ToBeDeclared);
            }
        }
    }

    /// Asks for a list declared empty, unless it is already being filled.
    pub fn empty_objects_list_needed(&mut self, name: &str) {
        match self.lists.get(name) {
            Some(ListState::ToBeDeclared) | Some(ListState::EmptyToBeDeclared) => {}
            Some(ListState::AlreadyDeclared) | None => {
                self.lists
                    .insert(name.to_string(), ListState::EmptyToBeDeclared);
            }
        }
    }

    pub fn objects_lists_to_be_declared(&self) -> impl Iterator<Item = &str> {
        self.names_in(ListState::ToBeDeclared)
    }

    pub fn empty_objects_lists_to_be_declared(&self) -> impl Iterator<Item = &str> {
        self.names_in(ListState::EmptyToBeDeclared)
    }

    pub fn already_declared_objects_lists(&self) -> impl Iterator<Item = &str> {
        self.names_in(ListState::AlreadyDeclared)
    }

    /// Both kinds of pending declarations, sorted by name.
    pub fn all_objects_to_be_declared(&self) -> Vec<&str> {
        self.lists
            .iter()
            .filter(|(_, state)| **state != ListState::AlreadyDeclared)
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// True when some enclosing scope owns a list with this name.
    pub fn object_already_declared_by_parents(&self, name: &str) -> bool {
        self.parent
            .is_some_and(|parent| parent.lists.contains_key(name))
    }

    /// Scope level of the context whose declaration of `name` is visible
    /// from here, or `None` when nobody declares it.
    pub fn declaration_level(&self, name: &str) -> Option<usize> {
        match self.lists.get(name) {
            Some(ListState::ToBeDeclared) | Some(ListState::EmptyToBeDeclared) => {
                Some(self.scope_level)
            }
            Some(ListState::AlreadyDeclared) | None => {
                self.parent.and_then(|parent| parent.declaration_level(name))
            }
        }
    }

    pub fn current_object(&self) -> Option<&str> {
        self.current_object.as_deref()
    }

    pub fn set_current_object(&mut self, name: &str) {
        self.current_object = Some(name.to_string());
    }

    pub fn set_no_current_object(&mut self) {
        self.current_object = None;
    }

    /// Saves the list states, to undo the needs of code that gets discarded.
    pub fn checkpoint(&self) -> ListsCheckpoint {
        ListsCheckpoint(self.lists.clone())
    }

    pub fn rollback(&mut self, checkpoint: ListsCheckpoint) {
        self.lists = checkpoint.0;
    }

    fn names_in(&self, wanted: ListState) -> impl Iterator<Item = &str> {
        self.lists
            .iter()
            .filter(move |(_, state)| **state == wanted)
            .map(|(name, _)| name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owned<'a>(names: impl Iterator<Item = &'a str>) -> Vec<String> {
        names.map(String::from).collect()
    }

    fn sets(context: &CodeGenerationContext<'_>) -> (Vec<String>, Vec<String>, Vec<String>) {
        (
            owned(context.already_declared_objects_lists()),
            owned(context.objects_lists_to_be_declared()),
            owned(context.empty_objects_lists_to_be_declared()),
        )
    }

    #[test]
    fn child_sees_every_parent_name_as_declared() {
        let mut root = CodeGenerationContext::new();
        root.objects_list_needed("Player");
        root.empty_objects_list_needed("Bullet");

        let mut parent = CodeGenerationContext::inherits_from(&root);
        parent.objects_list_needed("Enemy");
        parent.empty_objects_list_needed("Coin");

        let child = CodeGenerationContext::inherits_from(&parent);
        let (declared, to_declare, empty) = sets(&child);
        assert_eq!(declared, vec!["Bullet", "Coin", "Enemy", "Player"]);
        assert!(to_declare.is_empty());
        assert!(empty.is_empty());
        assert_eq!(child.scope_level(), parent.scope_level() + 1);
        assert_eq!(parent.scope_level(), 1);
    }

    #[test]
    fn empty_declaration_wins_over_later_population() {
        let mut context = CodeGenerationContext::new();
        context.empty_objects_list_needed("Enemy");
        context.objects_list_needed("Enemy");

        let (declared, to_declare, empty) = sets(&context);
        assert!(declared.is_empty());
        assert!(to_declare.is_empty());
        assert_eq!(empty, vec!["Enemy"]);
    }

    #[test]
    fn population_wins_over_later_empty_declaration() {
        let mut context = CodeGenerationContext::new();
        context.objects_list_needed("Enemy");
        context.empty_objects_list_needed("Enemy");

        let (_, to_declare, empty) = sets(&context);
        assert_eq!(to_declare, vec!["Enemy"]);
        assert!(empty.is_empty());
    }

    #[test]
    fn inherited_names_can_be_redeclared() {
        let mut root = CodeGenerationContext::new();
        root.objects_list_needed("Player");
        root.objects_list_needed("Enemy");

        let mut child = CodeGenerationContext::inherits_from(&root);
        child.objects_list_needed("Player");
        child.empty_objects_list_needed("Enemy");

        let (declared, to_declare, empty) = sets(&child);
        assert!(declared.is_empty());
        assert_eq!(to_declare, vec!["Player"]);
        assert_eq!(empty, vec!["Enemy"]);
        assert!(child.object_already_declared_by_parents("Player"));
        assert!(!child.object_already_declared_by_parents("Coin"));
        assert_eq!(child.all_objects_to_be_declared(), vec!["Enemy", "Player"]);
    }

    #[test]
    fn declaration_level_walks_up_the_scopes() {
        let mut root = CodeGenerationContext::new();
        root.objects_list_needed("Player");

        let mut child = CodeGenerationContext::inherits_from(&root);
        child.objects_list_needed("Enemy");

        let grandchild = CodeGenerationContext::inherits_from(&child);
        assert_eq!(grandchild.declaration_level("Player"), Some(0));
        assert_eq!(grandchild.declaration_level("Enemy"), Some(1));
        assert_eq!(grandchild.declaration_level("Coin"), None);
    }

    #[test]
    fn parent_is_never_modified() {
        let mut root = CodeGenerationContext::new();
        root.objects_list_needed("Player");
        {
            let mut child = CodeGenerationContext::inherits_from(&root);
            child.objects_list_needed("Enemy");
            child.empty_objects_list_needed("Player");
        }
        let (declared, to_declare, empty) = sets(&root);
        assert!(declared.is_empty());
        assert_eq!(to_declare, vec!["Player"]);
        assert!(empty.is_empty());
    }

    #[test]
    fn rollback_forgets_later_needs() {
        let mut root = CodeGenerationContext::new();
        root.objects_list_needed("Player");
        let checkpoint = root.checkpoint();
        root.objects_list_needed("Enemy");
        root.empty_objects_list_needed("Coin");
        root.rollback(checkpoint);
        assert_eq!(root.all_objects_to_be_declared(), vec!["Player"]);
    }

    #[test]
    fn current_object_is_inherited() {
        let mut root = CodeGenerationContext::new();
        root.set_current_object("Player");
        let child = CodeGenerationContext::inherits_from(&root);
        assert_eq!(child.current_object(), Some("Player"));

        root.set_no_current_object();
        assert_eq!(root.current_object(), None);
    }
}
