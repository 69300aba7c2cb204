//! Event tree: the nodes a layout's logic is made of.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use super::expression::Expression;
use super::instruction::Instruction;

pub type EventsList = Vec<Event>;

pub const STANDARD: &str = "BuiltinCommonInstructions::Standard";
pub const REPEAT: &str = "BuiltinCommonInstructions::Repeat";
pub const WHILE: &str = "BuiltinCommonInstructions::While";
pub const FOR_EACH: &str = "BuiltinCommonInstructions::ForEach";
pub const LINK: &str = "BuiltinCommonInstructions::Link";
pub const GROUP: &str = "BuiltinCommonInstructions::Group";
pub const COMMENT: &str = "BuiltinCommonInstructions::Comment";

static NEXT_EVENT_ID: AtomicU64 = AtomicU64::new(1);

/// Stable identity of an event node.
///
/// Cloning an [`Event`] with `Clone` keeps the id (same node, copied);
/// [`Event::duplicate`] hands out fresh ids and records where they came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventId(u64);

impl EventId {
    fn fresh() -> Self {
        Self(NEXT_EVENT_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which events a link pulls in from its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IncludeConfig {
    #[default]
    All,
    /// 1-based, inclusive on both ends, as shown in the editor.
    Range { start: usize, end: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub enum EventKind {
    Standard {
        conditions: Vec<Instruction>,
        actions: Vec<Instruction>,
        sub_events: EventsList,
    },
    Repeat {
        repeat_expression: Expression,
        conditions: Vec<Instruction>,
        actions: Vec<Instruction>,
        sub_events: EventsList,
    },
    While {
        while_conditions: Vec<Instruction>,
        conditions: Vec<Instruction>,
        actions: Vec<Instruction>,
        sub_events: EventsList,
    },
    ForEach {
        object: String,
        conditions: Vec<Instruction>,
        actions: Vec<Instruction>,
        sub_events: EventsList,
    },
    Link {
        target: String,
        include: IncludeConfig,
    },
    Group {
        name: String,
        sub_events: EventsList,
    },
    Comment {
        text: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    id: EventId,
    pub disabled: bool,
    /// Editor-only.
    pub folded: bool,
    pub kind: EventKind,
}

impl Event {
    pub fn new(kind: EventKind) -> Self {
        Self {
            id: EventId::fresh(),
            disabled: false,
            folded: false,
            kind,
        }
    }

    /// Factory by type name. `None` for unknown types.
    pub fn create(type_name: &str) -> Option<Self> {
        let kind = match type_name {
            STANDARD => EventKind::Standard {
                conditions: Vec::new(),
                actions: Vec::new(),
                sub_events: Vec::new(),
            },
            REPEAT => EventKind::Repeat {
                repeat_expression: Expression::default(),
                conditions: Vec::new(),
                actions: Vec::new(),
                sub_events: Vec::new(),
            },
            WHILE => EventKind::While {
                while_conditions: Vec::new(),
                conditions: Vec::new(),
                actions: Vec::new(),
                sub_events: Vec::new(),
            },
            FOR_EACH => EventKind::ForEach {
                object: String::new(),
                conditions: Vec::new(),
                actions: Vec::new(),
                sub_events: Vec::new(),
            },
            LINK => EventKind::Link {
                target: String::new(),
                include: IncludeConfig::All,
            },
            GROUP => EventKind::Group {
                name: String::new(),
                sub_events: Vec::new(),
            },
            COMMENT => EventKind::Comment {
                text: String::new(),
            },
            _ => return None,
        };
        Some(Self::new(kind))
    }

    pub fn standard(conditions: Vec<Instruction>, actions: Vec<Instruction>) -> Self {
        Self::new(EventKind::Standard {
            conditions,
            actions,
            sub_events: Vec::new(),
        })
    }

    pub fn with_sub_events(mut self, events: EventsList) -> Self {
        if let Some(sub_events) = self.sub_events_mut() {
            *sub_events = events;
        }
        self
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    pub fn id(&self) -> EventId {
        self.id
    }

    pub fn type_name(&self) -> &'static str {
        match self.kind {
            EventKind::Standard { .. } => STANDARD,
            EventKind::Repeat { .. } => REPEAT,
            EventKind::While { .. } => WHILE,
            EventKind::ForEach { .. } => FOR_EACH,
            EventKind::Link { .. } => LINK,
            EventKind::Group { .. } => GROUP,
            EventKind::Comment { .. } => COMMENT,
        }
    }

    /// Comments carry no logic.
    pub fn is_executable(&self) -> bool {
        !matches!(self.kind, EventKind::Comment { .. })
    }

    pub fn can_have_sub_events(&self) -> bool {
        self.sub_events().is_some()
    }

    pub fn sub_events(&self) -> Option<&EventsList> {
        match &self.kind {
            EventKind::Standard { sub_events, .. }
            | EventKind::Repeat { sub_events, .. }
            | EventKind::While { sub_events, .. }
            | EventKind::ForEach { sub_events, .. }
            | EventKind::Group { sub_events, .. } => Some(sub_events),
            EventKind::Link { .. } | EventKind::Comment { .. } => None,
        }
    }

    pub fn sub_events_mut(&mut self) -> Option<&mut EventsList> {
        match &mut self.kind {
            EventKind::Standard { sub_events, .. }
            | EventKind::Repeat { sub_events, .. }
            | EventKind::While { sub_events, .. }
            | EventKind::ForEach { sub_events, .. }
            | EventKind::Group { sub_events, .. } => Some(sub_events),
            EventKind::Link { .. } | EventKind::Comment { .. } => None,
        }
    }

    pub fn has_sub_events(&self) -> bool {
        self.sub_events().is_some_and(|events| !events.is_empty())
    }

    /// Deep copy with fresh ids for the copy and all its sub-events.
    pub fn duplicate(&self, origins: &mut EventOrigins) -> Event {
        let mut copy = self.clone();
        copy.id = EventId::fresh();
        origins.record(copy.id, self.id);
        if let Some(sub_events) = copy.sub_events_mut() {
            *sub_events = sub_events
                .iter()
                .map(|event| event.duplicate(origins))
                .collect();
        }
        copy
    }
}

/// Maps duplicated events back to the node the user authored.
#[derive(Debug, Default, Clone)]
pub struct EventOrigins {
    origins: HashMap<EventId, EventId>,
}

impl EventOrigins {
    pub fn new() -> Self {
        Self::default()
    }

    /// A copy of a copy points at the first original.
    pub fn record(&mut self, copy: EventId, source: EventId) {
        let original = self.original_of(source);
        self.origins.insert(copy, original);
    }

    /// The authored event behind `id`, or `id` itself when it is not a copy.
    pub fn original_of(&self, id: EventId) -> EventId {
        self.origins.get(&id).copied().unwrap_or(id)
    }

    pub fn len(&self) -> usize {
        self.origins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.origins.is_empty()
    }
}
