//! In-memory project: the input of a generation pass.
pub mod event;
pub mod expression;
pub mod instruction;
pub mod project;

pub use event::{Event, EventId, EventKind, EventOrigins, EventsList, IncludeConfig};
pub use expression::Expression;
pub use instruction::{Instruction, ModelError};
pub use project::{Behavior, ExternalEvents, Layout, Object, ObjectGroup, ObjectsContainers, Project};
