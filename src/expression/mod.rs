//! The expression language used inside instruction parameters.

pub mod ast;
pub mod lexer;
pub mod parser;

use thiserror::Error;

pub use ast::{Accessor, BinaryOp, FunctionCall, Node, UnaryOp};
pub use parser::parse;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExpressionError {
    #[error("unexpected character `{character}` at {position}")]
    UnexpectedCharacter { character: char, position: usize },
    #[error("text starting at {position} is never closed")]
    UnterminatedText { position: usize },
    #[error("expected {expected}, found {found} at {position}")]
    UnexpectedToken {
        expected: String,
        found: String,
        position: usize,
    },

    #[error("unknown function `{0}`")]
    UnknownFunction(String),
    #[error("unknown object `{0}`")]
    UnknownObject(String),
    #[error("unknown behavior `{behavior}` on `{object}`")]
    UnknownBehavior { object: String, behavior: String },
    #[error("`{0}` is not a value")]
    NotAValue(String),
    #[error("expected a {expected} value, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },
    #[error("`{0}` cannot be applied to text")]
    InvalidTextOperator(&'static str),
    #[error("`{name}` takes at most {max} arguments, got {got}")]
    TooManyArguments { name: String, max: usize, got: usize },
    #[error("`{0}` is not a variable")]
    NotAVariable(String),
    #[error("expression nested deeper than {max} levels at {position}")]
    TooDeep { max: usize, position: usize },
}
