//! Tree of one parsed expression, before it is turned into target code.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Plus,
    Minus,
}

/// `.child` or `[expr]` after a variable name.
#[derive(Debug, Clone, PartialEq)]
pub enum Accessor {
    Child(String),
    Index(Box<Node>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCall {
    /// `Player` in `Player.X()`.
    pub object: Option<String>,
    /// `Platformer` in `Player.Platformer::JumpSpeed()`.
    pub behavior: Option<String>,
    /// Free functions keep their namespace: `MyExt::Thing`.
    pub name: String,
    pub args: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// `12`, `12.45`, `.5`, as written.
    Number(String),
    /// `"Hello"`, already unescaped.
    Text(String),
    Unary(UnaryOp, Box<Node>),
    Binary(BinaryOp, Box<Node>, Box<Node>),
    /// `( … )`.
    Group(Box<Node>),
    /// A bare name: a variable or an object, depending on the parameter.
    Identifier {
        name: String,
        accessors: Vec<Accessor>,
    },
    Call(FunctionCall),
    /// Nothing written, as in an empty argument: `f(1, , 3)`.
    Empty,
}

impl Node {
    pub fn is_empty(&self) -> bool {
        matches!(self, Node::Empty)
    }
}

impl fmt::Display for Accessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Accessor::Child(name) => write!(f, ".{name}"),
            Accessor::Index(node) => write!(f, "[{node}]"),
        }
    }
}

/// Prints the expression back in the expression language.
impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Number(number) => write!(f, "{number}"),
            Node::Text(text) => {
                write!(f, "\"{}\"", text.replace('\\', "\\\\").replace('"', "\\\""))
            }
            Node::Unary(UnaryOp::Plus, operand) => write!(f, "+{operand}"),
            Node::Unary(UnaryOp::Minus, operand) => write!(f, "-{operand}"),
            Node::Binary(op, left, right) => write!(f, "{left} {} {right}", op.symbol()),
            Node::Group(inner) => write!(f, "({inner})"),
            Node::Identifier { name, accessors } => {
                write!(f, "{name}")?;
                accessors.iter().try_for_each(|accessor| write!(f, "{accessor}"))
            }
            Node::Call(call) => {
                if let Some(object) = &call.object {
                    write!(f, "{object}.")?;
                }
                if let Some(behavior) = &call.behavior {
                    write!(f, "{behavior}::")?;
                }
                write!(f, "{}(", call.name)?;
                for (index, arg) in call.args.iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                write!(f, ")")
            }
            Node::Empty => Ok(()),
        }
    }
}
