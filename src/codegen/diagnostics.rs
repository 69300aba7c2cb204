//! Problems the generator worked around instead of failing.

use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DiagnosticKind {
    UnknownCondition,
    UnknownAction,
    UnknownExpression,
    UnknownObject,
    ObjectTypeMismatch,
    InvalidExpression,
    InvalidOperator,
    InvalidLink,
    LinkCycle,
    UnknownParameterType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout: Option<String>,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.layout {
            Some(layout) => write!(f, "[{layout}] {}", self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

/// Collects diagnostics for one generation pass and mirrors them to the log.
#[derive(Debug, Default)]
pub struct Diagnostics {
    layout: Option<String>,
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Layout attached to diagnostics reported from now on.
    pub fn set_layout(&mut self, layout: Option<&str>) {
        self.layout = layout.map(str::to_string);
    }

    pub fn report(&mut self, kind: DiagnosticKind, message: impl Into<String>) {
        let diagnostic = Diagnostic {
            kind,
            message: message.into(),
            layout: self.layout.clone(),
        };
        tracing::warn!(?kind, "{diagnostic}");
        self.entries.push(diagnostic);
    }

    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub fn has(&self, kind: DiagnosticKind) -> bool {
        self.entries.iter().any(|diagnostic| diagnostic.kind == kind)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_entries(self) -> Vec<Diagnostic> {
        self.entries
    }
}
