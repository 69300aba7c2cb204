//! Preparing a layout's events for generation.
//!
//! Generation works on a copy: disabled events and comments are dropped and
//! links are replaced by copies of the events they include. The project is
//! left untouched.

use std::fmt;

use tracing::debug;

use super::diagnostics::{DiagnosticKind, Diagnostics};
use crate::model::{Event, EventId, EventKind, EventOrigins, EventsList, IncludeConfig, Project};

#[derive(Debug, Default)]
pub struct PreprocessedEvents {
    pub events: EventsList,
    /// Where each generated event comes from.
    pub origins: EventOrigins,
    /// Links whose target does not exist.
    pub invalid_links: Vec<EventId>,
}

/// Copies `events` (the events of `scene`) ready to be generated.
pub fn preprocess_events(
    project: &Project,
    scene: &str,
    events: &[Event],
    diagnostics: &mut Diagnostics,
) -> PreprocessedEvents {
    let mut preprocessed = PreprocessedEvents::default();
    let mut expander = LinkExpander {
        project,
        diagnostics,
        origins: &mut preprocessed.origins,
        invalid_links: &mut preprocessed.invalid_links,
        path: vec![LinkTarget::Layout(scene.to_string())],
    };
    preprocessed.events = expander.expand(events);
    preprocessed
}

/// What a link can include. Layouts and external events are separate
/// namespaces: a layout may share its name with external events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkTarget {
    Layout(String),
    External(String),
}

impl fmt::Display for LinkTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkTarget::Layout(name) => write!(f, "layout `{name}`"),
            LinkTarget::External(name) => write!(f, "external events `{name}`"),
        }
    }
}

/// Resolves a link to the external events named `name`, else to the layout.
pub fn link_target<'p>(project: &'p Project, name: &str) -> Option<(LinkTarget, &'p EventsList)> {
    project
        .get_external_events(name)
        .map(|external| (LinkTarget::External(name.to_string()), &external.events))
        .or_else(|| {
            project
                .get_layout(name)
                .map(|layout| (LinkTarget::Layout(name.to_string()), &layout.events))
        })
}

/// The part of `events` a link includes. Out of range bounds are clamped.
pub fn included_events(events: &[Event], include: IncludeConfig) -> &[Event] {
    match include {
        IncludeConfig::All => events,
        IncludeConfig::Range { start, end } => {
            let start = start.max(1) - 1;
            let end = end.min(events.len());
            if start >= end {
                &[]
            } else {
                &events[start..end]
            }
        }
    }
}

struct LinkExpander<'a> {
    project: &'a Project,
    diagnostics: &'a mut Diagnostics,
    origins: &'a mut EventOrigins,
    invalid_links: &'a mut Vec<EventId>,
    /// Layouts and external events being expanded, outermost first.
    path: Vec<LinkTarget>,
}

impl LinkExpander<'_> {
    fn expand(&mut self, events: &[Event]) -> EventsList {
        let mut expanded = Vec::with_capacity(events.len());
        for event in events {
            if event.disabled || !event.is_executable() {
                continue;
            }
            match &event.kind {
                EventKind::Link { target, include } => {
                    let included = self.expand_link(event.id(), target, *include);
                    expanded.extend(included);
                }
                _ => {
                    let mut shell = event.clone();
                    if let Some(sub_events) = shell.sub_events_mut() {
                        sub_events.clear();
                    }
                    let mut copy = shell.duplicate(self.origins);
                    if let (Some(copied), Some(originals)) = (copy.sub_events_mut(), event.sub_events()) {
                        *copied = self.expand(originals);
                    }
                    expanded.push(copy);
                }
            }
        }
        expanded
    }

    fn expand_link(&mut self, link: EventId, target: &str, include: IncludeConfig) -> EventsList {
        let Some((resolved, events)) = link_target(self.project, target) else {
            self.diagnostics.report(
                DiagnosticKind::InvalidLink,
                format!("link {link} targets `{target}`, which does not exist"),
            );
            self.invalid_links.push(link);
            return Vec::new();
        };
        if self.path.contains(&resolved) {
            let path: Vec<String> = self.path.iter().map(ToString::to_string).collect();
            let message = format!(
                "link to {resolved} loops back through {}, not included again",
                path.join(" -> ")
            );
            self.diagnostics.report(DiagnosticKind::LinkCycle, message);
            return Vec::new();
        }

        debug!(target_name = target, ?include, "including linked events");
        self.path.push(resolved);
        let included = self.expand(included_events(events, include));
        self.path.pop();
        included
    }
}
