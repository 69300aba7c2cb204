//! Turns the events of a layout into a source file for a target runtime.
//!
//! A generation pass reads the project and the metadata registry, copies and
//! preprocesses the layout's events, then walks them with an
//! [`EventsCodeGenerator`]. Problems it can work around become
//! [`Diagnostic`]s; a pass always produces code.

pub mod context;
pub mod diagnostics;
pub mod escape;
pub mod events;
pub mod expression;
pub mod generator;
pub mod mangler;
pub mod preprocess;
pub mod target;

use tracing::{debug, info};

pub use context::{CodeGenerationContext, ListState, ListsCheckpoint};
pub use diagnostics::{Diagnostic, DiagnosticKind};
pub use generator::{ConditionsCode, EventsCodeGenerator};
pub use target::{CodeTarget, CppTarget, JsTarget};

use crate::metadata::{MetadataRegistry, Platform};
use crate::model::{EventId, Layout, Project};

#[derive(Debug, Clone, Default)]
pub struct GeneratorOptions {
    pub platform: Platform,
    /// Wraps each top-level event in profiler sections.
    pub profiling: bool,
    /// Layouts to generate, all of them when empty.
    pub layouts: Vec<String>,
}

/// Result of one generation pass.
#[derive(Debug, Clone)]
pub struct GeneratedCode {
    pub layout: String,
    pub mangled_name: String,
    pub file_name: String,
    pub includes: Vec<String>,
    /// The complete source file.
    pub code: String,
    pub invalid_links: Vec<EventId>,
    pub diagnostics: Vec<Diagnostic>,
}

pub fn target_for(platform: Platform) -> &'static dyn CodeTarget {
    match platform {
        Platform::Cpp => &CppTarget,
        Platform::Js => &JsTarget,
    }
}

pub fn generate_layout_code(
    project: &Project,
    layout: &Layout,
    registry: &MetadataRegistry,
    options: &GeneratorOptions,
) -> GeneratedCode {
    let target = target_for(options.platform);
    let mut generator = EventsCodeGenerator::new(project, layout, registry, target);
    let preprocessed = preprocess::preprocess_events(
        project,
        &layout.name,
        &layout.events,
        generator.diagnostics_mut(),
    );
    debug!(
        layout = %layout.name,
        events = preprocessed.events.len(),
        copies = preprocessed.origins.len(),
        "events preprocessed"
    );

    let root = CodeGenerationContext::new();
    let mut body = String::new();
    for event in &preprocessed.events {
        let block = generator.generate_event_block(event, &root);
        if !options.profiling || block.is_empty() {
            body.push_str(&block);
            continue;
        }
        let section = format!("Event {}", preprocessed.origins.original_of(event.id()));
        body.push_str(&target.profiler_begin(&section));
        body.push_str(&block);
        body.push_str(&target.profiler_end(&section));
    }

    let (includes, diagnostics) = generator.into_parts();
    let mangled_name = layout.mangled_name();
    info!(
        layout = %layout.name,
        platform = ?options.platform,
        includes = includes.len(),
        diagnostics = diagnostics.len(),
        "generated layout code"
    );

    GeneratedCode {
        layout: layout.name.clone(),
        file_name: format!("{mangled_name}.{}", target.file_extension()),
        code: target.complete_unit(&mangled_name, &includes, &body),
        mangled_name,
        includes,
        invalid_links: preprocessed.invalid_links,
        diagnostics,
    }
}

/// Generates every selected layout of `project`, in project order.
pub fn generate_project_code(
    project: &Project,
    registry: &MetadataRegistry,
    options: &GeneratorOptions,
) -> Vec<GeneratedCode> {
    project
        .layouts
        .iter()
        .filter(|layout| options.layouts.is_empty() || options.layouts.contains(&layout.name))
        .map(|layout| generate_layout_code(project, layout, registry, options))
        .collect()
}
