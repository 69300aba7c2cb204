pub mod cli;
pub mod codegen;
pub mod expression;
pub mod metadata;
pub mod model;
pub mod parser;
pub mod writer;

use anyhow::{Context, bail};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::metadata::MetadataRegistry;

pub fn run() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gdcodegen=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = cli::Cli::parse();

    // 1. ── Load ───────────────────────────────────────────────────────
    let json = std::fs::read_to_string(&args.input)
        .with_context(|| format!("Reading {}", args.input.display()))?;
    let project = parser::load(&json).with_context(|| "Parsing project JSON")?;

    let mut registry = MetadataRegistry::with_builtin_extensions();
    for path in &args.extensions {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Reading {}", path.display()))?;
        let name = registry
            .load_extension_json(&json)
            .with_context(|| format!("Loading extension {}", path.display()))?;
        info!(extension = %name, "extension loaded");
    }

    let options = args.options();
    for name in &options.layouts {
        if !project.has_layout_named(name) {
            bail!("project has no layout named `{name}`");
        }
    }

    // 2. ── Generate ───────────────────────────────────────────────────
    let generated = codegen::generate_project_code(&project, &registry, &options);

    // 3. ── Write outputs ──────────────────────────────────────────────
    std::fs::create_dir_all(&args.output)
        .with_context(|| format!("Creating {}", args.output.display()))?;

    writer::code::emit(&generated, &args.output).with_context(|| "Writing generated code")?;
    if args.report {
        writer::report::emit(&generated, &args.output)
            .with_context(|| "Writing diagnostics report")?;
    }

    Ok(())
}
