use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::codegen::GeneratorOptions;
use crate::metadata::Platform;

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Input project .json file
    pub input: PathBuf,
    /// Output directory
    pub output: PathBuf,
    /// Runtime the generated code is written for
    #[arg(long, value_enum, default_value_t = Target::Js)]
    pub target: Target,
    /// Only generate this layout (repeatable)
    #[arg(long = "layout", value_name = "NAME")]
    pub layouts: Vec<String>,
    /// Extension declaration .json file (repeatable)
    #[arg(long = "extensions", value_name = "FILE")]
    pub extensions: Vec<PathBuf>,
    /// Wrap top-level events in profiler sections
    #[arg(long)]
    pub profile: bool,
    /// Also write diagnostics.json
    #[arg(long)]
    pub report: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Target {
    Cpp,
    Js,
}

impl From<Target> for Platform {
    fn from(target: Target) -> Self {
        match target {
            Target::Cpp => Platform::Cpp,
            Target::Js => Platform::Js,
        }
    }
}

impl Cli {
    pub fn options(&self) -> GeneratorOptions {
        GeneratorOptions {
            platform: self.target.into(),
            profiling: self.profile,
            layouts: self.layouts.clone(),
        }
    }
}
