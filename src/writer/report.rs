//! `diagnostics.json`: what each layout needed and what was worked around.

use anyhow::Result;
use serde::Serialize;
use std::fs;
use std::path::Path;

use crate::codegen::{Diagnostic, GeneratedCode};

pub const REPORT_FILE: &str = "diagnostics.json";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutReport<'a> {
    pub layout: &'a str,
    pub file: &'a str,
    pub includes: &'a [String],
    /// Ids of the links whose target does not exist.
    pub invalid_links: Vec<u64>,
    pub diagnostics: &'a [Diagnostic],
}

impl<'a> From<&'a GeneratedCode> for LayoutReport<'a> {
    fn from(unit: &'a GeneratedCode) -> Self {
        Self {
            layout: &unit.layout,
            file: &unit.file_name,
            includes: &unit.includes,
            invalid_links: unit.invalid_links.iter().map(|id| id.value()).collect(),
            diagnostics: &unit.diagnostics,
        }
    }
}

pub fn to_json(generated: &[GeneratedCode]) -> Result<String> {
    let layouts: Vec<LayoutReport<'_>> = generated.iter().map(LayoutReport::from).collect();
    Ok(serde_json::to_string_pretty(&layouts)?)
}

pub fn emit(generated: &[GeneratedCode], out_dir: &Path) -> Result<()> {
    fs::write(out_dir.join(REPORT_FILE), to_json(generated)?)?;
    Ok(())
}
