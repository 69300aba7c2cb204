//! Writes generated units and their report to the output directory.

pub mod code;
pub mod report;
