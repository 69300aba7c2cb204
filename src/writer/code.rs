//! One source file per generated layout.

use crate::codegen::GeneratedCode;
use std::fs;
use std::io;
use std::path::Path;

use tracing::info;

pub fn emit(generated: &[GeneratedCode], out_dir: &Path) -> io::Result<()> {
    for unit in generated {
        let path = out_dir.join(&unit.file_name);
        fs::write(&path, &unit.code)?;
        info!(layout = %unit.layout, path = %path.display(), "code written");
    }
    Ok(())
}
