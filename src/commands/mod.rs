//! CLI command implementations.

pub mod check;
pub mod init;
pub mod parse;
pub mod resolve;
pub mod update;

use anyhow::{Context, Result};
use std::io::Read;
use std::path::Path;

/// Read a whole file, or stdin when the path is `-`
pub(crate) fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut content = String::new();
        std::io::stdin()
            .read_to_string(&mut content)
            .context("Failed to read stdin")?;
        Ok(content)
    } else {
        std::fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))
    }
}
