//! Writing the labelled results to disk.

use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::info;

use crate::aggregator::Aggregation;
use crate::config::OutputsConfig;
use crate::model::Category;

/// Write `contents` to `path` atomically.
///
/// Uses tempfile + rename pattern to prevent readers from ever seeing a
/// partially written file.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let parent_dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut temp_file = NamedTempFile::new_in(parent_dir)
        .with_context(|| format!("Failed to create temporary file in {:?}", parent_dir))?;

    temp_file.write_all(contents)?;
    temp_file.as_file().sync_all()?;

    temp_file
        .persist(path)
        .with_context(|| format!("Failed to persist {:?}", path))?;

    Ok(())
}

/// Render lines as file content: `\n`-joined, no trailing newline.
pub fn render(lines: &[String]) -> String {
    lines.join("\n")
}

/// Files to write for an aggregation: `(file name, lines)`.
pub fn planned_files<'a>(
    outputs: &'a OutputsConfig,
    aggregation: &'a Aggregation,
) -> Vec<(&'a str, &'a [String])> {
    let mut files = Vec::new();
    if let Some(name) = outputs.combined.as_deref() {
        files.push((name, aggregation.combined.as_slice()));
    }
    for category in Category::ALL {
        if let Some(name) = outputs.for_category(category) {
            files.push((name, aggregation.category(category)));
        }
    }
    files
}

/// Write the combined and per-category files into `dir`.
///
/// Empty buckets still produce (empty) files so consumers never read stale data.
pub fn write_outputs(
    dir: &Path,
    outputs: &OutputsConfig,
    aggregation: &Aggregation,
) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory {:?}", dir))?;

    let mut written = Vec::new();
    for (name, lines) in planned_files(outputs, aggregation) {
        let path = dir.join(name);
        write_atomic(&path, render(lines).as_bytes())?;
        info!("Wrote {:?} ({} lines)", path, lines.len());
        written.push(path);
    }
    Ok(written)
}
