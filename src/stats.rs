//! Run summary: what each source contributed and how big each bucket is.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write as _;

use crate::model::Category;
use crate::pipeline::{RunResult, SourceReport};
use crate::utils::{format_bytes, format_count};

/// Summary of one run, printable as text or JSON
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub generated_at: DateTime<Utc>,
    pub sources: Vec<SourceReport>,
    pub categories: BTreeMap<Category, usize>,
    pub duplicates: usize,
    pub total: usize,
    pub bytes_downloaded: u64,
    pub files: Vec<String>,
}

impl RunSummary {
    pub fn new(result: &RunResult, bytes_downloaded: u64, files: Vec<String>) -> Self {
        Self {
            generated_at: Utc::now(),
            sources: result.sources.clone(),
            categories: result
                .aggregation
                .per_category
                .iter()
                .map(|(c, labels)| (*c, labels.len()))
                .collect(),
            duplicates: result.aggregation.duplicates,
            total: result.aggregation.total(),
            bytes_downloaded,
            files,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Human-readable report
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Sources:");
        for source in &self.sources {
            let _ = writeln!(
                out,
                "  {:<20} {:>8} parsed {:>8} kept",
                source.name,
                format_count(source.parsed),
                format_count(source.accepted)
            );
        }
        let _ = writeln!(out, "Categories:");
        for (category, count) in &self.categories {
            let _ = writeln!(out, "  {:<20} {:>8}", category.as_str(), format_count(*count));
        }
        let _ = writeln!(
            out,
            "Total: {} entries ({} duplicates dropped, {} downloaded)",
            format_count(self.total),
            format_count(self.duplicates),
            format_bytes(self.bytes_downloaded)
        );
        for file in &self.files {
            let _ = writeln!(out, "  -> {}", file);
        }
        out
    }
}
