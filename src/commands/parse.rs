//! Parse command implementation: one parser over one saved source.

use anyhow::Result;
use std::path::Path;

use super::read_input;
use crate::aggregator::{aggregate, Aggregation, Numbering};
use crate::cli::ParseFormat;
use crate::fetcher::split_lines;
use crate::model::Category;
use crate::parser::{parse_list, parse_mixed};
use crate::subscription::parse_subscription;

/// Parse and label raw source text
pub fn label_source(
    raw: &str,
    format: ParseFormat,
    category: Category,
    numbering: Numbering,
) -> Aggregation {
    let entries = match format {
        ParseFormat::List => parse_list(split_lines(raw), category),
        ParseFormat::Mixed => parse_mixed(split_lines(raw)),
        ParseFormat::Subscription => parse_subscription(raw),
    };
    aggregate([entries], numbering)
}

/// Run the parse command
pub fn run(format: ParseFormat, file: &Path, category: Category, start: u32) -> Result<()> {
    let raw = read_input(file)?;
    let aggregation = label_source(&raw, format, category, Numbering::starting_at(start));

    for label in &aggregation.combined {
        println!("{}", label);
    }
    eprintln!(
        "{} entries ({} duplicates dropped)",
        aggregation.total(),
        aggregation.duplicates
    );
    Ok(())
}
