//! Parsers for line-oriented IP sources.
//!
//! Two shapes are handled here:
//! - plain / inline-remark lists (`1.2.3.4` or `1.2.3.4#anything`), where the
//!   category comes from the source itself
//! - mixed-remark lists (`1.2.3.4#CU-HK`), where the remark carries a carrier
//!   code used for classification

use tracing::debug;

use crate::error::ParseError;
use crate::model::{Category, Entry};
use crate::validation::is_valid_address;

/// Remark prefixes, checked in this order.
const REMARK_PREFIXES: &[(&str, Category)] = &[
    ("CM", Category::Mobile),
    ("CU", Category::Unicom),
    ("CT", Category::Telecom),
];

/// Classify a carrier remark by prefix; unknown remarks fall back to `Other`.
///
/// # Examples
/// ```
/// use ipharvest::model::Category;
/// use ipharvest::parser::classify_remark;
/// assert_eq!(classify_remark("cu-hk"), Category::Unicom);
/// assert_eq!(classify_remark("HKG"), Category::Other);
/// ```
pub fn classify_remark(remark: &str) -> Category {
    let upper = remark.trim().to_uppercase();
    REMARK_PREFIXES
        .iter()
        .find(|(prefix, _)| upper.starts_with(prefix))
        .map(|(_, category)| *category)
        .unwrap_or(Category::Other)
}

/// Parse one line of a plain or inline-remark list.
pub fn parse_list_line(line: &str, category: Category) -> Result<Entry, ParseError> {
    let line = line.trim();
    if line.is_empty() {
        return Err(ParseError::Blank);
    }

    let candidate = match line.split_once('#') {
        Some((address, _remark)) => address.trim(),
        None => line,
    };

    if !is_valid_address(candidate) {
        return Err(ParseError::InvalidAddress(candidate.to_string()));
    }

    Ok(Entry::new(candidate, category))
}

/// Parse a plain or inline-remark list, keeping every valid line.
pub fn parse_list<I, S>(lines: I, category: Category) -> Vec<Entry>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    collect_valid(lines, |line| parse_list_line(line, category))
}

/// Parse one `address#remark` line of a mixed-remark list.
pub fn parse_mixed_line(line: &str) -> Result<Entry, ParseError> {
    let line = line.trim();
    if line.is_empty() {
        return Err(ParseError::Blank);
    }

    let mut parts = line.split('#');
    let address = parts.next().unwrap_or_default().trim();
    let remark = parts
        .next()
        .ok_or(ParseError::MissingDelimiter('#'))?
        .trim()
        .to_uppercase();

    if !is_valid_address(address) {
        return Err(ParseError::InvalidAddress(address.to_string()));
    }

    Ok(Entry::new(address, classify_remark(&remark)).with_remark(remark))
}

/// Parse a mixed-remark list, classifying each line by its remark.
pub fn parse_mixed<I, S>(lines: I) -> Vec<Entry>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    collect_valid(lines, parse_mixed_line)
}

/// Run a per-line parser over a batch, logging and dropping rejected lines.
pub(crate) fn collect_valid<I, S, F>(lines: I, mut parse_line: F) -> Vec<Entry>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
    F: FnMut(&str) -> Result<Entry, ParseError>,
{
    let mut entries = Vec::new();
    let mut rejected = 0usize;

    for line in lines {
        let line = line.as_ref();
        match parse_line(line) {
            Ok(entry) => entries.push(entry),
            Err(ParseError::Blank) => {}
            Err(e) => {
                rejected += 1;
                debug!("Skipping line {:?}: {}", crate::utils::truncate(line, 80), e);
            }
        }
    }

    if rejected > 0 {
        debug!("{} line(s) rejected, {} accepted", rejected, entries.len());
    }

    entries
}
