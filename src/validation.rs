//! Address validation shared by every parser.
//!
//! The IPv6 rule is loose (hex digits and colons); IPv4 must be a strict
//! dotted quad. Page artifacts are rejected up front.

use once_cell::sync::Lazy;
use regex::Regex;

/// Shortest plausible address: `1.1.1.1`.
const MIN_ADDRESS_LEN: usize = 7;

/// Placeholder texts left behind by pages that had not finished rendering.
const LOADING_MARKERS: &[&str] = &["loading", "加载"];

static IPV4_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?:(?:25[0-5]|2[0-4][0-9]|[01]?[0-9]?[0-9])\.){3}(?:25[0-5]|2[0-4][0-9]|[01]?[0-9]?[0-9])$",
    )
    .expect("Invalid IPv4 regex")
});

static TIMESTAMP_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{1,2}:[0-9]{2}:[0-9]{2}$").expect("Invalid timestamp regex"));

/// Decide whether a token is an acceptable IPv4 or IPv6 address.
///
/// IPv4 octets may carry leading zeros (`01.2.3.4`); the spelling is kept
/// as-is and never normalized.
///
/// Total over all inputs: never panics, never allocates beyond the
/// lowercase copy used for placeholder detection.
///
/// # Examples
/// ```
/// use ipharvest::validation::is_valid_address;
/// assert!(is_valid_address("1.2.3.4"));
/// assert!(is_valid_address("2606:4700::1111"));
/// assert!(!is_valid_address("256.1.1.1"));
/// assert!(!is_valid_address("12:34:56"));
/// ```
pub fn is_valid_address(token: &str) -> bool {
    if token.len() < MIN_ADDRESS_LEN || is_artifact(token) {
        return false;
    }

    if IPV4_REGEX.is_match(token) {
        return true;
    }

    token.matches(':').count() >= 2 && token.chars().all(|c| c == ':' || c.is_ascii_hexdigit())
}

/// Percentages, loading placeholders and bare `HH:MM:SS` clocks.
fn is_artifact(token: &str) -> bool {
    if token.contains('%') || TIMESTAMP_REGEX.is_match(token) {
        return true;
    }
    let lower = token.to_lowercase();
    LOADING_MARKERS.iter().any(|m| lower.contains(m))
}
