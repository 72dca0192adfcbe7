//! Subscription URL discovery on landing pages.

use once_cell::sync::Lazy;
use regex::Regex;

/// Query marker carried by subscription links in this ecosystem.
const UUID_MARKER: &str = "?uuid=";

/// Permissive URL token: scheme plus everything up to whitespace, a quote
/// or an angle bracket.
static URL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"https?://[^\s"'<>]+"#).expect("Invalid URL regex"));

/// Extract every URL-looking token from a page, in document order.
pub fn extract_urls(html: &str) -> Vec<&str> {
    URL_REGEX.find_iter(html).map(|m| m.as_str()).collect()
}

/// Find the real subscription URL on a landing page.
///
/// The first URL carrying a `?uuid=` marker wins; otherwise the longest URL
/// (first one on ties). Returns `None` when the page holds no URL at all,
/// which callers treat as "no subscription data this run".
///
/// # Examples
/// ```
/// use ipharvest::resolver::resolve_subscription_url;
/// let html = r#"<a href="https://a.example/sub?uuid=abc">x</a>"#;
/// assert_eq!(resolve_subscription_url(html).as_deref(), Some("https://a.example/sub?uuid=abc"));
/// assert_eq!(resolve_subscription_url("no links"), None);
/// ```
pub fn resolve_subscription_url(html: &str) -> Option<String> {
    let urls = extract_urls(html);

    if let Some(url) = urls.iter().find(|u| u.contains(UUID_MARKER)) {
        return Some((*url).to_string());
    }

    urls.into_iter()
        .fold(None, |best: Option<&str>, url| match best {
            Some(b) if b.len() >= url.len() => Some(b),
            _ => Some(url),
        })
        .map(str::to_string)
}
