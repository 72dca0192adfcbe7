//! Small formatting helpers for summaries and log lines.

/// Compact entry count: `950`, `12.3K`, `1.2M`.
///
/// # Examples
/// ```
/// use ipharvest::utils::format_count;
/// assert_eq!(format_count(950), "950");
/// assert_eq!(format_count(12_340), "12.3K");
/// ```
pub fn format_count(count: usize) -> String {
    match count {
        0..=999 => count.to_string(),
        1_000..=999_999 => format!("{:.1}K", count as f64 / 1e3),
        _ => format!("{:.1}M", count as f64 / 1e6),
    }
}

/// Download size for the run summary. Downloads are capped at 50 MB per
/// run, so MB is the largest unit.
///
/// # Examples
/// ```
/// use ipharvest::utils::format_bytes;
/// assert_eq!(format_bytes(2048), "2.0 KB");
/// ```
pub fn format_bytes(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    let bytes_f = bytes as f64;
    if bytes_f >= KB * KB {
        format!("{:.1} MB", bytes_f / (KB * KB))
    } else if bytes_f >= KB {
        format!("{:.1} KB", bytes_f / KB)
    } else {
        format!("{} B", bytes)
    }
}

/// Truncate a string to at most `max_chars` characters, adding "..." if truncated.
///
/// Source lines are often CJK, so this counts characters, not bytes.
///
/// # Examples
/// ```
/// use ipharvest::utils::truncate;
/// assert_eq!(truncate("short", 10), "short");
/// assert_eq!(truncate("this is long", 10), "this is...");
/// assert_eq!(truncate("加载中加载中", 5), "加载...");
/// ```
pub fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else if max_chars <= 3 {
        "...".to_string()
    } else {
        let head: String = s.chars().take(max_chars - 3).collect();
        format!("{}...", head)
    }
}
