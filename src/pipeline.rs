//! End-to-end run: fetch every source, parse it with the parser for its
//! kind, and aggregate in priority order.

use futures::stream::{self, StreamExt};
use serde::Serialize;
use tracing::{info, warn};

use crate::aggregator::{Aggregation, AggregationState, Numbering};
use crate::config::{SourceConfig, SourceKind};
use crate::fetcher::{split_lines, TextSource};
use crate::model::{Category, Entry};
use crate::parser::{parse_list, parse_mixed};
use crate::resolver::resolve_subscription_url;
use crate::subscription::parse_subscription;

/// Entries parsed from one source
#[derive(Debug, Clone)]
pub struct SourceBatch {
    pub name: String,
    pub kind: SourceKind,
    pub entries: Vec<Entry>,
}

/// Per-source numbers for the run summary
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SourceReport {
    pub name: String,
    /// Entries the parser produced
    pub parsed: usize,
    /// Entries that survived deduplication
    pub accepted: usize,
}

/// Result of one pipeline run
#[derive(Debug, Clone)]
pub struct RunResult {
    pub aggregation: Aggregation,
    pub sources: Vec<SourceReport>,
}

/// Stable sort of sources into processing order; ties keep config order.
pub fn priority_order<'a>(sources: &[&'a SourceConfig]) -> Vec<&'a SourceConfig> {
    let mut ordered = sources.to_vec();
    ordered.sort_by_key(|s| s.kind.rank());
    ordered
}

/// Parse raw text according to the source kind.
///
/// Subscription pages are resolved to their blob URL through `fetcher`,
/// which is why this is async.
pub async fn parse_source<F>(fetcher: &F, source: &SourceConfig, raw: &str) -> Vec<Entry>
where
    F: TextSource + ?Sized,
{
    match source.kind {
        SourceKind::List { category } => parse_list(split_lines(raw), category),
        SourceKind::Mixed => parse_mixed(split_lines(raw)),
        SourceKind::Subscription => parse_subscription(raw),
        SourceKind::SubscriptionPage => {
            let Some(url) = resolve_subscription_url(raw) else {
                warn!("{}: no subscription link found on landing page", source.name);
                return Vec::new();
            };
            info!("{}: resolved subscription {}", source.name, url);
            parse_subscription(&fetcher.fetch_text(&url).await)
        }
    }
}

/// Fetch and parse every source, returned in priority order.
///
/// Downloads run concurrently (bounded by `max_concurrent`), but `buffered`
/// yields results in input order, so the order handed to the aggregator is
/// deterministic.
pub async fn collect_batches<F>(
    fetcher: &F,
    sources: &[&SourceConfig],
    max_concurrent: usize,
) -> Vec<SourceBatch>
where
    F: TextSource + ?Sized,
{
    let ordered = priority_order(sources);

    stream::iter(ordered.into_iter().map(|source| async move {
        info!("Fetching {}...", source.name);
        let raw = fetcher.fetch_text(&source.url).await;
        let entries = parse_source(fetcher, source, &raw).await;
        info!("Parsed {} - {} entries", source.name, entries.len());
        SourceBatch {
            name: source.name.clone(),
            kind: source.kind,
            entries,
        }
    }))
    .buffered(max_concurrent.max(1))
    .collect()
    .await
}

/// Deduplicate and label batches that are already in priority order.
pub fn aggregate_batches(batches: Vec<SourceBatch>, numbering: Numbering) -> RunResult {
    let mut state = AggregationState::new(numbering);
    let mut reports = Vec::with_capacity(batches.len());

    for batch in batches {
        let parsed = batch.entries.len();
        let accepted = batch
            .entries
            .into_iter()
            .map(|entry| state.accept(entry))
            .filter(|accepted| *accepted)
            .count();
        reports.push(SourceReport {
            name: batch.name,
            parsed,
            accepted,
        });
    }

    RunResult {
        aggregation: state.finish(),
        sources: reports,
    }
}

/// Full run over the given sources.
pub async fn run<F>(
    fetcher: &F,
    sources: &[&SourceConfig],
    numbering: Numbering,
    max_concurrent: usize,
) -> RunResult
where
    F: TextSource + ?Sized,
{
    let batches = collect_batches(fetcher, sources, max_concurrent).await;
    let result = aggregate_batches(batches, numbering);

    for category in Category::ALL {
        let count = result.aggregation.category(category).len();
        if count > 0 {
            info!("{}: {} entries", category, count);
        }
    }
    if result.aggregation.total() == 0 {
        warn!("No entries collected from any source");
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::MockTextSource;
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use std::collections::HashMap;

    fn source(name: &str, kind: SourceKind) -> SourceConfig {
        SourceConfig {
            name: name.to_string(),
            url: format!("https://example.com/{}", name),
            enabled: true,
            kind,
        }
    }

    fn list(name: &str, category: Category) -> SourceConfig {
        source(name, SourceKind::List { category })
    }

    fn mock_with(pages: HashMap<String, String>) -> MockTextSource {
        let mut mock = MockTextSource::new();
        mock.expect_fetch_text()
            .returning(move |url| pages.get(url).cloned().unwrap_or_default());
        mock
    }

    fn pages(items: &[(&str, &str)]) -> HashMap<String, String> {
        items
            .iter()
            .map(|(k, v)| (format!("https://example.com/{}", k), v.to_string()))
            .collect()
    }

    #[test]
    fn test_priority_order_is_stable() {
        let sub = source("sub", SourceKind::SubscriptionPage);
        let mixed = source("mixed", SourceKind::Mixed);
        let v6 = list("v6", Category::Ipv6Dedicated);
        let cm = list("cm", Category::Mobile);
        let ct_a = list("ct_a", Category::Telecom);
        let ct_b = list("ct_b", Category::Telecom);
        let multi = list("multi", Category::MultiLine);
        let configured = [&sub, &mixed, &v6, &cm, &ct_a, &ct_b, &multi];

        let names: Vec<_> = priority_order(&configured)
            .iter()
            .map(|s| s.name.as_str())
            .collect();
        assert_eq!(names, vec!["ct_a", "ct_b", "cm", "mixed", "v6", "multi", "sub"]);
    }

    #[tokio::test]
    async fn test_telecom_beats_mixed_duplicate() {
        let mixed = source("mixed", SourceKind::Mixed);
        let ct = list("ct", Category::Telecom);
        let fetcher = mock_with(pages(&[
            ("ct", "1.2.3.4#note\n"),
            ("mixed", "1.2.3.4#CM\n5.6.7.8#CU-HK\n"),
        ]));

        let result = run(&fetcher, &[&mixed, &ct], Numbering::default(), 2).await;

        assert_eq!(result.aggregation.combined, vec!["1.2.3.4#电信1", "5.6.7.8#联通1"]);
        assert_eq!(result.aggregation.duplicates, 1);
        assert_eq!(
            result.sources,
            vec![
                SourceReport {
                    name: "ct".to_string(),
                    parsed: 1,
                    accepted: 1
                },
                SourceReport {
                    name: "mixed".to_string(),
                    parsed: 2,
                    accepted: 1
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_mixed_only_with_offset() {
        let mixed = source("mixed", SourceKind::Mixed);
        let fetcher = mock_with(pages(&[("mixed", "5.6.7.8#CU-HK\n6.6.6.6#cu\n")]));

        let result = run(&fetcher, &[&mixed], Numbering::MIXED_REMARK_COMPAT, 1).await;

        assert_eq!(
            result.aggregation.category(Category::Unicom),
            ["5.6.7.8#联通100", "6.6.6.6#联通101"]
        );
    }

    #[tokio::test]
    async fn test_list_and_mixed_numbered_separately() {
        let mixed = source("mixed", SourceKind::Mixed);
        let ct = list("ct", Category::Telecom);
        let fetcher = mock_with(pages(&[
            ("ct", "1.2.3.4#note\n"),
            ("mixed", "5.6.7.8#CU-HK\n"),
        ]));
        let numbering = Numbering::default()
            .with_category_start(Category::Unicom, 100)
            .with_category_start(Category::Mobile, 100);

        let result = run(&fetcher, &[&mixed, &ct], numbering, 2).await;

        assert_eq!(result.aggregation.combined, vec!["1.2.3.4#电信1", "5.6.7.8#联通100"]);
    }

    #[tokio::test]
    async fn test_subscription_page_resolved() {
        let blob = STANDARD.encode(
            "vless://u@9.9.9.9:443?security=tls#US-node\nvless://u@8.8.8.8:8080#US\n",
        );
        let landing = r#"<a href="https://cdn.example.com/very/long/decorative/path.png">x</a>
            <a href="https://example.com/blob?uuid=abc">sub</a>"#;
        let sub = source("landing", SourceKind::SubscriptionPage);
        let fetcher = mock_with(pages(&[("landing", landing), ("blob?uuid=abc", &blob)]));

        let result = run(&fetcher, &[&sub], Numbering::default(), 1).await;

        assert_eq!(
            result.aggregation.category(Category::ProxyReverse),
            ["9.9.9.9#US（反代IP）"]
        );
    }

    #[tokio::test]
    async fn test_landing_page_without_links_skipped() {
        let sub = source("landing", SourceKind::SubscriptionPage);
        let mut fetcher = MockTextSource::new();
        fetcher
            .expect_fetch_text()
            .times(1)
            .returning(|_| "<html>maintenance</html>".to_string());

        let result = run(&fetcher, &[&sub], Numbering::default(), 1).await;
        assert_eq!(result.aggregation.total(), 0);
    }

    #[tokio::test]
    async fn test_direct_subscription_source() {
        let blob = STANDARD.encode("vless://u@7.7.7.7:443#jp");
        let sub = source("sub", SourceKind::Subscription);
        let fetcher = mock_with(pages(&[("sub", blob.trim_end_matches('='))]));

        let result = run(&fetcher, &[&sub], Numbering::default(), 1).await;
        assert_eq!(result.aggregation.combined, vec!["7.7.7.7#JP（反代IP）"]);
    }

    #[tokio::test]
    async fn test_proxy_duplicate_of_carrier_dropped() {
        let blob = STANDARD.encode("vless://u@1.1.1.1:443#US\nvless://u@2.2.2.2:443#SG");
        let sub = source("sub", SourceKind::Subscription);
        let other = list("other", Category::Other);
        let fetcher = mock_with(pages(&[("sub", &blob), ("other", "1.1.1.1")]));

        let result = run(&fetcher, &[&sub, &other], Numbering::default(), 2).await;
        assert_eq!(
            result.aggregation.combined,
            vec!["1.1.1.1#其他1", "2.2.2.2#SG（反代IP）"]
        );
    }

    #[tokio::test]
    async fn test_all_sources_down() {
        let ct = list("ct", Category::Telecom);
        let mixed = source("mixed", SourceKind::Mixed);
        let fetcher = mock_with(HashMap::new());

        let result = run(&fetcher, &[&ct, &mixed], Numbering::default(), 2).await;
        assert_eq!(result.aggregation.total(), 0);
        assert_eq!(result.sources.len(), 2);
        assert!(result.sources.iter().all(|s| s.parsed == 0));
    }

    #[tokio::test]
    async fn test_extra_category_lists() {
        let v6 = list("v6", Category::Ipv6Dedicated);
        let multi = list("multi", Category::MultiLine);
        let fetcher = mock_with(pages(&[
            ("v6", "2606:4700::1111\n2606:4700::1001#fast\n"),
            ("multi", "3.3.3.3\n"),
        ]));

        let result = run(&fetcher, &[&v6, &multi], Numbering::default(), 2).await;
        assert_eq!(
            result.aggregation.combined,
            vec!["3.3.3.3#多线1", "2606:4700::1111#IPV6-1", "2606:4700::1001#IPV6-2"]
        );
    }
}
