//! Deduplication, classification and per-category numbering.
//!
//! Entries must be fed in source-priority order: the first source to
//! mention an address owns it, later mentions are discarded as duplicates.

use std::collections::{BTreeMap, HashSet};

use crate::model::{Category, Entry, PROXY_LABEL_SUFFIX};

/// Counter start used by every category unless configured otherwise.
pub const DEFAULT_COUNTER_START: u32 = 1;

/// Counter start used by the mixed-remark source format (its labels begin at 100).
pub const MIXED_REMARK_COUNTER_START: u32 = 100;

/// Numbering policy for one run.
///
/// Every numbered category starts at `start` unless it has its own entry
/// in `overrides`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Numbering {
    /// First counter value handed out in each numbered category
    pub start: u32,
    /// Per-category first counter values
    pub overrides: BTreeMap<Category, u32>,
}

impl Numbering {
    pub const MIXED_REMARK_COMPAT: Numbering = Numbering {
        start: MIXED_REMARK_COUNTER_START,
        overrides: BTreeMap::new(),
    };

    pub fn starting_at(start: u32) -> Self {
        Self {
            start,
            overrides: BTreeMap::new(),
        }
    }

    /// Give one category its own first counter value.
    pub fn with_category_start(mut self, category: Category, start: u32) -> Self {
        self.overrides.insert(category, start);
        self
    }

    pub fn start_for(&self, category: Category) -> u32 {
        self.overrides.get(&category).copied().unwrap_or(self.start)
    }
}

impl Default for Numbering {
    fn default() -> Self {
        Self::starting_at(DEFAULT_COUNTER_START)
    }
}

/// Mutable state of one aggregation run: the seen set, the running counters
/// and the labelled buckets. Created fresh per run.
#[derive(Debug)]
pub struct AggregationState {
    seen: HashSet<String>,
    next: BTreeMap<Category, u32>,
    buckets: BTreeMap<Category, Vec<String>>,
    duplicates: usize,
}

impl AggregationState {
    pub fn new(numbering: Numbering) -> Self {
        Self {
            seen: HashSet::new(),
            next: Category::ALL
                .iter()
                .filter(|c| c.is_numbered())
                .map(|c| (*c, numbering.start_for(*c)))
                .collect(),
            buckets: Category::ALL.iter().map(|c| (*c, Vec::new())).collect(),
            duplicates: 0,
        }
    }

    /// Accept an entry unless its address was already seen.
    ///
    /// Returns `true` if the entry was labelled and appended to its bucket.
    pub fn accept(&mut self, entry: Entry) -> bool {
        if self.seen.contains(&entry.address) {
            self.duplicates += 1;
            return false;
        }

        let counter = self.next.get_mut(&entry.category).map(|next| {
            let current = *next;
            *next = next.saturating_add(1);
            current
        });
        let label = label(&entry, counter);

        self.seen.insert(entry.address);
        self.buckets.entry(entry.category).or_default().push(label);
        true
    }

    /// Number of entries discarded as duplicates so far.
    pub fn duplicates(&self) -> usize {
        self.duplicates
    }

    /// Whether an address has already been accepted.
    pub fn has_seen(&self, address: &str) -> bool {
        self.seen.contains(address)
    }

    /// Freeze the buckets into the final output.
    pub fn finish(self) -> Aggregation {
        let combined = Category::ALL
            .iter()
            .flat_map(|c| self.buckets.get(c).into_iter().flatten().cloned())
            .collect();

        Aggregation {
            per_category: self.buckets,
            combined,
            duplicates: self.duplicates,
        }
    }
}

/// Display label for an accepted entry.
///
/// Numbered categories render as `address#<tag><counter>`; reverse-proxy
/// entries render as `address#<country>（反代IP）`.
pub fn label(entry: &Entry, counter: Option<u32>) -> String {
    match (entry.category, counter) {
        (Category::ProxyReverse, _) | (_, None) => format!(
            "{}#{}{}",
            entry.address,
            entry.remark.as_deref().unwrap_or_default(),
            PROXY_LABEL_SUFFIX
        ),
        (category, Some(n)) => format!("{}#{}{}", entry.address, category.display_tag(), n),
    }
}

/// Final labelled output of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Aggregation {
    /// Labels per category, in acceptance order. Every category is present.
    pub per_category: BTreeMap<Category, Vec<String>>,
    /// All buckets concatenated in [`Category::ALL`] order.
    pub combined: Vec<String>,
    /// Entries discarded because their address was already taken.
    pub duplicates: usize,
}

impl Aggregation {
    pub fn category(&self, category: Category) -> &[String] {
        self.per_category
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn total(&self) -> usize {
        self.combined.len()
    }
}

/// Aggregate batches of entries given in source-priority order.
///
/// # Examples
/// ```
/// use ipharvest::aggregator::{aggregate, Numbering};
/// use ipharvest::model::{Category, Entry};
///
/// let sources = vec![
///     vec![Entry::new("1.2.3.4", Category::Telecom)],
///     vec![Entry::new("1.2.3.4", Category::Mobile)],
/// ];
/// let out = aggregate(sources, Numbering::default());
/// assert_eq!(out.combined, vec!["1.2.3.4#电信1"]);
/// ```
pub fn aggregate<I, S>(sources: I, numbering: Numbering) -> Aggregation
where
    I: IntoIterator<Item = S>,
    S: IntoIterator<Item = Entry>,
{
    let mut state = AggregationState::new(numbering);
    for entry in sources.into_iter().flatten() {
        state.accept(entry);
    }
    state.finish()
}
