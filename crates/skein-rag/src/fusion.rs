//! Reciprocal rank fusion: score(item) = Σ weight(list) / (k + rank).
//!
//! Ranks are 1-based. Each item's contributions are kept per source and
//! summed in source-name order, so the fused scores are bit-for-bit the same
//! whatever order the lists are supplied in.

use serde::{Deserialize, Serialize};
use skein_core::error::ConfigError;
use std::collections::{BTreeMap, BTreeSet};

/// Default damping constant.
pub const DEFAULT_RRF_K: f64 = 60.0;

/// Source name of lexical evidence.
pub const LEXICAL_SOURCE: &str = "lexical";
/// Source name of graph-expanded evidence.
pub const GRAPH_SOURCE: &str = "graph";

/// Fusion constant and per-source weights used by retrieval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FusionConfig {
    #[serde(default = "default_k")]
    pub k: f64,
    #[serde(default = "default_weight")]
    pub lexical_weight: f64,
    #[serde(default = "default_weight")]
    pub graph_weight: f64,
}

fn default_k() -> f64 { DEFAULT_RRF_K }
fn default_weight() -> f64 { 1.0 }

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            k: default_k(),
            lexical_weight: default_weight(),
            graph_weight: default_weight(),
        }
    }
}

impl FusionConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_non_negative("k", self.k)?;
        check_non_negative("lexical_weight", self.lexical_weight)?;
        check_non_negative("graph_weight", self.graph_weight)
    }
}

fn check_non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            value,
            expected: "[0, inf)",
        })
    }
}

/// One named ranked list, best first.
#[derive(Debug, Clone)]
pub struct RankedList<T> {
    pub source: String,
    pub weight: f64,
    pub items: Vec<T>,
}

impl<T> RankedList<T> {
    /// A list with weight 1.
    pub fn new(source: impl Into<String>, items: Vec<T>) -> Self {
        Self {
            source: source.into(),
            weight: 1.0,
            items,
        }
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }
}

/// A fused item with its provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FusionItem<T> {
    pub id: T,
    pub score: f64,
    /// Names of the lists that contained this item.
    pub sources: BTreeSet<String>,
    /// 1-based rank per contributing list.
    pub ranks: BTreeMap<String, usize>,
}

#[derive(Default)]
struct Accumulator {
    contributions: BTreeMap<String, f64>,
    ranks: BTreeMap<String, usize>,
}

/// Fuse `lists` with damping constant `k`.
///
/// Output is sorted by descending score, ties by ascending id. If an item
/// shows up more than once under the same source name, its best
/// contribution counts.
pub fn fuse<T>(lists: &[RankedList<T>], k: f64) -> Vec<FusionItem<T>>
where
    T: Ord + Clone,
{
    let mut acc: BTreeMap<T, Accumulator> = BTreeMap::new();

    for list in lists {
        for (pos, id) in list.items.iter().enumerate() {
            let rank = pos + 1;
            let contribution = list.weight * (1.0 / (k + rank as f64));
            let entry = acc.entry(id.clone()).or_default();

            let better = entry
                .contributions
                .get(&list.source)
                .map_or(true, |existing| contribution > *existing);
            if better {
                entry.contributions.insert(list.source.clone(), contribution);
            }
            let best_rank = entry.ranks.entry(list.source.clone()).or_insert(rank);
            *best_rank = (*best_rank).min(rank);
        }
    }

    let mut items: Vec<FusionItem<T>> = acc
        .into_iter()
        .map(|(id, a)| FusionItem {
            id,
            score: a.contributions.values().sum(),
            sources: a.ranks.keys().cloned().collect(),
            ranks: a.ranks,
        })
        .collect();

    // BTreeMap iteration is id-ordered, so a stable sort leaves ties by id.
    items.sort_by(|a, b| b.score.total_cmp(&a.score));
    items
}
