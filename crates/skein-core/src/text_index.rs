//! In-memory lexical index and fragment store.
//!
//! Fragments are scored with TF-IDF over a stopword-filtered tokenizer. Good
//! enough for tests, demos and small vaults; production deployments plug a
//! real full-text engine in behind [`LexicalIndex`].

use crate::error::StoreResult;
use crate::store::{FragmentStore, LexicalIndex};
use crate::types::{Fragment, FragmentId, LexicalHit, NodeId};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone)]
struct IndexedFragment {
    owner: NodeId,
    fragment: Fragment,
    terms: Vec<String>,
}

/// Fragment-level text index serving both [`LexicalIndex`] and [`FragmentStore`].
#[derive(Debug, Default)]
pub struct InMemoryTextIndex {
    fragments: Vec<IndexedFragment>,
    by_node: HashMap<NodeId, Vec<usize>>,
}

impl InMemoryTextIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index one fragment owned by `owner`.
    pub fn add_fragment(&mut self, owner: impl Into<NodeId>, fragment_id: &str, text: &str, offset_start: usize) {
        let owner = owner.into();
        let pos = self.fragments.len();
        self.fragments.push(IndexedFragment {
            owner: owner.clone(),
            fragment: Fragment {
                fragment_id: FragmentId::new(fragment_id),
                text: text.to_string(),
                offset_start,
            },
            terms: tokenize(text),
        });
        self.by_node.entry(owner).or_default().push(pos);
    }

    /// Split a document body on blank lines and index each paragraph.
    ///
    /// Fragment ids are `<owner>#<paragraph>`; offsets are byte offsets into
    /// `text`. Returns the number of fragments indexed.
    pub fn add_document(&mut self, owner: &str, text: &str) -> usize {
        let mut offset = 0;
        let mut added = 0;
        for (n, para) in text.split("\n\n").enumerate() {
            let trimmed = para.trim();
            if !trimmed.is_empty() {
                let lead = para.len() - para.trim_start().len();
                self.add_fragment(owner, &format!("{}#{}", owner, n), trimmed, offset + lead);
                added += 1;
            }
            offset += para.len() + 2;
        }
        added
    }

    pub fn fragment_count(&self) -> usize {
        self.fragments.len()
    }
}

#[async_trait]
impl LexicalIndex for InMemoryTextIndex {
    async fn search_ranked(&self, query: &str, limit: usize) -> StoreResult<Vec<LexicalHit>> {
        let query_terms = tokenize(query);
        if query_terms.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }

        let total_docs = self.fragments.len().max(1) as f64;
        let mut df: HashMap<&str, usize> = HashMap::new();
        for f in &self.fragments {
            let unique: HashSet<&str> = f.terms.iter().map(|t| t.as_str()).collect();
            for term in unique {
                *df.entry(term).or_insert(0) += 1;
            }
        }

        let mut hits: Vec<LexicalHit> = self
            .fragments
            .iter()
            .filter_map(|f| {
                let mut score = 0.0;
                for qt in &query_terms {
                    let tf = f.terms.iter().filter(|t| *t == qt).count() as f64;
                    if tf > 0.0 {
                        let idf = (total_docs / *df.get(qt.as_str()).unwrap_or(&1) as f64).ln() + 1.0;
                        score += tf * idf;
                    }
                }
                (score > 0.0).then(|| LexicalHit {
                    fragment_id: f.fragment.fragment_id.clone(),
                    owner_node_id: f.owner.clone(),
                    text: f.fragment.text.clone(),
                    score,
                    offset_start: Some(f.fragment.offset_start),
                })
            })
            .collect();

        hits.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.fragment_id.cmp(&b.fragment_id))
        });
        hits.truncate(limit);
        Ok(hits)
    }
}

#[async_trait]
impl FragmentStore for InMemoryTextIndex {
    async fn fragments_for_node(&self, node: &NodeId) -> StoreResult<Vec<Fragment>> {
        let mut out: Vec<Fragment> = self
            .by_node
            .get(node)
            .map(|positions| positions.iter().map(|&p| self.fragments[p].fragment.clone()).collect())
            .unwrap_or_default();
        out.sort_by_key(|f| f.offset_start);
        Ok(out)
    }
}

/// Lowercase, split on non-alphanumerics, drop stopwords and short words.
pub fn tokenize(text: &str) -> Vec<String> {
    const STOPWORDS: &[&str] = &[
        "the", "and", "are", "was", "were", "been", "being", "have", "has", "had", "does", "did",
        "will", "would", "could", "should", "may", "might", "shall", "can", "for", "with", "from",
        "into", "through", "during", "before", "after", "above", "below", "between", "out", "off",
        "over", "under", "again", "further", "then", "once", "but", "while", "what", "which", "who",
        "this", "that", "these", "those", "its", "how", "not", "than", "too", "very",
    ];

    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.len() >= 3 && !STOPWORDS.contains(w))
        .map(|w| w.to_string())
        .collect()
}
