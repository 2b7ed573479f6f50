//! Context assembly: lexical search, graph expansion and rank fusion.
//!
//! For a free-text query:
//! 1. lexical search for up to `2 × max_results` fragments
//! 2. drop hits whose owner fails the caller's filters
//! 3. seed nodes = per-node best lexical score, top `seed_limit`
//! 4. bounded expansion from the seeds
//! 5. fragments of every expanded non-seed node that passes the filters
//! 6. fuse the "lexical" and "graph" fragment lists
//! 7. keep the best `max_results` fragments
//! 8. one text block per owning node, fragments in document order
//! 9. per-node share of the total fused score

use crate::fusion::{fuse, FusionConfig, FusionItem, RankedList, GRAPH_SOURCE, LEXICAL_SOURCE};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use skein_core::context::StoreContext;
use skein_core::error::{ConfigError, Result};
use skein_core::types::{FragmentId, Node, NodeId, NodeType};
use skein_graph::expansion::{expand, ExpansionConfig};
use std::collections::{BTreeSet, HashMap, HashSet};
use tracing::{debug, instrument};

/// Retrieval limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Maximum fragments returned.
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    /// Maximum number of expansion seeds.
    #[serde(default = "default_seed_limit")]
    pub seed_limit: usize,
}

fn default_max_results() -> usize { 10 }
fn default_seed_limit() -> usize { 10 }

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            max_results: default_max_results(),
            seed_limit: default_seed_limit(),
        }
    }
}

/// Caller filters applied to lexical hits and expanded nodes alike.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RetrievalFilters {
    /// Allowed node types; `None` allows all.
    pub node_types: Option<BTreeSet<NodeType>>,
    pub exclude_ids: HashSet<NodeId>,
    pub updated_after: Option<DateTime<Utc>>,
    pub updated_before: Option<DateTime<Utc>>,
}

impl RetrievalFilters {
    /// Whether the filters need node records to decide.
    fn needs_node(&self) -> bool {
        self.node_types.is_some() || self.updated_after.is_some() || self.updated_before.is_some()
    }

    fn admits(&self, id: &NodeId, node: Option<&Node>) -> bool {
        if self.exclude_ids.contains(id) {
            return false;
        }
        let Some(node) = node else {
            return !self.needs_node();
        };
        if let Some(types) = &self.node_types {
            if !types.contains(&node.node_type) {
                return false;
            }
        }
        if self.updated_after.is_some_and(|after| node.updated_at < after) {
            return false;
        }
        if self.updated_before.is_some_and(|before| node.updated_at > before) {
            return false;
        }
        true
    }
}

/// Everything a single retrieval call can tune.
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievalOptions {
    pub max_results: usize,
    pub seed_limit: usize,
    pub expansion: ExpansionConfig,
    pub fusion: FusionConfig,
    pub filters: RetrievalFilters,
}

impl Default for RetrievalOptions {
    fn default() -> Self {
        Self::from_config(&RetrievalConfig::default(), &ExpansionConfig::default(), &FusionConfig::default())
    }
}

impl RetrievalOptions {
    pub fn from_config(retrieval: &RetrievalConfig, expansion: &ExpansionConfig, fusion: &FusionConfig) -> Self {
        Self {
            max_results: retrieval.max_results,
            seed_limit: retrieval.seed_limit,
            expansion: expansion.clone(),
            fusion: fusion.clone(),
            filters: RetrievalFilters::default(),
        }
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    pub fn with_depth(mut self, depth: usize) -> Self {
        self.expansion.max_depth = depth;
        self
    }

    pub fn with_budget(mut self, budget: usize) -> Self {
        self.expansion.budget = budget;
        self
    }

    pub fn with_expansion(mut self, expansion: ExpansionConfig) -> Self {
        self.expansion = expansion;
        self
    }

    pub fn with_fusion(mut self, fusion: FusionConfig) -> Self {
        self.fusion = fusion;
        self
    }

    pub fn with_node_types(mut self, types: &[NodeType]) -> Self {
        self.filters.node_types = Some(types.iter().copied().collect());
        self
    }

    pub fn excluding(mut self, id: impl Into<NodeId>) -> Self {
        self.filters.exclude_ids.insert(id.into());
        self
    }

    pub fn updated_between(mut self, after: Option<DateTime<Utc>>, before: Option<DateTime<Utc>>) -> Self {
        self.filters.updated_after = after;
        self.filters.updated_before = before;
        self
    }

    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        ConfigError::require_positive("max_results", self.max_results)?;
        ConfigError::require_positive("seed_limit", self.seed_limit)?;
        self.expansion.validate()?;
        self.fusion.validate()
    }
}

/// A fragment that survived fusion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedFragment {
    pub fragment_id: FragmentId,
    pub owner_node_id: NodeId,
    pub text: String,
    pub offset_start: Option<usize>,
    /// Fused score.
    pub score: f64,
    pub sources: BTreeSet<String>,
}

/// Joined text of one node's surviving fragments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextBlock {
    pub node_id: NodeId,
    pub title: String,
    pub node_type: Option<NodeType>,
    /// Fragment ids in document order.
    pub fragment_ids: Vec<FragmentId>,
    pub text: String,
}

/// A node's share of the total fused score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeProvenance {
    pub node_id: NodeId,
    pub contribution: f64,
    pub sources: BTreeSet<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalResult {
    pub query: String,
    /// Fragments in fused order.
    pub fragments: Vec<RetrievedFragment>,
    /// Blocks in fused order of their best fragment.
    pub blocks: Vec<ContextBlock>,
    pub provenance: Vec<NodeProvenance>,
    pub seeds: Vec<NodeId>,
}

impl RetrievalResult {
    /// Blocks as readable text, each under a title header.
    pub fn render(&self) -> String {
        self.blocks
            .iter()
            .map(|b| format!("## {} ({})\n\n{}", b.title, b.node_id, b.text))
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }
}

#[derive(Debug, Clone)]
struct Candidate {
    owner: NodeId,
    text: String,
    offset: Option<usize>,
}

/// Assembles retrieval context from the stores in a [`StoreContext`].
#[derive(Debug, Clone)]
pub struct ContextAssembler {
    ctx: StoreContext,
}

impl ContextAssembler {
    pub fn new(ctx: StoreContext) -> Self {
        Self { ctx }
    }

    /// Retrieve context for `query`.
    #[instrument(skip_all, fields(max_results = options.max_results))]
    pub async fn retrieve(&self, query: &str, options: &RetrievalOptions) -> Result<RetrievalResult> {
        options.validate()?;
        let filters = &options.filters;

        let hits = self.ctx.lexical.search_ranked(query, options.max_results * 2).await?;

        let mut owners: Vec<NodeId> = Vec::new();
        for hit in &hits {
            if !owners.contains(&hit.owner_node_id) {
                owners.push(hit.owner_node_id.clone());
            }
        }
        let mut nodes: HashMap<NodeId, Node> = self
            .ctx
            .graph
            .nodes_by_ids(&owners)
            .await?
            .into_iter()
            .map(|n| (n.id.clone(), n))
            .collect();

        let hits: Vec<_> = hits
            .into_iter()
            .filter(|h| filters.admits(&h.owner_node_id, nodes.get(&h.owner_node_id)))
            .collect();

        let mut candidates: HashMap<FragmentId, Candidate> = HashMap::new();
        let mut lexical_list = Vec::with_capacity(hits.len());
        let mut seed_scores: HashMap<NodeId, f64> = HashMap::new();
        for hit in &hits {
            let best = seed_scores.entry(hit.owner_node_id.clone()).or_insert(hit.score);
            if hit.score > *best {
                *best = hit.score;
            }
            candidates.entry(hit.fragment_id.clone()).or_insert_with(|| Candidate {
                owner: hit.owner_node_id.clone(),
                text: hit.text.clone(),
                offset: hit.offset_start,
            });
            lexical_list.push(hit.fragment_id.clone());
        }

        let mut seeds: Vec<(NodeId, f64)> = seed_scores.into_iter().collect();
        seeds.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        seeds.truncate(options.seed_limit);
        let seed_ids: HashSet<NodeId> = seeds.iter().map(|(id, _)| id.clone()).collect();

        let expanded = if seeds.is_empty() {
            Vec::new()
        } else {
            expand(self.ctx.graph.as_ref(), &seeds, &options.expansion).await?
        };

        let reached: Vec<NodeId> = expanded
            .into_iter()
            .filter(|r| r.depth >= 1 && !seed_ids.contains(&r.node_id))
            .map(|r| r.node_id)
            .collect();
        let unknown: Vec<NodeId> = reached.iter().filter(|id| !nodes.contains_key(*id)).cloned().collect();
        if !unknown.is_empty() {
            for node in self.ctx.graph.nodes_by_ids(&unknown).await? {
                nodes.insert(node.id.clone(), node);
            }
        }

        let mut graph_list = Vec::new();
        for node_id in reached.iter().filter(|id| filters.admits(id, nodes.get(*id))) {
            for fragment in self.ctx.fragments.fragments_for_node(node_id).await? {
                candidates.entry(fragment.fragment_id.clone()).or_insert_with(|| Candidate {
                    owner: node_id.clone(),
                    text: fragment.text.clone(),
                    offset: Some(fragment.offset_start),
                });
                graph_list.push(fragment.fragment_id);
            }
        }

        debug!(
            lexical = lexical_list.len(),
            seeds = seeds.len(),
            expanded = reached.len(),
            graph = graph_list.len(),
            "retrieval evidence gathered"
        );

        let mut fused = fuse(
            &[
                RankedList::new(LEXICAL_SOURCE, lexical_list).with_weight(options.fusion.lexical_weight),
                RankedList::new(GRAPH_SOURCE, graph_list).with_weight(options.fusion.graph_weight),
            ],
            options.fusion.k,
        );
        fused.truncate(options.max_results);

        let fragments: Vec<RetrievedFragment> = fused
            .into_iter()
            .filter_map(|item| {
                let FusionItem { id, score, sources, .. } = item;
                candidates.remove(&id).map(|c| RetrievedFragment {
                    fragment_id: id,
                    owner_node_id: c.owner,
                    text: c.text,
                    offset_start: c.offset,
                    score,
                    sources,
                })
            })
            .collect();

        let blocks = self.assemble_blocks(&fragments, &nodes).await?;
        let provenance = provenance(&fragments, &blocks);

        Ok(RetrievalResult {
            query: query.to_string(),
            fragments,
            blocks,
            provenance,
            seeds: seeds.into_iter().map(|(id, _)| id).collect(),
        })
    }

    async fn assemble_blocks(
        &self,
        fragments: &[RetrievedFragment],
        nodes: &HashMap<NodeId, Node>,
    ) -> Result<Vec<ContextBlock>> {
        let mut order: Vec<NodeId> = Vec::new();
        let mut groups: HashMap<NodeId, Vec<&RetrievedFragment>> = HashMap::new();
        for fragment in fragments {
            let group = groups.entry(fragment.owner_node_id.clone()).or_default();
            if group.is_empty() {
                order.push(fragment.owner_node_id.clone());
            }
            group.push(fragment);
        }

        let mut blocks = Vec::with_capacity(order.len());
        for node_id in order {
            let mut group = groups.remove(&node_id).unwrap_or_default();

            let mut offsets: HashMap<FragmentId, usize> = HashMap::new();
            if group.iter().any(|f| f.offset_start.is_none()) {
                for stored in self.ctx.fragments.fragments_for_node(&node_id).await? {
                    offsets.insert(stored.fragment_id, stored.offset_start);
                }
            }
            // Unresolvable offsets sort last, keeping fused order among themselves.
            group.sort_by_key(|f| {
                f.offset_start
                    .or_else(|| offsets.get(&f.fragment_id).copied())
                    .unwrap_or(usize::MAX)
            });

            let node = nodes.get(&node_id);
            blocks.push(ContextBlock {
                title: node.map_or_else(|| node_id.to_string(), |n| n.title.clone()),
                node_type: node.map(|n| n.node_type),
                fragment_ids: group.iter().map(|f| f.fragment_id.clone()).collect(),
                text: group.iter().map(|f| f.text.as_str()).collect::<Vec<_>>().join("\n\n"),
                node_id,
            });
        }
        Ok(blocks)
    }
}

fn provenance(fragments: &[RetrievedFragment], blocks: &[ContextBlock]) -> Vec<NodeProvenance> {
    let total: f64 = fragments.iter().map(|f| f.score).sum();
    blocks
        .iter()
        .map(|block| {
            let owned: Vec<&RetrievedFragment> =
                fragments.iter().filter(|f| f.owner_node_id == block.node_id).collect();
            let contribution = if total > 0.0 {
                owned.iter().map(|f| f.score).sum::<f64>() / total
            } else {
                owned.len() as f64 / fragments.len() as f64
            };
            NodeProvenance {
                node_id: block.node_id.clone(),
                contribution,
                sources: owned.iter().flat_map(|f| f.sources.iter().cloned()).collect(),
            }
        })
        .collect()
}
