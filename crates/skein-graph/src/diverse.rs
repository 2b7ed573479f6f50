//! K shortest diverse paths.
//!
//! Path #1 comes from a bidirectional BFS. Further candidates are produced
//! Yen-style: for every accepted path and every spur position, the root
//! prefix is kept, the edges accepted paths take out of that same root are
//! forbidden, the root's other nodes are forbidden, and a fresh BFS runs from
//! the spur node to the destination. Candidates are accepted cheapest first
//! if they are simple, within the extra-hop allowance, and diverse enough
//! from every accepted path.

use crate::adjacency::AdjacencyIndex;
use serde::{Deserialize, Serialize};
use skein_core::error::{ConfigError, Result};
use skein_core::store::GraphStore;
use skein_core::types::{EdgeType, EdgeTypeSet, NodeId};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::fmt;
use tracing::{debug, instrument};

/// Penalty for edge types without a dedicated entry.
pub const DEFAULT_EDGE_PENALTY: f64 = 0.3;

/// Options for [`k_shortest_paths`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathOptions {
    /// Number of paths wanted.
    #[serde(default = "default_k")]
    pub k: usize,
    /// Maximum hop count of any path.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
    /// Hops a path may exceed the shortest path by.
    #[serde(default = "default_max_extra_hops")]
    pub max_extra_hops: usize,
    /// Maximum Jaccard node overlap with any accepted path.
    #[serde(default = "default_overlap_threshold")]
    pub overlap_threshold: f64,
    #[serde(default)]
    pub edge_types: EdgeTypeSet,
    /// Size of the candidate pool; the worst candidates beyond it are dropped.
    #[serde(default = "default_candidate_cap")]
    pub candidate_cap: usize,
}

fn default_k() -> usize { 3 }
fn default_max_depth() -> usize { 6 }
fn default_max_extra_hops() -> usize { 2 }
fn default_overlap_threshold() -> f64 { 0.7 }
fn default_candidate_cap() -> usize { 100 }

impl Default for PathOptions {
    fn default() -> Self {
        Self {
            k: default_k(),
            max_depth: default_max_depth(),
            max_extra_hops: default_max_extra_hops(),
            overlap_threshold: default_overlap_threshold(),
            edge_types: EdgeTypeSet::all(),
            candidate_cap: default_candidate_cap(),
        }
    }
}

impl PathOptions {
    pub fn with_k(mut self, k: usize) -> Self {
        self.k = k;
        self
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn with_max_extra_hops(mut self, extra: usize) -> Self {
        self.max_extra_hops = extra;
        self
    }

    pub fn with_overlap_threshold(mut self, threshold: f64) -> Self {
        self.overlap_threshold = threshold;
        self
    }

    pub fn with_edge_types(mut self, edge_types: EdgeTypeSet) -> Self {
        self.edge_types = edge_types;
        self
    }

    pub fn with_candidate_cap(mut self, cap: usize) -> Self {
        self.candidate_cap = cap;
        self
    }

    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        ConfigError::require_positive("k", self.k)?;
        ConfigError::require_positive("max_depth", self.max_depth)?;
        ConfigError::require_positive("candidate_cap", self.candidate_cap)?;
        if !(0.0..=1.0).contains(&self.overlap_threshold) {
            return Err(ConfigError::OutOfRange {
                field: "overlap_threshold",
                value: self.overlap_threshold,
                expected: "[0, 1]",
            });
        }
        if self.edge_types.is_empty() {
            return Err(ConfigError::EmptyEdgeTypes);
        }
        Ok(())
    }
}

/// A simple path with its per-hop edge types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathResult {
    pub nodes: Vec<NodeId>,
    /// `edges[i]` is the type of the edge `nodes[i] -> nodes[i + 1]`.
    pub edges: Vec<EdgeType>,
    pub hop_count: usize,
    /// Hop count plus edge-type penalties; lower is better.
    pub score: f64,
}

impl PathResult {
    pub fn new(nodes: Vec<NodeId>, edges: Vec<EdgeType>) -> Self {
        let score = score_path(&edges);
        Self {
            hop_count: edges.len(),
            nodes,
            edges,
            score,
        }
    }

    /// No node appears twice.
    pub fn is_simple(&self) -> bool {
        let mut seen = HashSet::with_capacity(self.nodes.len());
        self.nodes.iter().all(|n| seen.insert(n))
    }
}

/// Why a path search stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchReason {
    /// `k` paths were accepted.
    FoundAll,
    /// No further distinct candidates exist.
    ExhaustedCandidates,
    /// Candidates existed but overlapped too much with accepted paths.
    DiversityFilter,
    /// The endpoints are not connected within the depth bound.
    NoPath,
}

impl SearchReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchReason::FoundAll => "found_all",
            SearchReason::ExhaustedCandidates => "exhausted_candidates",
            SearchReason::DiversityFilter => "diversity_filter",
            SearchReason::NoPath => "no_path",
        }
    }

    /// User-facing explanation.
    pub fn describe(&self) -> &'static str {
        match self {
            SearchReason::FoundAll => "all requested paths found",
            SearchReason::ExhaustedCandidates => "no more distinct paths exist within the hop limits",
            SearchReason::DiversityFilter => {
                "remaining paths overlap too much with those found; raise the overlap threshold or extra-hop allowance"
            }
            SearchReason::NoPath => "no path connects these nodes within the depth limit",
        }
    }
}

impl fmt::Display for SearchReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of [`k_shortest_paths`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathSearch {
    pub paths: Vec<PathResult>,
    pub reason: SearchReason,
}

/// Traversal penalty per edge type.
pub fn edge_penalty(edge_type: EdgeType) -> f64 {
    match edge_type {
        EdgeType::ExplicitLink => 0.0,
        EdgeType::Sequence => 0.1,
        EdgeType::Causes => 0.2,
        EdgeType::Semantic => 0.3,
        EdgeType::Hierarchy | EdgeType::SemanticSuggestion | EdgeType::Mention | EdgeType::Alias => {
            DEFAULT_EDGE_PENALTY
        }
    }
}

/// Hop count plus the summed penalty of every traversed edge.
pub fn score_path(edges: &[EdgeType]) -> f64 {
    edges.len() as f64 + edges.iter().map(|t| edge_penalty(*t)).sum::<f64>()
}

/// Lower score first, then lexicographic node sequence.
pub fn compare_paths(a: &PathResult, b: &PathResult) -> Ordering {
    a.score.total_cmp(&b.score).then_with(|| a.nodes.cmp(&b.nodes))
}

/// Jaccard overlap of two paths' node sets.
///
/// When both paths have four or fewer nodes the endpoints count; otherwise
/// only interior nodes are compared, so routes sharing nothing but their
/// start and end are not penalised.
pub fn path_overlap(a: &[NodeId], b: &[NodeId]) -> f64 {
    let include_endpoints = a.len() <= 4 && b.len() <= 4;
    let node_set = |p: &[NodeId]| -> HashSet<NodeId> {
        if include_endpoints || p.len() < 2 {
            p.iter().cloned().collect()
        } else {
            p[1..p.len() - 1].iter().cloned().collect()
        }
    };
    let sa = node_set(a);
    let sb = node_set(b);
    let union = sa.union(&sb).count();
    if union == 0 {
        return 0.0;
    }
    sa.intersection(&sb).count() as f64 / union as f64
}

/// Nodes and directed edges a spur search may not use.
#[derive(Debug, Default, Clone)]
pub struct Exclusions {
    nodes: HashSet<NodeId>,
    edges: HashMap<NodeId, HashSet<NodeId>>,
}

impl Exclusions {
    pub fn exclude_node(&mut self, node: NodeId) {
        self.nodes.insert(node);
    }

    pub fn exclude_edge(&mut self, from: NodeId, to: NodeId) {
        self.edges.entry(from).or_default().insert(to);
    }

    fn blocks_node(&self, node: &NodeId) -> bool {
        self.nodes.contains(node)
    }

    fn blocks_edge(&self, from: &NodeId, to: &NodeId) -> bool {
        self.edges.get(from).is_some_and(|targets| targets.contains(to))
    }
}

#[derive(Debug)]
struct Visit {
    depth: usize,
    /// Forward side: (predecessor, edge type). Backward side: (successor, edge type).
    link: Option<(NodeId, EdgeType)>,
}

#[derive(Debug)]
struct Side {
    visited: HashMap<NodeId, Visit>,
    frontier: Vec<NodeId>,
    depth: usize,
}

impl Side {
    fn rooted_at(node: &NodeId) -> Self {
        let mut visited = HashMap::new();
        visited.insert(node.clone(), Visit { depth: 0, link: None });
        Self {
            visited,
            frontier: vec![node.clone()],
            depth: 0,
        }
    }

    /// Expand one full level. Returns the meeting node with the smallest
    /// combined depth, if this level touched the other side.
    fn expand_level(
        &mut self,
        other: &Side,
        index: &AdjacencyIndex,
        exclusions: &Exclusions,
        forward: bool,
    ) -> Option<NodeId> {
        self.depth += 1;
        let frontier = std::mem::take(&mut self.frontier);
        let mut next = Vec::new();
        let mut meeting: Option<(usize, NodeId)> = None;

        for node in &frontier {
            let neighbors = if forward {
                index.successors(node)
            } else {
                index.predecessors(node)
            };
            for (neighbor, edge_type) in neighbors {
                let (edge_from, edge_to) = if forward { (node, neighbor) } else { (neighbor, node) };
                if exclusions.blocks_node(neighbor) || exclusions.blocks_edge(edge_from, edge_to) {
                    continue;
                }
                if self.visited.contains_key(neighbor) {
                    continue;
                }
                self.visited.insert(
                    neighbor.clone(),
                    Visit {
                        depth: self.depth,
                        link: Some((node.clone(), *edge_type)),
                    },
                );
                if let Some(theirs) = other.visited.get(neighbor) {
                    let total = self.depth + theirs.depth;
                    if meeting.as_ref().map_or(true, |(best, _)| total < *best) {
                        meeting = Some((total, neighbor.clone()));
                    }
                }
                next.push(neighbor.clone());
            }
        }

        self.frontier = next;
        meeting.map(|(_, node)| node)
    }
}

/// Bidirectional BFS from `from` to `to` under `exclusions`, with at most
/// `max_depth` hops in total.
///
/// The smaller frontier is expanded first (forward on ties).
pub fn bidirectional_bfs(
    index: &AdjacencyIndex,
    from: &NodeId,
    to: &NodeId,
    exclusions: &Exclusions,
    max_depth: usize,
) -> Option<PathResult> {
    if exclusions.blocks_node(from) || exclusions.blocks_node(to) {
        return None;
    }
    if from == to {
        return Some(PathResult::new(vec![from.clone()], Vec::new()));
    }

    let mut forward = Side::rooted_at(from);
    let mut backward = Side::rooted_at(to);

    while !forward.frontier.is_empty()
        && !backward.frontier.is_empty()
        && forward.depth + backward.depth < max_depth
    {
        let meeting = if forward.frontier.len() <= backward.frontier.len() {
            forward.expand_level(&backward, index, exclusions, true)
        } else {
            backward.expand_level(&forward, index, exclusions, false)
        };
        if let Some(meet) = meeting {
            return Some(join_at(&forward, &backward, &meet));
        }
    }
    None
}

fn join_at(forward: &Side, backward: &Side, meet: &NodeId) -> PathResult {
    let mut nodes = vec![meet.clone()];
    let mut edges = Vec::new();

    let mut current = meet;
    while let Some(Visit { link: Some((prev, edge_type)), .. }) = forward.visited.get(current) {
        nodes.push(prev.clone());
        edges.push(*edge_type);
        current = prev;
    }
    nodes.reverse();
    edges.reverse();

    let mut current = meet;
    while let Some(Visit { link: Some((next, edge_type)), .. }) = backward.visited.get(current) {
        nodes.push(next.clone());
        edges.push(*edge_type);
        current = next;
    }

    PathResult::new(nodes, edges)
}

enum Verdict {
    Accept,
    NotSimple,
    TooLong,
    TooSimilar,
}

fn judge(candidate: &PathResult, accepted: &[PathResult], hop_limit: usize, threshold: f64) -> Verdict {
    if !candidate.is_simple() {
        return Verdict::NotSimple;
    }
    if candidate.hop_count > hop_limit {
        return Verdict::TooLong;
    }
    if accepted
        .iter()
        .any(|p| path_overlap(&p.nodes, &candidate.nodes) > threshold)
    {
        return Verdict::TooSimilar;
    }
    Verdict::Accept
}

/// Spur candidates derived from `accepted[which]`.
fn spur_candidates(
    index: &AdjacencyIndex,
    accepted: &[PathResult],
    which: usize,
    to: &NodeId,
    depth_limit: usize,
) -> Vec<PathResult> {
    let path = &accepted[which];
    let mut out = Vec::new();

    for i in 0..path.nodes.len().saturating_sub(1) {
        // The root already spends i hops.
        let budget = depth_limit.saturating_sub(i);
        if budget == 0 {
            break;
        }
        let root = &path.nodes[..=i];
        let spur = &path.nodes[i];

        let mut exclusions = Exclusions::default();
        for other in accepted {
            if other.nodes.len() > i + 1 && other.nodes[..=i] == *root {
                exclusions.exclude_edge(other.nodes[i].clone(), other.nodes[i + 1].clone());
            }
        }
        for node in &root[..i] {
            exclusions.exclude_node(node.clone());
        }

        if let Some(tail) = bidirectional_bfs(index, spur, to, &exclusions, budget) {
            let mut nodes = root[..i].to_vec();
            nodes.extend(tail.nodes);
            let mut edges = path.edges[..i].to_vec();
            edges.extend(tail.edges);
            out.push(PathResult::new(nodes, edges));
        }
    }
    out
}

/// Run the diverse path search over a prebuilt adjacency index.
pub fn k_shortest_paths_in(
    index: &AdjacencyIndex,
    from: &NodeId,
    to: &NodeId,
    options: &PathOptions,
) -> PathSearch {
    let Some(first) = bidirectional_bfs(index, from, to, &Exclusions::default(), options.max_depth) else {
        return PathSearch {
            paths: Vec::new(),
            reason: SearchReason::NoPath,
        };
    };

    let hop_limit = first.hop_count + options.max_extra_hops;
    let depth_limit = options.max_depth.min(hop_limit);

    let mut seen: HashSet<Vec<NodeId>> = HashSet::new();
    seen.insert(first.nodes.clone());
    let mut accepted = vec![first];
    let mut candidates: Vec<PathResult> = Vec::new();
    let mut expanded = 0;
    let mut too_similar = 0usize;

    while accepted.len() < options.k {
        while expanded < accepted.len() {
            for candidate in spur_candidates(index, &accepted, expanded, to, depth_limit) {
                if seen.insert(candidate.nodes.clone()) {
                    candidates.push(candidate);
                }
            }
            expanded += 1;
        }

        if candidates.is_empty() {
            let reason = if too_similar > 0 {
                SearchReason::DiversityFilter
            } else {
                SearchReason::ExhaustedCandidates
            };
            debug!(accepted = accepted.len(), too_similar, %reason, "candidate pool empty");
            return PathSearch {
                paths: accepted,
                reason,
            };
        }

        candidates.sort_by(compare_paths);
        if candidates.len() > options.candidate_cap {
            candidates.truncate(options.candidate_cap);
        }

        let candidate = candidates.remove(0);
        match judge(&candidate, &accepted, hop_limit, options.overlap_threshold) {
            Verdict::Accept => accepted.push(candidate),
            Verdict::TooSimilar => too_similar += 1,
            Verdict::NotSimple | Verdict::TooLong => {}
        }
    }

    PathSearch {
        paths: accepted,
        reason: SearchReason::FoundAll,
    }
}

/// Up to `options.k` short, mutually diverse paths from `from` to `to`.
#[instrument(skip_all, fields(from = %from, to = %to, k = options.k))]
pub async fn k_shortest_paths(
    store: &dyn GraphStore,
    from: &NodeId,
    to: &NodeId,
    options: &PathOptions,
) -> Result<PathSearch> {
    options.validate()?;
    let index = AdjacencyIndex::load(store, &options.edge_types).await?;
    let search = k_shortest_paths_in(&index, from, to, options);
    debug!(
        edges = index.edge_count(),
        returned = search.paths.len(),
        reason = %search.reason,
        "path search done"
    );
    Ok(search)
}
