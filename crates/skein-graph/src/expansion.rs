//! Bounded expansion: spreads relevance outward from seed nodes.
//!
//! Starting from scored seeds, each traversal step d multiplies the parent's
//! score by the edge weight and `decay^d`. A node keeps only its best score;
//! it joins the next frontier the first time it is discovered, whatever later
//! updates do to its score. Within a level, parents propagate the score and
//! path they held when the level started. Expansion stops at `max_depth`, on an empty
//! frontier, or once `budget` distinct nodes have been visited.

use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use skein_core::error::{ConfigError, Result, StoreResult};
use skein_core::store::GraphStore;
use skein_core::types::{Edge, EdgeTypeSet, NodeId};
use std::collections::HashMap;
use tracing::{debug, instrument};

/// Configuration for [`expand`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpansionConfig {
    /// Maximum number of traversal steps from the seeds.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
    /// Maximum number of distinct nodes visited, seeds included.
    #[serde(default = "default_budget")]
    pub budget: usize,
    /// Edge types that may be traversed.
    #[serde(default)]
    pub edge_types: EdgeTypeSet,
    /// Per-depth attenuation in (0, 1].
    #[serde(default = "default_decay")]
    pub decay: f64,
    /// Also follow edges against their direction.
    #[serde(default = "default_include_incoming")]
    pub include_incoming: bool,
}

fn default_max_depth() -> usize { 2 }
fn default_budget() -> usize { 50 }
fn default_decay() -> f64 { 0.7 }
fn default_include_incoming() -> bool { true }

impl Default for ExpansionConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            budget: default_budget(),
            edge_types: EdgeTypeSet::all(),
            decay: default_decay(),
            include_incoming: default_include_incoming(),
        }
    }
}

impl ExpansionConfig {
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn with_budget(mut self, budget: usize) -> Self {
        self.budget = budget;
        self
    }

    pub fn with_edge_types(mut self, edge_types: EdgeTypeSet) -> Self {
        self.edge_types = edge_types;
        self
    }

    pub fn with_decay(mut self, decay: f64) -> Self {
        self.decay = decay;
        self
    }

    pub fn outgoing_only(mut self) -> Self {
        self.include_incoming = false;
        self
    }

    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        ConfigError::require_positive("max_depth", self.max_depth)?;
        ConfigError::require_positive("budget", self.budget)?;
        if !(self.decay > 0.0 && self.decay <= 1.0) {
            return Err(ConfigError::OutOfRange {
                field: "decay",
                value: self.decay,
                expected: "(0, 1]",
            });
        }
        if self.edge_types.is_empty() {
            return Err(ConfigError::EmptyEdgeTypes);
        }
        Ok(())
    }
}

/// A node reached by expansion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpansionResult {
    pub node_id: NodeId,
    /// Depth at which the current best score was set (0 for seeds).
    pub depth: usize,
    /// Depth at which the node was first discovered.
    pub discovered_depth: usize,
    pub score: f64,
    /// Node ids from a seed to this node, inclusive.
    pub path: Vec<NodeId>,
}

#[derive(Debug)]
struct Best {
    score: f64,
    depth: usize,
    discovered_depth: usize,
    path: Vec<NodeId>,
}

/// Expand from `seeds` and return every visited node, highest score first.
///
/// Duplicate seeds keep their highest initial score. Ties in score keep the
/// earliest-seen path and are returned in discovery order.
#[instrument(skip_all, fields(seeds = seeds.len(), max_depth = config.max_depth, budget = config.budget))]
pub async fn expand(
    store: &dyn GraphStore,
    seeds: &[(NodeId, f64)],
    config: &ExpansionConfig,
) -> Result<Vec<ExpansionResult>> {
    config.validate()?;

    let mut best: HashMap<NodeId, Best> = HashMap::new();
    let mut order: Vec<NodeId> = Vec::new();
    let mut frontier: Vec<NodeId> = Vec::new();

    for (id, score) in seeds {
        if let Some(entry) = best.get_mut(id) {
            if *score > entry.score {
                entry.score = *score;
            }
            continue;
        }
        if best.len() >= config.budget {
            break;
        }
        best.insert(
            id.clone(),
            Best {
                score: *score,
                depth: 0,
                discovered_depth: 0,
                path: vec![id.clone()],
            },
        );
        order.push(id.clone());
        frontier.push(id.clone());
    }

    'levels: for depth in 1..=config.max_depth {
        if frontier.is_empty() || best.len() >= config.budget {
            break;
        }

        let attenuation = config.decay.powi(depth as i32);
        let adjacency = fetch_level(store, &frontier, config).await?;
        let mut next = Vec::new();

        // Updates made during this level must not leak into its own parents.
        let parents: Vec<Option<(f64, Vec<NodeId>)>> = frontier
            .iter()
            .map(|node| best.get(node).map(|b| (b.score, b.path.clone())))
            .collect();

        for ((node, edges), parent) in frontier.iter().zip(adjacency).zip(parents) {
            let Some((parent_score, parent_path)) = parent else {
                continue;
            };

            for edge in &edges {
                let neighbor = edge.other_end(node);
                let candidate = parent_score * edge.weight() * attenuation;

                if let Some(entry) = best.get_mut(neighbor) {
                    if candidate > entry.score {
                        entry.score = candidate;
                        entry.depth = depth;
                        entry.path = extend_path(&parent_path, neighbor);
                    }
                    continue;
                }

                best.insert(
                    neighbor.clone(),
                    Best {
                        score: candidate,
                        depth,
                        discovered_depth: depth,
                        path: extend_path(&parent_path, neighbor),
                    },
                );
                order.push(neighbor.clone());
                next.push(neighbor.clone());

                if best.len() >= config.budget {
                    debug!(depth, visited = best.len(), "expansion budget reached");
                    break 'levels;
                }
            }
        }

        debug!(depth, discovered = next.len(), visited = best.len(), "expansion level done");
        frontier = next;
    }

    let mut results: Vec<ExpansionResult> = order
        .into_iter()
        .filter_map(|id| {
            best.remove(&id).map(|b| ExpansionResult {
                node_id: id,
                depth: b.depth,
                discovered_depth: b.discovered_depth,
                score: b.score,
                path: b.path,
            })
        })
        .collect();

    // Stable: equal scores stay in discovery order.
    results.sort_by(|a, b| b.score.total_cmp(&a.score));
    Ok(results)
}

fn extend_path(parent: &[NodeId], next: &NodeId) -> Vec<NodeId> {
    let mut path = Vec::with_capacity(parent.len() + 1);
    path.extend_from_slice(parent);
    path.push(next.clone());
    path
}

/// Fetch adjacency for a whole frontier concurrently; results come back in
/// frontier order.
async fn fetch_level(
    store: &dyn GraphStore,
    frontier: &[NodeId],
    config: &ExpansionConfig,
) -> StoreResult<Vec<Vec<Edge>>> {
    try_join_all(frontier.iter().map(|node| neighbor_edges(store, node, config))).await
}

async fn neighbor_edges(
    store: &dyn GraphStore,
    node: &NodeId,
    config: &ExpansionConfig,
) -> StoreResult<Vec<Edge>> {
    let mut edges = store.outgoing_edges(node, Some(&config.edge_types)).await?;
    if config.include_incoming {
        edges.extend(store.incoming_edges(node, Some(&config.edge_types)).await?);
    }
    Ok(edges)
}

#[cfg(test)]
mod tests {
    use super::*;
    use skein_core::prelude::*;

    fn chain() -> InMemoryGraph {
        let mut graph = InMemoryGraph::new();
        for id in ["a", "b", "c", "d"] {
            graph.add_node(Node::new(id, NodeType::Note, id, id)).unwrap();
        }
        graph.link("a", "b", EdgeType::ExplicitLink).unwrap();
        graph.link("b", "c", EdgeType::ExplicitLink).unwrap();
        graph.link("c", "d", EdgeType::ExplicitLink).unwrap();
        graph
    }

    fn seed(id: &str, score: f64) -> (NodeId, f64) {
        (NodeId::from(id), score)
    }

    #[tokio::test]
    async fn scores_decay_per_depth() {
        let graph = chain();
        let config = ExpansionConfig::default().with_max_depth(3).with_decay(0.5);
        let results = expand(&graph, &[seed("a", 1.0)], &config).await.unwrap();

        let scores: Vec<(&str, f64)> = results.iter().map(|r| (r.node_id.as_str(), r.score)).collect();
        // depth 1: 0.5, depth 2: 0.5 * 0.25, depth 3: 0.125 * 0.125
        assert_eq!(scores[0], ("a", 1.0));
        assert_eq!(scores[1], ("b", 0.5));
        assert_eq!(scores[2], ("c", 0.125));
        assert_eq!(scores[3], ("d", 0.015625));
        assert_eq!(results[3].path.len(), 4);
    }

    #[tokio::test]
    async fn empty_seeds_return_empty() {
        let graph = chain();
        let results = expand(&graph, &[], &ExpansionConfig::default()).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn budget_caps_visited_nodes() {
        let graph = chain();
        let config = ExpansionConfig::default().with_max_depth(5).with_budget(2);
        let results = expand(&graph, &[seed("a", 1.0)], &config).await.unwrap();
        assert_eq!(results.len(), 2);
    }

    #[tokio::test]
    async fn incoming_edges_followed_only_when_enabled() {
        let graph = chain();
        let both = expand(&graph, &[seed("c", 1.0)], &ExpansionConfig::default()).await.unwrap();
        assert!(both.iter().any(|r| r.node_id.as_str() == "a"));

        let forward = expand(&graph, &[seed("c", 1.0)], &ExpansionConfig::default().outgoing_only())
            .await
            .unwrap();
        let ids: Vec<&str> = forward.iter().map(|r| r.node_id.as_str()).collect();
        assert_eq!(ids, vec!["c", "d"]);
    }

    #[tokio::test]
    async fn weighted_edges_scale_scores() {
        let mut graph = InMemoryGraph::new();
        for id in ["a", "b"] {
            graph.add_node(Node::new(id, NodeType::Note, id, id)).unwrap();
        }
        graph
            .add_edge(Edge::new("a", "b", EdgeType::Semantic).with_strength(0.5))
            .unwrap();
        let config = ExpansionConfig::default().with_decay(1.0);
        let results = expand(&graph, &[seed("a", 2.0)], &config).await.unwrap();
        assert_eq!(results[1].score, 1.0);
    }

    #[tokio::test]
    async fn best_score_depth_can_differ_from_discovery_depth() {
        // a -> x is weak; a -> b -> x is strong enough to win at depth 2.
        let mut graph = InMemoryGraph::new();
        for id in ["a", "b", "x"] {
            graph.add_node(Node::new(id, NodeType::Note, id, id)).unwrap();
        }
        graph
            .add_edge(Edge::new("a", "x", EdgeType::Mention).with_strength(0.1))
            .unwrap();
        graph.link("a", "b", EdgeType::ExplicitLink).unwrap();
        graph.link("b", "x", EdgeType::ExplicitLink).unwrap();

        let config = ExpansionConfig::default().with_decay(0.9).outgoing_only();
        let results = expand(&graph, &[seed("a", 1.0)], &config).await.unwrap();
        let x = results.iter().find(|r| r.node_id.as_str() == "x").unwrap();
        assert_eq!(x.discovered_depth, 1);
        assert_eq!(x.depth, 2);
        assert!((x.score - 0.9 * 0.81).abs() < 1e-12);
        let path: Vec<&str> = x.path.iter().map(|n| n.as_str()).collect();
        assert_eq!(path, vec!["a", "b", "x"]);
    }

    fn by_node(results: &[ExpansionResult]) -> Vec<(String, usize, f64, Vec<String>)> {
        let mut rows: Vec<_> = results
            .iter()
            .map(|r| {
                let path = r.path.iter().map(|n| n.as_str().to_string()).collect();
                (r.node_id.as_str().to_string(), r.depth, r.score, path)
            })
            .collect();
        rows.sort_by(|a, b| a.0.cmp(&b.0));
        rows
    }

    #[tokio::test]
    async fn linked_seeds_propagate_their_level_start_state() {
        // s1 raises s2 at depth 1; s2 still passes its seed score and path to x.
        let mut graph = InMemoryGraph::new();
        for id in ["s1", "s2", "x"] {
            graph.add_node(Node::new(id, NodeType::Note, id, id)).unwrap();
        }
        graph.link("s1", "s2", EdgeType::ExplicitLink).unwrap();
        graph.link("s2", "x", EdgeType::ExplicitLink).unwrap();

        let config = ExpansionConfig::default().with_max_depth(1).with_decay(0.9).outgoing_only();
        let forward = expand(&graph, &[seed("s1", 1.0), seed("s2", 0.1)], &config).await.unwrap();
        let reversed = expand(&graph, &[seed("s2", 0.1), seed("s1", 1.0)], &config).await.unwrap();

        for r in &forward {
            assert_eq!(r.path.len() - 1, r.depth, "{}", r.node_id);
            assert!(r.depth <= config.max_depth);
        }
        let x = forward.iter().find(|r| r.node_id.as_str() == "x").unwrap();
        assert!((x.score - 0.09).abs() < 1e-12);
        assert_eq!(x.depth, 1);
        assert_eq!(x.path, vec![NodeId::from("s2"), NodeId::from("x")]);

        let s2 = forward.iter().find(|r| r.node_id.as_str() == "s2").unwrap();
        assert!((s2.score - 0.9).abs() < 1e-12);
        assert_eq!(s2.path, vec![NodeId::from("s1"), NodeId::from("s2")]);

        assert_eq!(by_node(&forward), by_node(&reversed));
    }

    #[tokio::test]
    async fn equal_scores_keep_the_earliest_seen_path() {
        let config = ExpansionConfig::default().outgoing_only();
        for into_x in [["b", "c"], ["c", "b"]] {
            let mut graph = InMemoryGraph::new();
            for id in ["a", "b", "c", "x"] {
                graph.add_node(Node::new(id, NodeType::Note, id, id)).unwrap();
            }
            graph.link("a", "b", EdgeType::ExplicitLink).unwrap();
            graph.link("a", "c", EdgeType::ExplicitLink).unwrap();
            for from in into_x {
                graph.link(from, "x", EdgeType::ExplicitLink).unwrap();
            }

            let results = expand(&graph, &[seed("a", 1.0)], &config).await.unwrap();
            let x = results.iter().find(|r| r.node_id.as_str() == "x").unwrap();
            let path: Vec<&str> = x.path.iter().map(|n| n.as_str()).collect();
            assert_eq!(path, vec!["a", "b", "x"], "edges into x: {:?}", into_x);
            assert!((x.score - 0.7 * 0.49).abs() < 1e-12);
        }
    }

    #[tokio::test]
    async fn self_loops_are_harmless() {
        let mut graph = chain();
        graph.link("a", "a", EdgeType::ExplicitLink).unwrap();
        let results = expand(&graph, &[seed("a", 1.0)], &ExpansionConfig::default()).await.unwrap();
        assert_eq!(results[0].node_id.as_str(), "a");
        assert_eq!(results[0].score, 1.0);
    }

    #[tokio::test]
    async fn invalid_config_is_rejected_before_traversal() {
        let graph = chain();
        let config = ExpansionConfig::default().with_budget(0);
        let err = expand(&graph, &[seed("a", 1.0)], &config).await.unwrap_err();
        assert!(matches!(err, SkeinError::Config(ConfigError::NonPositive { field: "budget" })));

        let config = ExpansionConfig::default().with_decay(0.0);
        assert!(expand(&graph, &[seed("a", 1.0)], &config).await.is_err());

        let config = ExpansionConfig::default().with_edge_types(EdgeTypeSet::empty());
        assert!(expand(&graph, &[seed("a", 1.0)], &config).await.is_err());
    }
}
