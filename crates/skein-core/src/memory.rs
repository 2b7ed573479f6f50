//! In-memory graph store backed by petgraph.
//!
//! Nodes and edges live in a `StableDiGraph` arena with a HashMap index from
//! our [`NodeId`] to petgraph's internal index. Adjacency is returned in edge
//! insertion order so traversals over this store are deterministic.

use crate::attributes::EdgeAttributes;
use crate::error::{StoreError, StoreResult};
use crate::store::GraphStore;
use crate::types::*;
use async_trait::async_trait;
use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::collections::HashMap;

/// Petgraph-backed implementation of [`GraphStore`].
#[derive(Debug, Default)]
pub struct InMemoryGraph {
    graph: StableDiGraph<Node, Edge>,
    /// Map from our NodeId to petgraph's internal index.
    node_index: HashMap<NodeId, NodeIndex>,
}

impl InMemoryGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node. Ids must be unique.
    pub fn add_node(&mut self, node: Node) -> StoreResult<()> {
        if self.node_index.contains_key(&node.id) {
            return Err(StoreError::DuplicateNode(node.id));
        }
        let id = node.id.clone();
        let idx = self.graph.add_node(node);
        self.node_index.insert(id, idx);
        Ok(())
    }

    /// Add an edge after checking referential integrity, strength range and
    /// attribute/type agreement.
    pub fn add_edge(&mut self, edge: Edge) -> StoreResult<EdgeId> {
        if let Some(s) = edge.strength {
            if !(0.0..=1.0).contains(&s) {
                return Err(StoreError::InvalidStrength(s));
            }
        }
        edge.attributes.validate_for(edge.edge_type)?;

        let Some(&from_idx) = self.node_index.get(&edge.source) else {
            return Err(StoreError::MissingNode(edge.source));
        };
        let Some(&to_idx) = self.node_index.get(&edge.target) else {
            return Err(StoreError::MissingNode(edge.target));
        };

        let id = edge.id;
        self.graph.add_edge(from_idx, to_idx, edge);
        Ok(id)
    }

    /// Add an edge whose attributes arrive as an untyped JSON bag.
    pub fn add_edge_with_raw_attributes(
        &mut self,
        edge: Edge,
        raw: &serde_json::Value,
    ) -> StoreResult<EdgeId> {
        let attributes = EdgeAttributes::from_raw(edge.edge_type, raw)?;
        self.add_edge(edge.with_attributes(attributes))
    }

    /// Shorthand for an explicit, full-strength edge.
    pub fn link(&mut self, from: &str, to: &str, edge_type: EdgeType) -> StoreResult<EdgeId> {
        self.add_edge(Edge::new(from, to, edge_type))
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    fn edges_directed(
        &self,
        node: &NodeId,
        direction: Direction,
        edge_types: Option<&EdgeTypeSet>,
    ) -> Vec<Edge> {
        let Some(&idx) = self.node_index.get(node) else {
            return Vec::new();
        };

        let mut refs: Vec<_> = self
            .graph
            .edges_directed(idx, direction)
            .filter(|e| edge_types.map_or(true, |set| set.contains(e.weight().edge_type)))
            .collect();
        // petgraph walks adjacency newest-first; restore insertion order.
        refs.sort_by_key(|e| e.id());
        refs.into_iter().map(|e| e.weight().clone()).collect()
    }
}

#[async_trait]
impl GraphStore for InMemoryGraph {
    async fn outgoing_edges(&self, node: &NodeId, edge_types: Option<&EdgeTypeSet>) -> StoreResult<Vec<Edge>> {
        Ok(self.edges_directed(node, Direction::Outgoing, edge_types))
    }

    async fn incoming_edges(&self, node: &NodeId, edge_types: Option<&EdgeTypeSet>) -> StoreResult<Vec<Edge>> {
        Ok(self.edges_directed(node, Direction::Incoming, edge_types))
    }

    async fn all_edges(&self, edge_types: Option<&EdgeTypeSet>) -> StoreResult<Vec<Edge>> {
        Ok(self
            .graph
            .edge_indices()
            .filter_map(|idx| self.graph.edge_weight(idx))
            .filter(|e| edge_types.map_or(true, |set| set.contains(e.edge_type)))
            .cloned()
            .collect())
    }

    async fn node_by_id(&self, id: &NodeId) -> StoreResult<Option<Node>> {
        Ok(self
            .node_index
            .get(id)
            .and_then(|idx| self.graph.node_weight(*idx))
            .cloned())
    }

    async fn nodes_by_ids(&self, ids: &[NodeId]) -> StoreResult<Vec<Node>> {
        Ok(ids
            .iter()
            .filter_map(|id| self.node_index.get(id))
            .filter_map(|idx| self.graph.node_weight(*idx))
            .cloned()
            .collect())
    }
}
