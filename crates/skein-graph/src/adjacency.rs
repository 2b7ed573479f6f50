//! Forward/backward adjacency built once per path search.

use skein_core::error::StoreResult;
use skein_core::store::GraphStore;
use skein_core::types::{Edge, EdgeType, EdgeTypeSet, NodeId};
use std::collections::HashMap;

/// Adjacency lists keyed by node id, in edge order.
#[derive(Debug, Default, Clone)]
pub struct AdjacencyIndex {
    forward: HashMap<NodeId, Vec<(NodeId, EdgeType)>>,
    backward: HashMap<NodeId, Vec<(NodeId, EdgeType)>>,
    edge_count: usize,
}

impl AdjacencyIndex {
    /// Index `edges`, keeping only the allowed types.
    pub fn from_edges<'a>(edges: impl IntoIterator<Item = &'a Edge>, edge_types: &EdgeTypeSet) -> Self {
        let mut index = Self::default();
        for edge in edges {
            if !edge_types.contains(edge.edge_type) {
                continue;
            }
            index
                .forward
                .entry(edge.source.clone())
                .or_default()
                .push((edge.target.clone(), edge.edge_type));
            index
                .backward
                .entry(edge.target.clone())
                .or_default()
                .push((edge.source.clone(), edge.edge_type));
            index.edge_count += 1;
        }
        index
    }

    /// Load every allowed edge from `store`.
    pub async fn load(store: &dyn GraphStore, edge_types: &EdgeTypeSet) -> StoreResult<Self> {
        let edges = store.all_edges(Some(edge_types)).await?;
        Ok(Self::from_edges(&edges, edge_types))
    }

    /// Targets of edges leaving `node`.
    pub fn successors(&self, node: &NodeId) -> &[(NodeId, EdgeType)] {
        self.forward.get(node).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Sources of edges entering `node`.
    pub fn predecessors(&self, node: &NodeId) -> &[(NodeId, EdgeType)] {
        self.backward.get(node).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }
}
