//! Store contracts consumed by the traversal and retrieval engines.
//!
//! Persistence, indexing and schema management live behind these traits.
//! Implementations must present a stable view of the graph for the duration
//! of one call; the engines never write through them.

use crate::error::StoreResult;
use crate::types::{Edge, EdgeTypeSet, Fragment, LexicalHit, Node, NodeId};
use async_trait::async_trait;

/// Read-only access to nodes and typed edges.
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Edges whose source is `node`, optionally restricted to `edge_types`.
    async fn outgoing_edges(&self, node: &NodeId, edge_types: Option<&EdgeTypeSet>) -> StoreResult<Vec<Edge>>;

    /// Edges whose target is `node`, optionally restricted to `edge_types`.
    async fn incoming_edges(&self, node: &NodeId, edge_types: Option<&EdgeTypeSet>) -> StoreResult<Vec<Edge>>;

    /// Every edge, optionally restricted to `edge_types`.
    async fn all_edges(&self, edge_types: Option<&EdgeTypeSet>) -> StoreResult<Vec<Edge>>;

    async fn node_by_id(&self, id: &NodeId) -> StoreResult<Option<Node>>;

    /// Nodes for the given ids. Unknown ids are skipped.
    async fn nodes_by_ids(&self, ids: &[NodeId]) -> StoreResult<Vec<Node>>;
}

/// Ranked full-text search over indexed fragments.
#[async_trait]
pub trait LexicalIndex: Send + Sync {
    /// Up to `limit` hits, best match first.
    async fn search_ranked(&self, query: &str, limit: usize) -> StoreResult<Vec<LexicalHit>>;
}

/// Access to the text fragments each node owns.
#[async_trait]
pub trait FragmentStore: Send + Sync {
    /// Fragments of `node`, ordered by offset.
    async fn fragments_for_node(&self, node: &NodeId) -> StoreResult<Vec<Fragment>>;
}
