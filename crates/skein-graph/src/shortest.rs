//! Single shortest path by breadth-first search.

use skein_core::error::{ConfigError, Result};
use skein_core::store::GraphStore;
use skein_core::types::{EdgeTypeSet, NodeId};
use std::collections::{HashMap, VecDeque};
use tracing::{debug, instrument};

/// Depth ceiling for [`shortest_path`]; vault link chains never get close.
pub const SHORTEST_PATH_MAX_DEPTH: usize = 64;

/// Fewest-hop path from `from` to `to` following edges forward.
///
/// Returns `None` when `to` is unreachable within
/// [`SHORTEST_PATH_MAX_DEPTH`] hops. A node searched against itself yields a
/// one-element path.
#[instrument(skip_all, fields(from = %from, to = %to))]
pub async fn shortest_path(
    store: &dyn GraphStore,
    from: &NodeId,
    to: &NodeId,
    edge_types: &EdgeTypeSet,
) -> Result<Option<Vec<NodeId>>> {
    if edge_types.is_empty() {
        return Err(ConfigError::EmptyEdgeTypes.into());
    }
    if from == to {
        return Ok(Some(vec![from.clone()]));
    }

    let mut parents: HashMap<NodeId, Option<NodeId>> = HashMap::new();
    parents.insert(from.clone(), None);
    let mut queue: VecDeque<(NodeId, usize)> = VecDeque::new();
    queue.push_back((from.clone(), 0));

    while let Some((current, depth)) = queue.pop_front() {
        if depth >= SHORTEST_PATH_MAX_DEPTH {
            continue;
        }
        for edge in store.outgoing_edges(&current, Some(edge_types)).await? {
            if parents.contains_key(&edge.target) {
                continue;
            }
            parents.insert(edge.target.clone(), Some(current.clone()));
            if &edge.target == to {
                let path = reconstruct(&parents, to);
                debug!(hops = path.len() - 1, visited = parents.len(), "shortest path found");
                return Ok(Some(path));
            }
            queue.push_back((edge.target, depth + 1));
        }
    }

    debug!(visited = parents.len(), "no path");
    Ok(None)
}

fn reconstruct(parents: &HashMap<NodeId, Option<NodeId>>, to: &NodeId) -> Vec<NodeId> {
    let mut path = vec![to.clone()];
    let mut current = to;
    while let Some(Some(prev)) = parents.get(current) {
        path.push(prev.clone());
        current = prev;
    }
    path.reverse();
    path
}
