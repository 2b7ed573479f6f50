//! Skein Graph Prelude.

pub use crate::adjacency::AdjacencyIndex;
pub use crate::diverse::{
    bidirectional_bfs, edge_penalty, k_shortest_paths, k_shortest_paths_in, path_overlap,
    score_path, Exclusions, PathOptions, PathResult, PathSearch, SearchReason,
};
pub use crate::expansion::{expand, ExpansionConfig, ExpansionResult};
pub use crate::export::PathExport;
pub use crate::shortest::{shortest_path, SHORTEST_PATH_MAX_DEPTH};
