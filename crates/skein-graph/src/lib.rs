//! # Skein Graph
//!
//! Traversal engines over a [`GraphStore`](skein_core::store::GraphStore):
//!
//! - [`expansion::expand`]: bounded, decaying relevance spread from seed nodes
//! - [`shortest::shortest_path`]: fewest-hop path by BFS
//! - [`diverse::k_shortest_paths`]: up to `k` short paths that do not all run
//!   through the same intermediate notes
//!
//! [`export::PathExport`] turns a path search into JSON or text.
//!
//! ## Example
//!
//! ```rust
//! use skein_core::prelude::*;
//! use skein_graph::prelude::*;
//!
//! # futures::executor::block_on(async {
//! let mut graph = InMemoryGraph::new();
//! for id in ["a", "b", "c"] {
//!     graph.add_node(Node::new(id, NodeType::Scene, id, id)).unwrap();
//! }
//! graph.link("a", "b", EdgeType::ExplicitLink).unwrap();
//! graph.link("b", "c", EdgeType::Sequence).unwrap();
//!
//! let search = k_shortest_paths(&graph, &"a".into(), &"c".into(), &PathOptions::default())
//!     .await
//!     .unwrap();
//! assert_eq!(search.paths[0].hop_count, 2);
//! # });
//! ```

pub mod adjacency;
pub mod diverse;
pub mod expansion;
pub mod export;
pub mod prelude;
pub mod shortest;
