//! # Skein
//!
//! Graph expansion, diverse path search and rank-fused retrieval over a vault
//! of interlinked documents.
//!
//! A vault's documents and entities become nodes, its links, sequences,
//! causal and semantic relations become typed edges, and its text is indexed
//! as fragments. Skein answers two questions over that graph:
//!
//! - *how are two notes connected?* with the shortest path and up to `k`
//!   short, mutually diverse paths
//! - *what is relevant to this query?* with lexical hits fused with the
//!   fragments of graph neighbours of the best hits
//!
//! ## Quick Start
//!
//! ```rust
//! use skein::prelude::*;
//!
//! # tokio_test_block_on(async {
//! let mut graph = InMemoryGraph::new();
//! graph.add_node(Node::new("harbor", NodeType::Location, "The Harbor", "harbor.md")).unwrap();
//! graph.add_node(Node::new("mara", NodeType::Character, "Mara", "mara.md")).unwrap();
//! graph.link("harbor", "mara", EdgeType::ExplicitLink).unwrap();
//!
//! let mut index = InMemoryTextIndex::new();
//! index.add_document("harbor", "Smugglers meet at the harbor.");
//! index.add_document("mara", "Mara keeps the ledger.");
//!
//! let skein = Skein::in_memory(graph, index, EngineConfig::default()).unwrap();
//! let context = skein.retrieve("harbor").await.unwrap();
//! assert_eq!(context.blocks.len(), 2);
//!
//! let paths = skein.k_shortest_paths(&"harbor".into(), &"mara".into()).await.unwrap();
//! assert_eq!(paths.paths[0].hop_count, 1);
//! # });
//! # fn tokio_test_block_on<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`skein_core`] - data model, errors, store contracts, in-memory stores
//! - [`skein_graph`] - bounded expansion, shortest and diverse path search, path export
//! - [`skein_rag`] - reciprocal rank fusion and context assembly
//!
//! Configuration lives in `skein.toml` ([`config::EngineConfig`]); binaries
//! call [`telemetry::init_tracing`] to see the engines' `tracing` events.

pub mod config;
pub mod engine;
pub mod prelude;
pub mod telemetry;

pub use engine::Skein;

pub use skein_core;
pub use skein_graph;
pub use skein_rag;
