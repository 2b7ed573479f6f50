//! # Skein Core
//!
//! Shared types and store contracts for the Skein vault graph.
//!
//! A vault is a folder of interlinked documents indexed into nodes (documents
//! and entities), typed edges (links, sequences, causes, similarity) and text
//! fragments. This crate defines:
//!
//! - the data model ([`types`]) and typed edge attributes ([`attributes`])
//! - the error taxonomy ([`error`])
//! - the read-only store contracts the engines consume ([`store`])
//! - an explicit [`context::StoreContext`] bundling store handles
//! - in-memory reference stores ([`memory`], [`text_index`])
//!
//! ## Quick Start
//!
//! ```rust
//! use skein_core::prelude::*;
//!
//! let mut graph = InMemoryGraph::new();
//! graph.add_node(Node::new("harbor", NodeType::Location, "Harbor", "places/harbor.md")).unwrap();
//! graph.add_node(Node::new("keep", NodeType::Location, "Keep", "places/keep.md")).unwrap();
//! graph.link("harbor", "keep", EdgeType::ExplicitLink).unwrap();
//! assert_eq!(graph.edge_count(), 1);
//! ```

pub mod attributes;
pub mod context;
pub mod error;
pub mod memory;
pub mod prelude;
pub mod store;
pub mod text_index;
pub mod types;
