//! # Skein RAG
//!
//! Graph-aware retrieval for a Skein vault.
//!
//! [`fusion`] merges named ranked lists with reciprocal rank fusion.
//! [`context::ContextAssembler`] combines lexical search, bounded graph
//! expansion and fusion into readable per-note context blocks with
//! provenance.

pub mod context;
pub mod fusion;
pub mod prelude;
