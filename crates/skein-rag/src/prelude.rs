//! Skein RAG Prelude.

pub use crate::context::{
    ContextAssembler, ContextBlock, NodeProvenance, RetrievalConfig, RetrievalFilters,
    RetrievalOptions, RetrievalResult, RetrievedFragment,
};
pub use crate::fusion::{
    fuse, FusionConfig, FusionItem, RankedList, DEFAULT_RRF_K, GRAPH_SOURCE, LEXICAL_SOURCE,
};
