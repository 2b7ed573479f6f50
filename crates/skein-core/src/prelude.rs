//! Skein Core Prelude: convenient imports for common usage.
//!
//! ```rust
//! use skein_core::prelude::*;
//! ```

pub use crate::types::{
    Edge, EdgeId, EdgeType, EdgeTypeSet,
    Fragment, FragmentId, LexicalHit,
    Node, NodeId, NodeType, Provenance,
};

pub use crate::attributes::EdgeAttributes;

pub use crate::context::StoreContext;
pub use crate::store::{FragmentStore, GraphStore, LexicalIndex};

pub use crate::memory::InMemoryGraph;
pub use crate::text_index::InMemoryTextIndex;

pub use crate::error::{ConfigError, Result, SkeinError, StoreError, StoreResult};
