//! Error types for Skein operations.
//!
//! Unreachable nodes and missing paths are not errors; they surface as empty
//! results or search reason codes. Only store failures and invalid
//! configuration are reported here.

use crate::types::{EdgeType, NodeId};
use thiserror::Error;

/// Result type for Skein operations.
pub type Result<T> = std::result::Result<T, SkeinError>;

/// Result type for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Top-level error.
#[derive(Error, Debug)]
pub enum SkeinError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Failures raised by a graph store, lexical index or fragment store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Store backend error: {0}")]
    Backend(String),

    #[error("Edge references unknown node: {0}")]
    MissingNode(NodeId),

    #[error("Duplicate node: {0}")]
    DuplicateNode(NodeId),

    #[error("Invalid edge strength: {0} (must be 0.0-1.0)")]
    InvalidStrength(f64),

    #[error("Invalid attributes for {edge_type} edge: {reason}")]
    InvalidAttributes { edge_type: EdgeType, reason: String },
}

/// Invalid call or engine configuration, detected before any traversal.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Effective edge-type set is empty")]
    EmptyEdgeTypes,

    #[error("{field} must be positive")]
    NonPositive { field: &'static str },

    #[error("{field} = {value} is outside {expected}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        expected: &'static str,
    },

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Failed to read config: {0}")]
    Io(String),
}

impl ConfigError {
    /// Reject a zero count.
    pub fn require_positive(field: &'static str, value: usize) -> std::result::Result<(), ConfigError> {
        if value == 0 {
            Err(ConfigError::NonPositive { field })
        } else {
            Ok(())
        }
    }
}
