//! Typed per-edge attributes.
//!
//! Stores hand edges over with an untyped JSON attribute bag. The bag is
//! resolved here, once, into a variant that must agree with the edge type, so
//! the traversal code never sees raw JSON.

use crate::error::StoreError;
use crate::types::EdgeType;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LinkAttributes {
    /// Heading or block anchor after `#`.
    #[serde(default)]
    pub anchor: Option<String>,
    /// Display text after `|`.
    #[serde(default)]
    pub display_text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceAttributes {
    pub order: i64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CausalAttributes {
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityAttributes {
    pub similarity: f64,
    #[serde(default)]
    pub model: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MentionAttributes {
    pub span_start: usize,
    pub span_end: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AliasAttributes {
    pub alias: String,
}

/// Attributes attached to an edge, tagged by kind.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EdgeAttributes {
    #[default]
    None,
    Link(LinkAttributes),
    Sequence(SequenceAttributes),
    Causal(CausalAttributes),
    Similarity(SimilarityAttributes),
    Mention(MentionAttributes),
    Alias(AliasAttributes),
}

impl EdgeAttributes {
    /// Resolve a raw attribute bag for an edge of `edge_type`.
    ///
    /// `null` and `{}` resolve to [`EdgeAttributes::None`].
    pub fn from_raw(edge_type: EdgeType, raw: &serde_json::Value) -> Result<Self, StoreError> {
        let is_empty = raw.is_null() || raw.as_object().is_some_and(|m| m.is_empty());
        if is_empty {
            return Ok(EdgeAttributes::None);
        }

        let invalid = |e: serde_json::Error| StoreError::InvalidAttributes {
            edge_type,
            reason: e.to_string(),
        };

        let attrs = match edge_type {
            EdgeType::ExplicitLink => {
                EdgeAttributes::Link(serde_json::from_value(raw.clone()).map_err(invalid)?)
            }
            EdgeType::Sequence => {
                EdgeAttributes::Sequence(serde_json::from_value(raw.clone()).map_err(invalid)?)
            }
            EdgeType::Causes => {
                EdgeAttributes::Causal(serde_json::from_value(raw.clone()).map_err(invalid)?)
            }
            EdgeType::Semantic | EdgeType::SemanticSuggestion => {
                EdgeAttributes::Similarity(serde_json::from_value(raw.clone()).map_err(invalid)?)
            }
            EdgeType::Mention => {
                EdgeAttributes::Mention(serde_json::from_value(raw.clone()).map_err(invalid)?)
            }
            EdgeType::Alias => {
                EdgeAttributes::Alias(serde_json::from_value(raw.clone()).map_err(invalid)?)
            }
            EdgeType::Hierarchy => {
                return Err(StoreError::InvalidAttributes {
                    edge_type,
                    reason: "hierarchy edges carry no attributes".to_string(),
                })
            }
        };

        attrs.validate_for(edge_type)?;
        Ok(attrs)
    }

    /// Check that this variant is allowed on an edge of `edge_type`.
    pub fn validate_for(&self, edge_type: EdgeType) -> Result<(), StoreError> {
        let allowed = match (self, edge_type) {
            (EdgeAttributes::None, _) => true,
            (EdgeAttributes::Link(_), EdgeType::ExplicitLink) => true,
            (EdgeAttributes::Sequence(_), EdgeType::Sequence) => true,
            (EdgeAttributes::Causal(_), EdgeType::Causes) => true,
            (EdgeAttributes::Similarity(_), EdgeType::Semantic | EdgeType::SemanticSuggestion) => true,
            (EdgeAttributes::Mention(_), EdgeType::Mention) => true,
            (EdgeAttributes::Alias(_), EdgeType::Alias) => true,
            _ => false,
        };
        if !allowed {
            return Err(StoreError::InvalidAttributes {
                edge_type,
                reason: format!("{} attributes not valid here", self.kind()),
            });
        }

        match self {
            EdgeAttributes::Similarity(s) if !(0.0..=1.0).contains(&s.similarity) => {
                Err(StoreError::InvalidAttributes {
                    edge_type,
                    reason: format!("similarity {} outside [0, 1]", s.similarity),
                })
            }
            EdgeAttributes::Mention(m) if m.span_end < m.span_start => Err(StoreError::InvalidAttributes {
                edge_type,
                reason: format!("mention span {}..{} is reversed", m.span_start, m.span_end),
            }),
            _ => Ok(()),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            EdgeAttributes::None => "none",
            EdgeAttributes::Link(_) => "link",
            EdgeAttributes::Sequence(_) => "sequence",
            EdgeAttributes::Causal(_) => "causal",
            EdgeAttributes::Similarity(_) => "similarity",
            EdgeAttributes::Mention(_) => "mention",
            EdgeAttributes::Alias(_) => "alias",
        }
    }
}
