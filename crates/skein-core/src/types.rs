//! Shared types for the vault graph: nodes, edges, fragments and the closed
//! enumerations that classify them.

use crate::attributes::EdgeAttributes;
use crate::error::ConfigError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Identifier of a node in the vault graph.
///
/// Ids are opaque strings owned by the indexer (usually the vault-relative
/// document path or an entity slug).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for NodeId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Identifier of an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EdgeId(pub Uuid);

impl EdgeId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EdgeId {
    fn default() -> Self {
        Self::new()
    }
}

/// Identifier of an indexed text fragment.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FragmentId(pub String);

impl FragmentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FragmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FragmentId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Error returned when parsing an unknown enumeration string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl fmt::Display for UnknownVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {}: {}", self.kind, self.value)
    }
}

impl std::error::Error for UnknownVariant {}

/// Kind of document or entity a node represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeType {
    Note,
    Scene,
    Character,
    Location,
    Object,
    Event,
    Concept,
    Hub,
    Timeline,
    Draft,
}

impl NodeType {
    pub const ALL: [NodeType; 10] = [
        NodeType::Note,
        NodeType::Scene,
        NodeType::Character,
        NodeType::Location,
        NodeType::Object,
        NodeType::Event,
        NodeType::Concept,
        NodeType::Hub,
        NodeType::Timeline,
        NodeType::Draft,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeType::Note => "note",
            NodeType::Scene => "scene",
            NodeType::Character => "character",
            NodeType::Location => "location",
            NodeType::Object => "object",
            NodeType::Event => "event",
            NodeType::Concept => "concept",
            NodeType::Hub => "hub",
            NodeType::Timeline => "timeline",
            NodeType::Draft => "draft",
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NodeType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| UnknownVariant {
                kind: "node type",
                value: s.to_string(),
            })
    }
}

/// Relationship type carried by an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeType {
    /// A wiki-link or markdown link written by the author.
    ExplicitLink,
    /// Ordering between scenes, chapters or timeline entries.
    Sequence,
    /// Parent/child containment (folders, hub notes).
    Hierarchy,
    /// One event causes another.
    Causes,
    /// Accepted embedding-similarity link.
    Semantic,
    /// Embedding-similarity link awaiting review.
    SemanticSuggestion,
    /// Unlinked mention of another node's title.
    Mention,
    /// Alias resolution.
    Alias,
}

impl EdgeType {
    pub const ALL: [EdgeType; 8] = [
        EdgeType::ExplicitLink,
        EdgeType::Sequence,
        EdgeType::Hierarchy,
        EdgeType::Causes,
        EdgeType::Semantic,
        EdgeType::SemanticSuggestion,
        EdgeType::Mention,
        EdgeType::Alias,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeType::ExplicitLink => "explicit_link",
            EdgeType::Sequence => "sequence",
            EdgeType::Hierarchy => "hierarchy",
            EdgeType::Causes => "causes",
            EdgeType::Semantic => "semantic",
            EdgeType::SemanticSuggestion => "semantic_suggestion",
            EdgeType::Mention => "mention",
            EdgeType::Alias => "alias",
        }
    }
}

impl fmt::Display for EdgeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EdgeType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EdgeType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| UnknownVariant {
                kind: "edge type",
                value: s.to_string(),
            })
    }
}

/// Where an edge came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    /// Written in the document itself.
    Explicit,
    /// Derived by a rule (mentions, aliases, sequence detection).
    Inferred,
    /// Produced by a computation such as embedding similarity.
    Computed,
    /// A computed suggestion the user accepted.
    UserApproved,
}

impl Provenance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provenance::Explicit => "explicit",
            Provenance::Inferred => "inferred",
            Provenance::Computed => "computed",
            Provenance::UserApproved => "user_approved",
        }
    }
}

impl FromStr for Provenance {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "explicit" => Ok(Provenance::Explicit),
            "inferred" => Ok(Provenance::Inferred),
            "computed" => Ok(Provenance::Computed),
            "user_approved" => Ok(Provenance::UserApproved),
            other => Err(UnknownVariant {
                kind: "provenance",
                value: other.to_string(),
            }),
        }
    }
}

/// A set of allowed edge types.
///
/// Ordered so that iteration (and therefore serialization and logging) is
/// deterministic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EdgeTypeSet(BTreeSet<EdgeType>);

impl EdgeTypeSet {
    /// Every known edge type.
    pub fn all() -> Self {
        Self(EdgeType::ALL.iter().copied().collect())
    }

    pub fn empty() -> Self {
        Self(BTreeSet::new())
    }

    pub fn of(types: &[EdgeType]) -> Self {
        Self(types.iter().copied().collect())
    }

    /// Resolve an inclusion list (or every type when `None`) minus an
    /// exclusion list. An empty effective set is a configuration error.
    pub fn resolve(include: Option<&[EdgeType]>, exclude: &[EdgeType]) -> Result<Self, ConfigError> {
        let mut set = match include {
            Some(types) => Self::of(types),
            None => Self::all(),
        };
        for t in exclude {
            set.0.remove(t);
        }
        if set.is_empty() {
            return Err(ConfigError::EmptyEdgeTypes);
        }
        Ok(set)
    }

    pub fn contains(&self, edge_type: EdgeType) -> bool {
        self.0.contains(&edge_type)
    }

    pub fn insert(&mut self, edge_type: EdgeType) -> bool {
        self.0.insert(edge_type)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = EdgeType> + '_ {
        self.0.iter().copied()
    }
}

impl Default for EdgeTypeSet {
    fn default() -> Self {
        Self::all()
    }
}

impl FromIterator<EdgeType> for EdgeTypeSet {
    fn from_iter<I: IntoIterator<Item = EdgeType>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// An indexed document or entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub node_type: NodeType,
    pub title: String,
    /// Vault-relative file path.
    pub path: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_hash: Option<String>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl Node {
    pub fn new(id: impl Into<NodeId>, node_type: NodeType, title: &str, path: &str) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            node_type,
            title: title.to_string(),
            path: path.to_string(),
            created_at: now,
            updated_at: now,
            content_hash: None,
            metadata: HashMap::new(),
        }
    }

    pub fn with_updated_at(mut self, at: DateTime<Utc>) -> Self {
        self.updated_at = at;
        if self.created_at > at {
            self.created_at = at;
        }
        self
    }

    pub fn with_content_hash(mut self, hash: impl Into<String>) -> Self {
        self.content_hash = Some(hash.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// A typed, directed, optionally weighted relationship.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub id: EdgeId,
    pub source: NodeId,
    pub target: NodeId,
    pub edge_type: EdgeType,
    /// Relationship strength in [0, 1]; absent means full strength.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strength: Option<f64>,
    pub provenance: Provenance,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub attributes: EdgeAttributes,
}

impl Edge {
    pub fn new(source: impl Into<NodeId>, target: impl Into<NodeId>, edge_type: EdgeType) -> Self {
        Self {
            id: EdgeId::new(),
            source: source.into(),
            target: target.into(),
            edge_type,
            strength: None,
            provenance: Provenance::Explicit,
            created_at: Utc::now(),
            attributes: EdgeAttributes::None,
        }
    }

    pub fn with_strength(mut self, strength: f64) -> Self {
        self.strength = Some(strength);
        self
    }

    pub fn with_provenance(mut self, provenance: Provenance) -> Self {
        self.provenance = provenance;
        self
    }

    pub fn with_attributes(mut self, attributes: EdgeAttributes) -> Self {
        self.attributes = attributes;
        self
    }

    /// Multiplicative weight used by score propagation.
    pub fn weight(&self) -> f64 {
        self.strength.unwrap_or(1.0)
    }

    /// The endpoint opposite `node`.
    pub fn other_end(&self, node: &NodeId) -> &NodeId {
        if &self.source == node {
            &self.target
        } else {
            &self.source
        }
    }
}

/// A ranked hit returned by the lexical index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LexicalHit {
    pub fragment_id: FragmentId,
    pub owner_node_id: NodeId,
    pub text: String,
    pub score: f64,
    /// Byte offset of the fragment in its document, when the index knows it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset_start: Option<usize>,
}

/// A text fragment owned by a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fragment {
    pub fragment_id: FragmentId,
    pub text: String,
    pub offset_start: usize,
}
