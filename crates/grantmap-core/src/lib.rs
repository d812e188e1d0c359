use serde::{Deserialize, Serialize};
use std::fmt;

pub mod error;
pub mod options;

pub use error::EnumConversionError;
pub use options::{LayoutStrategy, RankDirection};

/// Identifier of a permission-model node. Unique within one graph payload.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
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
        write!(f, "{}", self.0)
    }
}

impl From<&str> for NodeId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Category of a permission-model node, as delivered by the data layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[allow(non_camel_case_types)]
pub enum NodeKind {
    #[serde(rename = "permissionSet")]
    PERMISSION_SET,
    #[serde(rename = "permissionGroup")]
    PERMISSION_GROUP,
    #[serde(rename = "control")]
    CONTROL,
    #[serde(rename = "other")]
    OTHER,
}

impl TryFrom<&str> for NodeKind {
    type Error = EnumConversionError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "permissionSet" => Ok(NodeKind::PERMISSION_SET),
            "permissionGroup" => Ok(NodeKind::PERMISSION_GROUP),
            "control" => Ok(NodeKind::CONTROL),
            "other" => Ok(NodeKind::OTHER),
            _ => Err(EnumConversionError::InvalidNodeKind(value.to_string())),
        }
    }
}

/// Whether an access edge grants or denies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[allow(non_camel_case_types)]
pub enum AccessKind {
    ALLOW,
    DENY,
}

impl TryFrom<&str> for AccessKind {
    type Error = EnumConversionError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "ALLOW" => Ok(AccessKind::ALLOW),
            "DENY" => Ok(AccessKind::DENY),
            _ => Err(EnumConversionError::InvalidAccessKind(value.to_string())),
        }
    }
}

/// A node as delivered by the data-acquisition layer. Positions are not part
/// of the wire format; layout assigns them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeData {
    pub id: NodeId,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    /// Visual category used for grouping-dependent styling.
    #[serde(default)]
    pub group: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

/// A directed access edge between two nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeData {
    pub source: NodeId,
    pub target: NodeId,
    pub access: AccessKind,
}

/// The full graph payload handed to the diagram engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphData {
    pub nodes: Vec<NodeData>,
    pub edges: Vec<EdgeData>,
}

impl GraphData {
    /// True when there is nothing to render. This is a content-empty state,
    /// not an error.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }
}
