use thiserror::Error;

/// Error type for enum conversion failures on wire or CLI inputs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EnumConversionError {
    #[error("Invalid node type: {0}")]
    InvalidNodeKind(String),
    #[error("Invalid access kind: {0}")]
    InvalidAccessKind(String),
    #[error("Invalid rank direction: {0} (expected TB, LR, BT or RL)")]
    InvalidRankDirection(String),
    #[error("Invalid layout strategy: {0} (expected hierarchical or grid-scatter)")]
    InvalidLayoutStrategy(String),
}
