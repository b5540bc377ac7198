use thiserror::Error;

use crate::graph::NodeId;

/// Why a graph mutation or configuration was rejected.
///
/// Mutations that fail leave the graph exactly as it was.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GraphError {
    #[error("node '{0}' already exists")]
    NodeExists(NodeId),

    #[error("node '{0}' not found")]
    NodeNotFound(NodeId),

    #[error("self-loop on node '{0}' is not allowed")]
    SelfLoop(NodeId),

    #[error("no edge between '{0}' and '{1}'")]
    EdgeNotFound(NodeId, NodeId),

    #[error("distance must be a positive finite number, got {0}")]
    InvalidDistance(f64),

    #[error("speed limit must be a positive finite number, got {0}")]
    InvalidSpeedLimit(f64),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, GraphError>;
