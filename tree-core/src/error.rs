//! Errors raised by tree operations.
//!
//! Every variant is a contract violation by the caller. Documented no-ops
//! (operating on an uninitialized tree, merging a leaf or `None`) are not
//! errors and return `Ok`.

use crate::types::NodeId;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TreeError {
    /// The node's current child state does not allow the operation.
    #[error("structural violation on node {node:?}: {reason}")]
    StructuralViolation { node: NodeId, reason: &'static str },

    /// The id does not refer to a live node of this tree.
    #[error("unknown node {0:?}")]
    UnknownNode(NodeId),

    /// A tree parameter is out of its valid range.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

pub type Result<T> = std::result::Result<T, TreeError>;
