//! Error type shared by the labeling core and the I/O layer.

use crate::tree::NodeId;
use thiserror::Error;

/// Everything that can go wrong while building, labeling, decoding or
/// exporting a tree.
#[derive(Debug, Error)]
pub enum ParsimonyError {
    #[error("node {node} has {children} children; internal nodes must have exactly two")]
    MalformedTopology { node: NodeId, children: usize },

    #[error("node {node} is already attached to parent {parent}")]
    NodeReattached { node: NodeId, parent: NodeId },

    #[error("unknown node id {0}")]
    UnknownNode(NodeId),

    #[error("node {0} cannot be the root: it has a parent")]
    RootHasParent(NodeId),

    #[error("tree has no nodes")]
    EmptyTree,

    #[error("leaf '{leaf}' carries {found} symbols, expected {expected}")]
    LabelLengthMismatch {
        leaf: String,
        expected: usize,
        found: usize,
    },

    #[error("label is full ({capacity} symbols)")]
    LabelOverflow { capacity: usize },

    #[error("child of node {node} has no symbol at slot {slot}")]
    UnresolvedChild { node: NodeId, slot: usize },

    #[error("label of node {node} holds {filled} of {expected} symbols")]
    IncompleteLabel {
        node: NodeId,
        filled: usize,
        expected: usize,
    },

    #[error("code {code} at slot {slot} has no symbol")]
    InvalidCode { code: u8, slot: usize },

    #[error("symbol '{symbol}' at position {position} is not in the alphabet")]
    InvalidSymbol { symbol: char, position: usize },

    #[error("invalid alphabet: {0}")]
    InvalidAlphabet(String),

    #[error("label length must be positive")]
    ZeroLabelLength,

    #[error("newick: {0}")]
    Newick(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ParsimonyError>;
