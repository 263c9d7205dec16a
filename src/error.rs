use std::fmt::{self, Display, Formatter};

use thiserror::Error;

/// One step of a reported cycle: the authored node and its position in the graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleNode {
    pub id: String,
    pub ty: String,
    /// Position of the node in the authored node list
    pub position: usize,
}

impl Display for CycleNode {
    fn fmt(&self, fmt: &mut Formatter) -> fmt::Result {
        write!(fmt, "{}[{}]", self.ty, self.position)
    }
}

fn format_path(path: &[CycleNode]) -> String {
    path.iter()
        .map(|node| node.to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// Structural errors that abort a bake. No buffer is produced when one of these is returned.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BakeError {
    /// The path starts and ends at the same node.
    #[error("cycle detected: {}", format_path(.path))]
    Cycle { path: Vec<CycleNode> },
    #[error("node id {id:?} is used by more than one node")]
    DuplicateNodeId { id: String },
    #[error("node {child:?} has more than one parent ({first:?} and {second:?})")]
    MultipleParents {
        child: String,
        first: String,
        second: String,
    },
}

impl BakeError {
    /// The offending cycle, if this is a cycle error.
    pub fn cycle_path(&self) -> Option<&[CycleNode]> {
        match self {
            Self::Cycle { path } => Some(path),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum GraphLoadError {
    #[error("yaml: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Reasons a node array handed to [`crate::TreeBuffer::from_nodes`] is rejected.
#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum TreeBufferError {
    #[error("a tree buffer needs at least one node")]
    Empty,
    #[error("node {node} links to index {link}, but the buffer has {len} nodes")]
    LinkOutOfRange { node: usize, link: i32, len: usize },
    #[error("node {node} is reached twice while walking the links")]
    SharedOrCyclic { node: usize },
    #[error("the root at index 0 must not have a sibling")]
    RootHasSibling,
    #[error("the root at index 0 is linked from node {from}")]
    RootIsLinked { from: usize },
    #[error("node id {id:?} maps to index {index}, but the buffer has {len} nodes")]
    IdOutOfRange { id: String, index: usize, len: usize },
}
