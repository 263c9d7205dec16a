//! The baked representation of a tree: a flat array of fixed-size node records.
//!
//! Children are reached through `first_child` and chained through `next_sibling`,
//! both plain indices into the same array with `-1` meaning "none".
//! The array is written once by the compiler and only read afterwards, so a single
//! [`TreeBuffer`] behind an `Arc` can be ticked by any number of agents at once.

use serde::{Deserialize, Serialize};

use crate::error::TreeBufferError;

/// Link value meaning "no child" or "no sibling".
pub const NO_NODE: i32 = -1;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum NodeKind {
    #[default]
    Selector,
    Sequence,
    Parallel,
    Invert,
    Succeeder,
    Repeater,
    Interrupt,
    Action,
    SetBlackboard,
    ClearBlackboard,
}

impl NodeKind {
    /// Resolves an authored type tag of a control or decorator node.
    /// Action-like tags are not handled here; they go through the action catalog.
    pub fn from_control_tag(tag: &str) -> Option<Self> {
        Some(match tag {
            "Selector" => Self::Selector,
            "Sequence" => Self::Sequence,
            "Parallel" => Self::Parallel,
            "Invert" => Self::Invert,
            "Succeeder" => Self::Succeeder,
            "Repeater" => Self::Repeater,
            "Interrupt" => Self::Interrupt,
            _ => return None,
        })
    }
}

/// A single baked node.
///
/// The meaning of the parameter slots depends on `kind`:
///
/// * `Action`: `params_i[0]` is the action-kind hash, the rest is up to the action
/// * `Repeater`: `params_i[0]` is the target count, `-1` repeats forever
/// * `Interrupt`: `params_i[0]` is the hash of the watched blackboard key
/// * `SetBlackboard`: `params_i[0]` is the key hash, `params_f[0]` the value
/// * `ClearBlackboard`: `params_i[0]` is the key hash, `0` clears everything
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub kind: NodeKind,
    pub first_child: i32,
    pub next_sibling: i32,
    pub params_i: [i32; 3],
    pub params_f: [f32; 4],
}

impl Default for NodeRecord {
    fn default() -> Self {
        Self::new(NodeKind::default())
    }
}

impl NodeRecord {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            first_child: NO_NODE,
            next_sibling: NO_NODE,
            params_i: [0; 3],
            params_f: [0.; 4],
        }
    }

    pub fn action(action_hash: i32) -> Self {
        let mut ret = Self::new(NodeKind::Action);
        ret.params_i[0] = action_hash;
        ret
    }

    pub fn repeater(count: i32) -> Self {
        let mut ret = Self::new(NodeKind::Repeater);
        ret.params_i[0] = count;
        ret
    }

    pub fn interrupt(key_hash: i32) -> Self {
        let mut ret = Self::new(NodeKind::Interrupt);
        ret.params_i[0] = key_hash;
        ret
    }

    pub fn set_blackboard(key_hash: i32, value: f32) -> Self {
        let mut ret = Self::new(NodeKind::SetBlackboard);
        ret.params_i[0] = key_hash;
        ret.params_f[0] = value;
        ret
    }

    pub fn clear_blackboard(key_hash: i32) -> Self {
        let mut ret = Self::new(NodeKind::ClearBlackboard);
        ret.params_i[0] = key_hash;
        ret
    }

    pub fn first_child(&self) -> Option<usize> {
        link(self.first_child)
    }

    pub fn next_sibling(&self) -> Option<usize> {
        link(self.next_sibling)
    }

    pub fn action_hash(&self) -> i32 {
        self.params_i[0]
    }

    pub fn repeat_count(&self) -> i32 {
        self.params_i[0]
    }

    pub fn key_hash(&self) -> i32 {
        self.params_i[0]
    }

    pub fn value(&self) -> f32 {
        self.params_f[0]
    }
}

fn link(raw: i32) -> Option<usize> {
    if raw < 0 {
        None
    } else {
        Some(raw as usize)
    }
}

/// Correlates an authored node id with its baked index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeIndexEntry {
    pub id: String,
    pub index: usize,
}

/// Immutable baked tree. Index 0 is always a valid root.
///
/// There is intentionally no way to modify nodes after construction; re-baking
/// produces a new buffer which is then published in place of the old `Arc`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTreeBuffer")]
pub struct TreeBuffer {
    nodes: Box<[NodeRecord]>,
    id_to_index: Vec<NodeIndexEntry>,
}

#[derive(Deserialize)]
struct RawTreeBuffer {
    nodes: Vec<NodeRecord>,
    #[serde(default)]
    id_to_index: Vec<NodeIndexEntry>,
}

impl TryFrom<RawTreeBuffer> for TreeBuffer {
    type Error = TreeBufferError;

    fn try_from(raw: RawTreeBuffer) -> Result<Self, Self::Error> {
        Self::from_nodes(raw.nodes, raw.id_to_index)
    }
}

impl TreeBuffer {
    /// Trusted constructor for the compiler, which has already validated the graph.
    pub(crate) fn from_baked(nodes: Vec<NodeRecord>, id_to_index: Vec<NodeIndexEntry>) -> Self {
        debug_assert!(validate(&nodes).is_ok());
        Self {
            nodes: nodes.into_boxed_slice(),
            id_to_index,
        }
    }

    /// Builds a buffer from nodes that did not come out of the compiler, checking the
    /// forest invariant and that every id entry names an existing node.
    pub fn from_nodes(
        nodes: Vec<NodeRecord>,
        id_to_index: Vec<NodeIndexEntry>,
    ) -> Result<Self, TreeBufferError> {
        validate(&nodes)?;
        if let Some(entry) = id_to_index.iter().find(|entry| entry.index >= nodes.len()) {
            return Err(TreeBufferError::IdOutOfRange {
                id: entry.id.clone(),
                index: entry.index,
                len: nodes.len(),
            });
        }
        Ok(Self {
            nodes: nodes.into_boxed_slice(),
            id_to_index,
        })
    }

    pub fn nodes(&self) -> &[NodeRecord] {
        &self.nodes
    }

    pub fn get(&self, index: usize) -> Option<&NodeRecord> {
        self.nodes.get(index)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn id_to_index(&self) -> &[NodeIndexEntry] {
        &self.id_to_index
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.id_to_index
            .iter()
            .find(|entry| entry.id == id)
            .map(|entry| entry.index)
    }

    pub fn id_of(&self, index: usize) -> Option<&str> {
        self.id_to_index
            .iter()
            .find(|entry| entry.index == index)
            .map(|entry| entry.id.as_str())
    }

    /// Iterates over the direct children of the node at `index`, in sibling order.
    pub fn children(&self, index: usize) -> Children<'_> {
        Children {
            nodes: &self.nodes,
            next: self.nodes.get(index).and_then(NodeRecord::first_child),
        }
    }
}

pub struct Children<'a> {
    nodes: &'a [NodeRecord],
    next: Option<usize>,
}

impl<'a> Iterator for Children<'a> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        let current = self.next?;
        self.next = self.nodes.get(current).and_then(NodeRecord::next_sibling);
        Some(current)
    }
}

/// Checks that the links form a forest rooted at index 0: every link is in range,
/// no node is linked from two places, and no chain of links loops.
fn validate(nodes: &[NodeRecord]) -> Result<(), TreeBufferError> {
    if nodes.is_empty() {
        return Err(TreeBufferError::Empty);
    }
    let len = nodes.len();
    let mut linked_from = vec![None; len];
    for (i, node) in nodes.iter().enumerate() {
        for raw in [node.first_child, node.next_sibling] {
            if raw == NO_NODE {
                continue;
            }
            if raw < 0 || raw as usize >= len {
                return Err(TreeBufferError::LinkOutOfRange {
                    node: i,
                    link: raw,
                    len,
                });
            }
            let target = raw as usize;
            if target == 0 {
                return Err(TreeBufferError::RootIsLinked { from: i });
            }
            if linked_from[target].replace(i).is_some() {
                return Err(TreeBufferError::SharedOrCyclic { node: target });
            }
        }
    }
    if nodes[0].next_sibling != NO_NODE {
        return Err(TreeBufferError::RootHasSibling);
    }

    // With at most one incoming link per node, walking from every unlinked node
    // reaches everything except nodes sitting on a loop.
    let mut visited = vec![false; len];
    let mut stack = vec![];
    for start in (0..len).filter(|i| linked_from[*i].is_none()) {
        stack.push(start);
        while let Some(i) = stack.pop() {
            if std::mem::replace(&mut visited[i], true) {
                return Err(TreeBufferError::SharedOrCyclic { node: i });
            }
            stack.extend(nodes[i].first_child());
            stack.extend(nodes[i].next_sibling());
        }
    }
    match visited.iter().position(|v| !v) {
        Some(node) => Err(TreeBufferError::SharedOrCyclic { node }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod test;
