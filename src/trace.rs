//! Recording which nodes a tick visited, for debugging and editor highlighting.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{buffer::TreeBuffer, BTState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceEntry {
    pub index: usize,
    pub state: BTState,
}

/// Per-state counts over the distinct nodes of a trace, using each node's final state.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TraceSummary {
    pub success: usize,
    pub failure: usize,
    pub running: usize,
    /// The last node reported as running. Since parents are reported after their
    /// children, this is the outermost running node.
    pub last_running: Option<usize>,
    /// The first node reported as running, the innermost one.
    pub running_leaf: Option<usize>,
}

/// Entries in the order the interpreter reported them.
///
/// ```
/// # use behavior_tree_blob::*;
/// # let tree = TreeBuffer::from_nodes(vec![NodeRecord::default()], vec![]).unwrap();
/// # let registry = ActionRegistry::<()>::new();
/// let mut trace = Trace::new();
/// Interpreter::new(&tree, &registry).tick_traced(
///     0,
///     &mut Blackboard::new(),
///     &mut (),
///     0.016,
///     &mut trace.recorder(),
/// );
/// assert_eq!(trace.len(), 1);
/// ```
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trace {
    entries: Vec<TraceEntry>,
}

impl Trace {
    pub fn new() -> Self {
        Self::default()
    }

    /// A callback for [`crate::Interpreter::tick_traced`] that appends to this trace.
    pub fn recorder(&mut self) -> impl FnMut(usize, BTState) + '_ {
        move |index, state| self.push(index, state)
    }

    pub fn push(&mut self, index: usize, state: BTState) {
        self.entries.push(TraceEntry { index, state });
    }

    pub fn entries(&self) -> &[TraceEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// The last state reported for the node at `index`.
    pub fn state_of(&self, index: usize) -> Option<BTState> {
        self.entries
            .iter()
            .rev()
            .find(|entry| entry.index == index)
            .map(|entry| entry.state)
    }

    /// Pairs every entry with the authored id of its node, if the tree knows it.
    pub fn resolve<'t>(&self, tree: &'t TreeBuffer) -> Vec<(Option<&'t str>, BTState)> {
        self.entries
            .iter()
            .map(|entry| (tree.id_of(entry.index), entry.state))
            .collect()
    }

    pub fn summary(&self) -> TraceSummary {
        let final_states: BTreeMap<usize, BTState> = self
            .entries
            .iter()
            .map(|entry| (entry.index, entry.state))
            .collect();

        let mut ret = TraceSummary::default();
        for state in final_states.values() {
            match state {
                BTState::Success => ret.success += 1,
                BTState::Failure => ret.failure += 1,
                BTState::Running => ret.running += 1,
            }
        }
        let mut running = self
            .entries
            .iter()
            .filter(|entry| entry.state == BTState::Running);
        ret.running_leaf = running.next().map(|entry| entry.index);
        ret.last_running = running.last().map(|entry| entry.index).or(ret.running_leaf);
        ret
    }
}
