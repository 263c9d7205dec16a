//! One simulated entity running a behavior tree.

use std::sync::Arc;

use crate::{
    action::ActionDispatch, blackboard::Blackboard, buffer::TreeBuffer, interpreter::Interpreter,
    BTState,
};

/// A shared tree plus the per-agent state that makes it resumable.
///
/// Agents are `Send`; a scheduler may move disjoint agents to worker threads and tick
/// them against the same registry, since the tree and the registry are only read.
#[derive(Debug, Clone)]
pub struct Agent {
    tree: Arc<TreeBuffer>,
    root: i32,
    blackboard: Blackboard,
}

impl Agent {
    pub fn new(tree: Arc<TreeBuffer>) -> Self {
        Self::with_root(tree, 0)
    }

    /// Starts evaluation at `root` instead of index 0, for trees that bake several
    /// independent roots into one buffer.
    pub fn with_root(tree: Arc<TreeBuffer>, root: i32) -> Self {
        Self {
            tree,
            root,
            blackboard: Blackboard::new(),
        }
    }

    pub fn tree(&self) -> &Arc<TreeBuffer> {
        &self.tree
    }

    pub fn root(&self) -> i32 {
        self.root
    }

    pub fn blackboard(&self) -> &Blackboard {
        &self.blackboard
    }

    pub fn blackboard_mut(&mut self) -> &mut Blackboard {
        &mut self.blackboard
    }

    pub fn tick<E, R: ActionDispatch<E>>(
        &mut self,
        actions: &R,
        env: &mut E,
        delta_time: f32,
    ) -> BTState {
        Interpreter::new(&self.tree, actions).tick(self.root, &mut self.blackboard, env, delta_time)
    }

    pub fn tick_traced<E, R: ActionDispatch<E>>(
        &mut self,
        actions: &R,
        env: &mut E,
        delta_time: f32,
        trace: &mut dyn FnMut(usize, BTState),
    ) -> BTState {
        Interpreter::new(&self.tree, actions).tick_traced(
            self.root,
            &mut self.blackboard,
            env,
            delta_time,
            trace,
        )
    }

    /// Replaces the tree with a re-baked one and returns the previous tree.
    ///
    /// The blackboard is kept, so state keyed by authored names survives the swap.
    /// Keys derived from node indices (repeat counters, wait timers) may now point at
    /// different nodes; call [`Blackboard::reset`] through [`Self::blackboard_mut`] if
    /// the tree shape changed.
    pub fn swap_tree(&mut self, tree: Arc<TreeBuffer>) -> Arc<TreeBuffer> {
        tracing::debug!(
            old_len = self.tree.len(),
            new_len = tree.len(),
            "swapping behavior tree"
        );
        std::mem::replace(&mut self.tree, tree)
    }
}
