//! Leaf behaviors and the tables that dispatch to them.
//!
//! An Action node only carries the hash of its action kind.
//! At tick time the interpreter asks an [`ActionDispatch`] implementation to run whatever
//! was registered under that hash.
//! Two implementations are provided:
//!
//! * [`ActionRegistry`], a table of boxed closures, convenient when actions capture
//!   configuration or are added at runtime;
//! * [`NativeActionTable`], a table of plain function pointers for the bulk tick path,
//!   where nothing is captured and every input arrives through the [`ActionContext`].
//!
//! Both treat an unregistered hash as [`BTState::Failure`], so one tree referring to an
//! action nobody provides only degrades its own agent.

use std::collections::HashMap;

use crate::{blackboard::Blackboard, buffer::NodeRecord, hash::hash32, BTState};

/// Hashes of the action kinds known to this crate, computed on first use.
pub mod kind {
    use crate::{hash::hash32, Lazy};

    pub static WAIT: Lazy<i32> = Lazy::new(|| hash32("Wait"));
    pub static SET_BLACKBOARD: Lazy<i32> = Lazy::new(|| hash32("SetBlackboard"));
    pub static CLEAR_BLACKBOARD: Lazy<i32> = Lazy::new(|| hash32("ClearBlackboard"));
    pub static ANIMATOR_SET_STATE: Lazy<i32> = Lazy::new(|| hash32("AnimatorSetState"));
    pub static ANIMATOR_SET_FLOAT: Lazy<i32> = Lazy::new(|| hash32("AnimatorSetFloat"));
    pub static ANIMATOR_SET_INT: Lazy<i32> = Lazy::new(|| hash32("AnimatorSetInt"));
    pub static ANIMATOR_SET_BOOL: Lazy<i32> = Lazy::new(|| hash32("AnimatorSetBool"));
    pub static ANIMATOR_SET_TRIGGER: Lazy<i32> = Lazy::new(|| hash32("AnimatorSetTrigger"));
    pub static WAIT_ANIM_EVENT: Lazy<i32> = Lazy::new(|| hash32("WaitAnimEvent"));
}

/// Everything an action may touch while it runs.
///
/// `env` is the embedding simulation's own state for this agent (transforms, command
/// buffers, an animator...). The crate never looks inside it.
pub struct ActionContext<'a, E = ()> {
    pub node_index: usize,
    pub delta_time: f32,
    pub blackboard: &'a mut Blackboard,
    pub env: &'a mut E,
}

pub trait ActionDispatch<E> {
    fn execute(&self, action_hash: i32, node: &NodeRecord, ctx: &mut ActionContext<E>)
        -> BTState;

    fn has_action(&self, action_hash: i32) -> bool;
}

pub type ManagedAction<E> =
    Box<dyn Fn(&NodeRecord, &mut ActionContext<E>) -> BTState + Send + Sync>;

/// Action table of boxed closures.
pub struct ActionRegistry<E = ()> {
    actions: HashMap<i32, ManagedAction<E>>,
}

impl<E> Default for ActionRegistry<E> {
    fn default() -> Self {
        Self {
            actions: HashMap::new(),
        }
    }
}

impl<E> ActionRegistry<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers under `hash32(name)`, the hash the compiler stores in Action nodes.
    pub fn register(
        &mut self,
        name: &str,
        action: impl Fn(&NodeRecord, &mut ActionContext<E>) -> BTState + Send + Sync + 'static,
    ) {
        tracing::debug!(action = name, "registering action");
        self.register_hash(hash32(name), action);
    }

    /// Hash 0 is refused: it is what the empty name hashes to, and what the compiler
    /// stores in placeholder nodes for unknown actions, which must keep failing.
    pub fn register_hash(
        &mut self,
        action_hash: i32,
        action: impl Fn(&NodeRecord, &mut ActionContext<E>) -> BTState + Send + Sync + 'static,
    ) {
        if action_hash == 0 {
            tracing::warn!("refusing to register an action under hash 0");
            return;
        }
        if self.actions.insert(action_hash, Box::new(action)).is_some() {
            tracing::warn!(action_hash, "action replaced");
        }
    }

    pub fn unregister(&mut self, action_hash: i32) -> bool {
        self.actions.remove(&action_hash).is_some()
    }

    pub fn clear(&mut self) {
        self.actions.clear();
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

impl<E> ActionDispatch<E> for ActionRegistry<E> {
    fn execute(
        &self,
        action_hash: i32,
        node: &NodeRecord,
        ctx: &mut ActionContext<E>,
    ) -> BTState {
        match self.actions.get(&action_hash) {
            Some(action) => action(node, ctx),
            None => {
                tracing::trace!(action_hash, node = ctx.node_index, "unregistered action");
                BTState::Failure
            }
        }
    }

    fn has_action(&self, action_hash: i32) -> bool {
        self.actions.contains_key(&action_hash)
    }
}

pub type NativeAction<E> = fn(&NodeRecord, &mut ActionContext<E>) -> BTState;

/// Action table of function pointers. Nothing is captured, so nothing is shared between
/// agents except the table itself.
pub struct NativeActionTable<E = ()> {
    actions: HashMap<i32, NativeAction<E>>,
}

impl<E> Default for NativeActionTable<E> {
    fn default() -> Self {
        Self {
            actions: HashMap::new(),
        }
    }
}

impl<E> NativeActionTable<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: &str, action: NativeAction<E>) {
        tracing::debug!(action = name, "registering native action");
        self.register_hash(hash32(name), action);
    }

    /// Hash 0 is refused, see [`ActionRegistry::register_hash`].
    pub fn register_hash(&mut self, action_hash: i32, action: NativeAction<E>) {
        if action_hash == 0 {
            tracing::warn!("refusing to register a native action under hash 0");
            return;
        }
        if self.actions.insert(action_hash, action).is_some() {
            tracing::warn!(action_hash, "native action replaced");
        }
    }

    pub fn get(&self, action_hash: i32) -> Option<NativeAction<E>> {
        self.actions.get(&action_hash).copied()
    }

    pub fn unregister(&mut self, action_hash: i32) -> bool {
        self.actions.remove(&action_hash).is_some()
    }

    pub fn clear(&mut self) {
        self.actions.clear();
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

impl<E> ActionDispatch<E> for NativeActionTable<E> {
    fn execute(
        &self,
        action_hash: i32,
        node: &NodeRecord,
        ctx: &mut ActionContext<E>,
    ) -> BTState {
        match self.actions.get(&action_hash) {
            Some(action) => action(node, ctx),
            None => {
                tracing::trace!(action_hash, node = ctx.node_index, "unregistered action");
                BTState::Failure
            }
        }
    }

    fn has_action(&self, action_hash: i32) -> bool {
        self.actions.contains_key(&action_hash)
    }
}

/// Actions that only need the blackboard and the delta time.
pub mod builtin {
    use super::{kind, ActionContext, ActionRegistry, NativeActionTable};
    use crate::{buffer::NodeRecord, hash::combine, BTState};

    /// Blackboard key of the elapsed-time accumulator of the wait node at `node_index`.
    pub fn wait_timer_key(node_index: usize) -> i32 {
        combine(*kind::WAIT, node_index as i32)
    }

    /// Waits for `params_f[0]` seconds of accumulated delta time.
    pub fn wait<E>(node: &NodeRecord, ctx: &mut ActionContext<E>) -> BTState {
        let key = wait_timer_key(ctx.node_index);
        let elapsed = ctx.blackboard.get(key) + ctx.delta_time;
        if elapsed >= node.params_f[0] {
            ctx.blackboard.remove(key);
            BTState::Success
        } else {
            ctx.blackboard.set(key, elapsed);
            BTState::Running
        }
    }

    pub fn register_native<E>(table: &mut NativeActionTable<E>) {
        table.register_hash(*kind::WAIT, wait::<E>);
    }

    pub fn register_managed<E: 'static>(registry: &mut ActionRegistry<E>) {
        registry.register_hash(*kind::WAIT, wait::<E>);
    }
}
