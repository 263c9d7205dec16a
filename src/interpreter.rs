//! The tick interpreter: a tri-state depth-first walk over a [`TreeBuffer`].
//!
//! The walk keeps its own stack of open nodes instead of recursing, so a tree that baked
//! fine ticks fine no matter how deep it is.
//!
//! Nothing about a tick is kept in the interpreter or the tree. A walk that hits
//! `Running` simply returns, and the next tick starts again from the root; everything a
//! node needs to resume (repeat counters, wait timers, interrupt flags) is in the agent's
//! [`Blackboard`].

use crate::{
    action::{ActionContext, ActionDispatch},
    blackboard::Blackboard,
    buffer::{NodeKind, NodeRecord, TreeBuffer},
    BTState,
};

/// Blackboard key of the counter of the Repeater whose child is at `child_index`.
///
/// The key is negative and derived from the child's index, so it cannot collide with
/// another Repeater in the same tree. It can collide with an authored key whose hash
/// happens to be the same negative number.
pub fn repeater_counter_key(child_index: usize) -> i32 {
    -(child_index as i32 + 1000)
}

/// Borrowed view that ticks one tree against one action table.
///
/// Cheap to construct; create one per tick batch or per agent as convenient.
pub struct Interpreter<'a, R> {
    tree: &'a TreeBuffer,
    actions: &'a R,
}

struct Tick<'t, E> {
    blackboard: &'t mut Blackboard,
    env: &'t mut E,
    delta_time: f32,
}

impl<'a, R> Interpreter<'a, R> {
    pub fn new(tree: &'a TreeBuffer, actions: &'a R) -> Self {
        Self { tree, actions }
    }

    pub fn tree(&self) -> &'a TreeBuffer {
        self.tree
    }

    /// Evaluates the subtree rooted at `root` once.
    ///
    /// A root outside the buffer (negative included) evaluates to `Failure`.
    pub fn tick<E>(
        &self,
        root: i32,
        blackboard: &mut Blackboard,
        env: &mut E,
        delta_time: f32,
    ) -> BTState
    where
        R: ActionDispatch<E>,
    {
        self.tick_root(root, blackboard, env, delta_time, &mut |_, _| {})
    }

    /// Same as [`Self::tick`], also reporting `(node_index, result)` for every node that
    /// was evaluated. A node is reported once its result is known, so children come
    /// before their parent and the root is reported last.
    pub fn tick_traced<E>(
        &self,
        root: i32,
        blackboard: &mut Blackboard,
        env: &mut E,
        delta_time: f32,
        mut trace: &mut dyn FnMut(usize, BTState),
    ) -> BTState
    where
        R: ActionDispatch<E>,
    {
        self.tick_root(root, blackboard, env, delta_time, &mut trace)
    }

    fn tick_root<E, T>(
        &self,
        root: i32,
        blackboard: &mut Blackboard,
        env: &mut E,
        delta_time: f32,
        trace: &mut T,
    ) -> BTState
    where
        R: ActionDispatch<E>,
        T: FnMut(usize, BTState),
    {
        let Ok(root) = usize::try_from(root) else {
            tracing::warn!(root, "negative root index");
            return BTState::Failure;
        };
        let mut tick = Tick {
            blackboard,
            env,
            delta_time,
        };
        self.eval(root, &mut tick, trace)
    }

    /// Walks the subtree under `root` with an explicit stack of open composites and
    /// decorators, so the depth of a tree is bounded by memory, not by the call stack.
    fn eval<E, T>(&self, root: usize, tick: &mut Tick<E>, trace: &mut T) -> BTState
    where
        R: ActionDispatch<E>,
        T: FnMut(usize, BTState),
    {
        let mut stack: Vec<Frame> = vec![];
        let mut step = Step::Enter(root);
        loop {
            step = match step {
                Step::Enter(index) => match self.tree.get(index) {
                    None => {
                        tracing::warn!(index, len = self.tree.len(), "node index out of range");
                        Step::Return(BTState::Failure)
                    }
                    Some(node) => match self.enter(index, node, tick) {
                        Visit::Child(child) => {
                            stack.push(Frame::new(index, child));
                            Step::Enter(child)
                        }
                        Visit::Done(result) => Step::Exit(index, result),
                    },
                },
                Step::Exit(index, result) => {
                    trace(index, result);
                    Step::Return(result)
                }
                Step::Return(result) => {
                    let Some(frame) = stack.last_mut() else {
                        return result;
                    };
                    match self.resume(frame, result, tick) {
                        Visit::Child(child) => {
                            frame.child = child;
                            Step::Enter(child)
                        }
                        Visit::Done(result) => {
                            let index = frame.index;
                            stack.pop();
                            Step::Exit(index, result)
                        }
                    }
                }
            };
        }
    }

    /// First visit of a node: either it settles right away, or it asks for a child.
    fn enter<E>(&self, index: usize, node: &NodeRecord, tick: &mut Tick<E>) -> Visit
    where
        R: ActionDispatch<E>,
    {
        use BTState::*;

        let descend_or = |empty| node.first_child().map_or(Visit::Done(empty), Visit::Child);

        match node.kind {
            NodeKind::Selector | NodeKind::Invert => descend_or(Failure),
            NodeKind::Sequence
            | NodeKind::Parallel
            | NodeKind::Succeeder
            | NodeKind::Repeater => descend_or(Success),

            NodeKind::Interrupt => match node.first_child() {
                None => Visit::Done(Success),
                Some(child) => {
                    let key = node.key_hash();
                    if key != 0 && tick.blackboard.get(key) != 0. {
                        tick.blackboard.set(key, 0.);
                        Visit::Done(Failure)
                    } else {
                        Visit::Child(child)
                    }
                }
            },

            NodeKind::Action => {
                let mut ctx = ActionContext {
                    node_index: index,
                    delta_time: tick.delta_time,
                    blackboard: &mut *tick.blackboard,
                    env: &mut *tick.env,
                };
                Visit::Done(self.actions.execute(node.action_hash(), node, &mut ctx))
            }

            NodeKind::SetBlackboard => {
                tick.blackboard.set(node.key_hash(), node.value());
                Visit::Done(Success)
            }

            NodeKind::ClearBlackboard => {
                match node.key_hash() {
                    0 => tick.blackboard.clear_all(),
                    key => {
                        tick.blackboard.remove(key);
                    }
                }
                Visit::Done(Success)
            }
        }
    }

    /// A child of `frame` finished with `result`: move on to the next sibling or settle.
    fn resume<E>(&self, frame: &mut Frame, result: BTState, tick: &mut Tick<E>) -> Visit {
        use BTState::*;

        let node = &self.tree.nodes()[frame.index];
        let sibling = self
            .tree
            .get(frame.child)
            .and_then(NodeRecord::next_sibling);
        let next_or = |done| sibling.map_or(Visit::Done(done), Visit::Child);

        match node.kind {
            NodeKind::Selector if result == Failure => next_or(Failure),
            NodeKind::Sequence if result == Success => next_or(Success),
            NodeKind::Selector | NodeKind::Sequence => Visit::Done(result),

            NodeKind::Parallel => {
                match result {
                    Failure => frame.failed = true,
                    Running => frame.running = true,
                    Success => (),
                }
                let done = if frame.failed {
                    Failure
                } else if frame.running {
                    Running
                } else {
                    Success
                };
                next_or(done)
            }

            NodeKind::Invert => Visit::Done(match result {
                Success => Failure,
                Failure => Success,
                Running => Running,
            }),

            NodeKind::Succeeder => Visit::Done(match result {
                Running => Running,
                _ => Success,
            }),

            NodeKind::Repeater => {
                let key = repeater_counter_key(frame.child);
                Visit::Done(match result {
                    Running => Running,
                    Failure => {
                        tick.blackboard.set(key, 0.);
                        Failure
                    }
                    Success => {
                        let count = tick.blackboard.get(key) + 1.;
                        let target = node.repeat_count();
                        if target >= 0 && count >= target as f32 {
                            tick.blackboard.set(key, 0.);
                            Success
                        } else {
                            tick.blackboard.set(key, count);
                            Running
                        }
                    }
                })
            }

            // Leaves never open a frame
            NodeKind::Interrupt
            | NodeKind::Action
            | NodeKind::SetBlackboard
            | NodeKind::ClearBlackboard => Visit::Done(result),
        }
    }
}

/// A node waiting on one of its children.
struct Frame {
    index: usize,
    /// The child currently being evaluated
    child: usize,
    failed: bool,
    running: bool,
}

impl Frame {
    fn new(index: usize, child: usize) -> Self {
        Self {
            index,
            child,
            failed: false,
            running: false,
        }
    }
}

enum Step {
    Enter(usize),
    /// The node settled; report it, then hand the result to its parent
    Exit(usize, BTState),
    Return(BTState),
}

enum Visit {
    Child(usize),
    Done(BTState),
}
