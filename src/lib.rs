//! # behavior-tree-blob (Rust crate)
//!
//! Data-driven behavior trees baked into flat, immutable node arrays, for simulations that
//! tick the same tree for thousands of agents every frame.
//!
//!
//! ## Overview
//!
//! A behavior tree is an extension to finite state machines that makes describing
//! transitional behavior easier.
//! See [BehaviorTreeCPP's documentation](https://www.behaviortree.dev/) for the thorough
//! introduction to the idea.
//!
//! This crate splits a tree's life into two phases.
//!
//! * **Bake**: a graph of nodes and edges, usually written by a node editor, is validated and
//!   compiled into a [`TreeBuffer`], a flat array of small fixed-size [`NodeRecord`]s linked by
//!   indices. Names are hashed at this point, so nothing is looked up by string afterwards.
//! * **Tick**: the [`Interpreter`] walks the buffer depth first, once per agent per frame.
//!   The buffer is never written to, so one `Arc<TreeBuffer>` serves every agent running that
//!   tree.
//!
//! Everything a node has to remember between ticks (how many times a Repeater has looped,
//! how long a Wait has waited, whether an Interrupt fired) lives in the agent's own
//! [`Blackboard`], keyed by a stable hash.
//!
//!
//! ## How it looks like
//!
//! First, you describe the tree as a graph.
//! Most of the time it comes from a YAML or JSON document:
//!
//! ```rust
//! # use behavior_tree_blob::*;
//! let graph = GraphDesc::from_yaml(r#"
//! nodes:
//!   - { id: root, type: Sequence }
//!   - { id: greet, type: Greet }
//!   - { id: pause, type: Wait, params: { seconds: "0.5" } }
//! edges:
//!   - { from_id: root, to_id: greet }
//!   - { from_id: root, to_id: pause }
//! "#).unwrap();
//! ```
//!
//! Control nodes (`Sequence`, `Selector`, `Parallel`, `Invert`, `Succeeder`, `Repeater`,
//! `Interrupt`) are built in.
//! Any other type names an action, which the [`ActionCatalog`] must know about at bake time.
//! A definition describes the action's parameters and how to pack them into the node record.
//!
//! ```rust
//! # use behavior_tree_blob::*;
//! # let graph = GraphDesc::from_yaml("nodes: [ { id: greet, type: Greet } ]").unwrap();
//! let mut catalog = ActionCatalog::default();
//! catalog.register(
//!     ActionDefinition::new("Greet")
//!         .int("times", "1", "How many times to say hello")
//!         .bake(|params, slots| slots.params_i[1] = params.i32_or("times", 1)),
//! );
//!
//! let BakeOutput { tree, warnings } = bake(&graph, &catalog).unwrap();
//! assert!(warnings.is_empty());
//! ```
//!
//! Then you register what the actions actually do.
//! An action receives its node record and an [`ActionContext`], which carries the agent's
//! blackboard and whatever environment type `E` your simulation passes in.
//!
//! ```rust
//! # use behavior_tree_blob::*;
//! let mut registry = ActionRegistry::<Vec<String>>::new();
//! registry.register("Greet", |node, ctx| {
//!     for _ in 0..node.params_i[1] {
//!         ctx.env.push("hello".to_string());
//!     }
//!     BTState::Success
//! });
//! builtin::register_managed(&mut registry);
//! ```
//!
//! and call `tick()` every frame, on as many agents as you like.
//!
//! ```rust
//! # use behavior_tree_blob::*;
//! # use std::sync::Arc;
//! # let mut catalog = ActionCatalog::default();
//! # catalog.register(ActionDefinition::new("Greet"));
//! # let graph = GraphDesc::new()
//! #     .node(GraphNode::new("root", "Sequence"))
//! #     .node(GraphNode::new("greet", "Greet"))
//! #     .node(GraphNode::new("pause", "Wait").with_param("seconds", "0.5"))
//! #     .edge("root", "greet")
//! #     .edge("root", "pause");
//! # let tree = bake(&graph, &catalog).unwrap().tree;
//! # let mut registry = ActionRegistry::<Vec<String>>::new();
//! # registry.register("Greet", |_, ctx| { ctx.env.push("hello".to_string()); BTState::Success });
//! # builtin::register_managed(&mut registry);
//! let tree = Arc::new(tree);
//! let mut agent = Agent::new(tree.clone());
//! let mut log = vec![];
//!
//! assert_eq!(agent.tick(&registry, &mut log, 0.3), BTState::Running);
//! assert_eq!(agent.tick(&registry, &mut log, 0.3), BTState::Success);
//! assert_eq!(log.len(), 2);
//! ```
//!
//! The `Greet` action ran on both ticks, because a Sequence starts over from its first
//! child every tick.
//! Only the Wait remembered anything in between: its elapsed time, in the blackboard.
//!
//!
//! ## Node semantics
//!
//! | Kind | Result |
//! |---|---|
//! | Selector | first child that does not fail, `Failure` if all fail |
//! | Sequence | first child that does not succeed, `Success` if all succeed |
//! | Parallel | ticks every child; `Failure` if any failed, else `Running` if any is running |
//! | Invert | swaps `Success` and `Failure` |
//! | Succeeder | `Success` unless the child is `Running` |
//! | Repeater | succeeds after its child succeeded `count` times, `-1` never does |
//! | Interrupt | fails once, without ticking its child, when its watched key is non-zero |
//! | Action | whatever the registered action returns, `Failure` if nothing is registered |
//! | SetBlackboard | writes a value, `Success` |
//! | ClearBlackboard | removes a key or everything, `Success` |
//!
//!
//! ## Hashing
//!
//! Every name that reaches the baked tree (action kinds, blackboard keys, animator states)
//! is hashed with 32-bit FNV-1a over UTF-16 code units, see [`hash32`].
//! The hash is stable across runs and platforms, so baked trees can be stored and shipped.
//! Empty strings hash to 0, which several nodes treat as "no key".
//!
//!
//! ## Tracing execution
//!
//! [`Interpreter::tick_traced`] reports every evaluated node with its result, children
//! before their parents.
//! [`Trace`] collects these and maps them back to authored node ids for an editor to
//! highlight.
//!
//! This crate logs with [`tracing`]; install a subscriber to see bake warnings and
//! out-of-range indices.

pub mod action;
pub mod agent;
pub mod bake;
pub mod blackboard;
pub mod buffer;
pub mod catalog;
pub mod error;
pub mod graph;
pub mod hash;
pub mod interpreter;
pub mod params;
pub mod trace;

use serde::{Deserialize, Serialize};

pub use crate::action::{
    builtin, ActionContext, ActionDispatch, ActionRegistry, NativeAction, NativeActionTable,
};
pub use crate::agent::Agent;
pub use crate::bake::{bake, BakeOutput, BakeWarning};
pub use crate::blackboard::{Blackboard, EntityRef, Vec3};
pub use crate::buffer::{NodeIndexEntry, NodeKind, NodeRecord, TreeBuffer, NO_NODE};
pub use crate::catalog::{ActionCatalog, ActionDefinition, BakeSlots, ParamDescriptor, ParamType};
pub use crate::error::{BakeError, GraphLoadError, TreeBufferError};
pub use crate::graph::{GraphDesc, GraphEdge, GraphNode};
pub use crate::hash::{combine, hash32, hash64};
pub use crate::interpreter::{repeater_counter_key, Interpreter};
pub use crate::params::{ParamMap, Params};
pub use crate::trace::{Trace, TraceEntry, TraceSummary};
pub use ::once_cell::sync::Lazy;

#[derive(PartialEq, Eq, Debug, Clone, Copy, Hash, Serialize, Deserialize)]
pub enum BTState {
    Success,
    Failure,
    /// The node should keep running in the next tick
    Running,
}

/// Builds a [`ParamMap`] from `key => value` pairs, converting both sides with `ToString`.
#[macro_export]
macro_rules! params {
    () => {
        $crate::params::ParamMap::new()
    };
    ($($key: expr => $val: expr),+ $(,)?) => {{
        let mut ret = $crate::params::ParamMap::new();
        $(ret.insert($key.to_string(), $val.to_string());)+
        ret
    }};
}
