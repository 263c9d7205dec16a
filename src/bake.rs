//! The tree compiler: turns an authored [`GraphDesc`] into a [`TreeBuffer`].
//!
//! Baking runs in a fixed sequence of passes:
//!
//! 1. index node ids and resolve edges to node positions, skipping edges that name an
//!    unknown node or repeat an earlier edge;
//! 2. reject cycles, with the offending path;
//! 3. reject nodes with more than one parent;
//! 4. place the first parentless node at index 0;
//! 5. resolve every node's kind and parameter slots, consulting the [`ActionCatalog`]
//!    for anything that is not a control node;
//! 6. link children through `first_child`/`next_sibling`, ordered by their `order`
//!    field and then by the port of the edge that connects them.
//!
//! Structural problems abort the bake with a [`BakeError`] before anything is allocated
//! for the output. Softer problems only produce a [`BakeWarning`], and the baked tree
//! degrades at those nodes.

use std::{
    collections::HashMap,
    fmt::{self, Display, Formatter},
};

use crate::{
    buffer::{NodeIndexEntry, NodeKind, NodeRecord, TreeBuffer},
    catalog::ActionCatalog,
    error::{BakeError, CycleNode},
    graph::{GraphDesc, GraphNode},
    hash::hash32,
    params::Params,
};

/// Type tag of a generic action node whose action kind is named by the `task` param.
pub const GENERIC_ACTION_TAG: &str = "Action";

#[derive(Debug)]
pub struct BakeOutput {
    pub tree: TreeBuffer,
    pub warnings: Vec<BakeWarning>,
}

/// A problem that did not stop the bake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BakeWarning {
    /// The node names an action kind the catalog does not know. It was baked as an
    /// action with every slot zeroed, which fails when ticked.
    UnknownAction { id: String, action: String },
    /// The edge names a node id that does not exist and was skipped.
    DanglingEdge { from_id: String, to_id: String },
    /// The same parent/child pair was connected more than once; only the first edge counts.
    DuplicateEdge { from_id: String, to_id: String },
}

impl Display for BakeWarning {
    fn fmt(&self, fmt: &mut Formatter) -> fmt::Result {
        match self {
            Self::UnknownAction { id, action } => {
                write!(fmt, "node {id:?} uses unknown action {action:?}")
            }
            Self::DanglingEdge { from_id, to_id } => {
                write!(fmt, "edge {from_id:?} -> {to_id:?} refers to a missing node")
            }
            Self::DuplicateEdge { from_id, to_id } => {
                write!(fmt, "edge {from_id:?} -> {to_id:?} is repeated")
            }
        }
    }
}

/// An edge resolved to authored node positions.
#[derive(Debug, Clone, Copy)]
struct Link {
    child: usize,
    port: i32,
}

/// Compiles `graph` into a tree buffer.
///
/// An empty graph yields a buffer holding a single childless Selector.
pub fn bake(graph: &GraphDesc, catalog: &ActionCatalog) -> Result<BakeOutput, BakeError> {
    let mut warnings = vec![];

    let positions = index_ids(&graph.nodes)?;
    let adjacency = resolve_edges(graph, &positions, &mut warnings);

    if graph.nodes.is_empty() {
        for warning in &warnings {
            tracing::warn!("{warning}");
        }
        tracing::debug!("empty graph baked to a single selector");
        return Ok(BakeOutput {
            tree: TreeBuffer::from_baked(vec![NodeRecord::default()], vec![]),
            warnings,
        });
    }

    if let Some(cycle) = find_cycle(&adjacency) {
        let path: Vec<_> = cycle
            .into_iter()
            .map(|position| {
                let node = &graph.nodes[position];
                CycleNode {
                    id: node.id.clone(),
                    ty: node.ty.clone(),
                    position,
                }
            })
            .collect();
        let err = BakeError::Cycle { path };
        tracing::error!("{err}");
        return Err(err);
    }

    let parents = check_single_parent(graph, &adjacency)?;

    // Baked index of each authored position. The root goes first, the rest keep
    // their authored order.
    let root = parents.iter().position(Option::is_none).unwrap_or(0);
    let order: Vec<usize> = std::iter::once(root)
        .chain((0..graph.nodes.len()).filter(|&position| position != root))
        .collect();
    let mut baked_index = vec![0; graph.nodes.len()];
    for (index, &position) in order.iter().enumerate() {
        baked_index[position] = index;
    }

    let mut nodes: Vec<NodeRecord> = order
        .iter()
        .map(|&position| resolve_node(&graph.nodes[position], catalog, &mut warnings))
        .collect();

    for (parent, links) in adjacency.iter().enumerate() {
        let mut children = links.clone();
        // Stable, so equal (order, port) keeps the edge order
        children.sort_by_key(|link| (graph.nodes[link.child].order, link.port));
        let mut prev: Option<usize> = None;
        for link in children {
            let index = baked_index[link.child];
            match prev {
                None => nodes[baked_index[parent]].first_child = index as i32,
                Some(prev) => nodes[prev].next_sibling = index as i32,
            }
            prev = Some(index);
        }
    }

    let id_to_index = order
        .iter()
        .enumerate()
        .map(|(index, &position)| NodeIndexEntry {
            id: graph.nodes[position].id.clone(),
            index,
        })
        .collect();

    for warning in &warnings {
        tracing::warn!("{warning}");
    }
    tracing::debug!(
        nodes = nodes.len(),
        warnings = warnings.len(),
        root = %graph.nodes[root].id,
        "baked behavior tree"
    );

    Ok(BakeOutput {
        tree: TreeBuffer::from_baked(nodes, id_to_index),
        warnings,
    })
}

fn index_ids(nodes: &[GraphNode]) -> Result<HashMap<&str, usize>, BakeError> {
    let mut positions = HashMap::with_capacity(nodes.len());
    for (position, node) in nodes.iter().enumerate() {
        if positions.insert(node.id.as_str(), position).is_some() {
            return Err(BakeError::DuplicateNodeId {
                id: node.id.clone(),
            });
        }
    }
    Ok(positions)
}

fn resolve_edges(
    graph: &GraphDesc,
    positions: &HashMap<&str, usize>,
    warnings: &mut Vec<BakeWarning>,
) -> Vec<Vec<Link>> {
    let mut adjacency = vec![vec![]; graph.nodes.len()];
    for edge in &graph.edges {
        let (Some(&from), Some(&child)) = (
            positions.get(edge.from_id.as_str()),
            positions.get(edge.to_id.as_str()),
        ) else {
            warnings.push(BakeWarning::DanglingEdge {
                from_id: edge.from_id.clone(),
                to_id: edge.to_id.clone(),
            });
            continue;
        };
        let links: &mut Vec<Link> = &mut adjacency[from];
        if links.iter().any(|link| link.child == child) {
            warnings.push(BakeWarning::DuplicateEdge {
                from_id: edge.from_id.clone(),
                to_id: edge.to_id.clone(),
            });
            continue;
        }
        links.push(Link {
            child,
            port: edge.from_port,
        });
    }
    adjacency
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Visit {
    Unvisited,
    InProgress,
    Done,
}

/// Depth-first search with an explicit stack, so deep graphs cannot overflow the call
/// stack. Returns the positions along the first cycle found, the first position repeated
/// at the end.
fn find_cycle(adjacency: &[Vec<Link>]) -> Option<Vec<usize>> {
    let mut state = vec![Visit::Unvisited; adjacency.len()];
    // (node, next edge to follow)
    let mut stack: Vec<(usize, usize)> = vec![];

    for start in 0..adjacency.len() {
        if state[start] != Visit::Unvisited {
            continue;
        }
        state[start] = Visit::InProgress;
        stack.push((start, 0));

        while let Some(top) = stack.last_mut() {
            let (node, next) = *top;
            let Some(link) = adjacency[node].get(next) else {
                state[node] = Visit::Done;
                stack.pop();
                continue;
            };
            top.1 += 1;
            match state[link.child] {
                Visit::Unvisited => {
                    state[link.child] = Visit::InProgress;
                    stack.push((link.child, 0));
                }
                Visit::InProgress => {
                    let begin = stack
                        .iter()
                        .position(|&(n, _)| n == link.child)
                        .unwrap_or_default();
                    let mut path: Vec<usize> = stack[begin..].iter().map(|&(n, _)| n).collect();
                    path.push(link.child);
                    return Some(path);
                }
                Visit::Done => {}
            }
        }
    }
    None
}

/// Returns the parent position of every node.
fn check_single_parent(
    graph: &GraphDesc,
    adjacency: &[Vec<Link>],
) -> Result<Vec<Option<usize>>, BakeError> {
    let mut parents = vec![None; adjacency.len()];
    for (parent, links) in adjacency.iter().enumerate() {
        for link in links {
            if let Some(first) = parents[link.child].replace(parent) {
                return Err(BakeError::MultipleParents {
                    child: graph.nodes[link.child].id.clone(),
                    first: graph.nodes[first].id.clone(),
                    second: graph.nodes[parent].id.clone(),
                });
            }
        }
    }
    Ok(parents)
}

fn resolve_node(
    node: &GraphNode,
    catalog: &ActionCatalog,
    warnings: &mut Vec<BakeWarning>,
) -> NodeRecord {
    let params = Params::new(&node.params);

    if let Some(kind) = NodeKind::from_control_tag(&node.ty) {
        return match kind {
            NodeKind::Repeater => NodeRecord::repeater(params.i32_or("count", -1)),
            NodeKind::Interrupt => NodeRecord::interrupt(hash32(params.str_or("key", ""))),
            kind => NodeRecord::new(kind),
        };
    }

    let action = if node.ty == GENERIC_ACTION_TAG {
        params.str_or("task", "")
    } else {
        node.ty.as_str()
    };

    match catalog.get(action) {
        Some(definition) => {
            let slots = definition.map(&node.params);
            NodeRecord {
                kind: slots.kind,
                params_i: slots.params_i,
                params_f: slots.params_f,
                ..NodeRecord::default()
            }
        }
        None => {
            warnings.push(BakeWarning::UnknownAction {
                id: node.id.clone(),
                action: action.to_owned(),
            });
            NodeRecord::new(NodeKind::Action)
        }
    }
}

#[cfg(test)]
mod test;
