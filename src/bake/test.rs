use super::*;
use crate::{action::kind, buffer::NO_NODE, graph::GraphEdge};
use proptest::prelude::*;

fn node(id: &str, ty: &str) -> GraphNode {
    GraphNode::new(id, ty)
}

fn bake_default(graph: &GraphDesc) -> Result<BakeOutput, BakeError> {
    bake(graph, &ActionCatalog::default())
}

#[test]
fn test_empty_graph() -> anyhow::Result<()> {
    let out = bake_default(&GraphDesc::new())?;
    assert_eq!(out.tree.nodes(), [NodeRecord::new(NodeKind::Selector)]);
    assert!(out.tree.id_to_index().is_empty());
    assert!(out.warnings.is_empty());

    let out = bake_default(&GraphDesc::new().edge("a", "b"))?;
    assert_eq!(out.tree.nodes(), [NodeRecord::new(NodeKind::Selector)]);
    assert_eq!(
        out.warnings,
        [BakeWarning::DanglingEdge {
            from_id: "a".into(),
            to_id: "b".into()
        }]
    );
    Ok(())
}

#[test]
fn test_bake_sequence() -> anyhow::Result<()> {
    let graph = GraphDesc::new()
        .node(node("root", "Sequence"))
        .node(node("w", "Wait").with_param("seconds", "1.5"))
        .node(node("set", "SetBlackboard").with_param("key", "alert").with_param("value", 1))
        .edge("root", "w")
        .edge("root", "set");
    let out = bake_default(&graph)?;
    let nodes = out.tree.nodes();

    assert_eq!(nodes.len(), 3);
    assert_eq!(nodes[0].kind, NodeKind::Sequence);
    assert_eq!(nodes[0].first_child, 1);
    assert_eq!(nodes[1].kind, NodeKind::Action);
    assert_eq!(nodes[1].action_hash(), *kind::WAIT);
    assert_eq!(nodes[1].params_f[0], 1.5);
    assert_eq!(nodes[1].next_sibling, 2);
    assert_eq!(nodes[2].kind, NodeKind::SetBlackboard);
    assert_eq!(nodes[2].key_hash(), hash32("alert"));
    assert_eq!(nodes[2].next_sibling, NO_NODE);
    assert_eq!(out.tree.index_of("set"), Some(2));
    Ok(())
}

#[test]
fn test_root_is_moved_to_front() -> anyhow::Result<()> {
    let graph = GraphDesc::new()
        .node(node("leaf", "Wait"))
        .node(node("root", "Selector"))
        .edge("root", "leaf");
    let out = bake_default(&graph)?;
    assert_eq!(out.tree.id_of(0), Some("root"));
    assert_eq!(out.tree.id_of(1), Some("leaf"));
    assert_eq!(out.tree.children(0).collect::<Vec<_>>(), [1]);
    Ok(())
}

#[test]
fn test_children_sorted_by_order_then_port() -> anyhow::Result<()> {
    let mut graph = GraphDesc::new()
        .node(node("root", "Parallel"))
        .node(node("a", "Wait").with_order(2))
        .node(node("b", "Wait").with_order(1))
        .node(node("c", "Wait").with_order(1));
    graph.edges = vec![
        GraphEdge::new("root", "a"),
        GraphEdge::new("root", "b").with_port(5),
        GraphEdge::new("root", "c").with_port(3),
    ];
    let out = bake_default(&graph)?;
    let ids: Vec<_> = out
        .tree
        .children(0)
        .map(|i| out.tree.id_of(i).unwrap())
        .collect();
    assert_eq!(ids, ["c", "b", "a"]);
    Ok(())
}

#[test]
fn test_control_params() -> anyhow::Result<()> {
    let graph = GraphDesc::new()
        .node(node("r", "Repeater").with_param("count", 3))
        .node(node("forever", "Repeater"))
        .node(node("i", "Interrupt").with_param("key", "alarm"))
        .edge("r", "forever")
        .edge("forever", "i");
    let nodes = bake_default(&graph)?.tree.nodes().to_vec();
    assert_eq!(nodes[0].repeat_count(), 3);
    assert_eq!(nodes[1].repeat_count(), -1);
    assert_eq!(nodes[2].key_hash(), hash32("alarm"));
    Ok(())
}

#[test]
fn test_generic_action_uses_task() -> anyhow::Result<()> {
    let graph = GraphDesc::new().node(
        node("a", GENERIC_ACTION_TAG)
            .with_param("task", "Wait")
            .with_param("seconds", 3),
    );
    let out = bake_default(&graph)?;
    assert_eq!(out.tree.nodes()[0].action_hash(), *kind::WAIT);
    assert_eq!(out.tree.nodes()[0].params_f[0], 3.);
    assert!(out.warnings.is_empty());
    Ok(())
}

#[test]
fn test_unknown_action_is_neutral() -> anyhow::Result<()> {
    let graph = GraphDesc::new()
        .node(node("root", "Sequence"))
        .node(node("x", "Dance").with_param("style", "waltz"))
        .edge("root", "x");
    let out = bake_default(&graph)?;
    assert_eq!(out.tree.nodes()[1], NodeRecord::new(NodeKind::Action));
    assert_eq!(
        out.warnings,
        [BakeWarning::UnknownAction {
            id: "x".into(),
            action: "Dance".into()
        }]
    );
    Ok(())
}

#[test]
fn test_dangling_and_duplicate_edges() -> anyhow::Result<()> {
    let graph = GraphDesc::new()
        .node(node("root", "Sequence"))
        .node(node("w", "Wait"))
        .edge("root", "w")
        .edge("root", "w")
        .edge("root", "ghost");
    let out = bake_default(&graph)?;
    assert_eq!(out.tree.children(0).count(), 1);
    assert_eq!(
        out.warnings,
        [
            BakeWarning::DuplicateEdge {
                from_id: "root".into(),
                to_id: "w".into()
            },
            BakeWarning::DanglingEdge {
                from_id: "root".into(),
                to_id: "ghost".into()
            },
        ]
    );
    Ok(())
}

#[test]
fn test_cycle_path() {
    let graph = GraphDesc::new()
        .node(node("a", "Sequence"))
        .node(node("b", "Selector"))
        .node(node("c", "Invert"))
        .edge("a", "b")
        .edge("b", "c")
        .edge("c", "b");
    let err = bake_default(&graph).unwrap_err();
    let path: Vec<_> = err
        .cycle_path()
        .unwrap()
        .iter()
        .map(|n| n.id.as_str())
        .collect();
    assert_eq!(path, ["b", "c", "b"]);
    assert_eq!(
        err.to_string(),
        "cycle detected: Selector[1] -> Invert[2] -> Selector[1]"
    );
}

#[test]
fn test_self_loop() {
    let graph = GraphDesc::new()
        .node(node("a", "Succeeder"))
        .edge("a", "a");
    let err = bake_default(&graph).unwrap_err();
    assert_eq!(err.cycle_path().map(<[_]>::len), Some(2));
}

#[test]
fn test_structural_errors() {
    let graph = GraphDesc::new()
        .node(node("a", "Sequence"))
        .node(node("a", "Wait"));
    assert!(matches!(
        bake_default(&graph),
        Err(BakeError::DuplicateNodeId { id }) if id == "a"
    ));

    let graph = GraphDesc::new()
        .node(node("p", "Sequence"))
        .node(node("q", "Sequence"))
        .node(node("c", "Wait"))
        .edge("p", "c")
        .edge("q", "c");
    assert!(matches!(
        bake_default(&graph),
        Err(BakeError::MultipleParents { child, .. }) if child == "c"
    ));
}

/// A random forest: node `i > 0` either has a parent among `0..i` or is a root.
fn forest() -> impl Strategy<Value = GraphDesc> {
    (1usize..24)
        .prop_flat_map(|len| {
            (
                Just(len),
                prop::collection::vec(prop::option::of(any::<prop::sample::Index>()), len),
                prop::collection::vec(0i32..4, len),
            )
        })
        .prop_map(|(len, parents, orders)| {
            let tags = ["Sequence", "Selector", "Parallel", "Wait", "Succeeder"];
            let mut graph = GraphDesc::new();
            for i in 0..len {
                graph = graph.node(node(&format!("n{i}"), tags[i % tags.len()]).with_order(orders[i]));
            }
            for (i, parent) in parents.iter().enumerate().skip(1) {
                if let Some(parent) = parent {
                    let parent = parent.index(i);
                    graph = graph.edge(&format!("n{parent}"), &format!("n{i}"));
                }
            }
            graph
        })
}

proptest! {
    #[test]
    fn prop_bake_is_deterministic(graph in forest()) {
        let first = bake_default(&graph).unwrap();
        let second = bake_default(&graph).unwrap();
        prop_assert_eq!(first.tree.nodes(), second.tree.nodes());
        prop_assert_eq!(first.tree.id_to_index(), second.tree.id_to_index());
        prop_assert!(TreeBuffer::from_nodes(first.tree.nodes().to_vec(), vec![]).is_ok());
    }

    #[test]
    fn prop_back_edge_is_a_cycle(graph in forest(), pick in any::<prop::sample::Index>()) {
        prop_assume!(!graph.edges.is_empty());
        let edge = graph.edges[pick.index(graph.edges.len())].clone();
        let graph = graph.edge(&edge.to_id, &edge.from_id);
        let err = bake_default(&graph).unwrap_err();
        let path = err.cycle_path().unwrap();
        prop_assert!(path.len() >= 3);
        prop_assert_eq!(&path[0], path.last().unwrap());
    }
}
