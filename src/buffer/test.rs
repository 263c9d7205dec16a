use super::*;

fn linked(kind: NodeKind, first_child: i32, next_sibling: i32) -> NodeRecord {
    NodeRecord {
        first_child,
        next_sibling,
        ..NodeRecord::new(kind)
    }
}

#[test]
fn test_accessors() {
    let node = NodeRecord::set_blackboard(42, 1.5);
    assert_eq!(node.kind, NodeKind::SetBlackboard);
    assert_eq!(node.key_hash(), 42);
    assert_eq!(node.value(), 1.5);
    assert_eq!(node.first_child(), None);
    assert_eq!(node.next_sibling(), None);

    assert_eq!(NodeRecord::repeater(-1).repeat_count(), -1);
    assert_eq!(NodeRecord::action(7).action_hash(), 7);
    assert_eq!(NodeRecord::default().kind, NodeKind::Selector);
}

#[test]
fn test_control_tags() {
    assert_eq!(
        NodeKind::from_control_tag("Repeater"),
        Some(NodeKind::Repeater)
    );
    assert_eq!(NodeKind::from_control_tag("Action"), None);
    assert_eq!(NodeKind::from_control_tag("selector"), None);
}

#[test]
fn test_children_iter() {
    let tree = TreeBuffer::from_nodes(
        vec![
            linked(NodeKind::Sequence, 1, -1),
            linked(NodeKind::Action, -1, 2),
            linked(NodeKind::Invert, 3, -1),
            linked(NodeKind::Action, -1, -1),
        ],
        vec![],
    )
    .unwrap();
    assert_eq!(tree.children(0).collect::<Vec<_>>(), vec![1, 2]);
    assert_eq!(tree.children(2).collect::<Vec<_>>(), vec![3]);
    assert_eq!(tree.children(3).count(), 0);
    assert_eq!(tree.children(99).count(), 0);
}

#[test]
fn test_validate_rejects() {
    assert_eq!(
        TreeBuffer::from_nodes(vec![], vec![]).unwrap_err(),
        TreeBufferError::Empty
    );
    assert_eq!(
        TreeBuffer::from_nodes(vec![linked(NodeKind::Sequence, 5, -1)], vec![]).unwrap_err(),
        TreeBufferError::LinkOutOfRange {
            node: 0,
            link: 5,
            len: 1
        }
    );
    assert_eq!(
        TreeBuffer::from_nodes(
            vec![
                linked(NodeKind::Sequence, 1, -1),
                linked(NodeKind::Sequence, 0, -1)
            ],
            vec![]
        )
        .unwrap_err(),
        TreeBufferError::RootIsLinked { from: 1 }
    );
    // Node 2 is both the first child of 0 and the sibling of 1
    assert_eq!(
        TreeBuffer::from_nodes(
            vec![
                linked(NodeKind::Sequence, 2, -1),
                linked(NodeKind::Action, -1, 2),
                linked(NodeKind::Action, -1, -1),
            ],
            vec![]
        )
        .unwrap_err(),
        TreeBufferError::SharedOrCyclic { node: 2 }
    );
    // 1 and 2 form a loop detached from the root
    assert_eq!(
        TreeBuffer::from_nodes(
            vec![
                linked(NodeKind::Sequence, -1, -1),
                linked(NodeKind::Sequence, 2, -1),
                linked(NodeKind::Sequence, -1, 1),
            ],
            vec![]
        )
        .unwrap_err(),
        TreeBufferError::SharedOrCyclic { node: 1 }
    );
}

#[test]
fn test_id_lookup() {
    let tree = TreeBuffer::from_nodes(
        vec![linked(NodeKind::Selector, -1, -1)],
        vec![NodeIndexEntry {
            id: "root".to_owned(),
            index: 0,
        }],
    )
    .unwrap();
    assert_eq!(tree.index_of("root"), Some(0));
    assert_eq!(tree.id_of(0), Some("root"));
    assert_eq!(tree.index_of("missing"), None);

    let err = TreeBuffer::from_nodes(
        vec![linked(NodeKind::Selector, -1, -1)],
        vec![NodeIndexEntry {
            id: "ghost".to_owned(),
            index: 4,
        }],
    )
    .unwrap_err();
    assert_eq!(
        err,
        TreeBufferError::IdOutOfRange {
            id: "ghost".to_owned(),
            index: 4,
            len: 1
        }
    );

    let json = r#"{"nodes":[{"kind":"Selector","first_child":-1,"next_sibling":-1,
        "params_i":[0,0,0],"params_f":[0,0,0,0]}],"id_to_index":[{"id":"ghost","index":4}]}"#;
    assert!(serde_json::from_str::<TreeBuffer>(json).is_err());
}

#[test]
fn test_serde_validates() {
    let json = r#"{"nodes":[{"kind":"Sequence","first_child":1,"next_sibling":-1,
        "params_i":[0,0,0],"params_f":[0,0,0,0]}]}"#;
    assert!(serde_json::from_str::<TreeBuffer>(json).is_err());

    let tree = TreeBuffer::from_nodes(
        vec![
            linked(NodeKind::Sequence, 1, -1),
            NodeRecord::action(3),
        ],
        vec![],
    )
    .unwrap();
    let text = serde_json::to_string(&tree).unwrap();
    let back: TreeBuffer = serde_json::from_str(&text).unwrap();
    assert_eq!(back, tree);
}
