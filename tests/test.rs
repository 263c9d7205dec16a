use std::sync::Arc;

use behavior_tree_blob::{
    action::kind, bake, builtin, hash32, Agent, ActionCatalog, ActionContext, ActionDefinition,
    BTState, BakeError, GraphDesc, NativeActionTable, NodeKind, NodeRecord, Trace, TreeBuffer,
};

/// A guard that patrols until it hears an alarm, then attacks once and goes back.
const GUARD: &str = r#"
nodes:
  - id: root
    type: Selector
  - id: alarm
    type: Interrupt
    params: { key: alarm }
  - id: patrol
    type: Repeater
    order: 1
    params: { count: "-1" }
  - id: walk
    type: Sequence
  - id: step
    type: Step
  - id: rest
    type: Wait
    order: 1
    params: { seconds: "0.2" }
  - id: attack
    type: Action
    order: 2
    params: { task: Attack, damage: "7.5" }
edges:
  - { from_id: root, to_id: alarm }
  - { from_id: alarm, to_id: patrol }
  - { from_id: patrol, to_id: walk }
  - { from_id: walk, to_id: step }
  - { from_id: walk, to_id: rest }
  - { from_id: root, to_id: attack }
"#;

#[derive(Default)]
struct Guard {
    steps: u32,
    damage_dealt: f32,
}

fn step(_: &NodeRecord, ctx: &mut ActionContext<Guard>) -> BTState {
    ctx.env.steps += 1;
    BTState::Success
}

fn attack(node: &NodeRecord, ctx: &mut ActionContext<Guard>) -> BTState {
    ctx.env.damage_dealt += node.params_f[0];
    BTState::Success
}

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn catalog() -> ActionCatalog {
    let mut catalog = ActionCatalog::default();
    catalog.register(ActionDefinition::new("Step"));
    catalog.register(
        ActionDefinition::new("Attack")
            .float("damage", "1", "Damage per hit")
            .bake(|p, slots| slots.params_f[0] = p.f32_or("damage", 1.)),
    );
    catalog
}

fn actions() -> NativeActionTable<Guard> {
    let mut table = NativeActionTable::new();
    table.register("Step", step);
    table.register("Attack", attack);
    builtin::register_native(&mut table);
    table
}

#[test]
fn test_guard_lifecycle() -> anyhow::Result<()> {
    init_logging();
    let graph = GraphDesc::from_yaml(GUARD)?;
    let out = bake(&graph, &catalog())?;
    assert!(out.warnings.is_empty());
    let tree = Arc::new(out.tree);
    assert_eq!(tree.id_of(0), Some("root"));
    assert_eq!(tree.nodes()[tree.index_of("attack").unwrap()].action_hash(), hash32("Attack"));

    let actions = actions();
    let mut agent = Agent::new(tree.clone());
    let mut guard = Guard::default();

    // Patrol: each tick steps, then waits
    for _ in 0..4 {
        assert_eq!(agent.tick(&actions, &mut guard, 0.1), BTState::Running);
    }
    assert_eq!(guard.steps, 4);
    assert_eq!(guard.damage_dealt, 0.);

    // The alarm interrupts the patrol, so the selector falls through to the attack
    agent.blackboard_mut().set(hash32("alarm"), 1.);
    let mut trace = Trace::new();
    let result = agent.tick_traced(&actions, &mut guard, 0.1, &mut trace.recorder());
    assert_eq!(result, BTState::Success);
    assert_eq!(guard.damage_dealt, 7.5);
    assert_eq!(guard.steps, 4);
    assert_eq!(
        trace.resolve(&tree),
        [
            (Some("alarm"), BTState::Failure),
            (Some("attack"), BTState::Success),
            (Some("root"), BTState::Success),
        ]
    );

    // The alarm was consumed; patrolling resumes
    assert_eq!(agent.blackboard().get(hash32("alarm")), 0.);
    assert_eq!(agent.tick(&actions, &mut guard, 0.1), BTState::Running);
    assert_eq!(guard.steps, 5);
    Ok(())
}

#[test]
fn test_concurrent_agents_share_one_tree() -> anyhow::Result<()> {
    let tree = Arc::new(bake(&GraphDesc::from_yaml(GUARD)?, &catalog())?.tree);
    let actions = actions();
    let mut agents: Vec<_> = (0..64).map(|_| Agent::new(tree.clone())).collect();
    let mut guards: Vec<_> = (0..64).map(|_| Guard::default()).collect();
    for agent in agents.iter_mut().step_by(2) {
        agent.blackboard_mut().set(hash32("alarm"), 1.);
    }

    std::thread::scope(|scope| {
        for (agents, guards) in agents.chunks_mut(16).zip(guards.chunks_mut(16)) {
            let actions = &actions;
            scope.spawn(move || {
                for (agent, guard) in agents.iter_mut().zip(guards.iter_mut()) {
                    agent.tick(actions, guard, 0.1);
                }
            });
        }
    });

    for (i, guard) in guards.iter().enumerate() {
        if i % 2 == 0 {
            assert_eq!((guard.steps, guard.damage_dealt), (0, 7.5));
        } else {
            assert_eq!((guard.steps, guard.damage_dealt), (1, 0.));
        }
    }
    assert_eq!(Arc::strong_count(&tree), 65);
    Ok(())
}

#[test]
fn test_rebake_and_swap() -> anyhow::Result<()> {
    let tree = Arc::new(bake(&GraphDesc::from_yaml(GUARD)?, &catalog())?.tree);
    let mut agent = Agent::new(tree);

    let mut graph = GraphDesc::from_yaml(GUARD)?;
    graph.nodes.retain(|node| node.id != "alarm" && node.id != "patrol");
    graph.edges.retain(|edge| edge.to_id == "attack");
    let rebaked = bake(&graph, &catalog())?;
    // The orphaned patrol nodes are kept as unreachable roots after the selector
    assert_eq!(rebaked.tree.nodes()[0].kind, NodeKind::Selector);

    let old = agent.swap_tree(Arc::new(rebaked.tree));
    assert_eq!(Arc::strong_count(&old), 1);
    let mut guard = Guard::default();
    assert_eq!(agent.tick(&actions(), &mut guard, 0.1), BTState::Success);
    assert_eq!(guard.damage_dealt, 7.5);
    Ok(())
}

#[test]
fn test_cyclic_graph_is_rejected() -> anyhow::Result<()> {
    init_logging();
    let graph = GraphDesc::from_json(
        r#"{
            "nodes": [
                { "id": "a", "type": "Sequence" },
                { "id": "b", "type": "Wait" }
            ],
            "edges": [
                { "fromId": "a", "toId": "b" },
                { "fromId": "b", "toId": "a" }
            ]
        }"#,
    )?;
    let err = bake(&graph, &ActionCatalog::default()).unwrap_err();
    assert!(matches!(err, BakeError::Cycle { .. }));
    assert_eq!(err.to_string(), "cycle detected: Sequence[0] -> Wait[1] -> Sequence[0]");
    Ok(())
}

#[test]
fn test_buffer_round_trips_through_json() -> anyhow::Result<()> {
    let tree = bake(&GraphDesc::from_yaml(GUARD)?, &catalog())?.tree;
    let json = serde_json::to_string(&tree)?;
    let loaded: TreeBuffer = serde_json::from_str(&json)?;
    assert_eq!(loaded, tree);
    assert_eq!(loaded.nodes()[tree.index_of("rest").unwrap()].action_hash(), *kind::WAIT);

    // Links are validated on the way in
    let broken = json.replacen("\"first_child\":1", "\"first_child\":0", 1);
    assert!(serde_json::from_str::<TreeBuffer>(&broken).is_err());
    Ok(())
}
