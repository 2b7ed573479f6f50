use futures::executor::block_on;
use proptest::prelude::*;
use skein_core::prelude::*;
use skein_graph::prelude::*;
use std::collections::HashMap;

const NODES: usize = 8;

fn arb_edge_type() -> impl Strategy<Value = EdgeType> {
    prop_oneof![
        Just(EdgeType::ExplicitLink),
        Just(EdgeType::Sequence),
        Just(EdgeType::Causes),
        Just(EdgeType::Semantic),
        Just(EdgeType::Mention),
    ]
}

fn arb_edges() -> impl Strategy<Value = Vec<(usize, usize, EdgeType, f64)>> {
    prop::collection::vec((0..NODES, 0..NODES, arb_edge_type(), 0.05f64..=1.0), 0..24)
}

fn name(i: usize) -> String {
    format!("n{}", i)
}

fn build(edges: &[(usize, usize, EdgeType, f64)]) -> InMemoryGraph {
    let mut graph = InMemoryGraph::new();
    for i in 0..NODES {
        graph.add_node(Node::new(name(i), NodeType::Note, &name(i), &name(i))).unwrap();
    }
    for (from, to, edge_type, strength) in edges {
        graph
            .add_edge(Edge::new(name(*from), name(*to), *edge_type).with_strength(*strength))
            .unwrap();
    }
    graph
}

fn connected(
    edges: &[(usize, usize, EdgeType, f64)],
    allowed: &EdgeTypeSet,
    a: &NodeId,
    b: &NodeId,
    undirected: bool,
) -> bool {
    edges.iter().any(|(from, to, t, _)| {
        let (from, to) = (name(*from), name(*to));
        allowed.contains(*t)
            && ((from == a.as_str() && to == b.as_str())
                || (undirected && from == b.as_str() && to == a.as_str()))
    })
}

proptest! {
    #[test]
    fn expansion_stays_within_budget_and_reach(
        edges in arb_edges(),
        seeds in prop::collection::vec((0..NODES, 0.1f64..=1.0), 1..4),
        max_depth in 1usize..4,
        budget in 1usize..10,
        incoming in any::<bool>(),
    ) {
        let graph = build(&edges);
        let allowed = EdgeTypeSet::of(&[EdgeType::ExplicitLink, EdgeType::Sequence, EdgeType::Semantic]);
        let mut config = ExpansionConfig::default()
            .with_max_depth(max_depth)
            .with_budget(budget)
            .with_decay(0.7)
            .with_edge_types(allowed.clone());
        if !incoming {
            config = config.outgoing_only();
        }
        let seeds: Vec<(NodeId, f64)> = seeds.iter().map(|(i, s)| (NodeId::new(name(*i)), *s)).collect();

        let results = block_on(expand(&graph, &seeds, &config)).unwrap();

        prop_assert!(results.len() <= budget);
        let scores: HashMap<&NodeId, f64> = results.iter().map(|r| (&r.node_id, r.score)).collect();
        for r in &results {
            prop_assert!(r.path.len() - 1 <= max_depth);
            prop_assert_eq!(r.path.len() - 1, r.depth);
            prop_assert_eq!(r.path.last(), Some(&r.node_id));
            for hop in r.path.windows(2) {
                prop_assert!(connected(&edges, &allowed, &hop[0], &hop[1], incoming));
            }
            // Along the recorded path relevance never grows.
            if r.path.len() >= 2 {
                let parent = &r.path[r.path.len() - 2];
                prop_assert!(r.score <= scores[parent] + 1e-12);
            }
        }
    }

    #[test]
    fn diverse_paths_are_simple_shortest_first_and_dissimilar(
        edges in arb_edges(),
        from in 0..NODES,
        to in 0..NODES,
        k in 1usize..5,
        threshold in 0.0f64..=1.0,
    ) {
        let graph = build(&edges);
        let options = PathOptions::default().with_k(k).with_overlap_threshold(threshold);
        let search = block_on(k_shortest_paths(
            &graph,
            &NodeId::new(name(from)),
            &NodeId::new(name(to)),
            &options,
        ))
        .unwrap();

        prop_assert!(search.paths.len() <= k);
        if search.paths.is_empty() {
            prop_assert_eq!(search.reason, SearchReason::NoPath);
        }
        if let Some(first) = search.paths.first() {
            prop_assert!(search.paths.iter().all(|p| p.hop_count >= first.hop_count));
        }
        for (i, p) in search.paths.iter().enumerate() {
            prop_assert!(p.is_simple());
            prop_assert_eq!(p.edges.len(), p.nodes.len() - 1);
            prop_assert!(p.hop_count <= options.max_depth);
            for q in &search.paths[..i] {
                prop_assert!(path_overlap(&p.nodes, &q.nodes) <= threshold);
            }
        }
    }

    #[test]
    fn shortest_path_agrees_with_diverse_search(
        edges in arb_edges(),
        from in 0..NODES,
        to in 0..NODES,
    ) {
        let graph = build(&edges);
        let (a, b) = (NodeId::new(name(from)), NodeId::new(name(to)));
        let single = block_on(shortest_path(&graph, &a, &b, &EdgeTypeSet::all())).unwrap();
        let options = PathOptions::default().with_k(1).with_max_depth(NODES);
        let search = block_on(k_shortest_paths(&graph, &a, &b, &options)).unwrap();

        match single {
            Some(path) => {
                prop_assert_eq!(path.first(), Some(&a));
                prop_assert_eq!(path.last(), Some(&b));
                prop_assert_eq!(search.paths[0].hop_count, path.len() - 1);
            }
            None => prop_assert_eq!(search.reason, SearchReason::NoPath),
        }
    }
}
