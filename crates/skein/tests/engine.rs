use serde_json::Value;
use skein::prelude::*;

fn campaign() -> Skein {
    let mut graph = InMemoryGraph::new();
    let scenes = [
        ("arrival", "Arrival at the Harbor"),
        ("tavern", "The Tavern Brawl"),
        ("chase", "Rooftop Chase"),
        ("escape", "Escape by Sea"),
    ];
    for (id, title) in scenes {
        graph
            .add_node(Node::new(id, NodeType::Scene, title, &format!("scenes/{}.md", id)))
            .unwrap();
    }
    graph.link("arrival", "tavern", EdgeType::Sequence).unwrap();
    graph.link("tavern", "chase", EdgeType::Causes).unwrap();
    graph.link("chase", "escape", EdgeType::Sequence).unwrap();
    graph
        .add_edge(Edge::new("arrival", "escape", EdgeType::Semantic).with_strength(0.9))
        .unwrap();

    let mut index = InMemoryTextIndex::new();
    index.add_document("arrival", "The ship docks at the harbor at dawn.");
    index.add_document("tavern", "A brawl breaks out in the tavern.");
    index.add_document("chase", "Guards chase the party across rooftops.");
    index.add_document("escape", "The party escapes aboard a fishing boat.");

    let config = EngineConfig::from_toml_str("[paths]\nk = 2\n").unwrap();
    Skein::in_memory(graph, index, config).unwrap()
}

#[tokio::test]
async fn paths_use_configured_options() {
    let skein = campaign();
    let search = skein.k_shortest_paths(&"arrival".into(), &"escape".into()).await.unwrap();
    assert_eq!(search.reason, SearchReason::FoundAll);
    assert_eq!(search.paths.len(), 2);
    assert_eq!(search.paths[0].hop_count, 1);
    assert_eq!(search.paths[1].hop_count, 3);
    // sequence + causes + sequence
    assert!((search.paths[1].score - 3.4).abs() < 1e-12);

    let single = skein.shortest_path(&"tavern".into(), &"escape".into()).await.unwrap();
    assert_eq!(single.map(|p| p.len()), Some(3));
}

#[tokio::test]
async fn export_matches_json_shape() {
    let skein = campaign();
    let options = PathOptions::default()
        .with_k(4)
        .with_edge_types(EdgeTypeSet::resolve(None, &[EdgeType::Semantic]).unwrap());
    let export = skein.export_paths(&"arrival".into(), &"escape".into(), &options).await.unwrap();

    let json: Value = serde_json::from_str(&export.to_json().unwrap()).unwrap();
    assert_eq!(json["fromId"], "arrival");
    assert_eq!(json["options"]["k"], 4);
    assert_eq!(json["options"]["maxDepth"], 6);
    assert_eq!(json["returnedCount"], 1);
    assert_eq!(json["reason"], "exhausted_candidates");
    assert_eq!(json["paths"][0]["edges"], serde_json::json!(["sequence", "causes", "sequence"]));
}

#[tokio::test]
async fn retrieval_and_expansion_share_the_graph() {
    let skein = campaign();

    let expanded = skein.expand(&[("tavern".into(), 1.0)]).await.unwrap();
    assert_eq!(expanded[0].node_id.as_str(), "tavern");
    assert_eq!(expanded.len(), 4);

    // Equal weights: the top lexical and top graph fragments tie, ids decide.
    let result = skein.retrieve("tavern brawl").await.unwrap();
    let ids: Vec<&str> = result.blocks.iter().map(|b| b.node_id.as_str()).collect();
    assert_eq!(ids, vec!["chase", "tavern", "arrival", "escape"]);
    assert!(result.fragments.len() <= skein.config().retrieval.max_results);
    let total: f64 = result.provenance.iter().map(|p| p.contribution).sum();
    assert!((total - 1.0).abs() < 1e-9);

    let narrow = skein
        .retrieval_options()
        .with_depth(1)
        .with_node_types(&[NodeType::Scene])
        .excluding("chase");
    let result = skein.retrieve_with("tavern brawl", &narrow).await.unwrap();
    let ids: Vec<&str> = result.blocks.iter().map(|b| b.node_id.as_str()).collect();
    assert_eq!(ids, vec!["arrival", "tavern"]);
}

#[test]
fn invalid_config_is_rejected_at_construction() {
    let mut config = EngineConfig::default();
    config.paths.k = 0;
    let err = Skein::in_memory(InMemoryGraph::new(), InMemoryTextIndex::new(), config).unwrap_err();
    assert!(matches!(err, SkeinError::Config(ConfigError::NonPositive { field: "k" })));
}
