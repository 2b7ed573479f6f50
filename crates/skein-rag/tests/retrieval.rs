use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use skein_core::prelude::*;
use skein_rag::prelude::*;
use std::sync::Arc;

fn vault() -> (InMemoryGraph, InMemoryTextIndex) {
    let mut graph = InMemoryGraph::new();
    graph.add_node(Node::new("harbor", NodeType::Location, "The Harbor", "places/harbor.md")).unwrap();
    graph.add_node(Node::new("smuggler", NodeType::Character, "Mara", "people/mara.md")).unwrap();
    graph.add_node(Node::new("ledger", NodeType::Object, "The Ledger", "things/ledger.md")).unwrap();
    graph.add_node(Node::new("keep", NodeType::Location, "The Keep", "places/keep.md")).unwrap();
    graph
        .add_node(
            Node::new("storm", NodeType::Event, "The Great Storm", "history/storm.md")
                .with_updated_at(Utc.with_ymd_and_hms(2010, 6, 1, 0, 0, 0).unwrap()),
        )
        .unwrap();
    graph.link("harbor", "smuggler", EdgeType::ExplicitLink).unwrap();
    graph.link("smuggler", "ledger", EdgeType::Mention).unwrap();

    let mut index = InMemoryTextIndex::new();
    index.add_document(
        "harbor",
        "The harbor smells of tar and rope.\n\nSmugglers unload crates at the harbor after dark.",
    );
    index.add_document("smuggler", "Mara runs the smuggling crew.\n\nShe keeps a ledger of every crate.");
    index.add_document("ledger", "The ledger lists bribes paid to officials.");
    index.add_document("keep", "The keep overlooks the valley.");
    index.add_document("storm", "A storm wrecked the harbor in the old days.");
    (graph, index)
}

fn assembler() -> ContextAssembler {
    let (graph, index) = vault();
    ContextAssembler::new(StoreContext::with_text_index(Arc::new(graph), Arc::new(index)))
}

fn block_ids(result: &RetrievalResult) -> Vec<&str> {
    result.blocks.iter().map(|b| b.node_id.as_str()).collect()
}

fn provenance_total(result: &RetrievalResult) -> f64 {
    result.provenance.iter().map(|p| p.contribution).sum()
}

#[tokio::test]
async fn lexical_and_graph_evidence_are_fused() {
    let result = assembler().retrieve("harbor", &RetrievalOptions::default()).await.unwrap();

    let order: Vec<&str> = result.fragments.iter().map(|f| f.fragment_id.as_str()).collect();
    assert_eq!(
        order,
        vec!["harbor#0", "smuggler#0", "harbor#1", "smuggler#1", "ledger#0", "storm#0"]
    );
    assert_eq!(block_ids(&result), vec!["harbor", "smuggler", "ledger", "storm"]);
    assert_eq!(result.seeds.len(), 2);

    let harbor = &result.blocks[0];
    assert_eq!(harbor.title, "The Harbor");
    assert_eq!(
        harbor.text,
        "The harbor smells of tar and rope.\n\nSmugglers unload crates at the harbor after dark."
    );

    let smuggler = result.provenance.iter().find(|p| p.node_id.as_str() == "smuggler").unwrap();
    assert_eq!(smuggler.sources.iter().collect::<Vec<_>>(), vec!["graph"]);
    assert!((provenance_total(&result) - 1.0).abs() < 1e-9);

    let rendered = result.render();
    assert!(rendered.starts_with("## The Harbor (harbor)\n\nThe harbor smells"));
    assert!(rendered.contains("## Mara (smuggler)"));
}

#[tokio::test]
async fn never_more_than_max_results() {
    for max_results in 1..=4 {
        let options = RetrievalOptions::default().with_max_results(max_results);
        let result = assembler().retrieve("harbor", &options).await.unwrap();
        assert!(result.fragments.len() <= max_results);
        assert!(!result.is_empty());
        assert!((provenance_total(&result) - 1.0).abs() < 1e-9);
    }

    let result = assembler()
        .retrieve("harbor", &RetrievalOptions::default().with_max_results(3))
        .await
        .unwrap();
    assert_eq!(block_ids(&result), vec!["harbor", "smuggler"]);
    assert_eq!(result.blocks[0].fragment_ids.len(), 2);
    assert!(result.provenance[0].contribution > result.provenance[1].contribution);
}

#[tokio::test]
async fn filters_apply_to_both_evidence_lists() {
    let after = Utc.with_ymd_and_hms(2015, 1, 1, 0, 0, 0).unwrap();
    let options = RetrievalOptions::default()
        .updated_between(Some(after), None)
        .excluding("smuggler");
    let result = assembler().retrieve("harbor", &options).await.unwrap();

    // The excluded node is still traversed, so the ledger behind it is reached.
    assert_eq!(block_ids(&result), vec!["harbor", "ledger"]);
    assert_eq!(result.seeds, vec![NodeId::from("harbor")]);

    let places = RetrievalOptions::default().with_node_types(&[NodeType::Location]);
    let result = assembler().retrieve("harbor", &places).await.unwrap();
    assert_eq!(block_ids(&result), vec!["harbor"]);
}

#[tokio::test]
async fn shallow_expansion_only_reaches_neighbors() {
    let options = RetrievalOptions::default().with_depth(1);
    let result = assembler().retrieve("harbor", &options).await.unwrap();
    assert!(!block_ids(&result).contains(&"ledger"));
    assert!(block_ids(&result).contains(&"smuggler"));
}

#[tokio::test]
async fn no_hits_means_empty_result() {
    let result = assembler().retrieve("zeppelin", &RetrievalOptions::default()).await.unwrap();
    assert!(result.is_empty());
    assert!(result.blocks.is_empty());
    assert!(result.provenance.is_empty());
    assert_eq!(result.render(), "");
}

/// Lexical index that reports hits without offsets.
struct OffsetlessIndex(Arc<InMemoryTextIndex>);

#[async_trait]
impl LexicalIndex for OffsetlessIndex {
    async fn search_ranked(&self, query: &str, limit: usize) -> StoreResult<Vec<LexicalHit>> {
        let mut hits = self.0.search_ranked(query, limit).await?;
        for hit in &mut hits {
            hit.offset_start = None;
        }
        Ok(hits)
    }
}

#[tokio::test]
async fn missing_offsets_are_resolved_from_fragment_store() {
    let (graph, index) = vault();
    let index = Arc::new(index);
    let ctx = StoreContext::new(Arc::new(graph), Arc::new(OffsetlessIndex(index.clone())), index);

    let result = ContextAssembler::new(ctx)
        .retrieve("harbor smugglers", &RetrievalOptions::default())
        .await
        .unwrap();

    // harbor#1 ranks first lexically but the block keeps document order.
    assert_eq!(result.fragments[0].fragment_id.as_str(), "harbor#1");
    let ids: Vec<&str> = result.blocks[0].fragment_ids.iter().map(|f| f.as_str()).collect();
    assert_eq!(ids, vec!["harbor#0", "harbor#1"]);
}

struct FailingIndex;

#[async_trait]
impl LexicalIndex for FailingIndex {
    async fn search_ranked(&self, _: &str, _: usize) -> StoreResult<Vec<LexicalHit>> {
        Err(StoreError::Backend("index offline".into()))
    }
}

fn failing_assembler() -> ContextAssembler {
    let (graph, index) = vault();
    ContextAssembler::new(StoreContext::new(Arc::new(graph), Arc::new(FailingIndex), Arc::new(index)))
}

#[tokio::test]
async fn index_failure_aborts_retrieval() {
    let err = failing_assembler()
        .retrieve("harbor", &RetrievalOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, SkeinError::Store(StoreError::Backend(_))));
}

#[tokio::test]
async fn configuration_is_checked_before_any_lookup() {
    let err = failing_assembler()
        .retrieve("harbor", &RetrievalOptions::default().with_max_results(0))
        .await
        .unwrap_err();
    assert!(matches!(err, SkeinError::Config(ConfigError::NonPositive { field: "max_results" })));
}
