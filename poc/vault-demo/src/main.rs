//! Vault Demo: how are two notes connected, and what is relevant to a query?
//!
//! 1. Load a small campaign vault (notes, typed links, bodies) from JSON
//! 2. Build the in-memory graph and text index
//! 3. Find diverse paths between two scenes and print them as a table,
//!    Markdown and JSON
//! 4. Retrieve fused context for a free-text query
//!
//! Set `SKEIN_LOG=debug` to watch the engines work.

use anyhow::{Context, Result};
use serde::Deserialize;
use skein::prelude::*;
use tracing::info;

#[derive(Debug, Deserialize)]
struct Vault {
    notes: Vec<NoteDef>,
}

#[derive(Debug, Deserialize)]
struct NoteDef {
    id: String,
    #[serde(rename = "type")]
    node_type: NodeType,
    title: String,
    path: String,
    body: String,
    #[serde(default)]
    links: Vec<LinkDef>,
}

#[derive(Debug, Deserialize)]
struct LinkDef {
    to: String,
    #[serde(rename = "type")]
    edge_type: EdgeType,
    strength: Option<f64>,
}

fn build(vault: &Vault) -> Result<(InMemoryGraph, InMemoryTextIndex)> {
    let mut graph = InMemoryGraph::new();
    let mut index = InMemoryTextIndex::new();

    for note in &vault.notes {
        graph.add_node(Node::new(note.id.as_str(), note.node_type, &note.title, &note.path))?;
        index.add_document(&note.id, &note.body);
    }
    for note in &vault.notes {
        for link in &note.links {
            let mut edge = Edge::new(note.id.as_str(), link.to.as_str(), link.edge_type);
            if let Some(strength) = link.strength {
                edge = edge.with_strength(strength).with_provenance(Provenance::Computed);
            }
            graph
                .add_edge(edge)
                .with_context(|| format!("linking {} -> {}", note.id, link.to))?;
        }
    }
    Ok((graph, index))
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    println!("╔══════════════════════════════════════════╗");
    println!("║  Skein: paths and context over a vault   ║");
    println!("╚══════════════════════════════════════════╝");
    println!();

    let vault: Vault = serde_json::from_str(include_str!("../data/vault.json"))
        .context("parsing embedded vault")?;
    let (graph, index) = build(&vault)?;
    let config = EngineConfig::discover().context("loading skein.toml")?;
    let skein = Skein::in_memory(graph, index, config)?;
    info!(notes = vault.notes.len(), "vault ready");

    // --- Path discovery ---
    let from = NodeId::from("arrival");
    let to = NodeId::from("lighthouse");
    let options = skein.config().paths.clone();
    let export = skein.export_paths(&from, &to, &options).await?;

    println!("Paths {} -> {}", from, to);
    println!("{}", export.render_table());
    println!("{}", export.render_verbose());
    println!("{}", export.render_markdown());
    println!("{}", export.to_json()?);
    println!();

    let direct = skein.shortest_path(&from, &to).await?;
    match direct {
        Some(path) => println!(
            "Shortest: {}",
            path.iter().map(|n| n.as_str()).collect::<Vec<_>>().join(" -> ")
        ),
        None => println!("Shortest: none"),
    }
    println!();

    // --- Retrieval ---
    let query = "smugglers ledger";
    let result = skein.retrieve(query).await?;
    println!("Context for \"{}\" ({} fragments)", query, result.fragments.len());
    println!("{}", result.render());
    println!();
    println!("Provenance:");
    for p in &result.provenance {
        let sources: Vec<&str> = p.sources.iter().map(|s| s.as_str()).collect();
        println!("  {:<12} {:>5.1}%  [{}]", p.node_id, p.contribution * 100.0, sources.join(", "));
    }
    println!();

    let scenes_only = skein.retrieval_options().with_node_types(&[NodeType::Scene]);
    let scenes = skein.retrieve_with(query, &scenes_only).await?;
    println!("{}", serde_json::to_string_pretty(&scenes)?);

    Ok(())
}
