//! The [`Skein`] engine handle.

use crate::config::EngineConfig;
use skein_core::context::StoreContext;
use skein_core::error::Result;
use skein_core::memory::InMemoryGraph;
use skein_core::text_index::InMemoryTextIndex;
use skein_core::types::NodeId;
use skein_graph::diverse::{k_shortest_paths, PathOptions, PathSearch};
use skein_graph::expansion::{expand, ExpansionConfig, ExpansionResult};
use skein_graph::export::PathExport;
use skein_graph::shortest::shortest_path;
use skein_rag::context::{ContextAssembler, RetrievalOptions, RetrievalResult};
use std::sync::Arc;
use tracing::info;

/// Store handles plus the configuration every call defaults to.
///
/// Holds no mutable state; concurrent calls on one handle are independent.
#[derive(Debug, Clone)]
pub struct Skein {
    ctx: StoreContext,
    config: EngineConfig,
    assembler: ContextAssembler,
}

impl Skein {
    /// Build an engine. The config is validated up front.
    pub fn new(ctx: StoreContext, config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            assembler: ContextAssembler::new(ctx.clone()),
            ctx,
            config,
        })
    }

    /// Build an engine over the in-memory stores.
    pub fn in_memory(graph: InMemoryGraph, index: InMemoryTextIndex, config: EngineConfig) -> Result<Self> {
        info!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            fragments = index.fragment_count(),
            "in-memory vault loaded"
        );
        Self::new(StoreContext::with_text_index(Arc::new(graph), Arc::new(index)), config)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn context(&self) -> &StoreContext {
        &self.ctx
    }

    /// Expand from seeds with the configured expansion settings.
    pub async fn expand(&self, seeds: &[(NodeId, f64)]) -> Result<Vec<ExpansionResult>> {
        self.expand_with(seeds, &self.config.expansion).await
    }

    pub async fn expand_with(&self, seeds: &[(NodeId, f64)], config: &ExpansionConfig) -> Result<Vec<ExpansionResult>> {
        expand(self.ctx.graph.as_ref(), seeds, config).await
    }

    /// Fewest-hop path over the configured path edge types.
    pub async fn shortest_path(&self, from: &NodeId, to: &NodeId) -> Result<Option<Vec<NodeId>>> {
        shortest_path(self.ctx.graph.as_ref(), from, to, &self.config.paths.edge_types).await
    }

    pub async fn k_shortest_paths(&self, from: &NodeId, to: &NodeId) -> Result<PathSearch> {
        self.k_shortest_paths_with(from, to, &self.config.paths).await
    }

    pub async fn k_shortest_paths_with(&self, from: &NodeId, to: &NodeId, options: &PathOptions) -> Result<PathSearch> {
        k_shortest_paths(self.ctx.graph.as_ref(), from, to, options).await
    }

    /// Run a path search and package it for export.
    pub async fn export_paths(&self, from: &NodeId, to: &NodeId, options: &PathOptions) -> Result<PathExport> {
        let search = self.k_shortest_paths_with(from, to, options).await?;
        Ok(PathExport::new(from, to, options, &search))
    }

    /// Options for [`retrieve_with`](Self::retrieve_with) seeded from the config.
    pub fn retrieval_options(&self) -> RetrievalOptions {
        self.config.retrieval_options()
    }

    pub async fn retrieve(&self, query: &str) -> Result<RetrievalResult> {
        self.assembler.retrieve(query, &self.retrieval_options()).await
    }

    pub async fn retrieve_with(&self, query: &str, options: &RetrievalOptions) -> Result<RetrievalResult> {
        self.assembler.retrieve(query, options).await
    }
}
