//! Serialisable and printable views of a path search.

use crate::diverse::{PathOptions, PathSearch, SearchReason};
use serde::{Deserialize, Serialize};
use skein_core::types::{EdgeType, NodeId};
use std::fmt::Write;

/// JSON export of one path search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathExport {
    pub from_id: NodeId,
    pub to_id: NodeId,
    pub options: ExportedOptions,
    pub returned_count: usize,
    pub reason: SearchReason,
    pub paths: Vec<ExportedPath>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedOptions {
    pub k: usize,
    pub max_depth: usize,
    pub max_extra: usize,
    pub overlap_threshold: f64,
    pub edge_types: Vec<EdgeType>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedPath {
    pub hop_count: usize,
    pub score: f64,
    pub nodes: Vec<NodeId>,
    pub edges: Vec<EdgeType>,
}

impl PathExport {
    pub fn new(from: &NodeId, to: &NodeId, options: &PathOptions, search: &PathSearch) -> Self {
        Self {
            from_id: from.clone(),
            to_id: to.clone(),
            options: ExportedOptions {
                k: options.k,
                max_depth: options.max_depth,
                max_extra: options.max_extra_hops,
                overlap_threshold: options.overlap_threshold,
                edge_types: options.edge_types.iter().collect(),
            },
            returned_count: search.paths.len(),
            reason: search.reason,
            paths: search
                .paths
                .iter()
                .map(|p| ExportedPath {
                    hop_count: p.hop_count,
                    score: p.score,
                    nodes: p.nodes.clone(),
                    edges: p.edges.clone(),
                })
                .collect(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// One row per path: index, hops, score and the node chain.
    pub fn render_table(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{:>3}  {:>4}  {:>6}  path", "#", "hops", "score");
        for (i, path) in self.paths.iter().enumerate() {
            let _ = writeln!(
                out,
                "{:>3}  {:>4}  {:>6.2}  {}",
                i + 1,
                path.hop_count,
                path.score,
                join_nodes(&path.nodes, " -> ")
            );
        }
        self.push_footer(&mut out);
        out
    }

    pub fn render_markdown(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "## Paths from `{}` to `{}`\n", self.from_id, self.to_id);
        if self.paths.is_empty() {
            let _ = writeln!(out, "_{}_", self.reason.describe());
            return out;
        }
        let _ = writeln!(out, "| # | Hops | Score | Path |");
        let _ = writeln!(out, "|---|------|-------|------|");
        for (i, path) in self.paths.iter().enumerate() {
            let chain = path
                .nodes
                .iter()
                .map(|n| format!("[[{}]]", n))
                .collect::<Vec<_>>()
                .join(" → ");
            let _ = writeln!(out, "| {} | {} | {:.2} | {} |", i + 1, path.hop_count, path.score, chain);
        }
        if self.reason != SearchReason::FoundAll {
            let _ = writeln!(out, "\n_{}_", self.reason.describe());
        }
        out
    }

    /// Each hop on its own line with the edge type it follows.
    pub fn render_verbose(&self) -> String {
        let mut out = String::new();
        for (i, path) in self.paths.iter().enumerate() {
            let _ = writeln!(
                out,
                "Path {} ({} hops, score {:.2})",
                i + 1,
                path.hop_count,
                path.score
            );
            if let Some(first) = path.nodes.first() {
                let _ = writeln!(out, "  {}", first);
            }
            for (edge, node) in path.edges.iter().zip(path.nodes.iter().skip(1)) {
                let _ = writeln!(out, "    --{}--> {}", edge, node);
            }
        }
        self.push_footer(&mut out);
        out
    }

    fn push_footer(&self, out: &mut String) {
        let _ = writeln!(
            out,
            "{} of {} paths ({}: {})",
            self.returned_count,
            self.options.k,
            self.reason,
            self.reason.describe()
        );
    }
}

fn join_nodes(nodes: &[NodeId], sep: &str) -> String {
    nodes.iter().map(|n| n.as_str()).collect::<Vec<_>>().join(sep)
}
