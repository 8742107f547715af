//! Batch ingestion of extraction output into a symbol graph

use serde::{Deserialize, Serialize};

use crate::error::GraphError;
use crate::graph::SymbolGraph;
use crate::model::{Edge, Symbol};

/// The payload produced by the source-extraction collaborator: flat lists of
/// symbols and edges, serialized as JSON at the tool boundary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractionBundle {
    pub symbols: Vec<Symbol>,
    pub edges: Vec<Edge>,
}

/// Outcome of a batch build: the graph that could be constructed, plus every
/// per-item failure encountered along the way.
#[derive(Debug)]
pub struct BuildOutcome {
    pub graph: SymbolGraph,
    pub issues: Vec<GraphError>,
}

impl BuildOutcome {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Build a graph from extraction output.
///
/// A failed insertion (duplicate symbol id, dangling edge endpoint, bad
/// strength) aborts only that item; everything else still lands in the
/// graph, and all failures are collected for the caller to report together.
pub fn build_graph(bundle: ExtractionBundle) -> BuildOutcome {
    let mut graph = SymbolGraph::new();
    let mut issues = Vec::new();

    let symbol_total = bundle.symbols.len();
    let edge_total = bundle.edges.len();

    for symbol in bundle.symbols {
        if let Err(e) = graph.insert_symbol(symbol) {
            issues.push(e);
        }
    }
    for edge in bundle.edges {
        if let Err(e) = graph.insert_edge(edge) {
            issues.push(e);
        }
    }

    tracing::debug!(
        symbols = graph.symbol_count(),
        edges = graph.edge_count(),
        rejected = issues.len(),
        symbol_total,
        edge_total,
        "built symbol graph"
    );

    BuildOutcome { graph, issues }
}
