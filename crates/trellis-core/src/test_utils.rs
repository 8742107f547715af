//! Test fixtures for the core crate

use std::collections::{BTreeSet, HashMap};
use std::path::PathBuf;

use crate::graph::SymbolGraph;
use crate::layers::{Layer, LayerConfig, PathRule};
use crate::model::{ByteRange, Edge, EdgeKind, Symbol, SymbolId, SymbolKind};

/// A function symbol with the given id, placed in `file`.
pub fn sym_in(id: &str, file: &str) -> Symbol {
    Symbol {
        id: SymbolId::from(id),
        name: id.rsplit("::").next().unwrap_or(id).to_string(),
        kind: SymbolKind::Function,
        file_path: PathBuf::from(file),
        byte_range: ByteRange::new(0, 0),
        line_start: 1,
        line_end: 1,
    }
}

pub fn sym(id: &str) -> Symbol {
    sym_in(id, "src/lib.rs")
}

pub fn call_edge(source: &str, target: &str, strength: f32) -> Edge {
    Edge::new(source, target, EdgeKind::Calls, strength)
}

/// Build a graph from (source, target, strength) triples, creating the
/// endpoint symbols on first mention.
pub fn graph_from(edges: &[(&str, &str, f32)]) -> SymbolGraph {
    let mut graph = SymbolGraph::new();
    for (source, target, _) in edges {
        for id in [source, target] {
            if !graph.contains(&SymbolId::from(*id)) {
                graph.insert_symbol(sym(id)).unwrap();
            }
        }
    }
    for (source, target, strength) in edges {
        graph.insert_edge(call_edge(source, target, *strength)).unwrap();
    }
    graph
}

/// UI (level 0, no deps) ← Logic (level 1) ← Data (level 2), with symbols
/// assigned by `src/ui/`, `src/logic/`, `src/data/` path prefixes.
pub fn three_layer_config() -> LayerConfig {
    LayerConfig {
        layers: vec![
            Layer {
                name: "UI".to_string(),
                level: 0,
                allowed_deps: BTreeSet::new(),
            },
            Layer {
                name: "Logic".to_string(),
                level: 1,
                allowed_deps: BTreeSet::from([0]),
            },
            Layer {
                name: "Data".to_string(),
                level: 2,
                allowed_deps: BTreeSet::from([1]),
            },
        ],
        path_rules: vec![
            PathRule {
                prefix: "src/ui/".to_string(),
                layer: "UI".to_string(),
            },
            PathRule {
                prefix: "src/logic/".to_string(),
                layer: "Logic".to_string(),
            },
            PathRule {
                prefix: "src/data/".to_string(),
                layer: "Data".to_string(),
            },
        ],
        overrides: HashMap::new(),
    }
}

pub fn id(raw: &str) -> SymbolId {
    SymbolId::from(raw)
}
