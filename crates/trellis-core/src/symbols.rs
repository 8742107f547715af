//! Symbol index for name- and file-based lookup

use std::path::{Path, PathBuf};

use dashmap::DashMap;

use crate::graph::SymbolGraph;
use crate::model::{Symbol, SymbolId};

/// Lookup table mapping symbol names and file paths to symbol ids.
/// Thread-safe for concurrent access.
///
/// This is a convenience layer for callers that hold human-friendly
/// references (a bare name, a file path); the core algorithms only ever see
/// resolved `SymbolId`s and never consult the index.
pub struct SymbolIndex {
    by_name: DashMap<String, Vec<SymbolId>>,
    by_file: DashMap<PathBuf, Vec<SymbolId>>,
}

impl SymbolIndex {
    pub fn new() -> Self {
        SymbolIndex {
            by_name: DashMap::new(),
            by_file: DashMap::new(),
        }
    }

    /// Build an index over every symbol in a graph.
    pub fn from_graph(graph: &SymbolGraph) -> Self {
        let index = SymbolIndex::new();
        for symbol in graph.symbols() {
            index.insert(symbol);
        }
        index
    }

    /// Insert a symbol.
    pub fn insert(&self, symbol: &Symbol) {
        self.by_name
            .entry(symbol.name.clone())
            .or_default()
            .push(symbol.id.clone());
        self.by_file
            .entry(symbol.file_path.clone())
            .or_default()
            .push(symbol.id.clone());
    }

    /// All symbol ids carrying the given name.
    pub fn lookup_name(&self, name: &str) -> Vec<SymbolId> {
        self.by_name
            .get(name)
            .map(|r| r.value().clone())
            .unwrap_or_default()
    }

    /// All symbol ids defined in a file.
    pub fn symbols_in_file(&self, file_path: &Path) -> Vec<SymbolId> {
        self.by_file
            .get(file_path)
            .map(|r| r.value().clone())
            .unwrap_or_default()
    }

    /// Remove all symbols for a file.
    pub fn remove_file(&self, file_path: &Path) {
        if let Some((_, ids)) = self.by_file.remove(file_path) {
            for id in ids {
                for mut entry in self.by_name.iter_mut() {
                    entry.value_mut().retain(|candidate| candidate != &id);
                }
            }
            self.by_name.retain(|_, ids| !ids.is_empty());
        }
    }
}

impl Default for SymbolIndex {
    fn default() -> Self {
        Self::new()
    }
}
