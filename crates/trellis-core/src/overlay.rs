//! Copy-on-write overlay representing a proposed edit atop a base graph

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{GraphError, Result};
use crate::graph::{Direction, GraphView, SymbolGraph};
use crate::model::{Edge, EdgeKind, Symbol, SymbolId};

/// What a proposed edit does to a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditOperation {
    Create,
    Modify,
    Delete,
}

/// One proposed file-level change, expressed as its structural effect on
/// the graph: symbols it introduces, edges it introduces, symbols it
/// removes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edit {
    pub file_path: PathBuf,
    pub operation: EditOperation,
    #[serde(default)]
    pub new_symbols: Vec<Symbol>,
    #[serde(default)]
    pub new_edges: Vec<Edge>,
    #[serde(default)]
    pub removed_symbol_ids: Vec<SymbolId>,
}

type EdgeKey = (SymbolId, SymbolId, EdgeKind);

/// A private delta over a borrowed base graph.
///
/// Queries consult the delta first, then the base: added symbols shadow
/// nothing (collisions are rejected at construction), removed ids hide the
/// base symbol and all its incident edges, and an added edge that
/// duplicates a surviving base edge merges by max strength. The base graph
/// is never touched, so any number of overlays can exist over one base
/// concurrently.
#[derive(Debug)]
pub struct GraphOverlay<'a> {
    base: &'a SymbolGraph,
    added_symbols: HashMap<SymbolId, Symbol>,
    added_edges: Vec<Edge>,
    removed: HashSet<SymbolId>,
    /// Base edges overridden by a stronger added duplicate.
    shadowed: HashSet<EdgeKey>,
}

impl<'a> GraphOverlay<'a> {
    /// Build the overlay for a set of edits.
    ///
    /// Fails fast with `SymbolCollision` if a new symbol reuses an existing
    /// non-removed id (or is introduced twice), with `DanglingReference` if
    /// a new edge endpoint resolves to neither the base nor the delta, and
    /// with `InvalidInput` on an out-of-range strength.
    pub fn from_edits(base: &'a SymbolGraph, edits: &[Edit]) -> Result<Self> {
        let mut removed: HashSet<SymbolId> = HashSet::new();
        for edit in edits {
            removed.extend(edit.removed_symbol_ids.iter().cloned());
        }

        let mut added_symbols: HashMap<SymbolId, Symbol> = HashMap::new();
        for edit in edits {
            for symbol in &edit.new_symbols {
                let occupied = base.contains(&symbol.id) && !removed.contains(&symbol.id);
                if occupied || added_symbols.contains_key(&symbol.id) {
                    return Err(GraphError::SymbolCollision(symbol.id.clone()));
                }
                added_symbols.insert(symbol.id.clone(), symbol.clone());
            }
        }

        let resolves = |id: &SymbolId| {
            added_symbols.contains_key(id) || (base.contains(id) && !removed.contains(id))
        };
        let mut merged: HashMap<EdgeKey, Edge> = HashMap::new();
        for edit in edits {
            for edge in &edit.new_edges {
                if !(0.0..=1.0).contains(&edge.strength) {
                    return Err(GraphError::InvalidInput(format!(
                        "edge strength {} outside [0, 1]",
                        edge.strength
                    )));
                }
                if !resolves(&edge.source) {
                    return Err(GraphError::DanglingReference(edge.source.clone()));
                }
                if !resolves(&edge.target) {
                    return Err(GraphError::DanglingReference(edge.target.clone()));
                }
                let key = (edge.source.clone(), edge.target.clone(), edge.kind);
                merged
                    .entry(key)
                    .and_modify(|existing| {
                        if edge.strength > existing.strength {
                            existing.strength = edge.strength;
                        }
                    })
                    .or_insert_with(|| edge.clone());
            }
        }

        let mut shadowed: HashSet<EdgeKey> = HashSet::new();
        let mut added_edges: Vec<Edge> = Vec::new();
        for ((source, target, kind), edge) in merged {
            let base_strength = if removed.contains(&source) || removed.contains(&target) {
                None
            } else {
                base.neighbors(&source, Direction::Outgoing)
                    .find(|(e, neighbor)| **neighbor == target && e.kind == kind)
                    .map(|(e, _)| e.strength)
            };
            match base_strength {
                Some(existing) if existing >= edge.strength => {
                    // the base edge already carries this dependency
                }
                Some(_) => {
                    shadowed.insert((source, target, kind));
                    added_edges.push(edge);
                }
                None => added_edges.push(edge),
            }
        }
        added_edges.sort_by(|a, b| {
            (&a.source, &a.target, a.kind as u8).cmp(&(&b.source, &b.target, b.kind as u8))
        });

        Ok(GraphOverlay {
            base,
            added_symbols,
            added_edges,
            removed,
            shadowed,
        })
    }

    pub fn base(&self) -> &SymbolGraph {
        self.base
    }

    /// Ids of symbols introduced by the edit, sorted.
    pub fn new_symbol_ids(&self) -> Vec<SymbolId> {
        let mut ids: Vec<SymbolId> = self.added_symbols.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Edges introduced by the edit (after duplicate merging), sorted.
    pub fn new_edges(&self) -> &[Edge] {
        &self.added_edges
    }

    pub fn removed_ids(&self) -> &HashSet<SymbolId> {
        &self.removed
    }

    fn base_edge_survives(&self, edge: &Edge) -> bool {
        !self.removed.contains(&edge.source)
            && !self.removed.contains(&edge.target)
            && !self
                .shadowed
                .contains(&(edge.source.clone(), edge.target.clone(), edge.kind))
    }

    /// Neighborhood query answered delta-first, then from the surviving
    /// part of the base.
    pub fn neighbors(&self, id: &SymbolId, direction: Direction) -> Vec<(Edge, SymbolId)> {
        if GraphView::symbol(self, id).is_none() {
            return Vec::new();
        }
        let mut out = Vec::new();
        for edge in &self.added_edges {
            if matches!(direction, Direction::Outgoing | Direction::Both) && &edge.source == id {
                out.push((edge.clone(), edge.target.clone()));
            }
            if matches!(direction, Direction::Incoming | Direction::Both) && &edge.target == id {
                out.push((edge.clone(), edge.source.clone()));
            }
        }
        for (edge, neighbor) in self.base.neighbors(id, direction) {
            if self.base_edge_survives(edge) {
                out.push((edge.clone(), neighbor.clone()));
            }
        }
        out
    }
}

impl GraphView for GraphOverlay<'_> {
    fn symbol(&self, id: &SymbolId) -> Option<&Symbol> {
        if let Some(symbol) = self.added_symbols.get(id) {
            return Some(symbol);
        }
        if self.removed.contains(id) {
            return None;
        }
        self.base.symbol(id)
    }

    fn symbols(&self) -> Box<dyn Iterator<Item = &Symbol> + '_> {
        Box::new(
            self.base
                .symbols()
                .filter(move |s| {
                    !self.removed.contains(&s.id) && !self.added_symbols.contains_key(&s.id)
                })
                .chain(self.added_symbols.values()),
        )
    }

    fn edges(&self) -> Box<dyn Iterator<Item = Edge> + '_> {
        Box::new(
            self.base
                .iter_edges()
                .filter(move |e| self.base_edge_survives(e))
                .cloned()
                .chain(self.added_edges.iter().cloned()),
        )
    }

    fn symbol_count(&self) -> usize {
        self.symbols().count()
    }

    fn edge_count(&self) -> usize {
        self.edges().count()
    }
}
