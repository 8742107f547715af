//! Symbol graph wrapper using petgraph::StableDiGraph with stable string ids

use std::collections::{HashMap, HashSet};

use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use petgraph::visit::EdgeRef;

use crate::error::{GraphError, Result};
use crate::model::{Edge, EdgeKind, Symbol, SymbolId};

/// Traversal direction for neighbor queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Outgoing,
    Incoming,
    Both,
}

/// Read-only access to a set of symbols and the edges between them.
///
/// Implemented by [`SymbolGraph`], [`Subgraph`], and the validator's overlay
/// so the invariant analyzer runs unchanged on all three.
pub trait GraphView {
    fn symbol(&self, id: &SymbolId) -> Option<&Symbol>;
    fn symbols(&self) -> Box<dyn Iterator<Item = &Symbol> + '_>;
    /// Edges are yielded by value: overlays synthesize merged edges that
    /// have no stable storage to borrow from.
    fn edges(&self) -> Box<dyn Iterator<Item = Edge> + '_>;
    fn symbol_count(&self) -> usize;
    fn edge_count(&self) -> usize;

    fn contains_symbol(&self, id: &SymbolId) -> bool {
        self.symbol(id).is_some()
    }
}

/// The canonical in-memory symbol graph: a directed graph of symbols with
/// weighted dependency edges.
///
/// Built once per workspace load and treated as immutable afterwards; a
/// rebuild produces a fresh graph that replaces the old one wholesale (see
/// `store::GraphStore`). Every edge's endpoints must reference symbols
/// already present; insertion fails otherwise.
pub struct SymbolGraph {
    inner: StableDiGraph<Symbol, Edge>,
    index: HashMap<SymbolId, NodeIndex>,
}

impl std::fmt::Debug for SymbolGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SymbolGraph")
            .field("symbol_count", &self.index.len())
            .field("edge_count", &self.inner.edge_count())
            .finish()
    }
}

impl SymbolGraph {
    pub fn new() -> Self {
        SymbolGraph {
            inner: StableDiGraph::new(),
            index: HashMap::new(),
        }
    }

    /// Insert a symbol. Fails with `DuplicateSymbol` on id collision.
    pub fn insert_symbol(&mut self, symbol: Symbol) -> Result<()> {
        if self.index.contains_key(&symbol.id) {
            return Err(GraphError::DuplicateSymbol(symbol.id));
        }
        let id = symbol.id.clone();
        let idx = self.inner.add_node(symbol);
        self.index.insert(id, idx);
        Ok(())
    }

    /// Insert an edge. Fails with `DanglingReference` if either endpoint is
    /// absent, and with `InvalidInput` if the strength lies outside `[0, 1]`.
    ///
    /// A duplicate (source, target, kind) merges by max strength instead of
    /// producing a parallel edge.
    pub fn insert_edge(&mut self, edge: Edge) -> Result<()> {
        if !(0.0..=1.0).contains(&edge.strength) {
            return Err(GraphError::InvalidInput(format!(
                "edge strength {} outside [0, 1]",
                edge.strength
            )));
        }
        let src = self
            .index
            .get(&edge.source)
            .copied()
            .ok_or_else(|| GraphError::DanglingReference(edge.source.clone()))?;
        let dst = self
            .index
            .get(&edge.target)
            .copied()
            .ok_or_else(|| GraphError::DanglingReference(edge.target.clone()))?;

        let existing = self
            .inner
            .edges_directed(src, petgraph::Direction::Outgoing)
            .find(|e| e.target() == dst && e.weight().kind == edge.kind)
            .map(|e| e.id());
        if let Some(edge_idx) = existing {
            if let Some(weight) = self.inner.edge_weight_mut(edge_idx) {
                if edge.strength > weight.strength {
                    weight.strength = edge.strength;
                }
            }
            return Ok(());
        }

        self.inner.add_edge(src, dst, edge);
        Ok(())
    }

    /// Get a symbol by id.
    pub fn symbol(&self, id: &SymbolId) -> Option<&Symbol> {
        self.index.get(id).and_then(|&idx| self.inner.node_weight(idx))
    }

    /// Check whether a symbol id is present.
    pub fn contains(&self, id: &SymbolId) -> bool {
        self.index.contains_key(id)
    }

    /// Total number of symbols.
    pub fn symbol_count(&self) -> usize {
        self.index.len()
    }

    /// Total number of edges.
    pub fn edge_count(&self) -> usize {
        self.inner.edge_count()
    }

    /// Iterate over all symbols.
    pub fn symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.inner
            .node_indices()
            .filter_map(move |idx| self.inner.node_weight(idx))
    }

    /// Iterate over all symbol ids.
    pub fn symbol_ids(&self) -> impl Iterator<Item = &SymbolId> {
        self.index.keys()
    }

    /// Iterate over all edges.
    pub fn iter_edges(&self) -> impl Iterator<Item = &Edge> {
        self.inner
            .edge_indices()
            .filter_map(move |idx| self.inner.edge_weight(idx))
    }

    /// Lazily iterate the neighborhood of `id` in the given direction,
    /// yielding each adjacent edge together with the id of the symbol at its
    /// far end. Unknown ids yield an empty sequence. The iterator borrows
    /// the graph and can be re-created at will.
    pub fn neighbors<'a>(
        &'a self,
        id: &SymbolId,
        direction: Direction,
    ) -> Box<dyn Iterator<Item = (&'a Edge, &'a SymbolId)> + 'a> {
        let Some(&idx) = self.index.get(id) else {
            return Box::new(std::iter::empty());
        };
        match direction {
            Direction::Outgoing => Box::new(self.adjacent(idx, petgraph::Direction::Outgoing)),
            Direction::Incoming => Box::new(self.adjacent(idx, petgraph::Direction::Incoming)),
            Direction::Both => Box::new(
                self.adjacent(idx, petgraph::Direction::Outgoing)
                    .chain(self.adjacent(idx, petgraph::Direction::Incoming)),
            ),
        }
    }

    fn adjacent(
        &self,
        idx: NodeIndex,
        dir: petgraph::Direction,
    ) -> impl Iterator<Item = (&Edge, &SymbolId)> {
        self.inner.edges_directed(idx, dir).map(move |e| {
            let edge = e.weight();
            let neighbor = match dir {
                petgraph::Direction::Outgoing => &edge.target,
                petgraph::Direction::Incoming => &edge.source,
            };
            (edge, neighbor)
        })
    }

    /// Check if an edge of a specific kind exists between two symbols.
    pub fn has_edge_between(&self, source: &SymbolId, target: &SymbolId, kind: EdgeKind) -> bool {
        self.neighbors(source, Direction::Outgoing)
            .any(|(e, n)| n == target && e.kind == kind)
    }

    /// Read-only projection containing only the requested symbols and the
    /// edges whose endpoints are both included. Ids not present in the graph
    /// are dropped from the projection.
    pub fn subgraph(&self, ids: &HashSet<SymbolId>) -> Subgraph<'_> {
        let members: HashSet<SymbolId> = ids
            .iter()
            .filter(|id| self.index.contains_key(*id))
            .cloned()
            .collect();
        Subgraph {
            base: self,
            members,
        }
    }
}

impl Default for SymbolGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphView for SymbolGraph {
    fn symbol(&self, id: &SymbolId) -> Option<&Symbol> {
        SymbolGraph::symbol(self, id)
    }

    fn symbols(&self) -> Box<dyn Iterator<Item = &Symbol> + '_> {
        Box::new(SymbolGraph::symbols(self))
    }

    fn edges(&self) -> Box<dyn Iterator<Item = Edge> + '_> {
        Box::new(self.iter_edges().cloned())
    }

    fn symbol_count(&self) -> usize {
        SymbolGraph::symbol_count(self)
    }

    fn edge_count(&self) -> usize {
        SymbolGraph::edge_count(self)
    }
}

/// A borrowed projection of a [`SymbolGraph`] restricted to a member set.
///
/// Cheap to build (no symbol or edge copies) and read-only.
pub struct Subgraph<'a> {
    base: &'a SymbolGraph,
    members: HashSet<SymbolId>,
}

impl<'a> Subgraph<'a> {
    pub fn members(&self) -> &HashSet<SymbolId> {
        &self.members
    }
}

impl GraphView for Subgraph<'_> {
    fn symbol(&self, id: &SymbolId) -> Option<&Symbol> {
        if self.members.contains(id) {
            self.base.symbol(id)
        } else {
            None
        }
    }

    fn symbols(&self) -> Box<dyn Iterator<Item = &Symbol> + '_> {
        Box::new(
            self.base
                .symbols()
                .filter(move |s| self.members.contains(&s.id)),
        )
    }

    fn edges(&self) -> Box<dyn Iterator<Item = Edge> + '_> {
        Box::new(
            self.base
                .iter_edges()
                .filter(move |e| {
                    self.members.contains(&e.source) && self.members.contains(&e.target)
                })
                .cloned(),
        )
    }

    fn symbol_count(&self) -> usize {
        self.members.len()
    }

    fn edge_count(&self) -> usize {
        self.edges().count()
    }
}
