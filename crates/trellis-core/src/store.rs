//! Atomic generation handle for the workspace graph

use std::sync::Arc;

use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};

use crate::graph::SymbolGraph;

/// One immutable build of the workspace graph.
#[derive(Debug)]
pub struct GraphGeneration {
    pub graph: SymbolGraph,
    /// Monotonically increasing rebuild counter.
    pub sequence: u64,
    pub built_at: DateTime<Utc>,
}

/// Holds the current graph generation and swaps it atomically on rebuild.
///
/// Readers take a cheap `Arc` handle via [`current`](GraphStore::current)
/// and keep using their captured generation for the whole computation, so a
/// concurrent rebuild never exposes a partially updated graph. Rebuilds are
/// expected to come from a single writer (the workspace loader).
pub struct GraphStore {
    current: ArcSwap<GraphGeneration>,
}

impl GraphStore {
    pub fn new(graph: SymbolGraph) -> Self {
        GraphStore {
            current: ArcSwap::from_pointee(GraphGeneration {
                graph,
                sequence: 0,
                built_at: Utc::now(),
            }),
        }
    }

    /// The current generation. In-flight analyses holding an older handle
    /// are unaffected by later swaps.
    pub fn current(&self) -> Arc<GraphGeneration> {
        self.current.load_full()
    }

    /// Replace the graph wholesale, bumping the sequence number.
    pub fn replace(&self, graph: SymbolGraph) -> Arc<GraphGeneration> {
        let next = Arc::new(GraphGeneration {
            graph,
            sequence: self.current.load().sequence + 1,
            built_at: Utc::now(),
        });
        self.current.store(Arc::clone(&next));
        tracing::debug!(sequence = next.sequence, "swapped graph generation");
        next
    }
}
