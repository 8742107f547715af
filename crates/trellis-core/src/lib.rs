//! Trellis Core — symbol graph model, neighborhood assembly, invariant
//! analysis, and virtual-apply validation

pub mod model;
pub mod error;
pub mod graph;
pub mod builder;
pub mod symbols;
pub mod store;
pub mod layers;
pub mod invariants;
pub mod neighborhood;
pub mod overlay;
pub mod validate;


#[cfg(test)]
pub mod test_utils;

pub use model::{ByteRange, Edge, EdgeKind, Symbol, SymbolId, SymbolKind};
pub use error::{GraphError, Result};
pub use graph::{Direction, GraphView, Subgraph, SymbolGraph};
pub use builder::{BuildOutcome, ExtractionBundle, build_graph};
pub use symbols::SymbolIndex;
pub use store::{GraphGeneration, GraphStore};
pub use layers::{Layer, LayerConfig, LayerViolation, PathRule, ViolationKind};
pub use invariants::{InvariantReport, analyze};
pub use neighborhood::{MiniCodebase, MiniSymbol, NeighborhoodInvariants, NeighborhoodMetadata, assemble};
pub use overlay::{Edit, EditOperation, GraphOverlay};
pub use validate::{ValidationResult, validate, validate_many, validate_with_report};
