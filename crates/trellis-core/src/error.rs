//! Error types for the topology engine

use thiserror::Error;

use crate::model::SymbolId;

/// Errors surfaced by graph construction, assembly, and analysis.
///
/// All variants are local, synchronous, and recoverable: a failed insertion
/// aborts only that insertion, and the engine never takes the process down
/// on malformed input.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GraphError {
    #[error("duplicate symbol id: {0}")]
    DuplicateSymbol(SymbolId),

    #[error("edge references missing symbol: {0}")]
    DanglingReference(SymbolId),

    #[error("neighborhood assembly requires at least one seed symbol")]
    EmptySeed,

    #[error("proposed symbol collides with existing id: {0}")]
    SymbolCollision(SymbolId),

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, GraphError>;
