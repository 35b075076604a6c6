//! Load-time errors. Malformed piece or grid data is rejected here, before
//! it can reach the engine.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("empty token")]
    Empty,
    #[error("unknown shape '{shape}' in token '{token}'")]
    UnknownShape { shape: char, token: String },
    #[error("missing color in token '{0}'")]
    MissingColor(String),
    #[error("unknown color '{color}' in token '{token}'")]
    UnknownColor { color: char, token: String },
    #[error("trailing characters in token '{0}'")]
    Trailing(String),
    #[error("sub-cells of token '{0}' overlap")]
    Overlap(String),
    #[error("token '{0}' has more than two sub-cells")]
    TooManyParts(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("grid has no rows")]
    NoRows,
    #[error("row {row} has {found} cells, expected {expected}")]
    Ragged {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("row {row}, column {column}: {source}")]
    Token {
        row: usize,
        column: usize,
        #[source]
        source: TokenError,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PieceError {
    #[error("piece '{name}': {source}")]
    Grid {
        name: String,
        #[source]
        source: GridError,
    },
    #[error("piece '{0}' has no blocks")]
    NoBlocks(String),
    #[error("piece '{name}' must be square, got {width}x{height}")]
    NotSquare {
        name: String,
        width: usize,
        height: usize,
    },
    #[error("piece '{name}' is {size}x{size}, larger than the {max}x{max} limit")]
    TooLarge { name: String, size: usize, max: usize },
    #[error("piece '{0}' contains level blocks")]
    LevelBlocks(String),
    #[error("piece '{name}' of kind {kind} must be a single cell")]
    NotSingleCell { name: String, kind: String },
}
