//! Error types for SDF feature extraction

use thiserror::Error;

/// Errors that can occur while fitting partitions or extracting features
#[derive(Debug, Error)]
pub enum SdfError {
    #[error("Invalid symbol count {0}: at least 2 symbols are required")]
    InvalidSymbolCount(usize),

    #[error("Training pool is empty")]
    EmptyTrainingPool,

    #[error("Non-finite sample at column {column}, row {row}")]
    NonFiniteSample { column: usize, row: usize },

    #[error("Ragged sample matrix: line {index} has {found} values, expected {expected}")]
    RaggedMatrix {
        index: usize,
        expected: usize,
        found: usize,
    },

    #[error("Invalid partition: {0}")]
    InvalidPartition(String),

    #[error("Partition encodes {partition} symbols but {requested} were requested")]
    SymbolCountMismatch { partition: usize, requested: usize },

    #[error("Symbol {symbol} at position {position} is outside [1, {num_symbols}]")]
    SymbolOutOfRange {
        symbol: usize,
        position: usize,
        num_symbols: usize,
    },

    #[error("Degenerate sequence of length {0}: at least 2 samples are required")]
    DegenerateSequence(usize),

    #[error("Partition has not been fitted")]
    PartitionNotFitted,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl SdfError {
    /// Whether the error is a per-series condition rather than a fatal one
    pub fn is_degenerate(&self) -> bool {
        matches!(self, SdfError::DegenerateSequence(_))
    }
}
