//! Error types for Strata

use crate::element_type::ElementType;
use crate::types::DataType;
use thiserror::Error;

/// The main error type for Strata operations
#[derive(Error, Debug)]
pub enum Error {
    // Data errors
    #[error("Element type mismatch: expected {expected}, got {actual}")]
    ElementTypeMismatch {
        expected: ElementType,
        actual: ElementType,
    },

    #[error("Position {position} out of range for {position_count} positions")]
    PositionOutOfRange {
        position: usize,
        position_count: usize,
    },

    #[error("Block position count {actual} does not match page position count {expected}")]
    PositionCountMismatch { expected: usize, actual: usize },

    #[error("Channel {channel} out of bounds (page has {block_count} blocks)")]
    ChannelOutOfBounds { channel: usize, block_count: usize },

    // Expression errors
    #[error(transparent)]
    Resolution(#[from] ResolutionFailure),

    // Aggregation errors
    #[error("[{function}] does not support input type [{data_type}]")]
    UnsupportedAggregation {
        function: String,
        data_type: DataType,
    },

    #[error("Cannot merge [{actual}] state into [{expected}] aggregator")]
    IncompatibleState { expected: String, actual: String },

    // Execution errors
    #[error("Evaluation cancelled")]
    Cancelled,

    // Configuration errors
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Why a binary operator cannot be applied to two declared operand types.
///
/// Resolution happens before any position is evaluated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolutionFailure {
    #[error("argument of [{source_text}] has unsupported type [{data_type}]")]
    Unsupported {
        source_text: String,
        data_type: DataType,
    },

    #[error(
        "first argument of [{source_text}] is [{lhs}] and second is [{rhs}]. \
         [unsigned_long] can only be operated on together with another [unsigned_long]"
    )]
    UnsignedLongMismatch {
        source_text: String,
        lhs: DataType,
        rhs: DataType,
    },

    #[error("{ordinal} argument of [{source_text}] must be [numeric], found type [{data_type}]")]
    NotNumeric {
        source_text: String,
        ordinal: &'static str,
        data_type: DataType,
    },

    #[error(
        "first argument of [{source_text}] is [{lhs}] so second argument must also be [{lhs}] but was [{rhs}]"
    )]
    Incompatible {
        source_text: String,
        lhs: DataType,
        rhs: DataType,
    },
}

/// Result type alias using Strata's Error
pub type Result<T> = std::result::Result<T, Error>;
