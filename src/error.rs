//! Error types for lsal

use thiserror::Error;

use crate::smith_waterman::ScoreWidth;

/// Result type alias for lsal operations
pub type Result<T> = std::result::Result<T, Error>;

/// Which of the two input sequences an error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceKind {
    Query,
    Database,
}

impl std::fmt::Display for SequenceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SequenceKind::Query => write!(f, "query"),
            SequenceKind::Database => write!(f, "database"),
        }
    }
}

/// Error types that can occur while computing or tracing back an alignment
#[derive(Debug, Error)]
pub enum Error {
    /// One of the sequences has no symbols
    #[error("{0} sequence is empty")]
    EmptySequence(SequenceKind),

    /// `rows * cols` does not fit in memory addressing
    #[error("score matrix of {rows}x{cols} cells cannot be allocated")]
    MatrixTooLarge { rows: usize, cols: usize },

    /// The grid passed the size checks but its cells could not be reserved
    #[error("failed to allocate a {rows}x{cols} matrix: {source}")]
    Allocation {
        rows: usize,
        cols: usize,
        #[source]
        source: std::collections::TryReserveError,
    },

    /// Tiles must have a positive edge length
    #[error("tile size must be positive")]
    InvalidTileSize,

    /// The streaming window is as wide as the query
    #[error("query of length {len} exceeds the streaming window bound of {max}")]
    WindowTooWide { len: usize, max: usize },

    /// A scoring parameter cannot be carried in the selected score width
    #[error("{name} = {value} does not fit in {width:?} scores")]
    ScoringOutOfRange {
        name: &'static str,
        value: i32,
        width: ScoreWidth,
    },

    /// The worker pool for the tiled strategy could not be started
    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// The sequences handed to traceback do not match the filled stores
    #[error(
        "stores were filled for {expected_rows}x{expected_cols} cells, got sequences of {rows}x{cols}"
    )]
    DimensionMismatch {
        expected_rows: usize,
        expected_cols: usize,
        rows: usize,
        cols: usize,
    },

    /// Traceback produced more columns than the configured capacity
    #[error("alignment exceeds the configured capacity of {capacity} columns")]
    AlignmentTooLong { capacity: usize },
}
