//! The [Smith Waterman algorithm](https://en.wikipedia.org/wiki/Smith%E2%80%93Waterman_algorithm) performs local sequence alignment, finding the pair of substrings of the query and the database with the highest similarity score. Negative prefixes are dropped by flooring every cell at zero, which is what makes the alignment local.
//!
//! Each cell depends on the cell to the left, up, and up-left diagonal:
//!
//! ```text
//! H[row][col] = max(0,
//!     H[row - 1][col - 1] + (q[col] == d[row] ? match : mismatch),
//!     H[row - 1][col] + gap_row,
//!     H[row][col - 1] + gap_col)
//! ```
//!
//! Rows run over the database and columns over the query. Off-grid neighbors are zero. Next to
//! the score, every cell is tagged with the neighbor it came from, and the tags are walked back
//! from the best cell to reconstruct the alignment.
//!
//! The O(nm) fill can be scheduled in three ways, all producing the same scores and tags:
//! - [`scalar`]: row-major on one thread, the reference
//! - [`wavefront`]: square tiles on a worker pool, one anti-diagonal of tiles per round
//! - [`streaming`]: one anti-diagonal of cells per step through a window as wide as the query,
//!   with O(n) working memory and narrow score types
//!
//! ```text
//! query: "ATGC"
//! database: "TTATGCTT"
//!
//!      A  T  G  C
//! T  [ 0  2  1  0]
//! T  [ 0  2  1  0]
//! A  [ 2  1  1  0]
//! T  [ 1  4  3  2]
//! G  [ 0  3  6  5]
//! C  [ 0  2  5  8]   <- best cell (5, 3), alignment ATGC/ATGC
//! T  [ 0  2  4  7]
//! T  [ 0  2  3  6]
//! ```

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::SequenceKind;
use crate::{Config, Error, Result, Sequence};

mod matrix;
mod max;
mod recurrence;
pub mod scalar;
mod score;
pub mod streaming;
mod traceback;
pub mod wavefront;

pub use matrix::{DirectionStore, Matrix, ScoreStore, SkewedDirections};
pub use max::{GlobalMax, MaxTracker, Reduction};
pub use recurrence::{Direction, Relaxed, Weights, relax};
pub use score::{Score, ScoreWidth};
pub use streaming::{StepSink, StreamSummary, StreamingConfig, StreamingPipeline};
pub use traceback::{Alignment, PathStep, TracebackIter, traceback};
pub use wavefront::TiledConfig;

/// How the matrix is filled
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Strategy {
    #[default]
    Scalar,
    Tiled(TiledConfig),
    Streaming(StreamingConfig),
}

/// Stores and best cell produced by a fill, handed to [`traceback`]
#[derive(Debug, Clone, PartialEq)]
pub struct Computed {
    pub scores: ScoreStore,
    pub directions: DirectionStore,
    pub max: GlobalMax,
    /// Some cell was clamped at the top of a narrow score type, so scores past that point are
    /// lower bounds
    pub saturated: bool,
}

/// Fills the score and direction stores of `query` against `database` with the configured
/// strategy
pub fn compute(query: &Sequence, database: &Sequence, config: &Config) -> Result<Computed> {
    if query.is_empty() {
        return Err(Error::EmptySequence(SequenceKind::Query));
    }
    if database.is_empty() {
        return Err(Error::EmptySequence(SequenceKind::Database));
    }
    matrix::cell_count(database.len(), query.len())?;

    log::debug!(
        "computing {}x{} alignment matrix with {:?}",
        database.len(),
        query.len(),
        config.strategy
    );

    let (query, database, scoring) = (query.as_bytes(), database.as_bytes(), &config.scoring);
    match &config.strategy {
        Strategy::Scalar => scalar::fill(query, database, scoring),
        Strategy::Tiled(tiled) => wavefront::fill(query, database, scoring, tiled),
        Strategy::Streaming(streaming) => streaming::fill(query, database, scoring, streaming),
    }
}
