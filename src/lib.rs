//! Lsal computes the optimal local alignment between a query and a database sequence with the Smith-Waterman algorithm, using linear gap penalties. The same recurrence can be filled in three ways: a scalar reference, a tiled wavefront spread over a worker pool for large matrices, and a fixed-width streaming pipeline that consumes the database one symbol at a time in O(query) memory. All three produce identical scores and direction tags, so the alignment reconstructed from any of them is the same.
//!
//! Sequences are compared byte by byte, which fits small alphabets such as `ATGC`.
//!
//! # Example: using `align`
//!
//! ```rust
//! use lsal::{align, Config, Sequence};
//!
//! let query = Sequence::from("ATGC");
//! let database = Sequence::from("TTATGCTT");
//!
//! let alignment = align(&query, &database, &Config::default()).unwrap();
//! assert_eq!(alignment.score, 8);
//! assert_eq!(alignment.to_string(), "Q: ATGC\nD: ATGC");
//! ```
//!
//! # Example: choosing a strategy
//!
//! The scalar strategy is the default. Large matrices can be filled in parallel tiles, and long
//! databases can be streamed with narrow scores.
//!
//! ```rust
//! use lsal::{compute, traceback, Config, Sequence};
//! use lsal::smith_waterman::{Strategy, StreamingConfig, TiledConfig};
//!
//! let query = Sequence::from("GATTACA");
//! let database = Sequence::from("CCGATTTACAGG");
//!
//! let tiled = Config {
//!     strategy: Strategy::Tiled(TiledConfig { tile_size: 4, threads: Some(2) }),
//!     ..Config::default()
//! };
//! let streaming = Config {
//!     strategy: Strategy::Streaming(StreamingConfig::default()),
//!     ..Config::default()
//! };
//!
//! let computed = compute(&query, &database, &tiled).unwrap();
//! let from_tiles = traceback(&query, &database, &computed, &tiled).unwrap();
//!
//! let computed = compute(&query, &database, &streaming).unwrap();
//! let from_stream = traceback(&query, &database, &computed, &streaming).unwrap();
//!
//! assert_eq!(from_tiles.score, from_stream.score);
//! ```
//!
//! # Example: streaming an unbounded database
//!
//! The database only has to be an iterator of bytes. Each step hands one anti-diagonal of
//! direction tags to a [`StepSink`](smith_waterman::StepSink).
//!
//! ```rust
//! use lsal::Scoring;
//! use lsal::smith_waterman::{SkewedDirections, StreamingPipeline};
//!
//! let query = b"ATGC";
//! let pipeline = StreamingPipeline::<i16>::new(query, &Scoring::default(), 1024).unwrap();
//!
//! let mut directions = SkewedDirections::new(query.len());
//! let database = "TTATGCTT".bytes();
//! let summary = pipeline.run(database, &mut directions).unwrap();
//! assert_eq!(summary.max.value, 8);
//! assert_eq!(directions.rows(), 8);
//! ```

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

mod r#const;
mod error;
mod sequence;
pub mod smith_waterman;

pub use error::{Error, Result, SequenceKind};
pub use sequence::Sequence;
pub use smith_waterman::{Alignment, Computed, Strategy, compute, traceback};

use r#const::*;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Config {
    pub scoring: Scoring,
    /// How the matrix is filled, see [`Strategy`]
    pub strategy: Strategy,
    /// Upper bound on the number of aligned columns. Traceback fails instead of truncating when
    /// the alignment is longer.
    pub max_alignment_len: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Scoring {
    /// Score for aligning two equal symbols
    pub match_score: i32,
    /// Score for aligning two different symbols
    pub mismatch_score: i32,
    /// Added when moving down a row without consuming a query symbol (gap in the query)
    pub gap_row_penalty: i32,
    /// Added when moving right a column without consuming a database symbol (gap in the database)
    pub gap_col_penalty: i32,
}

impl Default for Scoring {
    fn default() -> Self {
        Scoring {
            match_score: MATCH_SCORE,
            mismatch_score: MISMATCH_SCORE,
            gap_row_penalty: GAP_ROW_PENALTY,
            gap_col_penalty: GAP_COL_PENALTY,
        }
    }
}

/// Computes the matrix and traces back the best local alignment in one go
pub fn align(query: &Sequence, database: &Sequence, config: &Config) -> Result<Alignment> {
    let computed = compute(query, database, config)?;
    traceback(query, database, &computed, config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_align() {
        let alignment = align(&"ATGC".into(), &"TTATGCTT".into(), &Config::default()).unwrap();
        assert_eq!(alignment.query, b"ATGC");
        assert_eq!(alignment.database, b"ATGC");
        assert_eq!(alignment.score, 8);
    }

    #[test]
    fn test_align_all_mismatch() {
        let alignment = align(&"AAAA".into(), &"CCCC".into(), &Config::default()).unwrap();
        assert!(alignment.is_empty());
        assert_eq!(alignment.score, 0);
    }

    #[test]
    fn test_custom_scoring() {
        let config = Config {
            scoring: Scoring {
                match_score: 3,
                mismatch_score: -3,
                gap_row_penalty: -2,
                gap_col_penalty: -2,
            },
            ..Config::default()
        };
        let alignment = align(&"ACGT".into(), &"ACT".into(), &config).unwrap();
        // ACGT / AC-T scores 3 + 3 - 2 + 3
        assert_eq!(alignment.score, 7);
        assert_eq!(alignment.rescore(&config.scoring), 7);
    }
}
