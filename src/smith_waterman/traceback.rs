use std::fmt;
use std::ops::Range;

use itertools::{Itertools, MinMaxResult, izip};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::Computed;
use super::matrix::{DirectionStore, ScoreStore};
use super::recurrence::Direction;
use crate::r#const::GAP;
use crate::{Config, Error, Result, Scoring};

/// One cell on the backward walk, with the direction taken out of it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathStep {
    pub row: usize,
    pub col: usize,
    pub direction: Direction,
}

/// Walks the direction tags backward from the best cell.
///
/// Stops at the first cell that does not carry a positive score, or when the next move would
/// leave the matrix. Stores that kept no scores fall back to the tag, since a cell is only tagged
/// `Direction::None` when it was floored at zero.
pub struct TracebackIter<'a> {
    scores: &'a ScoreStore,
    directions: &'a DirectionStore,
    cursor: Option<(usize, usize)>,
}

impl<'a> TracebackIter<'a> {
    pub fn new(computed: &'a Computed) -> Self {
        Self {
            scores: &computed.scores,
            directions: &computed.directions,
            cursor: (computed.max.value > 0).then_some((computed.max.row, computed.max.col)),
        }
    }

    #[inline(always)]
    fn is_positive(&self, row: usize, col: usize) -> bool {
        match self.scores.get(row, col) {
            Some(value) => value > 0,
            None => self.directions.get(row, col) != Direction::None,
        }
    }
}

impl Iterator for TracebackIter<'_> {
    type Item = PathStep;

    fn next(&mut self) -> Option<PathStep> {
        let (row, col) = self.cursor?;
        let direction = self.directions.get(row, col);
        if direction == Direction::None || !self.is_positive(row, col) {
            self.cursor = None;
            return None;
        }

        self.cursor = match direction {
            Direction::Diagonal => row.checked_sub(1).zip(col.checked_sub(1)),
            Direction::Up => row.checked_sub(1).map(|row| (row, col)),
            Direction::Left => col.checked_sub(1).map(|col| (row, col)),
            Direction::None => None,
        };
        Some(PathStep {
            row,
            col,
            direction,
        })
    }
}

/// Optimal local alignment, laid out left to right with `-` marking gaps
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Alignment {
    pub score: i32,
    pub query: Vec<u8>,
    pub database: Vec<u8>,
    /// Move that produced each aligned column
    pub ops: Vec<Direction>,
    /// Query symbols covered by the alignment, `None` when it is empty
    pub query_range: Option<Range<usize>>,
    /// Database symbols covered by the alignment, `None` when it is empty
    pub database_range: Option<Range<usize>>,
}

impl Alignment {
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Sums the match, mismatch and gap contributions of every aligned column
    pub fn rescore(&self, scoring: &Scoring) -> i32 {
        izip!(&self.ops, &self.query, &self.database)
            .map(|(op, query_char, database_char)| match op {
                Direction::Diagonal if query_char == database_char => scoring.match_score,
                Direction::Diagonal => scoring.mismatch_score,
                Direction::Up => scoring.gap_row_penalty,
                Direction::Left => scoring.gap_col_penalty,
                Direction::None => 0,
            })
            .sum()
    }
}

impl fmt::Display for Alignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Q: {}", String::from_utf8_lossy(&self.query))?;
        write!(f, "D: {}", String::from_utf8_lossy(&self.database))
    }
}

fn covered(positions: impl Iterator<Item = usize>) -> Option<Range<usize>> {
    match positions.minmax() {
        MinMaxResult::NoElements => None,
        MinMaxResult::OneElement(only) => Some(only..only + 1),
        MinMaxResult::MinMax(min, max) => Some(min..max + 1),
    }
}

/// Reconstructs the alignment ending in the best cell of `computed`
pub fn traceback(
    query: &[u8],
    database: &[u8],
    computed: &Computed,
    config: &Config,
) -> Result<Alignment> {
    let (rows, cols) = (computed.directions.rows(), computed.directions.cols());
    if rows != database.len() || cols != query.len() {
        return Err(Error::DimensionMismatch {
            expected_rows: rows,
            expected_cols: cols,
            rows: database.len(),
            cols: query.len(),
        });
    }

    let mut path = Vec::new();
    for step in TracebackIter::new(computed) {
        if let Some(capacity) = config.max_alignment_len
            && path.len() >= capacity
        {
            return Err(Error::AlignmentTooLong { capacity });
        }
        path.push(step);
    }
    path.reverse();

    let (aligned_query, aligned_database): (Vec<u8>, Vec<u8>) = path
        .iter()
        .map(|step| match step.direction {
            Direction::Up => (GAP, database[step.row]),
            Direction::Left => (query[step.col], GAP),
            _ => (query[step.col], database[step.row]),
        })
        .unzip();

    let query_range = covered(
        path.iter()
            .filter(|step| step.direction != Direction::Up)
            .map(|step| step.col),
    );
    let database_range = covered(
        path.iter()
            .filter(|step| step.direction != Direction::Left)
            .map(|step| step.row),
    );

    log::debug!(
        "traceback from ({}, {}) produced {} aligned columns",
        computed.max.row,
        computed.max.col,
        path.len()
    );

    Ok(Alignment {
        score: computed.max.value,
        query: aligned_query,
        database: aligned_database,
        ops: path.into_iter().map(|step| step.direction).collect(),
        query_range,
        database_range,
    })
}
