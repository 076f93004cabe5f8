//! Fixed-width streaming fill.
//!
//! The database is consumed one symbol per step through a window as wide as the query. Step `t`
//! evaluates the anti-diagonal `row + col == t` of the matrix, laid out as a straight row: lane
//! `col` pairs `q[col]` with window offset `width - 1 - col`, which holds `d[t - col]`.
//!
//! ```text
//! query: ATG                      step 3 reads      row  col
//! database: CATG...               window [A T G]     3    0   (q=A, d=G)
//!                                       offset 2      2    1   (q=T, d=T)
//!                                       offset 0      1    2   (q=G, d=A)
//! ```
//!
//! Along an anti-diagonal no cell depends on another, so all lanes of a step can be evaluated in
//! any order. The dependencies land on the two previous steps instead, kept as rolling rows of
//! `width + 1` with a zero at slot 0: the up-left neighbor of lane `col` is `prev_2[col]`, the up
//! neighbor `prev_1[col + 1]` and the left neighbor `prev_1[col]`.
//!
//! Working memory is O(width) no matter how long the database is. Scores are carried in a narrow
//! integer type and saturate at its maximum.

use itertools::izip;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::Computed;
use super::matrix::{DirectionStore, Matrix, ScoreStore, SkewedDirections};
use super::max::{GlobalMax, MaxTracker, Reduction};
use super::recurrence::{Direction, Weights, relax};
use super::score::{Score, ScoreWidth};
use crate::error::SequenceKind;
use crate::r#const::MAX_WINDOW;
use crate::{Error, Result, Scoring};

mod window;

pub use window::DatabaseWindow;

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StreamingConfig {
    /// Integer type carrying the scores. Narrower types saturate sooner.
    pub width: ScoreWidth,
    /// Longest query accepted, since the query is the window width
    pub max_window: usize,
    /// Record every step's scores so that the result carries a dense score matrix. Costs
    /// O(rows * cols) memory, which the streaming fill otherwise avoids.
    pub retain_scores: bool,
}

impl Default for StreamingConfig {
    fn default() -> Self {
        StreamingConfig {
            width: ScoreWidth::default(),
            max_window: MAX_WINDOW,
            retain_scores: false,
        }
    }
}

/// Receives the output row of every step, in step order
pub trait StepSink<S> {
    fn step(&mut self, step: usize, scores: &[S], directions: &[Direction]);
}

impl<S> StepSink<S> for SkewedDirections {
    fn step(&mut self, _step: usize, _scores: &[S], directions: &[Direction]) {
        self.push_step(directions);
    }
}

/// What a finished run knows about the stream it consumed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamSummary {
    /// Database symbols consumed
    pub rows: usize,
    /// Steps taken, `rows + width - 1`
    pub steps: usize,
    pub max: GlobalMax,
    pub saturated: bool,
}

#[derive(Debug, Clone, Copy)]
struct ColumnMax<S> {
    value: S,
    row: usize,
}

impl<S: Score> ColumnMax<S> {
    #[inline(always)]
    fn observe(&mut self, value: S, row: usize) {
        if value > self.value {
            self.value = value;
            self.row = row;
        }
    }
}

#[derive(Debug, Clone)]
pub struct StreamingPipeline<'q, S: Score> {
    query: &'q [u8],
    weights: Weights<S>,
    window: DatabaseWindow,
    prev_1: Vec<S>,
    prev_2: Vec<S>,
    current: Vec<S>,
    directions: Vec<Direction>,
    columns: Vec<ColumnMax<S>>,
}

impl<'q, S: Score> StreamingPipeline<'q, S> {
    pub fn new(query: &'q [u8], scoring: &Scoring, max_window: usize) -> Result<Self> {
        if query.is_empty() {
            return Err(Error::EmptySequence(SequenceKind::Query));
        }
        if query.len() > max_window {
            return Err(Error::WindowTooWide {
                len: query.len(),
                max: max_window,
            });
        }

        let width = query.len();
        Ok(Self {
            query,
            weights: Weights::new(scoring)?,
            window: DatabaseWindow::new(width),
            prev_1: vec![S::ZERO; width + 1],
            prev_2: vec![S::ZERO; width + 1],
            current: vec![S::ZERO; width],
            directions: vec![Direction::None; width],
            columns: vec![
                ColumnMax {
                    value: S::ZERO,
                    row: 0,
                };
                width
            ],
        })
    }

    /// Streams the whole database through the window, handing each step's row to `sink`
    pub fn run<D, K>(mut self, database: D, sink: &mut K) -> Result<StreamSummary>
    where
        D: IntoIterator<Item = u8>,
        K: StepSink<S> + ?Sized,
    {
        let width = self.query.len();
        let mut database = database.into_iter().fuse();
        let Some(first) = database.next() else {
            return Err(Error::EmptySequence(SequenceKind::Database));
        };
        self.window.advance(Some(first));

        let mut rows = 1;
        let mut steps = 0;
        let mut saturated = false;
        while !self.window.is_drained() {
            saturated |= self.compute_step(steps);
            sink.step(steps, &self.current, &self.directions);
            self.rotate();

            let next = database.next();
            rows += next.is_some() as usize;
            self.window.advance(next);
            steps += 1;
        }

        // Columns are merged with `<=`, so among equal maxima the highest column wins
        let partials = self
            .columns
            .iter()
            .enumerate()
            .map(|(col, column)| MaxTracker::with(column.value.to_i32(), column.row * width + col));
        let max = GlobalMax::from_tracker(Reduction::LastGreaterOrEqual.reduce(partials), width);

        if saturated {
            log::warn!(
                "streaming fill saturated at {} with {:?} scores, maxima are capped",
                S::MAX.to_i32(),
                S::WIDTH
            );
        }
        log::debug!("streamed {rows} database symbols through a window of {width} in {steps} steps");

        Ok(StreamSummary {
            rows,
            steps,
            max,
            saturated,
        })
    }

    #[inline(always)]
    fn compute_step(&mut self, step: usize) -> bool {
        let Self {
            query,
            weights,
            window,
            prev_1,
            prev_2,
            current,
            directions,
            columns,
        } = self;
        let width = query.len();

        let mut saturated = false;
        for (col, (value, direction, column)) in
            izip!(current.iter_mut(), directions.iter_mut(), columns.iter_mut()).enumerate()
        {
            // Padding lanes are outside the matrix
            let Some(database_char) = window.get(width - 1 - col) else {
                *value = S::ZERO;
                *direction = Direction::None;
                continue;
            };

            let cell = relax(
                prev_2[col],
                prev_1[col + 1],
                prev_1[col],
                database_char == query[col],
                weights,
            );
            *value = cell.value;
            *direction = cell.direction;
            column.observe(cell.value, step - col);
            saturated |= cell.saturated;
        }
        saturated
    }

    #[inline(always)]
    fn rotate(&mut self) {
        std::mem::swap(&mut self.prev_1, &mut self.prev_2);
        self.prev_1[1..].copy_from_slice(&self.current);
    }
}

/// Collects the skewed direction rows, and optionally the scores, of a run
struct Recorder<S> {
    directions: SkewedDirections,
    scores: Option<Vec<S>>,
}

impl<S: Score> Recorder<S> {
    fn new(cols: usize, retain_scores: bool) -> Self {
        Self {
            directions: SkewedDirections::new(cols),
            scores: retain_scores.then(Vec::new),
        }
    }

    fn finish(self, summary: StreamSummary) -> Computed {
        let (rows, cols) = (summary.rows, self.directions.cols());
        let scores = match &self.scores {
            Some(skewed) => {
                let cells = (0..rows)
                    .flat_map(|row| (0..cols).map(move |col| skewed[(row + col) * cols + col]))
                    .map(Score::to_i32)
                    .collect();
                ScoreStore::Dense(Matrix::from_cells(rows, cols, cells))
            }
            None => ScoreStore::Rolling,
        };

        Computed {
            scores,
            directions: DirectionStore::Skewed(self.directions),
            max: summary.max,
            saturated: summary.saturated,
        }
    }
}

impl<S: Score> StepSink<S> for Recorder<S> {
    fn step(&mut self, _step: usize, scores: &[S], directions: &[Direction]) {
        self.directions.push_step(directions);
        if let Some(retained) = &mut self.scores {
            retained.extend_from_slice(scores);
        }
    }
}

pub fn fill(
    query: &[u8],
    database: &[u8],
    scoring: &Scoring,
    config: &StreamingConfig,
) -> Result<Computed> {
    match config.width {
        ScoreWidth::I8 => fill_with::<i8>(query, database, scoring, config),
        ScoreWidth::I16 => fill_with::<i16>(query, database, scoring, config),
        ScoreWidth::I32 => fill_with::<i32>(query, database, scoring, config),
    }
}

fn fill_with<S: Score>(
    query: &[u8],
    database: &[u8],
    scoring: &Scoring,
    config: &StreamingConfig,
) -> Result<Computed> {
    let pipeline = StreamingPipeline::<S>::new(query, scoring, config.max_window)?;
    let mut recorder = Recorder::new(query.len(), config.retain_scores);
    let summary = pipeline.run(database.iter().copied(), &mut recorder)?;
    Ok(recorder.finish(summary))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::smith_waterman::scalar;

    fn streamed(query: &str, database: &str, width: ScoreWidth) -> Computed {
        let config = StreamingConfig {
            width,
            retain_scores: true,
            ..StreamingConfig::default()
        };
        fill(
            query.as_bytes(),
            database.as_bytes(),
            &Scoring::default(),
            &config,
        )
        .unwrap()
    }

    #[test]
    fn test_embedded_match() {
        let computed = streamed("ATGC", "TTATGCTT", ScoreWidth::I16);
        assert_eq!(computed.max.value, 8);
        assert_eq!((computed.max.row, computed.max.col), (5, 3));
    }

    #[test]
    fn test_matches_scalar() {
        let query = "GATTACAGATTACA";
        let database = "TTGATCACAGGATTTACAGAT";
        let reference = scalar::fill(query.as_bytes(), database.as_bytes(), &Scoring::default())
            .unwrap();

        for width in [ScoreWidth::I8, ScoreWidth::I16, ScoreWidth::I32] {
            let computed = streamed(query, database, width);
            assert_eq!(computed.scores, reference.scores, "{width:?}");
            assert_eq!(
                computed.directions.to_dense(),
                reference.directions.to_dense(),
                "{width:?}"
            );
            assert_eq!(computed.max.value, reference.max.value, "{width:?}");
            assert!(!computed.saturated);
        }
    }

    #[test]
    fn test_one_row_per_step() {
        struct CountingSink {
            steps: Vec<usize>,
        }
        impl StepSink<i16> for CountingSink {
            fn step(&mut self, step: usize, scores: &[i16], directions: &[Direction]) {
                assert_eq!(scores.len(), 3);
                assert_eq!(directions.len(), 3);
                self.steps.push(step);
            }
        }

        let pipeline = StreamingPipeline::<i16>::new(b"ATG", &Scoring::default(), 8).unwrap();
        let mut sink = CountingSink { steps: vec![] };
        let summary = pipeline.run(b"CATGA".iter().copied(), &mut sink).unwrap();

        assert_eq!(summary.rows, 5);
        assert_eq!(summary.steps, 5 + 3 - 1);
        assert_eq!(sink.steps, (0..7).collect::<Vec<_>>());
        assert_eq!(summary.max.value, 6);
        assert_eq!((summary.max.row, summary.max.col), (3, 2));
    }

    #[test]
    fn test_skewed_step_layout() {
        // Step 3 holds the anti-diagonal (3, 0) (2, 1) (1, 2)
        let pipeline = StreamingPipeline::<i32>::new(b"ATG", &Scoring::default(), 8).unwrap();
        let mut directions = SkewedDirections::new(3);
        pipeline.run(b"CATGA".iter().copied(), &mut directions).unwrap();

        let reference = scalar::fill(b"ATG", b"CATGA", &Scoring::default()).unwrap();
        for (col, &direction) in directions.step(3).iter().enumerate() {
            assert_eq!(direction, reference.directions.get(3 - col, col));
        }
    }

    #[test]
    fn test_padding_lanes_are_empty() {
        let pipeline = StreamingPipeline::<i16>::new(b"AAA", &Scoring::default(), 8).unwrap();
        let mut directions = SkewedDirections::new(3);
        pipeline.run(b"A".iter().copied(), &mut directions).unwrap();

        // Single database row: lane `col` is only real at step `col`
        assert_eq!(directions.steps(), 3);
        assert_eq!(directions.step(0)[1..], [Direction::None, Direction::None]);
        assert_eq!(directions.step(2)[..2], [Direction::None, Direction::None]);
    }

    #[test]
    fn test_saturates_instead_of_wrapping() {
        let run = "A".repeat(70);
        let narrow = streamed(&run, &run, ScoreWidth::I8);
        assert!(narrow.saturated);
        assert_eq!(narrow.max.value, i8::MAX as i32);
        let scores = narrow.scores.as_dense().unwrap();
        assert!(scores.as_slice().iter().all(|&v| v >= 0));

        let wide = streamed(&run, &run, ScoreWidth::I16);
        assert!(!wide.saturated);
        assert_eq!(wide.max.value, 140);
    }

    #[test]
    fn test_column_reduction_prefers_last_tie() {
        // (0, 0) and (0, 1) both score 2
        let computed = streamed("AA", "A", ScoreWidth::I16);
        assert_eq!(computed.max.value, 2);
        assert_eq!(computed.max.index, 1);

        let reference = scalar::fill(b"AA", b"A", &Scoring::default()).unwrap();
        assert_eq!(reference.max.index, 0);
    }

    #[test]
    fn test_rejects_wide_query() {
        assert!(matches!(
            StreamingPipeline::<i16>::new(b"ATGCA", &Scoring::default(), 4),
            Err(Error::WindowTooWide { len: 5, max: 4 })
        ));
    }

    #[test]
    fn test_rejects_empty_stream() {
        let pipeline = StreamingPipeline::<i16>::new(b"A", &Scoring::default(), 4).unwrap();
        let mut directions = SkewedDirections::new(1);
        assert!(matches!(
            pipeline.run(std::iter::empty(), &mut directions),
            Err(Error::EmptySequence(SequenceKind::Database))
        ));
    }

    #[test]
    fn test_rejects_scoring_out_of_width() {
        let scoring = Scoring {
            gap_row_penalty: -200,
            ..Scoring::default()
        };
        assert!(matches!(
            StreamingPipeline::<i8>::new(b"A", &scoring, 4),
            Err(Error::ScoringOutOfRange {
                name: "gap_row_penalty",
                ..
            })
        ));
    }

    #[test]
    fn test_rolling_scores_without_retention() {
        let computed = fill(
            b"ATGC",
            b"TTATGCTT",
            &Scoring::default(),
            &StreamingConfig::default(),
        )
        .unwrap();
        assert_eq!(computed.scores, ScoreStore::Rolling);
        assert_eq!(computed.max.value, 8);
    }
}
