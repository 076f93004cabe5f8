//! Tiled fill scheduled as an anti-diagonal wavefront.
//!
//! The matrix is cut into square tiles and tile `(tile_row, tile_col)` runs in round
//! `tile_row + tile_col`. A cell depends on its up, left and up-left neighbors, which sit either
//! earlier in the same tile (tiles are filled row-major) or in a tile of a smaller round, so all
//! tiles of one round are independent.
//!
//! ```text
//! round:  0 1 2 3
//!         1 2 3 4
//!         2 3 4 5
//! ```
//!
//! Tile rows are split into contiguous blocks, one per worker, and that split never changes
//! between rounds. The end of every round is a join on the worker pool, so round `r + 1` only
//! reads cells committed by round `r` or earlier.

use std::ops::Range;
use std::sync::atomic::{AtomicI32, AtomicU8, Ordering};

use rayon::ThreadPoolBuilder;
use rayon::prelude::*;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::matrix::{DirectionStore, Matrix, ScoreStore, try_filled};
use super::max::{GlobalMax, MaxTracker, Reduction};
use super::recurrence::{Direction, Weights, relax};
use super::Computed;
use crate::r#const::TILE_SIZE;
use crate::{Error, Result, Scoring};

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TiledConfig {
    /// Edge length of the square tiles
    pub tile_size: usize,
    /// Number of workers, defaults to the available parallelism
    pub threads: Option<usize>,
}

impl Default for TiledConfig {
    fn default() -> Self {
        TiledConfig {
            tile_size: TILE_SIZE,
            threads: None,
        }
    }
}

/// Rectangle of cells filled by one worker within one round
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tile {
    pub tile_row: usize,
    pub tile_col: usize,
    pub rows: Range<usize>,
    pub cols: Range<usize>,
}

impl Tile {
    #[inline(always)]
    pub fn round(&self) -> usize {
        self.tile_row + self.tile_col
    }
}

/// Tiling of a `rows x cols` matrix and its static assignment to workers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    rows: usize,
    cols: usize,
    edge: usize,
    tile_rows: usize,
    tile_cols: usize,
    workers: usize,
    /// Tile rows per worker
    block: usize,
}

impl Schedule {
    pub fn new(rows: usize, cols: usize, edge: usize, workers: usize) -> Result<Self> {
        if edge == 0 {
            return Err(Error::InvalidTileSize);
        }
        let tile_rows = rows.div_ceil(edge);
        let tile_cols = cols.div_ceil(edge);
        // Workers beyond the number of tile rows would never own a tile
        let workers = workers.min(tile_rows).max(1);
        Ok(Self {
            rows,
            cols,
            edge,
            tile_rows,
            tile_cols,
            workers,
            block: tile_rows.div_ceil(workers).max(1),
        })
    }

    pub fn tile_rows(&self) -> usize {
        self.tile_rows
    }

    pub fn tile_cols(&self) -> usize {
        self.tile_cols
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn rounds(&self) -> usize {
        (self.tile_rows + self.tile_cols).saturating_sub(1)
    }

    pub fn tile(&self, tile_row: usize, tile_col: usize) -> Tile {
        let row_start = tile_row * self.edge;
        let col_start = tile_col * self.edge;
        Tile {
            tile_row,
            tile_col,
            rows: row_start..(row_start + self.edge).min(self.rows),
            cols: col_start..(col_start + self.edge).min(self.cols),
        }
    }

    /// Tiles of `round` owned by `worker`, in increasing tile row order
    pub fn worker_tiles(&self, worker: usize, round: usize) -> impl Iterator<Item = Tile> + '_ {
        let first = (worker * self.block).min(self.tile_rows);
        let last = (first + self.block).min(self.tile_rows);
        (first..last)
            .take_while(move |&tile_row| tile_row <= round)
            .map(move |tile_row| (tile_row, round - tile_row))
            .filter(move |&(_, tile_col)| tile_col < self.tile_cols)
            .map(move |(tile_row, tile_col)| self.tile(tile_row, tile_col))
    }
}

/// Matrix cells shared by all workers. Every cell is stored by exactly one worker, and the join
/// at the end of each round orders those stores before any load in later rounds, so relaxed
/// atomics are enough.
struct SharedGrid {
    scores: Vec<AtomicI32>,
    directions: Vec<AtomicU8>,
    rows: usize,
    cols: usize,
}

impl SharedGrid {
    fn new(rows: usize, cols: usize) -> Result<Self> {
        Ok(Self {
            scores: try_filled(rows, cols, || AtomicI32::new(0))?,
            directions: try_filled(rows, cols, || AtomicU8::new(Direction::None as u8))?,
            rows,
            cols,
        })
    }

    #[inline(always)]
    fn load(&self, row: usize, col: usize) -> i32 {
        self.scores[row * self.cols + col].load(Ordering::Relaxed)
    }

    #[inline(always)]
    fn store(&self, row: usize, col: usize, value: i32, direction: Direction) {
        let idx = row * self.cols + col;
        self.scores[idx].store(value, Ordering::Relaxed);
        self.directions[idx].store(direction as u8, Ordering::Relaxed);
    }

    fn into_matrices(self) -> (Matrix<i32>, Matrix<Direction>) {
        let scores = self.scores.into_iter().map(AtomicI32::into_inner).collect();
        let directions = self
            .directions
            .into_iter()
            .map(|tag| Direction::from_u8(tag.into_inner()))
            .collect();
        (
            Matrix::from_cells(self.rows, self.cols, scores),
            Matrix::from_cells(self.rows, self.cols, directions),
        )
    }
}

/// Per-worker partial result, merged once all rounds are done
#[derive(Debug, Clone, Copy, Default)]
struct WorkerMax {
    tracker: MaxTracker,
    saturated: bool,
}

pub fn fill(
    query: &[u8],
    database: &[u8],
    scoring: &Scoring,
    config: &TiledConfig,
) -> Result<Computed> {
    let weights = Weights::<i32>::new(scoring)?;
    let (rows, cols) = (database.len(), query.len());
    let threads = config.threads.unwrap_or_else(rayon::current_num_threads);
    let schedule = Schedule::new(rows, cols, config.tile_size, threads)?;
    let grid = SharedGrid::new(rows, cols)?;
    let mut workers = vec![WorkerMax::default(); schedule.workers];

    log::debug!(
        "tiled fill: {}x{} tiles of edge {} over {} rounds on {} workers",
        schedule.tile_rows,
        schedule.tile_cols,
        schedule.edge,
        schedule.rounds(),
        schedule.workers
    );

    // Without an explicit thread count the rounds run on the ambient rayon pool
    match config.threads {
        Some(_) => ThreadPoolBuilder::new()
            .num_threads(schedule.workers)
            .build()?
            .install(|| run_rounds(&schedule, &grid, query, database, &weights, &mut workers)),
        None => run_rounds(&schedule, &grid, query, database, &weights, &mut workers),
    }

    let max = Reduction::FirstStrictlyGreater.reduce(workers.iter().map(|w| w.tracker));
    let saturated = workers.iter().any(|w| w.saturated);
    let (scores, directions) = grid.into_matrices();

    Ok(Computed {
        scores: ScoreStore::Dense(scores),
        directions: DirectionStore::Dense(directions),
        max: GlobalMax::from_tracker(max, cols),
        saturated,
    })
}

fn run_rounds(
    schedule: &Schedule,
    grid: &SharedGrid,
    query: &[u8],
    database: &[u8],
    weights: &Weights<i32>,
    workers: &mut [WorkerMax],
) {
    for round in 0..schedule.rounds() {
        log::trace!("wavefront round {round}");
        // Returning from for_each is the barrier between rounds
        workers
            .par_iter_mut()
            .enumerate()
            .for_each(|(worker, partial)| {
                for tile in schedule.worker_tiles(worker, round) {
                    fill_tile(grid, query, database, weights, &tile, partial);
                }
            });
    }
}

#[inline(always)]
fn fill_tile(
    grid: &SharedGrid,
    query: &[u8],
    database: &[u8],
    weights: &Weights<i32>,
    tile: &Tile,
    partial: &mut WorkerMax,
) {
    for row in tile.rows.clone() {
        for col in tile.cols.clone() {
            let diag = if row > 0 && col > 0 {
                grid.load(row - 1, col - 1)
            } else {
                0
            };
            let up = if row > 0 { grid.load(row - 1, col) } else { 0 };
            let left = if col > 0 { grid.load(row, col - 1) } else { 0 };

            let cell = relax(diag, up, left, database[row] == query[col], weights);
            grid.store(row, col, cell.value, cell.direction);
            partial.tracker.observe(cell.value, row * grid.cols + col);
            partial.saturated |= cell.saturated;
        }
    }
}
