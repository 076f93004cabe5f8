use super::recurrence::Direction;
use crate::{Error, Result};

/// Row-major grid with one row per database symbol and one column per query symbol, addressed
/// as `row * cols + col`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matrix<T> {
    cells: Vec<T>,
    rows: usize,
    cols: usize,
}

impl<T: Copy + Default> Matrix<T> {
    pub fn new(rows: usize, cols: usize) -> Result<Self> {
        Ok(Self {
            cells: try_filled(rows, cols, T::default)?,
            rows,
            cols,
        })
    }

    pub(crate) fn from_cells(rows: usize, cols: usize, cells: Vec<T>) -> Self {
        debug_assert_eq!(cells.len(), rows * cols);
        Self { cells, rows, cols }
    }

    #[inline(always)]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline(always)]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline(always)]
    pub fn index(&self, row: usize, col: usize) -> usize {
        row * self.cols + col
    }

    #[inline(always)]
    pub fn get(&self, row: usize, col: usize) -> T {
        self.cells[row * self.cols + col]
    }

    #[inline(always)]
    pub fn set(&mut self, row: usize, col: usize, value: T) {
        self.cells[row * self.cols + col] = value;
    }

    #[inline(always)]
    pub fn row(&self, row: usize) -> &[T] {
        &self.cells[row * self.cols..(row + 1) * self.cols]
    }

    /// Splits the grid into every row before `row` and the mutable `row` itself
    #[inline(always)]
    pub(crate) fn split_at_row_mut(&mut self, row: usize) -> (&[T], &mut [T]) {
        let (done, rest) = self.cells.split_at_mut(row * self.cols);
        (done, &mut rest[..self.cols])
    }

    #[inline(always)]
    pub fn as_slice(&self) -> &[T] {
        &self.cells
    }
}

/// Checks that a `rows x cols` grid can be addressed before anything is allocated
pub(crate) fn cell_count(rows: usize, cols: usize) -> Result<usize> {
    rows.checked_mul(cols)
        .filter(|&len| len <= isize::MAX as usize)
        .ok_or(Error::MatrixTooLarge { rows, cols })
}

/// Allocates the cells of a `rows x cols` grid up front, returning an error instead of aborting
/// when the grid does not fit in memory
pub(crate) fn try_filled<T>(
    rows: usize,
    cols: usize,
    fill: impl FnMut() -> T,
) -> Result<Vec<T>> {
    let len = cell_count(rows, cols)?;
    len.checked_mul(size_of::<T>())
        .filter(|&bytes| bytes <= isize::MAX as usize)
        .ok_or(Error::MatrixTooLarge { rows, cols })?;

    let mut cells = Vec::new();
    cells
        .try_reserve_exact(len)
        .map_err(|source| Error::Allocation { rows, cols, source })?;
    cells.extend(std::iter::repeat_with(fill).take(len));
    Ok(cells)
}

/// Scores left behind by a fill pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScoreStore {
    Dense(Matrix<i32>),
    /// Only the rolling rows of the streaming pipeline existed. A cell is positive exactly when
    /// its direction is not `None`, which is all traceback needs.
    Rolling,
}

impl ScoreStore {
    #[inline(always)]
    pub fn get(&self, row: usize, col: usize) -> Option<i32> {
        match self {
            ScoreStore::Dense(matrix) => Some(matrix.get(row, col)),
            ScoreStore::Rolling => None,
        }
    }

    pub fn as_dense(&self) -> Option<&Matrix<i32>> {
        match self {
            ScoreStore::Dense(matrix) => Some(matrix),
            ScoreStore::Rolling => None,
        }
    }
}

/// Direction tags as emitted by the streaming pipeline: one row of `cols` tags per step, where
/// step `row + col` holds cell `(row, col)` at position `col`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkewedDirections {
    tags: Vec<Direction>,
    cols: usize,
    steps: usize,
}

impl SkewedDirections {
    pub fn new(cols: usize) -> Self {
        Self {
            tags: Vec::new(),
            cols,
            steps: 0,
        }
    }

    pub fn push_step(&mut self, directions: &[Direction]) {
        debug_assert_eq!(directions.len(), self.cols);
        self.tags.extend_from_slice(directions);
        self.steps += 1;
    }

    #[inline(always)]
    pub fn steps(&self) -> usize {
        self.steps
    }

    #[inline(always)]
    pub fn rows(&self) -> usize {
        self.steps.saturating_sub(self.cols.saturating_sub(1))
    }

    #[inline(always)]
    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn step(&self, step: usize) -> &[Direction] {
        &self.tags[step * self.cols..(step + 1) * self.cols]
    }

    #[inline(always)]
    pub fn get(&self, row: usize, col: usize) -> Direction {
        self.tags[(row + col) * self.cols + col]
    }

    pub fn to_dense(&self) -> Matrix<Direction> {
        let (rows, cols) = (self.rows(), self.cols);
        let cells = (0..rows)
            .flat_map(|row| (0..cols).map(move |col| (row, col)))
            .map(|(row, col)| self.get(row, col))
            .collect();
        Matrix::from_cells(rows, cols, cells)
    }
}

/// Direction tags left behind by a fill pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectionStore {
    Dense(Matrix<Direction>),
    Skewed(SkewedDirections),
}

impl DirectionStore {
    #[inline(always)]
    pub fn get(&self, row: usize, col: usize) -> Direction {
        match self {
            DirectionStore::Dense(matrix) => matrix.get(row, col),
            DirectionStore::Skewed(skewed) => skewed.get(row, col),
        }
    }

    pub fn rows(&self) -> usize {
        match self {
            DirectionStore::Dense(matrix) => matrix.rows(),
            DirectionStore::Skewed(skewed) => skewed.rows(),
        }
    }

    pub fn cols(&self) -> usize {
        match self {
            DirectionStore::Dense(matrix) => matrix.cols(),
            DirectionStore::Skewed(skewed) => skewed.cols(),
        }
    }

    /// Row-major copy of the tags, regardless of how they were stored
    pub fn to_dense(&self) -> Matrix<Direction> {
        match self {
            DirectionStore::Dense(matrix) => matrix.clone(),
            DirectionStore::Skewed(skewed) => skewed.to_dense(),
        }
    }
}
