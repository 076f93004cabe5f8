use super::matrix::{DirectionStore, Matrix, ScoreStore};
use super::max::{GlobalMax, MaxTracker};
use super::recurrence::{Direction, Weights, relax};
use super::Computed;
use crate::{Result, Scoring};

/// Sequential row-major fill on a single thread
pub fn fill(query: &[u8], database: &[u8], scoring: &Scoring) -> Result<Computed> {
    let weights = Weights::<i32>::new(scoring)?;
    let (rows, cols) = (database.len(), query.len());

    let mut scores = Matrix::<i32>::new(rows, cols)?;
    let mut directions = Matrix::<Direction>::new(rows, cols)?;
    let mut tracker = MaxTracker::new();
    let mut saturated = false;

    for (row, &database_char) in database.iter().enumerate() {
        let (done, curr_row_scores) = scores.split_at_row_mut(row);
        let prev_row_scores = if row > 0 {
            Some(&done[(row - 1) * cols..])
        } else {
            None
        };

        let mut left = 0;
        for (col, &query_char) in query.iter().enumerate() {
            let (diag, up) = match prev_row_scores {
                Some(prev) => (if col > 0 { prev[col - 1] } else { 0 }, prev[col]),
                None => (0, 0),
            };

            let cell = relax(diag, up, left, database_char == query_char, &weights);
            curr_row_scores[col] = cell.value;
            directions.set(row, col, cell.direction);
            tracker.observe(cell.value, row * cols + col);
            saturated |= cell.saturated;

            left = cell.value;
        }
    }

    Ok(Computed {
        scores: ScoreStore::Dense(scores),
        directions: DirectionStore::Dense(directions),
        max: GlobalMax::from_tracker(tracker, cols),
        saturated,
    })
}
