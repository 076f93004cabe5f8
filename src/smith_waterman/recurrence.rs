use super::score::Score;
use crate::{Error, Result, Scoring};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Which neighbor a cell's score was derived from. `None` marks a cell floored at zero, where
/// a local alignment may start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum Direction {
    #[default]
    None = 0,
    Diagonal = 1,
    Up = 2,
    Left = 3,
}

impl Direction {
    #[inline(always)]
    pub fn from_u8(value: u8) -> Direction {
        match value {
            1 => Direction::Diagonal,
            2 => Direction::Up,
            3 => Direction::Left,
            _ => Direction::None,
        }
    }
}

/// Scoring parameters converted into the score type of a fill strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Weights<S: Score> {
    pub match_score: S,
    pub mismatch_score: S,
    pub gap_row_penalty: S,
    pub gap_col_penalty: S,
}

impl<S: Score> Weights<S> {
    pub fn new(scoring: &Scoring) -> Result<Self> {
        let convert = |name: &'static str, value: i32| {
            S::try_from_i32(value).ok_or(Error::ScoringOutOfRange {
                name,
                value,
                width: S::WIDTH,
            })
        };

        Ok(Self {
            match_score: convert("match_score", scoring.match_score)?,
            mismatch_score: convert("mismatch_score", scoring.mismatch_score)?,
            gap_row_penalty: convert("gap_row_penalty", scoring.gap_row_penalty)?,
            gap_col_penalty: convert("gap_col_penalty", scoring.gap_col_penalty)?,
        })
    }
}

/// Outcome of relaxing one cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Relaxed<S> {
    pub value: S,
    pub direction: Direction,
    /// A candidate was clamped at the top of the score range
    pub saturated: bool,
}

/// Computes a cell from its diagonal, up and left neighbors (zero when off-grid).
///
/// Candidates are checked in the order diagonal, up, left and only a strictly greater value
/// replaces the current best, so ties resolve to the earlier direction. This order decides which
/// of several optimal alignments is reported and every strategy relies on it.
#[inline(always)]
pub fn relax<S: Score>(diag: S, up: S, left: S, is_match: bool, weights: &Weights<S>) -> Relaxed<S> {
    let score = if is_match {
        weights.match_score
    } else {
        weights.mismatch_score
    };

    let (d, d_clamped) = diag.saturating_add_flagged(score);
    let (u, u_clamped) = up.saturating_add_flagged(weights.gap_row_penalty);
    let (l, l_clamped) = left.saturating_add_flagged(weights.gap_col_penalty);

    let mut best = S::ZERO;
    let mut direction = Direction::None;
    if d > best {
        best = d;
        direction = Direction::Diagonal;
    }
    if u > best {
        best = u;
        direction = Direction::Up;
    }
    if l > best {
        best = l;
        direction = Direction::Left;
    }

    Relaxed {
        value: best,
        direction,
        saturated: (d_clamped && d == S::MAX)
            || (u_clamped && u == S::MAX)
            || (l_clamped && l == S::MAX),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weights() -> Weights<i32> {
        Weights::new(&Scoring::default()).unwrap()
    }

    #[test]
    fn test_relax_floors_at_zero() {
        let cell = relax(0, 0, 0, false, &weights());
        assert_eq!(cell.value, 0);
        assert_eq!(cell.direction, Direction::None);
    }

    #[test]
    fn test_relax_match_from_boundary() {
        let cell = relax(0, 0, 0, true, &weights());
        assert_eq!(cell.value, 2);
        assert_eq!(cell.direction, Direction::Diagonal);
    }

    #[test]
    fn test_relax_picks_strict_maximum() {
        assert_eq!(relax(1, 5, 3, false, &weights()).direction, Direction::Up);
        assert_eq!(relax(1, 3, 5, false, &weights()).direction, Direction::Left);
        assert_eq!(relax(1, 3, 5, false, &weights()).value, 4);
    }

    #[test]
    fn test_relax_ties_prefer_diagonal_then_up() {
        // diag + mismatch == up + gap == left + gap == 3
        let cell = relax(4, 4, 4, false, &weights());
        assert_eq!(cell.value, 3);
        assert_eq!(cell.direction, Direction::Diagonal);

        // up and left tie, diagonal lower
        let cell = relax(0, 4, 4, false, &weights());
        assert_eq!(cell.direction, Direction::Up);
    }

    #[test]
    fn test_relax_reports_saturation() {
        let weights = Weights::<i8>::new(&Scoring::default()).unwrap();
        let cell = relax(126, 0, 0, true, &weights);
        assert_eq!(cell.value, i8::MAX);
        assert!(cell.saturated);

        let cell = relax(125, 0, 0, true, &weights);
        assert_eq!(cell.value, i8::MAX);
        assert!(!cell.saturated);
    }

    #[test]
    fn test_weights_out_of_range() {
        let scoring = Scoring {
            match_score: 300,
            ..Scoring::default()
        };
        assert!(matches!(
            Weights::<i8>::new(&scoring),
            Err(Error::ScoringOutOfRange {
                name: "match_score",
                value: 300,
                ..
            })
        ));
        assert!(Weights::<i16>::new(&scoring).is_ok());
    }

    #[test]
    fn test_direction_u8_roundtrip() {
        for direction in [
            Direction::None,
            Direction::Diagonal,
            Direction::Up,
            Direction::Left,
        ] {
            assert_eq!(Direction::from_u8(direction as u8), direction);
        }
    }
}
