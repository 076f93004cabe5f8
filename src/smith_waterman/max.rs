#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Running best score and its flattened `row * cols + col` index.
///
/// Only a strictly greater value replaces the current best, so the first cell observed with the
/// maximum value is kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MaxTracker {
    value: i32,
    index: usize,
}

impl MaxTracker {
    pub const fn new() -> Self {
        Self { value: 0, index: 0 }
    }

    pub const fn with(value: i32, index: usize) -> Self {
        Self { value, index }
    }

    #[inline(always)]
    pub fn observe(&mut self, value: i32, index: usize) {
        if value > self.value {
            self.value = value;
            self.index = index;
        }
    }

    #[inline(always)]
    pub fn value(&self) -> i32 {
        self.value
    }

    #[inline(always)]
    pub fn index(&self) -> usize {
        self.index
    }
}

/// How partial trackers are merged once every worker or column is done.
///
/// The two rules pick different cells when several partials share the maximum value. Each fill
/// strategy keeps the rule it was built with; they are intentionally not unified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reduction {
    /// Keep the incumbent unless a later partial is strictly greater (tiled workers)
    FirstStrictlyGreater,
    /// Any later partial that is greater or equal replaces the incumbent (streaming columns)
    LastGreaterOrEqual,
}

impl Reduction {
    pub fn reduce<I: IntoIterator<Item = MaxTracker>>(self, partials: I) -> MaxTracker {
        partials
            .into_iter()
            .fold(MaxTracker::new(), |incumbent, candidate| {
                let replace = match self {
                    Reduction::FirstStrictlyGreater => candidate.value > incumbent.value,
                    Reduction::LastGreaterOrEqual => incumbent.value <= candidate.value,
                };
                if replace { candidate } else { incumbent }
            })
    }
}

/// Best cell of the whole matrix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GlobalMax {
    pub value: i32,
    /// Flattened `row * cols + col` index
    pub index: usize,
    pub row: usize,
    pub col: usize,
}

impl GlobalMax {
    pub fn from_tracker(tracker: MaxTracker, cols: usize) -> Self {
        Self {
            value: tracker.value,
            index: tracker.index,
            row: tracker.index.checked_div(cols).unwrap_or(0),
            col: tracker.index.checked_rem(cols).unwrap_or(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_observe_keeps_first_maximum() {
        let mut tracker = MaxTracker::new();
        tracker.observe(3, 1);
        tracker.observe(5, 4);
        tracker.observe(5, 9);
        tracker.observe(2, 10);
        assert_eq!(tracker, MaxTracker::with(5, 4));
    }

    #[test]
    fn test_observe_ignores_zero() {
        let mut tracker = MaxTracker::new();
        tracker.observe(0, 7);
        assert_eq!(tracker.index(), 0);
    }

    #[test]
    fn test_reductions_disagree_on_ties() {
        let partials = [
            MaxTracker::with(4, 2),
            MaxTracker::with(7, 5),
            MaxTracker::with(7, 8),
            MaxTracker::with(1, 11),
        ];

        let first = Reduction::FirstStrictlyGreater.reduce(partials);
        let last = Reduction::LastGreaterOrEqual.reduce(partials);
        assert_eq!(first, MaxTracker::with(7, 5));
        assert_eq!(last, MaxTracker::with(7, 8));
    }

    #[test]
    fn test_last_greater_or_equal_takes_zero_partials() {
        // every column stayed at zero, so the last one wins
        let partials = [MaxTracker::with(0, 0), MaxTracker::with(0, 1)];
        assert_eq!(
            Reduction::LastGreaterOrEqual.reduce(partials),
            MaxTracker::with(0, 1)
        );
        assert_eq!(
            Reduction::FirstStrictlyGreater.reduce(partials),
            MaxTracker::new()
        );
    }

    #[test]
    fn test_global_max_position() {
        let max = GlobalMax::from_tracker(MaxTracker::with(8, 23), 4);
        assert_eq!((max.row, max.col), (5, 3));
    }
}
