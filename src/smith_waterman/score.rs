#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Integer width used to carry cell scores
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ScoreWidth {
    I8,
    #[default]
    I16,
    I32,
}

/// Cell score representation shared by every fill strategy.
///
/// Additions never wrap: a sum past the type's bounds is clamped and reported, so narrow widths
/// cap long runs of matches at `MAX` instead of turning them negative.
pub trait Score: Copy + Ord + Default + std::fmt::Debug + Send + Sync + 'static {
    const ZERO: Self;
    const MAX: Self;
    const WIDTH: ScoreWidth;

    fn try_from_i32(value: i32) -> Option<Self>;
    fn to_i32(self) -> i32;

    /// Adds `rhs`, clamping at the bounds of the type. The flag is set when clamping happened.
    fn saturating_add_flagged(self, rhs: Self) -> (Self, bool);
}

macro_rules! impl_score {
    ($ty:ty, $width:ident) => {
        impl Score for $ty {
            const ZERO: Self = 0;
            const MAX: Self = <$ty>::MAX;
            const WIDTH: ScoreWidth = ScoreWidth::$width;

            #[inline(always)]
            fn try_from_i32(value: i32) -> Option<Self> {
                <$ty>::try_from(value).ok()
            }

            #[inline(always)]
            fn to_i32(self) -> i32 {
                self as i32
            }

            #[inline(always)]
            fn saturating_add_flagged(self, rhs: Self) -> (Self, bool) {
                match self.checked_add(rhs) {
                    Some(sum) => (sum, false),
                    None => (self.saturating_add(rhs), true),
                }
            }
        }
    };
}

impl_score!(i8, I8);
impl_score!(i16, I16);
impl_score!(i32, I32);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_saturating_add_clamps_at_max() {
        assert_eq!(120i8.saturating_add_flagged(2), (122, false));
        assert_eq!(126i8.saturating_add_flagged(2), (i8::MAX, true));
        assert_eq!(i16::MAX.saturating_add_flagged(1), (i16::MAX, true));
        assert_eq!(5i32.saturating_add_flagged(-1), (4, false));
    }

    #[test]
    fn test_try_from_i32_respects_width() {
        assert_eq!(i8::try_from_i32(127), Some(127));
        assert_eq!(i8::try_from_i32(128), None);
        assert_eq!(i16::try_from_i32(-300), Some(-300));
        assert_eq!(i32::try_from_i32(i32::MIN), Some(i32::MIN));
    }
}
