use serde::{Deserialize, Serialize};

/// Closed y-axis extent `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisExtent {
    pub min: f64,
    pub max: f64,
}

impl AxisExtent {
    #[must_use]
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    #[must_use]
    pub fn span(self) -> f64 {
        self.max - self.min
    }

    #[must_use]
    pub fn contains_zero(self) -> bool {
        self.min <= 0.0 && self.max >= 0.0
    }

    /// Fraction of the span that lies below zero.
    #[must_use]
    pub fn zero_fraction(self) -> f64 {
        -self.min / self.span()
    }

    /// Domain usable by a scale; a flat extent is widened by one unit.
    #[must_use]
    pub fn to_domain(self) -> (f64, f64) {
        if self.max > self.min {
            (self.min, self.max)
        } else {
            (self.min, self.min + 1.0)
        }
    }
}

/// Folds per-chart `(min, max)` pairs into one extent, adding `padding` to the max.
///
/// Returns `None` when no chart contributes to this side.
#[must_use]
pub fn aggregate_extent(
    extents: impl IntoIterator<Item = (f64, f64)>,
    padding: f64,
) -> Option<AxisExtent> {
    extents
        .into_iter()
        .fold(None, |acc: Option<AxisExtent>, (min, max)| {
            Some(match acc {
                None => AxisExtent::new(min, max),
                Some(acc) => AxisExtent::new(acc.min.min(min), acc.max.max(max)),
            })
        })
        .map(|extent| AxisExtent::new(extent.min, extent.max + padding))
}

/// Widens both extents so zero sits at the same fraction of each axis.
///
/// Only applies when both ranges include zero and the left span is non-zero;
/// otherwise the inputs come back unchanged. Data is never rescaled, only
/// the domains.
#[must_use]
pub fn align_zero(left: AxisExtent, right: AxisExtent) -> (AxisExtent, AxisExtent) {
    if !left.contains_zero() || !right.contains_zero() || left.span() <= 0.0 || right.span() <= 0.0 {
        return (left, right);
    }
    let ratio = right.span() / left.span();
    let aligned_left = AxisExtent::new(
        left.min.min(right.min / ratio),
        left.max.max(right.max / ratio),
    );
    let aligned_right = AxisExtent::new(
        right.min.min(left.min * ratio),
        right.max.max(left.max * ratio),
    );
    (aligned_left, aligned_right)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn aggregate_takes_min_of_mins_and_padded_max_of_maxes() {
        let extent = aggregate_extent([(1.0, 5.0), (-2.0, 3.0), (0.0, 9.0)], 0.5).expect("extent");
        assert_eq!(extent, AxisExtent::new(-2.0, 9.5));
    }

    #[test]
    fn aggregate_of_nothing_is_none() {
        assert!(aggregate_extent(std::iter::empty(), 1.0).is_none());
    }

    #[test]
    fn already_aligned_ranges_are_kept() {
        let (left, right) = align_zero(AxisExtent::new(-2.0, 8.0), AxisExtent::new(-10.0, 40.0));
        assert_relative_eq!(left.min, -2.0);
        assert_relative_eq!(left.max, 8.0);
        assert_relative_eq!(right.min, -10.0);
        assert_relative_eq!(right.max, 40.0);
        assert_relative_eq!(left.zero_fraction(), right.zero_fraction(), epsilon = 1e-12);
    }

    #[test]
    fn misaligned_ranges_share_zero_after_alignment() {
        let (left, right) = align_zero(AxisExtent::new(-2.0, 8.0), AxisExtent::new(-20.0, 40.0));
        assert_relative_eq!(left.min, -20.0 / 6.0, epsilon = 1e-12);
        assert_relative_eq!(right.max, 48.0, epsilon = 1e-12);
        assert_relative_eq!(left.zero_fraction(), right.zero_fraction(), epsilon = 1e-12);
    }

    #[test]
    fn ranges_without_zero_are_untouched() {
        let left = AxisExtent::new(1.0, 8.0);
        let right = AxisExtent::new(-10.0, 40.0);
        assert_eq!(align_zero(left, right), (left, right));
    }

    #[test]
    fn flat_extent_widens_to_a_usable_domain() {
        assert_eq!(AxisExtent::new(3.0, 3.0).to_domain(), (3.0, 4.0));
    }
}
