//! Range Comparator
//!
//! Core logic for comparing a measured value against a vegetable's optimal
//! range and turning the deviation into a compliance percentage.
//!
//! ## Falloff policy
//! Inside `[min, max]` (inclusive) a reading is 100% compliant. Outside, the
//! compliance falls linearly with the distance to the nearest bound, measured
//! in range widths, and is clamped at zero:
//!
//! `compliance = max(0, 100 - 100 * distance / (max - min))`
//!
//! A reading one full range-width outside scores 0. For a single-point range
//! (`min == max`) any deviation scores 0.

use serde::Serialize;

use crate::profile::OptimalRange;

/// Result of comparing a value to an optimal range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RangeFit {
    /// value < min
    BelowRange,
    /// min <= value <= max
    WithinRange,
    /// value > max
    AboveRange,
}

impl RangeFit {
    pub fn display_text(&self) -> &'static str {
        match self {
            RangeFit::BelowRange => "Below optimal range",
            RangeFit::WithinRange => "Within optimal range",
            RangeFit::AboveRange => "Above optimal range",
        }
    }
}

/// Comparison of a value against a range, with distance metrics
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeComparison {
    pub fit: RangeFit,

    /// Value being compared
    pub value: f64,

    /// Distance from the nearest bound (0 if within range), in sensor units
    pub distance: f64,

    /// Distance as a fraction of the range width; infinite for a point range
    /// with any deviation
    pub distance_fraction: f64,
}

impl RangeComparison {
    pub fn is_within_range(&self) -> bool {
        self.fit == RangeFit::WithinRange
    }

    /// Compliance percentage in `[0, 100]`
    pub fn compliance(&self) -> f64 {
        if self.is_within_range() {
            return 100.0;
        }
        (100.0 - 100.0 * self.distance_fraction).clamp(0.0, 100.0)
    }
}

/// Compare a value against an optimal range
pub fn compare_to_range(value: f64, range: &OptimalRange) -> RangeComparison {
    let (fit, distance) = if value < range.min() {
        (RangeFit::BelowRange, range.min() - value)
    } else if value > range.max() {
        (RangeFit::AboveRange, value - range.max())
    } else {
        (RangeFit::WithinRange, 0.0)
    };

    let width = range.width();
    let distance_fraction = if distance == 0.0 {
        0.0
    } else if width > 0.0 {
        distance / width
    } else {
        f64::INFINITY
    };

    RangeComparison {
        fit,
        value,
        distance,
        distance_fraction,
    }
}

/// Compliance of a single reading against a range
pub fn reading_compliance(value: f64, range: &OptimalRange) -> f64 {
    compare_to_range(value, range).compliance()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::SensorType;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    fn temp_range() -> OptimalRange {
        OptimalRange::new(SensorType::Temperature, 18.0, 26.0).unwrap()
    }

    #[test]
    fn test_within_range() {
        let comp = compare_to_range(20.0, &temp_range());
        assert_eq!(comp.fit, RangeFit::WithinRange);
        assert_eq!(comp.distance, 0.0);
        assert_eq!(comp.compliance(), 100.0);
    }

    #[test]
    fn test_boundaries_inclusive() {
        assert_eq!(reading_compliance(18.0, &temp_range()), 100.0);
        assert_eq!(reading_compliance(26.0, &temp_range()), 100.0);
    }

    #[test]
    fn test_below_range() {
        // width 8, 3 below → 100 - 37.5
        let comp = compare_to_range(15.0, &temp_range());
        assert_eq!(comp.fit, RangeFit::BelowRange);
        assert_eq!(comp.distance, 3.0);
        assert_relative_eq!(comp.compliance(), 62.5);
    }

    #[test]
    fn test_above_range() {
        // 4 above → 50
        let comp = compare_to_range(30.0, &temp_range());
        assert_eq!(comp.fit, RangeFit::AboveRange);
        assert_relative_eq!(comp.compliance(), 50.0);
    }

    #[test]
    fn test_one_width_outside_is_zero() {
        assert_eq!(reading_compliance(18.0 - 8.0, &temp_range()), 0.0);
        assert_eq!(reading_compliance(26.0 + 8.0, &temp_range()), 0.0);
    }

    #[test]
    fn test_clamped_never_negative() {
        assert_eq!(reading_compliance(-100.0, &temp_range()), 0.0);
    }

    #[test]
    fn test_point_range() {
        let range = OptimalRange::new(SensorType::PumpState, 1.0, 1.0).unwrap();
        assert_eq!(reading_compliance(1.0, &range), 100.0);
        assert_eq!(reading_compliance(0.999, &range), 0.0);
        assert_eq!(reading_compliance(2.0, &range), 0.0);
    }

    proptest! {
        #[test]
        fn prop_inside_is_full(min in -50.0f64..50.0, width in 0.1f64..100.0, t in 0.0f64..=1.0) {
            let range = OptimalRange::new(SensorType::Moisture, min, min + width).unwrap();
            let value = min + t * width;
            prop_assert_eq!(reading_compliance(value, &range), 100.0);
        }

        #[test]
        fn prop_bounded(min in -50.0f64..50.0, width in 0.0f64..100.0, value in -500.0f64..500.0) {
            let range = OptimalRange::new(SensorType::Light, min, min + width).unwrap();
            let c = reading_compliance(value, &range);
            prop_assert!((0.0..=100.0).contains(&c));
        }

        #[test]
        fn prop_monotone_outside(min in 0.0f64..50.0, width in 0.1f64..50.0, d1 in 0.0f64..100.0, extra in 0.0f64..100.0) {
            let range = OptimalRange::new(SensorType::Humidity, min, min + width).unwrap();
            let near = reading_compliance(min + width + d1, &range);
            let far = reading_compliance(min + width + d1 + extra, &range);
            prop_assert!(far <= near);
        }
    }
}
