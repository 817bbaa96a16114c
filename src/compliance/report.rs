//! Compliance Report Types
//!
//! Output structures of the scorer: per-sensor-type scores, the garden's
//! overall score and its status category.

use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::profile::{OptimalRange, SensorType};

/// Lower bound (inclusive) of the `good` status
pub const GOOD_THRESHOLD: f64 = 80.0;

/// Lower bound (inclusive) of the `needs_attention` status
pub const ATTENTION_THRESHOLD: f64 = 60.0;

/// Coarse classification of an overall score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusCategory {
    Good,
    NeedsAttention,
    Poor,
}

impl StatusCategory {
    /// Step function with cut points at 60 and 80
    ///
    /// `score >= 80` is good, `60 <= score < 80` needs attention, anything
    /// lower (or NaN) is poor.
    pub fn from_score(score: f64) -> Self {
        if score >= GOOD_THRESHOLD {
            StatusCategory::Good
        } else if score >= ATTENTION_THRESHOLD {
            StatusCategory::NeedsAttention
        } else {
            StatusCategory::Poor
        }
    }

    pub fn display_text(&self) -> &'static str {
        match self {
            StatusCategory::Good => "Good",
            StatusCategory::NeedsAttention => "Needs Attention",
            StatusCategory::Poor => "Poor",
        }
    }
}

/// Compliance of one sensor type in one garden
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComplianceScore {
    pub garden_id: String,
    pub sensor_type: SensorType,

    /// Mean per-reading compliance in `[0, 100]`
    pub percentage: f64,

    /// Range the readings were scored against
    pub range: OptimalRange,

    pub readings_count: usize,
    pub in_range_count: usize,

    /// Mean of the raw values
    pub mean_value: f64,

    /// Most recent reading
    pub latest_value: f64,
    pub latest_timestamp: NaiveDateTime,
}

impl ComplianceScore {
    pub fn status(&self) -> StatusCategory {
        StatusCategory::from_score(self.percentage)
    }
}

/// Overall score with its derived status
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OverallScore {
    pub score: f64,
    pub status: StatusCategory,
}

impl OverallScore {
    pub fn new(score: f64) -> Self {
        Self {
            score,
            status: StatusCategory::from_score(score),
        }
    }
}

/// Compliance report for one garden in one run
///
/// `overall` is `None` when no sensor type had readings to score (the
/// no-data condition), which is distinct from a score of 0.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComplianceReport {
    pub garden_id: String,
    pub vegetable_name: String,
    pub scores: BTreeMap<SensorType, ComplianceScore>,
    pub overall: Option<OverallScore>,
}

impl ComplianceReport {
    pub fn overall_score(&self) -> Option<f64> {
        self.overall.map(|o| o.score)
    }

    pub fn status(&self) -> Option<StatusCategory> {
        self.overall.map(|o| o.status)
    }

    pub fn is_no_data(&self) -> bool {
        self.overall.is_none()
    }

    pub fn score(&self, sensor_type: SensorType) -> Option<&ComplianceScore> {
        self.scores.get(&sensor_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_status_cut_points() {
        assert_eq!(StatusCategory::from_score(59.999), StatusCategory::Poor);
        assert_eq!(StatusCategory::from_score(60.0), StatusCategory::NeedsAttention);
        assert_eq!(StatusCategory::from_score(79.999), StatusCategory::NeedsAttention);
        assert_eq!(StatusCategory::from_score(80.0), StatusCategory::Good);
        assert_eq!(StatusCategory::from_score(100.0), StatusCategory::Good);
        assert_eq!(StatusCategory::from_score(0.0), StatusCategory::Poor);
    }

    #[test]
    fn test_status_serializes_snake_case() {
        let json = serde_json::to_string(&StatusCategory::NeedsAttention).unwrap();
        assert_eq!(json, "\"needs_attention\"");
    }

    proptest! {
        #[test]
        fn prop_status_monotone(a in 0.0f64..=100.0, b in 0.0f64..=100.0) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            let rank = |s: StatusCategory| match s {
                StatusCategory::Poor => 0,
                StatusCategory::NeedsAttention => 1,
                StatusCategory::Good => 2,
            };
            prop_assert!(rank(StatusCategory::from_score(lo)) <= rank(StatusCategory::from_score(hi)));
        }
    }
}
