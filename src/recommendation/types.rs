//! Recommendation output types

use serde::Serialize;

use crate::profile::SensorType;

/// Severity level of a recommendation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    /// Derive severity from a compliance score (0-100)
    pub fn from_score(score: f64) -> Self {
        match score {
            s if s >= 80.0 => Severity::Low,
            s if s >= 60.0 => Severity::Medium,
            _ => Severity::High,
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Severity::Low => "ℹ️",
            Severity::Medium => "⚠️",
            Severity::High => "🚨",
        }
    }

    pub fn display_text(&self) -> &'static str {
        match self {
            Severity::Low => "Low",
            Severity::Medium => "Medium",
            Severity::High => "High",
        }
    }
}

/// What a recommendation asks the gardener to do
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationKind {
    IncreaseIrrigation,
    ReduceIrrigation,
    Heating,
    Cooling,
    IncreaseHumidity,
    Ventilation,
    SensorMaintenance,
}

/// One actionable recommendation for a garden
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub garden_id: String,
    pub sensor_type: SensorType,
    pub kind: RecommendationKind,
    pub severity: Severity,
    /// Score used for ranking: the sensor type's compliance, 0 when it never reported
    pub rank_score: f64,
    pub message: String,
}
