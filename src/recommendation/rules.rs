//! Recommendation Rule Table
//!
//! Each rule pairs a sensor type with a trigger and a message template. The
//! engine evaluates every rule independently, so several can fire for the
//! same sensor type. New advice is added here, not in the engine.
//!
//! Template placeholders: `{sensor}`, `{value}`, `{min}`, `{max}`, `{unit}`,
//! `{window}`, `{last_seen}`.

use super::types::RecommendationKind;
use crate::profile::SensorType;

/// Condition under which a rule fires
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Trigger {
    /// Latest value below the range minimum, optionally only while the
    /// sensor type's score is under `max_score`
    BelowRange { max_score: Option<f64> },

    /// Latest value above the range maximum, same score gate
    AboveRange { max_score: Option<f64> },

    /// Sensor type reported before but not within the maintenance window
    Stale,

    /// Sensor type mapped to the garden but never reported
    Silent,
}

impl Trigger {
    /// Whether the rule describes an out-of-range condition
    pub fn is_deviation(&self) -> bool {
        matches!(self, Trigger::BelowRange { .. } | Trigger::AboveRange { .. })
    }
}

/// One row of the rule table
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rule {
    /// `None` applies to every sensor type
    pub sensor_type: Option<SensorType>,
    pub kind: RecommendationKind,
    pub trigger: Trigger,
    pub template: &'static str,
}

impl Rule {
    pub fn applies_to(&self, sensor_type: SensorType) -> bool {
        self.sensor_type.map_or(true, |t| t == sensor_type)
    }
}

/// Irrigation rules only fire once moisture compliance is poor
const IRRIGATION_SCORE_GATE: f64 = 60.0;

/// Default advice
pub const DEFAULT_RULES: &[Rule] = &[
    Rule {
        sensor_type: Some(SensorType::Moisture),
        kind: RecommendationKind::IncreaseIrrigation,
        trigger: Trigger::BelowRange { max_score: Some(IRRIGATION_SCORE_GATE) },
        template: "Increase irrigation - soil moisture too low ({value} < {min} {unit})",
    },
    Rule {
        sensor_type: Some(SensorType::Moisture),
        kind: RecommendationKind::ReduceIrrigation,
        trigger: Trigger::AboveRange { max_score: Some(IRRIGATION_SCORE_GATE) },
        template: "Reduce irrigation / check drainage - soil too wet ({value} > {max} {unit})",
    },
    Rule {
        sensor_type: Some(SensorType::Temperature),
        kind: RecommendationKind::Heating,
        trigger: Trigger::BelowRange { max_score: None },
        template: "Temperature too low - consider heating ({value} < {min} {unit})",
    },
    Rule {
        sensor_type: Some(SensorType::Temperature),
        kind: RecommendationKind::Cooling,
        trigger: Trigger::AboveRange { max_score: None },
        template: "Temperature too high - consider cooling/shading ({value} > {max} {unit})",
    },
    Rule {
        sensor_type: Some(SensorType::Humidity),
        kind: RecommendationKind::IncreaseHumidity,
        trigger: Trigger::BelowRange { max_score: None },
        template: "Increase humidity - consider misting ({value} < {min} {unit})",
    },
    Rule {
        sensor_type: Some(SensorType::Humidity),
        kind: RecommendationKind::Ventilation,
        trigger: Trigger::AboveRange { max_score: None },
        template: "Improve ventilation - humidity too high ({value} > {max} {unit})",
    },
    Rule {
        sensor_type: None,
        kind: RecommendationKind::SensorMaintenance,
        trigger: Trigger::Stale,
        template: "{sensor}: no reading in the last {window} - check sensor (last seen {last_seen})",
    },
    Rule {
        sensor_type: None,
        kind: RecommendationKind::SensorMaintenance,
        trigger: Trigger::Silent,
        template: "{sensor}: no data received - check sensor",
    },
];

/// Values substituted into a template
#[derive(Debug, Clone, Default)]
pub struct TemplateValues {
    pub sensor: String,
    pub value: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub unit: String,
    pub window: String,
    pub last_seen: String,
}

/// Fill in a template; placeholders without a value are left empty
pub fn render(template: &str, values: &TemplateValues) -> String {
    let number = |v: Option<f64>| v.map(|x| format!("{:.1}", x)).unwrap_or_default();

    template
        .replace("{sensor}", &values.sensor)
        .replace("{value}", &number(values.value))
        .replace("{min}", &number(values.min))
        .replace("{max}", &number(values.max))
        .replace("{unit}", &values.unit)
        .replace("{window}", &values.window)
        .replace("{last_seen}", &values.last_seen)
}
