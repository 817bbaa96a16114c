//! Recommendation Engine
//!
//! Applies the rule table to a scored garden and returns recommendations in a
//! fixed order: ascending ranking score (so severity never increases down the
//! list), then sensor type precedence, then rule kind.
//!
//! Deviation rules are suppressed while the garden's status is `good`;
//! maintenance rules always apply.

use chrono::{Duration, NaiveDateTime};
use std::cmp::Ordering;

use super::rules::{render, Rule, TemplateValues, Trigger, DEFAULT_RULES};
use super::types::{Recommendation, Severity};
use crate::compliance::{ComplianceReport, ComplianceScore, StatusCategory};
use crate::profile::{GardenProfile, SensorType};
use crate::readings::Garden;

/// Default maintenance window: a sensor silent this long before the end of
/// the garden's series is flagged
pub const DEFAULT_MAINTENANCE_WINDOW_MINUTES: i64 = 60;

/// Rule table plus the maintenance window it is evaluated with
#[derive(Debug, Clone)]
pub struct RecommendationEngine {
    rules: Vec<Rule>,
    maintenance_window: Duration,
}

impl Default for RecommendationEngine {
    fn default() -> Self {
        Self {
            rules: DEFAULT_RULES.to_vec(),
            maintenance_window: Duration::minutes(DEFAULT_MAINTENANCE_WINDOW_MINUTES),
        }
    }
}

impl RecommendationEngine {
    pub fn new(rules: Vec<Rule>, maintenance_window: Duration) -> Self {
        Self {
            rules,
            maintenance_window,
        }
    }

    pub fn with_maintenance_window(mut self, window: Duration) -> Self {
        self.maintenance_window = window;
        self
    }

    pub fn maintenance_window(&self) -> Duration {
        self.maintenance_window
    }

    /// Derive the ordered recommendations for one garden
    pub fn recommend(
        &self,
        report: &ComplianceReport,
        garden: &Garden,
        profile: &GardenProfile,
    ) -> Vec<Recommendation> {
        let deviations_active = report.status() != Some(StatusCategory::Good);
        let series_end = garden.latest_timestamp();
        let mut recommendations = Vec::new();

        for (sensor_type, score) in &report.scores {
            for rule in self.rules.iter().filter(|r| r.applies_to(*sensor_type)) {
                let fired = match rule.trigger {
                    Trigger::BelowRange { max_score } => {
                        deviations_active
                            && score.latest_value < score.range.min()
                            && passes_gate(score, max_score)
                    }
                    Trigger::AboveRange { max_score } => {
                        deviations_active
                            && score.latest_value > score.range.max()
                            && passes_gate(score, max_score)
                    }
                    Trigger::Stale => series_end
                        .map_or(false, |end| self.is_stale(score.latest_timestamp, end)),
                    Trigger::Silent => false,
                };

                if fired {
                    recommendations.push(self.build(rule, &report.garden_id, *sensor_type, Some(score)));
                }
            }
        }

        for sensor_type in garden.expected_sensor_types() {
            let silent = profile.covers(*sensor_type)
                && !report.scores.contains_key(sensor_type)
                && garden.readings(*sensor_type).is_empty();
            if !silent {
                continue;
            }
            for rule in self
                .rules
                .iter()
                .filter(|r| r.trigger == Trigger::Silent && r.applies_to(*sensor_type))
            {
                recommendations.push(self.build(rule, &report.garden_id, *sensor_type, None));
            }
        }

        recommendations.sort_by(ranking);
        recommendations
    }

    /// No reading in `(end - window, end]`
    fn is_stale(&self, last_seen: NaiveDateTime, series_end: NaiveDateTime) -> bool {
        last_seen <= series_end - self.maintenance_window
    }

    fn build(
        &self,
        rule: &Rule,
        garden_id: &str,
        sensor_type: SensorType,
        score: Option<&ComplianceScore>,
    ) -> Recommendation {
        let rank_score = score.map_or(0.0, |s| s.percentage);

        let values = TemplateValues {
            sensor: sensor_type.display_name().to_string(),
            value: score.map(|s| s.latest_value),
            min: score.map(|s| s.range.min()),
            max: score.map(|s| s.range.max()),
            unit: sensor_type.unit().to_string(),
            window: format_window(self.maintenance_window),
            last_seen: score
                .map(|s| s.latest_timestamp.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_default(),
        };

        Recommendation {
            garden_id: garden_id.to_string(),
            sensor_type,
            kind: rule.kind,
            severity: Severity::from_score(rank_score),
            rank_score,
            message: render(rule.template, &values),
        }
    }
}

/// Recommendations with the default rule table and maintenance window
pub fn recommend(report: &ComplianceReport, garden: &Garden, profile: &GardenProfile) -> Vec<Recommendation> {
    RecommendationEngine::default().recommend(report, garden, profile)
}

fn passes_gate(score: &ComplianceScore, max_score: Option<f64>) -> bool {
    max_score.map_or(true, |gate| score.percentage < gate)
}

fn ranking(a: &Recommendation, b: &Recommendation) -> Ordering {
    a.rank_score
        .total_cmp(&b.rank_score)
        .then_with(|| a.sensor_type.precedence().cmp(&b.sensor_type.precedence()))
        .then_with(|| a.kind.cmp(&b.kind))
}

/// Minutes below two hours, e.g. "60 min", "90 min", "2 h", "2 h 30 min"
fn format_window(window: Duration) -> String {
    let minutes = window.num_minutes();
    if minutes < 120 {
        return format!("{} min", minutes);
    }
    match (minutes / 60, minutes % 60) {
        (h, 0) => format!("{} h", h),
        (h, m) => format!("{} h {} min", h, m),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compliance::score;
    use crate::profile::OptimalRange;
    use crate::readings::{parse_timestamp, SensorReading};
    use crate::recommendation::RecommendationKind;
    use std::collections::{BTreeMap, BTreeSet};

    fn reading(id: &str, ts: &str, value: f64) -> SensorReading {
        SensorReading::new(id, parse_timestamp(ts).unwrap(), value)
    }

    fn profile() -> GardenProfile {
        GardenProfile::new(
            "tomato",
            [
                OptimalRange::new(SensorType::Temperature, 18.0, 26.0).unwrap(),
                OptimalRange::new(SensorType::Moisture, 60.0, 80.0).unwrap(),
                OptimalRange::new(SensorType::Humidity, 50.0, 70.0).unwrap(),
            ],
        )
    }

    fn garden(series: Vec<(SensorType, Vec<SensorReading>)>, expected: &[SensorType]) -> Garden {
        let readings: BTreeMap<_, _> = series.into_iter().collect();
        let expected: BTreeSet<_> = expected.iter().copied().collect();
        Garden::new("G1", "tomato", readings, expected)
    }

    fn run(g: &Garden) -> Vec<Recommendation> {
        let report = score(g, &profile());
        recommend(&report, g, &profile())
    }

    #[test]
    fn test_dry_soil_increases_irrigation() {
        let g = garden(
            vec![(
                SensorType::Moisture,
                vec![
                    reading("2001", "2025-01-15 10:00:00", 45.0),
                    reading("2001", "2025-01-15 10:30:00", 40.0),
                ],
            )],
            &[SensorType::Moisture],
        );
        let recs = run(&g);
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].kind, RecommendationKind::IncreaseIrrigation);
        assert_eq!(recs[0].severity, Severity::High);
        assert!(recs[0].message.contains("40.0 < 60.0"));
    }

    #[test]
    fn test_wet_soil_reduces_irrigation() {
        let g = garden(
            vec![(SensorType::Moisture, vec![reading("2001", "2025-01-15 10:00:00", 98.0)])],
            &[SensorType::Moisture],
        );
        let recs = run(&g);
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].kind, RecommendationKind::ReduceIrrigation);
    }

    #[test]
    fn test_slightly_dry_soil_stays_under_irrigation_gate() {
        // Moisture 58 → 90, temperature 12 → 25, overall 57.5
        let g = garden(
            vec![
                (SensorType::Temperature, vec![reading("1001", "2025-01-15 10:00:00", 12.0)]),
                (SensorType::Moisture, vec![reading("2001", "2025-01-15 10:00:00", 58.0)]),
            ],
            &[SensorType::Temperature, SensorType::Moisture],
        );
        let report = score(&g, &profile());
        assert_ne!(report.status(), Some(StatusCategory::Good));
        assert!((report.score(SensorType::Moisture).unwrap().percentage - 90.0).abs() < 1e-9);

        let kinds: Vec<_> = run(&g).into_iter().map(|r| r.kind).collect();
        assert_eq!(kinds, vec![RecommendationKind::Heating]);
    }

    #[test]
    fn test_slightly_wet_soil_stays_under_irrigation_gate() {
        // Moisture 82 → 90
        let g = garden(
            vec![
                (SensorType::Temperature, vec![reading("1001", "2025-01-15 10:00:00", 12.0)]),
                (SensorType::Moisture, vec![reading("2001", "2025-01-15 10:00:00", 82.0)]),
            ],
            &[SensorType::Temperature, SensorType::Moisture],
        );
        let report = score(&g, &profile());
        assert_ne!(report.status(), Some(StatusCategory::Good));

        let kinds: Vec<_> = run(&g).into_iter().map(|r| r.kind).collect();
        assert!(!kinds.contains(&RecommendationKind::ReduceIrrigation));
        assert_eq!(kinds, vec![RecommendationKind::Heating]);
    }

    #[test]
    fn test_temperature_direction() {
        let hot = garden(
            vec![(SensorType::Temperature, vec![reading("1001", "2025-01-15 10:00:00", 31.0)])],
            &[SensorType::Temperature],
        );
        assert_eq!(run(&hot)[0].kind, RecommendationKind::Cooling);

        let cold = garden(
            vec![(SensorType::Temperature, vec![reading("1001", "2025-01-15 10:00:00", 12.0)])],
            &[SensorType::Temperature],
        );
        assert_eq!(run(&cold)[0].kind, RecommendationKind::Heating);
    }

    #[test]
    fn test_good_garden_is_empty() {
        let g = garden(
            vec![
                (SensorType::Temperature, vec![reading("1001", "2025-01-15 10:00:00", 22.0)]),
                (SensorType::Moisture, vec![reading("2001", "2025-01-15 10:00:00", 70.0)]),
            ],
            &[SensorType::Temperature, SensorType::Moisture],
        );
        assert!(run(&g).is_empty());
    }

    #[test]
    fn test_good_garden_suppresses_deviation_rules() {
        // Temperature 27 scores 87.5, overall stays good
        let g = garden(
            vec![(SensorType::Temperature, vec![reading("1001", "2025-01-15 10:00:00", 27.0)])],
            &[SensorType::Temperature],
        );
        assert!(run(&g).is_empty());
    }

    #[test]
    fn test_stale_sensor_alert() {
        let g = garden(
            vec![
                (SensorType::Temperature, vec![reading("1001", "2025-01-15 08:00:00", 22.0)]),
                (SensorType::Moisture, vec![reading("2001", "2025-01-15 12:00:00", 70.0)]),
            ],
            &[SensorType::Temperature, SensorType::Moisture],
        );
        let recs = run(&g);
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].kind, RecommendationKind::SensorMaintenance);
        assert_eq!(recs[0].sensor_type, SensorType::Temperature);
        assert!(recs[0].message.contains("60 min"));
    }

    #[test]
    fn test_silent_sensor_alert() {
        let g = garden(
            vec![(SensorType::Temperature, vec![reading("1001", "2025-01-15 10:00:00", 22.0)])],
            &[SensorType::Temperature, SensorType::Humidity],
        );
        let recs = run(&g);
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].sensor_type, SensorType::Humidity);
        assert_eq!(recs[0].severity, Severity::High);
        assert_eq!(recs[0].rank_score, 0.0);
    }

    #[test]
    fn test_ordering_by_score_then_precedence() {
        // Moisture 40 → 0; temperature 12 → 25; humidity 80 → 50
        let g = garden(
            vec![
                (SensorType::Temperature, vec![reading("1001", "2025-01-15 10:00:00", 12.0)]),
                (SensorType::Moisture, vec![reading("2001", "2025-01-15 10:00:00", 40.0)]),
                (SensorType::Humidity, vec![reading("3001", "2025-01-15 10:00:00", 80.0)]),
            ],
            &[SensorType::Temperature, SensorType::Moisture, SensorType::Humidity],
        );
        let kinds: Vec<_> = run(&g).into_iter().map(|r| r.kind).collect();
        assert_eq!(
            kinds,
            vec![
                RecommendationKind::IncreaseIrrigation,
                RecommendationKind::Heating,
                RecommendationKind::Ventilation,
            ]
        );
    }

    #[test]
    fn test_equal_scores_use_precedence() {
        // Temperature 10 and humidity 34 both sit one full width outside → 0
        let g = garden(
            vec![
                (SensorType::Humidity, vec![reading("3001", "2025-01-15 10:00:00", 30.0)]),
                (SensorType::Temperature, vec![reading("1001", "2025-01-15 10:00:00", 10.0)]),
            ],
            &[SensorType::Temperature, SensorType::Humidity],
        );
        let types: Vec<_> = run(&g).into_iter().map(|r| r.sensor_type).collect();
        assert_eq!(types, vec![SensorType::Temperature, SensorType::Humidity]);
    }

    #[test]
    fn test_idempotent() {
        let g = garden(
            vec![
                (SensorType::Temperature, vec![reading("1001", "2025-01-15 10:00:00", 35.0)]),
                (SensorType::Moisture, vec![reading("2001", "2025-01-15 09:00:00", 20.0)]),
            ],
            &[SensorType::Temperature, SensorType::Moisture, SensorType::Humidity],
        );
        let report = score(&g, &profile());
        let engine = RecommendationEngine::default();
        assert_eq!(engine.recommend(&report, &g, &profile()), engine.recommend(&report, &g, &profile()));
    }

    #[test]
    fn test_format_window() {
        assert_eq!(format_window(Duration::minutes(45)), "45 min");
        assert_eq!(format_window(Duration::minutes(120)), "2 h");
        assert_eq!(format_window(Duration::minutes(60)), "60 min");
        assert_eq!(format_window(Duration::minutes(90)), "90 min");
        assert_eq!(format_window(Duration::minutes(150)), "2 h 30 min");
    }
}
