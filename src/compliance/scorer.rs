//! Compliance Scorer
//!
//! Scores a garden's readings against its vegetable profile.
//!
//! 1. Each reading gets a compliance value (see `comparator`).
//! 2. A sensor type's score is the unweighted mean of its readings, summed in
//!    ascending timestamp order.
//! 3. Sensor types without readings (or without a range in the profile) are
//!    left out of the report rather than scored 0.
//! 4. The overall score is the mean of the sensor type scores present, in
//!    sensor type order; with none present the garden is no-data.
//!
//! Pure function of its inputs.

use std::collections::BTreeMap;

use super::comparator::compare_to_range;
use super::report::{ComplianceReport, ComplianceScore, OverallScore};
use crate::profile::{GardenProfile, OptimalRange, SensorType};
use crate::readings::{Garden, SensorReading};

/// Score a garden against its profile
pub fn score(garden: &Garden, profile: &GardenProfile) -> ComplianceReport {
    let mut scores = BTreeMap::new();

    for (sensor_type, series) in garden.series() {
        let Some(range) = profile.range(sensor_type) else {
            tracing::debug!(
                garden = %garden.garden_id,
                sensor_type = %sensor_type,
                vegetable = %profile.vegetable_name(),
                "no optimal range for sensor type, readings not scored"
            );
            continue;
        };

        if let Some(score) = score_series(&garden.garden_id, sensor_type, series, range) {
            scores.insert(sensor_type, score);
        }
    }

    let overall = mean(scores.values().map(|s| s.percentage)).map(OverallScore::new);

    tracing::debug!(
        garden = %garden.garden_id,
        sensor_types = scores.len(),
        overall = ?overall.map(|o| o.score),
        "scored garden"
    );

    ComplianceReport {
        garden_id: garden.garden_id.clone(),
        vegetable_name: garden.vegetable_name.clone(),
        scores,
        overall,
    }
}

/// Score one chronologically ordered series; `None` when it is empty
pub fn score_series(
    garden_id: &str,
    sensor_type: SensorType,
    series: &[SensorReading],
    range: &OptimalRange,
) -> Option<ComplianceScore> {
    let latest = series.last()?;

    let mut compliance_sum = 0.0;
    let mut value_sum = 0.0;
    let mut in_range_count = 0;
    for reading in series {
        let comparison = compare_to_range(reading.value, range);
        if comparison.is_within_range() {
            in_range_count += 1;
        }
        compliance_sum += comparison.compliance();
        value_sum += reading.value;
    }

    let n = series.len() as f64;
    Some(ComplianceScore {
        garden_id: garden_id.to_string(),
        sensor_type,
        percentage: compliance_sum / n,
        range: *range,
        readings_count: series.len(),
        in_range_count,
        mean_value: value_sum / n,
        latest_value: latest.value,
        latest_timestamp: latest.timestamp,
    })
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}
