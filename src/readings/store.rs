//! Reading Store
//!
//! Joins raw readings with the device mapping and groups them per garden and
//! sensor type, each series in ascending timestamp order. Readings from unknown
//! sensors are discarded and their ids collected.

use chrono::{Duration, NaiveDateTime};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use super::reading::SensorReading;
use crate::error::UnmappedSensorError;
use crate::mapping::DeviceMappingTable;
use crate::profile::SensorType;

/// Readings attributed to one garden for one analysis run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Garden {
    pub garden_id: String,
    pub vegetable_name: String,
    /// Series per sensor type, ascending by timestamp
    readings: BTreeMap<SensorType, Vec<SensorReading>>,
    /// Sensor types with at least one mapped device in this garden
    expected_sensor_types: BTreeSet<SensorType>,
}

impl Garden {
    /// Build a garden, sorting every series chronologically
    pub fn new(
        garden_id: impl Into<String>,
        vegetable_name: impl Into<String>,
        mut readings: BTreeMap<SensorType, Vec<SensorReading>>,
        expected_sensor_types: BTreeSet<SensorType>,
    ) -> Self {
        readings.retain(|_, series| !series.is_empty());
        for series in readings.values_mut() {
            series.sort_by(SensorReading::chronological_cmp);
        }

        Self {
            garden_id: garden_id.into(),
            vegetable_name: vegetable_name.into(),
            readings,
            expected_sensor_types,
        }
    }

    /// Readings of one sensor type (empty slice when none)
    pub fn readings(&self, sensor_type: SensorType) -> &[SensorReading] {
        self.readings
            .get(&sensor_type)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Non-empty series, ordered by sensor type
    pub fn series(&self) -> impl Iterator<Item = (SensorType, &[SensorReading])> {
        self.readings.iter().map(|(t, s)| (*t, s.as_slice()))
    }

    /// Sensor types with at least one reading
    pub fn observed_sensor_types(&self) -> impl Iterator<Item = SensorType> + '_ {
        self.readings.keys().copied()
    }

    pub fn expected_sensor_types(&self) -> &BTreeSet<SensorType> {
        &self.expected_sensor_types
    }

    /// Most recent reading of a sensor type
    pub fn latest(&self, sensor_type: SensorType) -> Option<&SensorReading> {
        self.readings(sensor_type).last()
    }

    /// End of the observed time series across all sensor types
    pub fn latest_timestamp(&self) -> Option<NaiveDateTime> {
        self.readings
            .values()
            .filter_map(|series| series.last())
            .map(|r| r.timestamp)
            .max()
    }

    pub fn reading_count(&self) -> usize {
        self.readings.values().map(Vec::len).sum()
    }

    pub fn has_readings(&self) -> bool {
        !self.readings.is_empty()
    }
}

/// Per-run store of gardens plus the sensors that could not be attributed
#[derive(Debug, Clone, Default)]
pub struct ReadingStore {
    gardens: BTreeMap<String, Garden>,
    /// Unmapped sensor id → number of discarded readings
    unmapped: BTreeMap<String, usize>,
    discarded_non_finite: usize,
    discarded_outside_window: usize,
    discarded_inactive: usize,
    discarded_untyped: usize,
}

impl ReadingStore {
    /// Attribute readings to gardens
    ///
    /// Every garden in the mapping table gets an entry, even with no readings.
    /// With `window`, only readings at or after `latest - window` are kept,
    /// where `latest` is the newest mapped reading of the run. Non-finite
    /// values are dropped only after the sensor id resolved, so unmapped ids
    /// are always collected.
    pub fn build(
        readings: impl IntoIterator<Item = SensorReading>,
        mapping: &DeviceMappingTable,
        window: Option<Duration>,
    ) -> Self {
        let mut unmapped: BTreeMap<String, usize> = BTreeMap::new();
        let mut discarded_non_finite = 0;
        let mut discarded_inactive = 0;
        let mut discarded_untyped = 0;
        let mut attributed: Vec<(String, SensorType, SensorReading)> = Vec::new();

        for reading in readings {
            match mapping.resolve(&reading.sensor_id) {
                Err(_) if mapping.is_inactive(&reading.sensor_id) => {
                    discarded_inactive += 1;
                }
                Err(_) if mapping.is_untyped(&reading.sensor_id) => {
                    discarded_untyped += 1;
                }
                // Collected whatever the value
                Err(err) => {
                    *unmapped.entry(err.sensor_id).or_insert(0) += 1;
                }
                Ok(_) if !reading.value.is_finite() => {
                    discarded_non_finite += 1;
                }
                Ok(device) => {
                    attributed.push((device.garden_id.clone(), device.sensor_type, reading));
                }
            }
        }

        // A window reaching past the earliest representable time keeps everything
        let cutoff = window.and_then(|w| {
            attributed
                .iter()
                .map(|(_, _, r)| r.timestamp)
                .max()
                .and_then(|latest| latest.checked_sub_signed(w))
        });

        let mut grouped: BTreeMap<String, BTreeMap<SensorType, Vec<SensorReading>>> = BTreeMap::new();
        let mut discarded_outside_window = 0;
        for (garden_id, sensor_type, reading) in attributed {
            if let Some(cutoff) = cutoff {
                if reading.timestamp < cutoff {
                    discarded_outside_window += 1;
                    continue;
                }
            }
            grouped
                .entry(garden_id)
                .or_default()
                .entry(sensor_type)
                .or_default()
                .push(reading);
        }

        let gardens = mapping
            .gardens()
            .map(|(garden_id, vegetable)| {
                let readings = grouped.remove(garden_id).unwrap_or_default();
                let garden = Garden::new(
                    garden_id,
                    vegetable,
                    readings,
                    mapping.sensor_types_for(garden_id),
                );
                (garden_id.to_string(), garden)
            })
            .collect();

        if discarded_untyped > 0 {
            tracing::debug!(readings = discarded_untyped, "skipped readings from untyped sensors");
        }
        if discarded_inactive > 0 {
            tracing::debug!(readings = discarded_inactive, "skipped readings from inactive gardens");
        }
        if !unmapped.is_empty() {
            tracing::warn!(
                sensors = unmapped.len(),
                readings = unmapped.values().sum::<usize>(),
                "discarded readings from unmapped sensors"
            );
        }

        Self {
            gardens,
            unmapped,
            discarded_non_finite,
            discarded_outside_window,
            discarded_inactive,
            discarded_untyped,
        }
    }

    /// Gardens sorted by garden id
    pub fn gardens(&self) -> impl Iterator<Item = &Garden> {
        self.gardens.values()
    }

    pub fn garden(&self, garden_id: &str) -> Option<&Garden> {
        self.gardens.get(garden_id)
    }

    pub fn len(&self) -> usize {
        self.gardens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gardens.is_empty()
    }

    /// Unmapped sensor ids, sorted, as errors
    pub fn unmapped_sensors(&self) -> Vec<UnmappedSensorError> {
        self.unmapped
            .keys()
            .map(|id| UnmappedSensorError { sensor_id: id.clone() })
            .collect()
    }

    /// Unmapped sensor id → discarded reading count
    pub fn unmapped_counts(&self) -> &BTreeMap<String, usize> {
        &self.unmapped
    }

    pub fn discarded_non_finite(&self) -> usize {
        self.discarded_non_finite
    }

    pub fn discarded_outside_window(&self) -> usize {
        self.discarded_outside_window
    }

    /// Readings from known sensors of inactive gardens
    pub fn discarded_inactive(&self) -> usize {
        self.discarded_inactive
    }

    /// Readings from known sensors with no usable sensor type
    pub fn discarded_untyped(&self) -> usize {
        self.discarded_untyped
    }
}
