//! Device Mapping Table
//!
//! Resolves a sensor id to the garden it sits in, what it measures, and the
//! vegetable grown there. Built once at run start and shared read-only.

use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use crate::error::{ConfigError, UnmappedSensorError};
use crate::profile::SensorType;

/// One sensor's attribution
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceMapping {
    pub sensor_id: String,
    pub garden_id: String,
    pub sensor_type: SensorType,
    pub vegetable_name: String,
}

impl DeviceMapping {
    pub fn new(
        sensor_id: impl Into<String>,
        garden_id: impl Into<String>,
        sensor_type: SensorType,
        vegetable_name: impl Into<String>,
    ) -> Self {
        Self {
            sensor_id: sensor_id.into(),
            garden_id: garden_id.into(),
            sensor_type,
            vegetable_name: vegetable_name.into(),
        }
    }
}

/// Sensor id → mapping, with a per-garden index
#[derive(Debug, Clone, Default)]
pub struct DeviceMappingTable {
    by_sensor: FxHashMap<String, DeviceMapping>,
    /// garden_id → vegetable, sorted by garden id
    gardens: BTreeMap<String, String>,
    /// Known sensors whose garden is excluded from analysis
    inactive: FxHashSet<String>,
    /// Known sensors whose type could not be determined, sorted
    untyped: BTreeSet<String>,
}

impl DeviceMappingTable {
    /// Build the table
    ///
    /// Fails on a repeated sensor id, or when two sensors of the same garden
    /// disagree on the vegetable grown there.
    pub fn new(mappings: impl IntoIterator<Item = DeviceMapping>) -> Result<Self, ConfigError> {
        let mut by_sensor = FxHashMap::default();
        let mut gardens: BTreeMap<String, String> = BTreeMap::new();

        for mapping in mappings {
            match gardens.get(&mapping.garden_id) {
                Some(existing) if *existing != mapping.vegetable_name => {
                    return Err(ConfigError::ConflictingVegetable {
                        garden_id: mapping.garden_id.clone(),
                        existing: existing.clone(),
                        found: mapping.vegetable_name.clone(),
                    });
                }
                Some(_) => {}
                None => {
                    gardens.insert(mapping.garden_id.clone(), mapping.vegetable_name.clone());
                }
            }

            let sensor_id = mapping.sensor_id.clone();
            if by_sensor.insert(sensor_id.clone(), mapping).is_some() {
                return Err(ConfigError::DuplicateSensor(sensor_id));
            }
        }

        Ok(Self {
            by_sensor,
            gardens,
            inactive: FxHashSet::default(),
            untyped: BTreeSet::new(),
        })
    }

    /// Register sensors that belong to inactive gardens
    ///
    /// They still fail to resolve, but are not reported as unmapped.
    pub fn with_inactive_sensors(mut self, sensor_ids: impl IntoIterator<Item = String>) -> Self {
        self.inactive.extend(
            sensor_ids
                .into_iter()
                .filter(|id| !self.by_sensor.contains_key(id)),
        );
        self
    }

    pub fn is_inactive(&self, sensor_id: &str) -> bool {
        self.inactive.contains(sensor_id)
    }

    /// Register known sensors with no usable sensor type
    ///
    /// Like inactive sensors they do not resolve, but they are listed in the
    /// run diagnostics instead of being reported as unmapped.
    pub fn with_untyped_sensors(mut self, sensor_ids: impl IntoIterator<Item = String>) -> Self {
        self.untyped.extend(
            sensor_ids
                .into_iter()
                .filter(|id| !self.by_sensor.contains_key(id)),
        );
        self
    }

    pub fn is_untyped(&self, sensor_id: &str) -> bool {
        self.untyped.contains(sensor_id)
    }

    /// Untyped sensor ids, sorted
    pub fn untyped_sensors(&self) -> impl Iterator<Item = &str> {
        self.untyped.iter().map(String::as_str)
    }

    /// Resolve a sensor id
    pub fn resolve(&self, sensor_id: &str) -> Result<&DeviceMapping, UnmappedSensorError> {
        self.by_sensor
            .get(sensor_id)
            .ok_or_else(|| UnmappedSensorError {
                sensor_id: sensor_id.to_string(),
            })
    }

    /// Garden ids with their vegetable, sorted by garden id
    pub fn gardens(&self) -> impl Iterator<Item = (&str, &str)> {
        self.gardens.iter().map(|(g, v)| (g.as_str(), v.as_str()))
    }

    /// Sensor types that have at least one device in the garden
    pub fn sensor_types_for(&self, garden_id: &str) -> BTreeSet<SensorType> {
        self.by_sensor
            .values()
            .filter(|m| m.garden_id == garden_id)
            .map(|m| m.sensor_type)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.by_sensor.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_sensor.is_empty()
    }
}
