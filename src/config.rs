//! Garden Configuration
//!
//! Loads the garden configuration JSON and builds the run's immutable lookup
//! tables: the profile catalog and the device mapping table.
//!
//! ```json
//! {
//!   "vegetables": { "tomato": { "temperature": { "min": 18, "max": 26, "unit": "°C" } } },
//!   "gardens": { "G1": { "name": "North Bed", "location": "north", "vegetable_type": "tomato", "active": true } },
//!   "sensors": { "1001": { "name": "TempSensor", "model": "DHT22" } },
//!   "sensor_garden_mapping": { "1001": "G1" }
//! }
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::error::ConfigError;
use crate::mapping::{DeviceMapping, DeviceMappingTable};
use crate::profile::{GardenProfile, OptimalRange, ProfileCatalog, SensorType};

/// Optimal range as written in the configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeConfig {
    pub min: f64,
    pub max: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GardenInfo {
    pub name: String,
    #[serde(default)]
    pub location: String,
    pub vegetable_type: String,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorInfo {
    pub name: String,
    #[serde(default)]
    pub model: String,
    /// Explicit type; inferred from `name` when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sensor_type: Option<String>,
}

impl SensorInfo {
    /// Explicit type, else the type inferred from the name
    ///
    /// An explicit but unknown type is an error; a name that matches no
    /// keyword gives `None`.
    fn resolve_type(&self) -> Result<Option<SensorType>, ConfigError> {
        match &self.sensor_type {
            Some(raw) => raw.parse().map(Some),
            None => Ok(SensorType::from_sensor_name(&self.name)),
        }
    }
}

/// A mapping entry: one garden id, or a list holding exactly one
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GardenRef {
    One(String),
    Many(Vec<String>),
}

/// Parsed configuration file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GardenConfig {
    #[serde(default)]
    pub vegetables: BTreeMap<String, BTreeMap<String, RangeConfig>>,
    #[serde(default)]
    pub gardens: BTreeMap<String, GardenInfo>,
    #[serde(default)]
    pub sensors: BTreeMap<String, SensorInfo>,
    #[serde(default)]
    pub sensor_garden_mapping: BTreeMap<String, GardenRef>,
}

impl GardenConfig {
    /// Load and parse a configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read garden configuration: {:?}", path))?;

        let config: GardenConfig = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse garden configuration JSON: {:?}", path))?;

        tracing::debug!(
            path = ?path,
            vegetables = config.vegetables.len(),
            gardens = config.gardens.len(),
            sensors = config.sensors.len(),
            "loaded garden configuration"
        );
        Ok(config)
    }

    /// Build the profile catalog from the `vegetables` section
    pub fn profile_catalog(&self) -> Result<ProfileCatalog, ConfigError> {
        let mut profiles = Vec::with_capacity(self.vegetables.len());
        for (vegetable, ranges) in &self.vegetables {
            let mut parsed = Vec::with_capacity(ranges.len());
            for (raw_type, range) in ranges {
                let sensor_type: SensorType = raw_type.parse()?;
                parsed.push(OptimalRange::with_declared_unit(
                    sensor_type,
                    range.min,
                    range.max,
                    range.unit.as_deref(),
                )?);
            }
            profiles.push(GardenProfile::new(vegetable.clone(), parsed));
        }
        ProfileCatalog::new(profiles)
    }

    /// Build the device mapping table
    ///
    /// Sensors of inactive gardens are registered as inactive rather than
    /// mapped; sensors whose type cannot be determined are registered as
    /// untyped and the rest of the mapping still loads.
    pub fn mapping_table(&self) -> Result<DeviceMappingTable, ConfigError> {
        let mut mappings = Vec::new();
        let mut inactive = Vec::new();
        let mut untyped = Vec::new();

        for (sensor_id, garden_ref) in &self.sensor_garden_mapping {
            let garden_id = match garden_ref {
                GardenRef::One(id) => id,
                GardenRef::Many(ids) => match ids.as_slice() {
                    [id] => id,
                    _ => return Err(ConfigError::DuplicateSensor(sensor_id.clone())),
                },
            };

            let garden = self.gardens.get(garden_id).ok_or_else(|| ConfigError::UnknownGarden {
                sensor_id: sensor_id.clone(),
                garden_id: garden_id.clone(),
            })?;

            if !garden.active {
                tracing::debug!(sensor = %sensor_id, garden = %garden_id, "sensor belongs to inactive garden");
                inactive.push(sensor_id.clone());
                continue;
            }

            let sensor_type = match self.sensors.get(sensor_id) {
                Some(info) => info.resolve_type()?,
                None => None,
            };
            let Some(sensor_type) = sensor_type else {
                tracing::warn!(
                    sensor = %sensor_id,
                    name = self.sensors.get(sensor_id).map_or("", |info| info.name.as_str()),
                    "cannot determine sensor type, readings will not be scored"
                );
                untyped.push(sensor_id.clone());
                continue;
            };

            mappings.push(DeviceMapping::new(
                sensor_id.clone(),
                garden_id.clone(),
                sensor_type,
                garden.vegetable_type.clone(),
            ));
        }

        Ok(DeviceMappingTable::new(mappings)?
            .with_inactive_sensors(inactive)
            .with_untyped_sensors(untyped))
    }

    /// Both lookup tables; warns about gardens whose vegetable has no profile
    pub fn build_tables(&self) -> Result<(ProfileCatalog, DeviceMappingTable)> {
        let catalog = self.profile_catalog().context("Invalid vegetable profiles")?;
        let mapping = self.mapping_table().context("Invalid sensor mapping")?;

        for (garden_id, vegetable) in mapping.gardens() {
            if !catalog.contains(vegetable) {
                tracing::warn!(garden = %garden_id, vegetable = %vegetable, "garden vegetable has no profile");
            }
        }
        Ok((catalog, mapping))
    }

    /// Display name of a garden, falling back to its id
    pub fn garden_name<'a>(&'a self, garden_id: &'a str) -> &'a str {
        self.gardens
            .get(garden_id)
            .map(|g| g.name.as_str())
            .unwrap_or(garden_id)
    }
}
