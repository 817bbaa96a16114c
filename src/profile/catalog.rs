//! Garden Profile Catalog
//!
//! Read-only mapping from vegetable name to its optimal ranges, loaded once per
//! run. Lookups return a typed `ProfileNotFoundError` instead of a default
//! profile.

use rustc_hash::FxHashMap;
use serde::Serialize;
use std::collections::BTreeMap;

use super::range::OptimalRange;
use super::sensor_type::SensorType;
use crate::error::{ConfigError, ProfileNotFoundError};

/// Optimal ranges for one vegetable (at most one per sensor type)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GardenProfile {
    vegetable_name: String,
    ranges: BTreeMap<SensorType, OptimalRange>,
}

impl GardenProfile {
    /// Build a profile; a later range for the same sensor type replaces an earlier one
    pub fn new(vegetable_name: impl Into<String>, ranges: impl IntoIterator<Item = OptimalRange>) -> Self {
        Self {
            vegetable_name: vegetable_name.into(),
            ranges: ranges.into_iter().map(|r| (r.sensor_type(), r)).collect(),
        }
    }

    pub fn vegetable_name(&self) -> &str {
        &self.vegetable_name
    }

    /// Range for a sensor type, if the vegetable has one
    pub fn range(&self, sensor_type: SensorType) -> Option<&OptimalRange> {
        self.ranges.get(&sensor_type)
    }

    /// Ranges ordered by sensor type
    pub fn ranges(&self) -> impl Iterator<Item = &OptimalRange> {
        self.ranges.values()
    }

    pub fn covers(&self, sensor_type: SensorType) -> bool {
        self.ranges.contains_key(&sensor_type)
    }
}

/// Catalog of garden profiles keyed by vegetable name
#[derive(Debug, Clone, Default)]
pub struct ProfileCatalog {
    profiles: FxHashMap<String, GardenProfile>,
}

impl ProfileCatalog {
    /// Build a catalog, rejecting two profiles for the same vegetable
    pub fn new(profiles: impl IntoIterator<Item = GardenProfile>) -> Result<Self, ConfigError> {
        let mut map = FxHashMap::default();
        for profile in profiles {
            let name = profile.vegetable_name().to_string();
            if map.insert(name.clone(), profile).is_some() {
                return Err(ConfigError::DuplicateProfile(name));
            }
        }
        Ok(Self { profiles: map })
    }

    /// Look up the profile for a vegetable
    ///
    /// `garden_id` is only used to make the error self-describing.
    pub fn lookup(&self, vegetable_name: &str, garden_id: &str) -> Result<&GardenProfile, ProfileNotFoundError> {
        self.profiles
            .get(vegetable_name)
            .ok_or_else(|| ProfileNotFoundError {
                garden_id: garden_id.to_string(),
                vegetable_name: vegetable_name.to_string(),
            })
    }

    pub fn contains(&self, vegetable_name: &str) -> bool {
        self.profiles.contains_key(vegetable_name)
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// Vegetable names, sorted
    pub fn vegetables(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.profiles.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
