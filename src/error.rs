//! Error types for garden compliance analysis
//!
//! `ProfileNotFoundError` and `UnmappedSensorError` are diagnostics the engine
//! collects and forwards; they never abort a run. `ConfigError` is raised while
//! building the immutable lookup tables at run start.

use serde::Serialize;
use thiserror::Error;

use crate::profile::SensorType;

/// A garden references a vegetable with no profile in the catalog
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("no garden profile for vegetable '{vegetable_name}' (garden {garden_id})")]
pub struct ProfileNotFoundError {
    pub garden_id: String,
    pub vegetable_name: String,
}

/// A reading carries a sensor id with no device mapping entry
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("sensor '{sensor_id}' has no device mapping")]
pub struct UnmappedSensorError {
    pub sensor_id: String,
}

/// Invalid profile or mapping configuration
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("invalid optimal range for {sensor_type}: min {min} > max {max}")]
    InvalidRange {
        sensor_type: SensorType,
        min: f64,
        max: f64,
    },

    #[error("optimal range for {sensor_type} is not finite")]
    NonFiniteRange { sensor_type: SensorType },

    #[error("unit '{found}' does not match {sensor_type} (expected '{expected}')")]
    UnitMismatch {
        sensor_type: SensorType,
        expected: &'static str,
        found: String,
    },

    #[error("duplicate garden profile for vegetable '{0}'")]
    DuplicateProfile(String),

    #[error("duplicate device mapping for sensor '{0}'")]
    DuplicateSensor(String),

    #[error("garden {garden_id} mapped to both '{existing}' and '{found}'")]
    ConflictingVegetable {
        garden_id: String,
        existing: String,
        found: String,
    },

    #[error("unknown sensor type '{0}'")]
    UnknownSensorType(String),

    #[error("sensor '{sensor_id}' mapped to unknown garden '{garden_id}'")]
    UnknownGarden { sensor_id: String, garden_id: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ProfileNotFoundError {
            garden_id: "G3".to_string(),
            vegetable_name: "kale".to_string(),
        };
        assert!(err.to_string().contains("kale"));
        assert!(err.to_string().contains("G3"));

        let err = UnmappedSensorError { sensor_id: "S99".to_string() };
        assert_eq!(err.to_string(), "sensor 'S99' has no device mapping");
    }

    #[test]
    fn test_invalid_range_display() {
        let err = ConfigError::InvalidRange {
            sensor_type: SensorType::Moisture,
            min: 80.0,
            max: 40.0,
        };
        let text = err.to_string();
        assert!(text.contains("moisture"));
        assert!(text.contains("80"));
        assert!(text.contains("40"));
    }
}
