//! Optimal Ranges
//!
//! The band of values a vegetable is known to grow well in for one sensor type.

use serde::Serialize;

use super::sensor_type::SensorType;
use crate::error::ConfigError;

/// Optimal `[min, max]` band for a single sensor type
///
/// Invariants: both bounds are finite, `min <= max`, and `unit` is the unit
/// fixed for `sensor_type`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OptimalRange {
    sensor_type: SensorType,
    min: f64,
    max: f64,
    unit: &'static str,
}

impl OptimalRange {
    /// Build a validated range
    pub fn new(sensor_type: SensorType, min: f64, max: f64) -> Result<Self, ConfigError> {
        if !min.is_finite() || !max.is_finite() {
            return Err(ConfigError::NonFiniteRange { sensor_type });
        }
        if min > max {
            return Err(ConfigError::InvalidRange { sensor_type, min, max });
        }

        Ok(Self {
            sensor_type,
            min,
            max,
            unit: sensor_type.unit(),
        })
    }

    /// Build a range from configuration, checking a declared unit if present
    pub fn with_declared_unit(
        sensor_type: SensorType,
        min: f64,
        max: f64,
        unit: Option<&str>,
    ) -> Result<Self, ConfigError> {
        if let Some(found) = unit {
            let expected = sensor_type.unit();
            if !units_match(found, expected) {
                return Err(ConfigError::UnitMismatch {
                    sensor_type,
                    expected,
                    found: found.to_string(),
                });
            }
        }
        Self::new(sensor_type, min, max)
    }

    pub fn sensor_type(&self) -> SensorType {
        self.sensor_type
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn unit(&self) -> &'static str {
        self.unit
    }

    /// `max - min`; zero for a single-point range
    pub fn width(&self) -> f64 {
        self.max - self.min
    }

    /// Inclusive containment check
    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }

    /// E.g. "18.0-26.0 °C"
    pub fn format_span(&self) -> String {
        format!("{:.1}-{:.1} {}", self.min, self.max, self.unit)
    }
}

/// Accept common spellings of the same unit ("C" for "°C", "percent" for "%")
fn units_match(found: &str, expected: &str) -> bool {
    let normalized = match found.trim().to_lowercase().as_str() {
        "c" | "°c" | "degc" | "celsius" => "°C",
        "%" | "percent" | "pct" => "%",
        "lux" | "lx" => "lux",
        "ppm" => "ppm",
        "state" | "on/off" | "bool" => "state",
        _ => return false,
    };
    normalized == expected
}
