//! Sensor Types
//!
//! The closed set of quantities a garden device can report, with the unit each
//! one is measured in and the precedence used to order recommendations.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// Kind of quantity measured by a sensor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorType {
    Temperature,
    Moisture,
    Light,
    Humidity,
    Co2,
    #[serde(alias = "pump")]
    PumpState,
}

impl SensorType {
    /// All sensor types in declaration order
    pub const ALL: [SensorType; 6] = [
        SensorType::Temperature,
        SensorType::Moisture,
        SensorType::Light,
        SensorType::Humidity,
        SensorType::Co2,
        SensorType::PumpState,
    ];

    /// Unit every optimal range of this type is expressed in
    pub fn unit(&self) -> &'static str {
        match self {
            SensorType::Temperature => "°C",
            SensorType::Moisture => "%",
            SensorType::Light => "lux",
            SensorType::Humidity => "%",
            SensorType::Co2 => "ppm",
            SensorType::PumpState => "state",
        }
    }

    /// Tie-break rank for recommendations (lower ranks first)
    ///
    /// Order: moisture, temperature, humidity, co2, light, pump.
    pub fn precedence(&self) -> u8 {
        match self {
            SensorType::Moisture => 0,
            SensorType::Temperature => 1,
            SensorType::Humidity => 2,
            SensorType::Co2 => 3,
            SensorType::Light => 4,
            SensorType::PumpState => 5,
        }
    }

    /// Stable lowercase identifier (matches the serde representation)
    pub fn as_str(&self) -> &'static str {
        match self {
            SensorType::Temperature => "temperature",
            SensorType::Moisture => "moisture",
            SensorType::Light => "light",
            SensorType::Humidity => "humidity",
            SensorType::Co2 => "co2",
            SensorType::PumpState => "pump_state",
        }
    }

    /// Title-case label for reports
    pub fn display_name(&self) -> &'static str {
        match self {
            SensorType::Temperature => "Temperature",
            SensorType::Moisture => "Moisture",
            SensorType::Light => "Light",
            SensorType::Humidity => "Humidity",
            SensorType::Co2 => "CO2",
            SensorType::PumpState => "Pump",
        }
    }

    /// Infer the sensor type from a device name such as `Soil_Moisture_1`
    ///
    /// Matching is case-insensitive; the first keyword found wins, checked in
    /// the order temperature, moisture, light, humidity, co2, pump. The short
    /// controller spellings `Temp` and `Soil` are tried last.
    pub fn from_sensor_name(name: &str) -> Option<Self> {
        let lower = name.to_lowercase();
        const KEYWORDS: [(&str, SensorType); 8] = [
            ("temperature", SensorType::Temperature),
            ("moisture", SensorType::Moisture),
            ("light", SensorType::Light),
            ("humidity", SensorType::Humidity),
            ("co2", SensorType::Co2),
            ("pump", SensorType::PumpState),
            ("temp", SensorType::Temperature),
            ("soil", SensorType::Moisture),
        ];

        KEYWORDS
            .iter()
            .find(|(keyword, _)| lower.contains(keyword))
            .map(|(_, sensor_type)| *sensor_type)
    }
}

impl fmt::Display for SensorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SensorType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "temperature" => Ok(SensorType::Temperature),
            "moisture" => Ok(SensorType::Moisture),
            "light" => Ok(SensorType::Light),
            "humidity" => Ok(SensorType::Humidity),
            "co2" => Ok(SensorType::Co2),
            "pump" | "pump_state" | "pump-state" => Ok(SensorType::PumpState),
            other => Err(ConfigError::UnknownSensorType(other.to_string())),
        }
    }
}
