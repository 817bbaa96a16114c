//! Sensor readings as handed over by ingestion

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Timestamp format used by the device logs and CSV exports
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// A single timestamped measurement from one sensor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    pub sensor_id: String,
    pub timestamp: NaiveDateTime,
    pub value: f64,
}

impl SensorReading {
    pub fn new(sensor_id: impl Into<String>, timestamp: NaiveDateTime, value: f64) -> Self {
        Self {
            sensor_id: sensor_id.into(),
            timestamp,
            value,
        }
    }

    /// Total order: timestamp, then sensor id, then value
    ///
    /// Fixes the summation order of every mean computed over a series.
    pub fn chronological_cmp(&self, other: &Self) -> Ordering {
        self.timestamp
            .cmp(&other.timestamp)
            .then_with(|| self.sensor_id.cmp(&other.sensor_id))
            .then_with(|| self.value.total_cmp(&other.value))
    }
}

/// Parse a log/CSV timestamp, with or without fractional seconds
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f"))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_timestamp_variants() {
        let a = parse_timestamp("2025-07-31 06:06:45.000").unwrap();
        let b = parse_timestamp("2025-07-31 06:06:45").unwrap();
        let c = parse_timestamp("2025-07-31T06:06:45").unwrap();
        assert_eq!(a, b);
        assert_eq!(b, c);
        assert!(parse_timestamp("31/07/2025").is_none());
    }

    #[test]
    fn test_chronological_cmp() {
        let t1 = parse_timestamp("2025-01-15 10:30:00").unwrap();
        let t2 = parse_timestamp("2025-01-15 10:31:00").unwrap();
        let early = SensorReading::new("b", t1, 5.0);
        let late = SensorReading::new("a", t2, 1.0);
        assert_eq!(early.chronological_cmp(&late), Ordering::Less);

        let same_time = SensorReading::new("a", t1, 9.0);
        assert_eq!(same_time.chronological_cmp(&early), Ordering::Less);
    }
}
