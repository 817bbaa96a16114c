//! Device Log Parser
//!
//! Parses controller log lines of the form
//!
//! ```text
//! [2025-01-15 10:30:15] INFO TempSensor[id=1001]: temperature=23.5
//! [2025-01-15 10:30:00] INFO TempSensor[id=1001]: Initialized sensor
//! [2025-07-31 06:06:45.000] ERROR PumpCtrl[id=2002]: Pump failure on init
//! ```
//!
//! Numeric `key=value` payloads become readings, other text payloads become
//! device events. Lines without an `[id=..]` cannot be attributed and are only
//! counted. A bad line never aborts parsing.

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use serde::Serialize;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::readings::{parse_timestamp, SensorReading};

const INIT_MARKER: &str = "Initialized sensor";

/// A non-numeric message from an identified device
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceEvent {
    pub sensor_id: String,
    pub timestamp: NaiveDateTime,
    pub level: String,
    pub component: String,
    pub message: String,
}

/// Classification of one log line
#[derive(Debug, Clone, PartialEq)]
pub enum LogLine {
    Reading(SensorReading),
    Init { sensor_id: Option<String>, timestamp: NaiveDateTime },
    Event(DeviceEvent),
    /// Well-formed, but without a sensor id to attribute it to
    Anonymous,
}

/// Line counters for one or more parsed files
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestStats {
    pub lines: usize,
    pub readings: usize,
    pub init_markers: usize,
    pub events: usize,
    pub anonymous: usize,
    pub skipped: usize,
}

impl IngestStats {
    pub fn merge(&mut self, other: &IngestStats) {
        self.lines += other.lines;
        self.readings += other.readings;
        self.init_markers += other.init_markers;
        self.events += other.events;
        self.anonymous += other.anonymous;
        self.skipped += other.skipped;
    }
}

/// Readings and events extracted from device logs
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedLog {
    pub readings: Vec<SensorReading>,
    pub events: Vec<DeviceEvent>,
    pub stats: IngestStats,
}

impl ParsedLog {
    /// Parse log text line by line
    pub fn parse_str(text: &str) -> Self {
        let mut parsed = ParsedLog::default();
        for (index, line) in text.lines().enumerate() {
            parsed.push_line(index + 1, line);
        }
        parsed
    }

    /// Parse a log file
    pub fn parse_file(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("Failed to open log file: {:?}", path))?;

        let mut parsed = ParsedLog::default();
        // Split on raw bytes so one undecodable line cannot end the file
        for (index, raw) in BufReader::new(file).split(b'\n').enumerate() {
            let mut raw = raw.with_context(|| format!("Failed to read line {} of {:?}", index + 1, path))?;
            if raw.last() == Some(&b'\r') {
                raw.pop();
            }
            match String::from_utf8(raw) {
                Ok(line) => parsed.push_line(index + 1, &line),
                Err(err) => parsed.skip_undecodable(index + 1, err.utf8_error()),
            }
        }

        tracing::info!(
            path = ?path,
            readings = parsed.stats.readings,
            events = parsed.stats.events,
            skipped = parsed.stats.skipped,
            "parsed device log"
        );
        Ok(parsed)
    }

    /// Append another parsed log
    pub fn extend(&mut self, other: ParsedLog) {
        self.readings.extend(other.readings);
        self.events.extend(other.events);
        self.stats.merge(&other.stats);
    }

    fn skip_undecodable(&mut self, line_number: usize, err: std::str::Utf8Error) {
        tracing::debug!(line = line_number, error = %err, "skipping log line that is not UTF-8");
        self.stats.lines += 1;
        self.stats.skipped += 1;
    }

    fn push_line(&mut self, line_number: usize, line: &str) {
        if line.trim().is_empty() {
            return;
        }
        self.stats.lines += 1;

        match parse_line(line) {
            Some(LogLine::Reading(reading)) => {
                self.stats.readings += 1;
                self.readings.push(reading);
            }
            Some(LogLine::Init { .. }) => self.stats.init_markers += 1,
            Some(LogLine::Event(event)) => {
                self.stats.events += 1;
                self.events.push(event);
            }
            Some(LogLine::Anonymous) => self.stats.anonymous += 1,
            None => {
                tracing::debug!(line = line_number, content = %line, "skipping malformed log line");
                self.stats.skipped += 1;
            }
        }
    }
}

/// Classify one log line; `None` when it is malformed
pub fn parse_line(line: &str) -> Option<LogLine> {
    let rest = line.trim().strip_prefix('[')?;
    let (raw_timestamp, rest) = rest.split_once(']')?;
    let timestamp = parse_timestamp(raw_timestamp)?;

    let (level, rest) = split_word(rest.trim_start())?;
    if !is_word(level) {
        return None;
    }

    let (header, payload) = split_header(rest.trim_start())?;
    let (component, sensor_id) = parse_component(header)?;
    let payload = payload.trim();

    if payload.starts_with(INIT_MARKER) {
        return Some(LogLine::Init { sensor_id, timestamp });
    }
    if payload.is_empty() {
        return None;
    }

    let Some(sensor_id) = sensor_id else {
        return Some(LogLine::Anonymous);
    };

    match parse_measurement(payload) {
        Some(value) => Some(LogLine::Reading(SensorReading::new(sensor_id, timestamp, value))),
        None => Some(LogLine::Event(DeviceEvent {
            sensor_id,
            timestamp,
            level: level.to_string(),
            component: component.to_string(),
            message: payload.to_string(),
        })),
    }
}

fn split_word(s: &str) -> Option<(&str, &str)> {
    let end = s.find(char::is_whitespace)?;
    Some((&s[..end], &s[end..]))
}

/// `Component[id=1]: payload`, or `Component[id=1] Initialized sensor`
fn split_header(s: &str) -> Option<(&str, &str)> {
    let colon = s.find(':');
    let space = s.find(char::is_whitespace);
    match (colon, space) {
        (Some(c), Some(w)) if c < w => Some((&s[..c], &s[c + 1..])),
        (Some(c), None) => Some((&s[..c], &s[c + 1..])),
        (_, Some(w)) => {
            let payload = &s[w..];
            // Only the init marker may follow a header without a colon
            payload.trim_start().starts_with(INIT_MARKER).then(|| (&s[..w], payload))
        }
        (None, None) => None,
    }
}

/// `TempSensor[id=1001]` → ("TempSensor", Some("1001"))
fn parse_component(header: &str) -> Option<(&str, Option<String>)> {
    match header.split_once('[') {
        None => is_word(header).then_some((header, None)),
        Some((name, tail)) => {
            let id = tail.strip_prefix("id=")?.strip_suffix(']')?;
            let valid = is_word(name) && !id.is_empty() && id.chars().all(|c| c.is_ascii_digit());
            valid.then(|| (name, Some(id.to_string())))
        }
    }
}

/// `temperature=23.5` → 23.5; the key must be a single word
fn parse_measurement(payload: &str) -> Option<f64> {
    let (key, rest) = payload.split_once('=')?;
    if !is_word(key.trim()) {
        return None;
    }
    let rest = rest.trim_start();
    let end = rest
        .char_indices()
        .find(|(i, c)| !(c.is_ascii_digit() || *c == '.' || (*i == 0 && *c == '-')))
        .map_or(rest.len(), |(i, _)| i);
    rest[..end].parse::<f64>().ok().filter(|v| v.is_finite())
}

fn is_word(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE_LOG: &str = "\
[2025-01-15 10:30:00] INFO TempSensor[id=1001]: Initialized sensor
[2025-01-15 10:30:15] INFO TempSensor[id=1001]: temperature=23.5
[2025-01-15 10:30:30] DEBUG HumiditySensor[id=1002]: humidity=65.2
[2025-01-15 10:30:45] WARNING SoilSensor[id=2001]: moisture=45.8
[2025-01-15 10:31:00] ERROR PumpCtrl[id=2002]: Pump failure on init
[2025-01-15 10:31:15] INFO TempSensor: temperature=24.1
Invalid log line that should be ignored
[2025-01-15 10:33:15] INFO TempSensor: temperature=25.1
";

    #[test]
    fn test_parse_sample_log() {
        let parsed = ParsedLog::parse_str(SAMPLE_LOG);

        assert_eq!(parsed.stats.lines, 8);
        assert_eq!(parsed.stats.init_markers, 1);
        assert_eq!(parsed.stats.readings, 3);
        assert_eq!(parsed.stats.events, 1);
        assert_eq!(parsed.stats.anonymous, 2);
        assert_eq!(parsed.stats.skipped, 1);

        let ids: Vec<&str> = parsed.readings.iter().map(|r| r.sensor_id.as_str()).collect();
        assert_eq!(ids, vec!["1001", "1002", "2001"]);
        assert_eq!(parsed.readings[0].value, 23.5);
    }

    #[test]
    fn test_pump_failure_is_event() {
        let line = "[2025-07-31 06:06:45.000] ERROR PumpCtrl[id=2002]: Pump failure on init";
        let Some(LogLine::Event(event)) = parse_line(line) else {
            panic!("expected event");
        };
        assert_eq!(event.sensor_id, "2002");
        assert_eq!(event.level, "ERROR");
        assert_eq!(event.component, "PumpCtrl");
        assert_eq!(event.message, "Pump failure on init");
        assert_eq!(event.timestamp, parse_timestamp("2025-07-31 06:06:45").unwrap());
    }

    #[test]
    fn test_init_without_colon() {
        let line = "[2025-01-15 10:30:00] INFO TempSensor[id=1001] Initialized sensor";
        assert!(matches!(
            parse_line(line),
            Some(LogLine::Init { sensor_id: Some(ref id), .. }) if id == "1001"
        ));
    }

    #[test]
    fn test_negative_and_integer_values() {
        let Some(LogLine::Reading(r)) = parse_line("[2025-01-15 10:30:00] INFO T[id=1]: temperature=-3.5") else {
            panic!("expected reading");
        };
        assert_eq!(r.value, -3.5);

        let Some(LogLine::Reading(r)) = parse_line("[2025-01-15 10:30:00] INFO Light[id=4]: light=12000 lux") else {
            panic!("expected reading");
        };
        assert_eq!(r.value, 12000.0);
    }

    #[test]
    fn test_malformed_lines() {
        assert_eq!(parse_line(""), None);
        assert_eq!(parse_line("[not a date] INFO T[id=1]: temperature=1"), None);
        assert_eq!(parse_line("[2025-01-15 10:30:00] INFO T[id=x1]: temperature=1"), None);
        assert_eq!(parse_line("[2025-01-15 10:30:00] INFO T[id=1] temperature=1"), None);
        assert_eq!(parse_line("[2025-01-15 10:30:00]"), None);
    }

    #[test]
    fn test_parse_file_and_extend() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(SAMPLE_LOG.as_bytes()).unwrap();

        let mut parsed = ParsedLog::parse_file(file.path()).unwrap();
        parsed.extend(ParsedLog::parse_str(SAMPLE_LOG));
        assert_eq!(parsed.readings.len(), 6);
        assert_eq!(parsed.stats.lines, 16);
    }

    #[test]
    fn test_invalid_utf8_line_is_skipped() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"[2025-01-15 10:30:15] INFO TempSensor[id=1001]: temperature=23.5\n").unwrap();
        file.write_all(b"[2025-01-15 10:30:20] INFO TempSensor[id=1001]: \xff\xfe garbage\r\n").unwrap();
        file.write_all(b"[2025-01-15 10:30:30] DEBUG HumiditySensor[id=1002]: humidity=65.2\r\n").unwrap();

        let parsed = ParsedLog::parse_file(file.path()).unwrap();
        assert_eq!(parsed.readings.len(), 2);
        assert_eq!(parsed.readings[1].value, 65.2);
        assert_eq!(parsed.stats.lines, 3);
        assert_eq!(parsed.stats.skipped, 1);
    }

    #[test]
    fn test_missing_file() {
        assert!(ParsedLog::parse_file(Path::new("/nonexistent/device.log")).is_err());
    }
}
