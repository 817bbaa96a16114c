//! Reading ingestion
//!
//! ## Architecture
//! - `log_parser.rs` - Device controller log lines → readings and device events
//! - `csv_loader.rs` - Tabulated readings via Polars

pub mod log_parser;
pub mod csv_loader;

pub use log_parser::{parse_line, DeviceEvent, IngestStats, LogLine, ParsedLog};
pub use csv_loader::{load_readings_csv, readings_from_frame, CsvReadings};
