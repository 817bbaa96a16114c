//! CSV Readings Loader
//!
//! Loads pre-tabulated readings (`timestamp,sensor_id,value`) with Polars.
//! Rows with a null cell or an unparseable timestamp are skipped and counted.

use anyhow::{Context, Result};
use polars::prelude::*;
use std::path::Path;

use crate::readings::{parse_timestamp, SensorReading};

/// Readings loaded from a CSV export
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CsvReadings {
    pub readings: Vec<SensorReading>,
    pub skipped_rows: usize,
}

/// Load a readings CSV
pub fn load_readings_csv(path: &Path) -> Result<CsvReadings> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path.into()))
        .with_context(|| format!("Failed to create CSV reader: {:?}", path))?
        .finish()
        .with_context(|| format!("Failed to load readings CSV: {:?}", path))?;

    let loaded = readings_from_frame(&df).with_context(|| format!("Invalid readings CSV: {:?}", path))?;

    tracing::info!(
        path = ?path,
        readings = loaded.readings.len(),
        skipped = loaded.skipped_rows,
        "loaded readings CSV"
    );
    Ok(loaded)
}

/// Extract readings from a frame with `timestamp`, `sensor_id` and `value` columns
pub fn readings_from_frame(df: &DataFrame) -> Result<CsvReadings> {
    let timestamps = string_column(df, "timestamp")?;
    let sensor_ids = string_column(df, "sensor_id")?;
    let values = df
        .column("value")
        .with_context(|| "Column 'value' not found")?
        .cast(&DataType::Float64)
        .with_context(|| "Column 'value' is not numeric")?;

    let timestamps = timestamps.str()?;
    let sensor_ids = sensor_ids.str()?;
    let values = values.f64()?;

    let mut loaded = CsvReadings::default();
    for idx in 0..df.height() {
        let row = (timestamps.get(idx), sensor_ids.get(idx), values.get(idx));
        let (Some(raw_ts), Some(sensor_id), Some(value)) = row else {
            loaded.skipped_rows += 1;
            continue;
        };
        let Some(timestamp) = parse_timestamp(raw_ts) else {
            tracing::debug!(row = idx, timestamp = %raw_ts, "unparseable timestamp in readings CSV");
            loaded.skipped_rows += 1;
            continue;
        };
        loaded
            .readings
            .push(SensorReading::new(sensor_id.trim(), timestamp, value));
    }

    Ok(loaded)
}

fn string_column(df: &DataFrame, name: &str) -> Result<Column> {
    df.column(name)
        .with_context(|| format!("Column '{}' not found", name))?
        .cast(&DataType::String)
        .with_context(|| format!("Column '{}' cannot be read as text", name))
}
