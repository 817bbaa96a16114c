//! Reading Store: normalized, timestamped readings grouped by garden

pub mod reading;
pub mod store;

pub use reading::{parse_timestamp, SensorReading, TIMESTAMP_FORMAT};
pub use store::{Garden, ReadingStore};
