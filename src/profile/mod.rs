//! Garden profiles: sensor types, optimal ranges and the per-vegetable catalog

pub mod sensor_type;
pub mod range;
pub mod catalog;

pub use sensor_type::SensorType;
pub use range::OptimalRange;
pub use catalog::{GardenProfile, ProfileCatalog};
