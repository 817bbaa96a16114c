//! Garden Compliance Analysis
//!
//! Scores how well each garden's sensor readings match the optimal ranges of
//! the vegetable grown there, and derives irrigation and maintenance
//! recommendations.
//!
//! ## Architecture
//! - `profile/`: Sensor types, optimal ranges and the garden profile catalog
//! - `mapping`: Sensor id → garden, sensor type and vegetable
//! - `readings/`: Readings grouped per garden and sensor type
//! - `compliance/`: Per-reading compliance, per-type and overall scores
//! - `recommendation/`: Rule table and recommendation engine
//! - `analysis`: Per-run coordinator (Rayon across gardens) and diagnostics
//! - `ingest/`: Device log parsing and CSV loading
//! - `config`: Garden configuration JSON → lookup tables
//! - `report/`: Text and JSON rendering of a run

pub mod error;
pub mod profile;
pub mod mapping;
pub mod readings;
pub mod compliance;
pub mod recommendation;
pub mod analysis;
pub mod ingest;
pub mod config;
pub mod report;

// Re-export commonly used types
pub use error::{ConfigError, ProfileNotFoundError, UnmappedSensorError};
pub use profile::{GardenProfile, OptimalRange, ProfileCatalog, SensorType};
pub use mapping::{DeviceMapping, DeviceMappingTable};
pub use readings::{Garden, ReadingStore, SensorReading};
pub use compliance::{score, ComplianceReport, ComplianceScore, StatusCategory};
pub use recommendation::{recommend, Recommendation, RecommendationEngine, Severity};
pub use analysis::{analyze, AnalysisOptions, AnalysisRun, Analyzer, GardenOutcome, RunDiagnostics};
pub use config::GardenConfig;
pub use report::{JsonFormatter, RunSummary, TextFormatter};
