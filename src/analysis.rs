//! Analysis Run - Main coordinator for one compliance analysis
//!
//! Builds the reading store, scores every mapped garden against its profile
//! and derives recommendations. Gardens are independent, so they are scored
//! with Rayon across CPU cores; the lookup tables are shared read-only.
//!
//! Nothing here aborts on bad data. Unknown vegetables, unmapped sensors and
//! gardens without readings all end up in the run's diagnostics.

use chrono::Duration;
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::compliance::{score, ComplianceReport, StatusCategory};
use crate::error::ProfileNotFoundError;
use crate::ingest::{DeviceEvent, IngestStats};
use crate::mapping::DeviceMappingTable;
use crate::profile::ProfileCatalog;
use crate::readings::{Garden, ReadingStore, SensorReading};
use crate::recommendation::{Recommendation, RecommendationEngine, DEFAULT_MAINTENANCE_WINDOW_MINUTES};

/// Knobs for one run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalysisOptions {
    /// Maintenance alert window
    pub maintenance_window: Duration,

    /// Keep only readings at or after `latest - window`
    pub window: Option<Duration>,

    /// Score gardens on the Rayon pool
    pub parallel: bool,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            maintenance_window: Duration::minutes(DEFAULT_MAINTENANCE_WINDOW_MINUTES),
            window: None,
            parallel: true,
        }
    }
}

/// A garden that was scored (possibly no-data)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredGarden {
    pub report: ComplianceReport,
    pub recommendations: Vec<Recommendation>,
    pub events: Vec<DeviceEvent>,
}

/// Result for one garden
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum GardenOutcome {
    Scored(ScoredGarden),
    Unscored {
        error: ProfileNotFoundError,
        events: Vec<DeviceEvent>,
    },
}

impl GardenOutcome {
    pub fn garden_id(&self) -> &str {
        match self {
            GardenOutcome::Scored(scored) => &scored.report.garden_id,
            GardenOutcome::Unscored { error, .. } => &error.garden_id,
        }
    }

    pub fn scored(&self) -> Option<&ScoredGarden> {
        match self {
            GardenOutcome::Scored(scored) => Some(scored),
            GardenOutcome::Unscored { .. } => None,
        }
    }
}

/// Sensor that reported without a mapping entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnmappedSensor {
    pub sensor_id: String,
    pub readings: usize,
}

/// Everything that could not be scored normally
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunDiagnostics {
    pub unmapped_sensors: Vec<UnmappedSensor>,
    /// Configured sensors whose type could not be determined
    pub untyped_sensors: Vec<String>,
    pub unscored_gardens: Vec<ProfileNotFoundError>,
    pub no_data_gardens: Vec<String>,
    /// Events from sensors that resolve to no analysed garden
    pub unattributed_events: Vec<DeviceEvent>,
    pub discarded_non_finite: usize,
    pub discarded_outside_window: usize,
    pub discarded_inactive: usize,
    pub discarded_untyped: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ingest: Option<IngestStats>,
}

/// Output of one run, gardens sorted by garden id
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisRun {
    pub gardens: Vec<GardenOutcome>,
    pub diagnostics: RunDiagnostics,
}

impl AnalysisRun {
    /// Gardens with a score and a status
    pub fn scored(&self) -> impl Iterator<Item = &ScoredGarden> {
        self.gardens
            .iter()
            .filter_map(GardenOutcome::scored)
            .filter(|g| !g.report.is_no_data())
    }

    pub fn count_by_status(&self, status: StatusCategory) -> usize {
        self.scored()
            .filter(|g| g.report.status() == Some(status))
            .count()
    }
}

/// Run coordinator over the immutable lookup tables
pub struct Analyzer<'a> {
    catalog: &'a ProfileCatalog,
    mapping: &'a DeviceMappingTable,
    options: AnalysisOptions,
    engine: RecommendationEngine,
}

impl<'a> Analyzer<'a> {
    pub fn new(catalog: &'a ProfileCatalog, mapping: &'a DeviceMappingTable, options: AnalysisOptions) -> Self {
        let engine = RecommendationEngine::default().with_maintenance_window(options.maintenance_window);
        Self {
            catalog,
            mapping,
            options,
            engine,
        }
    }

    /// Replace the recommendation engine (custom rule table)
    pub fn with_engine(mut self, engine: RecommendationEngine) -> Self {
        self.engine = engine;
        self
    }

    /// Analyse a batch of readings
    pub fn run(&self, readings: impl IntoIterator<Item = SensorReading>) -> AnalysisRun {
        self.run_with_events(readings, Vec::new(), None)
    }

    /// Analyse readings together with device events from ingestion
    pub fn run_with_events(
        &self,
        readings: impl IntoIterator<Item = SensorReading>,
        events: Vec<DeviceEvent>,
        ingest: Option<IngestStats>,
    ) -> AnalysisRun {
        let store = ReadingStore::build(readings, self.mapping, self.options.window);
        let (mut events_by_garden, unattributed_events) = self.attribute_events(events);

        let gardens: Vec<&Garden> = store.gardens().collect();
        let mut outcomes: Vec<GardenOutcome> = if self.options.parallel {
            gardens.into_par_iter().map(|g| self.analyse_garden(g)).collect()
        } else {
            gardens.into_iter().map(|g| self.analyse_garden(g)).collect()
        };
        // Completion order is not guaranteed on the pool
        outcomes.sort_by(|a, b| a.garden_id().cmp(b.garden_id()));

        for outcome in &mut outcomes {
            let garden_events = events_by_garden.remove(outcome.garden_id()).unwrap_or_default();
            match outcome {
                GardenOutcome::Scored(scored) => scored.events = garden_events,
                GardenOutcome::Unscored { events, .. } => *events = garden_events,
            }
        }

        let diagnostics = RunDiagnostics {
            unmapped_sensors: store
                .unmapped_counts()
                .iter()
                .map(|(id, count)| UnmappedSensor {
                    sensor_id: id.clone(),
                    readings: *count,
                })
                .collect(),
            untyped_sensors: self.mapping.untyped_sensors().map(str::to_string).collect(),
            unscored_gardens: outcomes
                .iter()
                .filter_map(|o| match o {
                    GardenOutcome::Unscored { error, .. } => Some(error.clone()),
                    GardenOutcome::Scored(_) => None,
                })
                .collect(),
            no_data_gardens: outcomes
                .iter()
                .filter_map(GardenOutcome::scored)
                .filter(|g| g.report.is_no_data())
                .map(|g| g.report.garden_id.clone())
                .collect(),
            unattributed_events,
            discarded_non_finite: store.discarded_non_finite(),
            discarded_outside_window: store.discarded_outside_window(),
            discarded_inactive: store.discarded_inactive(),
            discarded_untyped: store.discarded_untyped(),
            ingest,
        };

        let run = AnalysisRun {
            gardens: outcomes,
            diagnostics,
        };

        tracing::info!(
            gardens = run.gardens.len(),
            good = run.count_by_status(StatusCategory::Good),
            needs_attention = run.count_by_status(StatusCategory::NeedsAttention),
            poor = run.count_by_status(StatusCategory::Poor),
            no_data = run.diagnostics.no_data_gardens.len(),
            unscored = run.diagnostics.unscored_gardens.len(),
            unmapped_sensors = run.diagnostics.unmapped_sensors.len(),
            "analysis complete"
        );
        run
    }

    fn analyse_garden(&self, garden: &Garden) -> GardenOutcome {
        let profile = match self.catalog.lookup(&garden.vegetable_name, &garden.garden_id) {
            Ok(profile) => profile,
            Err(error) => {
                tracing::warn!(garden = %garden.garden_id, error = %error, "garden not scored");
                return GardenOutcome::Unscored {
                    error,
                    events: Vec::new(),
                };
            }
        };

        let report = score(garden, profile);
        let recommendations = self.engine.recommend(&report, garden, profile);

        GardenOutcome::Scored(ScoredGarden {
            report,
            recommendations,
            events: Vec::new(),
        })
    }

    /// Split events into per-garden lists and the rest, each in timestamp order
    fn attribute_events(&self, mut events: Vec<DeviceEvent>) -> (FxHashMap<String, Vec<DeviceEvent>>, Vec<DeviceEvent>) {
        events.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then_with(|| a.sensor_id.cmp(&b.sensor_id)));

        let mut by_garden: FxHashMap<String, Vec<DeviceEvent>> = FxHashMap::default();
        let mut unattributed = Vec::new();
        for event in events {
            match self.mapping.resolve(&event.sensor_id) {
                Ok(device) => by_garden.entry(device.garden_id.clone()).or_default().push(event),
                Err(_) => unattributed.push(event),
            }
        }
        (by_garden, unattributed)
    }
}

/// One-shot run with default options
pub fn analyze(
    readings: impl IntoIterator<Item = SensorReading>,
    catalog: &ProfileCatalog,
    mapping: &DeviceMappingTable,
) -> AnalysisRun {
    Analyzer::new(catalog, mapping, AnalysisOptions::default()).run(readings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::DeviceMapping;
    use crate::profile::{GardenProfile, OptimalRange, SensorType};
    use crate::readings::parse_timestamp;

    fn catalog() -> ProfileCatalog {
        ProfileCatalog::new([GardenProfile::new(
            "tomato",
            [
                OptimalRange::new(SensorType::Temperature, 18.0, 26.0).unwrap(),
                OptimalRange::new(SensorType::Moisture, 60.0, 80.0).unwrap(),
            ],
        )])
        .unwrap()
    }

    fn mapping() -> DeviceMappingTable {
        DeviceMappingTable::new([
            DeviceMapping::new("1001", "G2", SensorType::Temperature, "tomato"),
            DeviceMapping::new("1002", "G1", SensorType::Temperature, "tomato"),
            DeviceMapping::new("3001", "G3", SensorType::Moisture, "kale"),
        ])
        .unwrap()
    }

    fn reading(id: &str, ts: &str, value: f64) -> SensorReading {
        SensorReading::new(id, parse_timestamp(ts).unwrap(), value)
    }

    fn readings() -> Vec<SensorReading> {
        vec![
            reading("1001", "2025-01-15 10:00:00", 22.0),
            reading("1002", "2025-01-15 10:00:00", 30.0),
            reading("3001", "2025-01-15 10:00:00", 70.0),
            reading("S99", "2025-01-15 10:00:00", 1.0),
        ]
    }

    #[test]
    fn test_outcomes_sorted_by_garden_id() {
        let run = analyze(readings(), &catalog(), &mapping());
        let ids: Vec<&str> = run.gardens.iter().map(|g| g.garden_id()).collect();
        assert_eq!(ids, vec!["G1", "G2", "G3"]);
    }

    #[test]
    fn test_diagnostics() {
        let run = analyze(readings(), &catalog(), &mapping());
        assert_eq!(
            run.diagnostics.unmapped_sensors,
            vec![UnmappedSensor { sensor_id: "S99".to_string(), readings: 1 }]
        );
        assert_eq!(run.diagnostics.unscored_gardens.len(), 1);
        assert_eq!(run.diagnostics.unscored_gardens[0].vegetable_name, "kale");
        assert!(run.diagnostics.no_data_gardens.is_empty());
        assert_eq!(run.scored().count(), 2);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let parallel = analyze(readings(), &catalog(), &mapping());
        let options = AnalysisOptions { parallel: false, ..Default::default() };
        let sequential = Analyzer::new(&catalog(), &mapping(), options).run(readings());
        assert_eq!(parallel, sequential);
    }

    #[test]
    fn test_events_attributed_to_gardens() {
        let event = |id: &str| DeviceEvent {
            sensor_id: id.to_string(),
            timestamp: parse_timestamp("2025-01-15 10:31:00").unwrap(),
            level: "ERROR".to_string(),
            component: "PumpCtrl".to_string(),
            message: "Pump failure on init".to_string(),
        };
        let catalog = catalog();
        let mapping = mapping();
        let run = Analyzer::new(&catalog, &mapping, AnalysisOptions::default()).run_with_events(
            readings(),
            vec![event("1002"), event("9999")],
            None,
        );

        let g1 = run.gardens[0].scored().unwrap();
        assert_eq!(g1.events.len(), 1);
        assert_eq!(run.diagnostics.unattributed_events.len(), 1);
        assert_eq!(run.diagnostics.unattributed_events[0].sensor_id, "9999");
    }
}
