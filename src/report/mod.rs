//! Report rendering
//!
//! Read-only views over an `AnalysisRun`.
//!
//! ## Architecture
//! - `mod.rs` - `RunSummary`, the serializable top-level document
//! - `text.rs` - Plain-text/markdown formatter
//! - `json.rs` - JSON formatter

pub mod text;
pub mod json;

use serde::Serialize;
use std::collections::BTreeMap;

use crate::analysis::{AnalysisRun, GardenOutcome, RunDiagnostics};
use crate::compliance::StatusCategory;

pub use json::JsonFormatter;
pub use text::TextFormatter;

/// Headline counts of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RunTotals {
    pub gardens: usize,
    pub good: usize,
    pub needs_attention: usize,
    pub poor: usize,
    pub no_data: usize,
    pub unscored: usize,
    pub unmapped_sensors: usize,
    pub recommendations: usize,
}

/// Serializable view of a run
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary<'a> {
    pub totals: RunTotals,
    /// garden_id → display name, when known
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub garden_names: BTreeMap<String, String>,
    pub gardens: &'a [GardenOutcome],
    pub diagnostics: &'a RunDiagnostics,
}

impl<'a> RunSummary<'a> {
    pub fn new(run: &'a AnalysisRun) -> Self {
        let totals = RunTotals {
            gardens: run.gardens.len(),
            good: run.count_by_status(StatusCategory::Good),
            needs_attention: run.count_by_status(StatusCategory::NeedsAttention),
            poor: run.count_by_status(StatusCategory::Poor),
            no_data: run.diagnostics.no_data_gardens.len(),
            unscored: run.diagnostics.unscored_gardens.len(),
            unmapped_sensors: run.diagnostics.unmapped_sensors.len(),
            // No-data gardens still carry silent-sensor alerts
            recommendations: run
                .gardens
                .iter()
                .filter_map(GardenOutcome::scored)
                .map(|g| g.recommendations.len())
                .sum(),
        };

        Self {
            totals,
            garden_names: BTreeMap::new(),
            gardens: &run.gardens,
            diagnostics: &run.diagnostics,
        }
    }

    pub fn with_garden_names(mut self, names: impl IntoIterator<Item = (String, String)>) -> Self {
        self.garden_names.extend(names);
        self
    }

    /// "North Bed (G1)", or the bare id when no name is known
    pub fn garden_label(&self, garden_id: &str) -> String {
        match self.garden_names.get(garden_id) {
            Some(name) if name != garden_id => format!("{} ({})", name, garden_id),
            _ => garden_id.to_string(),
        }
    }
}
