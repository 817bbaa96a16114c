//! Recommendation Engine
//!
//! Turns compliance reports into ordered, human-readable actions.
//!
//! ## Architecture
//! - `types.rs` - Recommendation, severity and kind types
//! - `rules.rs` - Data-driven rule table and message templates
//! - `engine.rs` - Rule evaluation and ordering

pub mod types;
pub mod rules;
pub mod engine;

pub use types::{Recommendation, RecommendationKind, Severity};
pub use rules::{Rule, Trigger, DEFAULT_RULES};
pub use engine::{recommend, RecommendationEngine, DEFAULT_MAINTENANCE_WINDOW_MINUTES};
