//! Compliance Analysis
//!
//! Compares each garden's readings against its vegetable's optimal ranges and
//! aggregates them into per-sensor-type and overall scores.
//!
//! ## Architecture
//! - `comparator.rs` - Value vs range comparison and the compliance falloff
//! - `scorer.rs` - Per-garden aggregation into a `ComplianceReport`
//! - `report.rs` - Report types and status classification

pub mod comparator;
pub mod scorer;
pub mod report;

pub use comparator::{compare_to_range, reading_compliance, RangeComparison, RangeFit};
pub use scorer::{score, score_series};
pub use report::{
    ComplianceReport,
    ComplianceScore,
    OverallScore,
    StatusCategory,
    ATTENTION_THRESHOLD,
    GOOD_THRESHOLD,
};
