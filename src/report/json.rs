use super::RunSummary;

/// JSON formatter for run summaries
pub struct JsonFormatter;

impl JsonFormatter {
    /// Format summary as pretty-printed JSON
    pub fn format(summary: &RunSummary) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(summary)
    }

    /// Format summary as compact JSON (no whitespace)
    pub fn format_compact(summary: &RunSummary) -> Result<String, serde_json::Error> {
        serde_json::to_string(summary)
    }
}
