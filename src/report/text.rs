use super::RunSummary;
use crate::analysis::{GardenOutcome, ScoredGarden};
use crate::compliance::ComplianceScore;
use crate::ingest::DeviceEvent;

/// Plain-text (markdown) formatter for run summaries
///
/// Scored gardens come first, then gardens without data, unscored gardens
/// and unmapped sensors, each in its own section.
pub struct TextFormatter;

impl TextFormatter {
    pub fn format(summary: &RunSummary) -> String {
        let mut md = String::with_capacity(4096);
        let totals = &summary.totals;

        md.push_str("# Garden Compliance Report\n\n");
        md.push_str(&format!(
            "**Gardens:** {} ({} good, {} need attention, {} poor, {} without data, {} unscored)\n\n",
            totals.gardens,
            totals.good,
            totals.needs_attention,
            totals.poor,
            totals.no_data,
            totals.unscored
        ));

        let scored: Vec<&ScoredGarden> = summary
            .gardens
            .iter()
            .filter_map(GardenOutcome::scored)
            .filter(|g| !g.report.is_no_data())
            .collect();
        if !scored.is_empty() {
            md.push_str("## Scored Gardens\n\n");
            for garden in scored {
                Self::format_garden(&mut md, summary, garden);
            }
        }

        let diagnostics = summary.diagnostics;
        if !diagnostics.no_data_gardens.is_empty() {
            md.push_str("## Gardens Without Data\n\n");
            for garden_id in &diagnostics.no_data_gardens {
                md.push_str(&format!("- {}\n", summary.garden_label(garden_id)));
                if let Some(scored) = summary
                    .gardens
                    .iter()
                    .find(|g| g.garden_id() == garden_id)
                    .and_then(GardenOutcome::scored)
                {
                    for rec in &scored.recommendations {
                        md.push_str(&format!("  - {} {}\n", rec.severity.icon(), rec.message));
                    }
                }
            }
            md.push('\n');
        }

        if !diagnostics.unscored_gardens.is_empty() {
            md.push_str("## Unscored Gardens\n\n");
            for error in &diagnostics.unscored_gardens {
                md.push_str(&format!(
                    "- {}: no profile for vegetable '{}'\n",
                    summary.garden_label(&error.garden_id),
                    error.vegetable_name
                ));
            }
            md.push('\n');
        }

        if !diagnostics.unmapped_sensors.is_empty() {
            md.push_str("## Unmapped Sensors\n\n");
            for sensor in &diagnostics.unmapped_sensors {
                md.push_str(&format!(
                    "- {} ({} readings discarded)\n",
                    sensor.sensor_id, sensor.readings
                ));
            }
            md.push('\n');
        }

        if !diagnostics.untyped_sensors.is_empty() {
            md.push_str("## Untyped Sensors\n\n");
            for sensor_id in &diagnostics.untyped_sensors {
                md.push_str(&format!("- {}\n", sensor_id));
            }
            md.push('\n');
        }

        if !diagnostics.unattributed_events.is_empty() {
            md.push_str("## Unattributed Device Events\n\n");
            for event in &diagnostics.unattributed_events {
                Self::format_event(&mut md, event);
            }
            md.push('\n');
        }

        md
    }

    fn format_garden(md: &mut String, summary: &RunSummary, garden: &ScoredGarden) {
        let report = &garden.report;
        md.push_str(&format!(
            "### {} - {}\n\n",
            summary.garden_label(&report.garden_id),
            report.vegetable_name
        ));
        if let Some(overall) = report.overall {
            md.push_str(&format!(
                "**Overall Score:** {:.1}/100 ({})\n\n",
                overall.score,
                overall.status.display_text()
            ));
        }

        for score in report.scores.values() {
            Self::format_score(md, score);
        }
        md.push('\n');

        if garden.recommendations.is_empty() {
            md.push_str("No recommendations.\n\n");
        } else {
            md.push_str("**Recommendations:**\n\n");
            for rec in &garden.recommendations {
                md.push_str(&format!(
                    "- {} [{}] {}\n",
                    rec.severity.icon(),
                    rec.severity.display_text(),
                    rec.message
                ));
            }
            md.push('\n');
        }

        if !garden.events.is_empty() {
            md.push_str("**Device Events:**\n\n");
            for event in &garden.events {
                Self::format_event(md, event);
            }
            md.push('\n');
        }
    }

    fn format_score(md: &mut String, score: &ComplianceScore) {
        let unit = score.range.unit();
        md.push_str(&format!(
            "- {}: {:.1}% ({}) | {}/{} in range | average {:.1} {} | latest {:.1} {} | optimal {}\n",
            score.sensor_type.display_name(),
            score.percentage,
            score.status().display_text(),
            score.in_range_count,
            score.readings_count,
            score.mean_value,
            unit,
            score.latest_value,
            unit,
            score.range.format_span()
        ));
    }

    fn format_event(md: &mut String, event: &DeviceEvent) {
        md.push_str(&format!(
            "- {} {} {}[id={}]: {}\n",
            event.timestamp.format("%Y-%m-%d %H:%M:%S"),
            event.level,
            event.component,
            event.sensor_id,
            event.message
        ));
    }
}
