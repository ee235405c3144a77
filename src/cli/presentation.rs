//! CLI presentation: text and json formatters per command family.

use crate::course::CourseContext;
use crate::events_bus::BusEvent;
use crate::framework::Channel;
use crate::profile::import::{ImportProfileContext, ImportResponse};
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use owo_colors::OwoColorize;
use serde::Serialize;
use serde_json::json;

fn format_section_heading(title: &str) -> String {
    format!("{}", title.bold().underline())
}

pub fn format_channel_text(channel: &Channel) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n", format_section_heading("Channel")));
    out.push_str(&format!("  Identifier: {}\n", channel.identifier));
    if let Some(ref name) = channel.name {
        out.push_str(&format!("  Name: {}\n", name));
    }
    if let Some(ref default_framework) = channel.default_framework {
        out.push_str(&format!("  Default framework: {}\n", default_framework));
    }
    out.push('\n');

    let frameworks = channel.frameworks.as_deref().unwrap_or_default();
    if frameworks.is_empty() {
        out.push_str("No frameworks.\n");
        return out;
    }
    out.push_str(&format!("{}\n\n", format_section_heading("Frameworks")));
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Index", "Identifier", "Name"]);
    for framework in frameworks {
        table.add_row(vec![
            framework
                .index
                .map(|i| i.to_string())
                .unwrap_or_else(|| "-".to_string()),
            framework.identifier.clone(),
            framework.name.clone().unwrap_or_default(),
        ]);
    }
    out.push_str(&format!("{}\n", table));
    out
}

pub fn format_channel_json(channel: &Channel) -> String {
    serde_json::to_string_pretty(channel).unwrap_or_else(|_| "{}".to_string())
}

pub fn format_context_text(context: &CourseContext) -> String {
    if context.is_empty() {
        return "No active course.".to_string();
    }
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Field", "Value"]);
    let field = |v: &Option<String>| v.clone().unwrap_or_else(|| "-".to_string());
    table.add_row(vec!["User".to_string(), field(&context.user_id)]);
    table.add_row(vec!["Course".to_string(), field(&context.course_id)]);
    table.add_row(vec!["Batch".to_string(), field(&context.batch_id)]);
    table.add_row(vec![
        "Batch status".to_string(),
        if context.is_batch_in_progress() {
            format!("{} (in progress)", context.batch_status)
        } else {
            context.batch_status.to_string()
        },
    ]);
    format!("{}\n\n{}", format_section_heading("Course context"), table)
}

pub fn format_context_json(context: &CourseContext) -> String {
    serde_json::to_string_pretty(context).unwrap_or_else(|_| "{}".to_string())
}

/// Outcome of feeding a telemetry file through the summary handler.
#[derive(Debug, Clone, Default, Serialize)]
pub struct IngestSummary {
    pub processed: usize,
    pub failed: usize,
    pub skipped_lines: usize,
    pub bus_events: Vec<BusEvent>,
}

pub fn format_ingest_summary(summary: &IngestSummary, format: &str) -> String {
    if format == "json" {
        return serde_json::to_string_pretty(summary).unwrap_or_else(|_| "{}".to_string());
    }
    let mut out = format!(
        "Processed {} event(s), {} failed, {} unparseable line(s)\n",
        summary.processed, summary.failed, summary.skipped_lines
    );
    if summary.bus_events.is_empty() {
        out.push_str("No bus events published.");
        return out;
    }
    out.push_str(&format!("\n{}\n\n", format_section_heading("Bus events")));
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Namespace", "Event"]);
    for event in &summary.bus_events {
        let event_json = serde_json::to_value(&event.event).unwrap_or_else(|_| json!(null));
        table.add_row(vec![format!("{:?}", event.namespace), event_json.to_string()]);
    }
    out.push_str(&table.to_string());
    out
}

pub fn format_import_validation(response: &ImportResponse<ImportProfileContext>) -> String {
    match (&response.body, &response.error) {
        (_, Some(code)) => format!("Export rejected: {:?}", code),
        (Some(context), None) => format!(
            "Export accepted: {}",
            context.source_db_file_path.display()
        ),
        (None, None) => "Export accepted".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::Framework;
    use serde_json::Map;

    #[test]
    fn empty_context_text() {
        assert_eq!(format_context_text(&CourseContext::default()), "No active course.");
    }

    #[test]
    fn channel_text_lists_frameworks() {
        let channel = Channel {
            identifier: "c1".to_string(),
            name: Some("Channel One".to_string()),
            default_framework: None,
            frameworks: Some(vec![Framework {
                identifier: "fw1".to_string(),
                name: Some("Maths".to_string()),
                index: Some(1),
                extra: Map::new(),
            }]),
            extra: Map::new(),
        };
        let text = format_channel_text(&channel);
        assert!(text.contains("fw1"));
        assert!(text.contains("Maths"));
    }

    #[test]
    fn ingest_summary_json_includes_bus_events() {
        let summary = IngestSummary {
            processed: 2,
            failed: 0,
            skipped_lines: 0,
            bus_events: vec![BusEvent::course_state_updated("co1")],
        };
        let out: serde_json::Value =
            serde_json::from_str(&format_ingest_summary(&summary, "json")).unwrap();
        assert_eq!(out["bus_events"][0]["event"]["payload"]["contentId"], "co1");
    }
}
