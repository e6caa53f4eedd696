//! Output formatting for CLI display.

use crate::model::{RecordStatus, SeaServicePayload, SeaServiceRecord, ServicePeriod};
use crate::schema::{SectionStatus, is_applicable};
use crate::summary::Summary;

/// One-character progress marker.
fn status_marker(status: SectionStatus) -> &'static str {
    match status {
        SectionStatus::Completed => "[x]",
        SectionStatus::InProgress => "[~]",
        SectionStatus::NotStarted => "[ ]",
    }
}

/// Identity line for a record: short id, state, ship type, ship name.
pub(super) fn format_record_header(record: &SeaServiceRecord) -> String {
    let state = match record.status {
        RecordStatus::Draft => "draft",
        RecordStatus::Final { .. } => "final",
    };
    let ship_type = record
        .payload
        .ship_type
        .map_or("ship type not set", |t| t.code());
    let mut header = format!("Record {} [{state}]  {ship_type}", record.short_id());
    if let Some(name) = &record.ship_name {
        header.push_str(&format!("  {name}"));
    }
    if let Some(imo) = &record.imo_number {
        header.push_str(&format!(" (IMO {imo})"));
    }
    header
}

pub(super) fn format_period(period: &ServicePeriod) -> String {
    fn or_dash(value: Option<&str>) -> &str {
        value.unwrap_or("—")
    }

    let completeness = if period.is_complete() {
        ""
    } else {
        "  (incomplete)"
    };
    format!(
        "Service period: {} {} → {} {}{completeness}",
        or_dash(period.sign_on_date.as_deref()),
        or_dash(period.sign_on_port.as_deref()),
        or_dash(period.sign_off_date.as_deref()),
        or_dash(period.sign_off_port.as_deref()),
    )
}

/// One line per section with its stored status.
pub(super) fn format_section_lines(payload: &SeaServicePayload) -> Vec<String> {
    payload
        .statuses()
        .iter()
        .map(|(key, &status)| {
            let definition = key.definition();
            let note = if is_applicable(key, payload.ship_type) {
                ""
            } else {
                "  (not applicable)"
            };
            format!(
                "  {} {:<28} {}{note}",
                status_marker(status),
                definition.title,
                status.label()
            )
        })
        .collect()
}

pub(super) fn format_summary(summary: &Summary) -> String {
    format!(
        "Progress: {}/{} sections completed ({}%), {} in progress, {} not started",
        summary.completed_sections,
        summary.total_sections,
        summary.percent_complete(),
        summary.in_progress_sections,
        summary.not_started_sections,
    )
}

/// History line: short id, dates, ship.
pub(super) fn format_record_line(record: &SeaServiceRecord) -> String {
    let dates = format!(
        "{} → {}",
        record.sign_on_date.as_deref().unwrap_or("?"),
        record.sign_off_date.as_deref().unwrap_or("?")
    );
    let ship = record.ship_name.as_deref().unwrap_or("(unnamed vessel)");
    let ship_type = record.payload.ship_type.map_or("", |t| t.code());
    format!("{}  {dates}  {ship}  {ship_type}", record.short_id())
        .trim_end()
        .to_string()
}
