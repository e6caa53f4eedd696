//! Progress summary and finalization eligibility.

use std::fmt;

use serde::Serialize;

use crate::model::{PerSection, SeaServicePayload, SectionData};
use crate::schema::{SECTIONS, SectionKey, SectionStatus, ShipType, is_applicable};
use crate::status;

/// Section tally for a whole record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total_sections: usize,
    pub completed_sections: usize,
    pub in_progress_sections: usize,
    pub not_started_sections: usize,
}

impl Summary {
    /// Whole-number share of completed sections.
    pub fn percent_complete(&self) -> usize {
        if self.total_sections == 0 {
            return 0;
        }
        self.completed_sections * 100 / self.total_sections
    }
}

/// Derives every section's status and tallies them.
pub fn summarize(sections: &PerSection<SectionData>, ship_type: Option<ShipType>) -> Summary {
    let mut summary = Summary::default();
    for definition in &SECTIONS {
        summary.total_sections += 1;
        match status::derive_section(definition.key, &sections[definition.key], ship_type) {
            SectionStatus::Completed => summary.completed_sections += 1,
            SectionStatus::InProgress => summary.in_progress_sections += 1,
            SectionStatus::NotStarted => summary.not_started_sections += 1,
        }
    }
    summary
}

/// Something standing between a draft and finalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Blocker {
    /// Sign-on/sign-off dates or ports are missing or invalid.
    ServicePeriodIncomplete,

    /// A required, applicable section is not completed.
    SectionIncomplete {
        key: SectionKey,
        status: SectionStatus,
    },
}

impl fmt::Display for Blocker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ServicePeriodIncomplete => f.write_str(
                "service period incomplete: sign-on and sign-off dates and ports are required",
            ),
            Self::SectionIncomplete { key, status } => {
                write!(f, "{} is {}", key.definition().title, status.label())
            }
        }
    }
}

/// Blockers as an indented bullet list, one per line.
pub fn format_blockers(blockers: &[Blocker]) -> String {
    blockers
        .iter()
        .map(|b| format!("  - {b}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Everything that currently prevents finalization, service period first.
///
/// Sections that don't apply to `ship_type` never block.
pub fn finalization_blockers(
    payload: &SeaServicePayload,
    ship_type: Option<ShipType>,
) -> Vec<Blocker> {
    let mut blockers = Vec::new();
    if !payload.service_period.is_complete() {
        blockers.push(Blocker::ServicePeriodIncomplete);
    }

    for definition in &SECTIONS {
        if !definition.finalize_required || !is_applicable(definition.key, ship_type) {
            continue;
        }
        let status =
            status::derive_section(definition.key, payload.section(definition.key), ship_type);
        if status != SectionStatus::Completed {
            blockers.push(Blocker::SectionIncomplete {
                key: definition.key,
                status,
            });
        }
    }

    blockers
}

/// Whether the record may move from draft to final.
pub fn can_finalize(payload: &SeaServicePayload, ship_type: Option<ShipType>) -> bool {
    finalization_blockers(payload, ship_type).is_empty()
}
