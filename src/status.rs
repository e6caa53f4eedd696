//! Section status engine.
//!
//! Derives a [`SectionStatus`] from a section's raw data. Pure and
//! deterministic: the same inputs always give the same status, and malformed
//! data degrades to `NotStarted` instead of failing.
//!
//! Most sections use the default rule:
//!
//! 1. No answered field at all → `NotStarted`.
//! 2. Relevant fields are the non-boolean, non-marker fields not governed by a
//!    closed gate.
//! 3. No relevant fields, or every relevant field answered → `Completed`.
//! 4. Otherwise → `InProgress`.
//!
//! Safety appliances, pollution prevention, the inert gas system, and cargo
//! capabilities have their own rules in [`rules`].

mod rules;

use serde_json::Value;

use crate::model::SectionData;
use crate::schema::{SectionKey, SectionStatus, ShipType, gates_for, is_gate_marker};

/// Derives a section's status from arbitrary JSON.
///
/// Anything other than an object yields `NotStarted`.
pub fn derive(key: SectionKey, data: &Value, ship_type: Option<ShipType>) -> SectionStatus {
    match data {
        Value::Object(map) => derive_section(key, map, ship_type),
        _ => SectionStatus::NotStarted,
    }
}

/// Derives a section's status from its field map.
pub fn derive_section(
    key: SectionKey,
    data: &SectionData,
    ship_type: Option<ShipType>,
) -> SectionStatus {
    match key {
        SectionKey::LifeSavingAppliances => {
            rules::primary_equipment(data, rules::LIFE_SAVING_PRIMARY)
        }
        SectionKey::FireFightingAppliances => {
            rules::primary_equipment(data, rules::FIRE_FIGHTING_PRIMARY)
        }
        SectionKey::PollutionPrevention => rules::any_data(data),
        SectionKey::InertGasSystem => rules::inert_gas(data, ship_type),
        SectionKey::CargoCapabilities => rules::cargo_capabilities(data),
        _ => default_rule(key, data),
    }
}

/// Whether a value counts as an answer.
///
/// Booleans are always answers: `false` is as valid as `true`.
pub fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(_) | Value::Number(_) => true,
        Value::String(s) => !s.trim().is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// Whether any field in the section holds an answer.
pub fn has_any_value(data: &SectionData) -> bool {
    data.values().any(is_present)
}

fn default_rule(key: SectionKey, data: &SectionData) -> SectionStatus {
    if !has_any_value(data) {
        return SectionStatus::NotStarted;
    }

    let gates = gates_for(key, data);
    let closed: Vec<_> = gates.iter().filter(|g| g.is_closed(data)).collect();

    let all_answered = data
        .iter()
        .filter(|(field, value)| {
            !value.is_boolean()
                && !is_gate_marker(field)
                && !closed.iter().any(|g| g.governs_field(field))
        })
        .all(|(_, value)| is_present(value));

    if all_answered {
        SectionStatus::Completed
    } else {
        SectionStatus::InProgress
    }
}
