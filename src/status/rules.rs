//! Section-specific status rules.

use serde_json::Value;

use crate::model::SectionData;
use crate::schema::{SectionKey, SectionStatus, ShipType};

use super::{default_rule, has_any_value, is_present};

/// Any one of these available completes the life-saving appliances section.
pub(super) const LIFE_SAVING_PRIMARY: &[&str] = &[
    "lifeboatsAvailable",
    "liferaftsAvailable",
    "rescueBoatAvailable",
];

/// Any one of these available completes the fire-fighting appliances section.
pub(super) const FIRE_FIGHTING_PRIMARY: &[&str] = &[
    "fireMainAvailable",
    "fixedFireSystemAvailable",
    "portableExtinguishersAvailable",
];

const IGS_FITTED: &str = "igsFitted";
const IGS_NOT_FITTED_REASON: &str = "igsNotFittedReason";

/// Fields required whenever an inert gas system is fitted.
const IGS_CORE: &[&str] = &[
    "igsSourceType",
    "igsScrubberFitted",
    "igsBlowerAvailable",
    "igsDeckSealAvailable",
    "igsOxygenAnalyserFitted",
];

/// (condition flag, field required when the flag is `true`)
const IGS_CONDITIONAL: &[(&str, &str)] = &[
    ("igsBlowerAvailable", "igsBlowerCount"),
    ("igsDeckSealAvailable", "igsDeckSealType"),
];

/// (feature gate, sub-type flags of which one must be `true` when it is fitted)
const CARGO_SUBTYPE_GATES: &[(&str, &[&str])] = &[
    (
        "strippingPumpFitted",
        &[
            "strippingPumpEductor",
            "strippingPumpReciprocating",
            "strippingPumpScrew",
            "strippingPumpCentrifugal",
        ],
    ),
    (
        "cargoPumpsFitted",
        &[
            "cargoPumpCentrifugal",
            "cargoPumpScrew",
            "cargoPumpDeepwell",
            "cargoPumpSubmerged",
        ],
    ),
];

fn is_true(data: &SectionData, field: &str) -> bool {
    data.get(field) == Some(&Value::Bool(true))
}

fn is_answered(data: &SectionData, field: &str) -> bool {
    data.get(field).is_some_and(is_present)
}

/// Completed once any primary piece of equipment is marked available.
pub(super) fn primary_equipment(data: &SectionData, primary: &[&str]) -> SectionStatus {
    if !has_any_value(data) {
        SectionStatus::NotStarted
    } else if primary.iter().any(|field| is_true(data, field)) {
        SectionStatus::Completed
    } else {
        SectionStatus::InProgress
    }
}

/// Completed as soon as anything is recorded. Field checks happen when the
/// section is edited, not here.
pub(super) fn any_data(data: &SectionData) -> SectionStatus {
    if has_any_value(data) {
        SectionStatus::Completed
    } else {
        SectionStatus::NotStarted
    }
}

pub(super) fn inert_gas(data: &SectionData, ship_type: Option<ShipType>) -> SectionStatus {
    if !has_any_value(data) {
        return SectionStatus::NotStarted;
    }

    let tanker = ship_type.is_some_and(ShipType::is_tanker);
    match data.get(IGS_FITTED).and_then(Value::as_bool) {
        Some(false) if !tanker && is_answered(data, IGS_NOT_FITTED_REASON) => {
            SectionStatus::Completed
        }
        Some(true) => {
            let core = IGS_CORE.iter().all(|field| is_answered(data, field));
            let conditional = IGS_CONDITIONAL
                .iter()
                .filter(|(flag, _)| is_true(data, flag))
                .all(|(_, field)| is_answered(data, field));
            if core && conditional {
                SectionStatus::Completed
            } else {
                SectionStatus::InProgress
            }
        }
        _ => SectionStatus::InProgress,
    }
}

/// Never `NotStarted`: the section is driven by its gates from the moment it
/// is opened.
pub(super) fn cargo_capabilities(data: &SectionData) -> SectionStatus {
    for (gate, subtypes) in CARGO_SUBTYPE_GATES {
        if is_true(data, gate) && !subtypes.iter().any(|s| is_true(data, s)) {
            return SectionStatus::InProgress;
        }
    }

    match default_rule(SectionKey::CargoCapabilities, data) {
        SectionStatus::NotStarted => SectionStatus::InProgress,
        status => status,
    }
}
