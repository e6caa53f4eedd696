//! Gates: boolean controls that switch groups of sibling fields on or off.
//!
//! Section data keeps two wire conventions for gates:
//!
//! ```text
//! "groupEnabled:TANK_CAPACITIES": false   // group toggle
//! "cargoPumpsFitted": false               // feature flag
//! ```
//!
//! Each section declares its known gates here as [`Gate`] values with an
//! explicit `enabled_by` field. Gate markers found in data that no section
//! declares are lifted into the same structure by [`gates_for`], so the status
//! engine never infers relationships from key names on its own.

use std::borrow::Cow;

use serde_json::{Map, Value};

use super::SectionKey;

/// Wire prefix of a group toggle key.
pub const GROUP_TOGGLE_PREFIX: &str = "groupEnabled:";

/// Wire suffix of a feature flag key.
const FLAG_SUFFIX: &str = "Fitted";

/// The field that controls a gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldRef {
    /// A group toggle, stored as `groupEnabled:<group>`.
    GroupToggle(Cow<'static, str>),

    /// A plain boolean field, e.g. `cargoPumpsFitted`.
    Flag(Cow<'static, str>),
}

impl FieldRef {
    /// The key this field is stored under in section data.
    pub fn wire_key(&self) -> Cow<'_, str> {
        match self {
            Self::GroupToggle(group) => Cow::Owned(format!("{GROUP_TOGGLE_PREFIX}{group}")),
            Self::Flag(field) => Cow::Borrowed(field),
        }
    }
}

/// A boolean control and the fields it governs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Gate {
    pub enabled_by: FieldRef,

    /// Field-name prefix of the governed fields.
    pub governs: Cow<'static, str>,
}

impl Gate {
    /// A feature flag gate.
    pub const fn flag(field: &'static str, governs: &'static str) -> Self {
        Self {
            enabled_by: FieldRef::Flag(Cow::Borrowed(field)),
            governs: Cow::Borrowed(governs),
        }
    }

    /// A group toggle gate. The group name is also the governed prefix.
    pub const fn group(group: &'static str) -> Self {
        Self {
            enabled_by: FieldRef::GroupToggle(Cow::Borrowed(group)),
            governs: Cow::Borrowed(group),
        }
    }

    /// The gate's controlling value in `data`, if it is a boolean.
    pub fn state(&self, data: &Map<String, Value>) -> Option<bool> {
        data.get(&*self.enabled_by.wire_key())
            .and_then(Value::as_bool)
    }

    /// Closed gates hold an explicit `false`. A missing gate is open.
    pub fn is_closed(&self, data: &Map<String, Value>) -> bool {
        self.state(data) == Some(false)
    }

    /// Whether `key` names a field this gate governs.
    ///
    /// The controlling field itself is never governed.
    pub fn governs_field(&self, key: &str) -> bool {
        key.starts_with(&*self.governs) && key != self.enabled_by.wire_key()
    }
}

/// Whether `key` is a group toggle marker rather than a data field.
pub fn is_gate_marker(key: &str) -> bool {
    key.starts_with(GROUP_TOGGLE_PREFIX)
}

static PROPULSION_GATES: [Gate; 2] = [
    Gate::flag("bowThrusterFitted", "bowThruster"),
    Gate::flag("sternThrusterFitted", "sternThruster"),
];

static AUXILIARY_GATES: [Gate; 2] = [
    Gate::flag("shaftGeneratorFitted", "shaftGenerator"),
    Gate::flag("emergencyGeneratorFitted", "emergencyGenerator"),
];

static DECK_GATES: [Gate; 2] = [Gate::flag("craneFitted", "crane"), Gate::group("MOORING")];

static CARGO_GATES: [Gate; 3] = [
    Gate::flag("cargoPumpsFitted", "cargoPump"),
    Gate::flag("strippingPumpFitted", "strippingPump"),
    Gate::group("TANK_CAPACITIES"),
];

static INERT_GAS_GATES: [Gate; 1] = [Gate::flag("igsFitted", "igs")];

/// Gates declared by a section's schema.
pub fn declared_gates(key: SectionKey) -> &'static [Gate] {
    match key {
        SectionKey::PropulsionPerformance => &PROPULSION_GATES,
        SectionKey::AuxiliaryMachinery => &AUXILIARY_GATES,
        SectionKey::DeckMachinery => &DECK_GATES,
        SectionKey::CargoCapabilities => &CARGO_GATES,
        SectionKey::InertGasSystem => &INERT_GAS_GATES,
        _ => &[],
    }
}

/// All gates in effect for a section's data: declared gates plus any
/// undeclared group toggles or boolean `*Fitted` flags present in `data`.
pub fn gates_for(key: SectionKey, data: &Map<String, Value>) -> Vec<Gate> {
    let mut gates = declared_gates(key).to_vec();

    for (field, value) in data {
        let lifted = if let Some(group) = field.strip_prefix(GROUP_TOGGLE_PREFIX) {
            Gate {
                enabled_by: FieldRef::GroupToggle(Cow::Owned(group.to_string())),
                governs: Cow::Owned(group.to_string()),
            }
        } else if let Some(stem) = field.strip_suffix(FLAG_SUFFIX)
            && value.is_boolean()
            && !stem.is_empty()
        {
            Gate {
                enabled_by: FieldRef::Flag(Cow::Owned(field.clone())),
                governs: Cow::Owned(stem.to_string()),
            }
        } else {
            continue;
        };

        if !gates.iter().any(|g| g.enabled_by == lifted.enabled_by) {
            gates.push(lifted);
        }
    }

    gates
}
