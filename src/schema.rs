//! Domain schema: the static vocabulary of a sea service record.
//!
//! Sections, ship types, which sections apply to which ships, and the gates
//! each section declares. Pure data, no behavior beyond lookup.

mod gate;
mod section;
mod ship_type;

pub use gate::{FieldRef, Gate, declared_gates, gates_for, is_gate_marker};
pub use section::{SECTIONS, SectionDefinition, SectionKey, SectionStatus, UnknownSection};
pub use ship_type::{
    ShipType, UnknownShipType, applicability_for_code, applicable_sections, is_applicable,
};
