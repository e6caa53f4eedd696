//! Section vocabulary: the fixed technical sections of a sea service record.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A technical section of the sea service record.
///
/// Declaration order drives display and ordering in storage.
/// Append new sections at the end; never reorder or remove.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SectionKey {
    VesselIdentity,
    DimensionsTonnage,
    PropulsionPerformance,
    AuxiliaryMachinery,
    DeckMachinery,
    CargoCapabilities,
    NavigationCommunication,
    LifeSavingAppliances,
    FireFightingAppliances,
    PollutionPrevention,
    InertGasSystem,
}

impl SectionKey {
    /// Every section, in display order.
    pub const ALL: [Self; 11] = [
        Self::VesselIdentity,
        Self::DimensionsTonnage,
        Self::PropulsionPerformance,
        Self::AuxiliaryMachinery,
        Self::DeckMachinery,
        Self::CargoCapabilities,
        Self::NavigationCommunication,
        Self::LifeSavingAppliances,
        Self::FireFightingAppliances,
        Self::PollutionPrevention,
        Self::InertGasSystem,
    ];

    /// The serialized key, e.g. `"CARGO_CAPABILITIES"`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::VesselIdentity => "VESSEL_IDENTITY",
            Self::DimensionsTonnage => "DIMENSIONS_TONNAGE",
            Self::PropulsionPerformance => "PROPULSION_PERFORMANCE",
            Self::AuxiliaryMachinery => "AUXILIARY_MACHINERY",
            Self::DeckMachinery => "DECK_MACHINERY",
            Self::CargoCapabilities => "CARGO_CAPABILITIES",
            Self::NavigationCommunication => "NAVIGATION_COMMUNICATION",
            Self::LifeSavingAppliances => "LIFE_SAVING_APPLIANCES",
            Self::FireFightingAppliances => "FIRE_FIGHTING_APPLIANCES",
            Self::PollutionPrevention => "POLLUTION_PREVENTION",
            Self::InertGasSystem => "INERT_GAS_SYSTEM",
        }
    }

    /// Position in display order.
    pub fn index(self) -> usize {
        self as usize
    }

    /// The static definition for this section.
    pub fn definition(self) -> &'static SectionDefinition {
        // SECTIONS is declared in the same order as the enum.
        &SECTIONS[self.index()]
    }
}

impl fmt::Display for SectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a section key can't be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown section: {0}")]
pub struct UnknownSection(pub String);

impl FromStr for SectionKey {
    type Err = UnknownSection;

    /// Accepts the serialized key case-insensitively, with `-` or spaces for `_`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .map(|c| match c {
                '-' | ' ' => '_',
                c => c.to_ascii_uppercase(),
            })
            .collect();
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == normalized)
            .ok_or_else(|| UnknownSection(s.to_string()))
    }
}

/// Derived completion state of a section.
///
/// Ordered by progress: `NotStarted < InProgress < Completed`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SectionStatus {
    #[default]
    NotStarted,
    InProgress,
    Completed,
}

impl SectionStatus {
    /// Short lowercase label for display.
    pub fn label(self) -> &'static str {
        match self {
            Self::NotStarted => "not started",
            Self::InProgress => "in progress",
            Self::Completed => "completed",
        }
    }
}

/// Static metadata about a section.
#[derive(Debug)]
pub struct SectionDefinition {
    pub key: SectionKey,
    pub title: &'static str,
    pub description: &'static str,

    /// Whether the section must be completed before a record can be finalized.
    pub finalize_required: bool,
}

/// All section definitions, in `SectionKey` order.
pub static SECTIONS: [SectionDefinition; 11] = [
    SectionDefinition {
        key: SectionKey::VesselIdentity,
        title: "Vessel Identity",
        description: "Name, IMO number, flag, port of registry, call sign, owner.",
        finalize_required: true,
    },
    SectionDefinition {
        key: SectionKey::DimensionsTonnage,
        title: "Dimensions & Tonnage",
        description: "Length, breadth, depth, draught, gross and net tonnage, deadweight.",
        finalize_required: true,
    },
    SectionDefinition {
        key: SectionKey::PropulsionPerformance,
        title: "Propulsion & Performance",
        description: "Main engine, propeller, service speed, fuel consumption, thrusters.",
        finalize_required: true,
    },
    SectionDefinition {
        key: SectionKey::AuxiliaryMachinery,
        title: "Auxiliary Machinery & Power",
        description: "Generators, boilers, purifiers, emergency power.",
        finalize_required: true,
    },
    SectionDefinition {
        key: SectionKey::DeckMachinery,
        title: "Deck Machinery & Mooring",
        description: "Windlass, winches, cranes, mooring arrangement.",
        finalize_required: true,
    },
    SectionDefinition {
        key: SectionKey::CargoCapabilities,
        title: "Cargo Capabilities",
        description: "Cargo spaces, tank capacities, cargo and stripping pumps.",
        finalize_required: true,
    },
    SectionDefinition {
        key: SectionKey::NavigationCommunication,
        title: "Navigation & Communication",
        description: "Radar, ECDIS, GMDSS, AIS, VDR and other bridge equipment.",
        finalize_required: true,
    },
    SectionDefinition {
        key: SectionKey::LifeSavingAppliances,
        title: "Life-Saving Appliances",
        description: "Lifeboats, liferafts, rescue boat, personal life-saving appliances.",
        finalize_required: true,
    },
    SectionDefinition {
        key: SectionKey::FireFightingAppliances,
        title: "Fire-Fighting Appliances",
        description: "Fire main, fixed systems, portable extinguishers, fireman's outfits.",
        finalize_required: true,
    },
    SectionDefinition {
        key: SectionKey::PollutionPrevention,
        title: "Pollution Prevention",
        description: "MARPOL equipment: oily water separator, sewage, garbage, ballast water.",
        finalize_required: true,
    },
    SectionDefinition {
        key: SectionKey::InertGasSystem,
        title: "Inert Gas System",
        description: "Inert gas source, scrubber, blowers, deck seal, oxygen analysers.",
        finalize_required: true,
    },
];
