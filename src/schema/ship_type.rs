//! Ship types and section applicability.
//!
//! Ship type codes arrive in many spellings ("oil-tanker", "Oil Tanker",
//! "TANKER"). [`ShipType::canonicalize`] is the only place that interprets
//! them; everything downstream works with the canonical enum.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::SectionKey;

/// Canonical vessel type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", try_from = "String")]
pub enum ShipType {
    OilTanker,
    ChemicalTanker,
    ProductTanker,
    LpgCarrier,
    LngCarrier,
    BulkCarrier,
    ContainerShip,
    GeneralCargo,
    Roro,
    Passenger,
    OffshoreSupport,
    Tug,
}

/// Normalized spelling → canonical type. Exact lookup only.
const SYNONYMS: &[(&str, ShipType)] = &[
    ("OIL_TANKER", ShipType::OilTanker),
    ("TANKER", ShipType::OilTanker),
    ("CRUDE_TANKER", ShipType::OilTanker),
    ("CRUDE_OIL_TANKER", ShipType::OilTanker),
    ("CHEMICAL_TANKER", ShipType::ChemicalTanker),
    ("OIL_CHEMICAL_TANKER", ShipType::ChemicalTanker),
    ("PRODUCT_TANKER", ShipType::ProductTanker),
    ("PRODUCTS_TANKER", ShipType::ProductTanker),
    ("LPG_CARRIER", ShipType::LpgCarrier),
    ("LPG", ShipType::LpgCarrier),
    ("LNG_CARRIER", ShipType::LngCarrier),
    ("LNG", ShipType::LngCarrier),
    ("BULK_CARRIER", ShipType::BulkCarrier),
    ("BULKER", ShipType::BulkCarrier),
    ("CONTAINER_SHIP", ShipType::ContainerShip),
    ("CONTAINER", ShipType::ContainerShip),
    ("GENERAL_CARGO", ShipType::GeneralCargo),
    ("RORO", ShipType::Roro),
    ("RO_RO", ShipType::Roro),
    ("PASSENGER", ShipType::Passenger),
    ("CRUISE", ShipType::Passenger),
    ("OFFSHORE_SUPPORT", ShipType::OffshoreSupport),
    ("OFFSHORE", ShipType::OffshoreSupport),
    ("TUG", ShipType::Tug),
];

impl ShipType {
    /// Every ship type, in display order.
    pub const ALL: [Self; 12] = [
        Self::OilTanker,
        Self::ChemicalTanker,
        Self::ProductTanker,
        Self::LpgCarrier,
        Self::LngCarrier,
        Self::BulkCarrier,
        Self::ContainerShip,
        Self::GeneralCargo,
        Self::Roro,
        Self::Passenger,
        Self::OffshoreSupport,
        Self::Tug,
    ];

    /// Resolves a user- or storage-supplied code to a canonical ship type.
    ///
    /// Trims, uppercases, and maps `-` and whitespace to `_` before an exact
    /// table lookup. Returns `None` for unrecognized codes.
    pub fn canonicalize(code: &str) -> Option<Self> {
        let normalized = normalize_code(code);
        SYNONYMS
            .iter()
            .find(|(name, _)| *name == normalized)
            .map(|(_, ship_type)| *ship_type)
    }

    /// The canonical code, e.g. `"GENERAL_CARGO"`.
    pub fn code(self) -> &'static str {
        match self {
            Self::OilTanker => "OIL_TANKER",
            Self::ChemicalTanker => "CHEMICAL_TANKER",
            Self::ProductTanker => "PRODUCT_TANKER",
            Self::LpgCarrier => "LPG_CARRIER",
            Self::LngCarrier => "LNG_CARRIER",
            Self::BulkCarrier => "BULK_CARRIER",
            Self::ContainerShip => "CONTAINER_SHIP",
            Self::GeneralCargo => "GENERAL_CARGO",
            Self::Roro => "RORO",
            Self::Passenger => "PASSENGER",
            Self::OffshoreSupport => "OFFSHORE_SUPPORT",
            Self::Tug => "TUG",
        }
    }

    /// Whether the vessel carries liquid or gas cargo in bulk.
    pub fn is_tanker(self) -> bool {
        matches!(
            self,
            Self::OilTanker
                | Self::ChemicalTanker
                | Self::ProductTanker
                | Self::LpgCarrier
                | Self::LngCarrier
        )
    }
}

impl fmt::Display for ShipType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Error returned for a ship type code with no canonical match.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown ship type: {0}")]
pub struct UnknownShipType(pub String);

impl TryFrom<String> for ShipType {
    type Error = UnknownShipType;

    fn try_from(code: String) -> Result<Self, Self::Error> {
        Self::canonicalize(&code).ok_or(UnknownShipType(code))
    }
}

fn normalize_code(code: &str) -> String {
    code.trim()
        .chars()
        .map(|c| {
            if c == '-' || c.is_whitespace() {
                '_'
            } else {
                c.to_ascii_uppercase()
            }
        })
        .collect()
}

/// Whether a section applies to a vessel of the given type.
///
/// Only the inert gas system is conditional: it applies to tankers. An unset
/// ship type is treated like a non-tanker.
pub fn is_applicable(key: SectionKey, ship_type: Option<ShipType>) -> bool {
    match key {
        SectionKey::InertGasSystem => ship_type.is_some_and(ShipType::is_tanker),
        _ => true,
    }
}

/// The set of sections that apply to a vessel of the given type.
pub fn applicable_sections(ship_type: Option<ShipType>) -> BTreeSet<SectionKey> {
    SectionKey::ALL
        .into_iter()
        .filter(|key| is_applicable(*key, ship_type))
        .collect()
}

/// Applicability for a raw ship type code.
///
/// Unrecognized codes fall back to every section except the inert gas system.
pub fn applicability_for_code(code: &str) -> BTreeSet<SectionKey> {
    applicable_sections(ShipType::canonicalize(code))
}
