//! The content of a sea service record: ship type, service period, and
//! free-form data for every section.

use std::fmt;
use std::marker::PhantomData;
use std::ops::{Index, IndexMut};

use jiff::Timestamp;
use serde::de::{DeserializeOwned, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::schema::{SectionKey, SectionStatus, ShipType};

use super::{ServicePeriod, ServicePeriodPatch};

/// Free-form field data for one section.
pub type SectionData = Map<String, Value>;

/// One value per section, for every section.
///
/// Serialized as a JSON object keyed by section. Sections missing from the
/// input are filled with `T::default()`, so a value is never partially
/// populated.
#[derive(Debug, Clone, PartialEq)]
pub struct PerSection<T>([T; 11]);

impl<T> PerSection<T> {
    /// Iterates sections in display order.
    pub fn iter(&self) -> impl Iterator<Item = (SectionKey, &T)> {
        SectionKey::ALL.into_iter().zip(self.0.iter())
    }
}

impl<T: Default> Default for PerSection<T> {
    fn default() -> Self {
        Self(std::array::from_fn(|_| T::default()))
    }
}

impl<T> Index<SectionKey> for PerSection<T> {
    type Output = T;

    fn index(&self, key: SectionKey) -> &T {
        &self.0[key.index()]
    }
}

impl<T> IndexMut<SectionKey> for PerSection<T> {
    fn index_mut(&mut self, key: SectionKey) -> &mut T {
        &mut self.0[key.index()]
    }
}

impl<T: Serialize> Serialize for PerSection<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter())
    }
}

/// Unknown section keys are skipped and malformed entries fall back to
/// `T::default()`, so one bad section never stops a record from loading.
impl<'de, T> Deserialize<'de> for PerSection<T>
where
    T: DeserializeOwned + Default,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct PerSectionVisitor<T>(PhantomData<T>);

        impl<'de, T> Visitor<'de> for PerSectionVisitor<T>
        where
            T: DeserializeOwned + Default,
        {
            type Value = PerSection<T>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map keyed by section")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut values = PerSection::default();
                while let Some((key, value)) = access.next_entry::<String, Value>()? {
                    let Ok(section) = key.parse::<SectionKey>() else {
                        tracing::warn!(key = %key, "ignoring unknown section in stored payload");
                        continue;
                    };
                    values[section] = T::deserialize(value).unwrap_or_else(|e| {
                        tracing::warn!(%section, error = %e, "resetting malformed section entry");
                        T::default()
                    });
                }
                Ok(values)
            }
        }

        deserializer.deserialize_map(PerSectionVisitor(PhantomData))
    }
}

/// Everything the cadet has recorded about one period of sea service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "StoredPayload")]
pub struct SeaServicePayload {
    pub ship_type: Option<ShipType>,
    pub service_period: ServicePeriod,
    sections: PerSection<SectionData>,
    section_status: PerSection<SectionStatus>,
    pub last_updated_at: Option<Timestamp>,
}

/// Wire shape accepted when reading a payload back.
///
/// Every field is optional and the ship type is a raw code, so payloads
/// written by older builds still load.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredPayload {
    #[serde(default)]
    ship_type: Option<String>,
    #[serde(default)]
    service_period: ServicePeriod,
    #[serde(default)]
    sections: PerSection<SectionData>,
    #[serde(default)]
    section_status: PerSection<SectionStatus>,
    #[serde(default)]
    last_updated_at: Option<Timestamp>,
}

impl From<StoredPayload> for SeaServicePayload {
    fn from(stored: StoredPayload) -> Self {
        let ship_type = stored.ship_type.as_deref().and_then(|code| {
            let canonical = ShipType::canonicalize(code);
            if canonical.is_none() {
                tracing::warn!(code, "dropping unrecognized ship type from stored payload");
            }
            canonical
        });
        Self {
            ship_type,
            service_period: stored.service_period,
            sections: stored.sections,
            section_status: stored.section_status,
            last_updated_at: stored.last_updated_at,
        }
    }
}

/// Denormalized listing columns derived from a payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Projection {
    pub ship_name: Option<String>,
    pub imo_number: Option<String>,
    pub sign_on_date: Option<String>,
    pub sign_off_date: Option<String>,
}

impl SeaServicePayload {
    /// A fresh payload for a newly started record.
    pub fn new(ship_type: Option<ShipType>, sign_on_date: &str, sign_on_port: &str) -> Self {
        let mut payload = Self {
            ship_type,
            ..Self::default()
        };
        payload.service_period.merge(ServicePeriodPatch {
            sign_on_date: Some(sign_on_date.to_string()),
            sign_on_port: Some(sign_on_port.to_string()),
            ..ServicePeriodPatch::default()
        });
        payload
    }

    pub fn sections(&self) -> &PerSection<SectionData> {
        &self.sections
    }

    pub fn section(&self, key: SectionKey) -> &SectionData {
        &self.sections[key]
    }

    #[cfg(test)]
    pub(crate) fn section_mut(&mut self, key: SectionKey) -> &mut SectionData {
        &mut self.sections[key]
    }

    pub fn statuses(&self) -> &PerSection<SectionStatus> {
        &self.section_status
    }

    pub fn status(&self, key: SectionKey) -> SectionStatus {
        self.section_status[key]
    }

    pub fn set_status(&mut self, key: SectionKey, status: SectionStatus) {
        self.section_status[key] = status;
    }

    /// Shallow-merges `patch` into a section's data. Patch values replace
    /// existing ones, `null` included.
    pub fn merge_section(&mut self, key: SectionKey, patch: SectionData) {
        self.sections[key].extend(patch);
    }

    /// The listing columns for this payload.
    pub fn projection(&self) -> Projection {
        let identity = self.section(SectionKey::VesselIdentity);
        Projection {
            ship_name: text_field(identity, "shipName"),
            imo_number: text_field(identity, "imoNumber"),
            sign_on_date: self.service_period.sign_on_date.clone(),
            sign_off_date: self.service_period.sign_off_date.clone(),
        }
    }
}

fn non_blank(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Reads a field as display text. IMO numbers are often entered as numbers.
fn text_field(data: &SectionData, field: &str) -> Option<String> {
    match data.get(field)? {
        Value::String(s) => non_blank(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Collects section entries into `SectionData`.
pub fn section_data<I, K>(entries: I) -> SectionData
where
    I: IntoIterator<Item = (K, Value)>,
    K: Into<String>,
{
    entries.into_iter().map(|(k, v)| (k.into(), v)).collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::status;

    #[test]
    fn default_payload_has_every_section() {
        let payload = SeaServicePayload::default();
        assert_eq!(payload.sections().iter().count(), 11);
        for key in SectionKey::ALL {
            assert!(payload.section(key).is_empty());
            assert_eq!(payload.status(key), SectionStatus::NotStarted);
        }
    }

    #[test]
    fn serializes_camel_case_with_every_section() {
        let payload = SeaServicePayload::new(Some(ShipType::BulkCarrier), "2025-01-10", "Santos");
        let value = serde_json::to_value(&payload).unwrap();

        assert_eq!(value["shipType"], "BULK_CARRIER");
        assert_eq!(value["servicePeriod"]["signOnPort"], "Santos");
        assert_eq!(value["sections"].as_object().unwrap().len(), 11);
        assert_eq!(value["sectionStatus"]["INERT_GAS_SYSTEM"], "NOT_STARTED");
    }

    #[test]
    fn partial_payload_is_filled_on_load() {
        let payload: SeaServicePayload = serde_json::from_value(json!({
            "shipType": "oil-tanker",
            "sections": { "VESSEL_IDENTITY": { "shipName": "Nordic Star" } },
            "sectionStatus": { "VESSEL_IDENTITY": "COMPLETED" },
        }))
        .unwrap();

        assert_eq!(payload.ship_type, Some(ShipType::OilTanker));
        assert_eq!(
            payload.section(SectionKey::VesselIdentity)["shipName"],
            "Nordic Star"
        );
        assert!(payload.section(SectionKey::InertGasSystem).is_empty());
        assert_eq!(
            payload.status(SectionKey::VesselIdentity),
            SectionStatus::Completed
        );
        assert_eq!(
            payload.status(SectionKey::CargoCapabilities),
            SectionStatus::NotStarted
        );
    }

    #[test]
    fn malformed_sections_degrade_on_load() {
        let payload: SeaServicePayload = serde_json::from_value(json!({
            "sections": {
                "VESSEL_IDENTITY": { "shipName": "Nordic Star" },
                "BRIDGE_WING_LAYOUT": { "wings": 2 },
                "POLLUTION_PREVENTION": "see attached",
            },
            "sectionStatus": {
                "VESSEL_IDENTITY": "COMPLETED",
                "BRIDGE_WING_LAYOUT": "COMPLETED",
                "DECK_MACHINERY": "ALMOST_DONE",
            },
        }))
        .unwrap();

        assert_eq!(
            payload.section(SectionKey::VesselIdentity)["shipName"],
            "Nordic Star"
        );
        let pollution = payload.section(SectionKey::PollutionPrevention);
        assert!(pollution.is_empty());
        assert_eq!(
            status::derive_section(SectionKey::PollutionPrevention, pollution, None),
            SectionStatus::NotStarted
        );
        assert_eq!(
            payload.status(SectionKey::VesselIdentity),
            SectionStatus::Completed
        );
        assert_eq!(
            payload.status(SectionKey::DeckMachinery),
            SectionStatus::NotStarted
        );
    }

    #[test]
    fn new_payload_stores_iso_sign_on_date() {
        let payload = SeaServicePayload::new(None, " 20240301 ", " Santos ");
        assert_eq!(
            payload.service_period.sign_on_date.as_deref(),
            Some("2024-03-01")
        );
        assert_eq!(payload.service_period.sign_on_port.as_deref(), Some("Santos"));
        assert_eq!(payload.projection().sign_on_date.as_deref(), Some("2024-03-01"));
    }

    #[test]
    fn unknown_ship_type_is_dropped_on_load() {
        let payload: SeaServicePayload =
            serde_json::from_value(json!({ "shipType": "HOVERCRAFT" })).unwrap();
        assert_eq!(payload.ship_type, None);
    }

    #[test]
    fn merge_section_is_shallow() {
        let mut payload = SeaServicePayload::default();
        payload.merge_section(
            SectionKey::DeckMachinery,
            section_data([("windlassType", json!("electric")), ("craneFitted", json!(true))]),
        );
        payload.merge_section(
            SectionKey::DeckMachinery,
            section_data([("craneFitted", json!(false)), ("winchCount", json!(4))]),
        );

        let deck = payload.section(SectionKey::DeckMachinery);
        assert_eq!(deck.len(), 3);
        assert_eq!(deck["windlassType"], "electric");
        assert_eq!(deck["craneFitted"], false);
        assert_eq!(deck["winchCount"], 4);
    }

    #[test]
    fn projection_reads_identity_and_period() {
        let mut payload = SeaServicePayload::new(None, "2025-01-10", "Santos");
        payload.merge_section(
            SectionKey::VesselIdentity,
            section_data([("shipName", json!(" Nordic Star ")), ("imoNumber", json!(9_321_483))]),
        );

        let projection = payload.projection();
        assert_eq!(projection.ship_name.as_deref(), Some("Nordic Star"));
        assert_eq!(projection.imo_number.as_deref(), Some("9321483"));
        assert_eq!(projection.sign_on_date.as_deref(), Some("2025-01-10"));
        assert_eq!(projection.sign_off_date, None);
    }
}
