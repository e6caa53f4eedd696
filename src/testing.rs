//! Shared fixtures for unit tests.

use serde_json::json;

use crate::model::{SeaServicePayload, SectionData, section_data};
use crate::schema::{SectionKey, ShipType};
use crate::status;

/// Data that completes `key` on a tanker or a non-tanker alike.
pub fn completed_section(key: SectionKey) -> SectionData {
    match key {
        SectionKey::VesselIdentity => section_data([
            ("shipName", json!("Nordic Star")),
            ("imoNumber", json!("9321483")),
            ("flag", json!("Norway")),
        ]),
        SectionKey::LifeSavingAppliances => {
            section_data([("lifeboatsAvailable", json!(true)), ("lifeboatCount", json!(2))])
        }
        SectionKey::FireFightingAppliances => section_data([("fireMainAvailable", json!(true))]),
        SectionKey::PollutionPrevention => section_data([("owsMake", json!("Alfa Laval"))]),
        SectionKey::CargoCapabilities => section_data([
            ("cargoPumpsFitted", json!(true)),
            ("cargoPumpDeepwell", json!(true)),
            ("cargoPumpCapacity", json!("3000 m3/h")),
        ]),
        SectionKey::InertGasSystem => section_data([
            ("igsFitted", json!(true)),
            ("igsSourceType", json!("flue gas")),
            ("igsScrubberFitted", json!(true)),
            ("igsBlowerAvailable", json!(true)),
            ("igsBlowerCount", json!(2)),
            ("igsDeckSealAvailable", json!(false)),
            ("igsOxygenAnalyserFitted", json!(true)),
        ]),
        _ => section_data([("notes", json!("Recorded on board"))]),
    }
}

/// A payload that can be finalized for `ship_type`.
pub fn complete_payload(ship_type: ShipType) -> SeaServicePayload {
    let mut payload = SeaServicePayload::new(Some(ship_type), "2025-03-01", "Rotterdam");
    payload.service_period.sign_off_date = Some("2025-09-15".into());
    payload.service_period.sign_off_port = Some("Singapore".into());
    for key in SectionKey::ALL {
        payload.merge_section(key, completed_section(key));
        let derived = status::derive_section(key, payload.section(key), Some(ship_type));
        payload.set_status(key, derived);
    }
    payload
}
