//! Sea service records: a payload with identity and lifecycle.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use super::SeaServicePayload;

/// A persisted sea service record.
///
/// `ship_name`, `imo_number`, `sign_on_date`, and `sign_off_date` are listing
/// projections of the payload, recomputed by storage on every write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeaServiceRecord {
    pub id: Uuid,
    pub ship_name: Option<String>,
    pub imo_number: Option<String>,
    pub sign_on_date: Option<String>,
    pub sign_off_date: Option<String>,
    pub status: RecordStatus,
    pub payload: SeaServicePayload,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Where a record stands in its lifecycle.
///
/// A record starts as a draft and moves to final exactly once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum RecordStatus {
    /// Editable, in progress.
    Draft,

    /// Sealed for audit. Never mutated or deleted.
    Final {
        finalized_at: Timestamp,

        /// Hex SHA-256 of the payload at finalization.
        seal: String,
    },
}

impl SeaServiceRecord {
    pub fn is_draft(&self) -> bool {
        matches!(self.status, RecordStatus::Draft)
    }

    /// Stamps the record and payload as updated now and recomputes the
    /// listing projections.
    pub fn touch(&mut self) {
        let now = Timestamp::now();
        self.payload.last_updated_at = Some(now);
        self.updated_at = now;

        let projection = self.payload.projection();
        self.ship_name = projection.ship_name;
        self.imo_number = projection.imo_number;
        self.sign_on_date = projection.sign_on_date;
        self.sign_off_date = projection.sign_off_date;
    }

    /// First eight characters of the id, for display.
    pub fn short_id(&self) -> String {
        self.id.to_string()[..8].to_string()
    }

    /// Whether the payload still matches the seal taken at finalization.
    ///
    /// Returns `None` for drafts, which carry no seal.
    pub fn verify_seal(&self) -> Option<bool> {
        match &self.status {
            RecordStatus::Draft => None,
            RecordStatus::Final { seal: expected, .. } => {
                Some(seal(&self.payload).is_ok_and(|actual| &actual == expected))
            }
        }
    }
}

/// Computes the audit seal of a payload.
pub fn seal(payload: &SeaServicePayload) -> Result<String, serde_json::Error> {
    let bytes = serde_json::to_vec(payload)?;
    Ok(hex::encode(Sha256::digest(&bytes)))
}
