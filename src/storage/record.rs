//! Record storage: create, load, update, finalize, and discard records.

use jiff::Timestamp;
use rusqlite::{ErrorCode, OptionalExtension, Row};
use uuid::Uuid;

use crate::model::{self, RecordStatus, SeaServicePayload, SeaServiceRecord};
use crate::schema::ShipType;

use super::{RecordStore, Result, Storage, StorageError};

const SELECT_RECORD: &str = "SELECT id, ship_name, imo_number, sign_on_date, sign_off_date,
            status, finalized_at, seal, payload, created_at, updated_at
     FROM sea_service";

impl RecordStore for Storage {
    fn create(
        &self,
        ship_type: Option<ShipType>,
        sign_on_date: &str,
        sign_on_port: &str,
    ) -> Result<SeaServiceRecord> {
        let payload = SeaServicePayload::new(ship_type, sign_on_date, sign_on_port);
        let projection = payload.projection();
        let now = Timestamp::now();
        let record = SeaServiceRecord {
            id: Uuid::new_v4(),
            ship_name: projection.ship_name,
            imo_number: projection.imo_number,
            sign_on_date: projection.sign_on_date,
            sign_off_date: projection.sign_off_date,
            status: RecordStatus::Draft,
            payload,
            created_at: now,
            updated_at: now,
        };

        let inserted = self.conn.execute(
            "INSERT INTO sea_service (id, ship_name, imo_number, sign_on_date, sign_off_date,
                                      status, payload, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, 'draft', ?6, ?7, ?8)",
            rusqlite::params![
                record.id.to_string(),
                record.ship_name,
                record.imo_number,
                record.sign_on_date,
                record.sign_off_date,
                serde_json::to_string(&record.payload)?,
                now.to_string(),
                now.to_string(),
            ],
        );
        match inserted {
            Ok(_) => {}
            Err(rusqlite::Error::SqliteFailure(e, _)) if e.code == ErrorCode::ConstraintViolation => {
                return Err(StorageError::DraftAlreadyExists);
            }
            Err(e) => return Err(e.into()),
        }

        tracing::debug!(id = %record.id, "created draft record");
        Ok(record)
    }

    fn active_draft(&self) -> Result<Option<SeaServiceRecord>> {
        let row = self
            .conn
            .query_row(
                &format!("{SELECT_RECORD} WHERE status = 'draft' LIMIT 1"),
                [],
                RecordRow::read,
            )
            .optional()?;
        row.map(RecordRow::into_record).transpose()
    }

    fn final_history(&self) -> Result<Vec<SeaServiceRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "{SELECT_RECORD} WHERE status = 'final'
             ORDER BY sign_on_date DESC, created_at DESC"
        ))?;
        let rows = stmt.query_map([], RecordRow::read)?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?.into_record()?);
        }
        Ok(records)
    }

    fn get(&self, id: Uuid) -> Result<Option<SeaServiceRecord>> {
        let row = self
            .conn
            .query_row(
                &format!("{SELECT_RECORD} WHERE id = ?1"),
                [id.to_string()],
                RecordRow::read,
            )
            .optional()?;
        row.map(RecordRow::into_record).transpose()
    }

    fn upsert_draft(&self, id: Uuid, payload: &SeaServicePayload) -> Result<()> {
        let projection = payload.projection();
        let rows = self.conn.execute(
            "UPDATE sea_service
             SET ship_name = ?1, imo_number = ?2, sign_on_date = ?3, sign_off_date = ?4,
                 payload = ?5, updated_at = ?6
             WHERE id = ?7 AND status = 'draft'",
            rusqlite::params![
                projection.ship_name,
                projection.imo_number,
                projection.sign_on_date,
                projection.sign_off_date,
                serde_json::to_string(payload)?,
                Timestamp::now().to_string(),
                id.to_string(),
            ],
        )?;
        tracing::debug!(%id, rows, "saved draft payload");
        Ok(())
    }

    fn finalize(&self, id: Uuid) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;

        let stored: Option<String> = tx
            .query_row(
                "SELECT payload FROM sea_service WHERE id = ?1 AND status = 'draft'",
                [id.to_string()],
                |row| row.get(0),
            )
            .optional()?;
        let Some(stored) = stored else {
            tracing::debug!(%id, "finalize skipped: not a draft");
            return Ok(());
        };

        let payload: SeaServicePayload = serde_json::from_str(&stored)?;
        let seal = model::seal(&payload)?;
        let now = Timestamp::now().to_string();
        tx.execute(
            "UPDATE sea_service
             SET status = 'final', finalized_at = ?1, seal = ?2, updated_at = ?1
             WHERE id = ?3 AND status = 'draft'",
            rusqlite::params![now, seal, id.to_string()],
        )?;
        tx.commit()?;

        tracing::debug!(%id, %seal, "finalized record");
        Ok(())
    }

    fn discard(&self, id: Uuid) -> Result<()> {
        let rows = self.conn.execute(
            "DELETE FROM sea_service WHERE id = ?1 AND status = 'draft'",
            [id.to_string()],
        )?;
        tracing::debug!(%id, rows, "discarded draft");
        Ok(())
    }
}

/// Raw column values of one `sea_service` row.
struct RecordRow {
    id: String,
    ship_name: Option<String>,
    imo_number: Option<String>,
    sign_on_date: Option<String>,
    sign_off_date: Option<String>,
    status: String,
    finalized_at: Option<String>,
    seal: Option<String>,
    payload: String,
    created_at: String,
    updated_at: String,
}

impl RecordRow {
    fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            ship_name: row.get(1)?,
            imo_number: row.get(2)?,
            sign_on_date: row.get(3)?,
            sign_off_date: row.get(4)?,
            status: row.get(5)?,
            finalized_at: row.get(6)?,
            seal: row.get(7)?,
            payload: row.get(8)?,
            created_at: row.get(9)?,
            updated_at: row.get(10)?,
        })
    }

    fn into_record(self) -> Result<SeaServiceRecord> {
        let id = self
            .id
            .parse::<Uuid>()
            .map_err(|e| StorageError::Corrupt(format!("invalid record id: {e}")))?;
        let status = deserialize_status(&self.status, self.finalized_at.as_deref(), self.seal)?;
        let payload = serde_json::from_str(&self.payload)?;

        Ok(SeaServiceRecord {
            id,
            ship_name: self.ship_name,
            imo_number: self.imo_number,
            sign_on_date: self.sign_on_date,
            sign_off_date: self.sign_off_date,
            status,
            payload,
            created_at: parse_timestamp(&self.created_at, "created_at")?,
            updated_at: parse_timestamp(&self.updated_at, "updated_at")?,
        })
    }
}

fn parse_timestamp(value: &str, column: &str) -> Result<Timestamp> {
    value
        .parse::<Timestamp>()
        .map_err(|e| StorageError::Corrupt(format!("invalid {column}: {e}")))
}

/// Reconstructs a `RecordStatus` from its column values.
fn deserialize_status(
    status: &str,
    finalized_at: Option<&str>,
    seal: Option<String>,
) -> Result<RecordStatus> {
    match status {
        "draft" => Ok(RecordStatus::Draft),
        "final" => {
            let finalized_at = finalized_at.ok_or_else(|| {
                StorageError::Corrupt("record is final but finalized_at is null".into())
            })?;
            let seal =
                seal.ok_or_else(|| StorageError::Corrupt("record is final but unsealed".into()))?;
            Ok(RecordStatus::Final {
                finalized_at: parse_timestamp(finalized_at, "finalized_at")?,
                seal,
            })
        }
        other => Err(StorageError::Corrupt(format!(
            "unknown record status: {other}"
        ))),
    }
}
