//! Local persistence for sea service records.
//!
//! All records live in one `SQLite` database:
//!
//! ```text
//! ~/.seabook/seabook.sqlite
//!   sea_service   # one row per record; payload as JSON plus listing columns
//! ```
//!
//! The database enforces the lifecycle rules the rest of the crate relies on:
//! at most one draft exists, and final rows can't be updated or deleted.

mod record;

use std::{fs, io, path::PathBuf};

use rusqlite::Connection;
use uuid::Uuid;

use crate::model::{SeaServicePayload, SeaServiceRecord};
use crate::schema::ShipType;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("a draft sea service record already exists")]
    DraftAlreadyExists,

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("corrupt record: {0}")]
    Corrupt(String),
}

pub type Result<T> = core::result::Result<T, StorageError>;

/// Row-oriented storage for sea service records.
///
/// Every method is synchronous. Draft mutations are guarded so they do
/// nothing once a record is final.
pub trait RecordStore {
    /// Inserts a new draft. Fails if a draft already exists.
    fn create(
        &self,
        ship_type: Option<ShipType>,
        sign_on_date: &str,
        sign_on_port: &str,
    ) -> Result<SeaServiceRecord>;

    /// The single draft, if any.
    fn active_draft(&self) -> Result<Option<SeaServiceRecord>>;

    /// Final records, most recent sign-on first.
    fn final_history(&self) -> Result<Vec<SeaServiceRecord>>;

    fn get(&self, id: Uuid) -> Result<Option<SeaServiceRecord>>;

    /// Replaces a draft's payload. No-op unless the record is a draft.
    fn upsert_draft(&self, id: Uuid, payload: &SeaServicePayload) -> Result<()>;

    /// Moves a draft to final and seals it. No-op unless the record is a draft.
    fn finalize(&self, id: Uuid) -> Result<()>;

    /// Deletes a draft. No-op unless the record is a draft.
    fn discard(&self, id: Uuid) -> Result<()>;
}

/// `SQLite`-backed record storage.
pub struct Storage {
    conn: Connection,
}

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS sea_service (
        id            TEXT PRIMARY KEY,
        ship_name     TEXT,
        imo_number    TEXT,
        sign_on_date  TEXT,
        sign_off_date TEXT,
        status        TEXT NOT NULL CHECK (status IN ('draft', 'final')),
        finalized_at  TEXT,
        seal          TEXT,
        payload       TEXT NOT NULL,
        created_at    TEXT NOT NULL,
        updated_at    TEXT NOT NULL
    );

    CREATE UNIQUE INDEX IF NOT EXISTS one_active_draft
        ON sea_service (status) WHERE status = 'draft';

    CREATE TRIGGER IF NOT EXISTS final_is_immutable
        BEFORE UPDATE ON sea_service WHEN OLD.status = 'final'
    BEGIN
        SELECT RAISE(ABORT, 'final records are immutable');
    END;

    CREATE TRIGGER IF NOT EXISTS final_is_permanent
        BEFORE DELETE ON sea_service WHEN OLD.status = 'final'
    BEGIN
        SELECT RAISE(ABORT, 'final records cannot be deleted');
    END;
";

impl Storage {
    /// Opens (or creates) the database at `path`.
    ///
    /// Parent directories are created if they don't exist.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(&path)?;
        conn.execute_batch(SCHEMA)?;
        tracing::debug!(path = %path.display(), "opened record database");
        Ok(Self { conn })
    }

    /// Returns the default database path: `~/.seabook/seabook.sqlite`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".seabook").join("seabook.sqlite"))
    }
}
