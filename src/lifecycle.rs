//! Lifecycle manager: the active draft and the finalized history.
//!
//! A record moves through two states:
//!
//! ```text
//! (no draft) --start--> Draft --finalize--> Final
//!                         |
//!                         +--discard--> (no draft)
//! ```
//!
//! Every mutation of the draft is persisted immediately. When a save fails
//! the in-memory change is kept and the error is returned to the caller.

use uuid::Uuid;

use crate::model::{SeaServiceRecord, SectionData, ServicePeriodPatch, parse_date};
use crate::schema::{SectionKey, SectionStatus, ShipType, UnknownShipType};
use crate::status;
use crate::storage::{RecordStore, StorageError};
use crate::summary::{self, Blocker, Summary};

/// Errors reported by lifecycle operations.
#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    #[error("a sea service record is already in progress; finalize or discard it first")]
    DraftAlreadyExists,

    #[error("no sea service record is in progress")]
    NoActiveDraft,

    #[error(transparent)]
    UnknownShipType(#[from] UnknownShipType),

    #[error("record cannot be finalized:\n{}", summary::format_blockers(.0))]
    NotFinalizable(Vec<Blocker>),

    #[error("record {0} was not finalized by storage")]
    FinalizeNotApplied(Uuid),

    #[error("failed to save: {0}")]
    Storage(#[from] StorageError),
}

/// Whether a draft is open.
#[derive(Debug, Clone, PartialEq)]
pub enum LifecycleState {
    NoDraft,
    Draft(SeaServiceRecord),
}

/// Owns the active draft and applies every change to it.
pub struct SeaService<S> {
    store: S,
    state: LifecycleState,
    finalized: Vec<SeaServiceRecord>,
}

impl<S: RecordStore> SeaService<S> {
    /// Loads the active draft and final history from `store`.
    pub fn load(store: S) -> Result<Self, LifecycleError> {
        let state = match store.active_draft()? {
            Some(record) => LifecycleState::Draft(record),
            None => LifecycleState::NoDraft,
        };
        let mut finalized = store.final_history()?;
        sort_history(&mut finalized);
        Ok(Self {
            store,
            state,
            finalized,
        })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn state(&self) -> &LifecycleState {
        &self.state
    }

    pub fn active_draft(&self) -> Option<&SeaServiceRecord> {
        match &self.state {
            LifecycleState::Draft(record) => Some(record),
            LifecycleState::NoDraft => None,
        }
    }

    /// Final records, most recent sign-on first.
    pub fn history(&self) -> &[SeaServiceRecord] {
        &self.finalized
    }

    /// Progress of the active draft.
    pub fn summary(&self) -> Option<Summary> {
        self.active_draft()
            .map(|r| summary::summarize(r.payload.sections(), r.payload.ship_type))
    }

    /// What stands between the active draft and finalization.
    pub fn blockers(&self) -> Option<Vec<Blocker>> {
        self.active_draft()
            .map(|r| summary::finalization_blockers(&r.payload, r.payload.ship_type))
    }

    pub fn can_finalize(&self) -> bool {
        self.blockers().is_some_and(|b| b.is_empty())
    }

    /// Starts a new draft. Only valid when no draft exists.
    pub fn start(
        &mut self,
        ship_type_code: Option<&str>,
        sign_on_date: &str,
        sign_on_port: &str,
    ) -> Result<&SeaServiceRecord, LifecycleError> {
        if let LifecycleState::Draft(existing) = &self.state {
            tracing::warn!(id = %existing.id, "start refused: draft already in progress");
            return Err(LifecycleError::DraftAlreadyExists);
        }
        let ship_type = ship_type_code.map(resolve_ship_type).transpose()?;

        let record = match self.store.create(ship_type, sign_on_date, sign_on_port) {
            Ok(record) => record,
            Err(StorageError::DraftAlreadyExists) => {
                return Err(LifecycleError::DraftAlreadyExists);
            }
            Err(e) => return Err(e.into()),
        };
        tracing::info!(id = %record.id, ship_type = ?ship_type, "started sea service record");

        self.state = LifecycleState::Draft(record);
        match &self.state {
            LifecycleState::Draft(record) => Ok(record),
            LifecycleState::NoDraft => Err(LifecycleError::NoActiveDraft),
        }
    }

    /// Merges `patch` into a section, recomputes its status, and saves.
    pub fn update_section(
        &mut self,
        key: SectionKey,
        patch: SectionData,
    ) -> Result<SectionStatus, LifecycleError> {
        let record = self.draft_mut()?;
        record.payload.merge_section(key, patch);
        let derived =
            status::derive_section(key, record.payload.section(key), record.payload.ship_type);
        record.payload.set_status(key, derived);
        record.touch();
        tracing::debug!(section = %key, status = ?derived, "section updated");

        self.persist()?;
        Ok(derived)
    }

    /// Merges `patch` into the service period and saves.
    pub fn update_service_period(&mut self, patch: ServicePeriodPatch) -> Result<(), LifecycleError> {
        let record = self.draft_mut()?;
        record.payload.service_period.merge(patch);
        record.touch();
        tracing::debug!(
            complete = record.payload.service_period.is_complete(),
            "service period updated"
        );

        self.persist()
    }

    /// Replaces the ship type, re-derives every section under it, and saves.
    pub fn set_ship_type(&mut self, code: &str) -> Result<ShipType, LifecycleError> {
        let ship_type = resolve_ship_type(code)?;
        let record = self.draft_mut()?;
        record.payload.ship_type = Some(ship_type);
        for key in SectionKey::ALL {
            let derived = status::derive_section(key, record.payload.section(key), Some(ship_type));
            record.payload.set_status(key, derived);
        }
        record.touch();
        tracing::info!(%ship_type, "ship type changed");

        self.persist()?;
        Ok(ship_type)
    }

    /// Moves the draft to final. Refused while any finalization blocker
    /// remains, an incomplete service period included.
    pub fn finalize(&mut self) -> Result<&SeaServiceRecord, LifecycleError> {
        let LifecycleState::Draft(draft) = &self.state else {
            return Err(LifecycleError::NoActiveDraft);
        };

        let blockers = summary::finalization_blockers(&draft.payload, draft.payload.ship_type);
        if !blockers.is_empty() {
            tracing::info!(id = %draft.id, blockers = blockers.len(), "finalize refused");
            return Err(LifecycleError::NotFinalizable(blockers));
        }

        // Seal exactly what is in memory, even if an earlier save failed.
        let id = draft.id;
        self.store.upsert_draft(id, &draft.payload)?;
        self.store.finalize(id)?;
        let record = self
            .store
            .get(id)?
            .filter(|r| !r.is_draft())
            .ok_or(LifecycleError::FinalizeNotApplied(id))?;
        tracing::info!(%id, "finalized sea service record");

        self.state = LifecycleState::NoDraft;
        self.finalized.push(record);
        sort_history(&mut self.finalized);
        self.finalized
            .iter()
            .find(|r| r.id == id)
            .ok_or(LifecycleError::FinalizeNotApplied(id))
    }

    /// Deletes the draft entirely.
    pub fn discard(&mut self) -> Result<(), LifecycleError> {
        let LifecycleState::Draft(draft) = &self.state else {
            return Err(LifecycleError::NoActiveDraft);
        };
        let id = draft.id;
        self.store.discard(id)?;
        tracing::info!(%id, "discarded draft");

        self.state = LifecycleState::NoDraft;
        Ok(())
    }

    fn draft_mut(&mut self) -> Result<&mut SeaServiceRecord, LifecycleError> {
        match &mut self.state {
            LifecycleState::Draft(record) => Ok(record),
            LifecycleState::NoDraft => Err(LifecycleError::NoActiveDraft),
        }
    }

    /// Saves the draft payload. Failures are logged and returned; the
    /// in-memory draft is left as is.
    fn persist(&self) -> Result<(), LifecycleError> {
        let LifecycleState::Draft(record) = &self.state else {
            return Ok(());
        };
        if let Err(e) = self.store.upsert_draft(record.id, &record.payload) {
            tracing::warn!(id = %record.id, error = %e, "draft not saved; keeping unsaved changes");
            return Err(e.into());
        }
        Ok(())
    }
}

fn resolve_ship_type(code: &str) -> Result<ShipType, UnknownShipType> {
    ShipType::canonicalize(code).ok_or_else(|| UnknownShipType(code.to_string()))
}

/// Most recent sign-on first, then most recently created.
///
/// Dates are compared as calendar dates, so rows written before dates were
/// stored in ISO form still order correctly. Unparseable dates sort last.
fn sort_history(records: &mut [SeaServiceRecord]) {
    records.sort_by(|a, b| {
        let a_date = parse_date(a.sign_on_date.as_deref());
        let b_date = parse_date(b.sign_on_date.as_deref());
        b_date
            .cmp(&a_date)
            .then(b.created_at.cmp(&a.created_at))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::cell::Cell;
    use std::io;
    use std::path::Path;

    use serde_json::json;
    use tempfile::TempDir;

    use crate::model::{RecordStatus, SeaServicePayload, section_data};
    use crate::storage::{self, Storage};
    use crate::testing::completed_section;

    fn test_service() -> (TempDir, SeaService<Storage>) {
        let dir = TempDir::new().unwrap();
        let service = open(dir.path());
        (dir, service)
    }

    fn open(dir: &Path) -> SeaService<Storage> {
        let storage = Storage::open(dir.join("seabook.sqlite")).unwrap();
        SeaService::load(storage).unwrap()
    }

    fn sign_off() -> ServicePeriodPatch {
        ServicePeriodPatch {
            sign_off_date: Some("2025-09-15".into()),
            sign_off_port: Some("Singapore".into()),
            ..ServicePeriodPatch::default()
        }
    }

    /// Fills every section so only the service period can block.
    fn fill_sections<S: RecordStore>(service: &mut SeaService<S>) {
        for key in SectionKey::ALL {
            service.update_section(key, completed_section(key)).unwrap();
        }
    }

    #[test]
    fn start_creates_a_draft() {
        let (dir, mut service) = test_service();
        let record = service
            .start(Some("general-cargo"), "2025-03-01", "Rotterdam")
            .unwrap();
        assert!(record.is_draft());
        assert_eq!(record.payload.ship_type, Some(ShipType::GeneralCargo));

        let reloaded = open(dir.path());
        assert!(matches!(reloaded.state(), LifecycleState::Draft(_)));
    }

    #[test]
    fn start_refuses_a_second_draft() {
        let (_dir, mut service) = test_service();
        let first = service.start(None, "2025-03-01", "Rotterdam").unwrap().id;

        let err = service.start(None, "2025-04-01", "Hamburg").unwrap_err();
        assert!(matches!(err, LifecycleError::DraftAlreadyExists));
        assert_eq!(service.active_draft().unwrap().id, first);
        assert_eq!(service.store().active_draft().unwrap().unwrap().id, first);
    }

    #[test]
    fn start_refuses_draft_created_elsewhere() {
        let dir = TempDir::new().unwrap();
        let mut stale = open(dir.path());
        let mut other = open(dir.path());
        other.start(None, "2025-03-01", "Rotterdam").unwrap();

        let err = stale.start(None, "2025-04-01", "Hamburg").unwrap_err();
        assert!(matches!(err, LifecycleError::DraftAlreadyExists));
        assert_eq!(stale.state(), &LifecycleState::NoDraft);
    }

    #[test]
    fn start_rejects_unknown_ship_type() {
        let (_dir, mut service) = test_service();
        let err = service
            .start(Some("hovercraft"), "2025-03-01", "Rotterdam")
            .unwrap_err();
        assert!(matches!(err, LifecycleError::UnknownShipType(_)));
        assert_eq!(service.state(), &LifecycleState::NoDraft);
    }

    #[test]
    fn mutations_require_a_draft() {
        let (_dir, mut service) = test_service();
        assert!(matches!(
            service.update_section(SectionKey::VesselIdentity, SectionData::new()),
            Err(LifecycleError::NoActiveDraft)
        ));
        assert!(matches!(
            service.update_service_period(sign_off()),
            Err(LifecycleError::NoActiveDraft)
        ));
        assert!(matches!(
            service.set_ship_type("TUG"),
            Err(LifecycleError::NoActiveDraft)
        ));
        assert!(matches!(service.finalize(), Err(LifecycleError::NoActiveDraft)));
        assert!(matches!(service.discard(), Err(LifecycleError::NoActiveDraft)));
        assert!(service.summary().is_none());
        assert!(!service.can_finalize());
    }

    #[test]
    fn update_section_merges_and_saves() {
        let (dir, mut service) = test_service();
        service.start(Some("TUG"), "2025-03-01", "Rotterdam").unwrap();

        let first = service
            .update_section(
                SectionKey::VesselIdentity,
                section_data([("shipName", json!("Nordic Star")), ("imoNumber", json!(""))]),
            )
            .unwrap();
        assert_eq!(first, SectionStatus::InProgress);

        let second = service
            .update_section(
                SectionKey::VesselIdentity,
                section_data([("imoNumber", json!("9321483"))]),
            )
            .unwrap();
        assert_eq!(second, SectionStatus::Completed);

        let draft = service.active_draft().unwrap();
        assert_eq!(draft.ship_name.as_deref(), Some("Nordic Star"));
        assert!(draft.payload.last_updated_at.is_some());

        let reloaded = open(dir.path());
        let stored = reloaded.active_draft().unwrap();
        assert_eq!(stored.payload, draft.payload);
        assert_eq!(stored.ship_name.as_deref(), Some("Nordic Star"));
        assert_eq!(
            stored.payload.status(SectionKey::VesselIdentity),
            SectionStatus::Completed
        );
    }

    #[test]
    fn update_service_period_merges() {
        let (_dir, mut service) = test_service();
        service.start(None, "2025-03-01", "Rotterdam").unwrap();
        service.update_service_period(sign_off()).unwrap();

        let period = &service.active_draft().unwrap().payload.service_period;
        assert_eq!(period.sign_on_port.as_deref(), Some("Rotterdam"));
        assert_eq!(period.sign_off_port.as_deref(), Some("Singapore"));
        assert!(period.is_complete());
    }

    #[test]
    fn set_ship_type_rederives_statuses() {
        let (_dir, mut service) = test_service();
        service
            .start(Some("GENERAL_CARGO"), "2025-03-01", "Rotterdam")
            .unwrap();
        let status = service
            .update_section(
                SectionKey::InertGasSystem,
                section_data([
                    ("igsFitted", json!(false)),
                    ("igsNotFittedReason", json!("Not applicable")),
                ]),
            )
            .unwrap();
        assert_eq!(status, SectionStatus::Completed);

        let ship_type = service.set_ship_type("oil tanker").unwrap();
        assert_eq!(ship_type, ShipType::OilTanker);
        assert_eq!(
            service
                .active_draft()
                .unwrap()
                .payload
                .status(SectionKey::InertGasSystem),
            SectionStatus::InProgress
        );
    }

    #[test]
    fn set_ship_type_rejects_unknown_code() {
        let (_dir, mut service) = test_service();
        service.start(Some("TUG"), "2025-03-01", "Rotterdam").unwrap();

        assert!(matches!(
            service.set_ship_type("zeppelin"),
            Err(LifecycleError::UnknownShipType(_))
        ));
        assert_eq!(
            service.active_draft().unwrap().payload.ship_type,
            Some(ShipType::Tug)
        );
    }

    #[test]
    fn finalize_blocks_on_incomplete_service_period() {
        let (dir, mut service) = test_service();
        service
            .start(Some("BULK_CARRIER"), "2025-03-01", "Rotterdam")
            .unwrap();
        fill_sections(&mut service);

        let err = service.finalize().unwrap_err();
        match err {
            LifecycleError::NotFinalizable(blockers) => {
                assert_eq!(blockers, vec![Blocker::ServicePeriodIncomplete]);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(service.active_draft().is_some());
        assert!(service.history().is_empty());
        assert!(open(dir.path()).active_draft().unwrap().is_draft());
    }

    #[test]
    fn finalize_blocks_on_incomplete_section() {
        let (_dir, mut service) = test_service();
        service
            .start(Some("BULK_CARRIER"), "2025-03-01", "Rotterdam")
            .unwrap();
        service.update_service_period(sign_off()).unwrap();

        let err = service.finalize().unwrap_err();
        let LifecycleError::NotFinalizable(blockers) = err else {
            panic!("expected NotFinalizable");
        };
        // Ten applicable sections; the inert gas system doesn't apply.
        assert_eq!(blockers.len(), 10);
        assert!(!blockers.contains(&Blocker::SectionIncomplete {
            key: SectionKey::InertGasSystem,
            status: SectionStatus::NotStarted,
        }));
    }

    #[test]
    fn finalize_moves_draft_to_history() {
        let (dir, mut service) = test_service();
        service
            .start(Some("GENERAL_CARGO"), "2025-03-01", "Rotterdam")
            .unwrap();
        service.update_service_period(sign_off()).unwrap();
        for key in SectionKey::ALL {
            if key != SectionKey::InertGasSystem {
                service.update_section(key, completed_section(key)).unwrap();
            }
        }
        assert!(service.can_finalize());

        let record = service.finalize().unwrap().clone();
        assert!(matches!(record.status, RecordStatus::Final { .. }));
        assert_eq!(record.verify_seal(), Some(true));
        assert_eq!(service.state(), &LifecycleState::NoDraft);
        assert_eq!(service.history(), std::slice::from_ref(&record));

        let reloaded = open(dir.path());
        assert!(reloaded.active_draft().is_none());
        assert_eq!(reloaded.history(), std::slice::from_ref(&record));
    }

    #[test]
    fn final_record_cannot_be_changed() {
        let (_dir, mut service) = test_service();
        service.start(Some("TUG"), "2025-03-01", "Rotterdam").unwrap();
        service.update_service_period(sign_off()).unwrap();
        fill_sections(&mut service);
        let id = service.finalize().unwrap().id;

        assert!(matches!(
            service.update_section(
                SectionKey::VesselIdentity,
                section_data([("shipName", json!("Altered"))])
            ),
            Err(LifecycleError::NoActiveDraft)
        ));
        assert!(matches!(service.discard(), Err(LifecycleError::NoActiveDraft)));

        let stored = service.store().get(id).unwrap().unwrap();
        assert!(!stored.is_draft());
        assert_eq!(stored.ship_name.as_deref(), Some("Nordic Star"));
        assert_eq!(stored.verify_seal(), Some(true));
    }

    #[test]
    fn history_is_newest_sign_on_first() {
        let (_dir, mut service) = test_service();
        for date in ["2024-01-10", "2025-03-01"] {
            service.start(Some("TUG"), date, "Rotterdam").unwrap();
            service.update_service_period(sign_off()).unwrap();
            fill_sections(&mut service);
            service.finalize().unwrap();
        }

        let dates: Vec<_> = service
            .history()
            .iter()
            .map(|r| r.sign_on_date.as_deref().unwrap())
            .collect();
        assert_eq!(dates, ["2025-03-01", "2024-01-10"]);
    }

    #[test]
    fn history_orders_mixed_date_spellings_chronologically() {
        let (_dir, mut service) = test_service();
        for date in ["2024-05-01", "20240301", " 2023-12-31 "] {
            service.start(Some("TUG"), date, "Rotterdam").unwrap();
            service.update_service_period(sign_off()).unwrap();
            fill_sections(&mut service);
            service.finalize().unwrap();
        }

        let expected = ["2024-05-01", "2024-03-01", "2023-12-31"];
        let in_memory: Vec<_> = service
            .history()
            .iter()
            .map(|r| r.sign_on_date.clone().unwrap())
            .collect();
        assert_eq!(in_memory, expected);

        let stored: Vec<_> = service
            .store()
            .final_history()
            .unwrap()
            .into_iter()
            .map(|r| r.sign_on_date.unwrap())
            .collect();
        assert_eq!(stored, expected);
    }

    #[test]
    fn history_sort_uses_calendar_dates() {
        let (_dir, mut service) = test_service();
        service.start(Some("TUG"), "2024-05-01", "Rotterdam").unwrap();
        service.update_service_period(sign_off()).unwrap();
        fill_sections(&mut service);
        service.finalize().unwrap();

        let mut records = service.history().to_vec();
        let mut legacy = records[0].clone();
        legacy.sign_on_date = Some("20240601".into());
        records.push(legacy);
        sort_history(&mut records);

        assert_eq!(records[0].sign_on_date.as_deref(), Some("20240601"));
        assert_eq!(records[1].sign_on_date.as_deref(), Some("2024-05-01"));
    }

    #[test]
    fn discard_removes_the_draft() {
        let (dir, mut service) = test_service();
        let id = service.start(None, "2025-03-01", "Rotterdam").unwrap().id;

        service.discard().unwrap();

        assert_eq!(service.state(), &LifecycleState::NoDraft);
        assert!(service.store().get(id).unwrap().is_none());
        assert!(open(dir.path()).active_draft().is_none());
        service.start(None, "2025-04-01", "Hamburg").unwrap();
    }

    /// Storage that can be told to fail draft saves.
    struct FlakyStore {
        inner: Storage,
        fail_saves: Cell<bool>,
    }

    impl RecordStore for FlakyStore {
        fn create(
            &self,
            ship_type: Option<ShipType>,
            sign_on_date: &str,
            sign_on_port: &str,
        ) -> storage::Result<SeaServiceRecord> {
            self.inner.create(ship_type, sign_on_date, sign_on_port)
        }

        fn active_draft(&self) -> storage::Result<Option<SeaServiceRecord>> {
            self.inner.active_draft()
        }

        fn final_history(&self) -> storage::Result<Vec<SeaServiceRecord>> {
            self.inner.final_history()
        }

        fn get(&self, id: Uuid) -> storage::Result<Option<SeaServiceRecord>> {
            self.inner.get(id)
        }

        fn upsert_draft(&self, id: Uuid, payload: &SeaServicePayload) -> storage::Result<()> {
            if self.fail_saves.get() {
                return Err(io::Error::other("disk full").into());
            }
            self.inner.upsert_draft(id, payload)
        }

        fn finalize(&self, id: Uuid) -> storage::Result<()> {
            self.inner.finalize(id)
        }

        fn discard(&self, id: Uuid) -> storage::Result<()> {
            self.inner.discard(id)
        }
    }

    #[test]
    fn failed_save_keeps_in_memory_change() {
        let dir = TempDir::new().unwrap();
        let store = FlakyStore {
            inner: Storage::open(dir.path().join("seabook.sqlite")).unwrap(),
            fail_saves: Cell::new(false),
        };
        let mut service = SeaService::load(store).unwrap();
        service.start(None, "2025-03-01", "Rotterdam").unwrap();

        service.store().fail_saves.set(true);
        let err = service
            .update_section(
                SectionKey::PollutionPrevention,
                section_data([("owsMake", json!("Alfa Laval"))]),
            )
            .unwrap_err();
        assert!(matches!(err, LifecycleError::Storage(_)));

        let draft = service.active_draft().unwrap();
        assert_eq!(
            draft.payload.status(SectionKey::PollutionPrevention),
            SectionStatus::Completed
        );
        let stored = service.store().inner.active_draft().unwrap().unwrap();
        assert!(stored.payload.section(SectionKey::PollutionPrevention).is_empty());
    }

    #[test]
    fn finalize_seals_unsaved_changes() {
        let dir = TempDir::new().unwrap();
        let store = FlakyStore {
            inner: Storage::open(dir.path().join("seabook.sqlite")).unwrap(),
            fail_saves: Cell::new(false),
        };
        let mut service = SeaService::load(store).unwrap();
        service.start(Some("TUG"), "2025-03-01", "Rotterdam").unwrap();
        service.update_service_period(sign_off()).unwrap();
        fill_sections(&mut service);

        service.store().fail_saves.set(true);
        let _ = service.update_section(
            SectionKey::VesselIdentity,
            section_data([("callSign", json!("LAXY7"))]),
        );
        service.store().fail_saves.set(false);

        let record = service.finalize().unwrap();
        assert_eq!(
            record.payload.section(SectionKey::VesselIdentity)["callSign"],
            "LAXY7"
        );
        assert_eq!(record.verify_seal(), Some(true));
    }
}
