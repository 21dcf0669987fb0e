use std::sync::{PoisonError, RwLock, RwLockReadGuard};

use serde_json::Value;
use tracing::{info, warn};

use super::legacy::LegacyStore;
use super::remote::RemoteHistoryStore;
use super::types::{
    HistoryDraft, HistoryId, HistoryRecord, LegacyRecord, MigrationReport, NewHistoryRecord,
    SelectedRecord,
};
use crate::error::CodeliaError;

/// Single owner of the displayed history list.
///
/// Reconciles the remote store with the legacy local store: the remote store
/// is authoritative, and the legacy store is drained into it once, the first
/// time the remote store turns out to be empty.
///
/// Remote failures never escape `load`/`migrate`; an unreachable backend
/// degrades to an empty history. The list lock is never held across an
/// await, so overlapping loads are last-write-wins.
pub struct HistorySync<R, L> {
    remote: R,
    legacy: L,
    records: RwLock<Vec<HistoryRecord>>,
}

impl<R: RemoteHistoryStore, L: LegacyStore> HistorySync<R, L> {
    pub fn new(remote: R, legacy: L) -> Self {
        Self {
            remote,
            legacy,
            records: RwLock::new(Vec::new()),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<HistoryRecord>> {
        self.records.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn replace(&self, records: Vec<HistoryRecord>) {
        *self.records.write().unwrap_or_else(PoisonError::into_inner) = records;
    }

    pub fn legacy(&self) -> &L {
        &self.legacy
    }

    /// Snapshot of the working list, newest first.
    pub fn records(&self) -> Vec<HistoryRecord> {
        self.read().clone()
    }

    /// Refresh the working list from the remote store, migrating legacy
    /// history when the remote store has nothing.
    pub async fn load(&self) -> Vec<HistoryRecord> {
        match self.remote.list().await {
            Ok(records) if !records.is_empty() => {
                info!("Loaded {} history records", records.len());
                self.replace(records);
                return self.records();
            }
            Ok(_) => info!("Remote history is empty"),
            Err(e) => warn!("Failed to load history, treating it as empty: {}", e),
        }

        self.replace(Vec::new());
        self.migrate().await;
        self.records()
    }

    /// Push every legacy record to the remote store, then clear the legacy
    /// store. Item failures are skipped; a missing, empty or unparsable
    /// legacy entry leaves everything untouched.
    pub async fn migrate(&self) -> MigrationReport {
        let mut report = MigrationReport::default();

        let Some(raw) = self.legacy.read() else {
            return report;
        };
        let items: Vec<Value> = match serde_json::from_str(&raw) {
            Ok(items) => items,
            Err(e) => {
                warn!("Legacy history is not a JSON array, leaving it in place: {}", e);
                return report;
            }
        };
        if items.is_empty() {
            return report;
        }

        info!("Migrating {} legacy history records", items.len());
        for (index, item) in items.into_iter().enumerate() {
            report.attempted += 1;
            let record = match serde_json::from_value::<LegacyRecord>(item) {
                Ok(legacy) => NewHistoryRecord::from(legacy),
                Err(e) => {
                    warn!("Skipping malformed legacy record {}: {}", index, e);
                    report.failed += 1;
                    continue;
                }
            };
            match self.remote.create(&record).await {
                Ok(()) => report.migrated += 1,
                Err(e) => {
                    warn!("Failed to migrate legacy record {}: {}", index, e);
                    report.failed += 1;
                }
            }
        }

        if let Err(e) = self.legacy.clear() {
            warn!("Failed to clear legacy history: {}", e);
        }

        match self.remote.list().await {
            Ok(records) => self.replace(records),
            Err(e) => warn!("Failed to refresh history after migration: {}", e),
        }

        info!(
            "Legacy migration finished: {} migrated, {} failed",
            report.migrated, report.failed
        );
        report
    }

    /// Persist a finished submission and reload so the list shows the
    /// store-assigned id, req_id and timestamp. On failure the list is left
    /// as it was and the error is handed back for the caller to report.
    pub async fn add_record(&self, draft: HistoryDraft) -> Result<(), CodeliaError> {
        let record = draft.into_new_record();
        if let Err(e) = self.remote.create(&record).await {
            warn!("Failed to save history record: {}", e);
            return Err(e);
        }
        info!(
            "Saved history record ({}% -> {}%)",
            record.original_score, record.improved_score
        );
        self.load().await;
        Ok(())
    }

    /// Delete one record by id at the user's request, then reload.
    pub async fn delete_record(&self, id: &HistoryId) -> Result<(), CodeliaError> {
        self.remote.delete(id).await.map_err(|e| {
            warn!("Failed to delete history record {}: {}", id, e);
            e
        })?;
        info!("Deleted history record {}", id);
        self.load().await;
        Ok(())
    }

    /// Case-insensitive substring filter over the displayable fields.
    /// An empty term matches everything. Order is preserved.
    pub fn query(&self, term: &str) -> Vec<HistoryRecord> {
        let needle = term.to_lowercase();
        self.read()
            .iter()
            .filter(|record| needle.is_empty() || record.search_text().contains(&needle))
            .cloned()
            .collect()
    }

    /// Resolve `index` within the list displayed for `term` and re-hydrate
    /// that record for the input form.
    pub fn select_record(&self, term: &str, index: usize) -> Option<SelectedRecord> {
        self.query(term).get(index).map(HistoryRecord::to_selected)
    }
}
