use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::error::CodeliaError;

/// Client-local history written by builds that predate the backend store.
/// Read once during migration and then cleared.
pub trait LegacyStore: Send + Sync {
    /// Raw JSON text of the legacy entry, if the key exists.
    fn read(&self) -> Option<String>;

    /// Remove the legacy entry.
    fn clear(&self) -> Result<(), CodeliaError>;
}

#[derive(Debug, Default)]
struct Slot {
    entry: Option<String>,
    cleared: bool,
}

/// In-memory `LegacyStore` holding the entry the webview handed over from its
/// `localStorage`. The webview owns the real key: it removes it only once
/// [`MemoryLegacyStore::take`] reports that a migration pass cleared it here.
#[derive(Debug, Default)]
pub struct MemoryLegacyStore {
    slot: Mutex<Slot>,
}

/// What became of a handed-over entry after a load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Handoff {
    /// A migration pass consumed and cleared the entry.
    Cleared,
    /// The entry was not migrated and stays with the webview.
    Kept(Option<String>),
}

impl MemoryLegacyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(raw: impl Into<String>) -> Self {
        let store = Self::new();
        store.stage(raw);
        store
    }

    fn lock(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Hold `raw` as the legacy entry until the next migration pass or `take`.
    pub fn stage(&self, raw: impl Into<String>) {
        let mut slot = self.lock();
        slot.entry = Some(raw.into());
        slot.cleared = false;
    }

    /// Drop whatever is staged and report whether a migration pass cleared
    /// the entry since it was staged.
    pub fn take(&self) -> Handoff {
        let mut slot = self.lock();
        let cleared = std::mem::take(&mut slot.cleared);
        match slot.entry.take() {
            None if cleared => Handoff::Cleared,
            entry => Handoff::Kept(entry),
        }
    }

    pub fn contains_entry(&self) -> bool {
        self.lock().entry.is_some()
    }
}

impl LegacyStore for MemoryLegacyStore {
    fn read(&self) -> Option<String> {
        self.lock().entry.clone()
    }

    fn clear(&self) -> Result<(), CodeliaError> {
        let mut slot = self.lock();
        slot.entry = None;
        slot.cleared = true;
        Ok(())
    }
}
