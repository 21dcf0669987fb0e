//! Requirement history: the remote store, the legacy local store, and the
//! synchronizer that reconciles them.

pub mod legacy;
pub mod remote;
pub mod sync;
pub mod types;

pub use legacy::{Handoff, LegacyStore, MemoryLegacyStore};
pub use remote::{HttpHistoryStore, RemoteHistoryStore};
pub use sync::HistorySync;
pub use types::*;

/// The synchronizer as wired into the desktop app.
pub type AppHistory = HistorySync<HttpHistoryStore, MemoryLegacyStore>;
