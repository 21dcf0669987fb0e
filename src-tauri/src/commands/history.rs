use serde::Serialize;
use tauri::State;
use tracing::info;

use crate::history::{
    AppHistory, Handoff, HistoryEntry, HistoryId, HistoryRecord, HistorySync, MemoryLegacyStore,
    RemoteHistoryStore, SelectedRecord,
};

fn entries(records: Vec<HistoryRecord>) -> Vec<HistoryEntry> {
    records.into_iter().map(HistoryEntry::from).collect()
}

#[derive(Debug, Serialize)]
pub struct HistoryLoad {
    pub records: Vec<HistoryEntry>,
    /// The webview should now remove its legacy entry.
    pub legacy_cleared: bool,
}

/// Refresh from the backend, migrating `legacy` (the webview's
/// `requirementHistory` text) when the backend store is empty.
#[tauri::command]
pub async fn load_history(
    history: State<'_, AppHistory>,
    legacy: Option<String>,
) -> Result<HistoryLoad, String> {
    Ok(load_with_legacy(history.inner(), legacy).await)
}

pub(crate) async fn load_with_legacy<R: RemoteHistoryStore>(
    history: &HistorySync<R, MemoryLegacyStore>,
    legacy: Option<String>,
) -> HistoryLoad {
    let handed_over = legacy.is_some();
    if let Some(raw) = legacy {
        history.legacy().stage(raw);
    }
    let records = entries(history.load().await);
    // Unmigrated entries stay in the webview only.
    let legacy_cleared = handed_over && history.legacy().take() == Handoff::Cleared;
    if legacy_cleared {
        info!("Legacy history migrated, webview copy can be removed");
    }
    HistoryLoad {
        records,
        legacy_cleared,
    }
}

#[tauri::command]
pub fn list_history(history: State<'_, AppHistory>) -> Vec<HistoryEntry> {
    entries(history.records())
}

#[tauri::command]
pub fn search_history(history: State<'_, AppHistory>, term: String) -> Vec<HistoryEntry> {
    entries(history.query(&term))
}

/// `index` is a position in the list shown for `term`.
#[tauri::command]
pub fn select_history(
    history: State<'_, AppHistory>,
    term: String,
    index: usize,
) -> Result<SelectedRecord, String> {
    history
        .select_record(&term, index)
        .ok_or_else(|| format!("No history entry at position {}", index))
}

#[tauri::command]
pub async fn delete_history(
    history: State<'_, AppHistory>,
    id: HistoryId,
) -> Result<Vec<HistoryEntry>, String> {
    info!("Deleting history record {}", id);
    history.delete_record(&id).await?;
    Ok(entries(history.records()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiClient;
    use crate::history::HttpHistoryStore;
    use mockito::Server;
    use serde_json::json;

    fn legacy_json() -> String {
        json!([{"original": "old", "improved": "new", "originalScore": 40, "improvedScore": 80}])
            .to_string()
    }

    fn sync_for(url: &str) -> HistorySync<HttpHistoryStore, MemoryLegacyStore> {
        let api = ApiClient::new(url).unwrap();
        HistorySync::new(HttpHistoryStore::new(api), MemoryLegacyStore::new())
    }

    #[tokio::test]
    async fn test_handed_over_entry_is_migrated_and_cleared() {
        let mut server = Server::new_async().await;
        let _list = server
            .mock("GET", "/api/history")
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;
        let create = server
            .mock("POST", "/api/history")
            .with_status(200)
            .with_body(json!({"status": "ok"}).to_string())
            .expect(1)
            .create_async()
            .await;

        let sync = sync_for(&format!("{}/api", server.url()));
        let loaded = load_with_legacy(&sync, Some(legacy_json())).await;

        create.assert_async().await;
        assert!(loaded.legacy_cleared);
        assert!(!sync.legacy().contains_entry());
    }

    #[tokio::test]
    async fn test_entry_is_kept_when_backend_has_history() {
        let mut server = Server::new_async().await;
        let _list = server
            .mock("GET", "/api/history")
            .with_status(200)
            .with_body(
                json!([{"id": 1, "req_id": "REQ-001", "original_text": "a", "improved_text": "b"}])
                    .to_string(),
            )
            .create_async()
            .await;

        let sync = sync_for(&format!("{}/api", server.url()));
        let loaded = load_with_legacy(&sync, Some(legacy_json())).await;

        assert_eq!(loaded.records.len(), 1);
        assert!(!loaded.legacy_cleared);
        // Not left staged for a later load to migrate.
        assert!(!sync.legacy().contains_entry());
    }

    #[tokio::test]
    async fn test_unparsable_entry_is_kept() {
        let mut server = Server::new_async().await;
        let _list = server
            .mock("GET", "/api/history")
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        let sync = sync_for(&format!("{}/api", server.url()));
        let loaded = load_with_legacy(&sync, Some("{not json".to_string())).await;

        assert!(loaded.records.is_empty());
        assert!(!loaded.legacy_cleared);
    }

    #[tokio::test]
    async fn test_load_without_handoff_never_reports_cleared() {
        let mut server = Server::new_async().await;
        let _list = server
            .mock("GET", "/api/history")
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        let sync = sync_for(&format!("{}/api", server.url()));
        assert!(!load_with_legacy(&sync, None).await.legacy_cleared);
    }
}
