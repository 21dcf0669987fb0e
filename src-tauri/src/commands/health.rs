use std::time::Duration;

use serde::Serialize;
use tauri::State;
use tracing::info;

use crate::api::{check_configuration, ApiClient, ConfigStatus};
use crate::history::AppHistory;
use crate::sidecar::BackendProcess;

/// Directory the backend keeps its database and config in.
const BACKEND_DATA_DIR: &str = ".Codelia";

#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub backend_url: String,
    pub backend_reachable: bool,
    pub backend_process_running: bool,
    pub configuration: Option<ConfigStatus>,
    pub history_records: usize,
    pub data_dir_exists: bool,
    pub data_dir_path: Option<String>,
}

#[tauri::command]
pub async fn run_health_check(
    api: State<'_, ApiClient>,
    history: State<'_, AppHistory>,
    backend: State<'_, BackendProcess>,
) -> Result<HealthReport, String> {
    info!("Running health check");

    let reachable = api.is_ready(Duration::from_secs(3)).await;
    info!("Backend reachable at {}: {}", api.base_url(), reachable);

    let configuration = if reachable {
        api.get_config().await.ok().map(|c| check_configuration(&c))
    } else {
        None
    };

    let data_dir = dirs::home_dir().map(|h| h.join(BACKEND_DATA_DIR));
    let data_dir_exists = data_dir.as_ref().is_some_and(|d| d.is_dir());
    info!("Backend data directory present: {}", data_dir_exists);

    Ok(HealthReport {
        backend_url: api.base_url(),
        backend_reachable: reachable,
        backend_process_running: backend.is_running(),
        configuration,
        history_records: history.records().len(),
        data_dir_exists,
        data_dir_path: data_dir.as_ref().map(|d| d.to_string_lossy().to_string()),
    })
}
