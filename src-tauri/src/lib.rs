pub mod api;
mod commands;
pub mod error;
pub mod history;
pub mod pattern;
pub mod report;
pub mod settings;
pub mod sidecar;

use anyhow::Context;
use tauri::{Emitter, Manager, RunEvent};
use tracing::{info, warn};

pub use api::ApiClient;
pub use error::CodeliaError;
pub use history::{AppHistory, HistorySync};

/// Emitted once the startup history load has finished.
pub const HISTORY_UPDATED_EVENT: &str = "history-updated";

pub fn run() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let app = tauri::Builder::default()
        .plugin(tauri_plugin_store::Builder::new().build())
        .manage(sidecar::BackendProcess::new())
        .invoke_handler(tauri::generate_handler![
            commands::config::get_app_settings,
            commands::config::save_app_settings,
            commands::config::get_backend_config,
            commands::config::save_api_config,
            commands::config::save_project_config,
            commands::config::check_backend_configuration,
            commands::health::run_health_check,
            commands::history::load_history,
            commands::history::list_history,
            commands::history::search_history,
            commands::history::select_history,
            commands::history::delete_history,
            commands::requirement::improve_requirement,
            commands::requirement::evaluate_requirement,
            commands::catalog::get_rule_catalog,
            commands::catalog::get_rule_categories,
            commands::catalog::list_ears_patterns,
        ])
        .setup(|app| {
            setup(app)?;
            Ok(())
        })
        .build(tauri::generate_context!())
        .expect("error while building tauri application");

    app.run(|handle, event| {
        if let RunEvent::Exit = event {
            handle.state::<sidecar::BackendProcess>().stop();
        }
    });
}

fn setup(app: &mut tauri::App) -> anyhow::Result<()> {
    let handle = app.handle().clone();

    let settings = settings::AppSettings::load(&handle).unwrap_or_else(|e| {
        warn!("Failed to read settings, using defaults: {}", e);
        settings::AppSettings::default()
    });
    let api = match ApiClient::new(&settings.backend_url) {
        Ok(api) => api,
        Err(e) => {
            warn!("Ignoring backend URL {}: {}", settings.backend_url, e);
            ApiClient::new(api::DEFAULT_BACKEND_URL).context("Failed to build backend client")?
        }
    };

    // The webview hands its legacy entry over through `load_history`.
    let legacy = history::MemoryLegacyStore::new();
    app.manage(api.clone());
    app.manage(AppHistory::new(history::HttpHistoryStore::new(api.clone()), legacy));

    match sidecar::resolve_backend_command(&handle, &settings) {
        Some(command) => {
            if let Err(e) = app.state::<sidecar::BackendProcess>().launch(&command) {
                warn!("{}", e);
            }
        }
        None => info!("Using backend at {}", api.base_url()),
    }

    // Load history only after the backend answers.
    tauri::async_runtime::spawn(async move {
        if !sidecar::wait_for_backend(&api).await {
            return;
        }
        let count = handle.state::<AppHistory>().load().await.len();
        info!("History ready ({} records)", count);
        if let Err(e) = handle.emit(HISTORY_UPDATED_EVENT, count) {
            warn!("Failed to emit {}: {}", HISTORY_UPDATED_EVENT, e);
        }
    });

    Ok(())
}
