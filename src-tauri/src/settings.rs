use serde::{Deserialize, Serialize};
use serde_json::json;
use tauri::{AppHandle, Runtime};
use tauri_plugin_store::StoreExt;
use tracing::info;

use crate::api::{ApiClient, DEFAULT_BACKEND_URL};
use crate::error::CodeliaError;

pub const PREFERENCES_FILE: &str = "preferences.json";

const BACKEND_URL_KEY: &str = "backend_url";
const BACKEND_EXECUTABLE_KEY: &str = "backend_executable";

/// Desktop-side preferences. Changes to `backend_url` apply on next launch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppSettings {
    pub backend_url: String,
    /// Overrides the bundled backend executable.
    #[serde(default)]
    pub backend_executable: Option<String>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            backend_executable: None,
        }
    }
}

impl AppSettings {
    /// Blank values fall back to defaults.
    pub fn normalized(self) -> Self {
        let backend_url = self.backend_url.trim();
        Self {
            backend_url: if backend_url.is_empty() {
                DEFAULT_BACKEND_URL.to_string()
            } else {
                backend_url.trim_end_matches('/').to_string()
            },
            backend_executable: self
                .backend_executable
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty()),
        }
    }

    pub fn load<R: Runtime>(app: &AppHandle<R>) -> Result<Self, CodeliaError> {
        let store = app
            .store(PREFERENCES_FILE)
            .map_err(|e| CodeliaError::Store(format!("Failed to open {}: {}", PREFERENCES_FILE, e)))?;
        let read = |key: &str| store.get(key).and_then(|v| v.as_str().map(str::to_string));

        Ok(Self {
            backend_url: read(BACKEND_URL_KEY).unwrap_or_default(),
            backend_executable: read(BACKEND_EXECUTABLE_KEY),
        }
        .normalized())
    }

    /// Validate and persist. The backend URL must parse as http(s).
    pub fn save<R: Runtime>(self, app: &AppHandle<R>) -> Result<Self, CodeliaError> {
        let settings = self.normalized();
        ApiClient::new(&settings.backend_url)?;

        let store = app
            .store(PREFERENCES_FILE)
            .map_err(|e| CodeliaError::Store(format!("Failed to open {}: {}", PREFERENCES_FILE, e)))?;
        store.set(BACKEND_URL_KEY, json!(settings.backend_url));
        match &settings.backend_executable {
            Some(path) => store.set(BACKEND_EXECUTABLE_KEY, json!(path)),
            None => {
                store.delete(BACKEND_EXECUTABLE_KEY);
            }
        }
        store
            .save()
            .map_err(|e| CodeliaError::Store(format!("Failed to save {}: {}", PREFERENCES_FILE, e)))?;
        info!("Saved settings (backend: {})", settings.backend_url);
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_values_fall_back_to_defaults() {
        let settings = AppSettings {
            backend_url: "   ".into(),
            backend_executable: Some(" ".into()),
        }
        .normalized();
        assert_eq!(settings, AppSettings::default());
    }

    #[test]
    fn test_url_is_trimmed() {
        let settings = AppSettings {
            backend_url: " http://127.0.0.1:9000/api/ ".into(),
            backend_executable: Some("/opt/codelia/api ".into()),
        }
        .normalized();
        assert_eq!(settings.backend_url, "http://127.0.0.1:9000/api");
        assert_eq!(settings.backend_executable.as_deref(), Some("/opt/codelia/api"));
    }
}
