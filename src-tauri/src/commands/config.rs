use tauri::{AppHandle, State};
use tracing::{info, warn};

use crate::api::{check_configuration, ApiClient, ApiConfigUpdate, BackendConfig, ConfigStatus, ProjectContext};
use crate::error::CodeliaError;
use crate::settings::AppSettings;

#[tauri::command]
pub fn get_app_settings(app: AppHandle) -> Result<AppSettings, String> {
    Ok(AppSettings::load(&app)?)
}

#[tauri::command]
pub fn save_app_settings(app: AppHandle, settings: AppSettings) -> Result<AppSettings, String> {
    settings.save(&app).map_err(|e| {
        warn!("Failed to save settings: {}", e);
        e.into()
    })
}

#[tauri::command]
pub async fn get_backend_config(api: State<'_, ApiClient>) -> Result<BackendConfig, String> {
    Ok(api.get_config().await?)
}

/// Merge provider credentials into the backend configuration.
#[tauri::command]
pub async fn save_api_config(
    api: State<'_, ApiClient>,
    update: ApiConfigUpdate,
) -> Result<ConfigStatus, String> {
    Ok(save_api_update(&api, update).await?)
}

#[tauri::command]
pub async fn save_project_config(
    api: State<'_, ApiClient>,
    project: ProjectContext,
) -> Result<ConfigStatus, String> {
    Ok(save_project(&api, &project).await?)
}

#[tauri::command]
pub async fn check_backend_configuration(api: State<'_, ApiClient>) -> Result<ConfigStatus, String> {
    let config = api.get_config().await?;
    Ok(check_configuration(&config))
}

pub async fn save_api_update(
    api: &ApiClient,
    update: ApiConfigUpdate,
) -> Result<ConfigStatus, CodeliaError> {
    let mut config = api.get_config().await?;
    config.apply_api_update(update);
    let provider = config.active_provider().to_string();
    if !config.validate_api_key(&provider) {
        return Err(CodeliaError::InvalidInput(if provider == "gemini" {
            "Gemini requires both an API key and a URL".to_string()
        } else {
            format!("Enter an API key for {}", provider)
        }));
    }
    api.save_config(&config).await?;
    info!("API configuration saved for {}", provider);
    Ok(check_configuration(&config))
}

pub async fn save_project(
    api: &ApiClient,
    project: &ProjectContext,
) -> Result<ConfigStatus, CodeliaError> {
    let mut config = api.get_config().await?;
    config.apply_project(project);
    if !config.project.is_complete() {
        return Err(CodeliaError::InvalidInput(
            "Developer, system and client are all required".to_string(),
        ));
    }
    api.save_config(&config).await?;
    info!("Project context saved");
    Ok(check_configuration(&config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    fn current_config() -> String {
        json!({
            "provider": "openai",
            "openai": {"key": "", "url": ""},
            "gemini": {"key": "", "url": ""},
            "claude": {"key": "", "url": ""},
            "project": {"developer": "Acme", "system": "Door", "client": "City"}
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_save_api_update_merges_and_posts() {
        let mut server = mockito::Server::new_async().await;
        let _get = server
            .mock("GET", "/api/config")
            .with_status(200)
            .with_body(current_config())
            .create_async()
            .await;
        let post = server
            .mock("POST", "/api/config")
            .match_body(Matcher::PartialJson(json!({
                "provider": "claude",
                "claude": {"key": "sk-ant"},
                "project": {"developer": "Acme"}
            })))
            .with_status(200)
            .with_body(r#"{"status": "success"}"#)
            .create_async()
            .await;
        let api = ApiClient::new(&format!("{}/api", server.url())).unwrap();

        let status = save_api_update(
            &api,
            ApiConfigUpdate {
                provider: "claude".into(),
                claude: Some(crate::api::ProviderSettings {
                    key: "sk-ant".into(),
                    url: String::new(),
                }),
                ..ApiConfigUpdate::default()
            },
        )
        .await
        .unwrap();

        post.assert_async().await;
        assert!(status.is_valid);
        assert_eq!(status.provider, "claude");
    }

    #[tokio::test]
    async fn test_gemini_without_url_is_rejected() {
        let mut server = mockito::Server::new_async().await;
        let _get = server
            .mock("GET", "/api/config")
            .with_status(200)
            .with_body(current_config())
            .create_async()
            .await;
        let post = server.mock("POST", "/api/config").expect(0).create_async().await;
        let api = ApiClient::new(&format!("{}/api", server.url())).unwrap();

        let err = save_api_update(
            &api,
            ApiConfigUpdate {
                provider: "gemini".into(),
                gemini: Some(crate::api::ProviderSettings {
                    key: "g-key".into(),
                    url: String::new(),
                }),
                ..ApiConfigUpdate::default()
            },
        )
        .await
        .unwrap_err();

        assert!(matches!(err, CodeliaError::InvalidInput(_)));
        post.assert_async().await;
    }

    #[tokio::test]
    async fn test_incomplete_project_is_rejected() {
        let mut server = mockito::Server::new_async().await;
        let _get = server
            .mock("GET", "/api/config")
            .with_status(200)
            .with_body(current_config())
            .create_async()
            .await;
        let api = ApiClient::new(&format!("{}/api", server.url())).unwrap();

        let err = save_project(
            &api,
            &ProjectContext {
                developer: "Acme".into(),
                system: "  ".into(),
                client: "City".into(),
            },
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("required"));
    }
}
