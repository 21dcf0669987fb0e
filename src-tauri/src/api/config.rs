//! Backend-owned configuration: AI provider credentials and project context.
//!
//! The backend persists this document; the desktop app only reads it, checks
//! whether analysis can run, and writes back merged updates.

use serde::{Deserialize, Serialize};

use super::types::null_default;

pub const DEFAULT_PROVIDER: &str = "openai";

fn default_provider() -> String {
    DEFAULT_PROVIDER.to_string()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProviderSettings {
    #[serde(default, deserialize_with = "null_default")]
    pub key: String,
    #[serde(default, deserialize_with = "null_default")]
    pub url: String,
}

/// Who builds the system, what it is, and who it is for. Injected into the
/// improvement prompt by the backend.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProjectContext {
    #[serde(default, deserialize_with = "null_default")]
    pub developer: String,
    #[serde(default, deserialize_with = "null_default")]
    pub system: String,
    #[serde(default, deserialize_with = "null_default")]
    pub client: String,
}

impl ProjectContext {
    pub fn trimmed(&self) -> Self {
        Self {
            developer: self.developer.trim().to_string(),
            system: self.system.trim().to_string(),
            client: self.client.trim().to_string(),
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.developer.trim().is_empty()
            && !self.system.trim().is_empty()
            && !self.client.trim().is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BackendConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default)]
    pub openai: ProviderSettings,
    #[serde(default)]
    pub gemini: ProviderSettings,
    #[serde(default)]
    pub claude: ProviderSettings,
    #[serde(default)]
    pub project: ProjectContext,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            openai: ProviderSettings::default(),
            gemini: ProviderSettings::default(),
            claude: ProviderSettings::default(),
            project: ProjectContext::default(),
        }
    }
}

/// Provider credentials submitted from the settings form. Providers left as
/// `None` keep their current settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiConfigUpdate {
    pub provider: String,
    #[serde(default)]
    pub openai: Option<ProviderSettings>,
    #[serde(default)]
    pub gemini: Option<ProviderSettings>,
    #[serde(default)]
    pub claude: Option<ProviderSettings>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConfigStatus {
    pub is_valid: bool,
    pub has_api_key: bool,
    pub has_project_context: bool,
    pub provider: String,
}

impl BackendConfig {
    /// Active provider name; an empty value falls back to the default.
    pub fn active_provider(&self) -> &str {
        if self.provider.trim().is_empty() {
            DEFAULT_PROVIDER
        } else {
            self.provider.as_str()
        }
    }

    pub fn provider_settings(&self, provider: &str) -> Option<&ProviderSettings> {
        match provider {
            "openai" => Some(&self.openai),
            "gemini" => Some(&self.gemini),
            "claude" => Some(&self.claude),
            _ => None,
        }
    }

    /// Whether `provider` has everything it needs to make calls.
    /// Gemini additionally requires a base URL.
    pub fn validate_api_key(&self, provider: &str) -> bool {
        match self.provider_settings(provider) {
            Some(settings) if provider == "gemini" => {
                !settings.key.is_empty() && !settings.url.is_empty()
            }
            Some(settings) => !settings.key.is_empty(),
            None => false,
        }
    }

    pub fn apply_api_update(&mut self, update: ApiConfigUpdate) {
        self.provider = update.provider;
        if let Some(openai) = update.openai {
            self.openai = openai;
        }
        if let Some(gemini) = update.gemini {
            self.gemini = gemini;
        }
        if let Some(claude) = update.claude {
            self.claude = claude;
        }
    }

    pub fn apply_project(&mut self, project: &ProjectContext) {
        self.project = project.trimmed();
    }
}

/// Decide whether a requirement can be submitted with this configuration.
pub fn check_configuration(config: &BackendConfig) -> ConfigStatus {
    let provider = config.active_provider().to_string();
    let has_api_key = config
        .provider_settings(&provider)
        .map(|s| !s.key.is_empty())
        .unwrap_or(false);
    let has_project_context = config.project.is_complete();

    ConfigStatus {
        is_valid: has_api_key && has_project_context,
        has_api_key,
        has_project_context,
        provider,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn configured() -> BackendConfig {
        serde_json::from_value(json!({
            "provider": "claude",
            "claude": {"key": "sk-ant", "url": ""},
            "project": {"developer": "Acme", "system": "Door controller", "client": "City"}
        }))
        .unwrap()
    }

    #[test]
    fn test_valid_configuration() {
        let status = check_configuration(&configured());
        assert!(status.is_valid);
        assert!(status.has_api_key);
        assert!(status.has_project_context);
        assert_eq!(status.provider, "claude");
    }

    #[test]
    fn test_missing_project_field_invalidates() {
        let mut config = configured();
        config.project.client = "   ".to_string();
        let status = check_configuration(&config);
        assert!(status.has_api_key);
        assert!(!status.has_project_context);
        assert!(!status.is_valid);
    }

    #[test]
    fn test_key_checked_for_active_provider_only() {
        let mut config = configured();
        config.provider = "openai".to_string();
        let status = check_configuration(&config);
        assert!(!status.has_api_key);
        assert!(!status.is_valid);
    }

    #[test]
    fn test_empty_provider_defaults_to_openai() {
        let config: BackendConfig = serde_json::from_value(json!({})).unwrap();
        assert_eq!(config.provider, "openai");
        let blank = BackendConfig {
            provider: String::new(),
            ..BackendConfig::default()
        };
        assert_eq!(check_configuration(&blank).provider, "openai");
    }

    #[test]
    fn test_gemini_requires_url() {
        let mut config = BackendConfig::default();
        config.gemini.key = "g".to_string();
        assert!(!config.validate_api_key("gemini"));
        config.gemini.url = "https://gemini.example".to_string();
        assert!(config.validate_api_key("gemini"));
        assert!(!config.validate_api_key("unknown"));
    }

    #[test]
    fn test_api_update_keeps_untouched_providers() {
        let mut config = configured();
        config.apply_api_update(ApiConfigUpdate {
            provider: "openai".to_string(),
            openai: Some(ProviderSettings {
                key: "sk".to_string(),
                url: String::new(),
            }),
            gemini: None,
            claude: None,
        });
        assert_eq!(config.provider, "openai");
        assert_eq!(config.openai.key, "sk");
        assert_eq!(config.claude.key, "sk-ant");
    }

    #[test]
    fn test_project_update_is_trimmed() {
        let mut config = BackendConfig::default();
        config.apply_project(&ProjectContext {
            developer: "  Acme ".to_string(),
            system: "Lift\n".to_string(),
            client: " Metro".to_string(),
        });
        assert_eq!(config.project.developer, "Acme");
        assert_eq!(config.project.system, "Lift");
        assert_eq!(config.project.client, "Metro");
    }
}
