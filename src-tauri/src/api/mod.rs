//! Typed client for the scoring backend's HTTP API.

pub mod client;
pub mod config;
pub mod types;

pub use client::{ApiClient, DEFAULT_BACKEND_URL};
pub use config::{check_configuration, ApiConfigUpdate, BackendConfig, ConfigStatus, ProjectContext, ProviderSettings};
pub use types::*;
