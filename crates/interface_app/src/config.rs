//! Application configuration

use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use core_kernel::{ProjectCode, Timezone};
use infra_http::ApiClientConfig;
use infra_store::StoreConfig;

use crate::error::AppError;

/// Environment variable prefix, e.g. `APP_API_BASE_URL`
pub const ENV_PREFIX: &str = "APP";

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Policy backend base URL
    pub api_base_url: String,
    /// Bearer token for payment confirmation
    pub api_token: Option<String>,
    /// Whole-request timeout for backend calls
    pub request_timeout_secs: u64,
    /// Directory for the file-backed store
    pub storage_dir: PathBuf,
    /// IANA zone used for "today" in age calculations
    pub timezone: String,
    /// Comma-separated projects priced from the rate table
    pub special_projects: String,
    /// Log level
    pub log_level: String,
    /// Emit JSON log lines
    pub log_json: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8000".to_string(),
            api_token: None,
            request_timeout_secs: 30,
            storage_dir: PathBuf::from("./data"),
            timezone: "Asia/Dhaka".to_string(),
            special_projects: String::new(),
            log_level: "info".to_string(),
            log_json: false,
        }
    }
}

impl AppConfig {
    /// Loads configuration from `APP_*` environment variables
    pub fn from_env() -> Result<Self, AppError> {
        Self::load(config::Environment::with_prefix(ENV_PREFIX))
    }

    /// Loads configuration from an explicit variable map instead of the process environment
    pub fn from_vars(vars: HashMap<String, String>) -> Result<Self, AppError> {
        Self::load(config::Environment::with_prefix(ENV_PREFIX).source(Some(vars)))
    }

    fn load(environment: config::Environment) -> Result<Self, AppError> {
        let config: AppConfig = config::Config::builder()
            .add_source(environment)
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Checks values the type system cannot
    pub fn validate(&self) -> Result<(), AppError> {
        if !(self.api_base_url.starts_with("http://") || self.api_base_url.starts_with("https://")) {
            return Err(AppError::invalid_config(format!(
                "api_base_url must be an http(s) URL, got {:?}",
                self.api_base_url
            )));
        }
        if self.request_timeout_secs == 0 {
            return Err(AppError::invalid_config("request_timeout_secs must be positive"));
        }
        self.timezone()?;
        Ok(())
    }

    pub fn timezone(&self) -> Result<Timezone, AppError> {
        self.timezone
            .parse()
            .map_err(|e: String| AppError::invalid_config(format!("timezone: {e}")))
    }

    /// Parsed special projects; blank entries are skipped
    pub fn special_project_codes(&self) -> Vec<ProjectCode> {
        self.special_projects
            .split(',')
            .filter_map(|code| ProjectCode::new(code).ok())
            .collect()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn api_client_config(&self) -> ApiClientConfig {
        let config = ApiClientConfig::new(&self.api_base_url).timeout(self.request_timeout());
        match self.api_token.as_deref().filter(|t| !t.is_empty()) {
            Some(token) => config.token(token),
            None => config,
        }
    }

    pub fn store_config(&self) -> StoreConfig {
        StoreConfig::new(&self.storage_dir)
    }
}
