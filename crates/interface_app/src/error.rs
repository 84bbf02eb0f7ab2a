//! Application error type

use thiserror::Error;

use core_kernel::PortError;
use domain_billing::SyncError;
use domain_policy::PolicyError;
use infra_store::StoreError;

/// Errors surfaced by [`crate::PremiumDesk`] and its setup
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Storage setup failed: {0}")]
    Storage(#[from] StoreError),

    #[error(transparent)]
    Port(#[from] PortError),

    #[error(transparent)]
    Policy(#[from] PolicyError),

    #[error(transparent)]
    Sync(#[from] SyncError),
}

impl AppError {
    pub fn invalid_config(message: impl Into<String>) -> Self {
        AppError::InvalidConfig(message.into())
    }
}
