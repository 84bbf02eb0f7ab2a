//! Premium Desk Application Shell
//!
//! Wires the premium calculator and the payment sync queue to their
//! production adapters and exposes them as one [`PremiumDesk`].
//!
//! # Modules
//!
//! - `config`: `AppConfig`, loaded from `APP_*` environment variables
//! - `telemetry`: tracing subscriber setup
//! - `app`: the `PremiumDesk` facade
//! - `error`: application error type

pub mod app;
pub mod config;
pub mod error;
pub mod telemetry;

pub use app::{HttpPremiumDesk, PremiumDesk};
pub use config::AppConfig;
pub use error::AppError;
