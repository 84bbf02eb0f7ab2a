//! Premium Desk - Sync Agent Binary
//!
//! Replays payments that were settled by a gateway but never confirmed with
//! the policy backend, then exits.
//!
//! # Usage
//!
//! ```bash
//! APP_API_BASE_URL=https://backend.example.com APP_API_TOKEN=... cargo run --bin sync-agent
//! ```
//!
//! # Environment Variables
//!
//! * `APP_API_BASE_URL` - Policy backend (default: http://localhost:8000)
//! * `APP_API_TOKEN` - Bearer token for payment confirmation
//! * `APP_REQUEST_TIMEOUT_SECS` - Per-request timeout (default: 30)
//! * `APP_STORAGE_DIR` - Queue storage directory (default: ./data)
//! * `APP_TIMEZONE` - Local timezone (default: Asia/Dhaka)
//! * `APP_SPECIAL_PROJECTS` - Comma-separated rate-table projects
//! * `APP_LOG_LEVEL` - trace, debug, info, warn, error (default: info)
//! * `APP_LOG_JSON` - Emit JSON log lines (default: false)

use anyhow::Context;
use interface_app::{telemetry::init_tracing, AppConfig, HttpPremiumDesk};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env().context("loading configuration")?;
    init_tracing(&config.log_level, config.log_json);

    tracing::info!(base_url = %config.api_base_url, "Starting sync agent");

    let desk = HttpPremiumDesk::from_config(&config)
        .await
        .context("building premium desk")?;

    let report = desk.sync_on_start().await.context("replaying payment queue")?;

    tracing::info!(
        confirmed = report.confirmed.len(),
        deferred = report.deferred.len(),
        rejected = report.rejected.len(),
        removal_failed = report.removal_failed.len(),
        "Sync complete"
    );
    for tx in &report.rejected {
        tracing::warn!(transaction_no = %tx, "Backend rejected queued payment; it stays queued");
    }

    Ok(())
}
