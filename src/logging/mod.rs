//! Tracing subscriber setup
//!
//! `RUST_LOG` takes precedence over the configured level. JSON output is
//! meant for log shippers; the default is the human-readable formatter.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::types::GardenError;

/// Filter used when `RUST_LOG` is unset
pub fn default_filter(log_level: &str) -> String {
    format!("garden_tracker={},info", log_level)
}

/// Install the global subscriber
pub fn init_tracing(log_level: &str, json: bool) -> Result<(), GardenError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(log_level).into());

    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| fmt::layer().json()))
        .with((!json).then(fmt::layer))
        .try_init()
        .map_err(|e| GardenError::Config(format!("Failed to install tracing subscriber: {e}")))
}
