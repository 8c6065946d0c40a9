//! Configuration for the garden tracker
//!
//! CLI arguments and environment variable handling using clap. A `.env`
//! file is loaded by `main` before parsing.

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::zone::{ZoneResolverConfig, DEFAULT_ZONE_LOOKUP_URL};

/// Personal garden tracker API
#[derive(Parser, Debug, Clone)]
#[command(name = "garden-tracker")]
#[command(about = "Garden tracking API with hardiness-zone planting windows and harvest projections")]
pub struct Args {
    /// Address to listen on
    #[arg(long, env = "LISTEN", default_value = "0.0.0.0:5000")]
    pub listen: SocketAddr,

    /// Enable development mode (insecure default JWT secret, in-memory store fallback)
    #[arg(long, env = "DEV_MODE", default_value = "false")]
    pub dev_mode: bool,

    /// MongoDB connection URI
    #[arg(long, env = "MONGODB_URI", default_value = "mongodb://localhost:27017")]
    pub mongodb_uri: String,

    /// MongoDB database name
    #[arg(long, env = "MONGODB_DB", default_value = "garden")]
    pub mongodb_db: String,

    /// JWT secret for token signing (required in production)
    #[arg(long, env = "JWT_SECRET")]
    pub jwt_secret: Option<String>,

    /// Access token expiry in seconds
    #[arg(long, env = "JWT_EXPIRY_SECONDS", default_value = "900")]
    pub jwt_expiry_seconds: u64,

    /// Refresh token expiry in seconds
    #[arg(long, env = "REFRESH_EXPIRY_SECONDS", default_value = "2592000")]
    pub refresh_expiry_seconds: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Emit logs as JSON lines
    #[arg(long, env = "LOG_JSON", default_value = "false")]
    pub log_json: bool,

    /// Planting calendar JSON file
    #[arg(long, env = "CALENDAR_PATH", default_value = "data/planting_calendar.json")]
    pub calendar_path: PathBuf,

    /// Base URL of the ZIP → hardiness zone service
    #[arg(long, env = "ZONE_LOOKUP_URL", default_value = DEFAULT_ZONE_LOOKUP_URL)]
    pub zone_lookup_url: String,

    /// Zone lookup timeout in milliseconds
    #[arg(long, env = "ZONE_LOOKUP_TIMEOUT_MS", default_value = "5000")]
    pub zone_lookup_timeout_ms: u64,
}

impl Args {
    /// Effective JWT secret (insecure default only in dev mode)
    pub fn jwt_secret(&self) -> Option<String> {
        match (&self.jwt_secret, self.dev_mode) {
            (Some(secret), _) => Some(secret.clone()),
            (None, true) => Some("dev-only-insecure-secret".to_string()),
            (None, false) => None,
        }
    }

    pub fn zone_resolver_config(&self) -> ZoneResolverConfig {
        ZoneResolverConfig {
            base_url: self.zone_lookup_url.clone(),
            request_timeout: Duration::from_millis(self.zone_lookup_timeout_ms),
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if !self.dev_mode && self.jwt_secret.as_deref().map_or(true, str::is_empty) {
            return Err("JWT_SECRET is required in production mode".to_string());
        }

        if self.zone_lookup_timeout_ms == 0 {
            return Err("ZONE_LOOKUP_TIMEOUT_MS must be greater than zero".to_string());
        }

        if self.jwt_expiry_seconds == 0 || self.refresh_expiry_seconds == 0 {
            return Err("Token expiry must be greater than zero".to_string());
        }

        if self.jwt_expiry_seconds > self.refresh_expiry_seconds {
            return Err(
                "JWT_EXPIRY_SECONDS must not exceed REFRESH_EXPIRY_SECONDS".to_string(),
            );
        }

        if !self.zone_lookup_url.starts_with("http://") && !self.zone_lookup_url.starts_with("https://") {
            return Err("ZONE_LOOKUP_URL must be an http(s) URL".to_string());
        }

        Ok(())
    }
}
