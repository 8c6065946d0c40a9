//! Hardiness zone resolution
//!
//! Resolves a US ZIP code to a USDA plant hardiness zone label (e.g. "7a")
//! through an external lookup service: `GET {base_url}/{zip}.json` answering
//! with a JSON body carrying a `zone` string.
//!
//! One attempt per call, bounded by the client timeout. Retrying is left to
//! the caller.

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

use crate::types::{GardenError, Result};

/// Default public ZIP → zone service
pub const DEFAULT_ZONE_LOOKUP_URL: &str = "https://phzmapi.org";

/// Anything that can turn a ZIP code into a zone label
#[async_trait]
pub trait ZoneLookup: Send + Sync {
    async fn resolve_zone(&self, zip_code: &str) -> Result<String>;
}

/// Configuration for the HTTP zone resolver
#[derive(Debug, Clone)]
pub struct ZoneResolverConfig {
    /// Base URL of the lookup service, without trailing slash
    pub base_url: String,
    /// Timeout for the whole request (default: 5 seconds)
    pub request_timeout: Duration,
}

impl Default for ZoneResolverConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_ZONE_LOOKUP_URL.to_string(),
            request_timeout: Duration::from_secs(5),
        }
    }
}

/// Zone resolver backed by the external HTTP service
pub struct ZoneResolver {
    config: ZoneResolverConfig,
    http_client: reqwest::Client,
}

impl ZoneResolver {
    pub fn new() -> Self {
        Self::with_config(ZoneResolverConfig::default())
    }

    pub fn with_config(config: ZoneResolverConfig) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(concat!("garden-tracker/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_default();

        Self {
            config,
            http_client,
        }
    }

    fn lookup_url(&self, zip_code: &str) -> String {
        format!(
            "{}/{}.json",
            self.config.base_url.trim_end_matches('/'),
            zip_code
        )
    }
}

impl Default for ZoneResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ZoneLookup for ZoneResolver {
    async fn resolve_zone(&self, zip_code: &str) -> Result<String> {
        validate_zip(zip_code)?;

        let url = self.lookup_url(zip_code);
        debug!(zip = %zip_code, url = %url, "Resolving hardiness zone");

        let response = self.http_client.get(&url).send().await.map_err(|e| {
            warn!(zip = %zip_code, error = %e, "Zone lookup request failed");
            if e.is_timeout() {
                GardenError::UpstreamUnavailable("request timed out".into())
            } else {
                GardenError::UpstreamUnavailable(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!(zip = %zip_code, status = %status, "Zone lookup returned non-success status");
            return Err(GardenError::UpstreamUnavailable(format!(
                "lookup service returned {}",
                status
            )));
        }

        let body: Value = response.json().await.map_err(|e| {
            GardenError::UpstreamUnavailable(format!("malformed response body: {}", e))
        })?;

        zone_from_body(zip_code, &body)
    }
}

/// Check that a ZIP code is exactly five ASCII digits
pub fn validate_zip(zip_code: &str) -> Result<()> {
    if zip_code.len() == 5 && zip_code.bytes().all(|b| b.is_ascii_digit()) {
        Ok(())
    } else {
        Err(GardenError::InvalidInput(
            "ZIP code must be exactly 5 digits".into(),
        ))
    }
}

/// Extract a non-empty zone label from a lookup response body
pub fn zone_from_body(zip_code: &str, body: &Value) -> Result<String> {
    body.get("zone")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|zone| !zone.is_empty())
        .map(str::to_string)
        .ok_or_else(|| GardenError::ZoneNotFound(zip_code.to_string()))
}
