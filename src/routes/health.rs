//! Liveness and build information
//!
//! - /        - Banner
//! - /health  - Always 200 while the process is serving; reports the loaded
//!              calendar and which store backend is active
//! - /version - Build metadata captured by build.rs

use hyper::Response;
use serde::Serialize;

use crate::routes::response::{ok_json, BoxBody, MessageResponse};
use crate::server::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub healthy: bool,
    pub version: &'static str,
    /// Uptime in seconds
    pub uptime: u64,
    pub timestamp: String,
    /// `mongodb` or `memory`
    pub store: &'static str,
    /// Plants in the planting calendar
    pub calendar_plants: usize,
    pub dev_mode: bool,
}

#[derive(Serialize)]
pub struct VersionResponse {
    pub version: &'static str,
    pub commit: &'static str,
    pub commit_full: &'static str,
    pub build_time: &'static str,
    pub service: &'static str,
}

pub fn index() -> Response<BoxBody> {
    ok_json(&MessageResponse::new("Garden Tracker API is live!"))
}

fn build_health_response(state: &AppState) -> HealthResponse {
    HealthResponse {
        healthy: true,
        version: env!("CARGO_PKG_VERSION"),
        uptime: state.started_at.elapsed().as_secs(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        store: state.portfolio.store().backend(),
        calendar_plants: state.portfolio.calendar().plant_count(),
        dev_mode: state.args.dev_mode,
    }
}

pub fn health_check(state: &AppState) -> Response<BoxBody> {
    ok_json(&build_health_response(state))
}

pub fn version_info() -> Response<BoxBody> {
    ok_json(&VersionResponse {
        version: env!("CARGO_PKG_VERSION"),
        commit: option_env!("GIT_COMMIT_SHORT").unwrap_or("unknown"),
        commit_full: option_env!("GIT_COMMIT_FULL").unwrap_or("unknown"),
        build_time: option_env!("BUILD_TIMESTAMP").unwrap_or("unknown"),
        service: "garden-tracker",
    })
}
