//! Service status endpoint (GET /)
//!
//! Reports the active processing parameters so clients can see how their
//! audio will be trimmed before uploading.

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use silencer_common::{AudioFormat, OutputFormat, ProcessingParameters};

use crate::AppState;

/// Human-readable service name
pub const SERVICE_NAME: &str = "Audio Silence Cutter";

/// Build identification captured by build.rs
#[derive(Debug, Serialize)]
pub struct BuildInfo {
    pub git_hash: &'static str,
    pub timestamp: &'static str,
    pub profile: &'static str,
}

impl BuildInfo {
    pub fn current() -> Self {
        Self {
            git_hash: env!("GIT_HASH"),
            timestamp: env!("BUILD_TIMESTAMP"),
            profile: env!("BUILD_PROFILE"),
        }
    }
}

/// Upload limits as seen by clients
#[derive(Debug, Serialize)]
pub struct LimitsInfo {
    pub max_file_size_bytes: usize,
    pub max_request_size_bytes: usize,
}

/// GET / response
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    pub build: BuildInfo,
    pub parameters: ProcessingParameters,
    pub accepted_formats: Vec<&'static str>,
    pub output_formats: Vec<&'static str>,
    pub limits: LimitsInfo,
}

/// GET /
pub async fn service_status(State(state): State<AppState>) -> Json<StatusResponse> {
    let limits = &state.config.limits;

    Json(StatusResponse {
        status: "running",
        service: SERVICE_NAME,
        version: env!("CARGO_PKG_VERSION"),
        build: BuildInfo::current(),
        parameters: state.config.processing,
        accepted_formats: AudioFormat::ALL.iter().map(|f| f.extension()).collect(),
        output_formats: vec![OutputFormat::Wav.name(), OutputFormat::WavF32.name()],
        limits: LimitsInfo {
            max_file_size_bytes: limits.max_file_size_bytes,
            max_request_size_bytes: limits.max_request_size_bytes,
        },
    })
}

/// Build status routes
pub fn status_routes() -> Router<AppState> {
    Router::new().route("/", get(service_status))
}
