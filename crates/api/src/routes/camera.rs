//! Camera Routes
//!
//! The browser owns the camera; these only switch sampling on and off.

use axum::{extract::State, Json};
use frame_sampler::SamplerReport;
use serde::Serialize;

use crate::{ApiError, SharedState};

#[derive(Debug, Serialize)]
pub struct CameraStatus {
    pub running: bool,
    /// Set when this call started sampling
    pub started: bool,
    /// Summary of the run this call ended
    pub report: Option<SamplerReport>,
}

pub async fn start_camera(State(state): State<SharedState>) -> Result<Json<CameraStatus>, ApiError> {
    let started = state.start_sampling().await?;
    Ok(Json(CameraStatus {
        running: true,
        started,
        report: None,
    }))
}

pub async fn stop_camera(State(state): State<SharedState>) -> Result<Json<CameraStatus>, ApiError> {
    let report = state.stop_sampling().await?;
    Ok(Json(CameraStatus {
        running: false,
        started: false,
        report,
    }))
}
