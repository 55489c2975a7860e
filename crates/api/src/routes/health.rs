//! Health and Metrics Routes

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::SharedState;

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: i64,
    pub version: String,
    pub uptime_seconds: u64,
    pub components: ComponentStatus,
}

#[derive(Debug, Serialize)]
pub struct ComponentStatus {
    pub sampler: ComponentHealth,
    pub chat: ComponentHealth,
    pub storage: ComponentHealth,
}

#[derive(Debug, Serialize)]
pub struct ComponentHealth {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ComponentHealth {
    fn new(status: &str, detail: Option<String>) -> Self {
        Self {
            status: status.to_string(),
            detail,
        }
    }
}

/// Health check handler
pub async fn get_health(State(state): State<SharedState>) -> Json<HealthResponse> {
    let stats = state.context.snapshot().await;
    let sampler = if state.is_sampling().await {
        ComponentHealth::new("running", Some(format!("{} samples this session", stats.sample_count)))
    } else {
        ComponentHealth::new("stopped", None)
    };
    let chat = if state.chat_configured {
        ComponentHealth::new("ok", None)
    } else {
        ComponentHealth::new("listening-only", Some("no API key configured".to_string()))
    };

    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now().timestamp(),
        version: state.version.clone(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        components: ComponentStatus {
            sampler,
            chat,
            storage: ComponentHealth::new("ok", Some(state.settings.path().display().to_string())),
        },
    })
}

/// Prometheus exposition
pub async fn get_metrics(State(state): State<SharedState>) -> Response {
    match &state.metrics {
        Some(handle) => handle.render().into_response(),
        None => (StatusCode::NOT_FOUND, "metrics recorder not installed").into_response(),
    }
}
