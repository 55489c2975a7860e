//! Stress Routes

use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use emotion::{EmotionError, EmotionVector};
use presentation::{present, StressView};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;
use uuid::Uuid;

use crate::{ApiError, SharedState};

/// Stress panel plus session bookkeeping
#[derive(Debug, Serialize)]
pub struct StressResponse {
    #[serde(flatten)]
    pub view: StressView,
    pub session_id: Uuid,
    /// Seconds since the session started
    pub session_seconds: i64,
    /// Whether the camera is being sampled
    pub sampling: bool,
}

async fn stress_response(state: &SharedState) -> StressResponse {
    let stats = state.context.snapshot().await;
    StressResponse {
        view: present(&stats),
        session_id: stats.session_id,
        session_seconds: stats.elapsed(Utc::now()).num_seconds(),
        sampling: state.is_sampling().await,
    }
}

/// Current stress panel
pub async fn get_stress(State(state): State<SharedState>) -> Json<StressResponse> {
    Json(stress_response(&state).await)
}

/// Start a fresh session without touching the camera
pub async fn reset_stress(State(state): State<SharedState>) -> Json<StressResponse> {
    state.context.reset().await;
    Json(stress_response(&state).await)
}

#[derive(Debug, Serialize)]
pub struct PushResponse {
    pub accepted: bool,
    pub labels: usize,
}

/// What the browser's expression network reported for one frame
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ExpressionPayload {
    /// Raw network output in classifier channel order
    Logits { logits: Vec<f32> },
    /// Probability per label name
    Probabilities(BTreeMap<String, f64>),
}

impl ExpressionPayload {
    pub fn into_vector(self) -> Result<EmotionVector, EmotionError> {
        match self {
            ExpressionPayload::Logits { logits } => EmotionVector::from_logits(&logits),
            ExpressionPayload::Probabilities(raw) => EmotionVector::try_from(raw),
        }
    }
}

/// Expression result from the browser, consumed by the next tick
pub async fn push_expressions(
    State(state): State<SharedState>,
    Json(payload): Json<ExpressionPayload>,
) -> Result<(StatusCode, Json<PushResponse>), ApiError> {
    let vector = payload.into_vector()?;
    let labels = vector.len();
    state.expressions.push(vector)?;
    debug!("Expression pushed with {} labels", labels);

    Ok((
        StatusCode::ACCEPTED,
        Json(PushResponse {
            accepted: true,
            labels,
        }),
    ))
}
