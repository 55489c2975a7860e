//! Chat Route

use axum::{extract::State, Json};
use companion::ChatReply;
use serde::Deserialize;

use crate::{ApiError, SharedState};

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
}

/// One companion reply. Upstream trouble comes back as a fallback reply,
/// never as an error.
pub async fn post_chat(
    State(state): State<SharedState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatReply>, ApiError> {
    let reply = state.companion.respond(&request.message).await?;
    Ok(Json(reply))
}
