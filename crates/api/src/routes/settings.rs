//! Settings Routes

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{Map, Value};
use storage::SettingsKey;
use tracing::info;

use crate::{ApiError, SharedState};

/// Every settings key with its effective value
pub async fn get_settings(State(state): State<SharedState>) -> Json<Map<String, Value>> {
    Json(state.settings.all())
}

/// Replace one settings entry
pub async fn put_setting(
    State(state): State<SharedState>,
    Path(key): Path<String>,
    Json(value): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let key: SettingsKey = key.parse()?;
    state.settings.set(key, value)?;
    info!("Updated {}", key.as_str());
    Ok(Json(state.settings.get(key)))
}
