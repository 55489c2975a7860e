//! Motivation Routes

use axum::{
    extract::{Path, State},
    Json,
};
use presentation::{MotivationCard, CATALOG};
use serde::Serialize;
use storage::SettingsKey;
use tracing::info;

use crate::{ApiError, SharedState};

#[derive(Debug, Serialize)]
pub struct MotivationResponse {
    pub featured: &'static MotivationCard,
    /// Milliseconds until the featured card changes
    pub next_rotation_ms: u64,
    pub favorites: Vec<u32>,
    pub cards: &'static [MotivationCard],
}

#[derive(Debug, Serialize)]
pub struct FavoriteResponse {
    pub id: u32,
    pub favorite: bool,
    pub favorites: Vec<u32>,
}

/// The featured card, rotated on a fixed period since server start
pub async fn get_motivation(State(state): State<SharedState>) -> Json<MotivationResponse> {
    let elapsed = state.start_time.elapsed();
    Json(MotivationResponse {
        featured: presentation::featured(elapsed),
        next_rotation_ms: presentation::until_next_rotation(elapsed).as_millis() as u64,
        favorites: state.settings.get_as(SettingsKey::Favorites),
        cards: &CATALOG,
    })
}

/// Flip a card in or out of the favourites
pub async fn toggle_favorite(
    State(state): State<SharedState>,
    Path(id): Path<u32>,
) -> Result<Json<FavoriteResponse>, ApiError> {
    if presentation::card(id).is_none() {
        return Err(ApiError::NotFound(format!("No motivation card {}", id)));
    }

    let favorites = state
        .settings
        .update(SettingsKey::Favorites, |current: Vec<u32>| {
            presentation::toggle_favorite(&current, id).unwrap_or(current)
        })?;
    let favorite = favorites.contains(&id);
    info!("Card {} favourite: {}", id, favorite);

    Ok(Json(FavoriteResponse {
        id,
        favorite,
        favorites,
    }))
}
