//! Presentation Adapter
//!
//! Thin, deterministic mapping from session aggregates to what the stress
//! panel draws: a color bucket, a bar fill, and recommendation cards.
//! Also the rotating motivation cards shown beside it.

mod motivation;
mod recommendation;
mod view;

pub use motivation::{
    card, featured, toggle_favorite, until_next_rotation, CardCategory, MotivationCard, CATALOG,
    ROTATION_PERIOD,
};
pub use recommendation::{recommend, RecommendationKey};
pub use view::{present, ColorBucket, StressView};
