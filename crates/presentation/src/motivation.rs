//! Motivation cards

use serde::Serialize;
use std::time::Duration;

/// How long each card stays featured
pub const ROTATION_PERIOD: Duration = Duration::from_secs(8);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CardCategory {
    SelfCompassion,
    Growth,
    Mindfulness,
    Positivity,
}

/// One motivational message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MotivationCard {
    /// Stable id; favourites are stored by id
    pub id: u32,
    pub title: &'static str,
    pub text: &'static str,
    pub category: CardCategory,
    pub emoji: &'static str,
}

const fn entry(
    id: u32,
    title: &'static str,
    text: &'static str,
    category: CardCategory,
    emoji: &'static str,
) -> MotivationCard {
    MotivationCard {
        id,
        title,
        text,
        category,
        emoji,
    }
}

/// Cards in rotation order
pub static CATALOG: [MotivationCard; 8] = [
    entry(
        1,
        "You are doing enough",
        "Take a breath and be gentle with yourself. Progress isn't always linear.",
        CardCategory::SelfCompassion,
        "💙",
    ),
    entry(
        2,
        "Be kind to you",
        "You deserve patience and care. Treat yourself like someone you love.",
        CardCategory::SelfCompassion,
        "🤗",
    ),
    entry(
        3,
        "Small steps matter",
        "A single small action can change your day. Celebrate tiny victories.",
        CardCategory::Growth,
        "👣",
    ),
    entry(
        4,
        "Growth through challenges",
        "Every challenge you face builds resilience. You're stronger than you know.",
        CardCategory::Growth,
        "🌱",
    ),
    entry(
        5,
        "Present moment peace",
        "This moment is all we truly have. Breathe into the now.",
        CardCategory::Mindfulness,
        "🧘",
    ),
    entry(
        6,
        "Gratitude practice",
        "Even in difficult times, there are things to be grateful for. Notice them.",
        CardCategory::Mindfulness,
        "🙏",
    ),
    entry(
        7,
        "Hope is powerful",
        "Tomorrow brings new possibilities. This difficult moment will pass.",
        CardCategory::Positivity,
        "✨",
    ),
    entry(
        8,
        "You are not alone",
        "Many people care about you and want to support you. Reach out when needed.",
        CardCategory::Positivity,
        "🤝",
    ),
];

/// Look up a card by id
pub fn card(id: u32) -> Option<&'static MotivationCard> {
    CATALOG.iter().find(|c| c.id == id)
}

/// Card featured after `elapsed` of rotation
pub fn featured(elapsed: Duration) -> &'static MotivationCard {
    let slot = elapsed.as_millis() / ROTATION_PERIOD.as_millis();
    &CATALOG[(slot % CATALOG.len() as u128) as usize]
}

/// Time left before the featured card changes
pub fn until_next_rotation(elapsed: Duration) -> Duration {
    let period = ROTATION_PERIOD.as_millis();
    let left = period - elapsed.as_millis() % period;
    Duration::from_millis(left as u64)
}

/// Add `id` to the favourites, or remove it if already there.
///
/// Returns `None` for ids not in the catalog.
pub fn toggle_favorite(favorites: &[u32], id: u32) -> Option<Vec<u32>> {
    card(id)?;
    Some(if favorites.contains(&id) {
        favorites.iter().copied().filter(|f| *f != id).collect()
    } else {
        favorites.iter().copied().chain(std::iter::once(id)).collect()
    })
}
