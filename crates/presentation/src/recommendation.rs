//! Recommendation cards

use emotion::EmotionLabel;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use stress_engine::ScoreSample;

/// Content tags the dashboard turns into cards
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecommendationKey {
    Breathing,
    MoodLift,
    Grounding,
    Meditation,
    Chat,
    Distraction,
    Affirmation,
}

impl RecommendationKey {
    /// Card title
    pub fn title(&self) -> &'static str {
        match self {
            RecommendationKey::Breathing => "Feeling Sad?",
            RecommendationKey::MoodLift => "Lift Your Mood",
            RecommendationKey::Grounding => "Feeling Anxious?",
            RecommendationKey::Meditation => "Meditation",
            RecommendationKey::Chat => "Chat with SIFRA",
            RecommendationKey::Distraction => "Laugh & Relax",
            RecommendationKey::Affirmation => "You're Doing Great!",
        }
    }

    /// Card body
    pub fn body(&self) -> &'static str {
        match self {
            RecommendationKey::Breathing => {
                "Try a breathing exercise: inhale for 4 seconds, hold for 4, exhale for 6."
            }
            RecommendationKey::MoodLift => "Watch something fun to lift your mood.",
            RecommendationKey::Grounding => {
                "Try grounding techniques: the 5-4-3-2-1 sensory exercise or meditation."
            }
            RecommendationKey::Meditation => {
                "A 5-10 minute guided meditation can reduce stress significantly."
            }
            RecommendationKey::Chat => "Talk to your AI companion about what's bothering you.",
            RecommendationKey::Distraction => "Watch some funny videos to boost your mood instantly.",
            RecommendationKey::Affirmation => {
                "Keep up this positive energy and maintain your wellbeing habits."
            }
        }
    }
}

/// Select recommendation tags for the latest sample.
///
/// Rules are independent and their tags are unioned.
pub fn recommend(current: Option<&ScoreSample>) -> BTreeSet<RecommendationKey> {
    use RecommendationKey::*;

    let mut keys = BTreeSet::new();
    let Some(sample) = current else {
        // Nothing detected yet
        keys.extend([Meditation, Chat, Distraction]);
        return keys;
    };

    match sample.top_emotion {
        EmotionLabel::Sad => keys.extend([Breathing, MoodLift]),
        EmotionLabel::Fearful => keys.extend([Grounding, Meditation]),
        _ => {}
    }

    if sample.stress_score > 70 {
        keys.extend([Meditation, Chat, Distraction]);
    }
    if sample.stress_score < 30 {
        keys.insert(Affirmation);
    }

    keys
}
