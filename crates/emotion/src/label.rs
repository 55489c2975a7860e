//! Emotion vocabulary

use crate::EmotionError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Expression labels produced by the classifier.
///
/// Declaration order is the severity order (most stressful first); the
/// derived `Ord` is relied on for tie-breaking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmotionLabel {
    Angry,
    Fearful,
    Sad,
    Disgusted,
    Surprised,
    Neutral,
    Happy,
}

impl EmotionLabel {
    /// All labels, most stressful first
    pub const SEVERITY_ORDER: [EmotionLabel; 7] = [
        EmotionLabel::Angry,
        EmotionLabel::Fearful,
        EmotionLabel::Sad,
        EmotionLabel::Disgusted,
        EmotionLabel::Surprised,
        EmotionLabel::Neutral,
        EmotionLabel::Happy,
    ];

    /// Channel order of the expression network's output layer
    pub const CLASSIFIER_ORDER: [EmotionLabel; 7] = [
        EmotionLabel::Neutral,
        EmotionLabel::Happy,
        EmotionLabel::Sad,
        EmotionLabel::Angry,
        EmotionLabel::Fearful,
        EmotionLabel::Disgusted,
        EmotionLabel::Surprised,
    ];

    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            EmotionLabel::Angry => "angry",
            EmotionLabel::Fearful => "fearful",
            EmotionLabel::Sad => "sad",
            EmotionLabel::Disgusted => "disgusted",
            EmotionLabel::Surprised => "surprised",
            EmotionLabel::Neutral => "neutral",
            EmotionLabel::Happy => "happy",
        }
    }

    /// Emoji shown next to the detected emotion
    pub fn emoji(&self) -> &'static str {
        match self {
            EmotionLabel::Angry => "😠",
            EmotionLabel::Fearful => "😰",
            EmotionLabel::Sad => "😢",
            EmotionLabel::Disgusted => "🤢",
            EmotionLabel::Surprised => "😮",
            EmotionLabel::Neutral => "😐",
            EmotionLabel::Happy => "😊",
        }
    }
}

impl fmt::Display for EmotionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EmotionLabel {
    type Err = EmotionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::SEVERITY_ORDER
            .into_iter()
            .find(|label| label.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| EmotionError::UnknownLabel(s.to_string()))
    }
}
