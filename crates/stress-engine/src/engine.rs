//! Scoring Engine Implementation

use crate::{StressBand, StressError};
use chrono::{DateTime, Utc};
use emotion::{EmotionLabel, EmotionVector};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

/// How one dominant emotion turns into a score.
///
/// `score = base + direction * 10 * confidence`, clamped to [0, 100].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoringRule {
    /// Score at zero confidence
    pub base: f64,
    /// +1 when confidence pushes stress up, -1 when it pulls it down
    pub direction: f64,
    /// Authoritative band for this emotion
    pub band: StressBand,
}

/// Confidence weight applied on top of the base score
const CONFIDENCE_SPAN: f64 = 10.0;

/// Look up the scoring rule for an emotion
pub fn rule_for(emotion: EmotionLabel) -> ScoringRule {
    let (base, direction, band) = match emotion {
        EmotionLabel::Angry => (90.0, 1.0, StressBand::High),
        EmotionLabel::Fearful => (85.0, 1.0, StressBand::High),
        EmotionLabel::Sad => (75.0, 1.0, StressBand::ModerateHigh),
        EmotionLabel::Disgusted => (70.0, 1.0, StressBand::Moderate),
        EmotionLabel::Surprised => (50.0, 1.0, StressBand::Moderate),
        EmotionLabel::Neutral => (40.0, 1.0, StressBand::LowModerate),
        // A confident smile lowers stress
        EmotionLabel::Happy => (20.0, -1.0, StressBand::Low),
    };
    ScoringRule { base, direction, band }
}

/// Stress score for a dominant emotion read with the given confidence
pub fn stress_score(emotion: EmotionLabel, confidence: f64) -> u8 {
    let rule = rule_for(emotion);
    let raw = rule.base + rule.direction * CONFIDENCE_SPAN * confidence;
    raw.clamp(0.0, 100.0).round() as u8
}

/// One scored frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreSample {
    /// Dominant emotion in the frame
    pub top_emotion: EmotionLabel,
    /// Classifier probability of the dominant emotion (0.0 to 1.0)
    pub confidence: f64,
    /// Stress score (0 to 100)
    pub stress_score: u8,
    /// Stress band from the scoring table
    pub stress_band: StressBand,
    /// When the sample was scored
    pub timestamp: DateTime<Utc>,
}

impl ScoreSample {
    /// Sample used when scoring was handed nothing to score
    fn neutral_fallback() -> Self {
        Self {
            top_emotion: EmotionLabel::Neutral,
            confidence: 0.0,
            stress_score: 0,
            stress_band: StressBand::Low,
            timestamp: Utc::now(),
        }
    }

    /// Confidence as a whole percentage
    pub fn confidence_percent(&self) -> u8 {
        (self.confidence * 100.0).round().clamp(0.0, 100.0) as u8
    }
}

/// Score one expression vector.
///
/// Fails with [`StressError::InvalidInput`] for an empty vector.
pub fn score(vector: &EmotionVector) -> Result<ScoreSample, StressError> {
    let (top_emotion, confidence) = vector
        .top()
        .ok_or_else(|| StressError::InvalidInput("empty emotion vector".to_string()))?;

    let rule = rule_for(top_emotion);
    let stress_score = stress_score(top_emotion, confidence);

    debug!(
        "Scored {} (conf={:.2}) -> {} [{}]",
        top_emotion, confidence, stress_score, rule.band
    );

    Ok(ScoreSample {
        top_emotion,
        confidence,
        stress_score,
        stress_band: rule.band,
        timestamp: Utc::now(),
    })
}

/// Score a vector the sampler vouched for.
///
/// An empty vector here is a broken caller: debug builds panic, release
/// builds log and fall back to a neutral, low-stress sample.
pub fn score_or_neutral(vector: &EmotionVector) -> ScoreSample {
    match score(vector) {
        Ok(sample) => sample,
        Err(e) => {
            error!("Scoring contract violated: {}", e);
            if cfg!(debug_assertions) {
                panic!("empty emotion vector reached the scoring engine");
            }
            ScoreSample::neutral_fallback()
        }
    }
}
