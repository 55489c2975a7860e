//! Per-frame expression probabilities

use crate::{EmotionError, EmotionLabel};
use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Probability of each expression in one frame.
///
/// Values lie in [0, 1] but need not sum to exactly 1; that depends on the
/// classifier. Labels the classifier did not report are simply absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, f64>", into = "BTreeMap<String, f64>")]
pub struct EmotionVector {
    probabilities: BTreeMap<EmotionLabel, f64>,
}

impl EmotionVector {
    /// Create an empty vector
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, label: EmotionLabel, probability: f64) -> Result<Self, EmotionError> {
        self.insert(label, probability)?;
        Ok(self)
    }

    /// Set the probability of one label
    pub fn insert(&mut self, label: EmotionLabel, probability: f64) -> Result<(), EmotionError> {
        if !probability.is_finite() || !(0.0..=1.0).contains(&probability) {
            return Err(EmotionError::InvalidProbability {
                label,
                value: probability,
            });
        }
        self.probabilities.insert(label, probability);
        Ok(())
    }

    /// Build from raw expression-network logits (classifier channel order).
    pub fn from_logits(logits: &[f32]) -> Result<Self, EmotionError> {
        let logits = ArrayView1::from(logits);
        let expected = EmotionLabel::CLASSIFIER_ORDER.len();
        if logits.len() != expected {
            return Err(EmotionError::Shape {
                expected,
                actual: logits.len(),
            });
        }
        if logits.iter().any(|v| !v.is_finite()) {
            return Err(EmotionError::Classifier("non-finite logit".to_string()));
        }

        // Softmax, shifted by the max for stability
        let max = logits.fold(f32::NEG_INFINITY, |acc, &v| acc.max(v));
        let exp = logits.mapv(|v| (v - max).exp());
        let sum = exp.sum();

        let mut vector = Self::new();
        for (label, value) in EmotionLabel::CLASSIFIER_ORDER.iter().zip(exp.iter()) {
            let p = (f64::from(*value) / f64::from(sum)).clamp(0.0, 1.0);
            vector.insert(*label, p)?;
        }
        Ok(vector)
    }

    /// Probability of a label, if reported
    pub fn get(&self, label: EmotionLabel) -> Option<f64> {
        self.probabilities.get(&label).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.probabilities.is_empty()
    }

    pub fn len(&self) -> usize {
        self.probabilities.len()
    }

    /// Iterate in severity order
    pub fn iter(&self) -> impl Iterator<Item = (EmotionLabel, f64)> + '_ {
        self.probabilities.iter().map(|(l, p)| (*l, *p))
    }

    /// Most probable label and its probability.
    ///
    /// Ties go to the more stressful label.
    pub fn top(&self) -> Option<(EmotionLabel, f64)> {
        self.iter().fold(None, |best, (label, p)| match best {
            Some((_, best_p)) if p <= best_p => best,
            _ => Some((label, p)),
        })
    }
}

impl TryFrom<BTreeMap<String, f64>> for EmotionVector {
    type Error = EmotionError;

    fn try_from(raw: BTreeMap<String, f64>) -> Result<Self, Self::Error> {
        let mut vector = Self::new();
        for (name, probability) in raw {
            vector.insert(name.parse()?, probability)?;
        }
        Ok(vector)
    }
}

impl From<EmotionVector> for BTreeMap<String, f64> {
    fn from(vector: EmotionVector) -> Self {
        vector
            .probabilities
            .into_iter()
            .map(|(label, p)| (label.as_str().to_string(), p))
            .collect()
    }
}
