//! Gesture inference with a confidence gate.

use crate::corpus::{ClassId, GestureCorpus};
use crate::feature::FeatureVector;
use crate::forest::RandomForest;

/// Fallback label when a predicted class id is missing from the registry.
/// Should not occur in normal operation.
const UNKNOWN_LABEL: &str = "Unknown";

/// Default minimum probability mass required to accept a prediction.
pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.7;

/// The outcome of classifying a single feature vector.
#[derive(Debug, Clone, PartialEq)]
pub enum Prediction {
    /// The classifier cleared the confidence gate; `name` is the registered
    /// class name.
    Gesture { name: String, confidence: f32 },
    /// The probability mass stayed at or below the gate. Treated as "no
    /// gesture", but the confidence is still surfaced for display.
    Rejected { confidence: f32 },
}

impl Prediction {
    pub fn confidence(&self) -> f32 {
        match self {
            Prediction::Gesture { confidence, .. } | Prediction::Rejected { confidence } => {
                *confidence
            }
        }
    }
}

/// Classifies `feature` against a fitted ensemble.
///
/// The confidence is the probability mass of the most probable class.
/// Raising `threshold` makes recognition stricter (fewer false accepts) at
/// the cost of recall.
pub fn predict(
    forest: &RandomForest,
    corpus: &GestureCorpus,
    feature: &FeatureVector,
    threshold: f32,
) -> Prediction {
    let (class, confidence) = forest.predict(feature.values());
    if confidence > threshold {
        let name = corpus
            .class_name(ClassId::from_u32(class))
            .unwrap_or(UNKNOWN_LABEL)
            .to_owned();
        Prediction::Gesture { name, confidence }
    } else {
        Prediction::Rejected { confidence }
    }
}
