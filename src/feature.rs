//! Wrist-relative feature extraction.
//!
//! Raw landmark positions depend on where the hand sits in the camera frame.
//! [`extract`] removes that translation by expressing every X/Y coordinate
//! relative to the wrist, producing a fixed-length [`FeatureVector`] suitable
//! for classification. Rotation and scale are deliberately left in: a tilted
//! or closer hand is a different pose.

use serde::{Deserialize, Serialize};

use crate::landmark::{LandmarkIdx, Landmarks, NUM_LANDMARKS};

/// Number of values in a [`FeatureVector`] (21 landmarks × 3 coordinates).
pub const FEATURE_LEN: usize = NUM_LANDMARKS * 3;

/// A serialized feature vector had the wrong number of values.
#[derive(Debug, Clone, thiserror::Error)]
#[error("expected {} feature values, got {0}", FEATURE_LEN)]
pub struct FeatureLenError(pub usize);

/// A fixed-length, translation-invariant encoding of a single hand pose.
///
/// Always holds exactly [`FEATURE_LEN`] values, interleaved as
/// `[x0, y0, z0, x1, y1, z1, ...]` with X/Y relative to the wrist and Z
/// passed through unmodified. Produced by [`extract`]; deserialization
/// validates the length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f32>", into = "Vec<f32>")]
pub struct FeatureVector {
    values: Box<[f32]>,
}

impl FeatureVector {
    pub fn values(&self) -> &[f32] {
        &self.values
    }
}

impl TryFrom<Vec<f32>> for FeatureVector {
    type Error = FeatureLenError;

    fn try_from(values: Vec<f32>) -> Result<Self, FeatureLenError> {
        if values.len() != FEATURE_LEN {
            return Err(FeatureLenError(values.len()));
        }
        Ok(Self {
            values: values.into_boxed_slice(),
        })
    }
}

impl From<FeatureVector> for Vec<f32> {
    fn from(feature: FeatureVector) -> Vec<f32> {
        feature.values.into_vec()
    }
}

/// Converts a raw hand detection into a wrist-relative [`FeatureVector`].
///
/// Returns [`None`] when no hand was detected or when the detection carries
/// fewer than [`NUM_LANDMARKS`] landmarks; both count as "no usable hand".
/// When the detection carries *more* (several hands concatenated upstream),
/// only the first [`NUM_LANDMARKS`] are used — recognition is single-hand.
pub fn extract(detection: Option<&Landmarks>) -> Option<FeatureVector> {
    let landmarks = detection?;
    if landmarks.len() < NUM_LANDMARKS {
        return None;
    }

    let wrist = landmarks.positions()[usize::from(LandmarkIdx::Wrist)];
    let mut values = vec![0.0; FEATURE_LEN];
    for (i, pos) in landmarks.positions()[..NUM_LANDMARKS].iter().enumerate() {
        values[i * 3] = pos[0] - wrist[0];
        values[i * 3 + 1] = pos[1] - wrist[1];
        values[i * 3 + 2] = pos[2];
    }

    Some(FeatureVector {
        values: values.into_boxed_slice(),
    })
}
