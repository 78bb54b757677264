//! Long-lived gesture session tying corpus, classifier, and store together.
//!
//! A [`GestureSession`] exclusively owns the example corpus and the active
//! classifier. Frame acquisition and user input stay outside: the camera
//! loop feeds detections into [`GestureSession::on_frame`] and capture
//! signals into a [`Collector`], which keeps the whole lifecycle testable
//! without a camera.

use crate::classify::{self, Prediction, DEFAULT_CONFIDENCE_THRESHOLD};
use crate::corpus::{ClassId, GestureCorpus};
use crate::feature::{self, FeatureVector};
use crate::forest::RandomForest;
use crate::landmark::Landmarks;
use crate::store::{ModelStore, StoreError};
use crate::train::{self, TrainError, TrainingOptions};

/// Tunables for a [`GestureSession`].
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Minimum probability mass required to accept a prediction. Raising it
    /// makes recognition stricter at the cost of recall.
    pub confidence_threshold: f32,
    pub training: TrainingOptions,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            training: TrainingOptions::default(),
        }
    }
}

/// What the display loop should overlay on the current frame.
#[derive(Debug, Clone, PartialEq)]
pub enum DisplayHint {
    /// A gesture cleared the confidence gate.
    Gesture { name: String, confidence: f32 },
    /// A hand is visible but no learned gesture was confident enough.
    NoGesture { confidence: f32 },
    /// No usable hand in this frame.
    NoHand,
}

impl DisplayHint {
    /// Text to overlay, or [`None`] when there is nothing to show.
    pub fn overlay_text(&self) -> Option<String> {
        match self {
            DisplayHint::Gesture { name, confidence } => {
                Some(format!("Gesture: {name} ({confidence:.2})"))
            }
            DisplayHint::NoGesture { .. } => Some("No gesture detected".to_owned()),
            DisplayHint::NoHand => None,
        }
    }
}

/// Per-frame user input relayed by the capture loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaptureSignal {
    /// Nothing pressed; the frame only updates the preview.
    #[default]
    Idle,
    /// The user confirmed the current pose as an example.
    Confirm,
    /// The user aborted collection.
    Cancel,
}

/// Collection progress after feeding one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureStatus {
    InProgress { captured: usize, target: usize },
    /// The target number of confirmed captures was reached.
    Complete,
    /// The user cancelled; captures confirmed so far are kept.
    Cancelled,
}

/// Gathers confirmed examples for a single gesture.
///
/// Created by [`GestureSession::begin_collection`]; feed it one frame at a
/// time and hand it back to [`GestureSession::finish_collection`] when
/// [`CaptureStatus::Complete`] or [`CaptureStatus::Cancelled`] is returned.
pub struct Collector {
    class: ClassId,
    target: usize,
    captured: Vec<FeatureVector>,
}

impl Collector {
    pub fn class(&self) -> ClassId {
        self.class
    }

    pub fn captured(&self) -> usize {
        self.captured.len()
    }

    pub fn target(&self) -> usize {
        self.target
    }

    /// Feeds one frame's detection and the user's capture signal.
    ///
    /// A confirm on a frame without a usable hand is skipped silently: it
    /// neither counts nor errors.
    pub fn feed(&mut self, detection: Option<&Landmarks>, signal: CaptureSignal) -> CaptureStatus {
        match signal {
            CaptureSignal::Cancel => return CaptureStatus::Cancelled,
            CaptureSignal::Confirm => match feature::extract(detection) {
                Some(feature) => {
                    self.captured.push(feature);
                    log::debug!("captured sample {}/{}", self.captured.len(), self.target);
                }
                None => log::trace!("no usable hand on capture signal, skipping"),
            },
            CaptureSignal::Idle => {}
        }

        if self.captured.len() >= self.target {
            CaptureStatus::Complete
        } else {
            CaptureStatus::InProgress {
                captured: self.captured.len(),
                target: self.target,
            }
        }
    }
}

/// Owns the gesture lifecycle: collect examples, train, recognize, persist.
pub struct GestureSession {
    corpus: GestureCorpus,
    forest: Option<RandomForest>,
    config: SessionConfig,
    store: ModelStore,
}

impl GestureSession {
    /// Creates an untrained session persisting snapshots through `store`.
    pub fn new(store: ModelStore) -> Self {
        Self::with_config(store, SessionConfig::default())
    }

    pub fn with_config(store: ModelStore, config: SessionConfig) -> Self {
        Self {
            corpus: GestureCorpus::new(),
            forest: None,
            config,
            store,
        }
    }

    /// Restores the most recent snapshot, if one exists.
    ///
    /// A missing snapshot is normal on first run and leaves the session
    /// empty and untrained; any other store failure is surfaced.
    pub fn restore(&mut self) -> Result<(), StoreError> {
        match self.store.load() {
            Ok((forest, corpus)) => {
                let names: Vec<&str> = corpus.classes().map(|(_, name, _)| name).collect();
                log::info!("restored {} learned gestures: {:?}", names.len(), names);
                self.forest = Some(forest);
                self.corpus = corpus;
                Ok(())
            }
            Err(StoreError::NotFound) => {
                log::info!("no saved model found, starting fresh");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    pub fn is_trained(&self) -> bool {
        self.forest.is_some()
    }

    pub fn corpus(&self) -> &GestureCorpus {
        &self.corpus
    }

    /// Registers `name` as a new gesture class and returns a [`Collector`]
    /// that gathers `target` confirmed captures for it.
    pub fn begin_collection(&mut self, name: &str, target: usize) -> Collector {
        let class = self.corpus.register_class(name);
        log::debug!("collecting {target} samples for {name:?} as {class:?}");
        Collector {
            class,
            target,
            captured: Vec::new(),
        }
    }

    /// Stores a collector's captures in the corpus and reports how many.
    pub fn finish_collection(&mut self, collector: Collector) -> usize {
        let stored = collector.captured.len();
        log::info!(
            "collected {stored} samples for {:?}",
            self.corpus.class_name(collector.class).unwrap_or("?"),
        );
        self.corpus.add_examples(collector.class, collector.captured);
        stored
    }

    /// Trains a new classifier on the current corpus and returns the holdout
    /// accuracy.
    ///
    /// On success the fitted classifier replaces the active one and a
    /// snapshot is persisted; persistence is best-effort and a failure only
    /// logs a warning. On failure nothing changes.
    pub fn train(&mut self) -> Result<f32, TrainError> {
        let outcome = train::train(&self.corpus, &self.config.training)?;
        if let Err(e) = self.store.save(&outcome.forest, &self.corpus) {
            log::warn!("failed to persist snapshot: {e}");
        }
        self.forest = Some(outcome.forest);
        Ok(outcome.accuracy)
    }

    /// Classifies one feature vector.
    ///
    /// Returns [`Prediction::Rejected`] with zero confidence when the
    /// session is untrained or `feature` is absent.
    pub fn predict(&self, feature: Option<&FeatureVector>) -> Prediction {
        match (&self.forest, feature) {
            (Some(forest), Some(feature)) => classify::predict(
                forest,
                &self.corpus,
                feature,
                self.config.confidence_threshold,
            ),
            _ => Prediction::Rejected { confidence: 0.0 },
        }
    }

    /// Per-frame entry point for the recognition loop.
    pub fn on_frame(&self, detection: Option<&Landmarks>) -> DisplayHint {
        let Some(feature) = feature::extract(detection) else {
            return DisplayHint::NoHand;
        };
        match self.predict(Some(&feature)) {
            Prediction::Gesture { name, confidence } => DisplayHint::Gesture { name, confidence },
            Prediction::Rejected { confidence } => DisplayHint::NoGesture { confidence },
        }
    }
}
