//! Classifier training and holdout evaluation.

use itertools::Itertools;

use crate::corpus::{ClassId, GestureCorpus};
use crate::feature::FeatureVector;
use crate::forest::{FitParams, RandomForest};

/// Why a training run could not start.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TrainError {
    /// The corpus is below the example floor. Nothing was changed; collect
    /// more examples and retry.
    #[error("need at least {min} examples to train, corpus has {have}")]
    InsufficientData { have: usize, min: usize },
}

/// Tunables for [`train`].
#[derive(Debug, Clone)]
pub struct TrainingOptions {
    /// Minimum corpus size before training is attempted. Below this floor a
    /// stratified split is statistically meaningless.
    pub min_examples: usize,
    /// Fraction of the corpus held out for evaluation.
    pub holdout_fraction: f32,
    /// Number of bagged trees in the fitted ensemble.
    pub trees: usize,
    /// Seed for the stratified shuffle and bootstrap sampling. Fixed so that
    /// repeated runs over the same corpus are reproducible.
    pub seed: u64,
}

impl Default for TrainingOptions {
    fn default() -> Self {
        Self {
            min_examples: 10,
            holdout_fraction: 0.2,
            trees: 100,
            seed: 42,
        }
    }
}

/// A freshly fitted classifier plus its holdout evaluation.
#[derive(Debug)]
pub struct TrainingOutcome {
    pub forest: RandomForest,
    /// Holdout accuracy in `0.0..=1.0`. Informational only: a fit with low
    /// accuracy still replaces the active classifier.
    pub accuracy: f32,
}

/// Fits an ensemble on 80% of the corpus and evaluates it on the rest.
///
/// The split is stratified by class id so every class lands proportionally
/// in both partitions. Training succeeds whenever the example floor is met,
/// regardless of how low the resulting accuracy is.
pub fn train(corpus: &GestureCorpus, options: &TrainingOptions) -> Result<TrainingOutcome, TrainError> {
    if corpus.len() < options.min_examples {
        return Err(TrainError::InsufficientData {
            have: corpus.len(),
            min: options.min_examples,
        });
    }

    let examples: Vec<(&FeatureVector, ClassId)> = corpus.examples().collect();
    let (train_indices, holdout_indices) =
        stratified_split(&examples, options.holdout_fraction, options.seed);

    let samples: Vec<&[f32]> = train_indices.iter().map(|&i| examples[i].0.values()).collect();
    let labels: Vec<u32> = train_indices.iter().map(|&i| examples[i].1.as_u32()).collect();
    let forest = RandomForest::fit(
        &samples,
        &labels,
        corpus.num_classes(),
        &FitParams {
            trees: options.trees,
            seed: options.seed,
        },
    );

    let accuracy = if holdout_indices.is_empty() {
        log::warn!("no class had enough examples to hold any out; skipping evaluation");
        1.0
    } else {
        let correct = holdout_indices
            .iter()
            .filter(|&&i| {
                let (feature, class) = examples[i];
                forest.predict(feature.values()).0 == class.as_u32()
            })
            .count();
        correct as f32 / holdout_indices.len() as f32
    };

    log::debug!(
        "fitted {} trees on {} examples across {} classes, holdout accuracy {:.2}",
        options.trees,
        train_indices.len(),
        corpus.num_classes(),
        accuracy,
    );

    Ok(TrainingOutcome { forest, accuracy })
}

/// Splits example indices into train/holdout partitions, keeping every class
/// represented proportionally in both.
///
/// Classes with a single example cannot be split and go entirely to the
/// training partition.
fn stratified_split(
    examples: &[(&FeatureVector, ClassId)],
    holdout_fraction: f32,
    seed: u64,
) -> (Vec<usize>, Vec<usize>) {
    let mut rng = fastrand::Rng::with_seed(seed);
    let by_class = examples
        .iter()
        .enumerate()
        .map(|(i, &(_, class))| (class, i))
        .into_group_map();

    let mut train = Vec::new();
    let mut holdout = Vec::new();
    // Iterate in class order; HashMap order would break seed reproducibility.
    for (_, mut indices) in by_class.into_iter().sorted_by_key(|&(class, _)| class) {
        rng.shuffle(&mut indices);
        let held = if indices.len() < 2 {
            0
        } else {
            ((indices.len() as f32 * holdout_fraction).round() as usize).clamp(1, indices.len() - 1)
        };
        holdout.extend_from_slice(&indices[..held]);
        train.extend_from_slice(&indices[held..]);
    }
    (train, holdout)
}
