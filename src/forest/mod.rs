//! Bootstrap-aggregated decision-tree ensemble.
//!
//! This is the multi-class classifier behind gesture recognition: each tree
//! is grown on a bootstrap draw of the training samples with a random feature
//! subset per split, and the ensemble's probability estimate is the average
//! of the per-tree leaf class distributions. Fitting is deterministic for a
//! given seed.

mod tree;

use serde::{Deserialize, Serialize};

use tree::DecisionTree;

/// Tunables for [`RandomForest::fit`].
#[derive(Debug, Clone)]
pub struct FitParams {
    /// Number of bagged trees. More trees smooth the probability estimates
    /// at a linear cost in fit and inference time.
    pub trees: usize,
    /// Seed for bootstrap sampling and per-split feature selection.
    pub seed: u64,
}

impl Default for FitParams {
    fn default() -> Self {
        Self { trees: 100, seed: 42 }
    }
}

/// A fitted ensemble of decision trees.
///
/// Replaced wholesale on retraining; inference is read-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    trees: Vec<DecisionTree>,
    num_classes: usize,
}

impl RandomForest {
    /// Fits an ensemble on `samples` (one flat feature slice per example)
    /// against `labels` in `0..num_classes`.
    ///
    /// Each split considers `sqrt(feature count)` randomly chosen features.
    ///
    /// # Panics
    ///
    /// Panics if `samples` is empty, if `samples` and `labels` have different
    /// lengths, or if a label is outside `0..num_classes`.
    pub fn fit(samples: &[&[f32]], labels: &[u32], num_classes: usize, params: &FitParams) -> Self {
        assert!(!samples.is_empty(), "cannot fit on an empty sample set");
        assert_eq!(
            samples.len(),
            labels.len(),
            "every sample needs exactly one label"
        );
        assert!(labels.iter().all(|&l| (l as usize) < num_classes));

        let num_features = samples[0].len();
        let features_per_split = (num_features as f32).sqrt().round() as usize;

        let mut rng = fastrand::Rng::with_seed(params.seed);
        let n = samples.len() as u32;
        let trees = (0..params.trees)
            .map(|_| {
                let bootstrap: Vec<u32> = (0..n).map(|_| rng.u32(0..n)).collect();
                DecisionTree::grow(
                    samples,
                    labels,
                    &bootstrap,
                    num_classes,
                    features_per_split,
                    &mut rng,
                )
            })
            .collect();

        Self { trees, num_classes }
    }

    pub fn num_classes(&self) -> usize {
        self.num_classes
    }

    /// Per-class probability estimate for `feature`, averaged over all trees.
    ///
    /// The returned vector has [`RandomForest::num_classes`] entries summing
    /// to 1.0 (up to rounding).
    pub fn predict_proba(&self, feature: &[f32]) -> Vec<f32> {
        let mut proba = vec![0.0; self.num_classes];
        for tree in &self.trees {
            let counts = tree.class_histogram(feature);
            let total: u32 = counts.iter().sum();
            for (p, &count) in proba.iter_mut().zip(counts) {
                *p += count as f32 / total as f32;
            }
        }
        for p in &mut proba {
            *p /= self.trees.len() as f32;
        }
        proba
    }

    /// Predicts the most probable class and its probability mass.
    pub fn predict(&self, feature: &[f32]) -> (u32, f32) {
        let proba = self.predict_proba(feature);
        let (class, &confidence) = proba
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .expect("forest has at least one class");
        (class as u32, confidence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn clusters() -> (Vec<Vec<f32>>, Vec<u32>) {
        // Two well-separated clusters in a 4-dimensional space.
        let mut samples = Vec::new();
        let mut labels = Vec::new();
        for i in 0..20 {
            let jitter = i as f32 * 0.003;
            samples.push(vec![0.1 + jitter, 0.2, 0.9 - jitter, 0.4]);
            labels.push(0);
            samples.push(vec![0.9 - jitter, 0.8, 0.1 + jitter, 0.6]);
            labels.push(1);
        }
        (samples, labels)
    }

    #[test]
    fn learns_separable_clusters() {
        let (samples, labels) = clusters();
        let slices: Vec<&[f32]> = samples.iter().map(|s| s.as_slice()).collect();
        let forest = RandomForest::fit(&slices, &labels, 2, &FitParams::default());

        let (class, confidence) = forest.predict(&[0.12, 0.2, 0.88, 0.4]);
        assert_eq!(class, 0);
        assert!(confidence > 0.9);

        let (class, confidence) = forest.predict(&[0.88, 0.8, 0.12, 0.6]);
        assert_eq!(class, 1);
        assert!(confidence > 0.9);
    }

    #[test]
    fn probabilities_sum_to_one() {
        let (samples, labels) = clusters();
        let slices: Vec<&[f32]> = samples.iter().map(|s| s.as_slice()).collect();
        let forest = RandomForest::fit(&slices, &labels, 2, &FitParams { trees: 25, seed: 3 });

        let proba = forest.predict_proba(&[0.5, 0.5, 0.5, 0.5]);
        assert_eq!(proba.len(), 2);
        assert_relative_eq!(proba.iter().sum::<f32>(), 1.0, max_relative = 1e-4);
    }

    #[test]
    fn fitting_is_deterministic_for_a_seed() {
        let (samples, labels) = clusters();
        let slices: Vec<&[f32]> = samples.iter().map(|s| s.as_slice()).collect();
        let params = FitParams { trees: 10, seed: 99 };

        let a = RandomForest::fit(&slices, &labels, 2, &params);
        let b = RandomForest::fit(&slices, &labels, 2, &params);

        let probe = [0.3, 0.4, 0.6, 0.5];
        assert_eq!(a.predict_proba(&probe), b.predict_proba(&probe));
    }
}
