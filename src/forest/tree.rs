//! Single CART-style decision tree.

use serde::{Deserialize, Serialize};

/// Nodes below this sample count are not split further.
const MIN_SPLIT_SAMPLES: usize = 2;

/// Hard depth cap; bounds recursion on pathological data.
const MAX_DEPTH: usize = 64;

#[derive(Debug, Clone, Serialize, Deserialize)]
enum Node {
    /// Terminal node holding the per-class sample histogram.
    Leaf { counts: Vec<u32> },
    /// Binary split: `feature < threshold` goes left, the rest right.
    Split {
        feature: usize,
        threshold: f32,
        left: u32,
        right: u32,
    },
}

/// A single decision tree over flat `f32` feature slices.
///
/// Nodes live in one arena `Vec`, root at index 0; leaves keep the full
/// class histogram so that the ensemble can average class distributions
/// instead of only majority votes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(super) struct DecisionTree {
    nodes: Vec<Node>,
}

impl DecisionTree {
    /// Grows a tree on the samples selected by `indices` (typically a
    /// bootstrap draw), considering `features_per_split` randomly chosen
    /// features at every split.
    pub(super) fn grow(
        samples: &[&[f32]],
        labels: &[u32],
        indices: &[u32],
        num_classes: usize,
        features_per_split: usize,
        rng: &mut fastrand::Rng,
    ) -> Self {
        let mut tree = Self { nodes: Vec::new() };
        tree.grow_node(samples, labels, indices, num_classes, features_per_split, rng, 0);
        tree
    }

    fn grow_node(
        &mut self,
        samples: &[&[f32]],
        labels: &[u32],
        indices: &[u32],
        num_classes: usize,
        features_per_split: usize,
        rng: &mut fastrand::Rng,
        depth: usize,
    ) -> u32 {
        let counts = class_counts(labels, indices, num_classes);
        let classes_present = counts.iter().filter(|&&c| c > 0).count();
        if depth >= MAX_DEPTH || indices.len() < MIN_SPLIT_SAMPLES || classes_present <= 1 {
            return self.push(Node::Leaf { counts });
        }

        let Some((feature, threshold)) =
            best_split(samples, labels, indices, &counts, features_per_split, rng)
        else {
            return self.push(Node::Leaf { counts });
        };

        let (left_indices, right_indices): (Vec<u32>, Vec<u32>) = indices
            .iter()
            .partition(|&&i| samples[i as usize][feature] < threshold);

        // Reserve the split's slot before recursing so the root stays at index 0.
        let slot = self.push(Node::Leaf { counts: Vec::new() });
        let left = self.grow_node(
            samples,
            labels,
            &left_indices,
            num_classes,
            features_per_split,
            rng,
            depth + 1,
        );
        let right = self.grow_node(
            samples,
            labels,
            &right_indices,
            num_classes,
            features_per_split,
            rng,
            depth + 1,
        );
        self.nodes[slot as usize] = Node::Split {
            feature,
            threshold,
            left,
            right,
        };
        slot
    }

    fn push(&mut self, node: Node) -> u32 {
        self.nodes.push(node);
        (self.nodes.len() - 1) as u32
    }

    /// Walks `feature` down to a leaf and returns its class histogram.
    pub(super) fn class_histogram(&self, feature: &[f32]) -> &[u32] {
        let mut index = 0;
        loop {
            match &self.nodes[index] {
                Node::Leaf { counts } => return counts,
                Node::Split {
                    feature: split_feature,
                    threshold,
                    left,
                    right,
                } => {
                    index = if feature[*split_feature] < *threshold {
                        *left as usize
                    } else {
                        *right as usize
                    };
                }
            }
        }
    }
}

fn class_counts(labels: &[u32], indices: &[u32], num_classes: usize) -> Vec<u32> {
    let mut counts = vec![0; num_classes];
    for &i in indices {
        counts[labels[i as usize] as usize] += 1;
    }
    counts
}

/// Finds the (feature, threshold) pair minimizing the summed child Gini
/// impurity over a random feature subset. Returns [`None`] when no candidate
/// feature separates the samples (all values equal).
fn best_split(
    samples: &[&[f32]],
    labels: &[u32],
    indices: &[u32],
    parent_counts: &[u32],
    features_per_split: usize,
    rng: &mut fastrand::Rng,
) -> Option<(usize, f32)> {
    let num_features = samples[indices[0] as usize].len();
    let mut candidates: Vec<usize> = (0..num_features).collect();
    rng.shuffle(&mut candidates);
    candidates.truncate(features_per_split.max(1));

    let mut best: Option<(f32, usize, f32)> = None;
    let mut sorted: Vec<(f32, u32)> = Vec::with_capacity(indices.len());
    for &feature in &candidates {
        sorted.clear();
        sorted.extend(
            indices
                .iter()
                .map(|&i| (samples[i as usize][feature], labels[i as usize])),
        );
        sorted.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut left = vec![0u32; parent_counts.len()];
        let mut right = parent_counts.to_vec();
        for window in 0..sorted.len() - 1 {
            let (value, label) = sorted[window];
            left[label as usize] += 1;
            right[label as usize] -= 1;

            let next = sorted[window + 1].0;
            if next <= value {
                continue;
            }

            let impurity = weighted_gini(&left) + weighted_gini(&right);
            if best.map_or(true, |(b, _, _)| impurity < b) {
                best = Some((impurity, feature, (value + next) * 0.5));
            }
        }
    }

    best.map(|(_, feature, threshold)| (feature, threshold))
}

/// Gini impurity of a class histogram, weighted by its sample count.
fn weighted_gini(counts: &[u32]) -> f32 {
    let total: u32 = counts.iter().sum();
    if total == 0 {
        return 0.0;
    }
    let total = total as f32;
    let purity: f32 = counts
        .iter()
        .map(|&c| {
            let p = c as f32 / total;
            p * p
        })
        .sum();
    total * (1.0 - purity)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn separable_samples_form_pure_leaves() {
        let samples: Vec<&[f32]> = vec![&[0.0, 1.0], &[0.1, 0.9], &[1.0, 0.0], &[0.9, 0.1]];
        let labels = [0, 0, 1, 1];
        let indices = [0, 1, 2, 3];
        let mut rng = fastrand::Rng::with_seed(7);

        let tree = DecisionTree::grow(&samples, &labels, &indices, 2, 2, &mut rng);

        assert_eq!(tree.class_histogram(&[0.05, 0.95]), &[2, 0]);
        assert_eq!(tree.class_histogram(&[0.95, 0.05]), &[0, 2]);
    }

    #[test]
    fn identical_samples_become_a_single_leaf() {
        let samples: Vec<&[f32]> = vec![&[0.5, 0.5], &[0.5, 0.5]];
        let labels = [0, 1];
        let indices = [0, 1];
        let mut rng = fastrand::Rng::with_seed(7);

        let tree = DecisionTree::grow(&samples, &labels, &indices, 2, 2, &mut rng);

        // No feature separates the two; the mixed histogram is preserved.
        assert_eq!(tree.class_histogram(&[0.5, 0.5]), &[1, 1]);
    }
}
