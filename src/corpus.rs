//! Labeled example storage and the gesture class registry.

use serde::{Deserialize, Serialize};

use crate::feature::FeatureVector;

/// Identifies a registered gesture class.
///
/// Ids are assigned sequentially by [`GestureCorpus::register_class`] and are
/// unique within a corpus. Class *names* are not deduplicated; registering
/// the same name twice yields two distinct ids.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct ClassId(u32);

impl ClassId {
    pub fn from_u32(raw: u32) -> Self {
        Self(raw)
    }

    pub fn as_u32(self) -> u32 {
        self.0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LabeledExample {
    feature: FeatureVector,
    class: ClassId,
}

/// All labeled training examples collected so far, plus the class registry.
///
/// Examples keep their insertion order. The corpus is mutated only during
/// collection and read by training and the class listing; it is serialized
/// wholesale as part of every snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GestureCorpus {
    examples: Vec<LabeledExample>,
    class_names: Vec<String>,
}

impl GestureCorpus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new gesture class and returns its id.
    ///
    /// Names are taken as-is, without checking for duplicates.
    pub fn register_class(&mut self, name: impl Into<String>) -> ClassId {
        let id = ClassId(self.class_names.len() as u32);
        self.class_names.push(name.into());
        id
    }

    /// Appends labeled examples for `class`, preserving order.
    ///
    /// The caller is responsible for passing an id obtained from
    /// [`GestureCorpus::register_class`] on this corpus.
    pub fn add_examples(&mut self, class: ClassId, features: impl IntoIterator<Item = FeatureVector>) {
        self.examples
            .extend(features.into_iter().map(|feature| LabeledExample { feature, class }));
    }

    /// Looks up a class name. Returns [`None`] for unregistered ids.
    pub fn class_name(&self, class: ClassId) -> Option<&str> {
        self.class_names.get(class.0 as usize).map(|s| s.as_str())
    }

    /// Number of registered classes (including ones without examples).
    pub fn num_classes(&self) -> usize {
        self.class_names.len()
    }

    /// Number of examples labeled with `class`.
    pub fn count(&self, class: ClassId) -> usize {
        self.examples.iter().filter(|ex| ex.class == class).count()
    }

    /// Total example count across all classes.
    pub fn len(&self) -> usize {
        self.examples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }

    /// Iterates over all examples in insertion order.
    pub fn examples(&self) -> impl Iterator<Item = (&FeatureVector, ClassId)> + '_ {
        self.examples.iter().map(|ex| (&ex.feature, ex.class))
    }

    /// Lists every registered class with its name and example count.
    pub fn classes(&self) -> impl Iterator<Item = (ClassId, &str, usize)> + '_ {
        self.class_names.iter().enumerate().map(|(i, name)| {
            let id = ClassId(i as u32);
            (id, name.as_str(), self.count(id))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature::FEATURE_LEN;

    fn feature(fill: f32) -> FeatureVector {
        vec![fill; FEATURE_LEN].try_into().unwrap()
    }

    #[test]
    fn class_ids_are_sequential() {
        let mut corpus = GestureCorpus::new();
        assert_eq!(corpus.register_class("wave"), ClassId(0));
        assert_eq!(corpus.register_class("fist"), ClassId(1));
        // Duplicate names are allowed and get a fresh id.
        assert_eq!(corpus.register_class("wave"), ClassId(2));
        assert_eq!(corpus.num_classes(), 3);
    }

    #[test]
    fn counts_track_examples_per_class() {
        let mut corpus = GestureCorpus::new();
        let wave = corpus.register_class("wave");
        let fist = corpus.register_class("fist");

        corpus.add_examples(wave, vec![feature(0.1), feature(0.2)]);
        corpus.add_examples(fist, vec![feature(0.9)]);

        assert_eq!(corpus.count(wave), 2);
        assert_eq!(corpus.count(fist), 1);
        assert_eq!(corpus.len(), 3);

        let listed: Vec<_> = corpus.classes().collect();
        assert_eq!(listed, vec![(wave, "wave", 2), (fist, "fist", 1)]);
    }

    #[test]
    fn serializes_wholesale() {
        let mut corpus = GestureCorpus::new();
        let wave = corpus.register_class("wave");
        corpus.add_examples(wave, vec![feature(0.5)]);

        let json = serde_json::to_string(&corpus).unwrap();
        let restored: GestureCorpus = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.len(), corpus.len());
        assert_eq!(restored.class_name(wave), Some("wave"));
    }
}
