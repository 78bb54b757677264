//! Snapshot persistence for the classifier and corpus.
//!
//! Every successful training run is persisted as a *snapshot pair*: one
//! classifier artifact and one corpus artifact. Each save writes the pair
//! twice — once under a timestamped name for historical retention, and once
//! as the unconditionally overwritten "latest" pair used for restore at
//! startup. Saves are best-effort: a failure partway leaves already written
//! artifacts in place.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::corpus::GestureCorpus;
use crate::feature::FEATURE_LEN;
use crate::forest::RandomForest;

/// Bump whenever the persisted representation changes shape.
const SCHEMA_VERSION: u32 = 1;

const LATEST_MODEL: &str = "latest_model.json";
const LATEST_DATA: &str = "latest_data.json";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No "latest" snapshot pair exists. Callers recover by starting with an
    /// empty corpus and no classifier.
    #[error("no persisted snapshot found")]
    NotFound,
    /// The snapshot was written by an incompatible version of this crate.
    #[error("snapshot has schema version {found}, expected {expected}")]
    VersionMismatch { found: u32, expected: u32 },
    /// The snapshot was written with a different feature vector length.
    #[error("snapshot uses {found} feature values per example, expected {expected}")]
    FeatureLenMismatch { found: usize, expected: usize },
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("malformed snapshot: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Envelope written around every artifact so that incompatible snapshots
/// fail loudly on load instead of deserializing into garbage.
#[derive(Serialize)]
struct ArtifactRef<'a, T> {
    schema_version: u32,
    feature_len: usize,
    payload: &'a T,
}

#[derive(Deserialize)]
struct Envelope {
    schema_version: u32,
    feature_len: usize,
    payload: serde_json::Value,
}

/// Persists and restores classifier/corpus snapshot pairs in a directory.
pub struct ModelStore {
    dir: PathBuf,
}

impl ModelStore {
    /// Creates a store rooted at `dir`, creating the directory if needed.
    pub fn new(dir: impl Into<PathBuf>) -> io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Writes a timestamped snapshot pair plus the "latest" pair.
    pub fn save(&self, forest: &RandomForest, corpus: &GestureCorpus) -> Result<(), StoreError> {
        let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        self.write(&format!("gesture_model_{stamp}.json"), forest)?;
        self.write(&format!("training_data_{stamp}.json"), corpus)?;
        self.write(LATEST_MODEL, forest)?;
        self.write(LATEST_DATA, corpus)?;
        log::info!("saved snapshot {} under {}", stamp, self.dir.display());
        Ok(())
    }

    /// Restores the "latest" snapshot pair.
    ///
    /// Fails with [`StoreError::NotFound`] when either artifact of the pair
    /// is missing.
    pub fn load(&self) -> Result<(RandomForest, GestureCorpus), StoreError> {
        let forest = self.read(LATEST_MODEL)?;
        let corpus = self.read(LATEST_DATA)?;
        Ok((forest, corpus))
    }

    fn write<T: Serialize>(&self, name: &str, payload: &T) -> Result<(), StoreError> {
        let file = File::create(self.dir.join(name))?;
        serde_json::to_writer(
            BufWriter::new(file),
            &ArtifactRef {
                schema_version: SCHEMA_VERSION,
                feature_len: FEATURE_LEN,
                payload,
            },
        )?;
        Ok(())
    }

    fn read<T: DeserializeOwned>(&self, name: &str) -> Result<T, StoreError> {
        let file = match File::open(self.dir.join(name)) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(StoreError::NotFound),
            Err(e) => return Err(e.into()),
        };

        // Check the envelope before touching the payload, so a mismatched
        // snapshot reports its version instead of a deserialization error.
        let envelope: Envelope = serde_json::from_reader(BufReader::new(file))?;
        if envelope.schema_version != SCHEMA_VERSION {
            return Err(StoreError::VersionMismatch {
                found: envelope.schema_version,
                expected: SCHEMA_VERSION,
            });
        }
        if envelope.feature_len != FEATURE_LEN {
            return Err(StoreError::FeatureLenMismatch {
                found: envelope.feature_len,
                expected: FEATURE_LEN,
            });
        }
        Ok(serde_json::from_value(envelope.payload)?)
    }
}
