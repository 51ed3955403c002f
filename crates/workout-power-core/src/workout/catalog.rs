//! Workout menu listing and descriptor loading.
//!
//! A data directory holds `index.json` (the menu) and one JSON descriptor
//! per workout. Loading is the one place the app can fail before a run;
//! the timer never starts on a failed load.

use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};

use super::definition::WorkoutDefinition;
use crate::error::{DataLoadError, Result};

pub const INDEX_FILE: &str = "index.json";

/// One entry of the workout menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkoutListing {
    pub filename: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// Source of workout descriptors.
pub trait WorkoutSource {
    /// The menu, in display order.
    fn list(&self) -> Result<Vec<WorkoutListing>>;

    /// Load one descriptor by its listing filename.
    fn load(&self, filename: &str) -> Result<WorkoutDefinition>;
}

/// Reads descriptors from a directory on disk.
#[derive(Debug, Clone)]
pub struct DirWorkoutSource {
    root: PathBuf,
}

impl DirWorkoutSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, filename: &str) -> Result<PathBuf, DataLoadError> {
        let candidate = Path::new(filename);
        let plain = !filename.is_empty()
            && candidate
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !plain {
            return Err(DataLoadError::InvalidFilename(filename.to_string()));
        }
        Ok(self.root.join(candidate))
    }

    fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T, DataLoadError> {
        let raw = std::fs::read_to_string(path).map_err(|source| DataLoadError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| DataLoadError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl WorkoutSource for DirWorkoutSource {
    fn list(&self) -> Result<Vec<WorkoutListing>> {
        let path = self.root.join(INDEX_FILE);
        Ok(Self::read_json(&path)?)
    }

    fn load(&self, filename: &str) -> Result<WorkoutDefinition> {
        let path = self.resolve(filename)?;
        let workout: WorkoutDefinition = Self::read_json(&path)?;
        tracing::debug!(
            filename,
            exercises = workout.exercise_count(),
            "loaded workout descriptor"
        );
        Ok(workout)
    }
}
