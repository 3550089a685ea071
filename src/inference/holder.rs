//! Model holder - shared slot for the loaded classifier
//!
//! Holds exactly one model version at a time. A reload builds the whole
//! replacement first and then swaps it in under the write lock, so
//! concurrent readers observe either the old or the new model, never a
//! mix.

use std::path::Path;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;

use crate::features::FEATURE_COUNT;
use super::classifier::{Classifier, Prediction};
use super::ModelError;

struct LoadedModel {
    classifier: Classifier,
    name: String,
    loaded_at: DateTime<Utc>,
}

/// Snapshot of the holder state for health reporting
#[derive(Debug, Clone, Serialize)]
pub struct ModelStatus {
    pub name: String,
    pub loaded_at: DateTime<Utc>,
}

#[derive(Default)]
pub struct ModelHolder {
    slot: RwLock<Option<LoadedModel>>,
}

impl ModelHolder {
    pub fn new() -> Self {
        Self {
            slot: RwLock::new(None),
        }
    }

    /// Load a classifier from disk, replacing any previous model.
    ///
    /// On failure the previous model (if any) stays in place.
    pub fn load(&self, path: &Path) -> Result<(), ModelError> {
        tracing::info!("Loading model from {}", path.display());

        let classifier = Classifier::load(path)?;
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("model")
            .to_string();

        *self.slot.write() = Some(LoadedModel {
            classifier,
            name: name.clone(),
            loaded_at: Utc::now(),
        });

        tracing::info!("Model loaded: {}", name);
        Ok(())
    }

    pub fn is_loaded(&self) -> bool {
        self.slot.read().is_some()
    }

    /// Model identity and load time, if loaded.
    pub fn status(&self) -> Option<ModelStatus> {
        self.slot.read().as_ref().map(|model| ModelStatus {
            name: model.name.clone(),
            loaded_at: model.loaded_at,
        })
    }

    /// Run inference on one feature vector, returning the prediction and
    /// the identity of the model that produced it.
    ///
    /// `Session::run` needs `&mut`, so predictions serialize on the write
    /// lock and the lock is held for the whole call. Callers on an async
    /// runtime should dispatch this to a blocking thread.
    pub fn predict(
        &self,
        features: &[f32; FEATURE_COUNT],
    ) -> Result<(Prediction, String), ModelError> {
        // A reload queues behind in-flight inferences
        let mut guard = self.slot.write();
        let model = guard.as_mut().ok_or(ModelError::NotLoaded)?;

        let prediction = model.classifier.predict(features)?;
        Ok((prediction, model.name.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_holder_reports_unloaded() {
        let holder = ModelHolder::new();
        assert!(!holder.is_loaded());
        assert!(holder.status().is_none());
    }

    #[test]
    fn predict_without_model_is_not_loaded() {
        let holder = ModelHolder::new();
        let features = [0.0f32; FEATURE_COUNT];

        match holder.predict(&features) {
            Err(ModelError::NotLoaded) => {}
            other => panic!("expected NotLoaded, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn failed_load_leaves_holder_empty() {
        let holder = ModelHolder::new();
        let result = holder.load(Path::new("/nonexistent/model.onnx"));

        assert!(result.is_err());
        assert!(!holder.is_loaded());
    }
}
