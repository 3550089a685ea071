//! Inference module - ONNX classifier and shared model holder
//!
//! Keeps the loaded classifier behind a single swap point so the HTTP
//! layer can reload models without ever exposing a half-loaded state.

pub mod classifier;
pub mod holder;

// Re-export common types
pub use classifier::{Classifier, Prediction};
pub use holder::{ModelHolder, ModelStatus};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("model not loaded")]
    NotLoaded,

    #[error("failed to load model: {0}")]
    Artifact(String),

    #[error("inference failed: {0}")]
    Inference(String),
}
