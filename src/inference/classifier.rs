//! ONNX classifier wrapper
//!
//! Loads a serialized classifier and resolves its output capability once
//! at load time: models exporting a probability tensor produce a full
//! per-label distribution, label-only models synthesize a degenerate one.

use std::collections::BTreeMap;
use std::path::Path;

use ndarray::Array2;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Value;
use serde::Serialize;

use crate::features::FEATURE_COUNT;
use super::ModelError;

/// Label set of the shipped 15-letter model, used when no sidecar file
/// accompanies the artifact (J and Z need motion and are not covered).
const DEFAULT_LABELS: [&str; 15] = [
    "A", "B", "C", "D", "E", "F", "G", "H", "I", "K", "L", "M", "N", "O", "P",
];

/// Classifier output
#[derive(Debug, Clone, Serialize)]
pub struct Prediction {
    pub letter: String,
    pub confidence: f32,
    pub probabilities: BTreeMap<String, f32>,
}

/// Output capability, resolved once when the artifact is loaded
#[derive(Debug, Clone)]
enum Capability {
    /// Model exports a probability tensor over the label set
    Probabilistic { output: String },
    /// Model exports only a class index
    LabelOnly { output: String },
}

/// Loaded ONNX classifier with its ordered label set
pub struct Classifier {
    session: Session,
    labels: Vec<String>,
    capability: Capability,
}

impl Classifier {
    /// Load a classifier from an ONNX artifact.
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        if !path.exists() {
            return Err(ModelError::Artifact(format!(
                "model not found: {}",
                path.display()
            )));
        }

        let session = Session::builder()
            .map_err(|e| ModelError::Artifact(format!("failed to create session builder: {}", e)))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| ModelError::Artifact(format!("failed to set optimization: {}", e)))?
            .commit_from_file(path)
            .map_err(|e| ModelError::Artifact(format!("failed to load model: {}", e)))?;

        let labels = load_labels(path);
        let capability = resolve_capability(&session)?;

        tracing::info!(
            "Classifier ready: {} labels, probabilities {}",
            labels.len(),
            matches!(capability, Capability::Probabilistic { .. })
        );

        Ok(Self {
            session,
            labels,
            capability,
        })
    }

    /// Run inference on one feature vector.
    pub fn predict(&mut self, features: &[f32; FEATURE_COUNT]) -> Result<Prediction, ModelError> {
        let input_array = Array2::<f32>::from_shape_vec((1, FEATURE_COUNT), features.to_vec())
            .map_err(|e| ModelError::Inference(format!("array error: {}", e)))?;

        let input_tensor = Value::from_array(input_array)
            .map_err(|e| ModelError::Inference(format!("tensor error: {}", e)))?;

        let outputs = self
            .session
            .run(ort::inputs![input_tensor])
            .map_err(|e| ModelError::Inference(format!("inference failed: {}", e)))?;

        match &self.capability {
            Capability::Probabilistic { output } => {
                let value = outputs
                    .get(output)
                    .ok_or_else(|| ModelError::Inference(format!("missing output '{}'", output)))?;
                let tensor = value
                    .try_extract_tensor::<f32>()
                    .map_err(|e| ModelError::Inference(format!("extract error: {}", e)))?;
                let probabilities = tensor.1;

                // Guards against a model/label-set mismatch at serve time
                if probabilities.len() != self.labels.len() || probabilities.is_empty() {
                    return Err(ModelError::Inference(format!(
                        "probability output has {} entries for {} labels",
                        probabilities.len(),
                        self.labels.len()
                    )));
                }

                Ok(summarize(&self.labels, probabilities))
            }
            Capability::LabelOnly { output } => {
                let value = outputs
                    .get(output)
                    .ok_or_else(|| ModelError::Inference(format!("missing output '{}'", output)))?;
                let tensor = value
                    .try_extract_tensor::<i64>()
                    .map_err(|e| ModelError::Inference(format!("extract error: {}", e)))?;
                let index = *tensor
                    .1
                    .first()
                    .ok_or_else(|| ModelError::Inference("empty label output".to_string()))?;

                let letter = self
                    .labels
                    .get(index as usize)
                    .ok_or_else(|| {
                        ModelError::Inference(format!("class index {} out of range", index))
                    })?
                    .clone();

                Ok(single_label(&letter))
            }
        }
    }
}

/// Pick the argmax of a per-label distribution.
///
/// Callers guarantee `labels` and `probabilities` are the same non-zero
/// length.
pub fn summarize(labels: &[String], probabilities: &[f32]) -> Prediction {
    let mut map = BTreeMap::new();
    let mut best = 0usize;

    for (i, (label, prob)) in labels.iter().zip(probabilities.iter()).enumerate() {
        map.insert(label.clone(), *prob);
        if *prob > probabilities[best] {
            best = i;
        }
    }

    Prediction {
        letter: labels[best].clone(),
        confidence: probabilities[best],
        probabilities: map,
    }
}

/// Degenerate distribution for models without probability output.
pub fn single_label(letter: &str) -> Prediction {
    let mut map = BTreeMap::new();
    map.insert(letter.to_string(), 1.0);

    Prediction {
        letter: letter.to_string(),
        confidence: 1.0,
        probabilities: map,
    }
}

fn resolve_capability(session: &Session) -> Result<Capability, ModelError> {
    if let Some(output) = session
        .outputs()
        .iter()
        .find(|o| o.name().to_ascii_lowercase().contains("prob"))
    {
        return Ok(Capability::Probabilistic {
            output: output.name().to_string(),
        });
    }

    let output = session
        .outputs()
        .first()
        .map(|o| o.name().to_string())
        .ok_or_else(|| ModelError::Artifact("model has no outputs".to_string()))?;

    Ok(Capability::LabelOnly { output })
}

/// Load the ordered label set from the `<model>.labels.json` sidecar, or
/// fall back to the shipped default set.
fn load_labels(model_path: &Path) -> Vec<String> {
    let sidecar = model_path.with_extension("labels.json");
    match std::fs::read_to_string(&sidecar) {
        Ok(raw) => match serde_json::from_str::<Vec<String>>(&raw) {
            Ok(labels) if !labels.is_empty() => {
                tracing::info!("Loaded {} labels from {}", labels.len(), sidecar.display());
                labels
            }
            _ => {
                tracing::warn!("Ignoring malformed label sidecar {}", sidecar.display());
                default_labels()
            }
        },
        Err(_) => default_labels(),
    }
}

fn default_labels() -> Vec<String> {
    DEFAULT_LABELS.iter().map(|l| l.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn labels(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn summarize_picks_argmax() {
        let prediction = summarize(&labels(&["A", "B", "C"]), &[0.2, 0.7, 0.1]);

        assert_eq!(prediction.letter, "B");
        assert_eq!(prediction.confidence, 0.7);
        assert_eq!(prediction.probabilities.len(), 3);

        let total: f32 = prediction.probabilities.values().sum();
        assert!((total - 1.0).abs() < 1e-6);
    }

    #[test]
    fn summarize_confidence_equals_max_entry() {
        let prediction = summarize(&labels(&["A", "B"]), &[0.55, 0.45]);
        let max = prediction
            .probabilities
            .values()
            .cloned()
            .fold(f32::MIN, f32::max);
        assert_eq!(prediction.confidence, max);
    }

    #[test]
    fn single_label_is_degenerate_distribution() {
        let prediction = single_label("K");

        assert_eq!(prediction.letter, "K");
        assert_eq!(prediction.confidence, 1.0);
        assert_eq!(prediction.probabilities.len(), 1);
        assert_eq!(prediction.probabilities.get("K"), Some(&1.0));
    }

    #[test]
    fn default_label_set_covers_static_letters() {
        let labels = default_labels();
        assert_eq!(labels.len(), 15);
        assert!(!labels.contains(&"J".to_string()));
        assert!(!labels.contains(&"Z".to_string()));
    }

    #[test]
    fn sidecar_labels_override_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let model_path = dir.path().join("custom.onnx");
        let sidecar = dir.path().join("custom.labels.json");
        let mut file = std::fs::File::create(&sidecar).unwrap();
        file.write_all(br#"["X", "Y"]"#).unwrap();

        assert_eq!(load_labels(&model_path), labels(&["X", "Y"]));
    }

    #[test]
    fn missing_sidecar_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let model_path = dir.path().join("custom.onnx");
        assert_eq!(load_labels(&model_path), default_labels());
    }
}
