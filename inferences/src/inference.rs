use std::path::{Path, PathBuf};

use log::{debug, info};
use serde::Serialize;
use thiserror::Error;
use tract_onnx::prelude::*;

use crate::types::{FeatureVector, Label, FEATURE_COUNT, FEATURE_ORDER};

/// Probability above which a score output counts as the positive class.
pub const DEFAULT_THRESHOLD: f32 = 0.5;

#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("failed to load model from {path}: {reason}")]
    Load { path: PathBuf, reason: String },
    #[error("inference failed: {0}")]
    Inference(String),
    #[error("unexpected model output: {0}")]
    UnexpectedOutput(String),
}

/// A trained binary classifier over [`FeatureVector`]s.
///
/// The web layer only ever talks to this trait, so tests can swap the ONNX
/// model for a stub.
pub trait Classifier: Send + Sync {
    fn predict(&self, features: &FeatureVector) -> Result<Label, ClassifierError>;

    fn model_info(&self) -> ModelInfo {
        ModelInfo::new("custom", "in-memory", DEFAULT_THRESHOLD)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ModelInfo {
    pub backend: String,
    pub source: String,
    pub input_shape: Vec<usize>,
    pub threshold: f32,
    pub features: Vec<String>,
}

impl ModelInfo {
    pub fn new(backend: &str, source: &str, threshold: f32) -> Self {
        ModelInfo {
            backend: backend.to_string(),
            source: source.to_string(),
            input_shape: vec![1, FEATURE_COUNT],
            threshold,
            features: FEATURE_ORDER.iter().map(|f| f.to_string()).collect(),
        }
    }
}

type Plan = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

/// Classifier backed by an ONNX graph run through tract.
pub struct OnnxClassifier {
    model: Plan,
    path: PathBuf,
    pub threshold: f32,
}

impl OnnxClassifier {
    pub fn load<P: AsRef<Path>>(model_path: P) -> Result<Self, ClassifierError> {
        Self::load_with_threshold(model_path, DEFAULT_THRESHOLD)
    }

    pub fn load_with_threshold<P: AsRef<Path>>(
        model_path: P,
        threshold: f32,
    ) -> Result<Self, ClassifierError> {
        let path = model_path.as_ref().to_path_buf();
        if !path.is_file() {
            return Err(ClassifierError::Load {
                path,
                reason: "file not found".to_string(),
            });
        }

        let model = tract_onnx::onnx()
            .model_for_path(&path)
            .and_then(|model| {
                model.with_input_fact(
                    0,
                    InferenceFact::dt_shape(f32::datum_type(), tvec!(1, FEATURE_COUNT)),
                )
            })
            .and_then(|model| model.into_optimized())
            .and_then(|model| model.into_runnable())
            .map_err(|e| ClassifierError::Load {
                path: path.clone(),
                reason: format!("{:#}", e),
            })?;

        info!("Loaded ONNX model from {}", path.display());
        Ok(Self {
            model,
            path,
            threshold,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Classifier for OnnxClassifier {
    fn predict(&self, features: &FeatureVector) -> Result<Label, ClassifierError> {
        let input_tensor = Tensor::from_shape(&[1, FEATURE_COUNT], features.as_slice())
            .map_err(|e| ClassifierError::Inference(format!("{:#}", e)))?;
        let outputs = self
            .model
            .run(tvec!(input_tensor.into()))
            .map_err(|e| ClassifierError::Inference(format!("{:#}", e)))?;

        let output = outputs
            .first()
            .ok_or_else(|| ClassifierError::UnexpectedOutput("model produced no output".into()))?;
        let label = label_from_output(output, self.threshold)?;
        debug!("Model output {:?} -> {}", output.datum_type(), label);
        Ok(label)
    }

    fn model_info(&self) -> ModelInfo {
        ModelInfo::new("tract-onnx", &self.path.display().to_string(), self.threshold)
    }
}

/// Reads the first row of a classifier output.
///
/// Integer tensors hold the class label itself. Float tensors hold either
/// one probability for the positive class or a pair of class probabilities.
pub fn label_from_output(output: &Tensor, threshold: f32) -> Result<Label, ClassifierError> {
    let unexpected = |e: TractError| ClassifierError::UnexpectedOutput(format!("{:#}", e));

    match output.datum_type() {
        DatumType::I64 => {
            let view = output.to_array_view::<i64>().map_err(unexpected)?;
            first_class(view.iter().next().copied())
        }
        DatumType::I32 => {
            let view = output.to_array_view::<i32>().map_err(unexpected)?;
            first_class(view.iter().next().map(|c| *c as i64))
        }
        DatumType::F32 => {
            let view = output.to_array_view::<f32>().map_err(unexpected)?;
            let row: Vec<f32> = view.iter().take(2).copied().collect();
            let positive = match (output.len(), row.as_slice()) {
                (1, [p]) => *p,
                (2, [_, p]) => *p,
                (n, _) => {
                    return Err(ClassifierError::UnexpectedOutput(format!(
                        "expected 1 or 2 scores, got {}",
                        n
                    )))
                }
            };
            if !positive.is_finite() {
                return Err(ClassifierError::UnexpectedOutput(format!(
                    "score is not finite: {}",
                    positive
                )));
            }
            Ok(if positive >= threshold {
                Label::Diabetic
            } else {
                Label::NonDiabetic
            })
        }
        other => Err(ClassifierError::UnexpectedOutput(format!(
            "unsupported output type {:?}",
            other
        ))),
    }
}

fn first_class(class: Option<i64>) -> Result<Label, ClassifierError> {
    let class =
        class.ok_or_else(|| ClassifierError::UnexpectedOutput("empty label tensor".into()))?;
    Label::from_class(class)
        .ok_or_else(|| ClassifierError::UnexpectedOutput(format!("class {} is not 0 or 1", class)))
}
