//! Diabetes-risk classifier: the model-facing half of the health indicator.
//!
//! The model is an opaque ONNX artifact. Callers build a [`FeatureVector`]
//! in [`FEATURE_ORDER`] and get back a binary [`Label`].

pub mod inference;
pub mod types;

pub use inference::{Classifier, ClassifierError, ModelInfo, OnnxClassifier, DEFAULT_THRESHOLD};
pub use types::{FeatureVector, Label, FEATURE_COUNT, FEATURE_ORDER};
