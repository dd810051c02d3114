//! Serialized preprocessing + classifier pipeline.
//!
//! A [`Pipeline`] is the single artifact shared between the training program
//! and the server: it is fitted and written as one JSON document and loaded
//! back as one unit.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::forest::RandomForestModel;
use super::logreg::LogRegModel;
use super::metrics::EvalMetrics;
use super::preprocess::StandardScaler;

/// Current artifact format version.
pub const PIPELINE_FORMAT_VERSION: i64 = 1;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("failed to read model artifact {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write model artifact {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("model artifact {path} is not valid JSON: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("failed to serialize model artifact: {0}")]
    Serialize(serde_json::Error),
    #[error("invalid model artifact: {0}")]
    Invalid(String),
    #[error("expected {expected} features, got {actual}")]
    FeatureCount { expected: usize, actual: usize },
    #[error("feature {name} is not a finite number")]
    NonFiniteFeature { name: String },
    #[error("classifier produced invalid probabilities")]
    InvalidProbabilities,
}

/// Fitted classifier stage of a pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Classifier {
    LogisticRegression(LogRegModel),
    RandomForest(RandomForestModel),
}

impl Classifier {
    /// Stable name used in logs and run records.
    pub fn name(&self) -> &'static str {
        match self {
            Classifier::LogisticRegression(_) => "LogisticRegression",
            Classifier::RandomForest(_) => "RandomForest",
        }
    }

    pub fn feature_len(&self) -> usize {
        match self {
            Classifier::LogisticRegression(model) => model.feature_len,
            Classifier::RandomForest(model) => model.feature_len,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        match self {
            Classifier::LogisticRegression(model) => model.validate(),
            Classifier::RandomForest(model) => model.validate(),
        }
    }

    pub fn predict_proba(&self, features: &[f32]) -> Vec<f32> {
        match self {
            Classifier::LogisticRegression(model) => model.predict_proba(features),
            Classifier::RandomForest(model) => model.predict_proba(features),
        }
    }
}

/// Preprocessing stage, fitted classifier, and the metadata needed to check them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pipeline {
    pub model_version: i64,
    /// Ordered feature names the pipeline was fitted on.
    pub feature_names: Vec<String>,
    pub preprocessor: StandardScaler,
    pub classifier: Classifier,
    /// Held-out metrics measured at training time.
    #[serde(default)]
    pub metrics: Option<EvalMetrics>,
}

impl Pipeline {
    pub fn new(
        feature_names: Vec<String>,
        preprocessor: StandardScaler,
        classifier: Classifier,
    ) -> Self {
        Self {
            model_version: PIPELINE_FORMAT_VERSION,
            feature_names,
            preprocessor,
            classifier,
            metrics: None,
        }
    }

    /// Validate structural invariants of the pipeline.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.model_version != PIPELINE_FORMAT_VERSION {
            return Err(PipelineError::Invalid(format!(
                "unsupported model_version {} (expected {})",
                self.model_version, PIPELINE_FORMAT_VERSION
            )));
        }
        let d = self.feature_names.len();
        self.preprocessor.validate().map_err(PipelineError::Invalid)?;
        self.classifier.validate().map_err(PipelineError::Invalid)?;
        if self.preprocessor.dim() != d || self.classifier.feature_len() != d {
            return Err(PipelineError::Invalid(format!(
                "stage dimensions ({}, {}) do not match {d} feature names",
                self.preprocessor.dim(),
                self.classifier.feature_len()
            )));
        }
        Ok(())
    }

    /// Check that the pipeline was fitted on exactly `expected`, in order.
    pub fn ensure_features(&self, expected: &[&str]) -> Result<(), PipelineError> {
        let matches = self.feature_names.len() == expected.len()
            && self
                .feature_names
                .iter()
                .zip(expected.iter())
                .all(|(a, b)| a == b);
        if matches {
            Ok(())
        } else {
            Err(PipelineError::Invalid(format!(
                "artifact features [{}] do not match expected [{}]",
                self.feature_names.join(", "),
                expected.join(", ")
            )))
        }
    }

    /// Load and validate a pipeline from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self, PipelineError> {
        let bytes = std::fs::read(path).map_err(|source| PipelineError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let pipeline: Self =
            serde_json::from_slice(&bytes).map_err(|source| PipelineError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        pipeline.validate()?;
        Ok(pipeline)
    }

    /// Write the pipeline as JSON, creating parent directories as needed.
    pub fn save_json(&self, path: &Path) -> Result<(), PipelineError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| PipelineError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let bytes = serde_json::to_vec_pretty(self).map_err(PipelineError::Serialize)?;
        std::fs::write(path, bytes).map_err(|source| PipelineError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Standardize `row` and return `[P(class 0), P(class 1)]`.
    ///
    /// Any finite row is scored: standardization runs in `f64` and saturates
    /// into the `f32` range of the fitted classifier.
    pub fn predict_proba(&self, row: &[f64]) -> Result<Vec<f32>, PipelineError> {
        if row.len() != self.feature_names.len() {
            return Err(PipelineError::FeatureCount {
                expected: self.feature_names.len(),
                actual: row.len(),
            });
        }
        if let Some(idx) = row.iter().position(|v| !v.is_finite()) {
            return Err(PipelineError::NonFiniteFeature {
                name: self.feature_names[idx].clone(),
            });
        }
        let scaled = self
            .preprocessor
            .transform_saturating(row)
            .ok_or(PipelineError::FeatureCount {
                expected: self.preprocessor.dim(),
                actual: row.len(),
            })?;
        let proba = self.classifier.predict_proba(&scaled);
        let valid = proba.len() == 2
            && proba
                .iter()
                .all(|p| p.is_finite() && (0.0..=1.0).contains(p));
        if !valid {
            return Err(PipelineError::InvalidProbabilities);
        }
        Ok(proba)
    }

    /// Predicted class index (`0` or `1`) and its probability; ties go to class `0`.
    pub fn predict(&self, row: &[f64]) -> Result<(usize, f32), PipelineError> {
        let proba = self.predict_proba(row)?;
        let class = predicted_class(&proba);
        Ok((class, proba[class]))
    }
}

/// Argmax over class probabilities, preferring the lower index on ties.
pub fn predicted_class(proba: &[f32]) -> usize {
    let mut best = 0usize;
    let mut best_val = f32::NEG_INFINITY;
    for (idx, &p) in proba.iter().enumerate() {
        if p > best_val {
            best_val = p;
            best = idx;
        }
    }
    best
}
