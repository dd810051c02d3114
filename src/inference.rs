//! Request-scoped prediction on top of a loaded pipeline.

use std::path::Path;

use thiserror::Error;

use crate::ml::pipeline::{Pipeline, PipelineError};
use crate::patient::{FEATURE_NAMES, PatientRecord, PredictionResult};

/// Log target for prediction events.
pub const MONITOR_TARGET: &str = "api_monitor";

#[derive(Debug, Error)]
pub enum InferenceError {
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
    #[error("predicted class {0} is outside the binary label set")]
    UnexpectedClass(usize),
}

/// Read-only predictor shared by every request handler.
#[derive(Debug, Clone)]
pub struct Predictor {
    pipeline: Pipeline,
}

impl Predictor {
    /// Wrap an in-memory pipeline after checking it matches the patient schema.
    pub fn new(pipeline: Pipeline) -> Result<Self, PipelineError> {
        pipeline.validate()?;
        pipeline.ensure_features(&FEATURE_NAMES)?;
        Ok(Self { pipeline })
    }

    /// Load the artifact at `path`; any failure is fatal to the caller.
    pub fn load(path: &Path) -> Result<Self, PipelineError> {
        Self::new(Pipeline::load_json(path)?)
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Score one record: predicted class, its label, and the top class probability.
    pub fn predict(&self, record: &PatientRecord) -> Result<PredictionResult, InferenceError> {
        let (class, confidence) = self.pipeline.predict(&record.to_feature_row())?;
        let prediction = u8::try_from(class)
            .ok()
            .filter(|&c| c <= 1)
            .ok_or(InferenceError::UnexpectedClass(class))?;
        let result = PredictionResult::new(prediction, confidence);
        tracing::info!(
            target: MONITOR_TARGET,
            "PREDICTION_EVENT | Input: {:?} | Result: {} | Confidence: {:.2}",
            record,
            result.label,
            result.confidence
        );
        Ok(result)
    }
}
