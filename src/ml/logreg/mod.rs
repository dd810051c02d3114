//! Binary logistic regression classifier over standardized feature rows.

use serde::{Deserialize, Serialize};

mod train;
pub use train::{TrainOptions, train_logreg};

/// Fitted logistic regression weights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRegModel {
    pub feature_len: usize,
    pub weights: Vec<f32>,
    pub bias: f32,
}

impl LogRegModel {
    /// Validate the model dimensions.
    pub fn validate(&self) -> Result<(), String> {
        if self.feature_len == 0 {
            return Err("logreg feature_len must be > 0".to_string());
        }
        if self.weights.len() != self.feature_len {
            return Err("logreg weights length mismatch".to_string());
        }
        if self.weights.iter().any(|w| !w.is_finite()) || !self.bias.is_finite() {
            return Err("logreg parameters must be finite".to_string());
        }
        Ok(())
    }

    /// Raw decision value `w . x + b`, accumulated in `f64` so saturated
    /// inputs of opposite sign cannot cancel into NaN.
    pub fn decision(&self, features: &[f32]) -> f64 {
        let mut sum = f64::from(self.bias);
        for (&w, &x) in self.weights.iter().zip(features.iter()) {
            sum += f64::from(w) * f64::from(x);
        }
        sum
    }

    /// Compute `[P(class 0), P(class 1)]` for a single row.
    pub fn predict_proba(&self, features: &[f32]) -> Vec<f32> {
        if features.len() != self.feature_len {
            return Vec::new();
        }
        // Out-of-range decisions become +-inf, which sigmoid maps to 1 or 0.
        let p = sigmoid(self.decision(features) as f32);
        vec![1.0 - p, p]
    }
}

/// Numerically stable logistic function.
pub fn sigmoid(z: f32) -> f32 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}
