//! Patient record schema accepted by the prediction endpoint.

use std::fmt;

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};

/// Number of numeric features carried by a patient record.
pub const FEATURE_COUNT: usize = 13;

/// Feature column names, in the order the pipeline expects them.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "age", "sex", "cp", "trestbps", "chol", "fbs", "restecg", "thalach", "exang", "oldpeak",
    "slope", "ca", "thal",
];

/// Name of the binary target column in the raw dataset.
pub const TARGET_COLUMN: &str = "target";

/// Label returned for a positive prediction.
pub const POSITIVE_LABEL: &str = "Heart Disease";
/// Label returned for every other prediction.
pub const NEGATIVE_LABEL: &str = "Normal";

/// One patient's clinical measurements.
///
/// Every field is required. Values are checked by type only: integer fields
/// accept JSON integers and whole-number floats (`63.0`) but reject fractional
/// numbers and strings; float fields accept any JSON number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientRecord {
    #[serde(deserialize_with = "whole_number")]
    pub age: i64,
    #[serde(deserialize_with = "whole_number")]
    pub sex: i64,
    /// Chest-pain type.
    #[serde(deserialize_with = "whole_number")]
    pub cp: i64,
    /// Resting blood pressure.
    #[serde(deserialize_with = "whole_number")]
    pub trestbps: i64,
    /// Serum cholesterol.
    #[serde(deserialize_with = "whole_number")]
    pub chol: i64,
    /// Fasting blood sugar flag.
    #[serde(deserialize_with = "whole_number")]
    pub fbs: i64,
    /// Resting ECG result.
    #[serde(deserialize_with = "whole_number")]
    pub restecg: i64,
    /// Maximum heart rate achieved.
    #[serde(deserialize_with = "whole_number")]
    pub thalach: i64,
    /// Exercise-induced angina flag.
    #[serde(deserialize_with = "whole_number")]
    pub exang: i64,
    /// ST depression induced by exercise.
    pub oldpeak: f64,
    #[serde(deserialize_with = "whole_number")]
    pub slope: i64,
    /// Number of major vessels.
    pub ca: f64,
    /// Thalassemia code.
    pub thal: f64,
}

impl PatientRecord {
    /// Build the single feature row fed to the pipeline, in [`FEATURE_NAMES`] order.
    pub fn to_feature_row(&self) -> Vec<f64> {
        vec![
            self.age as f64,
            self.sex as f64,
            self.cp as f64,
            self.trestbps as f64,
            self.chol as f64,
            self.fbs as f64,
            self.restecg as f64,
            self.thalach as f64,
            self.exang as f64,
            self.oldpeak,
            self.slope as f64,
            self.ca,
            self.thal,
        ]
    }
}

/// Deserialize an integer field from a JSON integer or an integral float.
fn whole_number<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    struct WholeNumber;

    impl Visitor<'_> for WholeNumber {
        type Value = i64;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("an integer")
        }

        fn visit_i64<E: de::Error>(self, value: i64) -> Result<i64, E> {
            Ok(value)
        }

        fn visit_u64<E: de::Error>(self, value: u64) -> Result<i64, E> {
            i64::try_from(value)
                .map_err(|_| E::invalid_value(de::Unexpected::Unsigned(value), &self))
        }

        fn visit_f64<E: de::Error>(self, value: f64) -> Result<i64, E> {
            // 2^63 is exact in f64; anything at or past it overflows i64.
            let limit = -(i64::MIN as f64);
            if value.fract() == 0.0 && (-limit..limit).contains(&value) {
                Ok(value as i64)
            } else {
                Err(E::invalid_value(de::Unexpected::Float(value), &self))
            }
        }
    }

    deserializer.deserialize_any(WholeNumber)
}

/// Scored response for a single patient record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Predicted class, `0` or `1`.
    pub prediction: u8,
    pub label: String,
    /// Probability of the predicted class, in `[0, 1]`.
    pub confidence: f32,
}

impl PredictionResult {
    pub fn new(prediction: u8, confidence: f32) -> Self {
        Self {
            prediction,
            label: label_for(prediction).to_string(),
            confidence,
        }
    }
}

/// Map a numeric prediction to its human-readable label.
pub fn label_for(prediction: u8) -> &'static str {
    if prediction == 1 {
        POSITIVE_LABEL
    } else {
        NEGATIVE_LABEL
    }
}
