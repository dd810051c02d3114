//! Feature standardization stage shared by every pipeline.

use serde::{Deserialize, Serialize};

/// Per-feature standard scaler (`(x - mean) / scale`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f32>,
    /// Population standard deviation; constant features store `1.0`.
    pub scale: Vec<f32>,
}

impl StandardScaler {
    /// Fit mean and scale on the rows of a training split.
    pub fn fit(rows: &[Vec<f32>]) -> Result<Self, String> {
        let Some(first) = rows.first() else {
            return Err("Cannot fit scaler on an empty dataset".to_string());
        };
        let d = first.len();
        if rows.iter().any(|row| row.len() != d) {
            return Err("Inconsistent feature row length".to_string());
        }

        let n = rows.len() as f64;
        let mut mean = vec![0.0f64; d];
        for row in rows {
            for i in 0..d {
                mean[i] += row[i] as f64;
            }
        }
        for v in &mut mean {
            *v /= n;
        }

        let mut var = vec![0.0f64; d];
        for row in rows {
            for i in 0..d {
                let diff = row[i] as f64 - mean[i];
                var[i] += diff * diff;
            }
        }
        let scale = var
            .into_iter()
            .map(|v| {
                let std = (v / n).sqrt();
                if std < 1e-12 { 1.0 } else { std as f32 }
            })
            .collect();

        Ok(Self {
            mean: mean.into_iter().map(|v| v as f32).collect(),
            scale,
        })
    }

    pub fn dim(&self) -> usize {
        self.mean.len()
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.mean.is_empty() {
            return Err("scaler has no features".to_string());
        }
        if self.scale.len() != self.mean.len() {
            return Err("scaler mean/scale length mismatch".to_string());
        }
        if self.scale.iter().any(|s| !s.is_finite() || *s <= 0.0) {
            return Err("scaler scale must be finite and > 0".to_string());
        }
        Ok(())
    }

    /// Standardize a single row. Returns `None` when the row length does not match.
    pub fn transform(&self, row: &[f32]) -> Option<Vec<f32>> {
        if row.len() != self.dim() {
            return None;
        }
        Some(
            row.iter()
                .zip(self.mean.iter().zip(self.scale.iter()))
                .map(|(&x, (&mean, &scale))| (x - mean) / scale)
                .collect(),
        )
    }

    /// Standardize a request row in `f64`, saturating each value into the
    /// finite `f32` range the classifiers work in. Returns `None` on a length
    /// mismatch or a non-finite input.
    pub fn transform_saturating(&self, row: &[f64]) -> Option<Vec<f32>> {
        if row.len() != self.dim() || row.iter().any(|x| !x.is_finite()) {
            return None;
        }
        Some(
            row.iter()
                .zip(self.mean.iter().zip(self.scale.iter()))
                .map(|(&x, (&mean, &scale))| {
                    let z = (x - f64::from(mean)) / f64::from(scale);
                    z.clamp(f64::from(f32::MIN), f64::from(f32::MAX)) as f32
                })
                .collect(),
        )
    }

    /// Standardize every row of a dataset.
    pub fn transform_all(&self, rows: &[Vec<f32>]) -> Result<Vec<Vec<f32>>, String> {
        rows.iter()
            .map(|row| {
                self.transform(row)
                    .ok_or_else(|| "Inconsistent feature row length".to_string())
            })
            .collect()
    }
}
