use rand::{Rng, SeedableRng, seq::SliceRandom};
use rand::rngs::StdRng;

use super::{LogRegModel, sigmoid};

/// Training options for the logistic regression candidate.
#[derive(Debug, Clone)]
pub struct TrainOptions {
    pub epochs: usize,
    pub learning_rate: f32,
    pub l2: f32,
    pub batch_size: usize,
    pub seed: u64,
}

impl Default for TrainOptions {
    fn default() -> Self {
        Self {
            epochs: 1000,
            learning_rate: 0.05,
            l2: 1e-3,
            batch_size: 32,
            seed: 42,
        }
    }
}

impl TrainOptions {
    /// Hyperparameters as `(name, value)` pairs for run tracking.
    pub fn params(&self) -> Vec<(String, String)> {
        vec![
            ("epochs".to_string(), self.epochs.to_string()),
            ("learning_rate".to_string(), self.learning_rate.to_string()),
            ("l2".to_string(), self.l2.to_string()),
            ("batch_size".to_string(), self.batch_size.to_string()),
            ("seed".to_string(), self.seed.to_string()),
        ]
    }
}

/// Fit binary logistic regression with seeded mini-batch gradient descent.
pub fn train_logreg(
    x: &[Vec<f32>],
    y: &[usize],
    options: &TrainOptions,
) -> Result<LogRegModel, String> {
    if x.is_empty() || y.is_empty() {
        return Err("Empty training set".to_string());
    }
    if x.len() != y.len() {
        return Err("Mismatched training inputs/labels".to_string());
    }
    if y.iter().any(|&label| label > 1) {
        return Err("Logistic regression expects binary labels".to_string());
    }
    let dim = x[0].len();
    if dim == 0 {
        return Err("Feature rows are empty".to_string());
    }
    for row in x {
        if row.len() != dim {
            return Err("Inconsistent feature row length".to_string());
        }
    }

    let mut rng = StdRng::seed_from_u64(options.seed);
    let mut weights = vec![0.0f32; dim];
    let mut bias = 0.0f32;
    for w in &mut weights {
        *w = (rng.random::<f32>() - 0.5) * 0.01;
    }

    let mut indices: Vec<usize> = (0..x.len()).collect();
    let batch_size = options.batch_size.max(1);
    let lr = options.learning_rate;
    let l2 = options.l2.max(0.0);

    for _epoch in 0..options.epochs {
        indices.shuffle(&mut rng);
        for chunk in indices.chunks(batch_size) {
            let mut grad_w = vec![0.0f32; dim];
            let mut grad_b = 0.0f32;
            for &idx in chunk {
                let row = &x[idx];
                let mut z = bias;
                for i in 0..dim {
                    z += weights[i] * row[i];
                }
                let diff = sigmoid(z) - y[idx] as f32;
                for i in 0..dim {
                    grad_w[i] += diff * row[i];
                }
                grad_b += diff;
            }
            let inv = 1.0 / chunk.len() as f32;
            for i in 0..dim {
                weights[i] -= lr * (grad_w[i] * inv + l2 * weights[i]);
            }
            bias -= lr * grad_b * inv;
        }
    }

    let model = LogRegModel {
        feature_len: dim,
        weights,
        bias,
    };
    model.validate()?;
    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn separable() -> (Vec<Vec<f32>>, Vec<usize>) {
        let mut x = Vec::new();
        let mut y = Vec::new();
        for i in 0..40 {
            let v = i as f32 / 10.0 - 2.0;
            x.push(vec![v, 0.5]);
            y.push(usize::from(v > 0.0));
        }
        (x, y)
    }

    #[test]
    fn learns_a_separable_boundary() {
        let (x, y) = separable();
        let options = TrainOptions {
            epochs: 200,
            ..TrainOptions::default()
        };
        let model = train_logreg(&x, &y, &options).unwrap();
        assert!(model.weights[0] > 0.0);
        assert!(model.predict_proba(&[1.5, 0.5])[1] > 0.9);
        assert!(model.predict_proba(&[-1.5, 0.5])[1] < 0.1);
    }

    #[test]
    fn same_seed_gives_same_weights() {
        let (x, y) = separable();
        let options = TrainOptions {
            epochs: 20,
            ..TrainOptions::default()
        };
        let a = train_logreg(&x, &y, &options).unwrap();
        let b = train_logreg(&x, &y, &options).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn rejects_non_binary_labels() {
        let err = train_logreg(&[vec![1.0]], &[2], &TrainOptions::default()).unwrap_err();
        assert!(err.contains("binary"));
    }
}
