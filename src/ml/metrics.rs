//! Evaluation metrics for classification models.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone)]
/// Confusion matrix for a `K`-class classifier.
pub struct ConfusionMatrix {
    /// Number of classes.
    pub n_classes: usize,
    /// Row-major `KxK` counts (`truth * K + predicted`).
    pub counts: Vec<u32>,
}

impl ConfusionMatrix {
    /// Create an empty `KxK` confusion matrix.
    pub fn new(n_classes: usize) -> Self {
        Self {
            n_classes,
            counts: vec![0; n_classes * n_classes],
        }
    }

    /// Build a matrix from aligned truth/prediction slices.
    pub fn from_predictions(n_classes: usize, truth: &[usize], predicted: &[usize]) -> Self {
        let mut cm = Self::new(n_classes);
        for (&t, &p) in truth.iter().zip(predicted.iter()) {
            cm.add(t, p);
        }
        cm
    }

    pub fn add(&mut self, truth: usize, predicted: usize) {
        if truth >= self.n_classes || predicted >= self.n_classes {
            return;
        }
        let idx = truth * self.n_classes + predicted;
        self.counts[idx] = self.counts[idx].saturating_add(1);
    }

    pub fn get(&self, truth: usize, predicted: usize) -> u32 {
        self.counts[truth * self.n_classes + predicted]
    }
}

#[derive(Debug, Clone)]
/// Precision/recall statistics for a single class.
pub struct PerClassStats {
    /// `TP / (TP + FP)`.
    pub precision: f32,
    /// `TP / (TP + FN)`.
    pub recall: f32,
    /// Total number of true examples for the class.
    pub support: u32,
}

/// Held-out metrics recorded for a trained pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvalMetrics {
    pub accuracy: f32,
    pub roc_auc: f32,
}

/// Compute per-class precision and recall from a confusion matrix.
pub fn precision_recall_by_class(cm: &ConfusionMatrix) -> Vec<PerClassStats> {
    let k = cm.n_classes;
    let mut stats = Vec::with_capacity(k);
    for class_idx in 0..k {
        let tp = cm.get(class_idx, class_idx) as f32;
        let mut fp = 0f32;
        let mut fn_ = 0f32;
        let mut support = 0u32;
        for j in 0..k {
            let v = cm.get(class_idx, j);
            support = support.saturating_add(v);
            if j != class_idx {
                fn_ += v as f32;
            }
        }
        for i in 0..k {
            if i != class_idx {
                fp += cm.get(i, class_idx) as f32;
            }
        }
        let precision = if tp + fp == 0.0 { 0.0 } else { tp / (tp + fp) };
        let recall = if tp + fn_ == 0.0 { 0.0 } else { tp / (tp + fn_) };
        stats.push(PerClassStats {
            precision,
            recall,
            support,
        });
    }
    stats
}

/// Compute overall accuracy from a confusion matrix.
pub fn accuracy(cm: &ConfusionMatrix) -> f32 {
    let mut correct = 0u64;
    let mut total = 0u64;
    for truth in 0..cm.n_classes {
        for predicted in 0..cm.n_classes {
            let v = cm.get(truth, predicted) as u64;
            total += v;
            if truth == predicted {
                correct += v;
            }
        }
    }
    if total == 0 {
        0.0
    } else {
        (correct as f32) / (total as f32)
    }
}

/// Area under the ROC curve for binary labels and positive-class scores.
///
/// Uses the rank-sum statistic with average ranks for tied scores, which
/// equals the trapezoidal area under the ROC curve. Fails when only one class
/// is present or a score is not finite.
pub fn roc_auc(truth: &[usize], scores: &[f32]) -> Result<f32, String> {
    if truth.len() != scores.len() {
        return Err("Mismatched label/score lengths".to_string());
    }
    if scores.iter().any(|s| !s.is_finite()) {
        return Err("Scores must be finite".to_string());
    }
    let positives = truth.iter().filter(|&&t| t == 1).count();
    let negatives = truth.len() - positives;
    if positives == 0 || negatives == 0 {
        return Err("ROC AUC is undefined when only one class is present".to_string());
    }

    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[a].total_cmp(&scores[b]));

    let mut positive_rank_sum = 0f64;
    let mut start = 0usize;
    while start < order.len() {
        let mut end = start + 1;
        while end < order.len() && scores[order[end]] == scores[order[start]] {
            end += 1;
        }
        // Ranks are 1-based; tied scores share the mean of their ranks.
        let avg_rank = (start + 1 + end) as f64 / 2.0;
        for &idx in &order[start..end] {
            if truth[idx] == 1 {
                positive_rank_sum += avg_rank;
            }
        }
        start = end;
    }

    let p = positives as f64;
    let n = negatives as f64;
    let u = positive_rank_sum - p * (p + 1.0) / 2.0;
    Ok((u / (p * n)) as f32)
}
