use rand::rngs::StdRng;
use rand::{Rng, SeedableRng, seq::SliceRandom};

use super::model::{DecisionTree, RandomForestModel, TreeNode};

/// Training hyperparameters for the random forest candidate.
#[derive(Debug, Clone)]
pub struct TrainOptions {
    /// Number of trees in the ensemble.
    pub n_trees: usize,
    /// Maximum tree depth; `None` grows until leaves are pure.
    pub max_depth: Option<usize>,
    /// Minimum rows a node needs before it may split.
    pub min_samples_split: usize,
    /// Minimum rows on each side of a split.
    pub min_samples_leaf: usize,
    /// Candidate features per split; `None` uses `sqrt(n_features)`.
    pub max_features: Option<usize>,
    pub seed: u64,
}

impl Default for TrainOptions {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            seed: 42,
        }
    }
}

impl TrainOptions {
    /// Hyperparameters as `(name, value)` pairs for run tracking.
    pub fn params(&self) -> Vec<(String, String)> {
        let optional = |value: Option<usize>, unset: &str| {
            value.map(|v| v.to_string()).unwrap_or_else(|| unset.to_string())
        };
        vec![
            ("n_trees".to_string(), self.n_trees.to_string()),
            ("max_depth".to_string(), optional(self.max_depth, "none")),
            (
                "min_samples_split".to_string(),
                self.min_samples_split.to_string(),
            ),
            (
                "min_samples_leaf".to_string(),
                self.min_samples_leaf.to_string(),
            ),
            ("max_features".to_string(), optional(self.max_features, "sqrt")),
            ("seed".to_string(), self.seed.to_string()),
        ]
    }
}

/// Fit a random forest on binary labels.
pub fn train_forest(
    x: &[Vec<f32>],
    y: &[usize],
    options: &TrainOptions,
) -> Result<RandomForestModel, String> {
    if x.len() != y.len() {
        return Err("Mismatched X/Y lengths".to_string());
    }
    if x.is_empty() {
        return Err("Empty dataset".to_string());
    }
    if y.iter().any(|&label| label > 1) {
        return Err("Random forest expects binary labels".to_string());
    }
    if options.n_trees == 0 {
        return Err("Need at least 1 tree".to_string());
    }
    let d = x[0].len();
    if d == 0 || d > u16::MAX as usize {
        return Err(format!("Unsupported feature count {d}"));
    }
    if x.iter().any(|row| row.len() != d) {
        return Err("Inconsistent feature row length".to_string());
    }

    let max_features = options
        .max_features
        .unwrap_or_else(|| (d as f64).sqrt().floor() as usize)
        .clamp(1, d);
    let grower = TreeGrower {
        x,
        y,
        max_features,
        max_depth: options.max_depth,
        min_samples_split: options.min_samples_split.max(2),
        min_samples_leaf: options.min_samples_leaf.max(1),
    };

    let mut rng = StdRng::seed_from_u64(options.seed);
    let n = x.len();
    let mut trees = Vec::with_capacity(options.n_trees);
    for _tree in 0..options.n_trees {
        let bootstrap: Vec<usize> = (0..n).map(|_| rng.random_range(0..n)).collect();
        let mut nodes = Vec::new();
        grower.grow(&mut nodes, bootstrap, 0, &mut rng);
        trees.push(DecisionTree { nodes });
    }

    let model = RandomForestModel {
        feature_len: d,
        trees,
    };
    model.validate()?;
    Ok(model)
}

struct TreeGrower<'a> {
    x: &'a [Vec<f32>],
    y: &'a [usize],
    max_features: usize,
    max_depth: Option<usize>,
    min_samples_split: usize,
    min_samples_leaf: usize,
}

impl TreeGrower<'_> {
    /// Append the subtree for `rows` to `nodes` and return its root index.
    fn grow(
        &self,
        nodes: &mut Vec<TreeNode>,
        mut rows: Vec<usize>,
        depth: usize,
        rng: &mut StdRng,
    ) -> u32 {
        let idx = nodes.len();
        let positives = rows.iter().filter(|&&row| self.y[row] == 1).count();
        let leaf = TreeNode::Leaf {
            positive_fraction: positives as f32 / rows.len().max(1) as f32,
        };
        nodes.push(leaf);

        let pure = positives == 0 || positives == rows.len();
        let depth_reached = self.max_depth.is_some_and(|max| depth >= max);
        if pure || depth_reached || rows.len() < self.min_samples_split {
            return idx as u32;
        }
        let Some(split) = self.best_split(&mut rows, rng) else {
            return idx as u32;
        };

        let (left_rows, right_rows): (Vec<usize>, Vec<usize>) = rows
            .into_iter()
            .partition(|&row| self.x[row][split.feature_index] <= split.threshold);
        let left = self.grow(nodes, left_rows, depth + 1, rng);
        let right = self.grow(nodes, right_rows, depth + 1, rng);
        nodes[idx] = TreeNode::Split {
            feature_index: split.feature_index as u16,
            threshold: split.threshold,
            left,
            right,
        };
        idx as u32
    }

    /// Search features in random order until `max_features` non-constant ones were tried.
    fn best_split(&self, rows: &mut [usize], rng: &mut StdRng) -> Option<BestSplit> {
        let mut order: Vec<usize> = (0..self.x[0].len()).collect();
        order.shuffle(rng);

        let mut best: Option<BestSplit> = None;
        let mut tried = 0usize;
        for feature_idx in order {
            if tried >= self.max_features && best.is_some() {
                break;
            }
            rows.sort_by(|&a, &b| self.x[a][feature_idx].total_cmp(&self.x[b][feature_idx]));
            let first = self.x[rows[0]][feature_idx];
            let last = self.x[rows[rows.len() - 1]][feature_idx];
            if first == last {
                continue;
            }
            tried += 1;
            if let Some(split) = self.best_split_for_feature(rows, feature_idx) {
                if best.as_ref().is_none_or(|b| split.score < b.score) {
                    best = Some(split);
                }
            }
        }
        best
    }

    /// Scan thresholds between distinct sorted values, minimizing weighted Gini impurity.
    fn best_split_for_feature(&self, sorted: &[usize], feature_idx: usize) -> Option<BestSplit> {
        let total = sorted.len();
        let total_pos = sorted.iter().filter(|&&row| self.y[row] == 1).count();

        let mut best: Option<BestSplit> = None;
        let mut left_pos = 0usize;
        for split_at in 1..total {
            if self.y[sorted[split_at - 1]] == 1 {
                left_pos += 1;
            }
            let lo = self.x[sorted[split_at - 1]][feature_idx];
            let hi = self.x[sorted[split_at]][feature_idx];
            if lo == hi {
                continue;
            }
            let left_n = split_at;
            let right_n = total - split_at;
            if left_n < self.min_samples_leaf || right_n < self.min_samples_leaf {
                continue;
            }
            let score = left_n as f64 * gini(left_pos, left_n)
                + right_n as f64 * gini(total_pos - left_pos, right_n);
            if best.as_ref().is_none_or(|b| score < b.score) {
                let mid = lo + (hi - lo) / 2.0;
                let threshold = if mid < hi { mid } else { lo };
                best = Some(BestSplit {
                    score,
                    feature_index: feature_idx,
                    threshold,
                });
            }
        }
        best
    }
}

#[derive(Debug, Clone)]
struct BestSplit {
    score: f64,
    feature_index: usize,
    threshold: f32,
}

fn gini(positives: usize, count: usize) -> f64 {
    if count == 0 {
        return 0.0;
    }
    let p = positives as f64 / count as f64;
    2.0 * p * (1.0 - p)
}
