use serde::{Deserialize, Serialize};

/// One node of a flattened decision tree. The root is node `0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum TreeNode {
    /// Internal split: `feature <= threshold` goes left.
    Split {
        feature_index: u16,
        threshold: f32,
        left: u32,
        right: u32,
    },
    /// Terminal node holding the fraction of positive training rows.
    Leaf { positive_fraction: f32 },
}

/// Single CART tree stored as a node array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    pub nodes: Vec<TreeNode>,
}

impl DecisionTree {
    /// Check node references and leaf values.
    ///
    /// Children must point past their parent, which keeps traversal acyclic.
    pub fn validate(&self, feature_len: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("tree has no nodes".to_string());
        }
        let len = self.nodes.len();
        for (idx, node) in self.nodes.iter().enumerate() {
            match *node {
                TreeNode::Split {
                    feature_index,
                    threshold,
                    left,
                    right,
                } => {
                    if feature_index as usize >= feature_len {
                        return Err(format!("node {idx} splits on unknown feature {feature_index}"));
                    }
                    if !threshold.is_finite() {
                        return Err(format!("node {idx} has a non-finite threshold"));
                    }
                    for child in [left as usize, right as usize] {
                        if child <= idx || child >= len {
                            return Err(format!("node {idx} has invalid child {child}"));
                        }
                    }
                }
                TreeNode::Leaf { positive_fraction } => {
                    if !(0.0..=1.0).contains(&positive_fraction) {
                        return Err(format!("leaf {idx} fraction out of range"));
                    }
                }
            }
        }
        Ok(())
    }

    /// Walk the tree and return the reached leaf's positive fraction.
    pub fn predict_positive(&self, features: &[f32]) -> f32 {
        let mut idx = 0usize;
        loop {
            match self.nodes.get(idx) {
                Some(TreeNode::Split {
                    feature_index,
                    threshold,
                    left,
                    right,
                }) => {
                    let value = features.get(*feature_index as usize).copied().unwrap_or(0.0);
                    idx = if value <= *threshold {
                        *left as usize
                    } else {
                        *right as usize
                    };
                }
                Some(TreeNode::Leaf { positive_fraction }) => return *positive_fraction,
                None => return 0.0,
            }
        }
    }
}

/// Bagged ensemble of decision trees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForestModel {
    pub feature_len: usize,
    pub trees: Vec<DecisionTree>,
}

impl RandomForestModel {
    pub fn validate(&self) -> Result<(), String> {
        if self.feature_len == 0 {
            return Err("forest feature_len must be > 0".to_string());
        }
        if self.trees.is_empty() {
            return Err("forest has no trees".to_string());
        }
        for (idx, tree) in self.trees.iter().enumerate() {
            tree.validate(self.feature_len)
                .map_err(|err| format!("tree {idx}: {err}"))?;
        }
        Ok(())
    }

    /// Average the trees' leaf fractions into `[P(class 0), P(class 1)]`.
    pub fn predict_proba(&self, features: &[f32]) -> Vec<f32> {
        if features.len() != self.feature_len || self.trees.is_empty() {
            return Vec::new();
        }
        let sum: f32 = self
            .trees
            .iter()
            .map(|tree| tree.predict_positive(features))
            .sum();
        let p = (sum / self.trees.len() as f32).clamp(0.0, 1.0);
        vec![1.0 - p, p]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stump(threshold: f32) -> DecisionTree {
        DecisionTree {
            nodes: vec![
                TreeNode::Split {
                    feature_index: 0,
                    threshold,
                    left: 1,
                    right: 2,
                },
                TreeNode::Leaf {
                    positive_fraction: 0.0,
                },
                TreeNode::Leaf {
                    positive_fraction: 1.0,
                },
            ],
        }
    }

    #[test]
    fn tree_predict_branches() {
        let tree = stump(0.5);
        tree.validate(1).unwrap();
        assert_eq!(tree.predict_positive(&[0.0]), 0.0);
        assert_eq!(tree.predict_positive(&[0.5]), 0.0);
        assert_eq!(tree.predict_positive(&[0.6]), 1.0);
    }

    #[test]
    fn forest_averages_trees() {
        let forest = RandomForestModel {
            feature_len: 1,
            trees: vec![stump(0.0), stump(1.0)],
        };
        forest.validate().unwrap();
        assert_eq!(forest.predict_proba(&[0.5]), vec![0.5, 0.5]);
        assert_eq!(forest.predict_proba(&[2.0]), vec![0.0, 1.0]);
    }

    #[test]
    fn validate_rejects_backward_children() {
        let mut tree = stump(0.5);
        tree.nodes[0] = TreeNode::Split {
            feature_index: 0,
            threshold: 0.5,
            left: 0,
            right: 2,
        };
        assert!(tree.validate(1).is_err());
        assert!(stump(0.5).validate(0).is_err());
    }

    #[test]
    fn nodes_serialize_with_tag() {
        let json = serde_json::to_string(&stump(0.5).nodes[1]).unwrap();
        assert_eq!(json, r#"{"node":"leaf","positive_fraction":0.0}"#);
    }
}
