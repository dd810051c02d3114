//! Random forest of CART trees for binary classification.
//!
//! Trees are grown on bootstrap samples with a random subset of candidate
//! features per split and serialized as flat node arrays, so a fitted forest
//! round-trips through JSON without any recursion in the data format.

mod model;
mod train;

pub use model::{DecisionTree, RandomForestModel, TreeNode};
pub use train::{TrainOptions, train_forest};
