//! Raw dataset loading and splitting for training.

pub mod loader;
pub mod split;

pub use loader::{
    CleaningStats, DatasetError, HeartDataset, load_and_clean_data,
    load_and_clean_data_with_stats,
};
pub use split::{DEFAULT_SPLIT_SEED, DEFAULT_TEST_FRACTION, train_test_split};
