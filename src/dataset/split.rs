//! Seeded train/test split.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use super::loader::{DatasetError, HeartDataset};

/// Fraction of rows held out for evaluation.
pub const DEFAULT_TEST_FRACTION: f64 = 0.2;
/// Seed used for the held-out split.
pub const DEFAULT_SPLIT_SEED: u64 = 42;

/// Shuffle row indices with `seed` and hold out `ceil(n * test_fraction)` rows.
///
/// Returns `(train, test)`. The same dataset, fraction and seed always produce
/// the same partition.
pub fn train_test_split(
    dataset: &HeartDataset,
    test_fraction: f64,
    seed: u64,
) -> Result<(HeartDataset, HeartDataset), DatasetError> {
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(DatasetError::InvalidTestFraction(test_fraction));
    }
    let rows = dataset.len();
    let test_len = (rows as f64 * test_fraction).ceil() as usize;
    if test_len == 0 || test_len >= rows {
        return Err(DatasetError::TooFewRows { rows });
    }

    let mut indices: Vec<usize> = (0..rows).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);
    let (test_idx, train_idx) = indices.split_at(test_len);
    Ok((dataset.subset(train_idx), dataset.subset(test_idx)))
}
