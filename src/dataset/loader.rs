//! Loader for the raw heart-disease CSV.

use std::collections::{BTreeMap, HashSet};
use std::fs::File;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::patient::{FEATURE_NAMES, TARGET_COLUMN};

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to open dataset {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("missing column: {0}")]
    MissingColumn(String),
    #[error("invalid target value {value} on line {line} (expected 0 or 1)")]
    InvalidTarget { line: u64, value: f32 },
    #[error("dataset has no usable rows")]
    Empty,
    #[error("test fraction must be within (0, 1), got {0}")]
    InvalidTestFraction(f64),
    #[error("split of {rows} rows leaves an empty train or test set")]
    TooFewRows { rows: usize },
}

/// Cleaned tabular dataset: feature rows and binary targets.
#[derive(Debug, Clone)]
pub struct HeartDataset {
    /// Feature column names, in row order.
    pub feature_names: Vec<String>,
    /// Feature matrix, row-major.
    pub x: Vec<Vec<f32>>,
    /// Class indices (`0` or `1`) aligned with `x`.
    pub y: Vec<usize>,
}

/// Counts gathered while cleaning the raw file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleaningStats {
    pub rows_read: usize,
    pub dropped_missing: usize,
    pub dropped_duplicates: usize,
}

impl HeartDataset {
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Number of rows per class index.
    pub fn class_counts(&self) -> BTreeMap<usize, usize> {
        let mut counts = BTreeMap::new();
        for &label in &self.y {
            *counts.entry(label).or_insert(0) += 1;
        }
        counts
    }

    /// Copy the rows at `indices` into a new dataset.
    pub fn subset(&self, indices: &[usize]) -> HeartDataset {
        HeartDataset {
            feature_names: self.feature_names.clone(),
            x: indices.iter().map(|&idx| self.x[idx].clone()).collect(),
            y: indices.iter().map(|&idx| self.y[idx]).collect(),
        }
    }
}

/// Load the CSV at `path`, dropping incomplete and duplicate rows.
pub fn load_and_clean_data(path: &Path) -> Result<HeartDataset, DatasetError> {
    load_and_clean_data_with_stats(path).map(|(dataset, _)| dataset)
}

/// Like [`load_and_clean_data`], also returning how many rows were dropped.
pub fn load_and_clean_data_with_stats(
    path: &Path,
) -> Result<(HeartDataset, CleaningStats), DatasetError> {
    let file = File::open(path).map_err(|source| DatasetError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(file);

    let headers = reader.headers()?.clone();
    let column_index = |name: &str| {
        headers
            .iter()
            .position(|header| header == name)
            .ok_or_else(|| DatasetError::MissingColumn(name.to_string()))
    };
    let feature_columns = FEATURE_NAMES
        .iter()
        .map(|&name| column_index(name))
        .collect::<Result<Vec<_>, _>>()?;
    let target_column = column_index(TARGET_COLUMN)?;

    let mut stats = CleaningStats::default();
    let mut seen: HashSet<Vec<u32>> = HashSet::new();
    let mut x = Vec::new();
    let mut y = Vec::new();
    for record in reader.records() {
        let record = record?;
        stats.rows_read += 1;
        let line = record.position().map(|pos| pos.line()).unwrap_or(0);

        let mut row = Vec::with_capacity(feature_columns.len());
        for &column in &feature_columns {
            match record.get(column).and_then(parse_cell) {
                Some(value) => row.push(value),
                None => break,
            }
        }
        let target = record
            .get(target_column)
            .and_then(parse_cell)
            .filter(|_| row.len() == feature_columns.len());
        let Some(target) = target else {
            stats.dropped_missing += 1;
            continue;
        };
        let label = match target {
            t if t == 0.0 => 0usize,
            t if t == 1.0 => 1usize,
            value => return Err(DatasetError::InvalidTarget { line, value }),
        };

        let mut key: Vec<u32> = row.iter().map(|v| v.to_bits()).collect();
        key.push(label as u32);
        if !seen.insert(key) {
            stats.dropped_duplicates += 1;
            continue;
        }
        x.push(row);
        y.push(label);
    }

    if x.is_empty() {
        return Err(DatasetError::Empty);
    }
    let dataset = HeartDataset {
        feature_names: FEATURE_NAMES.iter().map(|name| name.to_string()).collect(),
        x,
        y,
    };
    Ok((dataset, stats))
}

fn parse_cell(raw: &str) -> Option<f32> {
    if raw.is_empty() || raw.eq_ignore_ascii_case("na") || raw == "?" {
        return None;
    }
    raw.parse::<f32>().ok().filter(|value| value.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const HEADER: &str = "age,sex,cp,trestbps,chol,fbs,restecg,thalach,exang,oldpeak,slope,ca,thal,target";

    fn write_csv(dir: &Path, body: &str) -> PathBuf {
        let path = dir.join("heart.csv");
        std::fs::write(&path, format!("{HEADER}\n{body}")).unwrap();
        path
    }

    #[test]
    fn loads_rows_in_feature_order() {
        let dir = tempdir().unwrap();
        let path = write_csv(
            dir.path(),
            "63,1,3,145,233,1,0,150,0,2.3,0,0,1,1\n37,1,2,130,250,0,1,187,0,3.5,0,0,2,0\n",
        );
        let loaded = load_and_clean_data(&path).unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.feature_names.len(), 13);
        assert_eq!(loaded.x[0][0], 63.0);
        assert_eq!(loaded.x[1][7], 187.0);
        assert_eq!(loaded.y, vec![1, 0]);
    }

    #[test]
    fn drops_missing_and_duplicate_rows() {
        let dir = tempdir().unwrap();
        let path = write_csv(
            dir.path(),
            "63,1,3,145,233,1,0,150,0,2.3,0,0,1,1\n\
             63,1,3,145,233,1,0,150,0,2.3,0,0,1,1\n\
             41,0,1,130,204,0,0,172,0,1.4,2,,2,1\n\
             56,1,1,120,236,0,1,178,0,0.8,2,0,NA,1\n\
             57,0,0,120,354,0,1,163,1,0.6,2,0,2,0\n",
        );
        let (loaded, stats) = load_and_clean_data_with_stats(&path).unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(stats.rows_read, 5);
        assert_eq!(stats.dropped_missing, 2);
        assert_eq!(stats.dropped_duplicates, 1);
        assert_eq!(loaded.class_counts().get(&0), Some(&1));
    }

    #[test]
    fn column_order_in_file_is_free() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("heart.csv");
        std::fs::write(
            &path,
            "target,thal,ca,slope,oldpeak,exang,thalach,restecg,fbs,chol,trestbps,cp,sex,age,extra\n\
             1,1,0,0,2.3,0,150,0,1,233,145,3,1,63,x\n",
        )
        .unwrap();
        let loaded = load_and_clean_data(&path).unwrap();
        assert_eq!(loaded.x[0][0], 63.0);
        assert_eq!(loaded.x[0][12], 1.0);
    }

    #[test]
    fn rejects_missing_target_column() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("heart.csv");
        std::fs::write(
            &path,
            "age,sex,cp,trestbps,chol,fbs,restecg,thalach,exang,oldpeak,slope,ca,thal\n63,1,3,145,233,1,0,150,0,2.3,0,0,1\n",
        )
        .unwrap();
        let err = load_and_clean_data(&path).unwrap_err();
        assert!(matches!(err, DatasetError::MissingColumn(name) if name == "target"));
    }

    #[test]
    fn rejects_non_binary_target() {
        let dir = tempdir().unwrap();
        let path = write_csv(dir.path(), "63,1,3,145,233,1,0,150,0,2.3,0,0,1,2\n");
        let err = load_and_clean_data(&path).unwrap_err();
        assert!(matches!(err, DatasetError::InvalidTarget { .. }));
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempdir().unwrap();
        let err = load_and_clean_data(&dir.path().join("absent.csv")).unwrap_err();
        assert!(matches!(err, DatasetError::Open { .. }));
    }
}
