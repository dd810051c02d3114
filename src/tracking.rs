//! File-based experiment tracking for training runs.
//!
//! Each run gets its own directory under `<root>/<experiment>/<run_id>/`
//! holding `run.json` (parameters and metrics) and `model.json` (the
//! candidate pipeline fitted in that run).

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use uuid::Uuid;

use crate::ml::pipeline::{Pipeline, PipelineError};

const RUN_FILE_NAME: &str = "run.json";
const MODEL_FILE_NAME: &str = "model.json";

#[derive(Debug, Error)]
pub enum TrackingError {
    #[error("failed to create run directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write run record {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to read run record {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("run record json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to format run timestamp: {0}")]
    FormatTime(#[from] time::error::Format),
    #[error(transparent)]
    Model(#[from] PipelineError),
}

/// Persisted description of one training run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    pub experiment: String,
    pub run_name: String,
    pub run_id: String,
    /// RFC 3339 start time (UTC).
    pub started_at: String,
    pub params: BTreeMap<String, String>,
    pub metrics: BTreeMap<String, f64>,
    /// Model file relative to the run directory, once logged.
    #[serde(default)]
    pub model_path: Option<String>,
}

/// Creates run directories under a fixed root for one experiment.
#[derive(Debug, Clone)]
pub struct ExperimentTracker {
    root: PathBuf,
    experiment: String,
}

impl ExperimentTracker {
    pub fn new(root: impl Into<PathBuf>, experiment: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            experiment: experiment.into(),
        }
    }

    pub fn experiment_dir(&self) -> PathBuf {
        self.root.join(&self.experiment)
    }

    /// Open a new run with a fresh id and start time.
    pub fn start_run(&self, run_name: &str) -> Result<ActiveRun, TrackingError> {
        let run_id = Uuid::new_v4().simple().to_string();
        let dir = self.experiment_dir().join(&run_id);
        std::fs::create_dir_all(&dir).map_err(|source| TrackingError::CreateDir {
            path: dir.clone(),
            source,
        })?;
        let started_at = OffsetDateTime::now_utc().format(&Rfc3339)?;
        tracing::info!("Started run {run_name} ({run_id}) in {}", dir.display());
        Ok(ActiveRun {
            dir,
            record: RunRecord {
                experiment: self.experiment.clone(),
                run_name: run_name.to_string(),
                run_id,
                started_at,
                params: BTreeMap::new(),
                metrics: BTreeMap::new(),
                model_path: None,
            },
        })
    }

    /// Read every run record of the experiment, ordered by start time.
    pub fn list_runs(&self) -> Result<Vec<RunRecord>, TrackingError> {
        let dir = self.experiment_dir();
        if !dir.is_dir() {
            return Ok(Vec::new());
        }
        let entries = std::fs::read_dir(&dir).map_err(|source| TrackingError::Read {
            path: dir.clone(),
            source,
        })?;
        let mut runs = Vec::new();
        for entry in entries.filter_map(|entry| entry.ok()) {
            let path = entry.path().join(RUN_FILE_NAME);
            if !path.is_file() {
                continue;
            }
            let bytes = std::fs::read(&path).map_err(|source| TrackingError::Read {
                path: path.clone(),
                source,
            })?;
            runs.push(serde_json::from_slice::<RunRecord>(&bytes)?);
        }
        runs.sort_by(|a, b| {
            a.started_at
                .cmp(&b.started_at)
                .then_with(|| a.run_id.cmp(&b.run_id))
        });
        Ok(runs)
    }
}

/// A run in progress; every logging call rewrites `run.json`.
#[derive(Debug)]
pub struct ActiveRun {
    dir: PathBuf,
    record: RunRecord,
}

impl ActiveRun {
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn record(&self) -> &RunRecord {
        &self.record
    }

    pub fn log_params<I, K, V>(&mut self, params: I) -> Result<(), TrackingError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (key, value) in params {
            self.record.params.insert(key.into(), value.into());
        }
        self.flush()
    }

    pub fn log_metrics<I, K>(&mut self, metrics: I) -> Result<(), TrackingError>
    where
        I: IntoIterator<Item = (K, f64)>,
        K: Into<String>,
    {
        for (key, value) in metrics {
            self.record.metrics.insert(key.into(), value);
        }
        self.flush()
    }

    /// Store the run's fitted pipeline next to its record.
    pub fn log_model(&mut self, pipeline: &Pipeline) -> Result<(), TrackingError> {
        pipeline.save_json(&self.dir.join(MODEL_FILE_NAME))?;
        self.record.model_path = Some(MODEL_FILE_NAME.to_string());
        self.flush()
    }

    fn flush(&self) -> Result<(), TrackingError> {
        let path = self.dir.join(RUN_FILE_NAME);
        let bytes = serde_json::to_vec_pretty(&self.record)?;
        std::fs::write(&path, bytes).map_err(|source| TrackingError::Write { path, source })
    }
}
