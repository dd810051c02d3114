//! Fit, evaluate and select between the candidate pipelines.

use std::path::Path;

use crate::dataset::{self, HeartDataset};
use crate::ml::forest::{self, train_forest};
use crate::ml::logreg::{self, train_logreg};
use crate::ml::metrics::{ConfusionMatrix, EvalMetrics, accuracy, roc_auc};
use crate::ml::pipeline::{Classifier, Pipeline, predicted_class};
use crate::ml::preprocess::StandardScaler;
use crate::tracking::ExperimentTracker;

/// Estimator fitted inside a candidate pipeline.
#[derive(Debug, Clone)]
pub enum Candidate {
    LogisticRegression(logreg::TrainOptions),
    RandomForest(forest::TrainOptions),
}

impl Candidate {
    pub fn name(&self) -> &'static str {
        match self {
            Candidate::LogisticRegression(_) => "LogisticRegression",
            Candidate::RandomForest(_) => "RandomForest",
        }
    }

    pub fn params(&self) -> Vec<(String, String)> {
        match self {
            Candidate::LogisticRegression(options) => options.params(),
            Candidate::RandomForest(options) => options.params(),
        }
    }

    fn fit(&self, x: &[Vec<f32>], y: &[usize]) -> Result<Classifier, String> {
        match self {
            Candidate::LogisticRegression(options) => {
                train_logreg(x, y, options).map(Classifier::LogisticRegression)
            }
            Candidate::RandomForest(options) => {
                train_forest(x, y, options).map(Classifier::RandomForest)
            }
        }
    }
}

/// The two candidates compared by the training program, in evaluation order.
pub fn default_candidates() -> Vec<Candidate> {
    vec![
        Candidate::LogisticRegression(logreg::TrainOptions::default()),
        Candidate::RandomForest(forest::TrainOptions::default()),
    ]
}

/// Settings for one training session.
#[derive(Debug, Clone)]
pub struct TrainingOptions {
    pub test_fraction: f64,
    pub split_seed: u64,
    pub candidates: Vec<Candidate>,
}

impl Default for TrainingOptions {
    fn default() -> Self {
        Self {
            test_fraction: dataset::DEFAULT_TEST_FRACTION,
            split_seed: dataset::DEFAULT_SPLIT_SEED,
            candidates: default_candidates(),
        }
    }
}

/// Held-out result of one fitted candidate.
#[derive(Debug, Clone)]
pub struct CandidateResult {
    pub name: &'static str,
    pub metrics: EvalMetrics,
    pub run_id: Option<String>,
}

/// Outcome of a training session.
#[derive(Debug, Clone)]
pub struct TrainingReport {
    pub train_rows: usize,
    pub test_rows: usize,
    pub candidates: Vec<CandidateResult>,
    /// Index into `candidates` of the selected pipeline.
    pub selected: usize,
    pub pipeline: Pipeline,
}

impl TrainingReport {
    pub fn selected_result(&self) -> &CandidateResult {
        &self.candidates[self.selected]
    }
}

/// Fit the standard scaler plus `candidate` on the training split.
pub fn fit_pipeline(train: &HeartDataset, candidate: &Candidate) -> Result<Pipeline, String> {
    let scaler = StandardScaler::fit(&train.x)?;
    let scaled = scaler.transform_all(&train.x)?;
    let classifier = candidate.fit(&scaled, &train.y)?;
    let pipeline = Pipeline::new(train.feature_names.clone(), scaler, classifier);
    pipeline.validate().map_err(|err| err.to_string())?;
    Ok(pipeline)
}

/// Accuracy and ROC AUC of `pipeline` on a held-out split.
pub fn evaluate(pipeline: &Pipeline, test: &HeartDataset) -> Result<EvalMetrics, String> {
    let mut predicted = Vec::with_capacity(test.len());
    let mut scores = Vec::with_capacity(test.len());
    for row in &test.x {
        let row: Vec<f64> = row.iter().copied().map(f64::from).collect();
        let proba = pipeline.predict_proba(&row).map_err(|err| err.to_string())?;
        predicted.push(predicted_class(&proba));
        scores.push(proba[1]);
    }
    let cm = ConfusionMatrix::from_predictions(2, &test.y, &predicted);
    Ok(EvalMetrics {
        accuracy: accuracy(&cm),
        roc_auc: roc_auc(&test.y, &scores)?,
    })
}

/// Split, fit every candidate, track each run, and keep the highest-AUC pipeline.
///
/// Candidates are compared in order with a strict `>`, so the earlier one wins
/// ties. Any failure aborts the whole session.
pub fn train_and_select(
    data: &HeartDataset,
    options: &TrainingOptions,
    tracker: Option<&ExperimentTracker>,
) -> Result<TrainingReport, String> {
    if options.candidates.is_empty() {
        return Err("No candidate models configured".to_string());
    }
    let (train, test) = dataset::train_test_split(data, options.test_fraction, options.split_seed)
        .map_err(|err| err.to_string())?;
    tracing::info!(
        "Training on {} rows, evaluating on {} rows",
        train.len(),
        test.len()
    );

    let mut results = Vec::with_capacity(options.candidates.len());
    let mut best: Option<(usize, f32, Pipeline)> = None;
    for candidate in &options.candidates {
        let mut pipeline = fit_pipeline(&train, candidate)?;
        let metrics = evaluate(&pipeline, &test)?;
        pipeline.metrics = Some(metrics);

        let run_id = match tracker {
            Some(tracker) => {
                let mut run = tracker
                    .start_run(candidate.name())
                    .map_err(|err| err.to_string())?;
                run.log_params(candidate.params())
                    .map_err(|err| err.to_string())?;
                run.log_metrics([
                    ("accuracy", metrics.accuracy as f64),
                    ("roc_auc", metrics.roc_auc as f64),
                ])
                .map_err(|err| err.to_string())?;
                run.log_model(&pipeline).map_err(|err| err.to_string())?;
                Some(run.record().run_id.clone())
            }
            None => None,
        };

        println!("{} - AUC: {:.4}", candidate.name(), metrics.roc_auc);
        tracing::info!(
            "{}: accuracy={:.4} roc_auc={:.4}",
            candidate.name(),
            metrics.accuracy,
            metrics.roc_auc
        );

        let idx = results.len();
        results.push(CandidateResult {
            name: candidate.name(),
            metrics,
            run_id,
        });
        if best
            .as_ref()
            .is_none_or(|(_, best_auc, _)| metrics.roc_auc > *best_auc)
        {
            best = Some((idx, metrics.roc_auc, pipeline));
        }
    }

    let Some((selected, _, pipeline)) = best else {
        return Err("No candidate produced a pipeline".to_string());
    };
    tracing::info!("Selected {}", results[selected].name);
    Ok(TrainingReport {
        train_rows: train.len(),
        test_rows: test.len(),
        candidates: results,
        selected,
        pipeline,
    })
}

/// Full training program: load the CSV, select a pipeline, and write it to `model_out`.
pub fn run_training(
    data_path: &Path,
    model_out: &Path,
    tracker: Option<&ExperimentTracker>,
    options: &TrainingOptions,
) -> Result<TrainingReport, String> {
    let (data, stats) =
        dataset::load_and_clean_data_with_stats(data_path).map_err(|err| err.to_string())?;
    tracing::info!(
        "Loaded {} rows from {} ({} incomplete, {} duplicate rows dropped)",
        data.len(),
        data_path.display(),
        stats.dropped_missing,
        stats.dropped_duplicates
    );
    let report = train_and_select(&data, options, tracker)?;
    report
        .pipeline
        .save_json(model_out)
        .map_err(|err| err.to_string())?;
    Ok(report)
}
