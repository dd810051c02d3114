//! Train the candidate pipelines on the raw dataset and save the best one.

use std::path::Path;

use heartwise::config::{EXPERIMENT_NAME, MODEL_PATH, RUNS_DIR, TRAINING_DATA_PATH};
use heartwise::logging;
use heartwise::tracking::ExperimentTracker;
use heartwise::training::{TrainingOptions, run_training};

fn main() {
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    if let Err(err) = logging::init(Path::new("logs")) {
        eprintln!("Logging disabled: {err}");
    }
    let tracker = ExperimentTracker::new(RUNS_DIR, EXPERIMENT_NAME);
    let report = run_training(
        Path::new(TRAINING_DATA_PATH),
        Path::new(MODEL_PATH),
        Some(&tracker),
        &TrainingOptions::default(),
    )?;
    let selected = report.selected_result();
    tracing::info!(
        "Saved {} (AUC {:.4}) to {MODEL_PATH}",
        selected.name,
        selected.metrics.roc_auc
    );
    println!("Model saved to {MODEL_PATH}");
    Ok(())
}
