//! Heart disease classifier: training pipeline and HTTP prediction service.
/// Server configuration and fixed training paths.
pub mod config;
/// Raw CSV loading, cleaning and splitting.
pub mod dataset;
/// Prediction on top of a loaded pipeline.
pub mod inference;
/// Tracing subscriber setup.
pub mod logging;
/// Estimators, preprocessing, metrics and the serialized pipeline.
pub mod ml;
/// Patient record schema and prediction result.
pub mod patient;
/// actix-web routes and server bootstrap.
pub mod server;
/// File-based experiment tracking.
pub mod tracking;
/// Candidate fitting and model selection.
pub mod training;
