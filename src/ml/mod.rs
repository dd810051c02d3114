//! Machine learning building blocks for training and inference.
//!
//! Every stage works on plain row-major `Vec<f32>` features so fitted models
//! serialize straight to JSON and load without external ML runtimes.

pub mod forest;
pub mod logreg;
pub mod metrics;
pub mod pipeline;
pub mod preprocess;

pub use pipeline::{Classifier, Pipeline, PipelineError};
