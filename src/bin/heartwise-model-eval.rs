//! Developer utility to evaluate a saved pipeline against a raw CSV.

use std::path::PathBuf;

use heartwise::dataset::{
    DEFAULT_SPLIT_SEED, DEFAULT_TEST_FRACTION, load_and_clean_data, train_test_split,
};
use heartwise::ml::metrics::{ConfusionMatrix, accuracy, precision_recall_by_class, roc_auc};
use heartwise::ml::pipeline::{Pipeline, predicted_class};
use heartwise::patient::label_for;

fn main() {
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

#[derive(Debug, Clone)]
struct CliOptions {
    model_path: PathBuf,
    data_path: PathBuf,
    split: Split,
    seed: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Split {
    Test,
    All,
}

fn run() -> Result<(), String> {
    let options = parse_args(std::env::args().skip(1).collect())?;
    let pipeline = Pipeline::load_json(&options.model_path).map_err(|err| err.to_string())?;
    let data = load_and_clean_data(&options.data_path).map_err(|err| err.to_string())?;
    if pipeline.feature_names != data.feature_names {
        return Err("Dataset columns do not match the model's features".to_string());
    }
    let data = match options.split {
        Split::All => data,
        Split::Test => {
            let (_, test) = train_test_split(&data, DEFAULT_TEST_FRACTION, options.seed)
                .map_err(|err| err.to_string())?;
            test
        }
    };

    let mut cm = ConfusionMatrix::new(2);
    let mut scores = Vec::with_capacity(data.len());
    for (row, &truth) in data.x.iter().zip(data.y.iter()) {
        let row: Vec<f64> = row.iter().copied().map(f64::from).collect();
        let proba = pipeline.predict_proba(&row).map_err(|err| err.to_string())?;
        cm.add(truth, predicted_class(&proba));
        scores.push(proba[1]);
    }

    println!("model: {}", pipeline.classifier.name());
    println!("rows: {}", data.len());
    println!("accuracy: {:.4}", accuracy(&cm));
    match roc_auc(&data.y, &scores) {
        Ok(auc) => println!("roc auc: {auc:.4}"),
        Err(err) => println!("roc auc: n/a ({err})"),
    }
    for (idx, stats) in precision_recall_by_class(&cm).iter().enumerate() {
        println!(
            "class {} {:<14}  precision={:.3}  recall={:.3}  support={}",
            idx,
            label_for(idx as u8),
            stats.precision,
            stats.recall,
            stats.support
        );
    }
    println!("confusion matrix (rows=true, cols=pred):");
    for truth in 0..cm.n_classes {
        let mut row = String::new();
        for pred in 0..cm.n_classes {
            row.push_str(&format!("{:6}", cm.get(truth, pred)));
        }
        println!("{row}");
    }
    Ok(())
}

fn parse_args(args: Vec<String>) -> Result<CliOptions, String> {
    let mut model_path: Option<PathBuf> = None;
    let mut data_path: Option<PathBuf> = None;
    let mut split = Split::Test;
    let mut seed = DEFAULT_SPLIT_SEED;

    let mut idx = 0usize;
    while idx < args.len() {
        match args[idx].as_str() {
            "-h" | "--help" => return Err(help_text()),
            "--model" => {
                idx += 1;
                let value = args.get(idx).ok_or_else(|| "--model requires a value".to_string())?;
                model_path = Some(PathBuf::from(value));
            }
            "--data" => {
                idx += 1;
                let value = args.get(idx).ok_or_else(|| "--data requires a value".to_string())?;
                data_path = Some(PathBuf::from(value));
            }
            "--split" => {
                idx += 1;
                let value = args.get(idx).ok_or_else(|| "--split requires a value".to_string())?;
                split = match value.as_str() {
                    "test" => Split::Test,
                    "all" => Split::All,
                    _ => return Err(format!("Invalid --split value: {value}")),
                };
            }
            "--seed" => {
                idx += 1;
                let value = args.get(idx).ok_or_else(|| "--seed requires a value".to_string())?;
                seed = value
                    .parse::<u64>()
                    .map_err(|_| format!("Invalid --seed value: {value}"))?;
            }
            unknown => return Err(format!("Unknown argument: {unknown}\n\n{}", help_text())),
        }
        idx += 1;
    }

    let model_path = model_path.ok_or_else(|| "--model is required".to_string())?;
    let data_path = data_path.ok_or_else(|| "--data is required".to_string())?;
    Ok(CliOptions {
        model_path,
        data_path,
        split,
        seed,
    })
}

fn help_text() -> String {
    [
        "heartwise-model-eval",
        "",
        "Usage:",
        "  heartwise-model-eval --model <model.json> --data <heart.csv> [options]",
        "",
        "Options:",
        "  --split <test|all>  Rows to evaluate (default: test).",
        "  --seed <n>          Seed for the 80/20 split (default: 42).",
    ]
    .join("\n")
}
