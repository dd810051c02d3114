use heartwise::inference::Predictor;
use heartwise::ml::logreg::LogRegModel;
use heartwise::ml::pipeline::{Classifier, Pipeline};
use heartwise::ml::preprocess::StandardScaler;
use heartwise::patient::{FEATURE_COUNT, FEATURE_NAMES};
use serde_json::{Value, json};

/// Pipeline scoring positive when `cp` is above 1.5.
pub fn chest_pain_pipeline() -> Pipeline {
    let mut weights = vec![0.0; FEATURE_COUNT];
    weights[2] = 2.0;
    Pipeline::new(
        FEATURE_NAMES.iter().map(|name| name.to_string()).collect(),
        StandardScaler {
            mean: vec![1.5; FEATURE_COUNT],
            scale: vec![1.0; FEATURE_COUNT],
        },
        Classifier::LogisticRegression(LogRegModel {
            feature_len: FEATURE_COUNT,
            weights,
            bias: 0.0,
        }),
    )
}

pub fn predictor() -> Predictor {
    Predictor::new(chest_pain_pipeline()).expect("fixture pipeline is valid")
}

pub fn example_record() -> Value {
    json!({
        "age": 63, "sex": 1, "cp": 3, "trestbps": 145, "chol": 233, "fbs": 1,
        "restecg": 0, "thalach": 150, "exang": 0, "oldpeak": 2.3, "slope": 0,
        "ca": 0, "thal": 1
    })
}
