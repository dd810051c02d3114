use actix_web::{HttpResponse, web};
use serde::{Deserialize, Serialize};

use super::error::{ApiError, json_error_handler};
use crate::inference::{MONITOR_TARGET, Predictor};
use crate::patient::{PatientRecord, PredictionResult};

/// Liveness payload for `/` and `/health`.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
}

/// Register the prediction and health routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .route("/", web::get().to(health_check))
        .route("/health", web::get().to(health_check))
        .route("/predict", web::post().to(predict));
}

async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(HealthStatus {
        status: "healthy".to_string(),
    })
}

async fn predict(
    predictor: web::Data<Predictor>,
    record: web::Json<PatientRecord>,
) -> Result<web::Json<PredictionResult>, ApiError> {
    let record = record.into_inner();
    match predictor.predict(&record) {
        Ok(result) => Ok(web::Json(result)),
        Err(err) => {
            tracing::error!(target: MONITOR_TARGET, "PREDICTION_ERROR | Message: {err}");
            Err(err.into())
        }
    }
}
