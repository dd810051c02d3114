use actix_web::error::JsonPayloadError;
use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, ResponseError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::inference::InferenceError;

/// Request failures surfaced to HTTP clients.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The body did not match the patient record schema.
    #[error("{0}")]
    Validation(String),
    /// Featurization or scoring failed for a well-formed record.
    #[error(transparent)]
    Inference(#[from] InferenceError),
}

/// JSON error body, `{"detail": "..."}`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Inference(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody {
            detail: self.to_string(),
        })
    }
}

/// Turn JSON extraction failures into validation errors.
pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    tracing::warn!("Rejected request body: {err}");
    ApiError::Validation(err.to_string()).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::pipeline::PipelineError;

    #[test]
    fn status_codes_follow_error_kind() {
        let validation = ApiError::Validation("missing field `age`".to_string());
        assert_eq!(validation.status_code(), StatusCode::UNPROCESSABLE_ENTITY);

        let inference = ApiError::from(InferenceError::Pipeline(
            PipelineError::InvalidProbabilities,
        ));
        assert_eq!(inference.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            inference.to_string(),
            "classifier produced invalid probabilities"
        );
    }
}
