//! HTTP response handling for errors

use super::types::DisperserError;
use crate::core::dispatch::{FailedAction, FieldError};
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};

impl ResponseError for DisperserError {
    fn status_code(&self) -> StatusCode {
        match self {
            DisperserError::Validation(_) | DisperserError::Decode(_) => StatusCode::BAD_REQUEST,
            DisperserError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            DisperserError::BatchExecutionFailure(_) => StatusCode::BAD_GATEWAY,
            DisperserError::Serialization(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorResponse::from(self))
    }
}

impl From<&DisperserError> for ErrorResponse {
    fn from(err: &DisperserError) -> Self {
        let (error_code, message) = match err {
            DisperserError::Config(_) => ("CONFIG_ERROR", err.to_string()),
            DisperserError::Validation(_) => ("VALIDATION_ERROR", err.to_string()),
            DisperserError::Decode(_) => ("DECODE_ERROR", err.to_string()),
            DisperserError::BatchExecutionFailure(_) => {
                ("BATCH_EXECUTION_FAILURE", err.to_string())
            }
            DisperserError::Unauthorized(_) => ("UNAUTHORIZED", err.to_string()),
            DisperserError::Serialization(_) => ("INVALID_JSON", err.to_string()),
            _ => (
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            ),
        };

        let (correlation_id, fields, failed) = match err {
            DisperserError::Validation(err) => (None, err.errors().to_vec(), Vec::new()),
            DisperserError::BatchExecutionFailure(failure) => (
                Some(failure.correlation_id.clone()),
                Vec::new(),
                failure.failed.clone(),
            ),
            _ => (None, Vec::new(), Vec::new()),
        };

        ErrorResponse {
            error: ErrorDetail {
                code: error_code.to_string(),
                message,
                timestamp: chrono::Utc::now().timestamp(),
                correlation_id,
                fields,
                failed,
            },
        }
    }
}

/// Standard error response format
#[derive(Debug, serde::Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

/// Error detail structure
#[derive(Debug, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    pub timestamp: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldError>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failed: Vec<FailedAction>,
}
