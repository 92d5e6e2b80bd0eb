use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid parameter: {0}")]
    InvalidParam(String),

    #[error("Missing coordinates")]
    MissingCoordinates,

    #[error("Catalog error: {0}")]
    Catalog(String),

    #[error("External API error: {0}")]
    ExternalApi(String),

    #[error("Notification error: {0}")]
    Notification(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<glof_core::GlofError> for AppError {
    fn from(e: glof_core::GlofError) -> Self {
        AppError::InvalidParam(e.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidParam(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::InvalidParam(rejection.body_text())
    }
}

impl From<csv::Error> for AppError {
    fn from(e: csv::Error) -> Self {
        AppError::Catalog(e.to_string())
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    code: String,
}

impl AppError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::InvalidParam(_) => (StatusCode::BAD_REQUEST, "INVALID_PARAM"),
            AppError::MissingCoordinates => (StatusCode::BAD_REQUEST, "MISSING_COORDINATES"),
            AppError::Catalog(_) => (StatusCode::INTERNAL_SERVER_ERROR, "CATALOG_ERROR"),
            AppError::ExternalApi(_) => (StatusCode::BAD_GATEWAY, "EXTERNAL_API_ERROR"),
            AppError::Notification(_) => (StatusCode::BAD_GATEWAY, "NOTIFICATION_ERROR"),
            AppError::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "CONFIG_ERROR"),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        match &self {
            AppError::InvalidParam(param) => {
                tracing::warn!(param = %param, error_code = code, "Invalid parameter");
            }
            AppError::MissingCoordinates => {
                tracing::warn!(error_code = code, "Weather request without coordinates");
            }
            AppError::Catalog(msg) => {
                tracing::error!(message = %msg, error_code = code, "Lake catalog could not be read");
            }
            AppError::ExternalApi(msg) => {
                tracing::error!(message = %msg, error_code = code, "External API error");
            }
            AppError::Notification(msg) => {
                tracing::error!(message = %msg, error_code = code, "Notification delivery error");
            }
            AppError::Config(msg) => {
                tracing::error!(message = %msg, error_code = code, "Configuration error");
            }
            AppError::Internal(msg) => {
                tracing::error!(message = %msg, error_code = code, "Internal error occurred");
            }
        }

        tracing::debug!(
            status_code = %status.as_u16(),
            error_code = %code,
            error_message = %self.to_string(),
            "Returning error response"
        );

        let body = Json(ErrorResponse {
            error: self.to_string(),
            code: code.to_string(),
        });

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
