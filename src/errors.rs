use axum::{http::StatusCode, response::IntoResponse, Json};

use crate::{
    http_server::HttpServerError, models::signature::ErrorResponse,
    services::request_validator::ValidationError,
};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(#[from] ValidationError),
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("HTTP server error: {0}")]
    Server(#[from] HttpServerError),
    #[error("Logging setup failed: {0}")]
    Logging(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            AppError::Validation(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            AppError::Config(_) | AppError::Server(_) | AppError::Logging(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                String::from("Internal server error."),
            ),
        };

        (status, Json(ErrorResponse { error })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn validation_error_is_bad_request_with_message() {
        let response = AppError::Validation(ValidationError::Empty("message")).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "\"message\" is not allowed to be empty");
    }

    #[tokio::test]
    async fn internal_errors_hide_detail() {
        let response = AppError::Logging("subscriber already set".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "Internal server error.");
    }
}
