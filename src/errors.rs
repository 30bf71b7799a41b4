use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;

/// Application-specific error types.
#[derive(Debug, Clone, PartialEq)]
pub enum AppError {
    /// Applicant input outside the accepted domain.
    BadRequest(String),
    /// A value handed to a core function lies outside its defined range
    /// (e.g. a probability that is not in [0, 1]).
    InvalidArgument(String),
    /// The feature row does not match what the classifier was trained on.
    SchemaMismatch(String),
    /// The classifier failed or returned an unusable output.
    ModelError(String),
    /// Internal server error.
    InternalError(String),
    /// Error with context chain for better debugging.
    WithContext {
        /// The underlying source of the error.
        source: Box<AppError>,
        /// Additional context message.
        context: String,
    },
}

impl fmt::Display for AppError {
    /// Formats the error for display.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            AppError::SchemaMismatch(msg) => write!(f, "Schema mismatch: {}", msg),
            AppError::ModelError(msg) => write!(f, "Model error: {}", msg),
            AppError::InternalError(msg) => write!(f, "Internal error: {}", msg),
            AppError::WithContext { source, context } => {
                write!(f, "{}: {}", context, source)
            }
        }
    }
}

impl std::error::Error for AppError {}

impl AppError {
    /// HTTP status the error maps to. Context wrappers report their source's status.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidArgument(_)
            | AppError::SchemaMismatch(_)
            | AppError::ModelError(_)
            | AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::WithContext { source, .. } => source.status_code(),
        }
    }
}

impl IntoResponse for AppError {
    /// Converts the error into an HTTP response.
    ///
    /// Maps each error variant to an appropriate HTTP status code and JSON body.
    /// Logs errors appropriately based on their severity.
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::InvalidArgument(msg) => {
                tracing::error!("Invalid argument: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Model returned an invalid probability".to_string(),
                )
            }
            AppError::SchemaMismatch(msg) => {
                tracing::error!("Schema mismatch: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Feature schema mismatch: {}", msg),
                )
            }
            AppError::ModelError(msg) => {
                tracing::error!("Model error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Model error".to_string())
            }
            AppError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::WithContext { source, context } => {
                tracing::error!("Error with context: {} -> {}", context, source);
                return source.as_ref().clone().into_response();
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

/// Extension trait for adding context to errors.
/// Similar to `anyhow::Context` but for our `AppError` type.
pub trait ResultExt<T> {
    /// Add context to an error.
    fn context(self, context: impl Into<String>) -> Result<T, AppError>;

    /// Add context lazily (only evaluated on error).
    fn with_context<F>(self, f: F) -> Result<T, AppError>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for Result<T, AppError> {
    fn context(self, context: impl Into<String>) -> Result<T, AppError> {
        self.map_err(|e| AppError::WithContext {
            source: Box::new(e),
            context: context.into(),
        })
    }

    fn with_context<F>(self, f: F) -> Result<T, AppError>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| AppError::WithContext {
            source: Box::new(e),
            context: f(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::BadRequest("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::SchemaMismatch("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_context_keeps_source_status() {
        let result: Result<(), AppError> = Err(AppError::BadRequest("loan_amnt".into()));
        let err = result.context("building feature row").unwrap_err();

        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            err.to_string(),
            "building feature row: Bad request: loan_amnt"
        );
    }

    #[test]
    fn test_into_response_status() {
        let response = AppError::BadRequest("dti out of range".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let wrapped = AppError::WithContext {
            source: Box::new(AppError::ModelError("boom".into())),
            context: "scoring".into(),
        };
        assert_eq!(
            wrapped.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
