//! Error types for every layer of the service.
//!
//! - [`RepositoryError`] - failures reported by a [`crate::domain::repositories::LinkRepository`]
//! - [`LinkError`] - outcomes of [`crate::application::services::LinkService`] operations
//! - [`AppError`] - HTTP-facing errors rendered as a JSON envelope
//!
//! # Response Format
//!
//! ```json
//! {
//!   "error": {
//!     "code": "not_found",
//!     "message": "Short link not found",
//!     "details": { "code": "abc1234" }
//!   }
//! }
//! ```

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};

/// Errors produced by the persistence collaborator.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// The code is already held by a row that is not deleted.
    #[error("code '{code}' is already taken")]
    UniqueViolation { code: String },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl RepositoryError {
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, Self::UniqueViolation { .. })
    }
}

/// Outcomes of link lifecycle operations that are not a success.
#[derive(Debug, thiserror::Error)]
pub enum LinkError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("alias '{0}' is already in use")]
    AliasBusy(String),

    #[error("link not found")]
    NotFound,

    #[error("link has expired")]
    Expired,

    #[error("failed to generate a unique code")]
    CodeGenerationExhausted,

    #[error(transparent)]
    Storage(#[from] RepositoryError),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: ErrorInfo,
}

/// Serializable error payload; the `error` member of every error response.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorInfo {
    pub code: &'static str,
    pub message: String,
    pub details: Value,
}

/// HTTP-facing application error.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{message}")]
    Validation { message: String, details: Value },
    #[error("{message}")]
    NotFound { message: String, details: Value },
    #[error("{message}")]
    Conflict { message: String, details: Value },
    #[error("{message}")]
    Internal { message: String, details: Value },
}

impl AppError {
    pub fn bad_request(message: impl Into<String>, details: Value) -> Self {
        Self::Validation {
            message: message.into(),
            details,
        }
    }
    pub fn not_found(message: impl Into<String>, details: Value) -> Self {
        Self::NotFound {
            message: message.into(),
            details,
        }
    }
    pub fn conflict(message: impl Into<String>, details: Value) -> Self {
        Self::Conflict {
            message: message.into(),
            details,
        }
    }
    pub fn internal(message: impl Into<String>, details: Value) -> Self {
        Self::Internal {
            message: message.into(),
            details,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Conflict { .. } => StatusCode::CONFLICT,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn to_error_info(&self) -> ErrorInfo {
        let (code, message, details) = match self {
            AppError::Validation { message, details } => ("validation_error", message, details),
            AppError::NotFound { message, details } => ("not_found", message, details),
            AppError::Conflict { message, details } => ("conflict", message, details),
            AppError::Internal { message, details } => ("internal_error", message, details),
        };

        ErrorInfo {
            code,
            message: message.clone(),
            details: details.clone(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.to_error_info(),
        };

        (self.status_code(), Json(body)).into_response()
    }
}

impl From<LinkError> for AppError {
    fn from(err: LinkError) -> Self {
        match err {
            LinkError::InvalidInput(reason) => {
                AppError::bad_request("Invalid input", json!({ "reason": reason }))
            }
            LinkError::AliasBusy(alias) => {
                AppError::conflict("Alias is already in use", json!({ "alias": alias }))
            }
            // Expired links are indistinguishable from unknown ones.
            LinkError::NotFound | LinkError::Expired => {
                AppError::not_found("Short link not found", json!({}))
            }
            LinkError::CodeGenerationExhausted => {
                tracing::error!("Short code generation exhausted its retry budget");
                AppError::internal(
                    "Failed to generate unique code",
                    json!({ "reason": "Too many collisions" }),
                )
            }
            LinkError::Storage(e) => {
                tracing::error!(error = %e, "Storage failure");
                AppError::internal("Database error", json!({}))
            }
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<String> = errors
            .field_errors()
            .keys()
            .map(|k| k.to_string())
            .collect();
        fields.sort();
        AppError::bad_request("Validation failed", json!({ "fields": fields }))
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::bad_request(
            "Malformed JSON body",
            json!({ "reason": rejection.body_text() }),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expired_and_not_found_render_identically() {
        let expired = AppError::from(LinkError::Expired);
        let missing = AppError::from(LinkError::NotFound);

        assert_eq!(expired.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(expired.to_string(), missing.to_string());
        assert_eq!(expired.to_error_info().details, missing.to_error_info().details);
    }

    #[test]
    fn test_link_error_status_mapping() {
        assert_eq!(
            AppError::from(LinkError::InvalidInput("empty url".into())).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::from(LinkError::AliasBusy("go".into())).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::from(LinkError::CodeGenerationExhausted).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::from(LinkError::Storage(RepositoryError::Database(
                sqlx::Error::PoolTimedOut
            )))
            .status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_error_info_codes() {
        assert_eq!(
            AppError::bad_request("x", json!({})).to_error_info().code,
            "validation_error"
        );
        assert_eq!(AppError::conflict("x", json!({})).to_error_info().code, "conflict");
        assert_eq!(
            AppError::internal("x", json!({})).to_error_info().code,
            "internal_error"
        );
    }

    #[test]
    fn test_unique_violation_predicate() {
        let err = RepositoryError::UniqueViolation {
            code: "abc".into(),
        };
        assert!(err.is_unique_violation());
        assert!(!RepositoryError::Database(sqlx::Error::RowNotFound).is_unique_violation());
    }
}
