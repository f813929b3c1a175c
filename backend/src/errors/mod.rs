//! Error handling module for the flashcards backend.
//!
//! Maps persistence errors to HTTP status codes and `{"detail": ...}` bodies.

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::db::DbError;

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    /// Resource not found
    NotFound(String),
    /// Request could not be read (malformed JSON, wrong content type)
    BadRequest { status: StatusCode, message: String },
    /// Request or integrity validation failed
    Validation {
        message: String,
        fields: Vec<String>,
        object_id: Option<i64>,
    },
    /// Referenced row does not exist
    ForeignKey {
        message: String,
        object_id: Option<i64>,
    },
    /// Database error
    Database(String),
    /// Internal server error
    Internal(String),
}

impl AppError {
    /// Request validation failure on a single field.
    pub fn invalid(field: &str, message: impl Into<String>) -> Self {
        AppError::Validation {
            message: message.into(),
            fields: vec![field.to_string()],
            object_id: None,
        }
    }

    fn unparsable(message: String) -> Self {
        AppError::Validation {
            message,
            fields: Vec::new(),
            object_id: None,
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest { status, .. } => *status,
            AppError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::ForeignKey { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error message.
    pub fn message(&self) -> String {
        match self {
            AppError::NotFound(msg) => msg.clone(),
            AppError::BadRequest { message, .. } => message.clone(),
            AppError::Validation { message, .. } => message.clone(),
            AppError::ForeignKey { message, .. } => message.clone(),
            AppError::Database(msg) => msg.clone(),
            AppError::Internal(msg) => msg.clone(),
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.status_code(), self.message())
    }
}

impl std::error::Error for AppError {}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        tracing::error!("Database error: {:?}", err);
        AppError::Database(format!("Database error: {}", err))
    }
}

impl From<DbError> for AppError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Validation {
                message,
                fields,
                object_id,
            } => AppError::Validation {
                message,
                fields,
                object_id,
            },
            DbError::ForeignKey { message, object_id } => {
                AppError::ForeignKey { message, object_id }
            }
            DbError::RowNotFound { .. } => AppError::NotFound(err.to_string()),
            DbError::UnknownColumn { .. } => {
                tracing::error!("Invalid query: {}", err);
                AppError::Internal(err.to_string())
            }
            DbError::Sqlx(e) => e.into(),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::JsonDataError(err) => AppError::unparsable(err.body_text()),
            other => AppError::BadRequest {
                status: other.status(),
                message: other.body_text(),
            },
        }
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        match rejection {
            PathRejection::FailedToDeserializePathParams(err) => {
                AppError::unparsable(err.body_text())
            }
            other => {
                tracing::error!("Path extraction failed: {}", other.body_text());
                AppError::Internal(other.body_text())
            }
        }
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        match rejection {
            QueryRejection::FailedToDeserializeQueryString(err) => {
                AppError::unparsable(err.body_text())
            }
            other => AppError::BadRequest {
                status: other.status(),
                message: other.body_text(),
            },
        }
    }
}

/// Error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_id: Option<i64>,
}

impl ErrorResponse {
    pub fn new(error: &AppError) -> Self {
        let (fields, object_id) = match error {
            AppError::Validation {
                fields, object_id, ..
            } => (fields.clone(), *object_id),
            AppError::ForeignKey { object_id, .. } => (Vec::new(), *object_id),
            _ => (Vec::new(), None),
        };

        // Server-side details stay in the logs.
        let detail = if error.status_code().is_server_error() {
            "Internal server error".to_string()
        } else {
            error.message()
        };

        Self {
            detail,
            fields,
            object_id,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse::new(&self);
        (status, Json(body)).into_response()
    }
}
