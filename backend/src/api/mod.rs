//! REST API module.
//!
//! Handlers take the request's [`Session`](crate::db::Session) as an extractor
//! and delegate to the per-entity services.

mod cards;
mod decks;
mod extract;

pub use cards::*;
pub use decks::*;

use axum::{http::StatusCode, Json};

use crate::errors::AppError;

/// Response type for handlers returning a JSON body with status 200.
pub type ApiResult<T> = Result<Json<T>, AppError>;

/// Response type for handlers that create resources.
pub type CreatedResult<T> = Result<(StatusCode, Json<T>), AppError>;

/// Wrap a newly created resource in a 201 response.
pub fn created<T>(data: T) -> CreatedResult<T> {
    Ok((StatusCode::CREATED, Json(data)))
}

/// Reject blank required text fields.
fn require_text(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::invalid(field, format!("{} is required", field)));
    }
    Ok(())
}

/// Reject empty bulk payloads.
fn require_items<T>(items: &[T]) -> Result<(), AppError> {
    if items.is_empty() {
        return Err(AppError::Validation {
            message: "No items provided".to_string(),
            fields: Vec::new(),
            object_id: None,
        });
    }
    Ok(())
}
