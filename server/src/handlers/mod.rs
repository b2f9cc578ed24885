// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
pub mod entries;
pub mod events;
pub mod lists;
pub mod priorities;
pub mod tags;

use crate::records::PayloadError;
use crate::validation::MissingReference;
use axum::{
    extract::Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

// --- Custom Error Handling ---
// Internal errors (e.g., from the database) are turned into
// appropriate HTTP responses here.

/// Our custom error type for the application.
#[derive(Debug)]
pub struct AppError {
    code: StatusCode,
    message: String,
    details: Vec<MissingReference>,
}

impl AppError {
    fn new(code: StatusCode, message: &str) -> Self {
        Self {
            code,
            message: message.to_string(),
            details: Vec::new(),
        }
    }

    /// A payload that failed validation, prefixed with the operation.
    fn invalid_payload(operation: &str, err: PayloadError) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            &format!("Failed to {operation}: {err}"),
        )
    }

    /// Relations pointing at records that do not exist.
    fn missing_references(operation: &str, missing: Vec<MissingReference>) -> Self {
        let ids: Vec<String> = missing
            .iter()
            .map(|m| format!("{} '{}'", m.field, m.id))
            .collect();
        Self {
            code: StatusCode::BAD_REQUEST,
            message: format!(
                "Failed to {operation}: referenced records do not exist ({}).",
                ids.join(", ")
            ),
            details: missing,
        }
    }

    fn not_found(kind: &str, id: &str) -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            &format!("{kind} with ID {id} not found."),
        )
    }
}

/// Allows converting an `anyhow::Error` (coming from `database.rs`)
/// into our `AppError`. Unique-name violations become conflicts.
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        if let Some(sqlx::Error::Database(db_err)) = err.downcast_ref::<sqlx::Error>() {
            if db_err.is_unique_violation() {
                tracing::error!("Unique constraint violated: {:?}", err);
                return Self::new(
                    StatusCode::CONFLICT,
                    "A record with this name already exists.",
                );
            }
        }

        // Log the internal error for debugging.
        tracing::error!("Internal server error: {:?}", err);
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "An internal error occurred.",
        )
    }
}

/// Allows Axum to convert our `AppError` into an HTTP `Response`.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        tracing::error!(
            "Responding with error: status_code={}, message={}",
            self.code.as_u16(),
            self.message
        );
        let body = if self.details.is_empty() {
            serde_json::json!({ "error": self.message })
        } else {
            serde_json::json!({ "error": self.message, "details": self.details })
        };
        (self.code, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_internal_errors_are_masked() {
        let err = AppError::from(anyhow::anyhow!("disk on fire"));
        assert_eq!(err.code, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message, "An internal error occurred.");
    }

    #[test]
    fn test_missing_references_name_the_operation() {
        let err = AppError::missing_references(
            "create entry",
            vec![MissingReference {
                field: "tags",
                collection: "tags",
                id: "abc".to_string(),
            }],
        );
        assert_eq!(err.code, StatusCode::BAD_REQUEST);
        assert_eq!(
            err.message,
            "Failed to create entry: referenced records do not exist (tags 'abc')."
        );
        assert_eq!(err.details.len(), 1);
    }
}
