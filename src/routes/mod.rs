/**
 * Routes Module
 * API route handlers
 */
use axum::{http::StatusCode, Json};
use serde::Serialize;

pub mod blog;
pub mod contact;
pub mod health;
pub mod portfolio;
pub mod settings;

/// Error response shared by every handler.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Confirmation response (delete, contact, settings).
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Map a persistence failure onto the API's two-bucket error taxonomy:
/// schema/constraint violations are the caller's fault (400), everything
/// else is a server failure (500). The raw database message is passed
/// through in both cases.
pub fn db_error(e: sqlx::Error) -> (StatusCode, Json<ErrorResponse>) {
    let status = match &e {
        sqlx::Error::Database(db) => match db.code().as_deref() {
            // not_null_violation, check_violation, unique_violation,
            // invalid_text_representation
            Some("23502") | Some("23514") | Some("23505") | Some("22P02") => {
                StatusCode::BAD_REQUEST
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        },
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };

    if status == StatusCode::BAD_REQUEST {
        tracing::warn!("Request rejected by schema constraint: {}", e);
    } else {
        tracing::error!("Database error: {}", e);
    }

    (
        status,
        Json(ErrorResponse {
            error: e.to_string(),
            message: None,
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_response_serializes() {
        let json = serde_json::to_string(&MessageResponse::new("done")).unwrap();
        assert_eq!(json, r#"{"message":"done"}"#);
    }

    #[test]
    fn test_error_response_omits_empty_message() {
        let json = serde_json::to_string(&ErrorResponse {
            error: "boom".to_string(),
            message: None,
        })
        .unwrap();
        assert_eq!(json, r#"{"error":"boom"}"#);
    }

    #[test]
    fn test_db_error_non_database_is_500() {
        let (status, _) = db_error(sqlx::Error::RowNotFound);
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
