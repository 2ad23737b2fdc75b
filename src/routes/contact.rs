/**
 * Contact Routes
 * Write-once contact messages: created via POST, listed via GET
 */
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;

use crate::db::models::ContactMessage;
use crate::routes::{db_error, MessageResponse};
use crate::AppState;

/// Request body for POST /api/contact. Fields are optional here so that
/// missing required ones surface as schema violations (400), not decode
/// errors.
#[derive(Debug, Deserialize)]
pub struct ContactForm {
    pub name: Option<String>,
    pub email: Option<String>,
    pub subject: Option<String>,
    pub message: Option<String>,
}

/// GET /api/contact - List messages, newest first
pub async fn list_messages(State(state): State<AppState>) -> impl IntoResponse {
    match sqlx::query_as::<_, ContactMessage>(
        "SELECT id, name, email, subject, message, created_at
         FROM contact_messages
         ORDER BY created_at DESC",
    )
    .fetch_all(state.db.pool())
    .await
    {
        Ok(messages) => (StatusCode::OK, Json(messages)).into_response(),
        Err(e) => db_error(e).into_response(),
    }
}

/// POST /api/contact - Store a message and confirm
pub async fn create_message(
    State(state): State<AppState>,
    Json(form): Json<ContactForm>,
) -> impl IntoResponse {
    match sqlx::query(
        "INSERT INTO contact_messages (name, email, subject, message)
         VALUES ($1, $2, $3, $4)",
    )
    .bind(form.name)
    .bind(form.email)
    .bind(form.subject)
    .bind(form.message)
    .execute(state.db.pool())
    .await
    {
        Ok(_) => (
            StatusCode::CREATED,
            Json(MessageResponse::new("Message sent successfully")),
        )
            .into_response(),
        Err(e) => db_error(e).into_response(),
    }
}
