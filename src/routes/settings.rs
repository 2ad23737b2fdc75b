/**
 * Settings Routes
 * Flat key-value store with upsert-only writes
 */
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::db::models::SettingEntry;
use crate::routes::{db_error, MessageResponse};
use crate::AppState;

/// Request body for POST /api/settings
#[derive(Debug, Deserialize)]
pub struct UpsertSetting {
    pub key: Option<String>,
    pub value: Option<String>,
}

/// Collapse the stored rows into one `{key: value}` object. Keys are unique
/// by construction (primary key), so no entry can shadow another.
fn flatten(entries: Vec<SettingEntry>) -> Map<String, Value> {
    entries
        .into_iter()
        .map(|entry| (entry.key, Value::String(entry.value)))
        .collect()
}

/// GET /api/settings - Every key paired with its value, as a single object
pub async fn get_settings(State(state): State<AppState>) -> impl IntoResponse {
    match sqlx::query_as::<_, SettingEntry>("SELECT key, value FROM settings")
        .fetch_all(state.db.pool())
        .await
    {
        Ok(entries) => (StatusCode::OK, Json(Value::Object(flatten(entries)))).into_response(),
        Err(e) => db_error(e).into_response(),
    }
}

/// POST /api/settings - Insert the key or overwrite its value (upsert).
/// Keys are never deleted.
pub async fn put_setting(
    State(state): State<AppState>,
    Json(body): Json<UpsertSetting>,
) -> impl IntoResponse {
    match sqlx::query(
        r#"
        INSERT INTO settings (key, value)
        VALUES ($1, $2)
        ON CONFLICT (key) DO UPDATE SET
            value = EXCLUDED.value
        "#,
    )
    .bind(body.key)
    .bind(body.value)
    .execute(state.db.pool())
    .await
    {
        Ok(_) => (
            StatusCode::OK,
            Json(MessageResponse::new("Setting saved")),
        )
            .into_response(),
        Err(e) => db_error(e).into_response(),
    }
}
