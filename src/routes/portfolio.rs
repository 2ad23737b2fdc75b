/**
 * Portfolio Routes
 * CRUD API endpoints for portfolio items
 */
use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::db::models::PortfolioItem;
use crate::routes::{db_error, MessageResponse};
use crate::upload::read_form;
use crate::AppState;

const COLUMNS: &str = "id, title, description, item_type, image, link, created_at";

/// Query parameters for GET /api/portfolio
#[derive(Debug, Deserialize)]
pub struct PortfolioListQuery {
    #[serde(rename = "type")]
    pub item_type: Option<String>,
}

/// The `type` filter applies only when present and not the "all" sentinel.
fn type_filter(query: PortfolioListQuery) -> Option<String> {
    query.item_type.filter(|t| t != "all")
}

/// GET /api/portfolio - List items, newest first, optionally filtered by type
pub async fn list_items(
    State(state): State<AppState>,
    Query(query): Query<PortfolioListQuery>,
) -> impl IntoResponse {
    let result = match type_filter(query) {
        Some(item_type) => {
            sqlx::query_as::<_, PortfolioItem>(&format!(
                "SELECT {} FROM portfolio_items WHERE item_type = $1 ORDER BY created_at DESC",
                COLUMNS
            ))
            .bind(item_type)
            .fetch_all(state.db.pool())
            .await
        }
        None => {
            sqlx::query_as::<_, PortfolioItem>(&format!(
                "SELECT {} FROM portfolio_items ORDER BY created_at DESC",
                COLUMNS
            ))
            .fetch_all(state.db.pool())
            .await
        }
    };

    match result {
        Ok(items) => (StatusCode::OK, Json(items)).into_response(),
        Err(e) => db_error(e).into_response(),
    }
}

/// GET /api/portfolio/:id - Single item, or JSON null when the id is absent
pub async fn get_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    match sqlx::query_as::<_, PortfolioItem>(&format!(
        "SELECT {} FROM portfolio_items WHERE id = $1",
        COLUMNS
    ))
    .bind(id)
    .fetch_optional(state.db.pool())
    .await
    {
        // A missing id is not an error here: the body is simply null.
        Ok(item) => (StatusCode::OK, Json(item)).into_response(),
        Err(e) => db_error(e).into_response(),
    }
}

/// POST /api/portfolio - Create an item from a multipart form.
///
/// Required fields are enforced by the table schema (NOT NULL / CHECK), so
/// missing title/description or a type outside {"text","photo"} comes back
/// as a 400 carrying the constraint message.
pub async fn create_item(
    State(state): State<AppState>,
    multipart: Multipart,
) -> impl IntoResponse {
    let mut form = match read_form(multipart, &state.uploads).await {
        Ok(form) => form,
        Err(err_response) => return err_response.into_response(),
    };

    match sqlx::query_as::<_, PortfolioItem>(&format!(
        "INSERT INTO portfolio_items (title, description, item_type, image, link)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING {}",
        COLUMNS
    ))
    .bind(form.take("title"))
    .bind(form.take("description"))
    .bind(form.take("type"))
    .bind(form.image.take())
    .bind(form.take("link"))
    .fetch_one(state.db.pool())
    .await
    {
        Ok(item) => (StatusCode::CREATED, Json(item)).into_response(),
        Err(e) => db_error(e).into_response(),
    }
}

/// PUT /api/portfolio/:id - Partial update; a freshly uploaded file replaces
/// the stored image path. Updating a missing id returns JSON null.
pub async fn update_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> impl IntoResponse {
    let mut form = match read_form(multipart, &state.uploads).await {
        Ok(form) => form,
        Err(err_response) => return err_response.into_response(),
    };

    let existing = match sqlx::query_as::<_, PortfolioItem>(&format!(
        "SELECT {} FROM portfolio_items WHERE id = $1",
        COLUMNS
    ))
    .bind(id)
    .fetch_optional(state.db.pool())
    .await
    {
        Ok(Some(item)) => item,
        Ok(None) => return (StatusCode::OK, Json(None::<PortfolioItem>)).into_response(),
        Err(e) => return db_error(e).into_response(),
    };

    // Supplied fields replace stored ones; absent fields are kept.
    let title = form.take("title").unwrap_or(existing.title);
    let description = form.take("description").unwrap_or(existing.description);
    let item_type = form.take("type").unwrap_or(existing.item_type);
    let image = form.image.take().or(existing.image);
    let link = form.take("link").or(existing.link);

    match sqlx::query_as::<_, PortfolioItem>(&format!(
        "UPDATE portfolio_items
         SET title = $1, description = $2, item_type = $3, image = $4, link = $5
         WHERE id = $6
         RETURNING {}",
        COLUMNS
    ))
    .bind(title)
    .bind(description)
    .bind(item_type)
    .bind(image)
    .bind(link)
    .bind(id)
    .fetch_one(state.db.pool())
    .await
    {
        Ok(item) => (StatusCode::OK, Json(item)).into_response(),
        Err(e) => db_error(e).into_response(),
    }
}

/// DELETE /api/portfolio/:id - Unconditional delete; deleting a missing id
/// is indistinguishable from success.
pub async fn delete_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    match sqlx::query("DELETE FROM portfolio_items WHERE id = $1")
        .bind(id)
        .execute(state.db.pool())
        .await
    {
        Ok(_) => (
            StatusCode::OK,
            Json(MessageResponse::new("Portfolio item deleted")),
        )
            .into_response(),
        Err(e) => db_error(e).into_response(),
    }
}
