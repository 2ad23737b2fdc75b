/**
 * Blog Routes
 * CRUD API endpoints for blog posts, with excerpt derivation
 */
use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use regex::Regex;
use uuid::Uuid;

use crate::db::models::BlogPost;
use crate::routes::{db_error, MessageResponse};
use crate::upload::read_form;
use crate::AppState;

const COLUMNS: &str = "id, title, content, excerpt, image, created_at";

const EXCERPT_LEN: usize = 150;

lazy_static::lazy_static! {
    /// Markup tag: a `<`, any run of non-`>` characters, a `>`.
    static ref TAG_REGEX: Regex = Regex::new(r"<[^>]*>").unwrap();
}

/// Derive an excerpt from post content: strip every markup tag, keep the
/// first 150 characters, and append the ellipsis marker unconditionally
/// (even when nothing was cut).
pub fn derive_excerpt(content: &str) -> String {
    let stripped = TAG_REGEX.replace_all(content, "");
    let truncated: String = stripped.chars().take(EXCERPT_LEN).collect();
    format!("{}...", truncated)
}

/// An empty excerpt field counts as "not supplied": it falls through to
/// derivation instead of storing the empty string.
fn explicit_excerpt(value: Option<String>) -> Option<String> {
    value.filter(|e| !e.is_empty())
}

/// GET /api/blog - List posts, newest first
pub async fn list_posts(State(state): State<AppState>) -> impl IntoResponse {
    match sqlx::query_as::<_, BlogPost>(&format!(
        "SELECT {} FROM blog_posts ORDER BY created_at DESC",
        COLUMNS
    ))
    .fetch_all(state.db.pool())
    .await
    {
        Ok(posts) => (StatusCode::OK, Json(posts)).into_response(),
        Err(e) => db_error(e).into_response(),
    }
}

/// GET /api/blog/:id - Single post, or JSON null when the id is absent
pub async fn get_post(State(state): State<AppState>, Path(id): Path<Uuid>) -> impl IntoResponse {
    match sqlx::query_as::<_, BlogPost>(&format!(
        "SELECT {} FROM blog_posts WHERE id = $1",
        COLUMNS
    ))
    .bind(id)
    .fetch_optional(state.db.pool())
    .await
    {
        Ok(post) => (StatusCode::OK, Json(post)).into_response(),
        Err(e) => db_error(e).into_response(),
    }
}

/// POST /api/blog - Create a post from a multipart form.
///
/// When the caller does not supply an excerpt it is derived from the
/// content; required fields are enforced by the table schema.
pub async fn create_post(State(state): State<AppState>, multipart: Multipart) -> impl IntoResponse {
    let mut form = match read_form(multipart, &state.uploads).await {
        Ok(form) => form,
        Err(err_response) => return err_response.into_response(),
    };

    let content = form.take("content");
    let excerpt = explicit_excerpt(form.take("excerpt"))
        .or_else(|| content.as_deref().map(derive_excerpt));

    match sqlx::query_as::<_, BlogPost>(&format!(
        "INSERT INTO blog_posts (title, content, excerpt, image)
         VALUES ($1, $2, $3, $4)
         RETURNING {}",
        COLUMNS
    ))
    .bind(form.take("title"))
    .bind(content)
    .bind(excerpt)
    .bind(form.image.take())
    .fetch_one(state.db.pool())
    .await
    {
        Ok(post) => (StatusCode::CREATED, Json(post)).into_response(),
        Err(e) => db_error(e).into_response(),
    }
}

/// PUT /api/blog/:id - Partial update. The excerpt is recomputed from the
/// effective content on every update where none is supplied explicitly.
pub async fn update_post(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> impl IntoResponse {
    let mut form = match read_form(multipart, &state.uploads).await {
        Ok(form) => form,
        Err(err_response) => return err_response.into_response(),
    };

    let existing = match sqlx::query_as::<_, BlogPost>(&format!(
        "SELECT {} FROM blog_posts WHERE id = $1",
        COLUMNS
    ))
    .bind(id)
    .fetch_optional(state.db.pool())
    .await
    {
        Ok(Some(post)) => post,
        Ok(None) => return (StatusCode::OK, Json(None::<BlogPost>)).into_response(),
        Err(e) => return db_error(e).into_response(),
    };

    let title = form.take("title").unwrap_or(existing.title);
    let content = form.take("content").unwrap_or(existing.content);
    let excerpt = explicit_excerpt(form.take("excerpt"))
        .unwrap_or_else(|| derive_excerpt(&content));
    let image = form.image.take().or(existing.image);

    match sqlx::query_as::<_, BlogPost>(&format!(
        "UPDATE blog_posts
         SET title = $1, content = $2, excerpt = $3, image = $4
         WHERE id = $5
         RETURNING {}",
        COLUMNS
    ))
    .bind(title)
    .bind(content)
    .bind(excerpt)
    .bind(image)
    .bind(id)
    .fetch_one(state.db.pool())
    .await
    {
        Ok(post) => (StatusCode::OK, Json(post)).into_response(),
        Err(e) => db_error(e).into_response(),
    }
}

/// DELETE /api/blog/:id - Unconditional delete with confirmation message
pub async fn delete_post(State(state): State<AppState>, Path(id): Path<Uuid>) -> impl IntoResponse {
    match sqlx::query("DELETE FROM blog_posts WHERE id = $1")
        .bind(id)
        .execute(state.db.pool())
        .await
    {
        Ok(_) => (
            StatusCode::OK,
            Json(MessageResponse::new("Blog post deleted")),
        )
            .into_response(),
        Err(e) => db_error(e).into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_excerpt_strips_tags() {
        assert_eq!(
            derive_excerpt("<p>Hello <b>world</b></p>"),
            "Hello world..."
        );
    }

    #[test]
    fn test_derive_excerpt_appends_ellipsis_to_short_content() {
        assert_eq!(derive_excerpt("short"), "short...");
    }

    #[test]
    fn test_derive_excerpt_truncates_long_content() {
        let content = "a".repeat(400);
        let excerpt = derive_excerpt(&content);
        assert_eq!(excerpt.len(), EXCERPT_LEN + 3);
        assert!(excerpt.ends_with("..."));
    }

    #[test]
    fn test_derive_excerpt_counts_chars_after_stripping() {
        // Tags are removed before the 150-char window is applied.
        let content = format!("<div>{}</div>", "b".repeat(200));
        let excerpt = derive_excerpt(&content);
        assert_eq!(excerpt, format!("{}...", "b".repeat(EXCERPT_LEN)));
    }

    #[test]
    fn test_derive_excerpt_handles_empty_content() {
        assert_eq!(derive_excerpt(""), "...");
        assert_eq!(derive_excerpt("<br/>"), "...");
    }

    #[test]
    fn test_explicit_excerpt_treats_empty_as_absent() {
        assert_eq!(explicit_excerpt(Some(String::new())), None);
        assert_eq!(explicit_excerpt(None), None);
        assert_eq!(
            explicit_excerpt(Some("kept".to_string())),
            Some("kept".to_string())
        );
    }

    #[test]
    fn test_derive_excerpt_is_multibyte_safe() {
        let content = "é".repeat(200);
        let excerpt = derive_excerpt(&content);
        assert_eq!(excerpt.chars().count(), EXCERPT_LEN + 3);
    }
}
