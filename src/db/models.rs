//! Database models - structs representing the four tables (used by sqlx/serde).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A single portfolio entry. `item_type` is restricted to "text" or "photo"
/// by a CHECK constraint and serialized as `type` on the wire.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioItem {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub item_type: String,
    pub image: Option<String>,
    pub link: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Blog post. `excerpt` is derived from `content` when the caller does not
/// supply one explicitly.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPost {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub excerpt: Option<String>,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Write-once contact-form message: created and listed, never updated or
/// deleted through the API.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactMessage {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub subject: Option<String>,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

/// One row of the flat key-value settings store.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct SettingEntry {
    pub key: String,
    pub value: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_portfolio_item_serializes_type_and_camel_case() {
        let item = PortfolioItem {
            id: Uuid::nil(),
            title: "t".to_string(),
            description: "d".to_string(),
            item_type: "photo".to_string(),
            image: Some("/uploads/x.png".to_string()),
            link: None,
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["type"], "photo");
        assert!(json.get("createdAt").is_some());
        assert!(json.get("item_type").is_none());
    }

    #[test]
    fn test_blog_post_serializes_created_at_camel_case() {
        let post = BlogPost {
            id: Uuid::nil(),
            title: "t".to_string(),
            content: "<p>hi</p>".to_string(),
            excerpt: Some("hi...".to_string()),
            image: None,
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(&post).unwrap();
        assert!(json.get("createdAt").is_some());
        assert!(json.get("created_at").is_none());
    }
}
