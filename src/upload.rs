//! Upload handling: multipart form decoding and file persistence.
//!
//! Files land in a fixed local directory and are referenced by a
//! `/uploads/<name>` path stored on the owning entity. There is no cleanup
//! of files whose owning entity is deleted or whose image is replaced.

use axum::{
    extract::multipart::Multipart,
    http::StatusCode,
    Json,
};
use chrono::Utc;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::routes::ErrorResponse;

/// Route prefix the stored files are served under.
pub const UPLOAD_ROUTE: &str = "/uploads";

const DEFAULT_UPLOAD_DIR: &str = "uploads";

/// Local file store for uploaded images.
#[derive(Debug, Clone)]
pub struct Uploads {
    dir: PathBuf,
}

impl Uploads {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory from UPLOAD_DIR, defaulting to `uploads` in the working dir.
    pub fn from_env() -> Self {
        let dir = std::env::var("UPLOAD_DIR").unwrap_or_else(|_| DEFAULT_UPLOAD_DIR.to_string());
        Self::new(dir)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub async fn ensure_dir(&self) -> io::Result<()> {
        tokio::fs::create_dir_all(&self.dir).await
    }

    /// Persist one uploaded file and return its public `/uploads/...` path.
    pub async fn store(&self, original_name: &str, bytes: &[u8]) -> io::Result<String> {
        let name = storage_name(original_name)?;

        // The directory is created at startup too; this covers it being
        // removed while the server runs.
        self.ensure_dir().await?;

        let path = self.dir.join(&name);
        tokio::fs::write(&path, bytes).await?;

        tracing::info!("File uploaded: {} ({} bytes)", name, bytes.len());
        Ok(format!("{}/{}", UPLOAD_ROUTE, name))
    }
}

/// Build the on-disk name: `<millis>-<uuid>-<original>`.
///
/// A bare timestamp-plus-filename name can silently collide under
/// concurrent uploads; the embedded UUID makes the name unique while
/// keeping the timestamp-prefixed shape clients already expect.
fn storage_name(original_name: &str) -> io::Result<String> {
    if original_name.is_empty()
        || original_name.contains("..")
        || original_name.contains('/')
        || original_name.contains('\\')
        || original_name.contains('\0')
    {
        return Err(io::Error::new(io::ErrorKind::InvalidInput, "Invalid filename"));
    }

    Ok(format!(
        "{}-{}-{}",
        Utc::now().timestamp_millis(),
        Uuid::new_v4().simple(),
        original_name
    ))
}

/// Decoded multipart form: text fields by name plus the stored path of an
/// uploaded `image` file, if one was attached.
#[derive(Debug, Default)]
pub struct FormData {
    fields: HashMap<String, String>,
    pub image: Option<String>,
}

impl FormData {
    /// Remove and return a text field by name.
    pub fn take(&mut self, name: &str) -> Option<String> {
        self.fields.remove(name)
    }
}

/// Read a multipart request into a [`FormData`], persisting at most one
/// attached file (the `image` field) through `uploads`.
///
/// Decode failures map to 400, disk failures to 500, both in the shared
/// error-response shape.
pub async fn read_form(
    mut multipart: Multipart,
    uploads: &Uploads,
) -> Result<FormData, (StatusCode, Json<ErrorResponse>)> {
    let mut form = FormData::default();

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                tracing::warn!("Multipart error: {}", e);
                return Err(bad_request("Invalid multipart data"));
            }
        };

        let name = field.name().unwrap_or_default().to_string();

        if name == "image" && field.file_name().is_some() {
            let original = field.file_name().unwrap_or("upload").to_string();
            let bytes = match field.bytes().await {
                Ok(b) => b,
                Err(e) => {
                    tracing::warn!("Failed to read upload bytes: {}", e);
                    return Err(bad_request("Failed to read file data"));
                }
            };
            if bytes.is_empty() {
                continue;
            }
            match uploads.store(&original, &bytes).await {
                Ok(path) => form.image = Some(path),
                Err(e) if e.kind() == io::ErrorKind::InvalidInput => {
                    return Err(bad_request("Invalid filename"));
                }
                Err(e) => {
                    tracing::error!("Failed to save upload file: {}", e);
                    return Err((
                        StatusCode::INTERNAL_SERVER_ERROR,
                        Json(ErrorResponse {
                            error: "Failed to save file".to_string(),
                            message: None,
                        }),
                    ));
                }
            }
        } else {
            match field.text().await {
                Ok(value) => {
                    form.fields.insert(name, value);
                }
                Err(e) => {
                    tracing::warn!("Failed to read form field: {}", e);
                    return Err(bad_request("Invalid multipart data"));
                }
            }
        }
    }

    Ok(form)
}

fn bad_request(msg: &str) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: msg.to_string(),
            message: None,
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;

    #[test]
    fn test_storage_name_shape() {
        let name = storage_name("avatar.png").unwrap();
        let re = Regex::new(r"^\d+-[0-9a-f]{32}-avatar\.png$").unwrap();
        assert!(re.is_match(&name), "unexpected name: {}", name);
    }

    #[test]
    fn test_storage_name_rejects_traversal() {
        assert!(storage_name("../etc/passwd").is_err());
        assert!(storage_name("a/b.png").is_err());
        assert!(storage_name("a\\b.png").is_err());
        assert!(storage_name("").is_err());
    }

    #[test]
    fn test_storage_names_are_unique() {
        let a = storage_name("x.png").unwrap();
        let b = storage_name("x.png").unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_store_writes_file_and_returns_route_path() {
        let dir = std::env::temp_dir().join(format!("uploads-test-{}", Uuid::new_v4()));
        let uploads = Uploads::new(&dir);

        let path = uploads.store("pic.jpg", b"hello").await.unwrap();
        assert!(path.starts_with("/uploads/"));
        assert!(path.ends_with("-pic.jpg"));

        let stored = dir.join(path.trim_start_matches("/uploads/"));
        let bytes = tokio::fs::read(&stored).await.unwrap();
        assert_eq!(bytes, b"hello");

        tokio::fs::remove_dir_all(&dir).await.ok();
    }

    #[test]
    fn test_form_data_take_removes_field() {
        let mut form = FormData::default();
        form.fields.insert("title".to_string(), "hi".to_string());
        assert_eq!(form.take("title"), Some("hi".to_string()));
        assert_eq!(form.take("title"), None);
    }
}
