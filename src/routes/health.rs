/**
 * Health Routes
 * Liveness endpoint and root API index
 */
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::AppState;

/// Response for GET /api/health
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub database: String,
    pub uptime: u64,
    pub message: String,
}

/// Response for GET /
#[derive(Debug, Serialize, Deserialize)]
pub struct RootResponse {
    pub message: String,
    pub status: String,
    pub endpoints: Endpoints,
}

/// Resource prefixes advertised at the root
#[derive(Debug, Serialize, Deserialize)]
pub struct Endpoints {
    pub health: String,
    pub portfolio: String,
    pub blog: String,
    pub contact: String,
    pub settings: String,
    pub uploads: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            health: "/api/health".to_string(),
            portfolio: "/api/portfolio".to_string(),
            blog: "/api/blog".to_string(),
            contact: "/api/contact".to_string(),
            settings: "/api/settings".to_string(),
            uploads: crate::upload::UPLOAD_ROUTE.to_string(),
        }
    }
}

/// GET /api/health - Liveness plus database connectivity.
///
/// Always 200: an unreachable database flips the indicator to
/// "disconnected" but never fails the endpoint itself.
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let database = match state.db.health_check().await {
        Ok(_) => "connected",
        Err(e) => {
            tracing::warn!("Health probe failed: {}", e);
            "disconnected"
        }
    };

    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            database: database.to_string(),
            uptime: state.started_at.elapsed().as_secs(),
            message: "Portfolio CMS API is running".to_string(),
        }),
    )
}

/// GET / - API index
pub async fn root() -> impl IntoResponse {
    Json(RootResponse {
        message: "Portfolio CMS API".to_string(),
        status: "online".to_string(),
        endpoints: Endpoints::default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{Db, DbConfig};
    use crate::upload::Uploads;
    use axum::body::Body;
    use axum::http::Request;
    use axum::routing::get;
    use axum::Router;
    use tower::ServiceExt;

    fn test_router() -> Router {
        // connect_lazy to a closed port: the pool exists but every probe
        // fails, which is exactly the disconnected case.
        let db = Db::connect(&DbConfig {
            url: "postgresql://127.0.0.1:9/portfolio_test".to_string(),
            acquire_timeout_secs: 1,
            ..DbConfig::default()
        })
        .unwrap();
        let state = AppState::new(db, Uploads::new(std::env::temp_dir()));

        Router::new()
            .route("/", get(root))
            .route("/api/health", get(health))
            .with_state(state)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(app: Router, uri: &str) -> (StatusCode, T) {
        let req = Request::get(uri).body(Body::empty()).unwrap();
        let res = app.oneshot(req).await.unwrap();
        let status = res.status();
        let body = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .unwrap();
        let value: T = serde_json::from_slice(&body).unwrap();
        (status, value)
    }

    #[tokio::test]
    async fn test_health_returns_ok_with_disconnected_database() {
        let (status, body) = get_json::<HealthResponse>(test_router(), "/api/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.status, "ok");
        assert_eq!(body.database, "disconnected");
        assert_eq!(body.message, "Portfolio CMS API is running");
    }

    #[tokio::test]
    async fn test_root_lists_endpoints() {
        let (status, body) = get_json::<RootResponse>(test_router(), "/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.status, "online");
        assert_eq!(body.endpoints.portfolio, "/api/portfolio");
        assert_eq!(body.endpoints.settings, "/api/settings");
        assert_eq!(body.endpoints.uploads, "/uploads");
    }
}
