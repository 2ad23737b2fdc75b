//! Portfolio CMS backend - library for app logic and testing

pub mod db;
pub mod logging;
pub mod routes;
pub mod upload;

use axum::{
    http::{HeaderValue, Method, StatusCode},
    middleware,
    routing::{get, get_service, MethodRouter},
    Router,
};
use std::net::SocketAddr;
use std::time::Instant;
use tower_http::{
    compression::CompressionLayer,
    cors::CorsLayer,
    limit::RequestBodyLimitLayer,
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

/// Shared application state. The database handle and upload store are owned
/// here and injected through axum's `State` extractor; there is no global
/// connection singleton.
#[derive(Clone)]
pub struct AppState {
    pub db: db::Db,
    pub uploads: upload::Uploads,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(db: db::Db, uploads: upload::Uploads) -> Self {
        Self {
            db,
            uploads,
            started_at: Instant::now(),
        }
    }
}

/// Configure CORS from environment variables.
/// Uses ALLOWED_ORIGINS (comma-separated) or FRONTEND_ORIGIN.
/// Falls back to localhost origins in development.
pub fn configure_cors() -> CorsLayer {
    let allowed_origins = std::env::var("ALLOWED_ORIGINS")
        .ok()
        .and_then(|s| {
            let origins: Vec<HeaderValue> = s
                .split(',')
                .filter_map(|origin| origin.trim().parse().ok())
                .collect();
            if origins.is_empty() {
                None
            } else {
                Some(origins)
            }
        })
        .or_else(|| {
            std::env::var("FRONTEND_ORIGIN")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(|origin| vec![origin])
        })
        .unwrap_or_else(|| {
            vec![
                "http://localhost:3000".parse().unwrap(),
                "http://127.0.0.1:3000".parse().unwrap(),
            ]
        });

    CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::AUTHORIZATION,
        ])
        .allow_credentials(true)
}

/// Create and configure the application router.
pub fn create_app(state: AppState) -> Router {
    let cors = configure_cors();
    tracing::info!("CORS configured");

    let serve_uploads = ServeDir::new(state.uploads.dir());

    let mut app = Router::new()
        .route("/", get(routes::health::root))
        .route("/api/health", get(routes::health::health))
        .route(
            "/api/portfolio",
            get(routes::portfolio::list_items).post(routes::portfolio::create_item),
        )
        .route(
            "/api/portfolio/{id}",
            get(routes::portfolio::get_item)
                .put(routes::portfolio::update_item)
                .delete(routes::portfolio::delete_item),
        )
        .route(
            "/api/blog",
            get(routes::blog::list_posts).post(routes::blog::create_post),
        )
        .route(
            "/api/blog/{id}",
            get(routes::blog::get_post)
                .put(routes::blog::update_post)
                .delete(routes::blog::delete_post),
        )
        .route(
            "/api/contact",
            get(routes::contact::list_messages).post(routes::contact::create_message),
        )
        .route(
            "/api/settings",
            get(routes::settings::get_settings).post(routes::settings::put_setting),
        )
        .nest_service("/uploads", serve_uploads);

    // In production, unmatched GET paths fall back to the pre-built client
    // app so client-side routing keeps working on hard refresh.
    let environment = std::env::var("ENVIRONMENT").unwrap_or_default();
    if environment == "production" {
        let dist = std::env::var("CLIENT_DIST").unwrap_or_else(|_| "client/dist".to_string());
        app = app.fallback_service(spa_fallback(&dist));
    }

    app.layer(logging::middleware::propagate_request_id_layer())
        .layer(middleware::from_fn(logging::middleware::log_request))
        .layer(logging::middleware::request_id_layer())
        .layer(TraceLayer::new_for_http())
        // Compress responses with gzip/br/zstd automatically
        .layer(CompressionLayer::new())
        // Global 12 MB request body cap; multipart image uploads must fit
        .layer(RequestBodyLimitLayer::new(12 * 1024 * 1024))
        .layer(cors)
        .with_state(state)
}

/// SPA fallback for the client build: GET serves the requested asset with
/// `index.html` as the catch-all; other methods on unmatched paths are a
/// plain 404 rather than a static-dir 405.
fn spa_fallback(dist: &str) -> MethodRouter {
    let index = format!("{}/index.html", dist);
    get_service(ServeDir::new(dist).not_found_service(ServeFile::new(index)))
        .fallback(|| async { StatusCode::NOT_FOUND })
}

/// Run the server (used by main).
pub async fn run() {
    dotenvy::dotenv().ok();

    // Guards MUST be held for the programme's lifetime; dropping them early
    // shuts down background log-writer threads and loses buffered log lines.
    let _log_guards = logging::init();

    let db_config = db::DbConfig::default();
    let db = db::Db::connect(&db_config).expect("Invalid DATABASE_URL configuration");

    // The pool is lazy, so migrations are the first real round-trip. A down
    // database is not fatal: the server starts and /api/health reports it.
    if let Err(e) = db.run_migrations().await {
        tracing::warn!(
            "Failed to run database migrations: {}. Continuing; queries will fail until the database is reachable.",
            e
        );
    }

    let uploads = upload::Uploads::from_env();
    if let Err(e) = uploads.ensure_dir().await {
        tracing::error!("Failed to create upload directory: {}", e);
    }

    let state = AppState::new(db.clone(), uploads);
    let app = create_app(state);

    // Bind address is configurable via HOST / PORT env vars, defaulting to
    // 127.0.0.1:3001 so existing dev setups keep working unchanged.
    let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(3001);
    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .expect("Invalid HOST/PORT configuration");
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async {
        tokio::signal::ctrl_c().await.ok();
        tracing::info!("Shutdown signal received");
    })
    .await
    .expect("Server error");

    db.close().await;
    tracing::info!("Database connection closed");
}
