//! HTTP front end for citation extraction.
//!
//! `POST /extract` takes a multipart upload of `.docx`/`.txt` files plus a
//! `keyword` field and answers with the deduplicated citations found near
//! it. `GET /health` is a liveness probe. Any other path falls through to
//! the static frontend directory when one is configured.

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderValue, Method};
use axum::routing::{get, post};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::services::ServeDir;

pub mod handlers;
pub mod models;
pub mod state;
pub mod upload;

pub use state::{AppState, ServerSettings, SettingsError};

/// Build the application router.
pub fn router(state: Arc<AppState>) -> Router {
    let settings = &state.settings;

    let mut app = Router::new()
        .route("/extract", post(handlers::extract::extract))
        .route("/health", get(handlers::health::health));

    if let Some(dir) = &settings.static_dir {
        app = app.fallback_service(ServeDir::new(dir).append_index_html_on_directories(true));
    }

    app.layer(DefaultBodyLimit::max(settings.max_upload_bytes))
        .layer(cors_layer(&settings.cors_origins))
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any)
}
