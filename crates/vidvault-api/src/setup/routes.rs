//! Route configuration and setup

use crate::api_doc::ApiDoc;
use crate::constants::{API_PREFIX, VIDEOS_MOUNT};
use crate::handlers;
use crate::state::AppState;
use axum::{
    extract::{DefaultBodyLimit, Request, State},
    http::{HeaderValue, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use percent_encoding::percent_decode_str;
use std::sync::Arc;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use vidvault_core::Config;

/// Setup all application routes
pub fn setup_routes(state: Arc<AppState>) -> Result<Router, anyhow::Error> {
    let config = &state.config;
    let cors = setup_cors(config)?;

    // Server-level cap on in-flight requests
    let http_concurrency_limit = std::env::var("HTTP_CONCURRENCY_LIMIT")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(1024)
        .max(1);
    tracing::info!(
        http_concurrency_limit = http_concurrency_limit,
        "HTTP concurrency limit layer enabled"
    );

    let app = Router::new()
        .merge(api_routes(state.clone()))
        .merge(public_routes(state.clone()))
        .merge(video_file_routes(config))
        .merge(utoipa_rapidoc::RapiDoc::new("/api/openapi.json").path("/docs"))
        .layer(ConcurrencyLimitLayer::new(http_concurrency_limit))
        .layer(RequestBodyLimitLayer::new(config.max_video_size_bytes))
        .layer(DefaultBodyLimit::disable())
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    Ok(app)
}

/// Setup CORS configuration
fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let methods = [Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS];

    let cors = if config.cors_origins.iter().any(|o| o == "*") {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any)
    } else {
        let origins = config
            .cors_origins
            .iter()
            .map(|o| {
                o.parse::<HeaderValue>()
                    .map_err(|e| anyhow::anyhow!("Invalid CORS origin {:?}: {}", o, e))
            })
            .collect::<Result<Vec<_>, _>>()?;

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers(Any)
    };
    Ok(cors)
}

/// Video JSON API
fn api_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route(
            &format!("{}/videos", API_PREFIX),
            get(handlers::videos::list_videos),
        )
        .route(
            &format!("{}/upload", API_PREFIX),
            post(handlers::videos::upload_video),
        )
        .route(
            &format!("{}/videos/{{id}}", API_PREFIX),
            put(handlers::videos::update_video).delete(handlers::videos::delete_video),
        )
        .with_state(state)
}

/// Health probes and API documentation
fn public_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health::liveness_check))
        .route("/ready", get(handlers::health::readiness_check))
        .route(
            "/api/openapi.json",
            get(|| async { Json(ApiDoc::openapi()) }),
        )
        .with_state(state)
}

/// Raw video files, served straight from the video directory.
fn video_file_routes(config: &Config) -> Router {
    let hidden: Arc<str> = config
        .metadata_file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
        .into();

    Router::new()
        .nest_service(VIDEOS_MOUNT, ServeDir::new(&config.video_dir))
        .layer(middleware::from_fn_with_state(hidden, hide_store_files))
}

/// The metadata file and its temporary siblings share the video directory but are
/// not videos.
async fn hide_store_files(
    State(metadata_name): State<Arc<str>>,
    request: Request,
    next: Next,
) -> Response {
    if is_store_file(request.uri().path(), &metadata_name) {
        return StatusCode::NOT_FOUND.into_response();
    }
    next.run(request).await
}

/// Match against the decoded path, since `ServeDir` decodes percent-escapes before
/// opening the file.
fn is_store_file(raw_path: &str, metadata_name: &str) -> bool {
    let path = percent_decode_str(raw_path).decode_utf8_lossy();
    path.split(|c: char| c == '/' || c == '\\').any(|segment| {
        (!metadata_name.is_empty() && segment.starts_with(metadata_name))
            || segment.ends_with(".tmp")
    })
}
