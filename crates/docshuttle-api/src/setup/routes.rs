//! Route configuration and setup.

use anyhow::Result;
use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    routing::get,
    routing::post,
    Router,
};
use docshuttle_core::Config;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_rapidoc::RapiDoc;

use crate::api_doc::ApiDoc;
use crate::constants::API_PREFIX;
use crate::handlers;
use crate::identity::identity_middleware;
use crate::state::AppState;

/// Setup all application routes
pub fn build_router(state: Arc<AppState>) -> Result<Router> {
    let cors = setup_cors(&state.config)?;

    let api = Router::new()
        .route("/convert", post(handlers::convert::convert_pdf))
        .route(
            "/records",
            post(handlers::records::create_record)
                .get(handlers::records::list_records)
                .delete(handlers::records::delete_record),
        )
        .route("/events", get(handlers::events::events));

    let app = Router::new()
        .nest(API_PREFIX, api)
        .merge(RapiDoc::with_openapi("/api-docs/openapi.json", ApiDoc::openapi()).path("/rapidoc"))
        .layer(axum::middleware::from_fn(identity_middleware))
        .layer(DefaultBodyLimit::max(state.config.max_file_size_bytes))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    Ok(app)
}

/// CORS with credentials: the identity cookie must survive cross-origin
/// requests from the frontend, so origins are an explicit list, never `Any`.
fn setup_cors(config: &Config) -> Result<CorsLayer> {
    let origins = config
        .cors_origins
        .iter()
        .map(|origin| {
            origin
                .parse::<HeaderValue>()
                .map_err(|e| anyhow::anyhow!("Invalid CORS origin '{}': {}", origin, e))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true))
}
