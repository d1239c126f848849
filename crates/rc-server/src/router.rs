//! Axum router construction.
//!
//! Builds the full application router with all route groups and middleware
//! layers.

use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::context::AppContext;
use crate::middleware::request_id::request_id_middleware;
use crate::routes;

/// Largest accepted request body: five files plus descriptors.
const MAX_BODY_BYTES: usize = 256 * 1024 * 1024;

/// Build the complete Axum router.
pub fn build_router(ctx: AppContext) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        .route("/convert", post(routes::convert::convert_batch))
        .route(
            "/files/{name}",
            get(routes::files::download_artifact).delete(routes::files::delete_artifact),
        )
        .route("/tools", get(routes::tools::list_tools))
        .route("/formats", get(routes::formats::list_formats));

    Router::new()
        .route("/health", get(routes::health::health_check))
        .nest("/api", api)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}
