use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::app_state::AppState;
use crate::server::constants::MULTIPART_OVERHEAD_BYTES;
use crate::server::handlers;

/// Construct the application's HTTP router with all routes and middleware configured.
pub fn build_router(state: AppState) -> Router {
    let upload_body_limit = state
        .config()
        .max_upload_bytes()
        .saturating_add(MULTIPART_OVERHEAD_BYTES);
    let upload_body_limit = usize::try_from(upload_body_limit).unwrap_or(usize::MAX);

    let upload_routes = Router::new()
        .route(
            "/upload",
            post(handlers::uploads::upload_submit_handler)
                .fallback(handlers::uploads::method_not_allowed_handler),
        )
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(upload_body_limit));

    let static_files = ServeDir::new(&state.config().ui.static_dir);

    Router::new()
        .route("/", get(handlers::home::home_handler))
        .route("/uploads", get(handlers::downloads::missing_name_handler))
        .route("/uploads/", get(handlers::downloads::missing_name_handler))
        .route(
            "/uploads/*path",
            get(handlers::downloads::retrieval_handler),
        )
        .nest_service("/static", static_files)
        .merge(upload_routes)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}
