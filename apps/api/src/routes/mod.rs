pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::analysis::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let body_limit = DefaultBodyLimit::max(state.config.max_upload_bytes);

    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/intents", get(handlers::handle_list_intents))
        .route("/api/v1/sessions", post(handlers::handle_create_session))
        .route(
            "/api/v1/sessions/:id",
            get(handlers::handle_get_session).delete(handlers::handle_delete_session),
        )
        .route(
            "/api/v1/sessions/:id/analyze",
            post(handlers::handle_analyze),
        )
        .route(
            "/api/v1/sessions/:id/compare",
            post(handlers::handle_compare),
        )
        .route(
            "/api/v1/sessions/:id/reports/:file_name",
            get(handlers::handle_download_report),
        )
        .layer(body_limit)
        .with_state(state)
}
