pub mod exports;
pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Raw line sequences
        .route("/api/v1/exports/pdf", post(exports::handle_export_pdf))
        .route("/api/v1/exports/preview", post(exports::handle_export_preview))
        // Model payloads
        .route(
            "/api/v1/exports/identity-kit",
            post(exports::handle_export_identity_kit),
        )
        .route(
            "/api/v1/exports/campaigns",
            post(exports::handle_export_campaigns),
        )
        .route(
            "/api/v1/exports/calendar",
            post(exports::handle_export_calendar),
        )
        .with_state(state)
}
