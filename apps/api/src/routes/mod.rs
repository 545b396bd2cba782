pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::email;
use crate::report;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Reports API
        .route(
            "/api/v1/reports/generate",
            post(report::handlers::handle_generate_reports),
        )
        .route(
            "/api/v1/reports/render",
            post(report::handlers::handle_render_report),
        )
        .route(
            "/api/v1/reports/email",
            post(email::handlers::handle_send_email),
        )
        .with_state(state)
}
