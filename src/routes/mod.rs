//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! The dashboard page saves its layout here after every change and may fetch
//! it back on load. All layout routes act on the user behind the session
//! cookie; the save route also requires the session's CSRF token.

pub mod auth;
pub mod dashboard;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the application router.
pub fn app(state: AppState, max_body_bytes: usize) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/save_dashboard_layout", post(dashboard::save_dashboard_layout))
        .route("/dashboard_layout", get(dashboard::get_dashboard_layout))
        .route("/healthz", get(healthz))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}
