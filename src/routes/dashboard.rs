//! Dashboard layout routes.

#[cfg(test)]
#[path = "dashboard_test.rs"]
mod dashboard_test;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use layout::persist::LayoutSnapshot;
use serde::Serialize;
use tracing::error;

use super::auth::{CsrfUser, CurrentUser};
use crate::services::dashboard::{self as dashboard_svc, LayoutServiceError};
use crate::state::AppState;

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct SaveResponse {
    pub status: &'static str,
}

pub(crate) fn layout_error_to_status(err: &LayoutServiceError) -> StatusCode {
    match err {
        LayoutServiceError::Invalid(_) => StatusCode::BAD_REQUEST,
        LayoutServiceError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// `POST /save_dashboard_layout`: store the caller's layout document.
pub async fn save_dashboard_layout(
    State(state): State<AppState>,
    CsrfUser(user): CsrfUser,
    Json(body): Json<LayoutSnapshot>,
) -> Result<Json<SaveResponse>, StatusCode> {
    dashboard_svc::save_layout(&state.pool, user.id, &body)
        .await
        .map_err(|err| {
            if let LayoutServiceError::Database(db) = &err {
                error!(user_id = %user.id, error = %db, "layout save failed");
            }
            layout_error_to_status(&err)
        })?;
    Ok(Json(SaveResponse { status: "success" }))
}

/// `GET /dashboard_layout`: the caller's stored layout, or 404.
pub async fn get_dashboard_layout(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<LayoutSnapshot>, StatusCode> {
    let stored = dashboard_svc::load_layout(&state.pool, user.id)
        .await
        .map_err(|err| {
            error!(user_id = %user.id, %err, "layout load failed");
            layout_error_to_status(&err)
        })?;
    stored.map(Json).ok_or(StatusCode::NOT_FOUND)
}
