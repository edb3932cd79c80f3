//! Dashboard layout service: validation and per-user storage.
//!
//! DESIGN
//! ======
//! One row per user holds the whole layout document as JSONB. A save is a
//! single upsert, so concurrent saves from the same user resolve as
//! last-write-wins. The server never computes placements; it only checks
//! that the document is well formed before storing it.

#[cfg(test)]
#[path = "dashboard_test.rs"]
mod dashboard_test;

use layout::consts::SNAPSHOT_VERSION;
use layout::persist::LayoutSnapshot;
use sqlx::PgPool;
use sqlx::types::Json;
use tracing::{info, warn};
use uuid::Uuid;

/// Largest number of entries accepted across both grids.
pub const MAX_ENTRIES: usize = 128;

/// Longest accepted module id.
pub const MAX_ID_LEN: usize = 64;

#[derive(Debug, thiserror::Error)]
pub enum LayoutServiceError {
    #[error("invalid layout: {0}")]
    Invalid(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Check a layout document before storing it.
///
/// # Errors
///
/// Returns [`LayoutServiceError::Invalid`] describing the first problem found.
pub fn validate(snapshot: &LayoutSnapshot) -> Result<(), LayoutServiceError> {
    if snapshot.version > SNAPSHOT_VERSION {
        return Err(LayoutServiceError::Invalid(format!("unsupported version {}", snapshot.version)));
    }
    let total = snapshot.stats.len() + snapshot.insights.len();
    if total > MAX_ENTRIES {
        return Err(LayoutServiceError::Invalid(format!("{total} entries exceeds limit of {MAX_ENTRIES}")));
    }
    for entry in snapshot.stats.iter().chain(&snapshot.insights) {
        if entry.id.trim().is_empty() {
            return Err(LayoutServiceError::Invalid("empty module id".into()));
        }
        if entry.id.len() > MAX_ID_LEN {
            return Err(LayoutServiceError::Invalid(format!("module id longer than {MAX_ID_LEN} bytes")));
        }
        if let Some(span) = entry.span
            && !(1..=2).contains(&span)
        {
            return Err(LayoutServiceError::Invalid(format!("span {span} for {} out of range", entry.id)));
        }
        if let Some(pin) = entry.pin
            && (pin.row >= MAX_ENTRIES || pin.col >= MAX_ENTRIES)
        {
            return Err(LayoutServiceError::Invalid(format!(
                "pin ({}, {}) for {} out of range",
                pin.row, pin.col, entry.id
            )));
        }
    }
    if let Some(id) = snapshot.duplicate_id() {
        return Err(LayoutServiceError::Invalid(format!("duplicate module id {id}")));
    }
    Ok(())
}

/// Validate and store a user's layout, replacing any previous one.
///
/// # Errors
///
/// Returns [`LayoutServiceError::Invalid`] for a malformed document, or
/// [`LayoutServiceError::Database`] if the upsert fails.
pub async fn save_layout(pool: &PgPool, user_id: Uuid, snapshot: &LayoutSnapshot) -> Result<(), LayoutServiceError> {
    if let Err(err) = validate(snapshot) {
        warn!(%user_id, %err, "rejected dashboard layout");
        return Err(err);
    }

    sqlx::query(
        r"INSERT INTO dashboard_layouts (user_id, layout, updated_at)
          VALUES ($1, $2, now())
          ON CONFLICT (user_id) DO UPDATE
          SET layout = EXCLUDED.layout, updated_at = EXCLUDED.updated_at",
    )
    .bind(user_id)
    .bind(Json(snapshot))
    .execute(pool)
    .await?;

    info!(%user_id, stats = snapshot.stats.len(), insights = snapshot.insights.len(), "dashboard layout saved");
    Ok(())
}

/// Fetch a user's stored layout. Stored documents are decoded leniently, so
/// rows written by older pages still load.
///
/// # Errors
///
/// Returns [`LayoutServiceError::Database`] if the query fails.
pub async fn load_layout(pool: &PgPool, user_id: Uuid) -> Result<Option<LayoutSnapshot>, LayoutServiceError> {
    let stored: Option<serde_json::Value> =
        sqlx::query_scalar("SELECT layout FROM dashboard_layouts WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(pool)
            .await?;
    Ok(stored.map(|value| LayoutSnapshot::from_value(&value)))
}
