//! Session lookup and CSRF token comparison.
//!
//! Sessions are issued by the surrounding application; this service only
//! resolves a `session_token` cookie to its user and the CSRF token bound to
//! that session.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use sqlx::{PgPool, Row};
use uuid::Uuid;

/// User row returned from session validation.
#[derive(Debug, Clone)]
pub struct SessionUser {
    pub id: Uuid,
    pub name: String,
    /// CSRF token mutating requests must echo in a header.
    pub csrf_token: String,
}

/// Resolve a session token to its user. Expired sessions resolve to `None`.
///
/// # Errors
///
/// Returns the database error if the query fails.
pub async fn validate_session(pool: &PgPool, token: &str) -> Result<Option<SessionUser>, sqlx::Error> {
    let row = sqlx::query(
        r"SELECT u.id, u.name, s.csrf_token
          FROM sessions s
          JOIN users u ON u.id = s.user_id
          WHERE s.token = $1 AND s.expires_at > now()",
    )
    .bind(token)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|r| SessionUser { id: r.get("id"), name: r.get("name"), csrf_token: r.get("csrf_token") }))
}

/// Compare a presented CSRF token with the session's, in time independent
/// of where the first difference is.
#[must_use]
pub fn csrf_matches(expected: &str, presented: &str) -> bool {
    let (a, b) = (expected.as_bytes(), presented.as_bytes());
    if a.is_empty() || a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
