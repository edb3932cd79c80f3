//! Request authentication: session cookie and CSRF header extractors.

use axum::extract::FromRef;
use axum::http::StatusCode;
use axum::http::request::Parts;
use axum_extra::extract::cookie::{Cookie, CookieJar};
use tracing::{debug, error};

use crate::services::session::{self, SessionUser};
use crate::state::AppState;

pub(crate) const COOKIE_NAME: &str = "session_token";

/// Header names accepted for the CSRF token, in lookup order.
pub(crate) const CSRF_HEADERS: [&str; 2] = ["x-csrftoken", "x-csrf-token"];

/// CSRF token presented in the request headers, if any.
pub(crate) fn presented_csrf(parts: &Parts) -> Option<&str> {
    CSRF_HEADERS
        .iter()
        .find_map(|name| parts.headers.get(*name))
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

fn session_cookie(parts: &Parts) -> Option<String> {
    let jar = CookieJar::from_headers(&parts.headers);
    jar.get(COOKIE_NAME)
        .map(Cookie::value)
        .filter(|token| !token.is_empty())
        .map(str::to_owned)
}

async fn resolve(state: &AppState, token: &str) -> Result<SessionUser, StatusCode> {
    let user = session::validate_session(&state.pool, token)
        .await
        .map_err(|err| {
            error!(%err, "session lookup failed");
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .ok_or(StatusCode::UNAUTHORIZED)?;
    debug!(user_id = %user.id, name = %user.name, "session resolved");
    Ok(user)
}

// =============================================================================
// EXTRACTORS
// =============================================================================

/// Authenticated user extracted from the session cookie.
/// Use as a handler parameter to require authentication.
pub struct CurrentUser(pub SessionUser);

impl<S> axum::extract::FromRequestParts<S> for CurrentUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = session_cookie(parts).ok_or(StatusCode::UNAUTHORIZED)?;
        let user = resolve(&AppState::from_ref(state), &token).await?;
        Ok(Self(user))
    }
}

/// Authenticated user whose request carries the session's CSRF token.
/// Use on every mutating route.
pub struct CsrfUser(pub SessionUser);

impl<S> axum::extract::FromRequestParts<S> for CsrfUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = session_cookie(parts).ok_or(StatusCode::UNAUTHORIZED)?;
        let Some(presented) = presented_csrf(parts).map(str::to_owned) else {
            debug!("mutating request without CSRF header");
            return Err(StatusCode::FORBIDDEN);
        };

        let user = resolve(&AppState::from_ref(state), &token).await?;
        if !session::csrf_matches(&user.csrf_token, &presented) {
            debug!(user_id = %user.id, "CSRF token mismatch");
            return Err(StatusCode::FORBIDDEN);
        }
        Ok(Self(user))
    }
}
