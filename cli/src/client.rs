//! HTTP client for the dashboard endpoints.
//!
//! Requests authenticate with the `session_token` cookie. Mutating requests
//! also carry the session's CSRF token in `X-CSRFToken`.

#[cfg(test)]
#[path = "client_test.rs"]
mod client_test;

use reqwest::header::{COOKIE, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::CliError;

const CSRF_HEADER: &str = "x-csrftoken";

/// Poll interval for the latest-articles feed, in milliseconds.
pub(crate) const LATEST_ARTICLES_POLL_MS: u64 = 300_000;

/// Maximum number of latest articles shown.
pub(crate) const LATEST_ARTICLES_LIMIT: usize = 3;

pub struct Client {
    base_url: String,
    session_token: Option<String>,
    csrf_token: Option<String>,
    http: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    #[serde(default)]
    success: bool,
}

#[derive(Debug, Deserialize)]
struct SaveResponse {
    #[serde(default)]
    status: String,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ArticlesResponse {
    #[serde(default)]
    pub articles: Vec<Article>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub(crate) struct Article {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
}

impl Client {
    pub fn new(base_url: String, session_token: Option<String>, csrf_token: Option<String>) -> Self {
        Self { base_url, session_token, csrf_token, http: reqwest::Client::new() }
    }

    pub async fn ping(&self) -> Result<(), CliError> {
        let response = self.http.get(self.url("/healthz")).send().await?;
        expect_success(response.status(), "/healthz", "health check failed")
    }

    /// `POST /save_dashboard_layout`.
    pub async fn save_layout(&self, body: &Value) -> Result<(), CliError> {
        const PATH: &str = "/save_dashboard_layout";
        let (status, value) = self.send(Method::POST, PATH, Some(body), true).await?;
        expect_success(status, PATH, &value.to_string())?;
        let parsed: SaveResponse = serde_json::from_value(value)?;
        if parsed.status != "success" {
            return Err(CliError::ServerStatus {
                status: status.as_u16(),
                path: PATH,
                message: format!("unexpected status {:?}", parsed.status),
            });
        }
        info!(path = PATH, "layout saved");
        Ok(())
    }

    /// `GET /dashboard_layout`. `None` when the user has no stored layout.
    pub async fn load_layout(&self) -> Result<Option<Value>, CliError> {
        const PATH: &str = "/dashboard_layout";
        let (status, value) = self.send(Method::GET, PATH, None, false).await?;
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        expect_success(status, PATH, &value.to_string())?;
        Ok(Some(value))
    }

    /// `POST /refresh_recommendations`. Fails unless the body reports success.
    pub async fn refresh_recommendations(&self) -> Result<(), CliError> {
        const PATH: &str = "/refresh_recommendations";
        let (status, value) = self.send(Method::POST, PATH, None, true).await?;
        expect_success(status, PATH, &value.to_string())?;
        check_refresh(status, &value)
    }

    /// `GET /get_latest_articles`, truncated to what the dashboard shows.
    pub async fn latest_articles(&self) -> Result<Vec<Article>, CliError> {
        const PATH: &str = "/get_latest_articles";
        let (status, value) = self.send(Method::GET, PATH, None, false).await?;
        expect_success(status, PATH, &value.to_string())?;
        let parsed: ArticlesResponse = serde_json::from_value(value)?;
        Ok(latest(parsed))
    }

    fn url(&self, path: &str) -> String {
        endpoint(&self.base_url, path)
    }

    async fn send(
        &self,
        method: Method,
        path: &'static str,
        body: Option<&Value>,
        csrf: bool,
    ) -> Result<(StatusCode, Value), CliError> {
        let session = self.session_token.as_deref().ok_or(CliError::MissingSessionToken)?;
        let csrf_token = if csrf {
            Some(self.csrf_token.as_deref().ok_or(CliError::MissingCsrfToken)?)
        } else {
            None
        };
        let headers = auth_headers(session, csrf_token)?;

        debug!(%method, path, "request");
        let request = self.http.request(method, self.url(path)).headers(headers);
        let request = if let Some(json) = body { request.json(json) } else { request };

        let response = request.send().await?;
        let status = response.status();
        let value = response.json::<Value>().await.unwrap_or(Value::Null);
        Ok((status, value))
    }
}

pub(crate) fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), path)
}

pub(crate) fn auth_headers(session: &str, csrf: Option<&str>) -> Result<HeaderMap, CliError> {
    let mut headers = HeaderMap::new();
    headers.insert(COOKIE, HeaderValue::from_str(&format!("session_token={session}"))?);
    if let Some(token) = csrf {
        headers.insert(HeaderName::from_static(CSRF_HEADER), HeaderValue::from_str(token)?);
    }
    Ok(headers)
}

fn expect_success(status: StatusCode, path: &'static str, message: &str) -> Result<(), CliError> {
    if status.is_success() {
        return Ok(());
    }
    Err(CliError::ServerStatus { status: status.as_u16(), path, message: message.to_owned() })
}

pub(crate) fn check_refresh(status: StatusCode, value: &Value) -> Result<(), CliError> {
    let parsed = RefreshResponse::deserialize(value)?;
    if parsed.success {
        return Ok(());
    }
    Err(CliError::ServerStatus {
        status: status.as_u16(),
        path: "/refresh_recommendations",
        message: "refresh reported failure".to_owned(),
    })
}

pub(crate) fn latest(response: ArticlesResponse) -> Vec<Article> {
    response.articles.into_iter().take(LATEST_ARTICLES_LIMIT).collect()
}

pub(crate) fn format_articles(articles: &[Article]) -> String {
    if articles.is_empty() {
        return "no articles\n".to_owned();
    }
    articles
        .iter()
        .map(|article| format!("{}\n  {}\n", article.title, article.url))
        .collect()
}
