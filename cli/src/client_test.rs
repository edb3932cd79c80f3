use serde_json::json;

use super::*;

fn article(n: usize) -> Article {
    Article { title: format!("Article {n}"), url: format!("https://example.com/{n}") }
}

// =============================================================================
// endpoint / auth_headers
// =============================================================================

#[test]
fn endpoint_strips_trailing_slashes() {
    assert_eq!(endpoint("http://localhost:3000/", "/healthz"), "http://localhost:3000/healthz");
    assert_eq!(endpoint("http://localhost:3000", "/healthz"), "http://localhost:3000/healthz");
}

#[test]
fn auth_headers_carry_session_cookie() {
    let headers = auth_headers("abc", None).unwrap();
    assert_eq!(headers.get(COOKIE).unwrap(), "session_token=abc");
    assert!(headers.get(CSRF_HEADER).is_none());
}

#[test]
fn auth_headers_carry_csrf_when_given() {
    let headers = auth_headers("abc", Some("tok")).unwrap();
    assert_eq!(headers.get("X-CSRFToken").unwrap(), "tok");
}

#[test]
fn auth_headers_reject_control_characters() {
    let err = auth_headers("bad\nvalue", None).unwrap_err();
    assert!(matches!(err, CliError::InvalidHeader(_)));
}

// =============================================================================
// check_refresh
// =============================================================================

#[test]
fn refresh_success() {
    assert!(check_refresh(StatusCode::OK, &json!({"success": true})).is_ok());
}

#[test]
fn refresh_failure_reported() {
    let err = check_refresh(StatusCode::OK, &json!({"success": false})).unwrap_err();
    assert!(matches!(err, CliError::ServerStatus { status: 200, .. }));
}

#[test]
fn refresh_missing_flag_is_failure() {
    assert!(check_refresh(StatusCode::OK, &json!({})).is_err());
}

// =============================================================================
// latest / format_articles
// =============================================================================

#[test]
fn feed_polls_every_five_minutes() {
    assert_eq!(LATEST_ARTICLES_POLL_MS, 5 * 60 * 1000);
}

#[test]
fn latest_keeps_first_three() {
    let response = ArticlesResponse { articles: (0..5).map(article).collect() };
    let kept = latest(response);
    assert_eq!(kept, vec![article(0), article(1), article(2)]);
}

#[test]
fn articles_body_without_list_is_empty() {
    let response: ArticlesResponse = serde_json::from_value(json!({})).unwrap();
    assert!(latest(response).is_empty());
}

#[test]
fn format_lists_title_then_url() {
    let text = format_articles(&[article(1)]);
    assert_eq!(text, "Article 1\n  https://example.com/1\n");
}

#[test]
fn format_empty() {
    assert_eq!(format_articles(&[]), "no articles\n");
}

// =============================================================================
// Client
// =============================================================================

#[tokio::test]
async fn save_without_session_fails_before_sending() {
    let client = Client::new("http://127.0.0.1:1".into(), None, Some("tok".into()));
    let err = client.save_layout(&json!({})).await.unwrap_err();
    assert!(matches!(err, CliError::MissingSessionToken));
}

#[tokio::test]
async fn refresh_without_csrf_fails_before_sending() {
    let client = Client::new("http://127.0.0.1:1".into(), Some("abc".into()), None);
    let err = client.refresh_recommendations().await.unwrap_err();
    assert!(matches!(err, CliError::MissingCsrfToken));
}
