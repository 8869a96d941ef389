//! Integration tests for the full query flow against a mocked Calendar API.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::sync::atomic::{AtomicUsize, Ordering};

use freeslot_auth::{StaticTokenProvider, TokenProvider};
use freeslot_cli::{list_calendars, run_query};
use freeslot_core::{AppError, AuthError, Config, ProviderError};
use freeslot_schedule::{DisplayMode, QueryRequest, RowStyle, ScheduleError};
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Counts token requests and hands out a fixed token.
struct CountingTokens(AtomicUsize);

impl TokenProvider for CountingTokens {
    async fn get_token(&self) -> Result<String, AuthError> {
        self.0.fetch_add(1, Ordering::SeqCst);
        Ok("test_token".into())
    }
}

struct DeniedTokens;

impl TokenProvider for DeniedTokens {
    async fn get_token(&self) -> Result<String, AuthError> {
        Err(AuthError::ConsentDenied("access_denied".into()))
    }
}

fn config(server: &MockServer, dir: &tempfile::TempDir) -> Config {
    let mut config = Config {
        config_dir: dir.path().to_path_buf(),
        ..Default::default()
    };
    config.calendar.api_base_url = server.uri();
    config.display.time_zone = Some("UTC".into());
    config.window.start = "08:00".into();
    config.window.end = "18:00".into();
    config
}

fn request(start: &str, end: &str) -> QueryRequest {
    QueryRequest {
        start_date: Some(start.into()),
        end_date: Some(end.into()),
        ..Default::default()
    }
}

async fn mount_calendar_list(server: &MockServer, ids: &[&str]) {
    let items: Vec<_> = ids
        .iter()
        .map(|id| json!({"id": id, "summary": id, "accessRole": "owner"}))
        .collect();
    Mock::given(method("GET"))
        .and(path("/users/me/calendarList"))
        .and(header("Authorization", "Bearer test_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": items })))
        .mount(server)
        .await;
}

async fn mount_free_busy(server: &MockServer, calendars: serde_json::Value) {
    Mock::given(method("POST"))
        .and(path("/freeBusy"))
        .and(header("Authorization", "Bearer test_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "kind": "calendar#freeBusy",
            "calendars": calendars
        })))
        .expect(1)
        .mount(server)
        .await;
}

async fn free_busy_body(server: &MockServer) -> serde_json::Value {
    let requests = server.received_requests().await.unwrap();
    let request = requests
        .iter()
        .find(|r| r.url.path() == "/freeBusy")
        .expect("freeBusy was not called");
    serde_json::from_slice(&request.body).unwrap()
}

#[tokio::test]
async fn test_free_times_across_calendars() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    mount_calendar_list(&server, &["work", "home"]).await;
    mount_free_busy(
        &server,
        json!({
            "work": {"busy": [{"start": "2024-02-05T09:00:00Z", "end": "2024-02-05T10:00:00Z"}]},
            "home": {"busy": [{"start": "2024-02-05T13:00:00Z", "end": "2024-02-05T14:00:00Z"}]}
        }),
    )
    .await;

    let tokens = StaticTokenProvider("test_token".into());
    let output = run_query(
        &request("2024-02-05", "2024-02-05"),
        &config(&server, &dir),
        &tokens,
        RowStyle::Html,
    )
    .await
    .unwrap();

    assert_eq!(
        output,
        "Monday, 2/5<ul><li>8:00 AM - 9:00 AM</li><li>10:00 AM - 1:00 PM</li>\
         <li>2:00 PM - 6:00 PM</li></ul>"
    );

    let body = free_busy_body(&server).await;
    assert_eq!(body["timeMin"], "2024-02-05T08:00:00+00:00");
    assert_eq!(body["timeMax"], "2024-02-05T18:00:00+00:00");
}

#[tokio::test]
async fn test_days_without_busy_time_are_fully_free() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    mount_calendar_list(&server, &["work"]).await;
    mount_free_busy(&server, json!({"work": {"busy": []}})).await;

    let tokens = StaticTokenProvider("test_token".into());
    let output = run_query(
        &request("2024-02-05", "2024-02-07"),
        &config(&server, &dir),
        &tokens,
        RowStyle::Text,
    )
    .await
    .unwrap();

    assert_eq!(
        output,
        "Monday, 2/5\n  - 8:00 AM - 6:00 PM\n\n\
         Tuesday, 2/6\n  - 8:00 AM - 6:00 PM\n\n\
         Wednesday, 2/7\n  - 8:00 AM - 6:00 PM"
    );
}

#[tokio::test]
async fn test_excluded_calendar_is_not_queried() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    mount_calendar_list(&server, &["work", "holidays"]).await;
    mount_free_busy(
        &server,
        json!({
            "work": {"busy": [{"start": "2024-02-05T09:00:00Z", "end": "2024-02-05T10:00:00Z"}]}
        }),
    )
    .await;

    let mut request = request("2024-02-05", "2024-02-05");
    request.excluded = vec!["holidays".into()];

    let tokens = StaticTokenProvider("test_token".into());
    let output = run_query(&request, &config(&server, &dir), &tokens, RowStyle::Text)
        .await
        .unwrap();

    assert_eq!(
        output,
        "Monday, 2/5\n  - 8:00 AM - 9:00 AM\n  - 10:00 AM - 6:00 PM"
    );
    let body = free_busy_body(&server).await;
    assert_eq!(body["items"], json!([{"id": "work"}]));
}

#[tokio::test]
async fn test_busy_mode_lists_raw_blocks() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    mount_calendar_list(&server, &["work", "home"]).await;
    mount_free_busy(
        &server,
        json!({
            "work": {"busy": [{"start": "2024-02-05T11:00:00Z", "end": "2024-02-05T12:00:00Z"}]},
            "home": {"busy": [{"start": "2024-02-05T09:00:00Z", "end": "2024-02-05T11:30:00Z"}]}
        }),
    )
    .await;

    let mut request = request("2024-02-05", "2024-02-05");
    request.mode = DisplayMode::Busy;

    let tokens = StaticTokenProvider("test_token".into());
    let output = run_query(&request, &config(&server, &dir), &tokens, RowStyle::Text)
        .await
        .unwrap();

    assert_eq!(
        output,
        "Monday, 2/5\n  - 9:00 AM - 11:30 AM\n  - 11:00 AM - 12:00 PM"
    );
}

#[tokio::test]
async fn test_query_window_uses_requested_zone() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    mount_calendar_list(&server, &["work"]).await;
    mount_free_busy(&server, json!({"work": {"busy": []}})).await;

    let mut request = request("2024-02-05", "2024-02-05");
    request.time_zone = Some("America/New_York".into());

    let tokens = StaticTokenProvider("test_token".into());
    let output = run_query(&request, &config(&server, &dir), &tokens, RowStyle::Text)
        .await
        .unwrap();

    assert_eq!(output, "Monday, 2/5\n  - 8:00 AM - 6:00 PM");
    let body = free_busy_body(&server).await;
    assert_eq!(body["timeMin"], "2024-02-05T13:00:00+00:00");
    assert_eq!(body["timeMax"], "2024-02-05T23:00:00+00:00");
}

#[tokio::test]
async fn test_missing_dates_make_no_calls() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    Mock::given(method("GET"))
        .and(path("/users/me/calendarList"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let tokens = CountingTokens(AtomicUsize::new(0));
    let request = QueryRequest {
        start_date: Some("2024-02-05".into()),
        end_date: Some("   ".into()),
        ..Default::default()
    };
    let err = run_query(&request, &config(&server, &dir), &tokens, RowStyle::Html)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Input(ScheduleError::MissingEndDate)));
    assert_eq!(err.user_message(), "Please select a start and end date.");
    assert_eq!(tokens.0.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_end_before_start_is_rejected() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let tokens = CountingTokens(AtomicUsize::new(0));

    let err = run_query(
        &request("2024-02-07", "2024-02-05"),
        &config(&server, &dir),
        &tokens,
        RowStyle::Html,
    )
    .await
    .unwrap_err();

    assert!(matches!(
        err,
        AppError::Input(ScheduleError::EndBeforeStart { .. })
    ));
    assert_eq!(tokens.0.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_provider_failure_aborts_query() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    mount_calendar_list(&server, &["work"]).await;
    Mock::given(method("POST"))
        .and(path("/freeBusy"))
        .respond_with(ResponseTemplate::new(500).set_body_string("backend error"))
        .mount(&server)
        .await;

    let tokens = StaticTokenProvider("test_token".into());
    let err = run_query(
        &request("2024-02-05", "2024-02-06"),
        &config(&server, &dir),
        &tokens,
        RowStyle::Html,
    )
    .await
    .unwrap_err();

    assert!(matches!(
        err,
        AppError::Provider(ProviderError::ServerError { status: 500, .. })
    ));
}

#[tokio::test]
async fn test_unavailable_calendar_aborts_query() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    mount_calendar_list(&server, &["work", "shared"]).await;
    mount_free_busy(
        &server,
        json!({
            "work": {"busy": []},
            "shared": {"busy": [], "errors": [{"domain": "global", "reason": "notFound"}]}
        }),
    )
    .await;

    let tokens = StaticTokenProvider("test_token".into());
    let err = run_query(
        &request("2024-02-05", "2024-02-05"),
        &config(&server, &dir),
        &tokens,
        RowStyle::Html,
    )
    .await
    .unwrap_err();

    assert!(matches!(
        err,
        AppError::Provider(ProviderError::InvalidResponse(ref m)) if m.contains("shared")
    ));
}

#[tokio::test]
async fn test_denied_consent_aborts_before_fetch() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    Mock::given(method("GET"))
        .and(path("/users/me/calendarList"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = run_query(
        &request("2024-02-05", "2024-02-05"),
        &config(&server, &dir),
        &DeniedTokens,
        RowStyle::Html,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, AppError::Auth(AuthError::ConsentDenied(_))));
}

#[tokio::test]
async fn test_list_calendars() {
    let server = MockServer::start().await;
    mount_calendar_list(&server, &["work", "home"]).await;

    let tokens = StaticTokenProvider("test_token".into());
    let calendars = list_calendars(&tokens, &server.uri()).await.unwrap();

    let ids: Vec<_> = calendars.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["work", "home"]);
}
