//! Integration tests for the request executor.
//!
//! These tests run against a local mock server and verify header injection,
//! error classification, the retry policy, and deadline behavior.

use std::time::Duration;

use canvas_api::{
    AccessToken, ApiVariant, BaseUrl, CanvasClient, CanvasConfig, HttpError, QueryParams,
};
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a client pointed at the given mock server, probe skipped.
fn create_test_client(server: &MockServer) -> CanvasClient {
    let config = CanvasConfig::builder()
        .base_url(BaseUrl::new(server.uri()).unwrap())
        .access_token(AccessToken::new("test-token").unwrap())
        .build()
        .unwrap();
    CanvasClient::with_variant(&config, ApiVariant::default())
}

// ============================================================================
// Request Construction
// ============================================================================

#[tokio::test]
async fn test_bearer_token_is_sent_on_every_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/courses/1"))
        .and(header("Authorization", "Bearer test-token"))
        .and(header("Accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 1})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let course: serde_json::Value = client
        .get_json("courses/1", QueryParams::new())
        .await
        .unwrap();

    assert_eq!(course["id"], 1);
}

#[tokio::test]
async fn test_array_query_params_use_bracket_convention() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/courses"))
        .and(wiremock::matchers::query_param("include[]", "term"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let _: serde_json::Value = client
        .get_json("courses", QueryParams::new().array("include", ["term"]))
        .await
        .unwrap();
}

// ============================================================================
// Error Classification
// ============================================================================

#[tokio::test]
async fn test_401_json_body_classified_as_auth_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/users/self"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({"errors": [{"message": "Invalid access token"}]})),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let err = client
        .get_json::<serde_json::Value>("users/self", QueryParams::new())
        .await
        .unwrap_err();

    assert!(err.is_auth_error());
    assert!(!err.is_rate_limit_error());
    assert!(!err.is_not_found_error());

    let api = err.api().unwrap();
    assert_eq!(api.status, 401);
    assert_eq!(api.first_message(), "Invalid access token");
    assert!(!api.suggestion.is_empty());
    assert!(api.docs_url.starts_with("https://"));
}

#[tokio::test]
async fn test_500_plain_text_body_classified_with_raw_message() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/courses"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let err = client
        .get_json::<serde_json::Value>("courses", QueryParams::new())
        .await
        .unwrap_err();

    let api = err.api().unwrap();
    assert_eq!(api.status, 500);
    assert_eq!(api.errors.len(), 1);
    assert_eq!(api.first_message(), "Internal Server Error");
    assert!(!api.suggestion.is_empty());
}

#[tokio::test]
async fn test_error_report_id_is_surfaced() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/courses"))
        .respond_with(ResponseTemplate::new(500).set_body_json(
            json!({"errors": [{"message": "something broke"}], "error_report_id": 98765}),
        ))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let err = client
        .get_json::<serde_json::Value>("courses", QueryParams::new())
        .await
        .unwrap_err();

    assert_eq!(err.api().unwrap().error_report_id.as_deref(), Some("98765"));
}

#[tokio::test]
async fn test_2xx_with_undecodable_body_is_a_decode_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/courses/1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let err = client
        .get_json::<serde_json::Value>("courses/1", QueryParams::new())
        .await
        .unwrap_err();

    assert!(matches!(err, HttpError::Decode { .. }));
}

// ============================================================================
// Retry Policy
// ============================================================================

#[tokio::test]
async fn test_503_is_retried_until_success() {
    let mock_server = MockServer::start().await;

    // First attempt fails with 503, the retry succeeds.
    Mock::given(method("GET"))
        .and(path("/api/v1/courses"))
        .respond_with(ResponseTemplate::new(503).set_body_string("Service Unavailable"))
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1/courses"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 1}])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let courses: Vec<serde_json::Value> = client
        .get_json("courses", QueryParams::new())
        .await
        .unwrap();

    assert_eq!(courses.len(), 1);
}

#[tokio::test]
async fn test_429_retry_honors_server_hint() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/courses"))
        .respond_with(
            ResponseTemplate::new(429)
                .insert_header("Retry-After", "0")
                .set_body_string("Rate Limit Exceeded"),
        )
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1/courses"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let start = std::time::Instant::now();
    let courses: Vec<serde_json::Value> = client
        .get_json("courses", QueryParams::new())
        .await
        .unwrap();

    assert!(courses.is_empty());
    // Retry-After: 0 means the retry should not have waited out the
    // exponential backoff schedule.
    assert!(start.elapsed() < Duration::from_millis(400));
}

#[tokio::test]
async fn test_429_exhaustion_returns_last_classified_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/courses"))
        .respond_with(
            ResponseTemplate::new(429)
                .insert_header("Retry-After", "0")
                .set_body_json(json!({"errors": [{"message": "Rate Limit Exceeded"}]})),
        )
        .expect(3)
        .mount(&mock_server)
        .await;

    let config = CanvasConfig::builder()
        .base_url(BaseUrl::new(mock_server.uri()).unwrap())
        .access_token(AccessToken::new("test-token").unwrap())
        .max_retries(2)
        .build()
        .unwrap();
    let client = CanvasClient::with_variant(&config, ApiVariant::default());

    let err = client
        .get_json::<serde_json::Value>("courses", QueryParams::new())
        .await
        .unwrap_err();

    // The last classified error comes back verbatim, not wrapped.
    assert!(err.is_rate_limit_error());
    assert_eq!(err.api().unwrap().first_message(), "Rate Limit Exceeded");
}

#[tokio::test]
async fn test_400_is_not_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/courses"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(json!({"errors": [{"message": "bad per_page"}]})),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let err = client
        .get_json::<serde_json::Value>("courses", QueryParams::new())
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(400));
}

#[tokio::test]
async fn test_500_is_not_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/courses"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let err = client
        .get_json::<serde_json::Value>("courses", QueryParams::new())
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(500));
}

#[tokio::test]
async fn test_write_returning_503_is_retried() {
    let mock_server = MockServer::start().await;

    // A 503 proves the write was not applied, so writes retry it too.
    Mock::given(method("POST"))
        .and(path("/api/v1/accounts/1/courses"))
        .respond_with(ResponseTemplate::new(503).set_body_string("Service Unavailable"))
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/v1/accounts/1/courses"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 7})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let created: serde_json::Value = client
        .post_json("accounts/1/courses", json!({"course": {"name": "x"}}))
        .await
        .unwrap();

    assert_eq!(created["id"], 7);
}

#[tokio::test]
async fn test_network_failure_on_write_is_not_retried() {
    // Nothing listens on this port; the connection is refused outright.
    let config = CanvasConfig::builder()
        .base_url(BaseUrl::new("http://127.0.0.1:9").unwrap())
        .access_token(AccessToken::new("test-token").unwrap())
        .max_retries(3)
        .build()
        .unwrap();
    let client = CanvasClient::with_variant(&config, ApiVariant::default());

    let start = std::time::Instant::now();
    let err = client
        .post_json::<serde_json::Value>("accounts/1/courses", json!({"course": {}}))
        .await
        .unwrap_err();

    assert!(matches!(err, HttpError::Network(_)));
    // No backoff schedule ran: the write surfaced on the first failure.
    assert!(start.elapsed() < Duration::from_millis(400));
}

// ============================================================================
// Validation and Deadlines
// ============================================================================

#[tokio::test]
async fn test_empty_path_fails_before_sending() {
    let mock_server = MockServer::start().await;
    let client = create_test_client(&mock_server);

    let err = client
        .get_json::<serde_json::Value>("", QueryParams::new())
        .await
        .unwrap_err();

    assert!(matches!(err, HttpError::InvalidRequest(_)));
}

#[tokio::test]
async fn test_deadline_elapsing_mid_request_returns_cancelled() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/courses"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([]))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&mock_server)
        .await;

    let config = CanvasConfig::builder()
        .base_url(BaseUrl::new(mock_server.uri()).unwrap())
        .access_token(AccessToken::new("test-token").unwrap())
        .timeout(Duration::from_millis(50))
        .build()
        .unwrap();
    let client = CanvasClient::with_variant(&config, ApiVariant::default());

    let err = client
        .get_json::<serde_json::Value>("courses", QueryParams::new())
        .await
        .unwrap_err();

    assert!(matches!(err, HttpError::Cancelled));
}
