//! HTTP client for Canvas API communication.
//!
//! This module provides the [`HttpClient`] type, the request executor behind
//! every API call: it builds the authenticated request, passes through the
//! rate gate, sends it, classifies failures, and applies the bounded retry
//! policy for transient statuses.

use std::collections::HashMap;

use crate::clients::errors::{ApiError, HttpError};
use crate::clients::http_request::{HttpMethod, HttpRequest};
use crate::clients::http_response::HttpResponse;
use crate::clients::rate_limit::RateLimiter;
use crate::config::CanvasConfig;

/// Path prefix for all relative API requests.
pub const API_BASE_PATH: &str = "/api/v1";

/// Base delay for the exponential retry backoff.
const RETRY_BASE_DELAY: std::time::Duration = std::time::Duration::from_millis(500);

/// Upper bound on any single retry delay.
const RETRY_MAX_DELAY: std::time::Duration = std::time::Duration::from_secs(30);

/// Remaining-quota threshold below which a warning is logged.
const LOW_QUOTA_THRESHOLD: f64 = 50.0;

/// Client version from Cargo.toml.
pub const CLIENT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// HTTP client for making requests to a Canvas installation.
///
/// The client handles:
/// - URL construction from the configured base URL (absolute URLs from
///   pagination links pass through untouched)
/// - Default headers including User-Agent and the bearer access token
/// - Local token-bucket rate limiting of every outbound request
/// - Automatic bounded retries for 429 and 502/503/504 responses
/// - Classification of every other non-2xx response into an [`ApiError`]
///
/// # Thread Safety
///
/// `HttpClient` is `Send + Sync`, making it safe to share across async
/// tasks. Requests are independent except for the shared rate gate.
///
/// # Example
///
/// ```rust,ignore
/// use canvas_api::{CanvasConfig, HttpClient, HttpMethod, HttpRequest};
///
/// let client = HttpClient::new(&config);
/// let request = HttpRequest::builder(HttpMethod::Get, "courses")
///     .query_param("per_page", 50)
///     .build()?;
/// let response = client.request(request).await?;
/// ```
#[derive(Debug)]
pub struct HttpClient {
    /// The internal reqwest HTTP client.
    client: reqwest::Client,
    /// Base URL of the installation (e.g., `https://canvas.example.edu`).
    base_url: String,
    /// Default headers to include in all requests.
    default_headers: HashMap<String, String>,
    /// Token bucket gating every outbound request.
    limiter: RateLimiter,
    /// Ceiling on automatic retries for transient failures.
    max_retries: u32,
    /// Whole-logical-call deadline, if configured.
    timeout: Option<std::time::Duration>,
}

// Verify HttpClient is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<HttpClient>();
};

impl HttpClient {
    /// Creates a new HTTP client for the given configuration.
    ///
    /// # Panics
    ///
    /// Panics if the underlying reqwest client cannot be created. This should
    /// only happen in extremely unusual circumstances (e.g., TLS
    /// initialization failure).
    #[must_use]
    pub fn new(config: &CanvasConfig) -> Self {
        // Build User-Agent header
        let user_agent_prefix = config
            .user_agent_prefix()
            .map_or(String::new(), |prefix| format!("{prefix} | "));
        let rust_version = env!("CARGO_PKG_RUST_VERSION");
        let user_agent =
            format!("{user_agent_prefix}Canvas API Client v{CLIENT_VERSION} | Rust {rust_version}");

        // Build default headers
        let mut default_headers = HashMap::new();
        default_headers.insert("User-Agent".to_string(), user_agent);
        default_headers.insert("Accept".to_string(), "application/json".to_string());
        default_headers.insert(
            "Authorization".to_string(),
            format!("Bearer {}", config.access_token().as_ref()),
        );

        // Create reqwest client
        let client = reqwest::Client::builder()
            .use_rustls_tls()
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: config.base_url().as_ref().to_string(),
            default_headers,
            limiter: RateLimiter::new(config.requests_per_second()),
            max_retries: config.max_retries(),
            timeout: config.timeout(),
        }
    }

    /// Returns the base URL for this client.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the default headers for this client.
    #[must_use]
    pub const fn default_headers(&self) -> &HashMap<String, String> {
        &self.default_headers
    }

    /// Returns the rate limiter gating this client's requests.
    #[must_use]
    pub const fn rate_limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    /// Sends an HTTP request to the API.
    ///
    /// This method performs one logical call end-to-end: validation, URL
    /// resolution, rate limiting, the network round trip, response parsing,
    /// and the retry policy for transient failures. When a deadline is
    /// configured, it bounds the whole call including every retry.
    ///
    /// # Retry Behavior
    ///
    /// - **429**: retried up to the ceiling, honoring the server's
    ///   `Retry-After` hint when present
    /// - **502 / 503 / 504**: retried up to the ceiling with exponential
    ///   backoff and jitter
    /// - **Transport failures**: retried for GET only; a write whose
    ///   connection died may already have been applied, so it surfaces
    ///   immediately as [`HttpError::Network`]
    /// - **Any other non-2xx**: returned immediately, classified
    ///
    /// All retries pass back through the rate gate. When retries are
    /// exhausted the last classified error is returned verbatim.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] if:
    /// - Request validation fails (`InvalidRequest`)
    /// - No response is received (`Network`)
    /// - A non-2xx response survives the retry policy (`Api`)
    /// - A 2xx body cannot be parsed as JSON (`Decode`)
    /// - The configured deadline elapses (`Cancelled`)
    pub async fn request(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        request.verify()?;

        match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, self.execute(&request)).await {
                Ok(result) => result,
                Err(_) => Err(HttpError::Cancelled),
            },
            None => self.execute(&request).await,
        }
    }

    /// Resolves a request path against the base URL.
    ///
    /// Absolute URLs (pagination links) are used verbatim; relative paths
    /// are joined under the `/api/v1/` prefix.
    fn resolve_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else {
            let path = path.trim_start_matches('/');
            format!("{}{API_BASE_PATH}/{path}", self.base_url)
        }
    }

    async fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, HttpError> {
        let url = self.resolve_url(&request.path);
        let mut attempt: u32 = 0;

        loop {
            self.limiter.acquire().await;

            let response = match self.send(request, &url).await {
                Ok(response) => response,
                Err(err) => {
                    // A write whose connection died may already have been
                    // applied server-side; only GETs are safe to resend.
                    if matches!(request.method, HttpMethod::Get) && attempt < self.max_retries {
                        attempt += 1;
                        let delay = backoff_delay(attempt, None);
                        tracing::debug!(
                            error = %err,
                            attempt,
                            "transport failure, retrying GET"
                        );
                        tokio::time::sleep(delay).await;
                        continue;
                    }
                    return Err(HttpError::Network(err));
                }
            };

            let code = response.status().as_u16();
            let headers = parse_response_headers(response.headers());
            let body_text = response.text().await.unwrap_or_default();

            if (200..=299).contains(&code) {
                return parse_success(request, code, headers, &body_text);
            }

            let error = ApiError::classify(code, &body_text);

            let should_retry =
                matches!(code, 429 | 502 | 503 | 504) && attempt < self.max_retries;
            if !should_retry {
                return Err(HttpError::Api(error));
            }

            attempt += 1;
            let hint = if code == 429 {
                first_header_value(&headers, "retry-after").and_then(|v| v.parse::<f64>().ok())
            } else {
                None
            };
            let delay = backoff_delay(attempt, hint);
            tracing::debug!(
                status = code,
                attempt,
                delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                "retrying after transient API error"
            );
            tokio::time::sleep(delay).await;
        }
    }

    async fn send(&self, request: &HttpRequest, url: &str) -> Result<reqwest::Response, reqwest::Error> {
        let mut builder = match request.method {
            HttpMethod::Get => self.client.get(url),
            HttpMethod::Post => self.client.post(url),
            HttpMethod::Put => self.client.put(url),
            HttpMethod::Delete => self.client.delete(url),
        };

        for (key, value) in &self.default_headers {
            builder = builder.header(key, value);
        }
        if let Some(extra) = &request.extra_headers {
            for (key, value) in extra {
                builder = builder.header(key, value);
            }
        }

        if !request.query.is_empty() {
            builder = builder.query(request.query.as_slice());
        }

        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        builder.send().await
    }
}

/// Builds the [`HttpResponse`] for a 2xx reply, decoding the JSON body.
///
/// An empty body becomes `Value::Null`; a non-empty body that is not valid
/// JSON is a [`HttpError::Decode`].
fn parse_success(
    request: &HttpRequest,
    code: u16,
    headers: HashMap<String, Vec<String>>,
    body_text: &str,
) -> Result<HttpResponse, HttpError> {
    let body = if body_text.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_str(body_text).map_err(|source| HttpError::Decode {
            context: format!("{} {}", request.method, request.path),
            source,
        })?
    };

    let response = HttpResponse::new(code, headers, body);

    if let Some(info) = &response.rate_limit {
        if info.remaining < LOW_QUOTA_THRESHOLD {
            tracing::warn!(
                remaining = info.remaining,
                path = %request.path,
                "server-side rate limit quota is running low"
            );
        }
    }

    Ok(response)
}

/// Parses response headers into a lower-cased multi-value map.
fn parse_response_headers(headers: &reqwest::header::HeaderMap) -> HashMap<String, Vec<String>> {
    let mut result: HashMap<String, Vec<String>> = HashMap::new();
    for (name, value) in headers {
        let key = name.as_str().to_lowercase();
        let value = value.to_str().unwrap_or_default().to_string();
        result.entry(key).or_default().push(value);
    }
    result
}

fn first_header_value<'a>(headers: &'a HashMap<String, Vec<String>>, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|values| values.first())
        .map(String::as_str)
}

/// Calculates the delay before retry number `attempt` (1-based).
///
/// A server-provided hint (the `Retry-After` value on a 429) wins outright;
/// otherwise the delay grows exponentially from [`RETRY_BASE_DELAY`] with
/// ±10% jitter, capped at [`RETRY_MAX_DELAY`].
fn backoff_delay(attempt: u32, server_hint: Option<f64>) -> std::time::Duration {
    if let Some(seconds) = server_hint {
        if seconds.is_finite() && seconds >= 0.0 {
            return std::time::Duration::from_secs_f64(seconds.min(RETRY_MAX_DELAY.as_secs_f64()));
        }
    }

    let exponent = attempt.saturating_sub(1).min(16);
    let base = RETRY_BASE_DELAY.as_secs_f64() * f64::from(1_u32 << exponent);
    let jitter = 1.0 + (rand::random::<f64>() - 0.5) * 0.2;
    std::time::Duration::from_secs_f64((base * jitter).min(RETRY_MAX_DELAY.as_secs_f64()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AccessToken, BaseUrl};

    fn create_test_config() -> CanvasConfig {
        CanvasConfig::builder()
            .base_url(BaseUrl::new("https://canvas.example.edu").unwrap())
            .access_token(AccessToken::new("test-access-token").unwrap())
            .build()
            .unwrap()
    }

    #[test]
    fn test_client_construction_from_config() {
        let client = HttpClient::new(&create_test_config());

        assert_eq!(client.base_url(), "https://canvas.example.edu");
        assert!(client.rate_limiter().is_unlimited());
    }

    #[test]
    fn test_bearer_token_header_injection() {
        let client = HttpClient::new(&create_test_config());

        assert_eq!(
            client.default_headers().get("Authorization"),
            Some(&"Bearer test-access-token".to_string())
        );
    }

    #[test]
    fn test_user_agent_header_format() {
        let client = HttpClient::new(&create_test_config());

        let user_agent = client.default_headers().get("User-Agent").unwrap();
        assert!(user_agent.contains("Canvas API Client v"));
        assert!(user_agent.contains("Rust"));
    }

    #[test]
    fn test_user_agent_with_prefix() {
        let config = CanvasConfig::builder()
            .base_url(BaseUrl::new("https://canvas.example.edu").unwrap())
            .access_token(AccessToken::new("token").unwrap())
            .user_agent_prefix("MyApp/1.0")
            .build()
            .unwrap();
        let client = HttpClient::new(&config);

        let user_agent = client.default_headers().get("User-Agent").unwrap();
        assert!(user_agent.starts_with("MyApp/1.0 | "));
    }

    #[test]
    fn test_accept_header_is_json() {
        let client = HttpClient::new(&create_test_config());

        assert_eq!(
            client.default_headers().get("Accept"),
            Some(&"application/json".to_string())
        );
    }

    #[test]
    fn test_resolve_url_joins_relative_paths() {
        let client = HttpClient::new(&create_test_config());

        assert_eq!(
            client.resolve_url("courses"),
            "https://canvas.example.edu/api/v1/courses"
        );
        assert_eq!(
            client.resolve_url("/accounts/1/courses"),
            "https://canvas.example.edu/api/v1/accounts/1/courses"
        );
    }

    #[test]
    fn test_resolve_url_passes_absolute_urls_through() {
        let client = HttpClient::new(&create_test_config());

        let absolute = "https://canvas.example.edu/api/v1/courses?page=2&per_page=10";
        assert_eq!(client.resolve_url(absolute), absolute);
    }

    #[test]
    fn test_client_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<HttpClient>();
    }

    #[test]
    fn test_backoff_delay_grows_exponentially() {
        // Jitter is ±10%, so compare against generous bounds.
        let first = backoff_delay(1, None);
        assert!(first >= std::time::Duration::from_millis(400));
        assert!(first <= std::time::Duration::from_millis(600));

        let third = backoff_delay(3, None);
        assert!(third >= std::time::Duration::from_millis(1600));
        assert!(third <= std::time::Duration::from_millis(2400));
    }

    #[test]
    fn test_backoff_delay_honors_server_hint() {
        let delay = backoff_delay(1, Some(2.5));
        assert!((delay.as_secs_f64() - 2.5).abs() < 1e-9);
    }

    #[test]
    fn test_backoff_delay_ignores_garbage_hint() {
        let delay = backoff_delay(1, Some(-1.0));
        assert!(delay >= std::time::Duration::from_millis(400));

        let delay = backoff_delay(1, Some(f64::NAN));
        assert!(delay >= std::time::Duration::from_millis(400));
    }

    #[test]
    fn test_backoff_delay_is_capped() {
        let delay = backoff_delay(30, None);
        assert!(delay <= RETRY_MAX_DELAY);

        let delay = backoff_delay(1, Some(1e9));
        assert!(delay <= RETRY_MAX_DELAY);
    }
}
