//! HTTP-specific error types for the Canvas API client.
//!
//! This module contains the error classifier and the unified error type for
//! HTTP operations.
//!
//! # Error Handling
//!
//! The client uses specific error types for different failure scenarios:
//!
//! - [`ApiError`]: a non-2xx HTTP response, classified with status, server
//!   messages, and a remediation suggestion
//! - [`InvalidRequestError`]: a request that fails validation before sending
//! - [`HttpError`]: unified error type encompassing all HTTP-related errors,
//!   including network failures, malformed 2xx bodies, and cancellation
//!
//! # Example
//!
//! ```rust,ignore
//! match client.get_json::<Course>("courses/42", QueryParams::new()).await {
//!     Ok(course) => println!("{}", course.name),
//!     Err(err) if err.is_auth_error() => {
//!         eprintln!("token rejected: {err}");
//!     }
//!     Err(err) if err.is_not_found_error() => {
//!         eprintln!("no such course");
//!     }
//!     Err(err) => return Err(err.into()),
//! }
//! ```

use serde::Deserialize;
use thiserror::Error;

/// One server-reported error message and its optional machine-readable code.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ErrorDetail {
    /// The human-readable message reported by the server.
    pub message: String,
    /// The machine-readable error code, when the server provides one.
    pub code: Option<String>,
}

/// Error returned when an HTTP request receives a non-successful response.
///
/// Produced by [`ApiError::classify`], which decodes the API's
/// `{"errors": [{"message": ...}]}` body shape and falls back to the raw
/// body text when the response is not JSON. The status code is always
/// non-zero, and every error carries a remediation `suggestion` and a
/// `docs_url` selected from a fixed status-code table.
///
/// # Example
///
/// ```rust
/// use canvas_api::ApiError;
///
/// let error = ApiError::classify(401, r#"{"errors":[{"message":"Invalid access token"}]}"#);
/// assert_eq!(error.status, 401);
/// assert_eq!(error.first_message(), "Invalid access token");
/// assert!(!error.suggestion.is_empty());
/// ```
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("HTTP {status}: {} ({suggestion})", join_messages(.errors))]
pub struct ApiError {
    /// The HTTP status code of the response (always non-zero).
    pub status: u16,
    /// Server-reported error details, in the order they were reported.
    pub errors: Vec<ErrorDetail>,
    /// Identifier of the server-side error report, when one was generated.
    pub error_report_id: Option<String>,
    /// A remediation hint selected from the status code.
    pub suggestion: &'static str,
    /// A pointer into the API documentation for this class of failure.
    pub docs_url: &'static str,
}

/// Expected JSON shape of an error response body.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    errors: Vec<RawDetail>,
    #[serde(default)]
    error_report_id: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct RawDetail {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error_code: Option<String>,
}

impl ApiError {
    /// Classifies a non-2xx response into a structured error.
    ///
    /// Attempts to decode the body as the API's JSON error shape; if that
    /// fails (some error responses are plain text), synthesizes a single
    /// detail whose message is the raw body text. This function is total —
    /// it always returns a value and never panics.
    #[must_use]
    pub fn classify(status: u16, body: &str) -> Self {
        debug_assert_ne!(status, 0, "classified errors carry a real status code");

        let (errors, error_report_id) = Self::parse_body(body);
        let (suggestion, docs_url) = remediation_for(status);

        Self {
            status,
            errors,
            error_report_id,
            suggestion,
            docs_url,
        }
    }

    /// Returns the first server-reported message, or an empty string if the
    /// server reported none.
    #[must_use]
    pub fn first_message(&self) -> &str {
        self.errors.first().map_or("", |detail| detail.message.as_str())
    }

    fn parse_body(body: &str) -> (Vec<ErrorDetail>, Option<String>) {
        let fallback = || {
            vec![ErrorDetail {
                message: body.to_string(),
                code: None,
            }]
        };

        match serde_json::from_str::<ErrorBody>(body) {
            Ok(parsed) if !parsed.errors.is_empty() => {
                let details = parsed
                    .errors
                    .into_iter()
                    .map(|raw| ErrorDetail {
                        message: raw.message.unwrap_or_default(),
                        code: raw.error_code,
                    })
                    .collect();
                (details, parsed.error_report_id.as_ref().map(report_id_text))
            }
            Ok(parsed) => (fallback(), parsed.error_report_id.as_ref().map(report_id_text)),
            Err(_) => (fallback(), None),
        }
    }
}

/// The API reports `error_report_id` as either a number or a string.
fn report_id_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn join_messages(errors: &[ErrorDetail]) -> String {
    errors
        .iter()
        .map(|detail| detail.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Returns the remediation suggestion and documentation URL for a status code.
const fn remediation_for(status: u16) -> (&'static str, &'static str) {
    match status {
        400 => (
            "Check the request parameters; the endpoint rejected one or more of them.",
            "https://canvas.instructure.com/doc/api/index.html",
        ),
        401 => (
            "The access token was rejected. Verify it is current, and regenerate it if it has expired or been revoked.",
            "https://canvas.instructure.com/doc/api/file.oauth.html",
        ),
        403 => (
            "The token's user is not authorized for this resource. Review the account role and the token's permission scope.",
            "https://canvas.instructure.com/doc/api/file.oauth.html",
        ),
        404 => (
            "Verify the resource identifier in the request path; the record may have been deleted or belong to another account.",
            "https://canvas.instructure.com/doc/api/index.html",
        ),
        422 => (
            "The server rejected the payload. Inspect the returned field-level validation errors and correct the request body.",
            "https://canvas.instructure.com/doc/api/index.html",
        ),
        429 => (
            "The request rate is too high. Slow down and honor the X-Rate-Limit-Remaining and Retry-After headers.",
            "https://canvas.instructure.com/doc/api/file.throttling.html",
        ),
        500 => (
            "The server hit an internal error. Retry later, and include the error report id when contacting support.",
            "https://canvas.instructure.com/doc/api/index.html",
        ),
        502 | 503 | 504 => (
            "The server is temporarily unavailable. This is transient and safe to retry with backoff.",
            "https://canvas.instructure.com/doc/api/index.html",
        ),
        _ => (
            "The server returned an unexpected status. Inspect the reported messages for details.",
            "https://canvas.instructure.com/doc/api/index.html",
        ),
    }
}

/// Error returned when an HTTP request fails validation before sending.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvalidRequestError {
    /// The request path is empty.
    #[error("Request path cannot be empty.")]
    EmptyPath,

    /// A POST or PUT request was built without a body.
    #[error("Cannot use {method} without a request body.")]
    MissingBody {
        /// The HTTP method that requires a body.
        method: String,
    },
}

/// Unified error type for all HTTP-related failures.
///
/// This enum provides a single error type for client operations. Use pattern
/// matching, or the [`is_rate_limit_error`](Self::is_rate_limit_error) /
/// [`is_auth_error`](Self::is_auth_error) /
/// [`is_not_found_error`](Self::is_not_found_error) predicates, to branch on
/// specific failures without inspecting status codes directly.
#[derive(Debug, Error)]
pub enum HttpError {
    /// A classified non-2xx API response.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Request validation failed before anything was sent.
    #[error(transparent)]
    InvalidRequest(#[from] InvalidRequestError),

    /// Network or connection error; no HTTP response was received.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// A 2xx response whose body failed to decode into the expected shape.
    #[error("Malformed response body from {context}: {source}")]
    Decode {
        /// The request that produced the undecodable body.
        context: String,
        /// The underlying decode failure.
        source: serde_json::Error,
    },

    /// The caller's deadline elapsed or the call was aborted.
    #[error("Request cancelled before completion (deadline elapsed or caller aborted).")]
    Cancelled,
}

impl HttpError {
    /// Returns the classified API error, if this is one.
    #[must_use]
    pub const fn api(&self) -> Option<&ApiError> {
        match self {
            Self::Api(error) => Some(error),
            _ => None,
        }
    }

    /// Returns the HTTP status code for classified API errors.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self.api() {
            Some(error) => Some(error.status),
            None => None,
        }
    }

    /// Returns `true` if this is a classified 429 (rate limited) response.
    ///
    /// Returns `false` for every other error kind.
    #[must_use]
    pub fn is_rate_limit_error(&self) -> bool {
        self.status() == Some(429)
    }

    /// Returns `true` if this is a classified 401 (authentication) response.
    ///
    /// Returns `false` for every other error kind.
    #[must_use]
    pub fn is_auth_error(&self) -> bool {
        self.status() == Some(401)
    }

    /// Returns `true` if this is a classified 404 (not found) response.
    ///
    /// Returns `false` for every other error kind.
    #[must_use]
    pub fn is_not_found_error(&self) -> bool {
        self.status() == Some(404)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_decodes_json_error_body() {
        let body = r#"{"errors":[{"message":"Invalid access token"}]}"#;
        let error = ApiError::classify(401, body);

        assert_eq!(error.status, 401);
        assert_eq!(error.errors.len(), 1);
        assert_eq!(error.first_message(), "Invalid access token");
        assert!(error.errors[0].code.is_none());
        assert!(!error.suggestion.is_empty());
        assert!(!error.docs_url.is_empty());
    }

    #[test]
    fn test_classify_preserves_detail_order_and_codes() {
        let body = r#"{"errors":[
            {"message":"name is too long","error_code":"too_long"},
            {"message":"sis_id is taken","error_code":"taken"}
        ]}"#;
        let error = ApiError::classify(422, body);

        assert_eq!(error.errors.len(), 2);
        assert_eq!(error.errors[0].message, "name is too long");
        assert_eq!(error.errors[0].code.as_deref(), Some("too_long"));
        assert_eq!(error.errors[1].message, "sis_id is taken");
        assert_eq!(error.errors[1].code.as_deref(), Some("taken"));
    }

    #[test]
    fn test_classify_falls_back_to_raw_text() {
        let error = ApiError::classify(500, "Internal Server Error");

        assert_eq!(error.status, 500);
        assert_eq!(error.errors.len(), 1);
        assert_eq!(error.first_message(), "Internal Server Error");
        assert!(!error.suggestion.is_empty());
    }

    #[test]
    fn test_classify_extracts_numeric_error_report_id() {
        let body = r#"{"errors":[{"message":"boom"}],"error_report_id":12345}"#;
        let error = ApiError::classify(500, body);
        assert_eq!(error.error_report_id.as_deref(), Some("12345"));
    }

    #[test]
    fn test_classify_extracts_string_error_report_id() {
        let body = r#"{"errors":[{"message":"boom"}],"error_report_id":"abc-123"}"#;
        let error = ApiError::classify(500, body);
        assert_eq!(error.error_report_id.as_deref(), Some("abc-123"));
    }

    #[test]
    fn test_classify_json_without_errors_array_uses_raw_text() {
        let body = r#"{"status":"unauthenticated"}"#;
        let error = ApiError::classify(401, body);
        assert_eq!(error.first_message(), body);
    }

    #[test]
    fn test_remediation_table_covers_known_statuses() {
        for status in [400, 401, 403, 404, 422, 429, 500, 502, 503, 504, 418] {
            let (suggestion, docs_url) = remediation_for(status);
            assert!(!suggestion.is_empty(), "no suggestion for {status}");
            assert!(docs_url.starts_with("https://"), "bad docs url for {status}");
        }
    }

    #[test]
    fn test_display_includes_status_message_and_suggestion() {
        let error = ApiError::classify(404, r#"{"errors":[{"message":"not found"}]}"#);
        let text = error.to_string();
        assert!(text.contains("404"));
        assert!(text.contains("not found"));
        assert!(text.contains(error.suggestion));
    }

    #[test]
    fn test_predicates_match_their_status() {
        let rate_limited = HttpError::Api(ApiError::classify(429, "Rate Limit Exceeded"));
        assert!(rate_limited.is_rate_limit_error());
        assert!(!rate_limited.is_auth_error());
        assert!(!rate_limited.is_not_found_error());

        let unauthorized = HttpError::Api(ApiError::classify(401, "{}"));
        assert!(unauthorized.is_auth_error());
        assert!(!unauthorized.is_rate_limit_error());

        let missing = HttpError::Api(ApiError::classify(404, "{}"));
        assert!(missing.is_not_found_error());
        assert!(!missing.is_auth_error());
    }

    #[test]
    fn test_predicates_false_for_unrelated_error_kinds() {
        let cancelled = HttpError::Cancelled;
        assert!(!cancelled.is_rate_limit_error());
        assert!(!cancelled.is_auth_error());
        assert!(!cancelled.is_not_found_error());

        let invalid = HttpError::InvalidRequest(InvalidRequestError::EmptyPath);
        assert!(!invalid.is_rate_limit_error());
        assert!(!invalid.is_auth_error());
        assert!(!invalid.is_not_found_error());
    }

    #[test]
    fn test_error_types_implement_std_error() {
        let api_error: &dyn std::error::Error = &ApiError::classify(400, "{}");
        let _ = api_error;

        let invalid_error: &dyn std::error::Error = &InvalidRequestError::EmptyPath;
        let _ = invalid_error;

        let http_error: &dyn std::error::Error = &HttpError::Cancelled;
        let _ = http_error;
    }
}
