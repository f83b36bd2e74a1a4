//! HTTP response types for the Canvas API client.
//!
//! This module provides the [`HttpResponse`] type and related types for
//! parsing and accessing API response data, including the RFC 5988 `Link`
//! pagination header and informational rate-limit headers.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

/// Pagination URLs parsed from the `Link` response header.
///
/// The API paginates listings with an RFC 5988 `Link` header whose entries
/// carry `rel="current"|"next"|"prev"|"first"|"last"`. Any of them may be
/// absent; the URLs are kept verbatim so they can be followed directly.
///
/// # Example
///
/// ```rust
/// use canvas_api::PaginationLinks;
///
/// let header = r#"<https://canvas.example.edu/api/v1/courses?page=2>; rel="next", <https://canvas.example.edu/api/v1/courses?page=1>; rel="current""#;
/// let links = PaginationLinks::parse_link_header(header);
/// assert!(links.has_next());
/// assert_eq!(
///     links.current.as_deref(),
///     Some("https://canvas.example.edu/api/v1/courses?page=1")
/// );
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PaginationLinks {
    /// URL of the page this response represents.
    pub current: Option<String>,
    /// URL of the next page, if there is one.
    pub next: Option<String>,
    /// URL of the previous page, if there is one.
    pub prev: Option<String>,
    /// URL of the first page.
    pub first: Option<String>,
    /// URL of the last page, when the server can compute it.
    pub last: Option<String>,
}

impl PaginationLinks {
    /// Parses pagination links from a `Link` header value.
    ///
    /// The header format is `<url>; rel="next", <url>; rel="prev", ...`.
    /// Unrecognized `rel` values are ignored.
    #[must_use]
    pub fn parse_link_header(header_value: &str) -> Self {
        let mut result = Self::default();

        for link in header_value.split(',') {
            let link = link.trim();

            // Extract rel type
            let rel = link.split(';').find_map(|part| {
                let part = part.trim();
                part.strip_prefix("rel=").map(|value| value.trim_matches('"'))
            });

            // Extract URL
            let url = link
                .split(';')
                .next()
                .map(|s| s.trim().trim_start_matches('<').trim_end_matches('>'));

            if let (Some(rel), Some(url)) = (rel, url) {
                if url.is_empty() {
                    continue;
                }
                let url = url.to_string();
                match rel {
                    "current" => result.current = Some(url),
                    "next" => result.next = Some(url),
                    "prev" | "previous" => result.prev = Some(url),
                    "first" => result.first = Some(url),
                    "last" => result.last = Some(url),
                    _ => {}
                }
            }
        }

        result
    }

    /// Returns `true` if a next page is available.
    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.next.is_some()
    }
}

/// Rate limit information reported by the server.
///
/// Parsed from the `X-Rate-Limit-Limit`, `X-Rate-Limit-Remaining`, and
/// `X-Rate-Limit-Reset` response headers. This is informational only — the
/// client's own token bucket governs local throttling.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RateLimitInfo {
    /// The remaining request quota, as reported by the server.
    pub remaining: f64,
    /// The total quota, when the server reports it.
    pub limit: Option<f64>,
    /// When the quota resets, when the server reports it.
    pub reset: Option<DateTime<Utc>>,
}

impl RateLimitInfo {
    fn from_headers(headers: &HashMap<String, Vec<String>>) -> Option<Self> {
        let remaining = first_header(headers, "x-rate-limit-remaining")?
            .parse::<f64>()
            .ok()?;

        let limit =
            first_header(headers, "x-rate-limit-limit").and_then(|value| value.parse::<f64>().ok());

        let reset = first_header(headers, "x-rate-limit-reset")
            .and_then(|value| value.parse::<f64>().ok())
            .and_then(timestamp_from_epoch);

        Some(Self {
            remaining,
            limit,
            reset,
        })
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn timestamp_from_epoch(epoch_seconds: f64) -> Option<DateTime<Utc>> {
    if !epoch_seconds.is_finite() || epoch_seconds < 0.0 {
        return None;
    }
    let secs = epoch_seconds.trunc() as i64;
    let nanos = (epoch_seconds.fract() * 1e9) as u32;
    DateTime::from_timestamp(secs, nanos)
}

fn first_header<'a>(headers: &'a HashMap<String, Vec<String>>, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|values| values.first())
        .map(String::as_str)
}

/// An HTTP response from the API.
///
/// Contains the response status code, headers, body, and pre-parsed header
/// values: pagination links, rate-limit information, and the `Retry-After`
/// hint.
#[derive(Clone, Debug)]
pub struct HttpResponse {
    /// The HTTP status code.
    pub code: u16,
    /// Response headers, lower-cased (headers may have multiple values).
    pub headers: HashMap<String, Vec<String>>,
    /// The parsed response body (`Null` for an empty body).
    pub body: serde_json::Value,
    /// Pagination links from the `Link` header.
    pub links: PaginationLinks,
    /// Rate limit information from the `X-Rate-Limit-*` headers.
    pub rate_limit: Option<RateLimitInfo>,
    /// Seconds to wait before retrying (from the `Retry-After` header).
    pub retry_after: Option<f64>,
}

impl HttpResponse {
    /// Creates a new `HttpResponse` with automatic header parsing.
    ///
    /// Header keys are expected to be lower-cased already (the executor
    /// normalizes them when reading the wire response).
    #[must_use]
    pub fn new(code: u16, headers: HashMap<String, Vec<String>>, body: serde_json::Value) -> Self {
        let links = first_header(&headers, "link")
            .map(PaginationLinks::parse_link_header)
            .unwrap_or_default();

        let rate_limit = RateLimitInfo::from_headers(&headers);

        let retry_after =
            first_header(&headers, "retry-after").and_then(|value| value.parse::<f64>().ok());

        Self {
            code,
            headers,
            body,
            links,
            rate_limit,
            retry_after,
        }
    }

    /// Returns `true` if the response status code is in the 2xx range.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.code >= 200 && self.code <= 299
    }

    /// Returns the first value of the named header, if present.
    ///
    /// Header names are matched lower-cased.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        first_header(&self.headers, name)
    }

    /// Returns the `X-Canvas-Meta` capability header value, if present.
    ///
    /// This header carries a small JSON payload naming the installation's
    /// primary collection; it is consumed once by the version probe.
    #[must_use]
    pub fn meta_header(&self) -> Option<&str> {
        self.header("x-canvas-meta")
    }
}
