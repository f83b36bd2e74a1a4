//! HTTP transport types for Canvas API communication.
//!
//! This module provides the foundational transport layer for making
//! authenticated requests to a Canvas installation. It handles
//! request/response processing, rate limiting, retry logic, error
//! classification, and link-header pagination.
//!
//! # Overview
//!
//! The main types in this module are:
//!
//! - [`HttpClient`]: the request executor behind every API call
//! - [`HttpRequest`] / [`HttpRequestBuilder`]: a request to be sent
//! - [`HttpResponse`]: a parsed response, including pagination links
//! - [`QueryParams`]: ordered query parameters with the `key[]` convention
//! - [`RateLimiter`]: the token bucket gating outbound requests
//! - [`Page`]: one decoded page of a paginated listing
//! - [`ApiError`] / [`HttpError`]: classified failures
//!
//! Most callers use the higher-level [`CanvasClient`](crate::CanvasClient)
//! instead of these types directly.
//!
//! # Retry Behavior
//!
//! The executor implements automatic retry logic for transient failures:
//!
//! - **429 (Rate Limited)**: retried, honoring the `Retry-After` header
//!   value when present
//! - **502 / 503 / 504**: retried with exponential backoff and jitter
//! - **Other non-2xx statuses**: returned immediately without retry
//! - **Transport failures**: retried for GET requests only
//!
//! Retries are bounded by the configured `max_retries`; on exhaustion the
//! last classified error is returned verbatim.

mod errors;
mod http_client;
mod http_request;
mod http_response;
mod pagination;
pub(crate) mod probe;
mod rate_limit;

pub use errors::{ApiError, ErrorDetail, HttpError, InvalidRequestError};
pub use http_client::{HttpClient, API_BASE_PATH, CLIENT_VERSION};
pub use http_request::{HttpMethod, HttpRequest, HttpRequestBuilder, QueryParams};
pub use http_response::{HttpResponse, PaginationLinks, RateLimitInfo};
pub use pagination::{Page, MAX_PAGES};
pub use rate_limit::RateLimiter;
