//! # Canvas API Rust Client
//!
//! A typed async client core for the Canvas LMS REST API, providing the
//! transport layer that resource services build on: an authenticated request
//! executor, local token-bucket rate limiting, link-header pagination, error
//! classification, and one-time API variant detection.
//!
//! ## Overview
//!
//! This crate provides:
//! - Type-safe configuration via [`CanvasConfig`] and [`CanvasConfigBuilder`]
//! - Validated newtypes for the access token and installation URL
//! - An async HTTP executor with bounded retries for transient failures
//! - Token-bucket rate limiting shared by all requests of one client
//! - Generic pagination that walks `Link` headers into a flat collection
//! - Structured errors carrying server messages and remediation hints
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use canvas_api::{AccessToken, BaseUrl, CanvasClient, CanvasConfig, QueryParams};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! // Create configuration using the builder pattern
//! let config = CanvasConfig::builder()
//!     .base_url(BaseUrl::new("https://canvas.example.edu")?)
//!     .access_token(AccessToken::new("your-access-token")?)
//!     .requests_per_second(5.0)
//!     .build()?;
//!
//! // Connecting probes the installation's API variant once
//! let client = CanvasClient::connect(config).await;
//!
//! // Fetch every page of a listing into one collection
//! let courses: Vec<serde_json::Value> = client
//!     .get_all_pages("courses", QueryParams::new().param("per_page", 100))
//!     .await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Every operation returns [`HttpError`]. Classified API failures carry the
//! status code, the server's messages, and a remediation suggestion with a
//! documentation link; the [`HttpError::is_rate_limit_error`],
//! [`HttpError::is_auth_error`], and [`HttpError::is_not_found_error`]
//! predicates let callers branch without inspecting status codes.
//!
//! ```rust,no_run
//! # use canvas_api::{CanvasClient, QueryParams};
//! # async fn example(client: &CanvasClient) {
//! match client.get_json::<serde_json::Value>("courses/42", QueryParams::new()).await {
//!     Ok(course) => println!("{course}"),
//!     Err(err) if err.is_auth_error() => eprintln!("re-authenticate: {err}"),
//!     Err(err) if err.is_not_found_error() => eprintln!("no such course"),
//!     Err(err) => eprintln!("request failed: {err}"),
//! }
//! # }
//! ```
//!
//! ## Design Principles
//!
//! - **No global state**: configuration and the detected API variant are
//!   instance-based; multiple clients never interfere
//! - **Fail-fast validation**: newtypes and builders validate on construction
//! - **Thread-safe**: one client serves many concurrent callers
//! - **Async-first**: designed for use with the Tokio runtime
//! - **Errors surface**: only bounded transient retries are handled
//!   internally; everything else reaches the caller classified and intact

pub mod client;
pub mod clients;
pub mod config;
pub mod error;

// Re-export public types at crate root for convenience
pub use client::CanvasClient;
pub use config::{
    AccessToken, ApiVariant, BaseUrl, CanvasConfig, CanvasConfigBuilder, DEFAULT_MAX_RETRIES,
};
pub use error::ConfigError;

// Re-export transport types
pub use clients::{
    ApiError, ErrorDetail, HttpClient, HttpError, HttpMethod, HttpRequest, HttpRequestBuilder,
    HttpResponse, InvalidRequestError, Page, PaginationLinks, QueryParams, RateLimitInfo,
    RateLimiter, API_BASE_PATH, CLIENT_VERSION, MAX_PAGES,
};
