//! Configuration types for the Canvas API client.
//!
//! This module provides the core configuration types used to initialize
//! the client for API communication with a Canvas installation.
//!
//! # Overview
//!
//! The main types in this module are:
//!
//! - [`CanvasConfig`]: The main configuration struct holding all client settings
//! - [`CanvasConfigBuilder`]: A builder for constructing [`CanvasConfig`] instances
//! - [`AccessToken`]: A validated bearer token newtype with masked debug output
//! - [`BaseUrl`]: A validated Canvas installation URL
//! - [`ApiVariant`]: The detected API variant (primary root collection)
//!
//! # Example
//!
//! ```rust
//! use canvas_api::{AccessToken, BaseUrl, CanvasConfig};
//!
//! let config = CanvasConfig::builder()
//!     .base_url(BaseUrl::new("https://canvas.example.edu").unwrap())
//!     .access_token(AccessToken::new("my-token").unwrap())
//!     .requests_per_second(5.0)
//!     .build()
//!     .unwrap();
//! ```

mod newtypes;
mod variant;

pub use newtypes::{AccessToken, BaseUrl};
pub use variant::ApiVariant;

use crate::error::ConfigError;
use std::time::Duration;

/// Default ceiling on automatic retries for transient failures.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Configuration for the Canvas API client.
///
/// This struct holds all configuration needed for client operations: the
/// installation URL, the bearer token, the outbound rate ceiling, and the
/// timeout/retry tuning. It is immutable after construction.
///
/// # Thread Safety
///
/// `CanvasConfig` is `Clone`, `Send`, and `Sync`, making it safe to share
/// across threads and async tasks.
///
/// # Example
///
/// ```rust
/// use canvas_api::{AccessToken, BaseUrl, CanvasConfig};
/// use std::time::Duration;
///
/// let config = CanvasConfig::builder()
///     .base_url(BaseUrl::new("https://canvas.example.edu").unwrap())
///     .access_token(AccessToken::new("my-token").unwrap())
///     .timeout(Duration::from_secs(30))
///     .build()
///     .unwrap();
///
/// assert!(config.timeout().is_some());
/// ```
#[derive(Clone, Debug)]
pub struct CanvasConfig {
    base_url: BaseUrl,
    access_token: AccessToken,
    requests_per_second: f64,
    timeout: Option<Duration>,
    max_retries: u32,
    user_agent_prefix: Option<String>,
}

impl CanvasConfig {
    /// Creates a new builder for constructing a `CanvasConfig`.
    #[must_use]
    pub fn builder() -> CanvasConfigBuilder {
        CanvasConfigBuilder::new()
    }

    /// Returns the base URL of the Canvas installation.
    #[must_use]
    pub const fn base_url(&self) -> &BaseUrl {
        &self.base_url
    }

    /// Returns the bearer access token.
    #[must_use]
    pub const fn access_token(&self) -> &AccessToken {
        &self.access_token
    }

    /// Returns the requests-per-second ceiling (0 means unlimited).
    #[must_use]
    pub const fn requests_per_second(&self) -> f64 {
        self.requests_per_second
    }

    /// Returns the per-call deadline, if configured.
    ///
    /// The deadline bounds a whole logical call, including rate-gate waits,
    /// the network round trip, and any automatic retries.
    #[must_use]
    pub const fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Returns the maximum number of automatic retries for transient failures.
    #[must_use]
    pub const fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Returns the user agent prefix, if configured.
    #[must_use]
    pub fn user_agent_prefix(&self) -> Option<&str> {
        self.user_agent_prefix.as_deref()
    }
}

// Verify CanvasConfig is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<CanvasConfig>();
};

/// Builder for constructing [`CanvasConfig`] instances.
///
/// Required fields are `base_url` and `access_token`. All other fields have
/// sensible defaults.
///
/// # Defaults
///
/// - `requests_per_second`: `0.0` (no local throttling)
/// - `timeout`: `None` (no per-call deadline)
/// - `max_retries`: [`DEFAULT_MAX_RETRIES`]
/// - `user_agent_prefix`: `None`
#[derive(Debug, Default)]
pub struct CanvasConfigBuilder {
    base_url: Option<BaseUrl>,
    access_token: Option<AccessToken>,
    requests_per_second: Option<f64>,
    timeout: Option<Duration>,
    max_retries: Option<u32>,
    user_agent_prefix: Option<String>,
}

impl CanvasConfigBuilder {
    /// Creates a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the base URL of the Canvas installation (required).
    #[must_use]
    pub fn base_url(mut self, url: BaseUrl) -> Self {
        self.base_url = Some(url);
        self
    }

    /// Sets the bearer access token (required).
    #[must_use]
    pub fn access_token(mut self, token: AccessToken) -> Self {
        self.access_token = Some(token);
        self
    }

    /// Sets the requests-per-second ceiling.
    ///
    /// A value of `0.0` (the default) disables local throttling entirely.
    #[must_use]
    pub const fn requests_per_second(mut self, rate: f64) -> Self {
        self.requests_per_second = Some(rate);
        self
    }

    /// Sets the per-call deadline.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the maximum number of automatic retries for transient failures.
    ///
    /// Set to `0` to disable automatic retries entirely.
    #[must_use]
    pub const fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = Some(retries);
        self
    }

    /// Sets the user agent prefix for HTTP requests.
    #[must_use]
    pub fn user_agent_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.user_agent_prefix = Some(prefix.into());
        self
    }

    /// Builds the [`CanvasConfig`], validating that required fields are set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingRequiredField`] if `base_url` or
    /// `access_token` are not set, and [`ConfigError::InvalidRateLimit`] if
    /// the requests-per-second value is negative or not finite.
    pub fn build(self) -> Result<CanvasConfig, ConfigError> {
        let base_url = self
            .base_url
            .ok_or(ConfigError::MissingRequiredField { field: "base_url" })?;
        let access_token = self
            .access_token
            .ok_or(ConfigError::MissingRequiredField {
                field: "access_token",
            })?;

        let requests_per_second = self.requests_per_second.unwrap_or(0.0);
        if !requests_per_second.is_finite() || requests_per_second < 0.0 {
            return Err(ConfigError::InvalidRateLimit {
                value: requests_per_second,
            });
        }

        Ok(CanvasConfig {
            base_url,
            access_token,
            requests_per_second,
            timeout: self.timeout,
            max_retries: self.max_retries.unwrap_or(DEFAULT_MAX_RETRIES),
            user_agent_prefix: self.user_agent_prefix,
        })
    }
}
