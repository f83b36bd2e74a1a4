//! The composition root for the Canvas API client.
//!
//! This module provides [`CanvasClient`], which owns the transport stack
//! (executor, rate limiter, cached API variant) and exposes the four
//! primitives resource services build on: single-page reads, JSON writes,
//! deletes, and exhaustive pagination.

use serde::de::DeserializeOwned;

use crate::clients::probe;
use crate::clients::{HttpClient, HttpError, HttpMethod, HttpRequest, QueryParams};
use crate::config::{ApiVariant, CanvasConfig};

/// A client for one Canvas installation.
///
/// The client is constructed once and shared for the lifetime of the
/// process (or until discarded). One instance serves any number of
/// concurrent callers: requests are independent except for the shared rate
/// gate, and the detected [`ApiVariant`] is immutable after construction
/// and scoped to this instance — two clients with different configurations
/// never interfere.
///
/// # Example
///
/// ```rust,ignore
/// use canvas_api::{AccessToken, BaseUrl, CanvasClient, CanvasConfig, QueryParams};
///
/// let config = CanvasConfig::builder()
///     .base_url(BaseUrl::new("https://canvas.example.edu")?)
///     .access_token(AccessToken::new(std::env::var("CANVAS_TOKEN")?)?)
///     .requests_per_second(5.0)
///     .build()?;
///
/// let client = CanvasClient::connect(config).await;
///
/// let courses: Vec<serde_json::Value> = client
///     .get_all_pages("courses", QueryParams::new().param("per_page", 100))
///     .await?;
/// ```
#[derive(Debug)]
pub struct CanvasClient {
    http: HttpClient,
    variant: ApiVariant,
}

// Verify CanvasClient is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<CanvasClient>();
};

impl CanvasClient {
    /// Connects to the installation described by `config`.
    ///
    /// Runs the version probe exactly once to detect the installation's
    /// [`ApiVariant`]. The probe never fails construction: if it cannot
    /// reach the server or the metadata is missing, the default variant is
    /// assumed and a warning is logged.
    pub async fn connect(config: CanvasConfig) -> Self {
        let http = HttpClient::new(&config);
        let variant = probe::detect_variant(&http).await;
        Self { http, variant }
    }

    /// Creates a client with a known variant, skipping the probe.
    ///
    /// Useful when the deployment's variant is already known, and in tests.
    #[must_use]
    pub fn with_variant(config: &CanvasConfig, variant: ApiVariant) -> Self {
        Self {
            http: HttpClient::new(config),
            variant,
        }
    }

    /// Returns the detected API variant.
    #[must_use]
    pub const fn variant(&self) -> &ApiVariant {
        &self.variant
    }

    /// Returns the underlying transport client, for advanced callers.
    #[must_use]
    pub const fn http(&self) -> &HttpClient {
        &self.http
    }

    /// Fetches a single resource (or one page of a listing) and decodes it.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] if the request fails or the response body does
    /// not decode into `T`.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: QueryParams,
    ) -> Result<T, HttpError> {
        let request = HttpRequest::builder(HttpMethod::Get, path)
            .query(query)
            .build()?;
        let response = self.http.request(request).await?;
        decode(path, response.body)
    }

    /// Creates a resource with a pre-shaped JSON body and decodes the reply.
    ///
    /// The body is passed through verbatim — endpoints that expect their
    /// payload wrapped under a singular root key receive exactly what the
    /// caller shaped. Callers that do not care about the response can decode
    /// into `serde_json::Value`.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] if the request fails or the response body does
    /// not decode into `T`.
    pub async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> Result<T, HttpError> {
        let request = HttpRequest::builder(HttpMethod::Post, path)
            .body(body)
            .build()?;
        let response = self.http.request(request).await?;
        decode(path, response.body)
    }

    /// Updates a resource with a pre-shaped JSON body and decodes the reply.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] if the request fails or the response body does
    /// not decode into `T`.
    pub async fn put_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> Result<T, HttpError> {
        let request = HttpRequest::builder(HttpMethod::Put, path)
            .body(body)
            .build()?;
        let response = self.http.request(request).await?;
        decode(path, response.body)
    }

    /// Deletes a resource, ignoring the response body.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] if the request fails.
    pub async fn delete(&self, path: &str) -> Result<(), HttpError> {
        let request = HttpRequest::builder(HttpMethod::Delete, path).build()?;
        self.http.request(request).await?;
        Ok(())
    }

    /// Fetches every page of a listing into one flat, ordered collection.
    ///
    /// See [`HttpClient::get_all_pages`] for traversal semantics.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] on the first failing page fetch or decode.
    pub async fn get_all_pages<T: DeserializeOwned>(
        &self,
        path: &str,
        query: QueryParams,
    ) -> Result<Vec<T>, HttpError> {
        self.http.get_all_pages(path, query).await
    }
}

fn decode<T: DeserializeOwned>(path: &str, body: serde_json::Value) -> Result<T, HttpError> {
    serde_json::from_value(body).map_err(|source| HttpError::Decode {
        context: path.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AccessToken, BaseUrl};

    fn create_test_config() -> CanvasConfig {
        CanvasConfig::builder()
            .base_url(BaseUrl::new("https://canvas.example.edu").unwrap())
            .access_token(AccessToken::new("test-token").unwrap())
            .build()
            .unwrap()
    }

    #[test]
    fn test_with_variant_skips_probe() {
        let client = CanvasClient::with_variant(&create_test_config(), ApiVariant::Courses);
        assert_eq!(client.variant(), &ApiVariant::Courses);
    }

    #[test]
    fn test_variant_is_instance_scoped() {
        let config = create_test_config();
        let first = CanvasClient::with_variant(&config, ApiVariant::Accounts);
        let second = CanvasClient::with_variant(&config, ApiVariant::Courses);

        assert_eq!(first.variant(), &ApiVariant::Accounts);
        assert_eq!(second.variant(), &ApiVariant::Courses);
    }

    #[test]
    fn test_client_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CanvasClient>();
    }

    #[test]
    fn test_decode_reports_context() {
        let result: Result<u32, HttpError> = decode("courses/42", serde_json::json!("nope"));
        match result {
            Err(HttpError::Decode { context, .. }) => assert_eq!(context, "courses/42"),
            other => panic!("expected decode error, got {other:?}"),
        }
    }
}
