//! One-shot API variant detection.
//!
//! At construction time the client issues a single lightweight request and
//! inspects the `X-Canvas-Meta` response header, which carries a small JSON
//! payload naming the installation's primary collection. Detection is an
//! optimization, not a correctness requirement: any failure falls back to
//! the default variant and construction proceeds.

use serde::Deserialize;

use crate::clients::http_client::HttpClient;
use crate::clients::http_request::{HttpMethod, HttpRequest};
use crate::clients::http_response::HttpResponse;
use crate::config::ApiVariant;

/// Endpoint probed for the capability metadata header.
const PROBE_PATH: &str = "accounts";

/// JSON payload carried by the `X-Canvas-Meta` header.
#[derive(Debug, Deserialize)]
struct MetaPayload {
    #[serde(rename = "primaryCollection")]
    primary_collection: String,
}

/// Detects the API variant of the installation behind `http`.
///
/// Issues `GET accounts?per_page=1` and parses the metadata header. Never
/// fails: network errors, non-2xx responses, and missing or malformed
/// metadata all fall back to [`ApiVariant::default`] with a warning.
pub(crate) async fn detect_variant(http: &HttpClient) -> ApiVariant {
    let request = HttpRequest::builder(HttpMethod::Get, PROBE_PATH)
        .query_param("per_page", 1)
        .build();

    let request = match request {
        Ok(request) => request,
        Err(err) => {
            tracing::warn!(error = %err, "version probe request invalid; assuming default variant");
            return ApiVariant::default();
        }
    };

    match http.request(request).await {
        Ok(response) => variant_from_response(&response),
        Err(err) => {
            tracing::warn!(
                error = %err,
                "version probe failed; assuming the default API variant"
            );
            ApiVariant::default()
        }
    }
}

fn variant_from_response(response: &HttpResponse) -> ApiVariant {
    let Some(raw) = response.meta_header() else {
        tracing::debug!("no capability metadata header; assuming the default API variant");
        return ApiVariant::default();
    };

    match serde_json::from_str::<MetaPayload>(raw) {
        Ok(meta) => {
            let variant = ApiVariant::from_collection(&meta.primary_collection);
            tracing::debug!(variant = %variant, "detected API variant");
            variant
        }
        Err(err) => {
            tracing::warn!(
                error = %err,
                "malformed capability metadata header; assuming the default API variant"
            );
            ApiVariant::default()
        }
    }
}
