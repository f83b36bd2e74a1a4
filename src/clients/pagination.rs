//! Link-header pagination for multi-page listings.
//!
//! The API splits large collections across pages tied together by the
//! `Link` response header. This module adds the page-walking methods to
//! [`HttpClient`]: [`get_page`](HttpClient::get_page) for a single decoded
//! page and [`get_all_pages`](HttpClient::get_all_pages) for an exhaustive
//! traversal into one flat collection.

use std::collections::HashSet;

use serde::de::DeserializeOwned;

use crate::clients::errors::HttpError;
use crate::clients::http_client::HttpClient;
use crate::clients::http_request::{HttpMethod, HttpRequest, QueryParams};
use crate::clients::http_response::PaginationLinks;

/// Defensive ceiling on the number of pages one traversal will fetch.
///
/// A well-behaved server ends a listing by omitting the `next` link; the
/// ceiling only matters when a server keeps producing fresh `next` URLs
/// forever.
pub const MAX_PAGES: usize = 1_000;

/// One decoded page of a listing, with its pagination links.
#[derive(Clone, Debug)]
pub struct Page<T> {
    /// The decoded items, in the order the server returned them.
    pub items: Vec<T>,
    /// Pagination links from the page's `Link` header.
    pub links: PaginationLinks,
}

impl HttpClient {
    /// Fetches and decodes a single page of a listing.
    ///
    /// The path may be relative (a seed path like `"courses"`) or an
    /// absolute URL taken from a previous page's links.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] if the request fails or the page body does not
    /// decode as an array of `T`.
    pub async fn get_page<T: DeserializeOwned>(
        &self,
        path: &str,
        query: QueryParams,
    ) -> Result<Page<T>, HttpError> {
        let request = HttpRequest::builder(HttpMethod::Get, path)
            .query(query)
            .build()?;
        let response = self.request(request).await?;

        let items: Vec<T> =
            serde_json::from_value(response.body).map_err(|source| HttpError::Decode {
                context: path.to_string(),
                source,
            })?;

        Ok(Page {
            items,
            links: response.links,
        })
    }

    /// Fetches every page of a listing into one flat collection.
    ///
    /// Pages are fetched sequentially; items are accumulated in page order
    /// with the order within each page preserved. Traversal follows the
    /// `next` link only while it points somewhere not yet visited, so a
    /// server that repeats itself terminates the walk instead of looping;
    /// [`MAX_PAGES`] bounds the traversal against a server that keeps
    /// inventing fresh links.
    ///
    /// Every page fetch passes through the same rate limiting and retry
    /// behavior as a single call.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] on the first failing page fetch or decode; the
    /// partial accumulation is discarded (callers see all-or-nothing).
    pub async fn get_all_pages<T: DeserializeOwned>(
        &self,
        path: &str,
        query: QueryParams,
    ) -> Result<Vec<T>, HttpError> {
        let mut items = Vec::new();
        let mut visited: HashSet<String> = HashSet::new();
        let mut next_url: Option<String> = None;

        for _ in 0..MAX_PAGES {
            let page: Page<T> = match &next_url {
                // Followed links carry their own query string.
                Some(url) => self.get_page(url, QueryParams::new()).await?,
                None => self.get_page(path, query.clone()).await?,
            };

            items.extend(page.items);

            match page.links.next {
                Some(url) if visited.insert(url.clone()) => next_url = Some(url),
                _ => return Ok(items),
            }
        }

        tracing::warn!(
            pages = MAX_PAGES,
            path,
            "pagination bound reached before the server stopped returning a next link"
        );
        Ok(items)
    }
}
