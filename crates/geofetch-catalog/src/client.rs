//! Catalog search client.
//!
//! [`CatalogClient::connect`] validates the catalog base URL and builds the
//! HTTP client; no request is issued until [`CatalogClient::search`] runs.
//! The bounding region is re-validated before the request, so malformed
//! regions never reach the network.

use log::{debug, info};
use url::Url;

use geofetch_core::error::{CatalogError, ConnectionError, GeoFetchError};
use geofetch_core::types::BoundingRegion;

use crate::models::{CatalogItem, ItemCollection};

/// Upper bound on items requested per search.
const SEARCH_LIMIT: usize = 100;

/// A connection to a STAC-style catalog search API.
///
/// Owns its HTTP connection pool; connections are released when the client
/// drops, on all exit paths.
#[derive(Debug, Clone)]
pub struct CatalogClient {
    http: reqwest::Client,
    base: Url,
}

impl CatalogClient {
    /// Builds a client for the given catalog base URL.
    ///
    /// Performs no network I/O.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectionError::InvalidLocator`] for unparsable URLs and
    /// [`ConnectionError::UnsupportedScheme`] for non-HTTP(S) schemes.
    pub fn connect(base_url: &str) -> Result<Self, GeoFetchError> {
        let base = Url::parse(base_url).map_err(|e| ConnectionError::InvalidLocator {
            locator: base_url.to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(ConnectionError::UnsupportedScheme {
                scheme: base.scheme().to_string(),
                supported: "http, https".to_string(),
            }
            .into());
        }
        Ok(Self {
            http: reqwest::Client::new(),
            base,
        })
    }

    /// The catalog's search endpoint URL.
    #[must_use]
    pub fn search_endpoint(&self) -> String {
        format!("{}/search", self.base.as_str().trim_end_matches('/'))
    }

    /// Searches a collection for items intersecting a bounding region.
    ///
    /// Zero matches returns an empty list, not an error. The region is
    /// validated before any request is issued.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidRegion`] for malformed regions (before
    /// any network call), [`CatalogError::Request`] on transport failure,
    /// and [`CatalogError::Decode`] if the response is not a valid item
    /// collection.
    pub async fn search(
        &self,
        collection: &str,
        region: &BoundingRegion,
    ) -> Result<Vec<CatalogItem>, GeoFetchError> {
        region.validate()?;

        let url = self.search_endpoint();
        info!("Searching '{collection}' with bbox {}", region.to_bbox_param());

        let response = self
            .http
            .get(&url)
            .query(&[
                ("collections", collection),
                ("bbox", &region.to_bbox_param()),
                ("limit", &SEARCH_LIMIT.to_string()),
            ])
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| CatalogError::Request {
                url: url.clone(),
                source: Box::new(e),
            })?;

        let collection_page: ItemCollection =
            response.json().await.map_err(|e| CatalogError::Decode {
                url,
                source: Box::new(e),
            })?;

        debug!("Search returned {} item(s)", collection_page.features.len());
        Ok(collection_page.features)
    }

    /// Like [`CatalogClient::search`], but requires at least one match.
    ///
    /// # Errors
    ///
    /// Returns the recoverable [`CatalogError::EmptyResult`] when the search
    /// matches nothing, plus everything `search` can return.
    pub async fn first_item(
        &self,
        collection: &str,
        region: &BoundingRegion,
    ) -> Result<CatalogItem, GeoFetchError> {
        let items = self.search(collection, region).await?;
        require_first(collection, items)
    }
}

/// Converts a search result into its first item, or the recoverable
/// `EmptyResult` when the search matched nothing.
fn require_first(
    collection: &str,
    items: Vec<CatalogItem>,
) -> Result<CatalogItem, GeoFetchError> {
    items.into_iter().next().ok_or_else(|| {
        CatalogError::EmptyResult {
            collection: collection.to_string(),
        }
        .into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn item(id: &str) -> CatalogItem {
        CatalogItem {
            id: id.to_string(),
            collection: Some("sentinel-2-l2a".to_string()),
            bbox: None,
            properties: serde_json::Value::Null,
            assets: BTreeMap::new(),
        }
    }

    #[test]
    fn test_require_first_empty_is_recoverable_empty_result() {
        let err = require_first("sentinel-2-l2a", vec![]).unwrap_err();
        match &err {
            GeoFetchError::Catalog(CatalogError::EmptyResult { collection }) => {
                assert_eq!(collection, "sentinel-2-l2a");
            },
            other => panic!("expected EmptyResult, got {other:?}"),
        }
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_require_first_returns_first_match() {
        let first = require_first("sentinel-2-l2a", vec![item("a"), item("b")]).unwrap();
        assert_eq!(first.id, "a");
    }

    #[test]
    fn test_connect_valid() {
        let client = CatalogClient::connect("https://planetarycomputer.microsoft.com/api/stac/v1")
            .unwrap();
        assert_eq!(
            client.search_endpoint(),
            "https://planetarycomputer.microsoft.com/api/stac/v1/search"
        );
    }

    #[test]
    fn test_connect_trailing_slash() {
        let client = CatalogClient::connect("https://example.com/stac/").unwrap();
        assert_eq!(client.search_endpoint(), "https://example.com/stac/search");
    }

    #[test]
    fn test_connect_rejects_non_http_scheme() {
        let err = CatalogClient::connect("s3://bucket/stac").unwrap_err();
        assert!(matches!(
            err,
            GeoFetchError::Connection(ConnectionError::UnsupportedScheme { .. })
        ));
    }

    #[test]
    fn test_connect_rejects_garbage() {
        assert!(CatalogClient::connect("not a url").is_err());
    }

    #[tokio::test]
    async fn test_search_malformed_region_fails_before_network() {
        // The base URL points nowhere; a transport error would surface as
        // CatalogError::Request. InvalidRegion proves no request was made.
        let client = CatalogClient::connect("http://192.0.2.1/stac").unwrap();
        let region = BoundingRegion {
            west: 10.0,
            south: 0.0,
            east: -10.0,
            north: 5.0,
        };
        let err = client.search("sentinel-2-l2a", &region).await.unwrap_err();
        assert!(matches!(
            err,
            GeoFetchError::Catalog(CatalogError::InvalidRegion { .. })
        ));
    }
}
