//! Asset locator signing.
//!
//! Catalog items may reference assets whose locators are unreadable until a
//! time-limited access token is attached. The signing step is delegated to
//! an external authority; this module fetches the token and rewrites every
//! asset href. Signed locators expire, so they are never cached here:
//! callers re-sign the unsigned item instead of reusing a stale token, and
//! each signing produces an independently valid locator.

use chrono::{DateTime, Utc};
use log::info;
use serde::Deserialize;
use url::Url;

use geofetch_core::error::{CatalogError, ConnectionError, GeoFetchError};

use crate::models::CatalogItem;

/// Token response from the signing authority.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    token: String,
    #[serde(rename = "msft:expiry", alias = "expiry")]
    expiry: DateTime<Utc>,
}

/// A client for a token-issuing signing authority.
#[derive(Debug, Clone)]
pub struct SigningClient {
    http: reqwest::Client,
    base: Url,
}

impl SigningClient {
    /// Builds a signing client; no network I/O until [`SigningClient::sign`].
    ///
    /// # Errors
    ///
    /// Returns [`ConnectionError::InvalidLocator`] for unparsable URLs.
    pub fn connect(base_url: &str) -> Result<Self, GeoFetchError> {
        let base = Url::parse(base_url).map_err(|e| ConnectionError::InvalidLocator {
            locator: base_url.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            http: reqwest::Client::new(),
            base,
        })
    }

    fn token_endpoint(&self, collection: &str) -> String {
        format!(
            "{}/token/{collection}",
            self.base.as_str().trim_end_matches('/')
        )
    }

    /// Signs every asset locator of a catalog item.
    ///
    /// Fetches a fresh token from the authority each time; re-signing the
    /// same unsigned item yields a locator that remains valid even if an
    /// earlier signed locator has expired.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Signing`] if the item carries no collection
    /// id or the token request fails.
    pub async fn sign(&self, item: &CatalogItem) -> Result<SignedItem, GeoFetchError> {
        let collection =
            item.collection
                .clone()
                .ok_or_else(|| CatalogError::Signing {
                    collection: item.id.clone(),
                    source: "item carries no collection id".into(),
                })?;

        let url = self.token_endpoint(&collection);
        info!("Requesting signing token for collection '{collection}'");

        let token: TokenResponse = self
            .http
            .get(&url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| CatalogError::Signing {
                collection: collection.clone(),
                source: Box::new(e),
            })?
            .json()
            .await
            .map_err(|e| CatalogError::Signing {
                collection: collection.clone(),
                source: Box::new(e),
            })?;

        Ok(SignedItem::apply(item.clone(), &token.token, token.expiry))
    }
}

/// A catalog item whose asset locators carry a time-limited access token.
#[derive(Debug, Clone)]
pub struct SignedItem {
    item: CatalogItem,
    expires_at: DateTime<Utc>,
}

impl SignedItem {
    /// Attaches `token` to every asset href of `item`.
    #[must_use]
    pub fn apply(mut item: CatalogItem, token: &str, expires_at: DateTime<Utc>) -> Self {
        for asset in item.assets.values_mut() {
            asset.href = append_token(&asset.href, token);
        }
        Self { item, expires_at }
    }

    /// The item with signed asset locators.
    #[must_use]
    pub fn item(&self) -> &CatalogItem {
        &self.item
    }

    /// The signed locator for an asset, if the asset exists.
    #[must_use]
    pub fn signed_href(&self, asset_key: &str) -> Option<&str> {
        self.item.asset(asset_key).map(|a| a.href.as_str())
    }

    /// When the attached token stops being valid.
    #[must_use]
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Whether the token has expired as of `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Whether the token has expired.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}

/// Appends a query-string token to a locator.
fn append_token(href: &str, token: &str) -> String {
    if href.contains('?') {
        format!("{href}&{token}")
    } else {
        format!("{href}?{token}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Asset;
    use chrono::TimeZone;
    use std::collections::BTreeMap;

    fn unsigned_item() -> CatalogItem {
        let mut assets = BTreeMap::new();
        assets.insert(
            "visual".to_string(),
            Asset {
                href: "https://example.blob.core.windows.net/s2/visual.tif".to_string(),
                media_type: None,
                title: None,
            },
        );
        assets.insert(
            "B04".to_string(),
            Asset {
                href: "https://example.blob.core.windows.net/s2/B04.tif?version=2".to_string(),
                media_type: None,
                title: None,
            },
        );
        CatalogItem {
            id: "item-1".to_string(),
            collection: Some("sentinel-2-l2a".to_string()),
            bbox: None,
            properties: serde_json::Value::Null,
            assets,
        }
    }

    #[test]
    fn test_append_token_without_query() {
        assert_eq!(
            append_token("https://x/y.tif", "st=1&sig=abc"),
            "https://x/y.tif?st=1&sig=abc"
        );
    }

    #[test]
    fn test_append_token_with_existing_query() {
        assert_eq!(
            append_token("https://x/y.tif?version=2", "sig=abc"),
            "https://x/y.tif?version=2&sig=abc"
        );
    }

    #[test]
    fn test_apply_signs_every_asset() {
        let expiry = Utc.with_ymd_and_hms(2026, 9, 1, 0, 0, 0).unwrap();
        let signed = SignedItem::apply(unsigned_item(), "sig=abc", expiry);
        assert_eq!(
            signed.signed_href("visual").unwrap(),
            "https://example.blob.core.windows.net/s2/visual.tif?sig=abc"
        );
        assert_eq!(
            signed.signed_href("B04").unwrap(),
            "https://example.blob.core.windows.net/s2/B04.tif?version=2&sig=abc"
        );
    }

    #[test]
    fn test_expiry_window() {
        let expiry = Utc.with_ymd_and_hms(2026, 9, 1, 0, 0, 0).unwrap();
        let signed = SignedItem::apply(unsigned_item(), "sig=abc", expiry);
        let before = Utc.with_ymd_and_hms(2026, 8, 31, 23, 59, 59).unwrap();
        let after = Utc.with_ymd_and_hms(2026, 9, 1, 0, 0, 1).unwrap();
        assert!(!signed.is_expired_at(before));
        assert!(signed.is_expired_at(expiry));
        assert!(signed.is_expired_at(after));
    }

    #[test]
    fn test_resign_is_independent_of_earlier_token() {
        let item = unsigned_item();
        let old_expiry = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let new_expiry = Utc.with_ymd_and_hms(2026, 9, 1, 0, 0, 0).unwrap();

        let first = SignedItem::apply(item.clone(), "sig=old", old_expiry);
        let second = SignedItem::apply(item, "sig=new", new_expiry);

        // The earlier signature expiring does not taint the fresh one.
        let now = Utc.with_ymd_and_hms(2026, 6, 1, 0, 0, 0).unwrap();
        assert!(first.is_expired_at(now));
        assert!(!second.is_expired_at(now));
        assert!(second.signed_href("visual").unwrap().ends_with("sig=new"));
    }

    #[test]
    fn test_token_response_decodes_both_expiry_keys() {
        let with_prefix: TokenResponse = serde_json::from_str(
            r#"{"token": "sig=abc", "msft:expiry": "2026-09-01T00:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(with_prefix.token, "sig=abc");

        let plain: TokenResponse =
            serde_json::from_str(r#"{"token": "sig=abc", "expiry": "2026-09-01T00:00:00Z"}"#)
                .unwrap();
        assert_eq!(
            plain.expiry,
            Utc.with_ymd_and_hms(2026, 9, 1, 0, 0, 0).unwrap()
        );
    }
}
