//! Wire models for catalog search responses.
//!
//! These follow the STAC item-collection shape: a `features` array of items,
//! each carrying an asset map whose hrefs are further remote locators
//! (possibly requiring a signing step before use).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A page of catalog search results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemCollection {
    /// The matched items; absent or empty when nothing intersects the region
    #[serde(default)]
    pub features: Vec<CatalogItem>,
}

/// A single record returned by a spatial/temporal catalog search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogItem {
    /// Item identifier, unique within its collection
    pub id: String,
    /// The collection the item belongs to
    #[serde(default)]
    pub collection: Option<String>,
    /// Item bounding box, `[west, south, east, north]`
    #[serde(default)]
    pub bbox: Option<Vec<f64>>,
    /// Free-form item properties (datetime, cloud cover, ...)
    #[serde(default)]
    pub properties: serde_json::Value,
    /// Asset locators keyed by asset name (e.g., "visual", "B04")
    #[serde(default)]
    pub assets: BTreeMap<String, Asset>,
}

impl CatalogItem {
    /// Looks up an asset by key.
    #[must_use]
    pub fn asset(&self, key: &str) -> Option<&Asset> {
        self.assets.get(key)
    }

    /// The item's `datetime` property, if present.
    #[must_use]
    pub fn datetime(&self) -> Option<&str> {
        self.properties.get("datetime").and_then(|v| v.as_str())
    }
}

/// An asset reference inside a catalog item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Asset {
    /// The asset locator; may need signing before it is readable
    pub href: String,
    /// Media type of the asset
    #[serde(rename = "type", default)]
    pub media_type: Option<String>,
    /// Human-readable asset title
    #[serde(default)]
    pub title: Option<String>,
}
