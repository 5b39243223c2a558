//! `geofetch-catalog` is a client for STAC-style spatial catalog APIs.
//!
//! The workflow is: connect to a catalog, search a collection with a
//! bounding region, then sign the returned items' asset locators with a
//! time-limited token before handing them to a raster reader.
//!
//! Zero matches is not a failure: [`client::CatalogClient::search`] returns
//! an empty list, and callers that need at least one item can use
//! [`client::CatalogClient::first_item`], which reports the recoverable
//! `EmptyResult` condition instead.

pub mod client;
pub mod models;
pub mod sign;

pub use client::CatalogClient;
pub use models::{Asset, CatalogItem, ItemCollection};
pub use sign::{SignedItem, SigningClient};
