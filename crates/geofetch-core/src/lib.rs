//! `geofetch-core` holds the shared vocabulary of the `geofetch` workspace:
//! remote locators, bounding regions, schema metadata, and the structured
//! error taxonomy used across the tabular, catalog, and raster crates.
//!
//! This crate includes:
//! - **Types**: [`types::RemoteLocator`], [`types::BoundingRegion`], and
//!   field metadata used for schema introspection display.
//! - **Errors**: [`error::GeoFetchError`] and its nested domain error enums.
//!
//! The workflow crates (`geofetch-tabular`, `geofetch-catalog`,
//! `geofetch-raster`) build on these types; the CLI consumes them.

pub mod error;
pub mod types;

pub use error::{GeoFetchError, Result};
