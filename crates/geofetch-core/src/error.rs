//! Custom error types for `geofetch` operations.
//!
//! This module provides structured error handling using `thiserror`. Each
//! remote workflow step (open, query, search, sign, raster read) has a
//! domain-specific error enum so failures keep their context and callers can
//! distinguish recoverable conditions (zero catalog matches, malformed
//! regions) from hard transport or schema failures.

use thiserror::Error;

/// Main error type for `geofetch` operations.
///
/// This is the root error type that encompasses all domain-specific errors.
/// It uses `#[error(transparent)]` to delegate display formatting to the
/// underlying error variants.
#[derive(Debug, Error)]
pub enum GeoFetchError {
    /// Locator and connectivity errors (unreachable resource, bad scheme)
    #[error(transparent)]
    Connection(#[from] ConnectionError),

    /// Schema errors (requested column absent from the dataset)
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// Query construction and execution errors
    #[error(transparent)]
    Query(#[from] QueryError),

    /// Spatial catalog search and signing errors
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Remote raster read errors
    #[error(transparent)]
    Raster(#[from] RasterError),

    /// Generic errors from dependencies
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Locator and connectivity errors.
///
/// These occur when a remote locator cannot be parsed, names a scheme no
/// store backend exists for, or points at a resource that cannot be reached.
#[derive(Debug, Error)]
pub enum ConnectionError {
    /// The locator scheme has no registered store backend
    #[error("Unsupported locator scheme '{scheme}'. Supported schemes: {supported}")]
    UnsupportedScheme {
        /// The scheme that was requested (e.g., "ftp")
        scheme: String,
        /// Comma-separated list of supported schemes
        supported: String,
    },

    /// The locator is not a syntactically valid URI for its scheme
    #[error("Invalid locator '{locator}': {reason}")]
    InvalidLocator {
        /// The offending locator string
        locator: String,
        /// Why it could not be parsed
        reason: String,
    },

    /// The remote resource could not be opened
    #[error("Failed to open remote resource '{locator}': {source}")]
    Unreachable {
        /// The locator that was being opened
        locator: String,
        /// The underlying error
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Schema errors.
///
/// Raised when a query references a column the remote dataset does not have.
/// These fail fast, before any row data is requested.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// A referenced column does not exist in the dataset schema
    #[error("Column '{column}' not found in dataset. Available columns: {available}")]
    UnknownColumn {
        /// The requested column name
        column: String,
        /// Comma-separated list of columns the dataset does have
        available: String,
    },
}

/// Query construction and execution errors.
#[derive(Debug, Error)]
pub enum QueryError {
    /// The predicate verb cannot be expressed against the remote source
    #[error("Unsupported predicate '{verb}': {reason}")]
    UnsupportedOperation {
        /// The predicate verb (e.g., "matches")
        verb: String,
        /// Why it cannot be pushed to the remote source
        reason: String,
    },

    /// Query planning or execution failed
    #[error("Query execution failed: {0}")]
    Execution(#[from] datafusion::error::DataFusionError),
}

/// Spatial catalog errors.
///
/// These cover bounding-region validation, the search request itself, and
/// the asset-signing step.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The bounding region is malformed; detected before any network call
    #[error("Invalid bounding region: {reason}")]
    InvalidRegion {
        /// What is wrong with the region
        reason: String,
    },

    /// The search request failed at the transport level
    #[error("Catalog request to '{url}' failed: {source}")]
    Request {
        /// The request URL
        url: String,
        /// The underlying transport error
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The catalog response could not be decoded
    #[error("Failed to decode catalog response from '{url}': {source}")]
    Decode {
        /// The request URL
        url: String,
        /// The underlying decode error
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A search matched zero items where at least one was required
    #[error("No items found in collection '{collection}' for the requested region")]
    EmptyResult {
        /// The collection that was searched
        collection: String,
    },

    /// The signing authority rejected or failed the token request
    #[error("Failed to sign assets for collection '{collection}': {source}")]
    Signing {
        /// The collection whose assets were being signed
        collection: String,
        /// The underlying error
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Remote raster read errors.
#[derive(Debug, Error)]
pub enum RasterError {
    /// A byte-range read failed mid-render.
    ///
    /// Raster handles are lazy, so an expired or broken locator surfaces
    /// here, at the point of pixel access, not at open time.
    #[error("Transfer failed for '{locator}' (bytes {range}): {source}")]
    Transfer {
        /// The raster locator
        locator: String,
        /// The byte range that was being fetched
        range: String,
        /// The underlying transport error
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The requested pixel window does not fit the raster layout
    #[error("Invalid pixel window: {reason}")]
    InvalidWindow {
        /// Why the window is invalid
        reason: String,
    },
}

/// Type alias for Results using [`GeoFetchError`].
pub type Result<T> = std::result::Result<T, GeoFetchError>;

impl GeoFetchError {
    /// Get a user-friendly error message with suggestions.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Connection(e) => e.user_message(),
            Self::Schema(e) => e.to_string(),
            Self::Query(e) => format!("Query error: {e}"),
            Self::Catalog(e) => e.user_message(),
            Self::Raster(e) => format!("Raster error: {e}"),
            Self::Other(e) => format!("Error: {e}"),
        }
    }

    /// Get recovery suggestions if available.
    ///
    /// Returns helpful suggestions on how to fix or work around the error.
    #[must_use]
    pub fn recovery_suggestion(&self) -> Option<String> {
        match self {
            Self::Connection(e) => e.recovery_suggestion(),
            Self::Schema(SchemaError::UnknownColumn { .. }) => {
                Some("Check the dataset schema with the 'query' command and no filters.".to_string())
            },
            Self::Catalog(e) => e.recovery_suggestion(),
            Self::Raster(RasterError::Transfer { .. }) => {
                Some("Signed locators expire; re-sign the catalog item and retry.".to_string())
            },
            _ => None,
        }
    }

    /// Check if this error is potentially recoverable.
    ///
    /// A zero-match catalog search and a malformed bounding region can both
    /// be handled by the caller without aborting the whole workflow.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Catalog(CatalogError::EmptyResult { .. })
                | Self::Catalog(CatalogError::InvalidRegion { .. })
        )
    }
}

impl ConnectionError {
    fn user_message(&self) -> String {
        match self {
            Self::UnsupportedScheme { scheme, supported } => {
                format!(
                    "Scheme '{scheme}' is not supported.\n\nSupported schemes:\n{}",
                    supported
                        .split(", ")
                        .map(|s| format!("  - {s}"))
                        .collect::<Vec<_>>()
                        .join("\n")
                )
            },
            Self::InvalidLocator { .. } | Self::Unreachable { .. } => self.to_string(),
        }
    }

    fn recovery_suggestion(&self) -> Option<String> {
        match self {
            Self::UnsupportedScheme { .. } => {
                Some("Use an s3://, http(s)://, or file:// locator.".to_string())
            },
            Self::Unreachable { .. } => {
                Some("Check that the bucket or endpoint is reachable and public.".to_string())
            },
            Self::InvalidLocator { .. } => None,
        }
    }
}

impl CatalogError {
    fn user_message(&self) -> String {
        match self {
            Self::EmptyResult { collection } => {
                format!("The search matched no items in collection '{collection}'.")
            },
            _ => self.to_string(),
        }
    }

    fn recovery_suggestion(&self) -> Option<String> {
        match self {
            Self::InvalidRegion { .. } => {
                Some("Bounding regions are 'west,south,east,north' with west <= east and south <= north.".to_string())
            },
            Self::EmptyResult { .. } => {
                Some("Widen the bounding region or try a different collection.".to_string())
            },
            Self::Request { .. } => {
                Some("Check the catalog URL and your network connection.".to_string())
            },
            Self::Decode { .. } | Self::Signing { .. } => None,
        }
    }
}
