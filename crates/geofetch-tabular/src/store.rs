//! Object store backends for remote locator schemes.
//!
//! Each supported scheme maps to an [`object_store`] implementation that is
//! registered with the `DataFusion` session before the dataset is opened.
//! Construction performs no network I/O; the store is first exercised when
//! the Parquet footer is read.

use std::sync::Arc;

use datafusion::prelude::SessionContext;
use object_store::ObjectStore;
use object_store::aws::AmazonS3Builder;
use object_store::http::HttpBuilder;
use url::Url;

use geofetch_core::error::{ConnectionError, GeoFetchError};
use geofetch_core::types::{RemoteLocator, Scheme};

/// Region assumed for public S3 buckets when none is part of the workflow.
const DEFAULT_S3_REGION: &str = "us-east-1";

/// Builds the store backend for a locator's scheme.
///
/// Public buckets are assumed for `s3://` locators, so requests are sent
/// unsigned. `file://` locators need no store (the local filesystem is
/// registered with `DataFusion` by default) and `memory://` locators must be
/// injected by the caller, so both return an error here.
///
/// # Errors
///
/// Returns [`ConnectionError`] if the locator is missing a host or the
/// builder rejects its configuration.
pub fn store_for(locator: &RemoteLocator) -> Result<Arc<dyn ObjectStore>, GeoFetchError> {
    match locator.scheme() {
        Scheme::S3 => {
            let bucket = locator.url().host_str().ok_or_else(|| {
                ConnectionError::InvalidLocator {
                    locator: locator.as_str().to_string(),
                    reason: "s3 locator is missing a bucket name".to_string(),
                }
            })?;
            let store = AmazonS3Builder::new()
                .with_bucket_name(bucket)
                .with_region(DEFAULT_S3_REGION)
                .with_skip_signature(true)
                .build()
                .map_err(|e| ConnectionError::Unreachable {
                    locator: locator.as_str().to_string(),
                    source: Box::new(e),
                })?;
            Ok(Arc::new(store))
        },
        Scheme::Http | Scheme::Https => {
            let store = HttpBuilder::new()
                .with_url(locator.base())
                .build()
                .map_err(|e| ConnectionError::Unreachable {
                    locator: locator.as_str().to_string(),
                    source: Box::new(e),
                })?;
            Ok(Arc::new(store))
        },
        Scheme::File => Err(ConnectionError::InvalidLocator {
            locator: locator.as_str().to_string(),
            reason: "file locators use the default local store".to_string(),
        }
        .into()),
        Scheme::Memory => Err(ConnectionError::Unreachable {
            locator: locator.as_str().to_string(),
            source: "memory locators require a store injected via Dataset::open_with_store".into(),
        }
        .into()),
    }
}

/// Registers a store for the locator's `scheme://authority` base URL.
///
/// # Errors
///
/// Returns [`ConnectionError::InvalidLocator`] if the base URL cannot be
/// parsed (a locator without an authority).
pub fn register_store(
    ctx: &SessionContext,
    locator: &RemoteLocator,
    store: Arc<dyn ObjectStore>,
) -> Result<(), GeoFetchError> {
    let base = Url::parse(&locator.base()).map_err(|e| ConnectionError::InvalidLocator {
        locator: locator.as_str().to_string(),
        reason: format!("cannot derive store base URL: {e}"),
    })?;
    ctx.register_object_store(&base, store);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_for_s3() {
        let locator = RemoteLocator::parse("s3://some-public-bucket/data/").unwrap();
        assert!(store_for(&locator).is_ok());
    }

    #[test]
    fn test_store_for_https() {
        let locator = RemoteLocator::parse("https://example.com/data.parquet").unwrap();
        assert!(store_for(&locator).is_ok());
    }

    #[test]
    fn test_store_for_memory_requires_injection() {
        let locator = RemoteLocator::parse("memory://data/part.parquet").unwrap();
        let err = store_for(&locator).unwrap_err();
        assert!(err.to_string().contains("open_with_store"));
    }
}
