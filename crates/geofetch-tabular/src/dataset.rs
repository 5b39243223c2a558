//! Remote dataset handles and result materialization.
//!
//! [`Dataset::open`] registers the scheme-appropriate store backend and
//! opens a remote Parquet dataset through `DataFusion`. Opening reads footer
//! metadata only; row and column data is transferred exclusively when
//! [`Dataset::query`] collects a [`MaterializedResult`].

use std::sync::Arc;

use arrow_schema::SchemaRef;
use datafusion::arrow::array::RecordBatch;
use datafusion::prelude::{DataFrame, ParquetReadOptions, SessionContext};
use log::info;
use object_store::ObjectStore;

use geofetch_core::error::{ConnectionError, GeoFetchError, QueryError};
use geofetch_core::types::{FieldInfo, RemoteLocator, Scheme, format_data_type};

use crate::query::QuerySpec;
use crate::store::{register_store, store_for};

/// An opaque handle to a remote columnar dataset.
///
/// Holds schema metadata and a lazy scan; no row data. The session and its
/// store connections are owned by the handle and released when it drops,
/// on all exit paths.
pub struct Dataset {
    locator: RemoteLocator,
    // Session kept alive for the lifetime of the lazy frame.
    _ctx: SessionContext,
    frame: DataFrame,
    schema: SchemaRef,
}

impl std::fmt::Debug for Dataset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dataset")
            .field("locator", &self.locator)
            .field("columns", &self.schema.fields().len())
            .finish_non_exhaustive()
    }
}

impl Dataset {
    /// Opens a remote columnar dataset.
    ///
    /// The store backend is chosen from the locator scheme (`s3://` unsigned
    /// for public buckets, `http(s)://`, `file://`). Schema metadata is read
    /// from the Parquet footer; no row data is transferred.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectionError`] if the scheme is unsupported, the locator
    /// is malformed, or the resource is unreachable.
    pub async fn open(locator: &str) -> Result<Self, GeoFetchError> {
        let locator = RemoteLocator::parse(locator)?;
        let store = match locator.scheme() {
            Scheme::File => None,
            _ => Some(store_for(&locator)?),
        };
        Self::open_inner(locator, store).await
    }

    /// Opens a dataset against a caller-provided store.
    ///
    /// This is the injection seam for `memory://` locators and for wrapping
    /// stores in tests.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectionError`] if the locator is malformed or the store
    /// cannot serve the Parquet footer.
    pub async fn open_with_store(
        locator: &str,
        store: Arc<dyn ObjectStore>,
    ) -> Result<Self, GeoFetchError> {
        let locator = RemoteLocator::parse(locator)?;
        Self::open_inner(locator, Some(store)).await
    }

    async fn open_inner(
        locator: RemoteLocator,
        store: Option<Arc<dyn ObjectStore>>,
    ) -> Result<Self, GeoFetchError> {
        let ctx = SessionContext::new();
        if let Some(store) = store {
            register_store(&ctx, &locator, store)?;
        }

        info!("Opening dataset: {locator}");
        let frame = ctx
            .read_parquet(locator.as_str(), ParquetReadOptions::default())
            .await
            .map_err(|e| ConnectionError::Unreachable {
                locator: locator.as_str().to_string(),
                source: Box::new(e),
            })?;

        let schema: SchemaRef = Arc::new(frame.schema().as_arrow().clone());
        info!("Schema read: {} columns", schema.fields().len());

        Ok(Self {
            locator,
            _ctx: ctx,
            frame,
            schema,
        })
    }

    /// The locator this dataset was opened from.
    #[must_use]
    pub fn locator(&self) -> &RemoteLocator {
        &self.locator
    }

    /// The dataset schema. Available without transferring row data.
    #[must_use]
    pub fn schema(&self) -> SchemaRef {
        Arc::clone(&self.schema)
    }

    /// Field metadata for display.
    #[must_use]
    pub fn fields(&self) -> Vec<FieldInfo> {
        self.schema
            .fields()
            .iter()
            .map(|f| FieldInfo {
                name: f.name().clone(),
                data_type: format_data_type(f.data_type()),
                nullable: f.is_nullable(),
            })
            .collect()
    }

    /// Evaluates a [`QuerySpec`] and materializes the result.
    ///
    /// The spec is validated against the schema first, so unknown columns
    /// and unsupported verbs fail before any transfer. Filters, grouping,
    /// and projection are applied to the lazy frame, leaving predicate
    /// pushdown and column pruning to the scan. Repeating the same spec
    /// against an unchanged dataset returns an identical result.
    ///
    /// # Errors
    ///
    /// Returns [`geofetch_core::error::SchemaError`],
    /// [`QueryError::UnsupportedOperation`], or [`QueryError::Execution`].
    pub async fn query(&self, spec: &QuerySpec) -> Result<MaterializedResult, GeoFetchError> {
        spec.validate(&self.schema)?;

        let mut frame = self.frame.clone();
        if let Some(predicate) = spec.predicate_expr()? {
            frame = frame.filter(predicate).map_err(QueryError::Execution)?;
        }
        if spec.has_aggregation() {
            frame = frame
                .aggregate(spec.group_exprs(), spec.aggregate_exprs())
                .map_err(QueryError::Execution)?;
        } else if let Some(columns) = spec.projection() {
            let names: Vec<&str> = columns.iter().map(String::as_str).collect();
            frame = frame.select_columns(&names).map_err(QueryError::Execution)?;
        }

        let schema: SchemaRef = Arc::new(frame.schema().as_arrow().clone());
        let batches = frame.collect().await.map_err(QueryError::Execution)?;

        let result = MaterializedResult::new(schema, batches);
        info!("Materialized {} rows from {}", result.num_rows(), self.locator);
        Ok(result)
    }
}

/// A fully loaded, in-memory query result.
#[derive(Debug, Clone)]
pub struct MaterializedResult {
    schema: SchemaRef,
    batches: Vec<RecordBatch>,
}

impl MaterializedResult {
    /// Wraps collected record batches with their schema.
    #[must_use]
    pub fn new(schema: SchemaRef, batches: Vec<RecordBatch>) -> Self {
        Self { schema, batches }
    }

    /// The result schema.
    #[must_use]
    pub fn schema(&self) -> SchemaRef {
        Arc::clone(&self.schema)
    }

    /// The collected record batches.
    #[must_use]
    pub fn batches(&self) -> &[RecordBatch] {
        &self.batches
    }

    /// Total number of rows across all batches.
    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.batches.iter().map(RecordBatch::num_rows).sum()
    }

    /// Whether the result holds no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.num_rows() == 0
    }

    /// Result column names, in schema order.
    #[must_use]
    pub fn column_names(&self) -> Vec<String> {
        self.schema
            .fields()
            .iter()
            .map(|f| f.name().clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_unsupported_scheme() {
        let err = Dataset::open("ftp://example.com/data.parquet")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            GeoFetchError::Connection(ConnectionError::UnsupportedScheme { .. })
        ));
    }

    #[tokio::test]
    async fn test_open_invalid_locator() {
        let err = Dataset::open("definitely not a locator").await.unwrap_err();
        assert!(matches!(
            err,
            GeoFetchError::Connection(ConnectionError::InvalidLocator { .. })
        ));
    }

    #[tokio::test]
    async fn test_open_memory_without_store() {
        let err = Dataset::open("memory://data/part.parquet")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            GeoFetchError::Connection(ConnectionError::Unreachable { .. })
        ));
    }

    #[tokio::test]
    async fn test_open_missing_local_file() {
        let err = Dataset::open("file:///nonexistent/geofetch/occ.parquet")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            GeoFetchError::Connection(ConnectionError::Unreachable { .. })
        ));
    }
}
