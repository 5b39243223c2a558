//! `geofetch-tabular` provides lazy access to remote columnar datasets.
//!
//! A [`Dataset`] is opened from a remote locator (object storage, HTTP, or
//! local files) and holds schema metadata only; row data is transferred when
//! a [`QuerySpec`] is materialized with [`Dataset::query`]. Filtering,
//! grouping, and aggregation are pushed into the `DataFusion` scan so column
//! pruning and predicate pushdown at the remote source are never defeated.
//!
//! ```no_run
//! use geofetch_tabular::{Aggregate, Dataset, Predicate, QuerySpec};
//!
//! # async fn example() -> geofetch_core::Result<()> {
//! let dataset = Dataset::open("s3://gbif-open-data/occurrence/").await?;
//! let spec = QuerySpec::new()
//!     .filter(Predicate::eq("country", "US"))
//!     .group_by(["kingdom", "year"])
//!     .aggregate(Aggregate::count("n"));
//! let result = dataset.query(&spec).await?;
//! println!("{} groups", result.num_rows());
//! # Ok(())
//! # }
//! ```

pub mod dataset;
pub mod query;
pub mod store;

pub use dataset::{Dataset, MaterializedResult};
pub use query::{Aggregate, Predicate, QuerySpec, Value};
