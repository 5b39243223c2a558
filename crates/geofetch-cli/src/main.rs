//! Command-line interface for `geofetch`, a client for cloud-native
//! geospatial data access.
//!
//! This binary provides a user-friendly CLI over the `geofetch` crates,
//! enabling users to query remote columnar datasets, search spatial
//! catalogs, and preview remote rasters without downloading whole files.
//!
//! # Architecture
//!
//! The CLI is built using [`clap`] for argument parsing and [`tracing`] for
//! structured logging. It acts as a thin façade that parses arguments,
//! configures logging, and delegates to command handlers.
//!
//! # Available Commands
//!
//! - `query` - Filter, group, and aggregate a remote columnar dataset
//! - `search` - Search a spatial catalog and optionally sign the match
//! - `raster` - Read a pixel window from a remote raster and preview it

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use anyhow::{Result, anyhow};
use clap::{Parser, Subcommand};
use tracing::{Level, info};
use tracing_log::LogTracer;
use tracing_subscriber::FmtSubscriber;

use geofetch_catalog::{CatalogClient, SigningClient};
use geofetch_core::types::BoundingRegion;
use geofetch_raster::{PixelWindow, RasterHandle, RasterLayout};
use geofetch_render::{ascii_preview, render_table, write_pgm};
use geofetch_tabular::{Aggregate, Dataset, Predicate, QuerySpec, Value};

mod display;

use display::{display_fields, display_items, display_signed_item};

#[derive(Parser)]
#[command(
    name = "geofetch",
    version,
    about = "Lazy access to remote geospatial data",
    long_about = "geofetch queries remote columnar datasets, searches spatial catalogs,\n\
                  and reads remote rasters by byte range, transferring only the data a\n\
                  request actually needs."
)]
/// Command-line arguments and options for the `geofetch` CLI.
///
/// This struct defines the top-level CLI interface, including global flags
/// for logging verbosity and the subcommand to execute.
struct Cli {
    /// Enable verbose (INFO level) logging output.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable debug (DEBUG level) logging output with detailed diagnostics.
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands for the `geofetch` CLI.
#[derive(Subcommand)]
enum Commands {
    /// Queries a remote columnar dataset.
    ///
    /// Opens the dataset lazily (schema only), applies filters, grouping,
    /// and projection at the remote source, and prints the materialized
    /// result as a table.
    Query {
        /// Remote dataset locator (s3://, https://, or file://).
        #[arg(value_name = "LOCATOR")]
        locator: String,

        /// Filter predicate such as "country=US" or "year>=2020".
        /// Repeatable; multiple filters are AND-combined.
        #[arg(short, long, value_name = "FILTER")]
        filter: Vec<String>,

        /// Comma-separated columns to group by.
        #[arg(short, long, value_name = "COLUMNS")]
        group_by: Option<String>,

        /// Adds a row-count aggregation under this output name.
        #[arg(long, value_name = "ALIAS")]
        count: Option<String>,

        /// Comma-separated columns to select (ignored when grouping).
        #[arg(short, long, value_name = "COLUMNS")]
        columns: Option<String>,

        /// Shows the dataset schema instead of running a query.
        #[arg(long)]
        schema: bool,
    },

    /// Searches a spatial catalog for items in a bounding region.
    ///
    /// Zero matches prints an empty listing; it is not an error. With
    /// `--sign-url`, the first match's asset locators are signed and
    /// printed ready for the `raster` command.
    Search {
        /// Catalog API base URL.
        #[arg(value_name = "URL")]
        catalog: String,

        /// Collection to search (e.g., "sentinel-2-l2a").
        #[arg(short, long, value_name = "COLLECTION")]
        collection: String,

        /// Bounding region as "west,south,east,north" in degrees.
        #[arg(short, long, value_name = "BBOX")]
        bbox: String,

        /// Signing authority base URL; signs the first match's assets.
        #[arg(long, value_name = "URL")]
        sign_url: Option<String>,
    },

    /// Reads a pixel window from a remote raster band.
    ///
    /// The locator is opened lazily; only the byte ranges covering the
    /// requested window are fetched. Output is a PGM image or an ASCII
    /// preview on stdout.
    Raster {
        /// Signed raster locator: an http(s) URL, optionally prefixed
        /// with "vsicurl://".
        #[arg(value_name = "LOCATOR")]
        locator: String,

        /// Band width in pixels.
        #[arg(long, value_name = "PIXELS")]
        width: u32,

        /// Band height in pixels.
        #[arg(long, value_name = "PIXELS")]
        height: u32,

        /// Byte offset of the first sample within the object.
        #[arg(long, default_value_t = 0, value_name = "BYTES")]
        offset: u64,

        /// Pixel window as "col,row,width,height"; full band when omitted.
        #[arg(short, long, value_name = "WINDOW")]
        window: Option<String>,

        /// Write a binary PGM image here instead of an ASCII preview.
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

/// Entry point for the `geofetch` command-line interface.
///
/// This function parses command-line arguments, configures the logging
/// system based on verbosity flags, and dispatches to the appropriate
/// command handler.
///
/// # Errors
///
/// Returns an error if command execution fails or if the logging system
/// cannot be initialized.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity flags
    let log_level = if cli.debug {
        Level::DEBUG
    } else if cli.verbose {
        Level::INFO
    } else {
        Level::WARN
    };

    // Bridge logs from the `log` crate to the `tracing` ecosystem.
    LogTracer::init()?;

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(true) // Show module paths for better context
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    // Execute the command
    match cli.command {
        Commands::Query {
            locator,
            filter,
            group_by,
            count,
            columns,
            schema,
        } => {
            info!("Querying {locator}");
            handle_query(&locator, &filter, group_by.as_deref(), count.as_deref(), columns.as_deref(), schema)
                .await?;
        },
        Commands::Search {
            catalog,
            collection,
            bbox,
            sign_url,
        } => {
            info!("Searching {catalog}");
            handle_search(&catalog, &collection, &bbox, sign_url.as_deref()).await?;
        },
        Commands::Raster {
            locator,
            width,
            height,
            offset,
            window,
            output,
        } => {
            info!("Reading raster {locator}");
            handle_raster(&locator, width, height, offset, window.as_deref(), output.as_deref()).await?;
        },
    }

    Ok(())
}

async fn handle_query(
    locator: &str,
    filters: &[String],
    group_by: Option<&str>,
    count: Option<&str>,
    columns: Option<&str>,
    schema_only: bool,
) -> Result<()> {
    let dataset = Dataset::open(locator).await?;

    if schema_only {
        display_fields(&dataset.fields());
        return Ok(());
    }

    let mut spec = QuerySpec::new();
    for raw in filters {
        spec = spec.filter(parse_filter(raw)?);
    }
    if let Some(keys) = group_by {
        spec = spec.group_by(split_columns(keys));
    }
    if let Some(alias) = count {
        spec = spec.aggregate(Aggregate::count(alias));
    }
    if let Some(projection) = columns {
        spec = spec.select(split_columns(projection));
    }

    let result = dataset.query(&spec).await?;
    println!("{}", render_table(&result)?);
    println!("{} row(s)", result.num_rows());
    Ok(())
}

async fn handle_search(
    catalog: &str,
    collection: &str,
    bbox: &str,
    sign_url: Option<&str>,
) -> Result<()> {
    let region = BoundingRegion::parse(bbox)?;
    let client = CatalogClient::connect(catalog)?;

    let items = client.search(collection, &region).await?;
    display_items(&items);

    if let Some(sign_base) = sign_url {
        let Some(first) = items.first() else {
            return Ok(());
        };
        let signer = SigningClient::connect(sign_base)?;
        let signed = signer.sign(first).await?;
        display_signed_item(&signed);
    }

    Ok(())
}

async fn handle_raster(
    locator: &str,
    width: u32,
    height: u32,
    offset: u64,
    window: Option<&str>,
    output: Option<&std::path::Path>,
) -> Result<()> {
    let handle = RasterHandle::open(locator)?;
    let layout = RasterLayout {
        width,
        height,
        data_offset: offset,
        bytes_per_sample: 1,
    };
    let window = match window {
        Some(raw) => parse_window(raw)?,
        None => PixelWindow::full(&layout),
    };

    let block = handle.read_window(&layout, &window).await?;

    match output {
        Some(path) => {
            let mut writer = BufWriter::new(File::create(path)?);
            write_pgm(&mut writer, &block)?;
            println!("Wrote {}x{} PGM to {}", block.width, block.height, path.display());
        },
        None => print!("{}", ascii_preview(&block)),
    }

    Ok(())
}

/// Parses a CLI filter string such as "country=US" into a [`Predicate`].
///
/// Multi-character operators are matched before their single-character
/// prefixes, so "year>=2020" parses as `>=` rather than `>`.
fn parse_filter(raw: &str) -> Result<Predicate> {
    if let Some((column, values)) = raw.split_once(" in ") {
        let values: Vec<Value> = values.split(',').map(|v| infer_value(v.trim())).collect();
        return Ok(Predicate::in_set(column.trim(), values));
    }
    if let Some((column, value)) = raw.split_once("!=") {
        return Ok(Predicate::neq(column.trim(), infer_value(value.trim())));
    }
    if let Some((column, value)) = raw.split_once(">=") {
        return Ok(Predicate::gt_eq(column.trim(), infer_value(value.trim())));
    }
    if let Some((column, value)) = raw.split_once("<=") {
        return Ok(Predicate::lt_eq(column.trim(), infer_value(value.trim())));
    }
    if let Some((column, value)) = raw.split_once('=') {
        return Ok(Predicate::eq(column.trim(), infer_value(value.trim())));
    }
    if let Some((column, pattern)) = raw.split_once('~') {
        return Ok(Predicate::matches(column.trim(), pattern.trim()));
    }
    if let Some((column, value)) = raw.split_once('>') {
        return Ok(Predicate::gt(column.trim(), infer_value(value.trim())));
    }
    if let Some((column, value)) = raw.split_once('<') {
        return Ok(Predicate::lt(column.trim(), infer_value(value.trim())));
    }
    Err(anyhow!(
        "No operator found in filter '{raw}'. Expected column=value with one of =, !=, <, <=, >, >=, ~, or ' in '."
    ))
}

/// Infers the most specific literal type for a CLI filter operand.
fn infer_value(raw: &str) -> Value {
    if let Ok(i) = raw.parse::<i64>() {
        return Value::Int(i);
    }
    if let Ok(f) = raw.parse::<f64>() {
        return Value::Float(f);
    }
    if let Ok(b) = raw.parse::<bool>() {
        return Value::Bool(b);
    }
    Value::Str(raw.to_string())
}

/// Parses a "col,row,width,height" pixel window argument.
fn parse_window(raw: &str) -> Result<PixelWindow> {
    let parts: Vec<&str> = raw.split(',').map(str::trim).collect();
    if parts.len() != 4 {
        return Err(anyhow!(
            "Invalid window '{raw}': expected 'col,row,width,height'."
        ));
    }
    let mut values = [0u32; 4];
    for (i, part) in parts.iter().enumerate() {
        values[i] = part
            .parse()
            .map_err(|_| anyhow!("Invalid window '{raw}': '{part}' is not a pixel count."))?;
    }
    Ok(PixelWindow {
        col_off: values[0],
        row_off: values[1],
        width: values[2],
        height: values[3],
    })
}

/// Splits a comma-separated column list, trimming whitespace.
fn split_columns(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use geofetch_tabular::query::PredicateOp;

    #[test]
    fn test_parse_filter_eq_string() {
        let predicate = parse_filter("country=US").unwrap();
        assert_eq!(predicate.column, "country");
        assert_eq!(predicate.op, PredicateOp::Eq(Value::Str("US".to_string())));
    }

    #[test]
    fn test_parse_filter_gt_eq_integer() {
        let predicate = parse_filter("year>=2020").unwrap();
        assert_eq!(predicate.column, "year");
        assert_eq!(predicate.op, PredicateOp::GtEq(Value::Int(2020)));
    }

    #[test]
    fn test_parse_filter_neq() {
        let predicate = parse_filter("kingdom!=Fungi").unwrap();
        assert_eq!(
            predicate.op,
            PredicateOp::NotEq(Value::Str("Fungi".to_string()))
        );
    }

    #[test]
    fn test_parse_filter_in_set() {
        let predicate = parse_filter("kingdom in Animalia, Plantae").unwrap();
        assert_eq!(predicate.column, "kingdom");
        assert_eq!(
            predicate.op,
            PredicateOp::In(vec![
                Value::Str("Animalia".to_string()),
                Value::Str("Plantae".to_string()),
            ])
        );
    }

    #[test]
    fn test_parse_filter_matches() {
        let predicate = parse_filter("country~^U").unwrap();
        assert_eq!(predicate.op, PredicateOp::Matches("^U".to_string()));
    }

    #[test]
    fn test_parse_filter_float_and_bool_operands() {
        assert_eq!(
            parse_filter("lat<45.5").unwrap().op,
            PredicateOp::Lt(Value::Float(45.5))
        );
        assert_eq!(
            parse_filter("validated=true").unwrap().op,
            PredicateOp::Eq(Value::Bool(true))
        );
    }

    #[test]
    fn test_parse_filter_no_operator() {
        let err = parse_filter("nonsense").unwrap_err();
        assert!(
            err.to_string()
                .starts_with("No operator found in filter 'nonsense'")
        );
    }

    #[test]
    fn test_parse_window_valid() {
        let window = parse_window("10, 20, 256, 128").unwrap();
        assert_eq!(window.col_off, 10);
        assert_eq!(window.row_off, 20);
        assert_eq!(window.width, 256);
        assert_eq!(window.height, 128);
    }

    #[test]
    fn test_parse_window_wrong_arity() {
        let err = parse_window("10,20,256").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid window '10,20,256': expected 'col,row,width,height'."
        );
    }

    #[test]
    fn test_parse_window_not_a_number() {
        assert!(parse_window("0,0,wide,10").is_err());
    }

    #[test]
    fn test_split_columns() {
        assert_eq!(split_columns("kingdom, year"), vec!["kingdom", "year"]);
        assert_eq!(split_columns("country"), vec!["country"]);
    }

    #[tokio::test]
    async fn test_handle_query_unsupported_scheme() {
        let result = handle_query("ftp://example.com/data.parquet", &[], None, None, None, false)
            .await;
        assert!(result.is_err());
        assert_eq!(
            result.unwrap_err().to_string(),
            "Unsupported locator scheme 'ftp'. Supported schemes: s3, http, https, file, memory"
        );
    }

    #[tokio::test]
    async fn test_handle_query_missing_local_file() {
        let dir = tempfile::tempdir().unwrap();
        let locator = format!("file://{}/missing.parquet", dir.path().display());
        let result = handle_query(&locator, &[], None, None, None, false).await;
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .starts_with("Failed to open remote resource")
        );
    }

    #[tokio::test]
    async fn test_handle_search_malformed_bbox_fails_before_network() {
        // The catalog URL points nowhere; reaching the network would surface
        // a request error, not an invalid-region error.
        let result = handle_search("http://192.0.2.1/stac", "sentinel-2-l2a", "0,0,10", None).await;
        assert!(result.is_err());
        assert_eq!(
            result.unwrap_err().to_string(),
            "Invalid bounding region: expected 4 comma-separated values, got 3"
        );
    }

    #[tokio::test]
    async fn test_handle_raster_rejects_non_http_locator() {
        let result = handle_raster("vsicurl://ftp://example.com/scene.tif", 4, 4, 0, None, None)
            .await;
        assert!(result.is_err());
        assert_eq!(
            result.unwrap_err().to_string(),
            "Unsupported locator scheme 'ftp'. Supported schemes: http, https"
        );
    }

    #[tokio::test]
    async fn test_handle_raster_invalid_window_argument() {
        let result = handle_raster(
            "https://example.com/scene.tif",
            4,
            4,
            0,
            Some("oops"),
            None,
        )
        .await;
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().starts_with("Invalid window"));
    }
}
