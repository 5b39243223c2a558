//! Text-table rendering for materialized query results.

use datafusion::arrow::util::display::{ArrayFormatter, FormatOptions};
use tabled::builder::Builder;

use geofetch_core::error::GeoFetchError;
use geofetch_tabular::MaterializedResult;

/// Renders a materialized result as a bordered text table.
///
/// Values are formatted with Arrow's display rules (nulls render as empty
/// cells), one header row from the result schema.
///
/// # Errors
///
/// Returns an error if a column type has no display formatter.
pub fn render_table(result: &MaterializedResult) -> Result<String, GeoFetchError> {
    let options = FormatOptions::default().with_null("");

    let mut builder = Builder::default();
    builder.push_record(result.column_names());

    for batch in result.batches() {
        let formatters = batch
            .columns()
            .iter()
            .map(|column| ArrayFormatter::try_new(column.as_ref(), &options))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| GeoFetchError::Other(anyhow::Error::new(e)))?;

        for row in 0..batch.num_rows() {
            builder.push_record(formatters.iter().map(|f| f.value(row).to_string()));
        }
    }

    Ok(builder.build().to_string())
}
