//! `geofetch-render` turns workflow outputs into visual artifacts.
//!
//! Rendering is a pure side-effecting sink: a materialized query result
//! becomes a formatted text table, a raster block becomes a PGM image or an
//! ASCII preview. Artifacts are for humans; they are not inputs to further
//! computation.

pub mod raster;
pub mod table;

pub use raster::{ascii_preview, write_pgm};
pub use table::render_table;
