//! `geofetch-raster` reads remote gridded pixel data through a virtual
//! remote file: random-access byte-range reads against an HTTP object, with
//! no prior full download.
//!
//! Handles are lazy. [`reader::RasterHandle::open`] performs no network I/O,
//! so an expired signed locator opens fine and fails only when the first
//! pixel block is fetched, surfacing as a `Transfer` error at the point of
//! access. Retry and backoff belong to the transport, not this crate.

pub mod reader;

pub use reader::{
    HttpRangeReader, MemoryRangeReader, PixelWindow, RangeReader, RasterBlock, RasterHandle,
    RasterLayout, VSI_PREFIX,
};
