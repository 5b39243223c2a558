//! Lazy byte-range readers and raster handles.
//!
//! [`RangeReader`] is the seam between the raster handle and its transport:
//! the HTTP implementation issues `Range` requests per read, and the
//! in-memory implementation backs tests and local buffers. A
//! [`RasterHandle`] combines a reader with a [`RasterLayout`] describing an
//! uncompressed band, and fetches only the byte ranges covering a requested
//! [`PixelWindow`]. Decoding of compressed raster formats is a delegated
//! concern and out of scope here.

use std::ops::Range;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use log::debug;
use url::Url;

use geofetch_core::error::{ConnectionError, GeoFetchError, RasterError};

/// Prefix marking a locator as a virtual remote file.
///
/// The remainder of the locator is a (typically signed) HTTP(S) URL.
pub const VSI_PREFIX: &str = "vsicurl://";

/// Random-access reads against a remote object.
#[async_trait]
pub trait RangeReader: Send + Sync {
    /// The locator this reader serves.
    fn locator(&self) -> &str;

    /// Reads the half-open byte range `range` from the object.
    ///
    /// # Errors
    ///
    /// Returns [`RasterError::Transfer`] on any transport failure.
    async fn read_range(&self, range: Range<u64>) -> Result<Bytes, GeoFetchError>;
}

/// [`RangeReader`] over HTTP `Range` requests.
///
/// Construction performs no I/O; every read is an independent request, so
/// token expiry or a dropped connection surfaces on the read that hits it.
#[derive(Debug, Clone)]
pub struct HttpRangeReader {
    http: reqwest::Client,
    url: Url,
    locator: String,
}

impl HttpRangeReader {
    /// Wraps a URL without touching the network.
    #[must_use]
    pub fn new(url: Url) -> Self {
        let locator = url.as_str().to_string();
        Self {
            http: reqwest::Client::new(),
            url,
            locator,
        }
    }
}

#[async_trait]
impl RangeReader for HttpRangeReader {
    fn locator(&self) -> &str {
        &self.locator
    }

    async fn read_range(&self, range: Range<u64>) -> Result<Bytes, GeoFetchError> {
        let transfer_err = |source: Box<dyn std::error::Error + Send + Sync>| {
            GeoFetchError::from(RasterError::Transfer {
                locator: self.locator.clone(),
                range: format!("{}..{}", range.start, range.end),
                source,
            })
        };

        // The Range header is inclusive on both ends, so an empty range has
        // no representation; reject it before building the request.
        if range.start >= range.end {
            return Err(transfer_err("empty byte range".into()));
        }

        debug!("GET {} bytes={}-{}", self.locator, range.start, range.end - 1);
        let response = self
            .http
            .get(self.url.clone())
            .header(
                reqwest::header::RANGE,
                format!("bytes={}-{}", range.start, range.end - 1),
            )
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| transfer_err(Box::new(e)))?;

        let body = response
            .bytes()
            .await
            .map_err(|e| transfer_err(Box::new(e)))?;
        Ok(body)
    }
}

/// [`RangeReader`] over an in-memory buffer, for tests and local data.
#[derive(Debug, Clone)]
pub struct MemoryRangeReader {
    locator: String,
    data: Bytes,
}

impl MemoryRangeReader {
    /// Wraps a buffer under a display locator.
    pub fn new(locator: &str, data: impl Into<Bytes>) -> Self {
        Self {
            locator: locator.to_string(),
            data: data.into(),
        }
    }
}

#[async_trait]
impl RangeReader for MemoryRangeReader {
    fn locator(&self) -> &str {
        &self.locator
    }

    async fn read_range(&self, range: Range<u64>) -> Result<Bytes, GeoFetchError> {
        let len = self.data.len() as u64;
        if range.start >= range.end || range.end > len {
            return Err(RasterError::Transfer {
                locator: self.locator.clone(),
                range: format!("{}..{}", range.start, range.end),
                source: format!("empty range or range outside object of {len} bytes").into(),
            }
            .into());
        }
        Ok(self.data.slice(range.start as usize..range.end as usize))
    }
}

/// Layout of a single uncompressed raster band.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RasterLayout {
    /// Band width in pixels
    pub width: u32,
    /// Band height in pixels
    pub height: u32,
    /// Byte offset of the first sample within the object
    pub data_offset: u64,
    /// Bytes per sample (1 for 8-bit data)
    pub bytes_per_sample: u32,
}

impl RasterLayout {
    fn row_stride(&self) -> u64 {
        u64::from(self.width) * u64::from(self.bytes_per_sample)
    }
}

/// A rectangular window into a raster band.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelWindow {
    /// Leftmost column of the window
    pub col_off: u32,
    /// Topmost row of the window
    pub row_off: u32,
    /// Window width in pixels
    pub width: u32,
    /// Window height in pixels
    pub height: u32,
}

impl PixelWindow {
    /// The full extent of a layout.
    #[must_use]
    pub fn full(layout: &RasterLayout) -> Self {
        Self {
            col_off: 0,
            row_off: 0,
            width: layout.width,
            height: layout.height,
        }
    }
}

/// Pixel samples read from a window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterBlock {
    /// Block width in pixels
    pub width: u32,
    /// Block height in pixels
    pub height: u32,
    /// Row-major samples, `width * height * bytes_per_sample` bytes
    pub samples: Vec<u8>,
}

/// An opaque, lazy handle to remote gridded pixel data.
pub struct RasterHandle {
    reader: Arc<dyn RangeReader>,
}

impl std::fmt::Debug for RasterHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RasterHandle")
            .field("locator", &self.reader.locator())
            .finish()
    }
}

impl RasterHandle {
    /// Opens a virtual remote file from a (signed) locator.
    ///
    /// Accepts a plain `http(s)` URL or the prefixed `vsicurl://<url>` form.
    /// Open is lazy: the locator is parsed and nothing is fetched, so an
    /// expired signed locator opens successfully and fails at first read.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectionError::InvalidLocator`] for unparsable URLs and
    /// [`ConnectionError::UnsupportedScheme`] for non-HTTP(S) schemes.
    pub fn open(signed_locator: &str) -> Result<Self, GeoFetchError> {
        let raw = signed_locator
            .strip_prefix(VSI_PREFIX)
            .unwrap_or(signed_locator);
        let url = Url::parse(raw).map_err(|e| ConnectionError::InvalidLocator {
            locator: signed_locator.to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConnectionError::UnsupportedScheme {
                scheme: url.scheme().to_string(),
                supported: "http, https".to_string(),
            }
            .into());
        }
        Ok(Self {
            reader: Arc::new(HttpRangeReader::new(url)),
        })
    }

    /// Wraps an existing reader; the seam used by tests.
    #[must_use]
    pub fn with_reader(reader: Arc<dyn RangeReader>) -> Self {
        Self { reader }
    }

    /// The locator this handle reads from.
    #[must_use]
    pub fn locator(&self) -> &str {
        self.reader.locator()
    }

    /// Raw byte-range read against the remote object.
    ///
    /// # Errors
    ///
    /// Returns [`RasterError::Transfer`] on transport failure.
    pub async fn read_range(&self, range: Range<u64>) -> Result<Bytes, GeoFetchError> {
        self.reader.read_range(range).await
    }

    /// Reads the pixel samples covering `window`.
    ///
    /// Fetches only the byte ranges of the requested rows: one request for
    /// full-width windows, one per row otherwise. A transport failure
    /// partway through surfaces as [`RasterError::Transfer`] at this call,
    /// never at open time.
    ///
    /// # Errors
    ///
    /// Returns [`RasterError::InvalidWindow`] if the window does not fit the
    /// layout, or [`RasterError::Transfer`] on a failed fetch.
    pub async fn read_window(
        &self,
        layout: &RasterLayout,
        window: &PixelWindow,
    ) -> Result<RasterBlock, GeoFetchError> {
        check_window(layout, window)?;

        let bps = u64::from(layout.bytes_per_sample);
        let stride = layout.row_stride();
        let row_bytes = u64::from(window.width) * bps;
        let mut samples =
            Vec::with_capacity((row_bytes * u64::from(window.height)) as usize);

        if window.col_off == 0 && window.width == layout.width {
            // Contiguous rows collapse into a single range request.
            let start = layout.data_offset + u64::from(window.row_off) * stride;
            let end = start + stride * u64::from(window.height);
            let bytes = self.reader.read_range(start..end).await?;
            samples.extend_from_slice(&bytes);
        } else {
            for r in 0..window.height {
                let row = u64::from(window.row_off + r);
                let start =
                    layout.data_offset + row * stride + u64::from(window.col_off) * bps;
                let bytes = self.reader.read_range(start..start + row_bytes).await?;
                samples.extend_from_slice(&bytes);
            }
        }

        Ok(RasterBlock {
            width: window.width,
            height: window.height,
            samples,
        })
    }
}

fn check_window(layout: &RasterLayout, window: &PixelWindow) -> Result<(), GeoFetchError> {
    if layout.bytes_per_sample == 0 {
        return Err(RasterError::InvalidWindow {
            reason: "layout has zero bytes per sample".to_string(),
        }
        .into());
    }
    if window.width == 0 || window.height == 0 {
        return Err(RasterError::InvalidWindow {
            reason: "window is empty".to_string(),
        }
        .into());
    }
    let right = u64::from(window.col_off) + u64::from(window.width);
    let bottom = u64::from(window.row_off) + u64::from(window.height);
    if right > u64::from(layout.width) || bottom > u64::from(layout.height) {
        return Err(RasterError::InvalidWindow {
            reason: format!(
                "window {}x{}+{}+{} exceeds raster {}x{}",
                window.width,
                window.height,
                window.col_off,
                window.row_off,
                layout.width,
                layout.height
            ),
        }
        .into());
    }
    Ok(())
}
