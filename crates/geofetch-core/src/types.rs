//! Data types shared across the `geofetch` workflows.
//!
//! This module defines remote locators, bounding regions, and the field
//! metadata used when presenting dataset schemas.

use arrow_schema::DataType;
use url::Url;

use crate::error::{CatalogError, ConnectionError, GeoFetchError};

/// Locator schemes with a store backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    /// Object storage (`s3://bucket/key`), public buckets assumed
    S3,
    /// Plain HTTP
    Http,
    /// HTTPS
    Https,
    /// Local filesystem (`file:///path`)
    File,
    /// In-memory store, registered by the caller (used in tests)
    Memory,
}

impl Scheme {
    /// Parses a scheme string into a [`Scheme`], if supported.
    #[must_use]
    pub fn from_str_opt(scheme: &str) -> Option<Self> {
        match scheme {
            "s3" => Some(Scheme::S3),
            "http" => Some(Scheme::Http),
            "https" => Some(Scheme::Https),
            "file" => Some(Scheme::File),
            "memory" => Some(Scheme::Memory),
            _ => None,
        }
    }

    /// Returns the scheme as it appears in a locator.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Scheme::S3 => "s3",
            Scheme::Http => "http",
            Scheme::Https => "https",
            Scheme::File => "file",
            Scheme::Memory => "memory",
        }
    }

    /// Comma-separated list of all supported schemes, for error messages.
    #[must_use]
    pub fn supported_list() -> String {
        "s3, http, https, file, memory".to_string()
    }
}

/// A validated remote resource locator.
///
/// Constructed once, read-only afterwards. Parsing checks syntax and that
/// the scheme has a store backend; it performs no network I/O.
///
/// # Examples
///
/// ```
/// use geofetch_core::types::{RemoteLocator, Scheme};
///
/// let locator = RemoteLocator::parse("s3://gbif-open-data/occurrence/").unwrap();
/// assert_eq!(locator.scheme(), Scheme::S3);
/// assert_eq!(locator.base(), "s3://gbif-open-data");
/// ```
#[derive(Debug, Clone)]
pub struct RemoteLocator {
    url: Url,
    scheme: Scheme,
}

impl RemoteLocator {
    /// Parses and validates a locator string.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectionError::InvalidLocator`] if the string is not a
    /// valid URI, or [`ConnectionError::UnsupportedScheme`] if no store
    /// backend exists for its scheme.
    pub fn parse(locator: &str) -> Result<Self, GeoFetchError> {
        let url = Url::parse(locator).map_err(|e| ConnectionError::InvalidLocator {
            locator: locator.to_string(),
            reason: e.to_string(),
        })?;

        let scheme = Scheme::from_str_opt(url.scheme()).ok_or_else(|| {
            ConnectionError::UnsupportedScheme {
                scheme: url.scheme().to_string(),
                supported: Scheme::supported_list(),
            }
        })?;

        Ok(Self { url, scheme })
    }

    /// The locator scheme.
    #[must_use]
    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    /// The full locator string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }

    /// The underlying parsed URL.
    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// The `scheme://authority` base used to register a store backend.
    #[must_use]
    pub fn base(&self) -> String {
        match self.url.host_str() {
            Some(host) => format!("{}://{}", self.scheme.as_str(), host),
            None => format!("{}://", self.scheme.as_str()),
        }
    }
}

impl std::fmt::Display for RemoteLocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.url)
    }
}

/// An axis-aligned bounding region in geographic coordinates.
///
/// Coordinates are degrees, ordered `west, south, east, north`. Validation
/// happens at construction so a malformed region fails before any network
/// request is issued.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingRegion {
    /// Minimum longitude (degrees)
    pub west: f64,
    /// Minimum latitude (degrees)
    pub south: f64,
    /// Maximum longitude (degrees)
    pub east: f64,
    /// Maximum latitude (degrees)
    pub north: f64,
}

impl BoundingRegion {
    /// Creates a validated bounding region.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidRegion`] if any coordinate is out of
    /// range or a minimum exceeds its maximum.
    pub fn new(west: f64, south: f64, east: f64, north: f64) -> Result<Self, GeoFetchError> {
        let region = Self {
            west,
            south,
            east,
            north,
        };
        region.validate()?;
        Ok(region)
    }

    /// Re-checks the region invariants.
    ///
    /// [`BoundingRegion::new`] already validates, but the fields are public,
    /// so remote calls validate again before issuing a request.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidRegion`] if any invariant is violated.
    pub fn validate(&self) -> Result<(), GeoFetchError> {
        let Self {
            west,
            south,
            east,
            north,
        } = *self;
        if !(-180.0..=180.0).contains(&west) || !(-180.0..=180.0).contains(&east) {
            return Err(CatalogError::InvalidRegion {
                reason: format!("longitude out of range [-180, 180]: west={west}, east={east}"),
            }
            .into());
        }
        if !(-90.0..=90.0).contains(&south) || !(-90.0..=90.0).contains(&north) {
            return Err(CatalogError::InvalidRegion {
                reason: format!("latitude out of range [-90, 90]: south={south}, north={north}"),
            }
            .into());
        }
        if west > east {
            return Err(CatalogError::InvalidRegion {
                reason: format!("west ({west}) must not exceed east ({east})"),
            }
            .into());
        }
        if south > north {
            return Err(CatalogError::InvalidRegion {
                reason: format!("south ({south}) must not exceed north ({north})"),
            }
            .into());
        }
        Ok(())
    }

    /// Parses a `"west,south,east,north"` string, as passed on the CLI.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidRegion`] if the string does not hold
    /// exactly four numbers or the numbers fail validation.
    pub fn parse(s: &str) -> Result<Self, GeoFetchError> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 4 {
            return Err(CatalogError::InvalidRegion {
                reason: format!("expected 4 comma-separated values, got {}", parts.len()),
            }
            .into());
        }
        let mut coords = [0.0f64; 4];
        for (i, part) in parts.iter().enumerate() {
            coords[i] = part.parse().map_err(|_| CatalogError::InvalidRegion {
                reason: format!("'{part}' is not a number"),
            })?;
        }
        Self::new(coords[0], coords[1], coords[2], coords[3])
    }

    /// Formats the region as a `bbox` query parameter value.
    #[must_use]
    pub fn to_bbox_param(&self) -> String {
        format!("{},{},{},{}", self.west, self.south, self.east, self.north)
    }
}

/// Information about a field/column.
#[derive(Debug, Clone)]
pub struct FieldInfo {
    /// Field name
    pub name: String,
    /// Data type, formatted for display
    pub data_type: String,
    /// Whether the field is nullable
    pub nullable: bool,
}

/// Formats an Arrow [`DataType`] into a human-readable label.
///
/// Used when presenting dataset schemas; falls back to the debug rendering
/// for types without a friendlier name.
#[must_use]
pub fn format_data_type(data_type: &DataType) -> String {
    match data_type {
        DataType::Utf8 | DataType::Utf8View => "String".to_string(),
        DataType::LargeUtf8 => "LargeString".to_string(),
        DataType::Binary | DataType::BinaryView => "Binary".to_string(),
        DataType::Timestamp(unit, tz) => {
            let tz_str = tz.as_ref().map_or("", |t| t.as_ref());
            format!("Timestamp({unit:?}, {tz_str})")
        },
        DataType::List(_) => "List".to_string(),
        DataType::Struct(_) => "Struct".to_string(),
        other => format!("{other:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CatalogError, ConnectionError, GeoFetchError};

    #[test]
    fn test_parse_s3_locator() {
        let locator = RemoteLocator::parse("s3://bucket/prefix/part.parquet").unwrap();
        assert_eq!(locator.scheme(), Scheme::S3);
        assert_eq!(locator.base(), "s3://bucket");
        assert_eq!(locator.as_str(), "s3://bucket/prefix/part.parquet");
    }

    #[test]
    fn test_parse_https_locator() {
        let locator = RemoteLocator::parse("https://example.com/data.parquet").unwrap();
        assert_eq!(locator.scheme(), Scheme::Https);
        assert_eq!(locator.base(), "https://example.com");
    }

    #[test]
    fn test_parse_unsupported_scheme() {
        let err = RemoteLocator::parse("ftp://example.com/data").unwrap_err();
        match err {
            GeoFetchError::Connection(ConnectionError::UnsupportedScheme { scheme, .. }) => {
                assert_eq!(scheme, "ftp");
            },
            other => panic!("expected UnsupportedScheme, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_invalid_locator() {
        let err = RemoteLocator::parse("not a url").unwrap_err();
        assert!(matches!(
            err,
            GeoFetchError::Connection(ConnectionError::InvalidLocator { .. })
        ));
    }

    #[test]
    fn test_region_valid() {
        let region = BoundingRegion::new(-71.1, 41.2, -70.5, 41.7).unwrap();
        assert_eq!(region.to_bbox_param(), "-71.1,41.2,-70.5,41.7");
    }

    #[test]
    fn test_region_min_exceeds_max() {
        let err = BoundingRegion::new(10.0, 0.0, -10.0, 5.0).unwrap_err();
        match err {
            GeoFetchError::Catalog(CatalogError::InvalidRegion { reason }) => {
                assert!(reason.contains("west"));
            },
            other => panic!("expected InvalidRegion, got {other:?}"),
        }
    }

    #[test]
    fn test_region_validate_on_literal() {
        let region = BoundingRegion {
            west: 5.0,
            south: 0.0,
            east: -5.0,
            north: 1.0,
        };
        assert!(region.validate().is_err());
    }

    #[test]
    fn test_region_latitude_out_of_range() {
        assert!(BoundingRegion::new(0.0, -95.0, 1.0, 1.0).is_err());
    }

    #[test]
    fn test_region_parse_roundtrip() {
        let region = BoundingRegion::parse("-122.5, 37.5, -122.0, 38.0").unwrap();
        assert_eq!(region.west, -122.5);
        assert_eq!(region.north, 38.0);
    }

    #[test]
    fn test_region_parse_wrong_arity() {
        assert!(BoundingRegion::parse("1,2,3").is_err());
        assert!(BoundingRegion::parse("1,2,3,x").is_err());
    }

    #[test]
    fn test_format_data_type() {
        assert_eq!(format_data_type(&DataType::Utf8), "String");
        assert_eq!(format_data_type(&DataType::Int64), "Int64");
        assert_eq!(format_data_type(&DataType::Float64), "Float64");
    }
}
