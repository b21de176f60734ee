//! Error types for DSWE

use thiserror::Error;

/// Main error type for DSWE operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TIFF error: {0}")]
    Tiff(#[from] tiff::TiffError),

    #[error("Invalid raster dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    #[error("Index out of bounds: ({row}, {col}) in raster of size ({rows}, {cols})")]
    IndexOutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("Raster size mismatch for {band}: expected ({er}, {ec}), got ({ar}, {ac})")]
    SizeMismatch {
        band: &'static str,
        er: usize,
        ec: usize,
        ar: usize,
        ac: usize,
    },

    #[error("Georeferencing mismatch for {band}: expected {expected}, got {actual}")]
    TransformMismatch {
        band: &'static str,
        expected: String,
        actual: String,
    },

    #[error("Unsupported data type: {0}")]
    UnsupportedDataType(String),

    #[error("Invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("Zevenbergen-Thorne slope requires square pixels, got {ew_res} x {ns_res}")]
    ResolutionMismatch { ew_res: f64, ns_res: f64 },

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Shorthand for an out-of-range configuration value
    pub fn invalid(name: &'static str, value: impl ToString, reason: impl Into<String>) -> Self {
        Error::InvalidParameter {
            name,
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for DSWE operations
pub type Result<T> = std::result::Result<T, Error>;
