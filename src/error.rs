//! Error types shared across the crate.
//!
//! Fatal failures (nothing can be rendered for the request) are variants of
//! [`Error`]. A tile that simply does not intersect its dataset is not an
//! error: the compositor answers it with a blank tile.

use std::path::PathBuf;

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, Error>;

/// Which affine transform failed to invert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformSide {
    /// The dataset's pixel-to-world transform
    Source,
    /// The tile's pixel-to-world transform
    Destination,
}

impl std::fmt::Display for TransformSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Source => write!(f, "src"),
            Self::Destination => write!(f, "dst"),
        }
    }
}

/// Fatal errors for a single render, codec or cache operation
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The dataset could not be opened or decoded
    #[error("failed to open dataset {path}: {reason}")]
    DatasetOpen { path: PathBuf, reason: String },

    /// A spatial reference descriptor could not be parsed
    #[error("failed to parse spatial reference {srs}: {reason}")]
    SpatialReference { srs: String, reason: String },

    /// The affine matrix determinant is below epsilon
    #[error("can't create inverse of affine transformation ({0})")]
    SingularTransform(TransformSide),

    /// A coordinate transform between two spatial references could not be built
    #[error("can't create {direction} transformation: {reason}")]
    TransformCreation { direction: &'static str, reason: String },

    /// Only 1, 3 and 4 band datasets can be rendered
    #[error("unsupported band count {0} (expected 1, 3 or 4)")]
    UnsupportedBandCount(usize),

    /// The dataset stores samples the renderer cannot decode
    #[error("unsupported pixel type: {0}")]
    UnsupportedPixelType(String),

    /// A working buffer could not be sized
    #[error("can't allocate {0} bytes")]
    Allocation(usize),

    /// Reading a window of the dataset failed
    #[error("dataset read failed: {0}")]
    DatasetRead(String),

    /// Encoding or decoding a tile container failed
    #[error("format error: {0}")]
    Format(String),

    /// Invalid configuration
    #[error("configuration error: {0}")]
    Config(String),

    /// Underlying I/O failure
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<tiff::TiffError> for Error {
    fn from(e: tiff::TiffError) -> Self {
        Self::DatasetRead(e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::Format(e.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Self::Config(e.to_string())
    }
}

/// Failure to reproject a single coordinate pair.
///
/// Border scans skip these; the per-pixel loop leaves the pixel empty.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("transform of ({x}, {y}) failed: {reason}")]
pub struct TransformError {
    pub x: f64,
    pub y: f64,
    pub reason: String,
}
