//! Raster dataset abstraction.
//!
//! A [`DatasetProvider`] opens a path into a [`Dataset`] handle. The handle
//! exposes its [`DatasetInfo`] and reads pixel windows resampled to an
//! arbitrary output size and converted to a requested [`PixelType`].
//! Dropping the handle closes it. A handle serves one render at a time;
//! concurrent renders use separate handles.
//!
//! # Example
//!
//! ```rust,no_run
//! use tilewarp::dataset::{DatasetProvider, GeoTiffProvider, PixelRegion};
//!
//! fn main() -> tilewarp::Result<()> {
//!     let dataset = GeoTiffProvider.open("/path/to/dem.tif".as_ref())?;
//!     let info = dataset.info();
//!     println!("{}x{} with {} band(s)", info.width, info.height, info.bands);
//!
//!     let region = PixelRegion::new(0, 0, info.width, info.height);
//!     let samples = dataset.read_region(&region, 256, 256, info.pixel_type)?;
//!     println!("read {} bytes", samples.len());
//!     Ok(())
//! }
//! ```

pub mod geotiff;
pub mod memory;

pub use geotiff::GeoTiffProvider;
pub use memory::MemoryDataset;

use std::path::Path;

use crate::error::{Error, Result};
use crate::geometry::affine::AffineTransform;
use crate::geometry::Extent;

/// Sample encoding of a dataset band.
///
/// Multi-byte samples in read buffers are native-endian.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelType {
    /// Unsigned 8-bit; also the encoding of RGB/RGBA imagery
    Byte,
    Int8,
    UInt16,
    Int16,
    UInt32,
    Int32,
    Float32,
    Float64,
}

impl PixelType {
    /// Bytes per sample
    #[inline]
    #[must_use]
    pub fn size(self) -> usize {
        match self {
            Self::Byte | Self::Int8 => 1,
            Self::UInt16 | Self::Int16 => 2,
            Self::UInt32 | Self::Int32 | Self::Float32 => 4,
            Self::Float64 => 8,
        }
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Byte => "Byte",
            Self::Int8 => "Int8",
            Self::UInt16 => "UInt16",
            Self::Int16 => "Int16",
            Self::UInt32 => "UInt32",
            Self::Int32 => "Int32",
            Self::Float32 => "Float32",
            Self::Float64 => "Float64",
        }
    }

    /// Read sample `index` of a native-endian buffer as `f64`.
    ///
    /// Returns `None` if the buffer is too short.
    #[inline]
    #[must_use]
    pub fn read(self, buffer: &[u8], index: usize) -> Option<f64> {
        let size = self.size();
        let start = index.checked_mul(size)?;
        let bytes = buffer.get(start..start + size)?;
        let value = match self {
            Self::Byte => f64::from(bytes[0]),
            Self::Int8 => f64::from(i8::from_ne_bytes([bytes[0]])),
            Self::UInt16 => f64::from(u16::from_ne_bytes([bytes[0], bytes[1]])),
            Self::Int16 => f64::from(i16::from_ne_bytes([bytes[0], bytes[1]])),
            Self::UInt32 => f64::from(u32::from_ne_bytes(bytes.try_into().ok()?)),
            Self::Int32 => f64::from(i32::from_ne_bytes(bytes.try_into().ok()?)),
            Self::Float32 => f64::from(f32::from_ne_bytes(bytes.try_into().ok()?)),
            Self::Float64 => f64::from_ne_bytes(bytes.try_into().ok()?),
        };
        Some(value)
    }

    /// Append `value` converted to this type.
    ///
    /// Integer targets round to nearest and saturate at the type's range.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn write(self, value: f64, out: &mut Vec<u8>) {
        let v = if value.is_nan() { 0.0 } else { value };
        match self {
            Self::Byte => out.push(v.round() as u8),
            Self::Int8 => out.extend_from_slice(&(v.round() as i8).to_ne_bytes()),
            Self::UInt16 => out.extend_from_slice(&(v.round() as u16).to_ne_bytes()),
            Self::Int16 => out.extend_from_slice(&(v.round() as i16).to_ne_bytes()),
            Self::UInt32 => out.extend_from_slice(&(v.round() as u32).to_ne_bytes()),
            Self::Int32 => out.extend_from_slice(&(v.round() as i32).to_ne_bytes()),
            Self::Float32 => out.extend_from_slice(&(value as f32).to_ne_bytes()),
            Self::Float64 => out.extend_from_slice(&value.to_ne_bytes()),
        }
    }
}

impl std::fmt::Display for PixelType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Metadata of an opened dataset
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetInfo {
    /// Size in pixels
    pub width: usize,
    pub height: usize,
    /// Number of bands (1=grayscale/elevation, 3=RGB, 4=RGBA)
    pub bands: usize,
    pub pixel_type: PixelType,
    /// No-data sentinel, if the dataset declares one
    pub nodata: Option<f64>,
    /// Pixel → world transform
    pub geo_transform: AffineTransform,
    /// Spatial reference descriptor (`"EPSG:xxxx"` or PROJ.4), if known
    pub srs: Option<String>,
}

impl DatasetInfo {
    /// World-space bounding rectangle of the whole raster
    #[must_use]
    pub fn world_bounds(&self) -> Extent {
        self.geo_transform.world_bounds(self.width, self.height)
    }
}

/// Pixel window `(x_off, y_off, width, height)` inside a dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRegion {
    pub x_off: usize,
    pub y_off: usize,
    pub width: usize,
    pub height: usize,
}

impl PixelRegion {
    #[must_use]
    pub fn new(x_off: usize, y_off: usize, width: usize, height: usize) -> Self {
        Self { x_off, y_off, width, height }
    }

    /// Check the window is non-empty and lies within a `width × height` raster.
    ///
    /// # Errors
    /// [`Error::DatasetRead`] describing the offending window.
    pub fn validate(&self, width: usize, height: usize) -> Result<()> {
        let fits = self.width > 0
            && self.height > 0
            && self.x_off.checked_add(self.width).is_some_and(|end| end <= width)
            && self.y_off.checked_add(self.height).is_some_and(|end| end <= height);
        if fits {
            Ok(())
        } else {
            Err(Error::DatasetRead(format!(
                "window {}x{}+{}+{} outside {width}x{height} raster",
                self.width, self.height, self.x_off, self.y_off
            )))
        }
    }
}

/// An open raster dataset.
///
/// A handle may move between threads but serves one render at a time;
/// concurrent renders check out separate handles.
pub trait Dataset: Send {
    /// Descriptor captured at open time.
    fn info(&self) -> &DatasetInfo;

    /// Read `region`, resampled (nearest neighbour) to `out_width ×
    /// out_height`, as pixel-interleaved samples of `pixel_type`.
    ///
    /// # Errors
    /// [`Error::DatasetRead`] for a window outside the raster,
    /// [`Error::Allocation`] if the output buffer cannot be reserved.
    fn read_region(
        &self,
        region: &PixelRegion,
        out_width: usize,
        out_height: usize,
        pixel_type: PixelType,
    ) -> Result<Vec<u8>>;
}

/// Opens dataset paths
pub trait DatasetProvider: Send + Sync {
    /// Open a dataset.
    ///
    /// # Errors
    /// [`Error::DatasetOpen`] if the path cannot be opened or decoded.
    fn open(&self, path: &Path) -> Result<Box<dyn Dataset>>;
}

/// Reserve an output buffer of `len` bytes, reporting allocation failure as
/// an error instead of aborting.
pub(crate) fn alloc_buffer(len: usize) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    buffer.try_reserve_exact(len).map_err(|_| Error::Allocation(len))?;
    Ok(buffer)
}

/// Nearest source index along one axis for output index `out_index`.
#[inline]
pub(crate) fn nearest_source(out_index: usize, out_len: usize, offset: usize, len: usize) -> usize {
    let ratio = len as f64 / out_len as f64;
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let src = ((out_index as f64 + 0.5) * ratio) as usize;
    offset + src.min(len - 1)
}

/// Byte length of a `width × height × bands` buffer of `pixel_type`.
pub(crate) fn buffer_len(width: usize, height: usize, bands: usize, pixel_type: PixelType) -> Result<usize> {
    width
        .checked_mul(height)
        .and_then(|n| n.checked_mul(bands))
        .and_then(|n| n.checked_mul(pixel_type.size()))
        .ok_or(Error::Allocation(usize::MAX))
}
