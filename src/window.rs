//! Source window resolution.
//!
//! Bounds the part of a dataset a destination tile needs by reprojecting
//! every pixel along the tile's four borders, then turns those bounds into a
//! clamped pixel window and an oversampled working resolution.

use tracing::debug;

use crate::casting::{f64_to_size, i64_to_usize, truncate_to_i64};
use crate::dataset::PixelRegion;
use crate::geometry::affine::{AffineTransform, GeoReference};
use crate::geometry::projection::CoordTransform;
use crate::geometry::{Extent, ExtentAccumulator};

/// Oversampling factor of the working read buffer
pub const DEFAULT_QUALITY: f64 = 2.0;

/// Pixel window to read from the dataset and the working buffer it is read
/// into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SourceWindow {
    /// Offset and size in dataset pixels
    pub x_off: usize,
    pub y_off: usize,
    pub width: usize,
    pub height: usize,
    /// Working (oversampled) buffer size
    pub work_width: usize,
    pub work_height: usize,
    /// Working pixels per dataset pixel
    pub scale_x: f64,
    pub scale_y: f64,
}

impl SourceWindow {
    /// Dataset region to read
    #[must_use]
    pub fn region(&self) -> PixelRegion {
        PixelRegion::new(self.x_off, self.y_off, self.width, self.height)
    }

    /// Map a dataset pixel coordinate into working-buffer space
    #[inline(always)]
    #[must_use]
    pub fn to_working(&self, px: f64, py: f64) -> (f64, f64) {
        (
            (px - self.x_off as f64) * self.scale_x,
            (py - self.y_off as f64) * self.scale_y,
        )
    }
}

/// Outcome of resolving a source window
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WindowResolution {
    Window(SourceWindow),
    /// The tile does not overlap the dataset (or no border point reprojected)
    NoOverlap,
    /// Overlap collapsed to an empty window after clamping
    Degenerate,
}

/// Extent covered by the border pixels of a `width × height` raster under
/// `geo`, reprojected through `transform`.
///
/// Samples `p` in `0..=width` along the top and bottom edges and
/// `0..=height` along the left and right edges. Points that fail to
/// reproject are skipped; `None` if none succeeded.
#[must_use]
pub fn border_extent(
    geo: &AffineTransform,
    transform: &dyn CoordTransform,
    width: usize,
    height: usize,
) -> Option<Extent> {
    let mut acc = ExtentAccumulator::default();
    let (w, h) = (width as f64, height as f64);
    let mut add = |px: f64, py: f64| {
        let (wx, wy) = geo.apply(px, py);
        if let Ok((x, y)) = transform.transform(wx, wy) {
            acc.add(x, y);
        }
    };

    for p in 0..=width {
        let x = p as f64;
        add(x, 0.0);
        add(x, h);
    }
    for p in 0..=height {
        let y = p as f64;
        add(0.0, y);
        add(w, y);
    }
    acc.finish()
}

/// Extent of a whole dataset in another reference system, computed by
/// reprojecting its border pixels through `forward`.
#[must_use]
pub fn dataset_extent(
    geo_transform: &AffineTransform,
    forward: &dyn CoordTransform,
    width: usize,
    height: usize,
) -> Option<Extent> {
    border_extent(geo_transform, forward, width, height)
}

/// Resolves the dataset window needed for a destination tile
#[derive(Debug, Clone, Copy)]
pub struct SourceWindowResolver<'a> {
    source: &'a GeoReference,
    source_width: usize,
    source_height: usize,
    quality: f64,
}

impl<'a> SourceWindowResolver<'a> {
    #[must_use]
    pub fn new(source: &'a GeoReference, source_width: usize, source_height: usize) -> Self {
        Self {
            source,
            source_width,
            source_height,
            quality: DEFAULT_QUALITY,
        }
    }

    /// Set the oversampling factor
    #[must_use]
    pub fn with_quality(mut self, quality: f64) -> Self {
        self.quality = quality;
        self
    }

    /// Resolve the window for a `tile_width × tile_height` tile whose pixels
    /// map to the world through `destination`; `back` maps destination
    /// coordinates into the dataset's reference system.
    #[must_use]
    pub fn resolve(
        &self,
        destination: &AffineTransform,
        back: &dyn CoordTransform,
        tile_width: usize,
        tile_height: usize,
    ) -> WindowResolution {
        let Some(needed) = border_extent(destination, back, tile_width, tile_height) else {
            debug!("No border point of the tile could be reprojected");
            return WindowResolution::NoOverlap;
        };

        let dataset_bounds = self.source.forward.world_bounds(self.source_width, self.source_height);
        if !needed.intersects(&dataset_bounds) {
            debug!(?needed, ?dataset_bounds, "Tile does not overlap dataset");
            return WindowResolution::NoOverlap;
        }

        self.window_for(&needed, tile_width, tile_height)
    }

    /// Clamp the dataset-space rectangle `needed` to a pixel window.
    fn window_for(&self, needed: &Extent, tile_width: usize, tile_height: usize) -> WindowResolution {
        let Some(pixels) = Extent::from_points([
            self.source.to_pixel(needed.minx, needed.maxy),
            self.source.to_pixel(needed.maxx, needed.maxy),
            self.source.to_pixel(needed.minx, needed.miny),
            self.source.to_pixel(needed.maxx, needed.miny),
        ]) else {
            return WindowResolution::Degenerate;
        };

        let size_x = i64::try_from(self.source_width).unwrap_or(i64::MAX);
        let size_y = i64::try_from(self.source_height).unwrap_or(i64::MAX);

        let x_off = truncate_to_i64(pixels.minx).clamp(0, (size_x - 1).max(0));
        let y_off = truncate_to_i64(pixels.miny).clamp(0, (size_y - 1).max(0));

        let mut width = truncate_to_i64(pixels.maxx).saturating_sub(x_off).saturating_add(1);
        let mut height = truncate_to_i64(pixels.maxy).saturating_sub(y_off).saturating_add(1);
        if x_off.saturating_add(width) > size_x - 1 {
            width = size_x - 1 - x_off;
        }
        if y_off.saturating_add(height) > size_y - 1 {
            height = size_y - 1 - y_off;
        }

        if width <= 0 || height <= 0 {
            debug!(x_off, y_off, width, height, "Degenerate source window");
            return WindowResolution::Degenerate;
        }

        let (width, height) = (i64_to_usize(width), i64_to_usize(height));
        let aspect = width as f64 / height as f64;
        let work_width = f64_to_size(self.quality * tile_width.max(tile_height) as f64);
        let work_height = f64_to_size(work_width as f64 / aspect);

        let window = SourceWindow {
            x_off: i64_to_usize(x_off),
            y_off: i64_to_usize(y_off),
            width,
            height,
            work_width,
            work_height,
            scale_x: work_width as f64 / width as f64,
            scale_y: work_height as f64 / height as f64,
        };
        debug!(?window, "Resolved source window");
        WindowResolution::Window(window)
    }
}
