//! Affine pixel ↔ world geo-referencing.
//!
//! Coefficients follow the GDAL layout `[c0..c5]`:
//!
//! ```text
//! X = c0 + x*c1 + y*c2
//! Y = c3 + x*c4 + y*c5
//! ```

use super::Extent;
use crate::error::{Error, Result, TransformSide};

/// Determinant threshold below which a transform is treated as singular
pub const DET_EPSILON: f64 = 2.220_446_049_250_313e-16;

/// Six-coefficient affine map from pixel `(x, y)` to world `(X, Y)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AffineTransform(pub [f64; 6]);

impl AffineTransform {
    #[inline]
    #[must_use]
    pub fn new(coefficients: [f64; 6]) -> Self {
        Self(coefficients)
    }

    /// North-up transform covering `extent` with a `width × height` raster.
    ///
    /// Pixel `(0, 0)` is the upper-left corner `(minx, maxy)`.
    #[must_use]
    pub fn from_extent(extent: &Extent, width: usize, height: usize) -> Self {
        let pixel_width = extent.width().abs() / width as f64;
        let pixel_height = extent.height().abs() / height as f64;
        Self([extent.minx, pixel_width, 0.0, extent.maxy, 0.0, -pixel_height])
    }

    /// Build from GeoTIFF `ModelPixelScale` and `ModelTiepoint` values.
    ///
    /// The tiepoint `(i, j, k, x, y, z)` maps raster `(i, j)` to world `(x, y)`.
    #[must_use]
    pub fn from_tiepoint(scale: [f64; 2], tiepoint: [f64; 6]) -> Self {
        let [sx, sy] = scale;
        Self([
            tiepoint[3] - tiepoint[0] * sx,
            sx,
            0.0,
            tiepoint[4] + tiepoint[1] * sy,
            0.0,
            -sy,
        ])
    }

    #[inline]
    #[must_use]
    pub fn coefficients(&self) -> &[f64; 6] {
        &self.0
    }

    /// Apply the transform to a coordinate pair
    #[inline(always)]
    #[must_use]
    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        let c = &self.0;
        (c[0] + x * c[1] + y * c[2], c[3] + x * c[4] + y * c[5])
    }

    /// Determinant of the linear part
    #[inline]
    #[must_use]
    pub fn determinant(&self) -> f64 {
        self.0[1] * self.0[5] - self.0[2] * self.0[4]
    }

    /// Closed-form inverse.
    ///
    /// Returns `None` when `|det| < DET_EPSILON`.
    #[must_use]
    pub fn invert(&self) -> Option<Self> {
        let m = &self.0;
        let det = self.determinant();
        if det.abs() < DET_EPSILON {
            return None;
        }
        let inv_det = 1.0 / det;

        Some(Self([
            (m[2] * m[3] - m[0] * m[5]) * inv_det,
            m[5] * inv_det,
            -m[2] * inv_det,
            (-m[1] * m[3] + m[0] * m[4]) * inv_det,
            -m[4] * inv_det,
            m[1] * inv_det,
        ]))
    }

    /// World-space bounds of a `width × height` raster under this transform
    #[must_use]
    pub fn world_bounds(&self, width: usize, height: usize) -> Extent {
        let (w, h) = (width as f64, height as f64);
        let corners = [self.apply(0.0, 0.0), self.apply(w, 0.0), self.apply(0.0, h), self.apply(w, h)];
        let mut extent = Extent::new(corners[0].0, corners[0].1, corners[0].0, corners[0].1);
        for (x, y) in corners {
            extent.minx = extent.minx.min(x);
            extent.miny = extent.miny.min(y);
            extent.maxx = extent.maxx.max(x);
            extent.maxy = extent.maxy.max(y);
        }
        extent
    }
}

/// A forward transform together with its inverse, computed once.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoReference {
    pub forward: AffineTransform,
    pub inverse: AffineTransform,
}

impl GeoReference {
    /// Pair `forward` with its inverse.
    ///
    /// # Errors
    /// [`Error::SingularTransform`] naming `side` when the matrix cannot be
    /// inverted.
    pub fn new(forward: AffineTransform, side: TransformSide) -> Result<Self> {
        let inverse = forward.invert().ok_or(Error::SingularTransform(side))?;
        Ok(Self { forward, inverse })
    }

    /// Pixel → world
    #[inline(always)]
    #[must_use]
    pub fn to_world(&self, px: f64, py: f64) -> (f64, f64) {
        self.forward.apply(px, py)
    }

    /// World → pixel
    #[inline(always)]
    #[must_use]
    pub fn to_pixel(&self, wx: f64, wy: f64) -> (f64, f64) {
        self.inverse.apply(wx, wy)
    }
}
