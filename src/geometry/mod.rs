//! Geometry primitives: extents, affine geo-transforms, coordinate
//! transforms and geodetic conversions.

pub mod affine;
pub mod geodesy;
pub mod projection;

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Half the earth's circumference in Web Mercator meters
pub const HALF_EARTH: f64 = 20_037_508.342_789_244;

/// Axis-aligned extent in some coordinate reference system
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub minx: f64,
    pub miny: f64,
    pub maxx: f64,
    pub maxy: f64,
}

impl Extent {
    /// Create a new extent
    #[inline]
    #[must_use]
    pub fn new(minx: f64, miny: f64, maxx: f64, maxy: f64) -> Self {
        Self { minx, miny, maxx, maxy }
    }

    /// The whole Web Mercator square
    #[must_use]
    pub fn web_mercator() -> Self {
        Self::new(-HALF_EARTH, -HALF_EARTH, HALF_EARTH, HALF_EARTH)
    }

    /// Create extent from XYZ tile coordinates (Web Mercator EPSG:3857, y down)
    #[must_use]
    pub fn from_xyz(z: u32, x: u32, y: u32) -> Self {
        let n = f64::from(2_u32.pow(z));
        let tile_size = 2.0 * HALF_EARTH / n;

        let minx = -HALF_EARTH + f64::from(x) * tile_size;
        let maxx = minx + tile_size;
        let maxy = HALF_EARTH - f64::from(y) * tile_size;
        let miny = maxy - tile_size;

        Self { minx, miny, maxx, maxy }
    }

    /// Smallest extent holding every point of `points`.
    ///
    /// Returns `None` for an empty iterator or when no point is finite.
    pub fn from_points<I: IntoIterator<Item = (f64, f64)>>(points: I) -> Option<Self> {
        let mut acc = ExtentAccumulator::default();
        for (x, y) in points {
            acc.add(x, y);
        }
        acc.finish()
    }

    #[inline]
    #[must_use]
    pub fn width(&self) -> f64 {
        self.maxx - self.minx
    }

    #[inline]
    #[must_use]
    pub fn height(&self) -> f64 {
        self.maxy - self.miny
    }

    /// Strict overlap test: rectangles that only touch along an edge do not
    /// intersect.
    #[inline]
    #[must_use]
    pub fn intersects(&self, other: &Extent) -> bool {
        !(self.minx >= other.maxx
            || self.maxx <= other.minx
            || self.maxy <= other.miny
            || self.miny >= other.maxy)
    }

    /// Inclusive point containment
    #[inline]
    #[must_use]
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.minx && x <= self.maxx && y >= self.miny && y <= self.maxy
    }
}

impl FromStr for Extent {
    type Err = Error;

    /// Parse the whitespace separated `"minx miny maxx maxy"` form used in
    /// source configuration.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let values = s
            .split_whitespace()
            .map(str::parse::<f64>)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| Error::Config(format!("invalid extent \"{s}\": {e}")))?;

        match values.as_slice() {
            &[minx, miny, maxx, maxy] => {
                if minx >= maxx || miny >= maxy {
                    return Err(Error::Config(format!("extent \"{s}\" has min >= max")));
                }
                Ok(Self::new(minx, miny, maxx, maxy))
            }
            _ => Err(Error::Config(format!(
                "extent \"{s}\" must have 4 values, got {}",
                values.len()
            ))),
        }
    }
}

/// Running min/max over coordinate pairs.
///
/// Non-finite points are ignored; an accumulator that never saw a finite
/// point yields `None`.
#[derive(Debug, Clone, Copy)]
pub struct ExtentAccumulator {
    minx: f64,
    miny: f64,
    maxx: f64,
    maxy: f64,
}

impl Default for ExtentAccumulator {
    fn default() -> Self {
        Self {
            minx: f64::INFINITY,
            miny: f64::INFINITY,
            maxx: f64::NEG_INFINITY,
            maxy: f64::NEG_INFINITY,
        }
    }
}

impl ExtentAccumulator {
    #[inline]
    pub fn add(&mut self, x: f64, y: f64) {
        if !(x.is_finite() && y.is_finite()) {
            return;
        }
        self.minx = self.minx.min(x);
        self.miny = self.miny.min(y);
        self.maxx = self.maxx.max(x);
        self.maxy = self.maxy.max(y);
    }

    #[must_use]
    pub fn finish(&self) -> Option<Extent> {
        if self.minx.is_finite() && self.maxx.is_finite() {
            Some(Extent::new(self.minx, self.miny, self.maxx, self.maxy))
        } else {
            None
        }
    }
}
