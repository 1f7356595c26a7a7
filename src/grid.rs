//! Tiling grids: resolution pyramids over a fixed extent.
//!
//! Tile indices count from the grid's declared [`GridOrigin`] corner: on a
//! top-left grid row 0 is the northernmost row. [`Grid::flip_xy`] converts
//! an OpenWebGlobe client index, whose rows count from the top, into that
//! convention.

use serde::{Deserialize, Serialize};

use crate::casting::truncate_to_i64;
use crate::geometry::{Extent, HALF_EARTH};

/// Resolution of level 0 of the GoogleMapsCompatible grid (m/px)
const MERCATOR_RES0: f64 = 2.0 * HALF_EARTH / 256.0;
const MERCATOR_LEVELS: usize = 19;
const WGS84_RES0: f64 = 180.0 / 256.0;
const WGS84_LEVELS: usize = 18;

/// Default heights per side of an elevation tile
pub const DEFAULT_ELEVATION_BLOCK: usize = 17;

/// Relative slack when matching a requested resolution against a level
const RESOLUTION_TOLERANCE: f64 = 1e-9;

/// Corner of the grid the client's tile indices count from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GridOrigin {
    #[default]
    BottomLeft,
    TopLeft,
    BottomRight,
    TopRight,
}

impl GridOrigin {
    fn counts_from_top(self) -> bool {
        matches!(self, Self::TopLeft | Self::TopRight)
    }

    fn counts_from_right(self) -> bool {
        matches!(self, Self::BottomRight | Self::TopRight)
    }
}

/// Tile address inside a grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileIndex {
    pub z: u32,
    pub x: u32,
    pub y: u32,
}

/// Half-open tile index range `[minx, maxx) × [miny, maxy)` at one level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TileLimits {
    pub minx: u32,
    pub miny: u32,
    pub maxx: u32,
    pub maxy: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    pub name: String,
    /// Reference system of `extent`, e.g. `EPSG:3857`
    pub srs: String,
    pub extent: Extent,
    pub tile_width: usize,
    pub tile_height: usize,
    /// Units per pixel, coarsest first
    pub resolutions: Vec<f64>,
    #[serde(default = "default_elevation_block")]
    pub elevation_block: usize,
    #[serde(default)]
    pub origin: GridOrigin,
}

fn default_elevation_block() -> usize {
    DEFAULT_ELEVATION_BLOCK
}

fn halving(res0: f64, levels: usize) -> Vec<f64> {
    std::iter::successors(Some(res0), |r| Some(r / 2.0))
        .take(levels)
        .collect()
}

impl Grid {
    /// Spherical Mercator grid of 256 pixel tiles, one tile at level 0
    #[must_use]
    pub fn web_mercator() -> Self {
        Self {
            name: "GoogleMapsCompatible".to_string(),
            srs: "EPSG:3857".to_string(),
            extent: Extent::web_mercator(),
            tile_width: 256,
            tile_height: 256,
            resolutions: halving(MERCATOR_RES0, MERCATOR_LEVELS),
            elevation_block: DEFAULT_ELEVATION_BLOCK,
            origin: GridOrigin::TopLeft,
        }
    }

    /// Geographic grid of 256 pixel tiles, two tiles at level 0
    #[must_use]
    pub fn wgs84() -> Self {
        Self {
            name: "WGS84".to_string(),
            srs: "EPSG:4326".to_string(),
            extent: Extent::new(-180.0, -90.0, 180.0, 90.0),
            tile_width: 256,
            tile_height: 256,
            resolutions: halving(WGS84_RES0, WGS84_LEVELS),
            elevation_block: DEFAULT_ELEVATION_BLOCK,
            origin: GridOrigin::BottomLeft,
        }
    }

    #[inline]
    #[must_use]
    pub fn nlevels(&self) -> usize {
        self.resolutions.len()
    }

    #[must_use]
    pub fn resolution(&self, z: u32) -> Option<f64> {
        self.resolutions.get(z as usize).copied()
    }

    /// Tile counts `(columns, rows)` at level `z`
    #[must_use]
    pub fn levels(&self, z: u32) -> Option<(u32, u32)> {
        let res = self.resolution(z)?;
        Some((
            tile_count(self.extent.width(), res, self.tile_width),
            tile_count(self.extent.height(), res, self.tile_height),
        ))
    }

    /// Extent of tile `(x, y)` at level `z`, or `None` outside the pyramid
    #[must_use]
    pub fn tile_extent(&self, z: u32, x: u32, y: u32) -> Option<Extent> {
        let res = self.resolution(z)?;
        let (cols, rows) = self.levels(z)?;
        if x >= cols || y >= rows {
            return None;
        }
        let span_x = res * self.tile_width as f64;
        let span_y = res * self.tile_height as f64;
        let minx = if self.origin.counts_from_right() {
            self.extent.maxx - f64::from(x + 1) * span_x
        } else {
            self.extent.minx + f64::from(x) * span_x
        };
        let miny = if self.origin.counts_from_top() {
            self.extent.maxy - f64::from(y + 1) * span_y
        } else {
            self.extent.miny + f64::from(y) * span_y
        };
        Some(Extent::new(minx, miny, minx + span_x, miny + span_y))
    }

    /// Locate the tile a `width × height` pixel request over `extent` falls
    /// on: the first level whose resolution does not exceed the requested
    /// one, or tile `(0, 0, 0)` when none does.
    ///
    /// Indices count from the bottom-left corner, or from the top-left one
    /// with `flip_y`, whatever the grid's origin.
    #[must_use]
    pub fn tile_for_extent(&self, extent: &Extent, width: usize, height: usize, flip_y: bool) -> TileIndex {
        let requested = (extent.width() / width.max(1) as f64)
            .max(extent.height() / height.max(1) as f64);
        let limit = requested * (1.0 + RESOLUTION_TOLERANCE);

        for (z, &res) in self.resolutions.iter().enumerate() {
            if res > limit {
                continue;
            }
            let z = u32::try_from(z).unwrap_or(u32::MAX);
            let x = index_at(extent.minx - self.extent.minx, res * width as f64);
            let mut y = index_at(extent.miny - self.extent.miny, res * height as f64);
            if flip_y {
                let rows = self.levels(z).map_or(1, |(_, rows)| rows);
                y = rows.saturating_sub(1).saturating_sub(y);
            }
            return TileIndex { z, x, y };
        }
        TileIndex { z: 0, x: 0, y: 0 }
    }

    /// [`Grid::tile_for_extent`] with the index counted from the grid's
    /// origin
    #[must_use]
    pub fn tile_at(&self, extent: &Extent, width: usize, height: usize) -> TileIndex {
        let mut index = self.tile_for_extent(extent, width, height, self.origin.counts_from_top());
        if self.origin.counts_from_right() {
            if let Some((cols, _)) = self.levels(index.z) {
                index.x = cols.saturating_sub(1).saturating_sub(index.x);
            }
        }
        index
    }

    /// Position of `extent` relative to the grid, scaled so the grid spans
    /// `[-1, 1]` when centred on the origin.
    #[must_use]
    pub fn normalized_extent(&self, extent: &Extent) -> Extent {
        let dx = self.extent.width().abs();
        let dy = self.extent.height().abs();
        Extent::new(
            extent.minx / dx * 2.0,
            extent.miny / dy * 2.0,
            extent.maxx / dx * 2.0,
            extent.maxy / dy * 2.0,
        )
    }

    /// Tiles of level `z` touching `extent`, clamped to the grid and counted
    /// from the grid's origin
    #[must_use]
    pub fn tile_limits(&self, extent: &Extent, z: u32) -> Option<TileLimits> {
        let res = self.resolution(z)?;
        let (cols, rows) = self.levels(z)?;
        let span_x = res * self.tile_width as f64;
        let span_y = res * self.tile_height as f64;
        let clamp = |v: f64, max: u32| -> u32 {
            let v = truncate_to_i64(v).clamp(0, i64::from(max));
            u32::try_from(v).unwrap_or(max)
        };
        let mut limits = TileLimits {
            minx: clamp(((extent.minx - self.extent.minx) / span_x).floor(), cols),
            miny: clamp(((extent.miny - self.extent.miny) / span_y).floor(), rows),
            maxx: clamp(((extent.maxx - self.extent.minx) / span_x).ceil(), cols),
            maxy: clamp(((extent.maxy - self.extent.miny) / span_y).ceil(), rows),
        };
        if self.origin.counts_from_right() {
            (limits.minx, limits.maxx) = (cols - limits.maxx, cols - limits.minx);
        }
        if self.origin.counts_from_top() {
            (limits.miny, limits.maxy) = (rows - limits.maxy, rows - limits.miny);
        }
        Some(limits)
    }

    /// Convert an OpenWebGlobe tile index, whose rows count from the top,
    /// into this grid's index.
    #[must_use]
    pub fn flip_xy(&self, z: u32, x: u32, y: u32) -> Option<(u32, u32)> {
        let (cols, rows) = self.levels(z)?;
        if x >= cols || y >= rows {
            return None;
        }
        let bottom_y = rows - y - 1;
        Some(match self.origin {
            GridOrigin::BottomLeft => (x, bottom_y),
            GridOrigin::TopLeft => (x, rows - bottom_y - 1),
            GridOrigin::BottomRight => (cols - x - 1, bottom_y),
            GridOrigin::TopRight => (cols - x - 1, rows - bottom_y - 1),
        })
    }
}

/// Number of tiles needed to cover `span` at `res`, ignoring float noise
/// below a hundredth of a pixel.
fn tile_count(span: f64, res: f64, tile_size: usize) -> u32 {
    let unit = res * tile_size as f64;
    let count = truncate_to_i64(((span - 0.01 * res) / unit).ceil()).max(1);
    u32::try_from(count).unwrap_or(u32::MAX)
}

fn index_at(offset: f64, span: f64) -> u32 {
    let v = truncate_to_i64((offset / span + RESOLUTION_TOLERANCE).floor()).max(0);
    u32::try_from(v).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_web_mercator_levels() {
        let grid = Grid::web_mercator();
        assert_eq!(grid.nlevels(), 19);
        assert_eq!(grid.levels(0), Some((1, 1)));
        assert_eq!(grid.levels(3), Some((8, 8)));
        assert_eq!(grid.levels(19), None);
        assert_relative_eq!(grid.resolutions[0], 156_543.033_928_040_97, epsilon = 1e-6);
    }

    #[test]
    fn test_wgs84_levels() {
        let grid = Grid::wgs84();
        assert_eq!(grid.levels(0), Some((2, 1)));
        assert_eq!(grid.levels(2), Some((8, 4)));
    }

    #[test]
    fn test_tile_extent_bottom_left() {
        let mut grid = Grid::web_mercator();
        grid.origin = GridOrigin::BottomLeft;
        let e = grid.tile_extent(1, 0, 0).unwrap();
        assert_relative_eq!(e.minx, -HALF_EARTH, epsilon = 1e-6);
        assert_relative_eq!(e.miny, -HALF_EARTH, epsilon = 1e-6);
        assert_relative_eq!(e.maxx, 0.0, epsilon = 1e-6);
        assert_relative_eq!(e.maxy, 0.0, epsilon = 1e-6);
        assert!(grid.tile_extent(1, 2, 0).is_none());
    }

    #[test]
    fn test_tile_extent_follows_origin() {
        let mut grid = Grid::web_mercator();
        // row 0 of a top-left grid is the northern one
        let nw = grid.tile_extent(1, 0, 0).unwrap();
        assert_relative_eq!(nw.minx, -HALF_EARTH, epsilon = 1e-6);
        assert_relative_eq!(nw.maxy, HALF_EARTH, epsilon = 1e-6);

        grid.origin = GridOrigin::TopRight;
        let ne = grid.tile_extent(1, 0, 0).unwrap();
        assert_relative_eq!(ne.minx, 0.0, epsilon = 1e-6);
        assert_relative_eq!(ne.maxx, HALF_EARTH, epsilon = 1e-6);
        assert_relative_eq!(ne.miny, 0.0, epsilon = 1e-6);

        grid.origin = GridOrigin::BottomRight;
        let se = grid.tile_extent(2, 0, 0).unwrap();
        assert_relative_eq!(se.maxx, HALF_EARTH, epsilon = 1e-6);
        assert_relative_eq!(se.miny, -HALF_EARTH, epsilon = 1e-6);
    }

    #[test]
    fn test_tile_for_extent_roundtrip() {
        let mut grid = Grid::web_mercator();
        grid.origin = GridOrigin::BottomLeft;
        let e = grid.tile_extent(4, 5, 9).unwrap();
        let idx = grid.tile_for_extent(&e, 256, 256, false);
        assert_eq!(idx, TileIndex { z: 4, x: 5, y: 9 });

        let flipped = grid.tile_for_extent(&e, 256, 256, true);
        assert_eq!(flipped, TileIndex { z: 4, x: 5, y: 6 });
    }

    #[test]
    fn test_tile_at_every_origin() {
        let mut grid = Grid::web_mercator();
        for origin in [
            GridOrigin::BottomLeft,
            GridOrigin::TopLeft,
            GridOrigin::BottomRight,
            GridOrigin::TopRight,
        ] {
            grid.origin = origin;
            let e = grid.tile_extent(3, 2, 5).unwrap();
            assert_eq!(grid.tile_at(&e, 256, 256), TileIndex { z: 3, x: 2, y: 5 }, "{origin:?}");
        }
    }

    #[test]
    fn test_tile_for_extent_too_fine() {
        let grid = Grid::web_mercator();
        let e = Extent::new(0.0, 0.0, 1.0, 1.0);
        // 1 m over 256 px is finer than any level
        assert_eq!(grid.tile_for_extent(&e, 256, 256, false), TileIndex { z: 0, x: 0, y: 0 });
    }

    #[test]
    fn test_normalized_extent() {
        let grid = Grid::web_mercator();
        // north-east tile
        let n = grid.normalized_extent(&grid.tile_extent(1, 1, 0).unwrap());
        assert_relative_eq!(n.minx, 0.0, epsilon = 1e-12);
        assert_relative_eq!(n.miny, 0.0, epsilon = 1e-12);
        assert_relative_eq!(n.maxx, 1.0, epsilon = 1e-12);
        assert_relative_eq!(n.maxy, 1.0, epsilon = 1e-12);

        let full = grid.normalized_extent(&grid.extent);
        assert_relative_eq!(full.minx, -1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_tile_limits() {
        let mut grid = Grid::web_mercator();
        let all = grid.tile_limits(&grid.extent, 2).unwrap();
        assert_eq!(all, TileLimits { minx: 0, miny: 0, maxx: 4, maxy: 4 });

        let ne = Extent::new(1.0, 1.0, HALF_EARTH * 0.4, HALF_EARTH * 0.4);
        let lim = grid.tile_limits(&ne, 2).unwrap();
        assert_eq!(lim, TileLimits { minx: 2, miny: 1, maxx: 3, maxy: 2 });

        grid.origin = GridOrigin::BottomLeft;
        let lim = grid.tile_limits(&ne, 2).unwrap();
        assert_eq!(lim, TileLimits { minx: 2, miny: 2, maxx: 3, maxy: 3 });

        grid.origin = GridOrigin::BottomRight;
        let lim = grid.tile_limits(&ne, 2).unwrap();
        assert_eq!(lim, TileLimits { minx: 1, miny: 2, maxx: 2, maxy: 3 });

        let outside = Extent::new(-3.0 * HALF_EARTH, 0.0, 3.0 * HALF_EARTH, 1.0);
        let lim = grid.tile_limits(&outside, 1).unwrap();
        assert_eq!((lim.minx, lim.maxx), (0, 2));
    }

    #[test]
    fn test_flip_xy_origins() {
        let mut grid = Grid::web_mercator();
        grid.origin = GridOrigin::BottomLeft;
        assert_eq!(grid.flip_xy(2, 1, 0), Some((1, 3)));
        grid.origin = GridOrigin::TopLeft;
        assert_eq!(grid.flip_xy(2, 1, 0), Some((1, 0)));
        grid.origin = GridOrigin::BottomRight;
        assert_eq!(grid.flip_xy(2, 1, 0), Some((2, 3)));
        grid.origin = GridOrigin::TopRight;
        assert_eq!(grid.flip_xy(2, 1, 0), Some((2, 0)));
        assert_eq!(grid.flip_xy(2, 4, 0), None);
    }

    #[test]
    fn test_grid_from_toml() {
        let grid: Grid = toml::from_str(
            r#"
            name = "local"
            srs = "EPSG:2056"
            extent = { minx = 2480000.0, miny = 1070000.0, maxx = 2840000.0, maxy = 1300000.0 }
            tile_width = 256
            tile_height = 256
            resolutions = [4000.0, 2000.0]
            origin = "top-left"
            "#,
        )
        .unwrap();
        assert_eq!(grid.elevation_block, DEFAULT_ELEVATION_BLOCK);
        assert_eq!(grid.origin, GridOrigin::TopLeft);
        assert_eq!(grid.levels(1), Some((1, 1)));
    }
}
