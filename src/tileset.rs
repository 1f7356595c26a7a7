//! A configured tileset: grid + source + format + cache.
//!
//! [`Tileset::get_tile`] answers from the cache when it can, otherwise it
//! renders the tile from the source dataset, encodes it and stores it.
//! Dataset handles are exclusive to one render at a time; a few idle ones
//! are kept for reuse.

use std::sync::{Mutex, PoisonError};

use serde::Serialize;
use tracing::{debug, info};

use crate::cache::{TileCache, TileCoord, TileKeyLayout};
use crate::compositor::{RasterTile, TileCompositor, TileRequest};
use crate::config::{Config, TilesetConfig};
use crate::dataset::geotiff::GeoTiffProvider;
use crate::dataset::{Dataset, DatasetProvider};
use crate::error::{Error, Result};
use crate::format::ImageFormat;
use crate::geometry::projection::{SpatialRef, Transformer};
use crate::geometry::Extent;
use crate::grid::{Grid, TileIndex, TileLimits};
use crate::window::dataset_extent;

/// Idle dataset handles kept per tileset
const MAX_IDLE_HANDLES: usize = 4;

/// How a client names a tile
#[derive(Debug, Clone, PartialEq)]
pub enum TileAddress {
    /// Index counted from the grid's origin
    Grid { z: u32, x: u32, y: u32 },
    /// OpenWebGlobe index, rows counted from the top
    OpenWebGlobe { z: u32, x: u32, y: u32 },
    /// A `width × height` map request over `extent` in the grid SRS
    Map { extent: Extent, width: usize, height: usize },
}

/// Encoded tile with its content type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileResponse {
    pub data: Vec<u8>,
    pub mime_type: &'static str,
}

/// Layer description served to OpenWebGlobe clients
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayerSettings {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub format: &'static str,
    pub minlod: u32,
    pub maxlod: u32,
    /// Tile limits `[minx, miny, maxx, maxy]` at `maxlod`
    pub extent: [u32; 4],
}

pub struct Tileset {
    config: TilesetConfig,
    grid: Grid,
    srs: SpatialRef,
    layout: TileKeyLayout,
    cache: Box<dyn TileCache>,
    provider: Box<dyn DatasetProvider>,
    idle: Mutex<Vec<Box<dyn Dataset>>>,
    compositor: TileCompositor,
}

impl std::fmt::Debug for Tileset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tileset")
            .field("name", &self.config.name)
            .field("grid", &self.grid.name)
            .field("format", &self.config.format)
            .field("elevation", &self.config.elevation)
            .finish_non_exhaustive()
    }
}

impl Tileset {
    /// Tileset reading GeoTIFF sources, with the cache its config names.
    ///
    /// # Errors
    /// [`Error::SpatialReference`] for an unparseable grid SRS,
    /// [`Error::Config`] for an invalid cache layout.
    pub fn new(config: TilesetConfig, grid: Grid) -> Result<Self> {
        let srs = SpatialRef::parse(&grid.srs)?;
        let layout = config.cache.key_layout()?;
        let cache = Box::new(config.cache.build());
        let compositor = TileCompositor::new(config.options.clone());
        Ok(Self {
            config,
            grid,
            srs,
            layout,
            cache,
            provider: Box::new(GeoTiffProvider),
            idle: Mutex::new(Vec::new()),
            compositor,
        })
    }

    /// Tileset `name` of `config`.
    ///
    /// # Errors
    /// [`Error::Config`] if the tileset or its grid is unknown, otherwise
    /// as [`Tileset::new`].
    pub fn from_config(config: &Config, name: &str) -> Result<Self> {
        let tileset = config
            .tileset(name)
            .ok_or_else(|| Error::Config(format!("unknown tileset \"{name}\"")))?;
        let grid = config
            .grid(&tileset.grid)
            .ok_or_else(|| Error::Config(format!("unknown grid \"{}\"", tileset.grid)))?;
        Self::new(tileset.clone(), grid)
    }

    #[must_use]
    pub fn with_provider(mut self, provider: Box<dyn DatasetProvider>) -> Self {
        self.provider = provider;
        self.idle.get_mut().unwrap_or_else(PoisonError::into_inner).clear();
        self
    }

    #[must_use]
    pub fn with_cache(mut self, cache: Box<dyn TileCache>) -> Self {
        self.cache = cache;
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.config.name
    }

    #[must_use]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    #[must_use]
    pub fn format(&self) -> ImageFormat {
        self.config.format
    }

    /// Address of tile `(z, x, y)` of this tileset
    #[must_use]
    pub fn coord(&self, z: u32, x: u32, y: u32) -> TileCoord {
        TileCoord::new(self.config.name.clone(), self.grid.name.clone(), z, x, y)
    }

    /// Grid coordinate of a client tile address.
    ///
    /// # Errors
    /// [`Error::Config`] for an OpenWebGlobe index outside the grid.
    pub fn resolve(&self, address: &TileAddress) -> Result<TileCoord> {
        let TileIndex { z, x, y } = match address {
            TileAddress::Grid { z, x, y } => TileIndex { z: *z, x: *x, y: *y },
            TileAddress::OpenWebGlobe { z, x, y } => {
                let (gx, gy) = self.grid.flip_xy(*z, *x, *y).ok_or_else(|| {
                    Error::Config(format!(
                        "tile {z}/{x}/{y} is outside grid \"{}\"",
                        self.grid.name
                    ))
                })?;
                TileIndex { z: *z, x: gx, y: gy }
            }
            TileAddress::Map { extent, width, height } => self.grid.tile_at(extent, *width, *height),
        };
        Ok(self.coord(z, x, y))
    }

    /// Encoded tile for a client address, tagged with the format's MIME type.
    ///
    /// # Errors
    /// As [`Tileset::resolve`] and [`Tileset::get_tile`].
    pub fn serve(&self, address: &TileAddress) -> Result<TileResponse> {
        let coord = self.resolve(address)?;
        Ok(TileResponse {
            data: self.get_tile(&coord)?,
            mime_type: self.config.format.mime_type(),
        })
    }

    /// # Errors
    /// See [`TileKeyLayout::key`].
    pub fn tile_key(&self, coord: &TileCoord) -> Result<String> {
        self.layout
            .key(coord, &self.grid, Some(self.config.format.extension()))
    }

    /// Render request for `coord`.
    ///
    /// # Errors
    /// [`Error::Config`] if the tile is outside the grid or the source
    /// extent is malformed.
    pub fn request(&self, coord: &TileCoord) -> Result<TileRequest> {
        let extent = self
            .grid
            .tile_extent(coord.z, coord.x, coord.y)
            .ok_or_else(|| {
                Error::Config(format!(
                    "tile {}/{}/{} is outside grid \"{}\"",
                    coord.z, coord.x, coord.y, self.grid.name
                ))
            })?;

        let request = if self.config.elevation {
            TileRequest::elevation(
                extent,
                self.grid.elevation_block,
                self.srs.clone(),
                self.grid.normalized_extent(&extent),
            )
        } else {
            TileRequest::image(extent, self.grid.tile_width, self.grid.tile_height, self.srs.clone())
        };
        Ok(request
            .with_valid_extent(self.config.source.valid_extent()?)
            .with_source_srs(self.config.source.srs.clone()))
    }

    /// Render `coord` on a dataset handle no other render is using.
    ///
    /// # Errors
    /// Opening the dataset or any render error.
    pub fn render(&self, coord: &TileCoord) -> Result<RasterTile> {
        let request = self.request(coord)?;
        let dataset = self.checkout()?;
        let tile = self.compositor.render(dataset.as_ref(), &request)?;
        self.checkin(dataset);
        Ok(tile)
    }

    fn checkout(&self) -> Result<Box<dyn Dataset>> {
        let idle = self.idle.lock().unwrap_or_else(PoisonError::into_inner).pop();
        match idle {
            Some(dataset) => Ok(dataset),
            None => {
                debug!(tileset = %self.config.name, "opening dataset handle");
                self.provider.open(&self.config.source.data)
            }
        }
    }

    fn checkin(&self, dataset: Box<dyn Dataset>) {
        let mut idle = self.idle.lock().unwrap_or_else(PoisonError::into_inner);
        if idle.len() < MAX_IDLE_HANDLES {
            idle.push(dataset);
        }
    }

    /// Encoded tile, from the cache or freshly rendered and stored.
    ///
    /// # Errors
    /// Cache, render and encode failures.
    pub fn get_tile(&self, coord: &TileCoord) -> Result<Vec<u8>> {
        let key = self.tile_key(coord)?;
        if let Some(bytes) = self.cache.get(&key)? {
            debug!(key = %key, "tile cache hit");
            return Ok(bytes);
        }
        self.store(coord, &key)
    }

    /// Render, encode and store `coord` regardless of the cache content.
    ///
    /// # Errors
    /// Render, encode and cache write failures.
    pub fn seed(&self, coord: &TileCoord) -> Result<Vec<u8>> {
        let key = self.tile_key(coord)?;
        self.store(coord, &key)
    }

    fn store(&self, coord: &TileCoord, key: &str) -> Result<Vec<u8>> {
        let tile = self.render(coord)?;
        let bytes = self.config.format.encode(&tile)?;
        self.cache.put(key, &bytes)?;
        info!(
            tileset = %self.config.name,
            z = coord.z,
            x = coord.x,
            y = coord.y,
            bytes = bytes.len(),
            "Rendered tile"
        );
        Ok(bytes)
    }

    /// OpenWebGlobe layer description.
    ///
    /// The extent lists the tiles of the finest level touched by the
    /// dataset's footprint in the grid's reference system; a dataset that
    /// cannot be projected into the grid reports the whole level.
    ///
    /// # Errors
    /// Opening the dataset or building the transform into the grid SRS.
    pub fn layer_settings(&self) -> Result<LayerSettings> {
        let maxlod = u32::try_from(self.grid.nlevels().saturating_sub(1)).unwrap_or(u32::MAX);
        let full = self.grid.tile_limits(&self.grid.extent, maxlod);

        let dataset = self.checkout()?;
        let info = dataset.info().clone();
        self.checkin(dataset);
        let source_srs = match self.config.source.srs.as_deref().or(info.srs.as_deref()) {
            Some(srs) => Some(SpatialRef::parse(srs)?),
            None => None,
        };
        let footprint = match source_srs {
            Some(srs) => {
                let forward = Transformer::new(&srs, &self.srs)?;
                dataset_extent(&info.geo_transform, &forward, info.width, info.height)
            }
            None => None,
        };

        let limits = footprint
            .and_then(|extent| self.grid.tile_limits(&extent, maxlod))
            .or(full)
            .unwrap_or(TileLimits { minx: 0, miny: 0, maxx: 0, maxy: 0 });

        Ok(LayerSettings {
            name: self.config.name.clone(),
            kind: if self.config.elevation { "elevation" } else { "image" },
            format: self.config.format.extension(),
            minlod: 1,
            maxlod,
            extent: [limits.minx, limits.miny, limits.maxx, limits.maxy],
        })
    }

    /// [`Tileset::layer_settings`] as pretty JSON
    ///
    /// # Errors
    /// As [`Tileset::layer_settings`].
    pub fn layer_settings_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.layer_settings()?)?)
    }
}
