#![doc = include_str!("../README.md")]
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`compositor`]: Renders one tile from a dataset via [`TileCompositor`]
//! - [`window`]: Source window and working resolution for a tile
//! - [`sampler`]: Per-pixel decoding of RGB/RGBA, numeric and elevation buffers
//! - [`geometry`]: Extents, affine geo-transforms, projections and geodesy
//! - [`dataset`]: Dataset traits, in-memory datasets and the GeoTIFF provider
//! - [`mesh`]: Terrain meshes with curtains from elevation tiles
//! - [`format`]: `RAW0` container and terrain JSON codecs
//! - [`grid`]: Tiling grids and tile addressing
//! - [`cache`]: Tile key layouts and disk/memory storage
//! - [`config`]: TOML configuration
//! - [`tileset`]: Cache lookup, render, encode and store for one tileset

// ============================================================================
// Public modules
// ============================================================================

pub mod cache;
pub mod casting;
pub mod compositor;
pub mod config;
pub mod dataset;
pub mod error;
pub mod format;
pub mod geometry;
pub mod grid;
pub mod mesh;
pub mod sampler;
pub mod tileset;
pub mod window;

// ============================================================================
// Errors
// ============================================================================

pub use error::{Error, Result, TransformError, TransformSide};

// ============================================================================
// Tile Rendering
// ============================================================================
// Primary API: TileCompositor::new(options).render(&dataset, &request)

pub use compositor::{
    RasterTile,
    RenderMode,
    RenderOptions,
    Resampling,
    TileCompositor,
    TileRequest,
};

pub use window::{
    SourceWindow,
    SourceWindowResolver,
    WindowResolution,
};

// ============================================================================
// Datasets
// ============================================================================

pub use dataset::{
    Dataset,
    DatasetInfo,
    DatasetProvider,
    GeoTiffProvider,
    MemoryDataset,
    PixelRegion,
    PixelType,
};

// ============================================================================
// Geometry & Projections
// ============================================================================

pub use geometry::Extent;
pub use geometry::affine::{AffineTransform, GeoReference};
pub use geometry::projection::{
    CoordTransform,
    SpatialRef,
    Transformer,
    get_proj_string,
};

// ============================================================================
// Terrain Meshes & Formats
// ============================================================================

pub use mesh::{HeightFieldMesh, MeshBuilder};
pub use format::ImageFormat;

// ============================================================================
// Grids, Caching & Tilesets
// ============================================================================

pub use grid::{Grid, GridOrigin, TileIndex};
pub use cache::{
    CacheBackend,
    DiskCache,
    MemoryCache,
    TileCache,
    TileCoord,
    TileKeyLayout,
};
pub use config::Config;
pub use tileset::{LayerSettings, TileAddress, TileResponse, Tileset};
