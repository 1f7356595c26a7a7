//! Tile storage: key layouts and byte-buffer backends.
//!
//! A [`TileKeyLayout`] turns a [`TileCoord`] into a storage key; a
//! [`TileCache`] stores encoded tiles under such keys.

pub mod disk;
pub mod memory;

use crate::error::{Error, Result};
use crate::grid::Grid;

pub use disk::DiskCache;
pub use memory::MemoryCache;

/// Extension used in keys when a tileset has no format
pub const DEFAULT_EXTENSION: &str = "png";

/// Address of one stored tile
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TileCoord {
    pub tileset: String,
    pub grid: String,
    pub x: u32,
    pub y: u32,
    pub z: u32,
    /// Dimension `(key, value)` pairs in declaration order
    pub dimensions: Vec<(String, String)>,
}

impl TileCoord {
    #[must_use]
    pub fn new(tileset: impl Into<String>, grid: impl Into<String>, z: u32, x: u32, y: u32) -> Self {
        Self {
            tileset: tileset.into(),
            grid: grid.into(),
            x,
            y,
            z,
            dimensions: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_dimension(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.dimensions.push((key.into(), value.into()));
        self
    }
}

/// Replace path separators and dots so a dimension value stays one path
/// component.
fn sanitize(value: &str) -> String {
    value
        .chars()
        .map(|c| if c == '/' || c == '.' { '#' } else { c })
        .collect()
}

/// Naming scheme of tile keys
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TileKeyLayout {
    /// `base/tileset/grid[/dim…]/z/y/x.ext`
    TileCache { base: String },
    /// Free-form template with `{tileset} {grid} {ext} {x} {inv_x} {y}
    /// {inv_y} {z} {inv_z} {dim}` tokens
    Template(String),
    /// `base/tileset/grid[/dim…]/Lzz/Rrrrrrrrr/Ccccccccc.ext`, row and column
    /// in hex
    ArcGis { base: String },
}

impl TileKeyLayout {
    /// Storage key of `coord`.
    ///
    /// `grid` supplies level sizes for the inverted-axis template tokens.
    ///
    /// # Errors
    /// [`Error::Config`] when an inverted token refers to a level the grid
    /// does not have.
    pub fn key(&self, coord: &TileCoord, grid: &Grid, extension: Option<&str>) -> Result<String> {
        let ext = extension.unwrap_or(DEFAULT_EXTENSION);
        match self {
            Self::TileCache { base } => Ok(format!(
                "{}/{}/{}/{}.{ext}",
                base_key(base, coord),
                coord.z,
                coord.y,
                coord.x
            )),
            Self::ArcGis { base } => Ok(format!(
                "{}/L{:02}/R{:08x}/C{:08x}.{ext}",
                base_key(base, coord),
                coord.z,
                coord.y,
                coord.x
            )),
            Self::Template(template) => template_key(template, coord, grid, ext),
        }
    }
}

/// `base/tileset/grid` followed by sanitized dimension values, last
/// declared first.
fn base_key(base: &str, coord: &TileCoord) -> String {
    let mut key = format!("{base}/{}/{}", coord.tileset, coord.grid);
    for (_, value) in coord.dimensions.iter().rev() {
        key.push('/');
        key.push_str(&sanitize(value));
    }
    key
}

fn template_key(template: &str, coord: &TileCoord, grid: &Grid, ext: &str) -> Result<String> {
    let levels = || {
        grid.levels(coord.z).ok_or_else(|| {
            Error::Config(format!(
                "tile level {} is outside grid \"{}\"",
                coord.z, grid.name
            ))
        })
    };

    let mut key = template
        .replace("{tileset}", &coord.tileset)
        .replace("{grid}", &coord.grid)
        .replace("{ext}", ext);

    if key.contains("{x}") {
        key = key.replace("{x}", &coord.x.to_string());
    } else if key.contains("{inv_x}") {
        let (cols, _) = levels()?;
        let inv = i64::from(cols) - i64::from(coord.x) - 1;
        key = key.replace("{inv_x}", &inv.to_string());
    }

    if key.contains("{y}") {
        key = key.replace("{y}", &coord.y.to_string());
    } else if key.contains("{inv_y}") {
        let (_, rows) = levels()?;
        let inv = i64::from(rows) - i64::from(coord.y) - 1;
        key = key.replace("{inv_y}", &inv.to_string());
    }

    if key.contains("{z}") {
        key = key.replace("{z}", &coord.z.to_string());
    } else if key.contains("{inv_z}") {
        let inv = grid.nlevels() as i64 - i64::from(coord.z) - 1;
        key = key.replace("{inv_z}", &inv.to_string());
    }

    if !coord.dimensions.is_empty() {
        let dims: String = coord
            .dimensions
            .iter()
            .rev()
            .map(|(k, v)| format!("#{k}#{}", sanitize(v)))
            .collect();
        key = key.replace("{dim}", &dims);
    }
    Ok(key)
}

/// Byte-buffer storage of encoded tiles
pub trait TileCache: Send + Sync {
    /// # Errors
    /// Backend failures other than a missing tile.
    fn exists(&self, key: &str) -> Result<bool>;

    /// Stored bytes, or `None` on a miss.
    ///
    /// # Errors
    /// Backend failures other than a missing tile.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// # Errors
    /// The tile could not be stored.
    fn put(&self, key: &str, data: &[u8]) -> Result<()>;

    /// Remove a tile; removing a missing tile succeeds.
    ///
    /// # Errors
    /// Backend failures other than a missing tile.
    fn delete(&self, key: &str) -> Result<()>;
}

/// The available storage backends
#[derive(Debug)]
pub enum CacheBackend {
    Disk(DiskCache),
    Memory(MemoryCache),
}

impl CacheBackend {
    fn inner(&self) -> &dyn TileCache {
        match self {
            Self::Disk(c) => c,
            Self::Memory(c) => c,
        }
    }
}

impl TileCache for CacheBackend {
    fn exists(&self, key: &str) -> Result<bool> {
        self.inner().exists(key)
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.inner().get(key)
    }

    fn put(&self, key: &str, data: &[u8]) -> Result<()> {
        self.inner().put(key, data)
    }

    fn delete(&self, key: &str) -> Result<()> {
        self.inner().delete(key)
    }
}
