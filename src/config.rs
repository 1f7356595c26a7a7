//! TOML configuration of grids, tilesets, sources and caches.
//!
//! ```toml
//! [[tilesets]]
//! name = "dem"
//! grid = "GoogleMapsCompatible"
//! format = "json"
//! elevation = true
//!
//! [tilesets.source]
//! data = "/data/dem.tif"
//! srs = "EPSG:21781"
//! extent = "5.9 45.8 10.5 47.8"
//!
//! [tilesets.cache]
//! kind = "disk"
//! layout = "tilecache"
//! base = "/var/cache/tiles"
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::cache::memory::DEFAULT_CAPACITY_BYTES;
use crate::cache::{CacheBackend, DiskCache, MemoryCache, TileKeyLayout};
use crate::compositor::RenderOptions;
use crate::error::{Error, Result};
use crate::format::ImageFormat;
use crate::geometry::Extent;
use crate::grid::Grid;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Grids in addition to the built-in `GoogleMapsCompatible` and `WGS84`
    #[serde(default)]
    pub grids: Vec<Grid>,
    #[serde(default)]
    pub tilesets: Vec<TilesetConfig>,
}

impl Config {
    /// Parse and validate a TOML document.
    ///
    /// # Errors
    /// [`Error::Config`] on syntax errors or inconsistent settings.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Config = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    /// I/O failures reading `path`, otherwise as [`Config::from_toml_str`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Grid by name; configured grids shadow the built-in ones.
    #[must_use]
    pub fn grid(&self, name: &str) -> Option<Grid> {
        if let Some(grid) = self.grids.iter().find(|g| g.name == name) {
            return Some(grid.clone());
        }
        [Grid::web_mercator(), Grid::wgs84()]
            .into_iter()
            .find(|g| g.name == name)
    }

    #[must_use]
    pub fn tileset(&self, name: &str) -> Option<&TilesetConfig> {
        self.tilesets.iter().find(|t| t.name == name)
    }

    fn validate(&self) -> Result<()> {
        for (i, tileset) in self.tilesets.iter().enumerate() {
            if self.tilesets[..i].iter().any(|t| t.name == tileset.name) {
                return Err(Error::Config(format!("duplicate tileset \"{}\"", tileset.name)));
            }
            if self.grid(&tileset.grid).is_none() {
                return Err(Error::Config(format!(
                    "tileset \"{}\" references unknown grid \"{}\"",
                    tileset.name, tileset.grid
                )));
            }
            tileset.source.valid_extent()?;
            tileset.cache.key_layout()?;
        }
        Ok(())
    }
}

fn default_grid() -> String {
    Grid::web_mercator().name
}

#[derive(Debug, Clone, Deserialize)]
pub struct TilesetConfig {
    pub name: String,
    #[serde(default = "default_grid")]
    pub grid: String,
    #[serde(default = "default_format")]
    pub format: ImageFormat,
    /// Render elevation tiles instead of imagery
    #[serde(default)]
    pub elevation: bool,
    pub source: SourceConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub options: RenderOptions,
}

fn default_format() -> ImageFormat {
    ImageFormat::Raw
}

/// Dataset a tileset renders from
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    pub data: PathBuf,
    /// Replaces the reference system stored in the dataset
    #[serde(default)]
    pub srs: Option<String>,
    /// `"minx miny maxx maxy"` in WGS84 degrees, as printed by
    /// `tilewarp-calcextent`; source pixels outside it stay empty
    #[serde(default)]
    pub extent: Option<String>,
}

impl SourceConfig {
    #[must_use]
    pub fn new(data: impl Into<PathBuf>) -> Self {
        Self {
            data: data.into(),
            srs: None,
            extent: None,
        }
    }

    /// # Errors
    /// [`Error::Config`] when `extent` is not four ordered numbers.
    pub fn valid_extent(&self) -> Result<Option<Extent>> {
        self.extent.as_deref().map(str::parse::<Extent>).transpose()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheKind {
    Disk,
    #[default]
    Memory,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutKind {
    #[default]
    TileCache,
    Template,
    ArcGis,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CacheConfig {
    #[serde(default)]
    pub kind: CacheKind,
    #[serde(default)]
    pub layout: LayoutKind,
    /// Key prefix for the `tilecache` and `arcgis` layouts
    #[serde(default)]
    pub base: Option<String>,
    /// Key template for the `template` layout
    #[serde(default)]
    pub template: Option<String>,
    /// Upper bound of a memory cache
    #[serde(default = "default_capacity")]
    pub capacity_bytes: usize,
}

fn default_capacity() -> usize {
    DEFAULT_CAPACITY_BYTES
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            kind: CacheKind::default(),
            layout: LayoutKind::default(),
            base: None,
            template: None,
            capacity_bytes: DEFAULT_CAPACITY_BYTES,
        }
    }
}

impl CacheConfig {
    /// # Errors
    /// [`Error::Config`] when the layout lacks its template, or a disk
    /// cache lacks a base directory.
    pub fn key_layout(&self) -> Result<TileKeyLayout> {
        let base = || match (&self.base, self.kind) {
            (Some(base), _) if !base.is_empty() => Ok(base.clone()),
            (_, CacheKind::Memory) => Ok(String::new()),
            (_, CacheKind::Disk) => Err(Error::Config(
                "disk cache has no base directory or template".to_string(),
            )),
        };
        match self.layout {
            LayoutKind::TileCache => Ok(TileKeyLayout::TileCache { base: base()? }),
            LayoutKind::ArcGis => Ok(TileKeyLayout::ArcGis { base: base()? }),
            LayoutKind::Template => match &self.template {
                Some(t) if !t.is_empty() => Ok(TileKeyLayout::Template(t.clone())),
                _ => Err(Error::Config("no template specified for cache".to_string())),
            },
        }
    }

    #[must_use]
    pub fn build(&self) -> CacheBackend {
        match self.kind {
            CacheKind::Disk => CacheBackend::Disk(DiskCache::new()),
            CacheKind::Memory => CacheBackend::Memory(MemoryCache::new(self.capacity_bytes)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compositor::Resampling;

    const SAMPLE: &str = r#"
        [[grids]]
        name = "swiss"
        srs = "EPSG:21781"
        extent = { minx = 420000.0, miny = 30000.0, maxx = 900000.0, maxy = 350000.0 }
        tile_width = 256
        tile_height = 256
        resolutions = [4000.0, 2000.0, 1000.0]

        [[tilesets]]
        name = "dem"
        format = "json"
        elevation = true

        [tilesets.source]
        data = "/data/dem.tif"
        srs = "EPSG:21781"
        extent = "5.9 45.8 10.5 47.8"

        [tilesets.cache]
        kind = "disk"
        layout = "arcgis"
        base = "/var/cache/tiles"

        [[tilesets]]
        name = "ortho"
        grid = "swiss"

        [tilesets.source]
        data = "ortho.tif"

        [tilesets.options]
        quality = 1.5
        resampling = "bilinear"
    "#;

    #[test]
    fn test_parse_sample() {
        let config = Config::from_toml_str(SAMPLE).unwrap();
        assert_eq!(config.tilesets.len(), 2);

        let dem = config.tileset("dem").unwrap();
        assert_eq!(dem.grid, "GoogleMapsCompatible");
        assert_eq!(dem.format, ImageFormat::Json);
        assert!(dem.elevation);
        assert_eq!(
            dem.source.valid_extent().unwrap(),
            Some(Extent::new(5.9, 45.8, 10.5, 47.8))
        );
        assert_eq!(
            dem.cache.key_layout().unwrap(),
            TileKeyLayout::ArcGis { base: "/var/cache/tiles".into() }
        );

        let ortho = config.tileset("ortho").unwrap();
        assert_eq!(ortho.format, ImageFormat::Raw);
        assert_eq!(ortho.cache.kind, CacheKind::Memory);
        assert_eq!(ortho.options.resampling, Resampling::Bilinear);
        assert!((ortho.options.quality - 1.5).abs() < f64::EPSILON);
        assert_eq!(config.grid("swiss").unwrap().nlevels(), 3);
        assert!(config.grid("WGS84").is_some());
    }

    #[test]
    fn test_unknown_grid_rejected() {
        let err = Config::from_toml_str(
            r#"
            [[tilesets]]
            name = "a"
            grid = "nope"
            source = { data = "a.tif" }
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("unknown grid"));
    }

    #[test]
    fn test_malformed_extent_rejected() {
        let err = Config::from_toml_str(
            r#"
            [[tilesets]]
            name = "a"
            source = { data = "a.tif", extent = "1 2 3" }
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_duplicate_tileset_rejected() {
        let err = Config::from_toml_str(
            r#"
            [[tilesets]]
            name = "a"
            source = { data = "a.tif" }
            [[tilesets]]
            name = "a"
            source = { data = "b.tif" }
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn test_cache_layout_requirements() {
        let template = CacheConfig {
            layout: LayoutKind::Template,
            ..CacheConfig::default()
        };
        assert!(template.key_layout().is_err());

        let disk = CacheConfig {
            kind: CacheKind::Disk,
            ..CacheConfig::default()
        };
        assert!(disk.key_layout().is_err());

        let memory = CacheConfig::default();
        assert_eq!(
            memory.key_layout().unwrap(),
            TileKeyLayout::TileCache { base: String::new() }
        );
        assert!(matches!(memory.build(), CacheBackend::Memory(_)));
    }
}
