//! Tile compositor: renders one destination tile from a dataset.
//!
//! # Architecture
//!
//! ```text
//! TileRequest ─► geo-reference (src + dst) ─► coordinate transforms
//!                                              │
//!                          SourceWindowResolver ◄┘
//!                                │ NoOverlap / Degenerate ─► blank tile
//!                                ▼
//!                 Dataset::read_region (working resolution)
//!                                │
//!                                ▼
//!          per destination pixel: dst affine ─► back transform
//!             ─► validity extent ─► src inverse affine ─► window/scale
//!             ─► sampler (RGBA or packed f32)
//! ```
//!
//! Every call owns its buffers; nothing is shared between calls.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::casting::{clamp_to_extent, floor_to_pixel};
use crate::dataset::{alloc_buffer, Dataset, PixelType};
use crate::error::{Error, Result, TransformSide};
use crate::geometry::affine::{AffineTransform, GeoReference};
use crate::geometry::projection::{CoordTransform, SpatialRef, Transformer, EPSG_WGS84};
use crate::geometry::Extent;
use crate::sampler::{pack_elevation, ImageBuffer, NumericBuffer, Rgba, TRANSPARENT};
use crate::window::{SourceWindow, SourceWindowResolver, WindowResolution, DEFAULT_QUALITY};

/// Output kind of a render
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    /// RGBA imagery
    Image,
    /// One `f32` height per pixel, little-endian bytes
    Elevation,
}

/// Resampling used for byte imagery
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resampling {
    #[default]
    Nearest,
    Bilinear,
}

/// Tuning of the render loop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Oversampling factor of the working read buffer
    pub quality: f64,
    pub resampling: Resampling,
    /// Fill colour of image tiles that do not overlap the dataset
    pub blank_color: Rgba,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            quality: DEFAULT_QUALITY,
            resampling: Resampling::Nearest,
            blank_color: TRANSPARENT,
        }
    }
}

impl RenderOptions {
    #[must_use]
    pub fn with_quality(mut self, quality: f64) -> Self {
        self.quality = quality;
        self
    }

    #[must_use]
    pub fn with_resampling(mut self, resampling: Resampling) -> Self {
        self.resampling = resampling;
        self
    }

    #[must_use]
    pub fn with_blank_color(mut self, color: Rgba) -> Self {
        self.blank_color = color;
        self
    }
}

/// One tile to render
#[derive(Debug, Clone, PartialEq)]
pub struct TileRequest {
    /// Tile extent in the destination reference system
    pub extent: Extent,
    /// Output size in pixels
    pub width: usize,
    pub height: usize,
    /// Destination reference system
    pub srs: SpatialRef,
    pub mode: RenderMode,
    /// WGS84 extent (degrees) of the dataset; source pixels outside it are
    /// left empty
    pub valid_extent: Option<Extent>,
    /// Overrides the dataset's own reference system
    pub source_srs: Option<String>,
    /// Normalized position of the tile inside its grid (elevation tiles)
    pub sub_extent: Option<Extent>,
}

impl TileRequest {
    /// Image tile request
    #[must_use]
    pub fn image(extent: Extent, width: usize, height: usize, srs: SpatialRef) -> Self {
        Self {
            extent,
            width,
            height,
            srs,
            mode: RenderMode::Image,
            valid_extent: None,
            source_srs: None,
            sub_extent: None,
        }
    }

    /// Elevation tile request of `block × block` heights
    #[must_use]
    pub fn elevation(extent: Extent, block: usize, srs: SpatialRef, sub_extent: Extent) -> Self {
        Self {
            mode: RenderMode::Elevation,
            sub_extent: Some(sub_extent),
            ..Self::image(extent, block, block, srs)
        }
    }

    #[must_use]
    pub fn with_valid_extent(mut self, extent: Option<Extent>) -> Self {
        self.valid_extent = extent;
        self
    }

    #[must_use]
    pub fn with_source_srs(mut self, srs: Option<String>) -> Self {
        self.source_srs = srs;
        self
    }
}

/// Rendered tile: 4 bytes per pixel, row-major.
///
/// Image tiles hold RGBA; elevation tiles hold little-endian `f32` heights.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterTile {
    pub width: usize,
    pub height: usize,
    pub mode: RenderMode,
    pub data: Vec<u8>,
    /// Normalized sub-extent inside the grid (elevation tiles)
    pub sub_extent: Option<Extent>,
}

impl RasterTile {
    /// Image tile with every pixel set to `color`
    #[must_use]
    pub fn filled(width: usize, height: usize, color: Rgba) -> Self {
        Self {
            width,
            height,
            mode: RenderMode::Image,
            data: color.repeat(width * height),
            sub_extent: None,
        }
    }

    /// Elevation tile of zero heights
    #[must_use]
    pub fn flat(width: usize, height: usize, sub_extent: Option<Extent>) -> Self {
        Self {
            width,
            height,
            mode: RenderMode::Elevation,
            data: vec![0; width * height * 4],
            sub_extent,
        }
    }

    /// Elevation tile from heights (row-major).
    ///
    /// # Errors
    /// [`Error::Format`] if `heights.len() != width * height`.
    pub fn from_heights(width: usize, height: usize, heights: &[f32], sub_extent: Option<Extent>) -> Result<Self> {
        if heights.len() != width * height {
            return Err(Error::Format(format!(
                "expected {} heights for {width}x{height}, got {}",
                width * height,
                heights.len()
            )));
        }
        Ok(Self {
            width,
            height,
            mode: RenderMode::Elevation,
            data: heights.iter().flat_map(|h| pack_elevation(*h)).collect(),
            sub_extent,
        })
    }

    #[must_use]
    pub fn is_elevation(&self) -> bool {
        self.mode == RenderMode::Elevation
    }

    /// RGBA at `(x, y)` of an image tile
    #[must_use]
    pub fn pixel(&self, x: usize, y: usize) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let start = (y * self.width + x) * 4;
        self.data.get(start..start + 4)?.try_into().ok()
    }

    /// Height at `(x, y)` of an elevation tile
    #[must_use]
    pub fn elevation(&self, x: usize, y: usize) -> Option<f32> {
        self.pixel(x, y).map(f32::from_le_bytes)
    }

    /// All heights, row-major
    #[must_use]
    pub fn heights(&self) -> Vec<f32> {
        self.data
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect()
    }
}

/// Decoded working buffer
enum WorkingBuffer<'a> {
    Image(ImageBuffer<'a>),
    Numeric(NumericBuffer<'a>),
}

/// Renders tiles with fixed [`RenderOptions`]
#[derive(Debug, Clone, Default)]
pub struct TileCompositor {
    options: RenderOptions,
}

impl TileCompositor {
    #[must_use]
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    #[must_use]
    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Render `request` from `dataset`.
    ///
    /// A tile outside the dataset is not an error: it comes back blank
    /// (`blank_color` for images, zero heights for elevation).
    ///
    /// # Errors
    /// Singular geo-transforms, unparseable or untransformable reference
    /// systems, unsupported band counts and failed reads.
    pub fn render(&self, dataset: &dyn Dataset, request: &TileRequest) -> Result<RasterTile> {
        if request.width == 0 || request.height == 0 {
            return Err(Error::Config(format!(
                "tile size {}x{} must be positive",
                request.width, request.height
            )));
        }
        let info = dataset.info();

        let source = GeoReference::new(info.geo_transform, TransformSide::Source)?;
        let destination = GeoReference::new(
            AffineTransform::from_extent(&request.extent, request.width, request.height),
            TransformSide::Destination,
        )?;

        let source_srs = match request.source_srs.as_deref().or(info.srs.as_deref()) {
            Some(srs) => SpatialRef::parse(srs)?,
            None => {
                return Err(Error::SpatialReference {
                    srs: String::new(),
                    reason: "dataset has no spatial reference".to_string(),
                })
            }
        };
        let (_forward, back) = Transformer::pair(&source_srs, &request.srs)?;
        let to_geographic = match request.valid_extent {
            Some(_) => Some(Transformer::new(&source_srs, &SpatialRef::from_epsg(EPSG_WGS84)?)?),
            None => None,
        };

        let resolver =
            SourceWindowResolver::new(&source, info.width, info.height).with_quality(self.options.quality);
        let window = match resolver.resolve(&destination.forward, &back, request.width, request.height) {
            WindowResolution::Window(window) => window,
            WindowResolution::NoOverlap | WindowResolution::Degenerate => return Ok(self.blank(request)),
        };

        let read_type = match (info.bands, request.mode) {
            (1, _) => info.pixel_type,
            (3 | 4, RenderMode::Image) => PixelType::Byte,
            (bands, _) => return Err(Error::UnsupportedBandCount(bands)),
        };
        let buffer = dataset.read_region(&window.region(), window.work_width, window.work_height, read_type)?;
        let working = if info.bands == 1 {
            WorkingBuffer::Numeric(NumericBuffer::new(
                &buffer,
                window.work_width,
                window.work_height,
                read_type,
                info.nodata,
            ))
        } else {
            WorkingBuffer::Image(ImageBuffer::new(&buffer, window.work_width, window.work_height, info.bands))
        };

        let len = request.width * request.height * 4;
        let mut data = alloc_buffer(len)?;
        data.resize(len, 0);

        let mapping = PixelMapping {
            destination: &destination,
            source: &source,
            back: &back,
            window: &window,
            source_width: info.width as f64,
            source_height: info.height as f64,
            validity: request.valid_extent.as_ref().zip(to_geographic.as_ref()),
        };

        let mut failed = 0_usize;
        for y in 0..request.height {
            for x in 0..request.width {
                let Some((wx, wy)) = mapping.working_coordinate(x, y) else {
                    failed += 1;
                    continue;
                };
                let out = &mut data[(y * request.width + x) * 4..][..4];
                match (&working, request.mode) {
                    (WorkingBuffer::Numeric(numeric), RenderMode::Elevation) => {
                        let h = numeric.sample_elevation(floor_to_pixel(wx), floor_to_pixel(wy));
                        out.copy_from_slice(&pack_elevation(h));
                    }
                    (WorkingBuffer::Numeric(numeric), RenderMode::Image) => {
                        out.copy_from_slice(&numeric.sample_color(floor_to_pixel(wx), floor_to_pixel(wy)));
                    }
                    (WorkingBuffer::Image(image), _) => {
                        let rgba = match self.options.resampling {
                            Resampling::Nearest => image.sample(floor_to_pixel(wx), floor_to_pixel(wy)),
                            Resampling::Bilinear => image.sample_bilinear(wx, wy),
                        };
                        out.copy_from_slice(&rgba);
                    }
                }
            }
        }
        if failed > 0 {
            debug!(failed, "Pixels skipped (transform failed or outside valid extent)");
        }

        Ok(RasterTile {
            width: request.width,
            height: request.height,
            mode: request.mode,
            data,
            sub_extent: request.sub_extent,
        })
    }

    /// Blank tile for a request that does not overlap its dataset
    #[must_use]
    pub fn blank(&self, request: &TileRequest) -> RasterTile {
        match request.mode {
            RenderMode::Image => RasterTile::filled(request.width, request.height, self.options.blank_color),
            RenderMode::Elevation => RasterTile::flat(request.width, request.height, request.sub_extent),
        }
    }
}

/// Destination pixel → working-buffer coordinate chain
struct PixelMapping<'a> {
    destination: &'a GeoReference,
    source: &'a GeoReference,
    back: &'a Transformer,
    window: &'a SourceWindow,
    source_width: f64,
    source_height: f64,
    /// WGS84 extent outside which source pixels stay empty, and the
    /// transform from the source reference system into WGS84
    validity: Option<(&'a Extent, &'a Transformer)>,
}

impl PixelMapping<'_> {
    /// `None` if the pixel must stay empty.
    #[inline(always)]
    fn working_coordinate(&self, x: usize, y: usize) -> Option<(f64, f64)> {
        let (wx, wy) = self.destination.to_world(x as f64, y as f64);
        let (sx, sy) = self.back.transform(wx, wy).ok()?;
        if let Some((valid, to_geographic)) = self.validity {
            let (lon, lat) = if to_geographic.is_identity() {
                (sx, sy)
            } else {
                to_geographic.transform(sx, sy).ok()?
            };
            if !valid.contains(lon, lat) {
                return None;
            }
        }

        let (px, py) = self.source.to_pixel(sx, sy);
        let (mut work_x, mut work_y) = self.window.to_working(px, py);

        // Inside the dataset (up to 0.5 pixel past its edge) the position is
        // clamped into the working buffer. That also pulls in points that lie
        // in the dataset but outside the window, since the window stops one
        // pixel short of the raster edge.
        if px >= -0.5 && px <= self.source_width + 0.5 && py >= -0.5 && py <= self.source_height + 0.5 {
            work_x = clamp_to_extent(work_x, self.window.work_width);
            work_y = clamp_to_extent(work_y, self.window.work_height);
        }
        Some((work_x, work_y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{DatasetInfo, MemoryDataset, PixelRegion};
    use crate::geometry::HALF_EARTH;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts `read_region` calls
    struct CountingDataset {
        inner: MemoryDataset,
        reads: AtomicUsize,
    }

    impl CountingDataset {
        fn new(inner: MemoryDataset) -> Self {
            Self { inner, reads: AtomicUsize::new(0) }
        }
    }

    impl Dataset for CountingDataset {
        fn info(&self) -> &DatasetInfo {
            self.inner.info()
        }

        fn read_region(
            &self,
            region: &PixelRegion,
            out_width: usize,
            out_height: usize,
            pixel_type: PixelType,
        ) -> Result<Vec<u8>> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            self.inner.read_region(region, out_width, out_height, pixel_type)
        }
    }

    fn mercator() -> SpatialRef {
        SpatialRef::from_epsg(3857).unwrap()
    }

    fn info(extent: &Extent, size: usize, bands: usize, pixel_type: PixelType) -> DatasetInfo {
        DatasetInfo {
            width: size,
            height: size,
            bands,
            pixel_type,
            nodata: None,
            geo_transform: AffineTransform::from_extent(extent, size, size),
            srs: Some("EPSG:3857".to_string()),
        }
    }

    fn white_world() -> MemoryDataset {
        MemoryDataset::filled(info(&Extent::web_mercator(), 256, 3, PixelType::Byte), &[255.0; 3]).unwrap()
    }

    #[test]
    fn test_full_extent_white_tile() {
        let ds = white_world();
        let request = TileRequest::image(Extent::web_mercator(), 256, 256, mercator());
        let tile = TileCompositor::default().render(&ds, &request).unwrap();

        assert_eq!((tile.width, tile.height), (256, 256));
        assert!(!tile.is_elevation());
        assert!(tile.data.chunks_exact(4).all(|px| px == [255, 255, 255, 255]));
    }

    #[test]
    fn test_outside_tile_is_blank_without_read() {
        let ds = CountingDataset::new(
            MemoryDataset::filled(
                info(&Extent::new(0.0, 0.0, 1_000_000.0, 1_000_000.0), 64, 3, PixelType::Byte),
                &[255.0; 3],
            )
            .unwrap(),
        );
        let request = TileRequest::image(Extent::new(-HALF_EARTH, -HALF_EARTH, -HALF_EARTH / 2.0, 0.0), 256, 256, mercator());

        let tile = TileCompositor::default().render(&ds, &request).unwrap();
        assert_eq!(tile.data.len(), 256 * 256 * 4);
        assert!(tile.data.iter().all(|b| *b == 0));
        assert_eq!(ds.reads.load(Ordering::SeqCst), 0);

        let solid = TileCompositor::new(RenderOptions::default().with_blank_color([0, 0, 255, 255]));
        let tile = solid.render(&ds, &request).unwrap();
        assert!(tile.data.chunks_exact(4).all(|px| px == [0, 0, 255, 255]));
        assert_eq!(ds.reads.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_elevation_nodata_packs_zero() {
        let extent = Extent::new(0.0, 0.0, 64_000.0, 64_000.0);
        let mut dem_info = info(&extent, 64, 1, PixelType::Float32);
        dem_info.nodata = Some(-9999.0);
        let mut dem = MemoryDataset::filled(dem_info, &[1500.0]).unwrap();
        // western half is no-data
        for y in 0..64 {
            for x in 0..32 {
                dem.set_pixel(x, y, &[-9999.0]);
            }
        }

        let request = TileRequest::elevation(extent, 17, mercator(), Extent::new(0.0, 0.0, 0.01, 0.01));
        let tile = TileCompositor::default().render(&dem, &request).unwrap();

        assert!(tile.is_elevation());
        assert_eq!((tile.width, tile.height), (17, 17));
        assert_eq!(tile.sub_extent, Some(Extent::new(0.0, 0.0, 0.01, 0.01)));
        // first column lies in the no-data half
        let bytes: [u8; 4] = tile.data[..4].try_into().unwrap();
        assert_eq!(f32::from_le_bytes(bytes), 0.0);
        assert_eq!(tile.elevation(2, 8), Some(0.0));
        assert_eq!(tile.elevation(14, 8), Some(1500.0));
    }

    #[test]
    fn test_elevation_outside_is_flat() {
        let dem = MemoryDataset::filled(
            info(&Extent::new(0.0, 0.0, 1000.0, 1000.0), 8, 1, PixelType::Int16),
            &[10.0],
        )
        .unwrap();
        let request = TileRequest::elevation(
            Extent::new(-5000.0, -5000.0, -4000.0, -4000.0),
            9,
            mercator(),
            Extent::new(-0.1, -0.1, 0.0, 0.0),
        );
        let tile = TileCompositor::default().render(&dem, &request).unwrap();
        assert_eq!(tile.heights(), vec![0.0; 81]);
        assert_eq!(tile.sub_extent, Some(Extent::new(-0.1, -0.1, 0.0, 0.0)));
    }

    #[test]
    fn test_unsupported_band_count() {
        let two_band =
            MemoryDataset::filled(info(&Extent::web_mercator(), 16, 2, PixelType::Byte), &[1.0, 2.0]).unwrap();
        let request = TileRequest::image(Extent::web_mercator(), 16, 16, mercator());
        assert!(matches!(
            TileCompositor::default().render(&two_band, &request),
            Err(Error::UnsupportedBandCount(2))
        ));

        let rgb = white_world();
        let request = TileRequest::elevation(Extent::web_mercator(), 9, mercator(), Extent::new(-1.0, -1.0, 1.0, 1.0));
        assert!(matches!(
            TileCompositor::default().render(&rgb, &request),
            Err(Error::UnsupportedBandCount(3))
        ));
    }

    #[test]
    fn test_singular_source_transform() {
        let mut bad = info(&Extent::web_mercator(), 16, 3, PixelType::Byte);
        bad.geo_transform = AffineTransform::new([0.0; 6]);
        let ds = MemoryDataset::filled(bad, &[1.0, 2.0, 3.0]).unwrap();
        let request = TileRequest::image(Extent::web_mercator(), 16, 16, mercator());
        assert!(matches!(
            TileCompositor::default().render(&ds, &request),
            Err(Error::SingularTransform(TransformSide::Source))
        ));
    }

    #[test]
    fn test_missing_source_srs() {
        let mut no_srs = info(&Extent::web_mercator(), 16, 3, PixelType::Byte);
        no_srs.srs = None;
        let ds = MemoryDataset::filled(no_srs, &[1.0, 2.0, 3.0]).unwrap();
        let request = TileRequest::image(Extent::web_mercator(), 16, 16, mercator());
        assert!(matches!(
            TileCompositor::default().render(&ds, &request),
            Err(Error::SpatialReference { .. })
        ));

        // an override fills the gap
        let request = request.with_source_srs(Some("EPSG:3857".to_string()));
        assert!(TileCompositor::default().render(&ds, &request).is_ok());
    }

    #[test]
    fn test_valid_extent_in_degrees_on_mercator_dataset() {
        let ds = white_world();

        // the whole Mercator square in degrees keeps every pixel
        let request = TileRequest::image(Extent::web_mercator(), 64, 64, mercator())
            .with_valid_extent(Some(Extent::new(-180.0, -85.06, 180.0, 85.06)));
        let tile = TileCompositor::default().render(&ds, &request).unwrap();
        assert_eq!(tile.pixel(10, 10), Some([255, 255, 255, 255]));
        assert!(tile.data.chunks_exact(4).all(|px| px == [255, 255, 255, 255]));

        // the eastern hemisphere only
        let request = request.with_valid_extent(Some(Extent::new(0.0, -85.06, 180.0, 85.06)));
        let tile = TileCompositor::default().render(&ds, &request).unwrap();
        assert_eq!(tile.pixel(10, 32), Some(TRANSPARENT));
        assert_eq!(tile.pixel(50, 32), Some([255, 255, 255, 255]));
    }

    #[test]
    fn test_valid_extent_on_geographic_dataset_rendered_to_mercator() {
        let extent = Extent::new(0.0, 40.0, 20.0, 60.0);
        let mut geo_info = info(&extent, 200, 3, PixelType::Byte);
        geo_info.srs = Some("EPSG:4326".to_string());
        let ds = MemoryDataset::filled(geo_info, &[255.0; 3]).unwrap();

        // tile spans roughly 4.5°E to 13.5°E; only up to 10°E is valid
        let tile_extent = Extent::new(500_000.0, 5_500_000.0, 1_500_000.0, 6_500_000.0);
        let request = TileRequest::image(tile_extent, 32, 32, mercator())
            .with_valid_extent(Some(Extent::new(0.0, 40.0, 10.0, 60.0)));
        let tile = TileCompositor::default().render(&ds, &request).unwrap();
        assert_eq!(tile.pixel(8, 16), Some([255, 255, 255, 255]));
        assert_eq!(tile.pixel(28, 16), Some(TRANSPARENT));
    }

    #[test]
    fn test_grayscale_image_uses_spectrum() {
        let extent = Extent::new(0.0, 0.0, 1000.0, 1000.0);
        let dem = MemoryDataset::filled(info(&extent, 10, 1, PixelType::UInt16), &[8000.0]).unwrap();
        let request = TileRequest::image(extent, 8, 8, mercator());
        let tile = TileCompositor::default().render(&dem, &request).unwrap();
        assert_eq!(tile.pixel(4, 4), Some([255, 0, 0, 255]));
    }

    #[test]
    fn test_reprojected_render_from_geographic() {
        // a white WGS84 dataset covering Europe, rendered into a Mercator tile inside it
        let extent = Extent::new(0.0, 40.0, 20.0, 60.0);
        let mut geo_info = info(&extent, 200, 4, PixelType::Byte);
        geo_info.srs = Some("EPSG:4326".to_string());
        let ds = MemoryDataset::filled(geo_info, &[255.0, 255.0, 255.0, 200.0]).unwrap();

        let tile_extent = Extent::new(500_000.0, 5_500_000.0, 1_500_000.0, 6_500_000.0);
        let request = TileRequest::image(tile_extent, 32, 32, mercator());
        let tile = TileCompositor::new(RenderOptions::default().with_resampling(Resampling::Bilinear))
            .render(&ds, &request)
            .unwrap();
        assert_eq!(tile.pixel(16, 16), Some([255, 255, 255, 200]));
    }

    #[test]
    fn test_raster_tile_helpers() {
        let tile = RasterTile::from_heights(2, 2, &[1.0, 2.0, 3.0, 4.0], None).unwrap();
        assert_eq!(tile.elevation(1, 1), Some(4.0));
        assert_eq!(tile.heights(), vec![1.0, 2.0, 3.0, 4.0]);
        assert!(RasterTile::from_heights(2, 2, &[1.0], None).is_err());

        let filled = RasterTile::filled(3, 1, [1, 2, 3, 4]);
        assert_eq!(filled.data, vec![1, 2, 3, 4, 1, 2, 3, 4, 1, 2, 3, 4]);
        assert_eq!(filled.pixel(3, 0), None);
    }
}
