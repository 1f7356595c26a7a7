//! GeoTIFF dataset provider.
//!
//! Opens the first image of a (Geo)TIFF with the `tiff` crate and keeps the
//! decoder open. Region reads decode only the strips or tiles the window
//! touches. Geo-referencing comes from `ModelPixelScale` + `ModelTiepoint`
//! or `ModelTransformation`, the spatial reference from the GeoKey
//! directory and the no-data sentinel from `GDAL_NODATA`.

use std::collections::{BTreeSet, HashMap};
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;
use std::sync::{Mutex, PoisonError};

use tiff::decoder::{Decoder, DecodingResult};
use tiff::tags::Tag;
use tiff::ColorType;
use tracing::{debug, trace, warn};

use super::{
    alloc_buffer, buffer_len, nearest_source, Dataset, DatasetInfo, DatasetProvider, PixelRegion, PixelType,
};
use crate::error::{Error, Result};
use crate::geometry::affine::AffineTransform;

// GeoTIFF tag codes
pub(crate) const GEOTIFF_MODELPIXELSCALE: u16 = 33550;
pub(crate) const GEOTIFF_MODELTIEPOINT: u16 = 33922;
pub(crate) const GEOTIFF_MODELTRANSFORMATION: u16 = 34264;
pub(crate) const GEOTIFF_GEOKEYDIRECTORY: u16 = 34735;
pub(crate) const GDAL_NODATA: u16 = 42113;

// GeoKey IDs
pub(crate) const GEOGRAPHIC_TYPE_GEO_KEY: u16 = 2048;
pub(crate) const PROJECTED_CS_TYPE_GEO_KEY: u16 = 3072;
const USER_DEFINED: u16 = 32767;

// SampleFormat values
const SAMPLE_FORMAT_UINT: u16 = 1;
const SAMPLE_FORMAT_INT: u16 = 2;
const SAMPLE_FORMAT_IEEEFP: u16 = 3;

const PLANAR_CONFIG_SEPARATE: u16 = 2;

/// Opens GeoTIFF files from the local filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct GeoTiffProvider;

impl DatasetProvider for GeoTiffProvider {
    fn open(&self, path: &Path) -> Result<Box<dyn Dataset>> {
        let open_error = |reason: String| Error::DatasetOpen {
            path: path.to_path_buf(),
            reason,
        };
        let file = File::open(path).map_err(|e| open_error(e.to_string()))?;
        let dataset = GeoTiffDataset::new(BufReader::new(file)).map_err(|e| match e {
            Error::UnsupportedPixelType(_) => e,
            other => open_error(other.to_string()),
        })?;
        debug!(
            path = %path.display(),
            width = dataset.info().width,
            height = dataset.info().height,
            bands = dataset.info().bands,
            pixel_type = %dataset.info().pixel_type,
            chunk_width = dataset.layout.chunk_width,
            chunk_height = dataset.layout.chunk_height,
            "Opened GeoTIFF"
        );
        Ok(Box::new(dataset))
    }
}

/// Strip or tile grid of the image
#[derive(Debug, Clone, Copy)]
struct ChunkLayout {
    chunk_width: usize,
    chunk_height: usize,
    chunks_across: usize,
}

impl ChunkLayout {
    fn index(&self, col: usize, row: usize) -> Result<u32> {
        u32::try_from(row * self.chunks_across + col)
            .map_err(|_| Error::DatasetRead(format!("chunk ({col}, {row}) out of range")))
    }

    /// Width of the valid data in chunk column `col`
    fn data_width(&self, col: usize, image_width: usize) -> usize {
        self.chunk_width.min(image_width - col * self.chunk_width)
    }
}

/// GeoTIFF image read chunk by chunk from an open decoder
pub struct GeoTiffDataset<R: Read + Seek> {
    info: DatasetInfo,
    layout: ChunkLayout,
    decoder: Mutex<Decoder<R>>,
}

impl<R: Read + Seek> std::fmt::Debug for GeoTiffDataset<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeoTiffDataset")
            .field("info", &self.info)
            .field("layout", &self.layout)
            .finish_non_exhaustive()
    }
}

impl<R: Read + Seek> GeoTiffDataset<R> {
    /// Read the image header and geo tags of a GeoTIFF stream.
    ///
    /// No pixel data is decoded here.
    ///
    /// # Errors
    /// [`Error::DatasetRead`] on malformed TIFF data,
    /// [`Error::UnsupportedPixelType`] for sample layouts without a [`PixelType`].
    pub fn new(reader: R) -> Result<Self> {
        let mut decoder = Decoder::new(reader)?;
        let (width, height) = decoder.dimensions()?;

        let (bands, bits) = match decoder.colortype()? {
            ColorType::Gray(bits) => (1, bits),
            ColorType::GrayA(bits) => (2, bits),
            ColorType::RGB(bits) => (3, bits),
            ColorType::RGBA(bits) => (4, bits),
            other => return Err(Error::UnsupportedPixelType(format!("color type {other:?}"))),
        };
        let sample_format = find_u16(&mut decoder, Tag::SampleFormat)?.unwrap_or(SAMPLE_FORMAT_UINT);
        let pixel_type = pixel_type(sample_format, bits)?;
        if bands > 1 && find_u16(&mut decoder, Tag::PlanarConfiguration)? == Some(PLANAR_CONFIG_SEPARATE) {
            return Err(Error::UnsupportedPixelType("band-separate planar layout".to_string()));
        }

        let geo_transform = read_geo_transform(&mut decoder)?;
        let srs = read_srs(&mut decoder);
        let nodata = read_nodata(&mut decoder);

        let (chunk_width, chunk_height) = decoder.chunk_dimensions();
        let (chunk_width, chunk_height) = (chunk_width.max(1) as usize, chunk_height.max(1) as usize);
        let width = width as usize;
        let layout = ChunkLayout {
            chunk_width,
            chunk_height,
            chunks_across: width.div_ceil(chunk_width),
        };

        let info = DatasetInfo {
            width,
            height: height as usize,
            bands,
            pixel_type,
            nodata,
            geo_transform,
            srs,
        };
        Ok(Self {
            info,
            layout,
            decoder: Mutex::new(decoder),
        })
    }
}

impl<R: Read + Seek + Send> Dataset for GeoTiffDataset<R> {
    fn info(&self) -> &DatasetInfo {
        &self.info
    }

    fn read_region(
        &self,
        region: &PixelRegion,
        out_width: usize,
        out_height: usize,
        pixel_type: PixelType,
    ) -> Result<Vec<u8>> {
        region.validate(self.info.width, self.info.height)?;
        if out_width == 0 || out_height == 0 {
            return Err(Error::DatasetRead(format!("invalid output size {out_width}x{out_height}")));
        }

        let bands = self.info.bands;
        let layout = self.layout;
        let mut out = alloc_buffer(buffer_len(out_width, out_height, bands, pixel_type)?)?;

        let columns: Vec<usize> = (0..out_width)
            .map(|ox| nearest_source(ox, out_width, region.x_off, region.width))
            .collect();
        let chunk_cols: BTreeSet<usize> = columns.iter().map(|sx| sx / layout.chunk_width).collect();

        let mut decoder = self.decoder.lock().unwrap_or_else(PoisonError::into_inner);
        let mut chunks: HashMap<usize, DecodingResult> = HashMap::new();
        let mut loaded_row = None;

        for oy in 0..out_height {
            let sy = nearest_source(oy, out_height, region.y_off, region.height);
            let chunk_row = sy / layout.chunk_height;
            if loaded_row != Some(chunk_row) {
                chunks.clear();
                for &col in &chunk_cols {
                    let index = layout.index(col, chunk_row)?;
                    chunks.insert(col, decoder.read_chunk(index)?);
                }
                trace!(row = chunk_row, chunks = chunks.len(), "decoded GeoTIFF chunks");
                loaded_row = Some(chunk_row);
            }

            let local_y = sy % layout.chunk_height;
            for &sx in &columns {
                let col = sx / layout.chunk_width;
                let stride = layout.data_width(col, self.info.width);
                let start = (local_y * stride + sx % layout.chunk_width) * bands;
                let chunk = chunks
                    .get(&col)
                    .ok_or_else(|| Error::DatasetRead(format!("chunk column {col} not loaded")))?;
                for band in 0..bands {
                    let value = sample_at(chunk, start + band).ok_or_else(|| {
                        Error::DatasetRead(format!("pixel ({sx}, {sy}) outside decoded chunk"))
                    })?;
                    pixel_type.write(value, &mut out);
                }
            }
        }

        Ok(out)
    }
}

/// [`PixelType`] of a TIFF `SampleFormat` and bit depth
fn pixel_type(sample_format: u16, bits: u8) -> Result<PixelType> {
    match (sample_format, bits) {
        (SAMPLE_FORMAT_UINT, 8) => Ok(PixelType::Byte),
        (SAMPLE_FORMAT_INT, 8) => Ok(PixelType::Int8),
        (SAMPLE_FORMAT_UINT, 16) => Ok(PixelType::UInt16),
        (SAMPLE_FORMAT_INT, 16) => Ok(PixelType::Int16),
        (SAMPLE_FORMAT_UINT, 32) => Ok(PixelType::UInt32),
        (SAMPLE_FORMAT_INT, 32) => Ok(PixelType::Int32),
        (SAMPLE_FORMAT_IEEEFP, 32) => Ok(PixelType::Float32),
        (SAMPLE_FORMAT_IEEEFP, 64) => Ok(PixelType::Float64),
        _ => Err(Error::UnsupportedPixelType(format!(
            "{bits}-bit samples of sample format {sample_format}"
        ))),
    }
}

fn sample_at(chunk: &DecodingResult, index: usize) -> Option<f64> {
    match chunk {
        DecodingResult::U8(v) => v.get(index).copied().map(f64::from),
        DecodingResult::I8(v) => v.get(index).copied().map(f64::from),
        DecodingResult::U16(v) => v.get(index).copied().map(f64::from),
        DecodingResult::I16(v) => v.get(index).copied().map(f64::from),
        DecodingResult::U32(v) => v.get(index).copied().map(f64::from),
        DecodingResult::I32(v) => v.get(index).copied().map(f64::from),
        DecodingResult::F32(v) => v.get(index).copied().map(f64::from),
        DecodingResult::F64(v) => v.get(index).copied(),
        #[allow(unreachable_patterns)]
        _ => None,
    }
}

fn find_u16<R: Read + Seek>(decoder: &mut Decoder<R>, tag: Tag) -> Result<Option<u16>> {
    match decoder.find_tag(tag)? {
        Some(value) => Ok(value.into_u16_vec()?.first().copied()),
        None => Ok(None),
    }
}

fn read_geo_transform<R: Read + Seek>(decoder: &mut Decoder<R>) -> Result<AffineTransform> {
    if let Some(matrix) = find_f64_vec(decoder, GEOTIFF_MODELTRANSFORMATION)? {
        // 4x4 row-major model transformation
        if matrix.len() >= 8 {
            return Ok(AffineTransform::new([
                matrix[3], matrix[0], matrix[1], matrix[7], matrix[4], matrix[5],
            ]));
        }
    }

    let scale = find_f64_vec(decoder, GEOTIFF_MODELPIXELSCALE)?;
    let tiepoint = find_f64_vec(decoder, GEOTIFF_MODELTIEPOINT)?;
    match (scale, tiepoint) {
        (Some(scale), Some(tie)) if scale.len() >= 2 && tie.len() >= 6 => Ok(
            AffineTransform::from_tiepoint([scale[0], scale[1]], [tie[0], tie[1], tie[2], tie[3], tie[4], tie[5]]),
        ),
        _ => {
            warn!("GeoTIFF has no geo-referencing tags, using pixel coordinates");
            Ok(AffineTransform::new([0.0, 1.0, 0.0, 0.0, 0.0, 1.0]))
        }
    }
}

fn find_f64_vec<R: Read + Seek>(decoder: &mut Decoder<R>, code: u16) -> Result<Option<Vec<f64>>> {
    match decoder.find_tag(Tag::from_u16_exhaustive(code))? {
        Some(value) => Ok(Some(value.into_f64_vec()?)),
        None => Ok(None),
    }
}

/// EPSG code from the GeoKey directory, as `"EPSG:<code>"`.
fn read_srs<R: Read + Seek>(decoder: &mut Decoder<R>) -> Option<String> {
    let keys = decoder
        .find_tag(Tag::from_u16_exhaustive(GEOTIFF_GEOKEYDIRECTORY))
        .ok()
        .flatten()?
        .into_u16_vec()
        .ok()?;
    epsg_from_geokeys(&keys).map(|code| format!("EPSG:{code}"))
}

/// Scan a GeoKey directory for a projected or geographic EPSG code.
///
/// Projected systems take precedence. Only inline key values
/// (`TIFFTagLocation == 0`) are considered.
pub(crate) fn epsg_from_geokeys(keys: &[u16]) -> Option<u16> {
    let count = usize::from(*keys.get(3)?);
    let mut geographic = None;
    for entry in keys.get(4..)?.chunks_exact(4).take(count) {
        let (id, location, value) = (entry[0], entry[1], entry[3]);
        if location != 0 || value == 0 || value == USER_DEFINED {
            continue;
        }
        match id {
            PROJECTED_CS_TYPE_GEO_KEY => return Some(value),
            GEOGRAPHIC_TYPE_GEO_KEY => geographic = Some(value),
            _ => {}
        }
    }
    geographic
}

fn read_nodata<R: Read + Seek>(decoder: &mut Decoder<R>) -> Option<f64> {
    let text = decoder
        .find_tag(Tag::from_u16_exhaustive(GDAL_NODATA))
        .ok()
        .flatten()?
        .into_string()
        .ok()?;
    let trimmed = text.trim_matches(|c: char| c.is_whitespace() || c == '\0');
    match trimmed.parse::<f64>() {
        Ok(v) => Some(v),
        Err(e) => {
            warn!(value = %trimmed, error = %e, "Ignoring unparseable GDAL_NODATA");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tiff::encoder::{colortype, TiffEncoder};

    /// Encode a single-band float32 GeoTIFF in EPSG:3857
    fn write_dem(width: u32, height: u32, values: &[f32], nodata: Option<&str>) -> Vec<u8> {
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut encoder = TiffEncoder::new(&mut cursor).unwrap();
            let mut image = encoder.new_image::<colortype::Gray32Float>(width, height).unwrap();
            image.rows_per_strip(1).unwrap();
            let dir = image.encoder();
            let pixel_scale = [10.0_f64, 10.0, 0.0];
            dir.write_tag(Tag::Unknown(GEOTIFF_MODELPIXELSCALE), pixel_scale.as_slice()).unwrap();
            let tiepoint = [0.0_f64, 0.0, 0.0, 1000.0, 2000.0, 0.0];
            dir.write_tag(Tag::Unknown(GEOTIFF_MODELTIEPOINT), tiepoint.as_slice()).unwrap();
            let geokeys: [u16; 12] = [1, 1, 0, 2, 1024, 0, 1, 1, PROJECTED_CS_TYPE_GEO_KEY, 0, 1, 3857];
            dir.write_tag(Tag::Unknown(GEOTIFF_GEOKEYDIRECTORY), geokeys.as_slice()).unwrap();
            if let Some(nd) = nodata {
                dir.write_tag(Tag::Unknown(GDAL_NODATA), nd).unwrap();
            }
            image.write_data(values).unwrap();
        }
        cursor.into_inner()
    }

    fn read_all<R: Read + Seek + Send>(ds: &GeoTiffDataset<R>) -> Vec<f64> {
        let (w, h) = (ds.info().width, ds.info().height);
        let buf = ds
            .read_region(&PixelRegion::new(0, 0, w, h), w, h, PixelType::Float64)
            .unwrap();
        (0..w * h * ds.info().bands)
            .map(|i| PixelType::Float64.read(&buf, i).unwrap())
            .collect()
    }

    const TILED_WIDTH: usize = 40;
    const TILED_HEIGHT: usize = 24;
    const TILE: usize = 16;

    fn tiled_value(x: usize, y: usize) -> u8 {
        (x * 5 + y) as u8
    }

    /// Uncompressed little-endian 40x24 Gray8 TIFF in 16x16 tiles (3x2)
    fn write_tiled() -> Vec<u8> {
        let across = TILED_WIDTH.div_ceil(TILE);
        let down = TILED_HEIGHT.div_ceil(TILE);
        let tiles = across * down;
        let entries: u16 = 10;
        let arrays_at = 8 + 2 + usize::from(entries) * 12 + 4;
        let data_at = arrays_at + 2 * tiles * 4;

        let mut out = Vec::new();
        out.extend_from_slice(b"II");
        out.extend_from_slice(&42u16.to_le_bytes());
        out.extend_from_slice(&8u32.to_le_bytes());
        out.extend_from_slice(&entries.to_le_bytes());
        let mut entry = |tag: u16, kind: u16, count: u32, value: u32| {
            out.extend_from_slice(&tag.to_le_bytes());
            out.extend_from_slice(&kind.to_le_bytes());
            out.extend_from_slice(&count.to_le_bytes());
            out.extend_from_slice(&value.to_le_bytes());
        };
        const SHORT: u16 = 3;
        const LONG: u16 = 4;
        entry(256, SHORT, 1, TILED_WIDTH as u32);
        entry(257, SHORT, 1, TILED_HEIGHT as u32);
        entry(258, SHORT, 1, 8);
        entry(259, SHORT, 1, 1);
        entry(262, SHORT, 1, 1);
        entry(277, SHORT, 1, 1);
        entry(322, SHORT, 1, TILE as u32);
        entry(323, SHORT, 1, TILE as u32);
        entry(324, LONG, tiles as u32, arrays_at as u32);
        entry(325, LONG, tiles as u32, (arrays_at + tiles * 4) as u32);
        out.extend_from_slice(&0u32.to_le_bytes());
        assert_eq!(out.len(), arrays_at);

        for t in 0..tiles {
            out.extend_from_slice(&((data_at + t * TILE * TILE) as u32).to_le_bytes());
        }
        for _ in 0..tiles {
            out.extend_from_slice(&((TILE * TILE) as u32).to_le_bytes());
        }
        for row in 0..down {
            for col in 0..across {
                for ty in 0..TILE {
                    for tx in 0..TILE {
                        let (x, y) = (col * TILE + tx, row * TILE + ty);
                        let v = if x < TILED_WIDTH && y < TILED_HEIGHT { tiled_value(x, y) } else { 0 };
                        out.push(v);
                    }
                }
            }
        }
        out
    }

    #[test]
    fn test_tiled_window_across_tiles() {
        let ds = GeoTiffDataset::new(Cursor::new(write_tiled())).unwrap();
        assert_eq!((ds.info().width, ds.info().height, ds.info().bands), (40, 24, 1));
        assert_eq!(ds.info().pixel_type, PixelType::Byte);
        assert_eq!(ds.info().srs, None);
        assert_eq!((ds.layout.chunk_width, ds.layout.chunk_height, ds.layout.chunks_across), (16, 16, 3));

        // spans all six tiles, including the partial right column and bottom row
        let region = PixelRegion::new(10, 5, 28, 18);
        let buf = ds.read_region(&region, 28, 18, PixelType::Byte).unwrap();
        for oy in 0..18 {
            for ox in 0..28 {
                assert_eq!(buf[oy * 28 + ox], tiled_value(10 + ox, 5 + oy), "({ox}, {oy})");
            }
        }

        // 2:1 decimation picks the nearest source pixel
        let buf = ds
            .read_region(&PixelRegion::new(0, 0, 40, 24), 20, 12, PixelType::UInt16)
            .unwrap();
        assert_eq!(PixelType::UInt16.read(&buf, 0), Some(f64::from(tiled_value(1, 1))));
        assert_eq!(PixelType::UInt16.read(&buf, 12 * 20 - 1), Some(f64::from(tiled_value(39, 23))));
    }

    #[test]
    fn test_tiled_window_decodes_only_touched_tiles() {
        let mut bytes = write_tiled();
        // drop the last tile's data
        bytes.truncate(bytes.len() - TILE * TILE);
        let ds = GeoTiffDataset::new(Cursor::new(bytes)).unwrap();

        let buf = ds.read_region(&PixelRegion::new(2, 3, 8, 8), 8, 8, PixelType::Byte).unwrap();
        assert_eq!(buf[0], tiled_value(2, 3));
        assert_eq!(buf[63], tiled_value(9, 10));

        let full = ds.read_region(&PixelRegion::new(0, 0, 40, 24), 40, 24, PixelType::Byte);
        assert!(matches!(full, Err(Error::DatasetRead(_))));
    }

    #[test]
    fn test_region_outside_raster() {
        let ds = GeoTiffDataset::new(Cursor::new(write_tiled())).unwrap();
        let err = ds.read_region(&PixelRegion::new(30, 0, 20, 4), 20, 4, PixelType::Byte);
        assert!(matches!(err, Err(Error::DatasetRead(_))));
        let err = ds.read_region(&PixelRegion::new(0, 0, 4, 4), 0, 4, PixelType::Byte);
        assert!(matches!(err, Err(Error::DatasetRead(_))));
    }

    #[test]
    fn test_decode_float_dem() {
        let values: Vec<f32> = (0..12).map(|v| v as f32 * 1.5).collect();
        let bytes = write_dem(4, 3, &values, Some("-9999"));
        let ds = GeoTiffDataset::new(Cursor::new(bytes)).unwrap();
        let info = ds.info();

        assert_eq!((info.width, info.height, info.bands), (4, 3, 1));
        assert_eq!(info.pixel_type, PixelType::Float32);
        assert_eq!(info.nodata, Some(-9999.0));
        assert_eq!(info.srs.as_deref(), Some("EPSG:3857"));
        assert_eq!(info.geo_transform.apply(0.0, 0.0), (1000.0, 2000.0));
        assert_eq!(info.geo_transform.apply(4.0, 3.0), (1040.0, 1970.0));
        assert_eq!(ds.layout.chunk_height, 1);
        assert_eq!(read_all(&ds)[2 * 4 + 3], 16.5);
    }

    #[test]
    fn test_strip_window() {
        let values: Vec<f32> = (0..64).map(|v| v as f32).collect();
        let ds = GeoTiffDataset::new(Cursor::new(write_dem(8, 8, &values, None))).unwrap();
        let buf = ds
            .read_region(&PixelRegion::new(2, 3, 4, 2), 4, 2, PixelType::Float32)
            .unwrap();
        assert_eq!(PixelType::Float32.read(&buf, 0), Some(26.0));
        assert_eq!(PixelType::Float32.read(&buf, 7), Some(37.0));
    }

    #[test]
    fn test_decode_without_nodata() {
        let bytes = write_dem(2, 2, &[1.0, 2.0, 3.0, 4.0], None);
        let ds = GeoTiffDataset::new(Cursor::new(bytes)).unwrap();
        assert_eq!(ds.info().nodata, None);
        let buf = ds
            .read_region(&PixelRegion::new(0, 0, 2, 2), 2, 2, PixelType::Float32)
            .unwrap();
        assert_eq!(PixelType::Float32.read(&buf, 3), Some(4.0));
    }

    #[test]
    fn test_decode_rgb_bytes() {
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut encoder = TiffEncoder::new(&mut cursor).unwrap();
            let data = [255u8, 0, 0, 0, 255, 0];
            encoder.write_image::<colortype::RGB8>(2, 1, &data).unwrap();
        }
        let ds = GeoTiffDataset::new(Cursor::new(cursor.into_inner())).unwrap();
        assert_eq!(ds.info().bands, 3);
        assert_eq!(ds.info().pixel_type, PixelType::Byte);
        assert_eq!(ds.info().srs, None);
        assert_eq!(read_all(&ds), vec![255.0, 0.0, 0.0, 0.0, 255.0, 0.0]);
    }

    #[test]
    fn test_provider_open_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dem.tif");
        std::fs::write(&path, write_dem(2, 2, &[5.0; 4], None)).unwrap();

        let ds = GeoTiffProvider.open(&path).unwrap();
        assert_eq!(ds.info().width, 2);

        let missing = GeoTiffProvider.open(&dir.path().join("missing.tif"));
        assert!(matches!(missing, Err(Error::DatasetOpen { .. })));
    }

    #[test]
    fn test_pixel_type_from_sample_format() {
        assert_eq!(pixel_type(SAMPLE_FORMAT_INT, 16).unwrap(), PixelType::Int16);
        assert_eq!(pixel_type(SAMPLE_FORMAT_IEEEFP, 64).unwrap(), PixelType::Float64);
        assert!(matches!(pixel_type(SAMPLE_FORMAT_UINT, 64), Err(Error::UnsupportedPixelType(_))));
        assert!(matches!(pixel_type(SAMPLE_FORMAT_IEEEFP, 16), Err(Error::UnsupportedPixelType(_))));
    }

    #[test]
    fn test_epsg_from_geokeys() {
        // geographic only
        let keys = [1, 1, 0, 1, GEOGRAPHIC_TYPE_GEO_KEY, 0, 1, 4326];
        assert_eq!(epsg_from_geokeys(&keys), Some(4326));
        // projected wins over geographic
        let keys = [1, 1, 0, 2, GEOGRAPHIC_TYPE_GEO_KEY, 0, 1, 4326, PROJECTED_CS_TYPE_GEO_KEY, 0, 1, 32633];
        assert_eq!(epsg_from_geokeys(&keys), Some(32633));
        // user defined is ignored
        let keys = [1, 1, 0, 1, PROJECTED_CS_TYPE_GEO_KEY, 0, 1, USER_DEFINED];
        assert_eq!(epsg_from_geokeys(&keys), None);
        assert_eq!(epsg_from_geokeys(&[1, 1]), None);
    }
}
