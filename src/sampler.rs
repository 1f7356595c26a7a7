//! Per-pixel decoding of working buffers.
//!
//! Two independent pipelines live here:
//! - visualization: byte RGB/RGBA imagery, or numeric samples mapped through a
//!   visible-spectrum ramp, producing RGBA;
//! - elevation: numeric samples passed through as `f32` heights.
//!
//! Reads outside a buffer are never errors: they produce a transparent pixel
//! (or a zero height).

use crate::casting::{floor_to_pixel, pixel_index};
use crate::dataset::PixelType;

/// RGBA pixel
pub type Rgba = [u8; 4];

pub const TRANSPARENT: Rgba = [0, 0, 0, 0];

/// Values are clamped to this range before the spectrum lookup
pub const SPECTRUM_MAX_VALUE: f64 = 8000.0;

/// Pixel-interleaved byte imagery with 3 (RGB) or 4 (RGBA) bands
#[derive(Debug, Clone, Copy)]
pub struct ImageBuffer<'a> {
    data: &'a [u8],
    width: usize,
    height: usize,
    bands: usize,
}

impl<'a> ImageBuffer<'a> {
    #[must_use]
    pub fn new(data: &'a [u8], width: usize, height: usize, bands: usize) -> Self {
        Self { data, width, height, bands }
    }

    /// Point sample at integer pixel `(x, y)`.
    ///
    /// RGB buffers report alpha 255.
    #[inline]
    #[must_use]
    pub fn sample(&self, x: i64, y: i64) -> Rgba {
        let Some(index) = pixel_index(x, y, self.width, self.height) else {
            return TRANSPARENT;
        };
        let start = index * self.bands;
        match (self.bands, self.data.get(start..start + self.bands)) {
            (3, Some(px)) => [px[0], px[1], px[2], 255],
            (4, Some(px)) => [px[0], px[1], px[2], px[3]],
            _ => TRANSPARENT,
        }
    }

    /// Bilinear sample at fractional pixel `(x, y)`.
    ///
    /// Neighbours past the first or last row/column are clamped onto it, so
    /// positions within one pixel before the buffer still blend. Anything
    /// further out is transparent.
    #[must_use]
    pub fn sample_bilinear(&self, x: f64, y: f64) -> Rgba {
        let (px, py) = (floor_to_pixel(x), floor_to_pixel(y));
        if pixel_index(px.max(0), py.max(0), self.width, self.height).is_none() || px < -1 || py < -1 {
            return TRANSPARENT;
        }
        let u = x - x.floor();
        let v = y - y.floor();

        let max_x = self.width as i64 - 1;
        let max_y = self.height as i64 - 1;
        let (x0, y0) = (px.clamp(0, max_x), py.clamp(0, max_y));
        let (x1, y1) = ((px + 1).clamp(0, max_x), (py + 1).clamp(0, max_y));

        let p00 = self.sample(x0, y0);
        let p10 = self.sample(x1, y0);
        let p01 = self.sample(x0, y1);
        let p11 = self.sample(x1, y1);

        let w00 = (1.0 - u) * (1.0 - v);
        let w10 = u * (1.0 - v);
        let w01 = (1.0 - u) * v;
        let w11 = u * v;

        let mut out = TRANSPARENT;
        for (c, channel) in out.iter_mut().enumerate() {
            let value = f64::from(p00[c]) * w00
                + f64::from(p10[c]) * w10
                + f64::from(p01[c]) * w01
                + f64::from(p11[c]) * w11
                + 0.5;
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            {
                *channel = value.clamp(0.0, 255.0) as u8;
            }
        }
        out
    }
}

/// Single-band numeric samples of any [`PixelType`]
#[derive(Debug, Clone, Copy)]
pub struct NumericBuffer<'a> {
    data: &'a [u8],
    width: usize,
    height: usize,
    pixel_type: PixelType,
    nodata: Option<f64>,
}

impl<'a> NumericBuffer<'a> {
    #[must_use]
    pub fn new(data: &'a [u8], width: usize, height: usize, pixel_type: PixelType, nodata: Option<f64>) -> Self {
        Self { data, width, height, pixel_type, nodata }
    }

    /// Raw value at `(x, y)`, `None` outside the buffer
    #[inline]
    #[must_use]
    pub fn value(&self, x: i64, y: i64) -> Option<f64> {
        let index = pixel_index(x, y, self.width, self.height)?;
        self.pixel_type.read(self.data, index)
    }

    /// Visualization: spectrum colour of the sample.
    ///
    /// A sample within `f32::EPSILON` of the no-data value is transparent.
    #[inline]
    #[must_use]
    pub fn sample_color(&self, x: i64, y: i64) -> Rgba {
        let Some(value) = self.value(x, y) else {
            return TRANSPARENT;
        };
        if let Some(nodata) = self.nodata {
            if (value - nodata).abs() < f64::from(f32::EPSILON) {
                return TRANSPARENT;
            }
        }
        spectrum_color(value)
    }

    /// Elevation: height of the sample, with anything at or below the no-data
    /// value floored to zero.
    #[inline]
    #[must_use]
    pub fn sample_elevation(&self, x: i64, y: i64) -> f32 {
        let Some(value) = self.value(x, y) else {
            return 0.0;
        };
        match self.nodata {
            Some(nodata) if value <= nodata => 0.0,
            #[allow(clippy::cast_possible_truncation)]
            _ => value as f32,
        }
    }
}

/// Map a value in `[0, 8000]` onto a 380–780nm visible spectrum colour.
///
/// Values outside the range are clamped first. The result is opaque.
#[must_use]
pub fn spectrum_color(value: f64) -> Rgba {
    let v = if value.is_nan() { 0.0 } else { value.clamp(0.0, SPECTRUM_MAX_VALUE) };
    let wavelength = 380.0 + v / SPECTRUM_MAX_VALUE * 400.0;

    let (r, g, b) = if wavelength < 440.0 {
        (-(wavelength - 440.0) / (440.0 - 380.0), 0.0, 1.0)
    } else if wavelength < 490.0 {
        (0.0, (wavelength - 440.0) / (490.0 - 440.0), 1.0)
    } else if wavelength < 510.0 {
        (0.0, 1.0, -(wavelength - 510.0) / (510.0 - 490.0))
    } else if wavelength < 580.0 {
        ((wavelength - 510.0) / (580.0 - 510.0), 1.0, 0.0)
    } else if wavelength < 645.0 {
        (1.0, -(wavelength - 645.0) / (645.0 - 580.0), 0.0)
    } else {
        (1.0, 0.0, 0.0)
    };

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let to_byte = |c: f64| (c * 255.0).round().clamp(0.0, 255.0) as u8;
    [to_byte(r), to_byte(g), to_byte(b), 255]
}

/// Pack an elevation as its little-endian `f32` bytes
#[inline]
#[must_use]
pub fn pack_elevation(value: f32) -> [u8; 4] {
    value.to_le_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rgb_2x2() -> Vec<u8> {
        vec![
            10, 20, 30, /* */ 40, 50, 60, //
            70, 80, 90, /* */ 100, 110, 120,
        ]
    }

    fn f32_buffer(values: &[f32]) -> Vec<u8> {
        values.iter().flat_map(|v| v.to_ne_bytes()).collect()
    }

    #[test]
    fn test_rgb_sample_is_opaque() {
        let data = rgb_2x2();
        let img = ImageBuffer::new(&data, 2, 2, 3);
        assert_eq!(img.sample(0, 0), [10, 20, 30, 255]);
        assert_eq!(img.sample(1, 1), [100, 110, 120, 255]);
    }

    #[test]
    fn test_rgba_sample_keeps_alpha() {
        let data = vec![1, 2, 3, 4, 5, 6, 7, 8];
        let img = ImageBuffer::new(&data, 2, 1, 4);
        assert_eq!(img.sample(1, 0), [5, 6, 7, 8]);
    }

    #[test]
    fn test_out_of_bounds_is_transparent() {
        let data = vec![255u8; 4 * 4 * 4];
        let img = ImageBuffer::new(&data, 4, 4, 4);
        let numeric = NumericBuffer::new(&data, 4, 4, PixelType::Float32, None);
        for (x, y) in [(-1, 0), (0, -1), (4, 0), (0, 4), (i64::MAX, 2), (-1, -1)] {
            assert_eq!(img.sample(x, y), TRANSPARENT);
            assert_eq!(numeric.sample_color(x, y), TRANSPARENT);
            assert_eq!(numeric.sample_elevation(x, y), 0.0);
        }
        assert_eq!(img.sample_bilinear(-1.5, 1.0), TRANSPARENT);
        assert_eq!(img.sample_bilinear(1.0, -1.25), TRANSPARENT);
        assert_eq!(img.sample_bilinear(1.0, 4.0), TRANSPARENT);
    }

    #[test]
    fn test_bilinear_at_integer_equals_point() {
        let data = rgb_2x2();
        let img = ImageBuffer::new(&data, 2, 2, 3);
        for y in 0..2 {
            for x in 0..2 {
                assert_eq!(img.sample_bilinear(x as f64, y as f64), img.sample(x, y));
            }
        }
    }

    #[test]
    fn test_bilinear_blends_neighbours() {
        let data = rgb_2x2();
        let img = ImageBuffer::new(&data, 2, 2, 3);
        // centre of the four pixels: mean of each channel
        assert_eq!(img.sample_bilinear(0.5, 0.5), [55, 65, 75, 255]);
        // halfway along the top row
        assert_eq!(img.sample_bilinear(0.5, 0.0), [25, 35, 45, 255]);
        // last column clamps onto itself
        assert_eq!(img.sample_bilinear(1.5, 0.0), [40, 50, 60, 255]);
    }

    #[test]
    fn test_bilinear_clamps_before_first_pixel() {
        let data = rgb_2x2();
        let img = ImageBuffer::new(&data, 2, 2, 3);
        assert_eq!(img.sample_bilinear(-0.5, 0.0), [10, 20, 30, 255]);
        assert_eq!(img.sample_bilinear(0.0, -0.5), [10, 20, 30, 255]);
        assert_eq!(img.sample_bilinear(-0.5, -0.5), [10, 20, 30, 255]);
        // first column, halfway down
        assert_eq!(img.sample_bilinear(-0.5, 0.5), [40, 50, 60, 255]);
    }

    #[test]
    fn test_nodata_matching_for_color() {
        let data = f32_buffer(&[-9999.0, -9998.0, 100.0]);
        let buf = NumericBuffer::new(&data, 3, 1, PixelType::Float32, Some(-9999.0));
        assert_eq!(buf.sample_color(0, 0)[3], 0);
        assert_eq!(buf.sample_color(1, 0)[3], 255);
        assert_eq!(buf.sample_color(2, 0)[3], 255);
    }

    #[test]
    fn test_elevation_floors_below_nodata() {
        let data = f32_buffer(&[-9999.0, -10_000.0, 1234.5, -5.0]);
        let buf = NumericBuffer::new(&data, 4, 1, PixelType::Float32, Some(-9999.0));
        assert_eq!(buf.sample_elevation(0, 0), 0.0);
        assert_eq!(buf.sample_elevation(1, 0), 0.0);
        assert_eq!(buf.sample_elevation(2, 0), 1234.5);
        assert_eq!(buf.sample_elevation(3, 0), -5.0);

        let no_sentinel = NumericBuffer::new(&data, 4, 1, PixelType::Float32, None);
        assert_eq!(no_sentinel.sample_elevation(0, 0), -9999.0);
    }

    #[test]
    fn test_numeric_dispatch_per_type() {
        let mut data = Vec::new();
        PixelType::Int16.write(-300.0, &mut data);
        PixelType::Int16.write(2500.0, &mut data);
        let buf = NumericBuffer::new(&data, 2, 1, PixelType::Int16, None);
        assert_eq!(buf.value(0, 0), Some(-300.0));
        assert_eq!(buf.sample_elevation(1, 0), 2500.0);

        let data = vec![0x80u8];
        let signed = NumericBuffer::new(&data, 1, 1, PixelType::Int8, None);
        assert_eq!(signed.value(0, 0), Some(-128.0));
    }

    #[test]
    fn test_spectrum_bands() {
        // 380nm: violet
        assert_eq!(spectrum_color(0.0), [255, 0, 255, 255]);
        // 440nm: blue
        assert_eq!(spectrum_color(1200.0), [0, 0, 255, 255]);
        // 510nm: green
        assert_eq!(spectrum_color(2600.0), [0, 255, 0, 255]);
        // 580nm: yellow
        assert_eq!(spectrum_color(4000.0), [255, 255, 0, 255]);
        // 780nm and beyond: red
        assert_eq!(spectrum_color(8000.0), [255, 0, 0, 255]);
        assert_eq!(spectrum_color(1e9), [255, 0, 0, 255]);
        assert_eq!(spectrum_color(-50.0), spectrum_color(0.0));
    }

    #[test]
    fn test_pack_elevation_roundtrip() {
        let bytes = pack_elevation(0.0);
        assert_eq!(bytes, [0, 0, 0, 0]);
        assert_eq!(f32::from_le_bytes(pack_elevation(-12.25)), -12.25);
    }
}
