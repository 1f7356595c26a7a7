//! In-memory dataset.
//!
//! Samples are held as `f64`, pixel-interleaved, and converted to the
//! requested [`PixelType`] on read. Used for synthetic rasters in tests and
//! benches.

use super::{alloc_buffer, buffer_len, nearest_source, Dataset, DatasetInfo, PixelRegion, PixelType};
use crate::error::{Error, Result};

#[derive(Debug, Clone)]
pub struct MemoryDataset {
    info: DatasetInfo,
    samples: Vec<f64>,
}

impl MemoryDataset {
    /// Wrap `samples` (`width * height * bands` values, pixel-interleaved).
    ///
    /// # Errors
    /// [`Error::DatasetRead`] if the sample count does not match the info.
    pub fn new(info: DatasetInfo, samples: Vec<f64>) -> Result<Self> {
        let expected = info.width * info.height * info.bands;
        if samples.len() != expected {
            return Err(Error::DatasetRead(format!(
                "expected {expected} samples for {}x{}x{}, got {}",
                info.width,
                info.height,
                info.bands,
                samples.len()
            )));
        }
        Ok(Self { info, samples })
    }

    /// Every pixel set to `pixel` (one value per band).
    ///
    /// # Errors
    /// [`Error::DatasetRead`] if `pixel.len()` differs from the band count.
    pub fn filled(info: DatasetInfo, pixel: &[f64]) -> Result<Self> {
        if pixel.len() != info.bands {
            return Err(Error::DatasetRead(format!(
                "fill value has {} bands, dataset has {}",
                pixel.len(),
                info.bands
            )));
        }
        let samples = pixel
            .iter()
            .copied()
            .cycle()
            .take(info.width * info.height * info.bands)
            .collect();
        Self::new(info, samples)
    }

    /// Sample of band `band` at pixel `(x, y)`
    #[must_use]
    pub fn sample(&self, x: usize, y: usize, band: usize) -> Option<f64> {
        if x >= self.info.width || y >= self.info.height || band >= self.info.bands {
            return None;
        }
        self.samples
            .get((y * self.info.width + x) * self.info.bands + band)
            .copied()
    }

    /// Overwrite one pixel
    pub fn set_pixel(&mut self, x: usize, y: usize, pixel: &[f64]) {
        if x >= self.info.width || y >= self.info.height {
            return;
        }
        let start = (y * self.info.width + x) * self.info.bands;
        for (dst, src) in self.samples[start..start + self.info.bands].iter_mut().zip(pixel) {
            *dst = *src;
        }
    }
}

impl Dataset for MemoryDataset {
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
        let mut out = alloc_buffer(buffer_len(out_width, out_height, bands, pixel_type)?)?;

        let columns: Vec<usize> = (0..out_width)
            .map(|ox| nearest_source(ox, out_width, region.x_off, region.width))
            .collect();

        for oy in 0..out_height {
            let sy = nearest_source(oy, out_height, region.y_off, region.height);
            let row = sy * self.info.width;
            for &sx in &columns {
                let start = (row + sx) * bands;
                for &value in &self.samples[start..start + bands] {
                    pixel_type.write(value, &mut out);
                }
            }
        }

        Ok(out)
    }
}
