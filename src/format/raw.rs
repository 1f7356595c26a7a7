//! `RAW0` elevation container.
//!
//! ```text
//! "RAW0" | grid size N (u32, little-endian) | 4*N*N bytes of tile data
//! ```

use crate::compositor::RasterTile;
use crate::error::{Error, Result};
use crate::sampler::Rgba;

pub const MAGIC: &[u8; 4] = b"RAW0";
pub const HEADER_LEN: usize = 8;

/// Encode a square elevation tile.
///
/// # Errors
/// [`Error::Format`] for image tiles, non-square tiles or a size that does
/// not fit the header.
pub fn encode(tile: &RasterTile) -> Result<Vec<u8>> {
    if !tile.is_elevation() {
        return Err(Error::Format("can't convert non elevation data to raw".to_string()));
    }
    if tile.width != tile.height {
        return Err(Error::Format(format!(
            "raw tiles must be square, got {}x{}",
            tile.width, tile.height
        )));
    }
    let n = u32::try_from(tile.width)
        .map_err(|_| Error::Format(format!("grid size {} does not fit the raw header", tile.width)))?;

    let mut out = Vec::with_capacity(HEADER_LEN + tile.data.len());
    out.extend_from_slice(MAGIC);
    out.extend_from_slice(&n.to_le_bytes());
    out.extend_from_slice(&tile.data);
    Ok(out)
}

/// Decode a raw container into an elevation tile.
///
/// The container holds no placement, so the tile comes back without a
/// sub-extent.
///
/// # Errors
/// [`Error::Format`] on a bad magic or a payload that does not match the
/// declared grid size.
pub fn decode(bytes: &[u8]) -> Result<RasterTile> {
    if bytes.len() < HEADER_LEN || &bytes[..4] != MAGIC {
        return Err(Error::Format("missing RAW0 header".to_string()));
    }
    let n = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]) as usize;
    let expected = n
        .checked_mul(n)
        .and_then(|v| v.checked_mul(4))
        .ok_or_else(|| Error::Format(format!("grid size {n} overflows")))?;
    let payload = &bytes[HEADER_LEN..];
    if payload.len() != expected {
        return Err(Error::Format(format!(
            "raw payload is {} bytes, grid size {n} needs {expected}",
            payload.len()
        )));
    }

    let mut tile = RasterTile::flat(n, n, None);
    tile.data.copy_from_slice(payload);
    Ok(tile)
}

/// Encoded `size × size` tile with every pixel's 4 bytes set to `color`
///
/// # Errors
/// See [`encode`].
pub fn create_empty(size: usize, color: Rgba) -> Result<Vec<u8>> {
    let mut tile = RasterTile::flat(size, size, None);
    tile.data = color.repeat(size * size);
    encode(&tile)
}
