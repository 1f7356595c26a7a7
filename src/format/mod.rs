//! Tile encodings.
//!
//! Formats form a closed set; each one knows how to encode a rendered
//! [`RasterTile`], decode stored bytes and produce an empty tile.

pub mod json;
pub mod raw;

use serde::{Deserialize, Serialize};

use crate::compositor::RasterTile;
use crate::error::Result;
use crate::sampler::Rgba;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    /// `RAW0` packed elevation container
    Raw,
    /// Terrain mesh JSON
    Json,
}

impl ImageFormat {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Raw => "raw",
            Self::Json => "json",
        }
    }

    /// File extension used in tile keys
    #[must_use]
    pub fn extension(self) -> &'static str {
        self.name()
    }

    #[must_use]
    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Raw => "application/octet-stream",
            Self::Json => "application/json",
        }
    }

    /// # Errors
    /// [`crate::Error::Format`] if the tile cannot be represented.
    pub fn encode(self, tile: &RasterTile) -> Result<Vec<u8>> {
        match self {
            Self::Raw => raw::encode(tile),
            Self::Json => json::encode(tile),
        }
    }

    /// # Errors
    /// [`crate::Error::Format`] on malformed input.
    pub fn decode(self, bytes: &[u8]) -> Result<RasterTile> {
        match self {
            Self::Raw => raw::decode(bytes),
            Self::Json => json::decode(bytes),
        }
    }

    /// Encoded empty tile of `size × size` pixels.
    ///
    /// Raw tiles repeat `color` in every pixel; JSON tiles are flat terrain.
    ///
    /// # Errors
    /// [`crate::Error::Format`] if no empty tile of that size exists.
    pub fn create_empty(self, size: usize, color: Rgba) -> Result<Vec<u8>> {
        match self {
            Self::Raw => raw::create_empty(size, color),
            Self::Json => json::create_empty(size),
        }
    }
}

impl std::str::FromStr for ImageFormat {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "raw" => Ok(Self::Raw),
            "json" => Ok(Self::Json),
            other => Err(crate::Error::Config(format!("unknown image format \"{other}\""))),
        }
    }
}
