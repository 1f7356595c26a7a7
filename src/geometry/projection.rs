//! Spatial references and coordinate transforms (pure Rust, proj4rs +
//! crs-definitions).
//!
//! A [`SpatialRef`] is parsed from user input (`"EPSG:3857"`, a bare EPSG
//! code, or a PROJ.4 string). Two of them yield a [`Transformer`] that maps
//! coordinate pairs from one to the other; individual points may fail
//! without invalidating the transformer.

use std::f64::consts::PI;

use proj4rs::proj::Proj;
use proj4rs::transform::transform;

use super::HALF_EARTH;
use crate::error::{Error, Result, TransformError};

/// Web Mercator (Spherical Mercator)
pub const EPSG_WEB_MERCATOR: u16 = 3857;
/// WGS84 Geographic (longitude/latitude in degrees)
pub const EPSG_WGS84: u16 = 4326;

/// Get PROJ4 string for an EPSG code using the crs-definitions database
#[inline]
#[must_use]
pub fn get_proj_string(epsg: u16) -> Option<&'static str> {
    crs_definitions::from_code(epsg).map(|def| def.proj4)
}

/// A parsed spatial reference descriptor
#[derive(Debug, Clone, PartialEq)]
pub struct SpatialRef {
    /// Text the reference was parsed from
    label: String,
    /// EPSG code when the input named one
    epsg: Option<u16>,
    /// PROJ.4 definition
    definition: String,
    /// True if coordinates are longitude/latitude degrees
    geographic: bool,
}

impl SpatialRef {
    /// Parse `"EPSG:<code>"`, a bare code, or a `+proj=` string.
    ///
    /// # Errors
    /// [`Error::SpatialReference`] if the code is unknown or the text is not
    /// a recognisable descriptor.
    pub fn parse(input: &str) -> Result<Self> {
        let text = input.trim();
        let parse_error = |reason: &str| Error::SpatialReference {
            srs: input.to_string(),
            reason: reason.to_string(),
        };

        if text.starts_with('+') {
            // validate eagerly so configuration errors surface at parse time
            Proj::from_proj_string(text).map_err(|e| parse_error(&format!("{e:?}")))?;
            return Ok(Self::from_definition(text.to_string(), None, text.to_string()));
        }

        let code_text = text
            .strip_prefix("EPSG:")
            .or_else(|| text.strip_prefix("epsg:"))
            .unwrap_or(text);
        let epsg: u16 = code_text
            .parse()
            .map_err(|_| parse_error("expected EPSG:<code> or a PROJ.4 string"))?;
        Self::from_epsg(epsg)
    }

    /// Look an EPSG code up in the crs-definitions database.
    ///
    /// # Errors
    /// [`Error::SpatialReference`] if the code is not in the database.
    pub fn from_epsg(epsg: u16) -> Result<Self> {
        let definition = get_proj_string(epsg).ok_or_else(|| Error::SpatialReference {
            srs: format!("EPSG:{epsg}"),
            reason: "not in the crs-definitions database".to_string(),
        })?;
        Ok(Self::from_definition(
            format!("EPSG:{epsg}"),
            Some(epsg),
            definition.to_string(),
        ))
    }

    fn from_definition(label: String, epsg: Option<u16>, definition: String) -> Self {
        let geographic = definition.contains("+proj=longlat") || definition.contains("+proj=latlong");
        Self { label, epsg, definition, geographic }
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[must_use]
    pub fn epsg(&self) -> Option<u16> {
        self.epsg
    }

    #[must_use]
    pub fn definition(&self) -> &str {
        &self.definition
    }

    /// Check if this reference uses longitude/latitude degrees
    #[must_use]
    pub fn is_geographic(&self) -> bool {
        self.geographic
    }

    /// Two references describe the same system
    #[must_use]
    pub fn same_as(&self, other: &SpatialRef) -> bool {
        match (self.epsg, other.epsg) {
            (Some(a), Some(b)) => a == b,
            _ => self.definition == other.definition,
        }
    }

    fn is_web_mercator(&self) -> bool {
        self.epsg == Some(EPSG_WEB_MERCATOR)
    }

    fn is_wgs84(&self) -> bool {
        self.epsg == Some(EPSG_WGS84)
    }
}

impl std::fmt::Display for SpatialRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.label)
    }
}

/// Capability to reproject single coordinate pairs.
pub trait CoordTransform {
    /// Transform one point.
    ///
    /// # Errors
    /// [`TransformError`] when the point cannot be represented in the target
    /// system; callers decide whether that is fatal.
    fn transform(&self, x: f64, y: f64) -> std::result::Result<(f64, f64), TransformError>;
}

/// Fast inline conversion from Web Mercator X to longitude (degrees)
#[inline(always)]
fn merc_x_to_lon(x: f64) -> f64 {
    x * 180.0 / HALF_EARTH
}

/// Fast inline conversion from Web Mercator Y to latitude (degrees)
#[inline(always)]
fn merc_y_to_lat(y: f64) -> f64 {
    let y_rad = y * PI / HALF_EARTH;
    (2.0 * y_rad.exp().atan() - PI / 2.0).to_degrees()
}

#[inline(always)]
fn lon_to_merc_x(lon: f64) -> f64 {
    lon * HALF_EARTH / 180.0
}

#[inline(always)]
fn lat_to_merc_y(lat: f64) -> f64 {
    (PI / 4.0 + lat.to_radians() / 2.0).tan().ln() * HALF_EARTH / PI
}

/// proj4rs-backed transform between two PROJ.4 definitions
pub struct ProjTransform {
    source: Proj,
    target: Proj,
    source_is_geographic: bool,
    target_is_geographic: bool,
}

impl std::fmt::Debug for ProjTransform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProjTransform")
            .field("source_is_geographic", &self.source_is_geographic)
            .field("target_is_geographic", &self.target_is_geographic)
            .finish_non_exhaustive()
    }
}

impl ProjTransform {
    fn new(source: &SpatialRef, target: &SpatialRef, direction: &'static str) -> Result<Self> {
        let build = |srs: &SpatialRef| {
            Proj::from_proj_string(srs.definition()).map_err(|e| Error::TransformCreation {
                direction,
                reason: format!("invalid projection {srs}: {e:?}"),
            })
        };
        Ok(Self {
            source: build(source)?,
            target: build(target)?,
            source_is_geographic: source.is_geographic(),
            target_is_geographic: target.is_geographic(),
        })
    }
}

impl CoordTransform for ProjTransform {
    fn transform(&self, x: f64, y: f64) -> std::result::Result<(f64, f64), TransformError> {
        // proj4rs uses radians for geographic coordinates
        let mut point = if self.source_is_geographic {
            (x.to_radians(), y.to_radians(), 0.0)
        } else {
            (x, y, 0.0)
        };

        transform(&self.source, &self.target, &mut point).map_err(|e| TransformError {
            x,
            y,
            reason: format!("{e:?}"),
        })?;

        if self.target_is_geographic {
            Ok((point.0.to_degrees(), point.1.to_degrees()))
        } else {
            Ok((point.0, point.1))
        }
    }
}

/// Transformation strategy - fast inline math where possible, proj4rs
/// otherwise
#[derive(Debug)]
pub enum Transformer {
    /// Source and target are the same system
    Identity,
    /// EPSG:3857 → EPSG:4326
    MercatorToGeographic,
    /// EPSG:4326 → EPSG:3857
    GeographicToMercator,
    /// Generic proj4rs transform for other combinations
    Proj(Box<ProjTransform>),
}

impl Transformer {
    /// Build a transform from `source` to `target`.
    ///
    /// # Errors
    /// [`Error::TransformCreation`] if either definition is rejected by proj4rs.
    pub fn new(source: &SpatialRef, target: &SpatialRef) -> Result<Self> {
        Self::with_direction(source, target, "forward")
    }

    fn with_direction(source: &SpatialRef, target: &SpatialRef, direction: &'static str) -> Result<Self> {
        if source.same_as(target) {
            return Ok(Self::Identity);
        }
        if source.is_web_mercator() && target.is_wgs84() {
            return Ok(Self::MercatorToGeographic);
        }
        if source.is_wgs84() && target.is_web_mercator() {
            return Ok(Self::GeographicToMercator);
        }
        Ok(Self::Proj(Box::new(ProjTransform::new(source, target, direction)?)))
    }

    /// Forward (`a → b`) and backward (`b → a`) transforms.
    ///
    /// # Errors
    /// [`Error::TransformCreation`] naming the direction that failed.
    pub fn pair(a: &SpatialRef, b: &SpatialRef) -> Result<(Self, Self)> {
        let forward = Self::with_direction(a, b, "forward")?;
        let backward = Self::with_direction(b, a, "backward")?;
        Ok((forward, backward))
    }

    #[must_use]
    pub fn is_identity(&self) -> bool {
        matches!(self, Self::Identity)
    }
}

impl CoordTransform for Transformer {
    #[inline(always)]
    fn transform(&self, x: f64, y: f64) -> std::result::Result<(f64, f64), TransformError> {
        let (tx, ty) = match self {
            Self::Identity => return Ok((x, y)),
            Self::MercatorToGeographic => (merc_x_to_lon(x), merc_y_to_lat(y)),
            Self::GeographicToMercator => {
                if y.abs() >= 90.0 {
                    return Err(TransformError {
                        x,
                        y,
                        reason: "latitude outside Mercator domain".to_string(),
                    });
                }
                (lon_to_merc_x(x), lat_to_merc_y(y))
            }
            Self::Proj(t) => t.transform(x, y)?,
        };
        if tx.is_finite() && ty.is_finite() {
            Ok((tx, ty))
        } else {
            Err(TransformError {
                x,
                y,
                reason: "non-finite result".to_string(),
            })
        }
    }
}
