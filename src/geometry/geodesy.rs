//! Normalized Mercator, geodetic and geocentric (WGS84) conversions used by
//! the terrain mesh builder.
//!
//! Normalized Mercator maps the Web Mercator square onto `[-1, 1]²`.

use std::f64::consts::PI;

/// WGS84 semi-major axis in meters
pub const WGS84_A: f64 = 6_378_137.0;
/// WGS84 flattening
pub const WGS84_F: f64 = 1.0 / 298.257_223_563;
/// WGS84 first eccentricity squared
pub const WGS84_E2: f64 = WGS84_F * (2.0 - WGS84_F);

/// Geodetic position: degrees and meters above the ellipsoid
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geodetic {
    pub lng: f64,
    pub lat: f64,
    pub height: f64,
}

/// Normalized Mercator `(x, y)` to geodetic longitude/latitude in degrees.
#[inline]
#[must_use]
pub fn mercator_to_geodetic(x: f64, y: f64) -> (f64, f64) {
    let lng = x * 180.0;
    let lat = (y * PI).sinh().atan().to_degrees();
    (lng, lat)
}

/// Geodetic longitude/latitude in degrees to normalized Mercator.
#[inline]
#[must_use]
pub fn geodetic_to_mercator(lng: f64, lat: f64) -> (f64, f64) {
    let x = lng / 180.0;
    let y = lat.to_radians().tan().asinh() / PI;
    (x, y)
}

/// Geodetic to Earth-centered Earth-fixed cartesian coordinates (meters)
#[must_use]
pub fn geodetic_to_geocentric(p: Geodetic) -> [f64; 3] {
    let lat = p.lat.to_radians();
    let lng = p.lng.to_radians();
    let (sin_lat, cos_lat) = lat.sin_cos();
    let (sin_lng, cos_lng) = lng.sin_cos();

    // prime vertical radius of curvature
    let n = WGS84_A / (1.0 - WGS84_E2 * sin_lat * sin_lat).sqrt();

    [
        (n + p.height) * cos_lat * cos_lng,
        (n + p.height) * cos_lat * sin_lng,
        (n * (1.0 - WGS84_E2) + p.height) * sin_lat,
    ]
}
