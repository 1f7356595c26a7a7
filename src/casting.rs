//! Numeric conversions between world/pixel floats and buffer indices.
//!
//! # Assumptions
//!
//! ## Buffer dimensions (`usize` ↔ `f64`)
//! Tile and working buffers are at most a few thousand pixels per side, so
//! `usize` to `f64` conversions are exact and are done without checks.
//!
//! ## Pixel coordinates (`f64` → `i64`)
//! Reprojected coordinates can be NaN, infinite or far outside any buffer
//! (polar singularities, antimeridian wrap). They are floored into `i64`
//! with NaN mapped to `-1`, so the sampler's bounds check rejects them.
//!
//! ## Window sizes (`f64` → `usize`)
//! Working resolutions derived from aspect ratios are truncated toward zero
//! and never allowed to drop below one pixel.

/// Floor a float pixel coordinate into a signed integer coordinate.
///
/// NaN becomes `-1` (always out of bounds); infinities saturate.
#[inline]
#[must_use]
pub fn floor_to_pixel(value: f64) -> i64 {
    if value.is_nan() {
        return -1;
    }
    // `as` saturates on overflow and infinities
    #[allow(clippy::cast_possible_truncation)]
    {
        value.floor() as i64
    }
}

/// Linear pixel index for `(x, y)` in a `width × height` buffer, or `None`
/// if the coordinate lies outside it.
#[inline]
#[must_use]
pub fn pixel_index(x: i64, y: i64, width: usize, height: usize) -> Option<usize> {
    if x < 0 || y < 0 {
        return None;
    }
    #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
    let (ux, uy) = (x as usize, y as usize);
    if ux >= width || uy >= height {
        None
    } else {
        Some(uy * width + ux)
    }
}

/// Truncate a float toward zero into a signed integer, the way pixel
/// offsets of a read window are derived.
#[inline]
#[must_use]
pub fn truncate_to_i64(value: f64) -> i64 {
    if value.is_nan() {
        return 0;
    }
    #[allow(clippy::cast_possible_truncation)]
    {
        value.trunc() as i64
    }
}

/// Convert a float size into a pixel count of at least one.
#[inline]
#[must_use]
pub fn f64_to_size(value: f64) -> usize {
    if value.is_nan() || value < 1.0 {
        return 1;
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    {
        value as usize
    }
}

/// Clamp a float pixel coordinate into `[0, max_value - 1]`.
#[inline]
#[must_use]
pub fn clamp_to_extent(value: f64, max_value: usize) -> f64 {
    let upper = max_value.saturating_sub(1) as f64;
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, upper)
}

/// Convert a non-negative `i64` into `usize`, clamping negatives to zero.
#[inline]
#[must_use]
pub fn i64_to_usize(value: i64) -> usize {
    usize::try_from(value).unwrap_or(0)
}
