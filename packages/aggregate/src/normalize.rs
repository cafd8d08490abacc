//! Min-max intensity normalization and marker styling.
//!
//! Intensities are scaled over the buckets passed in, which should already be
//! thresholded. When every bucket has the same count the scale collapses and
//! every bucket gets [`UNIFORM_INTENSITY`].

use arrest_map_records_models::{BucketCount, CoordinateBucket};

/// Intensity assigned to every bucket when all counts are equal.
pub const UNIFORM_INTENSITY: f64 = 0.5;

/// Multiplier from intensity to marker radius (pixels).
pub const RADIUS_SCALE: f64 = 20.0;

/// Smallest marker radius (pixels).
pub const MIN_RADIUS: f64 = 4.0;

/// Largest marker radius (pixels).
pub const MAX_RADIUS: f64 = 12.0;

/// Gradient color at intensity 0.
pub const LOW_COLOR: &str = "#fdaf9f";

/// Gradient color at intensity 1.
pub const HIGH_COLOR: &str = "#ff2d00";

const LOW_RGB: [u8; 3] = [0xfd, 0xaf, 0x9f];
const HIGH_RGB: [u8; 3] = [0xff, 0x2d, 0x00];

/// A bucket with its min-max scaled intensity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedBucket {
    /// The rounded coordinate.
    pub bucket: CoordinateBucket,
    /// Raw record count.
    pub count: u64,
    /// Count scaled into `[0, 1]`.
    pub intensity: f64,
}

/// A bucket ready to be drawn as a circle marker.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    /// The rounded coordinate.
    pub bucket: CoordinateBucket,
    /// Raw record count.
    pub count: u64,
    /// Count scaled into `[0, 1]`.
    pub intensity: f64,
    /// Circle radius in pixels.
    pub radius: f64,
    /// `#rrggbb` fill and stroke color.
    pub color: String,
}

/// Min-max scales bucket counts into `[0, 1]`.
///
/// Output order matches input order. An empty input gives an empty output.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn normalize(buckets: &[BucketCount]) -> Vec<NormalizedBucket> {
    let Some(min) = buckets.iter().map(|b| b.count).min() else {
        return Vec::new();
    };
    let max = buckets.iter().map(|b| b.count).max().unwrap_or(min);

    let span = (max - min) as f64;

    buckets
        .iter()
        .map(|b| {
            let intensity = if max == min {
                UNIFORM_INTENSITY
            } else {
                (b.count - min) as f64 / span
            };
            NormalizedBucket {
                bucket: b.bucket,
                count: b.count,
                intensity,
            }
        })
        .collect()
}

/// Marker radius for an intensity: `clamp(intensity * 20, 4, 12)`.
#[must_use]
pub fn marker_radius(intensity: f64) -> f64 {
    (clamp_unit(intensity) * RADIUS_SCALE).clamp(MIN_RADIUS, MAX_RADIUS)
}

/// Marker color for an intensity, interpolated linearly in RGB between
/// [`LOW_COLOR`] and [`HIGH_COLOR`].
#[must_use]
pub fn marker_color(intensity: f64) -> String {
    let t = clamp_unit(intensity);
    let [r, g, b] = std::array::from_fn(|i| lerp_channel(LOW_RGB[i], HIGH_RGB[i], t));
    format!("#{r:02x}{g:02x}{b:02x}")
}

/// Normalizes `buckets` and attaches a radius and color to each.
#[must_use]
pub fn style_markers(buckets: &[BucketCount]) -> Vec<Marker> {
    normalize(buckets)
        .into_iter()
        .map(|n| Marker {
            bucket: n.bucket,
            count: n.count,
            intensity: n.intensity,
            radius: marker_radius(n.intensity),
            color: marker_color(n.intensity),
        })
        .collect()
}

fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn lerp_channel(from: u8, to: u8, t: f64) -> u8 {
    let from = f64::from(from);
    let to = f64::from(to);
    (to - from).mul_add(t, from).round().clamp(0.0, 255.0) as u8
}
