//! Geographic coordinates and position fixes.
//!
//! Everything downstream (session, persistence, map) speaks in these two
//! types, so they live at the bottom of the crate graph with no Bevy
//! dependency of their own.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Tolerance used by [`Coordinate::approx_eq`]. At the equator 1e-9 degrees
/// is roughly 0.1 mm, far below anything a GPS fix can resolve.
const APPROX_EPSILON: f64 = 1e-9;

/// A WGS84 latitude/longitude pair in decimal degrees.
///
/// Latitude is valid in `[-90, 90]`, longitude in `[-180, 180]`. Both
/// bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    /// Builds a coordinate, rejecting out-of-range or non-finite input.
    pub fn new(latitude: f64, longitude: f64) -> Option<Self> {
        let valid = latitude.is_finite()
            && longitude.is_finite()
            && (-90.0..=90.0).contains(&latitude)
            && (-180.0..=180.0).contains(&longitude);
        valid.then_some(Self {
            latitude,
            longitude,
        })
    }

    /// Builds a coordinate, saturating each axis into its valid range.
    /// Non-finite input collapses to 0.0 on that axis.
    pub fn clamped(latitude: f64, longitude: f64) -> Self {
        let latitude = if latitude.is_finite() { latitude } else { 0.0 };
        let longitude = if longitude.is_finite() { longitude } else { 0.0 };
        Self {
            latitude: latitude.clamp(-90.0, 90.0),
            longitude: longitude.clamp(-180.0, 180.0),
        }
    }

    /// Value comparison with a sub-millimetre tolerance, for code that wants
    /// to skip no-op updates without tripping over float noise.
    pub fn approx_eq(&self, other: &Self) -> bool {
        (self.latitude - other.latitude).abs() < APPROX_EPSILON
            && (self.longitude - other.longitude).abs() < APPROX_EPSILON
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Five decimals is about one metre of ground resolution.
        write!(f, "{:.5}, {:.5}", self.latitude, self.longitude)
    }
}

/// One position report from a location device: where, and how sure.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Fix {
    pub coordinate: Coordinate,
    /// Radius of the 68% confidence circle around `coordinate`, in metres.
    pub horizontal_accuracy_m: f64,
}

impl Fix {
    pub fn new(coordinate: Coordinate, horizontal_accuracy_m: f64) -> Self {
        Self {
            coordinate,
            horizontal_accuracy_m,
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
