//! Spherical Web Mercator projection.
//!
//! Geographic coordinates are projected to planar metres for the 2D camera.
//! The math runs in f64 because mercator coordinates reach ~2e7 m, far past
//! what f32 can hold at sub-metre precision; [`MapOrigin`] subtracts a
//! nearby anchor before anything is handed to the renderer, so the f32
//! world the camera sees stays small.

use bevy::math::DVec2;
use bevy::prelude::*;

use location::Coordinate;

/// WGS84 equatorial radius in metres (the spherical mercator sphere).
pub const EARTH_RADIUS_M: f64 = 6_378_137.0;

/// Latitude where the mercator y coordinate equals the x extent. The
/// projection diverges toward the poles, so everything is clamped here.
pub const MAX_MERCATOR_LATITUDE: f64 = 85.051_128_78;

/// Re-anchor when the camera wanders this far from the origin. At 5e4 m an
/// f32 still resolves better than a centimetre.
const REANCHOR_DISTANCE_M: f32 = 50_000.0;

/// Projects a coordinate to mercator metres. Latitudes beyond the mercator
/// limit are clamped to it.
pub fn project(coordinate: Coordinate) -> DVec2 {
    let latitude = coordinate
        .latitude
        .clamp(-MAX_MERCATOR_LATITUDE, MAX_MERCATOR_LATITUDE);
    let phi = latitude.to_radians();
    DVec2::new(
        EARTH_RADIUS_M * coordinate.longitude.to_radians(),
        EARTH_RADIUS_M * (std::f64::consts::FRAC_PI_4 + phi / 2.0).tan().ln(),
    )
}

/// Inverse of [`project`].
pub fn unproject(point: DVec2) -> Coordinate {
    let longitude = (point.x / EARTH_RADIUS_M).to_degrees();
    let latitude =
        (2.0 * (point.y / EARTH_RADIUS_M).exp().atan() - std::f64::consts::FRAC_PI_2).to_degrees();
    Coordinate::clamped(latitude, longitude)
}

/// Height in mercator metres of a latitude span centred on `latitude`.
pub fn span_world_height(latitude_delta: f64, latitude: f64) -> f64 {
    let half = latitude_delta / 2.0;
    let top = project(Coordinate::clamped(latitude + half, 0.0));
    let bottom = project(Coordinate::clamped(latitude - half, 0.0));
    top.y - bottom.y
}

/// The mercator point currently mapped to the renderer's world origin.
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq)]
pub struct MapOrigin {
    pub anchor: DVec2,
}

impl MapOrigin {
    pub fn anchored_at(coordinate: Coordinate) -> Self {
        Self {
            anchor: project(coordinate),
        }
    }

    /// Mercator metres to renderer world units.
    pub fn to_world(&self, point: DVec2) -> Vec2 {
        (point - self.anchor).as_vec2()
    }

    /// Renderer world units back to mercator metres.
    pub fn to_mercator(&self, world: Vec2) -> DVec2 {
        self.anchor + world.as_dvec2()
    }
}

/// Moves the anchor under the camera when it has drifted far enough for f32
/// precision to matter. Everything placed in world space is recomputed from
/// the origin every frame, so nothing else needs to react.
pub fn reanchor_origin(
    mut origin: ResMut<MapOrigin>,
    cameras: Query<&Transform, With<Camera2d>>,
) {
    let Ok(transform) = cameras.get_single() else {
        return;
    };
    let offset = transform.translation.truncate();
    if offset.length() > REANCHOR_DISTANCE_M {
        origin.anchor += offset.as_dvec2();
        debug!("re-anchored map origin at {:?}", origin.anchor);
    }
}

// ===========================================================================
// Tests
// ===========================================================================
