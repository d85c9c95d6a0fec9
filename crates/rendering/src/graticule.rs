//! Graticule: the latitude/longitude grid behind the markers.
//!
//! With no map tiles, the grid is what gives panning and zooming a sense of
//! scale and motion. Lines are redrawn from the viewport every frame with
//! gizmos; mercator maps parallels and meridians to straight lines, so each
//! is a single two-point segment.

use bevy::prelude::*;

use crate::projection::{project, MapOrigin, MAX_MERCATOR_LATITUDE};
use crate::viewport::MapViewport;

use location::Coordinate;

/// Preferred on-screen spacing between grid lines.
const GRID_TARGET_PX: f64 = 90.0;

const GRID_COLOR: Color = Color::srgba(0.55, 0.65, 0.80, 0.10);
/// Equator and prime meridian get a brighter line.
const GRID_AXIS_COLOR: Color = Color::srgba(0.55, 0.75, 0.95, 0.28);

/// Grid steps in degrees: a 1-2-5 ladder up to 10, then the divisions
/// cartographers actually use for whole-hemisphere views.
const STEPS: [f64; 18] = [
    0.0001, 0.0002, 0.0005, 0.001, 0.002, 0.005, 0.01, 0.02, 0.05, 0.1, 0.2, 0.5, 1.0, 2.0,
    5.0, 10.0, 15.0, 30.0,
];

/// Picks the smallest grid step not below `target_deg`.
fn choose_step(target_deg: f64) -> f64 {
    for step in STEPS {
        if step >= target_deg {
            return step;
        }
    }
    45.0
}

pub fn draw_graticule(
    viewport: Res<MapViewport>,
    origin: Res<MapOrigin>,
    windows: Query<&Window>,
    mut gizmos: Gizmos,
) {
    let Ok(window) = windows.get_single() else {
        return;
    };
    let height_px = f64::from(window.height());
    if height_px <= 0.0 {
        return;
    }

    let center = viewport.center;
    let lat_delta = viewport.span.latitude_delta;
    let lon_delta = viewport.span.longitude_delta;
    let step = choose_step(lat_delta * GRID_TARGET_PX / height_px);

    // Visible range padded by one step so lines slide in, not pop in.
    let lat_min = (center.latitude - lat_delta / 2.0 - step).max(-MAX_MERCATOR_LATITUDE);
    let lat_max = (center.latitude + lat_delta / 2.0 + step).min(MAX_MERCATOR_LATITUDE);
    let lon_min = (center.longitude - lon_delta / 2.0 - step).max(-180.0);
    let lon_max = (center.longitude + lon_delta / 2.0 + step).min(180.0);

    let line = |gizmos: &mut Gizmos, a: Coordinate, b: Coordinate, color: Color| {
        gizmos.line_2d(
            origin.to_world(project(a)),
            origin.to_world(project(b)),
            color,
        );
    };

    // Parallels.
    let first = (lat_min / step).ceil() as i64;
    let last = (lat_max / step).floor() as i64;
    for i in first..=last {
        let latitude = i as f64 * step;
        let color = if i == 0 { GRID_AXIS_COLOR } else { GRID_COLOR };
        line(
            &mut gizmos,
            Coordinate::clamped(latitude, lon_min),
            Coordinate::clamped(latitude, lon_max),
            color,
        );
    }

    // Meridians.
    let first = (lon_min / step).ceil() as i64;
    let last = (lon_max / step).floor() as i64;
    for i in first..=last {
        let longitude = i as f64 * step;
        let color = if i == 0 { GRID_AXIS_COLOR } else { GRID_COLOR };
        line(
            &mut gizmos,
            Coordinate::clamped(lat_min, longitude),
            Coordinate::clamped(lat_max, longitude),
            color,
        );
    }
}

/// Small crosshair at the viewport centre, where "Park Here" drops the pin.
pub fn draw_center_crosshair(
    viewport: Res<MapViewport>,
    origin: Res<MapOrigin>,
    cameras: Query<&OrthographicProjection, With<Camera2d>>,
    mut gizmos: Gizmos,
) {
    let Ok(projection) = cameras.get_single() else {
        return;
    };
    let center = origin.to_world(project(viewport.center));
    let arm = 7.0 * projection.scale;
    let color = Color::srgba(0.90, 0.92, 0.96, 0.45);
    gizmos.line_2d(
        center - Vec2::new(arm, 0.0),
        center + Vec2::new(arm, 0.0),
        color,
    );
    gizmos.line_2d(
        center - Vec2::new(0.0, arm),
        center + Vec2::new(0.0, arm),
        color,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_walks_the_125_ladder() {
        assert_eq!(choose_step(0.0008), 0.001);
        assert_eq!(choose_step(0.0015), 0.002);
        assert_eq!(choose_step(0.004), 0.005);
        assert_eq!(choose_step(0.7), 1.0);
        assert_eq!(choose_step(1.5), 2.0);
        assert_eq!(choose_step(3.0), 5.0);
        assert_eq!(choose_step(12.0), 15.0);
    }

    #[test]
    fn test_step_is_at_least_the_target() {
        for exponent in -4..2 {
            for mantissa in [1.0, 1.7, 3.3, 6.0, 9.9] {
                let target = mantissa * 10.0_f64.powi(exponent);
                let step = choose_step(target);
                assert!(
                    step >= target || step == 45.0,
                    "step {step} below target {target}"
                );
            }
        }
    }

    #[test]
    fn test_step_saturates_at_45_degrees() {
        assert_eq!(choose_step(40.0), 45.0);
        assert_eq!(choose_step(1000.0), 45.0);
    }

    #[test]
    fn test_step_handles_tiny_targets() {
        assert_eq!(choose_step(1e-7), 0.0001);
    }
}
