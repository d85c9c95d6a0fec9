//! The map viewport: which part of the world is on screen.
//!
//! The viewport is geographic (a centre coordinate plus a latitude span)
//! and is the single source of truth for what the camera shows. It is
//! transient state, rebuilt from the live location or the saved pin, and
//! never persisted itself.

use bevy::prelude::*;

use location::{Coordinate, LocationSession};

use crate::projection::MAX_MERCATOR_LATITUDE;

/// Narrowest allowed span, roughly a 55 m tall view.
pub const MIN_LATITUDE_DELTA: f64 = 0.0005;

/// Widest allowed span, most of a hemisphere.
pub const MAX_LATITUDE_DELTA: f64 = 120.0;

/// Span used when centring on a point of interest.
pub const DEFAULT_LATITUDE_DELTA: f64 = 0.01;

/// Angular size of the viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportSpan {
    pub latitude_delta: f64,
    pub longitude_delta: f64,
}

/// Centre and span of the visible map region.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct MapViewport {
    pub center: Coordinate,
    pub span: ViewportSpan,
}

impl Default for MapViewport {
    fn default() -> Self {
        Self::centered_on(Coordinate::clamped(0.0, 0.0))
    }
}

impl MapViewport {
    /// A viewport over `center` at the default zoom. The longitude delta
    /// starts equal and is reconciled against the window on the next frame.
    pub fn centered_on(center: Coordinate) -> Self {
        Self {
            center: clamp_center(center),
            span: ViewportSpan {
                latitude_delta: DEFAULT_LATITUDE_DELTA,
                longitude_delta: DEFAULT_LATITUDE_DELTA,
            },
        }
    }

    /// Moves the centre, keeping the current zoom.
    pub fn center_on(&mut self, center: Coordinate) {
        self.center = clamp_center(center);
    }

    /// Scales the latitude span; factors below 1 zoom in. The longitude
    /// span follows on the next reconcile.
    pub fn zoom_by(&mut self, factor: f64) {
        if !factor.is_finite() || factor <= 0.0 {
            return;
        }
        self.span.latitude_delta =
            (self.span.latitude_delta * factor).clamp(MIN_LATITUDE_DELTA, MAX_LATITUDE_DELTA);
    }

    /// Locks the longitude span to the window's aspect ratio so a metre on
    /// the ground is the same number of pixels in both axes.
    pub fn reconcile_span_aspect(&mut self, aspect: f64) {
        if !aspect.is_finite() || aspect <= 0.0 {
            return;
        }
        let cos_lat = self.center.latitude.to_radians().cos().max(0.01);
        self.span.longitude_delta = (self.span.latitude_delta * aspect / cos_lat).min(360.0);
    }
}

/// The viewport centre never carries a latitude the projection cannot
/// express; panning stops at the mercator clamp instead of sticking.
fn clamp_center(center: Coordinate) -> Coordinate {
    Coordinate::clamped(
        center
            .latitude
            .clamp(-MAX_MERCATOR_LATITUDE, MAX_MERCATOR_LATITUDE),
        center.longitude,
    )
}

// ---------------------------------------------------------------------------
// Follow mode
// ---------------------------------------------------------------------------

/// Whether the viewport chases incoming fixes. Starts on; panning the map
/// turns it off, the locate action turns it back on.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct FollowMode {
    pub enabled: bool,
}

impl Default for FollowMode {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Recentres the viewport on each new fix while follow mode is on.
pub fn follow_last_fix(
    session: Res<LocationSession>,
    follow: Res<FollowMode>,
    mut viewport: ResMut<MapViewport>,
    mut seen: Local<u64>,
) {
    if session.fixes_received == *seen {
        return;
    }
    *seen = session.fixes_received;

    if !follow.enabled {
        return;
    }
    let Some(coordinate) = session.last_known_coordinate() else {
        return;
    };
    viewport.center_on(coordinate);
}

/// Keeps the longitude span matched to the window as it resizes or the
/// centre moves in latitude.
pub fn reconcile_viewport_aspect(
    windows: Query<&Window>,
    mut viewport: ResMut<MapViewport>,
) {
    let Ok(window) = windows.get_single() else {
        return;
    };
    let (width, height) = (window.width(), window.height());
    if width <= 0.0 || height <= 0.0 {
        return;
    }
    let aspect = f64::from(width) / f64::from(height);
    let mut updated = *viewport;
    updated.reconcile_span_aspect(aspect);
    // Write only on real change so change detection stays meaningful.
    if updated != *viewport {
        *viewport = updated;
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use location::Fix;

    fn coord(latitude: f64, longitude: f64) -> Coordinate {
        Coordinate::new(latitude, longitude).unwrap()
    }

    fn session_with_fix(coordinate: Coordinate) -> LocationSession {
        LocationSession {
            last_fix: Some(Fix::new(coordinate, 10.0)),
            fixes_received: 1,
            ..default()
        }
    }

    #[test]
    fn test_zoom_clamps_to_limits() {
        let mut viewport = MapViewport::centered_on(coord(0.0, 0.0));

        for _ in 0..100 {
            viewport.zoom_by(0.5);
        }
        assert_eq!(viewport.span.latitude_delta, MIN_LATITUDE_DELTA);

        for _ in 0..100 {
            viewport.zoom_by(2.0);
        }
        assert_eq!(viewport.span.latitude_delta, MAX_LATITUDE_DELTA);
    }

    #[test]
    fn test_zoom_ignores_degenerate_factors() {
        let mut viewport = MapViewport::centered_on(coord(0.0, 0.0));
        let before = viewport.span.latitude_delta;

        viewport.zoom_by(0.0);
        viewport.zoom_by(-2.0);
        viewport.zoom_by(f64::NAN);
        assert_eq!(viewport.span.latitude_delta, before);
    }

    #[test]
    fn test_center_clamps_to_mercator_range() {
        let mut viewport = MapViewport::centered_on(coord(0.0, 0.0));
        viewport.center_on(Coordinate::clamped(89.9, 10.0));
        assert_eq!(viewport.center.latitude, MAX_MERCATOR_LATITUDE);
        assert_eq!(viewport.center.longitude, 10.0);
    }

    #[test]
    fn test_aspect_reconcile_square_window_at_equator() {
        let mut viewport = MapViewport::centered_on(coord(0.0, 0.0));
        viewport.reconcile_span_aspect(1.0);
        assert!((viewport.span.longitude_delta - viewport.span.latitude_delta).abs() < 1e-12);
    }

    #[test]
    fn test_aspect_reconcile_widens_away_from_equator() {
        // At 60 degrees north a degree of longitude is half as wide on the
        // ground, so the span must cover twice as many degrees.
        let mut viewport = MapViewport::centered_on(coord(60.0, 0.0));
        viewport.reconcile_span_aspect(1.0);

        let expected = viewport.span.latitude_delta / 60.0_f64.to_radians().cos();
        assert!((viewport.span.longitude_delta - expected).abs() < 1e-9);
    }

    #[test]
    fn test_aspect_reconcile_follows_window_shape() {
        let mut viewport = MapViewport::centered_on(coord(0.0, 0.0));
        viewport.reconcile_span_aspect(0.5);
        assert!(
            (viewport.span.longitude_delta - viewport.span.latitude_delta * 0.5).abs() < 1e-12
        );
    }

    #[test]
    fn test_follow_recenters_on_new_fix() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.init_resource::<FollowMode>();
        app.insert_resource(MapViewport::centered_on(coord(0.0, 0.0)));

        app.insert_resource(session_with_fix(coord(19.4326, -99.1332)));
        app.add_systems(Update, follow_last_fix);

        app.update();
        let viewport = app.world().resource::<MapViewport>();
        assert!(viewport.center.approx_eq(&coord(19.4326, -99.1332)));
    }

    #[test]
    fn test_follow_disabled_leaves_viewport_alone() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.insert_resource(FollowMode { enabled: false });
        app.insert_resource(MapViewport::centered_on(coord(1.0, 2.0)));
        app.insert_resource(session_with_fix(coord(19.4326, -99.1332)));
        app.add_systems(Update, follow_last_fix);

        app.update();
        let viewport = app.world().resource::<MapViewport>();
        assert!(viewport.center.approx_eq(&coord(1.0, 2.0)));
    }

    #[test]
    fn test_follow_does_not_fight_manual_pan_between_fixes() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.init_resource::<FollowMode>();
        app.insert_resource(MapViewport::centered_on(coord(0.0, 0.0)));

        app.insert_resource(session_with_fix(coord(5.0, 5.0)));
        app.add_systems(Update, follow_last_fix);

        // First update consumes the fix.
        app.update();

        // User pans; with no new fix the viewport must stay where they put it.
        app.world_mut()
            .resource_mut::<MapViewport>()
            .center_on(coord(7.0, 7.0));
        app.update();

        let viewport = app.world().resource::<MapViewport>();
        assert!(viewport.center.approx_eq(&coord(7.0, 7.0)));
    }
}
