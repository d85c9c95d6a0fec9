use bevy::input::mouse::{MouseScrollUnit, MouseWheel};
use bevy::prelude::*;
use bevy_egui::EguiContexts;

use crate::egui_input_guard::egui_wants_pointer;
use crate::projection::{project, span_world_height, unproject, MapOrigin};
use crate::viewport::{FollowMode, MapViewport};

const ZOOM_SPEED: f32 = 0.15;
/// Factors applied by the +/- keys and the toolbar zoom buttons.
pub const ZOOM_IN_STEP: f64 = 0.5;
pub const ZOOM_OUT_STEP: f64 = 2.0;

/// Tracks left-click drag state: differentiates click from drag.
/// When the mouse moves beyond `DRAG_THRESHOLD` pixels from the initial
/// press, it becomes a map pan rather than a click.
#[derive(Resource, Default)]
pub struct MapDrag {
    pub pressed: bool,
    pub start_pos: Vec2,
    pub last_pos: Vec2,
    /// True once the mouse has moved beyond the threshold.
    pub is_dragging: bool,
}

const DRAG_THRESHOLD: f32 = 5.0;

pub fn setup_camera(mut commands: Commands) {
    commands.spawn(Camera2d);
}

/// System: project the geographic viewport onto the camera each frame.
///
/// The viewport is authoritative; the camera transform and orthographic
/// scale are derived. Writes are skipped when nothing moved so camera
/// change detection stays meaningful, but a window resize alone still
/// lands because it changes the derived scale.
pub fn apply_viewport_to_camera(
    viewport: Res<MapViewport>,
    origin: Res<MapOrigin>,
    windows: Query<&Window>,
    mut cameras: Query<(&mut Transform, &mut OrthographicProjection), With<Camera2d>>,
) {
    let Ok(window) = windows.get_single() else {
        return;
    };
    let Ok((mut transform, mut projection)) = cameras.get_single_mut() else {
        return;
    };
    let height_px = window.height();
    if height_px <= 0.0 {
        return;
    }

    let world_height =
        span_world_height(viewport.span.latitude_delta, viewport.center.latitude) as f32;
    let scale = world_height / height_px;
    if projection.scale != scale {
        projection.scale = scale;
    }

    let world_center = origin.to_world(project(viewport.center));
    let target = world_center.extend(transform.translation.z);
    if transform.translation != target {
        transform.translation = target;
    }
}

/// Left-mouse drag: pan the viewport (with threshold to distinguish from
/// clicks). Grabbing the map hands control back to the user, so follow
/// mode switches off on the first dragged pixel.
pub fn camera_pan_drag(
    mut contexts: EguiContexts,
    buttons: Res<ButtonInput<MouseButton>>,
    windows: Query<&Window>,
    cameras: Query<&OrthographicProjection, With<Camera2d>>,
    mut drag: ResMut<MapDrag>,
    mut viewport: ResMut<MapViewport>,
    mut follow: ResMut<FollowMode>,
) {
    let Ok(window) = windows.get_single() else {
        return;
    };
    let Ok(projection) = cameras.get_single() else {
        return;
    };

    if buttons.just_pressed(MouseButton::Left) && !egui_wants_pointer(&mut contexts) {
        if let Some(pos) = window.cursor_position() {
            drag.pressed = true;
            drag.start_pos = pos;
            drag.last_pos = pos;
            drag.is_dragging = false;
        }
    }

    if buttons.just_released(MouseButton::Left) {
        drag.pressed = false;
        drag.is_dragging = false;
    }

    if !drag.pressed {
        return;
    }
    let Some(pos) = window.cursor_position() else {
        return;
    };

    if !drag.is_dragging && (pos - drag.start_pos).length() > DRAG_THRESHOLD {
        drag.is_dragging = true;
        drag.last_pos = pos;
        follow.enabled = false;
    }

    if drag.is_dragging {
        let delta = pos - drag.last_pos;
        if delta != Vec2::ZERO {
            // Screen y grows downward, world y grows upward.
            let world_delta = Vec2::new(-delta.x, delta.y) * projection.scale;
            let center = project(viewport.center) + world_delta.as_dvec2();
            viewport.center_on(unproject(center));
        }
        drag.last_pos = pos;
    }
}

/// Scroll wheel: zoom the viewport span.
pub fn camera_zoom_wheel(
    mut contexts: EguiContexts,
    mut scroll_evts: EventReader<MouseWheel>,
    mut viewport: ResMut<MapViewport>,
) {
    if egui_wants_pointer(&mut contexts) {
        scroll_evts.clear();
        return;
    }
    for evt in scroll_evts.read() {
        let dy = match evt.unit {
            MouseScrollUnit::Line => evt.y,
            MouseScrollUnit::Pixel => evt.y / 100.0,
        };
        // TODO: zoom about the cursor position instead of the view centre.
        let factor = 1.0 - dy * ZOOM_SPEED;
        viewport.zoom_by(f64::from(factor));
    }
}

/// Plus/minus keys: stepped zoom.
pub fn camera_zoom_keyboard(
    keys: Res<ButtonInput<KeyCode>>,
    mut viewport: ResMut<MapViewport>,
) {
    if keys.just_pressed(KeyCode::Equal) || keys.just_pressed(KeyCode::NumpadAdd) {
        viewport.zoom_by(ZOOM_IN_STEP);
    }
    if keys.just_pressed(KeyCode::Minus) || keys.just_pressed(KeyCode::NumpadSubtract) {
        viewport.zoom_by(ZOOM_OUT_STEP);
    }
}
