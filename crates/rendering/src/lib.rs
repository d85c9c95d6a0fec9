use bevy::prelude::*;

pub mod camera;
pub mod egui_input_guard;
pub mod graticule;
pub mod markers;
pub mod projection;
pub mod viewport;

pub use projection::MapOrigin;
pub use viewport::{FollowMode, MapViewport};

use camera::MapDrag;

pub struct RenderingPlugin;

impl Plugin for RenderingPlugin {
    fn build(&self, app: &mut App) {
        // The map origin anchors at wherever the app shell pointed the
        // viewport, so the first frame already renders near world zero.
        let center = app
            .world_mut()
            .get_resource_or_insert_with(MapViewport::default)
            .center;
        app.insert_resource(MapOrigin::anchored_at(center));

        app.init_resource::<MapDrag>()
            .init_resource::<FollowMode>()
            .add_systems(Startup, (camera::setup_camera, markers::setup_markers))
            .add_systems(
                Update,
                (
                    camera::camera_pan_drag,
                    camera::camera_zoom_wheel,
                    camera::camera_zoom_keyboard,
                    viewport::follow_last_fix,
                    viewport::reconcile_viewport_aspect,
                    projection::reanchor_origin,
                    camera::apply_viewport_to_camera,
                    markers::update_markers,
                    markers::pulse_user_marker,
                )
                    .chain(),
            )
            .add_systems(
                Update,
                (
                    graticule::draw_graticule,
                    graticule::draw_center_crosshair,
                    markers::draw_accuracy_halo,
                )
                    .after(projection::reanchor_origin),
            );
    }
}
