//! Map markers: the saved parking pin and the user's position.
//!
//! Both markers are spawned once and repositioned from resources every
//! frame. Their children are sized in logical pixels and the root is scaled
//! by the camera's orthographic scale, so markers stay the same size on
//! screen at every zoom level.

use bevy::prelude::*;

use location::LocationSession;
use store::ParkingPin;

use crate::projection::{project, MapOrigin};

const PIN_COLOR: Color = Color::srgb(0.95, 0.35, 0.30);
const PIN_STEM_COLOR: Color = Color::srgb(0.75, 0.25, 0.22);
const USER_RING_COLOR: Color = Color::srgb(0.92, 0.95, 1.0);
const USER_DOT_COLOR: Color = Color::srgb(0.25, 0.55, 0.95);
const ACCURACY_COLOR: Color = Color::srgba(0.25, 0.55, 0.95, 0.25);

/// Marker component on the parking pin root entity.
#[derive(Component)]
pub struct PinMarker;

/// Marker component on the user position root entity.
#[derive(Component)]
pub struct UserMarker;

/// The inner dot of the user marker; pulses gently.
#[derive(Component)]
pub struct UserDot;

/// Spawns both markers hidden; visibility follows the resources each frame.
pub fn setup_markers(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
) {
    // A classic map pin: stem up from the anchor point, diamond head on top.
    commands
        .spawn((
            PinMarker,
            Transform::from_translation(Vec3::ZERO),
            Visibility::Hidden,
        ))
        .with_children(|parent| {
            parent.spawn((
                Mesh2d(meshes.add(Rectangle::new(3.0, 14.0))),
                MeshMaterial2d(materials.add(PIN_STEM_COLOR)),
                Transform::from_xyz(0.0, 7.0, 0.0),
            ));
            parent.spawn((
                Mesh2d(meshes.add(Rectangle::new(13.0, 13.0))),
                MeshMaterial2d(materials.add(PIN_COLOR)),
                Transform::from_xyz(0.0, 18.0, 0.1)
                    .with_rotation(Quat::from_rotation_z(std::f32::consts::FRAC_PI_4)),
            ));
        });

    // The user dot: white rim, blue centre.
    commands
        .spawn((
            UserMarker,
            Transform::from_translation(Vec3::ZERO),
            Visibility::Hidden,
        ))
        .with_children(|parent| {
            parent.spawn((
                Mesh2d(meshes.add(Circle::new(9.0))),
                MeshMaterial2d(materials.add(USER_RING_COLOR)),
                Transform::from_xyz(0.0, 0.0, 0.0),
            ));
            parent.spawn((
                UserDot,
                Mesh2d(meshes.add(Circle::new(6.0))),
                MeshMaterial2d(materials.add(USER_DOT_COLOR)),
                Transform::from_xyz(0.0, 0.0, 0.1),
            ));
        });
}

/// Moves, scales and shows/hides the markers from the pin and session state.
pub fn update_markers(
    origin: Res<MapOrigin>,
    pin: Res<ParkingPin>,
    session: Res<LocationSession>,
    cameras: Query<&OrthographicProjection, With<Camera2d>>,
    mut pins: Query<
        (&mut Transform, &mut Visibility),
        (With<PinMarker>, Without<UserMarker>),
    >,
    mut users: Query<
        (&mut Transform, &mut Visibility),
        (With<UserMarker>, Without<PinMarker>),
    >,
) {
    let Ok(projection) = cameras.get_single() else {
        return;
    };
    let scale = projection.scale;

    if let Ok((mut transform, mut visibility)) = pins.get_single_mut() {
        match pin.recenter_target() {
            Some(coordinate) => {
                transform.translation = origin.to_world(project(coordinate)).extend(11.0);
                transform.scale = Vec3::splat(scale);
                *visibility = Visibility::Visible;
            }
            None => *visibility = Visibility::Hidden,
        }
    }

    if let Ok((mut transform, mut visibility)) = users.get_single_mut() {
        match session.last_known_coordinate() {
            Some(coordinate) => {
                transform.translation = origin.to_world(project(coordinate)).extend(10.0);
                transform.scale = Vec3::splat(scale);
                *visibility = Visibility::Visible;
            }
            None => *visibility = Visibility::Hidden,
        }
    }
}

/// Pulse the user dot at 1 Hz between 90% and 110% size.
pub fn pulse_user_marker(time: Res<Time>, mut dots: Query<&mut Transform, With<UserDot>>) {
    let Ok(mut transform) = dots.get_single_mut() else {
        return;
    };
    let sine = (time.elapsed_secs() * std::f32::consts::TAU).sin();
    transform.scale = Vec3::splat(1.0 + sine * 0.1);
}

/// Draws the fix accuracy circle around the user marker.
///
/// The accuracy radius is ground metres; mercator metres stretch by
/// 1/cos(latitude), so the drawn radius is corrected or the circle would
/// read too small away from the equator.
pub fn draw_accuracy_halo(
    origin: Res<MapOrigin>,
    session: Res<LocationSession>,
    mut gizmos: Gizmos,
) {
    let Some(fix) = session.last_fix else {
        return;
    };
    let cos_lat = fix.coordinate.latitude.to_radians().cos().max(0.01);
    let radius = (fix.horizontal_accuracy_m / cos_lat) as f32;
    let center = origin.to_world(project(fix.coordinate));
    gizmos.circle_2d(
        Isometry2d::from_translation(center),
        radius,
        ACCURACY_COLOR,
    );
}
