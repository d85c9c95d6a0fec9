//! The location session: authorization state machine and fix intake.
//!
//! [`LocationSession`] is the single source of truth for "may we read the
//! position, and where was it last seen". It is mutated only by
//! [`DeviceEvent`]s pumped from the installed device and by
//! [`LocateRequestEvent`]s from the UI; everything else reads it.
//!
//! Authorization handling is re-entrant: every
//! `AuthorizationChanged` event re-runs the same switch, so a state that is
//! delivered twice (or re-granted from system settings after a denial) lands
//! in the same place as the first delivery.

use bevy::prelude::*;

use crate::authorization::AuthorizationState;
use crate::coordinate::{Coordinate, Fix};
use crate::device::{pump_device, DeviceEvent, DeviceHandle};
use crate::notifications::{NotificationEvent, NotificationSeverity};
use crate::simulated::drive_simulated_device;

// =============================================================================
// Resource
// =============================================================================

/// Current authorization and the most recently reported fix.
///
/// One instance lives for the whole process. `last_fix` only ever moves
/// forward: each delivery overwrites the previous one, nothing is averaged
/// or filtered.
#[derive(Resource, Debug, Default)]
pub struct LocationSession {
    pub authorization: AuthorizationState,
    pub last_fix: Option<Fix>,
    /// Total deliveries accepted, for status displays and tests.
    pub fixes_received: u64,
}

impl LocationSession {
    /// The coordinate of the last accepted fix, if any.
    pub fn last_known_coordinate(&self) -> Option<Coordinate> {
        self.last_fix.map(|fix| fix.coordinate)
    }
}

// =============================================================================
// Events
// =============================================================================

/// "Find out where I am": request authorization if never asked, otherwise
/// (re)start position updates. Sent by the Locate button and once at startup.
#[derive(Event, Debug, Default)]
pub struct LocateRequestEvent;

// =============================================================================
// Systems
// =============================================================================

/// Sends the initial locate request so the permission prompt appears on
/// first launch without any user action.
fn request_location_on_startup(mut requests: EventWriter<LocateRequestEvent>) {
    requests.send(LocateRequestEvent);
}

/// Applies device events to the session.
///
/// Authorization changes re-run the full switch: authorized states start
/// updates, blocked states stop them and warn once per transition, and
/// undetermined/unknown states wait for the next locate request. Position
/// deliveries take the first fix of the batch (devices report the freshest
/// first) and are ignored outright while not authorized.
fn apply_device_events(
    mut events: EventReader<DeviceEvent>,
    mut session: ResMut<LocationSession>,
    mut device: ResMut<DeviceHandle>,
    mut notifications: EventWriter<NotificationEvent>,
) {
    for event in events.read() {
        match event {
            DeviceEvent::AuthorizationChanged(state) => {
                let was_blocked = session.authorization.is_blocked();
                session.authorization = *state;

                if state.is_authorized() {
                    device.0.start_updates();
                } else if state.is_blocked() {
                    device.0.stop_updates();
                    if !was_blocked {
                        warn!("location access {}", state.label());
                        notifications.send(NotificationEvent {
                            text: "Location access is off. Enable it in system settings to see \
                                   your position."
                                .to_string(),
                            severity: NotificationSeverity::Warning,
                        });
                    }
                }
            }
            DeviceEvent::LocationUpdated(fixes) => {
                if !session.authorization.is_authorized() {
                    continue;
                }
                let Some(fix) = fixes.first() else {
                    continue;
                };
                session.last_fix = Some(*fix);
                session.fixes_received += 1;
            }
        }
    }
}

/// Turns a locate request into the right device command for the current
/// authorization state. Multiple requests in one frame collapse into one.
fn handle_locate_requests(
    mut requests: EventReader<LocateRequestEvent>,
    session: Res<LocationSession>,
    mut device: ResMut<DeviceHandle>,
    mut notifications: EventWriter<NotificationEvent>,
) {
    if requests.read().next().is_none() {
        return;
    }
    requests.read().for_each(drop);

    match session.authorization {
        AuthorizationState::Undetermined | AuthorizationState::Unknown => {
            device.0.request_authorization();
        }
        state if state.is_authorized() => {
            device.0.start_updates();
        }
        _ => {
            // Denied or restricted: asking again is pointless, tell the user
            // where the switch lives instead.
            notifications.send(NotificationEvent {
                text: "Location access is off. Enable it in system settings.".to_string(),
                severity: NotificationSeverity::Warning,
            });
        }
    }
}

// =============================================================================
// Plugin
// =============================================================================

pub struct SessionPlugin;

impl Plugin for SessionPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<LocationSession>()
            .add_event::<DeviceEvent>()
            .add_event::<LocateRequestEvent>()
            .add_systems(Startup, request_location_on_startup)
            .add_systems(
                Update,
                (
                    drive_simulated_device,
                    pump_device,
                    apply_device_events,
                    handle_locate_requests,
                )
                    .chain(),
            );
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scripted::{ScriptedDevice, ScriptedHandle};

    fn fix_at(latitude: f64, longitude: f64) -> Fix {
        Fix::new(Coordinate::clamped(latitude, longitude), 10.0)
    }

    /// Headless app with a scripted device installed.
    fn scripted_app() -> (App, ScriptedHandle) {
        let (device, handle) = ScriptedDevice::new();
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.insert_resource(DeviceHandle(Box::new(device)));
        app.add_plugins(crate::LocationPlugin);
        (app, handle)
    }

    fn session(app: &App) -> &LocationSession {
        app.world().resource::<LocationSession>()
    }

    fn drain_notifications(app: &mut App) -> Vec<NotificationEvent> {
        app.world_mut()
            .resource_mut::<Events<NotificationEvent>>()
            .drain()
            .collect()
    }

    #[test]
    fn test_startup_requests_authorization_when_undetermined() {
        let (mut app, handle) = scripted_app();
        app.update();

        assert_eq!(handle.authorization_requests(), 1);
        assert_eq!(
            session(&app).authorization,
            AuthorizationState::Undetermined
        );
    }

    #[test]
    fn test_grant_then_fix_reaches_session() {
        let (mut app, handle) = scripted_app();
        handle.queue(vec![DeviceEvent::AuthorizationChanged(
            AuthorizationState::AuthorizedWhenInUse,
        )]);
        handle.queue(vec![DeviceEvent::LocationUpdated(vec![fix_at(
            19.4326, -99.1332,
        )])]);

        app.update(); // authorization lands, session starts updates
        assert!(handle.is_started());

        app.update(); // fix lands
        let coordinate = session(&app).last_known_coordinate().unwrap();
        assert!(coordinate.approx_eq(&Coordinate::clamped(19.4326, -99.1332)));
    }

    #[test]
    fn test_fixes_are_ignored_unless_authorized() {
        let (mut app, handle) = scripted_app();

        // Fix while still undetermined.
        handle.queue(vec![DeviceEvent::LocationUpdated(vec![fix_at(1.0, 1.0)])]);
        app.update();
        assert!(session(&app).last_known_coordinate().is_none());

        // Denied, then another fix: still nothing.
        handle.queue(vec![DeviceEvent::AuthorizationChanged(
            AuthorizationState::Denied,
        )]);
        handle.queue(vec![DeviceEvent::LocationUpdated(vec![fix_at(2.0, 2.0)])]);
        app.update();
        app.update();
        assert!(session(&app).last_known_coordinate().is_none());
        assert_eq!(session(&app).fixes_received, 0);
    }

    #[test]
    fn test_last_callback_wins_across_polls() {
        let (mut app, handle) = scripted_app();
        handle.queue(vec![DeviceEvent::AuthorizationChanged(
            AuthorizationState::AuthorizedAlways,
        )]);
        app.update();

        for (lat, lon) in [(10.0, 10.0), (20.0, 20.0), (30.0, 30.0)] {
            handle.queue(vec![DeviceEvent::LocationUpdated(vec![fix_at(lat, lon)])]);
            app.update();
        }

        let coordinate = session(&app).last_known_coordinate().unwrap();
        assert!(coordinate.approx_eq(&Coordinate::clamped(30.0, 30.0)));
        assert_eq!(session(&app).fixes_received, 3);
    }

    #[test]
    fn test_takes_first_fix_of_batch() {
        // Devices put the freshest fix first when they deliver a batch; only
        // that one is kept, the rest are dropped without filtering.
        let (mut app, handle) = scripted_app();
        handle.queue(vec![DeviceEvent::AuthorizationChanged(
            AuthorizationState::AuthorizedWhenInUse,
        )]);
        app.update();

        handle.queue(vec![DeviceEvent::LocationUpdated(vec![
            fix_at(40.7128, -74.0060),
            fix_at(41.0, -75.0),
        ])]);
        app.update();

        let coordinate = session(&app).last_known_coordinate().unwrap();
        assert!(coordinate.approx_eq(&Coordinate::clamped(40.7128, -74.0060)));
        assert_eq!(session(&app).fixes_received, 1);
    }

    #[test]
    fn test_denial_warns_once_per_transition() {
        let (mut app, handle) = scripted_app();
        app.update();
        drain_notifications(&mut app);

        handle.queue(vec![DeviceEvent::AuthorizationChanged(
            AuthorizationState::Denied,
        )]);
        app.update();
        let first = drain_notifications(&mut app);
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].severity, NotificationSeverity::Warning);

        // The same state delivered again is idempotent: no second toast.
        handle.queue(vec![DeviceEvent::AuthorizationChanged(
            AuthorizationState::Denied,
        )]);
        app.update();
        assert!(drain_notifications(&mut app).is_empty());
    }

    #[test]
    fn test_regrant_after_denial_restarts_updates() {
        let (mut app, handle) = scripted_app();
        handle.queue(vec![DeviceEvent::AuthorizationChanged(
            AuthorizationState::Denied,
        )]);
        app.update();
        assert!(!handle.is_started());

        // A settings change grants access from outside the app.
        handle.queue(vec![DeviceEvent::AuthorizationChanged(
            AuthorizationState::AuthorizedWhenInUse,
        )]);
        handle.queue(vec![DeviceEvent::LocationUpdated(vec![fix_at(5.0, 6.0)])]);
        app.update();
        assert!(handle.is_started());

        app.update();
        assert!(session(&app).last_known_coordinate().is_some());
    }

    #[test]
    fn test_locate_while_blocked_warns_instead_of_asking() {
        let (mut app, handle) = scripted_app();
        handle.queue(vec![DeviceEvent::AuthorizationChanged(
            AuthorizationState::Restricted,
        )]);
        app.update();
        drain_notifications(&mut app);
        let requests_before = handle.authorization_requests();

        app.world_mut().send_event(LocateRequestEvent);
        app.update();

        assert_eq!(handle.authorization_requests(), requests_before);
        let toasts = drain_notifications(&mut app);
        assert_eq!(toasts.len(), 1);
        assert_eq!(toasts[0].severity, NotificationSeverity::Warning);
    }

    #[test]
    fn test_locate_while_authorized_restarts_updates() {
        let (mut app, handle) = scripted_app();
        handle.queue(vec![DeviceEvent::AuthorizationChanged(
            AuthorizationState::AuthorizedWhenInUse,
        )]);
        app.update();
        handle.set_started(false);

        app.world_mut().send_event(LocateRequestEvent);
        app.update();
        assert!(handle.is_started());
    }
}
