//! The seam between the app and whatever supplies position data.
//!
//! Platform location services are callback-driven; Bevy is poll-driven. A
//! [`LocationDevice`] buffers whatever happened since the last frame and
//! hands it over as a batch of [`DeviceEvent`]s when polled. The session
//! layer never talks to hardware directly, which is also what makes the
//! whole permission flow testable with a scripted device.

use bevy::prelude::*;

use crate::authorization::AuthorizationState;
use crate::coordinate::Fix;

/// Something a location device reported since the previous poll.
#[derive(Event, Debug, Clone, PartialEq)]
pub enum DeviceEvent {
    AuthorizationChanged(AuthorizationState),
    /// One delivery callback. Devices may batch deferred fixes; the freshest
    /// fix comes first, matching platform delivery order.
    LocationUpdated(Vec<Fix>),
}

/// Platform-agnostic location source. Implementations must be cheap to poll
/// every frame and must never block.
pub trait LocationDevice: Send + Sync + 'static {
    /// Ask the platform to show its permission prompt. No-op once the user
    /// has already answered.
    fn request_authorization(&mut self);

    /// Begin delivering fixes. Idempotent.
    fn start_updates(&mut self);

    /// Stop delivering fixes. Idempotent.
    fn stop_updates(&mut self);

    /// Drain everything that happened since the last poll, oldest first.
    fn poll(&mut self) -> Vec<DeviceEvent>;
}

/// The installed device. The app decides at startup which implementation
/// goes in here; everything else only sees the trait.
#[derive(Resource)]
pub struct DeviceHandle(pub Box<dyn LocationDevice>);

/// Drains the device each frame and republishes as Bevy events so ordinary
/// systems can consume them with `EventReader`.
pub fn pump_device(mut device: ResMut<DeviceHandle>, mut events: EventWriter<DeviceEvent>) {
    events.send_batch(device.0.poll());
}
