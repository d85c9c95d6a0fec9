use bevy::prelude::*;

pub mod authorization;
pub mod config;
pub mod coordinate;
pub mod device;
pub mod notifications;
pub mod scripted;
pub mod session;
pub mod simulated;

pub use authorization::AuthorizationState;
pub use coordinate::{Coordinate, Fix};
pub use device::{DeviceEvent, DeviceHandle, LocationDevice};
pub use notifications::{NotificationEvent, NotificationSeverity};
pub use session::{LocateRequestEvent, LocationSession};
pub use simulated::{SimulatedDevice, SimulatorLink};

pub struct LocationPlugin;

impl Plugin for LocationPlugin {
    fn build(&self, app: &mut App) {
        // The app normally installs a device before this plugin. Fall back to
        // a device that never reports, so headless tests and stripped-down
        // builds still get a working (if silent) session.
        if !app.world().contains_resource::<DeviceHandle>() {
            warn!("no location device installed; session will never get a fix");
            let (device, _) = scripted::ScriptedDevice::new();
            app.insert_resource(DeviceHandle(Box::new(device)));
        }

        app.add_plugins(notifications::NotificationsPlugin)
            .add_plugins(session::SessionPlugin);
    }
}
