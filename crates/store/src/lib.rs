use bevy::prelude::*;

#[cfg(not(target_arch = "wasm32"))]
mod atomic_write;
pub mod error;
#[cfg(not(target_arch = "wasm32"))]
pub mod json_settings;
pub mod pin;
pub mod settings;
#[cfg(target_arch = "wasm32")]
pub mod web_storage;

pub use error::SettingsError;
pub use pin::{ClearPinEvent, ParkingPin, PlacePinEvent};
pub use settings::{MemorySettings, PinStorage, SettingsStore};

pub struct StorePlugin;

impl Plugin for StorePlugin {
    fn build(&self, app: &mut App) {
        // The app shell installs a platform backend before this plugin runs.
        // Without one the pin still works, it just forgets on exit.
        if !app.world().contains_resource::<PinStorage>() {
            warn!("no settings backend installed; the parking pin will not survive restarts");
            app.insert_resource(PinStorage(Box::new(MemorySettings::default())));
        }

        app.init_resource::<ParkingPin>()
            .add_event::<PlacePinEvent>()
            .add_event::<ClearPinEvent>()
            .add_event::<location::NotificationEvent>()
            .add_systems(Startup, pin::load_parking_pin)
            .add_systems(Update, (pin::handle_place_pin, pin::handle_clear_pin));
    }
}
