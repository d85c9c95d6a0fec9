//! The single saved parking spot.
//!
//! One pin per installation. Placing overwrites unconditionally, clearing
//! forgets it, and every mutation is pushed through the settings store
//! before the frame ends so a force-quit never loses a placement. When the
//! store write fails the in-memory pin is kept and the user is warned; the
//! pin then lives until the process exits.

use bevy::prelude::*;

use location::{Coordinate, NotificationEvent, NotificationSeverity};

use crate::error::SettingsError;
use crate::settings::{
    PinStorage, SettingsStore, KEY_PIN_LATITUDE, KEY_PIN_LONGITUDE, KEY_PIN_PRESENT,
};

// ---------------------------------------------------------------------------
// Resource
// ---------------------------------------------------------------------------

/// The saved spot, `None` until the user places one.
#[derive(Resource, Debug, Clone, PartialEq, Default)]
pub struct ParkingPin {
    saved: Option<Coordinate>,
}

impl ParkingPin {
    pub fn is_present(&self) -> bool {
        self.saved.is_some()
    }

    /// Where to recenter the map, only when a pin exists. The UI keys the
    /// enabled state of its recenter action off this.
    pub fn recenter_target(&self) -> Option<Coordinate> {
        self.saved
    }

    pub fn place_in_memory(&mut self, coordinate: Coordinate) {
        self.saved = Some(coordinate);
    }

    pub fn clear_in_memory(&mut self) {
        self.saved = None;
    }
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Save the given coordinate as the parking spot.
#[derive(Event, Debug, Clone, Copy)]
pub struct PlacePinEvent {
    pub coordinate: Coordinate,
}

/// Forget the saved spot.
#[derive(Event, Debug, Clone, Copy, Default)]
pub struct ClearPinEvent;

// ---------------------------------------------------------------------------
// Persistence
// ---------------------------------------------------------------------------

/// Reads the persisted pin. A missing or false presence flag, missing
/// fields, or an out-of-range coordinate all read as "no pin".
pub fn load_pin(store: &dyn SettingsStore) -> Option<Coordinate> {
    if !store.get_bool(KEY_PIN_PRESENT)? {
        return None;
    }
    let latitude = store.get_f64(KEY_PIN_LATITUDE)?;
    let longitude = store.get_f64(KEY_PIN_LONGITUDE)?;
    Coordinate::new(latitude, longitude)
}

/// Persists a placement. The coordinate fields land before the presence
/// flag, so a failure partway through can never leave the flag pointing at
/// a half-written coordinate.
pub fn persist_place(
    store: &mut dyn SettingsStore,
    coordinate: Coordinate,
) -> Result<(), SettingsError> {
    store.set_f64(KEY_PIN_LATITUDE, coordinate.latitude)?;
    store.set_f64(KEY_PIN_LONGITUDE, coordinate.longitude)?;
    store.set_bool(KEY_PIN_PRESENT, true)
}

/// Persists a clear. Only the flag changes; stale coordinates behind a
/// false flag are never read.
pub fn persist_clear(store: &mut dyn SettingsStore) -> Result<(), SettingsError> {
    store.set_bool(KEY_PIN_PRESENT, false)
}

// ---------------------------------------------------------------------------
// Systems
// ---------------------------------------------------------------------------

/// Restores the saved pin at startup.
pub fn load_parking_pin(mut pin: ResMut<ParkingPin>, storage: Res<PinStorage>) {
    if let Some(coordinate) = load_pin(storage.0.as_ref()) {
        pin.place_in_memory(coordinate);
        info!("restored parking spot at {coordinate}");
    }
}

/// Applies placement requests. Several requests in one frame collapse to
/// the last one; the slot only ever holds a single value.
pub fn handle_place_pin(
    mut events: EventReader<PlacePinEvent>,
    mut pin: ResMut<ParkingPin>,
    mut storage: ResMut<PinStorage>,
    mut notifications: EventWriter<NotificationEvent>,
) {
    let Some(event) = events.read().last().copied() else {
        return;
    };

    pin.place_in_memory(event.coordinate);
    match persist_place(storage.0.as_mut(), event.coordinate) {
        Ok(()) => {
            info!("parking spot saved at {}", event.coordinate);
            notifications.send(NotificationEvent {
                text: "Parking spot saved".to_string(),
                severity: NotificationSeverity::Positive,
            });
        }
        Err(e) => {
            error!("failed to save parking spot: {e}");
            notifications.send(NotificationEvent {
                text: "Couldn't save your spot; it may be lost when the app closes".to_string(),
                severity: NotificationSeverity::Warning,
            });
        }
    }
}

/// Clears the saved spot.
pub fn handle_clear_pin(
    mut events: EventReader<ClearPinEvent>,
    mut pin: ResMut<ParkingPin>,
    mut storage: ResMut<PinStorage>,
    mut notifications: EventWriter<NotificationEvent>,
) {
    if events.read().next().is_none() {
        return;
    }
    events.read().for_each(drop);

    pin.clear_in_memory();
    match persist_clear(storage.0.as_mut()) {
        Ok(()) => {
            notifications.send(NotificationEvent {
                text: "Saved spot cleared".to_string(),
                severity: NotificationSeverity::Info,
            });
        }
        Err(e) => {
            error!("failed to clear parking spot: {e}");
            notifications.send(NotificationEvent {
                text: "Couldn't update saved spot on disk".to_string(),
                severity: NotificationSeverity::Warning,
            });
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::MemorySettings;

    fn coord(latitude: f64, longitude: f64) -> Coordinate {
        Coordinate::new(latitude, longitude).unwrap()
    }

    fn store_app(store: impl SettingsStore) -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.insert_resource(PinStorage(Box::new(store)));
        app.add_plugins(crate::StorePlugin);
        app
    }

    fn drain_notifications(app: &mut App) -> Vec<NotificationEvent> {
        app.world_mut()
            .resource_mut::<Events<NotificationEvent>>()
            .drain()
            .collect()
    }

    #[test]
    fn test_place_then_load_round_trips() {
        let mut store = MemorySettings::default();
        let spot = coord(40.7128, -74.0060);

        persist_place(&mut store, spot).unwrap();
        let loaded = load_pin(&store).unwrap();
        assert!(loaded.approx_eq(&spot));
    }

    #[test]
    fn test_load_is_none_before_any_place() {
        let store = MemorySettings::default();
        assert_eq!(load_pin(&store), None);
    }

    #[test]
    fn test_repeated_place_keeps_last_value() {
        let mut store = MemorySettings::default();
        persist_place(&mut store, coord(1.0, 2.0)).unwrap();
        persist_place(&mut store, coord(3.0, 4.0)).unwrap();
        persist_place(&mut store, coord(3.0, 4.0)).unwrap();

        assert!(load_pin(&store).unwrap().approx_eq(&coord(3.0, 4.0)));
    }

    #[test]
    fn test_load_ignores_coordinates_behind_false_flag() {
        let mut store = MemorySettings::default();
        persist_place(&mut store, coord(10.0, 20.0)).unwrap();
        persist_clear(&mut store).unwrap();

        assert_eq!(load_pin(&store), None);
    }

    #[test]
    fn test_load_rejects_out_of_range_coordinates() {
        // A tampered or buggy settings file must not produce a phantom pin.
        let mut store = MemorySettings::default();
        store.set_f64(KEY_PIN_LATITUDE, 200.0).unwrap();
        store.set_f64(KEY_PIN_LONGITUDE, 0.0).unwrap();
        store.set_bool(KEY_PIN_PRESENT, true).unwrap();

        assert_eq!(load_pin(&store), None);
    }

    #[test]
    fn test_recenter_target_follows_presence() {
        let mut pin = ParkingPin::default();
        assert_eq!(pin.recenter_target(), None);
        assert!(!pin.is_present());

        pin.place_in_memory(coord(5.0, 6.0));
        assert_eq!(pin.recenter_target(), Some(coord(5.0, 6.0)));

        pin.clear_in_memory();
        assert_eq!(pin.recenter_target(), None);
    }

    #[test]
    fn test_place_event_updates_pin_and_persists() {
        let mut app = store_app(MemorySettings::default());
        let spot = coord(40.7128, -74.0060);

        app.world_mut().send_event(PlacePinEvent { coordinate: spot });
        app.update();

        let pin = app.world().resource::<ParkingPin>();
        assert!(pin.recenter_target().unwrap().approx_eq(&spot));

        let storage = app.world().resource::<PinStorage>();
        assert_eq!(storage.0.get_bool(KEY_PIN_PRESENT), Some(true));
        assert_eq!(storage.0.get_f64(KEY_PIN_LATITUDE), Some(40.7128));
        assert_eq!(storage.0.get_f64(KEY_PIN_LONGITUDE), Some(-74.0060));

        let toasts = drain_notifications(&mut app);
        assert_eq!(toasts.len(), 1);
        assert_eq!(toasts[0].severity, NotificationSeverity::Positive);
    }

    #[test]
    fn test_two_places_in_one_frame_keep_the_last() {
        let mut app = store_app(MemorySettings::default());

        app.world_mut().send_event(PlacePinEvent {
            coordinate: coord(1.0, 1.0),
        });
        app.world_mut().send_event(PlacePinEvent {
            coordinate: coord(2.0, 2.0),
        });
        app.update();

        let pin = app.world().resource::<ParkingPin>();
        assert!(pin.recenter_target().unwrap().approx_eq(&coord(2.0, 2.0)));
    }

    #[test]
    fn test_clear_event_forgets_pin() {
        let mut app = store_app(MemorySettings::default());

        app.world_mut().send_event(PlacePinEvent {
            coordinate: coord(7.0, 8.0),
        });
        app.update();
        drain_notifications(&mut app);

        app.world_mut().send_event(ClearPinEvent);
        app.update();

        assert!(!app.world().resource::<ParkingPin>().is_present());
        let storage = app.world().resource::<PinStorage>();
        assert_eq!(storage.0.get_bool(KEY_PIN_PRESENT), Some(false));

        let toasts = drain_notifications(&mut app);
        assert_eq!(toasts.len(), 1);
        assert_eq!(toasts[0].severity, NotificationSeverity::Info);
    }

    #[test]
    fn test_failed_write_keeps_memory_pin_and_warns() {
        let mut failing = MemorySettings::default();
        failing.set_fail_writes(true);
        let mut app = store_app(failing);
        let spot = coord(19.4326, -99.1332);

        app.world_mut().send_event(PlacePinEvent { coordinate: spot });
        app.update();

        // The pin survives in memory for this run even though the write
        // failed, and the user hears about it.
        let pin = app.world().resource::<ParkingPin>();
        assert!(pin.recenter_target().unwrap().approx_eq(&spot));

        let storage = app.world().resource::<PinStorage>();
        assert_eq!(storage.0.get_bool(KEY_PIN_PRESENT), None);

        let toasts = drain_notifications(&mut app);
        assert_eq!(toasts.len(), 1);
        assert_eq!(toasts[0].severity, NotificationSeverity::Warning);
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_pin_survives_simulated_restart() {
        use crate::json_settings::JsonFileSettings;

        let dir = std::env::temp_dir().join("parkmark_pin_restart");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("settings.json");
        let spot = coord(40.7128, -74.0060);

        {
            let mut app = store_app(JsonFileSettings::open_or_default(&path));
            app.world_mut().send_event(PlacePinEvent { coordinate: spot });
            app.update();
        }

        // Fresh app over the same file, as after a relaunch.
        let mut app = store_app(JsonFileSettings::open_or_default(&path));
        app.update();

        let pin = app.world().resource::<ParkingPin>();
        assert!(pin.recenter_target().unwrap().approx_eq(&spot));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
