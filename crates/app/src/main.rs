use bevy::prelude::*;
use bevy::window::PresentMode;
use bevy::winit::{UpdateMode, WinitSettings};

use location::config::{DEFAULT_HOME, DEFAULT_SIMULATOR_SEED};
use location::{Coordinate, DeviceHandle, SimulatedDevice};
use rendering::MapViewport;
use store::PinStorage;

fn main() {
    let mut app = App::new();

    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(Window {
            title: "ParkMark".to_string(),
            resolution: (480.0, 860.0).into(),
            present_mode: PresentMode::AutoVsync,
            ..default()
        }),
        ..default()
    }))
    .insert_resource(WinitSettings {
        focused_mode: UpdateMode::reactive_low_power(std::time::Duration::from_millis(16)),
        unfocused_mode: UpdateMode::reactive_low_power(std::time::Duration::from_millis(100)),
    })
    .insert_resource(ClearColor(Color::srgb(0.07, 0.09, 0.12)));

    let home = home_from_env();
    let seed = seed_from_env();
    let (device, link) = SimulatedDevice::new(home, seed);

    app.insert_resource(DeviceHandle(Box::new(device)))
        .insert_resource(link)
        .insert_resource(settings_backend())
        .insert_resource(MapViewport::centered_on(home));

    app.add_plugins((
        location::LocationPlugin,
        store::StorePlugin,
        rendering::RenderingPlugin,
        ui::UiPlugin,
    ));

    app.run();
}

/// Reads `PARKMARK_HOME` ("lat,lon") or falls back to the default.
fn home_from_env() -> Coordinate {
    let Ok(raw) = std::env::var("PARKMARK_HOME") else {
        return DEFAULT_HOME;
    };
    match parse_home(&raw) {
        Some(home) => home,
        None => {
            warn!("invalid PARKMARK_HOME {raw:?}; using default");
            DEFAULT_HOME
        }
    }
}

fn parse_home(raw: &str) -> Option<Coordinate> {
    let (lat, lon) = raw.split_once(',')?;
    Coordinate::new(lat.trim().parse().ok()?, lon.trim().parse().ok()?)
}

/// Reads `PARKMARK_SEED` or falls back to the default.
fn seed_from_env() -> u64 {
    let Ok(raw) = std::env::var("PARKMARK_SEED") else {
        return DEFAULT_SIMULATOR_SEED;
    };
    match raw.parse() {
        Ok(seed) => seed,
        Err(_) => {
            warn!("invalid PARKMARK_SEED {raw:?}; using default");
            DEFAULT_SIMULATOR_SEED
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn settings_backend() -> PinStorage {
    let path = std::env::var("PARKMARK_SETTINGS")
        .unwrap_or_else(|_| "parkmark_settings.json".to_string());
    PinStorage(Box::new(
        store::json_settings::JsonFileSettings::open_or_default(path),
    ))
}

#[cfg(target_arch = "wasm32")]
fn settings_backend() -> PinStorage {
    PinStorage(Box::new(store::web_storage::WebStorageSettings))
}
