use crate::coordinate::Coordinate;

/// Start position when no override is configured: central Mexico City.
pub const DEFAULT_HOME: Coordinate = Coordinate {
    latitude: 19.4326,
    longitude: -99.1332,
};

/// Seed for the simulated device when none is configured.
pub const DEFAULT_SIMULATOR_SEED: u64 = 7;

/// Seconds between position fixes from the simulated device.
pub const FIX_INTERVAL_SECONDS: f32 = 2.0;

/// Horizontal accuracy range reported by simulated fixes, in metres.
pub const MIN_FIX_ACCURACY_M: f64 = 5.0;
pub const MAX_FIX_ACCURACY_M: f64 = 25.0;
