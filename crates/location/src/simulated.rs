//! Simulated location device for targets without a GPS radio.
//!
//! Desktop builds have no position hardware and no OS permission broker, so
//! this device fakes both: it owns a pretend permission prompt (rendered by
//! the UI as the "system" dialog) and generates fixes from a seeded random
//! walk around a home coordinate. The same seed always produces the same
//! walk, which keeps manual testing reproducible.
//!
//! State is shared between the [`SimulatedDevice`] handed to the session and
//! a cloneable [`SimulatorLink`] resource the UI uses to resolve the prompt,
//! teleport, or flip the fake system-settings switch.

use std::sync::{Arc, Mutex};

use bevy::prelude::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::authorization::AuthorizationState;
use crate::config::{
    FIX_INTERVAL_SECONDS, MAX_FIX_ACCURACY_M, MIN_FIX_ACCURACY_M,
};
use crate::coordinate::{Coordinate, Fix};
use crate::device::{DeviceEvent, LocationDevice};

/// Metres per degree of latitude (and of longitude at the equator).
const METERS_PER_DEGREE: f64 = 111_320.0;

/// Chance that a delivery carries a small backlog of fixes instead of one.
const BATCH_CHANCE: f64 = 0.15;

// =============================================================================
// Shared state
// =============================================================================

struct SimulatorState {
    authorization: AuthorizationState,
    prompt_pending: bool,
    started: bool,
    driving: bool,
    position: Coordinate,
    home: Coordinate,
    heading_rad: f64,
    accuracy_m: f64,
    seed: u64,
    rng: ChaCha8Rng,
    fix_timer: f32,
    queued: Vec<DeviceEvent>,
}

impl SimulatorState {
    fn new(home: Coordinate, seed: u64) -> Self {
        Self {
            authorization: AuthorizationState::Undetermined,
            prompt_pending: false,
            started: false,
            driving: true,
            position: home,
            home,
            heading_rad: 0.0,
            accuracy_m: MIN_FIX_ACCURACY_M,
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
            fix_timer: 0.0,
            queued: Vec::new(),
        }
    }

    fn push_authorization(&mut self, state: AuthorizationState) {
        self.authorization = state;
        self.prompt_pending = false;
        self.queued.push(DeviceEvent::AuthorizationChanged(state));
    }

    /// Take one random-walk step and return the fix at the new position.
    fn step(&mut self) -> Fix {
        if self.driving {
            self.heading_rad += self.rng.gen_range(-0.5..0.5);
            let distance_m = self.rng.gen_range(4.0..18.0);
            let dlat = distance_m * self.heading_rad.cos() / METERS_PER_DEGREE;
            let lat_rad = self.position.latitude.to_radians();
            let dlon =
                distance_m * self.heading_rad.sin() / (METERS_PER_DEGREE * lat_rad.cos().max(0.01));
            self.position = Coordinate::clamped(
                self.position.latitude + dlat,
                self.position.longitude + dlon,
            );
        }
        self.accuracy_m = self.rng.gen_range(MIN_FIX_ACCURACY_M..MAX_FIX_ACCURACY_M);
        Fix::new(self.position, self.accuracy_m)
    }

    fn delivering(&self) -> bool {
        self.started && self.authorization.is_authorized() && !self.prompt_pending
    }

    fn advance(&mut self, dt: f32) {
        if !self.delivering() {
            self.fix_timer = 0.0;
            return;
        }
        self.fix_timer += dt;
        while self.fix_timer >= FIX_INTERVAL_SECONDS {
            self.fix_timer -= FIX_INTERVAL_SECONDS;

            // Usually one fix; occasionally a short backlog, freshest first,
            // the way platform delivery callbacks batch deferred fixes.
            let mut fixes = vec![self.step()];
            if self.rng.gen_bool(BATCH_CHANCE) {
                let extra = self.rng.gen_range(1..=2);
                for _ in 0..extra {
                    let newest = self.step();
                    fixes.insert(0, newest);
                }
            }
            self.queued.push(DeviceEvent::LocationUpdated(fixes));
        }
    }
}

// =============================================================================
// Device half
// =============================================================================

/// The [`LocationDevice`] implementation backed by the shared simulator.
pub struct SimulatedDevice {
    state: Arc<Mutex<SimulatorState>>,
}

impl SimulatedDevice {
    /// Builds the device plus the control link the UI holds on to.
    pub fn new(home: Coordinate, seed: u64) -> (Self, SimulatorLink) {
        let state = Arc::new(Mutex::new(SimulatorState::new(home, seed)));
        (
            Self {
                state: state.clone(),
            },
            SimulatorLink { state },
        )
    }
}

impl LocationDevice for SimulatedDevice {
    fn request_authorization(&mut self) {
        let mut state = self.state.lock().unwrap();
        if matches!(
            state.authorization,
            AuthorizationState::Undetermined | AuthorizationState::Unknown
        ) {
            state.prompt_pending = true;
        }
    }

    fn start_updates(&mut self) {
        self.state.lock().unwrap().started = true;
    }

    fn stop_updates(&mut self) {
        self.state.lock().unwrap().started = false;
    }

    fn poll(&mut self) -> Vec<DeviceEvent> {
        std::mem::take(&mut self.state.lock().unwrap().queued)
    }
}

// =============================================================================
// Control half
// =============================================================================

/// Snapshot of the simulator for status displays.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulatorStatus {
    pub authorization: AuthorizationState,
    pub prompt_pending: bool,
    pub started: bool,
    pub driving: bool,
    pub position: Coordinate,
    /// Where the walk started; teleport target for "go home".
    pub home: Coordinate,
    pub seed: u64,
}

/// Cloneable handle to the simulator shared with [`SimulatedDevice`].
///
/// Present as a resource only when the simulated device is installed, so UI
/// built against a real device backend simply has nothing to show.
#[derive(Resource, Clone)]
pub struct SimulatorLink {
    state: Arc<Mutex<SimulatorState>>,
}

impl SimulatorLink {
    pub fn status(&self) -> SimulatorStatus {
        let state = self.state.lock().unwrap();
        SimulatorStatus {
            authorization: state.authorization,
            prompt_pending: state.prompt_pending,
            started: state.started,
            driving: state.driving,
            position: state.position,
            home: state.home,
            seed: state.seed,
        }
    }

    /// Answers the pending permission prompt.
    pub fn resolve_prompt(&self, grant: bool) {
        let mut state = self.state.lock().unwrap();
        if !state.prompt_pending {
            return;
        }
        let answer = if grant {
            AuthorizationState::AuthorizedWhenInUse
        } else {
            AuthorizationState::Denied
        };
        state.push_authorization(answer);
    }

    /// The fake system-settings switch: forces an authorization state and
    /// emits the change event, exactly like the OS does when the user flips
    /// the toggle outside the app.
    pub fn set_authorization(&self, authorization: AuthorizationState) {
        self.state.lock().unwrap().push_authorization(authorization);
    }

    /// Pause or resume the random walk. Fixes keep arriving either way, the
    /// position just stops moving, like a parked receiver.
    pub fn set_driving(&self, driving: bool) {
        self.state.lock().unwrap().driving = driving;
    }

    /// Jump the simulated position. Queues an immediate fix when updates are
    /// active so the map reacts without waiting for the next interval.
    pub fn teleport(&self, position: Coordinate) {
        let mut state = self.state.lock().unwrap();
        state.position = position;
        if state.delivering() {
            let fix = Fix::new(position, state.accuracy_m);
            state.queued.push(DeviceEvent::LocationUpdated(vec![fix]));
        }
    }

    /// Advances simulated time; called once per frame.
    pub fn advance(&self, dt: f32) {
        self.state.lock().unwrap().advance(dt);
    }
}

/// Feeds frame time into the simulator when one is installed.
pub fn drive_simulated_device(time: Res<Time>, link: Option<Res<SimulatorLink>>) {
    let Some(link) = link else {
        return;
    };
    link.advance(time.delta_secs());
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_HOME;

    fn drain(device: &mut SimulatedDevice) -> Vec<DeviceEvent> {
        device.poll()
    }

    #[test]
    fn test_prompt_appears_only_when_undetermined() {
        let (mut device, link) = SimulatedDevice::new(DEFAULT_HOME, 1);
        device.request_authorization();
        assert!(link.status().prompt_pending);

        link.resolve_prompt(true);
        assert!(!link.status().prompt_pending);

        // Already answered: asking again must not re-open the prompt.
        device.request_authorization();
        assert!(!link.status().prompt_pending);
    }

    #[test]
    fn test_prompt_grant_yields_when_in_use() {
        let (mut device, link) = SimulatedDevice::new(DEFAULT_HOME, 1);
        device.request_authorization();
        link.resolve_prompt(true);

        let events = drain(&mut device);
        assert_eq!(
            events,
            vec![DeviceEvent::AuthorizationChanged(
                AuthorizationState::AuthorizedWhenInUse
            )]
        );
    }

    #[test]
    fn test_prompt_refusal_yields_denied() {
        let (mut device, link) = SimulatedDevice::new(DEFAULT_HOME, 1);
        device.request_authorization();
        link.resolve_prompt(false);

        let events = drain(&mut device);
        assert_eq!(
            events,
            vec![DeviceEvent::AuthorizationChanged(AuthorizationState::Denied)]
        );
    }

    #[test]
    fn test_resolve_without_prompt_is_a_no_op() {
        let (mut device, link) = SimulatedDevice::new(DEFAULT_HOME, 1);
        link.resolve_prompt(true);
        assert!(drain(&mut device).is_empty());
        assert_eq!(
            link.status().authorization,
            AuthorizationState::Undetermined
        );
    }

    #[test]
    fn test_settings_override_emits_change() {
        let (mut device, link) = SimulatedDevice::new(DEFAULT_HOME, 1);
        link.set_authorization(AuthorizationState::Restricted);
        let events = drain(&mut device);
        assert_eq!(
            events,
            vec![DeviceEvent::AuthorizationChanged(
                AuthorizationState::Restricted
            )]
        );
    }

    #[test]
    fn test_no_fixes_until_started_and_authorized() {
        let (mut device, link) = SimulatedDevice::new(DEFAULT_HOME, 1);
        link.advance(60.0);
        assert!(drain(&mut device).is_empty());

        // Authorized but not started: still nothing.
        link.set_authorization(AuthorizationState::AuthorizedWhenInUse);
        drain(&mut device);
        link.advance(60.0);
        assert!(drain(&mut device).is_empty());

        device.start_updates();
        link.advance(FIX_INTERVAL_SECONDS + 0.1);
        let events = drain(&mut device);
        assert!(matches!(&events[..], [DeviceEvent::LocationUpdated(_)]));
    }

    #[test]
    fn test_same_seed_walks_the_same_path() {
        let walk = |seed: u64| -> Vec<DeviceEvent> {
            let (mut device, link) = SimulatedDevice::new(DEFAULT_HOME, seed);
            link.set_authorization(AuthorizationState::AuthorizedAlways);
            device.start_updates();
            drain(&mut device);
            link.advance(FIX_INTERVAL_SECONDS * 10.0);
            drain(&mut device)
        };

        assert_eq!(walk(42), walk(42));
        assert_ne!(walk(42), walk(43));
    }

    #[test]
    fn test_paused_driving_keeps_position_still() {
        let (mut device, link) = SimulatedDevice::new(DEFAULT_HOME, 9);
        link.set_authorization(AuthorizationState::AuthorizedWhenInUse);
        device.start_updates();
        link.set_driving(false);
        drain(&mut device);

        link.advance(FIX_INTERVAL_SECONDS * 5.0);
        for event in drain(&mut device) {
            let DeviceEvent::LocationUpdated(fixes) = event else {
                continue;
            };
            for fix in fixes {
                assert!(fix.coordinate.approx_eq(&DEFAULT_HOME));
            }
        }
    }

    #[test]
    fn test_teleport_reports_immediately_when_active() {
        let (mut device, link) = SimulatedDevice::new(DEFAULT_HOME, 3);
        let target = Coordinate::clamped(40.7128, -74.0060);

        // Inactive: teleport moves the position but reports nothing.
        link.teleport(target);
        assert!(drain(&mut device).is_empty());

        link.set_authorization(AuthorizationState::AuthorizedWhenInUse);
        device.start_updates();
        drain(&mut device);
        link.teleport(target);
        let events = drain(&mut device);
        let DeviceEvent::LocationUpdated(fixes) = &events[0] else {
            panic!("expected a fix after teleport, got {events:?}");
        };
        assert!(fixes[0].coordinate.approx_eq(&target));
    }

    #[test]
    fn test_fix_accuracy_stays_in_range() {
        let (mut device, link) = SimulatedDevice::new(DEFAULT_HOME, 11);
        link.set_authorization(AuthorizationState::AuthorizedWhenInUse);
        device.start_updates();
        drain(&mut device);
        link.advance(FIX_INTERVAL_SECONDS * 20.0);

        for event in drain(&mut device) {
            let DeviceEvent::LocationUpdated(fixes) = event else {
                continue;
            };
            for fix in fixes {
                assert!(fix.horizontal_accuracy_m >= MIN_FIX_ACCURACY_M);
                assert!(fix.horizontal_accuracy_m < MAX_FIX_ACCURACY_M);
            }
        }
    }
}
