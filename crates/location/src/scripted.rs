//! Scripted location device for tests.
//!
//! Tests queue event batches on a [`ScriptedHandle`], tick the app, and
//! assert on what the session did with them. Each `poll` hands over at most
//! one batch, so a test controls exactly which frame each delivery lands on.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::device::{DeviceEvent, LocationDevice};

#[derive(Default)]
struct ScriptedState {
    queued: VecDeque<Vec<DeviceEvent>>,
    authorization_requests: u32,
    started: bool,
}

/// A [`LocationDevice`] that replays whatever the test scripted.
pub struct ScriptedDevice {
    state: Arc<Mutex<ScriptedState>>,
}

impl ScriptedDevice {
    pub fn new() -> (Self, ScriptedHandle) {
        let state = Arc::new(Mutex::new(ScriptedState::default()));
        (
            Self {
                state: state.clone(),
            },
            ScriptedHandle { state },
        )
    }
}

impl LocationDevice for ScriptedDevice {
    fn request_authorization(&mut self) {
        self.state.lock().unwrap().authorization_requests += 1;
    }

    fn start_updates(&mut self) {
        self.state.lock().unwrap().started = true;
    }

    fn stop_updates(&mut self) {
        self.state.lock().unwrap().started = false;
    }

    fn poll(&mut self) -> Vec<DeviceEvent> {
        self.state
            .lock()
            .unwrap()
            .queued
            .pop_front()
            .unwrap_or_default()
    }
}

/// Test-side handle for scripting deliveries and inspecting device calls.
#[derive(Clone)]
pub struct ScriptedHandle {
    state: Arc<Mutex<ScriptedState>>,
}

impl ScriptedHandle {
    /// Enqueues one batch; the device surfaces it on its next `poll`.
    pub fn queue(&self, events: Vec<DeviceEvent>) {
        self.state.lock().unwrap().queued.push_back(events);
    }

    /// How many times the session asked for authorization.
    pub fn authorization_requests(&self) -> u32 {
        self.state.lock().unwrap().authorization_requests
    }

    /// Whether updates are currently started on the device.
    pub fn is_started(&self) -> bool {
        self.state.lock().unwrap().started
    }

    /// Overrides the started flag, e.g. to verify the session restarts it.
    pub fn set_started(&self, started: bool) {
        self.state.lock().unwrap().started = started;
    }
}

// =============================================================================
// Tests
// =============================================================================
