//! In-Memory Collaborator Stubs
//!
//! Stand-in implementations of the platform traits for tests and headless
//! embedding. Each stub shares its state behind an `Arc`, so a clone kept
//! by the caller still observes and drives a stub handed to the core.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use crate::error::PlatformError;
use crate::traits::{
    DeviceClass, DeviceOutputQuery, EffectBinding, EffectParam, ForegroundEvent, TransitionKind,
    UsageSignalSource,
};

#[derive(Default)]
struct BindingState {
    params: HashMap<(u32, EffectParam), Vec<i32>>,
    in_control: bool,
    fail_next_set: bool,
    fail_reacquire: bool,
    reacquire_count: u32,
}

/// Effect binding backed by an in-memory parameter map
///
/// Control loss is scriptable: `drop_control` makes every call fail until
/// `reacquire`, `fail_next_set` fails exactly one write while control
/// appears held.
#[derive(Clone)]
pub struct StubEffectBinding {
    state: Arc<Mutex<BindingState>>,
}

impl StubEffectBinding {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(BindingState {
                in_control: true,
                ..Default::default()
            })),
        }
    }

    /// Last values written for a parameter, if any
    pub fn values(&self, profile: u32, param: EffectParam) -> Option<Vec<i32>> {
        self.state.lock().params.get(&(profile, param)).cloned()
    }

    /// Simulate losing the control session to another process
    pub fn drop_control(&self) {
        self.state.lock().in_control = false;
    }

    /// Fail the next `set_parameter` call with a lost-control error
    pub fn fail_next_set(&self) {
        self.state.lock().fail_next_set = true;
    }

    /// Make `reacquire` fail until cleared
    pub fn set_fail_reacquire(&self, fail: bool) {
        self.state.lock().fail_reacquire = fail;
    }

    /// Number of successful reacquisitions so far
    pub fn reacquire_count(&self) -> u32 {
        self.state.lock().reacquire_count
    }
}

impl Default for StubEffectBinding {
    fn default() -> Self {
        Self::new()
    }
}

impl EffectBinding for StubEffectBinding {
    fn set_parameter(
        &mut self,
        profile: u32,
        param: EffectParam,
        values: &[i32],
    ) -> Result<(), PlatformError> {
        let mut state = self.state.lock();
        if !state.in_control {
            return Err(PlatformError::ControlLost);
        }
        if state.fail_next_set {
            state.fail_next_set = false;
            return Err(PlatformError::ControlLost);
        }
        state.params.insert((profile, param), values.to_vec());
        Ok(())
    }

    fn get_parameter(&self, profile: u32, param: EffectParam) -> Result<Vec<i32>, PlatformError> {
        let state = self.state.lock();
        if !state.in_control {
            return Err(PlatformError::ControlLost);
        }
        Ok(state
            .params
            .get(&(profile, param))
            .cloned()
            .unwrap_or_default())
    }

    fn has_control(&self) -> bool {
        self.state.lock().in_control
    }

    fn reacquire(&mut self) -> Result<(), PlatformError> {
        let mut state = self.state.lock();
        if state.fail_reacquire {
            return Err(PlatformError::ControlLost);
        }
        state.in_control = true;
        state.reacquire_count += 1;
        Ok(())
    }
}

#[derive(Default)]
struct SignalState {
    events: Vec<ForegroundEvent>,
    names: HashMap<String, String>,
    fail_queries: bool,
}

/// Usage-event source replaying scripted foreground transitions
#[derive(Clone, Default)]
pub struct StubSignalSource {
    state: Arc<Mutex<SignalState>>,
}

impl StubSignalSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a move-to-foreground transition stamped now
    pub fn push_foreground(&self, package: &str) {
        self.push_event(package, TransitionKind::MoveToForeground, Utc::now());
    }

    /// Record a transition with an explicit timestamp
    pub fn push_event(&self, package: &str, kind: TransitionKind, timestamp: DateTime<Utc>) {
        self.state.lock().events.push(ForegroundEvent {
            package: package.to_string(),
            kind,
            timestamp,
        });
    }

    /// Register a display name for a package
    pub fn set_display_name(&self, package: &str, name: &str) {
        self.state
            .lock()
            .names
            .insert(package.to_string(), name.to_string());
    }

    /// Make every query fail until cleared
    pub fn set_fail_queries(&self, fail: bool) {
        self.state.lock().fail_queries = fail;
    }
}

impl UsageSignalSource for StubSignalSource {
    fn query_foreground_transitions(
        &self,
        since: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<ForegroundEvent>, PlatformError> {
        let state = self.state.lock();
        if state.fail_queries {
            return Err(PlatformError::SignalQuery("scripted failure".into()));
        }
        Ok(state
            .events
            .iter()
            .filter(|e| e.timestamp >= since && e.timestamp <= until)
            .cloned()
            .collect())
    }

    fn display_name(&self, package: &str) -> Result<String, PlatformError> {
        self.state
            .lock()
            .names
            .get(package)
            .cloned()
            .ok_or_else(|| PlatformError::ApplicationNotFound(package.to_string()))
    }
}

/// Device-output query returning a settable device set
#[derive(Clone)]
pub struct StubDeviceQuery {
    devices: Arc<Mutex<HashSet<DeviceClass>>>,
    fail: Arc<Mutex<bool>>,
}

impl StubDeviceQuery {
    /// Start with the built-in speaker active
    pub fn new() -> Self {
        let mut devices = HashSet::new();
        devices.insert(DeviceClass::Speaker);
        Self {
            devices: Arc::new(Mutex::new(devices)),
            fail: Arc::new(Mutex::new(false)),
        }
    }

    /// Replace the active device set
    pub fn set_devices(&self, devices: impl IntoIterator<Item = DeviceClass>) {
        *self.devices.lock() = devices.into_iter().collect();
    }

    /// Make every query fail until cleared
    pub fn set_fail(&self, fail: bool) {
        *self.fail.lock() = fail;
    }
}

impl Default for StubDeviceQuery {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceOutputQuery for StubDeviceQuery {
    fn list_active_output_devices(&self) -> Result<HashSet<DeviceClass>, PlatformError> {
        if *self.fail.lock() {
            return Err(PlatformError::DeviceQuery("scripted failure".into()));
        }
        Ok(self.devices.lock().clone())
    }
}
