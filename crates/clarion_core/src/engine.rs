//! Profile Switch Engine
//!
//! Watches which application owns audio focus and switches the active
//! profile to whatever that application is bound to, debouncing bursts of
//! rapid app changes into a single switch.
//!
//! # Architecture
//!
//! A dedicated monitor thread drives two cooperating timers off one clock:
//! a fixed-interval poll of the usage-signal source and a one-shot
//! debounce deadline. Both share a single mutex domain (`MonitorShared`)
//! with `start`/`stop` on the caller's thread, so cancel-then-reschedule
//! of the pending switch is atomic and `stop` serializes after any
//! in-flight switch action, making its restoration of the original
//! profile authoritative.
//!
//! No call inside the locked sections blocks: usage-event queries, device
//! queries and profile application are fast synchronous calls into
//! external collaborators, and any of them failing abandons the current
//! tick only. The next scheduled tick proceeds normally.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use chrono::Utc;
use crossbeam_channel::{bounded, unbounded, Receiver, RecvTimeoutError, Sender};
use parking_lot::Mutex;
use tracing::{debug, error, info, warn};

use clarion_platform::{DeviceOutputQuery, TransitionKind, UsageSignalSource};

use crate::bindings::ProfileBindings;
use crate::config::{is_valid_profile, profile_name, MonitorConfig, ProfileId};
use crate::error::{CoreResult, StoreError};
use crate::message::MonitorEvent;
use crate::store::ParameterStore;

/// Granularity of the monitor thread's clock
const TICK: Duration = Duration::from_millis(50);

/// A scheduled, not-yet-fired profile switch
struct PendingSwitch {
    package: String,
    due: Instant,
}

/// State shared between the monitor thread and `start`/`stop`
///
/// One mutex domain guards the whole struct; the pending switch, the last
/// observed package and the original profile are never touched outside it.
struct MonitorShared {
    monitoring: bool,
    last_foreground: Option<String>,
    original_profile: ProfileId,
    pending: Option<PendingSwitch>,
    headphone_gate: bool,
    next_poll: Instant,
}

enum ControlMsg {
    Shutdown,
}

/// The foreground-app profile switcher
pub struct ProfileSwitchEngine {
    shared: Arc<Mutex<MonitorShared>>,
    store: Arc<ParameterStore>,
    devices: Arc<dyn DeviceOutputQuery>,
    control_tx: Sender<ControlMsg>,
    event_tx: Sender<MonitorEvent>,
    event_rx: Receiver<MonitorEvent>,
    shutdown: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl ProfileSwitchEngine {
    /// Create the engine and spawn its monitor thread
    ///
    /// The thread idles until [`start`](Self::start) is called.
    pub fn new(
        store: Arc<ParameterStore>,
        bindings: Arc<dyn ProfileBindings>,
        signals: Box<dyn UsageSignalSource>,
        devices: Arc<dyn DeviceOutputQuery>,
        config: MonitorConfig,
    ) -> CoreResult<Self> {
        config.validate()?;

        let shared = Arc::new(Mutex::new(MonitorShared {
            monitoring: false,
            last_foreground: None,
            original_profile: store.active_profile(),
            pending: None,
            headphone_gate: config.headphone_gate,
            next_poll: Instant::now(),
        }));

        let (control_tx, control_rx) = bounded::<ControlMsg>(4);
        let (event_tx, event_rx) = unbounded::<MonitorEvent>();
        let shutdown = Arc::new(AtomicBool::new(false));

        let worker = MonitorWorker {
            shared: Arc::clone(&shared),
            store: Arc::clone(&store),
            bindings,
            signals,
            devices: Arc::clone(&devices),
            events: event_tx.clone(),
            config,
        };

        let shutdown_clone = Arc::clone(&shutdown);
        let thread = thread::Builder::new()
            .name("clarion-monitor".into())
            .spawn(move || worker.run(control_rx, shutdown_clone))
            .map_err(|e| StoreError::Internal(format!("failed to spawn monitor thread: {}", e)))?;

        Ok(Self {
            shared,
            store,
            devices,
            control_tx,
            event_tx,
            event_rx,
            shutdown,
            thread: Some(thread),
        })
    }

    /// Begin monitoring; a no-op when already monitoring
    ///
    /// Captures the currently active profile as the baseline restored when
    /// an unbound app comes to the foreground or monitoring stops.
    pub fn start(&self) {
        let mut shared = self.shared.lock();
        if shared.monitoring {
            debug!("Profile monitor already running");
            return;
        }

        shared.monitoring = true;
        shared.original_profile = self.store.active_profile();
        shared.last_foreground = None;
        shared.pending = None;
        shared.next_poll = Instant::now();

        info!(
            "Profile monitor started (original profile {})",
            shared.original_profile
        );
        let _ = self.event_tx.send(MonitorEvent::Started);
    }

    /// Stop monitoring; a no-op when already stopped
    ///
    /// Cancels the pending debounce deterministically (no switch fires
    /// after this returns) and restores the original profile.
    pub fn stop(&self) {
        let mut shared = self.shared.lock();
        if !shared.monitoring {
            debug!("Profile monitor already stopped");
            return;
        }

        shared.monitoring = false;
        shared.pending = None;
        shared.last_foreground = None;

        if is_valid_profile(shared.original_profile) {
            if let Err(e) = self.store.set_active_profile(shared.original_profile) {
                warn!(
                    "Failed to restore profile {} on stop: {}",
                    shared.original_profile, e
                );
            }
        }

        info!(
            "Profile monitor stopped, restored profile {}",
            shared.original_profile
        );
        let _ = self.event_tx.send(MonitorEvent::Stopped);
    }

    pub fn is_monitoring(&self) -> bool {
        self.shared.lock().monitoring
    }

    /// Only switch profiles while a headphone-class output is active
    pub fn set_headphone_gate(&self, enabled: bool) {
        self.shared.lock().headphone_gate = enabled;
    }

    pub fn headphone_gate(&self) -> bool {
        self.shared.lock().headphone_gate
    }

    /// Whether audio is currently routed to the speaker rather than a
    /// headphone-class output
    pub fn is_on_speaker(&self) -> bool {
        match self.devices.list_active_output_devices() {
            Ok(devices) => !devices.iter().any(|d| d.is_headphone()),
            Err(e) => {
                warn!("Device output query failed: {}", e);
                true
            }
        }
    }

    /// Get next monitor event (non-blocking)
    pub fn poll_event(&self) -> Option<MonitorEvent> {
        self.event_rx.try_recv().ok()
    }

    /// Get next monitor event (blocking)
    pub fn wait_event(&self) -> Option<MonitorEvent> {
        self.event_rx.recv().ok()
    }

    /// Get next monitor event, waiting at most `timeout`
    pub fn wait_event_timeout(&self, timeout: Duration) -> Option<MonitorEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }
}

impl Drop for ProfileSwitchEngine {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::SeqCst);
        let _ = self.control_tx.send(ControlMsg::Shutdown);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

/// Monitor thread context
struct MonitorWorker {
    shared: Arc<Mutex<MonitorShared>>,
    store: Arc<ParameterStore>,
    bindings: Arc<dyn ProfileBindings>,
    signals: Box<dyn UsageSignalSource>,
    devices: Arc<dyn DeviceOutputQuery>,
    events: Sender<MonitorEvent>,
    config: MonitorConfig,
}

impl MonitorWorker {
    fn run(self, control: Receiver<ControlMsg>, shutdown: Arc<AtomicBool>) {
        info!("Profile monitor thread started");

        while !shutdown.load(Ordering::SeqCst) {
            match control.recv_timeout(TICK) {
                Ok(ControlMsg::Shutdown) | Err(RecvTimeoutError::Disconnected) => break,
                Err(RecvTimeoutError::Timeout) => {}
            }
            self.tick();
        }

        info!("Profile monitor thread stopped");
    }

    /// One pass of the shared clock: fire a due debounce, then poll
    fn tick(&self) {
        let now = Instant::now();
        let mut shared = self.shared.lock();
        if !shared.monitoring {
            return;
        }

        let due = shared.pending.as_ref().is_some_and(|p| now >= p.due);
        if due {
            if let Some(pending) = shared.pending.take() {
                self.run_debounced_switch(&mut shared, &pending.package);
            }
        }

        if now >= shared.next_poll {
            shared.next_poll = now + self.config.poll_interval();
            self.poll_foreground(&mut shared, now);
        }
    }

    /// Whether the headphone gate currently blocks switching
    ///
    /// Query failures block conservatively; the next tick retries.
    fn gate_blocks(&self, shared: &MonitorShared) -> bool {
        if !shared.headphone_gate {
            return false;
        }
        match self.devices.list_active_output_devices() {
            Ok(devices) => {
                let headphones = devices.iter().any(|d| d.is_headphone());
                if !headphones {
                    debug!("No headphone-class output active, holding profile switch");
                }
                !headphones
            }
            Err(e) => {
                warn!("Device output query failed: {}", e);
                true
            }
        }
    }

    /// Query the trailing window for the current foreground package and
    /// arm the debounce when it changed
    fn poll_foreground(&self, shared: &mut MonitorShared, now: Instant) {
        if self.gate_blocks(shared) {
            return;
        }

        let until = Utc::now();
        let since = until - chrono::Duration::milliseconds(self.config.trailing_window_ms as i64);
        let events = match self.signals.query_foreground_transitions(since, until) {
            Ok(events) => events,
            Err(e) => {
                warn!("Foreground signal query failed: {}", e);
                return;
            }
        };

        let latest = events
            .iter()
            .filter(|e| e.kind == TransitionKind::MoveToForeground)
            .max_by_key(|e| e.timestamp)
            .map(|e| e.package.clone());

        let Some(package) = latest else { return };
        if shared.last_foreground.as_deref() == Some(package.as_str()) {
            return;
        }

        debug!("Foreground app changed to {}", package);
        shared.last_foreground = Some(package.clone());
        // A newer observation supersedes any pending switch
        shared.pending = Some(PendingSwitch {
            package,
            due: now + self.config.debounce(),
        });
    }

    /// The debounced switch action
    ///
    /// Re-validates the device gate, then either applies the bound
    /// profile or restores the original one for unbound apps. Failures
    /// abandon the action; monitoring continues.
    fn run_debounced_switch(&self, shared: &mut MonitorShared, package: &str) {
        if self.gate_blocks(shared) {
            return;
        }

        match self.bindings.profile_for(package) {
            Some(profile) => {
                if let Err(e) = self.store.set_active_profile(profile) {
                    error!(
                        "Failed to switch to profile {} for {}: {}",
                        profile, package, e
                    );
                    return;
                }

                let name = profile_name(profile).unwrap_or("?");
                info!("Switched to profile {} ({}) for {}", profile, name, package);

                let app_name = match self.signals.display_name(package) {
                    Ok(app_name) => app_name,
                    Err(e) => {
                        warn!("Could not resolve display name for {}: {}", package, e);
                        package.to_string()
                    }
                };
                let _ = self.events.send(MonitorEvent::SwitchedToProfile {
                    profile,
                    profile_name: name.to_string(),
                    app_name,
                });
            }
            None => {
                let original = shared.original_profile;
                if let Err(e) = self.store.set_active_profile(original) {
                    error!("Failed to restore profile {}: {}", original, e);
                    return;
                }

                info!(
                    "Foreground app {} is unbound, restored profile {}",
                    package, original
                );
                let _ = self
                    .events
                    .send(MonitorEvent::RestoredOriginal { profile: original });
            }
        }
    }
}
