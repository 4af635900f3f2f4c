//! Profile Table and Monitor Configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{CoreResult, StoreError};

/// Profile identifier from the closed configuration table
pub type ProfileId = u32;

/// The predefined profiles: (id, display name)
///
/// Profiles are fixed at build time; only their parameter contents mutate.
pub const PROFILES: &[(ProfileId, &str)] = &[
    (0, "Default"),
    (1, "Movie"),
    (2, "Music"),
    (3, "Game"),
    (4, "Voice"),
];

/// Profile restored by `reset_all_profiles` and on unbound foreground apps
pub const DEFAULT_PROFILE: ProfileId = 0;

/// Whether an id belongs to the profile table
pub fn is_valid_profile(id: ProfileId) -> bool {
    PROFILES.iter().any(|&(p, _)| p == id)
}

/// Display name for a profile id
pub fn profile_name(id: ProfileId) -> Option<&'static str> {
    PROFILES.iter().find(|&&(p, _)| p == id).map(|&(_, n)| n)
}

/// Profile switch engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Interval between foreground-app polls (milliseconds)
    pub poll_interval_ms: u64,

    /// Settle time before a detected app change is acted on (milliseconds)
    pub debounce_ms: u64,

    /// Trailing window queried for transition events on each poll (milliseconds)
    pub trailing_window_ms: u64,

    /// Only switch profiles while a headphone-class output is active
    #[serde(default)]
    pub headphone_gate: bool,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 2000,
            debounce_ms: 300,
            trailing_window_ms: 1000,
            headphone_gate: false,
        }
    }
}

impl MonitorConfig {
    /// Faster polling for quick app switchers
    pub fn responsive() -> Self {
        Self {
            poll_interval_ms: 1000,
            debounce_ms: 150,
            trailing_window_ms: 500,
            headphone_gate: false,
        }
    }

    /// Slower polling to minimize background work
    pub fn relaxed() -> Self {
        Self {
            poll_interval_ms: 5000,
            debounce_ms: 500,
            trailing_window_ms: 2000,
            headphone_gate: false,
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn trailing_window(&self) -> Duration {
        Duration::from_millis(self.trailing_window_ms)
    }

    /// Validate configuration
    pub fn validate(&self) -> CoreResult<()> {
        if self.poll_interval_ms < 10 {
            return Err(StoreError::InvalidConfiguration(format!(
                "poll interval too short: {}ms",
                self.poll_interval_ms
            )));
        }
        if self.debounce_ms == 0 {
            return Err(StoreError::InvalidConfiguration(
                "debounce must be non-zero".into(),
            ));
        }
        if self.trailing_window_ms == 0 {
            return Err(StoreError::InvalidConfiguration(
                "trailing window must be non-zero".into(),
            ));
        }
        Ok(())
    }
}
