//! Event Types
//!
//! Store events flow from the parameter store to subscribed consumers
//! (typically a settings presentation layer re-reading state after an
//! externally triggered change). Monitor events flow from the switch
//! engine to whoever surfaces transient notifications.

use serde::{Deserialize, Serialize};

use clarion_bands::BandMode;

use crate::config::ProfileId;

/// Change notifications emitted by the parameter store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum StoreEvent {
    /// The active profile changed (user action or automatic switch)
    ProfileChanged { profile: ProfileId },

    /// The global enhancement toggle changed
    EnabledChanged { enabled: bool },

    /// The global band resolution changed
    BandModeChanged { mode: BandMode },
}

/// Notifications emitted by the profile switch engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum MonitorEvent {
    /// Monitoring started
    Started,

    /// Monitoring stopped; the original profile has been restored
    Stopped,

    /// A bound foreground app triggered a profile switch
    SwitchedToProfile {
        profile: ProfileId,
        profile_name: String,
        /// Display name of the app, or its package id if no name resolved
        app_name: String,
    },

    /// An unbound foreground app restored the original profile
    RestoredOriginal { profile: ProfileId },
}
