//! Platform Boundary Traits
//!
//! Defines the interfaces Clarion consumes from its host system: the
//! effect control session that applies DSP parameters, the usage-event
//! source that reports foreground application changes, and the
//! device-output query used for headphone gating.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::PlatformError;

/// Identifier of a DSP parameter on the effect control session
///
/// Scalar parameters carry a single value; `GraphicEq` carries the
/// 20-slot wire vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectParam {
    /// Global enhancement on/off
    Enabled,
    BassEnabled,
    BassLevel,
    TrebleEnabled,
    TrebleLevel,
    VolumeLevelerEnabled,
    VirtualizerEnabled,
    StereoWidening,
    DialogueEnhancerEnabled,
    DialogueEnhancerAmount,
    IeqPreset,
    /// 20-slot equalizer gain vector (wire format)
    GraphicEq,
}

/// Control surface that applies DSP parameters to the audio pipeline
///
/// The binding may be a remote or native audio-effect control session;
/// control can be lost to another process at any time. Callers are
/// expected to `reacquire` and retry once on a lost-control failure.
pub trait EffectBinding: Send {
    /// Apply a parameter value for the given profile
    fn set_parameter(
        &mut self,
        profile: u32,
        param: EffectParam,
        values: &[i32],
    ) -> Result<(), PlatformError>;

    /// Read a parameter value back for the given profile
    fn get_parameter(&self, profile: u32, param: EffectParam) -> Result<Vec<i32>, PlatformError>;

    /// Whether this binding currently controls the effect session
    fn has_control(&self) -> bool;

    /// Recreate or reattach the underlying control session
    fn reacquire(&mut self) -> Result<(), PlatformError>;
}

/// Direction of a foreground transition event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransitionKind {
    MoveToForeground,
    MoveToBackground,
}

/// One foreground transition reported by the usage-event source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForegroundEvent {
    /// Application package identifier
    pub package: String,

    /// Transition direction
    pub kind: TransitionKind,

    /// When the transition occurred
    pub timestamp: DateTime<Utc>,
}

/// Source of foreground application signals
pub trait UsageSignalSource: Send {
    /// Transitions within `[since, until]`, in arrival order
    fn query_foreground_transitions(
        &self,
        since: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<ForegroundEvent>, PlatformError>;

    /// Human-readable name for a package identifier
    fn display_name(&self, package: &str) -> Result<String, PlatformError>;
}

/// Class of an active audio output route
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceClass {
    Speaker,
    WiredHeadphone,
    BluetoothA2dp,
    UsbHeadset,
}

impl DeviceClass {
    /// Whether this output class counts as a headphone for profile gating
    pub fn is_headphone(self) -> bool {
        matches!(
            self,
            DeviceClass::WiredHeadphone | DeviceClass::BluetoothA2dp | DeviceClass::UsbHeadset
        )
    }
}

/// Query over currently active audio output routes
///
/// Shared between the switch engine's gate and the "is on speaker"
/// observable, so implementations must tolerate concurrent queries.
pub trait DeviceOutputQuery: Send + Sync {
    /// The set of output device classes audio is currently routed to
    fn list_active_output_devices(&self) -> Result<HashSet<DeviceClass>, PlatformError>;
}
