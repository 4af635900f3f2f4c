//! Clarion Platform - External Collaborator Boundary
//!
//! Clarion's core never talks to the host system directly; it consumes the
//! traits defined here:
//!
//! - [`EffectBinding`] - the control session that applies DSP parameters
//!   to the audio pipeline
//! - [`UsageSignalSource`] - foreground application transition events
//! - [`DeviceOutputQuery`] - currently active audio output routes
//!
//! The `stub` module provides in-memory implementations of all three for
//! tests and headless embedding; production embedders supply their own
//! bindings against the real system services.

mod error;
mod stub;
mod traits;

pub use error::PlatformError;
pub use stub::{StubDeviceQuery, StubEffectBinding, StubSignalSource};
pub use traits::{
    DeviceClass, DeviceOutputQuery, EffectBinding, EffectParam, ForegroundEvent, TransitionKind,
    UsageSignalSource,
};
