//! Clarion Core - Profile State Engine
//!
//! This crate provides the core of Clarion's multi-profile audio
//! enhancement configuration:
//! - Persistent per-profile parameter storage with multi-resolution
//!   equalizer curves
//! - Built-in and user-defined preset management with canonical matching
//! - Automatic profile switching driven by the foreground application
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │                     Embedder / UI Thread                      │
//! │   Settings surface ──get/set──▶ ParameterStore ──events──▶    │
//! │   Preset surface   ──────────▶ PresetRegistry                 │
//! └───────────────────────────────────────────────────────────────┘
//!                 ▲ set_active_profile          │ PrefStore
//!                 │                             ▼
//! ┌───────────────────────────────────────────────────────────────┐
//! │                      Monitor Thread                           │
//! │   poll usage signals ─▶ debounce ─▶ switch / restore          │
//! └───────────────────────────────────────────────────────────────┘
//!                 │
//!                 ▼ EffectBinding (external audio pipeline)
//! ```
//!
//! All components share one `ParameterStore` (and its preference surface)
//! as explicit `Arc` context objects created by the embedder at service
//! start and torn down at stop; there is no ambient global state.

mod bindings;
mod config;
mod engine;
mod error;
mod message;
mod params;
mod prefs;
mod registry;
mod store;

pub use bindings::{BindingTable, ProfileBindings};
pub use config::{is_valid_profile, profile_name, MonitorConfig, ProfileId, DEFAULT_PROFILE, PROFILES};
pub use engine::ProfileSwitchEngine;
pub use error::{CoreResult, StoreError};
pub use message::{MonitorEvent, StoreEvent};
pub use params::ParameterSet;
pub use prefs::{JsonFilePrefs, MemoryPrefs, PrefStore, PrefValue};
pub use registry::{PresetInfo, PresetOrigin, PresetRegistry, CUSTOM_PRESET, MAX_PRESET_NAME_LEN};
pub use store::ParameterStore;

// Re-export band model types for convenience
pub use clarion_bands::{BandMode, GainCurve, BandError, GAIN_LIMIT};
