//! Clarion Bands - Equalizer Band Model
//!
//! Pure data and algorithms for Clarion's multi-resolution equalizer
//! curves. No I/O, no shared state:
//!
//! - Canonical band resolutions (10/15/20 bands) with fixed frequency lists
//! - The 20-slot wire expansion exchanged with the effect binding
//! - Frequency-domain resampling between resolutions
//! - Canonical string-form comparison used for preset matching
//! - The built-in preset table

mod curve;
mod error;
mod mode;
mod presets;

pub use curve::{
    canonical_eq, canonical_form, compress, expand, format_gains, parse_gain, parse_gains,
    resample, GainCurve, GAIN_LIMIT, WIRE_SLOTS,
};
pub use error::BandError;
pub use mode::{BandMode, FREQUENCIES_10, FREQUENCIES_15, FREQUENCIES_20};
pub use presets::{Preset, PRESETS};
