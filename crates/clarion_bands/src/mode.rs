//! Band-Count Resolutions
//!
//! An equalizer curve can be expressed at 10, 15 or 20 bands. Each
//! resolution has a fixed canonical frequency list; the 15- and 20-band
//! lists are supersets of the 10-band list so that resampling between
//! resolutions passes the shared frequencies through unchanged.

use serde::{Deserialize, Serialize};

/// Canonical 10-band center frequencies (Hz) - standard octave centers
pub const FREQUENCIES_10: [u32; 10] = [
    32,    // Sub-bass
    64,    // Bass
    125,   // Low-mid
    250,   // Mid
    500,   // Mid
    1000,  // Upper-mid
    2000,  // Presence
    4000,  // Brilliance
    8000,  // High
    16000, // Air
];

/// Canonical 15-band center frequencies (Hz) - 10-band list plus midpoints
/// in the upper octaves
pub const FREQUENCIES_15: [u32; 15] = [
    32, 64, 125, 250, 500, 750, 1000, 1500, 2000, 3000, 4000, 6000, 8000, 12000, 16000,
];

/// Canonical 20-band center frequencies (Hz) - 15-band list plus low-end
/// midpoints and a 20 kHz top band
pub const FREQUENCIES_20: [u32; 20] = [
    32, 48, 64, 94, 125, 187, 250, 375, 500, 750, 1000, 1500, 2000, 3000, 4000, 6000, 8000,
    12000, 16000, 20000,
];

/// The resolution an equalizer curve is expressed in
///
/// Global setting, not per-profile: changing it reinterprets existing
/// curves by frequency-domain interpolation rather than discarding them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BandMode {
    Ten,
    Fifteen,
    Twenty,
}

impl BandMode {
    /// All supported resolutions
    pub const ALL: [BandMode; 3] = [BandMode::Ten, BandMode::Fifteen, BandMode::Twenty];

    /// Number of bands at this resolution
    pub fn band_count(self) -> usize {
        match self {
            BandMode::Ten => 10,
            BandMode::Fifteen => 15,
            BandMode::Twenty => 20,
        }
    }

    /// Canonical center frequencies for this resolution (Hz, strictly increasing)
    pub fn frequencies(self) -> &'static [u32] {
        match self {
            BandMode::Ten => &FREQUENCIES_10,
            BandMode::Fifteen => &FREQUENCIES_15,
            BandMode::Twenty => &FREQUENCIES_20,
        }
    }

    /// Resolve a persisted band count back to a mode
    pub fn from_band_count(count: usize) -> Option<Self> {
        match count {
            10 => Some(BandMode::Ten),
            15 => Some(BandMode::Fifteen),
            20 => Some(BandMode::Twenty),
            _ => None,
        }
    }
}

impl Default for BandMode {
    fn default() -> Self {
        BandMode::Ten
    }
}
