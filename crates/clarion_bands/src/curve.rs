//! Gain Curves and Curve Algorithms
//!
//! A gain curve is an ordered list of per-band gains (signed centi-dB
//! units, clamped to ±100) at one of the canonical band resolutions.
//! This module holds the pure algorithms the rest of Clarion builds on:
//!
//! - the 20-slot wire expansion exchanged with the effect binding
//! - frequency-domain resampling between band resolutions
//! - the canonical string form used to match curves against presets

use crate::error::BandError;
use crate::mode::BandMode;

/// Gain bound in centi-dB units; values outside are clamped
pub const GAIN_LIMIT: i32 = 100;

/// Number of slots in the wire format the effect binding expects
pub const WIRE_SLOTS: usize = 20;

/// An equalizer curve at a known band resolution
///
/// Invariant: `gains.len() == mode.band_count()` and every gain is within
/// `±GAIN_LIMIT`. Constructed through [`GainCurve::new`], which enforces
/// both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GainCurve {
    mode: BandMode,
    gains: Vec<i32>,
}

impl GainCurve {
    /// Build a curve, clamping each gain to the supported range
    pub fn new(mode: BandMode, gains: &[i32]) -> Result<Self, BandError> {
        if gains.len() != mode.band_count() {
            return Err(BandError::LengthMismatch {
                expected: mode.band_count(),
                got: gains.len(),
            });
        }
        Ok(Self {
            mode,
            gains: gains.iter().map(|&g| g.clamp(-GAIN_LIMIT, GAIN_LIMIT)).collect(),
        })
    }

    /// Flat (all-zero) curve at the given resolution
    pub fn flat(mode: BandMode) -> Self {
        Self {
            mode,
            gains: vec![0; mode.band_count()],
        }
    }

    pub fn mode(&self) -> BandMode {
        self.mode
    }

    pub fn gains(&self) -> &[i32] {
        &self.gains
    }

    /// (frequency Hz, gain) pairs in band order
    pub fn bands(&self) -> impl Iterator<Item = (u32, i32)> + '_ {
        self.mode
            .frequencies()
            .iter()
            .copied()
            .zip(self.gains.iter().copied())
    }

    /// Convert this curve to another resolution by interpolation
    pub fn resample(&self, target: BandMode) -> GainCurve {
        // Length is validated at construction, so resampling cannot fail
        let gains = resample(&self.gains, self.mode, target)
            .unwrap_or_else(|_| vec![0; target.band_count()]);
        GainCurve {
            mode: target,
            gains,
        }
    }

    /// 20-slot wire form exchanged with the effect binding
    ///
    /// Curves not in 10-band resolution are resampled to 10 bands first;
    /// the wire expansion is defined over 10-band input only.
    pub fn wire_form(&self) -> [i32; WIRE_SLOTS] {
        let ten = self.resample(BandMode::Ten);
        let mut base = [0i32; 10];
        base.copy_from_slice(ten.gains());
        expand(&base)
    }

    /// Comma-joined decimal form used for persistence and matching
    pub fn serialize(&self) -> String {
        format_gains(&self.gains)
    }

    /// Parse a persisted comma-joined curve; unparsable entries become 0
    pub fn deserialize(mode: BandMode, serialized: &str) -> Result<Self, BandError> {
        GainCurve::new(mode, &parse_gains(serialized))
    }
}

/// Expand a 10-band curve into the 20-slot wire format
///
/// Slot `2i` carries band `i`; slot `2i + 1` (i < 9) carries the truncated
/// mean of its two neighbors; slot 19 duplicates slot 18. Lossy in one
/// direction only: [`compress`] recovers the exact input.
pub fn expand(gains: &[i32; 10]) -> [i32; WIRE_SLOTS] {
    let mut wire = [0i32; WIRE_SLOTS];
    for (i, &g) in gains.iter().enumerate() {
        wire[2 * i] = g;
    }
    for i in 0..9 {
        wire[2 * i + 1] = (gains[i] + gains[i + 1]) / 2;
    }
    wire[19] = wire[18];
    wire
}

/// Recover the 10-band curve from a 20-slot wire form (even slots)
pub fn compress(wire: &[i32; WIRE_SLOTS]) -> [i32; 10] {
    let mut gains = [0i32; 10];
    for (i, g) in gains.iter_mut().enumerate() {
        *g = wire[2 * i];
    }
    gains
}

/// Resample a curve between band resolutions
///
/// Piecewise-linear interpolation in the frequency domain. Target
/// frequencies below the lowest source band take the first source gain;
/// above the highest, the last. Interpolated values are truncated toward
/// zero as one whole expression, so exact frequency matches pass the
/// source gain through unchanged.
pub fn resample(gains: &[i32], source: BandMode, target: BandMode) -> Result<Vec<i32>, BandError> {
    let src_freqs = source.frequencies();
    if gains.len() != src_freqs.len() {
        return Err(BandError::LengthMismatch {
            expected: src_freqs.len(),
            got: gains.len(),
        });
    }
    if source == target {
        return Ok(gains.to_vec());
    }

    let out = target
        .frequencies()
        .iter()
        .map(|&f| {
            match src_freqs.iter().position(|&s| s >= f) {
                // Above every source band: right-edge clamp
                None => gains[gains.len() - 1],
                // At or below the first source band: left-edge clamp
                Some(0) => gains[0],
                Some(i) => {
                    let f0 = i64::from(src_freqs[i - 1]);
                    let f1 = i64::from(src_freqs[i]);
                    let g0 = i64::from(gains[i - 1]);
                    let g1 = i64::from(gains[i]);
                    // Single division truncates the whole expression toward zero
                    let num = g0 * (f1 - f0) + (i64::from(f) - f0) * (g1 - g0);
                    (num / (f1 - f0)) as i32
                }
            }
        })
        .collect();

    Ok(out)
}

/// Parse one gain entry; non-numeric or empty entries default to 0
pub fn parse_gain(token: &str) -> i32 {
    token.trim().parse().unwrap_or(0)
}

/// Parse a comma-joined gain sequence
pub fn parse_gains(serialized: &str) -> Vec<i32> {
    serialized.split(',').map(parse_gain).collect()
}

/// Format a gain sequence as its canonical comma-joined decimal form
pub fn format_gains(gains: &[i32]) -> String {
    gains
        .iter()
        .map(i32::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

/// Canonical form of a serialized gain sequence
///
/// Parses every entry back to an integer and re-formats, normalizing
/// leading zeros, whitespace and entry widths without changing numeric
/// values.
pub fn canonical_form(serialized: &str) -> String {
    format_gains(&parse_gains(serialized))
}

/// Whether two serialized gain sequences are numerically identical
pub fn canonical_eq(a: &str, b: &str) -> bool {
    canonical_form(a) == canonical_form(b)
}
