//! Built-in EQ Presets
//!
//! Authored at 10-band resolution in centi-dB units; resampled on demand
//! for other resolutions.

/// Named EQ preset with 10 band gains
pub type Preset = (&'static str, [i32; 10]);

/// List of built-in presets
pub const PRESETS: &[Preset] = &[
    ("Flat", [0; 10]),
    ("Bass Boost", [60, 50, 30, 10, 0, 0, 0, 0, 0, 0]),
    ("Treble Boost", [0, 0, 0, 0, 0, 10, 30, 50, 60, 60]),
    ("Vocal Clarity", [-20, -10, 0, 20, 40, 40, 30, 20, 10, 0]),
    ("Bass Reduce", [-60, -40, -20, 0, 0, 0, 0, 0, 0, 0]),
    ("Loudness", [40, 30, 0, -10, -10, 0, 10, 20, 30, 40]),
    ("Electronic", [40, 30, 10, 0, -20, -20, 0, 10, 30, 40]),
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::GAIN_LIMIT;

    #[test]
    fn test_flat_is_first_and_zero() {
        let (name, gains) = PRESETS[0];
        assert_eq!(name, "Flat");
        assert_eq!(gains, [0; 10]);
    }

    #[test]
    fn test_preset_names_unique_case_insensitive() {
        for (i, (a, _)) in PRESETS.iter().enumerate() {
            for (b, _) in &PRESETS[i + 1..] {
                assert!(!a.eq_ignore_ascii_case(b), "duplicate preset name {}", a);
            }
        }
    }

    #[test]
    fn test_preset_gains_within_limit() {
        for (name, gains) in PRESETS {
            for &g in gains {
                assert!(g.abs() <= GAIN_LIMIT, "{}: gain {} out of range", name, g);
            }
        }
    }
}
