//! Per-Profile DSP Parameters
//!
//! One `ParameterSet` per profile: enhancement toggles, bounded integer
//! levels and the equalizer gain curve. Each field persists under its own
//! key in the profile's preference partition, so individual setters stay
//! atomic per key.

use clarion_bands::{BandMode, GainCurve};
use clarion_platform::EffectParam;

use crate::prefs::PrefStore;

/// Bass/treble level bounds
pub const LEVEL_MIN: i32 = 0;
pub const LEVEL_MAX: i32 = 100;

/// Stereo widening amount bounds
pub const STEREO_WIDENING_MIN: i32 = 4;
pub const STEREO_WIDENING_MAX: i32 = 64;

/// Dialogue enhancer amount bounds
pub const DIALOGUE_AMOUNT_MIN: i32 = 1;
pub const DIALOGUE_AMOUNT_MAX: i32 = 12;

pub const DEFAULT_BASS_LEVEL: i32 = 50;
pub const DEFAULT_TREBLE_LEVEL: i32 = 50;
pub const DEFAULT_STEREO_WIDENING: i32 = 10;
pub const DEFAULT_DIALOGUE_AMOUNT: i32 = 6;
pub const DEFAULT_IEQ_PRESET: i32 = 0;

// Preference keys within a profile partition
pub(crate) const KEY_BASS_ENABLED: &str = "bass_enabled";
pub(crate) const KEY_BASS_LEVEL: &str = "bass_level";
pub(crate) const KEY_TREBLE_ENABLED: &str = "treble_enabled";
pub(crate) const KEY_TREBLE_LEVEL: &str = "treble_level";
pub(crate) const KEY_VOLUME_LEVELER_ENABLED: &str = "volume_leveler_enabled";
pub(crate) const KEY_VIRTUALIZER_ENABLED: &str = "virtualizer_enabled";
pub(crate) const KEY_STEREO_WIDENING: &str = "stereo_widening";
pub(crate) const KEY_DIALOGUE_ENABLED: &str = "dialogue_enhancer_enabled";
pub(crate) const KEY_DIALOGUE_AMOUNT: &str = "dialogue_enhancer_amount";
pub(crate) const KEY_IEQ_PRESET: &str = "ieq_preset";
pub(crate) const KEY_GAINS: &str = "gains";
pub(crate) const KEY_GAINS_BANDS: &str = "gains_bands";

/// Complete DSP parameter set for one profile
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSet {
    pub bass_enabled: bool,
    pub bass_level: i32,
    pub treble_enabled: bool,
    pub treble_level: i32,
    pub volume_leveler_enabled: bool,
    pub virtualizer_enabled: bool,
    pub stereo_widening: i32,
    pub dialogue_enhancer_enabled: bool,
    pub dialogue_enhancer_amount: i32,
    pub ieq_preset: i32,
    pub curve: GainCurve,
}

impl Default for ParameterSet {
    fn default() -> Self {
        Self {
            bass_enabled: false,
            bass_level: DEFAULT_BASS_LEVEL,
            treble_enabled: false,
            treble_level: DEFAULT_TREBLE_LEVEL,
            volume_leveler_enabled: false,
            virtualizer_enabled: false,
            stereo_widening: DEFAULT_STEREO_WIDENING,
            dialogue_enhancer_enabled: false,
            dialogue_enhancer_amount: DEFAULT_DIALOGUE_AMOUNT,
            ieq_preset: DEFAULT_IEQ_PRESET,
            curve: GainCurve::flat(BandMode::Ten),
        }
    }
}

pub(crate) fn clamp_level(value: i32) -> i32 {
    value.clamp(LEVEL_MIN, LEVEL_MAX)
}

pub(crate) fn clamp_stereo_widening(value: i32) -> i32 {
    value.clamp(STEREO_WIDENING_MIN, STEREO_WIDENING_MAX)
}

pub(crate) fn clamp_dialogue_amount(value: i32) -> i32 {
    value.clamp(DIALOGUE_AMOUNT_MIN, DIALOGUE_AMOUNT_MAX)
}

impl ParameterSet {
    /// Assemble a profile's parameters from its preference partition,
    /// falling back to documented defaults for absent keys
    pub fn load(prefs: &dyn PrefStore, partition: &str) -> Self {
        let defaults = Self::default();

        let curve = match (
            prefs.get_str(partition, KEY_GAINS),
            prefs
                .get_int(partition, KEY_GAINS_BANDS)
                .and_then(|c| BandMode::from_band_count(c as usize)),
        ) {
            (Some(serialized), Some(mode)) => GainCurve::deserialize(mode, &serialized)
                .unwrap_or_else(|_| GainCurve::flat(mode)),
            _ => defaults.curve.clone(),
        };

        Self {
            bass_enabled: prefs
                .get_bool(partition, KEY_BASS_ENABLED)
                .unwrap_or(defaults.bass_enabled),
            bass_level: prefs
                .get_int(partition, KEY_BASS_LEVEL)
                .map(|v| clamp_level(v as i32))
                .unwrap_or(defaults.bass_level),
            treble_enabled: prefs
                .get_bool(partition, KEY_TREBLE_ENABLED)
                .unwrap_or(defaults.treble_enabled),
            treble_level: prefs
                .get_int(partition, KEY_TREBLE_LEVEL)
                .map(|v| clamp_level(v as i32))
                .unwrap_or(defaults.treble_level),
            volume_leveler_enabled: prefs
                .get_bool(partition, KEY_VOLUME_LEVELER_ENABLED)
                .unwrap_or(defaults.volume_leveler_enabled),
            virtualizer_enabled: prefs
                .get_bool(partition, KEY_VIRTUALIZER_ENABLED)
                .unwrap_or(defaults.virtualizer_enabled),
            stereo_widening: prefs
                .get_int(partition, KEY_STEREO_WIDENING)
                .map(|v| clamp_stereo_widening(v as i32))
                .unwrap_or(defaults.stereo_widening),
            dialogue_enhancer_enabled: prefs
                .get_bool(partition, KEY_DIALOGUE_ENABLED)
                .unwrap_or(defaults.dialogue_enhancer_enabled),
            dialogue_enhancer_amount: prefs
                .get_int(partition, KEY_DIALOGUE_AMOUNT)
                .map(|v| clamp_dialogue_amount(v as i32))
                .unwrap_or(defaults.dialogue_enhancer_amount),
            ieq_preset: prefs
                .get_int(partition, KEY_IEQ_PRESET)
                .map(|v| v as i32)
                .unwrap_or(defaults.ieq_preset),
            curve,
        }
    }

    /// Scalar parameters in effect-binding order
    ///
    /// The gain curve is excluded; it travels as the 20-slot wire vector.
    pub fn binding_scalars(&self) -> [(EffectParam, i32); 10] {
        [
            (EffectParam::BassEnabled, self.bass_enabled as i32),
            (EffectParam::BassLevel, self.bass_level),
            (EffectParam::TrebleEnabled, self.treble_enabled as i32),
            (EffectParam::TrebleLevel, self.treble_level),
            (
                EffectParam::VolumeLevelerEnabled,
                self.volume_leveler_enabled as i32,
            ),
            (
                EffectParam::VirtualizerEnabled,
                self.virtualizer_enabled as i32,
            ),
            (EffectParam::StereoWidening, self.stereo_widening),
            (
                EffectParam::DialogueEnhancerEnabled,
                self.dialogue_enhancer_enabled as i32,
            ),
            (
                EffectParam::DialogueEnhancerAmount,
                self.dialogue_enhancer_amount,
            ),
            (EffectParam::IeqPreset, self.ieq_preset),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prefs::MemoryPrefs;

    #[test]
    fn test_documented_defaults() {
        let params = ParameterSet::default();
        assert!(!params.bass_enabled);
        assert_eq!(params.bass_level, 50);
        assert_eq!(params.treble_level, 50);
        assert_eq!(params.stereo_widening, 10);
        assert_eq!(params.dialogue_enhancer_amount, 6);
        assert_eq!(params.ieq_preset, 0);
        assert_eq!(params.curve, GainCurve::flat(BandMode::Ten));
    }

    #[test]
    fn test_load_from_empty_partition_is_default() {
        let prefs = MemoryPrefs::new();
        let params = ParameterSet::load(&prefs, "profile.1");
        assert_eq!(params, ParameterSet::default());
    }

    #[test]
    fn test_load_reads_persisted_fields() {
        let prefs = MemoryPrefs::new();
        prefs.put_bool("profile.2", KEY_BASS_ENABLED, true).unwrap();
        prefs.put_int("profile.2", KEY_BASS_LEVEL, 80).unwrap();
        prefs.put_str("profile.2", KEY_GAINS, "1,2,3,4,5,6,7,8,9,10").unwrap();
        prefs.put_int("profile.2", KEY_GAINS_BANDS, 10).unwrap();

        let params = ParameterSet::load(&prefs, "profile.2");
        assert!(params.bass_enabled);
        assert_eq!(params.bass_level, 80);
        assert_eq!(params.curve.gains(), &[1, 2, 3, 4, 5, 6, 7, 8, 9, 10]);

        // Untouched fields keep their defaults
        assert_eq!(params.treble_level, DEFAULT_TREBLE_LEVEL);
    }

    #[test]
    fn test_load_clamps_out_of_range_values() {
        let prefs = MemoryPrefs::new();
        prefs.put_int("p", KEY_BASS_LEVEL, 400).unwrap();
        prefs.put_int("p", KEY_STEREO_WIDENING, 1).unwrap();
        prefs.put_int("p", KEY_DIALOGUE_AMOUNT, 99).unwrap();

        let params = ParameterSet::load(&prefs, "p");
        assert_eq!(params.bass_level, LEVEL_MAX);
        assert_eq!(params.stereo_widening, STEREO_WIDENING_MIN);
        assert_eq!(params.dialogue_enhancer_amount, DIALOGUE_AMOUNT_MAX);
    }

    #[test]
    fn test_load_ignores_curve_with_bad_band_tag() {
        let prefs = MemoryPrefs::new();
        prefs.put_str("p", KEY_GAINS, "1,2,3").unwrap();
        prefs.put_int("p", KEY_GAINS_BANDS, 12).unwrap();

        let params = ParameterSet::load(&prefs, "p");
        assert_eq!(params.curve, GainCurve::flat(BandMode::Ten));
    }

    #[test]
    fn test_binding_scalars_cover_all_fields() {
        let params = ParameterSet {
            bass_enabled: true,
            bass_level: 70,
            ..Default::default()
        };
        let scalars = params.binding_scalars();

        assert!(scalars.contains(&(EffectParam::BassEnabled, 1)));
        assert!(scalars.contains(&(EffectParam::BassLevel, 70)));
        assert_eq!(scalars.len(), 10);
    }
}
