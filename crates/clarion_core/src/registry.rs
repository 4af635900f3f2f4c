//! Preset Registry
//!
//! Built-in presets come from the fixed table in `clarion_bands`; user
//! presets are stored as JSON records in their own preference partition.
//! Matching a curve against the registry happens in the 20-slot wire form,
//! compared canonically, with built-in presets taking precedence over user
//! presets on an exact tie.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use clarion_bands::{canonical_eq, expand, format_gains, parse_gains, BandMode, GainCurve, PRESETS};

use crate::error::{CoreResult, StoreError};
use crate::prefs::PrefStore;

/// Sentinel returned when a curve matches no known preset
pub const CUSTOM_PRESET: &str = "Custom";

/// Maximum length of a user preset name, after trimming
pub const MAX_PRESET_NAME_LEN: usize = 50;

const USER_PRESETS_PARTITION: &str = "user_presets";

/// Where a preset came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PresetOrigin {
    BuiltIn,
    User,
}

/// One preset as presented to consumers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresetInfo {
    pub name: String,
    pub origin: PresetOrigin,
    /// Resolution the gains below are expressed in
    pub mode: BandMode,
    pub gains: Vec<i32>,
}

/// Persisted form of a user preset
#[derive(Debug, Clone, Serialize, Deserialize)]
struct UserPresetRecord {
    /// Comma-joined pre-expansion gains
    gains: String,
    /// Band count the gains were saved at
    bands: usize,
    created_at: DateTime<Utc>,
}

/// Built-in and user-defined named gain curves
pub struct PresetRegistry {
    prefs: Arc<dyn PrefStore>,
}

impl PresetRegistry {
    /// Build a registry over the same preference surface the parameter
    /// store persists through
    pub fn new(prefs: Arc<dyn PrefStore>) -> Self {
        Self { prefs }
    }

    /// All presets visible at the given resolution
    ///
    /// Built-ins are resampled to the requested resolution; user presets
    /// are returned in the resolution they were saved in, tagged.
    pub fn list_presets(&self, mode: BandMode) -> Vec<PresetInfo> {
        let mut presets: Vec<PresetInfo> = PRESETS
            .iter()
            .map(|&(name, gains)| {
                let curve = GainCurve::new(BandMode::Ten, &gains)
                    .unwrap_or_else(|_| GainCurve::flat(BandMode::Ten))
                    .resample(mode);
                PresetInfo {
                    name: name.to_string(),
                    origin: PresetOrigin::BuiltIn,
                    mode,
                    gains: curve.gains().to_vec(),
                }
            })
            .collect();

        for (name, record) in self.user_records() {
            let Some(saved_mode) = BandMode::from_band_count(record.bands) else {
                warn!("User preset '{}' has unsupported band count {}", name, record.bands);
                continue;
            };
            presets.push(PresetInfo {
                name,
                origin: PresetOrigin::User,
                mode: saved_mode,
                gains: parse_gains(&record.gains),
            });
        }

        presets
    }

    /// Name of the preset a curve matches, or the `"Custom"` sentinel
    ///
    /// Comparison is over the expanded wire form, so presets authored at
    /// any resolution match curves at any other.
    pub fn match_name(&self, gains: &[i32], mode: BandMode) -> CoreResult<String> {
        let target = format_gains(&GainCurve::new(mode, gains)?.wire_form());

        for &(name, preset_gains) in PRESETS {
            let candidate = format_gains(&expand(&preset_gains));
            if canonical_eq(&candidate, &target) {
                return Ok(name.to_string());
            }
        }

        for (name, record) in self.user_records() {
            let Some(saved_mode) = BandMode::from_band_count(record.bands) else {
                continue;
            };
            let Ok(curve) = GainCurve::deserialize(saved_mode, &record.gains) else {
                warn!("User preset '{}' has a malformed curve", name);
                continue;
            };
            if canonical_eq(&format_gains(&curve.wire_form()), &target) {
                return Ok(name);
            }
        }

        Ok(CUSTOM_PRESET.to_string())
    }

    /// Save a new user preset
    ///
    /// Rejected when the trimmed name exceeds the length limit or collides
    /// case-insensitively with any visible preset name.
    pub fn add_user_preset(&self, name: &str, gains: &[i32], mode: BandMode) -> CoreResult<()> {
        let trimmed = name.trim();
        let len = trimmed.chars().count();
        if len > MAX_PRESET_NAME_LEN {
            return Err(StoreError::NameTooLong { len });
        }

        let collides = PRESETS
            .iter()
            .map(|&(n, _)| n.to_string())
            .chain(self.user_records().into_iter().map(|(n, _)| n))
            .any(|existing| existing.trim().eq_ignore_ascii_case(trimmed));
        if collides {
            return Err(StoreError::DuplicateName(trimmed.to_string()));
        }

        let curve = GainCurve::new(mode, gains)?;
        let record = UserPresetRecord {
            gains: curve.serialize(),
            bands: mode.band_count(),
            created_at: Utc::now(),
        };

        match serde_json::to_string(&record) {
            Ok(json) => {
                if let Err(e) = self.prefs.put_str(USER_PRESETS_PARTITION, trimmed, &json) {
                    warn!("Failed to persist user preset '{}': {}", trimmed, e);
                } else {
                    info!("User preset '{}' saved ({} bands)", trimmed, record.bands);
                }
            }
            Err(e) => warn!("Failed to encode user preset '{}': {}", trimmed, e),
        }

        Ok(())
    }

    /// Delete a user preset; a no-op for built-in or unknown names
    pub fn delete_user_preset(&self, name: &str) {
        let trimmed = name.trim();
        let existing = self
            .prefs
            .keys(USER_PRESETS_PARTITION)
            .into_iter()
            .find(|k| k.trim().eq_ignore_ascii_case(trimmed));

        if let Some(key) = existing {
            if let Err(e) = self.prefs.remove(USER_PRESETS_PARTITION, &key) {
                warn!("Failed to delete user preset '{}': {}", key, e);
            } else {
                info!("User preset '{}' deleted", key);
            }
        }
    }

    /// User preset records, name-sorted for deterministic match order
    fn user_records(&self) -> Vec<(String, UserPresetRecord)> {
        let mut names = self.prefs.keys(USER_PRESETS_PARTITION);
        names.sort();

        names
            .into_iter()
            .filter_map(|name| {
                let json = self.prefs.get_str(USER_PRESETS_PARTITION, &name)?;
                match serde_json::from_str(&json) {
                    Ok(record) => Some((name, record)),
                    Err(e) => {
                        warn!("Skipping unreadable user preset '{}': {}", name, e);
                        None
                    }
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prefs::MemoryPrefs;

    fn registry() -> PresetRegistry {
        PresetRegistry::new(Arc::new(MemoryPrefs::new()))
    }

    #[test]
    fn test_flat_curve_matches_builtin() {
        let registry = registry();
        let name = registry.match_name(&[0; 10], BandMode::Ten).unwrap();
        assert_eq!(name, "Flat");
    }

    #[test]
    fn test_unknown_curve_is_custom() {
        let registry = registry();
        let gains = [1, 2, 3, 4, 5, 6, 7, 8, 9, 10];
        let name = registry.match_name(&gains, BandMode::Ten).unwrap();
        assert_eq!(name, CUSTOM_PRESET);
    }

    #[test]
    fn test_flat_matches_from_other_resolutions() {
        let registry = registry();
        assert_eq!(
            registry.match_name(&[0; 15], BandMode::Fifteen).unwrap(),
            "Flat"
        );
        assert_eq!(
            registry.match_name(&[0; 20], BandMode::Twenty).unwrap(),
            "Flat"
        );
    }

    #[test]
    fn test_user_preset_matches_after_save() {
        let registry = registry();
        let gains = [9, 8, 7, 6, 5, 4, 3, 2, 1, 0];

        registry
            .add_user_preset("My Curve", &gains, BandMode::Ten)
            .unwrap();

        assert_eq!(
            registry.match_name(&gains, BandMode::Ten).unwrap(),
            "My Curve"
        );
    }

    #[test]
    fn test_builtin_takes_precedence_over_user_tie() {
        let registry = registry();
        // Same shape as the built-in Flat preset under a different name
        registry
            .add_user_preset("Zeroes", &[0; 10], BandMode::Ten)
            .unwrap();

        assert_eq!(registry.match_name(&[0; 10], BandMode::Ten).unwrap(), "Flat");
    }

    #[test]
    fn test_duplicate_name_rejected_case_insensitive() {
        let registry = registry();
        registry
            .add_user_preset("Rock", &[1; 10], BandMode::Ten)
            .unwrap();

        let err = registry
            .add_user_preset("rock ", &[2; 10], BandMode::Ten)
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateName(_)));

        // Built-in names are reserved too
        let err = registry
            .add_user_preset(" FLAT", &[3; 10], BandMode::Ten)
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateName(_)));
    }

    #[test]
    fn test_name_length_limit() {
        let registry = registry();

        let at_limit = "x".repeat(50);
        registry
            .add_user_preset(&at_limit, &[1; 10], BandMode::Ten)
            .unwrap();

        let over_limit = "x".repeat(51);
        let err = registry
            .add_user_preset(&over_limit, &[1; 10], BandMode::Ten)
            .unwrap_err();
        assert!(matches!(err, StoreError::NameTooLong { len: 51 }));

        // Surrounding whitespace does not count toward the limit
        let padded = format!("  {}  ", "y".repeat(50));
        registry
            .add_user_preset(&padded, &[2; 10], BandMode::Ten)
            .unwrap();
    }

    #[test]
    fn test_delete_user_preset() {
        let registry = registry();
        let gains = [5; 10];
        registry
            .add_user_preset("Fleeting", &gains, BandMode::Ten)
            .unwrap();

        registry.delete_user_preset("fleeting ");
        assert_eq!(
            registry.match_name(&gains, BandMode::Ten).unwrap(),
            CUSTOM_PRESET
        );

        // Deleting built-in or absent names is a no-op
        registry.delete_user_preset("Flat");
        registry.delete_user_preset("Never Existed");
        assert_eq!(registry.match_name(&[0; 10], BandMode::Ten).unwrap(), "Flat");
    }

    #[test]
    fn test_list_presets_resamples_builtins() {
        let registry = registry();
        let presets = registry.list_presets(BandMode::Fifteen);

        let flat = presets
            .iter()
            .find(|p| p.name == "Flat")
            .expect("Flat present");
        assert_eq!(flat.origin, PresetOrigin::BuiltIn);
        assert_eq!(flat.mode, BandMode::Fifteen);
        assert_eq!(flat.gains, vec![0; 15]);
    }

    #[test]
    fn test_list_presets_tags_user_presets_with_saved_mode() {
        let registry = registry();
        registry
            .add_user_preset("Wide", &[3; 15], BandMode::Fifteen)
            .unwrap();

        let presets = registry.list_presets(BandMode::Ten);
        let wide = presets.iter().find(|p| p.name == "Wide").expect("saved");

        assert_eq!(wide.origin, PresetOrigin::User);
        assert_eq!(wide.mode, BandMode::Fifteen);
        assert_eq!(wide.gains.len(), 15);
    }

    #[test]
    fn test_user_preset_saved_in_one_mode_matches_in_another() {
        let registry = registry();
        // Flat-but-offset curve survives resampling exactly
        registry
            .add_user_preset("Uniform", &[7; 15], BandMode::Fifteen)
            .unwrap();

        assert_eq!(
            registry.match_name(&[7; 10], BandMode::Ten).unwrap(),
            "Uniform"
        );
    }
}
