//! Parameter Store
//!
//! Owns the persisted per-profile parameters and the active-profile
//! pointer, and forwards every mutation to the effect binding. Persistence
//! and effect application are deliberately not transactional: a failed
//! binding write is retried once after reacquiring control, while
//! persistence failures are logged and the operation continues, so the two
//! may transiently diverge until the next successful apply.
//!
//! The store is the single serialization point for writes to a profile's
//! parameters; components share it as `Arc<ParameterStore>` rather than
//! holding their own copies of state.

use std::sync::Arc;

use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use clarion_bands::{BandMode, GainCurve};
use clarion_platform::{EffectBinding, EffectParam, PlatformError};

use crate::config::{is_valid_profile, ProfileId, DEFAULT_PROFILE, PROFILES};
use crate::error::{CoreResult, StoreError};
use crate::message::StoreEvent;
use crate::params::{
    clamp_dialogue_amount, clamp_level, clamp_stereo_widening, ParameterSet, KEY_BASS_ENABLED,
    KEY_BASS_LEVEL, KEY_DIALOGUE_AMOUNT, KEY_DIALOGUE_ENABLED, KEY_GAINS, KEY_GAINS_BANDS,
    KEY_IEQ_PRESET, KEY_STEREO_WIDENING, KEY_TREBLE_ENABLED, KEY_TREBLE_LEVEL,
    KEY_VIRTUALIZER_ENABLED, KEY_VOLUME_LEVELER_ENABLED,
};
use crate::prefs::PrefStore;

const GLOBAL_PARTITION: &str = "global";
const KEY_ENABLED: &str = "enabled";
const KEY_ACTIVE_PROFILE: &str = "active_profile";
const KEY_BAND_MODE: &str = "band_mode";

/// Preference partition for one profile's parameters
pub(crate) fn profile_partition(profile: ProfileId) -> String {
    format!("profile.{}", profile)
}

/// The profile/equalizer state store
pub struct ParameterStore {
    prefs: Arc<dyn PrefStore>,
    binding: Mutex<Box<dyn EffectBinding>>,
    subscribers: Mutex<Vec<Sender<StoreEvent>>>,
}

impl ParameterStore {
    pub fn new(prefs: Arc<dyn PrefStore>, binding: Box<dyn EffectBinding>) -> Self {
        Self {
            prefs,
            binding: Mutex::new(binding),
            subscribers: Mutex::new(Vec::new()),
        }
    }

    /// The shared preference surface (also used by the preset registry)
    pub fn prefs(&self) -> Arc<dyn PrefStore> {
        Arc::clone(&self.prefs)
    }

    /// Subscribe to change notifications
    pub fn subscribe(&self) -> Receiver<StoreEvent> {
        let (tx, rx) = unbounded();
        self.subscribers.lock().push(tx);
        rx
    }

    // ---- global settings ----

    pub fn enabled(&self) -> bool {
        self.prefs.get_bool(GLOBAL_PARTITION, KEY_ENABLED).unwrap_or(true)
    }

    pub fn set_enabled(&self, enabled: bool) -> CoreResult<()> {
        self.persist_bool(GLOBAL_PARTITION, KEY_ENABLED, enabled);
        self.apply(self.active_profile(), EffectParam::Enabled, &[enabled as i32])?;
        self.notify(StoreEvent::EnabledChanged { enabled });
        Ok(())
    }

    pub fn active_profile(&self) -> ProfileId {
        self.prefs
            .get_int(GLOBAL_PARTITION, KEY_ACTIVE_PROFILE)
            .map(|v| v as ProfileId)
            .filter(|&p| is_valid_profile(p))
            .unwrap_or(DEFAULT_PROFILE)
    }

    /// Make a profile active and push its full parameter set to the
    /// effect binding
    ///
    /// Safe to call repeatedly with the same id.
    pub fn set_active_profile(&self, profile: ProfileId) -> CoreResult<()> {
        self.check_profile(profile)?;

        self.persist_int(GLOBAL_PARTITION, KEY_ACTIVE_PROFILE, profile as i64);
        self.push_profile(profile)?;
        info!("Active profile set to {}", profile);
        self.notify(StoreEvent::ProfileChanged { profile });
        Ok(())
    }

    pub fn band_mode(&self) -> BandMode {
        self.prefs
            .get_int(GLOBAL_PARTITION, KEY_BAND_MODE)
            .and_then(|c| BandMode::from_band_count(c as usize))
            .unwrap_or_default()
    }

    /// Change the global band resolution
    ///
    /// Persisted curves keep their stored resolution and are reinterpreted
    /// by interpolation on read; nothing is discarded.
    pub fn set_band_mode(&self, mode: BandMode) -> CoreResult<()> {
        self.persist_int(GLOBAL_PARTITION, KEY_BAND_MODE, mode.band_count() as i64);
        self.notify(StoreEvent::BandModeChanged { mode });
        Ok(())
    }

    // ---- per-profile parameters ----

    /// Full parameter set for a profile
    pub fn parameters(&self, profile: ProfileId) -> CoreResult<ParameterSet> {
        self.check_profile(profile)?;
        Ok(ParameterSet::load(self.prefs.as_ref(), &profile_partition(profile)))
    }

    pub fn bass_enabled(&self, profile: ProfileId) -> CoreResult<bool> {
        self.get_bool(profile, KEY_BASS_ENABLED, false)
    }

    pub fn set_bass_enabled(&self, profile: ProfileId, enabled: bool) -> CoreResult<()> {
        self.set_bool(profile, KEY_BASS_ENABLED, EffectParam::BassEnabled, enabled)
    }

    pub fn bass_level(&self, profile: ProfileId) -> CoreResult<i32> {
        self.get_int(profile, KEY_BASS_LEVEL, crate::params::DEFAULT_BASS_LEVEL)
    }

    pub fn set_bass_level(&self, profile: ProfileId, level: i32) -> CoreResult<()> {
        self.set_int(profile, KEY_BASS_LEVEL, EffectParam::BassLevel, clamp_level(level))
    }

    pub fn treble_enabled(&self, profile: ProfileId) -> CoreResult<bool> {
        self.get_bool(profile, KEY_TREBLE_ENABLED, false)
    }

    pub fn set_treble_enabled(&self, profile: ProfileId, enabled: bool) -> CoreResult<()> {
        self.set_bool(profile, KEY_TREBLE_ENABLED, EffectParam::TrebleEnabled, enabled)
    }

    pub fn treble_level(&self, profile: ProfileId) -> CoreResult<i32> {
        self.get_int(profile, KEY_TREBLE_LEVEL, crate::params::DEFAULT_TREBLE_LEVEL)
    }

    pub fn set_treble_level(&self, profile: ProfileId, level: i32) -> CoreResult<()> {
        self.set_int(profile, KEY_TREBLE_LEVEL, EffectParam::TrebleLevel, clamp_level(level))
    }

    pub fn volume_leveler_enabled(&self, profile: ProfileId) -> CoreResult<bool> {
        self.get_bool(profile, KEY_VOLUME_LEVELER_ENABLED, false)
    }

    pub fn set_volume_leveler_enabled(&self, profile: ProfileId, enabled: bool) -> CoreResult<()> {
        self.set_bool(
            profile,
            KEY_VOLUME_LEVELER_ENABLED,
            EffectParam::VolumeLevelerEnabled,
            enabled,
        )
    }

    pub fn virtualizer_enabled(&self, profile: ProfileId) -> CoreResult<bool> {
        self.get_bool(profile, KEY_VIRTUALIZER_ENABLED, false)
    }

    pub fn set_virtualizer_enabled(&self, profile: ProfileId, enabled: bool) -> CoreResult<()> {
        self.set_bool(
            profile,
            KEY_VIRTUALIZER_ENABLED,
            EffectParam::VirtualizerEnabled,
            enabled,
        )
    }

    pub fn stereo_widening(&self, profile: ProfileId) -> CoreResult<i32> {
        self.get_int(profile, KEY_STEREO_WIDENING, crate::params::DEFAULT_STEREO_WIDENING)
    }

    pub fn set_stereo_widening(&self, profile: ProfileId, amount: i32) -> CoreResult<()> {
        self.set_int(
            profile,
            KEY_STEREO_WIDENING,
            EffectParam::StereoWidening,
            clamp_stereo_widening(amount),
        )
    }

    pub fn dialogue_enhancer_enabled(&self, profile: ProfileId) -> CoreResult<bool> {
        self.get_bool(profile, KEY_DIALOGUE_ENABLED, false)
    }

    pub fn set_dialogue_enhancer_enabled(&self, profile: ProfileId, enabled: bool) -> CoreResult<()> {
        self.set_bool(
            profile,
            KEY_DIALOGUE_ENABLED,
            EffectParam::DialogueEnhancerEnabled,
            enabled,
        )
    }

    pub fn dialogue_enhancer_amount(&self, profile: ProfileId) -> CoreResult<i32> {
        self.get_int(profile, KEY_DIALOGUE_AMOUNT, crate::params::DEFAULT_DIALOGUE_AMOUNT)
    }

    pub fn set_dialogue_enhancer_amount(&self, profile: ProfileId, amount: i32) -> CoreResult<()> {
        self.set_int(
            profile,
            KEY_DIALOGUE_AMOUNT,
            EffectParam::DialogueEnhancerAmount,
            clamp_dialogue_amount(amount),
        )
    }

    pub fn ieq_preset(&self, profile: ProfileId) -> CoreResult<i32> {
        self.get_int(profile, KEY_IEQ_PRESET, crate::params::DEFAULT_IEQ_PRESET)
    }

    pub fn set_ieq_preset(&self, profile: ProfileId, preset: i32) -> CoreResult<()> {
        self.set_int(profile, KEY_IEQ_PRESET, EffectParam::IeqPreset, preset)
    }

    // ---- gain curves ----

    /// The profile's curve at the requested resolution
    ///
    /// Resampled on read when it was persisted at a different resolution.
    pub fn gain_curve(&self, profile: ProfileId, mode: BandMode) -> CoreResult<GainCurve> {
        self.check_profile(profile)?;
        let partition = profile_partition(profile);

        let stored = match (
            self.prefs.get_str(&partition, KEY_GAINS),
            self.prefs
                .get_int(&partition, KEY_GAINS_BANDS)
                .and_then(|c| BandMode::from_band_count(c as usize)),
        ) {
            (Some(serialized), Some(stored_mode)) => {
                GainCurve::deserialize(stored_mode, &serialized)
                    .unwrap_or_else(|_| GainCurve::flat(stored_mode))
            }
            _ => return Ok(GainCurve::flat(mode)),
        };

        if stored.mode() == mode {
            Ok(stored)
        } else {
            debug!(
                "Resampling profile {} curve from {:?} to {:?}",
                profile,
                stored.mode(),
                mode
            );
            Ok(stored.resample(mode))
        }
    }

    /// Store a profile's curve and push its wire form to the binding
    ///
    /// The pre-expansion curve is persisted together with its resolution
    /// tag; the binding receives the 20-slot wire vector.
    pub fn set_gain_curve(
        &self,
        profile: ProfileId,
        gains: &[i32],
        mode: BandMode,
    ) -> CoreResult<()> {
        self.check_profile(profile)?;
        let curve = GainCurve::new(mode, gains)?;

        let partition = profile_partition(profile);
        self.persist_str(&partition, KEY_GAINS, &curve.serialize());
        self.persist_int(&partition, KEY_GAINS_BANDS, mode.band_count() as i64);

        self.apply(profile, EffectParam::GraphicEq, &curve.wire_form())
    }

    // ---- reset ----

    /// Restore one profile to documented defaults
    ///
    /// Does not touch the active-profile pointer.
    pub fn reset_profile(&self, profile: ProfileId) -> CoreResult<()> {
        self.check_profile(profile)?;

        let partition = profile_partition(profile);
        if let Err(e) = self.prefs.clear_partition(&partition) {
            warn!("Failed to clear partition '{}': {}", partition, e);
        }

        info!("Profile {} reset to defaults", profile);
        self.push_profile(profile)
    }

    /// Restore every profile, then make the default profile active
    pub fn reset_all_profiles(&self) -> CoreResult<()> {
        for &(profile, _) in PROFILES {
            self.reset_profile(profile)?;
        }
        self.set_active_profile(DEFAULT_PROFILE)
    }

    // ---- internals ----

    fn check_profile(&self, profile: ProfileId) -> CoreResult<()> {
        if is_valid_profile(profile) {
            Ok(())
        } else {
            Err(StoreError::UnknownProfile(profile))
        }
    }

    fn get_bool(&self, profile: ProfileId, key: &str, default: bool) -> CoreResult<bool> {
        self.check_profile(profile)?;
        Ok(self
            .prefs
            .get_bool(&profile_partition(profile), key)
            .unwrap_or(default))
    }

    fn get_int(&self, profile: ProfileId, key: &str, default: i32) -> CoreResult<i32> {
        self.check_profile(profile)?;
        Ok(self
            .prefs
            .get_int(&profile_partition(profile), key)
            .map(|v| v as i32)
            .unwrap_or(default))
    }

    fn set_bool(
        &self,
        profile: ProfileId,
        key: &str,
        param: EffectParam,
        value: bool,
    ) -> CoreResult<()> {
        self.check_profile(profile)?;
        self.persist_bool(&profile_partition(profile), key, value);
        self.apply(profile, param, &[value as i32])
    }

    fn set_int(
        &self,
        profile: ProfileId,
        key: &str,
        param: EffectParam,
        value: i32,
    ) -> CoreResult<()> {
        self.check_profile(profile)?;
        self.persist_int(&profile_partition(profile), key, value as i64);
        self.apply(profile, param, &[value])
    }

    // Persistence is best-effort: failures are logged, never propagated,
    // and the effect-binding write still goes ahead
    fn persist_bool(&self, partition: &str, key: &str, value: bool) {
        if let Err(e) = self.prefs.put_bool(partition, key, value) {
            warn!("Failed to persist {}/{}: {}", partition, key, e);
        }
    }

    fn persist_int(&self, partition: &str, key: &str, value: i64) {
        if let Err(e) = self.prefs.put_int(partition, key, value) {
            warn!("Failed to persist {}/{}: {}", partition, key, e);
        }
    }

    fn persist_str(&self, partition: &str, key: &str, value: &str) {
        if let Err(e) = self.prefs.put_str(partition, key, value) {
            warn!("Failed to persist {}/{}: {}", partition, key, e);
        }
    }

    /// Forward one parameter to the effect binding, reacquiring control
    /// and retrying once if the session was lost
    fn apply(&self, profile: ProfileId, param: EffectParam, values: &[i32]) -> CoreResult<()> {
        let mut binding = self.binding.lock();

        if !binding.has_control() {
            warn!("Effect binding lost control, reacquiring");
            binding.reacquire().map_err(|_| StoreError::ControlLost)?;
        }

        match binding.set_parameter(profile, param, values) {
            Err(PlatformError::ControlLost) => {
                warn!("Effect write lost control mid-flight, reacquiring for retry");
                binding.reacquire().map_err(|_| StoreError::ControlLost)?;
                binding
                    .set_parameter(profile, param, values)
                    .map_err(|e| match e {
                        PlatformError::ControlLost => StoreError::ControlLost,
                        other => other.into(),
                    })
            }
            Err(other) => Err(other.into()),
            Ok(()) => Ok(()),
        }
    }

    /// Push a profile's complete state to the binding
    fn push_profile(&self, profile: ProfileId) -> CoreResult<()> {
        let params = ParameterSet::load(self.prefs.as_ref(), &profile_partition(profile));

        self.apply(profile, EffectParam::Enabled, &[self.enabled() as i32])?;
        for (param, value) in params.binding_scalars() {
            self.apply(profile, param, &[value])?;
        }
        self.apply(profile, EffectParam::GraphicEq, &params.curve.wire_form())
    }

    fn notify(&self, event: StoreEvent) {
        self.subscribers
            .lock()
            .retain(|tx| tx.send(event.clone()).is_ok());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prefs::MemoryPrefs;
    use clarion_bands::expand;
    use clarion_platform::StubEffectBinding;

    fn store_with_stub() -> (Arc<ParameterStore>, StubEffectBinding) {
        let binding = StubEffectBinding::new();
        let store = Arc::new(ParameterStore::new(
            Arc::new(MemoryPrefs::new()),
            Box::new(binding.clone()),
        ));
        (store, binding)
    }

    #[test]
    fn test_enabled_defaults_true_and_toggles() {
        let (store, binding) = store_with_stub();
        assert!(store.enabled());

        store.set_enabled(false).unwrap();
        assert!(!store.enabled());
        assert_eq!(binding.values(0, EffectParam::Enabled), Some(vec![0]));
    }

    #[test]
    fn test_set_active_profile_pushes_parameters() {
        let (store, binding) = store_with_stub();

        store.set_bass_enabled(2, true).unwrap();
        store.set_bass_level(2, 80).unwrap();
        store.set_active_profile(2).unwrap();

        assert_eq!(store.active_profile(), 2);
        assert_eq!(binding.values(2, EffectParam::BassEnabled), Some(vec![1]));
        assert_eq!(binding.values(2, EffectParam::BassLevel), Some(vec![80]));
        // The curve travels as the 20-slot wire vector
        assert_eq!(
            binding.values(2, EffectParam::GraphicEq),
            Some(vec![0; 20])
        );
    }

    #[test]
    fn test_set_active_profile_idempotent() {
        let (store, _binding) = store_with_stub();
        store.set_active_profile(1).unwrap();
        store.set_active_profile(1).unwrap();
        assert_eq!(store.active_profile(), 1);
    }

    #[test]
    fn test_unknown_profile_rejected() {
        let (store, _binding) = store_with_stub();
        assert!(matches!(
            store.set_active_profile(42),
            Err(StoreError::UnknownProfile(42))
        ));
        assert!(store.set_bass_level(42, 10).is_err());
        assert!(store.gain_curve(42, BandMode::Ten).is_err());
    }

    #[test]
    fn test_profile_change_notifies_subscribers() {
        let (store, _binding) = store_with_stub();
        let events = store.subscribe();

        store.set_active_profile(3).unwrap();

        assert_eq!(
            events.try_recv().unwrap(),
            StoreEvent::ProfileChanged { profile: 3 }
        );
    }

    #[test]
    fn test_setters_clamp_and_persist() {
        let (store, binding) = store_with_stub();

        store.set_bass_level(1, 400).unwrap();
        assert_eq!(store.bass_level(1).unwrap(), 100);
        assert_eq!(binding.values(1, EffectParam::BassLevel), Some(vec![100]));

        store.set_stereo_widening(1, 1).unwrap();
        assert_eq!(store.stereo_widening(1).unwrap(), 4);

        store.set_dialogue_enhancer_amount(1, 20).unwrap();
        assert_eq!(store.dialogue_enhancer_amount(1).unwrap(), 12);
    }

    #[test]
    fn test_parameters_isolated_between_profiles() {
        let (store, _binding) = store_with_stub();

        store.set_bass_level(1, 90).unwrap();
        store.set_bass_level(2, 10).unwrap();

        assert_eq!(store.bass_level(1).unwrap(), 90);
        assert_eq!(store.bass_level(2).unwrap(), 10);
    }

    #[test]
    fn test_gain_curve_set_get_roundtrip() {
        let (store, _binding) = store_with_stub();
        let gains = [0, 0, 0, 0, 0, 0, 0, 0, 0, 0];

        store.set_gain_curve(1, &gains, BandMode::Ten).unwrap();
        let curve = store.gain_curve(1, BandMode::Ten).unwrap();

        assert_eq!(curve.gains(), &gains);
        assert_eq!(curve.mode(), BandMode::Ten);
    }

    #[test]
    fn test_gain_curve_forwards_wire_form() {
        let (store, binding) = store_with_stub();
        let gains = [10, 20, 30, 40, 50, 60, 70, 80, 90, 100];

        store.set_gain_curve(1, &gains, BandMode::Ten).unwrap();

        let expected = expand(&gains);
        assert_eq!(
            binding.values(1, EffectParam::GraphicEq),
            Some(expected.to_vec())
        );
    }

    #[test]
    fn test_gain_curve_resamples_on_mode_mismatch() {
        let (store, _binding) = store_with_stub();
        let mut gains = [0i32; 10];
        gains[0] = 44;
        gains[9] = -66;

        store.set_gain_curve(1, &gains, BandMode::Ten).unwrap();
        let curve = store.gain_curve(1, BandMode::Twenty).unwrap();

        assert_eq!(curve.mode(), BandMode::Twenty);
        assert_eq!(curve.gains().len(), 20);
        assert_eq!(curve.gains()[0], 44);
        assert_eq!(*curve.gains().last().unwrap(), -66);
    }

    #[test]
    fn test_missing_curve_reads_flat_in_requested_mode() {
        let (store, _binding) = store_with_stub();
        let curve = store.gain_curve(1, BandMode::Fifteen).unwrap();
        assert_eq!(curve, GainCurve::flat(BandMode::Fifteen));
    }

    #[test]
    fn test_reset_profile_restores_defaults() {
        let (store, binding) = store_with_stub();

        store.set_bass_enabled(1, true).unwrap();
        store.set_bass_level(1, 95).unwrap();
        store.reset_profile(1).unwrap();

        let params = store.parameters(1).unwrap();
        assert_eq!(params, ParameterSet::default());
        // Defaults were pushed to the binding
        assert_eq!(binding.values(1, EffectParam::BassLevel), Some(vec![50]));
        assert_eq!(binding.values(1, EffectParam::BassEnabled), Some(vec![0]));
    }

    #[test]
    fn test_reset_profile_keeps_active_pointer() {
        let (store, _binding) = store_with_stub();
        store.set_active_profile(2).unwrap();
        store.reset_profile(2).unwrap();
        assert_eq!(store.active_profile(), 2);
    }

    #[test]
    fn test_reset_all_returns_to_default_profile() {
        let (store, _binding) = store_with_stub();
        store.set_active_profile(3).unwrap();
        store.set_bass_level(3, 99).unwrap();

        store.reset_all_profiles().unwrap();

        assert_eq!(store.active_profile(), DEFAULT_PROFILE);
        assert_eq!(store.bass_level(3).unwrap(), 50);
    }

    #[test]
    fn test_band_mode_persists_and_notifies() {
        let (store, _binding) = store_with_stub();
        let events = store.subscribe();

        assert_eq!(store.band_mode(), BandMode::Ten);
        store.set_band_mode(BandMode::Twenty).unwrap();
        assert_eq!(store.band_mode(), BandMode::Twenty);
        assert_eq!(
            events.try_recv().unwrap(),
            StoreEvent::BandModeChanged {
                mode: BandMode::Twenty
            }
        );
    }

    #[test]
    fn test_lost_control_reacquires_and_retries_once() {
        let (store, binding) = store_with_stub();

        binding.fail_next_set();
        store.set_bass_level(1, 60).unwrap();

        assert_eq!(binding.reacquire_count(), 1);
        assert_eq!(binding.values(1, EffectParam::BassLevel), Some(vec![60]));
    }

    #[test]
    fn test_control_checked_before_write() {
        let (store, binding) = store_with_stub();

        binding.drop_control();
        store.set_bass_level(1, 60).unwrap();

        assert_eq!(binding.reacquire_count(), 1);
        assert_eq!(binding.values(1, EffectParam::BassLevel), Some(vec![60]));
    }

    #[test]
    fn test_unrecoverable_control_loss_surfaces() {
        let (store, binding) = store_with_stub();

        binding.drop_control();
        binding.set_fail_reacquire(true);

        assert!(matches!(
            store.set_bass_level(1, 60),
            Err(StoreError::ControlLost)
        ));
        // Persisted state may diverge until the next successful apply
        assert_eq!(store.bass_level(1).unwrap(), 60);
    }
}
