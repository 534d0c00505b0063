//! Live tunables.
//!
//! Every accessor goes back to the preference provider, so an operator can
//! retune the controller between two reads in the same tick. Values are
//! sanitized here: a rejected value falls back to the configured default and is
//! reported once until it becomes valid again.

use std::cell::RefCell;
use std::collections::HashSet;
use std::sync::Arc;

use seeker_config::pref_key;
use seeker_traits::{Axis, PreferenceProvider};

use crate::config::{AxisMask, TunableDefaults};

/// Preference key names, before namespacing.
pub mod keys {
    pub const KP: &str = "kP";
    pub const KI: &str = "kI";
    pub const KCHANGE: &str = "kChange";
    pub const ERROR_TOLERANCE: &str = "errorTolerance";
    pub const MAX_LATERAL_SPEED: &str = "maxLateralSpeed";
    pub const MAX_DEPTH_SPEED: &str = "maxDepthSpeed";
    pub const ENABLE_ROTATIONAL: &str = "enableRotational";
    pub const ENABLE_LATERAL: &str = "enableLateral";
    pub const ENABLE_DEPTH: &str = "enableDepth";
}

#[derive(Debug, Clone, Copy)]
enum Accept {
    Finite,
    Positive,
    NonNegative,
}

impl Accept {
    fn check(self, v: f64) -> bool {
        match self {
            Accept::Finite => v.is_finite(),
            Accept::Positive => v.is_finite() && v > 0.0,
            Accept::NonNegative => v.is_finite() && v >= 0.0,
        }
    }
}

/// Namespaced keys, built once.
#[derive(Debug, Clone)]
struct KeySet {
    kp: String,
    ki: String,
    kchange: String,
    error_tolerance: String,
    max_lateral_speed: String,
    max_depth_speed: String,
    enable: [String; 3],
}

impl KeySet {
    fn new(group: &str) -> Self {
        Self {
            kp: pref_key(group, keys::KP),
            ki: pref_key(group, keys::KI),
            kchange: pref_key(group, keys::KCHANGE),
            error_tolerance: pref_key(group, keys::ERROR_TOLERANCE),
            max_lateral_speed: pref_key(group, keys::MAX_LATERAL_SPEED),
            max_depth_speed: pref_key(group, keys::MAX_DEPTH_SPEED),
            enable: [
                pref_key(group, keys::ENABLE_ROTATIONAL),
                pref_key(group, keys::ENABLE_LATERAL),
                pref_key(group, keys::ENABLE_DEPTH),
            ],
        }
    }
}

pub struct Tunables {
    provider: Arc<dyn PreferenceProvider + Send + Sync>,
    defaults: TunableDefaults,
    keys: KeySet,
    rejected: RefCell<HashSet<String>>,
}

impl core::fmt::Debug for Tunables {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tunables")
            .field("defaults", &self.defaults)
            .field("kp_key", &self.keys.kp)
            .finish_non_exhaustive()
    }
}

impl Tunables {
    pub fn new(
        provider: Arc<dyn PreferenceProvider + Send + Sync>,
        group: &str,
        defaults: TunableDefaults,
    ) -> Self {
        Self {
            provider,
            defaults,
            keys: KeySet::new(group),
            rejected: RefCell::new(HashSet::new()),
        }
    }

    pub fn defaults(&self) -> &TunableDefaults {
        &self.defaults
    }

    fn read(&self, key: &str, default: f64, accept: Accept) -> f64 {
        let v = self.provider.get_double(key, default);
        if accept.check(v) {
            self.rejected.borrow_mut().remove(key);
            v
        } else {
            if self.rejected.borrow_mut().insert(key.to_string()) {
                tracing::warn!(key, value = v, fallback = default, "rejected preference value");
            }
            default
        }
    }

    pub fn kp(&self) -> f64 {
        self.read(&self.keys.kp, self.defaults.kp, Accept::Finite)
    }

    pub fn ki(&self) -> f64 {
        self.read(&self.keys.ki, self.defaults.ki, Accept::Finite)
    }

    pub fn kchange(&self) -> f64 {
        self.read(&self.keys.kchange, self.defaults.kchange, Accept::Positive)
    }

    pub fn error_tolerance(&self) -> f64 {
        self.read(
            &self.keys.error_tolerance,
            self.defaults.error_tolerance,
            Accept::NonNegative,
        )
    }

    pub fn max_lateral_speed(&self) -> f64 {
        self.read(
            &self.keys.max_lateral_speed,
            self.defaults.max_lateral_speed,
            Accept::NonNegative,
        )
    }

    pub fn max_depth_speed(&self) -> f64 {
        self.read(
            &self.keys.max_depth_speed,
            self.defaults.max_depth_speed,
            Accept::NonNegative,
        )
    }

    pub fn axis_enabled(&self, axis: Axis) -> bool {
        self.provider.get_bool(
            &self.keys.enable[axis.index()],
            self.defaults.enabled_axes.get(axis),
        )
    }

    pub fn enabled_axes(&self) -> AxisMask {
        AxisMask {
            rotational: self.axis_enabled(Axis::Rotational),
            lateral: self.axis_enabled(Axis::Lateral),
            depth: self.axis_enabled(Axis::Depth),
        }
    }

    /// Current values of every tunable, for logging.
    pub fn snapshot(&self) -> TunableDefaults {
        TunableDefaults {
            kp: self.kp(),
            ki: self.ki(),
            kchange: self.kchange(),
            error_tolerance: self.error_tolerance(),
            max_lateral_speed: self.max_lateral_speed(),
            max_depth_speed: self.max_depth_speed(),
            enabled_axes: self.enabled_axes(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use seeker_config::PreferenceStore;

    fn tunables(store: &Arc<PreferenceStore>) -> Tunables {
        Tunables::new(store.clone(), "vision", TunableDefaults::default())
    }

    #[test]
    fn reads_defaults_without_overrides() {
        let store = Arc::new(PreferenceStore::new());
        let t = tunables(&store);
        assert_eq!(t.snapshot(), TunableDefaults::default());
    }

    #[test]
    fn overrides_are_read_live() {
        let store = Arc::new(PreferenceStore::new());
        let t = tunables(&store);
        assert_eq!(t.kp(), 1.0);
        store.set_double("vision::kP", 2.0);
        assert_eq!(t.kp(), 2.0);
        store.set_bool("vision::enableLateral", false);
        assert!(!t.enabled_axes().lateral);
    }

    #[test]
    fn invalid_values_fall_back_to_defaults() {
        let store = Arc::new(PreferenceStore::new());
        let t = tunables(&store);
        store.set_double("vision::kChange", 0.0);
        store.set_double("vision::errorTolerance", f64::NAN);
        store.set_double("vision::maxDepthSpeed", -0.2);
        store.set_double("vision::kI", f64::INFINITY);
        assert_eq!(t.kchange(), 0.4);
        assert_eq!(t.error_tolerance(), 0.25);
        assert_eq!(t.max_depth_speed(), 0.3);
        assert_eq!(t.ki(), 0.01);
        // Once valid again the override applies.
        store.set_double("vision::kChange", 0.6);
        assert_eq!(t.kchange(), 0.6);
    }

    #[test]
    fn group_namespaces_keys() {
        let store = Arc::new(PreferenceStore::new());
        store.set_double("vision::kP", 9.0);
        store.set_double("turret::kP", 3.0);
        let t = Tunables::new(store.clone(), "turret", TunableDefaults::default());
        assert_eq!(t.kp(), 3.0);
    }
}
