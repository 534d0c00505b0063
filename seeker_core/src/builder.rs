//! Type-state builder for the boxed controller and generic `build_controller`.
//!
//! `build()` only exists once a vision source and a drive are set;
//! `try_build()` is always available and reports what is missing.

use std::marker::PhantomData;
use std::sync::Arc;

use seeker_traits::{DriveActuator, NoPreferences, PreferenceProvider, VisionSource};

use crate::config::{Bounds, ControllerSettings, TargetingCfg, TunableDefaults};
use crate::controller::Controller;
use crate::error::{BuildError, Result};
use crate::tunables::Tunables;

/// Upper limit on the sample window; larger windows make every median sort slow.
pub const MAX_WINDOW_FRAMES: usize = 10_000;

/// Controller over boxed collaborators.
pub type DynController = Controller<Box<dyn VisionSource>, Box<dyn DriveActuator>>;

pub type SharedPreferences = Arc<dyn PreferenceProvider + Send + Sync>;

// ── Type-state markers ───────────────────────────────────────────────────────

pub struct Missing;
pub struct Set;

pub struct ControllerBuilder<V, D> {
    vision: Option<Box<dyn VisionSource>>,
    drive: Option<Box<dyn DriveActuator>>,
    settings: ControllerSettings,
    preferences: Option<SharedPreferences>,
    _v: PhantomData<V>,
    _d: PhantomData<D>,
}

impl Default for ControllerBuilder<Missing, Missing> {
    fn default() -> Self {
        Self {
            vision: None,
            drive: None,
            settings: ControllerSettings::default(),
            preferences: None,
            _v: PhantomData,
            _d: PhantomData,
        }
    }
}

impl DynController {
    pub fn builder() -> ControllerBuilder<Missing, Missing> {
        ControllerBuilder::default()
    }
}

fn invalid(msg: &'static str) -> eyre::Report {
    eyre::Report::new(BuildError::InvalidConfig(msg))
}

fn check_bounds(b: &Bounds) -> Result<()> {
    for v in [b.rotational, b.lateral, b.depth] {
        if !v.is_finite() || v <= 0.0 {
            return Err(invalid("bounds must be finite and > 0"));
        }
    }
    Ok(())
}

fn check_defaults(t: &TunableDefaults) -> Result<()> {
    if !t.kp.is_finite() || !t.ki.is_finite() {
        return Err(invalid("kp and ki must be finite"));
    }
    if !t.kchange.is_finite() || t.kchange <= 0.0 {
        return Err(invalid("kchange must be finite and > 0"));
    }
    if !t.error_tolerance.is_finite() || t.error_tolerance < 0.0 {
        return Err(invalid("error_tolerance must be finite and >= 0"));
    }
    for v in [t.max_lateral_speed, t.max_depth_speed] {
        if !v.is_finite() || v < 0.0 {
            return Err(invalid("max speeds must be finite and >= 0"));
        }
    }
    Ok(())
}

/// Shared validation for `try_build` and `build_controller`.
fn validate_and_build<V: VisionSource, D: DriveActuator>(
    vision: V,
    drive: D,
    settings: ControllerSettings,
    preferences: Option<SharedPreferences>,
) -> Result<Controller<V, D>> {
    let ControllerSettings {
        targeting,
        tunables,
        preference_group,
    } = settings;

    if !(1..=MAX_WINDOW_FRAMES).contains(&targeting.window_frames) {
        return Err(invalid("window_frames must be in 1..=10000"));
    }
    check_bounds(&targeting.bounds)?;
    check_defaults(&tunables)?;

    let provider: SharedPreferences = match preferences {
        Some(p) => p,
        None => Arc::new(NoPreferences),
    };
    let tunables = Tunables::new(provider, &preference_group, tunables);
    Ok(Controller::new(vision, drive, tunables, targeting))
}

impl<V, D> ControllerBuilder<V, D> {
    /// Fallible build available in any type-state.
    pub fn try_build(self) -> Result<DynController> {
        let vision = self
            .vision
            .ok_or_else(|| eyre::Report::new(BuildError::MissingVision))?;
        let drive = self
            .drive
            .ok_or_else(|| eyre::Report::new(BuildError::MissingDrive))?;
        validate_and_build(vision, drive, self.settings, self.preferences)
    }

    pub fn with_settings(mut self, settings: ControllerSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_targeting(mut self, targeting: TargetingCfg) -> Self {
        self.settings.targeting = targeting;
        self
    }

    pub fn with_tunable_defaults(mut self, defaults: TunableDefaults) -> Self {
        self.settings.tunables = defaults;
        self
    }

    pub fn with_preference_group(mut self, group: impl Into<String>) -> Self {
        self.settings.preference_group = group.into();
        self
    }

    /// Live tunables source; defaults to `NoPreferences`.
    pub fn with_preferences(mut self, preferences: SharedPreferences) -> Self {
        self.preferences = Some(preferences);
        self
    }
}

impl<D> ControllerBuilder<Missing, D> {
    pub fn with_vision(self, vision: impl VisionSource + 'static) -> ControllerBuilder<Set, D> {
        ControllerBuilder {
            vision: Some(Box::new(vision)),
            drive: self.drive,
            settings: self.settings,
            preferences: self.preferences,
            _v: PhantomData,
            _d: PhantomData,
        }
    }
}

impl<V> ControllerBuilder<V, Missing> {
    pub fn with_drive(self, drive: impl DriveActuator + 'static) -> ControllerBuilder<V, Set> {
        ControllerBuilder {
            vision: self.vision,
            drive: Some(Box::new(drive)),
            settings: self.settings,
            preferences: self.preferences,
            _v: PhantomData,
            _d: PhantomData,
        }
    }
}

impl ControllerBuilder<Set, Set> {
    pub fn build(self) -> Result<DynController> {
        self.try_build()
    }
}

/// Statically dispatched construction from concrete collaborators.
pub fn build_controller<V, D>(
    vision: V,
    drive: D,
    settings: ControllerSettings,
    preferences: Option<SharedPreferences>,
) -> Result<Controller<V, D>>
where
    V: VisionSource,
    D: DriveActuator,
{
    validate_and_build(vision, drive, settings, preferences)
}
