#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schemas, telemetry CSV parsing, and live preference stores.
//!
//! - `Config` and its sections are deserialized from TOML and checked by `validate()`.
//!   Every section has defaults, so an empty file is a valid configuration.
//! - `telemetry` loads recorded vision frames for replay runs.
//! - `preferences` holds the hot-reloadable key/value overrides read by the
//!   controller on every tunable access.
use std::path::PathBuf;

use serde::Deserialize;

pub mod preferences;
pub mod telemetry;

pub use preferences::{FilePreferences, PrefValue, PreferenceStore, pref_key};
pub use telemetry::{TelemetryRow, load_telemetry_csv, parse_telemetry_csv};

/// Maximum expected magnitude of each raw offset.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct BoundsCfg {
    /// Degrees of horizontal angle at the edge of the frame.
    pub rotational: f64,
    /// Degrees of vertical angle at the edge of the frame.
    pub lateral: f64,
    /// Target area ratio at the desired stand-off distance.
    pub depth: f64,
}

impl Default for BoundsCfg {
    fn default() -> Self {
        Self {
            rotational: 27.0,
            lateral: 20.5,
            depth: 0.7,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct TargetingCfg {
    /// Sample window capacity, in frames.
    pub window_frames: usize,
    pub bounds: BoundsCfg,
}

impl Default for TargetingCfg {
    fn default() -> Self {
        Self {
            window_frames: 20,
            bounds: BoundsCfg::default(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct AxisMaskCfg {
    pub rotational: bool,
    pub lateral: bool,
    pub depth: bool,
}

impl Default for AxisMaskCfg {
    fn default() -> Self {
        Self {
            rotational: true,
            lateral: true,
            depth: true,
        }
    }
}

/// Fallback values for the live tunables. Preferences override these per key.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct TunablesCfg {
    pub kp: f64,
    pub ki: f64,
    /// Response curve exponent applied to normalized offsets.
    pub kchange: f64,
    pub error_tolerance: f64,
    pub max_lateral_speed: f64,
    pub max_depth_speed: f64,
    pub enabled_axes: AxisMaskCfg,
}

impl Default for TunablesCfg {
    fn default() -> Self {
        Self {
            kp: 1.0,
            ki: 0.01,
            kchange: 0.4,
            error_tolerance: 0.25,
            max_lateral_speed: 0.5,
            max_depth_speed: 0.3,
            enabled_axes: AxisMaskCfg::default(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct PreferencesCfg {
    /// Key namespace; keys are looked up as `<group>::<name>`.
    pub group: String,
    /// Optional TOML file of overrides, reloaded whenever it changes on disk.
    pub file: Option<PathBuf>,
}

impl Default for PreferencesCfg {
    fn default() -> Self {
        Self {
            group: "vision".to_string(),
            file: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct RunnerCfg {
    /// Control rate; the tick period is derived from it.
    pub tick_hz: u32,
    /// Hard cap on ticks for a single run.
    pub max_ticks: u64,
}

impl Default for RunnerCfg {
    fn default() -> Self {
        Self {
            tick_hz: 50,
            max_ticks: 500,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct InitialOffsetsCfg {
    pub rotational: f64,
    pub lateral: f64,
    pub depth: f64,
}

impl Default for InitialOffsetsCfg {
    fn default() -> Self {
        Self {
            rotational: 12.0,
            lateral: 4.0,
            depth: 0.35,
        }
    }
}

/// Closed-loop plant used by `seeker sim`.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SimCfg {
    pub initial: InitialOffsetsCfg,
    /// Degrees of heading change per unit of rotational gain per tick.
    pub rotation_rate: f64,
    /// Degrees of lateral change per unit of lateral gain per tick.
    pub lateral_rate: f64,
    /// Area ratio change per unit of depth gain per tick.
    pub depth_rate: f64,
    /// Peak amplitude of uniform measurement noise, as a fraction of each bound.
    pub noise: f64,
    /// Probability of a frame reporting no target.
    pub dropout: f64,
    /// Probability of a frame failing to read at all.
    pub sensor_fault: f64,
    pub seed: u32,
}

impl Default for SimCfg {
    fn default() -> Self {
        Self {
            initial: InitialOffsetsCfg::default(),
            rotation_rate: 2.0,
            lateral_rate: 1.0,
            depth_rate: 0.05,
            noise: 0.01,
            dropout: 0.05,
            sensor_fault: 0.0,
            seed: 0x5eed,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum IlluminatorMode {
    /// Whatever the camera pipeline is configured for.
    #[default]
    Default,
    Blink,
    On,
    Off,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct IlluminatorCfg {
    /// Mode used while the controller is active.
    pub mode: IlluminatorMode,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct Config {
    pub targeting: TargetingCfg,
    pub tunables: TunablesCfg,
    pub preferences: PreferencesCfg,
    pub runner: RunnerCfg,
    pub sim: SimCfg,
    pub illuminator: IlluminatorCfg,
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

fn finite_positive(v: f64) -> bool {
    v.is_finite() && v > 0.0
}

fn finite_non_negative(v: f64) -> bool {
    v.is_finite() && v >= 0.0
}

fn probability(v: f64) -> bool {
    (0.0..=1.0).contains(&v)
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Targeting
        if self.targeting.window_frames == 0 {
            eyre::bail!("targeting.window_frames must be >= 1");
        }
        if self.targeting.window_frames > 10_000 {
            eyre::bail!("targeting.window_frames is unreasonably large (>10000)");
        }
        let b = &self.targeting.bounds;
        if !finite_positive(b.rotational) {
            eyre::bail!("targeting.bounds.rotational must be finite and > 0");
        }
        if !finite_positive(b.lateral) {
            eyre::bail!("targeting.bounds.lateral must be finite and > 0");
        }
        if !finite_positive(b.depth) {
            eyre::bail!("targeting.bounds.depth must be finite and > 0");
        }

        // Tunables
        let t = &self.tunables;
        if !t.kp.is_finite() {
            eyre::bail!("tunables.kp must be finite");
        }
        if !t.ki.is_finite() {
            eyre::bail!("tunables.ki must be finite");
        }
        if !finite_positive(t.kchange) {
            eyre::bail!("tunables.kchange must be finite and > 0");
        }
        if !finite_non_negative(t.error_tolerance) {
            eyre::bail!("tunables.error_tolerance must be finite and >= 0");
        }
        if !finite_non_negative(t.max_lateral_speed) {
            eyre::bail!("tunables.max_lateral_speed must be finite and >= 0");
        }
        if !finite_non_negative(t.max_depth_speed) {
            eyre::bail!("tunables.max_depth_speed must be finite and >= 0");
        }

        // Runner
        if self.runner.tick_hz == 0 {
            eyre::bail!("runner.tick_hz must be > 0");
        }
        if self.runner.tick_hz > 1000 {
            eyre::bail!("runner.tick_hz must be <= 1000");
        }
        if self.runner.max_ticks == 0 {
            eyre::bail!("runner.max_ticks must be >= 1");
        }

        // Sim
        let s = &self.sim;
        if !(s.initial.rotational.is_finite()
            && s.initial.lateral.is_finite()
            && s.initial.depth.is_finite())
        {
            eyre::bail!("sim.initial offsets must be finite");
        }
        if !finite_non_negative(s.rotation_rate)
            || !finite_non_negative(s.lateral_rate)
            || !finite_non_negative(s.depth_rate)
        {
            eyre::bail!("sim rates must be finite and >= 0");
        }
        if !finite_non_negative(s.noise) {
            eyre::bail!("sim.noise must be finite and >= 0");
        }
        if !probability(s.dropout) {
            eyre::bail!("sim.dropout must be in [0.0, 1.0]");
        }
        if !probability(s.sensor_fault) {
            eyre::bail!("sim.sensor_fault must be in [0.0, 1.0]");
        }

        // Logging
        if let Some(rot) = self.logging.rotation.as_deref()
            && !matches!(rot, "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of never|daily|hourly");
        }

        Ok(())
    }
}
