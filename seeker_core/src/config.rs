//! Configuration types for the targeting controller.
//!
//! These are the runtime structs used by `Controller`. They are separate from
//! the TOML-deserialized config in `seeker_config`; see `conversions`.

use seeker_traits::Axis;

/// Maximum expected magnitude of each raw offset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    /// Degrees from frame center to frame edge, horizontally.
    pub rotational: f64,
    /// Degrees from frame center to frame edge, vertically.
    pub lateral: f64,
    /// Target area ratio at the desired stand-off distance.
    pub depth: f64,
}

impl Bounds {
    #[inline]
    pub fn get(&self, axis: Axis) -> f64 {
        match axis {
            Axis::Rotational => self.rotational,
            Axis::Lateral => self.lateral,
            Axis::Depth => self.depth,
        }
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self {
            rotational: 27.0,
            lateral: 20.5,
            depth: 0.7,
        }
    }
}

/// Which axes the controller may correct.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisMask {
    pub rotational: bool,
    pub lateral: bool,
    pub depth: bool,
}

impl AxisMask {
    pub const ALL: AxisMask = AxisMask {
        rotational: true,
        lateral: true,
        depth: true,
    };

    #[inline]
    pub fn get(&self, axis: Axis) -> bool {
        match axis {
            Axis::Rotational => self.rotational,
            Axis::Lateral => self.lateral,
            Axis::Depth => self.depth,
        }
    }

    pub fn with(mut self, axis: Axis, enabled: bool) -> Self {
        match axis {
            Axis::Rotational => self.rotational = enabled,
            Axis::Lateral => self.lateral = enabled,
            Axis::Depth => self.depth = enabled,
        }
        self
    }
}

impl Default for AxisMask {
    fn default() -> Self {
        Self::ALL
    }
}

/// Parameters fixed for the lifetime of a controller.
#[derive(Debug, Clone)]
pub struct TargetingCfg {
    /// Sample window capacity in frames. Also scales the debounce and
    /// convergence streak thresholds.
    pub window_frames: usize,
    pub bounds: Bounds,
}

impl Default for TargetingCfg {
    fn default() -> Self {
        Self {
            window_frames: 20,
            bounds: Bounds::default(),
        }
    }
}

/// Fallback values for the live tunables.
#[derive(Debug, Clone, PartialEq)]
pub struct TunableDefaults {
    /// Proportional gain.
    pub kp: f64,
    /// Constant bias added to every correction.
    pub ki: f64,
    /// Response curve exponent applied to normalized offsets.
    pub kchange: f64,
    /// Fraction of a bound an offset may deviate before it needs correction.
    pub error_tolerance: f64,
    /// Output cap for rotational corrections.
    pub max_lateral_speed: f64,
    /// Output cap for depth and lateral corrections.
    pub max_depth_speed: f64,
    pub enabled_axes: AxisMask,
}

impl Default for TunableDefaults {
    fn default() -> Self {
        Self {
            kp: 1.0,
            ki: 0.01,
            kchange: 0.4,
            error_tolerance: 0.25,
            max_lateral_speed: 0.5,
            max_depth_speed: 0.3,
            enabled_axes: AxisMask::ALL,
        }
    }
}

/// Everything needed to construct a controller besides its collaborators.
#[derive(Debug, Clone)]
pub struct ControllerSettings {
    pub targeting: TargetingCfg,
    pub tunables: TunableDefaults,
    /// Namespace for preference keys (`<group>::kP`).
    pub preference_group: String,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            targeting: TargetingCfg::default(),
            tunables: TunableDefaults::default(),
            preference_group: "vision".to_string(),
        }
    }
}
