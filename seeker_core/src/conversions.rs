//! `From` implementations bridging `seeker_config` types to runtime types.

use crate::config::{AxisMask, Bounds, ControllerSettings, TargetingCfg, TunableDefaults};

impl From<&seeker_config::BoundsCfg> for Bounds {
    fn from(c: &seeker_config::BoundsCfg) -> Self {
        Self {
            rotational: c.rotational,
            lateral: c.lateral,
            depth: c.depth,
        }
    }
}

impl From<&seeker_config::TargetingCfg> for TargetingCfg {
    fn from(c: &seeker_config::TargetingCfg) -> Self {
        Self {
            window_frames: c.window_frames,
            bounds: Bounds::from(&c.bounds),
        }
    }
}

impl From<&seeker_config::AxisMaskCfg> for AxisMask {
    fn from(c: &seeker_config::AxisMaskCfg) -> Self {
        Self {
            rotational: c.rotational,
            lateral: c.lateral,
            depth: c.depth,
        }
    }
}

impl From<&seeker_config::TunablesCfg> for TunableDefaults {
    fn from(c: &seeker_config::TunablesCfg) -> Self {
        Self {
            kp: c.kp,
            ki: c.ki,
            kchange: c.kchange,
            error_tolerance: c.error_tolerance,
            max_lateral_speed: c.max_lateral_speed,
            max_depth_speed: c.max_depth_speed,
            enabled_axes: AxisMask::from(&c.enabled_axes),
        }
    }
}

impl From<&seeker_config::Config> for ControllerSettings {
    fn from(c: &seeker_config::Config) -> Self {
        Self {
            targeting: TargetingCfg::from(&c.targeting),
            tunables: TunableDefaults::from(&c.tunables),
            preference_group: c.preferences.group.clone(),
        }
    }
}
