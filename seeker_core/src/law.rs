//! Single-axis correction law.
//!
//! At most one axis is corrected per tick, in this order:
//! 1. depth, once the heading is latched;
//! 2. rotation, with a looser tolerance once the heading is latched;
//! 3. lateral, once the heading is latched.

use seeker_traits::{Axis, Correction};

use crate::normalize::normalize_offsets;
use crate::state::TargetState;
use crate::tunables::Tunables;

/// Rotational tolerance multiplier after the heading latch.
pub const LATCHED_ROTATION_TOLERANCE_SCALE: f64 = 2.5;

/// Push `gain` further away from zero by `bias`.
#[inline]
fn add_signed_bias(gain: f64, bias: f64) -> f64 {
    if gain < 0.0 { gain - bias } else { gain + bias }
}

/// Pick the correction for this tick, if any.
///
/// Call only after the state reports a target; every tunable is read live.
pub fn decide(state: &TargetState, tunables: &Tunables) -> Option<Correction> {
    let shaped = normalize_offsets(state.filtered_offsets(), state.bounds(), tunables.kchange());
    let latched = state.has_initial_heading();
    let rotation_tolerance = if latched {
        tunables.error_tolerance() * LATCHED_ROTATION_TOLERANCE_SCALE
    } else {
        tunables.error_tolerance()
    };

    if latched
        && tunables.axis_enabled(Axis::Depth)
        && state.needs_correction_on_axis(Axis::Depth, tunables.error_tolerance())
    {
        // Unsigned bias: depth corrections lean forward.
        let gain = tunables.kp() * shaped[Axis::Depth.index()] * tunables.max_depth_speed()
            + tunables.ki();
        return Some(Correction::new(Axis::Depth, gain));
    }

    if tunables.axis_enabled(Axis::Rotational)
        && state.needs_correction_on_axis(Axis::Rotational, rotation_tolerance)
    {
        let gain =
            tunables.kp() * shaped[Axis::Rotational.index()] * tunables.max_lateral_speed();
        return Some(Correction::new(
            Axis::Rotational,
            add_signed_bias(gain, tunables.ki()),
        ));
    }

    if latched
        && tunables.axis_enabled(Axis::Lateral)
        && state.needs_correction_on_axis(Axis::Lateral, tunables.error_tolerance())
    {
        let gain = tunables.kp() * shaped[Axis::Lateral.index()] * tunables.max_depth_speed()
            + tunables.ki();
        return Some(Correction::new(
            Axis::Lateral,
            add_signed_bias(gain, tunables.ki()),
        ));
    }

    None
}
