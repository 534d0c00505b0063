//! Raw offset → signed, shaped percentage.
//!
//! Rotational and lateral offsets are divided by their bound and keep the sign
//! of the raw reading. Depth is measured as the distance from the desired area
//! (`bound - raw`), so a target that looks too small yields a positive value.
//! The magnitude is raised to `exponent` before the sign is reattached.

use seeker_traits::Axis;

use crate::config::Bounds;

/// Normalize one raw offset.
pub fn normalize_offset(raw: f64, axis: Axis, bounds: &Bounds, exponent: f64) -> f64 {
    let (pct, sign_source) = match axis {
        Axis::Rotational | Axis::Lateral => (raw.abs() / bounds.get(axis), raw),
        Axis::Depth => {
            let d = bounds.depth - raw;
            (d, d)
        }
    };
    let shaped = pct.abs().powf(exponent);
    if sign_source < 0.0 { -shaped } else { shaped }
}

/// Normalize a full `[rotational, lateral, depth]` triple.
pub fn normalize_offsets(raw: [f64; 3], bounds: &Bounds, exponent: f64) -> [f64; 3] {
    let mut out = [0.0; 3];
    for axis in Axis::ALL {
        out[axis.index()] = normalize_offset(raw[axis.index()], axis, bounds, exponent);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const EPS: f64 = 1e-9;

    #[rstest]
    #[case(Axis::Rotational, 13.5, 0.5_f64.powf(0.4))]
    #[case(Axis::Rotational, -13.5, -(0.5_f64.powf(0.4)))]
    #[case(Axis::Lateral, -10.25, -(0.5_f64.powf(0.4)))]
    #[case(Axis::Lateral, 20.5, 1.0)]
    #[case(Axis::Depth, 0.7, 0.0)]
    #[case(Axis::Depth, 0.6, 0.1_f64.powf(0.4))]
    #[case(Axis::Depth, 0.8, -(0.1_f64.powf(0.4)))]
    fn shapes_offsets(#[case] axis: Axis, #[case] raw: f64, #[case] expected: f64) {
        let got = normalize_offset(raw, axis, &Bounds::default(), 0.4);
        assert!((got - expected).abs() < EPS, "{axis}: got {got}, want {expected}");
    }

    #[test]
    fn exponent_one_is_linear() {
        let got = normalize_offsets([-27.0, 10.25, 0.35], &Bounds::default(), 1.0);
        assert!((got[0] + 1.0).abs() < EPS);
        assert!((got[1] - 0.5).abs() < EPS);
        assert!((got[2] - 0.35).abs() < EPS);
    }
}
