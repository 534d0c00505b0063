//! Closed-loop kinematic plant.
//!
//! A `SimPlant` owns the true offsets of a simulated target. Its vision half
//! reports them with noise and dropouts; its drive half moves them according to
//! each correction. Both halves share one state, so a controller built from
//! them closes the loop.

use std::cell::RefCell;
use std::rc::Rc;

use seeker_config::{BoundsCfg, IlluminatorMode, SimCfg};
use seeker_traits::{Axis, CollabError, DriveActuator, Telemetry, VisionSource};

use crate::error::SimError;
use crate::illuminator::Illuminator;

/// xorshift32; deterministic per seed.
#[derive(Debug, Clone)]
struct XorShift32(u32);

impl XorShift32 {
    fn new(seed: u32) -> Self {
        Self(seed.max(1))
    }

    /// Uniform in `[0, 1)`.
    fn next_unit(&mut self) -> f64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.0 = x;
        f64::from(x) / (f64::from(u32::MAX) + 1.0)
    }

    /// Uniform in `[-amp, amp)`.
    fn symmetric(&mut self, amp: f64) -> f64 {
        (self.next_unit() * 2.0 - 1.0) * amp
    }
}

#[derive(Debug)]
struct PlantState {
    offsets: [f64; 3],
    /// Per-axis noise amplitude.
    noise: [f64; 3],
    cfg: SimCfg,
    rng: XorShift32,
    reads: u64,
    corrections: u64,
    illuminator: Illuminator,
}

/// Shared handle to a simulated target.
#[derive(Debug, Clone)]
pub struct SimPlant {
    state: Rc<RefCell<PlantState>>,
}

impl SimPlant {
    /// Noise amplitudes are `cfg.noise` times each bound.
    pub fn new(cfg: &SimCfg, bounds: &BoundsCfg, mode: IlluminatorMode) -> Self {
        let offsets = [cfg.initial.rotational, cfg.initial.lateral, cfg.initial.depth];
        let noise = [
            cfg.noise * bounds.rotational,
            cfg.noise * bounds.lateral,
            cfg.noise * bounds.depth,
        ];
        Self {
            state: Rc::new(RefCell::new(PlantState {
                offsets,
                noise,
                cfg: cfg.clone(),
                rng: XorShift32::new(cfg.seed),
                reads: 0,
                corrections: 0,
                illuminator: Illuminator::new(mode),
            })),
        }
    }

    pub fn vision(&self) -> PlantVision {
        PlantVision {
            state: Rc::clone(&self.state),
        }
    }

    pub fn drive(&self) -> PlantDrive {
        PlantDrive {
            state: Rc::clone(&self.state),
        }
    }

    /// True offsets, without noise.
    pub fn offsets(&self) -> [f64; 3] {
        self.state.borrow().offsets
    }

    pub fn reads(&self) -> u64 {
        self.state.borrow().reads
    }

    pub fn corrections(&self) -> u64 {
        self.state.borrow().corrections
    }

    pub fn illuminator(&self) -> Illuminator {
        self.state.borrow().illuminator.clone()
    }
}

/// Vision half of a `SimPlant`.
#[derive(Debug)]
pub struct PlantVision {
    state: Rc<RefCell<PlantState>>,
}

impl VisionSource for PlantVision {
    fn read(&mut self) -> Result<Telemetry, CollabError> {
        let mut guard = self.state.borrow_mut();
        let s = &mut *guard;
        s.reads += 1;
        if s.rng.next_unit() < s.cfg.sensor_fault {
            let frame = s.reads;
            return Err(Box::new(SimError::SensorFault(format!(
                "pipeline returned no frame ({frame})"
            ))));
        }
        if s.rng.next_unit() < s.cfg.dropout {
            return Ok(Telemetry::no_target());
        }
        let [r, l, d] = s.offsets;
        let r = r + s.rng.symmetric(s.noise[0]);
        let l = l + s.rng.symmetric(s.noise[1]);
        let d = (d + s.rng.symmetric(s.noise[2])).max(0.0);
        Ok(Telemetry::new(r, l, d, true))
    }

    fn set_illuminator(&mut self, on: bool) -> Result<(), CollabError> {
        self.state.borrow_mut().illuminator.set(on);
        Ok(())
    }
}

/// Drive half of a `SimPlant`.
#[derive(Debug)]
pub struct PlantDrive {
    state: Rc<RefCell<PlantState>>,
}

impl DriveActuator for PlantDrive {
    fn apply_correction(&mut self, axis: Axis, gain: f64) -> Result<(), CollabError> {
        if !gain.is_finite() {
            return Err(Box::new(SimError::DriveFault(format!(
                "non-finite {axis} gain"
            ))));
        }
        let mut guard = self.state.borrow_mut();
        let s = &mut *guard;
        s.corrections += 1;
        match axis {
            Axis::Rotational => s.offsets[0] -= gain * s.cfg.rotation_rate,
            Axis::Lateral => s.offsets[1] -= gain * s.cfg.lateral_rate,
            // Positive gain drives toward the target, growing its area.
            Axis::Depth => s.offsets[2] = (s.offsets[2] + gain * s.cfg.depth_rate).max(0.0),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xorshift_is_deterministic_and_in_range() {
        let mut a = XorShift32::new(7);
        let mut b = XorShift32::new(7);
        for _ in 0..1000 {
            let x = a.next_unit();
            assert_eq!(x, b.next_unit());
            assert!((0.0..1.0).contains(&x));
        }
    }

    #[test]
    fn zero_seed_is_not_stuck() {
        let mut r = XorShift32::new(0);
        let first = r.next_unit();
        assert_ne!(first, r.next_unit());
    }
}
