//! Collaborator contracts for the targeting controller.
//!
//! The controller core never talks to a camera, a drivetrain, or a preferences
//! pane directly. Everything it consumes goes through the traits in this crate,
//! so the same core runs against real devices, replayed telemetry, or a
//! closed-loop simulation.

pub mod clock;

pub use clock::{Clock, ManualClock, MonotonicClock};

use std::error::Error;

/// Error type used at every collaborator boundary.
pub type CollabError = Box<dyn Error + Send + Sync>;

/// One of the three correction axes reported by the vision pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Horizontal angle to the target (camera `tx`); corrected by spinning in place.
    Rotational,
    /// Secondary offset along the height of the frame (camera `ty`).
    Lateral,
    /// Apparent target area (camera `ta`); corrected by driving forward or back.
    Depth,
}

impl Axis {
    /// All axes in sample-window order.
    pub const ALL: [Axis; 3] = [Axis::Rotational, Axis::Lateral, Axis::Depth];

    /// Position of this axis in offset arrays and enabled-axis masks.
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Axis::Rotational => 0,
            Axis::Lateral => 1,
            Axis::Depth => 2,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Axis::Rotational => "rotational",
            Axis::Lateral => "lateral",
            Axis::Depth => "depth",
        }
    }
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Latest frame reported by the vision source.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Telemetry {
    pub rotational: f64,
    pub lateral: f64,
    /// Target area as a fraction of the frame.
    pub depth: f64,
    pub has_target: bool,
}

impl Telemetry {
    pub fn new(rotational: f64, lateral: f64, depth: f64, has_target: bool) -> Self {
        Self {
            rotational,
            lateral,
            depth,
            has_target,
        }
    }

    /// Zero-valued frame without a target. This is also what a failed sensor
    /// read degrades to.
    pub fn no_target() -> Self {
        Self::default()
    }

    /// Offsets in `Axis::ALL` order.
    pub fn offsets(&self) -> [f64; 3] {
        [self.rotational, self.lateral, self.depth]
    }
}

/// A single-axis correction handed to the drivetrain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Correction {
    pub axis: Axis,
    /// Signed gain in drivetrain percent output.
    pub gain: f64,
}

impl Correction {
    pub fn new(axis: Axis, gain: f64) -> Self {
        Self { axis, gain }
    }

    /// Left/right percent outputs for a tank drivetrain.
    ///
    /// Rotational corrections spin in place, depth drives both sides backwards
    /// against the gain, lateral drives both sides with it.
    pub fn wheel_speeds(&self) -> [f64; 2] {
        let g = self.gain;
        match self.axis {
            Axis::Rotational => [-g, g],
            Axis::Depth => [-g, -g],
            Axis::Lateral => [g, g],
        }
    }
}

/// Camera pipeline: returns the most recent frame and drives the ring light.
pub trait VisionSource {
    fn read(&mut self) -> Result<Telemetry, CollabError>;
    fn set_illuminator(&mut self, on: bool) -> Result<(), CollabError>;
}

/// Drivetrain that accepts one correction per tick.
pub trait DriveActuator {
    fn apply_correction(&mut self, axis: Axis, gain: f64) -> Result<(), CollabError>;
}

/// Key/value source for live tunables. Implementations may change values at
/// any time; callers re-read on every access.
pub trait PreferenceProvider {
    fn get_double(&self, key: &str, default: f64) -> f64;
    fn get_bool(&self, key: &str, default: bool) -> bool;
}

impl<T: VisionSource + ?Sized> VisionSource for Box<T> {
    fn read(&mut self) -> Result<Telemetry, CollabError> {
        (**self).read()
    }

    fn set_illuminator(&mut self, on: bool) -> Result<(), CollabError> {
        (**self).set_illuminator(on)
    }
}

impl<T: DriveActuator + ?Sized> DriveActuator for Box<T> {
    fn apply_correction(&mut self, axis: Axis, gain: f64) -> Result<(), CollabError> {
        (**self).apply_correction(axis, gain)
    }
}

/// Provider that always answers with the caller's default.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoPreferences;

impl PreferenceProvider for NoPreferences {
    fn get_double(&self, _key: &str, default: f64) -> f64 {
        default
    }

    fn get_bool(&self, _key: &str, default: bool) -> bool {
        default
    }
}
