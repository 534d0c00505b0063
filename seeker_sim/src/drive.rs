//! Tank-drive adapter and an in-memory wheel sink.

use seeker_traits::{Axis, CollabError, Correction, DriveActuator};

use crate::error::{Result, SimError};

/// Left/right percent-output sink.
pub trait WheelOutput {
    fn set_wheels(&mut self, left: f64, right: f64) -> Result<()>;
}

/// Turns single-axis corrections into tank-drive wheel outputs.
#[derive(Debug, Clone)]
pub struct TankDrive<W> {
    wheels: W,
    max_output: f64,
}

impl<W: WheelOutput> TankDrive<W> {
    pub fn new(wheels: W) -> Self {
        Self {
            wheels,
            max_output: 1.0,
        }
    }

    /// Clamp both sides to `[-max, max]`.
    pub fn with_max_output(mut self, max: f64) -> Self {
        self.max_output = max.abs();
        self
    }

    pub fn wheels(&self) -> &W {
        &self.wheels
    }

    pub fn into_inner(self) -> W {
        self.wheels
    }
}

impl<W: WheelOutput> DriveActuator for TankDrive<W> {
    fn apply_correction(&mut self, axis: Axis, gain: f64) -> std::result::Result<(), CollabError> {
        if !gain.is_finite() {
            return Err(Box::new(SimError::DriveFault(format!(
                "non-finite {axis} gain"
            ))));
        }
        let [left, right] = Correction::new(axis, gain).wheel_speeds();
        let max = self.max_output;
        self.wheels
            .set_wheels(left.clamp(-max, max), right.clamp(-max, max))?;
        Ok(())
    }
}

/// Keeps every wheel command in memory.
#[derive(Debug, Default, Clone)]
pub struct RecordingWheels {
    pub history: Vec<[f64; 2]>,
}

impl RecordingWheels {
    pub fn last(&self) -> Option<[f64; 2]> {
        self.history.last().copied()
    }
}

impl WheelOutput for RecordingWheels {
    fn set_wheels(&mut self, left: f64, right: f64) -> Result<()> {
        self.history.push([left, right]);
        Ok(())
    }
}
