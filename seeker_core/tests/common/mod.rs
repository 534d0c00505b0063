//! Test doubles shared by the integration tests.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::error::Error;

use seeker_traits::{Axis, DriveActuator, Telemetry, VisionSource};

type BoxErr = Box<dyn Error + Send + Sync>;

/// Plays a script of frames, then repeats `fallback` forever.
#[derive(Debug, Default)]
pub struct ScriptedVision {
    pub script: VecDeque<Result<Telemetry, String>>,
    pub fallback: Telemetry,
    pub illuminator: Vec<bool>,
    pub fail_illuminator: bool,
}

impl ScriptedVision {
    pub fn constant(frame: Telemetry) -> Self {
        Self {
            fallback: frame,
            ..Self::default()
        }
    }

    pub fn with_script(mut self, script: Vec<Result<Telemetry, String>>) -> Self {
        self.script = script.into();
        self
    }
}

impl VisionSource for ScriptedVision {
    fn read(&mut self) -> Result<Telemetry, BoxErr> {
        match self.script.pop_front() {
            Some(Ok(t)) => Ok(t),
            Some(Err(msg)) => Err(msg.into()),
            None => Ok(self.fallback),
        }
    }

    fn set_illuminator(&mut self, on: bool) -> Result<(), BoxErr> {
        self.illuminator.push(on);
        if self.fail_illuminator {
            return Err("ring light not responding".into());
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct RecordingDrive {
    pub calls: Vec<(Axis, f64)>,
    pub fail: bool,
}

impl DriveActuator for RecordingDrive {
    fn apply_correction(&mut self, axis: Axis, gain: f64) -> Result<(), BoxErr> {
        if self.fail {
            return Err("motor controller brownout".into());
        }
        self.calls.push((axis, gain));
        Ok(())
    }
}

/// Dead-center frame for the default bounds.
pub fn centered() -> Telemetry {
    Telemetry::new(0.0, 0.0, 0.7, true)
}
