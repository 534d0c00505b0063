//! Vision source that plays back recorded telemetry.

use seeker_config::{IlluminatorMode, TelemetryRow};
use seeker_traits::{CollabError, Telemetry, VisionSource};

use crate::illuminator::Illuminator;

/// Returns recorded frames in order; once they run out every read reports no
/// target, which lets the controller's debounce end the session.
#[derive(Debug, Clone)]
pub struct ReplayVision {
    frames: Vec<Telemetry>,
    cursor: usize,
    illuminator: Illuminator,
}

impl ReplayVision {
    pub fn new(frames: Vec<Telemetry>, mode: IlluminatorMode) -> Self {
        Self {
            frames,
            cursor: 0,
            illuminator: Illuminator::new(mode),
        }
    }

    pub fn from_rows(rows: Vec<TelemetryRow>, mode: IlluminatorMode) -> Self {
        Self::new(rows.into_iter().map(Telemetry::from).collect(), mode)
    }

    pub fn remaining(&self) -> usize {
        self.frames.len().saturating_sub(self.cursor)
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }

    pub fn illuminator(&self) -> &Illuminator {
        &self.illuminator
    }
}

impl VisionSource for ReplayVision {
    fn read(&mut self) -> Result<Telemetry, CollabError> {
        match self.frames.get(self.cursor) {
            Some(t) => {
                self.cursor += 1;
                if self.cursor == self.frames.len() {
                    tracing::debug!(frames = self.frames.len(), "replay exhausted");
                }
                Ok(*t)
            }
            None => Ok(Telemetry::no_target()),
        }
    }

    fn set_illuminator(&mut self, on: bool) -> Result<(), CollabError> {
        self.illuminator.set(on);
        Ok(())
    }
}
