//! Ring-light model with the camera's LED modes.

use seeker_config::IlluminatorMode;

/// What the LEDs are physically doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedState {
    Off,
    On,
    Blink,
    /// Left to the camera pipeline setting.
    Pipeline,
}

/// Tracks on/off requests and maps "on" to the configured mode.
#[derive(Debug, Clone)]
pub struct Illuminator {
    mode: IlluminatorMode,
    state: LedState,
    switches: u32,
}

impl Illuminator {
    pub fn new(mode: IlluminatorMode) -> Self {
        Self {
            mode,
            state: LedState::Off,
            switches: 0,
        }
    }

    pub fn set(&mut self, on: bool) -> LedState {
        let next = if on {
            match self.mode {
                IlluminatorMode::Default => LedState::Pipeline,
                IlluminatorMode::Blink => LedState::Blink,
                IlluminatorMode::On => LedState::On,
                IlluminatorMode::Off => LedState::Off,
            }
        } else {
            LedState::Off
        };
        if next != self.state {
            tracing::debug!(from = ?self.state, to = ?next, "illuminator");
        }
        self.state = next;
        self.switches += 1;
        next
    }

    pub fn state(&self) -> LedState {
        self.state
    }

    /// Number of on/off requests received.
    pub fn switches(&self) -> u32 {
        self.switches
    }
}

impl Default for Illuminator {
    fn default() -> Self {
        Self::new(IlluminatorMode::Default)
    }
}
