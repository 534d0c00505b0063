//! Controller phase and per-tick results.

use seeker_traits::{Correction, Telemetry};

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// No enabled axis needed correction for a sustained streak.
    Converged,
    /// Most of the recent frames had no target.
    TargetLost,
}

impl Termination {
    pub fn as_str(self) -> &'static str {
        match self {
            Termination::Converged => "converged",
            Termination::TargetLost => "target_lost",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Illuminator off, no target state.
    Disabled,
    /// Accumulating samples and correcting.
    Active,
    /// Done; waiting for `stop`.
    Terminal(Termination),
}

/// Outcome of a single tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickStatus {
    Running,
    Finished(Termination),
}

/// Everything observable about one tick.
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    /// Lifetime frame count after this tick.
    pub frame: u64,
    /// Frame as ingested (after sensor failures were folded into "no target").
    pub telemetry: Telemetry,
    /// The sensor read failed this tick.
    pub sensor_fault: bool,
    pub filtered_offsets: [f64; 3],
    pub has_target: bool,
    pub has_initial_heading: bool,
    pub correction: Option<Correction>,
    pub status: TickStatus,
}

impl TickReport {
    pub fn is_terminal(&self) -> bool {
        matches!(self.status, TickStatus::Finished(_))
    }
}
