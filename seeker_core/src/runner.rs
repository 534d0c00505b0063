//! Fixed-rate driver: starts the controller, ticks it once per period, stops it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use seeker_traits::{Clock, DriveActuator, VisionSource};

use crate::controller::Controller;
use crate::error::Result;
use crate::status::{Termination, TickReport, TickStatus};

const MICROS_PER_SEC: u64 = 1_000_000;

/// Tick period in microseconds; `hz` is clamped to at least 1.
#[inline]
pub fn period_us(hz: u32) -> u64 {
    (MICROS_PER_SEC / u64::from(hz.max(1))).max(1)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunParams {
    pub tick_hz: u32,
    /// Give up after this many ticks without a terminal status.
    pub max_ticks: u64,
}

impl Default for RunParams {
    fn default() -> Self {
        Self {
            tick_hz: 50,
            max_ticks: 500,
        }
    }
}

impl From<&seeker_config::RunnerCfg> for RunParams {
    fn from(c: &seeker_config::RunnerCfg) -> Self {
        Self {
            tick_hz: c.tick_hz,
            max_ticks: c.max_ticks,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Converged,
    TargetLost,
    TickBudgetExhausted,
    Interrupted,
}

impl RunOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            RunOutcome::Converged => "converged",
            RunOutcome::TargetLost => "target_lost",
            RunOutcome::TickBudgetExhausted => "tick_budget_exhausted",
            RunOutcome::Interrupted => "interrupted",
        }
    }
}

impl From<Termination> for RunOutcome {
    fn from(t: Termination) -> Self {
        match t {
            Termination::Converged => RunOutcome::Converged,
            Termination::TargetLost => RunOutcome::TargetLost,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub outcome: RunOutcome,
    pub ticks: u64,
    pub corrections: u64,
    pub sensor_faults: u64,
    pub elapsed_ms: u64,
    pub has_initial_heading: bool,
}

/// Drive `controller` until it reaches a terminal status, `max_ticks` runs out,
/// or `shutdown` is raised. `stop` is always called before returning, also on
/// error. `on_tick` sees every report; returning an error aborts the run.
pub fn run<V, D, C, F>(
    controller: &mut Controller<V, D>,
    clock: &C,
    params: RunParams,
    shutdown: Option<&AtomicBool>,
    mut on_tick: F,
) -> Result<RunSummary>
where
    V: VisionSource,
    D: DriveActuator,
    C: Clock + ?Sized,
    F: FnMut(&TickReport) -> Result<()>,
{
    let period = Duration::from_micros(period_us(params.tick_hz));
    let epoch = clock.now();
    let mut deadline = epoch;
    let mut ticks = 0_u64;
    let mut corrections = 0_u64;
    let mut has_initial_heading = false;

    controller.start();
    tracing::info!(
        tick_hz = params.tick_hz,
        max_ticks = params.max_ticks,
        "run start"
    );

    let outcome = loop {
        if shutdown.is_some_and(|s| s.load(Ordering::Relaxed)) {
            break RunOutcome::Interrupted;
        }
        if ticks >= params.max_ticks {
            break RunOutcome::TickBudgetExhausted;
        }

        let report = match controller.tick() {
            Ok(r) => r,
            Err(e) => {
                tracing::error!(error = %e, ticks, "tick failed");
                controller.stop(true);
                return Err(e);
            }
        };
        ticks += 1;
        if report.correction.is_some() {
            corrections += 1;
        }
        has_initial_heading |= report.has_initial_heading;

        if let Err(e) = on_tick(&report) {
            controller.stop(true);
            return Err(e);
        }
        if let TickStatus::Finished(t) = report.status {
            break RunOutcome::from(t);
        }

        deadline += period;
        clock.sleep_until(deadline);
    };

    let sensor_faults = controller.sensor_faults();
    controller.stop(!matches!(
        outcome,
        RunOutcome::Converged | RunOutcome::TargetLost
    ));

    let summary = RunSummary {
        outcome,
        ticks,
        corrections,
        sensor_faults,
        elapsed_ms: clock.ms_since(epoch),
        has_initial_heading,
    };
    tracing::info!(
        outcome = outcome.as_str(),
        ticks,
        corrections,
        sensor_faults,
        "run complete"
    );
    Ok(summary)
}
