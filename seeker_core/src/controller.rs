//! Controller lifecycle: start, tick, stop.

use eyre::WrapErr;
use seeker_traits::{DriveActuator, Telemetry, VisionSource};

use crate::collab_error::{Boundary, map_collab_error};
use crate::config::TargetingCfg;
use crate::error::{Result, TargetingError};
use crate::law;
use crate::state::TargetState;
use crate::status::{Phase, Termination, TickReport, TickStatus};
use crate::tunables::Tunables;

/// Vision-guided targeting controller.
///
/// Driven externally: `start()`, then one `tick()` per control period until a
/// tick reports `TickStatus::Finished`, then `stop()`.
pub struct Controller<V: VisionSource, D: DriveActuator> {
    pub(crate) vision: V,
    pub(crate) drive: D,
    pub(crate) tunables: Tunables,
    pub(crate) targeting: TargetingCfg,
    pub(crate) state: Option<TargetState>,
    pub(crate) phase: Phase,
    pub(crate) sensor_faults: u64,
}

impl<V: VisionSource, D: DriveActuator> core::fmt::Debug for Controller<V, D> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Controller")
            .field("phase", &self.phase)
            .field("window_frames", &self.targeting.window_frames)
            .field("frames_seen", &self.frames_seen())
            .field("has_initial_heading", &self.has_initial_heading())
            .finish_non_exhaustive()
    }
}

impl<V: VisionSource, D: DriveActuator> Controller<V, D> {
    pub(crate) fn new(vision: V, drive: D, tunables: Tunables, targeting: TargetingCfg) -> Self {
        Self {
            vision,
            drive,
            tunables,
            targeting,
            state: None,
            phase: Phase::Disabled,
            sensor_faults: 0,
        }
    }

    /// Begin a session with fresh target state and the illuminator on.
    ///
    /// Starting an active controller discards its current session.
    pub fn start(&mut self) {
        if self.phase != Phase::Disabled {
            tracing::debug!(phase = ?self.phase, "restarting active session");
        }
        self.state = Some(TargetState::new(
            self.targeting.window_frames,
            self.targeting.bounds,
        ));
        self.phase = Phase::Active;
        self.sensor_faults = 0;
        self.set_illuminator(true);
        tracing::info!(
            window_frames = self.targeting.window_frames,
            tunables = ?self.tunables.snapshot(),
            "targeting started"
        );
    }

    /// Run one control period.
    ///
    /// A failed sensor read counts as a frame without a target. Drive failures
    /// propagate. Once terminal, further ticks ingest nothing and repeat the
    /// terminal status.
    pub fn tick(&mut self) -> Result<TickReport> {
        match self.phase {
            Phase::Disabled => {
                return Err(eyre::Report::new(TargetingError::State(
                    "tick called while disabled; call start() first".into(),
                )));
            }
            Phase::Terminal(t) => return self.terminal_report(t),
            Phase::Active => {}
        }

        let (telemetry, sensor_fault) = self.read_frame();

        let state = self.state.as_mut().ok_or_else(|| {
            eyre::Report::new(TargetingError::State("active without target state".into()))
        })?;
        state.put_values(telemetry.offsets(), telemetry.has_target);
        let filtered_offsets = state.filtered_offsets();
        let has_target = state.has_target();
        tracing::trace!(
            frame = state.frames_seen(),
            rotational = filtered_offsets[0],
            lateral = filtered_offsets[1],
            depth = filtered_offsets[2],
            has_target,
            "filtered offsets"
        );

        let correction = if has_target {
            law::decide(state, &self.tunables)
        } else {
            None
        };
        if let Some(c) = correction {
            tracing::debug!(axis = %c.axis, gain = c.gain, "applying correction");
            self.drive
                .apply_correction(c.axis, c.gain)
                .map_err(|e| eyre::Report::new(map_collab_error(Boundary::Drive, &*e)))
                .wrap_err("applying correction")?;
        }

        let finished = state.has_finished(
            self.tunables.error_tolerance(),
            self.tunables.enabled_axes(),
        );

        let status = if finished {
            TickStatus::Finished(Termination::Converged)
        } else if !has_target {
            TickStatus::Finished(Termination::TargetLost)
        } else {
            TickStatus::Running
        };

        let report = TickReport {
            frame: state.frames_seen(),
            telemetry,
            sensor_fault,
            filtered_offsets,
            has_target,
            has_initial_heading: state.has_initial_heading(),
            correction,
            status,
        };

        if let TickStatus::Finished(t) = status {
            self.phase = Phase::Terminal(t);
            tracing::info!(
                reason = t.as_str(),
                frames = report.frame,
                "targeting finished"
            );
        }
        Ok(report)
    }

    fn read_frame(&mut self) -> (Telemetry, bool) {
        match self.vision.read() {
            Ok(t) if t.offsets().iter().all(|v| v.is_finite()) => (t, false),
            Ok(t) => {
                tracing::warn!(?t, "non-finite telemetry; treating as no target");
                (Telemetry::no_target(), false)
            }
            Err(e) => {
                let mapped = map_collab_error(Boundary::Vision, &*e);
                self.sensor_faults += 1;
                tracing::warn!(error = %mapped, "sensor read failed; treating as no target");
                (Telemetry::no_target(), true)
            }
        }
    }

    fn terminal_report(&self, t: Termination) -> Result<TickReport> {
        let state = self.state.as_ref().ok_or_else(|| {
            eyre::Report::new(TargetingError::State("terminal without target state".into()))
        })?;
        Ok(TickReport {
            frame: state.frames_seen(),
            telemetry: Telemetry::no_target(),
            sensor_fault: false,
            filtered_offsets: state.filtered_offsets(),
            has_target: state.has_target(),
            has_initial_heading: state.has_initial_heading(),
            correction: None,
            status: TickStatus::Finished(t),
        })
    }

    /// True once the session reached a terminal phase, whether by converging
    /// or by losing the target. See `termination()` to tell them apart.
    pub fn is_converged(&self) -> bool {
        matches!(self.phase, Phase::Terminal(_))
    }

    pub fn termination(&self) -> Option<Termination> {
        match self.phase {
            Phase::Terminal(t) => Some(t),
            _ => None,
        }
    }

    /// End the session: discard target state, turn the illuminator off.
    pub fn stop(&mut self, interrupted: bool) {
        let frames = self.frames_seen();
        self.state = None;
        self.phase = Phase::Disabled;
        self.set_illuminator(false);
        tracing::info!(interrupted, frames, "targeting stopped");
    }

    fn set_illuminator(&mut self, on: bool) {
        if let Err(e) = self.vision.set_illuminator(on) {
            let mapped = map_collab_error(Boundary::Illuminator, &*e);
            tracing::warn!(error = %mapped, on, "illuminator switch failed");
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Medians of the current session, if any frame was ingested.
    pub fn filtered_offsets(&self) -> Option<[f64; 3]> {
        self.state
            .as_ref()
            .filter(|s| s.window_len() > 0)
            .map(TargetState::filtered_offsets)
    }

    pub fn has_initial_heading(&self) -> bool {
        self.state
            .as_ref()
            .is_some_and(TargetState::has_initial_heading)
    }

    /// Frames ingested in the current session; 0 when disabled.
    pub fn frames_seen(&self) -> u64 {
        self.state.as_ref().map_or(0, TargetState::frames_seen)
    }

    /// Sensor reads that failed in the current session.
    pub fn sensor_faults(&self) -> u64 {
        self.sensor_faults
    }

    pub fn tunables(&self) -> &Tunables {
        &self.tunables
    }

    pub fn targeting_cfg(&self) -> &TargetingCfg {
        &self.targeting
    }

    pub fn vision(&self) -> &V {
        &self.vision
    }

    pub fn drive(&self) -> &D {
        &self.drive
    }

    pub fn into_parts(self) -> (V, D) {
        (self.vision, self.drive)
    }
}
