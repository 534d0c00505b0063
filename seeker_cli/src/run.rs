//! Command execution: collaborator assembly, the fixed-rate run, and JSONL output.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::{SystemTime, UNIX_EPOCH};

use eyre::WrapErr;
use seeker_config::{Config, FilePreferences, load_telemetry_csv};
use seeker_core::runner::run;
use seeker_core::{
    ControllerSettings, RunOutcome, RunParams, RunSummary, SharedPreferences, TickReport,
    TickStatus, build_controller,
};
use seeker_sim::{RecordingWheels, ReplayVision, SimPlant, TankDrive};
use seeker_traits::{DriveActuator, MonotonicClock, VisionSource};
use serde_json::{Value, json};

use crate::cli::json_mode;

/// A run that stopped for any reason other than convergence.
#[derive(Debug, thiserror::Error)]
#[error("run ended without converging: {}", .0.as_str())]
pub struct Unfinished(pub RunOutcome);

fn run_params(cfg: &Config, max_ticks: Option<u64>) -> RunParams {
    let mut params = RunParams::from(&cfg.runner);
    if let Some(n) = max_ticks {
        params.max_ticks = n;
    }
    params
}

fn open_preferences(cfg: &Config) -> eyre::Result<Option<Arc<FilePreferences>>> {
    cfg.preferences
        .file
        .as_ref()
        .map(|path| {
            FilePreferences::open(path.clone())
                .map(Arc::new)
                .wrap_err_with(|| format!("opening preferences {}", path.display()))
        })
        .transpose()
}

fn shared(prefs: Option<&Arc<FilePreferences>>) -> Option<SharedPreferences> {
    prefs.map(|p| -> SharedPreferences { p.clone() })
}

fn unix_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| i64::try_from(d.as_millis()).unwrap_or(i64::MAX))
}

fn status_str(status: TickStatus) -> &'static str {
    match status {
        TickStatus::Running => "running",
        TickStatus::Finished(t) => t.as_str(),
    }
}

/// One JSON line per control period.
pub fn tick_json(r: &TickReport) -> Value {
    let [raw_rot, raw_lat, raw_depth] = r.telemetry.offsets();
    let [rot, lat, depth] = r.filtered_offsets;
    let correction = r
        .correction
        .map_or(Value::Null, |c| json!({ "axis": c.axis.name(), "gain": c.gain }));
    json!({
        "type": "tick",
        "frame": r.frame,
        "raw": {
            "rotational": raw_rot,
            "lateral": raw_lat,
            "depth": raw_depth,
            "has_target": r.telemetry.has_target,
        },
        "sensor_fault": r.sensor_fault,
        "filtered": { "rotational": rot, "lateral": lat, "depth": depth },
        "has_target": r.has_target,
        "has_initial_heading": r.has_initial_heading,
        "correction": correction,
        "status": status_str(r.status),
    })
}

/// Final JSON line of a run. `abort_reason` is null only on convergence.
pub fn summary_json(command: &str, s: &RunSummary) -> Value {
    let abort_reason = match s.outcome {
        RunOutcome::Converged => Value::Null,
        other => Value::from(other.as_str()),
    };
    json!({
        "type": "summary",
        "timestamp": unix_ms(),
        "command": command,
        "outcome": s.outcome.as_str(),
        "ticks": s.ticks,
        "corrections": s.corrections,
        "sensor_faults": s.sensor_faults,
        "elapsed_ms": s.elapsed_ms,
        "has_initial_heading": s.has_initial_heading,
        "abort_reason": abort_reason,
    })
}

fn execute<V, D>(
    cfg: &Config,
    vision: V,
    drive: D,
    params: RunParams,
    shutdown: &AtomicBool,
    command: &'static str,
) -> eyre::Result<RunSummary>
where
    V: VisionSource,
    D: DriveActuator,
{
    let prefs = open_preferences(cfg)?;
    let mut controller = build_controller(
        vision,
        drive,
        ControllerSettings::from(cfg),
        shared(prefs.as_ref()),
    )
    .wrap_err("building controller")?;

    let json = json_mode();
    let clock = MonotonicClock::new();
    let summary = run(&mut controller, &clock, params, Some(shutdown), |report| {
        if let Some(p) = &prefs {
            match p.refresh_if_changed() {
                Ok(true) => tracing::info!(path = %p.path().display(), "preferences reloaded"),
                Ok(false) => {}
                Err(e) => {
                    tracing::warn!(error = %e, "preferences reload failed; keeping previous values");
                }
            }
        }
        if json {
            println!("{}", tick_json(report));
        }
        Ok(())
    })?;

    if json {
        println!("{}", summary_json(command, &summary));
    } else {
        println!(
            "{command}: {} after {} ticks ({} corrections, {} sensor faults, {} ms)",
            summary.outcome.as_str(),
            summary.ticks,
            summary.corrections,
            summary.sensor_faults,
            summary.elapsed_ms
        );
    }

    match summary.outcome {
        RunOutcome::Converged => Ok(summary),
        other => Err(eyre::Report::new(Unfinished(other))),
    }
}

pub fn run_replay(
    cfg: &Config,
    telemetry: &Path,
    max_ticks: Option<u64>,
    shutdown: &AtomicBool,
) -> eyre::Result<RunSummary> {
    let rows = load_telemetry_csv(telemetry)
        .wrap_err_with(|| format!("loading telemetry {}", telemetry.display()))?;
    tracing::info!(frames = rows.len(), path = %telemetry.display(), "telemetry loaded");
    let vision = ReplayVision::from_rows(rows, cfg.illuminator.mode);
    let drive = TankDrive::new(RecordingWheels::default());
    execute(
        cfg,
        vision,
        drive,
        run_params(cfg, max_ticks),
        shutdown,
        "replay",
    )
}

pub fn run_sim(
    cfg: &Config,
    max_ticks: Option<u64>,
    seed: Option<u32>,
    shutdown: &AtomicBool,
) -> eyre::Result<RunSummary> {
    let mut sim = cfg.sim.clone();
    if let Some(s) = seed {
        sim.seed = s;
    }
    let plant = SimPlant::new(&sim, &cfg.targeting.bounds, cfg.illuminator.mode);
    let result = execute(
        cfg,
        plant.vision(),
        plant.drive(),
        run_params(cfg, max_ticks),
        shutdown,
        "sim",
    );
    let [rotational, lateral, depth] = plant.offsets();
    tracing::info!(
        rotational,
        lateral,
        depth,
        reads = plant.reads(),
        corrections = plant.corrections(),
        "final plant offsets"
    );
    result
}

/// Open the configured preferences and tick a simulated controller once.
pub fn self_check(cfg: &Config) -> eyre::Result<()> {
    let prefs = open_preferences(cfg)?;
    let plant = SimPlant::new(&cfg.sim, &cfg.targeting.bounds, cfg.illuminator.mode);
    let mut controller = build_controller(
        plant.vision(),
        plant.drive(),
        ControllerSettings::from(cfg),
        shared(prefs.as_ref()),
    )
    .wrap_err("building controller")?;

    controller.start();
    let tick = controller.tick();
    controller.stop(false);
    let report = tick.wrap_err("self-check tick")?;
    tracing::info!(
        frame = report.frame,
        has_target = report.has_target,
        tunables = ?controller.tunables().snapshot(),
        "self-check tick ok"
    );

    if json_mode() {
        println!(
            "{}",
            json!({
                "type": "self_check",
                "status": "ok",
                "window_frames": cfg.targeting.window_frames,
                "tick_hz": cfg.runner.tick_hz,
                "preferences": cfg.preferences.file.as_ref().map(|p| p.display().to_string()),
            })
        );
    } else {
        println!("ok");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use seeker_core::Termination;
    use seeker_traits::{Axis, Correction, Telemetry};

    fn report(status: TickStatus, correction: Option<Correction>) -> TickReport {
        TickReport {
            frame: 4,
            telemetry: Telemetry::new(2.0, -1.0, 0.5, true),
            sensor_fault: false,
            filtered_offsets: [0.3, -0.1, 0.2],
            has_target: true,
            has_initial_heading: false,
            correction,
            status,
        }
    }

    #[test]
    fn tick_json_nulls_missing_correction() {
        let v = tick_json(&report(TickStatus::Running, None));
        assert_eq!(v["type"], "tick");
        assert_eq!(v["frame"], 4);
        assert!(v["correction"].is_null());
        assert_eq!(v["status"], "running");
        assert_eq!(v["raw"]["lateral"], -1.0);
    }

    #[test]
    fn tick_json_names_axis_and_terminal_status() {
        let c = Correction::new(Axis::Rotational, 0.25);
        let v = tick_json(&report(
            TickStatus::Finished(Termination::Converged),
            Some(c),
        ));
        assert_eq!(v["correction"]["axis"], Axis::Rotational.name());
        assert_eq!(v["correction"]["gain"], 0.25);
        assert_eq!(v["status"], Termination::Converged.as_str());
    }

    #[test]
    fn summary_abort_reason_is_null_only_on_convergence() {
        let mut s = RunSummary {
            outcome: RunOutcome::Converged,
            ticks: 16,
            corrections: 0,
            sensor_faults: 0,
            elapsed_ms: 300,
            has_initial_heading: true,
        };
        assert!(summary_json("sim", &s)["abort_reason"].is_null());
        s.outcome = RunOutcome::TargetLost;
        let v = summary_json("sim", &s);
        assert_eq!(v["abort_reason"], "target_lost");
        assert!(v["timestamp"].as_i64().is_some());
    }

    #[test]
    fn cli_override_replaces_tick_budget() {
        let cfg = Config::default();
        assert_eq!(run_params(&cfg, None).max_ticks, cfg.runner.max_ticks);
        assert_eq!(run_params(&cfg, Some(3)).max_ticks, 3);
    }
}
