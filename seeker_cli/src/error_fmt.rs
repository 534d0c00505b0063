//! Human-readable error descriptions and structured JSON error formatting.

use seeker_core::RunOutcome;
use seeker_core::error::{BuildError, TargetingError};

use crate::run::Unfinished;

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    // Typed matches first
    if let Some(Unfinished(outcome)) = err.downcast_ref::<Unfinished>() {
        return match outcome {
            RunOutcome::TargetLost => "What happened: The target was lost before the controller converged.\nLikely causes: Target out of view for more than half the sample window, or the vision pipeline stopped reporting.\nHow to fix: Check camera framing and the illuminator, or raise targeting.window_frames to debounce short dropouts.".to_string(),
            RunOutcome::TickBudgetExhausted => "What happened: The run used its whole tick budget without converging.\nLikely causes: Gains too low to close the offsets, or a tolerance too tight for the sensor noise.\nHow to fix: Raise runner.max_ticks (or --max-ticks), increase kp, or relax tunables.error_tolerance.".to_string(),
            RunOutcome::Interrupted => "What happened: The run was interrupted before converging.\nLikely causes: Ctrl-C or a termination signal.\nHow to fix: Start a new run.".to_string(),
            RunOutcome::Converged => "The run converged.".to_string(),
        };
    }

    if let Some(be) = err.downcast_ref::<BuildError>() {
        return match be {
            BuildError::MissingVision => {
                "What happened: No vision source was provided to the controller.\nLikely causes: The camera pipeline failed to initialize or was not wired into the builder.\nHow to fix: Ensure the vision source is created successfully and passed via with_vision(...).".to_string()
            }
            BuildError::MissingDrive => {
                "What happened: No drive was provided to the controller.\nLikely causes: The drivetrain failed to initialize or was not wired into the builder.\nHow to fix: Ensure the drive is created successfully and passed via with_drive(...).".to_string()
            }
            BuildError::InvalidConfig(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: Out-of-range values in the TOML.\nHow to fix: Edit the config file, then rerun."
            ),
        };
    }

    if let Some(te) = err.downcast_ref::<TargetingError>() {
        return match te {
            TargetingError::Drive(msg) => format!(
                "What happened: The drivetrain rejected a correction ({msg}).\nLikely causes: Motor controller fault, brownout, or a non-finite gain.\nHow to fix: Check drivetrain power and wiring, and review tunables.kp and the max speeds."
            ),
            TargetingError::VisionFault(msg) => format!(
                "What happened: The vision source stopped responding ({msg}).\nLikely causes: Camera disconnected or the pipeline timed out.\nHow to fix: Check the camera link and restart the pipeline."
            ),
            TargetingError::Config(msg) => format!(
                "What happened: Configuration is invalid ({msg}).\nLikely causes: An out-of-range value or an unknown option in the TOML.\nHow to fix: Edit the TOML config and try again."
            ),
            other => format!(
                "What happened: {other}.\nLikely causes: See logs.\nHow to fix: Re-run with --log-level=debug or set RUST_LOG for more detail."
            ),
        };
    }

    // String-based heuristics for errors coming from init or config
    let msg = err.to_string();
    let lower = msg.to_ascii_lowercase();

    if lower.contains("read config") {
        return format!(
            "What happened: The config file could not be read.\nLikely causes: Wrong --config path or missing permissions.\nHow to fix: Pass an existing TOML file via --config. Original: {msg}"
        );
    }

    if lower.contains("parse config") || lower.contains("invalid configuration") {
        let cause = err.root_cause();
        return format!(
            "What happened: Configuration is invalid ({cause}).\nLikely causes: A typo in a key, a wrong type, or an out-of-range value.\nHow to fix: Edit the TOML config and try again."
        );
    }

    if lower.contains("preferences") {
        return format!(
            "What happened: The preferences file could not be loaded ({}).\nLikely causes: Wrong preferences.file path, or a value that is not a number or boolean.\nHow to fix: Fix the file or remove preferences.file from the config.",
            err.root_cause()
        );
    }

    if lower.contains("telemetry") {
        return format!(
            "What happened: The telemetry recording could not be loaded ({}).\nLikely causes: Wrong path, or headers other than 'rotational,lateral,depth,has_target'.\nHow to fix: Check the CSV file and its header row.",
            err.root_cause()
        );
    }

    // Generic fallback
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Stable exit codes: 3 target lost, 4 tick budget exhausted, 5 interrupted, 1 otherwise.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    match err.downcast_ref::<Unfinished>() {
        Some(Unfinished(RunOutcome::TargetLost)) => 3,
        Some(Unfinished(RunOutcome::TickBudgetExhausted)) => 4,
        Some(Unfinished(RunOutcome::Interrupted)) => 5,
        _ => 1,
    }
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    use serde_json::json;

    let reason = if let Some(Unfinished(outcome)) = err.downcast_ref::<Unfinished>() {
        outcome.as_str()
    } else if err.downcast_ref::<BuildError>().is_some() {
        "invalid_config"
    } else if let Some(te) = err.downcast_ref::<TargetingError>() {
        match te {
            TargetingError::Drive(_) => "drive",
            TargetingError::Vision(_) | TargetingError::VisionFault(_) => "vision",
            TargetingError::Illuminator(_) => "illuminator",
            TargetingError::Config(_) => "invalid_config",
            TargetingError::State(_) => "state",
        }
    } else {
        "error"
    };
    json!({ "type": "error", "reason": reason, "message": humanize(err) }).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(RunOutcome::TargetLost, 3, "target was lost")]
    #[case(RunOutcome::TickBudgetExhausted, 4, "tick budget")]
    #[case(RunOutcome::Interrupted, 5, "interrupted")]
    fn unfinished_runs_map_to_codes(
        #[case] outcome: RunOutcome,
        #[case] code: i32,
        #[case] needle: &str,
    ) {
        let err = eyre::Report::new(Unfinished(outcome));
        assert_eq!(exit_code_for_error(&err), code);
        assert!(humanize(&err).contains(needle));
        let v: serde_json::Value = serde_json::from_str(&format_error_json(&err)).unwrap();
        assert_eq!(v["reason"], outcome.as_str());
    }

    #[test]
    fn drive_errors_survive_context() {
        use eyre::WrapErr;
        let err: eyre::Result<()> = Err(eyre::Report::new(TargetingError::Drive(
            "brownout".into(),
        )));
        let err = err.wrap_err("applying correction").unwrap_err();
        assert_eq!(exit_code_for_error(&err), 1);
        assert!(humanize(&err).contains("drivetrain rejected"));
        assert!(format_error_json(&err).contains("\"reason\":\"drive\""));
    }

    #[test]
    fn config_rejections_are_reported_as_invalid_config() {
        use eyre::WrapErr;
        let err: Result<(), TargetingError> = Err(TargetingError::Config(
            "targeting.window_frames must be >= 1".into(),
        ));
        let err = err.wrap_err("invalid configuration").unwrap_err();
        assert_eq!(exit_code_for_error(&err), 1);
        assert!(humanize(&err).contains("Configuration is invalid (targeting.window_frames"));
        assert!(format_error_json(&err).contains("\"reason\":\"invalid_config\""));
    }

    #[test]
    fn unknown_errors_fall_back_to_generic_text() {
        let err = eyre::eyre!("boom");
        assert!(humanize(&err).starts_with("Something went wrong."));
        assert!(format_error_json(&err).contains("\"reason\":\"error\""));
    }
}
