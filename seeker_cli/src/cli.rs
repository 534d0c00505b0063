//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

#[inline]
pub fn json_mode() -> bool {
    JSON_MODE.get().copied().unwrap_or(false)
}

#[derive(Parser, Debug)]
#[command(name = "seeker", version, about = "Vision-guided target acquisition")]
pub struct Cli {
    /// Path to config TOML (typed)
    #[arg(long, value_name = "FILE", default_value = "etc/seeker.toml")]
    pub config: PathBuf,

    /// Emit JSON lines (per-tick reports, summary, errors) instead of text
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace)
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "info")]
    pub log_level: String,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the controller against recorded telemetry
    Replay {
        /// CSV with headers rotational,lateral,depth,has_target
        #[arg(long, value_name = "FILE")]
        telemetry: PathBuf,
        /// Override runner.max_ticks
        #[arg(long, value_name = "N", value_parser = clap::value_parser!(u64).range(1..))]
        max_ticks: Option<u64>,
    },
    /// Run the controller against the closed-loop simulated target
    Sim {
        /// Override runner.max_ticks
        #[arg(long, value_name = "N", value_parser = clap::value_parser!(u64).range(1..))]
        max_ticks: Option<u64>,
        /// Override sim.seed
        #[arg(long, value_name = "SEED")]
        seed: Option<u32>,
    },
    /// Validate config and preferences, then tick a simulated controller once
    SelfCheck,
}
