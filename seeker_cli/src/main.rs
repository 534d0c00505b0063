mod cli;
mod error_fmt;
mod run;

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use clap::Parser;
use eyre::WrapErr;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

use cli::{Cli, Commands, JSON_MODE, json_mode};
use error_fmt::{exit_code_for_error, format_error_json, humanize};
use seeker_core::error::TargetingError;

fn main() {
    let _ = color_eyre::install();
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);

    if let Err(e) = real_main(cli) {
        if json_mode() {
            println!("{}", format_error_json(&e));
        } else {
            eprintln!("{}", humanize(&e));
        }
        std::process::exit(exit_code_for_error(&e));
    }
}

fn real_main(cli: Cli) -> eyre::Result<()> {
    let cfg = load_config(&cli.config)?;
    // Dropping the guard flushes the file sink, so it lives until the command returns.
    let _log_guard = init_tracing(&cli, &cfg.logging)?;
    tracing::debug!(config = %cli.config.display(), "config loaded");

    let shutdown = Arc::new(AtomicBool::new(false));
    {
        let flag = Arc::clone(&shutdown);
        ctrlc::set_handler(move || flag.store(true, Ordering::Relaxed))
            .wrap_err("installing Ctrl-C handler")?;
    }

    match cli.cmd {
        Commands::Replay {
            telemetry,
            max_ticks,
        } => run::run_replay(&cfg, &telemetry, max_ticks, &shutdown).map(|_| ()),
        Commands::Sim { max_ticks, seed } => {
            run::run_sim(&cfg, max_ticks, seed, &shutdown).map(|_| ())
        }
        Commands::SelfCheck => run::self_check(&cfg),
    }
}

fn load_config(path: &Path) -> eyre::Result<seeker_config::Config> {
    let text = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("read config {}", path.display()))?;
    let cfg = seeker_config::load_toml(&text)
        .wrap_err_with(|| format!("parse config {}", path.display()))?;
    cfg.validate()
        .map_err(|e| TargetingError::Config(e.to_string()))
        .wrap_err("invalid configuration")?;
    Ok(cfg)
}

/// Console output goes to stderr so stdout carries only results and JSON lines.
fn init_tracing(
    cli: &Cli,
    logging: &seeker_config::Logging,
) -> eyre::Result<Option<WorkerGuard>> {
    // RUST_LOG wins; otherwise --log-level, unless left at its default and the
    // config names a level.
    let level = match logging.level.as_deref() {
        Some(l) if cli.log_level == "info" => l,
        _ => cli.log_level.as_str(),
    };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .wrap_err_with(|| format!("invalid log level {level:?}"))?;

    let (file_writer, guard) = match logging.file.as_deref() {
        Some(file) => {
            let path = Path::new(file);
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let name = path.file_name().map_or_else(
                || std::ffi::OsString::from("seeker.log"),
                std::ffi::OsStr::to_os_string,
            );
            let appender = match logging.rotation.as_deref() {
                Some("daily") => tracing_appender::rolling::daily(dir, name),
                Some("hourly") => tracing_appender::rolling::hourly(dir, name),
                _ => tracing_appender::rolling::never(dir, name),
            };
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(writer), Some(guard))
        }
        None => (None, None),
    };

    // The file sink always gets JSON lines; the console follows --json.
    let console = if cli.json {
        fmt::layer().json().with_writer(std::io::stderr).boxed()
    } else {
        fmt::layer().with_writer(std::io::stderr).boxed()
    };
    let file_layer = file_writer.map(|w| fmt::layer().json().with_ansi(false).with_writer(w));

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file_layer)
        .try_init()
        .wrap_err("initializing logging")?;
    Ok(guard)
}
