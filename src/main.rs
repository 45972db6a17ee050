// LogTriage - main.rs
//
// Command-line entry point. Handles:
// 1. CLI argument parsing
// 2. Config loading (explicit --config or platform default)
// 3. Logging initialisation (debug mode support)
// 4. The classification run and its exit code

use clap::Parser;
use logtriage::app::run::{self, RunOptions};
use logtriage::platform::config::{self, AppConfig, PlatformPaths};
use logtriage::util;
use std::path::PathBuf;
use std::process::ExitCode;

/// Classify the captured warnings of a pipeline run.
///
/// Reads every `stderr_<id>.txt` in DIRECTORY, classifies each UserWarning
/// line, and writes `exclusions.json` and `errors.json`. Any warning it does
/// not recognise aborts the run without writing anything.
#[derive(Parser, Debug)]
#[command(name = "process_logs", version, about)]
struct Cli {
    /// Directory containing the captured stderr files.
    directory: PathBuf,

    /// Write outputs here instead of DIRECTORY.
    #[arg(short = 'o', long = "output-dir")]
    output_dir: Option<PathBuf>,

    /// Explicit config.toml (default: platform config directory).
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Classify only; report the summary and write nothing.
    #[arg(long = "check")]
    check: bool,

    /// Enable debug logging (equivalent to RUST_LOG=debug).
    #[arg(short = 'd', long = "debug")]
    debug: bool,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            // --help / --version are not failures.
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    // Config is loaded before logging so its level can take effect; warnings
    // are held and logged once the subscriber exists.
    let loaded = match &cli.config {
        Some(path) => config::load_config_file(path),
        None => Ok(config::load_default_config(&PlatformPaths::resolve())),
    };
    let (app_config, config_warnings): (AppConfig, Vec<String>) = match loaded {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    util::logging::init(cli.debug, app_config.log_level.as_deref());
    tracing::debug!(
        version = util::constants::APP_VERSION,
        dir = %cli.directory.display(),
        check = cli.check,
        "process_logs starting"
    );
    for warning in &config_warnings {
        tracing::warn!(warning = %warning, "Config warning");
    }

    let options = RunOptions {
        output_dir: cli.output_dir,
        check_only: cli.check,
        ..RunOptions::new(cli.directory, &app_config)
    };

    match run::run(&options) {
        Ok(outcome) => {
            tracing::info!(
                records = outcome.aggregate.summary.records,
                exclusions = outcome.aggregate.summary.exclusions,
                written = outcome.written.len(),
                "Done"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Run aborted");
            eprintln!("Error: {}", error_chain(&e));
            ExitCode::FAILURE
        }
    }
}

/// Render an error and its sources as `outer: inner: root`.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let cause_text = cause.to_string();
        // Wrapper variants already embed their source's text.
        if !text.contains(&cause_text) {
            text.push_str(": ");
            text.push_str(&cause_text);
        }
        source = cause.source();
    }
    text
}
