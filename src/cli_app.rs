//! Top-level CLI definition and dispatch.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::Parser;
use colored::{ColoredString, Colorize, control};
use serde_json::{Value, json};
use thiserror::Error;

use timestamp_normalizer::core::config::Config;
use timestamp_normalizer::normalizer::{NormalizeEvent, Normalizer, RunReport};
use timestamp_normalizer::platform::pal::detect_platform;

/// Timestamp Normalizer: moves creation times back to the earliest plausible origin.
#[derive(Debug, Parser)]
#[command(
    name = "tsn",
    author,
    version,
    about = "Timestamp Normalizer - Creation Time Repair",
    long_about = None
)]
pub struct Cli {
    /// Directory to normalize (defaults to the current directory).
    #[arg(value_name = "ROOT")]
    root: Option<PathBuf>,
    /// Override config file path.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Override the error log path.
    #[arg(long, value_name = "PATH")]
    error_log: Option<PathBuf>,
    /// Report decisions without deleting or writing anything.
    #[arg(long)]
    dry_run: bool,
    /// Force JSON output mode.
    #[arg(long)]
    json: bool,
    /// Disable colored output.
    #[arg(long)]
    no_color: bool,
    /// Also show unchanged and skipped files.
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,
    /// Quiet mode (failures and summary only).
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputMode {
    Human,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Verbosity {
    Quiet,
    Normal,
    Verbose,
}

/// CLI error type with explicit exit-code mapping.
#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid user input at runtime.
    #[error("{0}")]
    User(String),
    /// Environment/runtime failure.
    #[error("{0}")]
    Runtime(String),
    /// JSON serialization failed.
    #[error("failed to serialize output: {0}")]
    Json(#[from] serde_json::Error),
    /// Output write failed.
    #[error("failed to write output: {0}")]
    Io(#[from] io::Error),
}

impl CliError {
    /// Process exit code contract for the CLI.
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::User(_) => 1,
            Self::Runtime(_) | Self::Io(_) => 2,
            Self::Json(_) => 3,
        }
    }
}

/// Normalize the requested tree and render the outcome.
pub fn run(cli: &Cli) -> Result<(), CliError> {
    if cli.no_color {
        control::set_override(false);
    }
    let mode = output_mode(cli);
    let verbosity = verbosity(cli);

    let mut config =
        Config::load(cli.config.as_deref()).map_err(|e| CliError::Runtime(e.to_string()))?;
    if let Some(path) = &cli.error_log {
        config.paths.error_log.clone_from(path);
    }
    if cli.dry_run {
        config.correction.dry_run = true;
    }
    let root = resolve_root(cli.root.as_deref())?;

    if mode == OutputMode::Human && verbosity != Verbosity::Quiet {
        println!("{} {}", "Normalizing".bold(), root.display());
        if config.correction.dry_run {
            println!(
                "{}",
                "dry run: nothing will be deleted or modified".yellow()
            );
        }
    }

    let mut normalizer = Normalizer::new(&config, detect_platform());
    if mode == OutputMode::Human {
        if let Some(warning) = normalizer.platform_warning() {
            eprintln!("{}", format!("warning: {warning}").yellow());
        }
        if let Some(state) = normalizer.activity_log_state()
            && state != "normal"
        {
            eprintln!(
                "{}",
                format!("warning: activity log is writing to {state}").yellow()
            );
        }
    }
    let mut output_error: Option<CliError> = None;
    let report = normalizer
        .run(&root, |event| {
            if output_error.is_some() {
                return;
            }
            if let Err(e) = emit_event(mode, verbosity, event) {
                output_error = Some(e);
            }
        })
        .map_err(|e| CliError::Runtime(e.to_string()))?;
    if let Some(e) = output_error {
        return Err(e);
    }

    emit_summary(mode, &report, normalizer.error_log().path())
}

fn resolve_root(root: Option<&Path>) -> Result<PathBuf, CliError> {
    let root = match root {
        Some(path) => path.to_path_buf(),
        None => std::env::current_dir()?,
    };
    if !root.is_dir() {
        return Err(CliError::User(format!(
            "root is not a directory: {}",
            root.display()
        )));
    }
    Ok(root)
}

fn emit_event(mode: OutputMode, verbosity: Verbosity, event: &NormalizeEvent) -> Result<(), CliError> {
    match mode {
        OutputMode::Json => write_json_line(&serde_json::to_value(event)?),
        OutputMode::Human => {
            if should_print(verbosity, event) {
                let mut stdout = io::stdout().lock();
                writeln!(stdout, "{}", style_event(event))?;
            }
            Ok(())
        }
    }
}

fn should_print(verbosity: Verbosity, event: &NormalizeEvent) -> bool {
    match verbosity {
        Verbosity::Quiet => event.is_failure(),
        Verbosity::Normal => !event.is_routine(),
        Verbosity::Verbose => true,
    }
}

fn style_event(event: &NormalizeEvent) -> ColoredString {
    let message = event.message();
    match event {
        NormalizeEvent::Corrected { .. } => message.green(),
        NormalizeEvent::CacheFileDeleted { .. } => message.cyan(),
        NormalizeEvent::CorrectionFailed { .. } | NormalizeEvent::CacheFileDeleteFailed { .. } => {
            message.red()
        }
        NormalizeEvent::MetadataUnavailable { .. }
        | NormalizeEvent::CaptureTimeInvalid { .. }
        | NormalizeEvent::UnsupportedPlatform { .. } => message.yellow(),
        NormalizeEvent::Unchanged { .. } | NormalizeEvent::Skipped { .. } => message.dimmed(),
    }
}

fn emit_summary(mode: OutputMode, report: &RunReport, error_log: &Path) -> Result<(), CliError> {
    match mode {
        OutputMode::Json => {
            let mut payload = json!({ "event": "summary" });
            if let (Value::Object(target), Value::Object(fields)) =
                (&mut payload, serde_json::to_value(report)?)
            {
                target.extend(fields);
            }
            if report.error_log_lines > 0 {
                payload["error_log"] = Value::String(error_log.display().to_string());
            }
            write_json_line(&payload)
        }
        OutputMode::Human => {
            let mut stdout = io::stdout().lock();
            let summary = report.summary();
            if report.has_failures() {
                writeln!(stdout, "{}", summary.yellow().bold())?;
            } else {
                writeln!(stdout, "{}", summary.bold())?;
            }
            if report.error_log_lines > 0 {
                writeln!(
                    stdout,
                    "{} failure(s) recorded in {}",
                    report.error_log_lines,
                    error_log.display()
                )?;
            }
            Ok(())
        }
    }
}

fn write_json_line(payload: &Value) -> Result<(), CliError> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer(&mut stdout, payload)?;
    writeln!(stdout)?;
    Ok(())
}

fn output_mode(cli: &Cli) -> OutputMode {
    let env_mode = std::env::var("TSN_OUTPUT_FORMAT").ok();
    resolve_output_mode(cli.json, env_mode.as_deref())
}

/// Human lines unless JSON is asked for, so redirected output still reads
/// like the terminal.
fn resolve_output_mode(json_flag: bool, env_mode: Option<&str>) -> OutputMode {
    if json_flag {
        return OutputMode::Json;
    }

    match env_mode
        .map(str::trim)
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("json") => OutputMode::Json,
        _ => OutputMode::Human,
    }
}

const fn verbosity(cli: &Cli) -> Verbosity {
    if cli.quiet {
        Verbosity::Quiet
    } else if cli.verbose {
        Verbosity::Verbose
    } else {
        Verbosity::Normal
    }
}
