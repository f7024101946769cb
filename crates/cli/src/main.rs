use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use progression_core::cancel::CancelSignal;
use progression_core::config::{
    config_path, console_options_from_config, load_config, log_steps_from_config,
    operation_options_from_config, AppConfig,
};
use progression_core::display::{self, ConsoleReporter, LogReporter, ProgressUpdate};
use progression_core::error::OperationError;
use progression_core::fanout::FanOutReporter;
use progression_core::operations::{copy_file, hash_file, Digest, Outcome};
use progression_core::reporter::ProgressReporter;
use progression_core::scaled::ScaledValue;

type CliResult<T = ()> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

#[derive(Parser)]
#[command(name = "progression")]
#[command(about = "Copy and hash files with composable progress reporting")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Also report progress milestones as log records
    #[arg(long, global = true)]
    log: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Copy a file, showing a progress bar
    Copy {
        /// Source file
        source: PathBuf,

        /// Destination file
        destination: PathBuf,
    },

    /// Print SHA-256 digests of files
    Hash {
        /// Input file(s)
        #[arg(required = true)]
        input: Vec<PathBuf>,
    },

    /// Run a simulated nested workload
    Demo {
        /// Steps per phase
        #[arg(long, default_value = "20")]
        steps: u64,

        /// Delay between steps in milliseconds
        #[arg(long, default_value = "50")]
        delay_ms: u64,

        /// Cancel after this many steps
        #[arg(long)]
        cancel_after: Option<u64>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Initialize default config file
    Init,
    /// Show current configuration
    Show,
}

fn main() {
    let cli = Cli::parse();

    let filter = if cli.log {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
    } else {
        tracing_subscriber::EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match &cli.command {
        Commands::Copy { source, destination } => run_copy(source, destination, cli.log, cli.json),
        Commands::Hash { input } => run_hash(input, cli.log, cli.json),
        Commands::Demo { steps, delay_ms, cancel_after } => run_demo(*steps, *delay_ms, *cancel_after, cli.log, cli.json),
        Commands::Config { action } => run_config(action, cli.json),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// The console bar plus, with `--log`, a log reporter mirroring it.
fn build_reporter<'a>(
    console: &'a mut ConsoleReporter,
    cfg: &AppConfig,
    log: bool,
) -> CliResult<FanOutReporter<'a>> {
    let mut members: Vec<Box<dyn ProgressReporter + 'a>> = vec![Box::new(console)];
    if log {
        members.push(Box::new(LogReporter::new(log_steps_from_config(&cfg.log))?));
    }
    Ok(FanOutReporter::new(members)?)
}

#[derive(Serialize)]
struct CopyReport<'a> {
    source: &'a Path,
    destination: &'a Path,
    bytes: u64,
}

fn run_copy(source: &Path, destination: &Path, log: bool, json: bool) -> CliResult {
    let cfg = load_config();
    let options = operation_options_from_config(&cfg.operations);
    let mut console = ConsoleReporter::new(&console_options_from_config(&cfg.console))?;

    let outcome = {
        let mut reporter = build_reporter(&mut console, &cfg, log)?;
        let name = source.file_name().map(|n| n.to_string_lossy().into_owned());
        reporter.set_caption(Some(&format!("Copying {}", name.as_deref().unwrap_or("file"))));
        copy_file(source, destination, &mut reporter, &options)?
    };
    console.finish();

    let bytes = match outcome {
        Outcome::Completed(bytes) => bytes,
        Outcome::Canceled { processed } => {
            return Err(format!("Copy canceled after {} bytes", processed).into());
        }
    };

    if json {
        let report = CopyReport { source, destination, bytes };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Copied {} bytes: {} -> {}", bytes, source.display(), destination.display());
    }
    Ok(())
}

const UNITS_PER_FILE: u64 = 1000;

#[derive(Serialize)]
struct HashReport {
    path: PathBuf,
    sha256: String,
}

/// Hashes on a worker thread. The worker reports through a channel, and this
/// thread replays the updates onto the console bar.
fn run_hash(inputs: &[PathBuf], log: bool, json: bool) -> CliResult {
    let cfg = load_config();
    let options = operation_options_from_config(&cfg.operations);
    let (mut sender, mut receiver) = display::channel();

    let paths = inputs.to_vec();
    let worker = std::thread::spawn(move || -> Result<Vec<(PathBuf, Digest)>, OperationError> {
        let mut digests = Vec::with_capacity(paths.len());
        sender.set_maximum(paths.len() as u64 * UNITS_PER_FILE)?;
        for path in paths {
            sender.set_caption(Some(&format!("Hashing {}", path.display())));
            let mut child = sender.scaled_child_operation(UNITS_PER_FILE)?;
            if let Outcome::Completed(digest) = hash_file(&path, &mut child, &options)? {
                digests.push((path, digest));
            }
        }
        Ok(digests)
    });

    let mut console = ConsoleReporter::new(&console_options_from_config(&cfg.console))?;
    {
        let mut reporter = build_reporter(&mut console, &cfg, log)?;
        reporter.set_maximum(display::channel::CHANNEL_SCALED_MAX)?;
        while let Some(update) = receiver.blocking_recv() {
            match update {
                ProgressUpdate::Caption(caption) => reporter.set_caption(caption.as_deref()),
                ProgressUpdate::Progress(ScaledValue::Determinate(percent)) => {
                    reporter.set_progress(Some(percent))?
                }
                ProgressUpdate::Progress(ScaledValue::Indeterminate) => reporter.set_progress(None)?,
            }
        }
    }
    console.finish();

    let digests = worker.join().map_err(|_| "hash worker panicked")??;
    if json {
        let reports: Vec<HashReport> = digests
            .into_iter()
            .map(|(path, digest)| HashReport { path, sha256: digest.to_string() })
            .collect();
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        for (path, digest) in digests {
            println!("{}  {}", digest, path.display());
        }
    }
    Ok(())
}

#[derive(Serialize)]
struct DemoReport {
    completed: bool,
    steps: u64,
}

struct Ticker {
    delay: Duration,
    cancel: CancelSignal,
    cancel_after: Option<u64>,
    done: u64,
}

impl Ticker {
    /// Steps `child` through `steps` units. Returns `false` once canceled.
    fn run(&mut self, child: &mut dyn ProgressReporter, steps: u64) -> CliResult<bool> {
        child.set_allow_cancellation(true);
        child.set_maximum(steps)?;
        for _ in 0..steps {
            if child.was_canceled() {
                return Ok(false);
            }
            std::thread::sleep(self.delay);
            child.step()?;
            self.done += 1;
            if self.cancel_after == Some(self.done) {
                self.cancel.cancel()?;
            }
        }
        Ok(true)
    }
}

/// A short indeterminate phase, then two phases of `steps` steps: the first a
/// scaled child covering 100 units of the bar, the second an unscaled child
/// adding its `steps` units directly.
fn run_demo(steps: u64, delay_ms: u64, cancel_after: Option<u64>, log: bool, json: bool) -> CliResult {
    if steps == 0 {
        return Err("--steps must be at least 1".into());
    }
    let cfg = load_config();
    let mut console = ConsoleReporter::new(&console_options_from_config(&cfg.console))?;
    let mut ticker = Ticker {
        delay: Duration::from_millis(delay_ms),
        cancel: console.cancel_handle(),
        cancel_after,
        done: 0,
    };

    {
        let mut reporter = build_reporter(&mut console, &cfg, log)?;
        reporter.set_allow_cancellation(true);

        reporter.set_caption(Some("Preparing"));
        reporter.set_progress(None)?;
        std::thread::sleep(ticker.delay * 4);

        reporter.set_maximum(100 + steps)?;
        reporter.set_progress(Some(0))?;

        reporter.set_caption(Some("Reading"));
        let finished = ticker.run(&mut reporter.scaled_child_operation(100)?, steps)?;
        if finished {
            reporter.set_caption(Some("Writing"));
            ticker.run(&mut reporter.child_operation()?, steps)?;
        }
    }
    console.finish();

    let done = ticker.done;
    let completed = done == steps * 2;
    if json {
        println!("{}", serde_json::to_string_pretty(&DemoReport { completed, steps: done })?);
    } else if completed {
        println!("Done: {} steps", done);
    } else {
        println!("Canceled after {} steps", done);
    }
    Ok(())
}

fn run_config(action: &ConfigAction, json: bool) -> CliResult {
    match action {
        ConfigAction::Init => {
            let path = config_path().ok_or("Could not determine config directory")?;
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let toml = toml::to_string_pretty(&AppConfig::default())?;
            std::fs::write(&path, toml)?;
            println!("Wrote default config to {}", path.display());
        }
        ConfigAction::Show => {
            let cfg = load_config();
            if json {
                println!("{}", serde_json::to_string_pretty(&cfg)?);
            } else {
                println!("{}", toml::to_string_pretty(&cfg)?);
            }
        }
    }
    Ok(())
}
