//! `roop` -- runs a ROOP program or test suite.
//!
//! **Usage:**
//! ```text
//! roop [-d] [--no-pause] [--json] [--seed <N>] [--config <PATH>] <FILE>
//! ```
//!
//! A file whose first character is `@` is run as a test suite and a report
//! is printed. Anything else is loaded as a program and run on
//! stdin/stdout until it halts.
//!
//! Exit codes: 0 on success, 1 when the file or config cannot be read, 2
//! when the program fails to load.

use std::io::{self, StdinLock, Stdout};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use clap::Parser;
use roop_core::engine::Engine;
use roop_core::services::{Console, StreamConsole};
use roop_loader::config::load_config;
use roop_loader::suite::{parse_suite, run_suite};
use roop_loader::{DebugFormat, RunConfig, SuiteError};

type StdConsole = StreamConsole<StdinLock<'static>, Stdout>;

const LOAD_FAILURE: u8 = 2;

/// Run a ROOP program or test suite.
#[derive(Parser)]
#[command(name = "roop", about = "Interpreter for the ROOP grid language")]
struct Args {
    /// Display the grid before every tick.
    #[arg(short, long)]
    debug: bool,

    /// Do not wait for Enter after each debug view.
    #[arg(long)]
    no_pause: bool,

    /// Print debug views as JSON snapshots.
    #[arg(long)]
    json: bool,

    /// Seed for the random operator (default: from the clock).
    #[arg(long)]
    seed: Option<u64>,

    /// Read run settings from a RON, TOML or JSON file. Flags win.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Program or suite file.
    file: PathBuf,
}

fn main() -> Result<ExitCode> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();
    let config = settings(&args)?;
    let seed = config.seed.unwrap_or_else(clock_seed);
    log::debug!("seed {seed}");

    let text = std::fs::read_to_string(&args.file)
        .with_context(|| format!("the file could not be opened ({})", args.file.display()))?;

    if text.starts_with('@') {
        run_tests(&text, seed)
    } else {
        run_program(&text, &config, seed)
    }
}

/// Config file values, overridden by any flags given.
fn settings(args: &Args) -> Result<RunConfig> {
    let mut config = match &args.config {
        Some(path) => load_config(path)
            .with_context(|| format!("reading config {}", path.display()))?,
        None => RunConfig::default(),
    };
    if args.debug {
        config.debug = true;
    }
    if args.no_pause {
        config.pause = false;
    }
    if args.json {
        config.debug_format = DebugFormat::Json;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    Ok(config)
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or_default()
}

fn std_console() -> StdConsole {
    StreamConsole::new(io::stdin().lock(), io::stdout())
}

// ---------------------------------------------------------------------------
// Programs
// ---------------------------------------------------------------------------

fn run_program(text: &str, config: &RunConfig, seed: u64) -> Result<ExitCode> {
    let source = format!("{text}\n");
    let grid = match roop_loader::load(&source) {
        Ok(grid) => grid,
        Err(e) => {
            println!("ERROR: {e}");
            return Ok(ExitCode::from(LOAD_FAILURE));
        }
    };

    let mut engine = Engine::new(grid, std_console(), seed);
    let reason = if config.debug {
        engine.run_with(|engine| show_tick(engine, config))
    } else {
        engine.run()
    };
    log::debug!("halted after {} ticks: {reason:?}", engine.tick());
    Ok(ExitCode::SUCCESS)
}

/// Print the grid and its values, then optionally wait for Enter.
fn show_tick(engine: &mut Engine<StdConsole>, config: &RunConfig) {
    let snapshot = engine.snapshot();
    let view = match config.debug_format {
        DebugFormat::Text => snapshot.to_string(),
        DebugFormat::Json => match serde_json::to_string(&snapshot) {
            Ok(json) => json + "\n",
            Err(e) => {
                log::warn!("snapshot of tick {} not rendered: {e}", snapshot.tick);
                return;
            }
        },
    };

    let console = engine.console_mut();
    console.write_text(&view);
    if config.pause {
        if let Err(e) = console.skip_line() {
            log::warn!("waiting for Enter failed: {e}");
        }
    }
}

// ---------------------------------------------------------------------------
// Suites
// ---------------------------------------------------------------------------

fn run_tests(text: &str, seed: u64) -> Result<ExitCode> {
    let mut console = std_console();
    let report = match parse_suite(text).and_then(|cases| run_suite(&cases, &mut console, seed)) {
        Ok(report) => report,
        Err(e @ (SuiteError::Load { .. } | SuiteError::Header { .. })) => {
            println!("ERROR: {e}");
            return Ok(ExitCode::from(LOAD_FAILURE));
        }
        Err(e) => return Err(e.into()),
    };
    print!("{report}");
    Ok(ExitCode::SUCCESS)
}
