use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use memwatch::duration::{parse_interval, parse_poll_period};
use memwatch::{app, Overrides, SettingsFile};
use memwatch_sdk::{
    ConfigStore, Configuration, GroupingSeparator, Interval, Output, ProcessMemorySource, Sampler,
    Unit,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "memwatch")]
#[command(about = "Show the resident memory of processes, refreshed on an interval")]
struct Args {
    /// Process to monitor: "self" or a PID. Repeat for several.
    #[arg(short, long = "pid", default_value = ProcessMemorySource::SELF)]
    pids: Vec<String>,

    /// Settings file (TOML, JSON or YAML). Edits apply while running.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Sampling interval, 100ms to 1h (e.g. "500ms", "2s"; bare numbers are seconds)
    #[arg(short, long, value_parser = interval_arg)]
    interval: Option<Interval>,

    /// Display unit: B, KB, KiB, MB, MiB, GB or GiB
    #[arg(short, long, value_parser = unit_arg)]
    unit: Option<Unit>,

    /// Digit grouping separator: ",", "-", " " or "" for none
    #[arg(short, long, value_parser = separator_arg, allow_hyphen_values = true)]
    separator: Option<GroupingSeparator>,

    /// Don't append the unit to readings
    #[arg(long)]
    no_unit: bool,

    /// Write readings to this file instead of the terminal
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print one reading per process and exit
    #[arg(long)]
    once: bool,

    /// How often to check the settings file for edits
    #[arg(long, default_value = "1s", value_parser = duration_arg)]
    watch_every: Duration,
}

impl Args {
    fn overrides(&self) -> Overrides {
        Overrides {
            interval: self.interval,
            unit: self.unit,
            separator: self.separator,
            hide_unit: self.no_unit,
        }
    }
}

fn interval_arg(s: &str) -> Result<Interval, String> {
    parse_interval(s).map_err(|e| e.to_string())
}

fn duration_arg(s: &str) -> Result<Duration, String> {
    parse_poll_period(s).map_err(|e| e.to_string())
}

fn unit_arg(s: &str) -> Result<Unit, String> {
    Unit::parse(s).ok_or_else(|| format!("unknown unit {s:?}"))
}

fn separator_arg(s: &str) -> Result<GroupingSeparator, String> {
    GroupingSeparator::parse(s).ok_or_else(|| format!("unknown separator {s:?}"))
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Logs go to stderr so they don't fight the status line
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let store = args
        .config
        .as_ref()
        .map(|path| {
            SettingsFile::open(path)
                .with_context(|| format!("Failed to load settings from {}", path.display()))
        })
        .transpose()?;

    let base = store
        .as_ref()
        .map(|store| store.get())
        .unwrap_or_default();
    let config = args.overrides().apply(base);

    if args.once {
        return print_once(&args.pids, &config);
    }

    let output = match &args.output {
        Some(path) => Output::file(path),
        None => Output::terminal(),
    };

    // Build a tokio runtime for the timers
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        let sampler = Sampler::builder(ProcessMemorySource::new())
            .output(output)
            .config(config)
            .build();

        app::run(sampler, &args.pids, store, args.watch_every).await
    })?;

    if args.output.is_none() {
        println!();
    }
    Ok(())
}

fn print_once(targets: &[String], config: &Configuration) -> Result<()> {
    let source = ProcessMemorySource::new();
    let mut missing = 0;

    for (target, reading) in app::read_once(&source, targets, config) {
        match reading {
            Ok(text) => println!("{target}\t{text}"),
            Err(e) => {
                eprintln!("{e}");
                missing += 1;
            }
        }
    }

    if missing == targets.len() {
        anyhow::bail!("No process could be sampled");
    }
    Ok(())
}
