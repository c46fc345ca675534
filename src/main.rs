//! tilecraft - a deterministic side-on tile sandbox
//!
//! Headless host: generates or loads a world, drives it with scripted input
//! at a fixed frame rate and saves the slot on exit.

mod config;
mod headless;
mod scripted_input;
mod world_save;

use anyhow::Result;
use config::AppConfig;
use headless::HeadlessOptions;
use std::fmt::Display;
use std::str::FromStr;
use std::{env, path::PathBuf};
use tracing::info;

fn main() -> Result<()> {
    // WARN by default, override with RUST_LOG
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    info!("Starting tilecraft v{}", env!("CARGO_PKG_VERSION"));

    let cli = CliOptions::parse(env::args().skip(1));
    let mut config = match cli.config.as_deref() {
        Some(path) => AppConfig::load_from_path(path),
        None => AppConfig::load(),
    };
    cli.apply(&mut config);

    let options = HeadlessOptions {
        save_dir: cli
            .save_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(&config.headless.save_dir)),
        slot: cli
            .slot
            .clone()
            .unwrap_or_else(|| config.headless.slot.clone()),
        config,
        scripted_input: cli.script,
        load: cli.load,
        no_save: cli.no_save,
        snapshot_out: cli.snapshot_out,
    };

    let summary = headless::run(options)?;
    info!(
        frames = summary.frames,
        ticks = summary.ticks,
        dropped = summary.dropped_ticks,
        "done"
    );
    Ok(())
}

#[derive(Debug, Default)]
struct CliOptions {
    config: Option<PathBuf>,
    seed: Option<u64>,
    max_ticks: Option<u64>,
    fps: Option<f64>,
    time_scale: Option<f64>,
    script: Option<PathBuf>,
    save_dir: Option<PathBuf>,
    slot: Option<String>,
    load: bool,
    no_save: bool,
    snapshot_out: Option<PathBuf>,
}

/// Parse the value following `flag`, logging and returning `None` on failure.
fn parse_value<T, I>(flag: &str, args: &mut I) -> Option<T>
where
    T: FromStr,
    T::Err: Display,
    I: Iterator<Item = String>,
{
    let Some(raw) = args.next() else {
        tracing::error!("{flag} requires a value");
        return None;
    };
    match raw.parse::<T>() {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::error!(%err, value = %raw, "invalid value for {flag}");
            None
        }
    }
}

impl CliOptions {
    fn parse<I: Iterator<Item = String>>(mut args: I) -> Self {
        let mut opts = CliOptions::default();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" => opts.config = parse_value(&arg, &mut args),
                "--seed" => opts.seed = parse_value(&arg, &mut args),
                "--max-ticks" => opts.max_ticks = parse_value(&arg, &mut args),
                "--fps" => {
                    opts.fps = parse_value::<f64, _>(&arg, &mut args).filter(|fps| {
                        let ok = fps.is_finite() && *fps > 0.0;
                        if !ok {
                            tracing::error!(fps, "--fps must be positive");
                        }
                        ok
                    });
                }
                "--time-scale" => opts.time_scale = parse_value(&arg, &mut args),
                "--script" => opts.script = parse_value(&arg, &mut args),
                "--save-dir" => opts.save_dir = parse_value(&arg, &mut args),
                "--slot" => opts.slot = parse_value(&arg, &mut args),
                "--load" => opts.load = true,
                "--no-save" => opts.no_save = true,
                "--snapshot-out" => opts.snapshot_out = parse_value(&arg, &mut args),
                other => tracing::warn!(arg = other, "ignoring unknown argument"),
            }
        }

        opts
    }

    /// Apply flag overrides on top of the loaded configuration.
    fn apply(&self, config: &mut AppConfig) {
        if let Some(seed) = self.seed {
            config.sim.seed = seed;
        }
        if let Some(max_ticks) = self.max_ticks {
            config.headless.max_ticks = max_ticks;
        }
        if let Some(fps) = self.fps {
            config.headless.fps = fps;
        }
        if let Some(scale) = self.time_scale {
            config.sim.time_scale = scale;
        }
    }
}
