use crate::config::AppConfig;
use crate::scripted_input::ScriptedInputPlayer;
use crate::world_save;
use anyhow::{Context, Result};
use std::path::PathBuf;
use tilecraft_world::{InputSnapshot, Simulation, TerrainGenerator, TileRect};

pub struct HeadlessOptions {
    pub config: AppConfig,
    pub scripted_input: Option<PathBuf>,
    pub save_dir: PathBuf,
    pub slot: String,
    pub load: bool,
    pub no_save: bool,
    pub snapshot_out: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummary {
    pub frames: u64,
    pub ticks: u64,
    pub dropped_ticks: u64,
}

pub fn run(opts: HeadlessOptions) -> Result<RunSummary> {
    let mut sim = if opts.load {
        world_save::load_slot(&opts.save_dir, &opts.slot, opts.config.sim.clone())?
    } else {
        let generator = TerrainGenerator::new(opts.config.sim.seed);
        Simulation::generate(opts.config.sim.clone(), &generator)
    };

    let mut script = match opts.scripted_input.as_deref() {
        Some(path) => Some(
            ScriptedInputPlayer::from_path(path)
                .with_context(|| format!("failed to load scripted input {}", path.display()))?,
        ),
        None => None,
    };

    let summary = run_frames(&mut sim, script.as_mut(), &opts.config);

    if let Some(path) = opts.snapshot_out.as_deref() {
        write_snapshot(&sim, path, opts.config.headless.snapshot_radius)?;
    }
    if !opts.no_save {
        world_save::save_slot(&opts.save_dir, &opts.slot, &sim)?;
    }

    tracing::info!(
        frames = summary.frames,
        ticks = summary.ticks,
        dropped = summary.dropped_ticks,
        "headless run finished"
    );
    Ok(summary)
}

fn run_frames(
    sim: &mut Simulation,
    mut script: Option<&mut ScriptedInputPlayer>,
    config: &AppConfig,
) -> RunSummary {
    let headless = &config.headless;
    let dt = config.frame_delta();
    let tps = u64::from(sim.settings().ticks_per_second);
    let start_tick = sim.tick().0;
    let mut frames = 0u64;
    let mut logged_second = 0u64;

    if sim.scheduler().time_scale() <= 0.0 {
        tracing::warn!("time scale is zero, no ticks will run");
        return RunSummary {
            frames,
            ticks: 0,
            dropped_ticks: sim.scheduler().dropped_ticks(),
        };
    }

    while sim.tick().0 - start_tick < headless.max_ticks {
        let elapsed = if headless.glitch_frame == Some(frames) {
            tracing::warn!(frame = frames, seconds = headless.glitch_seconds, "injecting frame stall");
            headless.glitch_seconds
        } else {
            dt
        };

        let input = match script.as_deref_mut() {
            Some(player) => player.advance(dt as f32, sim.player().body.center()),
            None => InputSnapshot::new(),
        };
        sim.advance_frame(elapsed, &input);
        frames += 1;

        let ran = sim.tick().0 - start_tick;
        let second = ran / tps;
        if second > logged_second {
            logged_second = second;
            let body = &sim.player().body;
            tracing::info!(
                second,
                tick = sim.tick().0,
                x = body.position.x,
                y = body.position.y,
                entities = sim.entities().len(),
                ticks_per_frame = sim.scheduler().average_ticks_per_frame(),
                "progress"
            );
        }
    }

    RunSummary {
        frames,
        ticks: sim.tick().0 - start_tick,
        dropped_ticks: sim.scheduler().dropped_ticks(),
    }
}

fn write_snapshot(sim: &Simulation, path: &std::path::Path, radius: u32) -> Result<()> {
    let side = radius.saturating_mul(2).max(1);
    let snapshot = sim.snapshot(TileRect::around(sim.player().body.center(), side, side));
    let json = snapshot.to_json().context("failed to serialize snapshot")?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
    tracing::info!(path = %path.display(), "wrote snapshot");
    Ok(())
}
