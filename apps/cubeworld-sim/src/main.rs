//! Cubeworld headless simulation
//!
//! Generates terrain around a player and drives it with a scripted input
//! sequence, logging chunk streaming, movement and voxel edits.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p cubeworld-sim -- [OPTIONS]
//! ```
//!
//! ## Options
//!
//! - `--seed <N>`: World generation seed (default: 42)
//! - `--frames <N>`: Number of simulation steps (default: 600)
//! - `--radius <N>`: Chunk load radius around the player (default: 2)
//! - `--noise <KIND>`: `gradient` or `fractal` (default: gradient)
//! - `--unload-radius <N>`: Unload chunks beyond this radius (default: keep all)
//! - `-h, --help`: Print help message
//!
//! ## Environment Variables
//!
//! - `RUST_LOG`: Set log level (e.g., info, debug, trace)

mod script;

use anyhow::{bail, Context};
use cubeworld_physics::{Player, PlayerConfig};
use cubeworld_world::{NoiseKind, Terrain, TerrainConfig};
use glam::Vec2;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::script::Script;

/// Simulation parameters (from CLI or defaults).
#[derive(Debug, Clone)]
struct SimParams {
    seed: u64,
    frames: u64,
    radius: u32,
    noise: NoiseKind,
    unload_radius: Option<u32>,
}

impl Default for SimParams {
    fn default() -> Self {
        Self {
            seed: 42,
            frames: 600,
            radius: 2,
            noise: NoiseKind::Gradient,
            unload_radius: None,
        }
    }
}

impl SimParams {
    fn from_args() -> anyhow::Result<Self> {
        let mut params = Self::default();
        let args: Vec<String> = std::env::args().collect();

        let mut i = 1;
        while i < args.len() {
            let flag = args[i].as_str();
            let next = args.get(i + 1).map(String::as_str);
            let value = || next.with_context(|| format!("missing value for {flag}"));
            match flag {
                "--seed" => {
                    params.seed = value()?.parse().context("invalid --seed")?;
                    i += 1;
                }
                "--frames" => {
                    params.frames = value()?.parse().context("invalid --frames")?;
                    i += 1;
                }
                "--radius" => {
                    params.radius = value()?.parse().context("invalid --radius")?;
                    i += 1;
                }
                "--unload-radius" => {
                    params.unload_radius =
                        Some(value()?.parse().context("invalid --unload-radius")?);
                    i += 1;
                }
                "--noise" => {
                    params.noise = match value()? {
                        "gradient" => NoiseKind::Gradient,
                        "fractal" => NoiseKind::Fractal {
                            octaves: 4,
                            lacunarity: 2.0,
                            persistence: 0.5,
                        },
                        other => bail!("unknown noise kind {other:?}"),
                    };
                    i += 1;
                }
                other => bail!("unknown argument {other:?} (see --help)"),
            }
            i += 1;
        }

        if let Some(unload) = params.unload_radius {
            if unload < params.radius {
                bail!(
                    "--unload-radius ({unload}) must not be smaller than --radius ({})",
                    params.radius
                );
            }
        }
        Ok(params)
    }
}

fn main() -> anyhow::Result<()> {
    // Check for help flag before parsing anything else
    if std::env::args().any(|arg| arg == "-h" || arg == "--help") {
        print_help();
        return Ok(());
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let params = SimParams::from_args()?;
    info!(?params, "Starting simulation");

    let config = TerrainConfig {
        seed: params.seed,
        noise: params.noise,
        ..Default::default()
    };
    let mut terrain = Terrain::from_config(config).context("invalid terrain config")?;

    let half = terrain.dims().size as f32 / 2.0;
    let spawn = Vec2::splat(half);
    terrain.ensure_chunks_around(spawn.x, spawn.y, params.radius);
    let mut player = Player::spawn(&terrain, spawn, PlayerConfig::default())?;
    info!(position = %player.position(), chunks = terrain.len(), "Player spawned");

    let mut script = Script::new();
    let mut edits = 0usize;

    for frame in 0..params.frames {
        terrain.advance_frame();
        let pos = player.position();
        terrain.ensure_chunks_around(pos.x, pos.z, params.radius);
        terrain.touch_around(pos.x, pos.z, params.radius);

        edits += script.drive(frame, &mut player, &mut terrain);
        player.step(&terrain);

        if let Some(unload) = params.unload_radius {
            let pos = player.position();
            terrain.unload_distant(pos.x, pos.z, unload);
        }

        // nothing renders here; treat every rebuilt mesh as uploaded
        for chunk_pos in terrain.dirty_chunks() {
            if let Some(chunk) = terrain.chunk_mut(chunk_pos) {
                chunk.mark_uploaded();
            }
        }

        if frame % 60 == 0 {
            info!(
                frame,
                position = %player.position(),
                on_ground = player.on_ground(),
                selected = ?player.selected().map(|hit| hit.voxel),
                chunks = terrain.len(),
                "tick"
            );
        }
    }

    let quads: usize = terrain.chunks().map(|c| c.mesh().quad_count()).sum();
    info!(
        frames = params.frames,
        position = %player.position(),
        chunks = terrain.len(),
        quads,
        edits,
        memory_kb = terrain.memory_usage() / 1024,
        "Simulation finished"
    );
    Ok(())
}

fn print_help() {
    eprintln!(
        "Cubeworld headless simulation

USAGE:
    cargo run -p cubeworld-sim -- [OPTIONS]

OPTIONS:
    --seed <N>              World generation seed (default: 42)
    --frames <N>            Number of simulation steps (default: 600)
    --radius <N>            Chunk load radius around the player (default: 2)
    --noise <KIND>          Height field: gradient or fractal (default: gradient)
    --unload-radius <N>     Unload chunks beyond this radius (default: keep all)
    -h, --help              Print this help message

ENVIRONMENT VARIABLES:
    RUST_LOG                Set log level (e.g., info, debug, trace)"
    );
}
