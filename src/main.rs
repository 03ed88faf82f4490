mod heightmap;

use std::error::Error;
use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;
use ridge_world::{TerrainConfig, load_config_from_path};

use crate::heightmap::Heightmap;

#[derive(Parser, Debug)]
#[command(name = "ridge", about = "Headless procedural terrain walker")]
struct Args {
    /// Terrain config (TOML); built-in defaults when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Overrides the config seed
    #[arg(long)]
    seed: Option<u64>,

    #[arg(long, default_value_t = 600)]
    frames: u32,

    /// Camera speed along +z in world units per frame
    #[arg(long, default_value_t = 0.5)]
    speed: f32,

    /// Overrides the config view radius
    #[arg(long)]
    radius: Option<f32>,

    /// Write a grayscale image of the terrain around the origin (.png, .pgm)
    #[arg(long)]
    heightmap: Option<PathBuf>,

    /// Half-size of the heightmap square in world units
    #[arg(long, default_value_t = 60.0)]
    heightmap_extent: f32,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config_from_path(path)?,
        None => TerrainConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(radius) = args.radius {
        config.view_radius = radius;
    }
    config.validate()?;
    let radius = config.view_radius;
    log::info!(
        target: "terrain",
        "seed {} section {}x{} at {} samples/unit, {} mountains",
        config.seed,
        config.section_size,
        config.section_size,
        config.samples_per_unit,
        config.mountain_count
    );

    let mut terrain = ridge_runtime::spawn_store(config)?;

    let t_walk = Instant::now();
    let mut slowest_frame_us = 0u128;
    let mut lowest = f32::INFINITY;
    let mut highest = f32::NEG_INFINITY;
    for frame in 0..args.frames {
        let t0 = Instant::now();
        let (x, z) = (0.0, frame as f32 * args.speed);
        let visible = terrain.prepare_visible(x, z, radius);
        let h = terrain.height(x, z);
        let n = terrain.normal(x, z);
        let frame_us = t0.elapsed().as_micros();
        slowest_frame_us = slowest_frame_us.max(frame_us);
        lowest = lowest.min(h);
        highest = highest.max(h);
        log::debug!(
            target: "terrain",
            "frame {} at ({:.1}, {:.1}): height {:.3} normal ({:.3}, {:.3}, {:.3}), {} visible, {}us",
            frame,
            x,
            z,
            h,
            n.x,
            n.y,
            n.z,
            visible.len(),
            frame_us
        );
    }

    let store = terrain.stats();
    let queue = terrain.source().stats();
    log::info!(
        target: "terrain",
        "walked {} frames in {:.2}s (slowest frame {}us), heights {:.2}..{:.2}",
        args.frames,
        t_walk.elapsed().as_secs_f32(),
        slowest_frame_us,
        lowest,
        highest
    );
    log::info!(
        target: "sections",
        "{} sections ({} blended, ~{} MiB), index {} slots at load {:.2} after {} grows",
        store.sections,
        store.ready,
        store.bytes / (1024 * 1024),
        store.index_capacity,
        store.load_factor,
        store.index_grows
    );
    log::info!(
        target: "queue",
        "{} generated ({}us each), {} consumed, {} waits (max {}us), {} inline",
        queue.generated,
        terrain.source().mean_generate_us(),
        queue.consumed,
        queue.waits,
        queue.max_wait_us,
        queue.inline_fallbacks
    );

    if let Some(path) = &args.heightmap {
        let map = Heightmap::sample(&mut terrain, args.heightmap_extent);
        map.save(path)?;
        let (lo, hi) = map.range();
        log::info!(
            target: "terrain",
            "wrote {}x{} heightmap to {} (heights {:.2}..{:.2})",
            map.side,
            map.side,
            path.display(),
            lo,
            hi
        );
    }
    Ok(())
}
