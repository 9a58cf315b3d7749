// Render a JSON scene file to an image.
// Run with: cargo run --release --bin lux -- <scene.json> [output.ppm|png]

use std::env;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use lux_renderer::{output, Camera, Scene};

/// Output file used when none is given on the command line.
const DEFAULT_OUTPUT: &str = "image.ppm";

struct Args {
    scene: PathBuf,
    output: PathBuf,
}

fn parse_args() -> Result<Args> {
    let args: Vec<String> = env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("lux");

    match args.len() {
        2 | 3 => Ok(Args {
            scene: PathBuf::from(&args[1]),
            output: PathBuf::from(args.get(2).map(String::as_str).unwrap_or(DEFAULT_OUTPUT)),
        }),
        _ => bail!("Usage: {} <scene.json> [output.ppm|png]", program),
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = parse_args()?;
    let start = Instant::now();

    let desc = lux_core::load_scene(&args.scene)
        .with_context(|| format!("Failed to load scene {}", args.scene.display()))?;

    let scene = Scene::from_description(&desc).context("Failed to build scene")?;
    let mut camera = Camera::from_settings(&desc.camera).context("Invalid camera settings")?;

    let (image, stats) = camera.render(&scene).context("Render failed")?;
    if stats.faulted_samples > 0 {
        log::warn!(
            "{} of {} samples were not finite and were zeroed",
            stats.faulted_samples,
            stats.samples
        );
    }

    output::save(&args.output, &image)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    log::info!("Done in {:.2?}", start.elapsed());
    Ok(())
}
