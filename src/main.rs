use std::path::{Path, PathBuf};
use std::process::ExitCode;

use chromecloth::config::{Params, Preset, Viewport};
use chromecloth::{ChromeclothError, ChromeclothResult, export, render};

const PREVIEW_SIZE: usize = 1024;

/// The fifth argument is either a JSON parameter file or a preset name.
fn load_params(arg: Option<&String>) -> ChromeclothResult<Params> {
    match arg {
        None => Ok(Params::default()),
        Some(s) if Path::new(s).is_file() => Params::from_json_file(Path::new(s)),
        Some(s) => Ok(s.parse::<Preset>()?.params()),
    }
}

fn run() -> ChromeclothResult<()> {
    let args: Vec<String> = std::env::args().collect();

    let noise_seed: u64 = args.get(1).and_then(|s| s.parse().ok()).unwrap_or(42);
    let width: f64 = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(800.0);
    let height: f64 = args.get(3).and_then(|s| s.parse().ok()).unwrap_or(800.0);
    let out_dir: PathBuf = args
        .get(4)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("artifacts"));
    let params = load_params(args.get(5))?;
    let viewport = Viewport::new(width, height);

    std::fs::create_dir_all(&out_dir).map_err(|source| ChromeclothError::Export {
        path: out_dir.clone(),
        source,
    })?;

    log::info!(
        "generating {}x{} {} pattern, noise_seed={}, rings={}, vertices={}",
        width,
        height,
        params.path_method.as_str(),
        noise_seed,
        params.ring_count,
        params.vertices_per_ring
    );

    let (scene, timings) = chromecloth::generate(noise_seed, viewport, &params);

    for t in &timings {
        log::info!("  {:20} {:8.1} ms", t.name, t.ms);
    }

    export::save_svg(&out_dir, &scene, viewport, &params)?;

    // Preview keeps the viewport's aspect ratio with the long side at PREVIEW_SIZE.
    let long_side = width.max(height).max(1.0);
    let pw = ((width / long_side) * PREVIEW_SIZE as f64).round().max(1.0) as usize;
    let ph = ((height / long_side) * PREVIEW_SIZE as f64).round().max(1.0) as usize;
    let rgba = render::render_preview(&scene, viewport, pw, ph);
    let preview = out_dir.join("preview.png");
    image::save_buffer(&preview, &rgba, pw as u32, ph as u32, image::ColorType::Rgba8)?;
    log::info!("saved {}", preview.display());

    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
