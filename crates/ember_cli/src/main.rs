use std::io::{self, BufWriter};
use std::sync::{mpsc, Arc};

use anyhow::{bail, Context, Result};
use clap::Parser;
use ember_core::{demo, SceneDescription, Settings};
use ember_renderer::{
    build_world, save_ppm, write_ppm, Camera, Frame, HittableList, Orchestrator,
    ParameterListener, Renderer,
};
use log::info;

mod cli;
mod logger;

use cli::{Args, SceneSource};
use logger::init_logger;

fn load_settings(args: &Args) -> Result<Settings> {
    let mut settings = match &args.config {
        Some(path) => Settings::load(path)
            .with_context(|| format!("Failed to load settings from {}", path.display()))?,
        None => Settings::default(),
    };
    args.apply(&mut settings);
    settings.validate().context("Invalid settings")?;
    Ok(settings)
}

fn load_scene(args: &Args, settings: &Settings) -> Result<SceneDescription> {
    let scene = match args.scene_source() {
        SceneSource::Random => demo::random_scene(settings.render.seed),
        SceneSource::TwoSpheres => demo::two_spheres(),
        SceneSource::HollowGlass => demo::hollow_glass(),
        SceneSource::File(path) => SceneDescription::load(&path)
            .with_context(|| format!("Failed to load scene from {}", path.display()))?,
    };
    info!(
        "Scene: {} spheres, {} materials",
        scene.spheres.len(),
        scene.materials.len()
    );
    Ok(scene)
}

/// Run every pass on this thread's renderer.
fn render_direct(
    mut renderer: Renderer,
    camera: &Camera,
    world: &HittableList,
    samples: u32,
) -> Result<Frame> {
    let mut frame = renderer.frame();
    for _ in 0..samples {
        frame = renderer
            .render(camera, world)
            .context("Render pass was interrupted")?;
        info!("Sample {}/{}", frame.samples(), samples);
    }
    Ok(frame)
}

/// Converge on a background session and close it once the target frame arrives.
fn render_progressive(
    renderer: Renderer,
    camera: Camera,
    world: HittableList,
    samples: u32,
) -> Result<Frame> {
    if samples == 0 {
        return Ok(renderer.frame());
    }

    let (frames, received) = mpsc::channel();
    let sink = Arc::new(move |frame: Frame| {
        // The receiver is gone once a converged frame has been taken
        let _ = frames.send(frame);
    });
    let session =
        Orchestrator::spawn(renderer, Arc::new(camera), Arc::new(world), sink, samples)
            .context("Failed to start render session")?;

    for frame in received.iter() {
        info!(
            "Frame {}/{} after {:?}",
            frame.samples(),
            samples,
            frame.elapsed()
        );
        if frame.samples() >= samples {
            session.on_window_closing();
            return Ok(frame);
        }
    }

    bail!("Render session ended before reaching {samples} samples")
}

fn write_output(frame: &Frame, args: &Args) -> Result<()> {
    if args.writes_to_stdout() {
        write_ppm(frame, BufWriter::new(io::stdout().lock())).context("Failed to write image")?;
    } else {
        save_ppm(frame, &args.output)
            .with_context(|| format!("Failed to write image to {}", args.output))?;
        info!("Saved {}", args.output);
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logger(args.log_level.into());

    info!("Ember {}", env!("CARGO_PKG_VERSION"));

    let settings = load_settings(&args)?;
    let scene = load_scene(&args, &settings)?;
    let world = build_world(&scene).context("Failed to build scene")?;
    let camera = Camera::from_settings(&settings.camera, settings.render.aspect_ratio());
    let renderer =
        Renderer::from_settings(&settings.render).context("Failed to create renderer")?;

    let render = &settings.render;
    info!(
        "Rendering {}x{}, {} samples, depth {}",
        render.width, render.height, render.samples, render.max_depth
    );

    let frame = if args.progressive {
        render_progressive(renderer, camera, world, render.samples)?
    } else {
        render_direct(renderer, &camera, &world, render.samples)?
    };

    info!(
        "Rendered {} samples in {:?}",
        frame.samples(),
        frame.elapsed()
    );
    write_output(&frame, &args)
}
