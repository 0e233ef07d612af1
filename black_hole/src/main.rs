//! Headless Schwarzschild black hole renderer
//!
//! Integrates light rays through curved spacetime on the CPU and writes a
//! sequence of PNG frames featuring:
//! - Gravitational lensing of a procedural starfield
//! - Volumetric accretion disk with temperature-based coloring
//! - Doppler beaming from the disk rotation
//! - Cinematic camera paths orbiting the hole
//!
//! Run with e.g. `black_hole --resolution 720p --frames 90 --color-mode orange`.

mod physics;
mod renderer;

use std::fs;
use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, ValueEnum};
use common::{Camera, CinematicCamera, CinematicMode, Resolution};
use glam::DVec3;

use physics::{BlackHole, ColorMode, TraceConfig};
use renderer::{CpuRenderer, RenderBackend, RenderParams};

/// Fixed animation timebase for the cinematic camera
const FRAME_DT: f64 = 1.0 / 30.0;

#[derive(Parser, Debug)]
#[command(name = "black_hole", version, about = "Schwarzschild black hole renderer")]
struct Args {
    /// Resolution preset (144p ... 4320p); overrides --width/--height
    #[arg(long)]
    resolution: Option<String>,

    /// Output width in pixels
    #[arg(long, default_value_t = 1280)]
    width: u32,

    /// Output height in pixels
    #[arg(long, default_value_t = 720)]
    height: u32,

    /// Number of frames to render
    #[arg(long, default_value_t = 1)]
    frames: u32,

    /// Black hole mass in geometrized units
    #[arg(long, default_value_t = 1.0)]
    mass: f64,

    /// Accretion disk color scheme
    #[arg(long, value_enum, default_value = "blue")]
    color_mode: ColorModeArg,

    /// Disk emission strength
    #[arg(long, default_value_t = 4.0)]
    color_intensity: f64,

    /// Rays per pixel (jittered when > 1)
    #[arg(long, default_value_t = 1)]
    samples: u32,

    /// Nominal integration step size
    #[arg(long, default_value_t = 0.1)]
    step_size: f64,

    /// Maximum ray travel distance
    #[arg(long, default_value_t = 100.0)]
    max_dist: f64,

    /// Cinematic camera path
    #[arg(long, value_enum, default_value = "orbit")]
    camera: CameraPath,

    /// Vertical field of view in degrees
    #[arg(long, default_value_t = 60.0)]
    fov: f64,

    /// Directory for the rendered frames
    #[arg(long, default_value = "frames")]
    out: PathBuf,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ColorModeArg {
    Blue,
    Orange,
    Red,
    White,
}

impl From<ColorModeArg> for ColorMode {
    fn from(arg: ColorModeArg) -> Self {
        match arg {
            ColorModeArg::Blue => ColorMode::Blue,
            ColorModeArg::Orange => ColorMode::Orange,
            ColorModeArg::Red => ColorMode::Red,
            ColorModeArg::White => ColorMode::White,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum CameraPath {
    Orbit,
    Wave,
    Spiral,
    Flyby,
}

impl From<CameraPath> for CinematicMode {
    fn from(arg: CameraPath) -> Self {
        match arg {
            CameraPath::Orbit => CinematicMode::SmoothOrbit,
            CameraPath::Wave => CinematicMode::WaveMotion,
            CameraPath::Spiral => CinematicMode::RisingSpiral,
            CameraPath::Flyby => CinematicMode::CloseFlyby,
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let (width, height) = match &args.resolution {
        Some(label) => {
            let preset = Resolution::by_label(label)
                .with_context(|| format!("unknown resolution preset `{label}`"))?;
            (preset.width, preset.height)
        }
        None => (args.width, args.height),
    };

    let trace = TraceConfig {
        step_size: args.step_size,
        max_dist: args.max_dist,
        color_mode: args.color_mode.into(),
        color_intensity: args.color_intensity,
    };
    let black_hole = BlackHole::new(args.mass);
    let mut camera = Camera::new(
        DVec3::new(0.0, 3.0, -20.0),
        DVec3::ZERO,
        args.fov.to_radians(),
    );
    let mut cinematic = CinematicCamera::new(args.camera.into());
    let mut renderer = CpuRenderer::new(RenderParams {
        width,
        height,
        samples_per_pixel: args.samples,
        trace,
    });

    fs::create_dir_all(&args.out)
        .with_context(|| format!("creating output directory {}", args.out.display()))?;

    log::info!(
        "rendering {} frame(s) at {}x{}, mass {} (rs {}), path {}",
        args.frames,
        width,
        height,
        black_hole.mass,
        black_hole.rs,
        cinematic.mode().name()
    );

    for frame in 0..args.frames {
        cinematic.update(&mut camera, FRAME_DT);
        let buffer = renderer.render(&camera, &black_hole);

        let frame_path = args.out.join(format!("frame_{frame:04}.png"));
        image::RgbaImage::from_raw(width, height, buffer.as_bytes().to_vec())
            .context("framebuffer size mismatch")?
            .save(&frame_path)
            .with_context(|| format!("writing {}", frame_path.display()))?;

        log::info!("frame {}/{} -> {}", frame + 1, args.frames, frame_path.display());
    }

    let stats = renderer.stats();
    log::info!(
        "done: {} frames, {} rays, {:.2} s total render time",
        stats.frames_rendered,
        stats.rays_traced,
        stats.total_render_time.as_secs_f64()
    );

    Ok(())
}
