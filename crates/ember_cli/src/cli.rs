use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use ember_core::Settings;
use log::LevelFilter;

/// Log levels accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

/// Where the scene comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SceneSource {
    /// The classic random sphere field, seeded from the render seed
    Random,
    TwoSpheres,
    HollowGlass,
    File(PathBuf),
}

#[derive(Debug, Parser)]
#[command(name = "ember")]
#[command(about = "A progressive CPU path tracer")]
pub struct Args {
    /// JSON settings file; flags below override its values
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Scene to render: random, two-spheres, hollow-glass or a JSON scene file
    #[arg(long, default_value = "random")]
    pub scene: String,

    /// Image width in pixels
    #[arg(long)]
    pub width: Option<u32>,

    /// Image height in pixels
    #[arg(long)]
    pub height: Option<u32>,

    /// Number of samples per pixel
    #[arg(short, long)]
    pub samples: Option<u32>,

    /// Maximum ray bounce depth
    #[arg(long)]
    pub max_depth: Option<u32>,

    /// Thin lens radius, 0 for a pinhole camera
    #[arg(long)]
    pub lens_radius: Option<f32>,

    /// Base random seed
    #[arg(long)]
    pub seed: Option<u64>,

    /// Size of a dedicated render thread pool
    #[arg(long)]
    pub threads: Option<usize>,

    /// Output PPM path, "-" for stdout
    #[arg(short, long, default_value = "image.ppm")]
    pub output: String,

    /// Converge on a background session, logging every frame
    #[arg(long)]
    pub progressive: bool,

    #[arg(long, default_value = "info", help = "Set the logging level")]
    pub log_level: LogLevel,
}

impl Args {
    /// Apply command line overrides on top of `settings`.
    pub fn apply(&self, settings: &mut Settings) {
        let render = &mut settings.render;
        if let Some(width) = self.width {
            render.width = width;
        }
        if let Some(height) = self.height {
            render.height = height;
        }
        if let Some(samples) = self.samples {
            render.samples = samples;
        }
        if let Some(max_depth) = self.max_depth {
            render.max_depth = max_depth;
        }
        if let Some(seed) = self.seed {
            render.seed = seed;
        }
        if self.threads.is_some() {
            render.threads = self.threads;
        }
        if let Some(lens_radius) = self.lens_radius {
            settings.camera.lens_radius = lens_radius;
        }
    }

    pub fn scene_source(&self) -> SceneSource {
        match self.scene.as_str() {
            "random" => SceneSource::Random,
            "two-spheres" => SceneSource::TwoSpheres,
            "hollow-glass" => SceneSource::HollowGlass,
            path => SceneSource::File(PathBuf::from(path)),
        }
    }

    pub fn writes_to_stdout(&self) -> bool {
        self.output == "-"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_leave_settings_alone() {
        let args = Args::try_parse_from(["ember"]).unwrap();
        let mut settings = Settings::default();
        args.apply(&mut settings);

        assert_eq!(settings, Settings::default());
        assert_eq!(args.scene_source(), SceneSource::Random);
        assert_eq!(args.log_level, LogLevel::Info);
        assert!(!args.progressive);
        assert!(!args.writes_to_stdout());
    }

    #[test]
    fn test_flags_override_settings() {
        let args = Args::try_parse_from([
            "ember",
            "--width",
            "20",
            "--height",
            "15",
            "-s",
            "4",
            "--max-depth",
            "2",
            "--lens-radius",
            "0",
            "--seed",
            "9",
            "--threads",
            "2",
        ])
        .unwrap();
        let mut settings = Settings::default();
        args.apply(&mut settings);

        assert_eq!((settings.render.width, settings.render.height), (20, 15));
        assert_eq!(settings.render.samples, 4);
        assert_eq!(settings.render.max_depth, 2);
        assert_eq!(settings.render.seed, 9);
        assert_eq!(settings.render.threads, Some(2));
        assert_eq!(settings.camera.lens_radius, 0.0);
    }

    #[test]
    fn test_scene_sources() {
        let parse = |scene: &str| {
            Args::try_parse_from(["ember", "--scene", scene])
                .unwrap()
                .scene_source()
        };

        assert_eq!(parse("two-spheres"), SceneSource::TwoSpheres);
        assert_eq!(parse("hollow-glass"), SceneSource::HollowGlass);
        assert_eq!(
            parse("scenes/glass.json"),
            SceneSource::File(PathBuf::from("scenes/glass.json"))
        );
    }

    #[test]
    fn test_stdout_and_log_level() {
        let args =
            Args::try_parse_from(["ember", "-o", "-", "--log-level", "debug", "--progressive"])
                .unwrap();

        assert!(args.writes_to_stdout());
        assert!(args.progressive);
        assert_eq!(LevelFilter::from(args.log_level), LevelFilter::Debug);
    }
}
