//! Error types for settings and scene loading.

use thiserror::Error;

/// Errors that can occur while loading or validating settings.
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid resolution {width}x{height}")]
    InvalidResolution { width: u32, height: u32 },

    #[error("Vertical field of view must be in (0, 180) degrees, got {0}")]
    InvalidFieldOfView(f32),

    #[error("Focus distance must be positive, got {0}")]
    InvalidFocusDistance(f32),

    #[error("Lens radius must be non-negative, got {0}")]
    InvalidLensRadius(f32),

    #[error("Camera look_from and look_at coincide")]
    DegenerateView,

    #[error("Thread count must be at least 1")]
    NoThreads,
}

/// Errors that can occur while loading or validating a scene description.
#[derive(Error, Debug)]
pub enum SceneError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Sphere {sphere} references unknown material {material}")]
    UnknownMaterial { sphere: usize, material: usize },

    #[error("Material {0} has a non-positive refractive index")]
    InvalidRefractiveIndex(usize),

    #[error("Material {0} has a negative fuzz")]
    NegativeFuzz(usize),

    #[error("Sphere {0} has zero radius")]
    ZeroRadius(usize),
}
