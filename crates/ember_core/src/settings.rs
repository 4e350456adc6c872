//! Render and camera settings.
//!
//! Settings are plain data with serde support so they can be loaded from a
//! JSON file and overridden from the command line. Missing fields fall back
//! to `Default`.

use std::path::Path;

use ember_math::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::SettingsError;

/// Image and sampling settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Number of accumulated samples per pixel to converge to
    pub samples: u32,
    /// Maximum ray bounce depth
    pub max_depth: u32,
    /// Base seed for every per-pixel generator
    pub seed: u64,
    /// Size of a dedicated worker pool; `None` uses the global rayon pool
    pub threads: Option<usize>,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            width: 600,
            height: 400,
            samples: 1,
            max_depth: 10,
            seed: 0,
            threads: None,
        }
    }
}

impl RenderSettings {
    /// Width over height.
    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.width == 0 || self.height == 0 {
            return Err(SettingsError::InvalidResolution {
                width: self.width,
                height: self.height,
            });
        }
        if self.threads == Some(0) {
            return Err(SettingsError::NoThreads);
        }
        Ok(())
    }
}

/// Camera placement and lens.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    pub look_from: Vec3,
    pub look_at: Vec3,
    /// Rotation about the view axis in degrees
    pub roll: f32,
    /// Vertical field of view in degrees
    pub vfov: f32,
    /// Thin lens radius, 0 for a pinhole camera
    pub lens_radius: f32,
    /// Distance from the camera to the plane of perfect focus
    pub focus_dist: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            look_from: Vec3::new(13.0, 2.0, 3.0),
            look_at: Vec3::ZERO,
            roll: 0.0,
            vfov: 20.0,
            lens_radius: 0.05,
            focus_dist: 10.0,
        }
    }
}

impl CameraSettings {
    /// Direction from `look_from` towards `look_at`.
    pub fn look_dir(&self) -> Vec3 {
        self.look_at - self.look_from
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if !(self.vfov > 0.0 && self.vfov < 180.0) {
            return Err(SettingsError::InvalidFieldOfView(self.vfov));
        }
        if !(self.focus_dist > 0.0) {
            return Err(SettingsError::InvalidFocusDistance(self.focus_dist));
        }
        if !(self.lens_radius >= 0.0) {
            return Err(SettingsError::InvalidLensRadius(self.lens_radius));
        }
        if self.look_dir().length_squared() == 0.0 {
            return Err(SettingsError::DegenerateView);
        }
        Ok(())
    }
}

/// Everything needed to set up a render session.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub render: RenderSettings,
    pub camera: CameraSettings,
}

impl Settings {
    /// Parse settings from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(json)?;
        Ok(settings)
    }

    /// Load settings from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        self.render.validate()?;
        self.camera.validate()
    }
}
