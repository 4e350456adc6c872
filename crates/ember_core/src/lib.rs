//! Ember Core - renderer-agnostic scene descriptions and settings.
//!
//! This crate provides:
//!
//! - **Settings**: `RenderSettings`, `CameraSettings`, loadable from JSON
//! - **Scene descriptions**: a material arena plus spheres that reference
//!   materials by index
//! - **Demo scenes**: the classic random sphere field and a minimal two-sphere scene
//!
//! # Example
//!
//! ```ignore
//! use ember_core::{demo, Settings};
//!
//! let settings = Settings::load("ember.json")?;
//! let scene = demo::random_scene(42);
//! println!("{} spheres, {} materials", scene.spheres.len(), scene.materials.len());
//! ```

pub mod demo;
pub mod error;
pub mod scene;
pub mod settings;

// Re-export commonly used types
pub use error::{SceneError, SettingsError};
pub use scene::{MaterialDescription, SceneDescription, SphereDescription};
pub use settings::{CameraSettings, RenderSettings, Settings};
