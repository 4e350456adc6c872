//! Scene description types.
//!
//! A description is an arena of materials plus an ordered list of spheres
//! that refer to materials by index. It is immutable input to the renderer;
//! the renderer builds its own intersectable primitives from it.

use std::path::Path;

use ember_math::{Color, Point3};
use serde::{Deserialize, Serialize};

use crate::error::SceneError;

/// Surface material.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MaterialDescription {
    /// Diffuse surface
    Lambertian { albedo: Color },
    /// Reflective surface; `fuzz` perturbs the mirror direction
    Metal { albedo: Color, fuzz: f32 },
    /// Refractive surface such as glass (ior 1.5) or diamond (ior 2.4)
    Dielectric { ior: f32 },
}

/// A sphere referencing a material in the scene's material arena.
///
/// A negative radius keeps the geometry but flips the surface normal inward,
/// which is how hollow glass shells are built.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SphereDescription {
    pub center: Point3,
    pub radius: f32,
    pub material: usize,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneDescription {
    pub materials: Vec<MaterialDescription>,
    pub spheres: Vec<SphereDescription>,
}

impl SceneDescription {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a material and return its index.
    pub fn add_material(&mut self, material: MaterialDescription) -> usize {
        self.materials.push(material);
        self.materials.len() - 1
    }

    /// Append a sphere. Insertion order is preserved.
    pub fn add_sphere(&mut self, center: Point3, radius: f32, material: usize) {
        self.spheres.push(SphereDescription {
            center,
            radius,
            material,
        });
    }

    /// Check that every index resolves and every material is physical.
    pub fn validate(&self) -> Result<(), SceneError> {
        for (i, material) in self.materials.iter().enumerate() {
            match *material {
                MaterialDescription::Metal { fuzz, .. } if fuzz < 0.0 => {
                    return Err(SceneError::NegativeFuzz(i));
                }
                MaterialDescription::Dielectric { ior } if !(ior > 0.0) => {
                    return Err(SceneError::InvalidRefractiveIndex(i));
                }
                _ => {}
            }
        }

        for (i, sphere) in self.spheres.iter().enumerate() {
            if sphere.material >= self.materials.len() {
                return Err(SceneError::UnknownMaterial {
                    sphere: i,
                    material: sphere.material,
                });
            }
            if sphere.radius == 0.0 {
                return Err(SceneError::ZeroRadius(i));
            }
        }

        Ok(())
    }

    /// Parse a scene from JSON and validate it.
    pub fn from_json(json: &str) -> Result<Self, SceneError> {
        let scene: SceneDescription = serde_json::from_str(json)?;
        scene.validate()?;
        Ok(scene)
    }

    /// Load a scene from a JSON file and validate it.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SceneError> {
        let path = path.as_ref();
        let scene = Self::from_json(&std::fs::read_to_string(path)?)?;
        log::info!(
            "Loaded {} spheres and {} materials from {}",
            scene.spheres.len(),
            scene.materials.len(),
            path.display()
        );
        Ok(scene)
    }
}
