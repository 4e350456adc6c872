//! Conversion from scene descriptions to renderable primitives.

use std::sync::Arc;

use crate::{Dielectric, HittableList, Lambertian, Material, Metal, Sphere};
use ember_core::{MaterialDescription, SceneDescription, SceneError};

fn material_from_description(description: &MaterialDescription) -> Arc<dyn Material> {
    match *description {
        MaterialDescription::Lambertian { albedo } => Arc::new(Lambertian::new(albedo)),
        MaterialDescription::Metal { albedo, fuzz } => Arc::new(Metal::new(albedo, fuzz)),
        MaterialDescription::Dielectric { ior } => Arc::new(Dielectric::new(ior)),
    }
}

/// Build the flat primitive list for a scene.
///
/// Materials are created once and shared by every sphere that references
/// them. Sphere order is preserved.
pub fn build_world(scene: &SceneDescription) -> Result<HittableList, SceneError> {
    scene.validate()?;

    let materials: Vec<Arc<dyn Material>> = scene
        .materials
        .iter()
        .map(material_from_description)
        .collect();

    let mut world = HittableList::new();
    for sphere in &scene.spheres {
        world.add(Box::new(Sphere::new(
            sphere.center,
            sphere.radius,
            Arc::clone(&materials[sphere.material]),
        )));
    }

    log::debug!(
        "Built world with {} spheres sharing {} materials",
        world.len(),
        materials.len()
    );
    Ok(world)
}
