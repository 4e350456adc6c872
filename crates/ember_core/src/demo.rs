//! Built-in demo scenes.

use ember_math::{Color, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::scene::{MaterialDescription, SceneDescription};

/// The classic "final scene": a huge ground sphere, a 22x22 field of small
/// randomly placed spheres, and three large feature spheres.
///
/// The layout depends only on `seed`.
pub fn random_scene(seed: u64) -> SceneDescription {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut scene = SceneDescription::new();

    let ground = scene.add_material(MaterialDescription::Lambertian {
        albedo: Color::splat(0.5),
    });
    scene.add_sphere(Vec3::new(0.0, -1000.0, 0.0), 1000.0, ground);

    for a in -11..11 {
        for b in -11..11 {
            let choose_mat: f32 = rng.gen();
            let center = Vec3::new(
                a as f32 + 0.9 * rng.gen::<f32>(),
                0.2,
                b as f32 + 0.9 * rng.gen::<f32>(),
            );

            if (center - Vec3::new(4.0, 0.2, 0.0)).length() <= 0.9 {
                continue;
            }

            let material = if choose_mat < 0.8 {
                let albedo = random_color(&mut rng, 0.0, 1.0) * random_color(&mut rng, 0.0, 1.0);
                MaterialDescription::Lambertian { albedo }
            } else if choose_mat < 0.95 {
                MaterialDescription::Metal {
                    albedo: random_color(&mut rng, 0.5, 1.0),
                    fuzz: rng.gen_range(0.0..0.5),
                }
            } else {
                MaterialDescription::Dielectric { ior: 1.5 }
            };
            let index = scene.add_material(material);
            scene.add_sphere(center, 0.2, index);
        }
    }

    let glass = scene.add_material(MaterialDescription::Dielectric { ior: 1.5 });
    scene.add_sphere(Vec3::new(0.0, 1.0, 0.0), 1.0, glass);

    let diffuse = scene.add_material(MaterialDescription::Lambertian {
        albedo: Color::new(0.4, 0.2, 0.1),
    });
    scene.add_sphere(Vec3::new(-4.0, 1.0, 0.0), 1.0, diffuse);

    let metal = scene.add_material(MaterialDescription::Metal {
        albedo: Color::new(0.7, 0.6, 0.5),
        fuzz: 0.0,
    });
    scene.add_sphere(Vec3::new(4.0, 1.0, 0.0), 1.0, metal);

    scene
}

/// A ground sphere and one diffuse sphere resting on it.
pub fn two_spheres() -> SceneDescription {
    let mut scene = SceneDescription::new();
    let ground = scene.add_material(MaterialDescription::Lambertian {
        albedo: Color::new(0.8, 0.8, 0.0),
    });
    let center = scene.add_material(MaterialDescription::Lambertian {
        albedo: Color::new(0.7, 0.3, 0.3),
    });
    scene.add_sphere(Vec3::new(0.0, -100.5, -1.0), 100.0, ground);
    scene.add_sphere(Vec3::new(0.0, 0.0, -1.0), 0.5, center);
    scene
}

/// Glass shell demo: a negative-radius sphere inside a positive one makes a
/// hollow bubble between a diffuse and a metal sphere.
pub fn hollow_glass() -> SceneDescription {
    let mut scene = SceneDescription::new();
    let ground = scene.add_material(MaterialDescription::Lambertian {
        albedo: Color::new(0.8, 0.8, 0.0),
    });
    let center = scene.add_material(MaterialDescription::Lambertian {
        albedo: Color::new(0.1, 0.2, 0.5),
    });
    let glass = scene.add_material(MaterialDescription::Dielectric { ior: 1.5 });
    let metal = scene.add_material(MaterialDescription::Metal {
        albedo: Color::new(0.8, 0.6, 0.2),
        fuzz: 0.0,
    });

    scene.add_sphere(Vec3::new(0.0, -100.5, -1.0), 100.0, ground);
    scene.add_sphere(Vec3::new(0.0, 0.0, -1.0), 0.5, center);
    scene.add_sphere(Vec3::new(-1.0, 0.0, -1.0), 0.5, glass);
    scene.add_sphere(Vec3::new(-1.0, 0.0, -1.0), -0.45, glass);
    scene.add_sphere(Vec3::new(1.0, 0.0, -1.0), 0.5, metal);
    scene
}

fn random_color(rng: &mut StdRng, min: f32, max: f32) -> Color {
    Color::new(
        rng.gen_range(min..max),
        rng.gen_range(min..max),
        rng.gen_range(min..max),
    )
}
