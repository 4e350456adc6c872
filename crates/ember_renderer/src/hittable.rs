//! Hittable trait and HitRecord for ray-object intersection.

use crate::{Material, Ray};
use ember_math::{Interval, Vec3};

/// Record of a ray-object intersection.
#[derive(Clone, Copy)]
pub struct HitRecord<'a> {
    /// Point of intersection
    pub p: Vec3,
    /// Surface normal at intersection (always points against ray)
    pub normal: Vec3,
    /// Parameter t where the intersection occurs
    pub t: f32,
    /// Whether the ray hit the front face (outside) of the surface
    pub front_face: bool,
    /// Material of the primitive that was hit
    pub material: &'a dyn Material,
}

impl<'a> HitRecord<'a> {
    /// Build a record, orienting the normal against the incoming ray.
    ///
    /// If the ray and the outward normal point the same way the ray started
    /// inside the surface, so the stored normal is flipped.
    pub fn new(
        ray: &Ray,
        p: Vec3,
        outward_normal: Vec3,
        t: f32,
        material: &'a dyn Material,
    ) -> Self {
        let front_face = ray.direction().dot(outward_normal) < 0.0;
        let normal = if front_face {
            outward_normal
        } else {
            -outward_normal
        };

        Self {
            p,
            normal,
            t,
            front_face,
            material,
        }
    }
}

/// Trait for objects that can be hit by rays.
pub trait Hittable: Send + Sync {
    /// Nearest intersection with `t` inside `ray_t`, if any.
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>>;
}

/// An insertion-ordered list of hittable objects, scanned linearly.
pub struct HittableList {
    objects: Vec<Box<dyn Hittable>>,
}

impl HittableList {
    /// Create a new empty hittable list.
    pub fn new() -> Self {
        Self {
            objects: Vec::new(),
        }
    }

    /// Add an object to the list.
    pub fn add(&mut self, object: Box<dyn Hittable>) {
        self.objects.push(object);
    }

    /// Get the number of objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Check if the list is empty.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

impl Default for HittableList {
    fn default() -> Self {
        Self::new()
    }
}

impl Hittable for HittableList {
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>> {
        let mut closest = None;
        let mut window = ray_t;

        // The window's upper bound is exclusive, so a later object at the
        // same t never displaces the first one found.
        for object in &self.objects {
            if let Some(rec) = object.hit(ray, window) {
                window = window.with_max(rec.t);
                closest = Some(rec);
            }
        }

        closest
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Color, Lambertian, Sphere};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::Arc;

    fn sphere(z: f32, albedo: Color) -> Box<dyn Hittable> {
        Box::new(Sphere::new(
            Vec3::new(0.0, 0.0, z),
            0.5,
            Arc::new(Lambertian::new(albedo)),
        ))
    }

    #[test]
    fn test_list_returns_nearest() {
        let mut list = HittableList::new();
        list.add(sphere(-5.0, Color::X));
        list.add(sphere(-2.0, Color::Y));
        list.add(sphere(-8.0, Color::Z));

        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        let rec = list.hit(&ray, Interval::new(0.001, f32::INFINITY)).unwrap();

        assert!((rec.t - 1.5).abs() < 1e-5);
        assert_eq!(list.len(), 3);
    }

    #[test]
    fn test_equal_t_keeps_first_found() {
        let mut list = HittableList::new();
        list.add(sphere(-2.0, Color::X));
        list.add(sphere(-2.0, Color::Y));

        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        let rec = list.hit(&ray, Interval::new(0.001, f32::INFINITY)).unwrap();

        let mut rng = StdRng::seed_from_u64(1);
        let scatter = rec.material.scatter(&ray, &rec, &mut rng).unwrap();
        assert_eq!(scatter.attenuation, Color::X);
    }

    #[test]
    fn test_empty_list_misses() {
        let list = HittableList::default();
        let ray = Ray::new(Vec3::ZERO, Vec3::X);

        assert!(list.is_empty());
        assert!(list.hit(&ray, Interval::UNIVERSE).is_none());
    }

    #[test]
    fn test_window_excludes_hits_beyond_max() {
        let mut list = HittableList::new();
        list.add(sphere(-5.0, Color::X));

        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        assert!(list.hit(&ray, Interval::new(0.001, 4.0)).is_none());
    }
}
