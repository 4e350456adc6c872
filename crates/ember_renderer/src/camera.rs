//! Thin-lens camera for ray generation.

use std::sync::atomic::{AtomicU32, Ordering};

use crate::Ray;
use ember_core::CameraSettings;
use ember_math::{random_in_unit_disk, Point3, Vec3};
use rand::RngCore;

/// Camera mapping normalized image coordinates to world-space rays.
///
/// The viewport basis is fixed at construction. Only the lens radius can
/// change afterwards, and it is stored as raw `f32` bits in an atomic so a
/// render worker reading it mid-pass sees either the old or the new value.
#[derive(Debug)]
pub struct Camera {
    origin: Point3,
    lower_left_corner: Point3,
    horizontal: Vec3,
    vertical: Vec3,
    unit_horizontal: Vec3,
    unit_vertical: Vec3,
    lens_radius: AtomicU32,
}

impl Camera {
    /// Create a camera.
    ///
    /// - `look_dir`: direction the camera faces (any length but zero)
    /// - `roll`: rotation about the view axis in degrees
    /// - `vfov`: vertical field of view in degrees
    /// - `focus_dist`: distance to the plane of perfect focus, which is also
    ///   where the viewport sits
    pub fn new(
        origin: Point3,
        look_dir: Vec3,
        roll: f32,
        vfov: f32,
        aspect_ratio: f32,
        focus_dist: f32,
        lens_radius: f32,
    ) -> Self {
        let viewport_height = 2.0 * focus_dist * (vfov.to_radians() / 2.0).tan();
        let viewport_width = aspect_ratio * viewport_height;

        let roll = roll.to_radians();
        let view_up = Vec3::new(-roll.sin(), roll.cos(), 0.0);
        let unit_look_dir = look_dir.normalize();
        let unit_horizontal = view_up.cross(-unit_look_dir).normalize();
        let unit_vertical = (-unit_look_dir).cross(unit_horizontal);

        let horizontal = viewport_width * unit_horizontal;
        let vertical = viewport_height * unit_vertical;
        let lower_left_corner =
            origin - horizontal / 2.0 - vertical / 2.0 + unit_look_dir * focus_dist;

        Self {
            origin,
            lower_left_corner,
            horizontal,
            vertical,
            unit_horizontal,
            unit_vertical,
            lens_radius: AtomicU32::new(lens_radius.to_bits()),
        }
    }

    /// Build a camera from settings for an image of the given aspect ratio.
    pub fn from_settings(settings: &CameraSettings, aspect_ratio: f32) -> Self {
        Self::new(
            settings.look_from,
            settings.look_dir(),
            settings.roll,
            settings.vfov,
            aspect_ratio,
            settings.focus_dist,
            settings.lens_radius,
        )
    }

    /// Generate a ray through image-plane point `(u, v)`, both in [0, 1]
    /// with `v = 0` at the bottom edge.
    pub fn get_ray(&self, u: f32, v: f32, rng: &mut dyn RngCore) -> Ray {
        let lens_radius = self.lens_radius();
        let offset = if lens_radius > 0.0 {
            let rd = lens_radius * random_in_unit_disk(rng);
            self.unit_horizontal * rd.x + self.unit_vertical * rd.y
        } else {
            Vec3::ZERO
        };

        let target = self.lower_left_corner + u * self.horizontal + v * self.vertical;
        let ray_origin = self.origin + offset;
        Ray::new(ray_origin, target - ray_origin)
    }

    pub fn origin(&self) -> Point3 {
        self.origin
    }

    pub fn lens_radius(&self) -> f32 {
        f32::from_bits(self.lens_radius.load(Ordering::Relaxed))
    }

    /// Change the aperture. Safe to call while a pass is reading it.
    pub fn set_lens_radius(&self, radius: f32) {
        self.lens_radius.store(radius.to_bits(), Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::Arc;

    fn pinhole() -> Camera {
        Camera::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0), 0.0, 90.0, 2.0, 1.0, 0.0)
    }

    #[test]
    fn test_viewport_basis() {
        let camera = pinhole();

        // 90 degree vfov at focus 1 gives a 2 unit tall viewport
        assert!((camera.vertical - Vec3::new(0.0, 2.0, 0.0)).length() < 1e-5);
        assert!((camera.horizontal - Vec3::new(4.0, 0.0, 0.0)).length() < 1e-5);
        assert!((camera.lower_left_corner - Vec3::new(-2.0, -1.0, -1.0)).length() < 1e-5);
    }

    #[test]
    fn test_center_ray_points_forward() {
        let camera = pinhole();
        let mut rng = StdRng::seed_from_u64(42);

        let ray = camera.get_ray(0.5, 0.5, &mut rng);

        assert_eq!(ray.origin(), Vec3::ZERO);
        assert!((ray.direction().normalize() - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-5);
    }

    #[test]
    fn test_corner_ray_hits_lower_left() {
        let camera = pinhole();
        let mut rng = StdRng::seed_from_u64(42);

        let ray = camera.get_ray(0.0, 0.0, &mut rng);
        assert!((ray.at(1.0) - Vec3::new(-2.0, -1.0, -1.0)).length() < 1e-5);
    }

    #[test]
    fn test_roll_rotates_up_vector() {
        let camera = Camera::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0), 90.0, 90.0, 1.0, 1.0, 0.0);

        // Rolled a quarter turn, the image's "up" lies along -X
        assert!((camera.unit_vertical - Vec3::new(-1.0, 0.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_lens_offsets_origin_and_keeps_focus() {
        let camera = Camera::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0), 0.0, 90.0, 1.0, 5.0, 0.5);
        let mut rng = StdRng::seed_from_u64(3);

        for _ in 0..100 {
            let ray = camera.get_ray(0.5, 0.5, &mut rng);
            assert!(ray.origin().length() < 0.5);
            assert_eq!(ray.origin().z, 0.0);
            // Every lens sample converges on the focal plane point
            assert!((ray.at(1.0) - Vec3::new(0.0, 0.0, -5.0)).length() < 1e-4);
        }
    }

    #[test]
    fn test_lens_radius_shared_update() {
        let camera = Arc::new(pinhole());
        let writer = Arc::clone(&camera);

        std::thread::spawn(move || writer.set_lens_radius(0.25))
            .join()
            .unwrap();

        assert_eq!(camera.lens_radius(), 0.25);
    }

    #[test]
    fn test_from_settings() {
        let settings = CameraSettings::default();
        let camera = Camera::from_settings(&settings, 1.5);

        assert_eq!(camera.origin(), settings.look_from);
        assert_eq!(camera.lens_radius(), settings.lens_radius);
    }
}
