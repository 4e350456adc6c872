//! Vector, ray and sampling primitives for the Ember path tracer.
//!
//! Vectors come straight from `glam`; this crate adds the handful of
//! ray-tracing specific pieces on top of them.

// Re-export glam for convenience
pub use glam::*;

mod interval;
mod ray;
pub mod sampling;

pub use interval::Interval;
pub use ray::Ray;
pub use sampling::{gen_f32, near_zero, random_in_unit_disk, random_in_unit_sphere, random_unit_vector};

/// Linear RGB color. Components are nominally in [0, 1] but may exceed it
/// while accumulating.
pub type Color = Vec3;

/// Point in world space.
pub type Point3 = Vec3;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec3_operations() {
        let a = Vec3::new(1.0, 2.0, 3.0);
        let b = Vec3::new(4.0, 5.0, 6.0);
        assert_eq!(a + b, Vec3::new(5.0, 7.0, 9.0));
        assert_eq!(a.dot(b), 32.0);
        assert_eq!(a.cross(b), Vec3::new(-3.0, 6.0, -3.0));
        assert!((Vec3::new(3.0, 0.0, 4.0).normalize().length() - 1.0).abs() < 1e-6);
    }
}
