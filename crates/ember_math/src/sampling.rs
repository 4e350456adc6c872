//! Uniform random sampling routines.
//!
//! Every routine takes the generator explicitly so that callers control
//! seeding; nothing here touches a global or thread-local RNG.

use crate::Vec3;
use rand::Rng;

/// Components smaller than this count as zero for degenerate-direction checks.
const NEAR_ZERO: f32 = 1e-8;

/// Uniform f32 in [0, 1).
#[inline]
pub fn gen_f32<R: Rng + ?Sized>(rng: &mut R) -> f32 {
    rng.gen::<f32>()
}

/// Uniform point strictly inside the unit sphere (rejection sampled).
pub fn random_in_unit_sphere<R: Rng + ?Sized>(rng: &mut R) -> Vec3 {
    loop {
        let p = Vec3::new(
            gen_f32(rng) * 2.0 - 1.0,
            gen_f32(rng) * 2.0 - 1.0,
            gen_f32(rng) * 2.0 - 1.0,
        );
        if p.length_squared() < 1.0 {
            return p;
        }
    }
}

/// Uniform direction on the unit sphere.
pub fn random_unit_vector<R: Rng + ?Sized>(rng: &mut R) -> Vec3 {
    loop {
        let p = random_in_unit_sphere(rng);
        let len_sq = p.length_squared();
        // Normalizing a near-origin sample loses precision
        if len_sq > 1e-6 {
            return p / len_sq.sqrt();
        }
    }
}

/// Uniform point strictly inside the unit disk in the z = 0 plane.
pub fn random_in_unit_disk<R: Rng + ?Sized>(rng: &mut R) -> Vec3 {
    loop {
        let p = Vec3::new(gen_f32(rng) * 2.0 - 1.0, gen_f32(rng) * 2.0 - 1.0, 0.0);
        if p.length_squared() < 1.0 {
            return p;
        }
    }
}

/// True if every component of `v` is close to zero.
#[inline]
pub fn near_zero(v: Vec3) -> bool {
    v.abs().max_element() < NEAR_ZERO
}
