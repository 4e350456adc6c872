//! Ember Renderer - progressive CPU path tracing.
//!
//! A Monte Carlo path tracer that accumulates one sample per pixel per pass,
//! plus an orchestrator that keeps a render converging on a background
//! thread while its parameters are edited.

mod camera;
mod error;
mod frame;
mod hittable;
mod material;
pub mod orchestrator;
mod output;
mod renderer;
mod sphere;
mod world;

pub use camera::Camera;
pub use error::RenderError;
pub use frame::{color_to_rgba, linear_to_gamma, Frame};
pub use hittable::{HitRecord, Hittable, HittableList};
pub use material::{Dielectric, Lambertian, Material, Metal, ScatterResult};
pub use orchestrator::{FrameSink, LatestFrame, Orchestrator, ParameterEvent, ParameterListener};
pub use output::{save_ppm, write_ppm};
pub use renderer::{ray_color, sky_gradient, RenderHandle, Renderer};
pub use sphere::Sphere;
pub use world::build_world;

/// Re-export math types from ember_math
pub use ember_math::{Color, Interval, Point3, Ray, Vec3};
