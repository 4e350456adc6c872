//! Progressive path tracing renderer.
//!
//! Each call to [`Renderer::render`] adds exactly one sample to every pixel:
//! - Pixels are traced in parallel with rayon, each from its own seeded RNG
//! - A pass can be interrupted from another thread and is then discarded whole
//! - Completed passes fold into a running sum and produce a [`Frame`]

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::{Camera, Color, Frame, Hittable, Ray, RenderError};
use ember_core::RenderSettings;
use ember_math::{gen_f32, Interval};
use rand::rngs::SmallRng;
use rand::{RngCore, SeedableRng};
use rayon::prelude::*;

/// Compute the color seen by a ray.
///
/// Traces the ray through the world, bouncing off surfaces up to `depth`
/// times. Rays that escape pick up the sky gradient; absorbed rays and rays
/// out of bounces contribute black.
pub fn ray_color(ray: &Ray, world: &dyn Hittable, depth: u32, rng: &mut dyn RngCore) -> Color {
    if depth == 0 {
        return Color::ZERO;
    }

    // Start slightly off the surface to avoid shadow acne
    let Some(rec) = world.hit(ray, Interval::new(0.001, f32::INFINITY)) else {
        return sky_gradient(ray);
    };

    match rec.material.scatter(ray, &rec, rng) {
        Some(result) => result.attenuation * ray_color(&result.scattered, world, depth - 1, rng),
        None => Color::ZERO,
    }
}

/// Background seen by escaping rays: white at the horizon below, pale blue above.
pub fn sky_gradient(ray: &Ray) -> Color {
    let unit_direction = ray.direction().normalize();
    let a = 0.5 * (unit_direction.y + 1.0);
    let white = Color::new(1.0, 1.0, 1.0);
    let blue = Color::new(0.5, 0.7, 1.0);
    white * (1.0 - a) + blue * a
}

/// Pass bookkeeping shared between the renderer and its handles.
#[derive(Debug, Default)]
struct PassControl {
    running: AtomicBool,
    interrupted: AtomicBool,
    samples: AtomicU32,
}

impl PassControl {
    fn begin(&self) {
        self.interrupted.store(false, Ordering::SeqCst);
        self.running.store(true, Ordering::SeqCst);
    }

    /// Ends the pass; true if an interrupt landed while it was running.
    fn finish(&self) -> bool {
        self.running.store(false, Ordering::SeqCst);
        self.interrupted.swap(false, Ordering::SeqCst)
    }

    fn is_interrupted(&self) -> bool {
        self.interrupted.load(Ordering::Relaxed)
    }
}

/// Cross-thread view of a [`Renderer`]: interrupt it and watch its progress.
#[derive(Debug, Clone)]
pub struct RenderHandle {
    control: Arc<PassControl>,
}

impl RenderHandle {
    /// Ask the running pass to stop. Does nothing if no pass is running.
    ///
    /// Returns whether a running pass was flagged.
    pub fn interrupt(&self) -> bool {
        if self.control.running.load(Ordering::SeqCst) {
            self.control.interrupted.store(true, Ordering::SeqCst);
            true
        } else {
            false
        }
    }

    pub fn is_running(&self) -> bool {
        self.control.running.load(Ordering::SeqCst)
    }

    pub fn samples_accumulated(&self) -> u32 {
        self.control.samples.load(Ordering::SeqCst)
    }
}

/// Marker for a pass abandoned on interrupt.
#[derive(Debug)]
struct Interrupted;

/// Accumulating renderer.
///
/// Owns the running per-pixel sums. `render` and `reset` take `&mut self`,
/// so they can never overlap; interrupts go through a [`RenderHandle`].
pub struct Renderer {
    width: u32,
    height: u32,
    max_depth: u32,
    seed: u64,
    accumulation: Vec<Color>,
    samples_accumulated: u32,
    elapsed: Duration,
    control: Arc<PassControl>,
    pool: Option<rayon::ThreadPool>,
}

impl Renderer {
    /// Create a renderer with a zeroed accumulation buffer.
    pub fn new(width: u32, height: u32, max_depth: u32) -> Self {
        Self {
            width,
            height,
            max_depth,
            seed: 0,
            accumulation: vec![Color::ZERO; pixel_count(width, height)],
            samples_accumulated: 0,
            elapsed: Duration::ZERO,
            control: Arc::new(PassControl::default()),
            pool: None,
        }
    }

    /// Set the base seed for every per-pixel generator.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Run passes on a dedicated pool of `threads` workers instead of the
    /// global rayon pool.
    pub fn with_threads(mut self, threads: usize) -> Result<Self, RenderError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("ember-pixel-{i}"))
            .build()?;
        self.pool = Some(pool);
        Ok(self)
    }

    /// Create a renderer from validated settings.
    pub fn from_settings(settings: &RenderSettings) -> Result<Self, RenderError> {
        settings.validate()?;
        let renderer =
            Self::new(settings.width, settings.height, settings.max_depth).with_seed(settings.seed);
        match settings.threads {
            Some(threads) => renderer.with_threads(threads),
            None => Ok(renderer),
        }
    }

    pub fn handle(&self) -> RenderHandle {
        RenderHandle {
            control: Arc::clone(&self.control),
        }
    }

    /// Interrupt the running pass, if any. See [`RenderHandle::interrupt`].
    pub fn interrupt(&self) -> bool {
        self.handle().interrupt()
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    /// Change the bounce limit. Already accumulated samples keep the old
    /// limit, so callers normally `reset` as well.
    pub fn set_max_depth(&mut self, max_depth: u32) {
        self.max_depth = max_depth;
    }

    pub fn samples_accumulated(&self) -> u32 {
        self.samples_accumulated
    }

    /// Total wall time of every completed pass since the last reset.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Running per-pixel sums, row-major from the top-left.
    pub fn accumulation(&self) -> &[Color] {
        &self.accumulation
    }

    /// Zero the sums, the sample counter and the elapsed time.
    pub fn reset(&mut self) {
        self.accumulation.fill(Color::ZERO);
        self.samples_accumulated = 0;
        self.elapsed = Duration::ZERO;
        self.control.samples.store(0, Ordering::SeqCst);
        log::debug!("Accumulation reset");
    }

    /// Add one sample to every pixel.
    ///
    /// Returns the new running average, or `None` if the pass was
    /// interrupted, in which case nothing was accumulated.
    pub fn render(&mut self, camera: &Camera, world: &dyn Hittable) -> Option<Frame> {
        let pass = self.samples_accumulated;
        let start = Instant::now();

        let Some(samples) = self.trace_pass(camera, world, pass) else {
            log::debug!("Pass {} interrupted, discarded", pass + 1);
            return None;
        };

        let pass_time = start.elapsed();
        for (sum, sample) in self.accumulation.iter_mut().zip(&samples) {
            *sum += *sample;
        }
        self.samples_accumulated += 1;
        self.elapsed += pass_time;
        self.control
            .samples
            .store(self.samples_accumulated, Ordering::SeqCst);

        log::debug!(
            "Pass {} complete in {:?} ({:?} total)",
            self.samples_accumulated,
            pass_time,
            self.elapsed
        );

        Some(self.frame())
    }

    /// Snapshot of the current running average.
    pub fn frame(&self) -> Frame {
        Frame::from_sums(
            self.width,
            self.height,
            &self.accumulation,
            self.samples_accumulated,
            self.elapsed,
        )
    }

    /// Trace one jittered sample per pixel for pass number `pass` without
    /// touching the accumulation buffer.
    ///
    /// Every pixel seeds its own generator from the renderer seed, the pass
    /// number and the pixel index, so the result does not depend on how
    /// rayon schedules pixels. Returns `None` if interrupted.
    ///
    /// Passes on one renderer share its interrupt flag, hence `&mut self`.
    pub fn trace_pass(
        &mut self,
        camera: &Camera,
        world: &dyn Hittable,
        pass: u32,
    ) -> Option<Vec<Color>> {
        let width = self.width as usize;
        let height = self.height;
        let max_depth = self.max_depth;
        let seed = self.seed;
        let control = &*self.control;

        let mut samples = vec![Color::ZERO; self.accumulation.len()];

        control.begin();
        let result = self.install(|| {
            samples
                .par_iter_mut()
                .enumerate()
                .try_for_each(|(index, slot)| {
                    if control.is_interrupted() {
                        return Err(Interrupted);
                    }

                    let mut rng = SmallRng::seed_from_u64(pixel_seed(seed, pass, index));
                    let col = (index % width) as f32;
                    // Index 0 is the top-left pixel; v grows upwards
                    let row = (height - 1 - (index / width) as u32) as f32;
                    let u = (col + gen_f32(&mut rng)) / width as f32;
                    let v = (row + gen_f32(&mut rng)) / height as f32;

                    let ray = camera.get_ray(u, v, &mut rng);
                    *slot = ray_color(&ray, world, max_depth, &mut rng);
                    Ok(())
                })
        });
        let interrupted = control.finish();

        match result {
            Ok(()) if !interrupted => Some(samples),
            _ => None,
        }
    }

    fn install<R: Send>(&self, op: impl FnOnce() -> R + Send) -> R {
        match &self.pool {
            Some(pool) => pool.install(op),
            None => op(),
        }
    }
}

/// Number of pixels in a `width` x `height` image, computed without u32 overflow.
fn pixel_count(width: u32, height: u32) -> usize {
    width as usize * height as usize
}

/// Per-pixel seed derived from the base seed, pass and pixel index.
fn pixel_seed(seed: u64, pass: u32, index: usize) -> u64 {
    splitmix64(splitmix64(seed ^ u64::from(pass)) ^ index as u64)
}

fn splitmix64(x: u64) -> u64 {
    let mut z = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
