//! Displayable snapshots of an accumulation buffer.

use std::time::Duration;

use crate::Color;

/// Apply gamma correction (gamma = 2.0).
#[inline]
pub fn linear_to_gamma(linear: f32) -> f32 {
    if linear > 0.0 {
        linear.sqrt()
    } else {
        0.0
    }
}

/// Convert a linear color to 8-bit RGBA.
///
/// Each channel is gamma corrected, then mapped with `256 * clamp(c, 0, 0.999)`
/// so that 1.0 lands on 255 and every integer gets an equal share of [0, 1).
pub fn color_to_rgba(color: Color) -> [u8; 4] {
    let quantize = |c: f32| (256.0 * linear_to_gamma(c).clamp(0.0, 0.999)) as u8;
    [quantize(color.x), quantize(color.y), quantize(color.z), 255]
}

/// An immutable, display-ready image of the running average.
///
/// Pixels are row-major starting at the top-left.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    width: u32,
    height: u32,
    samples: u32,
    elapsed: Duration,
    pixels: Vec<[u8; 4]>,
}

impl Frame {
    /// Average `sums` over `samples` and quantize.
    pub(crate) fn from_sums(
        width: u32,
        height: u32,
        sums: &[Color],
        samples: u32,
        elapsed: Duration,
    ) -> Self {
        let scale = 1.0 / samples.max(1) as f32;
        let pixels = sums.iter().map(|sum| color_to_rgba(*sum * scale)).collect();

        Self {
            width,
            height,
            samples,
            elapsed,
            pixels,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of samples per pixel averaged into this frame.
    pub fn samples(&self) -> u32 {
        self.samples
    }

    /// Cumulative render time of every pass in this frame.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn pixels(&self) -> &[[u8; 4]] {
        &self.pixels
    }

    /// Pixel at column `x`, row `y` (row 0 is the top).
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        self.pixels[y as usize * self.width as usize + x as usize]
    }

    /// Flatten to RGBA bytes (for display or saving).
    pub fn to_rgba(&self) -> Vec<u8> {
        self.pixels.iter().flatten().copied().collect()
    }
}
