//! Plain-text PPM image output.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::Frame;

/// Write a frame as an ASCII PPM (`P3`): a header, then one `r g b` line
/// per pixel, row-major from the top-left.
pub fn write_ppm<W: Write>(frame: &Frame, mut out: W) -> io::Result<()> {
    writeln!(out, "P3")?;
    writeln!(out, "{} {}", frame.width(), frame.height())?;
    writeln!(out, "255")?;
    for [r, g, b, _] in frame.pixels() {
        writeln!(out, "{r} {g} {b}")?;
    }
    out.flush()
}

/// Write a frame to a PPM file.
pub fn save_ppm(frame: &Frame, path: impl AsRef<Path>) -> io::Result<()> {
    let file = File::create(path)?;
    write_ppm(frame, BufWriter::new(file))
}
