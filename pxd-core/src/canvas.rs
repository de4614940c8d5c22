//! The RGBA pixel grid and its primitive draw operations.

use std::path::Path;

use png::{BitDepth, ColorType, Encoder};

use crate::color::Color;
use crate::error::CoreError;

/// An immutable-dimension RGBA pixel grid, initialized fully transparent.
pub struct Canvas {
    width: usize,
    height: usize,
    pixels: Vec<Color>,
    dirty: bool,
}

/// A value-typed, immutable copy of a canvas's dimensions and pixel buffer.
///
/// Used by [`crate::history::History`] for undo/redo. Restoring a snapshot
/// into a canvas of different dimensions is an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub width: usize,
    pub height: usize,
    pixels: Vec<Color>,
}

/// A flat, row-major RGBA byte buffer suitable for uploading to a texture.
/// Distinct from [`Snapshot`], which stores typed pixels for undo/redo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderSnapshot {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<u8>,
}

impl Canvas {
    /// Creates a canvas of the given dimensions, both of which must be >= 1.
    pub fn new(width: usize, height: usize) -> Result<Self, CoreError> {
        if width == 0 || height == 0 {
            return Err(CoreError::InvalidArgs(
                "canvas dimensions must be positive".to_string(),
            ));
        }
        Ok(Canvas {
            width,
            height,
            pixels: vec![Color::default(); width * height],
            dirty: false,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Whether the canvas has changed since the last [`Canvas::render_snapshot`].
    pub fn dirty(&self) -> bool {
        self.dirty
    }

    fn index(&self, x: i64, y: i64) -> Result<usize, CoreError> {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return Err(CoreError::OutOfBounds(format!(
                "pixel ({x},{y}) outside canvas"
            )));
        }
        Ok(y as usize * self.width + x as usize)
    }

    pub fn get_pixel(&self, x: i64, y: i64) -> Result<Color, CoreError> {
        let idx = self.index(x, y)?;
        Ok(self.pixels[idx])
    }

    pub fn set_pixel(&mut self, x: i64, y: i64, color: Color) -> Result<(), CoreError> {
        let idx = self.index(x, y)?;
        self.pixels[idx] = color;
        self.dirty = true;
        Ok(())
    }

    /// Fills `[x, x+w) x [y, y+h)`. `w` and `h` must be >= 1 and the whole
    /// rectangle must lie within the canvas — no partial clipping.
    pub fn fill_rect(
        &mut self,
        x: i64,
        y: i64,
        w: i64,
        h: i64,
        color: Color,
    ) -> Result<(), CoreError> {
        if w <= 0 || h <= 0 {
            return Err(CoreError::InvalidArgs(
                "rect width and height must be positive".to_string(),
            ));
        }
        if x < 0
            || y < 0
            || x + w > self.width as i64
            || y + h > self.height as i64
        {
            return Err(CoreError::OutOfBounds(format!(
                "rect ({x},{y}) size {w}x{h} outside canvas"
            )));
        }

        for row in y..y + h {
            let start = row as usize * self.width + x as usize;
            for pixel in &mut self.pixels[start..start + w as usize] {
                *pixel = color;
            }
        }
        self.dirty = true;
        Ok(())
    }

    /// Draws a one-pixel-wide line inclusive of both endpoints using
    /// Bresenham's integer algorithm. Both endpoints must be in bounds.
    pub fn line(
        &mut self,
        x1: i64,
        y1: i64,
        x2: i64,
        y2: i64,
        color: Color,
    ) -> Result<(), CoreError> {
        self.index(x1, y1)?;
        self.index(x2, y2)?;

        let dx = (x2 - x1).abs();
        let sx: i64 = if x1 < x2 { 1 } else { -1 };
        let dy = -(y2 - y1).abs();
        let sy: i64 = if y1 < y2 { 1 } else { -1 };
        let mut err = dx + dy;

        let (mut x, mut y) = (x1, y1);
        loop {
            let idx = self.index(x, y).expect("line stays within pre-checked bounds");
            self.pixels[idx] = color;

            if x == x2 && y == y2 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
        self.dirty = true;
        Ok(())
    }

    /// Overwrites every pixel. Never fails.
    pub fn clear(&mut self, color: Color) {
        self.pixels.fill(color);
        self.dirty = true;
    }

    /// Returns a deep-copied, immutable value of the canvas's pixels.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            width: self.width,
            height: self.height,
            pixels: self.pixels.clone(),
        }
    }

    /// Overwrites all pixels from a matching-dimension snapshot.
    pub fn restore(&mut self, snapshot: &Snapshot) -> Result<(), CoreError> {
        if snapshot.width != self.width
            || snapshot.height != self.height
            || snapshot.pixels.len() != self.pixels.len()
        {
            return Err(CoreError::InvalidArgs(
                "snapshot dimensions do not match canvas".to_string(),
            ));
        }
        self.pixels.copy_from_slice(&snapshot.pixels);
        self.dirty = true;
        Ok(())
    }

    /// Returns a flat row-major RGBA byte buffer and clears the dirty flag.
    pub fn render_snapshot(&mut self) -> RenderSnapshot {
        let mut bytes = Vec::with_capacity(self.pixels.len() * 4);
        for pixel in &self.pixels {
            bytes.extend_from_slice(&[pixel.r, pixel.g, pixel.b, pixel.a]);
        }
        self.dirty = false;
        RenderSnapshot {
            width: self.width,
            height: self.height,
            pixels: bytes,
        }
    }

    /// Writes the current pixels to a PNG file at `path`, truncating any
    /// existing file. Takes a snapshot first so that mutations racing with
    /// the encoder never appear in the exported file.
    pub fn export_png(&self, path: &Path) -> Result<(), CoreError> {
        let snapshot = self.snapshot();

        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);

        let mut encoder = Encoder::new(writer, snapshot.width as u32, snapshot.height as u32);
        encoder.set_color(ColorType::Rgba);
        encoder.set_depth(BitDepth::Eight);
        let mut writer = encoder
            .write_header()
            .map_err(|err| CoreError::Io(err.to_string()))?;

        let mut bytes = Vec::with_capacity(snapshot.pixels.len() * 4);
        for pixel in &snapshot.pixels {
            bytes.extend_from_slice(&[pixel.r, pixel.g, pixel.b, pixel.a]);
        }
        writer
            .write_image_data(&bytes)
            .map_err(|err| CoreError::Io(err.to_string()))?;

        Ok(())
    }
}
