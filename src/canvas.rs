//! The drawing surface effects paint onto.
//!
//! Effects only ever see `&mut dyn Canvas`. The render thread hands them a
//! [`FrameBuffer`] and copies it to the panel afterwards, so effects never
//! touch hardware and every one of them can be tested in memory.
//!
//! ## Rust concepts
//! - Traits with provided (default) methods
//! - Trait objects (`&mut dyn Canvas`)
//! - Row-major `Vec` storage indexed by `(x, y)`

use crate::Color;

/// An integer grid coordinate. Also used as the render origin.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const ORIGIN: Self = Self::new(0, 0);

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Translate by another point (used to apply a render origin).
    pub const fn offset(self, by: Point) -> Self {
        Self::new(self.x + by.x, self.y + by.y)
    }
}

/// Capability set every effect draws through.
///
/// Only the size queries and `set_pixel` are required. Writes outside
/// `0..width` × `0..height` must be ignored by the implementation; effects
/// do not pre-validate coordinates.
pub trait Canvas {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    fn set_pixel(&mut self, x: i32, y: i32, color: Color);

    fn fill_region(&mut self, x: i32, y: i32, w: u32, h: u32, color: Color) {
        for dy in 0..h as i32 {
            for dx in 0..w as i32 {
                self.set_pixel(x + dx, y + dy, color);
            }
        }
    }

    fn clear(&mut self, color: Color) {
        let (w, h) = (self.width(), self.height());
        self.fill_region(0, 0, w, h, color);
    }

    /// Draw a row-major RGB565 bitmap of `w` × `h` pixels with its top-left
    /// corner at `(x, y)`. Black pixels are drawn too.
    fn draw_bitmap(&mut self, x: i32, y: i32, bitmap: &[u16], w: u32, h: u32) {
        for (i, &pixel) in bitmap.iter().take((w * h) as usize).enumerate() {
            let (bx, by) = ((i as u32 % w) as i32, (i as u32 / w) as i32);
            self.set_pixel(x + bx, y + by, Color::from_rgb565(pixel));
        }
    }
}

// ── FrameBuffer ──────────────────────────────────────────────────────

/// An in-memory canvas.
///
/// Used as the off-screen frame the render thread presents, and as the
/// secondary fade buffer of the compositing effects.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameBuffer {
    width: u32,
    height: u32,
    pixels: Vec<Color>,
}

impl FrameBuffer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::BLACK; (width * height) as usize],
        }
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    /// Pixel at `(x, y)`, or `None` when out of bounds.
    pub fn get(&self, x: i32, y: i32) -> Option<Color> {
        self.index(x, y).map(|i| self.pixels[i])
    }

    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    /// Number of pixels that are not black.
    pub fn lit_count(&self) -> usize {
        self.pixels.iter().filter(|c| !c.is_black()).count()
    }

    /// Match a new size, clearing the contents if the size changed.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width != self.width || height != self.height {
            *self = Self::new(width, height);
        }
    }

    /// Uniformly dim every pixel towards black.
    pub fn fade_to_black_by(&mut self, amount: u8) {
        for pixel in &mut self.pixels {
            *pixel = pixel.fade_to_black_by(amount);
        }
    }

    /// Copy every pixel onto `target`, shifted by `origin`.
    pub fn blit_to(&self, target: &mut dyn Canvas, origin: Point) {
        for (i, &color) in self.pixels.iter().enumerate() {
            let x = (i as u32 % self.width) as i32;
            let y = (i as u32 / self.width) as i32;
            target.set_pixel(origin.x + x, origin.y + y, color);
        }
    }
}

impl Canvas for FrameBuffer {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn set_pixel(&mut self, x: i32, y: i32, color: Color) {
        if let Some(i) = self.index(x, y) {
            self.pixels[i] = color;
        }
    }

    fn clear(&mut self, color: Color) {
        self.pixels.fill(color);
    }
}
