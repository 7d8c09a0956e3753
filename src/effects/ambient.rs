//! Decorative full-region animations.
//!
//! None of these interact with anything: each keeps a time scalar or a
//! small trail buffer and repaints every pixel of its region every tick.

use super::{Effect, Tick, extent};
use crate::Color;
use crate::canvas::{Canvas, Point};
use crate::palette::{Palette, color_from_palette};
use crate::timing::Gate;
use crate::wave::{map_range, sin8, sin16};
use rand::Rng;

/// Truncate a drifting float cursor onto the 256-step palette wheel.
fn wheel(cursor: f32) -> u8 {
    cursor.rem_euclid(256.0) as u8
}

// ── Checkerboard ─────────────────────────────────────────────────────

/// Two interleaved colours cycling through the rainbow at different rates.
#[derive(Debug, Default)]
pub struct Checkerboard {
    even: f32,
    odd: f32,
}

impl Effect for Checkerboard {
    fn render(&mut self, _tick: &mut Tick<'_>, canvas: &mut dyn Canvas, origin: Point) {
        let (cols, rows) = extent(canvas);
        let even = color_from_palette(Palette::Rainbow, wheel(self.even));
        let odd = color_from_palette(Palette::Rainbow, wheel(self.odd));
        for x in 0..cols {
            for y in 0..rows {
                let color = if (x + y) % 2 == 0 { even } else { odd };
                canvas.set_pixel(origin.x + x, origin.y + y, color);
            }
        }
        self.even = (self.even + 0.6).rem_euclid(256.0);
        self.odd = (self.odd + 1.0).rem_euclid(256.0);
    }
}

// ── Pacifica ─────────────────────────────────────────────────────────

const PACIFICA_SPEED: u32 = 2;

/// Gently rolling ocean colours.
#[derive(Debug, Default)]
pub struct Pacifica {
    time: u32,
}

impl Effect for Pacifica {
    fn render(&mut self, _tick: &mut Tick<'_>, canvas: &mut dyn Canvas, origin: Point) {
        let (cols, rows) = extent(canvas);
        self.time = self.time.wrapping_add(PACIFICA_SPEED);
        let t = self.time;

        for x in 0..cols {
            for y in 0..rows {
                let ulx = (t / 8).wrapping_add(x as u32 * 16) as u16;
                let uly = (t / 4).wrapping_add(y as u32 * 16) as u16;
                let half = (t / 2) as u16;
                let a = sin16(ulx.wrapping_mul(6).wrapping_add(half)) as i32 / 8 + 127;
                let b = sin16(uly.wrapping_mul(9).wrapping_add(half)) as i32 / 8 + 127;
                let c = sin16(
                    ulx.wrapping_mul(7)
                        .wrapping_add(uly.wrapping_mul(2))
                        .wrapping_sub(t as u16),
                ) as i32
                    / 16;
                // Summed on a 16-bit accumulator, so negative sums wrap.
                let index = ((a + b + c) as u16 / 3) as u8;
                canvas.set_pixel(
                    origin.x + x,
                    origin.y + y,
                    color_from_palette(Palette::Ocean, index),
                );
            }
        }
    }
}

// ── Theater chase ────────────────────────────────────────────────────

/// Every third column lit with its rainbow colour, marching sideways.
#[derive(Debug, Default)]
pub struct TheaterChase {
    calls: u32,
    phase: i32,
}

impl Effect for TheaterChase {
    fn render(&mut self, _tick: &mut Tick<'_>, canvas: &mut dyn Canvas, origin: Point) {
        let (cols, rows) = extent(canvas);
        self.calls = self.calls.wrapping_add(1);
        if self.calls % 3 == 0 {
            self.phase = (self.phase + 1) % 3;
        }

        for x in 0..cols {
            let color = if (x + self.phase) % 3 == 0 {
                color_from_palette(Palette::Rainbow, (x * 256 / cols) as u8)
            } else {
                Color::BLACK
            };
            canvas.fill_region(origin.x + x, origin.y, 1, rows as u32, color);
        }
    }
}

// ── Plasma ───────────────────────────────────────────────────────────

/// Classic sine-interference plasma.
#[derive(Debug, Default)]
pub struct Plasma {
    time: u32,
}

impl Effect for Plasma {
    fn render(&mut self, _tick: &mut Tick<'_>, canvas: &mut dyn Canvas, origin: Point) {
        let (cols, rows) = extent(canvas);
        let t = self.time;
        for x in 0..cols {
            for y in 0..rows {
                let a = sin8((x as u32 * 10).wrapping_add(t) as u8);
                let b = sin8((y as u32 * 10).wrapping_add(t / 2) as u8);
                let c = sin8(((x + y) as u32 * 10).wrapping_add(t / 3) as u8) / 3;
                let index = a.wrapping_add(b).wrapping_add(c);
                canvas.set_pixel(
                    origin.x + x,
                    origin.y + y,
                    color_from_palette(Palette::Rainbow, index),
                );
            }
        }
        self.time = self.time.wrapping_add(1);
    }
}

// ── Matrix rain ──────────────────────────────────────────────────────

const RAIN_HEAD: Color = Color::new(175, 255, 175);
const RAIN_TRAIL: Color = Color::new(27, 130, 39);
const RAIN_FADE: u8 = 128;
/// Out of 256, per column and shift.
const RAIN_SPAWN_CHANCE: u8 = 10;
const RAIN_BASE_INTERVAL_MS: u64 = 76;

/// Shift interval for a panel of `rows`: taller panels fall faster.
fn rain_interval_ms(rows: i32) -> u64 {
    let shift = map_range(rows.min(150), 0, 150, 0, 3);
    RAIN_BASE_INTERVAL_MS >> shift
}

/// Green digital rain.
#[derive(Debug)]
pub struct MatrixRain {
    trail: Vec<Color>,
    cols: i32,
    rows: i32,
    gate: Gate,
}

impl Default for MatrixRain {
    fn default() -> Self {
        Self {
            trail: Vec::new(),
            cols: 0,
            rows: 0,
            gate: Gate::at_least(RAIN_BASE_INTERVAL_MS),
        }
    }
}

/// A head left behind on the top row becomes trail, anything else dims.
fn age(color: Color) -> Color {
    if color == RAIN_HEAD {
        RAIN_TRAIL
    } else {
        color.scale(RAIN_FADE)
    }
}

impl MatrixRain {
    fn cell(&mut self, x: i32, y: i32) -> &mut Color {
        &mut self.trail[(y * self.cols + x) as usize]
    }

    fn shift(&mut self, rng: &mut impl Rng) {
        let cols = self.cols as usize;
        let len = self.trail.len();
        self.trail.copy_within(..len - cols, cols);
        for x in 0..self.cols {
            let top = self.cell(x, 0);
            *top = age(*top);
            if rng.gen_range(0..=u8::MAX) < RAIN_SPAWN_CHANCE {
                *self.cell(x, 0) = RAIN_HEAD;
            }
        }
    }
}

impl Effect for MatrixRain {
    fn render(&mut self, tick: &mut Tick<'_>, canvas: &mut dyn Canvas, origin: Point) {
        let (cols, rows) = extent(canvas);
        if cols <= 0 || rows <= 0 {
            return;
        }
        if (cols, rows) != (self.cols, self.rows) {
            self.trail = vec![Color::BLACK; (cols * rows) as usize];
            (self.cols, self.rows) = (cols, rows);
            self.gate = Gate::at_least(rain_interval_ms(rows));
        }

        if self.gate.ready(tick.now_ms) {
            self.shift(tick.rng);
        }

        for (i, &color) in self.trail.iter().enumerate() {
            let (x, y) = (i as i32 % cols, i as i32 / cols);
            canvas.set_pixel(origin.x + x, origin.y + y, color);
        }
    }
}

// ── Swirl ────────────────────────────────────────────────────────────

const SWIRL_STEP_MS: u64 = 40;
const SWIRL_ANGLE_STEP: u8 = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SwirlDirection {
    Inward,
    Outward,
}

/// Rainbow rings around the panel centre, flowing in or out.
#[derive(Debug)]
pub struct Swirl {
    direction: SwirlDirection,
    angle: u8,
    gate: Gate,
}

impl Swirl {
    pub fn new(direction: SwirlDirection) -> Self {
        Self {
            direction,
            angle: 0,
            gate: Gate::exceeding(SWIRL_STEP_MS),
        }
    }

    pub fn inward() -> Self {
        Self::new(SwirlDirection::Inward)
    }

    pub fn outward() -> Self {
        Self::new(SwirlDirection::Outward)
    }
}

impl Effect for Swirl {
    fn render(&mut self, tick: &mut Tick<'_>, canvas: &mut dyn Canvas, origin: Point) {
        let (cols, rows) = extent(canvas);
        if self.gate.ready(tick.now_ms) {
            self.angle = self.angle.wrapping_add(SWIRL_ANGLE_STEP);
        }

        let (cx, cy) = ((cols / 2) as f32, (rows / 2) as f32);
        let reach = (cx * cx + cy * cy).sqrt() as i32;
        for x in 0..cols {
            for y in 0..rows {
                let (dx, dy) = (cx - x as f32, cy - y as f32);
                let dist = (dx * dx + dy * dy).sqrt() as i32;
                let ring = map_range(dist, 0, reach, 0, 255) as u8;
                let ring = match self.direction {
                    SwirlDirection::Inward => ring,
                    SwirlDirection::Outward => 255 - ring,
                };
                let color = color_from_palette(Palette::Rainbow, ring.wrapping_add(self.angle));
                canvas.set_pixel(origin.x + x, origin.y + y, color);
            }
        }
    }
}

// ── Colour waves ─────────────────────────────────────────────────────

const WAVE_REFRESH_MS: u64 = 250;
const WAVE_FLOOR: u8 = 100;

/// A rainbow sweeping across the columns under a slow brightness wave.
#[derive(Debug)]
pub struct ColorWaves {
    phase_ms: u64,
    gate: Gate,
}

impl Default for ColorWaves {
    fn default() -> Self {
        Self {
            phase_ms: 0,
            gate: Gate::exceeding(WAVE_REFRESH_MS),
        }
    }
}

impl Effect for ColorWaves {
    fn render(&mut self, tick: &mut Tick<'_>, canvas: &mut dyn Canvas, origin: Point) {
        let (cols, rows) = extent(canvas);
        if self.gate.ready(tick.now_ms) {
            self.phase_ms = tick.now_ms;
        }

        let drift = tick.now_ms / 10;
        for x in 0..cols {
            let hue = (x as u64 * 255 / cols as u64 + drift) as u8;
            let phase = (self.phase_ms as u16).wrapping_add((x as u16).wrapping_mul(4096));
            let level = ((sin16(phase) as i32 + 32768) >> 8) as u8;
            let color = Color::from_hsv(hue, 255, level.max(WAVE_FLOOR));
            canvas.fill_region(origin.x + x, origin.y, 1, rows as u32, color);
        }
    }
}
