//! Field-compositing effects: ripple, radar and plasma cloud.
//!
//! Ripple and Radar keep a private [`FrameBuffer`] between ticks. Every
//! tick they dim the whole buffer, stamp new geometry into it and copy it
//! onto the canvas, which leaves a fading trail behind the moving shape.
//! PlasmaCloud computes every pixel afresh and needs no buffer.

use super::{Effect, Tick, extent};
use crate::Color;
use crate::canvas::{Canvas, FrameBuffer, Point};
use crate::wave::{cos8, inoise8, sin8};
use rand::Rng;

// ── Ripple ───────────────────────────────────────────────────────────

pub const MAX_RADIUS: f32 = 30.0;
const BAND_WIDTH: f32 = 2.0;
const GROWTH: f32 = 0.5;
const RIPPLE_DECAY: u8 = 45;

#[derive(Clone, Copy, Debug, PartialEq)]
struct Wave {
    center: Point,
    radius: f32,
    color: Color,
}

/// An expanding ring that respawns somewhere else once it gets too wide.
#[derive(Debug)]
pub struct Ripple {
    wave: Option<Wave>,
    buffer: FrameBuffer,
}

impl Default for Ripple {
    fn default() -> Self {
        Self {
            wave: None,
            buffer: FrameBuffer::new(0, 0),
        }
    }
}

impl Ripple {
    /// Inner radius of the current ring, or `None` before the first tick.
    pub fn radius(&self) -> Option<f32> {
        self.wave.map(|w| w.radius)
    }

    pub fn center(&self) -> Option<Point> {
        self.wave.map(|w| w.center)
    }
}

impl Effect for Ripple {
    fn render(&mut self, tick: &mut Tick<'_>, canvas: &mut dyn Canvas, origin: Point) {
        let (cols, rows) = extent(canvas);
        if cols <= 0 || rows <= 0 {
            return;
        }
        self.buffer.resize(cols as u32, rows as u32);

        let wave = match self.wave {
            Some(wave) if wave.radius <= MAX_RADIUS => wave,
            _ => Wave {
                center: Point::new(tick.rng.gen_range(0..cols), tick.rng.gen_range(0..rows)),
                radius: 0.0,
                color: Color::from_hsv(tick.rng.gen_range(0..255), 255, 255),
            },
        };

        self.buffer.fade_to_black_by(RIPPLE_DECAY);
        for y in 0..rows {
            for x in 0..cols {
                let (dx, dy) = ((x - wave.center.x) as f32, (y - wave.center.y) as f32);
                let dist = (dx * dx + dy * dy).sqrt().floor();
                if dist >= wave.radius && dist < wave.radius + BAND_WIDTH {
                    self.buffer.set_pixel(x, y, wave.color);
                }
            }
        }
        self.buffer.blit_to(canvas, origin);

        self.wave = Some(Wave {
            radius: wave.radius + GROWTH,
            ..wave
        });
    }
}

// ── Radar ────────────────────────────────────────────────────────────

const RADAR_DECAY: u8 = 20;
const SWEEP_STEP: u8 = 2;

/// A rotating beam from the panel centre whose hue follows its angle.
#[derive(Debug)]
pub struct Radar {
    angle: u8,
    buffer: FrameBuffer,
}

impl Default for Radar {
    fn default() -> Self {
        Self {
            angle: 0,
            buffer: FrameBuffer::new(0, 0),
        }
    }
}

impl Radar {
    pub fn angle(&self) -> u8 {
        self.angle
    }
}

impl Effect for Radar {
    fn render(&mut self, _tick: &mut Tick<'_>, canvas: &mut dyn Canvas, origin: Point) {
        let (cols, rows) = extent(canvas);
        if cols <= 0 || rows <= 0 {
            return;
        }
        self.buffer.resize(cols as u32, rows as u32);
        self.buffer.fade_to_black_by(RADAR_DECAY);

        let center_x = (cols - 1) as f32 / 2.0;
        let center_y = (rows - 1) as f32 / 2.0;
        let dir_x = (cos8(self.angle) as f32 - 128.0) / 128.0;
        let dir_y = (sin8(self.angle) as f32 - 128.0) / 128.0;
        let color = Color::from_hsv(self.angle, 255, 255);

        // Screen y grows downwards, so the beam's y component is inverted.
        for r in 0..=cols.max(rows) {
            let x = center_x + r as f32 * dir_x;
            let y = center_y - r as f32 * dir_y;
            if x >= 0.0 && y >= 0.0 {
                self.buffer.set_pixel(x as i32, y as i32, color);
            }
        }
        self.buffer.blit_to(canvas, origin);

        self.angle = self.angle.wrapping_add(SWEEP_STEP);
    }
}

// ── Plasma cloud ─────────────────────────────────────────────────────

const NOISE_SCALE: u32 = 16;
const HUE_DRIFT: f32 = 0.1;

/// Slowly drifting coloured noise.
#[derive(Debug, Default)]
pub struct PlasmaCloud {
    time: u32,
    hue_shift: f32,
}

impl Effect for PlasmaCloud {
    fn render(&mut self, _tick: &mut Tick<'_>, canvas: &mut dyn Canvas, origin: Point) {
        let (cols, rows) = extent(canvas);
        for x in 0..cols {
            for y in 0..rows {
                let noise = inoise8(x as u32 * NOISE_SCALE, y as u32 * NOISE_SCALE, self.time);
                let hue = (noise as f32 * 255.0 / 1024.0 + self.hue_shift) as u32 % 256;
                canvas.set_pixel(origin.x + x, origin.y + y, Color::from_hsv(hue as u8, 255, 255));
            }
        }

        self.time = self.time.wrapping_add(1);
        self.hue_shift = (self.hue_shift + HUE_DRIFT).rem_euclid(256.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::testing::{render_at, rng};
    use pretty_assertions::assert_eq;

    #[test]
    fn ripple_spawns_on_first_tick() {
        let mut ripple = Ripple::default();
        assert_eq!(ripple.radius(), None);

        let mut rng = rng();
        let mut canvas = FrameBuffer::new(32, 8);
        render_at(&mut ripple, &mut rng, &mut canvas, 0);

        let center = ripple.center().unwrap();
        assert!((0..32).contains(&center.x) && (0..8).contains(&center.y));
        // The centre cell sits at distance zero, inside the first band.
        assert!(!canvas.get(center.x, center.y).unwrap().is_black());
    }

    #[test]
    fn ripple_radius_grows_by_half_a_pixel_per_tick() {
        let mut ripple = Ripple::default();
        let mut rng = rng();
        let mut canvas = FrameBuffer::new(32, 8);
        for n in 1..=61 {
            render_at(&mut ripple, &mut rng, &mut canvas, n);
            assert_eq!(ripple.radius(), Some(n as f32 * GROWTH));
        }
    }

    #[test]
    fn ripple_respawns_once_past_max_radius() {
        let mut ripple = Ripple::default();
        let mut rng = rng();
        let mut canvas = FrameBuffer::new(32, 8);
        for n in 0..61 {
            render_at(&mut ripple, &mut rng, &mut canvas, n);
        }
        assert!(ripple.radius().unwrap() > MAX_RADIUS);

        // A colour no random hue produces marks the old ring.
        let marker = Color::new(1, 2, 3);
        ripple.wave = ripple.wave.map(|w| Wave { color: marker, ..w });
        render_at(&mut ripple, &mut rng, &mut canvas, 61);

        assert_eq!(ripple.radius(), Some(GROWTH));
        assert_ne!(ripple.wave.unwrap().color, marker);
    }

    #[test]
    fn ripple_trail_fades() {
        let mut ripple = Ripple::default();
        let mut rng = rng();
        let mut canvas = FrameBuffer::new(32, 8);
        render_at(&mut ripple, &mut rng, &mut canvas, 0);
        let center = ripple.center().unwrap();
        let first = canvas.get(center.x, center.y).unwrap();

        // The ring moves off the centre after the first tick.
        for n in 1..4 {
            render_at(&mut ripple, &mut rng, &mut canvas, n);
        }
        let faded = (0..3).fold(first, |c, _| c.fade_to_black_by(RIPPLE_DECAY));
        assert_eq!(canvas.get(center.x, center.y), Some(faded));
    }

    #[test]
    fn ripple_is_shifted_by_origin() {
        let mut ripple = Ripple::default();
        let mut rng = rng();
        let mut canvas = FrameBuffer::new(8, 8);
        let mut tick = Tick::new(0, &mut rng);
        ripple.render(&mut tick, &mut canvas, Point::new(4, 0));

        assert_eq!(ripple.buffer.width(), 8);
        for y in 0..8 {
            for x in 0..4 {
                assert_eq!(canvas.get(x, y), Some(Color::BLACK));
            }
        }
    }

    #[test]
    fn radar_beam_points_right_at_angle_zero() {
        let mut radar = Radar::default();
        let mut rng = rng();
        let mut canvas = FrameBuffer::new(32, 8);

        render_at(&mut radar, &mut rng, &mut canvas, 0);
        assert_eq!(canvas.get(31, 3), Some(Color::RED));
        assert_eq!(canvas.get(15, 3), Some(Color::RED));
        assert_eq!(canvas.get(0, 3), Some(Color::BLACK));
        assert_eq!(radar.angle(), 2);

        render_at(&mut radar, &mut rng, &mut canvas, 1);
        assert_eq!(canvas.get(31, 3), Some(Color::new(234, 0, 0)));
    }

    #[test]
    fn radar_angle_wraps() {
        let mut radar = Radar::default();
        let mut rng = rng();
        let mut canvas = FrameBuffer::new(16, 16);
        for n in 0..128 {
            render_at(&mut radar, &mut rng, &mut canvas, n);
        }
        assert_eq!(radar.angle(), 0);
    }

    #[test]
    fn fade_buffer_follows_canvas_size() {
        let mut radar = Radar::default();
        let mut rng = rng();
        render_at(&mut radar, &mut rng, &mut FrameBuffer::new(32, 8), 0);
        assert_eq!(radar.buffer.width(), 32);

        let mut tall = FrameBuffer::new(16, 16);
        render_at(&mut radar, &mut rng, &mut tall, 1);
        assert_eq!((radar.buffer.width(), radar.buffer.height()), (16, 16));
    }

    #[test]
    fn plasma_cloud_fills_region_and_animates() {
        let mut cloud = PlasmaCloud::default();
        let mut rng = rng();
        let mut canvas = FrameBuffer::new(32, 8);
        render_at(&mut cloud, &mut rng, &mut canvas, 0);
        assert_eq!(canvas.lit_count(), 32 * 8);
        let first = canvas.clone();

        for n in 1..40 {
            render_at(&mut cloud, &mut rng, &mut canvas, n);
        }
        assert_eq!(cloud.time, 40);
        assert_ne!(canvas, first);
    }

    #[test]
    fn plasma_cloud_hue_drift_wraps_and_keeps_moving() {
        let mut cloud = PlasmaCloud {
            time: 0,
            hue_shift: 255.95,
        };
        let mut rng = rng();
        let mut canvas = FrameBuffer::new(4, 4);
        render_at(&mut cloud, &mut rng, &mut canvas, 0);
        assert!(cloud.hue_shift < 1.0, "hue shift {} did not wrap", cloud.hue_shift);

        for n in 1..=1000 {
            render_at(&mut cloud, &mut rng, &mut canvas, n);
        }
        assert!((99.0..101.0).contains(&cloud.hue_shift), "hue shift {}", cloud.hue_shift);
    }
}
