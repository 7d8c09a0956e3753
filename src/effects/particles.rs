//! Particle effects: fireworks, raindrops and twinkling stars.
//!
//! Each effect owns a fixed-size pool. Spawning scans the pool for an
//! inactive slot and silently gives up when the pool is full; particles go
//! back to inactive when their life runs out or they leave the panel.

use super::{Effect, Tick, extent};
use crate::Color;
use crate::canvas::{Canvas, Point};
use crate::timing::Gate;
use rand::Rng;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Inactive,
    Active,
    Exploded,
}

// ── Fireworks ────────────────────────────────────────────────────────

pub const MAX_FIREWORKS: usize = 5;
const SPAWN_INTERVAL_MS: u64 = 350;
const SPAWN_CHANCE_PERCENT: u32 = 50;
const LIFE_STEP: u8 = 5;
/// Ascent speed in pixels per tick on an 8-row panel.
const ASCENT: f32 = 0.3;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Firework {
    pub x: f32,
    pub y: f32,
    pub life: u8,
    pub phase: Phase,
    pub color: Color,
    pub peak: f32,
    pub speed: f32,
}

/// Rockets rise from the bottom edge to a random height and burst.
#[derive(Debug)]
pub struct Fireworks {
    pool: [Firework; MAX_FIREWORKS],
    spawn_gate: Gate,
}

impl Default for Fireworks {
    fn default() -> Self {
        Self {
            pool: [Firework::default(); MAX_FIREWORKS],
            spawn_gate: Gate::at_least(SPAWN_INTERVAL_MS),
        }
    }
}

impl Fireworks {
    pub fn pool(&self) -> &[Firework] {
        &self.pool
    }

    /// Launch a rocket into the first free slot. Returns `false` when the
    /// pool is full.
    fn launch(&mut self, rng: &mut impl Rng, cols: i32, rows: i32) -> bool {
        let Some(slot) = self.pool.iter_mut().find(|f| f.phase == Phase::Inactive) else {
            return false;
        };
        // Heights and speeds are tuned for 8 rows; taller panels scale up.
        let scale = (rows / 8).max(1) as f32;
        *slot = Firework {
            x: rng.gen_range(0..cols) as f32,
            y: (rows - 1) as f32,
            life: 255,
            phase: Phase::Active,
            color: Color::WHITE,
            peak: rng.gen_range(1..5) as f32 * scale,
            speed: ASCENT * scale,
        };
        true
    }
}

impl Effect for Fireworks {
    fn render(&mut self, tick: &mut Tick<'_>, canvas: &mut dyn Canvas, origin: Point) {
        let (cols, rows) = extent(canvas);
        if cols <= 0 || rows <= 0 {
            return;
        }

        if self.spawn_gate.is_due(tick.now_ms)
            && tick.rng.gen_range(0..100) < SPAWN_CHANCE_PERCENT
            && self.launch(tick.rng, cols, rows)
        {
            self.spawn_gate.mark(tick.now_ms);
        }

        for fw in self.pool.iter_mut().filter(|f| f.phase != Phase::Inactive) {
            fw.life = fw.life.saturating_sub(LIFE_STEP);
            if fw.phase == Phase::Active && fw.y > fw.peak {
                fw.y -= fw.speed;
            } else {
                fw.phase = Phase::Exploded;
                let hue = tick.rng.gen_range(0..255);
                fw.color = Color::from_hsv(hue, 255, fw.life.saturating_mul(4));
            }

            let (x, y) = (fw.x as i32, fw.y as i32);
            canvas.set_pixel(origin.x + x, origin.y + y, fw.color);
            if fw.phase == Phase::Exploded {
                if x > 0 {
                    canvas.set_pixel(origin.x + x - 1, origin.y + y, fw.color);
                }
                if x < cols - 1 {
                    canvas.set_pixel(origin.x + x + 1, origin.y + y, fw.color);
                }
                if y > 0 {
                    canvas.set_pixel(origin.x + x, origin.y + y - 1, fw.color);
                }
                if y < rows - 1 {
                    canvas.set_pixel(origin.x + x, origin.y + y + 1, fw.color);
                }
            }

            if fw.life == 0 {
                fw.phase = Phase::Inactive;
            }
        }
    }
}

// ── Raindrops ────────────────────────────────────────────────────────

pub const MAX_DROPS: usize = 10;
const DROP_SPEED: f32 = 0.5;
const DROP_SPAWN_ONE_IN: u32 = 3;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct Raindrop {
    column: i32,
    pos: f32,
    color: Color,
    phase: Phase,
}

/// Coloured drops falling down random columns. Clears its region every tick.
#[derive(Debug, Default)]
pub struct Raindrops {
    pool: [Raindrop; MAX_DROPS],
}

impl Raindrops {
    pub fn active_count(&self) -> usize {
        self.pool.iter().filter(|d| d.phase == Phase::Active).count()
    }
}

impl Effect for Raindrops {
    fn render(&mut self, tick: &mut Tick<'_>, canvas: &mut dyn Canvas, origin: Point) {
        let (cols, rows) = extent(canvas);
        if cols <= 0 || rows <= 0 {
            return;
        }
        canvas.fill_region(origin.x, origin.y, cols as u32, rows as u32, Color::BLACK);

        if tick.rng.gen_range(0..DROP_SPAWN_ONE_IN) == 0 {
            if let Some(drop) = self.pool.iter_mut().find(|d| d.phase == Phase::Inactive) {
                *drop = Raindrop {
                    column: tick.rng.gen_range(0..cols),
                    pos: 0.0,
                    color: Color::from_hsv(tick.rng.gen_range(0..255), 255, 255),
                    phase: Phase::Active,
                };
            }
        }

        for drop in self.pool.iter_mut().filter(|d| d.phase == Phase::Active) {
            drop.pos += DROP_SPEED;
            if drop.pos > rows as f32 {
                drop.phase = Phase::Inactive;
                continue;
            }
            canvas.set_pixel(origin.x + drop.column, origin.y + drop.pos as i32, drop.color);
        }
    }
}

// ── Twinkling stars ──────────────────────────────────────────────────

const STAR_FADE: f32 = 0.01;
const STAR_SPAWN_MS: u64 = 250;
const STAR_HUE: u8 = 160;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct Star {
    color: Color,
    brightness: f32,
}

/// Bluish-white stars that light up in small batches and slowly fade.
/// One star slot per pixel.
#[derive(Debug)]
pub struct TwinklingStars {
    stars: Vec<Star>,
    cols: i32,
    rows: i32,
    spawn_gate: Gate,
}

impl Default for TwinklingStars {
    fn default() -> Self {
        Self {
            stars: Vec::new(),
            cols: 0,
            rows: 0,
            spawn_gate: Gate::exceeding(STAR_SPAWN_MS),
        }
    }
}

impl TwinklingStars {
    pub fn lit_count(&self) -> usize {
        self.stars.iter().filter(|s| s.brightness > 0.0).count()
    }
}

impl Effect for TwinklingStars {
    fn render(&mut self, tick: &mut Tick<'_>, canvas: &mut dyn Canvas, origin: Point) {
        let (cols, rows) = extent(canvas);
        if cols <= 0 || rows <= 0 {
            return;
        }
        if (cols, rows) != (self.cols, self.rows) {
            self.stars = vec![Star::default(); (cols * rows) as usize];
            (self.cols, self.rows) = (cols, rows);
        }

        for (i, star) in self.stars.iter_mut().enumerate() {
            star.brightness = (star.brightness - STAR_FADE).max(0.0);
            let (x, y) = (i as i32 % cols, i as i32 / cols);
            let shade = star.color.scale_video((star.brightness * 255.0) as u8);
            canvas.set_pixel(origin.x + x, origin.y + y, shade);
        }

        if self.spawn_gate.ready(tick.now_ms) {
            for _ in 0..tick.rng.gen_range(1..5) {
                let (x, y) = (tick.rng.gen_range(0..cols), tick.rng.gen_range(0..rows));
                let star = &mut self.stars[(y * cols + x) as usize];
                star.color = Color::from_hsv(STAR_HUE, tick.rng.gen_range(100..255), 255);
                star.brightness = 1.0;
                canvas.set_pixel(origin.x + x, origin.y + y, star.color);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::FrameBuffer;
    use crate::effects::testing::{render_at, rng};
    use pretty_assertions::assert_eq;

    #[test]
    fn no_firework_before_spawn_interval() {
        let mut fx = Fireworks::default();
        let mut rng = rng();
        let mut canvas = FrameBuffer::new(32, 8);
        for now in 0..SPAWN_INTERVAL_MS {
            render_at(&mut fx, &mut rng, &mut canvas, now);
        }
        assert!(fx.pool().iter().all(|f| f.phase == Phase::Inactive));
        assert_eq!(canvas.lit_count(), 0);
    }

    /// Slots launched during the last render: a fresh rocket has lost
    /// exactly one life step.
    fn fresh_launches(fx: &Fireworks) -> usize {
        fx.pool()
            .iter()
            .filter(|f| f.phase != Phase::Inactive && f.life == 255 - LIFE_STEP)
            .count()
    }

    #[test]
    fn launches_are_at_least_spawn_interval_apart() {
        let mut fx = Fireworks::default();
        let mut rng = rng();
        let mut canvas = FrameBuffer::new(32, 8);

        let mut launched_at = None;
        for now in SPAWN_INTERVAL_MS..SPAWN_INTERVAL_MS + 1_000 {
            render_at(&mut fx, &mut rng, &mut canvas, now);
            if fresh_launches(&fx) > 0 {
                launched_at = Some(now);
                break;
            }
        }
        let first = launched_at.expect("a rocket should launch within a second");
        assert_eq!(fresh_launches(&fx), 1);

        for now in first + 1..first + SPAWN_INTERVAL_MS {
            render_at(&mut fx, &mut rng, &mut canvas, now);
            assert_eq!(fresh_launches(&fx), 0, "second launch at {now}ms");
        }
    }

    #[test]
    fn full_pool_leaves_spawn_gate_unmarked() {
        let mut fx = Fireworks::default();
        let mut rng = rng();
        let mut canvas = FrameBuffer::new(32, 8);
        for _ in 0..MAX_FIREWORKS {
            fx.launch(&mut rng, 32, 8);
        }

        // Every attempt fails on a full pool, so the last spawn stays at 0.
        for now in 400..410 {
            render_at(&mut fx, &mut rng, &mut canvas, now);
        }
        assert!(fx.pool().iter().all(|f| f.phase != Phase::Inactive));
        assert!(fx.spawn_gate.is_due(410));

        // A freed slot is refilled without waiting another interval.
        fx.pool[2].phase = Phase::Inactive;
        let refilled = (0..100).any(|_| {
            render_at(&mut fx, &mut rng, &mut canvas, 410);
            fx.pool()[2].phase != Phase::Inactive
        });
        assert!(refilled);
        assert!(!fx.spawn_gate.is_due(410 + SPAWN_INTERVAL_MS - 1));
    }

    #[test]
    fn launch_fills_first_free_slot_until_full() {
        let mut fx = Fireworks::default();
        let mut rng = rng();
        for _ in 0..MAX_FIREWORKS {
            assert!(fx.launch(&mut rng, 32, 8));
        }
        assert!(!fx.launch(&mut rng, 32, 8), "full pool must refuse");

        let fw = fx.pool()[0];
        assert_eq!(fw.y, 7.0);
        assert_eq!(fw.life, 255);
        assert_eq!(fw.color, Color::WHITE);
        assert!((1.0..5.0).contains(&fw.peak));
    }

    #[test]
    fn rocket_rises_then_explodes_then_frees_slot() {
        let mut fx = Fireworks::default();
        let mut rng = rng();
        let mut canvas = FrameBuffer::new(32, 8);
        fx.launch(&mut rng, 32, 8);
        // Keep the spawner quiet.
        fx.spawn_gate.mark(u64::MAX);

        let mut saw_explosion = false;
        let mut last_y = 7.0;
        for _ in 0..51 {
            render_at(&mut fx, &mut rng, &mut canvas, 0);
            let fw = fx.pool()[0];
            if fw.phase == Phase::Active {
                assert!(fw.y < last_y);
                last_y = fw.y;
            } else {
                saw_explosion = true;
            }
        }
        assert!(saw_explosion);
        assert_eq!(fx.pool()[0].life, 0);
        assert_eq!(fx.pool()[0].phase, Phase::Inactive);
    }

    #[test]
    fn firework_life_never_increases_while_alive() {
        let mut fx = Fireworks::default();
        let mut rng = rng();
        let mut canvas = FrameBuffer::new(32, 8);
        let mut prev = fx.pool;

        for now in (0..60_000).step_by(20) {
            render_at(&mut fx, &mut rng, &mut canvas, now);
            for (before, after) in prev.iter().zip(fx.pool()) {
                if before.phase != Phase::Inactive && after.phase != Phase::Inactive {
                    assert!(after.life <= before.life);
                }
            }
            prev = fx.pool;
        }
    }

    #[test]
    fn explosion_flash_stays_inside_panel() {
        let mut fx = Fireworks::default();
        fx.pool[0] = Firework {
            x: 0.0,
            y: 0.0,
            life: 100,
            phase: Phase::Exploded,
            color: Color::WHITE,
            peak: 1.0,
            speed: 0.3,
        };
        fx.spawn_gate.mark(u64::MAX);
        let mut canvas = FrameBuffer::new(4, 4);
        render_at(&mut fx, &mut rng(), &mut canvas, 0);
        assert_eq!(canvas.lit_count(), 3);
        assert!(canvas.get(1, 0).is_some_and(|c| !c.is_black()));
        assert!(canvas.get(0, 1).is_some_and(|c| !c.is_black()));
    }

    #[test]
    fn raindrops_fall_half_a_pixel_per_tick() {
        let mut rain = Raindrops::default();
        // A full pool so nothing else spawns.
        rain.pool = [Raindrop {
            column: 7,
            pos: 0.0,
            color: Color::WHITE,
            phase: Phase::Active,
        }; MAX_DROPS];
        rain.pool[0] = Raindrop {
            column: 3,
            pos: 0.0,
            color: Color::RED,
            phase: Phase::Active,
        };
        let mut canvas = FrameBuffer::new(8, 4);
        let mut rng = rng();

        render_at(&mut rain, &mut rng, &mut canvas, 0);
        assert_eq!(rain.pool[0].pos, 0.5);
        assert_eq!(canvas.get(3, 0), Some(Color::RED));

        render_at(&mut rain, &mut rng, &mut canvas, 0);
        assert_eq!(canvas.get(3, 1), Some(Color::RED));
        assert_eq!(canvas.get(3, 0), Some(Color::BLACK));
    }

    #[test]
    fn raindrop_past_bottom_is_recycled() {
        let mut rain = Raindrops::default();
        rain.pool[0] = Raindrop {
            column: 0,
            pos: 4.0,
            color: Color::RED,
            phase: Phase::Active,
        };
        let mut canvas = FrameBuffer::new(8, 4);
        render_at(&mut rain, &mut rng(), &mut canvas, 0);
        assert_eq!(rain.pool[0].phase, Phase::Inactive);
    }

    #[test]
    fn raindrop_pool_never_exceeds_capacity() {
        let mut rain = Raindrops::default();
        let mut rng = rng();
        let mut canvas = FrameBuffer::new(32, 8);
        for now in 0..2_000 {
            render_at(&mut rain, &mut rng, &mut canvas, now);
            assert!(rain.active_count() <= MAX_DROPS);
            assert!(canvas.lit_count() <= MAX_DROPS);
        }
        assert!(rain.active_count() > 0);
    }

    #[test]
    fn stars_spawn_on_gate_and_fade_every_tick() {
        let mut stars = TwinklingStars::default();
        let mut rng = rng();
        let mut canvas = FrameBuffer::new(16, 8);

        render_at(&mut stars, &mut rng, &mut canvas, 0);
        assert_eq!(stars.lit_count(), 0);

        render_at(&mut stars, &mut rng, &mut canvas, 251);
        let lit = stars.lit_count();
        assert!((1..=4).contains(&lit), "spawned {lit}");

        // Without further spawns every star fades out within 100 ticks.
        for _ in 0..101 {
            render_at(&mut stars, &mut rng, &mut canvas, 300);
        }
        assert_eq!(stars.lit_count(), 0);
        assert_eq!(canvas.lit_count(), 0);
    }
}
