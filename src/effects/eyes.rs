//! A pair of cartoon eyes that blink and glance around.

use super::{Effect, Tick, extent};
use crate::Color;
use crate::canvas::{Canvas, Point};
use rand::Rng;

const EYE_SIZE: u32 = 8;
const PUPIL_SIZE: u32 = 2;
const W: u16 = 0xFFFF;
const B: u16 = 0x0000;

/// RGB565 eye bitmaps from wide open (0) to shut (4).
#[rustfmt::skip]
const EYE_FRAMES: [[u16; 64]; 5] = [
    [
        B, B, W, W, W, W, B, B,
        B, W, W, W, W, W, W, B,
        W, W, W, W, W, W, W, W,
        W, W, W, W, W, W, W, W,
        W, W, W, W, W, W, W, W,
        W, W, W, W, W, W, W, W,
        B, W, W, W, W, W, W, B,
        B, B, W, W, W, W, B, B,
    ],
    [
        B, B, B, B, B, B, B, B,
        B, W, W, W, W, W, W, B,
        W, W, W, W, W, W, W, W,
        W, W, W, W, W, W, W, W,
        W, W, W, W, W, W, W, W,
        W, W, W, W, W, W, W, W,
        B, W, W, W, W, W, W, B,
        B, B, W, W, W, W, B, B,
    ],
    [
        B, B, B, B, B, B, B, B,
        B, B, B, B, B, B, B, B,
        B, B, W, W, W, W, B, B,
        W, W, W, W, W, W, W, W,
        W, W, W, W, W, W, W, W,
        W, W, W, W, W, W, W, W,
        B, W, W, W, W, W, W, B,
        B, B, B, B, B, B, B, B,
    ],
    [
        B, B, B, B, B, B, B, B,
        B, B, B, B, B, B, B, B,
        B, B, B, B, B, B, B, B,
        B, B, W, W, W, W, B, B,
        W, W, W, W, W, W, W, W,
        B, W, W, W, W, W, W, B,
        B, B, B, W, W, B, B, B,
        B, B, B, B, B, B, B, B,
    ],
    [
        B, B, B, B, B, B, B, B,
        B, B, B, B, B, B, B, B,
        B, B, B, B, B, B, B, B,
        B, B, B, B, B, B, B, B,
        W, B, B, B, B, B, B, W,
        B, W, W, W, W, W, W, B,
        B, B, B, B, B, B, B, B,
        B, B, B, B, B, B, B, B,
    ],
];

/// Frames shown while blinking, indexed by the blink countdown.
const BLINK: [usize; 7] = [1, 2, 3, 4, 3, 2, 1];
const BLINK_WAIT: std::ops::Range<u32> = 60..350;
const GAZE_FRAMES: std::ops::Range<i32> = 15..40;
const GAZE_HOLD_MAX: i32 = 120;
/// Glances never land this close (squared distance) to `GAZE_CENTER`.
const GAZE_DEAD_ZONE: i32 = 3;
const GAZE_CENTER: Point = Point::new(4, 4);
const GAZE_SPAN: i32 = 6;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Gaze {
    rest: Point,
    target: Point,
    delta: Point,
    frames: i32,
    countdown: i32,
}

impl Gaze {
    /// Pupil position at the current countdown: at rest until the glance
    /// starts, then sliding from `rest` to `target` over `frames` calls.
    fn pupil(&self) -> Point {
        if self.countdown >= self.frames {
            return self.rest;
        }
        Point::new(
            self.target.x - self.delta.x * self.countdown / self.frames,
            self.target.y - self.delta.y * self.countdown / self.frames,
        )
    }

    fn retarget(&mut self, rng: &mut impl Rng) {
        let candidates: Vec<Point> = (0..GAZE_SPAN)
            .flat_map(|y| (0..GAZE_SPAN).map(move |x| Point::new(x, y)))
            .filter(|p| {
                let (dx, dy) = (p.x - GAZE_CENTER.x, p.y - GAZE_CENTER.y);
                dx * dx + dy * dy > GAZE_DEAD_ZONE
            })
            .collect();

        self.rest = self.target;
        self.target = candidates[rng.gen_range(0..candidates.len())];
        self.delta = Point::new(self.target.x - self.rest.x, self.target.y - self.rest.y);
        self.frames = rng.gen_range(GAZE_FRAMES);
        self.countdown = rng.gen_range(self.frames..GAZE_HOLD_MAX);
    }
}

#[derive(Debug)]
pub struct LookingEyes {
    blink_countdown: u32,
    gaze: Gaze,
}

impl Default for LookingEyes {
    fn default() -> Self {
        let rest = Point::new(3, 3);
        Self {
            blink_countdown: 60,
            gaze: Gaze {
                rest,
                target: rest,
                delta: Point::ORIGIN,
                frames: 5,
                countdown: 30,
            },
        }
    }
}

impl LookingEyes {
    /// Index into the eye frames drawn on the next tick.
    pub fn blink_frame(&self) -> usize {
        BLINK.get(self.blink_countdown as usize).copied().unwrap_or(0)
    }

    /// Top-left corner of the pupil relative to each eye.
    pub fn pupil(&self) -> Point {
        self.gaze.pupil()
    }
}

impl Effect for LookingEyes {
    fn render(&mut self, tick: &mut Tick<'_>, canvas: &mut dyn Canvas, origin: Point) {
        let (cols, _) = extent(canvas);
        let eyes = [
            origin.offset(Point::new(cols / 2 - 10, 0)),
            origin.offset(Point::new(cols / 2 + 2, 0)),
        ];

        let bitmap = &EYE_FRAMES[self.blink_frame()];
        for eye in eyes {
            canvas.draw_bitmap(eye.x, eye.y, bitmap, EYE_SIZE, EYE_SIZE);
        }
        if self.blink_countdown == 0 {
            self.blink_countdown = tick.rng.gen_range(BLINK_WAIT);
        } else {
            self.blink_countdown -= 1;
        }

        self.gaze.countdown -= 1;
        let pupil = self.gaze.pupil();
        for eye in eyes {
            let at = eye.offset(pupil);
            canvas.fill_region(at.x, at.y, PUPIL_SIZE, PUPIL_SIZE, Color::BLACK);
        }
        if self.gaze.countdown == 0 {
            self.gaze.retarget(tick.rng);
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
    fn open_eyes_with_centred_pupils() {
        let mut eyes = LookingEyes::default();
        let mut rng = rng();
        let mut canvas = FrameBuffer::new(32, 8);
        render_at(&mut eyes, &mut rng, &mut canvas, 0);

        for left in [6, 18] {
            assert_eq!(canvas.get(left, 0), Some(Color::BLACK));
            assert_eq!(canvas.get(left + 2, 0), Some(Color::WHITE));
            assert_eq!(canvas.get(left, 3), Some(Color::WHITE));
            for (dx, dy) in [(3, 3), (4, 3), (3, 4), (4, 4)] {
                assert_eq!(canvas.get(left + dx, dy), Some(Color::BLACK));
            }
        }
        assert_eq!(canvas.get(0, 4), Some(Color::BLACK));
    }

    #[test]
    fn blink_runs_through_seven_frames() {
        let mut eyes = LookingEyes::default();
        let mut rng = rng();
        let mut canvas = FrameBuffer::new(32, 8);
        eyes.blink_countdown = 6;

        let mut frames = Vec::new();
        for now in 0..7 {
            frames.push(eyes.blink_frame());
            render_at(&mut eyes, &mut rng, &mut canvas, now);
        }
        assert_eq!(frames, vec![1, 2, 3, 4, 3, 2, 1]);
        assert!(BLINK_WAIT.contains(&eyes.blink_countdown));
        assert_eq!(eyes.blink_frame(), 0);
    }

    #[test]
    fn shut_eye_frame_is_drawn() {
        let mut eyes = LookingEyes::default();
        let mut rng = rng();
        let mut canvas = FrameBuffer::new(32, 8);
        eyes.blink_countdown = 3;
        render_at(&mut eyes, &mut rng, &mut canvas, 0);
        // Frame 4 only lights the lid line.
        assert_eq!(canvas.get(6, 4), Some(Color::WHITE));
        assert_eq!(canvas.get(8, 2), Some(Color::BLACK));
    }

    #[test]
    fn gaze_stays_inside_the_eye_and_wanders() {
        let mut eyes = LookingEyes::default();
        let mut rng = rng();
        let mut canvas = FrameBuffer::new(32, 8);
        let mut moved = false;
        for now in 0..2_000 {
            render_at(&mut eyes, &mut rng, &mut canvas, now);
            let pupil = eyes.pupil();
            assert!((0..GAZE_SPAN).contains(&pupil.x), "{pupil:?}");
            assert!((0..GAZE_SPAN).contains(&pupil.y), "{pupil:?}");
            moved |= pupil != Point::new(3, 3);
        }
        assert!(moved);
    }

    #[test]
    fn glance_targets_avoid_the_centre() {
        let mut gaze = LookingEyes::default().gaze;
        let mut rng = rng();
        for _ in 0..200 {
            gaze.retarget(&mut rng);
            let (dx, dy) = (gaze.target.x - GAZE_CENTER.x, gaze.target.y - GAZE_CENTER.y);
            assert!(dx * dx + dy * dy > GAZE_DEAD_ZONE);
            assert!(GAZE_FRAMES.contains(&gaze.frames));
            assert!((gaze.frames..GAZE_HOLD_MAX).contains(&gaze.countdown));
        }
    }

    #[test]
    fn glance_slides_from_rest_to_target() {
        let mut gaze = Gaze {
            rest: Point::new(0, 0),
            target: Point::new(5, 0),
            delta: Point::new(5, 0),
            frames: 5,
            countdown: 5,
        };
        let mut path = Vec::new();
        while gaze.countdown > 0 {
            gaze.countdown -= 1;
            path.push(gaze.pupil().x);
        }
        assert_eq!(path, vec![1, 2, 3, 4, 5]);
    }
}
