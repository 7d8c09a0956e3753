//! Animated effects.
//!
//! Every effect is a plain struct holding its own state and implementing
//! [`Effect`]. The dispatcher creates the struct the first time its effect
//! is selected and keeps it for the rest of the process, so an effect picks
//! up where it left off when it is selected again.
//!
//! One call to [`Effect::render`] is one tick. A tick consults the effect's
//! [`Gate`](crate::timing::Gate)s to decide what to advance, then always
//! repaints the effect's region of the canvas from its current state.
//!
//! ## Rust concepts
//! - Trait objects (`Box<dyn Effect>`) for a heterogeneous collection
//! - Function pointers (`fn() -> Box<dyn Effect>`) as factories
//! - Borrowing a shared resource (`&mut StdRng`) for the duration of a call

pub mod ambient;
pub mod arcade;
pub mod eyes;
pub mod fields;
pub mod particles;
pub mod snake;

use crate::canvas::{Canvas, Point};
use rand::rngs::StdRng;

pub use ambient::{
    Checkerboard, ColorWaves, MatrixRain, Pacifica, Plasma, Swirl, SwirlDirection, TheaterChase,
};
pub use arcade::{BrickBreaker, PingPong};
pub use eyes::LookingEyes;
pub use fields::{PlasmaCloud, Radar, Ripple};
pub use particles::{Fireworks, Raindrops, TwinklingStars};
pub use snake::SnakeGame;

/// Per-call context handed to an effect.
pub struct Tick<'a> {
    /// Wall-clock milliseconds since the dispatcher started.
    pub now_ms: u64,
    /// The process-wide random generator. Effects never seed their own.
    pub rng: &'a mut StdRng,
}

impl<'a> Tick<'a> {
    pub fn new(now_ms: u64, rng: &'a mut StdRng) -> Self {
        Self { now_ms, rng }
    }
}

/// A self-contained animation.
pub trait Effect {
    /// Run one tick: maybe advance state, then paint the region whose
    /// top-left corner is `origin` and whose size is the canvas size.
    fn render(&mut self, tick: &mut Tick<'_>, canvas: &mut dyn Canvas, origin: Point);
}

/// Creates a fresh effect state.
pub type EffectFactory = fn() -> Box<dyn Effect>;

fn boxed<E: Effect + Default + 'static>() -> Box<dyn Effect> {
    Box::new(E::default())
}

fn swirl_in() -> Box<dyn Effect> {
    Box::new(Swirl::inward())
}

fn swirl_out() -> Box<dyn Effect> {
    Box::new(Swirl::outward())
}

/// Every effect shipped with the crate, in registration order.
pub const BUILTIN: &[(&str, EffectFactory)] = &[
    ("BrickBreaker", boxed::<BrickBreaker>),
    ("PingPong", boxed::<PingPong>),
    ("Radar", boxed::<Radar>),
    ("Raindrops", boxed::<Raindrops>),
    ("Checkerboard", boxed::<Checkerboard>),
    ("Fireworks", boxed::<Fireworks>),
    ("PlasmaCloud", boxed::<PlasmaCloud>),
    ("Ripple", boxed::<Ripple>),
    ("Snake", boxed::<SnakeGame>),
    ("Pacifica", boxed::<Pacifica>),
    ("TheaterChase", boxed::<TheaterChase>),
    ("Plasma", boxed::<Plasma>),
    ("Matrix", boxed::<MatrixRain>),
    ("SwirlIn", swirl_in),
    ("SwirlOut", swirl_out),
    ("LookingEyes", boxed::<LookingEyes>),
    ("TwinklingStars", boxed::<TwinklingStars>),
    ("ColorWaves", boxed::<ColorWaves>),
];

/// Size of the effect's region as signed grid extents.
pub(crate) fn extent(canvas: &dyn Canvas) -> (i32, i32) {
    (canvas.width() as i32, canvas.height() as i32)
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::canvas::FrameBuffer;
    use rand::SeedableRng;

    pub fn rng() -> StdRng {
        StdRng::seed_from_u64(0x5EED)
    }

    /// Render `effect` once at `now_ms` onto `canvas` with the origin at zero.
    pub fn render_at(effect: &mut dyn Effect, rng: &mut StdRng, canvas: &mut FrameBuffer, now_ms: u64) {
        let mut tick = Tick::new(now_ms, rng);
        effect.render(&mut tick, canvas, Point::ORIGIN);
    }
}

#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;
    use crate::canvas::FrameBuffer;
    use std::collections::HashSet;

    #[test]
    fn builtin_names_are_unique() {
        let names: HashSet<&str> = BUILTIN.iter().map(|(name, _)| *name).collect();
        assert_eq!(names.len(), BUILTIN.len());
    }

    #[test]
    fn every_builtin_paints_without_panicking() {
        let mut rng = rng();
        for (name, factory) in BUILTIN {
            let mut effect = factory();
            let mut canvas = FrameBuffer::new(32, 8);
            for step in 0..200 {
                render_at(effect.as_mut(), &mut rng, &mut canvas, step * 17);
            }
            // Eyes, arcade games and animations all leave something lit on
            // a 32x8 panel after a few seconds of simulated time.
            assert!(canvas.lit_count() > 0, "{name} left the canvas dark");
        }
    }

    #[test]
    fn every_builtin_tolerates_an_empty_canvas() {
        let mut rng = rng();
        for (_, factory) in BUILTIN {
            let mut effect = factory();
            let mut canvas = FrameBuffer::new(0, 0);
            for step in 0..10 {
                render_at(effect.as_mut(), &mut rng, &mut canvas, step * 100);
            }
        }
    }
}
