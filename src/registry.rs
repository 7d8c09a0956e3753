//! Effect lookup and dispatch.
//!
//! The [`Registry`] is an ordered, read-only table of named effect
//! factories. It is built once at startup and shared behind an `Arc`
//! between the HTTP server (which resolves names) and the render thread
//! (which dispatches by index).
//!
//! The [`Dispatcher`] owns one lazily created state slot per registered
//! effect, plus the process-wide random generator. A slot is created the
//! first time its effect is dispatched and is never reset afterwards, so
//! switching back to an effect resumes where it stopped.
//!
//! ## Rust concepts
//! - `Option<Box<dyn Trait>>` as a lazily initialized slot
//! - `get_or_insert_with` to create state on first use
//! - `let ... else` for early returns

use crate::canvas::{Canvas, Point};
use crate::effects::{BUILTIN, Effect, EffectFactory, Tick};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::sync::Arc;
use std::time::Instant;

/// A named effect. Immutable once registered.
#[derive(Clone, Copy, Debug)]
pub struct EffectEntry {
    pub name: &'static str,
    pub factory: EffectFactory,
}

#[derive(Debug, Default)]
pub struct Registry {
    entries: Vec<EffectEntry>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every effect shipped with the crate, in its fixed order.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for &(name, factory) in BUILTIN {
            registry.register(name, factory);
        }
        registry
    }

    /// Append an effect. Names are not checked for uniqueness; lookups
    /// return the first match.
    pub fn register(&mut self, name: &'static str, factory: EffectFactory) {
        self.entries.push(EffectEntry { name, factory });
    }

    /// Index of the first effect called exactly `name` (case-sensitive).
    pub fn lookup_index(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.name == name)
    }

    pub fn name(&self, index: usize) -> Option<&'static str> {
        self.entries.get(index).map(|e| e.name)
    }

    /// `(index, name)` pairs in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &'static str)> + '_ {
        self.entries.iter().enumerate().map(|(i, e)| (i, e.name))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Runs effects by index, keeping each one's state alive between calls.
pub struct Dispatcher {
    registry: Arc<Registry>,
    slots: Vec<Option<Box<dyn Effect>>>,
    rng: StdRng,
    epoch: Instant,
}

impl Dispatcher {
    /// A dispatcher whose random generator is seeded from OS entropy.
    pub fn new(registry: Arc<Registry>) -> Self {
        Self::with_rng(registry, StdRng::from_entropy())
    }

    /// A dispatcher with a fixed seed, for reproducible runs.
    pub fn with_seed(registry: Arc<Registry>, seed: u64) -> Self {
        Self::with_rng(registry, StdRng::seed_from_u64(seed))
    }

    fn with_rng(registry: Arc<Registry>, rng: StdRng) -> Self {
        let slots = std::iter::repeat_with(|| None).take(registry.len()).collect();
        Self {
            registry,
            slots,
            rng,
            epoch: Instant::now(),
        }
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Whether the effect at `index` has been dispatched at least once.
    pub fn is_initialized(&self, index: usize) -> bool {
        matches!(self.slots.get(index), Some(Some(_)))
    }

    /// Render one tick of the effect at `index`, timed by this dispatcher's
    /// clock. See [`Dispatcher::dispatch_at`].
    pub fn dispatch(&mut self, index: usize, canvas: &mut dyn Canvas, origin: Point) -> bool {
        let now_ms = self.epoch.elapsed().as_millis() as u64;
        self.dispatch_at(index, canvas, origin, now_ms)
    }

    /// Render one tick of the effect at `index` at time `now_ms`.
    ///
    /// Returns `false` without touching any state or the canvas when
    /// `index` is out of range.
    pub fn dispatch_at(
        &mut self,
        index: usize,
        canvas: &mut dyn Canvas,
        origin: Point,
        now_ms: u64,
    ) -> bool {
        let Some(entry) = self.registry.entries.get(index) else {
            return false;
        };
        let effect = self.slots[index].get_or_insert_with(|| {
            tracing::debug!(effect = entry.name, index, "creating effect state");
            (entry.factory)()
        });

        let mut tick = Tick::new(now_ms, &mut self.rng);
        effect.render(&mut tick, canvas, origin);
        true
    }
}
