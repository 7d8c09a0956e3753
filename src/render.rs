//! Render thread: runs the active effect and presents frames to the panel.
//!
//! The `rpi-led-matrix` C library is not thread-safe, so all matrix
//! operations happen on a single dedicated thread. The async HTTP server
//! talks to that thread by sending [`RenderCommand`] values through an
//! `mpsc` channel and reads back a shared [`DisplayStatus`].
//!
//! Each frame the thread clears an off-screen [`FrameBuffer`], dispatches
//! the active effect into it and hands the result to a [`FrameSink`]. The
//! real panel is one sink; tests use an in-memory one.
//!
//! ## Rust concepts
//! - `std::sync::mpsc` channels for thread communication
//! - `enum` with data variants (tagged unions)
//! - `Arc<Mutex<T>>` for shared mutable state
//! - `try_recv()` for non-blocking channel reads
//! - Generic functions over a trait (`impl FrameSink`)

use crate::canvas::{Canvas, FrameBuffer, Point};
use crate::registry::{Dispatcher, Registry};
use crate::{Color, PanelConfig};
use serde::Serialize;
use std::sync::mpsc::{Receiver, TryRecvError};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::Duration;

#[cfg(feature = "hardware")]
use crate::create_matrix;
#[cfg(feature = "hardware")]
use rpi_led_matrix::{LedCanvas, LedMatrix};

pub const DEFAULT_BRIGHTNESS: u8 = 75;

// ── Commands ─────────────────────────────────────────────────────────

/// Commands sent from the HTTP server to the render thread.
///
/// Rust concept: ENUMS WITH DATA
/// Unlike C enums (just numbers), Rust enums can carry data in each variant.
/// The compiler ensures you handle every variant when pattern matching.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RenderCommand {
    /// Start (or resume) the effect at this registry index
    PlayEffect(usize),
    /// Stop the effect and blank the panel
    Clear,
    /// Stop the effect, leaving the last frame on the panel
    Stop,
    /// Set display brightness (0-100)
    SetBrightness(u8),
}

// ── Status ───────────────────────────────────────────────────────────

/// What the display is currently doing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DisplayState {
    Idle,
    PlayingEffect,
}

/// Shared status that the HTTP server can read to report current state.
///
/// Rust concept: Arc<Mutex<T>>
/// `Arc` = atomic reference counting (shared ownership across threads)
/// `Mutex` = mutual exclusion (only one thread can access at a time)
#[derive(Clone, Debug, Serialize, utoipa::ToSchema)]
pub struct DisplayStatus {
    /// Current display state
    pub state: DisplayState,
    /// Name of the effect being played (if any)
    pub current_effect: Option<String>,
    /// Current brightness (0-100)
    pub brightness: u8,
    /// Server version
    pub version: String,
}

impl DisplayStatus {
    pub fn new() -> Self {
        Self {
            state: DisplayState::Idle,
            current_effect: None,
            brightness: DEFAULT_BRIGHTNESS,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    pub fn set_idle(&mut self) {
        self.state = DisplayState::Idle;
        self.current_effect = None;
    }
}

impl Default for DisplayStatus {
    fn default() -> Self {
        Self::new()
    }
}

/// Lock the shared status. A panic elsewhere never leaves the status
/// half-written, so a poisoned lock is still safe to use.
pub fn lock_status(status: &Mutex<DisplayStatus>) -> MutexGuard<'_, DisplayStatus> {
    status.lock().unwrap_or_else(PoisonError::into_inner)
}

// ── Frame sinks ──────────────────────────────────────────────────────

/// Somewhere finished frames go.
pub trait FrameSink {
    /// Show `frame`, scaled by `brightness` (0-100).
    fn present(&mut self, frame: &FrameBuffer, brightness: u8);
}

/// The LED panel, driven through double buffering.
#[cfg(feature = "hardware")]
pub struct MatrixSink {
    matrix: LedMatrix,
    canvas: Option<LedCanvas>,
}

#[cfg(feature = "hardware")]
impl MatrixSink {
    pub fn new(panel: PanelConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let matrix = create_matrix(panel)?;
        let canvas = Some(matrix.offscreen_canvas());
        Ok(Self { matrix, canvas })
    }
}

#[cfg(feature = "hardware")]
impl FrameSink for MatrixSink {
    fn present(&mut self, frame: &FrameBuffer, brightness: u8) {
        let Some(mut canvas) = self.canvas.take() else {
            return;
        };
        let width = frame.width() as usize;
        for (i, &color) in frame.pixels().iter().enumerate() {
            let (x, y) = ((i % width) as i32, (i / width) as i32);
            canvas.set(x, y, &color.apply_brightness(brightness).into());
        }
        self.canvas = Some(self.matrix.swap(canvas));
    }
}

// ── Render loop ──────────────────────────────────────────────────────

/// Knobs for the render loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RenderSettings {
    pub panel: PanelConfig,
    /// Pause between frames while an effect is playing
    pub frame_interval: Duration,
    /// Brightness at startup (0-100)
    pub brightness: u8,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            panel: PanelConfig::default(),
            frame_interval: Duration::from_millis(10),
            brightness: DEFAULT_BRIGHTNESS,
        }
    }
}

/// Everything the render thread owns between frames.
struct Session<S> {
    dispatcher: Dispatcher,
    sink: S,
    frame: FrameBuffer,
    status: Arc<Mutex<DisplayStatus>>,
    active: Option<usize>,
    brightness: u8,
}

impl<S: FrameSink> Session<S> {
    fn apply(&mut self, cmd: RenderCommand) {
        match cmd {
            RenderCommand::PlayEffect(index) => {
                let Some(name) = self.dispatcher.registry().name(index) else {
                    tracing::warn!("Ignoring unknown effect index {}", index);
                    return;
                };
                self.active = Some(index);
                let mut s = lock_status(&self.status);
                s.state = DisplayState::PlayingEffect;
                s.current_effect = Some(name.to_string());
                tracing::info!("Playing effect: {}", name);
            }

            RenderCommand::Clear => {
                self.active = None;
                self.frame.clear(Color::BLACK);
                self.sink.present(&self.frame, self.brightness);
                lock_status(&self.status).set_idle();
            }

            RenderCommand::Stop => {
                self.active = None;
                lock_status(&self.status).set_idle();
            }

            RenderCommand::SetBrightness(value) => {
                self.brightness = value.min(100);
                lock_status(&self.status).brightness = self.brightness;
                tracing::info!("Brightness set to {}", self.brightness);
            }
        }
    }

    fn render_frame(&mut self, index: usize) {
        self.frame.clear(Color::BLACK);
        self.dispatcher.dispatch(index, &mut self.frame, Point::ORIGIN);
        self.sink.present(&self.frame, self.brightness);
    }
}

/// Main render loop: runs on a dedicated thread and owns the sink.
///
/// Returns once the channel is closed (every sender dropped).
///
/// ## Interrupt pattern
/// While idle the loop blocks on `recv()`. While an effect is playing it
/// drains pending commands with `try_recv()` between frames, so a command
/// never lands in the middle of an effect update.
pub fn render_loop<S: FrameSink>(
    rx: Receiver<RenderCommand>,
    status: Arc<Mutex<DisplayStatus>>,
    registry: Arc<Registry>,
    sink: S,
    settings: RenderSettings,
) {
    let brightness = settings.brightness.min(100);
    lock_status(&status).brightness = brightness;

    let mut session = Session {
        dispatcher: Dispatcher::new(registry),
        sink,
        frame: FrameBuffer::new(settings.panel.cols, settings.panel.rows),
        status,
        active: None,
        brightness,
    };

    tracing::info!("Render thread started, waiting for commands...");

    'frames: loop {
        let Some(index) = session.active else {
            match rx.recv() {
                Ok(cmd) => session.apply(cmd),
                Err(_) => break 'frames,
            }
            continue;
        };

        loop {
            match rx.try_recv() {
                Ok(cmd) => session.apply(cmd),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => break 'frames,
            }
        }
        // A command above may have switched or stopped the effect.
        if session.active != Some(index) {
            continue;
        }

        session.render_frame(index);
        thread::sleep(settings.frame_interval);
    }

    tracing::info!("Render thread: channel closed, shutting down.");
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::mpsc;

    type Presented = Arc<Mutex<Vec<(FrameBuffer, u8)>>>;

    /// Records every frame it is given.
    #[derive(Clone, Default)]
    struct RecordingSink(Presented);

    impl FrameSink for RecordingSink {
        fn present(&mut self, frame: &FrameBuffer, brightness: u8) {
            self.0.lock().unwrap().push((frame.clone(), brightness));
        }
    }

    fn settings() -> RenderSettings {
        RenderSettings {
            panel: PanelConfig::new(8, 32),
            frame_interval: Duration::from_millis(1),
            brightness: 60,
        }
    }

    /// Run the loop on its own thread until `script` returns and the
    /// sender is dropped.
    fn run(script: impl FnOnce(&mpsc::Sender<RenderCommand>, &Presented)) -> (Presented, DisplayStatus) {
        let (tx, rx) = mpsc::channel();
        let status = Arc::new(Mutex::new(DisplayStatus::new()));
        let sink = RecordingSink::default();
        let presented = sink.0.clone();
        let registry = Arc::new(Registry::builtin());

        let thread_status = status.clone();
        let handle = thread::spawn(move || render_loop(rx, thread_status, registry, sink, settings()));
        script(&tx, &presented);
        drop(tx);
        handle.join().unwrap();

        let status = status.lock().unwrap().clone();
        (presented, status)
    }

    #[test]
    fn idle_loop_presents_nothing_and_exits_on_close() {
        let (presented, status) = run(|_, _| {});
        assert!(presented.lock().unwrap().is_empty());
        assert_eq!(status.state, DisplayState::Idle);
        assert_eq!(status.brightness, 60);
    }

    #[test]
    fn playing_an_effect_presents_frames() {
        let index = Registry::builtin().lookup_index("Checkerboard").unwrap();
        let (presented, status) = run(|tx, _| {
            tx.send(RenderCommand::PlayEffect(index)).unwrap();
            thread::sleep(Duration::from_millis(50));
        });

        let frames = presented.lock().unwrap();
        assert!(!frames.is_empty());
        let (frame, brightness) = &frames[0];
        assert_eq!((frame.width(), frame.height()), (32, 8));
        assert_eq!(frame.lit_count(), 32 * 8);
        assert_eq!(*brightness, 60);
        assert_eq!(status.state, DisplayState::PlayingEffect);
        assert_eq!(status.current_effect.as_deref(), Some("Checkerboard"));
    }

    #[test]
    fn stop_halts_presentation() {
        let index = Registry::builtin().lookup_index("Plasma").unwrap();
        let (presented, status) = run(|tx, presented| {
            tx.send(RenderCommand::PlayEffect(index)).unwrap();
            thread::sleep(Duration::from_millis(30));
            tx.send(RenderCommand::Stop).unwrap();
            thread::sleep(Duration::from_millis(30));
            let after_stop = presented.lock().unwrap().len();
            thread::sleep(Duration::from_millis(30));
            assert_eq!(presented.lock().unwrap().len(), after_stop);
        });
        assert!(!presented.lock().unwrap().is_empty());
        assert_eq!(status.state, DisplayState::Idle);
        assert_eq!(status.current_effect, None);
    }

    #[test]
    fn clear_presents_one_black_frame() {
        let (presented, status) = run(|tx, _| {
            tx.send(RenderCommand::Clear).unwrap();
        });
        let frames = presented.lock().unwrap();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].0.lit_count(), 0);
        assert_eq!(status.state, DisplayState::Idle);
    }

    #[test]
    fn brightness_is_clamped_and_reported() {
        let (presented, status) = run(|tx, _| {
            tx.send(RenderCommand::SetBrightness(250)).unwrap();
            tx.send(RenderCommand::Clear).unwrap();
        });
        assert_eq!(status.brightness, 100);
        assert_eq!(presented.lock().unwrap()[0].1, 100);
    }

    #[test]
    fn unknown_effect_index_is_ignored() {
        let (presented, status) = run(|tx, _| {
            tx.send(RenderCommand::PlayEffect(999)).unwrap();
        });
        assert!(presented.lock().unwrap().is_empty());
        assert_eq!(status.state, DisplayState::Idle);
    }
}
