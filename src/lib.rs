//! Stateful animated effects for RGB LED matrix panels.
//!
//! The core of the crate is hardware-independent:
//! - [`canvas`]: the drawing surface every effect paints onto
//! - [`palette`] and [`wave`]: colour and waveform primitives
//! - [`timing`]: the per-effect update gate
//! - [`effects`]: the effects themselves, each owning its private state
//! - [`registry`]: name lookup and index-based dispatch
//!
//! Around it sit the render thread ([`render`]) and the HTTP API ([`server`])
//! used by the main binary, plus the shared panel/colour helpers below.

pub mod canvas;
pub mod effects;
pub mod palette;
pub mod registry;
pub mod render;
pub mod server;
pub mod timing;
pub mod wave;

#[cfg(feature = "hardware")]
use rpi_led_matrix::{LedMatrix, LedMatrixOptions, LedRuntimeOptions};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

// ── Panel configuration ────────────────────────────────────────────

/// Configuration for the LED panel dimensions.
///
/// # Rust concept: derive macros
/// `Clone, Copy` make this cheaply copyable (it's just two u32s).
/// `Debug` gives us `{:?}` formatting. `PartialEq, Eq` let us compare.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PanelConfig {
    pub rows: u32,
    pub cols: u32,
}

impl PanelConfig {
    pub fn new(rows: u32, cols: u32) -> Self {
        Self { rows, cols }
    }

    /// Total number of pixels on the panel.
    pub fn pixel_count(&self) -> u32 {
        self.rows * self.cols
    }
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self { rows: 64, cols: 64 }
    }
}

// ── Color ──────────────────────────────────────────────────────────

/// Our own color type, decoupled from the hardware crate.
///
/// Effects and tests only ever see this type. At the hardware boundary we
/// convert via `Into<LedColor>`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Scale `value` by `scale / 256`.
#[inline]
pub fn scale8(value: u8, scale: u8) -> u8 {
    ((value as u16 * scale as u16) >> 8) as u8
}

/// Like [`scale8`], but a non-zero value never scales down to zero
/// unless `scale` is zero.
#[inline]
pub fn scale8_video(value: u8, scale: u8) -> u8 {
    let scaled = scale8(value, scale);
    if value != 0 && scale != 0 && scaled == 0 {
        1
    } else {
        scaled
    }
}

impl Color {
    pub const BLACK: Self = Self::new(0, 0, 0);
    pub const WHITE: Self = Self::new(255, 255, 255);
    pub const RED: Self = Self::new(255, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Build a color from a packed `0xRRGGBB` value.
    pub const fn from_hex(rgb: u32) -> Self {
        Self::new((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8)
    }

    /// Create a color from hue, saturation and value, all on a 0-255 scale.
    ///
    /// The hue wheel wraps at 256, which is what lets effects drive it with
    /// a wrapping `u8` counter.
    pub fn from_hsv(hue: u8, sat: u8, val: u8) -> Self {
        let h6 = hue as u32 * 6;
        let region = h6 / 256;
        let remainder = h6 % 256;
        let (s, v) = (sat as u32, val as u32);

        let p = (v * (255 - s) / 255) as u8;
        let q = (v * (255 - s * remainder / 255) / 255) as u8;
        let t = (v * (255 - s * (255 - remainder) / 255) / 255) as u8;
        let v = val;

        match region {
            0 => Self::new(v, t, p),
            1 => Self::new(q, v, p),
            2 => Self::new(p, v, t),
            3 => Self::new(p, q, v),
            4 => Self::new(t, p, v),
            _ => Self::new(v, p, q),
        }
    }

    /// Expand a 16-bit RGB565 pixel, as stored in bitmaps.
    pub fn from_rgb565(pixel: u16) -> Self {
        let r = ((pixel >> 11) & 0x1F) as u8;
        let g = ((pixel >> 5) & 0x3F) as u8;
        let b = (pixel & 0x1F) as u8;
        Self::new((r << 3) | (r >> 2), (g << 2) | (g >> 4), (b << 3) | (b >> 2))
    }

    /// Apply brightness scaling (0-100) to this color.
    pub fn apply_brightness(self, brightness: u8) -> Self {
        if brightness >= 100 {
            return self;
        }
        Self {
            r: ((self.r as u16 * brightness as u16) / 100) as u8,
            g: ((self.g as u16 * brightness as u16) / 100) as u8,
            b: ((self.b as u16 * brightness as u16) / 100) as u8,
        }
    }

    /// Scale every channel by `scale / 256`.
    pub fn scale(self, scale: u8) -> Self {
        Self::new(scale8(self.r, scale), scale8(self.g, scale), scale8(self.b, scale))
    }

    /// Scale every channel, keeping lit channels lit.
    pub fn scale_video(self, scale: u8) -> Self {
        Self::new(
            scale8_video(self.r, scale),
            scale8_video(self.g, scale),
            scale8_video(self.b, scale),
        )
    }

    /// Dim towards black by `amount / 256`.
    pub fn fade_to_black_by(self, amount: u8) -> Self {
        self.scale(255 - amount)
    }

    pub fn is_black(self) -> bool {
        self == Self::BLACK
    }
}

/// Convert our Color to the hardware crate's LedColor at the boundary.
#[cfg(feature = "hardware")]
impl From<Color> for rpi_led_matrix::LedColor {
    fn from(c: Color) -> Self {
        rpi_led_matrix::LedColor {
            red: c.r,
            green: c.g,
            blue: c.b,
        }
    }
}

// ── Matrix initialization ──────────────────────────────────────────

/// Create a matrix configured for our hardware:
/// Pi Zero 2 W + Adafruit Bonnet + configurable panel size.
///
/// # Rust concept: Result and the ? operator
/// Matrix initialization can fail (not running as root, GPIO unavailable),
/// so the caller gets a `Result` and uses `?` to propagate it upward.
#[cfg(feature = "hardware")]
pub fn create_matrix(panel: PanelConfig) -> Result<LedMatrix, Box<dyn std::error::Error>> {
    let mut options = LedMatrixOptions::new();
    options.set_rows(panel.rows);
    options.set_cols(panel.cols);
    options.set_hardware_mapping("adafruit-hat");

    options.set_pwm_bits(8)?;
    options.set_pwm_lsb_nanoseconds(130);

    let mut rt_options = LedRuntimeOptions::new();
    rt_options.set_gpio_slowdown(2); // Pi Zero 2 W requires slowdown=2

    let matrix = LedMatrix::new(Some(options), Some(rt_options))?;

    Ok(matrix)
}

/// Set up a Ctrl+C handler that sets `running` to false.
///
/// # Rust concept: Arc and AtomicBool
/// The flag is shared between the main loop and the signal handler.
/// `AtomicBool` is a thread-safe boolean; no mutex needed for a single bool.
pub fn setup_signal_handler() -> Result<Arc<AtomicBool>, ctrlc::Error> {
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();

    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })?;

    Ok(running)
}

/// Check if the main loop should keep running.
pub fn is_running(running: &AtomicBool) -> bool {
    running.load(Ordering::SeqCst)
}

// ── Tests ──────────────────────────────────────────────────────────
