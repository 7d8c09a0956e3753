//! Integer waveform and noise primitives.
//!
//! Effects work in byte-sized angles (256 steps per turn) and 16-bit
//! phases (65536 steps per turn), so counters can simply wrap.

use std::f32::consts::TAU;

/// Sine of a byte angle, mapped onto `1..=255` (128 at zero crossing).
pub fn sin8(theta: u8) -> u8 {
    let s = (theta as f32 / 256.0 * TAU).sin();
    (s * 127.0 + 128.0).round().clamp(0.0, 255.0) as u8
}

/// Cosine counterpart of [`sin8`].
pub fn cos8(theta: u8) -> u8 {
    sin8(theta.wrapping_add(64))
}

/// Sine of a 16-bit phase, mapped onto `-32767..=32767`.
pub fn sin16(theta: u16) -> i16 {
    let s = (theta as f32 / 65536.0 * TAU).sin();
    (s * 32767.0).round() as i16
}

/// Arduino-style integer linear remap. `in_min == in_max` yields `out_min`.
pub fn map_range(x: i32, in_min: i32, in_max: i32, out_min: i32, out_max: i32) -> i32 {
    if in_max == in_min {
        return out_min;
    }
    (x - in_min) * (out_max - out_min) / (in_max - in_min) + out_min
}

// ── Gradient noise ───────────────────────────────────────────────────

fn hash_u32(mut x: u32) -> u32 {
    x ^= x >> 16;
    x = x.wrapping_mul(0x7feb352d);
    x ^= x >> 15;
    x = x.wrapping_mul(0x846ca68b);
    x ^= x >> 16;
    x
}

fn hash3(x: i32, y: i32, z: i32) -> u32 {
    hash_u32(
        (x as u32).wrapping_mul(0x9e3779b1)
            ^ (y as u32).wrapping_mul(0x85ebca6b)
            ^ (z as u32).wrapping_mul(0xc2b2ae35),
    )
}

fn fade(t: f32) -> f32 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Dot product with one of the twelve cube-edge gradients.
fn grad(hash: u32, x: f32, y: f32, z: f32) -> f32 {
    let h = hash & 15;
    let u = if h < 8 { x } else { y };
    let v = if h < 4 {
        y
    } else if h == 12 || h == 14 {
        x
    } else {
        z
    };
    (if h & 1 == 0 { u } else { -u }) + (if h & 2 == 0 { v } else { -v })
}

/// 3-D gradient noise in roughly `-1.0..=1.0`; integer lattice points are zero.
pub fn noise3(x: f32, y: f32, z: f32) -> f32 {
    let (xi, yi, zi) = (x.floor() as i32, y.floor() as i32, z.floor() as i32);
    let (xf, yf, zf) = (x - xi as f32, y - yi as f32, z - zi as f32);
    let (u, v, w) = (fade(xf), fade(yf), fade(zf));

    let corner = |dx: i32, dy: i32, dz: i32| {
        grad(
            hash3(xi + dx, yi + dy, zi + dz),
            xf - dx as f32,
            yf - dy as f32,
            zf - dz as f32,
        )
    };

    let x00 = lerp(corner(0, 0, 0), corner(1, 0, 0), u);
    let x10 = lerp(corner(0, 1, 0), corner(1, 1, 0), u);
    let x01 = lerp(corner(0, 0, 1), corner(1, 0, 1), u);
    let x11 = lerp(corner(0, 1, 1), corner(1, 1, 1), u);
    lerp(lerp(x00, x10, v), lerp(x01, x11, v), w)
}

/// 8-bit noise sampled on a 1/256 lattice: one lattice cell spans 256
/// input units. Smoothly varying in all three inputs.
pub fn inoise8(x: u32, y: u32, z: u32) -> u8 {
    let n = noise3(x as f32 / 256.0, y as f32 / 256.0, z as f32 / 256.0);
    ((n * 0.5 + 0.5) * 255.0).clamp(0.0, 255.0) as u8
}
