//! Sixteen-entry gradient palettes with linear blending.
//!
//! An 8-bit index selects a position along the palette: the high nibble
//! picks an entry, the low nibble blends towards the next one (wrapping
//! from the last entry back to the first).

use crate::{Color, scale8};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Palette {
    Rainbow,
    Ocean,
}

const RAINBOW: [u32; 16] = [
    0xFF0000, 0xD52A00, 0xAB5500, 0xAB7F00, 0xABAB00, 0x56D500, 0x00FF00, 0x00D52A, 0x00AB55,
    0x0056AA, 0x0000FF, 0x2A00D5, 0x5500AB, 0x7F0081, 0xAB0055, 0xD5002B,
];

const OCEAN: [u32; 16] = [
    0x191970, 0x00008B, 0x191970, 0x000080, 0x00008B, 0x0000CD, 0x2E8B57, 0x008080, 0x5F9EA0,
    0x0000FF, 0x008B8B, 0x6495ED, 0x7FFFD4, 0x2E8B57, 0x00FFFF, 0x87CEFA,
];

impl Palette {
    fn entries(self) -> &'static [u32; 16] {
        match self {
            Palette::Rainbow => &RAINBOW,
            Palette::Ocean => &OCEAN,
        }
    }
}

/// Look up `index` in `palette`, blending between neighbouring entries.
pub fn color_from_palette(palette: Palette, index: u8) -> Color {
    let entries = palette.entries();
    let hi = (index >> 4) as usize;
    let lo = index & 0x0F;
    let first = Color::from_hex(entries[hi]);
    if lo == 0 {
        return first;
    }

    let second = Color::from_hex(entries[(hi + 1) % entries.len()]);
    let f2 = lo << 4;
    let f1 = 255 - f2;
    Color::new(
        scale8(first.r, f1) + scale8(second.r, f2),
        scale8(first.g, f1) + scale8(second.g, f2),
        scale8(first.b, f1) + scale8(second.b, f2),
    )
}
