//! RGBA color type shared by the configuration, font and render crates.

use serde::{Deserialize, Serialize};

fn opaque() -> u8 {
    255
}

/// An 8-bit-per-channel color with straight (non-premultiplied) alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    #[serde(default = "opaque")]
    pub a: u8,
}

impl Rgba {
    pub const BLACK: Rgba = Rgba::rgb(0, 0, 0);
    pub const WHITE: Rgba = Rgba::rgb(255, 255, 255);
    pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Decode a packed `0xRRGGBB` integer as sent by the remote editor.
    pub const fn from_u24(c: u32) -> Self {
        Self::rgb(((c >> 16) & 255) as u8, ((c >> 8) & 255) as u8, (c & 255) as u8)
    }

    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// Compare only the color channels, ignoring alpha.
    pub fn same_rgb(&self, other: &Rgba) -> bool {
        self.r == other.r && self.g == other.g && self.b == other.b
    }

    pub fn as_array(&self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Push bright channels further up and dark channels further down.
    ///
    /// A negative `v` darkens bright channels and lifts dark ones, which is
    /// what the indent guide of the current block uses for contrast.
    pub fn warp(&self, v: i32) -> Rgba {
        let warp_channel = |c: u8| -> u8 {
            let c = c as i32;
            let out = if c > 128 { c + v } else { c - 2 * v };
            out.clamp(0, 255) as u8
        };
        Rgba::new(
            warp_channel(self.r),
            warp_channel(self.g),
            warp_channel(self.b),
            self.a,
        )
    }

    /// A more saturated version of the color, used for patterned diff fills
    /// so sparse hatching stays visible against the editor background.
    pub fn colorful(&self) -> Rgba {
        let (h, s, v) = self.to_hsv();
        let s = if s == 0.0 { 0.0 } else { (s * 1.5 + 0.15).min(1.0) };
        let v = v.max(0.45);
        let mut out = Rgba::from_hsv(h, s, v);
        out.a = self.a;
        out
    }

    fn to_hsv(&self) -> (f32, f32, f32) {
        let r = self.r as f32 / 255.0;
        let g = self.g as f32 / 255.0;
        let b = self.b as f32 / 255.0;
        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let delta = max - min;

        let h = if delta == 0.0 {
            0.0
        } else if max == r {
            60.0 * (((g - b) / delta).rem_euclid(6.0))
        } else if max == g {
            60.0 * ((b - r) / delta + 2.0)
        } else {
            60.0 * ((r - g) / delta + 4.0)
        };
        let s = if max == 0.0 { 0.0 } else { delta / max };
        (h, s, max)
    }

    fn from_hsv(h: f32, s: f32, v: f32) -> Rgba {
        let c = v * s;
        let x = c * (1.0 - ((h / 60.0).rem_euclid(2.0) - 1.0).abs());
        let m = v - c;
        let (r, g, b) = match (h / 60.0) as u32 {
            0 => (c, x, 0.0),
            1 => (x, c, 0.0),
            2 => (0.0, c, x),
            3 => (0.0, x, c),
            4 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };
        let to_u8 = |f: f32| ((f + m) * 255.0).round().clamp(0.0, 255.0) as u8;
        Rgba::rgb(to_u8(r), to_u8(g), to_u8(b))
    }
}

impl Default for Rgba {
    fn default() -> Self {
        Rgba::BLACK
    }
}
