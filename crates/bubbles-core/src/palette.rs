use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::PALETTE_MAX_FLOOR;

/// 8-bit sRGB color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rrggbb` or `rrggbb`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Self::rgb(channel(0)?, channel(2)?, channel(4)?))
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Per-channel linear blend, rounded half-up.
    ///
    /// Channels are non-negative, so `f64::round` (half away from zero)
    /// is half-up here.
    pub fn lerp(self, other: Self, t: f64) -> Self {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| {
            let a = f64::from(a);
            let b = f64::from(b);
            (a + (b - a) * t).round() as u8
        };
        Self::rgb(
            mix(self.r, other.r),
            mix(self.g, other.g),
            mix(self.b, other.b),
        )
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({},{},{})", self.r, self.g, self.b)
    }
}

/// Unvoted ideas.
pub const HUE_UNVOTED: Color = Color::rgb(0xea, 0x58, 0x0c);
/// Exactly one vote; start of the gradient.
pub const HUE_FIRST_VOTE: Color = Color::rgb(0xf5, 0x9e, 0x42);
/// Top of the gradient, reached at the set maximum.
pub const HUE_TOP: Color = Color::rgb(0xfb, 0xbf, 0x24);

/// Fraction along the B→C gradient for `score > 1`.
pub fn gradient_position(score: u32, max_score_in_set: u32) -> f64 {
    let max = max_score_in_set.max(PALETTE_MAX_FLOOR);
    let t = f64::from(score.saturating_sub(1)) / f64::from(max - 1);
    t.min(1.0)
}

/// Map a score to a bubble color relative to the set maximum.
pub fn color_for(score: u32, max_score_in_set: u32) -> Color {
    match score {
        0 => HUE_UNVOTED,
        1 => HUE_FIRST_VOTE,
        _ => HUE_FIRST_VOTE.lerp(HUE_TOP, gradient_position(score, max_score_in_set)),
    }
}
