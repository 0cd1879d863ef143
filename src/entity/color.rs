//! Strongly-typed colors and the speed → color mapping.
//!
//! Hex strings only appear at the boundary (`from_hex` / `to_hex`).

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Linear RGB color, each channel in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid hex color {0:?} (expected #rrggbb)")]
pub struct ColorParseError(pub String);

impl Rgb {
    pub const RED: Rgb = Rgb::new(1.0, 0.0, 0.0);
    pub const GREEN: Rgb = Rgb::new(0.0, 1.0, 0.0);
    pub const BLUE: Rgb = Rgb::new(0.0, 0.0, 1.0);
    pub const WHITE: Rgb = Rgb::new(1.0, 1.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Build from a packed 0xRRGGBB value
    pub fn from_hex_u32(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xff) as f32 / 255.0,
            g: ((hex >> 8) & 0xff) as f32 / 255.0,
            b: (hex & 0xff) as f32 / 255.0,
        }
    }

    /// Parse `#rrggbb` (the leading `#` is optional, case-insensitive)
    pub fn from_hex(text: &str) -> Result<Self, ColorParseError> {
        let digits = text.trim().trim_start_matches('#');
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ColorParseError(text.to_string()));
        }
        u32::from_str_radix(digits, 16)
            .map(Self::from_hex_u32)
            .map_err(|_| ColorParseError(text.to_string()))
    }

    /// Packed 0xRRGGBB value
    pub fn to_hex_u32(self) -> u32 {
        let channel = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u32;
        (channel(self.r) << 16) | (channel(self.g) << 8) | channel(self.b)
    }

    /// Lower-case `#rrggbb`
    pub fn to_hex(self) -> String {
        format!("#{:06x}", self.to_hex_u32())
    }

    pub fn to_array(self, alpha: f32) -> [f32; 4] {
        [self.r, self.g, self.b, alpha]
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Rgb {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

/// Hue / saturation / lightness, each in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsl {
    pub h: f32,
    pub s: f32,
    pub l: f32,
}

impl Hsl {
    pub fn new(h: f32, s: f32, l: f32) -> Self {
        Self { h, s, l }
    }

    pub fn to_rgb(self) -> Rgb {
        let h = self.h.rem_euclid(1.0);
        let s = self.s.clamp(0.0, 1.0);
        let l = self.l.clamp(0.0, 1.0);

        if s == 0.0 {
            return Rgb::new(l, l, l);
        }

        let high = if l <= 0.5 { l * (1.0 + s) } else { l + s - l * s };
        let low = 2.0 * l - high;

        Rgb::new(
            hue_to_channel(low, high, h + 1.0 / 3.0),
            hue_to_channel(low, high, h),
            hue_to_channel(low, high, h - 1.0 / 3.0),
        )
    }
}

fn hue_to_channel(low: f32, high: f32, mut t: f32) -> f32 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }
    if t < 1.0 / 6.0 {
        low + (high - low) * 6.0 * t
    } else if t < 0.5 {
        high
    } else if t < 2.0 / 3.0 {
        low + (high - low) * 6.0 * (2.0 / 3.0 - t)
    } else {
        low
    }
}

/// Pure mapping from body speed to display color.
///
/// Slow bodies sit at `hue_span` (violet-blue for 0.7), fast bodies at hue 0 (red).
#[derive(Debug, Clone, Copy)]
pub struct SpeedColorMap {
    pub max_speed: f32,
    pub hue_span: f32,
}

impl Default for SpeedColorMap {
    fn default() -> Self {
        Self {
            max_speed: 15.0,
            hue_span: 0.7,
        }
    }
}

impl SpeedColorMap {
    pub fn new(max_speed: f32, hue_span: f32) -> Self {
        Self {
            max_speed,
            hue_span,
        }
    }

    /// Hue for a speed after normalizing to [0, 1] and inverting
    pub fn hue_for_speed(&self, speed: f32) -> f32 {
        let normalized = if self.max_speed > 0.0 {
            (speed / self.max_speed).clamp(0.0, 1.0)
        } else {
            1.0
        };
        self.hue_span * (1.0 - normalized)
    }

    pub fn color_for_speed(&self, speed: f32) -> Rgb {
        Hsl::new(self.hue_for_speed(speed), 1.0, 0.5).to_rgb()
    }
}
