//! RGB colors with derived HSL components
//!
//! The receiver only understands hue and brightness, so every color that goes
//! out on the wire is reduced to its HSL representation first.

use palette::{FromColor, Hsl, Srgb};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{ControlError, Result};

/// An 8-bit sRGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::new(0, 0, 0);
    pub const WHITE: Color = Color::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Build a color from hue (degrees), saturation and luminosity (0.0-1.0).
    pub fn from_hsl(hue: f32, saturation: f32, luminosity: f32) -> Self {
        let hsl = Hsl::new(
            hue,
            saturation.clamp(0.0, 1.0),
            luminosity.clamp(0.0, 1.0),
        );
        let rgb: Srgb<u8> = Srgb::from_color(hsl).into_format();
        Self::new(rgb.red, rgb.green, rgb.blue)
    }

    fn hsl(self) -> Hsl {
        let rgb: Srgb<f32> = Srgb::new(self.r, self.g, self.b).into_format();
        Hsl::from_color(rgb)
    }

    /// Hue in degrees, 0.0 up to (but excluding) 360.0. Grays report 0.
    pub fn hue(self) -> f32 {
        self.hsl().hue.into_positive_degrees()
    }

    /// HSL saturation, 0.0-1.0
    pub fn saturation(self) -> f32 {
        self.hsl().saturation
    }

    /// HSL lightness, 0.0-1.0
    pub fn luminosity(self) -> f32 {
        self.hsl().lightness
    }

    /// Per-channel mean of two colors, rounded down.
    pub fn blend(self, other: Color) -> Color {
        let mid = |a: u8, b: u8| ((u16::from(a) + u16::from(b)) / 2) as u8;
        Color::new(mid(self.r, other.r), mid(self.g, other.g), mid(self.b, other.b))
    }

    /// Hex notation, `#rrggbb`
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl From<(u8, u8, u8)> for Color {
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        Color::new(r, g, b)
    }
}

impl From<[u8; 3]> for Color {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Color::new(r, g, b)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Color {
    type Err = ControlError;

    /// Accepts `#rrggbb`, `rrggbb` or `r,g,b`.
    fn from_str(s: &str) -> Result<Self> {
        let text = s.trim();
        let invalid = || ControlError::InvalidColor(s.to_string());

        if text.contains(',') {
            let parts: Vec<u8> = text
                .split(',')
                .map(|p| p.trim().parse::<u8>())
                .collect::<std::result::Result<_, _>>()
                .map_err(|_| invalid())?;
            return match parts.as_slice() {
                [r, g, b] => Ok(Color::new(*r, *g, *b)),
                _ => Err(invalid()),
            };
        }

        let hex = text.strip_prefix('#').unwrap_or(text);
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(invalid());
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
        Ok(Color::new(channel(0)?, channel(2)?, channel(4)?))
    }
}
