//! Color representation and interpolation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// RGBA color with 8-bit components.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const RED: Color = Color::rgb(255, 0, 0);
    pub const GREEN: Color = Color::rgb(0, 128, 0);
    pub const BLUE: Color = Color::rgb(0, 0, 255);

    #[inline]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    #[inline]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parse color from hex string (e.g., "#ff0000", "#f00", "#ff000080").
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        let digit = |range: std::ops::Range<usize>| u8::from_str_radix(hex.get(range)?, 16).ok();

        match hex.len() {
            3 => Some(Self::rgb(digit(0..1)? * 17, digit(1..2)? * 17, digit(2..3)? * 17)),
            6 => Some(Self::rgb(digit(0..2)?, digit(2..4)?, digit(4..6)?)),
            8 => Some(Self::rgba(digit(0..2)?, digit(2..4)?, digit(4..6)?, digit(6..8)?)),
            _ => None,
        }
    }

    /// Get a named CSS color. Only the basic palette is recognized.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "transparent" => Some(Self::TRANSPARENT),
            "black" => Some(Self::BLACK),
            "white" => Some(Self::WHITE),
            "red" => Some(Self::RED),
            "green" => Some(Self::GREEN),
            "blue" => Some(Self::BLUE),
            "yellow" => Some(Self::rgb(255, 255, 0)),
            "gray" | "grey" => Some(Self::rgb(128, 128, 128)),
            "orange" => Some(Self::rgb(255, 165, 0)),
            "purple" => Some(Self::rgb(128, 0, 128)),
            _ => None,
        }
    }

    /// Interpolate each channel towards `to`.
    ///
    /// Channels are clamped, so progress values outside `[0, 1]` produced by
    /// overshooting timing functions stay representable.
    pub fn interpolate(&self, to: Color, progress: f64) -> Color {
        if *self == to {
            return to;
        }
        let channel = |from: u8, to: u8| -> u8 {
            let value = from as f64 + (to as f64 - from as f64) * progress;
            value.round().clamp(0.0, 255.0) as u8
        };
        Color::rgba(
            channel(self.r, to.r),
            channel(self.g, to.g),
            channel(self.b, to.b),
            channel(self.a, to.a),
        )
    }

    #[inline]
    pub fn is_transparent(&self) -> bool {
        self.a == 0
    }

    /// Copy of this color with its alpha replaced.
    #[inline]
    pub const fn with_alpha(&self, a: u8) -> Color {
        Color::rgba(self.r, self.g, self.b, a)
    }
}

impl fmt::Debug for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a == 255 {
            write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            write!(f, "#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
