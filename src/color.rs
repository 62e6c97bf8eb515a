//! Hex color parsing and conversion to RGBA pixels.

use std::fmt;

use image::Rgba;

use crate::error::{Error, Result};

/// The background sentinel meaning "alpha 0".
pub const TRANSPARENT: &str = "transparent";

/// An opaque RGB color parsed from a 6-digit hex string.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct HexColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl HexColor {
    pub const BLACK: HexColor = HexColor::new(0x00, 0x00, 0x00);
    pub const WHITE: HexColor = HexColor::new(0xFF, 0xFF, 0xFF);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parses `#RRGGBB` (the leading `#` is optional).
    ///
    /// `field` names the offending parameter in the error.
    ///
    /// # Example
    ///
    /// ```rust
    /// use qrstyle::color::HexColor;
    ///
    /// let blue = HexColor::parse("#1E88E5", "foreground").unwrap();
    /// assert_eq!(blue, HexColor::new(30, 136, 229));
    /// assert!(HexColor::parse("#FFF", "foreground").is_err());
    /// ```
    pub fn parse(value: &str, field: &'static str) -> Result<Self> {
        let digits = value.trim().strip_prefix('#').unwrap_or(value.trim());
        if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(Error::invalid_color(field, value));
        }
        let channel = |i: usize| {
            u8::from_str_radix(&digits[i..i + 2], 16).map_err(|_| Error::invalid_color(field, value))
        };
        Ok(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }

    /// Opaque RGBA pixel for this color.
    pub fn to_rgba(self) -> Rgba<u8> {
        Rgba([self.r, self.g, self.b, 255])
    }

    /// Linear interpolation between `self` and `other`, truncating each channel.
    pub fn lerp(self, other: HexColor, ratio: f64) -> HexColor {
        let mix = |a: u8, b: u8| (f64::from(a) * (1.0 - ratio) + f64::from(b) * ratio) as u8;
        HexColor::new(mix(self.r, other.r), mix(self.g, other.g), mix(self.b, other.b))
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

/// Canvas background: a solid color or fully transparent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Background {
    Solid(HexColor),
    Transparent,
}

impl Background {
    /// Parses either the [`TRANSPARENT`] sentinel (case-insensitive) or a hex color.
    pub fn parse(value: &str, field: &'static str) -> Result<Self> {
        if value.trim().eq_ignore_ascii_case(TRANSPARENT) {
            Ok(Background::Transparent)
        } else {
            HexColor::parse(value, field).map(Background::from)
        }
    }

    /// Pixel used to pre-fill the canvas.
    pub fn to_rgba(self) -> Rgba<u8> {
        match self {
            Background::Solid(color) => color.to_rgba(),
            Background::Transparent => Rgba([0, 0, 0, 0]),
        }
    }

    pub fn is_transparent(self) -> bool {
        matches!(self, Background::Transparent)
    }
}

impl Default for Background {
    fn default() -> Self {
        HexColor::WHITE.into()
    }
}

impl From<HexColor> for Background {
    fn from(color: HexColor) -> Self {
        Background::Solid(color)
    }
}
