//! Linear RGB colours parsed from CSS-style strings

use serde::{Deserialize, Deserializer};

/// A colour in linear RGB space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const WHITE: Color = Color::new(1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::new(0.0, 0.0, 0.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Builds a linear colour from sRGB-encoded 8-bit channels.
    pub fn from_srgb8(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: srgb_to_linear(r as f32 / 255.0),
            g: srgb_to_linear(g as f32 / 255.0),
            b: srgb_to_linear(b as f32 / 255.0),
        }
    }

    /// Parses `#rrggbb`, `#rgb` or a CSS colour name.
    pub fn parse(style: &str) -> Option<Self> {
        let style = style.trim();
        if let Some(hex) = style.strip_prefix('#') {
            return parse_hex(hex);
        }
        named_color(&style.to_ascii_lowercase())
    }

    /// Like [`Color::parse`] but never fails: unknown strings are logged and
    /// resolve to white.
    pub fn from_css(style: &str) -> Self {
        Self::parse(style).unwrap_or_else(|| {
            log::warn!("Unknown color '{}', using white", style);
            Self::WHITE
        })
    }

    pub fn scaled(self, intensity: f32) -> [f32; 3] {
        [self.r * intensity, self.g * intensity, self.b * intensity]
    }

    pub fn to_array(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let style = String::deserialize(deserializer)?;
        Ok(Color::from_css(&style))
    }
}

fn parse_hex(hex: &str) -> Option<Color> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    match hex.len() {
        6 => {
            let value = u32::from_str_radix(hex, 16).ok()?;
            Some(Color::from_srgb8(
                (value >> 16) as u8,
                (value >> 8) as u8,
                value as u8,
            ))
        }
        3 => {
            let value = u16::from_str_radix(hex, 16).ok()?;
            let expand = |v: u16| ((v & 0xf) * 17) as u8;
            Some(Color::from_srgb8(
                expand(value >> 8),
                expand(value >> 4),
                expand(value),
            ))
        }
        _ => None,
    }
}

fn named_color(name: &str) -> Option<Color> {
    let rgb = match name {
        "black" => (0x00, 0x00, 0x00),
        "white" => (0xff, 0xff, 0xff),
        "red" => (0xff, 0x00, 0x00),
        "green" => (0x00, 0x80, 0x00),
        "blue" => (0x00, 0x00, 0xff),
        "orange" => (0xff, 0xa5, 0x00),
        "purple" => (0x80, 0x00, 0x80),
        "gray" | "grey" => (0x80, 0x80, 0x80),
        _ => return None,
    };
    Some(Color::from_srgb8(rgb.0, rgb.1, rgb.2))
}

pub(crate) fn srgb_to_linear(c: f32) -> f32 {
    if c < 0.04045 {
        c * 0.0773993808
    } else {
        (c * 0.9478672986 + 0.0521327014).powf(2.4)
    }
}

pub(crate) fn linear_to_srgb(c: f32) -> f32 {
    if c < 0.0031308 {
        c * 12.92
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    }
}
