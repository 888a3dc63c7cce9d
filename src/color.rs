//! Canonical RGBA color type.
//!
//! Layer styles reach the engine as CSS-style color strings (`#rrggbb`,
//! `#rrggbbaa`, `rgb(...)`, `rgba(...)`). They are parsed once at the
//! scene-mutation boundary into this typed representation, so rendering code
//! never re-parses strings. Serialization round-trips through hex notation.

use image::Rgba;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// An 8-bit RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color(pub [u8; 4]);

impl Color {
    pub const WHITE: Self = Self([255, 255, 255, 255]);
    pub const BLACK: Self = Self([0, 0, 0, 255]);
    pub const TRANSPARENT: Self = Self([0, 0, 0, 0]);

    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self([r, g, b, 255])
    }

    pub fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self([r, g, b, a])
    }

    /// Parses `#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`, `rgb(r, g, b)` and
    /// `rgba(r, g, b, a)` (alpha as 0.0-1.0). Returns `None` for anything
    /// else.
    pub fn parse(input: &str) -> Option<Self> {
        let s = input.trim();
        if let Some(hex) = s.strip_prefix('#') {
            return Self::parse_hex(hex);
        }
        if let Some(body) = s
            .strip_prefix("rgba(")
            .or_else(|| s.strip_prefix("rgb("))
        {
            return Self::parse_components(body.strip_suffix(')')?);
        }
        None
    }

    fn parse_hex(hex: &str) -> Option<Self> {
        let expand = |c: u8| c * 17;
        let nibble = |c: char| c.to_digit(16).map(|d| d as u8);
        let chars: Vec<u8> = hex.chars().map(nibble).collect::<Option<_>>()?;
        match chars.len() {
            3 => Some(Self([expand(chars[0]), expand(chars[1]), expand(chars[2]), 255])),
            4 => Some(Self([
                expand(chars[0]),
                expand(chars[1]),
                expand(chars[2]),
                expand(chars[3]),
            ])),
            6 => Some(Self([
                chars[0] * 16 + chars[1],
                chars[2] * 16 + chars[3],
                chars[4] * 16 + chars[5],
                255,
            ])),
            8 => Some(Self([
                chars[0] * 16 + chars[1],
                chars[2] * 16 + chars[3],
                chars[4] * 16 + chars[5],
                chars[6] * 16 + chars[7],
            ])),
            _ => None,
        }
    }

    fn parse_components(body: &str) -> Option<Self> {
        let parts: Vec<&str> = body.split(',').map(str::trim).collect();
        if parts.len() != 3 && parts.len() != 4 {
            return None;
        }
        let channel = |s: &str| -> Option<u8> {
            let v: f32 = s.parse().ok()?;
            Some(v.clamp(0.0, 255.0).round() as u8)
        };
        let r = channel(parts[0])?;
        let g = channel(parts[1])?;
        let b = channel(parts[2])?;
        let a = if parts.len() == 4 {
            let v: f32 = parts[3].parse().ok()?;
            (v.clamp(0.0, 1.0) * 255.0).round() as u8
        } else {
            255
        };
        Some(Self([r, g, b, a]))
    }

    /// Hex notation; the alpha component is omitted when fully opaque.
    pub fn to_hex(self) -> String {
        let [r, g, b, a] = self.0;
        if a == 255 {
            format!("#{r:02x}{g:02x}{b:02x}")
        } else {
            format!("#{r:02x}{g:02x}{b:02x}{a:02x}")
        }
    }

    pub fn alpha(self) -> u8 {
        self.0[3]
    }

    /// Returns the same color with its alpha multiplied by `factor` (0.0-1.0).
    pub fn scale_alpha(self, factor: f32) -> Self {
        let [r, g, b, a] = self.0;
        let a = (a as f32 * factor.clamp(0.0, 1.0)).round() as u8;
        Self([r, g, b, a])
    }
}

impl From<Color> for Rgba<u8> {
    fn from(c: Color) -> Self {
        Rgba(c.0)
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Color::parse(&s).ok_or_else(|| D::Error::custom(format!("invalid color: {s:?}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_forms() {
        assert_eq!(Color::parse("#fff"), Some(Color::WHITE));
        assert_eq!(Color::parse("#f00"), Some(Color::rgb(255, 0, 0)));
        assert_eq!(Color::parse("#102030"), Some(Color::rgb(16, 32, 48)));
        assert_eq!(Color::parse("#10203040"), Some(Color::rgba(16, 32, 48, 64)));
        assert_eq!(Color::parse("#f00a"), Some(Color::rgba(255, 0, 0, 170)));
    }

    #[test]
    fn parses_functional_forms() {
        assert_eq!(Color::parse("rgb(1, 2, 3)"), Some(Color::rgb(1, 2, 3)));
        assert_eq!(
            Color::parse("rgba(255, 0, 0, 0.5)"),
            Some(Color::rgba(255, 0, 0, 128))
        );
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(Color::parse("not-a-color"), None);
        assert_eq!(Color::parse("#12345"), None);
        assert_eq!(Color::parse("rgb(1,2)"), None);
    }

    #[test]
    fn hex_round_trip() {
        for color in [Color::rgb(1, 2, 3), Color::rgba(200, 100, 50, 25)] {
            assert_eq!(Color::parse(&color.to_hex()), Some(color));
        }
    }

    #[test]
    fn serde_uses_hex_strings() {
        let json = serde_json::to_string(&Color::rgb(255, 0, 0)).unwrap();
        assert_eq!(json, "\"#ff0000\"");
        let back: Color = serde_json::from_str("\"#ff0000\"").unwrap();
        assert_eq!(back, Color::rgb(255, 0, 0));
    }

    #[test]
    fn alpha_scaling() {
        let c = Color::rgba(10, 20, 30, 200);
        assert_eq!(c.scale_alpha(0.5).alpha(), 100);
        assert_eq!(c.scale_alpha(2.0).alpha(), 200);
    }
}
