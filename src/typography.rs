//! Typography layout: font resolution, text measurement, and per-character
//! advance placement.
//!
//! Text measurement is an external capability behind the [`Typesetter`]
//! trait. [`GlyphTypesetter`] backs it with real font files via `ab_glyph`;
//! [`BlockTypesetter`] provides fixed, deterministic metrics for headless use
//! and tests.
//!
//! Letter spacing is always applied as an explicit per-character advance:
//! the pen position of character `i` is the sum of the measured advances of
//! characters `0..i` plus `i * letter_spacing`. Kerning is deliberately not
//! applied, so the stroke pass, fill pass, and hit-testing all share one
//! layout.

use std::collections::HashMap;

use ab_glyph::{Font, FontArc, ScaleFont, point};
use serde::{Deserialize, Serialize};

use crate::error::{RenderError, Result};

// ============================================================================
// Font style & shorthand
// ============================================================================

/// Boolean style flags carried by a text layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FontStyle {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
}

/// Resolves the CSS-style font shorthand in the fixed order
/// style, weight, size, family: `"italic bold 48px Inter"`.
pub fn font_shorthand(style: FontStyle, font_size: f32, family: &str) -> String {
    let mut parts: Vec<String> = Vec::with_capacity(4);
    if style.italic {
        parts.push("italic".into());
    }
    if style.bold {
        parts.push("bold".into());
    }
    parts.push(format!("{font_size}px"));
    parts.push(family.to_string());
    parts.join(" ")
}

// ============================================================================
// Metrics & layout
// ============================================================================

/// Measured metrics for a single line of text at a fixed size.
#[derive(Debug, Clone, PartialEq)]
pub struct TextMetrics {
    /// Ascent above the baseline, in pixels.
    pub ascent: f32,
    /// Descent below the baseline, in pixels (positive magnitude).
    pub descent: f32,
    /// Per-character horizontal advances, excluding letter spacing.
    pub advances: Vec<f32>,
}

impl TextMetrics {
    /// Text box height: ascent plus descent.
    pub fn height(&self) -> f32 {
        self.ascent + self.descent
    }

    /// Total width with letter spacing applied:
    /// `sum(advances) + (n - 1) * spacing` for `n` characters.
    pub fn spaced_width(&self, letter_spacing: f32) -> f32 {
        let n = self.advances.len();
        if n == 0 {
            return 0.0;
        }
        let glyphs: f32 = self.advances.iter().sum();
        glyphs + (n - 1) as f32 * letter_spacing
    }

    /// Pen x-position of each character relative to the left edge of the
    /// text: `x_i = sum(advances[0..i]) + i * spacing`.
    pub fn char_origins(&self, letter_spacing: f32) -> Vec<f32> {
        let mut origins = Vec::with_capacity(self.advances.len());
        let mut x = 0.0f32;
        for (i, advance) in self.advances.iter().enumerate() {
            origins.push(x + i as f32 * letter_spacing);
            x += advance;
        }
        origins
    }
}

/// Alpha coverage of one rasterized character, positioned relative to the
/// pen origin on the baseline.
#[derive(Debug, Clone)]
pub struct GlyphCoverage {
    pub width: u32,
    pub height: u32,
    /// Offset of the bitmap's left edge from the pen x-position.
    pub left: f32,
    /// Offset of the bitmap's top edge from the baseline (negative above).
    pub top: f32,
    /// Row-major coverage values in 0.0-1.0.
    pub data: Vec<f32>,
}

// ============================================================================
// Typesetter trait
// ============================================================================

/// The text-measurement and rasterization capability.
///
/// Bold and italic are synthesized downstream (embolden/shear at composite
/// time), so implementations only resolve family and size.
pub trait Typesetter {
    /// Measures a string at the given size.
    ///
    /// Fails with [`RenderError::Measurement`] when no measurement backend is
    /// available for the family; the redraw that needed it is aborted.
    fn measure(&self, text: &str, family: &str, font_size: f32) -> Result<TextMetrics>;

    /// Rasterizes one character. `None` means the character produces no
    /// visible coverage (whitespace).
    fn rasterize(&self, ch: char, family: &str, font_size: f32) -> Result<Option<GlyphCoverage>>;
}

// ============================================================================
// GlyphTypesetter (ab_glyph)
// ============================================================================

/// Font-file backed typesetter.
///
/// Families are registered from raw font bytes (TTF/OTF). Lookup falls back
/// to the default font when a family is unknown; measurement fails if neither
/// is available.
#[derive(Default)]
pub struct GlyphTypesetter {
    fonts: HashMap<String, FontArc>,
    fallback: Option<FontArc>,
}

impl GlyphTypesetter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a font for a family name.
    pub fn register(&mut self, family: &str, bytes: Vec<u8>) -> Result<()> {
        let font = FontArc::try_from_vec(bytes)
            .map_err(|_| RenderError::InvalidFont(family.to_string()))?;
        self.fonts.insert(family.to_string(), font);
        Ok(())
    }

    /// Registers the fallback font used for unknown families.
    pub fn register_fallback(&mut self, bytes: Vec<u8>) -> Result<()> {
        let font = FontArc::try_from_vec(bytes)
            .map_err(|_| RenderError::InvalidFont("fallback".to_string()))?;
        self.fallback = Some(font);
        Ok(())
    }

    fn select(&self, family: &str) -> Result<&FontArc> {
        self.fonts
            .get(family)
            .or(self.fallback.as_ref())
            .ok_or_else(|| RenderError::Measurement(format!("no font for family {family:?}")))
    }
}

impl Typesetter for GlyphTypesetter {
    fn measure(&self, text: &str, family: &str, font_size: f32) -> Result<TextMetrics> {
        let font = self.select(family)?;
        let scaled = font.as_scaled(font_size);
        let advances = text
            .chars()
            .map(|ch| scaled.h_advance(font.glyph_id(ch)))
            .collect();
        Ok(TextMetrics {
            ascent: scaled.ascent(),
            descent: -scaled.descent(),
            advances,
        })
    }

    fn rasterize(&self, ch: char, family: &str, font_size: f32) -> Result<Option<GlyphCoverage>> {
        let font = self.select(family)?;
        let glyph = font
            .glyph_id(ch)
            .with_scale_and_position(font_size, point(0.0, 0.0));
        let Some(outlined) = font.outline_glyph(glyph) else {
            return Ok(None);
        };

        let bounds = outlined.px_bounds();
        let width = bounds.width().ceil() as u32 + 1;
        let height = bounds.height().ceil() as u32 + 1;
        let mut data = vec![0.0f32; width as usize * height as usize];
        outlined.draw(|x, y, cov| {
            if x < width && y < height {
                data[y as usize * width as usize + x as usize] = cov;
            }
        });

        Ok(Some(GlyphCoverage {
            width,
            height,
            left: bounds.min.x,
            top: bounds.min.y,
            data,
        }))
    }
}

// ============================================================================
// BlockTypesetter (deterministic fixed metrics)
// ============================================================================

/// Fixed-metrics typesetter: every character advances 0.6 em and rasterizes
/// as a solid block. No font files required, fully deterministic.
///
/// Intended for headless measurement and for the test suite; pixel output is
/// obviously not typographic.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlockTypesetter;

impl BlockTypesetter {
    const ADVANCE_EM: f32 = 0.6;
    const ASCENT_EM: f32 = 0.8;
    const DESCENT_EM: f32 = 0.2;
}

impl Typesetter for BlockTypesetter {
    fn measure(&self, text: &str, _family: &str, font_size: f32) -> Result<TextMetrics> {
        Ok(TextMetrics {
            ascent: font_size * Self::ASCENT_EM,
            descent: font_size * Self::DESCENT_EM,
            advances: text
                .chars()
                .map(|_| font_size * Self::ADVANCE_EM)
                .collect(),
        })
    }

    fn rasterize(&self, ch: char, _family: &str, font_size: f32) -> Result<Option<GlyphCoverage>> {
        if ch.is_whitespace() {
            return Ok(None);
        }
        let width = (font_size * 0.5).round().max(1.0) as u32;
        let height = (font_size * 0.7).round().max(1.0) as u32;
        Ok(Some(GlyphCoverage {
            left: font_size * 0.05,
            top: -(height as f32),
            data: vec![1.0; width as usize * height as usize],
            width,
            height,
        }))
    }
}
