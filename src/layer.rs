//! The text layer data model.
//!
//! One canonical [`TextLayer`] schema with explicit defaults, built by a
//! single factory ([`TextLayer::new`]). Interactive edits arrive as a
//! [`LayerPatch`]; sub-objects (`style`, `stroke`, `transform`, `effects`
//! and the individual effects) are merged field-by-field so a partial update
//! never erases sibling state.
//!
//! Numeric fields are clamped here, at the mutation boundary, keeping the
//! rendering code free of range checks.

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::geometry::{Vec2, clamp_percent};
use crate::typography::FontStyle;

pub const DEFAULT_FONT_FAMILY: &str = "Inter";
pub const DEFAULT_TEXT: &str = "edit";
pub const MIN_FONT_SIZE: f32 = 1.0;
pub const MIN_STROKE_WIDTH: f32 = 0.5;

// ============================================================================
// Sub-records
// ============================================================================

/// Text outline drawn before the fill.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StrokeStyle {
    pub enabled: bool,
    /// Stroke width in pixels, always positive.
    pub width: f32,
    pub color: Color,
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self {
            enabled: false,
            width: 2.0,
            color: Color::BLACK,
        }
    }
}

/// Per-layer geometric transform applied around the layer anchor.
///
/// `skew` is a real shear: `x' = x + skew.x * y`, `y' = skew.y * x + y`,
/// applied before scale and rotation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayerTransform {
    pub scale: Vec2,
    pub skew: Vec2,
}

impl Default for LayerTransform {
    fn default() -> Self {
        Self {
            scale: Vec2::splat(1.0),
            skew: Vec2::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShadowEffect {
    pub enabled: bool,
    pub color: Color,
    /// Blur radius in pixels.
    pub blur: f32,
    /// Offset from the text in pixels.
    pub offset: Vec2,
}

impl Default for ShadowEffect {
    fn default() -> Self {
        Self {
            enabled: false,
            color: Color::rgba(0, 0, 0, 180),
            blur: 4.0,
            offset: Vec2::new(2.0, 2.0),
        }
    }
}

/// A centered shadow: same coverage source, zero offset, its own radius.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GlowEffect {
    pub enabled: bool,
    pub color: Color,
    /// Glow radius in pixels.
    pub radius: f32,
}

impl Default for GlowEffect {
    fn default() -> Self {
        Self {
            enabled: false,
            color: Color::WHITE,
            radius: 8.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GradientKind {
    Linear,
    Radial,
}

/// Gradient fill across the text bounding box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GradientEffect {
    pub enabled: bool,
    pub kind: GradientKind,
    /// Ordered color stops; always at least two entries.
    pub colors: Vec<Color>,
    /// Direction in degrees, linear gradients only.
    pub angle: f32,
}

impl Default for GradientEffect {
    fn default() -> Self {
        Self {
            enabled: false,
            kind: GradientKind::Linear,
            colors: vec![Color::WHITE, Color::BLACK],
            angle: 0.0,
        }
    }
}

impl GradientEffect {
    /// Restores the at-least-two-stops invariant on externally sourced
    /// color lists (deserialized snapshots, patches).
    pub(crate) fn ensure_min_stops(&mut self) {
        if self.colors.is_empty() {
            self.colors = vec![Color::WHITE, Color::BLACK];
        }
        while self.colors.len() < 2 {
            let last = self.colors[self.colors.len() - 1];
            self.colors.push(last);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayerEffects {
    pub shadow: ShadowEffect,
    pub glow: GlowEffect,
    pub gradient: GradientEffect,
}

// ============================================================================
// TextLayer
// ============================================================================

/// One overlay text element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextLayer {
    /// Stable identifier, assigned at creation, immutable.
    pub id: u64,
    pub text: String,
    /// Anchor as percentages (0-100) of canvas width/height, origin top-left.
    pub position: Vec2,
    /// Pixels, always >= [`MIN_FONT_SIZE`].
    pub font_size: f32,
    pub font_family: String,
    pub color: Color,
    /// Pixels; negative tightens.
    pub letter_spacing: f32,
    /// 0-100, converted to alpha at draw time.
    pub opacity: f32,
    /// Degrees; stored unnormalized.
    pub rotation: f32,
    #[serde(default)]
    pub style: FontStyle,
    #[serde(default)]
    pub stroke: StrokeStyle,
    #[serde(default)]
    pub transform: LayerTransform,
    #[serde(default)]
    pub effects: LayerEffects,
}

impl TextLayer {
    /// The single factory for new layers; every call site gets the same
    /// defaults.
    pub fn new(id: u64) -> Self {
        Self {
            id,
            text: DEFAULT_TEXT.to_string(),
            position: Vec2::splat(50.0),
            font_size: 64.0,
            font_family: DEFAULT_FONT_FAMILY.to_string(),
            color: Color::WHITE,
            letter_spacing: 0.0,
            opacity: 100.0,
            rotation: 0.0,
            style: FontStyle::default(),
            stroke: StrokeStyle::default(),
            transform: LayerTransform::default(),
            effects: LayerEffects::default(),
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_position(mut self, x_pct: f32, y_pct: f32) -> Self {
        self.position = Vec2::new(clamp_percent(x_pct), clamp_percent(y_pct));
        self
    }

    pub fn with_font_size(mut self, size: f32) -> Self {
        self.font_size = size.max(MIN_FONT_SIZE);
        self
    }

    /// Merges a partial update into this layer, clamping numeric input.
    pub fn apply_patch(&mut self, patch: &LayerPatch) {
        if let Some(text) = &patch.text {
            self.text = text.clone();
        }
        if let Some(pos) = patch.position {
            self.position = Vec2::new(clamp_percent(pos.x), clamp_percent(pos.y));
        }
        if let Some(size) = patch.font_size {
            self.font_size = size.max(MIN_FONT_SIZE);
        }
        if let Some(family) = &patch.font_family {
            self.font_family = family.clone();
        }
        if let Some(color) = patch.color {
            self.color = color;
        }
        if let Some(spacing) = patch.letter_spacing {
            self.letter_spacing = spacing;
        }
        if let Some(opacity) = patch.opacity {
            self.opacity = opacity.clamp(0.0, 100.0);
        }
        if let Some(rotation) = patch.rotation {
            self.rotation = rotation;
        }
        if let Some(style) = &patch.style {
            style.merge_into(&mut self.style);
        }
        if let Some(stroke) = &patch.stroke {
            stroke.merge_into(&mut self.stroke);
        }
        if let Some(transform) = &patch.transform {
            transform.merge_into(&mut self.transform);
        }
        if let Some(effects) = &patch.effects {
            effects.merge_into(&mut self.effects);
        }
    }
}

// ============================================================================
// Patches
// ============================================================================

/// Partial update for a [`TextLayer`]. Absent fields leave the layer's
/// current values untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayerPatch {
    pub text: Option<String>,
    pub position: Option<Vec2>,
    pub font_size: Option<f32>,
    pub font_family: Option<String>,
    pub color: Option<Color>,
    pub letter_spacing: Option<f32>,
    pub opacity: Option<f32>,
    pub rotation: Option<f32>,
    pub style: Option<StylePatch>,
    pub stroke: Option<StrokePatch>,
    pub transform: Option<TransformPatch>,
    pub effects: Option<EffectsPatch>,
}

impl LayerPatch {
    /// Convenience patch for drag interaction: position only.
    pub fn position(x_pct: f32, y_pct: f32) -> Self {
        Self {
            position: Some(Vec2::new(x_pct, y_pct)),
            ..Self::default()
        }
    }

    /// True when the patch turns the gradient effect on.
    pub fn enables_gradient(&self) -> bool {
        self.effects
            .as_ref()
            .and_then(|e| e.gradient.as_ref())
            .and_then(|g| g.enabled)
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StylePatch {
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    pub underline: Option<bool>,
}

impl StylePatch {
    fn merge_into(&self, style: &mut FontStyle) {
        if let Some(v) = self.bold {
            style.bold = v;
        }
        if let Some(v) = self.italic {
            style.italic = v;
        }
        if let Some(v) = self.underline {
            style.underline = v;
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StrokePatch {
    pub enabled: Option<bool>,
    pub width: Option<f32>,
    pub color: Option<Color>,
}

impl StrokePatch {
    fn merge_into(&self, stroke: &mut StrokeStyle) {
        if let Some(v) = self.enabled {
            stroke.enabled = v;
        }
        if let Some(v) = self.width {
            stroke.width = v.max(MIN_STROKE_WIDTH);
        }
        if let Some(v) = self.color {
            stroke.color = v;
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TransformPatch {
    pub scale: Option<Vec2>,
    pub skew: Option<Vec2>,
}

impl TransformPatch {
    fn merge_into(&self, transform: &mut LayerTransform) {
        if let Some(v) = self.scale {
            transform.scale = v;
        }
        if let Some(v) = self.skew {
            transform.skew = v;
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EffectsPatch {
    pub shadow: Option<ShadowPatch>,
    pub glow: Option<GlowPatch>,
    pub gradient: Option<GradientPatch>,
}

impl EffectsPatch {
    fn merge_into(&self, effects: &mut LayerEffects) {
        if let Some(shadow) = &self.shadow {
            shadow.merge_into(&mut effects.shadow);
        }
        if let Some(glow) = &self.glow {
            glow.merge_into(&mut effects.glow);
        }
        if let Some(gradient) = &self.gradient {
            gradient.merge_into(&mut effects.gradient);
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShadowPatch {
    pub enabled: Option<bool>,
    pub color: Option<Color>,
    pub blur: Option<f32>,
    pub offset: Option<Vec2>,
}

impl ShadowPatch {
    fn merge_into(&self, shadow: &mut ShadowEffect) {
        if let Some(v) = self.enabled {
            shadow.enabled = v;
        }
        if let Some(v) = self.color {
            shadow.color = v;
        }
        if let Some(v) = self.blur {
            shadow.blur = v.max(0.0);
        }
        if let Some(v) = self.offset {
            shadow.offset = v;
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GlowPatch {
    pub enabled: Option<bool>,
    pub color: Option<Color>,
    pub radius: Option<f32>,
}

impl GlowPatch {
    fn merge_into(&self, glow: &mut GlowEffect) {
        if let Some(v) = self.enabled {
            glow.enabled = v;
        }
        if let Some(v) = self.color {
            glow.color = v;
        }
        if let Some(v) = self.radius {
            glow.radius = v.max(0.0);
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GradientPatch {
    pub enabled: Option<bool>,
    pub kind: Option<GradientKind>,
    pub colors: Option<Vec<Color>>,
    pub angle: Option<f32>,
}

impl GradientPatch {
    fn merge_into(&self, gradient: &mut GradientEffect) {
        if let Some(v) = self.enabled {
            gradient.enabled = v;
        }
        if let Some(v) = self.kind {
            gradient.kind = v;
        }
        if let Some(colors) = &self.colors {
            if !colors.is_empty() {
                gradient.colors = colors.clone();
                gradient.ensure_min_stops();
            }
        }
        if let Some(v) = self.angle {
            gradient.angle = v;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factory_defaults_are_neutral() {
        let layer = TextLayer::new(7);
        assert_eq!(layer.id, 7);
        assert_eq!(layer.opacity, 100.0);
        assert_eq!(layer.position, Vec2::splat(50.0));
        assert_eq!(layer.transform.scale, Vec2::splat(1.0));
        assert!(!layer.stroke.enabled);
        assert!(!layer.effects.shadow.enabled);
        assert!(!layer.effects.gradient.enabled);
        assert_eq!(layer.effects.gradient.colors.len(), 2);
    }

    #[test]
    fn patch_clamps_numeric_fields() {
        let mut layer = TextLayer::new(1);
        layer.apply_patch(&LayerPatch {
            font_size: Some(-10.0),
            opacity: Some(250.0),
            position: Some(Vec2::new(150.0, -3.0)),
            ..LayerPatch::default()
        });
        assert_eq!(layer.font_size, MIN_FONT_SIZE);
        assert_eq!(layer.opacity, 100.0);
        assert_eq!(layer.position, Vec2::new(100.0, 0.0));
    }

    #[test]
    fn effect_patch_preserves_sibling_effects() {
        let mut layer = TextLayer::new(1);
        layer.effects.gradient.enabled = true;
        layer.effects.gradient.angle = 45.0;
        layer.effects.glow.enabled = true;
        layer.effects.glow.radius = 12.0;

        layer.apply_patch(&LayerPatch {
            effects: Some(EffectsPatch {
                shadow: Some(ShadowPatch {
                    enabled: Some(true),
                    ..ShadowPatch::default()
                }),
                ..EffectsPatch::default()
            }),
            ..LayerPatch::default()
        });

        assert!(layer.effects.shadow.enabled);
        assert!(layer.effects.gradient.enabled, "gradient sibling erased");
        assert_eq!(layer.effects.gradient.angle, 45.0);
        assert!(layer.effects.glow.enabled, "glow sibling erased");
        assert_eq!(layer.effects.glow.radius, 12.0);
    }

    #[test]
    fn effect_patch_preserves_sibling_fields_within_effect() {
        let mut layer = TextLayer::new(1);
        layer.effects.shadow.blur = 9.0;
        layer.effects.shadow.offset = Vec2::new(5.0, -5.0);

        layer.apply_patch(&LayerPatch {
            effects: Some(EffectsPatch {
                shadow: Some(ShadowPatch {
                    enabled: Some(true),
                    ..ShadowPatch::default()
                }),
                ..EffectsPatch::default()
            }),
            ..LayerPatch::default()
        });

        assert!(layer.effects.shadow.enabled);
        assert_eq!(layer.effects.shadow.blur, 9.0);
        assert_eq!(layer.effects.shadow.offset, Vec2::new(5.0, -5.0));
    }

    #[test]
    fn style_patch_merges_flags_independently() {
        let mut layer = TextLayer::new(1);
        layer.style.underline = true;
        layer.apply_patch(&LayerPatch {
            style: Some(StylePatch {
                bold: Some(true),
                ..StylePatch::default()
            }),
            ..LayerPatch::default()
        });
        assert!(layer.style.bold);
        assert!(layer.style.underline, "underline erased by bold patch");
    }

    #[test]
    fn gradient_colors_padded_to_two_stops() {
        let mut layer = TextLayer::new(1);
        layer.apply_patch(&LayerPatch {
            effects: Some(EffectsPatch {
                gradient: Some(GradientPatch {
                    colors: Some(vec![Color::rgb(10, 20, 30)]),
                    ..GradientPatch::default()
                }),
                ..EffectsPatch::default()
            }),
            ..LayerPatch::default()
        });
        assert_eq!(layer.effects.gradient.colors.len(), 2);
        assert_eq!(layer.effects.gradient.colors[0], layer.effects.gradient.colors[1]);
    }

    #[test]
    fn layer_serde_round_trip() {
        let mut layer = TextLayer::new(3).with_text("hello").with_font_size(48.0);
        layer.effects.gradient.enabled = true;
        layer.rotation = 30.0;

        let json = serde_json::to_string(&layer).unwrap();
        assert!(json.contains("\"fontSize\""));
        assert!(json.contains("\"letterSpacing\""));
        let back: TextLayer = serde_json::from_str(&json).unwrap();
        assert_eq!(back, layer);
    }

    #[test]
    fn patch_deserializes_from_partial_json() {
        let patch: LayerPatch =
            serde_json::from_str(r#"{"effects":{"shadow":{"enabled":true}}}"#).unwrap();
        assert!(!patch.enables_gradient());
        let shadow = patch.effects.unwrap().shadow.unwrap();
        assert_eq!(shadow.enabled, Some(true));
        assert_eq!(shadow.blur, None);
    }
}
