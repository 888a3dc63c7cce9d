//! Per-layer text rendering: layout, effects, and transformed compositing.
//!
//! Each layer is rasterized into a local buffer in the layer's own
//! coordinate space (origin at the anchor, which is the center of the text
//! box), with effects applied in a fixed order:
//!
//! 1. shadow (blurred, offset coverage)
//! 2. glow (blurred, centered coverage)
//! 3. stroke (dilated coverage, drawn before the fill)
//! 4. fill (flat color or gradient across the text box)
//! 5. underline (flat fill color, never the gradient)
//! 6. layer opacity
//!
//! The buffer is then composited onto the canvas through the layer's affine
//! transform (shear, scale, rotation around the anchor). Hit-testing uses
//! the inverse of the same transform and the same measured box, so selection
//! math always agrees with rendering math.

use image::{Rgba, RgbaImage};

use crate::color::Color;
use crate::error::Result;
use crate::geometry::{Affine2, Vec2, percent_to_pixel};
use crate::layer::TextLayer;
use crate::typography::{GlyphCoverage, Typesetter};

use super::{blend_pixel, gradient::GradientSampler, sample_bilinear};

/// Padding added around the text box for hit-testing and the selection
/// highlight.
pub(crate) const HIT_PADDING: f32 = 10.0;

/// Translucent selection highlight, interactive renders only.
const HIGHLIGHT_COLOR: Color = Color([59, 130, 246, 64]);

/// Horizontal shear factor for synthesized italics.
const ITALIC_SHEAR: f32 = 0.2;

// ============================================================================
// Layout
// ============================================================================

/// Resolved geometry for one layer, shared by rendering and hit-testing.
///
/// Local coordinates have their origin at the layer anchor with the text box
/// spanning `[-width/2, width/2] x [-height/2, height/2]`.
pub(crate) struct LayerLayout {
    pub width: f32,
    pub height: f32,
    pub ascent: f32,
    /// Pen x-position per character, relative to the text's left edge.
    pub origins: Vec<f32>,
    pub to_canvas: Affine2,
    pub from_canvas: Affine2,
}

impl LayerLayout {
    /// Local y of the text baseline.
    fn baseline(&self) -> f32 {
        -self.height / 2.0 + self.ascent
    }

    /// True when a canvas-space point falls within the text box expanded by
    /// `padding` on every side, honoring the layer transform.
    pub(crate) fn contains(&self, canvas_point: Vec2, padding: f32) -> bool {
        let p = self.from_canvas.apply(canvas_point);
        p.x.abs() <= self.width / 2.0 + padding && p.y.abs() <= self.height / 2.0 + padding
    }
}

/// Computes a layer's layout, or `None` when the layer renders nothing
/// (empty text or a degenerate transform).
pub(crate) fn layout_layer(
    layer: &TextLayer,
    typesetter: &dyn Typesetter,
    canvas_w: f32,
    canvas_h: f32,
) -> Result<Option<LayerLayout>> {
    if layer.text.is_empty() {
        return Ok(None);
    }

    let metrics = typesetter.measure(&layer.text, &layer.font_family, layer.font_size)?;
    let width = metrics.spaced_width(layer.letter_spacing);
    let height = metrics.height();
    if width <= 0.0 || height <= 0.0 {
        return Ok(None);
    }

    let anchor = percent_to_pixel(layer.position, canvas_w, canvas_h);
    let to_canvas = Affine2::shear(layer.transform.skew.x, layer.transform.skew.y)
        .then(Affine2::scaling(layer.transform.scale.x, layer.transform.scale.y))
        .then(Affine2::rotation(layer.rotation.to_radians()))
        .then(Affine2::translation(anchor.x, anchor.y));
    let Some(from_canvas) = to_canvas.inverse() else {
        // Zero scale: nothing drawable or hittable.
        return Ok(None);
    };

    Ok(Some(LayerLayout {
        width,
        height,
        ascent: metrics.ascent,
        origins: metrics.char_origins(layer.letter_spacing),
        to_canvas,
        from_canvas,
    }))
}

// ============================================================================
// Drawing
// ============================================================================

/// Renders one text layer onto the canvas.
pub(crate) fn draw_layer(
    canvas: &mut RgbaImage,
    layer: &TextLayer,
    typesetter: &dyn Typesetter,
    layout: &LayerLayout,
) -> Result<()> {
    let w = layout.width;
    let h = layout.height;
    let shadow = &layer.effects.shadow;
    let glow = &layer.effects.glow;

    // Local buffer must hold everything the effects can reach.
    let stroke_reach = if layer.stroke.enabled {
        (layer.stroke.width / 2.0).ceil()
    } else {
        0.0
    };
    let shadow_reach = if shadow.enabled {
        shadow.blur * 2.0 + shadow.offset.x.abs().max(shadow.offset.y.abs())
    } else {
        0.0
    };
    let glow_reach = if glow.enabled { glow.radius * 2.0 } else { 0.0 };
    let underline_reach = if layer.style.underline {
        layer.font_size * 0.15 + 2.0
    } else {
        0.0
    };
    let margin = (2.0 + stroke_reach + shadow_reach.max(glow_reach) + underline_reach).ceil();

    let buf_w = (w + 2.0 * margin).ceil() as u32 + 1;
    let buf_h = (h + 2.0 * margin).ceil() as u32 + 1;
    // Local coordinates of the buffer's top-left pixel.
    let buf_origin = Vec2::new(-w / 2.0 - margin, -h / 2.0 - margin);
    let baseline = layout.baseline();

    // Glyph coverage, character by character along the spaced advances.
    let mut coverage = vec![0.0f32; buf_w as usize * buf_h as usize];
    for (i, ch) in layer.text.chars().enumerate() {
        let Some(glyph) = typesetter.rasterize(ch, &layer.font_family, layer.font_size)? else {
            continue;
        };
        let pen_x = -w / 2.0 + layout.origins[i];
        blit_glyph(
            &mut coverage,
            buf_w,
            buf_h,
            buf_origin,
            &glyph,
            pen_x,
            baseline,
            layer.style.bold,
            layer.style.italic,
        );
    }

    // A stroke of width w straddles the glyph edge, so only w/2 shows
    // outside the fill.
    let stroke_coverage = layer
        .stroke
        .enabled
        .then(|| dilate(&coverage, buf_w, buf_h, layer.stroke.width / 2.0));

    let underline = layer.style.underline.then(|| {
        let thickness = (layer.font_size * 0.05).max(1.0);
        let top = baseline + layer.font_size * 0.08;
        (top, thickness)
    });

    // Coverage source for shadow and glow: everything that will be inked.
    let needs_halo = shadow.enabled || glow.enabled;
    let halo_source = needs_halo.then(|| {
        let mut source = stroke_coverage.clone().unwrap_or_else(|| coverage.clone());
        if let Some((top, thickness)) = underline {
            stamp_rect(&mut source, buf_w, buf_h, buf_origin, -w / 2.0, top, w, thickness);
        }
        source
    });

    let mut buf = RgbaImage::new(buf_w, buf_h);

    if shadow.enabled {
        if let Some(source) = &halo_source {
            let blurred = blur_coverage(source, buf_w, buf_h, shadow.blur);
            tint_into(&mut buf, &blurred, shadow.color, shadow.offset.x, shadow.offset.y);
        }
    }
    if glow.enabled {
        if let Some(source) = &halo_source {
            let blurred = blur_coverage(source, buf_w, buf_h, glow.radius * 0.5);
            tint_into(&mut buf, &blurred, glow.color, 0.0, 0.0);
        }
    }
    if let Some(stroke_cov) = &stroke_coverage {
        tint_into(&mut buf, stroke_cov, layer.stroke.color, 0.0, 0.0);
    }

    if layer.effects.gradient.enabled {
        let sampler = GradientSampler::new(&layer.effects.gradient, w, h);
        for y in 0..buf_h {
            for x in 0..buf_w {
                let cov = coverage[y as usize * buf_w as usize + x as usize];
                if cov <= 0.003 {
                    continue;
                }
                // Box coordinates relative to the text's top-left corner.
                let bx = buf_origin.x + x as f32 + w / 2.0;
                let by = buf_origin.y + y as f32 + h / 2.0;
                let color = sampler.color_at(bx, by).scale_alpha(cov);
                blend_pixel(buf.get_pixel_mut(x, y), color.into());
            }
        }
    } else {
        tint_into(&mut buf, &coverage, layer.color, 0.0, 0.0);
    }

    if let Some((top, thickness)) = underline {
        fill_rect(&mut buf, buf_origin, -w / 2.0, top, w, thickness, layer.color);
    }

    let alpha = (layer.opacity / 100.0).clamp(0.0, 1.0);
    if alpha < 1.0 {
        for pixel in buf.pixels_mut() {
            pixel[3] = (pixel[3] as f32 * alpha).round() as u8;
        }
    }

    composite_transformed(canvas, &buf, buf_origin, layout);
    Ok(())
}

/// Draws the translucent selection highlight over the layer's padded box.
pub(crate) fn draw_highlight(canvas: &mut RgbaImage, layout: &LayerLayout) {
    let half_w = layout.width / 2.0 + HIT_PADDING;
    let half_h = layout.height / 2.0 + HIT_PADDING;
    let corners = [
        Vec2::new(-half_w, -half_h),
        Vec2::new(half_w, -half_h),
        Vec2::new(-half_w, half_h),
        Vec2::new(half_w, half_h),
    ];
    let Some((x0, y0, x1, y1)) = canvas_bounds(canvas, &corners, &layout.to_canvas) else {
        return;
    };

    let highlight: Rgba<u8> = HIGHLIGHT_COLOR.into();
    for dy in y0..y1 {
        for dx in x0..x1 {
            let p = layout
                .from_canvas
                .apply(Vec2::new(dx as f32 + 0.5, dy as f32 + 0.5));
            if p.x.abs() <= half_w && p.y.abs() <= half_h {
                blend_pixel(canvas.get_pixel_mut(dx, dy), highlight);
            }
        }
    }
}

// ============================================================================
// Raster helpers
// ============================================================================

#[allow(clippy::too_many_arguments)]
fn blit_glyph(
    coverage: &mut [f32],
    buf_w: u32,
    buf_h: u32,
    buf_origin: Vec2,
    glyph: &GlyphCoverage,
    pen_x: f32,
    baseline: f32,
    bold: bool,
    italic: bool,
) {
    for gy in 0..glyph.height {
        for gx in 0..glyph.width {
            let cov = glyph.data[gy as usize * glyph.width as usize + gx as usize];
            if cov <= 0.0 {
                continue;
            }
            let mut lx = pen_x + glyph.left + gx as f32;
            let ly = baseline + glyph.top + gy as f32;
            if italic {
                lx += (baseline - ly) * ITALIC_SHEAR;
            }
            let ix = (lx - buf_origin.x).round() as i32;
            let iy = (ly - buf_origin.y).round() as i32;
            if ix < 0 || iy < 0 || ix >= buf_w as i32 || iy >= buf_h as i32 {
                continue;
            }
            let idx = iy as usize * buf_w as usize + ix as usize;
            coverage[idx] = coverage[idx].max(cov);
            // Synthesized bold: repeat the coverage one pixel to the right.
            if bold && ix + 1 < buf_w as i32 {
                coverage[idx + 1] = coverage[idx + 1].max(cov);
            }
        }
    }
}

/// Morphological dilation by a disc of the given radius. The result contains
/// the input, so it doubles as stroke-plus-fill coverage.
fn dilate(coverage: &[f32], buf_w: u32, buf_h: u32, radius: f32) -> Vec<f32> {
    let r = radius.ceil() as i32;
    let r_sq = radius * radius + 0.25;
    let mut offsets = Vec::new();
    for dy in -r..=r {
        for dx in -r..=r {
            if (dx * dx + dy * dy) as f32 <= r_sq {
                offsets.push((dx, dy));
            }
        }
    }

    let w = buf_w as i32;
    let h = buf_h as i32;
    let mut out = vec![0.0f32; coverage.len()];
    for y in 0..h {
        for x in 0..w {
            let mut best = 0.0f32;
            for &(dx, dy) in &offsets {
                let sx = x + dx;
                let sy = y + dy;
                if sx < 0 || sy < 0 || sx >= w || sy >= h {
                    continue;
                }
                best = best.max(coverage[sy as usize * w as usize + sx as usize]);
                if best >= 1.0 {
                    break;
                }
            }
            out[y as usize * w as usize + x as usize] = best;
        }
    }
    out
}

/// Approximate gaussian blur of a coverage buffer: three separable box
/// passes. Deterministic for identical inputs.
fn blur_coverage(coverage: &[f32], buf_w: u32, buf_h: u32, sigma: f32) -> Vec<f32> {
    let mut out = coverage.to_vec();
    if sigma <= 0.0 {
        return out;
    }
    let radius = ((sigma * 0.6).round() as i32).max(1);
    let mut scratch = vec![0.0f32; out.len()];
    for _ in 0..3 {
        box_blur_axis(&out, &mut scratch, buf_w, buf_h, radius, true);
        box_blur_axis(&scratch, &mut out, buf_w, buf_h, radius, false);
    }
    out
}

fn box_blur_axis(src: &[f32], dst: &mut [f32], buf_w: u32, buf_h: u32, radius: i32, horizontal: bool) {
    let w = buf_w as i32;
    let h = buf_h as i32;
    let norm = 1.0 / (2 * radius + 1) as f32;
    let (outer, inner) = if horizontal { (h, w) } else { (w, h) };

    for o in 0..outer {
        for i in 0..inner {
            let mut sum = 0.0f32;
            for d in -radius..=radius {
                let s = i + d;
                if s < 0 || s >= inner {
                    continue;
                }
                let (x, y) = if horizontal { (s, o) } else { (o, s) };
                sum += src[y as usize * w as usize + x as usize];
            }
            let (x, y) = if horizontal { (i, o) } else { (o, i) };
            dst[y as usize * w as usize + x as usize] = sum * norm;
        }
    }
}

/// Stamps a solid rectangle (local coordinates) into a coverage buffer.
fn stamp_rect(
    coverage: &mut [f32],
    buf_w: u32,
    buf_h: u32,
    buf_origin: Vec2,
    left: f32,
    top: f32,
    width: f32,
    height: f32,
) {
    let x0 = ((left - buf_origin.x).floor() as i32).max(0);
    let y0 = ((top - buf_origin.y).floor() as i32).max(0);
    let x1 = ((left + width - buf_origin.x).ceil() as i32).min(buf_w as i32);
    let y1 = ((top + height - buf_origin.y).ceil() as i32).min(buf_h as i32);
    for y in y0..y1 {
        for x in x0..x1 {
            coverage[y as usize * buf_w as usize + x as usize] = 1.0;
        }
    }
}

/// Blends a coverage buffer into the layer image as a flat color, with an
/// optional pixel offset (used by the shadow pass).
fn tint_into(buf: &mut RgbaImage, coverage: &[f32], color: Color, offset_x: f32, offset_y: f32) {
    let w = buf.width() as i32;
    let h = buf.height() as i32;
    let dx = offset_x.round() as i32;
    let dy = offset_y.round() as i32;
    for y in 0..h {
        for x in 0..w {
            let cov = coverage[y as usize * w as usize + x as usize];
            if cov <= 0.003 {
                continue;
            }
            let tx = x + dx;
            let ty = y + dy;
            if tx < 0 || ty < 0 || tx >= w || ty >= h {
                continue;
            }
            blend_pixel(
                buf.get_pixel_mut(tx as u32, ty as u32),
                color.scale_alpha(cov).into(),
            );
        }
    }
}

/// Fills a rectangle given in local coordinates with a flat color.
fn fill_rect(
    buf: &mut RgbaImage,
    buf_origin: Vec2,
    left: f32,
    top: f32,
    width: f32,
    height: f32,
    color: Color,
) {
    let x0 = ((left - buf_origin.x).floor() as i32).max(0);
    let y0 = ((top - buf_origin.y).floor() as i32).max(0);
    let x1 = ((left + width - buf_origin.x).ceil() as i32).min(buf.width() as i32);
    let y1 = ((top + height - buf_origin.y).ceil() as i32).min(buf.height() as i32);
    let src: Rgba<u8> = color.into();
    for y in y0..y1 {
        for x in x0..x1 {
            blend_pixel(buf.get_pixel_mut(x as u32, y as u32), src);
        }
    }
}

/// Composites the layer buffer onto the canvas through the layer transform,
/// sampling bilinearly via the inverse map.
fn composite_transformed(canvas: &mut RgbaImage, buf: &RgbaImage, buf_origin: Vec2, layout: &LayerLayout) {
    let corners = [
        buf_origin,
        Vec2::new(buf_origin.x + buf.width() as f32, buf_origin.y),
        Vec2::new(buf_origin.x, buf_origin.y + buf.height() as f32),
        Vec2::new(
            buf_origin.x + buf.width() as f32,
            buf_origin.y + buf.height() as f32,
        ),
    ];
    let Some((x0, y0, x1, y1)) = canvas_bounds(canvas, &corners, &layout.to_canvas) else {
        return;
    };

    for dy in y0..y1 {
        for dx in x0..x1 {
            let local = layout
                .from_canvas
                .apply(Vec2::new(dx as f32 + 0.5, dy as f32 + 0.5));
            let sample = sample_bilinear(
                buf,
                local.x - buf_origin.x - 0.5,
                local.y - buf_origin.y - 0.5,
            );
            if sample[3] > 0 {
                blend_pixel(canvas.get_pixel_mut(dx, dy), sample);
            }
        }
    }
}

/// Canvas-clamped bounding box of transformed local-space corners.
fn canvas_bounds(
    canvas: &RgbaImage,
    corners: &[Vec2; 4],
    to_canvas: &Affine2,
) -> Option<(u32, u32, u32, u32)> {
    let mut min_x = f32::INFINITY;
    let mut min_y = f32::INFINITY;
    let mut max_x = f32::NEG_INFINITY;
    let mut max_y = f32::NEG_INFINITY;
    for corner in corners {
        let p = to_canvas.apply(*corner);
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }

    let x0 = (min_x.floor() as i64).max(0) as u32;
    let y0 = (min_y.floor() as i64).max(0) as u32;
    let x1 = (max_x.ceil() as i64).clamp(0, canvas.width() as i64) as u32;
    let y1 = (max_y.ceil() as i64).clamp(0, canvas.height() as i64) as u32;
    if x0 >= x1 || y0 >= y1 {
        return None;
    }
    Some((x0, y0, x1, y1))
}
