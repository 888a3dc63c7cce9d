//! The frame rendering pipeline.
//!
//! Each frame is drawn in a fixed compositing order: opaque black fill,
//! the adjusted base image at its fit rectangle, the unfiltered
//! background-removed overlay at its own fit rectangle, then every text
//! layer bottom-to-top. Adjustments never leak into the overlay or the text
//! pass.
//!
//! [`render_frame`] is a pure function of the scene: identical state yields
//! bit-identical pixels, which is what makes redraw coalescing and export
//! reproducibility possible.

pub(crate) mod gradient;
pub(crate) mod image_pass;
pub(crate) mod text_pass;

use image::{Rgba, RgbaImage};

use crate::error::{RenderError, Result};
use crate::scene::Scene;
use crate::typography::Typesetter;

/// Which surface a frame is being produced for.
///
/// Export renders suppress interaction-only overlays (the selection
/// highlight) so exported pixels never depend on editor state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderPass {
    Interactive,
    Export,
}

/// Renders one full frame of the scene.
///
/// Fails if no base image is loaded or if text measurement is unavailable;
/// no partial frame is produced in either case.
pub fn render_frame(
    scene: &Scene,
    typesetter: &dyn Typesetter,
    pass: RenderPass,
    highlight_visible: bool,
) -> Result<RgbaImage> {
    let base = scene.base_image.as_ref().ok_or(RenderError::NoBaseImage)?;

    let mut canvas = RgbaImage::from_pixel(
        scene.canvas_width,
        scene.canvas_height,
        Rgba([0, 0, 0, 255]),
    );

    image_pass::draw_base(&mut canvas, base, &scene.adjustments);
    if let Some(processed) = &scene.processed_image {
        image_pass::draw_processed(&mut canvas, processed);
    }

    let canvas_w = scene.canvas_width as f32;
    let canvas_h = scene.canvas_height as f32;
    for (index, layer) in scene.layers.iter().enumerate() {
        let Some(layout) = text_pass::layout_layer(layer, typesetter, canvas_w, canvas_h)? else {
            continue;
        };
        text_pass::draw_layer(&mut canvas, layer, typesetter, &layout)?;

        let selected = scene.active_layer == Some(index);
        if selected && highlight_visible && pass == RenderPass::Interactive {
            text_pass::draw_highlight(&mut canvas, &layout);
        }
    }

    Ok(canvas)
}

// ============================================================================
// Shared compositing helpers
// ============================================================================

/// Source-over blends `src` onto the destination pixel.
pub(crate) fn blend_pixel(dst: &mut Rgba<u8>, src: Rgba<u8>) {
    let sa = src[3] as f32 / 255.0;
    if sa <= 0.0 {
        return;
    }
    let da = dst[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        *dst = Rgba([0, 0, 0, 0]);
        return;
    }
    for i in 0..3 {
        let s = src[i] as f32 / 255.0;
        let d = dst[i] as f32 / 255.0;
        let out = (s * sa + d * da * (1.0 - sa)) / out_a;
        dst[i] = (out * 255.0).round() as u8;
    }
    dst[3] = (out_a * 255.0).round() as u8;
}

/// Source-over composites `src` onto `dest` at an integer offset, clipping
/// at the destination bounds.
pub(crate) fn composite_over(dest: &mut RgbaImage, src: &RgbaImage, x: i32, y: i32) {
    let dest_w = dest.width() as i32;
    let dest_h = dest.height() as i32;

    for sy in 0..src.height() {
        let dy = y + sy as i32;
        if dy < 0 || dy >= dest_h {
            continue;
        }
        for sx in 0..src.width() {
            let dx = x + sx as i32;
            if dx < 0 || dx >= dest_w {
                continue;
            }
            let src_pixel = *src.get_pixel(sx, sy);
            if src_pixel[3] == 0 {
                continue;
            }
            blend_pixel(dest.get_pixel_mut(dx as u32, dy as u32), src_pixel);
        }
    }
}

/// Bilinear sample with straight-alpha inputs; interpolation happens in
/// premultiplied space to avoid color fringing at transparent edges.
pub(crate) fn sample_bilinear(img: &RgbaImage, x: f32, y: f32) -> Rgba<u8> {
    let w = img.width() as i32;
    let h = img.height() as i32;
    if w == 0 || h == 0 || x <= -1.0 || y <= -1.0 || x >= w as f32 || y >= h as f32 {
        return Rgba([0, 0, 0, 0]);
    }

    let x0 = x.floor();
    let y0 = y.floor();
    let fx = x - x0;
    let fy = y - y0;
    let x0 = x0 as i32;
    let y0 = y0 as i32;

    let fetch = |px: i32, py: i32| -> [f32; 4] {
        if px < 0 || py < 0 || px >= w || py >= h {
            return [0.0; 4];
        }
        let p = img.get_pixel(px as u32, py as u32);
        let a = p[3] as f32 / 255.0;
        [
            p[0] as f32 / 255.0 * a,
            p[1] as f32 / 255.0 * a,
            p[2] as f32 / 255.0 * a,
            a,
        ]
    };

    let p00 = fetch(x0, y0);
    let p10 = fetch(x0 + 1, y0);
    let p01 = fetch(x0, y0 + 1);
    let p11 = fetch(x0 + 1, y0 + 1);

    let mut out = [0.0f32; 4];
    for i in 0..4 {
        let top = p00[i] * (1.0 - fx) + p10[i] * fx;
        let bottom = p01[i] * (1.0 - fx) + p11[i] * fx;
        out[i] = top * (1.0 - fy) + bottom * fy;
    }

    let a = out[3];
    if a <= 0.0 {
        return Rgba([0, 0, 0, 0]);
    }
    Rgba([
        ((out[0] / a).clamp(0.0, 1.0) * 255.0).round() as u8,
        ((out[1] / a).clamp(0.0, 1.0) * 255.0).round() as u8,
        ((out[2] / a).clamp(0.0, 1.0) * 255.0).round() as u8,
        (a.clamp(0.0, 1.0) * 255.0).round() as u8,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blend_opaque_replaces() {
        let mut dst = Rgba([255, 0, 0, 255]);
        blend_pixel(&mut dst, Rgba([0, 0, 255, 255]));
        assert_eq!(dst.0, [0, 0, 255, 255]);
    }

    #[test]
    fn blend_transparent_is_noop() {
        let mut dst = Rgba([10, 20, 30, 255]);
        blend_pixel(&mut dst, Rgba([255, 255, 255, 0]));
        assert_eq!(dst.0, [10, 20, 30, 255]);
    }

    #[test]
    fn blend_half_alpha_mixes() {
        let mut dst = Rgba([0, 0, 0, 255]);
        blend_pixel(&mut dst, Rgba([255, 255, 255, 128]));
        let v = dst.0[0];
        assert!((120..=136).contains(&v), "got {v}");
        assert_eq!(dst.0[3], 255);
    }

    #[test]
    fn composite_clips_at_bounds() {
        let mut dest = RgbaImage::from_pixel(4, 4, Rgba([255, 0, 0, 255]));
        let src = RgbaImage::from_pixel(4, 4, Rgba([0, 255, 0, 255]));
        composite_over(&mut dest, &src, 2, 2);
        assert_eq!(dest.get_pixel(0, 0).0, [255, 0, 0, 255]);
        assert_eq!(dest.get_pixel(3, 3).0, [0, 255, 0, 255]);
    }

    #[test]
    fn bilinear_center_of_pixel_is_exact() {
        let mut img = RgbaImage::new(2, 1);
        img.put_pixel(0, 0, Rgba([100, 0, 0, 255]));
        img.put_pixel(1, 0, Rgba([200, 0, 0, 255]));
        assert_eq!(sample_bilinear(&img, 0.0, 0.0).0, [100, 0, 0, 255]);
        let mid = sample_bilinear(&img, 0.5, 0.0);
        assert_eq!(mid.0[0], 150);
    }

    #[test]
    fn bilinear_outside_is_transparent() {
        let img = RgbaImage::from_pixel(2, 2, Rgba([255, 255, 255, 255]));
        assert_eq!(sample_bilinear(&img, -5.0, 0.0).0[3], 0);
        assert_eq!(sample_bilinear(&img, 0.0, 10.0).0[3], 0);
    }
}
