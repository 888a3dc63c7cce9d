//! Base image and background-removed overlay drawing.
//!
//! The base image is resized to its fit rectangle, adjusted, and composited.
//! The processed overlay re-derives its own fit rectangle from its actual
//! dimensions (the background-removal service may resize) and is drawn with
//! no adjustments at all, so filters never bleed onto the subject cutout or
//! the text above it.

use image::{RgbaImage, imageops};

use crate::adjustments::{ImageAdjustments, apply_adjustments};
use crate::geometry::fit_image;

use super::composite_over;

/// Draws the adjusted base image at its fit rectangle.
pub(crate) fn draw_base(canvas: &mut RgbaImage, base: &RgbaImage, adjustments: &ImageAdjustments) {
    let Some((mut scaled, x, y)) = fitted(canvas, base) else {
        return;
    };
    apply_adjustments(&mut scaled, adjustments);
    composite_over(canvas, &scaled, x, y);
}

/// Draws the background-removed overlay at its fit rectangle, unfiltered.
pub(crate) fn draw_processed(canvas: &mut RgbaImage, processed: &RgbaImage) {
    let Some((scaled, x, y)) = fitted(canvas, processed) else {
        return;
    };
    composite_over(canvas, &scaled, x, y);
}

fn fitted(canvas: &RgbaImage, img: &RgbaImage) -> Option<(RgbaImage, i32, i32)> {
    let fit = fit_image(
        canvas.width() as f32,
        canvas.height() as f32,
        img.width() as f32,
        img.height() as f32,
    );
    let draw_w = fit.draw_w.round() as u32;
    let draw_h = fit.draw_h.round() as u32;
    if draw_w == 0 || draw_h == 0 {
        return None;
    }

    let scaled = if (draw_w, draw_h) == img.dimensions() {
        img.clone()
    } else {
        imageops::resize(img, draw_w, draw_h, imageops::FilterType::Triangle)
    };
    Some((scaled, fit.offset_x.round() as i32, fit.offset_y.round() as i32))
}
