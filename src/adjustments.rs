//! Global pixel adjustments applied to the base image.
//!
//! One record for the whole scene, mutated wholesale. Values follow CSS
//! filter semantics: brightness/contrast/saturation are percentages with 100
//! as the neutral point, blur is a pixel radius, opacity is 0-100. The
//! application order is fixed and matches the filter-string concatenation of
//! the editing surface: brightness, contrast, saturate, blur, opacity, then
//! the boolean filters (grayscale, sepia, invert).

use image::{RgbaImage, imageops};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterFlags {
    pub grayscale: bool,
    pub sepia: bool,
    pub invert: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImageAdjustments {
    /// 0-200, 100 = neutral.
    pub brightness: f32,
    /// 0-200, 100 = neutral.
    pub contrast: f32,
    /// 0-200, 100 = neutral.
    pub saturation: f32,
    /// Blur radius in pixels, >= 0.
    pub blur: f32,
    /// 0-100.
    pub opacity: f32,
    pub filters: FilterFlags,
}

impl Default for ImageAdjustments {
    fn default() -> Self {
        Self {
            brightness: 100.0,
            contrast: 100.0,
            saturation: 100.0,
            blur: 0.0,
            opacity: 100.0,
            filters: FilterFlags::default(),
        }
    }
}

impl ImageAdjustments {
    /// Clamps every field into its documented range.
    pub fn clamped(mut self) -> Self {
        self.brightness = self.brightness.clamp(0.0, 200.0);
        self.contrast = self.contrast.clamp(0.0, 200.0);
        self.saturation = self.saturation.clamp(0.0, 200.0);
        self.blur = self.blur.max(0.0);
        self.opacity = self.opacity.clamp(0.0, 100.0);
        self
    }

    /// True when applying these adjustments would not change any pixel.
    pub fn is_neutral(&self) -> bool {
        *self == Self::default()
    }
}

// Rec. 709 luma weights, shared by saturation and grayscale.
const LUMA: [f32; 3] = [0.2126, 0.7152, 0.0722];

/// Applies the adjustments to an image, in the fixed order documented on
/// [`ImageAdjustments`].
pub fn apply_adjustments(img: &mut RgbaImage, adj: &ImageAdjustments) {
    let adj = adj.clamped();
    if adj.is_neutral() {
        return;
    }

    let brightness = adj.brightness / 100.0;
    let contrast = adj.contrast / 100.0;
    let saturation = adj.saturation / 100.0;

    if brightness != 1.0 || contrast != 1.0 || saturation != 1.0 {
        for pixel in img.pixels_mut() {
            let mut rgb = [
                pixel[0] as f32 / 255.0,
                pixel[1] as f32 / 255.0,
                pixel[2] as f32 / 255.0,
            ];
            for v in &mut rgb {
                *v *= brightness;
                *v = (*v - 0.5) * contrast + 0.5;
            }
            let luma = LUMA[0] * rgb[0] + LUMA[1] * rgb[1] + LUMA[2] * rgb[2];
            for v in &mut rgb {
                *v = luma + (*v - luma) * saturation;
            }
            pixel[0] = to_u8(rgb[0]);
            pixel[1] = to_u8(rgb[1]);
            pixel[2] = to_u8(rgb[2]);
        }
    }

    if adj.blur > 0.0 {
        let blurred = imageops::blur(&*img, adj.blur);
        *img = blurred;
    }

    let alpha_factor = adj.opacity / 100.0;
    let needs_alpha = alpha_factor < 1.0;
    let flags = adj.filters;
    if needs_alpha || flags != FilterFlags::default() {
        for pixel in img.pixels_mut() {
            if needs_alpha {
                pixel[3] = (pixel[3] as f32 * alpha_factor).round() as u8;
            }
            let mut rgb = [
                pixel[0] as f32 / 255.0,
                pixel[1] as f32 / 255.0,
                pixel[2] as f32 / 255.0,
            ];
            if flags.grayscale {
                let luma = LUMA[0] * rgb[0] + LUMA[1] * rgb[1] + LUMA[2] * rgb[2];
                rgb = [luma, luma, luma];
            }
            if flags.sepia {
                let [r, g, b] = rgb;
                rgb = [
                    0.393 * r + 0.769 * g + 0.189 * b,
                    0.349 * r + 0.686 * g + 0.168 * b,
                    0.272 * r + 0.534 * g + 0.131 * b,
                ];
            }
            if flags.invert {
                for v in &mut rgb {
                    *v = 1.0 - v.clamp(0.0, 1.0);
                }
            }
            pixel[0] = to_u8(rgb[0]);
            pixel[1] = to_u8(rgb[1]);
            pixel[2] = to_u8(rgb[2]);
        }
    }
}

fn to_u8(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn solid(color: [u8; 4]) -> RgbaImage {
        RgbaImage::from_pixel(4, 4, Rgba(color))
    }

    #[test]
    fn neutral_adjustments_change_nothing() {
        let mut img = solid([120, 60, 200, 255]);
        let before = img.clone();
        apply_adjustments(&mut img, &ImageAdjustments::default());
        assert_eq!(img, before);
    }

    #[test]
    fn brightness_scales_channels() {
        let mut img = solid([100, 100, 100, 255]);
        let adj = ImageAdjustments { brightness: 50.0, ..ImageAdjustments::default() };
        apply_adjustments(&mut img, &adj);
        assert_eq!(img.get_pixel(0, 0).0, [50, 50, 50, 255]);
    }

    #[test]
    fn zero_contrast_flattens_to_midpoint() {
        let mut img = solid([255, 0, 128, 255]);
        let adj = ImageAdjustments { contrast: 0.0, ..ImageAdjustments::default() };
        apply_adjustments(&mut img, &adj);
        let p = img.get_pixel(0, 0).0;
        assert_eq!([p[0], p[1]], [128, 128]);
    }

    #[test]
    fn zero_saturation_is_grayscale() {
        let mut img = solid([255, 0, 0, 255]);
        let adj = ImageAdjustments { saturation: 0.0, ..ImageAdjustments::default() };
        apply_adjustments(&mut img, &adj);
        let p = img.get_pixel(0, 0).0;
        assert_eq!(p[0], p[1]);
        assert_eq!(p[1], p[2]);
    }

    #[test]
    fn opacity_scales_alpha_only() {
        let mut img = solid([10, 20, 30, 200]);
        let adj = ImageAdjustments { opacity: 50.0, ..ImageAdjustments::default() };
        apply_adjustments(&mut img, &adj);
        assert_eq!(img.get_pixel(0, 0).0, [10, 20, 30, 100]);
    }

    #[test]
    fn invert_flag_flips_channels() {
        let mut img = solid([0, 255, 10, 255]);
        let adj = ImageAdjustments {
            filters: FilterFlags { invert: true, ..FilterFlags::default() },
            ..ImageAdjustments::default()
        };
        apply_adjustments(&mut img, &adj);
        assert_eq!(img.get_pixel(0, 0).0, [255, 0, 245, 255]);
    }

    #[test]
    fn clamped_bounds_every_field() {
        let adj = ImageAdjustments {
            brightness: 900.0,
            contrast: -5.0,
            saturation: 201.0,
            blur: -1.0,
            opacity: 101.0,
            filters: FilterFlags::default(),
        }
        .clamped();
        assert_eq!(adj.brightness, 200.0);
        assert_eq!(adj.contrast, 0.0);
        assert_eq!(adj.saturation, 200.0);
        assert_eq!(adj.blur, 0.0);
        assert_eq!(adj.opacity, 100.0);
    }
}
