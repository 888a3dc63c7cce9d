//! Coordinate-space primitives.
//!
//! Layer positions are stored as percentages of the canvas (0-100, origin
//! top-left) and converted to pixels at draw time. Images are letterboxed
//! into the canvas via [`fit_image`]. All functions here are pure; identical
//! inputs always produce identical outputs.

use serde::{Deserialize, Serialize};

// ============================================================================
// Vec2
// ============================================================================

/// A 2D vector or point.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn splat(v: f32) -> Self {
        Self { x: v, y: v }
    }
}

// ============================================================================
// Image fitting
// ============================================================================

/// The centered, aspect-preserving rectangle at which a source image is drawn
/// inside a differently-proportioned canvas.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FitRect {
    pub draw_w: f32,
    pub draw_h: f32,
    pub offset_x: f32,
    pub offset_y: f32,
}

/// Computes the letterbox/pillarbox fit of an image within a container.
///
/// The aspect ratio is preserved, the image is centered, and the drawn
/// rectangle never exceeds the container on either axis. Degenerate inputs
/// (zero or negative sizes) yield an empty rect.
pub fn fit_image(container_w: f32, container_h: f32, img_w: f32, img_h: f32) -> FitRect {
    if container_w <= 0.0 || container_h <= 0.0 || img_w <= 0.0 || img_h <= 0.0 {
        return FitRect::default();
    }

    let scale = (container_w / img_w).min(container_h / img_h);
    let draw_w = img_w * scale;
    let draw_h = img_h * scale;
    FitRect {
        draw_w,
        draw_h,
        offset_x: (container_w - draw_w) / 2.0,
        offset_y: (container_h - draw_h) / 2.0,
    }
}

// ============================================================================
// Percent <-> pixel conversion
// ============================================================================

/// Clamps a percentage value into the storable [0, 100] range.
pub fn clamp_percent(v: f32) -> f32 {
    v.clamp(0.0, 100.0)
}

/// Converts a percentage position (0-100 of canvas extent) to pixels.
///
/// The input percentages are clamped before conversion, so the result always
/// lies on the canvas.
pub fn percent_to_pixel(pos: Vec2, canvas_w: f32, canvas_h: f32) -> Vec2 {
    Vec2::new(
        clamp_percent(pos.x) / 100.0 * canvas_w,
        clamp_percent(pos.y) / 100.0 * canvas_h,
    )
}

/// Converts a pixel position back to percentages, clamped to [0, 100].
pub fn pixel_to_percent(px: Vec2, canvas_w: f32, canvas_h: f32) -> Vec2 {
    let to_pct = |v: f32, extent: f32| {
        if extent <= 0.0 {
            0.0
        } else {
            clamp_percent(v / extent * 100.0)
        }
    };
    Vec2::new(to_pct(px.x, canvas_w), to_pct(px.y, canvas_h))
}

// ============================================================================
// Affine transforms
// ============================================================================

/// A 2D affine transform in column-major `[a b c d e f]` layout:
/// `x' = a*x + c*y + e`, `y' = b*x + d*y + f`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Affine2 {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub e: f32,
    pub f: f32,
}

impl Affine2 {
    pub const IDENTITY: Self = Self {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    pub fn translation(tx: f32, ty: f32) -> Self {
        Self { e: tx, f: ty, ..Self::IDENTITY }
    }

    /// Rotation by `radians`. In the y-down canvas coordinate space a
    /// positive angle appears clockwise on screen.
    pub fn rotation(radians: f32) -> Self {
        let (sin, cos) = radians.sin_cos();
        Self {
            a: cos,
            b: sin,
            c: -sin,
            d: cos,
            e: 0.0,
            f: 0.0,
        }
    }

    pub fn scaling(sx: f32, sy: f32) -> Self {
        Self { a: sx, d: sy, ..Self::IDENTITY }
    }

    /// Shear: `x' = x + kx*y`, `y' = ky*x + y`.
    pub fn shear(kx: f32, ky: f32) -> Self {
        Self { c: kx, b: ky, ..Self::IDENTITY }
    }

    /// Returns the transform that applies `self` first, then `next`.
    pub fn then(self, next: Self) -> Self {
        Self {
            a: next.a * self.a + next.c * self.b,
            b: next.b * self.a + next.d * self.b,
            c: next.a * self.c + next.c * self.d,
            d: next.b * self.c + next.d * self.d,
            e: next.a * self.e + next.c * self.f + next.e,
            f: next.b * self.e + next.d * self.f + next.f,
        }
    }

    pub fn apply(&self, p: Vec2) -> Vec2 {
        Vec2::new(
            self.a * p.x + self.c * p.y + self.e,
            self.b * p.x + self.d * p.y + self.f,
        )
    }

    pub fn determinant(&self) -> f32 {
        self.a * self.d - self.b * self.c
    }

    /// Inverse transform, or `None` when degenerate (zero scale).
    pub fn inverse(&self) -> Option<Self> {
        let det = self.determinant();
        if det.abs() < f32::EPSILON {
            return None;
        }
        let inv_det = 1.0 / det;
        let a = self.d * inv_det;
        let b = -self.b * inv_det;
        let c = -self.c * inv_det;
        let d = self.a * inv_det;
        Some(Self {
            a,
            b,
            c,
            d,
            e: -(a * self.e + c * self.f),
            f: -(b * self.e + d * self.f),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: Vec2, expected: Vec2) {
        assert!(
            (actual.x - expected.x).abs() < 1e-4 && (actual.y - expected.y).abs() < 1e-4,
            "expected {expected:?}, got {actual:?}"
        );
    }

    #[test]
    fn letterboxes_wide_image_in_square_container() {
        let fit = fit_image(800.0, 800.0, 1920.0, 1080.0);
        assert_eq!(fit.draw_w, 800.0);
        assert_eq!(fit.draw_h, 450.0);
        assert_eq!(fit.offset_x, 0.0);
        assert_eq!(fit.offset_y, 175.0);
    }

    #[test]
    fn pillarboxes_tall_image() {
        let fit = fit_image(800.0, 400.0, 500.0, 1000.0);
        assert_eq!(fit.draw_w, 200.0);
        assert_eq!(fit.draw_h, 400.0);
        assert_eq!(fit.offset_x, 300.0);
        assert_eq!(fit.offset_y, 0.0);
    }

    #[test]
    fn identical_aspect_fills_container() {
        let fit = fit_image(400.0, 300.0, 800.0, 600.0);
        assert_eq!(fit.draw_w, 400.0);
        assert_eq!(fit.draw_h, 300.0);
        assert_eq!(fit.offset_x, 0.0);
        assert_eq!(fit.offset_y, 0.0);
    }

    #[test]
    fn degenerate_inputs_yield_empty_rect() {
        assert_eq!(fit_image(0.0, 800.0, 100.0, 100.0), FitRect::default());
        assert_eq!(fit_image(800.0, 800.0, 0.0, 100.0), FitRect::default());
    }

    #[test]
    fn percent_round_trip() {
        let px = percent_to_pixel(Vec2::new(25.0, 75.0), 400.0, 200.0);
        assert_close(px, Vec2::new(100.0, 150.0));
        let pct = pixel_to_percent(px, 400.0, 200.0);
        assert_close(pct, Vec2::new(25.0, 75.0));
    }

    #[test]
    fn conversions_clamp() {
        let px = percent_to_pixel(Vec2::new(150.0, -20.0), 100.0, 100.0);
        assert_close(px, Vec2::new(100.0, 0.0));
        let pct = pixel_to_percent(Vec2::new(-50.0, 500.0), 100.0, 100.0);
        assert_close(pct, Vec2::new(0.0, 100.0));
    }

    #[test]
    fn affine_compose_and_apply() {
        let t = Affine2::scaling(2.0, 2.0).then(Affine2::translation(10.0, 5.0));
        assert_close(t.apply(Vec2::new(1.0, 1.0)), Vec2::new(12.0, 7.0));
    }

    #[test]
    fn rotation_quarter_turn() {
        let t = Affine2::rotation(std::f32::consts::FRAC_PI_2);
        assert_close(t.apply(Vec2::new(1.0, 0.0)), Vec2::new(0.0, 1.0));
    }

    #[test]
    fn inverse_undoes_transform() {
        let t = Affine2::shear(0.3, 0.1)
            .then(Affine2::scaling(2.0, 0.5))
            .then(Affine2::rotation(0.7))
            .then(Affine2::translation(40.0, -3.0));
        let inv = t.inverse().unwrap();
        let p = Vec2::new(13.0, 27.0);
        assert_close(inv.apply(t.apply(p)), p);
    }

    #[test]
    fn degenerate_transform_has_no_inverse() {
        assert!(Affine2::scaling(0.0, 1.0).inverse().is_none());
    }
}
