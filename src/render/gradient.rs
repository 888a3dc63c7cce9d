//! Gradient fill resolution for text layers.
//!
//! Linear gradients run along the configured angle across the text bounding
//! box; radial gradients are centered on the box with radius
//! `max(width, height) / 2`. Color stops are evenly distributed
//! (`stop[i] = i / (n - 1)`) and interpolated in linear RGB.

use palette::{Mix, Srgba};

use crate::color::Color;
use crate::layer::{GradientEffect, GradientKind};

/// Evenly distributed stop positions for `n` colors.
pub(crate) fn stop_positions(n: usize) -> Vec<f32> {
    match n {
        0 => Vec::new(),
        1 => vec![0.0],
        _ => (0..n).map(|i| i as f32 / (n - 1) as f32).collect(),
    }
}

/// Samples the gradient color at parameter `t` in [0, 1].
pub(crate) fn sample_stops(colors: &[Color], t: f32) -> Color {
    match colors.len() {
        0 => Color::WHITE,
        1 => colors[0],
        n => {
            let t = t.clamp(0.0, 1.0);
            let segment = t * (n - 1) as f32;
            let i = (segment.floor() as usize).min(n - 2);
            let local = segment - i as f32;
            mix(colors[i], colors[i + 1], local)
        }
    }
}

fn mix(a: Color, b: Color, t: f32) -> Color {
    let to_lin = |c: Color| {
        Srgba::new(
            c.0[0] as f32 / 255.0,
            c.0[1] as f32 / 255.0,
            c.0[2] as f32 / 255.0,
            c.0[3] as f32 / 255.0,
        )
        .into_linear()
    };
    let mixed = to_lin(a).mix(to_lin(b), t);
    let srgb: Srgba<f32> = Srgba::from_linear(mixed);
    Color([
        (srgb.red.clamp(0.0, 1.0) * 255.0).round() as u8,
        (srgb.green.clamp(0.0, 1.0) * 255.0).round() as u8,
        (srgb.blue.clamp(0.0, 1.0) * 255.0).round() as u8,
        (srgb.alpha.clamp(0.0, 1.0) * 255.0).round() as u8,
    ])
}

/// Per-pixel gradient sampler precomputed for one text bounding box.
///
/// Coordinates passed to [`color_at`](Self::color_at) are relative to the
/// box's top-left corner.
pub(crate) struct GradientSampler<'a> {
    colors: &'a [Color],
    geometry: Geometry,
}

enum Geometry {
    Linear {
        dir_x: f32,
        dir_y: f32,
        min: f32,
        span: f32,
    },
    Radial {
        center_x: f32,
        center_y: f32,
        radius: f32,
    },
}

impl<'a> GradientSampler<'a> {
    pub(crate) fn new(effect: &'a GradientEffect, box_w: f32, box_h: f32) -> Self {
        let geometry = match effect.kind {
            GradientKind::Linear => {
                let radians = effect.angle.to_radians();
                let (dir_y, dir_x) = radians.sin_cos();
                // Projection range of the box corners onto the direction.
                let projections = [
                    0.0,
                    dir_x * box_w,
                    dir_y * box_h,
                    dir_x * box_w + dir_y * box_h,
                ];
                let min = projections.iter().copied().fold(f32::INFINITY, f32::min);
                let max = projections.iter().copied().fold(f32::NEG_INFINITY, f32::max);
                Geometry::Linear {
                    dir_x,
                    dir_y,
                    min,
                    span: (max - min).max(f32::EPSILON),
                }
            }
            GradientKind::Radial => Geometry::Radial {
                center_x: box_w / 2.0,
                center_y: box_h / 2.0,
                radius: (box_w.max(box_h) / 2.0).max(f32::EPSILON),
            },
        };
        Self {
            colors: &effect.colors,
            geometry,
        }
    }

    pub(crate) fn color_at(&self, x: f32, y: f32) -> Color {
        let t = match &self.geometry {
            Geometry::Linear { dir_x, dir_y, min, span } => (dir_x * x + dir_y * y - min) / span,
            Geometry::Radial { center_x, center_y, radius } => {
                let dx = x - center_x;
                let dy = y - center_y;
                (dx * dx + dy * dy).sqrt() / radius
            }
        };
        sample_stops(self.colors, t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stops_are_evenly_distributed() {
        assert_eq!(stop_positions(2), vec![0.0, 1.0]);
        assert_eq!(stop_positions(3), vec![0.0, 0.5, 1.0]);
        let five = stop_positions(5);
        assert_eq!(five, vec![0.0, 0.25, 0.5, 0.75, 1.0]);
    }

    #[test]
    fn sample_hits_exact_stops() {
        let colors = [Color::rgb(255, 0, 0), Color::rgb(0, 255, 0), Color::rgb(0, 0, 255)];
        assert_eq!(sample_stops(&colors, 0.0), colors[0]);
        assert_eq!(sample_stops(&colors, 0.5), colors[1]);
        assert_eq!(sample_stops(&colors, 1.0), colors[2]);
    }

    #[test]
    fn sample_clamps_out_of_range() {
        let colors = [Color::BLACK, Color::WHITE];
        assert_eq!(sample_stops(&colors, -2.0), Color::BLACK);
        assert_eq!(sample_stops(&colors, 3.0), Color::WHITE);
    }

    #[test]
    fn horizontal_linear_gradient_runs_left_to_right() {
        let effect = GradientEffect {
            enabled: true,
            kind: GradientKind::Linear,
            colors: vec![Color::BLACK, Color::WHITE],
            angle: 0.0,
        };
        let sampler = GradientSampler::new(&effect, 100.0, 20.0);
        assert_eq!(sampler.color_at(0.0, 10.0), Color::BLACK);
        assert_eq!(sampler.color_at(100.0, 10.0), Color::WHITE);
        let mid = sampler.color_at(50.0, 10.0);
        assert!(mid.0[0] > 0 && mid.0[0] < 255);
    }

    #[test]
    fn rotated_linear_gradient_follows_angle() {
        let effect = GradientEffect {
            enabled: true,
            kind: GradientKind::Linear,
            colors: vec![Color::BLACK, Color::WHITE],
            angle: 90.0,
        };
        let sampler = GradientSampler::new(&effect, 100.0, 40.0);
        // At 90 degrees the gradient runs top to bottom.
        assert_eq!(sampler.color_at(50.0, 0.0), Color::BLACK);
        assert_eq!(sampler.color_at(50.0, 40.0), Color::WHITE);
    }

    #[test]
    fn radial_gradient_centered_on_box() {
        let effect = GradientEffect {
            enabled: true,
            kind: GradientKind::Radial,
            colors: vec![Color::WHITE, Color::BLACK],
            angle: 0.0,
        };
        let sampler = GradientSampler::new(&effect, 80.0, 40.0);
        assert_eq!(sampler.color_at(40.0, 20.0), Color::WHITE);
        // Edge of the radius (max(w, h) / 2 = 40) reaches the last stop.
        assert_eq!(sampler.color_at(80.0, 20.0), Color::BLACK);
    }
}
