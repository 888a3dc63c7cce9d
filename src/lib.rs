//! subtext-renderer: Text-behind-subject image compositing library
//!
//! This crate composites styled text layers between a photograph and its
//! background-removed subject cutout. A [`SceneManager`] owns the scene
//! state, enforces plan entitlements at every mutation, and renders frames
//! deterministically: black fill, the adjusted base image, the unfiltered
//! subject overlay, then every text layer bottom to top.
//!
//! # Example
//!
//! ```
//! use subtext_renderer::{
//!     BlockTypesetter, Color, LayerPatch, SceneManager, export_png,
//! };
//! use subtext_renderer::image::{Rgba, RgbaImage};
//!
//! let mut manager = SceneManager::new(800, 800, Box::new(BlockTypesetter));
//! manager.set_base_image(RgbaImage::from_pixel(800, 800, Rgba([20, 30, 40, 255])));
//!
//! // Add a layer and restyle it through a partial patch.
//! let id = manager.add_layer().unwrap();
//! let mut patch = LayerPatch::default();
//! patch.text = Some("POSTER".into());
//! patch.color = Some(Color::rgb(255, 200, 0));
//! manager.update_layer(id, &patch).unwrap();
//!
//! // Redraws against unchanged state reuse one cached frame.
//! let frame = manager.redraw().unwrap().clone();
//! assert_eq!(*manager.redraw().unwrap(), frame);
//!
//! // Export never includes the selection highlight.
//! let png = export_png(&manager).unwrap();
//! assert_eq!(png.filename, "text-behind-image.png");
//! ```
//!
//! # Snapshots
//!
//! Scene state (layers, selection, adjustments) serializes to JSON and
//! restores into any manager; images are reattached separately:
//!
//! ```
//! use subtext_renderer::{BlockTypesetter, SceneManager, SceneSnapshot};
//!
//! let mut manager = SceneManager::new(400, 400, Box::new(BlockTypesetter));
//! manager.add_layer().unwrap();
//!
//! let json = manager.export_snapshot().to_json().unwrap();
//! let restored = SceneSnapshot::from_json(&json).unwrap();
//!
//! let mut other = SceneManager::new(400, 400, Box::new(BlockTypesetter));
//! other.apply_snapshot(restored).unwrap();
//! assert_eq!(other.scene().layers, manager.scene().layers);
//! ```

mod adjustments;
mod color;
mod error;
mod export;
mod geometry;
mod layer;
mod pointer;
mod policy;
mod render;
mod scene;
mod snapshot;
mod typography;

pub use adjustments::{FilterFlags, ImageAdjustments, apply_adjustments};
pub use color::Color;
pub use error::{RenderError, Result};
pub use export::{EXPORT_FILENAME, ExportedPng, export_png};
pub use geometry::{Affine2, FitRect, Vec2, fit_image, percent_to_pixel, pixel_to_percent};
pub use layer::{
    DEFAULT_FONT_FAMILY, EffectsPatch, GlowEffect, GlowPatch, GradientEffect, GradientKind,
    GradientPatch, LayerEffects, LayerPatch, LayerTransform, ShadowEffect, ShadowPatch,
    StrokePatch, StrokeStyle, StylePatch, TextLayer, TransformPatch,
};
pub use pointer::{DragController, display_to_canvas, hit_test};
pub use policy::{Entitlements, Plan};
pub use render::{RenderPass, render_frame};
pub use scene::{BUILTIN_FONT_FAMILIES, Scene, SceneManager};
pub use snapshot::SceneSnapshot;
pub use typography::{
    BlockTypesetter, FontStyle, GlyphTypesetter, TextMetrics, Typesetter, font_shorthand,
};

// Frames are image buffers; callers need the same `image` the crate builds
// against.
pub use image;
