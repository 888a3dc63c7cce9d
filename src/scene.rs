//! Scene state and the mutation/redraw cycle.
//!
//! [`Scene`] is the plain renderable state: images, layers, selection, and
//! adjustments. [`SceneManager`] owns a scene plus the typesetter and
//! entitlements, funnels every mutation through checked methods, and keeps a
//! version counter so [`redraw`](SceneManager::redraw) can coalesce: any
//! number of redraw requests against unchanged state produce (and cache) one
//! identical frame.
//!
//! A failed redraw leaves the previously rendered frame untouched.

use image::RgbaImage;

use crate::adjustments::ImageAdjustments;
use crate::error::{RenderError, Result};
use crate::layer::{DEFAULT_FONT_FAMILY, LayerPatch, TextLayer};
use crate::policy::Entitlements;
use crate::render::{RenderPass, render_frame};
use crate::typography::Typesetter;

/// Font families always available without the custom-fonts entitlement.
pub const BUILTIN_FONT_FAMILIES: &[&str] = &[
    DEFAULT_FONT_FAMILY,
    "Arial",
    "Georgia",
    "Times New Roman",
    "Courier New",
    "Verdana",
];

/// Everything [`render_frame`](crate::render::render_frame) needs to draw
/// one frame.
#[derive(Debug, Clone)]
pub struct Scene {
    pub base_image: Option<RgbaImage>,
    /// Background-removed subject cutout, drawn above the base, unfiltered.
    pub processed_image: Option<RgbaImage>,
    /// Bottom-to-top draw order.
    pub layers: Vec<TextLayer>,
    /// Index into `layers`, kept in bounds by every mutation.
    pub active_layer: Option<usize>,
    pub adjustments: ImageAdjustments,
    pub canvas_width: u32,
    pub canvas_height: u32,
}

impl Scene {
    pub fn new(canvas_width: u32, canvas_height: u32) -> Self {
        Self {
            base_image: None,
            processed_image: None,
            layers: Vec::new(),
            active_layer: None,
            adjustments: ImageAdjustments::default(),
            canvas_width: canvas_width.max(1),
            canvas_height: canvas_height.max(1),
        }
    }

    /// The currently selected layer, if any.
    pub fn active(&self) -> Option<&TextLayer> {
        self.active_layer.and_then(|i| self.layers.get(i))
    }

    pub fn layer_by_id(&self, id: u64) -> Option<&TextLayer> {
        self.layers.iter().find(|l| l.id == id)
    }
}

// ============================================================================
// SceneManager
// ============================================================================

/// Owns a [`Scene`] and drives the mutate-then-redraw cycle.
pub struct SceneManager {
    scene: Scene,
    typesetter: Box<dyn Typesetter>,
    entitlements: Entitlements,
    next_id: u64,
    /// Bumped on every visible mutation; the frame cache keys off it.
    version: u64,
    highlight_visible: bool,
    cache: Option<CachedFrame>,
}

struct CachedFrame {
    version: u64,
    highlight: bool,
    frame: RgbaImage,
}

impl SceneManager {
    pub fn new(canvas_width: u32, canvas_height: u32, typesetter: Box<dyn Typesetter>) -> Self {
        Self {
            scene: Scene::new(canvas_width, canvas_height),
            typesetter,
            entitlements: Entitlements::unrestricted(),
            next_id: 1,
            version: 0,
            highlight_visible: true,
            cache: None,
        }
    }

    pub fn with_entitlements(mut self, entitlements: Entitlements) -> Self {
        self.entitlements = entitlements;
        self
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn typesetter(&self) -> &dyn Typesetter {
        self.typesetter.as_ref()
    }

    fn touch(&mut self) {
        self.version += 1;
    }

    // ------------------------------------------------------------------------
    // Images
    // ------------------------------------------------------------------------

    /// Decodes and installs a new base image, resetting the processed
    /// overlay (it belonged to the previous image).
    pub fn load_base_image(&mut self, bytes: &[u8]) -> Result<()> {
        let img = image::load_from_memory(bytes)
            .map_err(RenderError::Decode)?
            .to_rgba8();
        self.set_base_image(img);
        Ok(())
    }

    /// Installs an already-decoded base image.
    pub fn set_base_image(&mut self, img: RgbaImage) {
        self.scene.base_image = Some(img);
        self.scene.processed_image = None;
        self.touch();
    }

    /// Accepts the outcome of an external background-removal call.
    ///
    /// On success the returned bytes are decoded into the subject overlay.
    /// On failure the overlay is simply absent: the scene stays renderable
    /// with the base image alone, and the error message is surfaced to the
    /// caller.
    pub fn apply_background_removal(
        &mut self,
        outcome: std::result::Result<Vec<u8>, String>,
    ) -> Result<()> {
        match outcome {
            Ok(bytes) => {
                let img = image::load_from_memory(&bytes)
                    .map_err(RenderError::Decode)?
                    .to_rgba8();
                self.set_processed_image(Some(img));
                Ok(())
            }
            Err(message) => {
                self.set_processed_image(None);
                Err(RenderError::BackgroundRemoval(message))
            }
        }
    }

    pub fn set_processed_image(&mut self, img: Option<RgbaImage>) {
        self.scene.processed_image = img;
        self.touch();
    }

    pub fn set_canvas_size(&mut self, width: u32, height: u32) {
        self.scene.canvas_width = width.max(1);
        self.scene.canvas_height = height.max(1);
        self.touch();
    }

    // ------------------------------------------------------------------------
    // Layers
    // ------------------------------------------------------------------------

    /// Adds a layer with factory defaults, selects it, and returns its id.
    pub fn add_layer(&mut self) -> Result<u64> {
        self.add_layer_with(&LayerPatch::default())
    }

    /// Adds a layer with an initial style patch applied at creation, so a
    /// pre-styled layer costs a single mutation. The patch is
    /// entitlement-checked like any update; on rejection no layer is added.
    pub fn add_layer_with(&mut self, patch: &LayerPatch) -> Result<u64> {
        if self.scene.layers.len() >= self.entitlements.max_layers {
            return Err(RenderError::NotEntitled("layer limit reached"));
        }
        self.check_patch(patch)?;
        let id = self.next_id;
        self.next_id += 1;
        let mut layer = TextLayer::new(id);
        layer.apply_patch(patch);
        self.scene.layers.push(layer);
        self.scene.active_layer = Some(self.scene.layers.len() - 1);
        self.touch();
        Ok(id)
    }

    fn check_patch(&self, patch: &LayerPatch) -> Result<()> {
        if patch.enables_gradient() && !self.entitlements.gradient_effects {
            return Err(RenderError::NotEntitled("gradient effects"));
        }
        if let Some(family) = &patch.font_family {
            if !self.entitlements.custom_fonts
                && !BUILTIN_FONT_FAMILIES.contains(&family.as_str())
            {
                return Err(RenderError::NotEntitled("custom fonts"));
            }
        }
        Ok(())
    }

    /// Applies a partial update to the layer with the given id.
    pub fn update_layer(&mut self, id: u64, patch: &LayerPatch) -> Result<()> {
        self.check_patch(patch)?;

        let layer = self
            .scene
            .layers
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or(RenderError::LayerNotFound(id))?;
        layer.apply_patch(patch);
        self.touch();
        Ok(())
    }

    /// Removes a layer. Deleting the selected layer moves the selection to
    /// the nearest remaining neighbor (or clears it when none remain);
    /// deleting a layer below it shifts the selection index down so it keeps
    /// pointing at the same layer.
    pub fn delete_layer(&mut self, id: u64) -> Result<()> {
        let index = self
            .scene
            .layers
            .iter()
            .position(|l| l.id == id)
            .ok_or(RenderError::LayerNotFound(id))?;
        self.scene.layers.remove(index);
        let remaining = self.scene.layers.len();
        self.scene.active_layer = match self.scene.active_layer {
            Some(active) if active == index => {
                if remaining == 0 {
                    None
                } else {
                    Some(index.min(remaining - 1))
                }
            }
            Some(active) if active > index => Some(active - 1),
            other => other,
        };
        self.touch();
        Ok(())
    }

    /// Selects a layer by id, or clears the selection with `None`.
    pub fn select_layer(&mut self, id: Option<u64>) -> Result<()> {
        let index = match id {
            None => None,
            Some(id) => Some(
                self.scene
                    .layers
                    .iter()
                    .position(|l| l.id == id)
                    .ok_or(RenderError::LayerNotFound(id))?,
            ),
        };
        if self.scene.active_layer != index {
            self.scene.active_layer = index;
            self.touch();
        }
        Ok(())
    }

    /// Replaces layers, selection, and adjustments wholesale; snapshot
    /// restore funnels through here so the cache and id counter stay
    /// consistent.
    pub(crate) fn restore(
        &mut self,
        layers: Vec<TextLayer>,
        active: Option<usize>,
        adjustments: ImageAdjustments,
        next_id: u64,
    ) {
        self.scene.layers = layers;
        self.scene.active_layer = active;
        self.scene.adjustments = adjustments;
        self.next_id = self.next_id.max(next_id);
        self.touch();
    }

    // ------------------------------------------------------------------------
    // Adjustments & highlight
    // ------------------------------------------------------------------------

    /// Replaces the global adjustments wholesale, clamped.
    pub fn set_adjustments(&mut self, adjustments: ImageAdjustments) {
        self.scene.adjustments = adjustments.clamped();
        self.touch();
    }

    /// Shows or hides the selection highlight. The fade-out timing of the
    /// highlight is the caller's concern; the renderer only honors the flag.
    pub fn set_highlight_visible(&mut self, visible: bool) {
        self.highlight_visible = visible;
    }

    // ------------------------------------------------------------------------
    // Rendering
    // ------------------------------------------------------------------------

    /// Renders the interactive frame, reusing the cached one when nothing
    /// has changed since the last successful redraw.
    ///
    /// On failure the cached frame (if any) is preserved and remains
    /// available via [`last_frame`](Self::last_frame).
    pub fn redraw(&mut self) -> Result<&RgbaImage> {
        let cache = match self.cache.take() {
            Some(c) if c.version == self.version && c.highlight == self.highlight_visible => c,
            stale => {
                let frame = match render_frame(
                    &self.scene,
                    self.typesetter.as_ref(),
                    RenderPass::Interactive,
                    self.highlight_visible,
                ) {
                    Ok(frame) => frame,
                    Err(err) => {
                        // Keep the last good frame around.
                        self.cache = stale;
                        return Err(err);
                    }
                };
                CachedFrame {
                    version: self.version,
                    highlight: self.highlight_visible,
                    frame,
                }
            }
        };
        Ok(&self.cache.insert(cache).frame)
    }

    /// The most recently rendered interactive frame, if any.
    pub fn last_frame(&self) -> Option<&RgbaImage> {
        self.cache.as_ref().map(|c| &c.frame)
    }

    /// Renders an uncached frame for the given pass.
    pub fn render(&self, pass: RenderPass) -> Result<RgbaImage> {
        render_frame(
            &self.scene,
            self.typesetter.as_ref(),
            pass,
            self.highlight_visible,
        )
    }
}
