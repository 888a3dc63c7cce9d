//! Pointer interaction: hit-testing and layer dragging.
//!
//! Hit-testing reuses the exact layout (measured box plus affine transform)
//! the renderer draws with, so a layer is grabbable precisely where it is
//! visible, padded by [`HIT_PADDING`](crate::render::text_pass::HIT_PADDING)
//! pixels on every side.
//!
//! Dragging is delta-based: each move applies the pointer delta to the
//! layer's current position rather than teleporting the anchor under the
//! cursor, so the grab point stays fixed relative to the text.

use crate::error::Result;
use crate::geometry::Vec2;
use crate::layer::LayerPatch;
use crate::render::text_pass::{self, HIT_PADDING};
use crate::scene::{Scene, SceneManager};
use crate::typography::Typesetter;

/// Maps a pointer position on the displayed surface to canvas pixels.
///
/// The interactive surface may be shown at a different resolution than the
/// backing canvas; hit-testing always happens in canvas space.
pub fn display_to_canvas(
    display: Vec2,
    display_w: f32,
    display_h: f32,
    canvas_w: f32,
    canvas_h: f32,
) -> Vec2 {
    if display_w <= 0.0 || display_h <= 0.0 {
        return Vec2::default();
    }
    Vec2::new(
        display.x * canvas_w / display_w,
        display.y * canvas_h / display_h,
    )
}

/// Returns the topmost layer under a canvas-space point, if any.
///
/// Layers later in the scene draw above earlier ones, so the search runs
/// top-down. Layers with no visible text are transparent to hits.
pub fn hit_test(scene: &Scene, typesetter: &dyn Typesetter, point: Vec2) -> Result<Option<u64>> {
    let canvas_w = scene.canvas_width as f32;
    let canvas_h = scene.canvas_height as f32;
    for layer in scene.layers.iter().rev() {
        let Some(layout) = text_pass::layout_layer(layer, typesetter, canvas_w, canvas_h)? else {
            continue;
        };
        if layout.contains(point, HIT_PADDING) {
            return Ok(Some(layer.id));
        }
    }
    Ok(None)
}

/// Drives a press-drag-release interaction against a [`SceneManager`].
#[derive(Debug, Default)]
pub struct DragController {
    captured: Option<u64>,
    last: Vec2,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    /// The layer currently being dragged, if any.
    pub fn captured(&self) -> Option<u64> {
        self.captured
    }

    /// Handles a pointer press. Hits select and capture the layer; misses
    /// clear the selection. Returns the captured layer id.
    ///
    /// A press arriving while a capture is already in flight (a second
    /// pointer, or an event raced past the release) is ignored: the capture
    /// only ends at [`pointer_up`](Self::pointer_up).
    pub fn pointer_down(&mut self, mgr: &mut SceneManager, point: Vec2) -> Result<Option<u64>> {
        if self.captured.is_some() {
            return Ok(self.captured);
        }
        let hit = hit_test(mgr.scene(), mgr.typesetter(), point)?;
        mgr.select_layer(hit)?;
        self.captured = hit;
        self.last = point;
        Ok(hit)
    }

    /// Handles pointer movement. Only moves the captured layer; crossing
    /// over other layers mid-drag never switches the target.
    pub fn pointer_move(&mut self, mgr: &mut SceneManager, point: Vec2) -> Result<()> {
        let Some(id) = self.captured else {
            return Ok(());
        };
        let scene = mgr.scene();
        let canvas_w = scene.canvas_width as f32;
        let canvas_h = scene.canvas_height as f32;
        let Some(layer) = scene.layer_by_id(id) else {
            // Layer deleted mid-drag; drop the capture.
            self.captured = None;
            return Ok(());
        };

        let dx_pct = (point.x - self.last.x) / canvas_w * 100.0;
        let dy_pct = (point.y - self.last.y) / canvas_h * 100.0;
        let target = LayerPatch::position(layer.position.x + dx_pct, layer.position.y + dy_pct);
        self.last = point;
        mgr.update_layer(id, &target)
    }

    /// Handles pointer release, ending the drag.
    pub fn pointer_up(&mut self) {
        self.captured = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::typography::BlockTypesetter;
    use image::RgbaImage;

    fn manager() -> SceneManager {
        let mut mgr = SceneManager::new(200, 200, Box::new(BlockTypesetter));
        mgr.set_base_image(RgbaImage::new(200, 200));
        mgr
    }

    #[test]
    fn display_coordinates_scale_to_canvas() {
        let p = display_to_canvas(Vec2::new(50.0, 25.0), 100.0, 100.0, 400.0, 200.0);
        assert_eq!(p, Vec2::new(200.0, 50.0));
    }

    #[test]
    fn hit_test_finds_layer_at_its_anchor() {
        let mut mgr = manager();
        let id = mgr.add_layer().unwrap();
        let hit = hit_test(mgr.scene(), mgr.typesetter(), Vec2::new(100.0, 100.0)).unwrap();
        assert_eq!(hit, Some(id));

        let miss = hit_test(mgr.scene(), mgr.typesetter(), Vec2::new(5.0, 5.0)).unwrap();
        assert_eq!(miss, None);
    }

    #[test]
    fn hit_test_prefers_the_topmost_layer() {
        let mut mgr = manager();
        let _below = mgr.add_layer().unwrap();
        let above = mgr.add_layer().unwrap();
        // Both sit at the default center position.
        let hit = hit_test(mgr.scene(), mgr.typesetter(), Vec2::new(100.0, 100.0)).unwrap();
        assert_eq!(hit, Some(above));
    }

    #[test]
    fn empty_text_is_transparent_to_hits() {
        let mut mgr = manager();
        let id = mgr.add_layer().unwrap();
        let mut patch = LayerPatch::default();
        patch.text = Some(String::new());
        mgr.update_layer(id, &patch).unwrap();

        let hit = hit_test(mgr.scene(), mgr.typesetter(), Vec2::new(100.0, 100.0)).unwrap();
        assert_eq!(hit, None);
    }

    #[test]
    fn press_selects_and_miss_deselects() {
        let mut mgr = manager();
        let id = mgr.add_layer().unwrap();
        let mut drag = DragController::new();

        let hit = drag.pointer_down(&mut mgr, Vec2::new(100.0, 100.0)).unwrap();
        assert_eq!(hit, Some(id));
        assert_eq!(mgr.scene().active().map(|l| l.id), Some(id));

        drag.pointer_up();
        let miss = drag.pointer_down(&mut mgr, Vec2::new(3.0, 3.0)).unwrap();
        assert_eq!(miss, None);
        assert_eq!(mgr.scene().active_layer, None);
    }

    #[test]
    fn drag_moves_by_pointer_delta() {
        let mut mgr = manager();
        let id = mgr.add_layer().unwrap();
        let mut drag = DragController::new();

        // Grab off-center; the layer moves by the delta, not to the cursor.
        drag.pointer_down(&mut mgr, Vec2::new(110.0, 100.0)).unwrap();
        drag.pointer_move(&mut mgr, Vec2::new(130.0, 120.0)).unwrap();
        drag.pointer_up();

        let layer = mgr.scene().layer_by_id(id).unwrap();
        assert_eq!(layer.position, Vec2::new(60.0, 60.0));
    }

    #[test]
    fn drag_position_is_clamped_to_the_canvas() {
        let mut mgr = manager();
        let id = mgr.add_layer().unwrap();
        let mut drag = DragController::new();

        drag.pointer_down(&mut mgr, Vec2::new(100.0, 100.0)).unwrap();
        drag.pointer_move(&mut mgr, Vec2::new(1000.0, -500.0)).unwrap();

        let layer = mgr.scene().layer_by_id(id).unwrap();
        assert_eq!(layer.position, Vec2::new(100.0, 0.0));
    }

    #[test]
    fn capture_survives_crossing_other_layers() {
        let mut mgr = manager();
        let below = mgr.add_layer().unwrap();
        let above = mgr.add_layer().unwrap();
        // Move the top layer away so the press lands on the lower one.
        mgr.update_layer(above, &LayerPatch::position(10.0, 10.0)).unwrap();

        let mut drag = DragController::new();
        drag.pointer_down(&mut mgr, Vec2::new(100.0, 100.0)).unwrap();
        assert_eq!(drag.captured(), Some(below));

        // Dragging across the other layer's box keeps the original capture.
        drag.pointer_move(&mut mgr, Vec2::new(20.0, 20.0)).unwrap();
        assert_eq!(drag.captured(), Some(below));
        let moved = mgr.scene().layer_by_id(below).unwrap();
        assert!(moved.position.x < 50.0);
    }

    #[test]
    fn press_during_drag_does_not_switch_targets() {
        let mut mgr = manager();
        let a = mgr.add_layer().unwrap();
        let b = mgr.add_layer().unwrap();
        mgr.update_layer(b, &LayerPatch::position(20.0, 20.0)).unwrap();

        let mut drag = DragController::new();
        drag.pointer_down(&mut mgr, Vec2::new(100.0, 100.0)).unwrap();
        assert_eq!(drag.captured(), Some(a));

        // A second press over the other layer mid-drag is ignored.
        let held = drag.pointer_down(&mut mgr, Vec2::new(40.0, 40.0)).unwrap();
        assert_eq!(held, Some(a));
        assert_eq!(drag.captured(), Some(a));
        assert_eq!(mgr.scene().active().map(|l| l.id), Some(a));

        // After release the same press captures normally.
        drag.pointer_up();
        let next = drag.pointer_down(&mut mgr, Vec2::new(40.0, 40.0)).unwrap();
        assert_eq!(next, Some(b));
    }

    #[test]
    fn deleting_the_dragged_layer_drops_the_capture() {
        let mut mgr = manager();
        let id = mgr.add_layer().unwrap();
        let mut drag = DragController::new();
        drag.pointer_down(&mut mgr, Vec2::new(100.0, 100.0)).unwrap();

        mgr.delete_layer(id).unwrap();
        drag.pointer_move(&mut mgr, Vec2::new(120.0, 120.0)).unwrap();
        assert_eq!(drag.captured(), None);
    }
}
