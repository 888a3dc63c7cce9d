//! JSON snapshots of the editable scene state.
//!
//! A snapshot captures what the user authored: layers, selection, and
//! adjustments. Images are deliberately excluded; they are reattached from
//! their own storage when a snapshot is restored.

use serde::{Deserialize, Serialize};

use crate::adjustments::ImageAdjustments;
use crate::error::Result;
use crate::layer::TextLayer;
use crate::scene::SceneManager;

/// Serializable snapshot of scene state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneSnapshot {
    pub layers: Vec<TextLayer>,
    pub active_layer_index: Option<usize>,
    #[serde(default)]
    pub adjustments: ImageAdjustments,
}

impl SceneSnapshot {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

impl SceneManager {
    /// Captures the current editable state.
    pub fn export_snapshot(&self) -> SceneSnapshot {
        let scene = self.scene();
        SceneSnapshot {
            layers: scene.layers.clone(),
            active_layer_index: scene.active_layer,
            adjustments: scene.adjustments,
        }
    }

    /// Restores a snapshot, replacing layers, selection, and adjustments.
    ///
    /// Selection indices out of range are dropped rather than trusted, and
    /// the id counter advances past every restored layer so new layers never
    /// collide with restored ones.
    pub fn apply_snapshot(&mut self, snapshot: SceneSnapshot) -> Result<()> {
        let active = snapshot
            .active_layer_index
            .filter(|&i| i < snapshot.layers.len());
        let max_id = snapshot.layers.iter().map(|l| l.id).max().unwrap_or(0);
        let mut layers = snapshot.layers;
        // Snapshots come from outside; re-establish the invariants serde
        // cannot express.
        for layer in &mut layers {
            layer.effects.gradient.ensure_min_stops();
        }
        self.restore(layers, active, snapshot.adjustments.clamped(), max_id + 1);
        Ok(())
    }
}
