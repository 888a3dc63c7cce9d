//! PNG export of the composited scene.
//!
//! Export renders a fresh frame in the export pass, so interaction-only
//! overlays (the selection highlight) never reach the saved file, whatever
//! the editor state at the moment of export.

use std::io::Cursor;

use image::ImageFormat;

use crate::error::{RenderError, Result};
use crate::render::RenderPass;
use crate::scene::SceneManager;

/// Fixed download filename for exported frames.
pub const EXPORT_FILENAME: &str = "text-behind-image.png";

/// An encoded export, ready to hand to a download or filesystem sink.
#[derive(Debug, Clone)]
pub struct ExportedPng {
    pub bytes: Vec<u8>,
    pub filename: &'static str,
}

/// Renders the scene at full canvas resolution and encodes it as PNG.
pub fn export_png(mgr: &SceneManager) -> Result<ExportedPng> {
    let frame = mgr.render(RenderPass::Export)?;
    let mut bytes = Vec::new();
    frame
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .map_err(RenderError::Encode)?;
    Ok(ExportedPng {
        bytes,
        filename: EXPORT_FILENAME,
    })
}
