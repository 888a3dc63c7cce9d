//! Error taxonomy for the rendering engine.
//!
//! Decode and measurement failures propagate to the caller as explicit
//! errors; out-of-range style and adjustment values are clamped at the
//! scene-mutation boundary instead and never reach rendering code.

use thiserror::Error;

/// Errors surfaced by the rendering engine.
#[derive(Debug, Error)]
pub enum RenderError {
    /// A base or processed image failed to decode. Rendering never proceeds
    /// with a half-loaded image.
    #[error("failed to decode image: {0}")]
    Decode(#[source] image::ImageError),

    /// PNG serialization failed during export.
    #[error("failed to encode PNG: {0}")]
    Encode(#[source] image::ImageError),

    /// Text measurement is unavailable (e.g. no font registered). Fatal for
    /// the redraw that needed it; no partial frame is committed.
    #[error("text measurement unavailable: {0}")]
    Measurement(String),

    /// Font data could not be parsed.
    #[error("invalid font data for family {0:?}")]
    InvalidFont(String),

    /// The external background-removal service reported a failure. The scene
    /// stays renderable without the subject overlay.
    #[error("background removal failed: {0}")]
    BackgroundRemoval(String),

    /// A redraw or export was requested before any base image was loaded.
    #[error("no base image loaded")]
    NoBaseImage,

    /// The referenced layer id does not exist in the scene.
    #[error("layer {0} not found")]
    LayerNotFound(u64),

    /// The mutation exceeds the current plan's capability set.
    #[error("current plan does not allow {0}")]
    NotEntitled(&'static str),
}

pub type Result<T> = std::result::Result<T, RenderError>;
