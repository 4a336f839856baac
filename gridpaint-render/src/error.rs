//! Typed error types for gridpaint-render.
//!
//! Grid mutation and painting never fail; these cover the surface and
//! export operations that can.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    /// A surface was requested with a zero or overflowing size.
    #[error("Invalid surface size: {width}x{height}")]
    InvalidSurfaceSize {
        width: u32,
        height: u32,
    },

    /// The rendered surface could not be written as an image file.
    #[error("Image save failed for '{path}': {source}")]
    ImageSave {
        /// Destination path.
        path: String,
        /// Underlying image error.
        #[source]
        source: image::ImageError,
    },

    /// A font needed for a window override could not be used.
    #[error("Font error: {0}")]
    Font(String),
}

impl From<gridpaint_fonts::FontError> for RenderError {
    fn from(e: gridpaint_fonts::FontError) -> Self {
        RenderError::Font(e.to_string())
    }
}
