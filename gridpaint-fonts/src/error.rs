//! Typed error types for gridpaint-fonts.

use thiserror::Error;

/// Errors raised while loading a font for rasterization.
#[derive(Debug, Error)]
pub enum FontError {
    /// The font file could not be read from disk.
    #[error("Font file read failed for '{path}': {source}")]
    Read {
        /// Path to the font file.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The bytes are not a font swash and rustybuzz can parse.
    #[error("Invalid font data: {0}")]
    InvalidFont(String),

    /// The font has no glyph to measure cell width with.
    #[error("Font '{0}' has no glyph for the cell reference character")]
    MissingReferenceGlyph(String),
}
