//! Font metrics, text shaping and glyph rasterization for gridpaint.
//!
//! This crate provides:
//! - Cell metrics derived from font ascent/descent and spacing settings
//! - Width classification of cell text (single column vs. wide glyphs)
//! - HarfBuzz-based text shaping via rustybuzz with an LRU shaping cache
//! - The `Rasterizer` trait the renderer draws through, with a swash-backed
//!   implementation for real fonts and a block implementation used when no
//!   font file is available
//!
//! # Architecture
//!
//! The renderer only ever sees `dyn Rasterizer`: it asks for metrics, for
//! the advance of a string and for coverage masks of a styled run. Masks are
//! positioned relative to the run origin on the baseline, in device pixels.

pub mod block_rasterizer;
pub mod error;
pub mod font_data;
pub mod metrics;
pub mod rasterizer;
pub mod swash_rasterizer;
pub mod text_shaper;
pub mod width;

// Re-export main types for convenience
pub use block_rasterizer::BlockRasterizer;
pub use error::FontError;
pub use font_data::FontData;
pub use metrics::FontMetrics;
pub use rasterizer::{GlyphMask, GlyphStyle, Rasterizer};
pub use swash_rasterizer::SwashRasterizer;
pub use text_shaper::{ShapedGlyph, ShapedRun, ShapingOptions, TextShaper};
pub use width::{is_cjk, is_normal_width};
