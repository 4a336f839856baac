//! HarfBuzz-based text shaping with an LRU cache of shaped runs.
//!
//! Shaping the same word repeatedly is common while a grid redraws, so
//! results are cached per (text, face, size, options).

use crate::font_data::FontData;
use lru::LruCache;
use parking_lot::Mutex;
use rustybuzz::ttf_parser::Tag;
use rustybuzz::{Feature, UnicodeBuffer};
use std::num::NonZeroUsize;
use std::sync::Arc;

const DEFAULT_CACHE_CAPACITY: usize = 1024;

/// Options that change shaping output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShapingOptions {
    /// Apply standard, contextual and discretionary-free ligatures
    pub ligatures: bool,
    /// Apply pair kerning
    pub kerning: bool,
}

impl Default for ShapingOptions {
    fn default() -> Self {
        Self {
            ligatures: true,
            kerning: true,
        }
    }
}

/// One positioned glyph, in pixels at the requested size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapedGlyph {
    pub glyph_id: u16,
    /// Byte offset of the cluster this glyph belongs to
    pub cluster: u32,
    pub x_advance: f32,
    pub x_offset: f32,
    pub y_offset: f32,
}

/// A shaped run and its total advance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShapedRun {
    pub glyphs: Vec<ShapedGlyph>,
    pub advance: f32,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ShapeKey {
    text: String,
    face: u64,
    size_bits: u32,
    options: ShapingOptions,
}

pub struct TextShaper {
    cache: Mutex<LruCache<ShapeKey, Arc<ShapedRun>>>,
}

impl Default for TextShaper {
    fn default() -> Self {
        Self::new()
    }
}

impl TextShaper {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CACHE_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Shape `text` with `font` at `size_px` pixels per em.
    pub fn shape(
        &self,
        text: &str,
        font: &FontData,
        size_px: f32,
        options: ShapingOptions,
    ) -> Arc<ShapedRun> {
        if text.is_empty() {
            return Arc::new(ShapedRun::default());
        }

        let key = ShapeKey {
            text: text.to_string(),
            face: font.cache_id(),
            size_bits: size_px.to_bits(),
            options,
        };
        if let Some(run) = self.cache.lock().get(&key) {
            return Arc::clone(run);
        }

        let run = Arc::new(Self::shape_uncached(text, font, size_px, options));
        self.cache.lock().put(key, Arc::clone(&run));
        run
    }

    pub fn cached_runs(&self) -> usize {
        self.cache.lock().len()
    }

    pub fn clear_cache(&self) {
        self.cache.lock().clear();
    }

    fn shape_uncached(text: &str, font: &FontData, size_px: f32, options: ShapingOptions) -> ShapedRun {
        let Some(face) = font.face() else {
            log::warn!("Font face could not be reopened for shaping");
            return ShapedRun::default();
        };

        let mut buffer = UnicodeBuffer::new();
        buffer.push_str(text);
        buffer.guess_segment_properties();

        let mut features = Vec::new();
        if !options.ligatures {
            for tag in [b"liga", b"clig", b"calt"] {
                features.push(Feature::new(Tag::from_bytes(tag), 0, ..));
            }
        }
        if !options.kerning {
            features.push(Feature::new(Tag::from_bytes(b"kern"), 0, ..));
        }

        let output = rustybuzz::shape(&face, &features, buffer);
        let scale = size_px / face.units_per_em() as f32;

        let mut run = ShapedRun::default();
        for (info, pos) in output.glyph_infos().iter().zip(output.glyph_positions()) {
            let glyph = ShapedGlyph {
                glyph_id: info.glyph_id as u16,
                cluster: info.cluster,
                x_advance: pos.x_advance as f32 * scale,
                x_offset: pos.x_offset as f32 * scale,
                y_offset: pos.y_offset as f32 * scale,
            };
            run.advance += glyph.x_advance;
            run.glyphs.push(glyph);
        }
        run
    }
}
