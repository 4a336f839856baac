//! Owned font bytes shared between the shaper and the rasterizer.

use crate::error::FontError;
use std::path::Path;
use std::sync::Arc;
use swash::{CacheKey, FontRef};

/// Font bytes plus the face location swash needs to address them.
///
/// The swash `FontRef` borrows the bytes, so it is rebuilt on demand by
/// `font_ref()` instead of being stored next to the data.
#[derive(Clone)]
pub struct FontData {
    /// Raw font data bytes (TTF/OTF/TTC)
    data: Arc<Vec<u8>>,
    face_index: u32,
    offset: u32,
    key: CacheKey,
}

impl std::fmt::Debug for FontData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontData")
            .field("data_len", &self.data.len())
            .field("face_index", &self.face_index)
            .finish()
    }
}

impl FontData {
    /// Create a new FontData from bytes using face index 0.
    ///
    /// Returns `None` if the bytes are not a parsable font.
    pub fn new(data: Vec<u8>) -> Option<Self> {
        Self::new_with_index(data, 0)
    }

    /// Create a new FontData from bytes with a specific face index.
    ///
    /// The face index selects a face inside a TrueType Collection (.ttc).
    pub fn new_with_index(data: Vec<u8>, face_index: usize) -> Option<Self> {
        let (offset, key) = {
            let font_ref = FontRef::from_index(&data, face_index)?;
            (font_ref.offset, font_ref.key)
        };
        // The shaper must accept the face too.
        rustybuzz::Face::from_slice(&data, face_index as u32)?;

        Some(FontData {
            data: Arc::new(data),
            face_index: face_index as u32,
            offset,
            key,
        })
    }

    /// Read and parse a font file.
    pub fn from_path(path: &Path) -> Result<Self, FontError> {
        let bytes = std::fs::read(path).map_err(|source| FontError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::new(bytes).ok_or_else(|| FontError::InvalidFont(path.display().to_string()))
    }

    pub fn font_ref(&self) -> FontRef<'_> {
        FontRef {
            data: self.data.as_slice(),
            offset: self.offset,
            key: self.key,
        }
    }

    pub fn face(&self) -> Option<rustybuzz::Face<'_>> {
        rustybuzz::Face::from_slice(self.data.as_slice(), self.face_index)
    }

    /// Stable identity of the face, used in cache keys.
    pub fn cache_id(&self) -> u64 {
        self.key.value()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
