//! Bounded LRU cache of rasterized text runs and decoration overlays.
//!
//! The cache is generic over key and value and takes an eviction callback
//! that receives every value leaving the cache, whether pushed out by
//! capacity or dropped by `purge`.

use gridpaint_config::Rgba;
use image::RgbaImage;
use lru::LruCache;
use std::hash::Hash;
use std::num::NonZeroUsize;
use std::sync::Arc;

/// Callback invoked with each evicted entry.
pub type EvictFn<K, V> = Box<dyn FnMut(&K, V) + Send>;

pub struct GlyphCache<K: Hash + Eq, V> {
    entries: LruCache<K, V>,
    on_evict: Option<EvictFn<K, V>>,
    hits: u64,
    misses: u64,
}

impl<K: Hash + Eq, V> std::fmt::Debug for GlyphCache<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlyphCache")
            .field("len", &self.entries.len())
            .field("capacity", &self.entries.cap())
            .field("hits", &self.hits)
            .field("misses", &self.misses)
            .finish()
    }
}

impl<K: Hash + Eq, V> GlyphCache<K, V> {
    /// Create a cache holding at most `capacity` entries (at least one).
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: LruCache::new(NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN)),
            on_evict: None,
            hits: 0,
            misses: 0,
        }
    }

    pub fn with_evict_callback(mut self, on_evict: EvictFn<K, V>) -> Self {
        self.on_evict = Some(on_evict);
        self
    }

    /// Look up `key`, marking it most recently used.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        let found = self.entries.get(key);
        if found.is_some() {
            self.hits += 1;
        } else {
            self.misses += 1;
        }
        found
    }

    pub fn contains(&self, key: &K) -> bool {
        self.entries.contains(key)
    }

    /// Store `value` under `key`. A value displaced by capacity or by an
    /// existing entry for the same key goes through the eviction callback.
    pub fn insert(&mut self, key: K, value: V) {
        if let Some((old_key, old_value)) = self.entries.push(key, value) {
            self.evict(&old_key, old_value);
        }
    }

    /// Drop every entry through the eviction callback.
    pub fn purge(&mut self) {
        while let Some((key, value)) = self.entries.pop_lru() {
            self.evict(&key, value);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.entries.cap().get()
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }

    fn evict(&mut self, key: &K, value: V) {
        match self.on_evict.as_mut() {
            Some(on_evict) => on_evict(key, value),
            None => drop(value),
        }
    }
}

impl<K: Hash + Eq, V: Clone> GlyphCache<K, V> {
    /// Return the cached value for `key`, building and storing it on a miss.
    pub fn get_or_insert_with(&mut self, key: K, build: impl FnOnce() -> V) -> V {
        if let Some(value) = self.get(&key) {
            return value.clone();
        }
        let value = build();
        self.insert(key, value.clone());
        value
    }
}

impl<K: Hash + Eq, V> Drop for GlyphCache<K, V> {
    fn drop(&mut self) {
        self.purge();
    }
}

/// What a cached bitmap was rendered for.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GlyphKey {
    /// A run of text in one foreground color and style.
    Text {
        text: String,
        fg: Rgba,
        italic: bool,
        bold: bool,
        /// `f32::to_bits` of the device pixel ratio.
        dpr_bits: u32,
    },
    /// A one-cell decoration overlay in its resolved stroke color.
    Decoration {
        color: Rgba,
        underline: bool,
        undercurl: bool,
        strikethrough: bool,
        dpr_bits: u32,
    },
}

/// A transparent-background RGBA bitmap rendered at `dpr` device pixels per
/// logical pixel.
#[derive(Debug, Clone, PartialEq)]
pub struct GlyphBitmap {
    pub image: RgbaImage,
    pub dpr: f32,
}

impl GlyphBitmap {
    pub fn new(width: u32, height: u32, dpr: f32) -> Self {
        Self {
            image: RgbaImage::new(width.max(1), height.max(1)),
            dpr,
        }
    }

    pub fn byte_size(&self) -> usize {
        self.image.as_raw().len()
    }
}

pub type RenderCache = GlyphCache<GlyphKey, Arc<GlyphBitmap>>;

/// A render cache whose eviction callback logs the released bitmap.
pub fn new_render_cache(capacity: usize) -> RenderCache {
    RenderCache::new(capacity).with_evict_callback(Box::new(|key, bitmap| {
        log::trace!("Evicting {:?} ({} bytes)", key, bitmap.byte_size());
        drop(bitmap);
    }))
}
