//! Width classification of cell text.
//!
//! A cell is "normal width" when its glyph fits one column. Wide glyphs are
//! drawn individually after the grouped runs of a row.

use unicode_segmentation::UnicodeSegmentation;

/// Han, kana and hangul code points, always drawn as wide glyphs.
pub fn is_cjk(c: char) -> bool {
    matches!(c as u32,
        0x1100..=0x11FF          // Hangul Jamo
        | 0x2E80..=0x2FDF        // CJK radicals, Kangxi radicals
        | 0x3005..=0x3007
        | 0x3021..=0x3029
        | 0x3038..=0x303B
        | 0x3040..=0x309F        // Hiragana
        | 0x30A0..=0x30FF        // Katakana
        | 0x3130..=0x318F        // Hangul compatibility Jamo
        | 0x31F0..=0x31FF        // Katakana phonetic extensions
        | 0x3400..=0x4DBF        // CJK extension A
        | 0x4E00..=0x9FFF        // CJK unified ideographs
        | 0xA960..=0xA97F
        | 0xAC00..=0xD7AF        // Hangul syllables
        | 0xD7B0..=0xD7FF
        | 0xF900..=0xFAFF        // CJK compatibility ideographs
        | 0xFF66..=0xFF9F        // Halfwidth katakana
        | 0xFFA0..=0xFFDC        // Halfwidth hangul
        | 0x20000..=0x2FA1F      // CJK extensions B..F, compatibility supplement
    )
}

/// Decide whether `text` occupies a single cell.
///
/// ASCII is always normal width and CJK never is. Anything else is measured
/// with `measure` and compared against the cell width.
pub fn is_normal_width(text: &str, cell_width: f32, measure: impl FnOnce(&str) -> f32) -> bool {
    let Some(first) = text.chars().next() else {
        return true;
    };
    if first.is_ascii() {
        return true;
    }
    if is_cjk(first) {
        return false;
    }
    (measure(text) - cell_width).abs() < 0.5
}

/// Number of user-perceived characters in `text`.
pub fn grapheme_count(text: &str) -> usize {
    text.graphemes(true).count()
}
