//! Cell metrics derived from a font's vertical metrics and the spacing settings.

/// Pixel metrics of one grid cell, in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontMetrics {
    /// Advance of a single-column glyph.
    pub width: f32,
    /// Horizontal distance between cell origins (`width + letter_space`).
    pub cell_width: f32,
    /// Width reserved per character for italic runs, which overhang.
    pub italic_width: f32,
    pub ascent: f32,
    pub descent: f32,
    /// `ceil(ascent + descent)`.
    pub height: i32,
    /// Extra space between lines, may be negative.
    pub line_space: i32,
    /// Vertical distance between row origins (`height + line_space`).
    pub line_height: i32,
    /// Baseline offset from the top of a row.
    pub shift: i32,
}

impl FontMetrics {
    pub fn new(width: f32, ascent: f32, descent: f32, line_space: i32, letter_space: f32) -> Self {
        let height = (ascent + descent).ceil() as i32;
        let line_height = (height + line_space).max(1);
        Self {
            width,
            cell_width: width + letter_space,
            italic_width: width * 1.5 + letter_space,
            ascent,
            descent,
            height,
            line_space,
            line_height,
            shift: (line_space as f32 / 2.0 + ascent) as i32,
        }
    }

    /// Extra columns of pixels an italic run may paint past its cells.
    pub fn italic_overhang(&self) -> f32 {
        (self.italic_width - self.cell_width + 1.0).max(0.0)
    }

    /// Stroke weight of underline and strikethrough bars.
    pub fn decoration_weight(&self) -> i32 {
        ((self.height as f32 / 16.0).ceil() as i32).max(1)
    }

    /// Logical size of a `cols x rows` grid.
    pub fn grid_size(&self, cols: usize, rows: usize) -> (f32, f32) {
        (
            (cols as f32 * self.cell_width).ceil(),
            (rows as i32 * self.line_height) as f32,
        )
    }
}
