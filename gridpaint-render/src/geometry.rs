//! Rectangles in cell, logical-pixel and device-pixel space.

use gridpaint_fonts::FontMetrics;

/// A rectangle measured in grid cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CellRect {
    pub col: usize,
    pub row: usize,
    pub cols: usize,
    pub rows: usize,
}

impl CellRect {
    pub const fn new(col: usize, row: usize, cols: usize, rows: usize) -> Self {
        Self { col, row, cols, rows }
    }

    pub fn is_empty(&self) -> bool {
        self.cols == 0 || self.rows == 0
    }

    pub fn contains(&self, col: usize, row: usize) -> bool {
        col >= self.col && col < self.col + self.cols && row >= self.row && row < self.row + self.rows
    }

    /// Logical pixel rectangle covering these cells.
    ///
    /// The left edge is pulled in by one pixel and the width extended by the
    /// italic overhang so slanted glyphs and antialiasing leave no debris.
    pub fn to_pixels(&self, metrics: &FontMetrics) -> PixelRect {
        let lh = metrics.line_height;
        let overhang = metrics.italic_overhang() as i32;
        let x = ((self.col as f32 * metrics.cell_width) as i32 - 1).max(0);
        PixelRect {
            x,
            y: self.row as i32 * lh,
            width: (self.cols as f32 * metrics.cell_width).ceil() as i32 + overhang,
            height: self.rows as i32 * lh,
        }
    }
}

/// An integer rectangle in logical pixels, as handed to `Presenter::invalidate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PixelRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl PixelRect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    pub fn union(&self, other: &PixelRect) -> PixelRect {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        PixelRect::new(x, y, self.right().max(other.right()) - x, self.bottom().max(other.bottom()) - y)
    }

    pub fn intersect(&self, other: &PixelRect) -> Option<PixelRect> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let r = self.right().min(other.right());
        let b = self.bottom().min(other.bottom());
        (r > x && b > y).then(|| PixelRect::new(x, y, r - x, b - y))
    }

    pub fn to_f(&self) -> RectF {
        RectF::new(self.x as f32, self.y as f32, self.width as f32, self.height as f32)
    }

    /// Cell rows and columns touched by this rectangle: `(col, row, cols, rows)`.
    pub fn cell_span(&self, metrics: &FontMetrics) -> CellRect {
        let cw = metrics.cell_width.max(1.0);
        let lh = metrics.line_height.max(1) as f32;
        let col = (self.x.max(0) as f32 / cw) as usize;
        let row = (self.y.max(0) as f32 / lh) as usize;
        let end_col = (self.right().max(0) as f32 / cw).ceil() as usize;
        let end_row = (self.bottom().max(0) as f32 / lh).ceil() as usize;
        CellRect {
            col,
            row,
            cols: end_col.saturating_sub(col),
            rows: end_row.saturating_sub(row),
        }
    }
}

/// A fractional rectangle in logical pixels, used for drawing.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RectF {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl RectF {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }
}
