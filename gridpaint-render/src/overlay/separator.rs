//! Window separators drawn on the base grid.
//!
//! The base grid paints a vertical divider at the right edge and a
//! horizontal divider at the bottom edge of every tiled window. Heights are
//! adjusted for the tabline and for windows touching the command line, so a
//! divider never runs into the outer frame.

use crate::canvas::{GradientAxis, PixelCanvas};
use crate::geometry::RectF;
use gridpaint_config::{FillPattern, Rgba};
use gridpaint_fonts::FontMetrics;

/// Position and size of a tiled window in base grid cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowBounds {
    pub col: usize,
    pub row: usize,
    pub cols: usize,
    pub rows: usize,
}

/// Screen-wide values every separator depends on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeparatorLayout {
    /// Rows of the base grid.
    pub base_rows: usize,
    /// Height of the base grid surface in pixels.
    pub screen_height: f32,
    pub showtabline: i32,
    pub tab_count: usize,
    /// The tabline is drawn externally (outside the grid).
    pub external_tabline: bool,
    /// Lowest bottom edge, in pixels, of any non-base window.
    pub bottom_window_pos: i32,
    pub gradient: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SeparatorShape {
    Line(RectF),
    Gradient(RectF, GradientAxis),
}

fn tabline_rows(layout: &SeparatorLayout) -> i32 {
    if layout.showtabline == 2 && layout.external_tabline && layout.tab_count == 1 {
        -1
    } else if layout.tab_count > 1 {
        1
    } else {
        0
    }
}

/// Compute the divider rectangles for one window.
pub fn separator_shapes(win: &WindowBounds, layout: &SeparatorLayout, metrics: &FontMetrics) -> Vec<SeparatorShape> {
    let lh = metrics.line_height;
    let cw = metrics.cell_width;
    let rows = win.rows as i32;
    let pos_row = win.row as i32;
    let base_rows = layout.base_rows as i32;

    let x = (win.col as f32 * cw) as i32;
    let y = pos_row * lh;
    let width = (win.cols as f32 * cw) as i32;
    let mut win_height = ((rows as f32 + 0.92) * lh as f32) as i32;
    let mut shift = lh / 2;

    let tabline = tabline_rows(layout);
    if rows + layout.showtabline + tabline + 1 == base_rows {
        win_height = rows * lh;
        shift = 0;
    } else {
        if pos_row == tabline {
            win_height = rows * lh + lh / 2;
            shift = 0;
        }
        if pos_row + rows == base_rows - 2 {
            win_height = rows * lh + lh / 2;
        }
    }

    let mut shapes = Vec::new();
    let vx = (x + width) as f32 + cw / 2.0;
    if ((y + lh + 1) as f32) < layout.screen_height {
        shapes.push(SeparatorShape::Line(RectF::new(
            vx.trunc(),
            (y - shift) as f32,
            2.0,
            win_height as f32,
        )));
    }
    if layout.gradient {
        shapes.push(SeparatorShape::Gradient(
            RectF::new(vx.trunc() - 6.0, (y - shift) as f32, 6.0, win_height as f32),
            GradientAxis::FromRight,
        ));
    }

    let bottom_border = y + rows * lh - 1;
    let bottom = layout.bottom_window_pos;
    if bottom_border > bottom - lh && bottom_border < bottom + lh {
        return shapes;
    }

    let y2 = y + rows * lh - 1 + lh / 2;
    let hx = (x as f32 - cw / 2.0).trunc();
    let hwidth = ((win.cols as f32 + 0.92) * cw).trunc();
    shapes.push(SeparatorShape::Line(RectF::new(hx, y2 as f32, hwidth, 2.0)));
    if layout.gradient {
        shapes.push(SeparatorShape::Gradient(
            RectF::new(hx, (y2 - 6) as f32, hwidth, 6.0),
            GradientAxis::FromBottom,
        ));
    }
    shapes
}

pub fn draw_separators(canvas: &mut PixelCanvas, shapes: &[SeparatorShape], color: Rgba) {
    for shape in shapes {
        match *shape {
            SeparatorShape::Line(rect) => canvas.fill_rect(rect, color, FillPattern::Solid),
            SeparatorShape::Gradient(rect, axis) => canvas.fill_gradient(rect, color, axis, 125, 0),
        }
    }
}
