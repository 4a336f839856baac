//! Damage accumulation and flushing into repaint rectangles.
//!
//! Updates extend a single bounding box. A flush walks the rows inside the
//! box and turns each row's dirty mask, merged with the previous frame's
//! mask, into the smallest set of horizontal runs worth repainting.

use crate::geometry::CellRect;
use crate::grid::GridBuffer;

/// Conditions that force whole rows to repaint as one rectangle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushOptions {
    /// Touchpad pixel scrolling has a non-zero vertical offset.
    pub touchpad_active: bool,
    /// Indent guides are drawn, which depend on neighbouring rows.
    pub indent_guide: bool,
    /// A smooth-scroll animation is offsetting the content.
    pub animating: bool,
}

/// Bounding box of queued damage, in cells. Exclusive on the far edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Area {
    x0: usize,
    y0: usize,
    x1: usize,
    y1: usize,
}

#[derive(Debug, Clone, Default)]
pub struct DamageTracker {
    area: Option<Area>,
}

impl DamageTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Extend the queued box to cover `(x, y, width, height)`.
    pub fn queue_redraw(&mut self, x: usize, y: usize, width: usize, height: usize) {
        let next = Area {
            x0: x,
            y0: y,
            x1: x + width,
            y1: y + height,
        };
        self.area = Some(match self.area {
            None => next,
            Some(a) => Area {
                x0: a.x0.min(next.x0),
                y0: a.y0.min(next.y0),
                x1: a.x1.max(next.x1),
                y1: a.y1.max(next.y1),
            },
        });
    }

    pub fn queue_rect(&mut self, rect: CellRect) {
        self.queue_redraw(rect.col, rect.row, rect.cols, rect.rows);
    }

    pub fn queue_redraw_all(&mut self, cols: usize, rows: usize) {
        self.area = Some(Area {
            x0: 0,
            y0: 0,
            x1: cols,
            y1: rows,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.area.is_none()
    }

    /// The queued box, leaving the tracker empty.
    pub fn take(&mut self) -> Option<CellRect> {
        self.area
            .take()
            .map(|a| CellRect::new(a.x0, a.y0, a.x1.saturating_sub(a.x0), a.y1.saturating_sub(a.y0)))
    }

    /// Turn queued damage into repaint rectangles and reset the box.
    ///
    /// For each row in range the current mask is copied into the previous
    /// mask, so the next flush diffs against this frame. Rectangles are
    /// clamped to the grid.
    pub fn flush(&mut self, grid: &mut GridBuffer, options: FlushOptions) -> Vec<CellRect> {
        let rows = grid.rows();
        let cols = grid.cols();
        let area = self.take();

        let (start, end) = if options.touchpad_active || options.indent_guide {
            (0, rows)
        } else {
            match area {
                Some(a) => (a.row.min(rows), (a.row + a.rows).min(rows)),
                None => return Vec::new(),
            }
        };

        let mut rects = Vec::new();
        for row in start..end {
            let mut width = grid.take_row_width(row);
            let mut single_rect = false;

            if options.indent_guide {
                if row + 1 < rows {
                    width = width.max(grid.len_content(row + 1));
                }
                single_rect = true;
            }
            if options.touchpad_active || options.animating {
                width = grid.max_len_content();
                single_rect = true;
            }
            let width = (width + 1).min(cols);

            let before = rects.len();
            let (mask, old) = grid.masks_mut(row);
            if single_rect {
                old.copy_from_slice(mask);
                rects.push(CellRect::new(0, row, width, 1));
            } else {
                row_runs(row, mask, old, &mut rects);
            }

            if rects.len() == before && width > 0 {
                rects.push(CellRect::new(0, row, width, 1));
            }
        }

        rects
    }
}

/// Emit one rectangle per run of `mask || old`, merging runs separated by a
/// single clean cell, and copy `mask` into `old` as it goes.
fn row_runs(row: usize, mask: &[bool], old: &mut [bool], rects: &mut Vec<CellRect>) {
    let n = mask.len().min(old.len());
    let mut run_start: Option<usize> = None;

    for j in 0..n {
        let dirty = mask[j] || old[j];
        if dirty && run_start.is_none() {
            run_start = Some(j);
        }
        if let Some(start) = run_start {
            let at_end = j + 1 == n;
            if !dirty || at_end {
                if j + 1 < n && mask[j + 1] {
                    old[j] = mask[j];
                    continue;
                }
                let end = if dirty { j + 1 } else { j };
                rects.push(CellRect::new(start, row, end - start, 1));
                run_start = None;
            }
        }
        old[j] = mask[j];
    }
}
