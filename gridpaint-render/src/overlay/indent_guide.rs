//! Indent guide analysis.
//!
//! A guide is a one pixel column drawn at every tab stop inside a row's
//! leading whitespace, as long as the block it belongs to continues below
//! with deeper indented, non-empty lines. The contiguous run of guide
//! segments holding the cursor is marked `current`.

use crate::canvas::PixelCanvas;
use crate::context::Theme;
use crate::geometry::RectF;
use crate::grid::GridBuffer;
use gridpaint_config::FillPattern;
use gridpaint_fonts::FontMetrics;
use std::collections::HashSet;

/// One guide segment: a row at the left edge of column `col`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndentMark {
    pub col: usize,
    pub row: usize,
    pub current: bool,
}

/// Find the guide segments of `grid`.
///
/// `cursor` is `(row, col)` when the cursor is on this grid.
pub fn analyze_indent_guides(grid: &GridBuffer, tabstop: usize, cursor: Option<(usize, usize)>) -> Vec<IndentMark> {
    let rows = grid.rows();
    if tabstop == 0 || rows < 2 {
        return Vec::new();
    }

    // The last row is only ever a continuation target.
    let headspace: Vec<usize> = (0..rows)
        .map(|y| if y + 1 < rows { grid.head_space(y) } else { 0 })
        .collect();

    let mut marks: HashSet<(usize, usize)> = HashSet::new();
    for y in 0..rows - 1 {
        scan_row(grid, y, tabstop, &headspace, &mut marks);
    }

    let current = current_block(&marks, cursor, rows);

    let mut out: Vec<IndentMark> = marks
        .iter()
        .map(|&(col, row)| IndentMark {
            col,
            row,
            current: current.contains(&(col, row)),
        })
        .collect();
    out.sort_by_key(|m| (m.row, m.col));
    out
}

fn scan_row(grid: &GridBuffer, y: usize, ts: usize, headspace: &[usize], marks: &mut HashSet<(usize, usize)>) {
    let Some(line) = grid.line(y) else {
        return;
    };
    let rows = grid.rows();
    let mut res = 0;

    for x in 0..grid.max_len_content() {
        if x + 1 >= line.len() {
            break;
        }
        if line[x + 1].is_none() {
            continue;
        }
        let Some(cell) = &line[x] else {
            continue;
        };
        let sign = cell.highlight.is_sign_column();
        if sign {
            res += 1;
        }
        if !cell.is_space() && !sign {
            break;
        }
        if x <= res || (x + 1 - res) % ts != 0 {
            continue;
        }

        let ylen = x + 1;
        if ylen > headspace[y] {
            break;
        }

        let mut paint = false;
        for mm in y..rows {
            if marks.contains(&(ylen, mm)) {
                continue;
            }
            let mmlen = headspace[mm];
            if mmlen == ylen {
                break;
            }
            if mmlen > ylen && grid.len_line(mm) > res {
                paint = true;
            }
            if mmlen == grid.cols() && !paint {
                for nn in mm + 1..rows {
                    if headspace[nn] <= ylen {
                        break;
                    }
                    if grid.len_line(nn) > res {
                        paint = true;
                    }
                }
            }
            if mmlen < ylen && !continues_wrapped_line(grid, mm, ylen, headspace) {
                break;
            }
            match grid.cell(mm, ylen) {
                Some(c) if c.is_space() => {}
                _ => break,
            }
            if !paint {
                break;
            }
            marks.insert((ylen, mm));
        }
    }
}

/// A shallower row still belongs to the block when the next row is a
/// wrapped continuation, recognised by a blank line-number gutter.
fn continues_wrapped_line(grid: &GridBuffer, mm: usize, ylen: usize, headspace: &[usize]) -> bool {
    if mm + 1 >= grid.rows() || headspace[mm + 1] <= ylen {
        return false;
    }
    let mut continues = false;
    for xx in 0..grid.len_line(mm) {
        let Some(cell) = grid.cell(mm, xx) else {
            continue;
        };
        if cell.highlight.hi_name == "LineNr" {
            if cell.is_space() {
                continues = true;
            } else {
                return false;
            }
        }
    }
    continues
}

fn current_block(
    marks: &HashSet<(usize, usize)>,
    cursor: Option<(usize, usize)>,
    rows: usize,
) -> HashSet<(usize, usize)> {
    let mut block = HashSet::new();
    let Some((crow, ccol)) = cursor else {
        return block;
    };
    for x in (0..=ccol).rev() {
        let col = x + 1;
        if !marks.contains(&(col, crow)) {
            continue;
        }
        for y in (0..=crow).rev() {
            if !marks.contains(&(col, y)) {
                break;
            }
            block.insert((col, y));
        }
        for y in crow..rows {
            if !marks.contains(&(col, y)) {
                break;
            }
            block.insert((col, y));
        }
        break;
    }
    block
}

/// Paint `marks` shifted vertically by `offset` pixels.
pub fn draw_indent_guides(
    canvas: &mut PixelCanvas,
    marks: &[IndentMark],
    metrics: &FontMetrics,
    theme: &Theme,
    offset: i32,
) {
    let lh = metrics.line_height;
    for mark in marks {
        let (color, weight) = if mark.current {
            (theme.indent_guide.warp(-40), 1.5)
        } else {
            (theme.indent_guide, 1.0)
        };
        let rect = RectF::new(
            mark.col as f32 * metrics.cell_width,
            (mark.row as i32 * lh + offset) as f32,
            weight,
            lh as f32,
        );
        canvas.fill_rect(rect, color, FillPattern::Solid);
    }
}
