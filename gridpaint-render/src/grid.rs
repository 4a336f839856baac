//! The per-window cell matrix and its per-row bookkeeping.
//!
//! Besides the cells, every row carries:
//! - `len_line`: columns up to the last non-space cell
//! - `len_content`: columns up to the last cell that paints something other
//!   than blank base background
//! - a dirty mask for the current frame and the mask of the previous frame,
//!   which `DamageTracker::flush` diffs against
//!
//! All mutation clamps silently. Out-of-range rows and columns are skipped
//! and logged at debug level.

use crate::cell::{Cell, CellRun};
use crate::context::Theme;
use crate::geometry::CellRect;
use crate::highlight::HighlightTable;
use gridpaint_config::Rgba;
use std::sync::Arc;

/// Inclusive scroll region in cells, as decoded from `grid_scroll`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollRegion {
    pub top: usize,
    pub bot: usize,
    pub left: usize,
    pub right: usize,
}

impl ScrollRegion {
    /// Build from the exclusive `bot`/`right` bounds of a `grid_scroll` event.
    pub fn from_exclusive(top: usize, bot: usize, left: usize, right: usize) -> Option<Self> {
        if bot <= top || right <= left {
            return None;
        }
        Some(Self {
            top,
            bot: bot - 1,
            left,
            right: right - 1,
        })
    }
}

/// How `refresh_update_area` widens the content lengths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshMode {
    /// Every row repaints the full grid width.
    Full,
    /// Every row repaints up to the widest content seen so far.
    Content,
}

/// Collaborators `update_line` needs to resolve and classify cells.
pub struct UpdateEnv<'a> {
    pub highlights: &'a HighlightTable,
    pub theme: &'a Theme,
    pub is_normal_width: &'a dyn Fn(&str) -> bool,
}

/// What an `update_line` call wrote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineUpdate {
    pub row: usize,
    pub col_start: usize,
    /// One past the last written column.
    pub col_end: usize,
    /// A popup-menu highlight was written.
    pub popup_menu: bool,
    /// Largest non-zero highlight blend written.
    pub blend: Option<u8>,
}

impl LineUpdate {
    /// Damage for the written cells plus one column of margin.
    pub fn damage(&self) -> CellRect {
        CellRect::new(self.col_start, self.row, self.col_end - self.col_start + 1, 1)
    }
}

#[derive(Debug, Clone)]
pub struct GridBuffer {
    cols: usize,
    rows: usize,
    cells: Vec<Vec<Option<Cell>>>,
    len_line: Vec<usize>,
    len_content: Vec<usize>,
    len_old_content: Vec<usize>,
    mask: Vec<Vec<bool>>,
    old_mask: Vec<Vec<bool>>,
    max_len_content: usize,
    base_bg: Rgba,
}

impl GridBuffer {
    pub fn new(cols: usize, rows: usize, base_bg: Rgba) -> Self {
        Self {
            cols,
            rows,
            cells: vec![vec![None; cols]; rows],
            len_line: vec![0; rows],
            len_content: vec![cols.saturating_sub(1); rows],
            len_old_content: vec![0; rows],
            mask: vec![vec![false; cols]; rows],
            old_mask: vec![vec![false; cols]; rows],
            max_len_content: 0,
            base_bg,
        }
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&Cell> {
        self.cells.get(row)?.get(col)?.as_ref()
    }

    pub fn line(&self, row: usize) -> Option<&[Option<Cell>]> {
        self.cells.get(row).map(Vec::as_slice)
    }

    pub fn len_line(&self, row: usize) -> usize {
        self.len_line.get(row).copied().unwrap_or(0)
    }

    pub fn len_content(&self, row: usize) -> usize {
        self.len_content.get(row).copied().unwrap_or(0)
    }

    pub fn len_old_content(&self, row: usize) -> usize {
        self.len_old_content.get(row).copied().unwrap_or(0)
    }

    pub fn max_len_content(&self) -> usize {
        self.max_len_content
    }

    pub fn mask(&self, row: usize, col: usize) -> bool {
        self.mask.get(row).and_then(|r| r.get(col)).copied().unwrap_or(false)
    }

    pub fn old_mask(&self, row: usize, col: usize) -> bool {
        self.old_mask.get(row).and_then(|r| r.get(col)).copied().unwrap_or(false)
    }

    pub fn base_bg(&self) -> Rgba {
        self.base_bg
    }

    pub fn set_base_bg(&mut self, bg: Rgba) {
        self.base_bg = bg;
    }

    /// A space on base background with no decoration draws nothing.
    fn is_blank(&self, cell: &Cell, theme: &Theme) -> bool {
        cell.is_space()
            && cell.highlight.bg(theme).same_rgb(&self.base_bg)
            && !cell.highlight.has_decoration()
    }

    /// Apply run-length cell updates to one row starting at `col_start`.
    ///
    /// Returns `None` when the row or column is out of range. Writes past the
    /// end of the row are dropped.
    pub fn update_line(
        &mut self,
        row: usize,
        col_start: i64,
        runs: &[CellRun],
        env: &UpdateEnv<'_>,
    ) -> Option<LineUpdate> {
        if col_start < 0 || row >= self.rows {
            log::debug!("Skipping grid_line at row {} col {}", row, col_start);
            return None;
        }
        let col_start = col_start as usize;
        let mut update = LineUpdate {
            row,
            col_start,
            col_end: col_start,
            popup_menu: false,
            blend: None,
        };

        let mut col = col_start;
        for run in runs {
            if col >= self.cols {
                break;
            }
            for _ in 0..run.count() {
                if col >= self.cols {
                    break;
                }
                let highlight = match (run.hl_id, col) {
                    (Some(id), _) => env.highlights.get(id),
                    (None, 0) => env.highlights.default_highlight(),
                    (None, _) => match &self.cells[row][col - 1] {
                        Some(prev) => Arc::clone(&prev.highlight),
                        None => env.highlights.default_highlight(),
                    },
                };

                if highlight.is_popup_menu() {
                    update.popup_menu = true;
                }
                if highlight.blend > 0 {
                    update.blend = Some(update.blend.unwrap_or(0).max(highlight.blend));
                }

                let cell = Cell {
                    normal_width: (env.is_normal_width)(&run.text),
                    text: run.text.clone(),
                    highlight,
                };
                self.mask[row][col] = !self.is_blank(&cell, env.theme);
                self.cells[row][col] = Some(cell);
                col += 1;
            }
        }
        update.col_end = col;

        self.count_content(row, env.theme);
        Some(update)
    }

    /// Recompute `len_line` and `len_content` of `row` by scanning backward.
    pub fn count_content(&mut self, row: usize, theme: &Theme) {
        if row >= self.rows {
            return;
        }
        let mut len_line = self.cols;
        let mut len_content = self.cols;
        let mut line_done = false;
        let mut content_done = false;

        for col in (0..self.cols).rev() {
            let cell = self.cells[row][col].as_ref();
            if !line_done {
                match cell {
                    Some(c) if !c.is_space() => line_done = true,
                    _ => len_line -= 1,
                }
            }
            if !content_done {
                match cell {
                    Some(c) if !self.is_blank(c, theme) => content_done = true,
                    _ => len_content -= 1,
                }
            }
            if line_done && content_done {
                break;
            }
        }

        self.len_line[row] = len_line;
        self.len_content[row] = len_content;
    }

    /// Recompute the dirty mask of `row` from its cells.
    pub fn make_update_mask(&mut self, row: usize, theme: &Theme) {
        if row >= self.rows {
            return;
        }
        for col in 0..self.cols {
            let dirty = match &self.cells[row][col] {
                None => false,
                Some(cell) => !self.is_blank(cell, theme),
            };
            self.mask[row][col] = dirty;
        }
    }

    /// Leading columns of `row` that are spaces or sign-column cells.
    /// Unwritten cells are skipped without counting.
    pub fn head_space(&self, row: usize) -> usize {
        let Some(line) = self.cells.get(row) else {
            return 0;
        };
        line.iter()
            .flatten()
            .take_while(|c| c.is_space() || c.highlight.is_sign_column())
            .count()
    }

    /// Record the widest content seen, which smooth scrolling repaints to.
    pub fn note_max_len_content(&mut self, row: usize) {
        let len = self.len_content(row);
        if len > self.max_len_content {
            self.max_len_content = len;
        }
    }

    /// Widen `len_content` of `row` to at least `col` (indent guides draw
    /// past trailing content).
    pub fn extend_content_to(&mut self, row: usize, col: usize) {
        if let Some(len) = self.len_content.get_mut(row)
            && *len < col
        {
            *len = col;
        }
    }

    /// Shift the content of `region` by `count` rows and return the damage.
    ///
    /// Positive `count` moves content up. A region covering the whole grid
    /// splices row vectors; any other region copies cells column by column
    /// and leaves everything outside the region untouched.
    pub fn scroll(&mut self, region: ScrollRegion, count: i64) -> CellRect {
        let bot = region.bot.min(self.rows.saturating_sub(1));
        let right = region.right.min(self.cols.saturating_sub(1));
        let region = ScrollRegion { bot, right, ..region };
        let damage = CellRect::new(0, region.top, self.cols, (bot + 1).saturating_sub(region.top));

        if count == 0 || self.rows == 0 || self.cols == 0 || region.top > bot || region.left > right {
            return damage;
        }

        let full = region.top == 0 && bot == self.rows - 1 && region.left == 0 && right == self.cols - 1;
        if full {
            self.splice_rows(count);
        } else if count > 0 {
            self.scroll_region_up(region, count as usize);
        } else {
            self.scroll_region_down(region, count.unsigned_abs() as usize);
        }
        damage
    }

    fn splice_rows(&mut self, count: i64) {
        let n = (count.unsigned_abs() as usize).min(self.rows);
        let blank_cells = || vec![None; self.cols];
        if count > 0 {
            self.cells.drain(..n);
            self.mask.drain(..n);
            self.len_line.drain(..n);
            self.len_content.drain(..n);
            for _ in 0..n {
                self.cells.push(blank_cells());
                self.mask.push(vec![false; self.cols]);
                self.len_line.push(0);
                self.len_content.push(0);
            }
        } else {
            let keep = self.rows - n;
            self.cells.truncate(keep);
            self.mask.truncate(keep);
            self.len_line.truncate(keep);
            self.len_content.truncate(keep);
            for _ in 0..n {
                self.cells.insert(0, blank_cells());
                self.mask.insert(0, vec![false; self.cols]);
                self.len_line.insert(0, 0);
                self.len_content.insert(0, 0);
            }
        }
    }

    fn copy_row_span(&mut self, dst: usize, src: usize, region: &ScrollRegion) {
        for col in region.left..=region.right {
            self.cells[dst][col] = self.cells[src][col].clone();
            self.mask[dst][col] = self.mask[src][col];
        }
        self.len_line[dst] = self.len_line[src];
        self.len_content[dst] = self.len_content[src];
    }

    fn clear_row_span(&mut self, row: usize, region: &ScrollRegion) {
        for col in region.left..=region.right {
            self.cells[row][col] = None;
            self.mask[row][col] = true;
        }
    }

    fn scroll_region_up(&mut self, region: ScrollRegion, count: usize) {
        let ScrollRegion { top, bot, .. } = region;
        if bot >= top + count {
            for row in top..=bot - count {
                self.copy_row_span(row, row + count, &region);
            }
        }
        let first_cleared = (bot + 1).saturating_sub(count).max(top);
        for row in first_cleared..=bot {
            self.clear_row_span(row, &region);
        }
    }

    fn scroll_region_down(&mut self, region: ScrollRegion, count: usize) {
        let ScrollRegion { top, bot, .. } = region;
        if bot >= top + count {
            for row in (top + count..=bot).rev() {
                self.copy_row_span(row, row - count, &region);
            }
        }
        let last_cleared = (top + count - 1).min(bot);
        for row in top..=last_cleared {
            self.clear_row_span(row, &region);
        }
    }

    /// Reallocate for a new size. With `preserve` the overlapping cells,
    /// masks and lengths are carried over.
    pub fn resize(&mut self, cols: usize, rows: usize, preserve: bool) {
        let mut next = GridBuffer::new(cols, rows, self.base_bg);
        if preserve {
            for row in 0..rows.min(self.rows) {
                next.len_line[row] = self.len_line[row];
                next.len_content[row] = self.len_content[row];
                next.len_old_content[row] = self.len_old_content[row];
                for col in 0..cols.min(self.cols) {
                    next.cells[row][col] = self.cells[row][col].take();
                    next.mask[row][col] = self.mask[row][col];
                    next.old_mask[row][col] = self.old_mask[row][col];
                }
            }
            next.max_len_content = self.max_len_content.min(cols);
        }
        *self = next;
    }

    /// Empty every cell and mark every cell dirty.
    pub fn clear(&mut self) {
        let (cols, rows) = (self.cols, self.rows);
        for row in 0..rows {
            self.cells[row].iter_mut().for_each(|c| *c = None);
            self.mask[row].iter_mut().for_each(|m| *m = true);
            self.old_mask[row].iter_mut().for_each(|m| *m = false);
            self.len_line[row] = 0;
            self.len_content[row] = cols.saturating_sub(1);
        }
    }

    /// Mark everything dirty and widen every row's content length.
    pub fn refresh_update_area(&mut self, mode: RefreshMode) {
        let boundary = match mode {
            RefreshMode::Full => self.cols,
            RefreshMode::Content => self.max_len_content,
        };
        for row in 0..self.rows {
            self.len_content[row] = boundary;
            self.mask[row].iter_mut().for_each(|m| *m = true);
        }
    }

    /// Point every cell at the current definition of its highlight id and
    /// recompute masks against the new colors.
    pub fn rebind_highlights(&mut self, highlights: &HighlightTable, theme: &Theme) {
        for row in 0..self.rows {
            for cell in self.cells[row].iter_mut().flatten() {
                cell.highlight = highlights.get(cell.highlight.id);
            }
            self.make_update_mask(row, theme);
            self.count_content(row, theme);
        }
    }

    /// Record `len_content` as what was last flushed and return the width
    /// the row must repaint (the larger of the current and previous lengths).
    pub(crate) fn take_row_width(&mut self, row: usize) -> usize {
        let width = self.len_content[row].max(self.len_old_content[row]);
        self.len_old_content[row] = self.len_content[row];
        width
    }

    pub(crate) fn masks_mut(&mut self, row: usize) -> (&[bool], &mut [bool]) {
        (&self.mask[row], &mut self.old_mask[row])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highlight::Highlight;

    struct Fixture {
        table: HighlightTable,
        theme: Theme,
    }

    impl Fixture {
        fn new() -> Self {
            let mut table = HighlightTable::new();
            table.define(1, Highlight::default());
            table.define(
                2,
                Highlight {
                    background: Some(Rgba::rgb(50, 0, 0)),
                    ..Default::default()
                },
            );
            table.define(
                3,
                Highlight {
                    underline: true,
                    ..Default::default()
                },
            );
            Self {
                table,
                theme: Theme::default(),
            }
        }

        fn grid(&self, cols: usize, rows: usize) -> GridBuffer {
            GridBuffer::new(cols, rows, self.theme.background)
        }

        fn write(&self, grid: &mut GridBuffer, row: usize, col: i64, runs: &[CellRun]) -> Option<LineUpdate> {
            let normal = |_: &str| true;
            let env = UpdateEnv {
                highlights: &self.table,
                theme: &self.theme,
                is_normal_width: &normal,
            };
            grid.update_line(row, col, runs, &env)
        }
    }

    fn text_of(grid: &GridBuffer, row: usize) -> String {
        (0..grid.cols())
            .map(|c| grid.cell(row, c).map(|c| c.text.clone()).unwrap_or_else(|| ".".into()))
            .collect()
    }

    #[test]
    fn test_repeat_writes_consecutive_cells() {
        let fx = Fixture::new();
        let mut grid = fx.grid(10, 5);
        let update = fx.write(&mut grid, 0, 0, &[CellRun::new("a", Some(1), Some(3))]).unwrap();
        assert_eq!(update.col_end, 3);
        assert_eq!(text_of(&grid, 0), "aaa.......");
        assert_eq!(grid.cell(0, 2).unwrap().highlight.id, 1);
        assert_eq!(grid.len_content(0), 3);
        assert_eq!(update.damage(), CellRect::new(0, 0, 4, 1));
    }

    #[test]
    fn test_repeat_zero_means_one() {
        let fx = Fixture::new();
        let mut grid = fx.grid(5, 1);
        fx.write(&mut grid, 0, 1, &[CellRun::new("x", Some(1), Some(0))]);
        assert_eq!(text_of(&grid, 0), ".x...");
    }

    #[test]
    fn test_omitted_highlight_inherits_previous_cell() {
        let fx = Fixture::new();
        let mut grid = fx.grid(6, 1);
        fx.write(
            &mut grid,
            0,
            0,
            &[CellRun::new("a", None, None), CellRun::new("b", Some(2), None), CellRun::new("c", None, Some(2))],
        );
        assert_eq!(grid.cell(0, 0).unwrap().highlight.id, 0);
        assert_eq!(grid.cell(0, 1).unwrap().highlight.id, 2);
        assert_eq!(grid.cell(0, 2).unwrap().highlight.id, 2);
        assert_eq!(grid.cell(0, 3).unwrap().highlight.id, 2);
    }

    #[test]
    fn test_out_of_range_writes_are_skipped() {
        let fx = Fixture::new();
        let mut grid = fx.grid(3, 2);
        assert!(fx.write(&mut grid, 5, 0, &[CellRun::new("a", Some(1), None)]).is_none());
        assert!(fx.write(&mut grid, 0, -1, &[CellRun::new("a", Some(1), None)]).is_none());
        let update = fx.write(&mut grid, 1, 2, &[CellRun::new("z", Some(1), Some(5))]).unwrap();
        assert_eq!(update.col_end, 3);
        assert_eq!(text_of(&grid, 1), "..z");
    }

    #[test]
    fn test_masks_and_content_lengths() {
        let fx = Fixture::new();
        let mut grid = fx.grid(8, 1);
        fx.write(
            &mut grid,
            0,
            0,
            &[
                CellRun::new("a", Some(1), None),
                CellRun::new(" ", Some(2), Some(2)),
                CellRun::new(" ", Some(1), Some(3)),
            ],
        );
        assert!(grid.mask(0, 0));
        assert!(grid.mask(0, 1), "colored space is dirty");
        assert!(!grid.mask(0, 3), "base-bg space is blank");
        assert_eq!(grid.len_line(0), 1);
        assert_eq!(grid.len_content(0), 3);

        fx.write(&mut grid, 0, 5, &[CellRun::new(" ", Some(3), None)]);
        assert!(grid.mask(0, 5), "underlined space is dirty");
        assert_eq!(grid.len_content(0), 6);
    }

    #[test]
    fn test_popup_and_blend_detection() {
        let mut fx = Fixture::new();
        fx.table.define(
            9,
            Highlight {
                ui_name: "Pmenu".into(),
                blend: 30,
                ..Default::default()
            },
        );
        let mut grid = fx.grid(4, 1);
        let update = fx.write(&mut grid, 0, 0, &[CellRun::new("m", Some(9), None)]).unwrap();
        assert!(update.popup_menu);
        assert_eq!(update.blend, Some(30));
    }

    #[test]
    fn test_head_space_counts_sign_column() {
        let mut fx = Fixture::new();
        fx.table.define(
            4,
            Highlight {
                hi_name: "LineNr".into(),
                ..Default::default()
            },
        );
        let mut grid = fx.grid(10, 1);
        fx.write(
            &mut grid,
            0,
            0,
            &[CellRun::new("1", Some(4), None), CellRun::new(" ", Some(1), Some(3)), CellRun::new("x", Some(1), None)],
        );
        assert_eq!(grid.head_space(0), 4);
    }

    fn filled(fx: &Fixture, cols: usize, rows: usize) -> GridBuffer {
        let mut grid = fx.grid(cols, rows);
        for row in 0..rows {
            let ch = char::from(b'0' + row as u8).to_string();
            fx.write(&mut grid, row, 0, &[CellRun::new(ch, Some(1), Some(cols))]);
        }
        grid
    }

    #[test]
    fn test_full_scroll_up_splices_rows() {
        let fx = Fixture::new();
        let mut grid = filled(&fx, 4, 5);
        let damage = grid.scroll(ScrollRegion { top: 0, bot: 4, left: 0, right: 3 }, 2);
        assert_eq!(text_of(&grid, 0), "2222");
        assert_eq!(text_of(&grid, 2), "4444");
        assert_eq!(text_of(&grid, 3), "....");
        assert_eq!(text_of(&grid, 4), "....");
        assert_eq!(grid.len_content(4), 0);
        assert_eq!(damage, CellRect::new(0, 0, 4, 5));
    }

    #[test]
    fn test_full_scroll_down_splices_rows() {
        let fx = Fixture::new();
        let mut grid = filled(&fx, 3, 4);
        grid.scroll(ScrollRegion { top: 0, bot: 3, left: 0, right: 2 }, -1);
        assert_eq!(text_of(&grid, 0), "...");
        assert_eq!(text_of(&grid, 1), "000");
        assert_eq!(text_of(&grid, 3), "222");
    }

    #[test]
    fn test_sub_region_scroll_leaves_outside_untouched() {
        let fx = Fixture::new();
        let mut grid = filled(&fx, 6, 6);
        let damage = grid.scroll(ScrollRegion { top: 1, bot: 4, left: 2, right: 3 }, 1);
        assert_eq!(text_of(&grid, 0), "000000");
        assert_eq!(text_of(&grid, 1), "112211");
        assert_eq!(text_of(&grid, 3), "334433");
        assert_eq!(text_of(&grid, 4), "44..44");
        assert_eq!(text_of(&grid, 5), "555555");
        assert!(grid.mask(4, 2), "vacated cells are dirty");
        assert_eq!(damage, CellRect::new(0, 1, 6, 4));
    }

    #[test]
    fn test_sub_region_scroll_down() {
        let fx = Fixture::new();
        let mut grid = filled(&fx, 4, 5);
        grid.scroll(ScrollRegion { top: 1, bot: 4, left: 0, right: 3 }, -2);
        assert_eq!(text_of(&grid, 0), "0000");
        assert_eq!(text_of(&grid, 1), "....");
        assert_eq!(text_of(&grid, 2), "....");
        assert_eq!(text_of(&grid, 3), "1111");
        assert_eq!(text_of(&grid, 4), "2222");
    }

    #[test]
    fn test_scroll_larger_than_region_clears_it() {
        let fx = Fixture::new();
        let mut grid = filled(&fx, 3, 4);
        grid.scroll(ScrollRegion { top: 1, bot: 2, left: 0, right: 1 }, 5);
        assert_eq!(text_of(&grid, 0), "000");
        assert_eq!(text_of(&grid, 1), "..1");
        assert_eq!(text_of(&grid, 2), "..2");
        assert_eq!(text_of(&grid, 3), "333");
    }

    #[test]
    fn test_resize_preserves_overlap() {
        let fx = Fixture::new();
        let mut grid = filled(&fx, 3, 3);
        grid.resize(5, 2, true);
        assert_eq!(grid.cols(), 5);
        assert_eq!(text_of(&grid, 1), "111..");
        grid.resize(4, 4, false);
        assert_eq!(text_of(&grid, 0), "....");
        assert_eq!(grid.len_content(3), 3);
    }

    #[test]
    fn test_clear_marks_everything_dirty() {
        let fx = Fixture::new();
        let mut grid = filled(&fx, 3, 2);
        grid.clear();
        assert!(grid.cell(0, 0).is_none());
        assert!((0..3).all(|c| grid.mask(1, c)));
        assert_eq!(grid.len_content(0), 2);
    }

    #[test]
    fn test_rebind_picks_up_redefinition() {
        let mut fx = Fixture::new();
        let mut grid = fx.grid(3, 1);
        fx.write(&mut grid, 0, 0, &[CellRun::new(" ", Some(1), None)]);
        assert!(!grid.mask(0, 0));
        fx.table.define(
            1,
            Highlight {
                background: Some(Rgba::rgb(0, 90, 0)),
                ..Default::default()
            },
        );
        grid.rebind_highlights(&fx.table, &fx.theme);
        assert_eq!(grid.cell(0, 0).unwrap().highlight.background, Some(Rgba::rgb(0, 90, 0)));
        assert!(grid.mask(0, 0));
        assert_eq!(grid.len_content(0), 1);
    }
}
