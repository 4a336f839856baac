//! Grid cells and the run-length records that write them.

use crate::highlight::Highlight;
use std::sync::Arc;

/// One written grid position. Cells are replaced wholesale, never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub text: String,
    pub highlight: Arc<Highlight>,
    /// Whether the text fits one column.
    pub normal_width: bool,
}

impl Cell {
    pub fn is_space(&self) -> bool {
        self.text == " "
    }

    /// Nothing to draw for this cell's foreground.
    pub fn is_textless(&self) -> bool {
        self.text.is_empty() || self.is_space()
    }
}

/// A decoded `grid_line` cell entry.
///
/// `hl_id` is absent when the previous cell's highlight carries over and
/// `repeat` defaults to one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellRun {
    pub text: String,
    pub hl_id: Option<u64>,
    pub repeat: Option<usize>,
}

impl CellRun {
    pub fn new(text: impl Into<String>, hl_id: Option<u64>, repeat: Option<usize>) -> Self {
        Self {
            text: text.into(),
            hl_id,
            repeat,
        }
    }

    /// Number of cells this run writes (`0` counts as one).
    pub fn count(&self) -> usize {
        self.repeat.unwrap_or(1).max(1)
    }
}
