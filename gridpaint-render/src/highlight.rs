//! Highlight definitions and the id-indexed highlight table.

use crate::context::Theme;
use gridpaint_config::Rgba;
use std::collections::HashMap;
use std::sync::Arc;

/// Highlight group names that mark gutter cells (line numbers, signs, folds).
const SIGN_COLUMN_NAMES: &[&str] = &[
    "SignColumn",
    "FoldColumn",
    "LineNr",
    "CursorLineNr",
    "ALEErrorSign",
    "ALEStyleErrorSign",
    "ALEWarningSign",
    "ALEStyleWarningSign",
    "ALEInfoSign",
    "ALESignColumnWithErrors",
    "LspErrorHighlight",
    "LspWarningHighlight",
    "LspInformationHighlight",
    "LspHintHighlight",
];

const POPUP_MENU_NAMES: &[&str] = &["Pmenu", "PmenuSel", "PmenuSbar"];

/// Diff highlight categories that may be filled with a pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffKind {
    Add,
    Change,
    Delete,
}

/// A style record, immutable once defined.
///
/// `None` colors resolve to the theme defaults at draw time, so a
/// `default_colors_set` never requires redefining highlights.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Highlight {
    pub id: u64,
    pub kind: String,
    pub ui_name: String,
    pub hi_name: String,
    pub foreground: Option<Rgba>,
    pub background: Option<Rgba>,
    pub special: Option<Rgba>,
    pub reverse: bool,
    pub italic: bool,
    pub bold: bool,
    pub underline: bool,
    pub undercurl: bool,
    pub strikethrough: bool,
    /// Blend level in percent (0..=100).
    pub blend: u8,
}

impl Highlight {
    /// Foreground after theme fallback and `reverse`.
    pub fn fg(&self, theme: &Theme) -> Rgba {
        if self.reverse {
            self.background.unwrap_or(theme.background)
        } else {
            self.foreground.unwrap_or(theme.foreground)
        }
    }

    /// Background after theme fallback and `reverse`.
    pub fn bg(&self, theme: &Theme) -> Rgba {
        if self.reverse {
            self.foreground.unwrap_or(theme.foreground)
        } else {
            self.background.unwrap_or(theme.background)
        }
    }

    /// Color of underline, undercurl and strikethrough strokes.
    pub fn decoration_color(&self, theme: &Theme) -> Rgba {
        self.special
            .or(self.foreground)
            .unwrap_or(theme.foreground)
    }

    pub fn has_decoration(&self) -> bool {
        self.underline || self.undercurl || self.strikethrough
    }

    pub fn is_sign_column(&self) -> bool {
        SIGN_COLUMN_NAMES.contains(&self.hi_name.as_str())
    }

    pub fn is_popup_menu(&self) -> bool {
        POPUP_MENU_NAMES.contains(&self.ui_name.as_str())
    }

    pub fn diff_kind(&self) -> Option<DiffKind> {
        match self.hi_name.as_str() {
            "DiffAdd" => Some(DiffKind::Add),
            "DiffChange" => Some(DiffKind::Change),
            "DiffDelete" => Some(DiffKind::Delete),
            _ => None,
        }
    }
}

/// Mapping from highlight id to definition plus the named group table.
///
/// Id 0 is always the theme default. Lookups of unknown ids fall back to it.
#[derive(Debug, Clone)]
pub struct HighlightTable {
    default: Arc<Highlight>,
    defs: HashMap<u64, Arc<Highlight>>,
    groups: HashMap<String, u64>,
}

impl Default for HighlightTable {
    fn default() -> Self {
        Self::new()
    }
}

impl HighlightTable {
    pub fn new() -> Self {
        Self {
            default: Arc::new(Highlight::default()),
            defs: HashMap::new(),
            groups: HashMap::new(),
        }
    }

    pub fn default_highlight(&self) -> Arc<Highlight> {
        Arc::clone(&self.default)
    }

    pub fn get(&self, id: u64) -> Arc<Highlight> {
        if id == 0 {
            return self.default_highlight();
        }
        match self.defs.get(&id) {
            Some(hl) => Arc::clone(hl),
            None => {
                log::debug!("Unknown highlight id {}, using default", id);
                self.default_highlight()
            }
        }
    }

    pub fn contains(&self, id: u64) -> bool {
        id == 0 || self.defs.contains_key(&id)
    }

    /// Define or replace highlight `id`. Redefining id 0 is ignored.
    pub fn define(&mut self, id: u64, mut highlight: Highlight) {
        if id == 0 {
            log::debug!("Ignoring redefinition of the default highlight");
            return;
        }
        highlight.id = id;
        self.defs.insert(id, Arc::new(highlight));
    }

    pub fn set_group(&mut self, name: impl Into<String>, id: u64) {
        self.groups.insert(name.into(), id);
    }

    /// Highlight bound to a named group, if the group is known.
    pub fn group(&self, name: &str) -> Option<Arc<Highlight>> {
        self.groups.get(name).map(|&id| self.get(id))
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }
}
