//! Typed redraw events, decoded once at the transport boundary.
//!
//! The remote editor sends batches shaped like msgpack-rpc notifications:
//! `[[name, args, args, ...], ...]`, where every `args` is one positional
//! tuple. A batch arrives here as a `serde_json::Value`. Unknown event names
//! are skipped as a whole; a malformed tuple of a known event skips only
//! that tuple.

use gridpaint_config::Rgba;
use gridpaint_render::{CellRun, GridId, Highlight};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// Why one argument tuple could not be decoded.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecodeError {
    #[error("{event}: expected at least {expected} arguments, got {got}")]
    Arity {
        event: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("{event}: argument {index} is not {expected}")]
    Type {
        event: &'static str,
        index: usize,
        expected: &'static str,
    },

    #[error("{0}: argument tuple is not an array")]
    NotATuple(&'static str),

    #[error("{event}: {message}")]
    Attributes { event: &'static str, message: String },
}

/// Style attributes of an `hl_attr_define` entry. Colors are packed
/// `0xRRGGBB` integers.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct HighlightAttrs {
    pub foreground: Option<u32>,
    pub background: Option<u32>,
    pub special: Option<u32>,
    pub reverse: bool,
    pub italic: bool,
    pub bold: bool,
    pub underline: bool,
    pub undercurl: bool,
    pub strikethrough: bool,
    pub blend: Option<u8>,
}

/// One `info` entry describing where a highlight came from.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct HighlightInfo {
    pub kind: String,
    pub ui_name: String,
    pub hi_name: String,
}

impl HighlightAttrs {
    /// Build the highlight stored under `id`. Only the first `info` entry
    /// names the highlight.
    pub fn to_highlight(&self, id: u64, info: &[HighlightInfo]) -> Highlight {
        let info = info.first().cloned().unwrap_or_default();
        Highlight {
            id,
            kind: info.kind,
            ui_name: info.ui_name,
            hi_name: info.hi_name,
            foreground: self.foreground.map(Rgba::from_u24),
            background: self.background.map(Rgba::from_u24),
            special: self.special.map(Rgba::from_u24),
            reverse: self.reverse,
            italic: self.italic,
            bold: self.bold,
            underline: self.underline,
            undercurl: self.undercurl,
            strikethrough: self.strikethrough,
            blend: self.blend.unwrap_or(0).min(100),
        }
    }
}

/// Corner of a float window placed at its anchor point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FloatAnchor {
    #[default]
    NW,
    NE,
    SW,
    SE,
}

impl FloatAnchor {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "NW" => Some(Self::NW),
            "NE" => Some(Self::NE),
            "SW" => Some(Self::SW),
            "SE" => Some(Self::SE),
            _ => None,
        }
    }
}

/// Value of an `option_set` entry.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    Bool(bool),
    Int(i64),
    Str(String),
    Other(Value),
}

impl OptionValue {
    fn from_value(value: &Value) -> Self {
        match value {
            Value::Bool(b) => Self::Bool(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Self::Int(i),
                None => Self::Other(value.clone()),
            },
            Value::String(s) => Self::Str(s.clone()),
            other => Self::Other(other.clone()),
        }
    }

    /// Integer value, accepting numeric strings.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            Self::Str(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RedrawEvent {
    GridLine {
        grid: GridId,
        row: usize,
        col_start: i64,
        cells: Vec<CellRun>,
    },
    GridScroll {
        grid: GridId,
        top: usize,
        bottom: usize,
        left: usize,
        right: usize,
        rows: i64,
    },
    GridResize {
        grid: GridId,
        cols: usize,
        rows: usize,
    },
    GridClear {
        grid: GridId,
    },
    GridDestroy {
        grid: GridId,
    },
    GridCursorGoto {
        grid: GridId,
        row: usize,
        col: usize,
    },
    HlAttrDefine {
        id: u64,
        attrs: HighlightAttrs,
        info: Vec<HighlightInfo>,
    },
    /// `None` keeps the current color (the editor sends -1).
    DefaultColorsSet {
        fg: Option<Rgba>,
        bg: Option<Rgba>,
        sp: Option<Rgba>,
    },
    HlGroupSet {
        name: String,
        id: u64,
    },
    WinPos {
        grid: GridId,
        row: usize,
        col: usize,
        width: usize,
        height: usize,
    },
    WinFloatPos {
        grid: GridId,
        anchor: FloatAnchor,
        anchor_grid: GridId,
        anchor_row: f64,
        anchor_col: f64,
        zindex: Option<i64>,
    },
    WinExternalPos {
        grid: GridId,
    },
    WinHide {
        grid: GridId,
    },
    WinViewport {
        grid: GridId,
        topline: i64,
        botline: i64,
    },
    MsgSetPos {
        grid: GridId,
        row: usize,
        scrolled: bool,
    },
    OptionSet {
        name: String,
        value: OptionValue,
    },
    Flush,
}

/// Positional access to one argument tuple.
struct Args<'a> {
    event: &'static str,
    items: &'a [Value],
}

impl<'a> Args<'a> {
    fn new(event: &'static str, tuple: &'a Value, min: usize) -> Result<Self, DecodeError> {
        let items = tuple.as_array().ok_or(DecodeError::NotATuple(event))?;
        if items.len() < min {
            return Err(DecodeError::Arity {
                event,
                expected: min,
                got: items.len(),
            });
        }
        Ok(Self { event, items })
    }

    fn type_error(&self, index: usize, expected: &'static str) -> DecodeError {
        DecodeError::Type {
            event: self.event,
            index,
            expected,
        }
    }

    fn value(&self, index: usize) -> Option<&'a Value> {
        self.items.get(index)
    }

    fn int(&self, index: usize) -> Result<i64, DecodeError> {
        self.value(index)
            .and_then(Value::as_i64)
            .ok_or_else(|| self.type_error(index, "an integer"))
    }

    fn uint(&self, index: usize) -> Result<usize, DecodeError> {
        self.value(index)
            .and_then(Value::as_u64)
            .map(|v| v as usize)
            .ok_or_else(|| self.type_error(index, "a non-negative integer"))
    }

    fn id(&self, index: usize) -> Result<u64, DecodeError> {
        self.value(index)
            .and_then(Value::as_u64)
            .ok_or_else(|| self.type_error(index, "an id"))
    }

    fn float(&self, index: usize) -> Result<f64, DecodeError> {
        self.value(index)
            .and_then(Value::as_f64)
            .ok_or_else(|| self.type_error(index, "a number"))
    }

    fn string(&self, index: usize) -> Result<&'a str, DecodeError> {
        self.value(index)
            .and_then(Value::as_str)
            .ok_or_else(|| self.type_error(index, "a string"))
    }

    fn boolean(&self, index: usize) -> Result<bool, DecodeError> {
        self.value(index)
            .and_then(Value::as_bool)
            .ok_or_else(|| self.type_error(index, "a boolean"))
    }

    fn array(&self, index: usize) -> Result<&'a [Value], DecodeError> {
        self.value(index)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .ok_or_else(|| self.type_error(index, "an array"))
    }

    /// A packed color, where a negative value means "unset".
    fn color(&self, index: usize) -> Result<Option<Rgba>, DecodeError> {
        let v = self.int(index)?;
        Ok((v >= 0).then(|| Rgba::from_u24(v as u32)))
    }
}

fn decode_cells(args: &Args<'_>, index: usize) -> Result<Vec<CellRun>, DecodeError> {
    let raw = args.array(index)?;
    let mut cells = Vec::with_capacity(raw.len());
    for cell in raw {
        let Some(parts) = cell.as_array() else {
            return Err(args.type_error(index, "an array of cells"));
        };
        let Some(text) = parts.first().and_then(Value::as_str) else {
            return Err(args.type_error(index, "an array of cells"));
        };
        let hl_id = parts.get(1).and_then(Value::as_u64);
        let repeat = parts.get(2).and_then(Value::as_u64).map(|r| r as usize);
        cells.push(CellRun::new(text, hl_id, repeat));
    }
    Ok(cells)
}

fn decode_attrs(args: &Args<'_>, index: usize) -> Result<HighlightAttrs, DecodeError> {
    match args.value(index) {
        Some(v @ Value::Object(_)) => {
            serde_json::from_value(v.clone()).map_err(|e| DecodeError::Attributes {
                event: args.event,
                message: e.to_string(),
            })
        }
        _ => Err(args.type_error(index, "a map")),
    }
}

fn decode_info(args: &Args<'_>, index: usize) -> Vec<HighlightInfo> {
    let Some(entries) = args.value(index).and_then(Value::as_array) else {
        return Vec::new();
    };
    entries
        .iter()
        .filter_map(|e| serde_json::from_value(e.clone()).ok())
        .collect()
}

/// Decode one argument tuple of event `name`.
///
/// Returns `Ok(None)` for events that are known but not rendered.
fn decode_tuple(name: &str, tuple: &Value) -> Result<Option<RedrawEvent>, DecodeError> {
    let event = match name {
        "grid_line" => {
            let a = Args::new("grid_line", tuple, 4)?;
            RedrawEvent::GridLine {
                grid: a.id(0)?,
                row: a.uint(1)?,
                col_start: a.int(2)?,
                cells: decode_cells(&a, 3)?,
            }
        }
        "grid_scroll" => {
            let a = Args::new("grid_scroll", tuple, 6)?;
            RedrawEvent::GridScroll {
                grid: a.id(0)?,
                top: a.uint(1)?,
                bottom: a.uint(2)?,
                left: a.uint(3)?,
                right: a.uint(4)?,
                rows: a.int(5)?,
            }
        }
        "grid_resize" => {
            let a = Args::new("grid_resize", tuple, 3)?;
            RedrawEvent::GridResize {
                grid: a.id(0)?,
                cols: a.uint(1)?,
                rows: a.uint(2)?,
            }
        }
        "grid_clear" => RedrawEvent::GridClear {
            grid: Args::new("grid_clear", tuple, 1)?.id(0)?,
        },
        "grid_destroy" => RedrawEvent::GridDestroy {
            grid: Args::new("grid_destroy", tuple, 1)?.id(0)?,
        },
        "grid_cursor_goto" => {
            let a = Args::new("grid_cursor_goto", tuple, 3)?;
            RedrawEvent::GridCursorGoto {
                grid: a.id(0)?,
                row: a.uint(1)?,
                col: a.uint(2)?,
            }
        }
        "hl_attr_define" => {
            let a = Args::new("hl_attr_define", tuple, 2)?;
            RedrawEvent::HlAttrDefine {
                id: a.id(0)?,
                attrs: decode_attrs(&a, 1)?,
                info: decode_info(&a, 3),
            }
        }
        "default_colors_set" => {
            let a = Args::new("default_colors_set", tuple, 3)?;
            RedrawEvent::DefaultColorsSet {
                fg: a.color(0)?,
                bg: a.color(1)?,
                sp: a.color(2)?,
            }
        }
        "hl_group_set" => {
            let a = Args::new("hl_group_set", tuple, 2)?;
            RedrawEvent::HlGroupSet {
                name: a.string(0)?.to_string(),
                id: a.id(1)?,
            }
        }
        "win_pos" => {
            // [grid, win, start_row, start_col, width, height]
            let a = Args::new("win_pos", tuple, 6)?;
            RedrawEvent::WinPos {
                grid: a.id(0)?,
                row: a.uint(2)?,
                col: a.uint(3)?,
                width: a.uint(4)?,
                height: a.uint(5)?,
            }
        }
        "win_float_pos" => {
            // [grid, win, anchor, anchor_grid, anchor_row, anchor_col, focusable, zindex]
            let a = Args::new("win_float_pos", tuple, 6)?;
            let anchor = FloatAnchor::parse(a.string(2)?).ok_or_else(|| a.type_error(2, "an anchor"))?;
            RedrawEvent::WinFloatPos {
                grid: a.id(0)?,
                anchor,
                anchor_grid: a.id(3)?,
                anchor_row: a.float(4)?,
                anchor_col: a.float(5)?,
                zindex: a.value(7).and_then(Value::as_i64),
            }
        }
        "win_external_pos" => RedrawEvent::WinExternalPos {
            grid: Args::new("win_external_pos", tuple, 1)?.id(0)?,
        },
        "win_hide" => RedrawEvent::WinHide {
            grid: Args::new("win_hide", tuple, 1)?.id(0)?,
        },
        "win_viewport" => {
            // [grid, win, topline, botline, curline, curcol, ...]
            let a = Args::new("win_viewport", tuple, 4)?;
            RedrawEvent::WinViewport {
                grid: a.id(0)?,
                topline: a.int(2)?,
                botline: a.int(3)?,
            }
        }
        "msg_set_pos" => {
            let a = Args::new("msg_set_pos", tuple, 2)?;
            RedrawEvent::MsgSetPos {
                grid: a.id(0)?,
                row: a.uint(1)?,
                scrolled: a.value(2).is_some() && a.boolean(2)?,
            }
        }
        "option_set" => {
            let a = Args::new("option_set", tuple, 2)?;
            RedrawEvent::OptionSet {
                name: a.string(0)?.to_string(),
                value: OptionValue::from_value(&a.items[1]),
            }
        }
        "flush" => RedrawEvent::Flush,
        _ => return Ok(None),
    };
    Ok(Some(event))
}

fn is_known(name: &str) -> bool {
    matches!(
        name,
        "grid_line"
            | "grid_scroll"
            | "grid_resize"
            | "grid_clear"
            | "grid_destroy"
            | "grid_cursor_goto"
            | "hl_attr_define"
            | "default_colors_set"
            | "hl_group_set"
            | "win_pos"
            | "win_float_pos"
            | "win_external_pos"
            | "win_hide"
            | "win_viewport"
            | "msg_set_pos"
            | "option_set"
            | "flush"
    )
}

/// Decode a whole redraw batch. Never fails: anything undecodable is
/// logged and dropped.
pub fn decode_batch(batch: &Value) -> Vec<RedrawEvent> {
    let Some(updates) = batch.as_array() else {
        log::warn!("Redraw batch is not an array");
        return Vec::new();
    };

    let mut events = Vec::new();
    for update in updates {
        let Some((name, tuples)) = update
            .as_array()
            .and_then(|u| u.split_first())
            .and_then(|(name, rest)| Some((name.as_str()?, rest)))
        else {
            log::debug!("Skipping malformed redraw update: {}", update);
            continue;
        };
        if !is_known(name) {
            log::debug!("Skipping unhandled redraw event '{}'", name);
            continue;
        }
        // `flush` carries an empty tuple, or none at all.
        if name == "flush" {
            events.push(RedrawEvent::Flush);
            continue;
        }
        for tuple in tuples {
            match decode_tuple(name, tuple) {
                Ok(Some(event)) => events.push(event),
                Ok(None) => {}
                Err(e) => log::warn!("Skipping malformed arguments: {}", e),
            }
        }
    }
    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_grid_line_cells() {
        let batch = json!([["grid_line", [2, 0, 1, [["a", 5, 3], ["b"], [" ", 0]], false]]]);
        let events = decode_batch(&batch);
        assert_eq!(
            events,
            vec![RedrawEvent::GridLine {
                grid: 2,
                row: 0,
                col_start: 1,
                cells: vec![
                    CellRun::new("a", Some(5), Some(3)),
                    CellRun::new("b", None, None),
                    CellRun::new(" ", Some(0), None),
                ],
            }]
        );
    }

    #[test]
    fn test_malformed_tuple_skips_only_itself() {
        let batch = json!([["grid_resize", [2, "wide", 3], [3, 10, 4]]]);
        let events = decode_batch(&batch);
        assert_eq!(events, vec![RedrawEvent::GridResize { grid: 3, cols: 10, rows: 4 }]);
    }

    #[test]
    fn test_unknown_event_is_skipped() {
        let batch = json!([["mode_change", ["normal", 0]], ["some_future_event", [1]], ["flush", []]]);
        assert_eq!(decode_batch(&batch), vec![RedrawEvent::Flush]);
    }

    #[test]
    fn test_default_colors_negative_is_unset() {
        let batch = json!([["default_colors_set", [0xffffff, -1, 0xff0000, 15, 0]]]);
        assert_eq!(
            decode_batch(&batch),
            vec![RedrawEvent::DefaultColorsSet {
                fg: Some(Rgba::WHITE),
                bg: None,
                sp: Some(Rgba::rgb(255, 0, 0)),
            }]
        );
    }

    #[test]
    fn test_option_value_int_from_string() {
        assert_eq!(OptionValue::Str(" 30 ".into()).as_int(), Some(30));
        assert_eq!(OptionValue::Bool(true).as_int(), None);
    }
}
