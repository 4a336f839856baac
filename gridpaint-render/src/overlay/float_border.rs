//! One pixel frames: the border of external float windows, the line above
//! the message grid, and the drop shadow floats cast when composed.

use crate::canvas::PixelCanvas;
use crate::context::Theme;
use crate::geometry::RectF;
use crate::highlight::HighlightTable;
use gridpaint_config::{FillPattern, Rgba};

/// Highlight group whose foreground colours float window borders.
pub const FLOAT_BORDER_GROUP: &str = "FloatBorder";
/// Highlight group whose foreground colours the message separator.
pub const MSG_SEPARATOR_GROUP: &str = "MsgSeparator";

/// Width of the soft shadow around a float, in logical pixels.
pub const SHADOW_RADIUS: i32 = 8;
const SHADOW_ALPHA: i32 = 64;

/// Frame the whole canvas at alpha 128.
pub fn draw_float_border(canvas: &mut PixelCanvas, highlights: &HighlightTable, theme: &Theme) {
    let color = highlights
        .group(FLOAT_BORDER_GROUP)
        .map(|hl| hl.fg(theme))
        .unwrap_or(theme.foreground)
        .with_alpha(128);
    let (width, height) = canvas.logical_size();
    let edges = [
        RectF::new(0.0, 0.0, 1.0, height),
        RectF::new(0.0, 0.0, width, 1.0),
        RectF::new(width - 1.0, 0.0, 1.0, height),
        RectF::new(0.0, height - 1.0, width, 1.0),
    ];
    for edge in edges {
        canvas.fill_rect(edge, color, FillPattern::Solid);
    }
}

/// Draw the top line of a message grid. Nothing is drawn until the
/// `MsgSeparator` group is known.
pub fn draw_msg_separator(canvas: &mut PixelCanvas, highlights: &HighlightTable, theme: &Theme) {
    let Some(hl) = highlights.group(MSG_SEPARATOR_GROUP) else {
        return;
    };
    let (width, _) = canvas.logical_size();
    canvas.fill_rect(
        RectF::new(0.0, 0.0, width, 1.0),
        hl.fg(theme).with_alpha(200),
        FillPattern::Solid,
    );
}

/// Darken a band of [`SHADOW_RADIUS`] pixels around `rect`, fading outwards.
/// Drawn under the float, so only the band outside it stays visible.
pub fn draw_float_shadow(canvas: &mut PixelCanvas, rect: RectF) {
    for i in 1..=SHADOW_RADIUS {
        let alpha = (SHADOW_ALPHA * (SHADOW_RADIUS + 1 - i) / SHADOW_RADIUS) as u8;
        let color = Rgba::BLACK.with_alpha(alpha);
        let d = i as f32;
        let (x, y) = (rect.x - d, rect.y - d);
        let (w, h) = (rect.width + 2.0 * d, rect.height + 2.0 * d);
        let ring = [
            RectF::new(x, y, w, 1.0),
            RectF::new(x, y + h - 1.0, w, 1.0),
            RectF::new(x, y + 1.0, 1.0, h - 2.0),
            RectF::new(x + w - 1.0, y + 1.0, 1.0, h - 2.0),
        ];
        for edge in ring {
            canvas.fill_rect(edge, color, FillPattern::Solid);
        }
    }
}
