//! Integration tests for `Window`: event application, flush and paint.

mod common;

use common::{Fixture, GREEN, HL_DIFF_CHANGE, HL_PLAIN, HL_RED_BG, HL_UNDERLINE, RED, RecordingPresenter, pixel, row_text};
use gridpaint_config::FillPattern;
use gridpaint_fonts::Rasterizer;
use gridpaint_render::{CellRun, GlyphKey, Highlight, ScrollRegion, Window, WindowFlags};
use std::sync::Arc;
use std::time::{Duration, Instant};

#[test]
fn test_run_with_repeat_on_blank_grid() {
    let fx = Fixture::new();
    let window = fx.window(2, 10, 5);
    for row in 0..5 {
        fx.with_env(|env| window.apply_line(row, 0, &[CellRun::new(" ", Some(0), Some(10))], env));
    }
    fx.with_env(|env| window.apply_line(0, 0, &[CellRun::new("a", Some(1), Some(3))], env));

    window.read_content(|grid| {
        for col in 0..3 {
            let cell = grid.cell(0, col).unwrap();
            assert_eq!(cell.text, "a");
            assert_eq!(cell.highlight.id, 1);
        }
        assert_eq!(grid.cell(0, 3).unwrap().text, " ");
        assert_eq!(grid.len_content(0), 3);
    });
}

#[test]
fn test_full_width_scroll_moves_rows_up() {
    let fx = Fixture::new();
    let window = fx.window(2, 10, 5);
    for row in 0..5 {
        fx.write_window(&window, row, 0, &row.to_string(), HL_PLAIN);
    }
    let region = ScrollRegion::from_exclusive(0, 5, 0, 10).unwrap();
    window.scroll(region, 2);

    window.read_content(|grid| {
        assert_eq!(row_text(grid, 0), "2.........");
        assert_eq!(row_text(grid, 1), "3.........");
        assert_eq!(row_text(grid, 2), "4.........");
        assert_eq!(row_text(grid, 3), "..........");
        assert_eq!(row_text(grid, 4), "..........");
    });
}

#[test]
fn test_sub_region_scroll_keeps_outside_cells() {
    let fx = Fixture::new();
    let window = fx.window(2, 6, 4);
    for row in 0..4 {
        fx.write_window(&window, row, 0, &format!("{row}{row}{row}{row}{row}{row}"), HL_PLAIN);
    }
    let region = ScrollRegion::from_exclusive(1, 4, 2, 4).unwrap();
    window.scroll(region, 1);

    window.read_content(|grid| {
        assert_eq!(row_text(grid, 0), "000000");
        assert_eq!(row_text(grid, 1), "112211");
        assert_eq!(row_text(grid, 2), "223322");
        assert_eq!(row_text(grid, 3), "33..33");
    });
}

#[test]
fn test_paint_fills_background_and_glyphs() {
    let fx = Fixture::new();
    let window = fx.window(2, 10, 3);
    fx.write_window(&window, 1, 2, "ab", HL_RED_BG);
    let rects = fx.flush_and_paint(&window);
    assert!(!rects.is_empty());

    // Cell (row 1, col 2) spans x 12..18 and y 11..22.
    assert_eq!(pixel(&window, 12, 11), RED);
    let glyph = pixel(&window, 14, 14);
    assert_ne!(glyph, RED);
    assert_eq!(glyph.a, 255);
    assert_eq!(pixel(&window, 0, 0), fx.background());
    assert_eq!(pixel(&window, 0, 12), fx.background());
}

#[test]
fn test_repaint_reuses_cached_bitmap() {
    let fx = Fixture::new();
    let window = fx.window(2, 10, 2);
    fx.write_window(&window, 0, 0, "ab", HL_PLAIN);
    fx.flush_and_paint(&window);

    let key = GlyphKey::Text {
        text: "ab".into(),
        fg: fx.ctx.theme.foreground,
        italic: false,
        bold: false,
        dpr_bits: 1.0f32.to_bits(),
    };
    let first = fx.cache.lock().get(&key).cloned().expect("run was cached");

    fx.write_window(&window, 0, 0, "ab", HL_PLAIN);
    fx.flush_and_paint(&window);
    let second = fx.cache.lock().get(&key).cloned().unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    let cache = fx.cache.lock();
    assert!(cache.len() <= cache.capacity());
}

#[test]
fn test_uncached_drawing_matches_cached() {
    let cached = Fixture::new();
    let mut direct = Fixture::new();
    direct.config_mut().editor.cached_drawing = false;

    let paint = |fx: &Fixture| {
        let window = fx.window(2, 12, 2);
        fx.write_window(&window, 0, 0, "ab cd", HL_PLAIN);
        fx.write_window(&window, 1, 3, "xy", HL_UNDERLINE);
        fx.flush_and_paint(&window);
        window.image().unwrap()
    };

    assert_eq!(paint(&cached), paint(&direct));
    assert!(direct.cache.lock().is_empty());
}

#[test]
fn test_underline_uses_special_color() {
    let fx = Fixture::new();
    let window = fx.window(2, 4, 1);
    fx.write_window(&window, 0, 0, "a", HL_UNDERLINE);
    fx.flush_and_paint(&window);
    assert_eq!(pixel(&window, 0, 10), GREEN);
    assert_eq!(pixel(&window, 5, 10), GREEN);
    assert_eq!(pixel(&window, 6, 10), fx.background());
}

#[test]
fn test_diff_pattern_fill() {
    let mut fx = Fixture::new();
    fx.config_mut().editor.diff_change_pattern = FillPattern::Cross;
    let window = fx.window(2, 4, 1);
    fx.write_window(&window, 0, 0, "  ", HL_DIFF_CHANGE);
    fx.flush_and_paint(&window);

    assert_ne!(pixel(&window, 0, 1), fx.background());
    assert_eq!(pixel(&window, 1, 1), fx.background());
}

#[test]
fn test_blended_float_is_translucent() {
    let mut fx = Fixture::new();
    fx.table.define(
        9,
        Highlight {
            blend: 30,
            ..Default::default()
        },
    );
    let window = fx.window(3, 4, 1);
    window.update_flags(|f| f.is_float = true);
    fx.write_window(&window, 0, 0, "a", 9);
    assert_eq!(window.winblend(), 30);

    fx.flush_and_paint(&window);
    // Unwritten cells are painted in the default background at 70% opacity.
    assert_eq!(pixel(&window, 20, 5).a, 178);
}

#[test]
fn test_resize_keeps_content_except_on_base_grid() {
    let fx = Fixture::new();
    let float = fx.window(4, 5, 2);
    let base = fx.window(1, 5, 2);
    for window in [&float, &base] {
        fx.write_window(window, 0, 0, "hello", HL_PLAIN);
        window.resize(3, 3);
    }
    float.read_content(|grid| assert_eq!(row_text(grid, 0), "hel"));
    base.read_content(|grid| {
        assert_eq!(row_text(grid, 0), "...");
        assert_eq!(grid.rows(), 3);
    });
}

#[test]
fn test_flush_reports_each_rect_to_presenter() {
    let fx = Fixture::new();
    let window = fx.window(7, 10, 3);
    fx.flush_and_paint(&window);

    fx.write_window(&window, 2, 4, "x", HL_PLAIN);
    let presenter = RecordingPresenter::default();
    let rects = window.flush(&fx.ctx, fx.font.metrics(), &presenter);
    assert!(!rects.is_empty());
    let seen = presenter.rects.lock().clone();
    assert_eq!(seen.len(), rects.len());
    assert!(seen.iter().all(|(grid, _)| *grid == 7));
    // Row 2 only: y = 2 * line height.
    assert!(rects.iter().all(|r| r.y == 22 && r.height == 11));
    assert!(window.flush(&fx.ctx, fx.font.metrics(), &presenter).is_empty());
}

#[test]
fn test_smooth_scroll_animation_and_snapshot() {
    let mut fx = Fixture::new();
    fx.config_mut().editor.smooth_scroll = true;
    let window = fx.window(2, 10, 10);
    for row in 0..10 {
        fx.write_window(&window, row, 0, "line", HL_PLAIN);
    }
    fx.flush_and_paint(&window);

    let t0 = Instant::now();
    assert_eq!(window.handle_viewport(0, 10, &fx.ctx, t0), None);
    assert_eq!(window.handle_viewport(3, 13, &fx.ctx, t0), Some(3));
    assert!(window.is_animating());
    assert!(window.has_snapshot());

    let presenter = RecordingPresenter::default();
    let env = fx.paint_env(&[]);
    let frame = window.tick(t0, &env, &presenter).unwrap();
    assert_eq!(frame.offset, 3 * 11);
    assert!(!frame.finished);
    assert_eq!(window.scroll_pixels(), 33);

    let frame = window.tick(t0 + Duration::from_millis(220), &env, &presenter).unwrap();
    assert!(frame.finished);
    assert_eq!(frame.offset, 0);
    assert_eq!(window.scroll_pixels(), 0);
    assert!(!window.is_animating());
    assert!(window.has_snapshot());
    assert_eq!(presenter.rects.lock().len(), 2);
}

#[test]
fn test_viewport_ignored_without_smooth_scroll() {
    let fx = Fixture::new();
    let window = fx.window(2, 10, 10);
    let now = Instant::now();
    assert_eq!(window.handle_viewport(0, 10, &fx.ctx, now), None);
    assert_eq!(window.handle_viewport(2, 12, &fx.ctx, now), None);
    assert!(!window.is_animating());
}

#[test]
fn test_large_jump_accounts_for_wrapped_lines() {
    let mut fx = Fixture::new();
    fx.config_mut().editor.smooth_scroll = true;
    let window = fx.window(2, 10, 6);
    let now = Instant::now();
    window.handle_viewport(0, 6, &fx.ctx, now);
    // Jumping half a screen adds the previous viewport's wrapped rows.
    assert_eq!(window.handle_viewport(3, 9, &fx.ctx, now), Some(4));
}

#[test]
fn test_base_grid_never_animates() {
    let mut fx = Fixture::new();
    fx.config_mut().editor.smooth_scroll = true;
    let window = fx.window(1, 10, 10);
    let now = Instant::now();
    window.handle_viewport(0, 10, &fx.ctx, now);
    assert_eq!(window.handle_viewport(3, 13, &fx.ctx, now), None);
}

#[test]
fn test_touchpad_steps_use_window_metrics() {
    let fx = Fixture::new();
    let window = fx.window(2, 10, 10);
    let metrics = *fx.font.metrics();
    assert!(window.touchpad_scroll(5, 0, &fx.ctx, &metrics).is_empty());
    let step = window.touchpad_scroll(6, 0, &fx.ctx, &metrics);
    assert_eq!(step.vertical, 1);
    window.touchpad_stop();
}

#[test]
fn test_default_flags() {
    let fx = Fixture::new();
    let window: Window = fx.window(5, 1, 1);
    assert_eq!(
        window.flags(),
        WindowFlags {
            is_shown: true,
            ..WindowFlags::default()
        }
    );
}

#[test]
fn test_new_content_drops_touchpad_offset() {
    let fx = Fixture::new();
    let window = fx.window(2, 10, 4);
    for row in 0..4 {
        fx.write_window(&window, row, 0, "abc", HL_PLAIN);
    }
    fx.flush_and_paint(&window);

    let metrics = *fx.font.metrics();
    assert!(window.touchpad_scroll(5, 0, &fx.ctx, &metrics).is_empty());
    let region = ScrollRegion::from_exclusive(0, 4, 0, 10).unwrap();
    window.scroll(region, 1);
    fx.write_window(&window, 3, 0, "xyz", HL_PLAIN);
    fx.flush_and_paint(&window);

    // Row 3 spans y 33..44; its first glyph box covers y 35..41.
    assert_ne!(pixel(&window, 2, 36), fx.background());
    assert_eq!(pixel(&window, 2, 42), fx.background());

    // With the offset gone, an edit repaints its own row only.
    fx.write_window(&window, 3, 4, "q", HL_PLAIN);
    let presenter = RecordingPresenter::default();
    let rects = window.flush(&fx.ctx, &metrics, &presenter);
    assert!(!rects.is_empty());
    assert!(rects.iter().all(|r| r.y == 33 && r.height == 11));
}

#[test]
fn test_cached_bitmaps_are_per_pixel_ratio() {
    let mut fx = Fixture::new();
    let fg = fx.ctx.theme.foreground;
    let key = |dpr: f32| GlyphKey::Text {
        text: "ab".into(),
        fg,
        italic: false,
        bold: false,
        dpr_bits: dpr.to_bits(),
    };
    let (low, high) = (key(1.0), key(2.0));

    let window = fx.window(2, 10, 2);
    fx.write_window(&window, 0, 0, "ab", HL_PLAIN);
    fx.flush_and_paint(&window);

    fx.ctx = fx.ctx.clone().with_dpr(2.0);
    let window = fx.window(3, 10, 2);
    fx.write_window(&window, 0, 0, "ab", HL_PLAIN);
    fx.flush_and_paint(&window);

    let mut cache = fx.cache.lock();
    assert_eq!(cache.get(&low).expect("dpr 1 bitmap").dpr, 1.0);
    assert_eq!(cache.get(&high).expect("dpr 2 bitmap").dpr, 2.0);
}
