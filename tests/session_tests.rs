//! Redraw events applied through a `Session`, from grid creation to the
//! composed surface.

mod common;

use common::*;
use gridpaint::events::RedrawEvent;
use gridpaint::replay::{self, Replayer};
use gridpaint::cli::ReplayOptions;
use gridpaint_config::{RenderConfig, Rgba};
use gridpaint_render::{BASE_GRID, CursorPos};
use serde_json::json;
use std::io::Cursor;
use std::time::Instant;

fn base_grid(cols: usize, rows: usize) -> serde_json::Value {
    json!([["grid_resize", [1, cols, rows]], ["flush", []]])
}

#[test]
fn test_grid_resize_creates_shown_window() {
    let mut r = replayer();
    run(&mut r, base_grid(10, 3));

    let session = r.session();
    assert_eq!(session.grids(), vec![BASE_GRID]);
    let window = session.window(BASE_GRID).expect("base grid");
    assert_eq!(window.size(), (10, 3));
    assert!(window.flags().is_shown);
    assert!(window.image().is_some(), "the first flush paints the whole grid");
}

#[test]
fn test_grid_line_paints_glyphs() {
    let mut r = replayer();
    run(
        &mut r,
        json!([
            ["grid_resize", [1, 10, 3]],
            ["grid_line", [1, 1, 2, [["x", 0]]]],
            ["flush", []],
        ]),
    );
    let session = r.session();
    let bg = session.theme().background;

    // Cell (row 1, col 2) starts at (12, 11); its glyph box spans x 13..17, y 13..19.
    assert_ne!(window_pixel(session, 1, 14, 15), bg);
    assert_eq!(window_pixel(session, 1, 14, 12), bg);
    assert_eq!(window_pixel(session, 1, 8, 15), bg);
}

#[test]
fn test_redefined_highlight_rebinds_on_flush() {
    let mut r = replayer();
    run(
        &mut r,
        json!([
            ["hl_attr_define", [2, {"background": 0xC80000}, {}, []]],
            ["grid_resize", [1, 10, 3]],
            ["grid_line", [1, 0, 0, [["a", 2], ["b"]]]],
            ["flush", []],
        ]),
    );
    let before = window_pixel(r.session(), 1, 3, 1);
    assert!(before.r > before.g, "cell background is red: {before:?}");

    run(
        &mut r,
        json!([["hl_attr_define", [2, {"background": 0x00C800}, {}, []]], ["flush", []]]),
    );
    let after = window_pixel(r.session(), 1, 3, 1);
    assert!(after.g > after.r, "cell follows the new definition: {after:?}");
}

#[test]
fn test_highlight_info_is_kept() {
    let session = session();
    let presenter = RecordingPresenter::default();
    apply(
        &session,
        json!([[
            "hl_attr_define",
            [7, {"foreground": 0x00FF00}, {}, [{"kind": "syntax", "hi_name": "LineNr"}]]
        ]]),
        &presenter,
    );
    let highlight = session.highlights().get(7);
    assert_eq!(highlight.hi_name, "LineNr");
    assert_eq!(highlight.foreground, Some(Rgba::rgb(0, 255, 0)));
    assert!(highlight.is_sign_column());
}

#[test]
fn test_default_colors_set_updates_every_grid() {
    let mut r = replayer();
    run(&mut r, base_grid(10, 3));
    run(
        &mut r,
        json!([["default_colors_set", [0xEEEEEE, 0x102030, -1, 0, 0]], ["flush", []]]),
    );

    let session = r.session();
    let theme = session.theme();
    assert_eq!(theme.background, Rgba::from_u24(0x102030));
    assert_eq!(theme.foreground, Rgba::from_u24(0xEEEEEE));
    assert_eq!(theme.special, RenderConfig::default().theme.special, "-1 keeps the color");

    let window = session.window(BASE_GRID).expect("base grid");
    assert_eq!(window.read_content(|g| g.base_bg()), Rgba::from_u24(0x102030));
    let p = window_pixel(session, BASE_GRID, 30, 20);
    assert_eq!((p.r, p.g, p.b), (0x10, 0x20, 0x30));
}

#[test]
fn test_float_position_from_anchor() {
    let mut r = replayer();
    run(
        &mut r,
        json!([
            ["grid_resize", [1, 20, 10], [2, 4, 2], [3, 4, 2]],
            ["win_float_pos", [2, 1000, "NW", 1, 3.0, 5.0, true, 60]],
            ["win_float_pos", [3, 1001, "SE", 1, 1.0, 1.0, true]],
            ["flush", []],
        ]),
    );
    let session = r.session();

    let float = session.window(2).expect("float");
    assert_eq!(float.position(), (5, 3));
    assert!(float.flags().is_float);
    assert!(!float.flags().is_external);

    // Anchored above and left of the origin: clamped into the grid.
    assert_eq!(session.window(3).expect("float").position(), (0, 0));

    // Default z-index 50 stacks below 60.
    assert_eq!(stacking(session), vec![1, 3, 2]);
}

#[test]
fn test_stacking_order_by_class() {
    let mut r = replayer();
    run(
        &mut r,
        json!([
            ["grid_resize", [4, 20, 1], [2, 4, 2], [1, 20, 10], [5, 10, 5]],
            ["msg_set_pos", [4, 9, false, ""]],
            ["win_float_pos", [2, 1000, "NW", 1, 0.0, 0.0, true, 10]],
            ["win_pos", [5, 1001, 0, 0, 10, 5]],
            ["flush", []],
        ]),
    );
    let session = r.session();
    assert_eq!(stacking(session), vec![1, 5, 2, 4]);
    assert!(session.window(4).expect("msg grid").flags().is_msg_grid);
    assert_eq!(session.window(4).expect("msg grid").position(), (0, 9));

    run(&mut r, json!([["win_hide", [2]]]));
    assert_eq!(stacking(r.session()), vec![1, 5, 4]);
}

#[test]
fn test_raise_orders_equal_zindex() {
    let mut r = replayer();
    run(
        &mut r,
        json!([
            ["grid_resize", [1, 20, 10], [2, 4, 2], [3, 4, 2]],
            ["win_float_pos", [2, 1000, "NW", 1, 0.0, 0.0, true], [3, 1001, "NW", 1, 2.0, 2.0, true]],
        ]),
    );
    assert_eq!(stacking(r.session()), vec![1, 2, 3]);

    run(&mut r, json!([["win_float_pos", [2, 1000, "NW", 1, 0.0, 0.0, true]]]));
    assert_eq!(stacking(r.session()), vec![1, 3, 2]);
}

#[test]
fn test_grid_line_raises_float_it_switches_to() {
    let mut r = replayer();
    run(
        &mut r,
        json!([
            ["grid_resize", [1, 20, 10], [2, 4, 2], [3, 4, 2]],
            ["win_float_pos", [2, 1000, "NW", 1, 0.0, 0.0, true], [3, 1001, "NW", 1, 2.0, 2.0, true]],
        ]),
    );
    assert_eq!(stacking(r.session()), vec![1, 2, 3]);

    run(&mut r, json!([["grid_line", [2, 0, 0, [["a", 0]]]]]));
    assert_eq!(stacking(r.session()), vec![1, 3, 2]);

    // Repeated lines to the same float and lines to the base grid keep the order.
    run(
        &mut r,
        json!([["grid_line", [2, 1, 0, [["b", 0]]]], ["grid_line", [1, 0, 0, [["c", 0]]]]]),
    );
    assert_eq!(stacking(r.session()), vec![1, 3, 2]);

    run(&mut r, json!([["grid_line", [3, 0, 0, [["d", 0]]]]]));
    assert_eq!(stacking(r.session()), vec![1, 2, 3]);
}

#[test]
fn test_grid_destroy_repaints_other_floats() {
    let session = session();
    let presenter = RecordingPresenter::default();
    apply(
        &session,
        json!([
            ["grid_resize", [1, 20, 10], [2, 4, 2], [3, 4, 2]],
            ["win_float_pos", [2, 1000, "NW", 1, 0.0, 0.0, true], [3, 1001, "NW", 1, 4.0, 4.0, true]],
            ["flush", []],
        ]),
        &presenter,
    );
    assert!(!presenter.rects.lock().is_empty());

    apply(&session, json!([["grid_destroy", [3]]]), &presenter);
    assert_eq!(session.grids(), vec![1, 2]);
    assert!(session.window(3).is_none());

    let flushed = session.flush(&presenter);
    assert!(flushed.iter().any(|(grid, _)| *grid == 2), "surviving float repaints");
    assert!(flushed.iter().all(|(grid, _)| *grid != 1), "base grid is left alone");
}

#[test]
fn test_events_for_unknown_grid_are_ignored() {
    let session = session();
    let presenter = RecordingPresenter::default();
    apply(
        &session,
        json!([
            ["grid_line", [9, 0, 0, [["a", 0]]]],
            ["grid_scroll", [9, 0, 2, 0, 4, 1]],
            ["grid_clear", [9]],
            ["win_hide", [9]],
            ["flush", []],
        ]),
        &presenter,
    );
    assert!(session.grids().is_empty());
    assert!(presenter.rects.lock().is_empty());
}

#[test]
fn test_grid_scroll_moves_content() {
    let mut r = replayer();
    run(
        &mut r,
        json!([
            ["grid_resize", [2, 6, 3]],
            ["grid_line", [2, 1, 0, [["a", 0]]], [2, 2, 0, [["b", 0]]]],
            ["grid_scroll", [2, 0, 3, 0, 6, 1]],
            ["flush", []],
        ]),
    );
    let window = r.session().window(2).expect("grid");
    let first = window.read_content(|g| g.cell(0, 0).map(|c| c.text.clone()));
    let second = window.read_content(|g| g.cell(1, 0).map(|c| c.text.clone()));
    assert_eq!(first.as_deref(), Some("a"));
    assert_eq!(second.as_deref(), Some("b"));
}

#[test]
fn test_grid_clear_empties_cells() {
    let mut r = replayer();
    run(
        &mut r,
        json!([
            ["grid_resize", [2, 6, 2]],
            ["grid_line", [2, 0, 0, [["a", 0]]]],
            ["grid_clear", [2]],
            ["flush", []],
        ]),
    );
    let window = r.session().window(2).expect("grid");
    assert!(window.read_content(|g| g.cell(0, 0).is_none()));
}

#[test]
fn test_cursor_goto_feeds_context() {
    let session = session();
    let presenter = RecordingPresenter::default();
    apply(
        &session,
        json!([["grid_resize", [2, 10, 5]], ["grid_cursor_goto", [2, 3, 4]]]),
        &presenter,
    );
    assert_eq!(session.context().cursor, CursorPos { grid: 2, row: 3, col: 4 });
}

#[test]
fn test_option_set() {
    let session = session();
    let presenter = RecordingPresenter::default();
    apply(
        &session,
        json!([["option_set", ["pumblend", 150], ["tabstop", 4], ["showtabline", 2]]]),
        &presenter,
    );
    let ctx = session.context();
    assert_eq!(ctx.pumblend, 100);
    assert_eq!(ctx.tabstop, 4);
    assert_eq!(ctx.showtabline, 2);

    apply(&session, json!([["option_set", ["tabstop", 0]]]), &presenter);
    assert_eq!(session.context().tabstop, 4, "a zero tabstop is ignored");
}

#[test]
fn test_compose_draws_float_shadow() {
    let mut config = RenderConfig::default();
    config.editor.draw_shadow_for_float_window = true;
    let mut r = Replayer::new(session_with_config(config));
    run(
        &mut r,
        json!([
            ["grid_resize", [1, 20, 10], [2, 4, 2]],
            ["win_float_pos", [2, 1000, "NW", 1, 3.0, 5.0, true]],
            ["flush", []],
        ]),
    );
    let session = r.session();
    let bg = session.theme().background;

    let canvas = session.compose().expect("compose");
    assert_eq!(canvas.logical_size(), (120.0, 110.0));
    // The float sits at (30, 33); its shadow darkens the pixel just left of it.
    let shadow = canvas_pixel(&canvas, 29, 40);
    assert!(shadow.r < bg.r, "shadow darkens the base: {shadow:?}");
    assert_eq!(canvas_pixel(&canvas, 10, 90), bg);
}

#[test]
fn test_compose_without_shadow() {
    let mut r = replayer();
    run(
        &mut r,
        json!([
            ["grid_resize", [1, 20, 10], [2, 4, 2]],
            ["win_float_pos", [2, 1000, "NW", 1, 3.0, 5.0, true]],
            ["flush", []],
        ]),
    );
    let session = r.session();
    let canvas = session.compose().expect("compose");
    assert_eq!(canvas_pixel(&canvas, 29, 40), session.theme().background);
}

#[test]
fn test_compose_needs_base_grid() {
    assert!(session().compose().is_err());
}

#[test]
fn test_msg_grid_sits_at_bottom() {
    let mut r = replayer();
    run(
        &mut r,
        json!([
            ["grid_resize", [1, 10, 5], [4, 10, 1]],
            ["msg_set_pos", [4, 0, false, ""]],
            ["grid_line", [4, 0, 0, [["m", 0]]]],
            ["flush", []],
        ]),
    );
    let session = r.session();
    let bg = session.theme().background;
    let canvas = session.compose().expect("compose");
    // 5 rows of 11 pixels; the one-row message grid starts at y 44.
    assert_ne!(canvas_pixel(&canvas, 2, 48), bg);
    assert_eq!(canvas_pixel(&canvas, 2, 4), bg);
}

#[test]
fn test_touchpad_scroll_unknown_grid() {
    let session = session();
    assert!(session.touchpad_scroll(3, 5, 0).is_none());
}

#[test]
fn test_touchpad_scroll_reports_steps() {
    let session = session();
    let presenter = RecordingPresenter::default();
    apply(&session, json!([["grid_resize", [2, 10, 5]]]), &presenter);

    let step = session.touchpad_scroll(2, 4, 0).expect("grid exists");
    assert!(step.is_empty());
    let step = session.touchpad_scroll(2, 7, 0).expect("grid exists");
    assert!(!step.is_empty(), "11 accumulated pixels make one line");
}

#[test]
fn test_replay_stream_counts_batches() {
    let mut r = replayer();
    let stream = "[[\"grid_resize\",[1,10,3]]]\n\n[[\"grid_line\",[1,0,0,[[\"a\",0]]]],[\"flush\",[]]]\n";
    r.apply_stream(Cursor::new(stream)).expect("valid stream");

    let stats = r.stats();
    assert_eq!(stats.batches, 2);
    assert_eq!(stats.events, 3);
    assert!(stats.paints > 0);
}

#[test]
fn test_replay_rejects_invalid_json() {
    let mut r = replayer();
    let err = r.apply_stream(Cursor::new("[[\"flush\"]]\nnot json\n")).unwrap_err();
    assert!(format!("{err:#}").contains("Line 2"));
}

#[test]
fn test_replay_writes_png() {
    let dir = tempfile::tempdir().expect("temp dir");
    let input = dir.path().join("stream.ndjson");
    let output = dir.path().join("out.png");
    std::fs::write(
        &input,
        "[[\"grid_line\",[1,0,0,[[\"h\",0],[\"i\",0]]]],[\"flush\",[]]]\n",
    )
    .expect("write stream");

    let options = ReplayOptions {
        input,
        output: output.clone(),
        font: None,
        font_size: 10.0,
        base_size: Some((8, 2)),
        dpr: 1.0,
    };
    let stats = replay::run(&options, RenderConfig::default()).expect("replay");
    assert_eq!(stats.batches, 2);

    let image = image::open(&output).expect("png").to_rgba8();
    assert_eq!(image.dimensions(), (48, 22));
}

#[test]
fn test_apply_typed_events() {
    let session = session();
    let presenter = RecordingPresenter::default();
    let now = Instant::now();
    session.apply(&RedrawEvent::GridResize { grid: 2, cols: 3, rows: 1 }, now, &presenter);
    session.apply(&RedrawEvent::WinHide { grid: 2 }, now, &presenter);
    assert!(!session.window(2).expect("grid").flags().is_shown);
    session.apply(&RedrawEvent::Flush, now, &presenter);
    assert!(!presenter.rects.lock().is_empty());
}
