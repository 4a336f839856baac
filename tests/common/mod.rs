//! Shared integration test helpers for gridpaint.
//!
//! Include this module at the top of each test file that needs it:
//!
//! ```ignore
//! mod common;
//! use common::*;
//! ```
//!
//! Sessions here draw with the block rasterizer at size 10, so a cell is
//! 6x11 pixels and a glyph is a box covering columns 1..5 and rows 2..8 of
//! its cell.

#![allow(dead_code)]

use gridpaint::{Replayer, Session, decode_batch};
use gridpaint_config::{RenderConfig, Rgba};
use gridpaint_fonts::BlockRasterizer;
use gridpaint_render::{GridId, PixelCanvas, PixelRect, Presenter};
use parking_lot::Mutex;
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;

pub fn session_with_config(config: RenderConfig) -> Session {
    Session::new(Arc::new(config), Arc::new(BlockRasterizer::new(10.0, 0, 0.0)), 1.0)
}

pub fn session() -> Session {
    session_with_config(RenderConfig::default())
}

pub fn replayer() -> Replayer {
    Replayer::new(session())
}

/// Decode `batch` and apply it, painting whatever it flushed.
pub fn run(replayer: &mut Replayer, batch: Value) {
    let events = decode_batch(&batch);
    replayer.apply_batch(&events, Instant::now());
}

/// Decode `batch` and apply it without painting.
pub fn apply(session: &Session, batch: Value, presenter: &dyn Presenter) {
    session.apply_all(&decode_batch(&batch), Instant::now(), presenter);
}

/// Collects every invalidated rectangle.
#[derive(Default)]
pub struct RecordingPresenter {
    pub rects: Mutex<Vec<(GridId, PixelRect)>>,
}

impl Presenter for RecordingPresenter {
    fn invalidate(&self, grid: GridId, rect: PixelRect) {
        self.rects.lock().push((grid, rect));
    }
}

pub fn window_pixel(session: &Session, grid: GridId, x: u32, y: u32) -> Rgba {
    let window = session.window(grid).expect("grid exists");
    let image = window.image().expect("window was painted");
    let p = image.get_pixel(x, y).0;
    Rgba::new(p[0], p[1], p[2], p[3])
}

pub fn canvas_pixel(canvas: &PixelCanvas, x: u32, y: u32) -> Rgba {
    canvas.pixel(x, y).expect("pixel inside the canvas")
}

pub fn stacking(session: &Session) -> Vec<GridId> {
    session.stacking_order().iter().map(|w| w.grid()).collect()
}
