//! Headless replay of a recorded redraw stream.
//!
//! The input holds one redraw batch per line, each a JSON array of
//! msgpack-shaped event tuples. Every batch is decoded, applied to a
//! [`Session`], and the damage it flushes is painted straight away. Once the
//! stream ends, running scroll animations are driven to completion and the
//! composed surface is written out as a PNG.

use crate::cli::ReplayOptions;
use crate::events::{RedrawEvent, decode_batch};
use crate::session::Session;
use anyhow::{Context, Result};
use gridpaint_config::RenderConfig;
use gridpaint_fonts::{BlockRasterizer, FontData, Rasterizer, SwashRasterizer};
use gridpaint_render::{BASE_GRID, GridId, PaintOutcome, PixelRect, Presenter};
use parking_lot::Mutex;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Collects invalidated regions until the next paint pass.
#[derive(Debug, Default)]
pub struct CollectingPresenter {
    pending: Mutex<Vec<(GridId, PixelRect)>>,
}

impl CollectingPresenter {
    pub fn take(&self) -> Vec<(GridId, PixelRect)> {
        std::mem::take(&mut *self.pending.lock())
    }
}

impl Presenter for CollectingPresenter {
    fn invalidate(&self, grid: GridId, rect: PixelRect) {
        self.pending.lock().push((grid, rect));
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplayStats {
    pub batches: usize,
    pub events: usize,
    pub paints: usize,
}

/// Build the session font: the font file when one is given, block glyphs
/// otherwise.
pub fn load_font(options: &ReplayOptions, config: &RenderConfig) -> Result<Arc<dyn Rasterizer>> {
    let letter_space = config.editor.letter_space;
    match &options.font {
        Some(path) => {
            let data = FontData::from_path(path).with_context(|| format!("Failed to load font {}", path.display()))?;
            let rasterizer = SwashRasterizer::new(data, options.font_size, 0, letter_space)
                .with_context(|| format!("Failed to prepare font {}", path.display()))?;
            Ok(Arc::new(rasterizer))
        }
        None => Ok(Arc::new(BlockRasterizer::new(options.font_size, 0, letter_space))),
    }
}

/// Drives a session from a redraw stream.
pub struct Replayer {
    session: Session,
    presenter: CollectingPresenter,
    stats: ReplayStats,
}

impl Replayer {
    pub fn new(session: Session) -> Self {
        Self {
            session,
            presenter: CollectingPresenter::default(),
            stats: ReplayStats::default(),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn stats(&self) -> ReplayStats {
        self.stats
    }

    /// Apply one batch and paint what it invalidated.
    pub fn apply_batch(&mut self, events: &[RedrawEvent], now: Instant) {
        self.stats.batches += 1;
        self.stats.events += events.len();
        self.session.apply_all(events, now, &self.presenter);
        self.paint_pending();
    }

    /// Decode and apply every line of `reader`. Blank lines are skipped.
    pub fn apply_stream(&mut self, reader: impl BufRead) -> Result<()> {
        for (index, line) in reader.lines().enumerate() {
            let line = line.with_context(|| format!("Failed to read line {}", index + 1))?;
            if line.trim().is_empty() {
                continue;
            }
            let value: serde_json::Value =
                serde_json::from_str(&line).with_context(|| format!("Line {} is not valid JSON", index + 1))?;
            let events = decode_batch(&value);
            self.apply_batch(&events, Instant::now());
        }
        Ok(())
    }

    /// Run scroll animations to their end, as if their duration had passed.
    pub fn settle(&mut self) {
        let duration = Duration::from_millis(self.session.config().editor.smooth_scroll_duration_ms);
        let end = Instant::now() + duration + Duration::from_millis(1);
        self.session.tick(end, &self.presenter);
        self.paint_pending();
    }

    fn paint_pending(&mut self) {
        for (grid, rect) in self.presenter.take() {
            match self.session.paint(grid, rect) {
                PaintOutcome::Painted => self.stats.paints += 1,
                PaintOutcome::Deferred => log::debug!("Paint of grid {} deferred", grid),
            }
        }
    }
}

/// Replay `options.input` and write the composed surface to `options.output`.
pub fn run(options: &ReplayOptions, config: RenderConfig) -> Result<ReplayStats> {
    let font = load_font(options, &config)?;
    let session = Session::new(Arc::new(config), font, options.dpr);
    let mut replayer = Replayer::new(session);

    if let Some((cols, rows)) = options.base_size {
        let resize = RedrawEvent::GridResize {
            grid: BASE_GRID,
            cols,
            rows,
        };
        replayer.apply_batch(&[resize, RedrawEvent::Flush], Instant::now());
    }

    let file = File::open(&options.input).with_context(|| format!("Failed to open {}", options.input.display()))?;
    replayer.apply_stream(BufReader::new(file))?;
    replayer.settle();

    let canvas = replayer.session().compose().context("Failed to compose the surface")?;
    canvas
        .save_png(&options.output)
        .with_context(|| format!("Failed to write {}", options.output.display()))?;

    let stats = replayer.stats();
    log::info!(
        "Replayed {} batches ({} events, {} paints) into {}",
        stats.batches,
        stats.events,
        stats.paints,
        options.output.display()
    );
    Ok(stats)
}
