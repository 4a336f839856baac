//! Time-interpolated scroll offsets and touchpad pixel accumulation.
//!
//! The animator owns no timer. The hosting event loop calls `tick` from its
//! own timer and gets back the offset to paint with; starting a new
//! animation simply replaces the running one.

use std::time::{Duration, Instant};

/// Ease-out exponential progress for `t` in `[0, 1]`.
pub fn out_expo(t: f32) -> f32 {
    if t >= 1.0 {
        1.0
    } else if t <= 0.0 {
        0.0
    } else {
        1.0 - 2f32.powf(-10.0 * t)
    }
}

/// Pixel offset for `diff` lines at control value `value`.
pub fn scroll_offset(diff: i32, value: f32, line_height: i32) -> i32 {
    (diff as f32 * value * line_height as f32) as i32
}

/// One step of a running animation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollFrame {
    /// Control value, 1.0 at the start and 0.0 at the end.
    pub value: f32,
    /// Vertical pixel offset to paint content with.
    pub offset: i32,
    /// The offset reached zero; the animation is over.
    pub finished: bool,
}

#[derive(Debug, Clone, Copy)]
struct Running {
    start: Instant,
    diff: i32,
}

#[derive(Debug, Clone)]
pub struct ScrollAnimator {
    duration: Duration,
    running: Option<Running>,
}

impl ScrollAnimator {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration: duration.max(Duration::from_millis(1)),
            running: None,
        }
    }

    /// Start animating `diff` lines, replacing any running animation.
    pub fn start(&mut self, diff: i32, now: Instant) {
        if diff == 0 {
            self.running = None;
            return;
        }
        self.running = Some(Running { start: now, diff });
    }

    pub fn is_animating(&self) -> bool {
        self.running.is_some()
    }

    pub fn diff(&self) -> Option<i32> {
        self.running.map(|r| r.diff)
    }

    /// Advance to `now`. Returns `None` when no animation is running.
    ///
    /// The frame whose offset truncates to zero is reported as finished and
    /// ends the animation.
    pub fn tick(&mut self, now: Instant, line_height: i32) -> Option<ScrollFrame> {
        let running = self.running?;
        let elapsed = now.saturating_duration_since(running.start);
        let t = elapsed.as_secs_f32() / self.duration.as_secs_f32();
        let value = 1.0 - out_expo(t);
        let offset = scroll_offset(running.diff, value, line_height);
        let finished = offset == 0;
        if finished {
            self.running = None;
        }
        Some(ScrollFrame {
            value,
            offset,
            finished,
        })
    }
}

/// Whole-cell steps produced by accumulated touchpad deltas.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TouchpadStep {
    pub vertical: i32,
    pub horizontal: i32,
}

impl TouchpadStep {
    pub fn is_empty(&self) -> bool {
        self.vertical == 0 && self.horizontal == 0
    }
}

/// Pixel deltas accumulated per axis until they reach a full cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TouchpadScroll {
    pixels: [i32; 2],
}

impl TouchpadScroll {
    pub fn horizontal_pixels(&self) -> i32 {
        self.pixels[0]
    }

    pub fn vertical_pixels(&self) -> i32 {
        self.pixels[1]
    }

    pub fn is_active(&self) -> bool {
        self.pixels[1] != 0
    }

    /// Add a delta. A step is reported once the accumulated value reaches
    /// a cell; reaching it exactly counts.
    ///
    /// With `reversing` the vertical direction is inverted.
    pub fn accumulate(&mut self, v: i32, h: i32, reversing: bool, cell_width: f32, line_height: i32) -> TouchpadStep {
        let v = if reversing { -v } else { v };
        let lh = line_height.max(1);

        if h < 0 && self.pixels[0] > 0 {
            self.pixels[0] = 0;
        }
        if (self.pixels[0].abs() as f32) < cell_width {
            self.pixels[0] += h;
        }
        if self.pixels[1].abs() < lh {
            self.pixels[1] += v;
        }

        let mut step = TouchpadStep::default();
        if self.pixels[0].abs() as f32 >= cell_width && cell_width > 0.0 {
            step.horizontal = (self.pixels[0] as f32 / cell_width) as i32;
        }
        if self.pixels[1].abs() >= lh {
            step.vertical = self.pixels[1] / lh;
        }
        step
    }

    /// Clear an axis once a paint has consumed its full-cell offset.
    pub fn reset_after_paint(&mut self, cell_width: f32, line_height: i32) {
        if self.pixels[0].abs() as f32 >= cell_width {
            self.pixels[0] = 0;
        }
        if self.pixels[1].abs() >= line_height {
            self.pixels[1] = 0;
        }
    }

    /// Content moved under the offset; drop the vertical remainder.
    pub fn clear_vertical(&mut self) {
        self.pixels[1] = 0;
    }

    pub fn stop(&mut self) {
        self.pixels = [0, 0];
    }
}
