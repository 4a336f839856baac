//! An RGBA pixel surface addressed in logical pixels.
//!
//! Every drawing call takes logical coordinates and scales them by the
//! device pixel ratio. An optional clip rectangle (logical) limits all
//! drawing, the way a paint event clips to its update region.

use crate::error::RenderError;
use crate::geometry::{PixelRect, RectF};
use crate::glyph_cache::GlyphBitmap;
use gridpaint_config::{FillPattern, Rgba};
use gridpaint_fonts::GlyphMask;
use image::{Rgba as Pixel, RgbaImage};
use std::path::Path;

/// Direction a gradient fades along, from full `start_alpha` at the named
/// edge to `end_alpha` at the opposite one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GradientAxis {
    /// Opaque at the right edge, fading leftward.
    FromRight,
    /// Opaque at the bottom edge, fading upward.
    FromBottom,
}

/// Device-pixel bounds `[x0, x1) x [y0, y1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct DeviceRect {
    x0: i64,
    y0: i64,
    x1: i64,
    y1: i64,
}

impl DeviceRect {
    fn intersect(self, other: DeviceRect) -> Option<DeviceRect> {
        let r = DeviceRect {
            x0: self.x0.max(other.x0),
            y0: self.y0.max(other.y0),
            x1: self.x1.min(other.x1),
            y1: self.y1.min(other.y1),
        };
        (r.x1 > r.x0 && r.y1 > r.y0).then_some(r)
    }
}

#[derive(Debug, Clone)]
pub struct PixelCanvas {
    image: RgbaImage,
    dpr: f32,
    clip: Option<PixelRect>,
}

/// Source-over blend of `src` with coverage `alpha` (0..=255) onto `dst`.
fn blend(dst: &mut Pixel<u8>, src: Rgba, alpha: u8) {
    let sa = (src.a as u32 * alpha as u32) / 255;
    if sa == 0 {
        return;
    }
    if sa == 255 {
        *dst = Pixel([src.r, src.g, src.b, 255]);
        return;
    }
    let da = dst.0[3] as u32;
    let out_a = sa + da * (255 - sa) / 255;
    if out_a == 0 {
        *dst = Pixel([0, 0, 0, 0]);
        return;
    }
    let channel = |s: u8, d: u8| -> u8 {
        let num = s as u32 * sa + d as u32 * da * (255 - sa) / 255;
        (num / out_a).min(255) as u8
    };
    *dst = Pixel([
        channel(src.r, dst.0[0]),
        channel(src.g, dst.0[1]),
        channel(src.b, dst.0[2]),
        out_a as u8,
    ]);
}

impl PixelCanvas {
    /// A transparent canvas of `width x height` logical pixels.
    pub fn new(width: f32, height: f32, dpr: f32) -> Result<Self, RenderError> {
        let dpr = if dpr.is_finite() && dpr > 0.0 { dpr } else { 1.0 };
        let w = (width * dpr).ceil();
        let h = (height * dpr).ceil();
        if !(w >= 1.0 && h >= 1.0 && w <= u32::MAX as f32 && h <= u32::MAX as f32) {
            return Err(RenderError::InvalidSurfaceSize {
                width: w.max(0.0) as u32,
                height: h.max(0.0) as u32,
            });
        }
        Ok(Self {
            image: RgbaImage::new(w as u32, h as u32),
            dpr,
            clip: None,
        })
    }

    pub fn dpr(&self) -> f32 {
        self.dpr
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    /// Size in logical pixels.
    pub fn logical_size(&self) -> (f32, f32) {
        (
            self.image.width() as f32 / self.dpr,
            self.image.height() as f32 / self.dpr,
        )
    }

    /// Whether a canvas created with these arguments would have this one's
    /// device size.
    pub fn has_size(&self, width: f32, height: f32, dpr: f32) -> bool {
        self.dpr == dpr
            && self.image.width() == (width * dpr).ceil() as u32
            && self.image.height() == (height * dpr).ceil() as u32
    }

    pub fn set_clip(&mut self, clip: Option<PixelRect>) {
        self.clip = clip;
    }

    /// Pixel at device coordinates, for inspection.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        (x < self.image.width() && y < self.image.height()).then(|| {
            let p = self.image.get_pixel(x, y).0;
            Rgba::new(p[0], p[1], p[2], p[3])
        })
    }

    fn bounds(&self) -> DeviceRect {
        let full = DeviceRect {
            x0: 0,
            y0: 0,
            x1: self.image.width() as i64,
            y1: self.image.height() as i64,
        };
        match self.clip {
            Some(clip) => full
                .intersect(self.to_device(clip.to_f()))
                .unwrap_or(DeviceRect { x0: 0, y0: 0, x1: 0, y1: 0 }),
            None => full,
        }
    }

    fn to_device(&self, rect: RectF) -> DeviceRect {
        DeviceRect {
            x0: (rect.x * self.dpr).round() as i64,
            y0: (rect.y * self.dpr).round() as i64,
            x1: ((rect.x + rect.width) * self.dpr).round() as i64,
            y1: ((rect.y + rect.height) * self.dpr).round() as i64,
        }
    }

    fn visible(&self, rect: RectF) -> Option<DeviceRect> {
        self.to_device(rect).intersect(self.bounds())
    }

    /// Replace pixels in `rect` with `color`, without blending.
    pub fn erase(&mut self, rect: RectF, color: Rgba) {
        let Some(r) = self.visible(rect) else {
            return;
        };
        let px = Pixel(color.as_array());
        for y in r.y0..r.y1 {
            for x in r.x0..r.x1 {
                self.image.put_pixel(x as u32, y as u32, px);
            }
        }
    }

    /// Erase the whole canvas, ignoring the clip.
    pub fn erase_all(&mut self, color: Rgba) {
        let px = Pixel(color.as_array());
        self.image.pixels_mut().for_each(|p| *p = px);
    }

    /// Blend `color` over `rect` wherever `pattern` covers the device pixel.
    pub fn fill_rect(&mut self, rect: RectF, color: Rgba, pattern: FillPattern) {
        let Some(r) = self.visible(rect) else {
            return;
        };
        for y in r.y0..r.y1 {
            for x in r.x0..r.x1 {
                if pattern.covers(x as u32, y as u32) {
                    blend(self.image.get_pixel_mut(x as u32, y as u32), color, 255);
                }
            }
        }
    }

    /// Fill `rect` with `color` whose alpha ramps linearly across the rect.
    pub fn fill_gradient(&mut self, rect: RectF, color: Rgba, axis: GradientAxis, start_alpha: u8, end_alpha: u8) {
        let Some(r) = self.visible(rect) else {
            return;
        };
        let full = self.to_device(rect);
        let span = match axis {
            GradientAxis::FromRight => (full.x1 - full.x0).max(1),
            GradientAxis::FromBottom => (full.y1 - full.y0).max(1),
        } as f32;
        for y in r.y0..r.y1 {
            for x in r.x0..r.x1 {
                let distance = match axis {
                    GradientAxis::FromRight => full.x1 - 1 - x,
                    GradientAxis::FromBottom => full.y1 - 1 - y,
                } as f32;
                let t = (distance / span).clamp(0.0, 1.0);
                let alpha = start_alpha as f32 + (end_alpha as f32 - start_alpha as f32) * t;
                blend(
                    self.image.get_pixel_mut(x as u32, y as u32),
                    color.with_alpha(alpha.round() as u8),
                    255,
                );
            }
        }
    }

    /// Blend a coverage mask in `color`. `(x, y)` is the logical baseline
    /// origin of the run the mask belongs to.
    pub fn draw_mask(&mut self, x: f32, baseline: f32, mask: &GlyphMask, color: Rgba) {
        let ox = (x * self.dpr).round() as i64 + mask.left as i64;
        let oy = (baseline * self.dpr).round() as i64 - mask.top as i64;
        let target = DeviceRect {
            x0: ox,
            y0: oy,
            x1: ox + mask.width as i64,
            y1: oy + mask.height as i64,
        };
        let Some(r) = target.intersect(self.bounds()) else {
            return;
        };
        for y in r.y0..r.y1 {
            for x in r.x0..r.x1 {
                let coverage = mask.coverage_at((x - ox) as u32, (y - oy) as u32);
                if coverage > 0 {
                    blend(self.image.get_pixel_mut(x as u32, y as u32), color, coverage);
                }
            }
        }
    }

    /// Blend `bitmap` with its top-left corner at logical `(x, y)`.
    pub fn draw_bitmap(&mut self, x: f32, y: f32, bitmap: &GlyphBitmap) {
        self.draw_image(x, y, &bitmap.image);
    }

    /// Blend a device-resolution image with its top-left at logical `(x, y)`.
    pub fn draw_image(&mut self, x: f32, y: f32, image: &RgbaImage) {
        let ox = (x * self.dpr).round() as i64;
        let oy = (y * self.dpr).round() as i64;
        let target = DeviceRect {
            x0: ox,
            y0: oy,
            x1: ox + image.width() as i64,
            y1: oy + image.height() as i64,
        };
        let Some(r) = target.intersect(self.bounds()) else {
            return;
        };
        for y in r.y0..r.y1 {
            for x in r.x0..r.x1 {
                let src = image.get_pixel((x - ox) as u32, (y - oy) as u32).0;
                if src[3] > 0 {
                    blend(
                        self.image.get_pixel_mut(x as u32, y as u32),
                        Rgba::new(src[0], src[1], src[2], src[3]),
                        255,
                    );
                }
            }
        }
    }

    /// Stroke a polyline one device pixel wide.
    pub fn stroke_polyline(&mut self, points: &[(f32, f32)], color: Rgba) {
        let bounds = self.bounds();
        for pair in points.windows(2) {
            let (x0, y0) = (pair[0].0 * self.dpr, pair[0].1 * self.dpr);
            let (x1, y1) = (pair[1].0 * self.dpr, pair[1].1 * self.dpr);
            let steps = (x1 - x0).abs().max((y1 - y0).abs()).ceil().max(1.0) as i32;
            for i in 0..=steps {
                let t = i as f32 / steps as f32;
                let px = (x0 + (x1 - x0) * t).floor() as i64;
                let py = (y0 + (y1 - y0) * t).floor() as i64;
                if px >= bounds.x0 && px < bounds.x1 && py >= bounds.y0 && py < bounds.y1 {
                    blend(self.image.get_pixel_mut(px as u32, py as u32), color, 255);
                }
            }
        }
    }

    /// A copy of the current pixels.
    pub fn snapshot(&self) -> RgbaImage {
        self.image.clone()
    }

    pub fn save_png(&self, path: &Path) -> Result<(), RenderError> {
        self.image.save(path).map_err(|source| RenderError::ImageSave {
            path: path.display().to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_empty_surface() {
        assert!(matches!(
            PixelCanvas::new(0.0, 10.0, 1.0),
            Err(RenderError::InvalidSurfaceSize { .. })
        ));
        let canvas = PixelCanvas::new(10.0, 5.0, 2.0).unwrap();
        assert_eq!(canvas.image().dimensions(), (20, 10));
        assert_eq!(canvas.logical_size(), (10.0, 5.0));
    }

    #[test]
    fn test_fill_respects_clip() {
        let mut canvas = PixelCanvas::new(10.0, 10.0, 1.0).unwrap();
        canvas.set_clip(Some(PixelRect::new(0, 0, 5, 10)));
        canvas.fill_rect(RectF::new(0.0, 0.0, 10.0, 10.0), Rgba::rgb(255, 0, 0), FillPattern::Solid);
        assert_eq!(canvas.pixel(4, 4), Some(Rgba::rgb(255, 0, 0)));
        assert_eq!(canvas.pixel(5, 4), Some(Rgba::TRANSPARENT));
    }

    #[test]
    fn test_blend_over_opaque() {
        let mut canvas = PixelCanvas::new(2.0, 2.0, 1.0).unwrap();
        canvas.erase_all(Rgba::rgb(0, 0, 0));
        canvas.fill_rect(
            RectF::new(0.0, 0.0, 1.0, 1.0),
            Rgba::new(255, 255, 255, 128),
            FillPattern::Solid,
        );
        let p = canvas.pixel(0, 0).unwrap();
        assert_eq!(p.a, 255);
        assert!((127..=129).contains(&p.r));
    }

    #[test]
    fn test_gradient_fades() {
        let mut canvas = PixelCanvas::new(6.0, 1.0, 1.0).unwrap();
        canvas.fill_gradient(
            RectF::new(0.0, 0.0, 6.0, 1.0),
            Rgba::WHITE,
            GradientAxis::FromRight,
            125,
            0,
        );
        assert_eq!(canvas.pixel(5, 0).unwrap().a, 125);
        assert!(canvas.pixel(0, 0).unwrap().a < canvas.pixel(4, 0).unwrap().a);
    }

    #[test]
    fn test_draw_mask_positions_on_baseline() {
        let mut canvas = PixelCanvas::new(10.0, 10.0, 1.0).unwrap();
        let mask = GlyphMask {
            left: 1,
            top: 3,
            width: 2,
            height: 3,
            coverage: vec![255; 6],
        };
        canvas.draw_mask(2.0, 8.0, &mask, Rgba::rgb(0, 0, 255));
        assert_eq!(canvas.pixel(3, 5), Some(Rgba::rgb(0, 0, 255)));
        assert_eq!(canvas.pixel(4, 7), Some(Rgba::rgb(0, 0, 255)));
        assert_eq!(canvas.pixel(3, 8), Some(Rgba::TRANSPARENT));
    }

    #[test]
    fn test_save_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("surface.png");
        let canvas = PixelCanvas::new(4.0, 4.0, 1.0).unwrap();
        canvas.save_png(&path).unwrap();
        assert!(path.exists());
    }
}
