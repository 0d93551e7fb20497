//! Camera framing: which part of the page ends up on the canvas.

use crate::foundation::core::{Canvas, Point, Rect};
use crate::foundation::error::{AnimatorError, AnimatorResult};
use image::imageops::FilterType;

const ZOOM_WIDTHS: f64 = 4.0;
const MIN_HEIGHT_RATIO: f64 = 1.5;
const FALLBACK_HEIGHTS: f64 = 2.0;
const PAPER_WHITE: image::Rgba<u8> = image::Rgba([255, 255, 255, 255]);

/// Longest view edge in page pixels; larger views shrink about their center, keeping the aspect.
pub const MAX_VIEW_EDGE: f64 = 65_536.0;

/// Integer page region mapped onto the output canvas.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Framing {
    /// Top-left corner of the view in page pixels.
    pub origin: (i64, i64),
    /// View width in page pixels.
    pub view_width: u32,
    /// View height in page pixels.
    pub view_height: u32,
    /// Output canvas.
    pub canvas: Canvas,
}

impl Framing {
    /// Frame `focus` for `canvas`: four word widths wide, widened to at least two word heights tall
    /// when the aspect would leave the word cramped.
    pub fn around(focus: Rect, canvas: Canvas) -> Self {
        let aspect = canvas.aspect();
        let word_w = focus.width().max(1.0);
        let word_h = focus.height().max(1.0);

        let mut view_w = word_w * ZOOM_WIDTHS;
        let mut view_h = view_w / aspect;
        if view_h < word_h * MIN_HEIGHT_RATIO {
            view_h = word_h * FALLBACK_HEIGHTS;
            view_w = view_h * aspect;
        }
        let longest = view_w.max(view_h);
        if longest > MAX_VIEW_EDGE {
            let k = MAX_VIEW_EDGE / longest;
            view_w *= k;
            view_h *= k;
        }

        let center: Point = focus.center();
        let view_width = view_w.round().max(1.0) as u32;
        let view_height = view_h.round().max(1.0) as u32;
        let origin = (
            (center.x - f64::from(view_width) / 2.0).round() as i64,
            (center.y - f64::from(view_height) / 2.0).round() as i64,
        );
        Self {
            origin,
            view_width,
            view_height,
            canvas,
        }
    }

    fn scale(&self) -> (f64, f64) {
        (
            f64::from(self.canvas.width) / f64::from(self.view_width),
            f64::from(self.canvas.height) / f64::from(self.view_height),
        )
    }

    /// Page rect to canvas rect.
    pub fn map_rect(&self, r: Rect) -> Rect {
        let (sx, sy) = self.scale();
        let ox = self.origin.0 as f64;
        let oy = self.origin.1 as f64;
        Rect::new(
            (r.x0 - ox) * sx,
            (r.y0 - oy) * sy,
            (r.x1 - ox) * sx,
            (r.y1 - oy) * sy,
        )
    }

    /// Cut the view out of `page` (outside is paper white) and resample it to the canvas.
    ///
    /// Only the part of the view that overlaps the page is resampled, so the work is bounded by the
    /// page and the canvas rather than by the view.
    pub fn extract(&self, page: &image::RgbaImage) -> AnimatorResult<image::RgbaImage> {
        let (cw, ch) = (self.canvas.width, self.canvas.height);
        if cw == 0 || ch == 0 {
            return Err(AnimatorError::evaluation("framing canvas must be non-empty"));
        }
        let mut out = image::RgbaImage::from_pixel(cw, ch, PAPER_WHITE);

        let (ox, oy) = self.origin;
        let x0 = ox.max(0);
        let y0 = oy.max(0);
        let x1 = (ox + i64::from(self.view_width)).min(i64::from(page.width()));
        let y1 = (oy + i64::from(self.view_height)).min(i64::from(page.height()));
        if x1 <= x0 || y1 <= y0 {
            return Ok(out);
        }

        let (sx, sy) = self.scale();
        let (dx0, dx1) = dest_span((x0 - ox) as f64 * sx, (x1 - ox) as f64 * sx, cw);
        let (dy0, dy1) = dest_span((y0 - oy) as f64 * sy, (y1 - oy) as f64 * sy, ch);

        let crop = image::imageops::crop_imm(
            page,
            x0 as u32,
            y0 as u32,
            (x1 - x0) as u32,
            (y1 - y0) as u32,
        )
        .to_image();
        let mut patch = image::imageops::resize(&crop, dx1 - dx0, dy1 - dy0, FilterType::CatmullRom);
        for px in patch.pixels_mut() {
            px.0[3] = 255;
        }
        image::imageops::replace(&mut out, &patch, i64::from(dx0), i64::from(dy0));
        Ok(out)
    }
}

/// Round a mapped span onto `0..limit`, keeping at least one pixel.
fn dest_span(a: f64, b: f64, limit: u32) -> (u32, u32) {
    let lim = f64::from(limit);
    let start = a.round().clamp(0.0, lim - 1.0) as u32;
    let end = (b.round().clamp(0.0, lim) as u32).max(start + 1);
    (start, end)
}

#[cfg(test)]
#[path = "../../tests/unit/effects/framing.rs"]
mod tests;
