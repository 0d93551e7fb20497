use crate::effects::composite::over_in_place;
use crate::foundation::core::{Canvas, Rect};
use crate::foundation::error::{AnimatorError, AnimatorResult};
use vello_cpu::kurbo::Shape;

/// Extra padding per side, as a fraction of the unscaled word box, once the box is enlarged.
const ENLARGED_PADDING: f64 = 0.15;
const CORNER_RADIUS_PX: f64 = 8.0;
const CURRENT_ALPHA: u8 = 90;
const PREVIOUS_ALPHA: u8 = 50;

/// Highlighter look for one theme.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HighlightStyle {
    /// Marker RGB.
    pub rgb: [u8; 3],
    /// Alpha of the most recently revealed word.
    pub current_alpha: u8,
    /// Alpha of earlier revealed words.
    pub previous_alpha: u8,
    /// Corner radius in canvas pixels.
    pub corner_radius: f64,
}

impl HighlightStyle {
    /// Yellow marker on light pages, blue on inverted ones.
    pub fn for_theme(dark_theme: bool, pixel_scale: f32) -> Self {
        Self {
            rgb: if dark_theme { [0, 0, 255] } else { [255, 255, 0] },
            current_alpha: CURRENT_ALPHA,
            previous_alpha: PREVIOUS_ALPHA,
            corner_radius: CORNER_RADIUS_PX * f64::from(pixel_scale),
        }
    }
}

/// Scale a word box about its center; boxes enlarged beyond 1.0 get extra padding on each side
/// proportional to the word itself.
pub fn highlight_box(word: Rect, size: f32) -> Rect {
    let m = f64::from(size);
    let mut w = word.width() * m;
    let mut h = word.height() * m;
    if m > 1.0 {
        w += 2.0 * ENLARGED_PADDING * word.width();
        h += 2.0 * ENLARGED_PADDING * word.height();
    }
    Rect::from_center_size(word.center(), (w, h))
}

/// Draw rounded highlighter boxes over an opaque RGBA8 frame.
pub fn draw_highlights(
    frame: &mut [u8],
    canvas: Canvas,
    current: &[Rect],
    previous: &[Rect],
    style: HighlightStyle,
) -> AnimatorResult<()> {
    if current.is_empty() && previous.is_empty() {
        return Ok(());
    }
    let width: u16 = canvas
        .width
        .try_into()
        .map_err(|_| AnimatorError::evaluation("canvas width exceeds u16"))?;
    let height: u16 = canvas
        .height
        .try_into()
        .map_err(|_| AnimatorError::evaluation("canvas height exceeds u16"))?;

    let mut pixmap = vello_cpu::Pixmap::new(width, height);
    pixmap.data_as_u8_slice_mut().fill(0);

    let mut ctx = vello_cpu::RenderContext::new(width, height);
    ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
    let [r, g, b] = style.rgb;
    for (rects, alpha) in [(previous, style.previous_alpha), (current, style.current_alpha)] {
        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(r, g, b, alpha));
        for rect in rects {
            let rr = vello_cpu::kurbo::RoundedRect::new(
                rect.x0,
                rect.y0,
                rect.x1,
                rect.y1,
                style.corner_radius,
            );
            ctx.fill_path(&rr.to_path(0.1));
        }
    }
    ctx.flush();
    ctx.render_to_pixmap(&mut pixmap);

    over_in_place(frame, pixmap.data_as_u8_slice(), 1.0)
}

#[cfg(test)]
#[path = "../../tests/unit/effects/highlight.rs"]
mod tests;
