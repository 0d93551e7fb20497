//! Single-purpose pixel transforms over opaque RGBA8 frames.

use crate::effects::composite::crossfade;
use crate::foundation::core::Canvas;
use crate::foundation::math::hash_u32;

/// Paper grain opacity.
pub const PAPER_OPACITY: f32 = 0.08;
/// Chromatic channel offset at export scale.
pub const CHROMATIC_OFFSET_PX: f32 = 6.0;

/// Invert RGB, keep alpha.
pub fn invert_rgb(frame: &mut [u8]) {
    for px in frame.chunks_exact_mut(4) {
        px[0] = 255 - px[0];
        px[1] = 255 - px[1];
        px[2] = 255 - px[2];
    }
}

/// Blend deterministic grayscale grain keyed by `seed` over the frame.
pub fn paper_grain(frame: &mut [u8], canvas: Canvas, seed: u64) {
    let w = canvas.width.max(1);
    for (i, px) in frame.chunks_exact_mut(4).enumerate() {
        let x = (i as u32) % w;
        let y = (i as u32) / w;
        let v = (hash_u32(seed, x, y) & 0xFF) as u8;
        let out = crossfade([px[0], px[1], px[2], px[3]], [v, v, v, 255], PAPER_OPACITY);
        px.copy_from_slice(&out);
    }
}

/// Shift red left and blue right by `offset` pixels, wrapping at the row ends.
pub fn chromatic_shift(frame: &mut [u8], canvas: Canvas, offset: u32) {
    let w = canvas.width as usize;
    if w == 0 || offset == 0 {
        return;
    }
    let off = offset as usize % w;
    let row_bytes = w * 4;
    let mut row = vec![0u8; row_bytes];
    for out in frame.chunks_exact_mut(row_bytes) {
        row.copy_from_slice(out);
        for x in 0..w {
            let red_from = (x + off) % w;
            let blue_from = (x + w - off) % w;
            out[x * 4] = row[red_from * 4];
            out[x * 4 + 2] = row[blue_from * 4 + 2];
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/stages.rs"]
mod tests;
