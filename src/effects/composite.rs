//! Per-pixel blending on RGBA8 buffers.
//!
//! Pipeline frames are opaque, so straight and premultiplied RGBA coincide for them. Overlay layers
//! (highlight pixmaps) arrive premultiplied.

use crate::foundation::error::{AnimatorError, AnimatorResult};
use crate::foundation::math::mul_div255_u8;

/// Premultiplied RGBA8 pixel.
pub type PremulRgba8 = [u8; 4];

/// Source-over with an extra opacity factor.
pub fn over(dst: PremulRgba8, src: PremulRgba8, opacity: f32) -> PremulRgba8 {
    let opacity = opacity.clamp(0.0, 1.0);
    if opacity <= 0.0 || src[3] == 0 {
        return dst;
    }

    let op = ((opacity * 255.0).round() as i32).clamp(0, 255) as u16;
    let sa = mul_div255_u8(u16::from(src[3]), op);
    if sa == 0 {
        return dst;
    }
    let inv = 255u16 - u16::from(sa);

    let mut out = [0u8; 4];
    out[3] = sa.saturating_add(mul_div255_u8(u16::from(dst[3]), inv));
    for i in 0..3 {
        let sc = mul_div255_u8(u16::from(src[i]), op);
        let dc = mul_div255_u8(u16::from(dst[i]), inv);
        out[i] = sc.saturating_add(dc);
    }
    out
}

/// Linear mix, `t = 0` is `a` and `t = 1` is `b`.
pub fn crossfade(a: PremulRgba8, b: PremulRgba8, t: f32) -> PremulRgba8 {
    let t = t.clamp(0.0, 1.0);
    let tt = ((t * 255.0).round() as i32).clamp(0, 255) as u16;
    let it = 255u16 - tt;

    let mut out = [0u8; 4];
    for i in 0..4 {
        let av = mul_div255_u8(u16::from(a[i]), it);
        let bv = mul_div255_u8(u16::from(b[i]), tt);
        out[i] = av.saturating_add(bv);
    }
    out
}

/// Composite a premultiplied layer over `dst` in place.
pub fn over_in_place(dst: &mut [u8], src: &[u8], opacity: f32) -> AnimatorResult<()> {
    check_lengths(dst.len(), src.len(), "over_in_place")?;
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let out = over([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]], opacity);
        d.copy_from_slice(&out);
    }
    Ok(())
}

/// Per-pixel mix of `dst` towards `other`, weight from `mask(pixel_index)`.
pub fn mix_in_place(
    dst: &mut [u8],
    other: &[u8],
    mut mask: impl FnMut(usize) -> f32,
) -> AnimatorResult<()> {
    check_lengths(dst.len(), other.len(), "mix_in_place")?;
    for (i, (d, o)) in dst.chunks_exact_mut(4).zip(other.chunks_exact(4)).enumerate() {
        if *d == *o {
            continue;
        }
        let out = crossfade([d[0], d[1], d[2], d[3]], [o[0], o[1], o[2], o[3]], mask(i));
        d.copy_from_slice(&out);
    }
    Ok(())
}

fn check_lengths(a: usize, b: usize, what: &str) -> AnimatorResult<()> {
    if a != b || !a.is_multiple_of(4) {
        return Err(AnimatorError::evaluation(format!(
            "{what} expects equal-length rgba8 buffers"
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/effects/composite.rs"]
mod tests;
