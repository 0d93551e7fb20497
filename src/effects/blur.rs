use crate::foundation::error::{AnimatorError, AnimatorResult};
use rayon::prelude::*;

/// Separable gaussian blur of an RGBA8 buffer. `sigma <= 0` returns the input unchanged.
pub fn gaussian_blur_rgba8(src: &[u8], width: u32, height: u32, sigma: f32) -> AnimatorResult<Vec<u8>> {
    check_len(src, width, height)?;
    let radius = gaussian_radius(sigma);
    if radius == 0 {
        return Ok(src.to_vec());
    }

    let kernel = gaussian_kernel_q16(radius, sigma)?;
    let mut tmp = vec![0u8; src.len()];
    let mut out = vec![0u8; src.len()];
    horizontal_pass(src, &mut tmp, width, height, &kernel);
    vertical_pass(&tmp, &mut out, width, height, &kernel);
    Ok(out)
}

/// Box blur along the vertical axis over `length` rows, anchored at `length / 2`.
pub fn vertical_blur_rgba8(src: &[u8], width: u32, height: u32, length: u32) -> AnimatorResult<Vec<u8>> {
    check_len(src, width, height)?;
    if length <= 1 {
        return Ok(src.to_vec());
    }

    let kernel = box_kernel_q16(length);
    let mut out = vec![0u8; src.len()];
    vertical_pass(src, &mut out, width, height, &kernel);
    Ok(out)
}

/// Gaussian blur weighted by distance from the center: the middle stays sharp.
///
/// Weight is `clamp((d / d_max - 0.2) * 3, 0, 1)` with `d_max` the center-to-corner distance.
pub fn radial_blur_rgba8(src: &[u8], width: u32, height: u32, sigma: f32) -> AnimatorResult<Vec<u8>> {
    let blurred = gaussian_blur_rgba8(src, width, height, sigma)?;
    let mut out = src.to_vec();
    let w = width.max(1) as usize;
    let cx = f64::from(width) / 2.0;
    let cy = f64::from(height) / 2.0;
    let max_d = (cx * cx + cy * cy).sqrt().max(f64::EPSILON);
    super::composite::mix_in_place(&mut out, &blurred, |i| {
        let dx = (i % w) as f64 + 0.5 - cx;
        let dy = (i / w) as f64 + 0.5 - cy;
        let d = (dx * dx + dy * dy).sqrt() / max_d;
        ((d - 0.2) * 3.0).clamp(0.0, 1.0) as f32
    })?;
    Ok(out)
}

fn gaussian_radius(sigma: f32) -> u32 {
    if !sigma.is_finite() || sigma <= 0.0 {
        return 0;
    }
    (sigma * 3.0).ceil() as u32
}

fn check_len(src: &[u8], width: u32, height: u32) -> AnimatorResult<()> {
    let expected_len = (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(4))
        .ok_or_else(|| AnimatorError::evaluation("blur buffer size overflow"))?;
    if src.len() != expected_len {
        return Err(AnimatorError::evaluation(
            "blur expects src matching width*height*4",
        ));
    }
    Ok(())
}

fn gaussian_kernel_q16(radius: u32, sigma: f32) -> AnimatorResult<Vec<u32>> {
    if radius == 0 {
        return Ok(vec![1 << 16]);
    }
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(AnimatorError::invalid_config("blur sigma must be > 0"));
    }

    let r = radius as i32;
    let sigma = f64::from(sigma);
    let denom = 2.0 * sigma * sigma;
    let weights_f: Vec<f64> = (-r..=r)
        .map(|i| {
            let x = f64::from(i);
            (-x * x / denom).exp()
        })
        .collect();
    let sum: f64 = weights_f.iter().sum();
    if sum <= 0.0 {
        return Err(AnimatorError::evaluation("gaussian kernel sum is zero"));
    }

    Ok(normalize_q16(weights_f.iter().map(|w| w / sum)))
}

fn box_kernel_q16(taps: u32) -> Vec<u32> {
    let w = 1.0 / f64::from(taps);
    normalize_q16((0..taps).map(|_| w))
}

// Quantize to q16 and push the rounding remainder into the center tap so weights sum to 1.0.
fn normalize_q16(weights: impl Iterator<Item = f64>) -> Vec<u32> {
    let mut out = Vec::new();
    let mut acc: i64 = 0;
    for wf in weights {
        let q = ((wf * 65536.0).round() as i64).clamp(0, 65536);
        out.push(q as u32);
        acc += q;
    }
    let delta = 65536 - acc;
    if delta != 0 && !out.is_empty() {
        let mid = out.len() / 2;
        out[mid] = (i64::from(out[mid]) + delta).clamp(0, 65536) as u32;
    }
    out
}

fn horizontal_pass(src: &[u8], dst: &mut [u8], width: u32, _height: u32, k: &[u32]) {
    let radius = (k.len() / 2) as i32;
    let w = width as i32;
    let row_bytes = width as usize * 4;
    dst.par_chunks_exact_mut(row_bytes)
        .zip(src.par_chunks_exact(row_bytes))
        .for_each(|(out_row, in_row)| {
            for x in 0..w {
                let mut acc = [0u64; 4];
                for (ki, &kw) in k.iter().enumerate() {
                    let sx = (x + ki as i32 - radius).clamp(0, w - 1);
                    let idx = sx as usize * 4;
                    for c in 0..4 {
                        acc[c] += u64::from(kw) * u64::from(in_row[idx + c]);
                    }
                }
                let o = x as usize * 4;
                for c in 0..4 {
                    out_row[o + c] = q16_to_u8(acc[c]);
                }
            }
        });
}

fn vertical_pass(src: &[u8], dst: &mut [u8], width: u32, height: u32, k: &[u32]) {
    let radius = (k.len() / 2) as i32;
    let w = width as usize;
    let h = height as i32;
    let row_bytes = w * 4;
    dst.par_chunks_exact_mut(row_bytes)
        .enumerate()
        .for_each(|(y, out_row)| {
            for x in 0..w {
                let mut acc = [0u64; 4];
                for (ki, &kw) in k.iter().enumerate() {
                    let sy = (y as i32 + ki as i32 - radius).clamp(0, h - 1) as usize;
                    let idx = (sy * w + x) * 4;
                    for c in 0..4 {
                        acc[c] += u64::from(kw) * u64::from(src[idx + c]);
                    }
                }
                let o = x * 4;
                for c in 0..4 {
                    out_row[o + c] = q16_to_u8(acc[c]);
                }
            }
        });
}

fn q16_to_u8(acc: u64) -> u8 {
    let v = (acc + 32768) >> 16;
    v.min(255) as u8
}

#[cfg(test)]
#[path = "../../tests/unit/effects/blur.rs"]
mod tests;
