use crate::audio::cue::DecodedCue;
use crate::foundation::core::Fps;
use crate::foundation::error::{AnimatorError, AnimatorResult};
use crate::timeline::Timeline;
use std::path::Path;
use std::sync::Arc;

/// Export mix sample rate.
pub const MIX_SAMPLE_RATE: u32 = 48_000;
/// Export mix channel count.
pub const MIX_CHANNELS: u16 = 2;

/// One cue contribution in track sample space.
#[derive(Clone, Debug)]
pub(crate) struct AudioSegment {
    pub(crate) timeline_start_sample: u64,
    pub(crate) timeline_end_sample: u64,
    pub(crate) volume: f32,
    pub(crate) source_sample_rate: u32,
    pub(crate) source_channels: u16,
    pub(crate) source_interleaved_f32: Arc<Vec<f32>>,
}

/// Mixing plan for the whole export track.
#[derive(Clone, Debug)]
pub(crate) struct AudioManifest {
    pub(crate) sample_rate: u32,
    pub(crate) channels: u16,
    pub(crate) total_samples: u64,
    pub(crate) segments: Vec<AudioSegment>,
}

/// Place the cue at every transition. Contributions that would run past the end of the video are
/// cut at the last sample.
pub(crate) fn build_cue_manifest(timeline: &Timeline, cue: &DecodedCue) -> AudioManifest {
    let fps = timeline.fps();
    let total_samples = frame_to_sample(timeline.len(), fps, MIX_SAMPLE_RATE);
    let cue_samples = (cue.cue.duration_seconds * f64::from(MIX_SAMPLE_RATE)).round() as u64;

    let segments = timeline
        .transitions()
        .filter_map(|f| {
            let start = frame_to_sample(f.frame_index.0, fps, MIX_SAMPLE_RATE);
            let end = start.saturating_add(cue_samples).min(total_samples);
            (end > start).then(|| AudioSegment {
                timeline_start_sample: start,
                timeline_end_sample: end,
                volume: 1.0,
                source_sample_rate: cue.pcm.sample_rate,
                source_channels: cue.pcm.channels,
                source_interleaved_f32: cue.pcm.interleaved.clone(),
            })
        })
        .collect();

    AudioManifest {
        sample_rate: MIX_SAMPLE_RATE,
        channels: MIX_CHANNELS,
        total_samples,
        segments,
    }
}

/// Mix all segments into interleaved output PCM.
pub(crate) fn mix_manifest(manifest: &AudioManifest) -> Vec<f32> {
    let frames = manifest.total_samples as usize;
    let mut out = vec![0.0f32; frames * usize::from(manifest.channels)];

    for seg in &manifest.segments {
        mix_segment(&mut out, manifest, seg);
    }

    for s in &mut out {
        *s = s.clamp(-1.0, 1.0);
    }
    out
}

fn mix_segment(out: &mut [f32], manifest: &AudioManifest, seg: &AudioSegment) {
    if seg.source_channels == 0 || seg.source_sample_rate == 0 {
        return;
    }
    let src = seg.source_interleaved_f32.as_ref();
    let src_frames = src.len() / usize::from(seg.source_channels);
    if src_frames == 0 {
        return;
    }

    let end = seg.timeline_end_sample.min(manifest.total_samples);
    for dst_sample in seg.timeline_start_sample..end {
        let rel_sec = ((dst_sample - seg.timeline_start_sample) as f64) / f64::from(manifest.sample_rate);
        let src_pos = rel_sec * f64::from(seg.source_sample_rate);
        let src_frame0 = src_pos.floor() as usize;
        if src_frame0 >= src_frames {
            break;
        }
        let src_frame1 = (src_frame0 + 1).min(src_frames - 1);
        let frac = (src_pos - src_frame0 as f64) as f32;

        let (l, r) = if seg.source_channels == 1 {
            let v0 = src[src_frame0];
            let v1 = src[src_frame1];
            let v = v0 + ((v1 - v0) * frac);
            (v, v)
        } else {
            let i0 = src_frame0 * usize::from(seg.source_channels);
            let i1 = src_frame1 * usize::from(seg.source_channels);
            (
                src[i0] + ((src[i1] - src[i0]) * frac),
                src[i0 + 1] + ((src[i1 + 1] - src[i0 + 1]) * frac),
            )
        };

        let dst_idx = dst_sample as usize * usize::from(manifest.channels);
        out[dst_idx] += l * seg.volume;
        if manifest.channels > 1 {
            out[dst_idx + 1] += r * seg.volume;
        }
    }
}

/// Write interleaved `f32` PCM samples to a raw little-endian `.f32le` file.
pub(crate) fn write_mix_to_f32le_file(samples: &[f32], out_path: &Path) -> AnimatorResult<()> {
    if let Some(parent) = out_path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            AnimatorError::encoding(format!(
                "failed to create audio mix directory '{}': {e}",
                parent.display()
            ))
        })?;
    }

    let mut bytes = Vec::<u8>::with_capacity(samples.len() * 4);
    for &sample in samples {
        bytes.extend_from_slice(&sample.to_le_bytes());
    }
    std::fs::write(out_path, bytes).map_err(|e| {
        AnimatorError::encoding(format!(
            "failed to write mixed audio file '{}': {e}",
            out_path.display()
        ))
    })
}

/// Convert a frame count to the nearest sample index at `sample_rate`.
pub(crate) fn frame_to_sample(frames: u64, fps: Fps, sample_rate: u32) -> u64 {
    let num = u128::from(frames) * u128::from(sample_rate) * u128::from(fps.den);
    let den = u128::from(fps.num.max(1));
    ((num + (den / 2)) / den) as u64
}

/// Rough output size for `duration_secs` of export (about 1.5 MB per second), human formatted.
pub fn estimate_file_size(duration_secs: f64) -> String {
    const BYTES_PER_SEC: f64 = 1.5 * 1024.0 * 1024.0;
    let bytes = duration_secs.max(0.0) * BYTES_PER_SEC;
    if bytes >= 1024.0 * 1024.0 * 1024.0 {
        format!("{:.1} GB", bytes / (1024.0 * 1024.0 * 1024.0))
    } else if bytes >= 1024.0 * 1024.0 {
        format!("{:.1} MB", bytes / (1024.0 * 1024.0))
    } else {
        format!("{:.1} KB", bytes / 1024.0)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/audio/mix.rs"]
mod tests;
