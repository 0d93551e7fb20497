use crate::foundation::error::{AnimatorError, AnimatorResult};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A sound clip played on word transitions. Read-only against the timeline.
#[derive(Clone, Debug, PartialEq)]
pub struct AudioCue {
    /// Source file.
    pub source_path: PathBuf,
    /// Clip length.
    pub duration_seconds: f64,
}

/// Decoded interleaved samples.
#[derive(Clone, Debug)]
pub struct CuePcm {
    /// Source sample rate in Hz.
    pub sample_rate: u32,
    /// Interleaved channel count.
    pub channels: u16,
    /// Samples in `[-1, 1]`.
    pub interleaved: Arc<Vec<f32>>,
}

/// A cue with its samples.
#[derive(Clone, Debug)]
pub struct DecodedCue {
    /// Cue metadata.
    pub cue: AudioCue,
    /// Samples.
    pub pcm: CuePcm,
}

impl AudioCue {
    /// Decode `path`: WAV natively, anything else through the system `ffmpeg`.
    #[tracing::instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> AnimatorResult<DecodedCue> {
        let path = path.as_ref();
        let is_wav = path
            .extension()
            .is_some_and(|e| e.eq_ignore_ascii_case("wav"));
        let pcm = if is_wav {
            decode_wav(path)?
        } else {
            decode_with_ffmpeg(path, super::mix::MIX_SAMPLE_RATE)?
        };

        let frames = pcm.interleaved.len() / usize::from(pcm.channels.max(1));
        let duration_seconds = frames as f64 / f64::from(pcm.sample_rate.max(1));
        tracing::debug!(duration_seconds, sample_rate = pcm.sample_rate, "audio cue decoded");
        Ok(DecodedCue {
            cue: AudioCue {
                source_path: path.to_path_buf(),
                duration_seconds,
            },
            pcm,
        })
    }
}

fn decode_wav(path: &Path) -> AnimatorResult<CuePcm> {
    let read_err = |e: hound::Error| {
        AnimatorError::source_read(format!(
            "failed to read audio cue '{}': {e}",
            path.display()
        ))
    };
    let mut reader = hound::WavReader::open(path).map_err(read_err)?;
    let spec = reader.spec();
    if spec.channels == 0 || spec.sample_rate == 0 {
        return Err(AnimatorError::source_read(format!(
            "audio cue '{}' has no channels or zero sample rate",
            path.display()
        )));
    }

    let samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<Result<_, _>>()
            .map_err(read_err)?,
        hound::SampleFormat::Int => {
            let scale = (1i64 << (spec.bits_per_sample.clamp(1, 32) - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<Result<_, _>>()
                .map_err(read_err)?
        }
    };

    Ok(CuePcm {
        sample_rate: spec.sample_rate,
        channels: spec.channels,
        interleaved: Arc::new(samples),
    })
}

fn decode_with_ffmpeg(path: &Path, sample_rate: u32) -> AnimatorResult<CuePcm> {
    let out = std::process::Command::new("ffmpeg")
        .args(["-v", "error", "-i"])
        .arg(path)
        .args([
            "-vn",
            "-f",
            "f32le",
            "-acodec",
            "pcm_f32le",
            "-ac",
            "2",
            "-ar",
            &sample_rate.to_string(),
            "pipe:1",
        ])
        .output()
        .map_err(|e| AnimatorError::source_read(format!("failed to run ffmpeg for audio decode: {e}")))?;

    if !out.status.success() {
        return Err(AnimatorError::source_read(format!(
            "ffmpeg audio decode failed for '{}': {}",
            path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }
    if !out.stdout.len().is_multiple_of(4) {
        return Err(AnimatorError::source_read(
            "decoded audio byte length is not aligned to f32 samples",
        ));
    }

    let samples = out
        .stdout
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect();
    Ok(CuePcm {
        sample_rate,
        channels: 2,
        interleaved: Arc::new(samples),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/audio/cue.rs"]
mod tests;
