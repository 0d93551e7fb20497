use crate::foundation::core::{Fps, FrameIndex, FrameRGBA};
use crate::foundation::error::AnimatorResult;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

/// Configuration provided to a [`FrameSink`] before the first frame.
#[derive(Debug, Clone, PartialEq)]
pub struct SinkConfig {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Output frames-per-second.
    pub fps: Fps,
    /// Optional raw PCM track to mux alongside the frames.
    pub audio: Option<AudioInputConfig>,
}

/// Raw PCM audio input for sinks that encode sound.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioInputConfig {
    /// Path to interleaved `f32le` PCM data.
    pub path: PathBuf,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Channel count.
    pub channels: u16,
}

/// Consumer of composited frames.
///
/// Ordering contract: `push_frame` is called in strictly increasing `FrameIndex` order. A job calls
/// exactly one of `end` (every frame delivered) or `abort` (cancelled or failed) after `begin`.
pub trait FrameSink: Send {
    /// Called once before any frames are pushed.
    fn begin(&mut self, cfg: SinkConfig) -> AnimatorResult<()>;
    /// Push one frame.
    fn push_frame(&mut self, idx: FrameIndex, frame: &Arc<FrameRGBA>) -> AnimatorResult<()>;
    /// Called once after the last frame.
    fn end(&mut self) -> AnimatorResult<()>;
    /// Called instead of `end` when the sequence will not be completed.
    fn abort(&mut self) -> AnimatorResult<()> {
        Ok(())
    }
}

/// In-memory sink for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    frames: Vec<(FrameIndex, Arc<FrameRGBA>)>,
    ended: bool,
    aborted: bool,
}

impl InMemorySink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration captured in `begin`, if any.
    pub fn config(&self) -> Option<&SinkConfig> {
        self.cfg.as_ref()
    }

    /// Frames in delivery order.
    pub fn frames(&self) -> &[(FrameIndex, Arc<FrameRGBA>)] {
        &self.frames
    }

    /// `true` once `end` was called.
    pub fn is_ended(&self) -> bool {
        self.ended
    }

    /// `true` once `abort` was called.
    pub fn is_aborted(&self) -> bool {
        self.aborted
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> AnimatorResult<()> {
        self.cfg = Some(cfg);
        self.frames.clear();
        self.ended = false;
        self.aborted = false;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &Arc<FrameRGBA>) -> AnimatorResult<()> {
        self.frames.push((idx, frame.clone()));
        Ok(())
    }

    fn end(&mut self) -> AnimatorResult<()> {
        self.ended = true;
        Ok(())
    }

    fn abort(&mut self) -> AnimatorResult<()> {
        self.aborted = true;
        Ok(())
    }
}

#[derive(Debug, Default)]
struct Surface {
    current: Option<(FrameIndex, Arc<FrameRGBA>)>,
    presented: u64,
}

/// Live preview surface: each frame replaces the previous one.
///
/// Clones share the same surface, so the control side can read while a job writes. A new job
/// does not clear the surface; if it fails, the last good frame stays visible.
#[derive(Clone, Debug, Default)]
pub struct LatestFrameSink {
    surface: Arc<Mutex<Surface>>,
}

impl LatestFrameSink {
    /// Create an empty surface.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Surface> {
        self.surface.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// The frame currently on screen.
    pub fn latest(&self) -> Option<(FrameIndex, Arc<FrameRGBA>)> {
        self.lock().current.clone()
    }

    /// Frames presented since creation.
    pub fn presented(&self) -> u64 {
        self.lock().presented
    }
}

impl FrameSink for LatestFrameSink {
    fn begin(&mut self, _cfg: SinkConfig) -> AnimatorResult<()> {
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &Arc<FrameRGBA>) -> AnimatorResult<()> {
        let mut s = self.lock();
        s.current = Some((idx, frame.clone()));
        s.presented += 1;
        Ok(())
    }

    fn end(&mut self) -> AnimatorResult<()> {
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sink.rs"]
mod tests;
