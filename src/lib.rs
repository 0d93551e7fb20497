//! Paper Animator turns located search matches in PDF pages into an animated reveal video.
//!
//! The pipeline is split into small stages:
//!
//! - An occurrence feed supplies per-document [`OccurrenceRecord`]s (page raster + word boxes)
//! - [`Timeline`] schedules word reveals at a words-per-second rate
//! - [`compose_frame`] frames the page around the current word and runs the [`EffectChain`]
//! - [`GenerationController`] runs preview and export jobs over a shared [`FrameCache`] and streams
//!   frames into a [`FrameSink`]
#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Sound cue decoding, scheduling and mixing.
pub mod audio;
/// Frame memoization.
pub mod cache;
/// User settings.
pub mod config;
/// Frame compositing.
pub mod effects;
/// Frame sinks.
pub mod encode;
/// Occurrence input.
pub mod feed;
/// Shared primitives and errors.
pub mod foundation;
/// Preview and export jobs.
pub mod session;
/// Reveal schedule.
pub mod timeline;

pub use crate::foundation::core::{Canvas, Fps, FrameIndex, FrameRGBA, Point, Rect};
pub use crate::foundation::error::{AnimatorError, AnimatorResult};

pub use crate::audio::{AudioCue, CueTrigger, LiveCueScheduler, cue_offsets, estimate_file_size};
pub use crate::cache::{CacheLimits, CacheStats, FrameCache, FrameFingerprint, fingerprint_frame};
pub use crate::config::{DEFAULT_WPS, Settings};
pub use crate::effects::{
    BlurKind, BlurPreset, Effect, EffectChain, EffectsConfig, Orientation, Resolution,
    compose_frame,
};
pub use crate::encode::{
    AudioInputConfig, FfmpegSink, FfmpegSinkOpts, FrameSink, InMemorySink, LatestFrameSink,
    SinkConfig,
};
pub use crate::feed::manifest::ManifestFeed;
pub use crate::feed::occurrence::{
    DocumentId, DocumentOccurrences, InMemoryFeed, OccurrenceFeed, OccurrenceRecord, PageSource,
    WordBox,
};
pub use crate::session::{
    CancelToken, ControllerOpts, ExportHandle, ExportOutcome, GenerationController, JobId,
    JobKind, JobOutcome, JobReport, JobState, PreviewHandle, RunOpts,
};
pub use crate::timeline::{FrameScene, FrameSpec, Timeline};
