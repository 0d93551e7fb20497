//! Frame consumers: in-memory, live preview surface and `ffmpeg` MP4 output.

/// MP4 output through the system `ffmpeg`.
pub mod ffmpeg;
/// Frame sink trait and in-process sinks.
pub mod sink;

pub use ffmpeg::{FfmpegSink, FfmpegSinkOpts, is_ffmpeg_on_path};
pub use sink::{AudioInputConfig, FrameSink, InMemorySink, LatestFrameSink, SinkConfig};
