//! Sound cues aligned with word transitions, for live playback and export muxing.

/// Cue sound decoding.
pub mod cue;
/// Cue track mixing for export.
pub mod mix;
/// Cue timing for live playback.
pub mod sync;

pub use cue::{AudioCue, CuePcm, DecodedCue};
pub use mix::{MIX_CHANNELS, MIX_SAMPLE_RATE, estimate_file_size};
pub use sync::{CueEvent, CueTrigger, LiveCueScheduler, cue_offsets};
