use crate::foundation::core::FrameIndex;
use crate::timeline::{FrameSpec, Timeline};

/// When the cue starts relative to the video.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct CueTrigger {
    /// Word transition frame.
    pub frame_index: FrameIndex,
    /// That frame's timestamp.
    pub offset_seconds: f64,
}

/// One trigger per word-transition frame, in frame order.
pub fn cue_offsets(timeline: &Timeline) -> Vec<CueTrigger> {
    timeline
        .transitions()
        .map(|f| CueTrigger {
            frame_index: f.frame_index,
            offset_seconds: f.timestamp_seconds,
        })
        .collect()
}

/// Instruction for the live audio player.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CueEvent {
    /// Start the cue; nothing is playing.
    Play {
        /// Transition frame.
        frame_index: FrameIndex,
    },
    /// Stop the playing instance and start over.
    Restart {
        /// Transition frame.
        frame_index: FrameIndex,
    },
}

/// Live playback policy: at most one cue instance; a new transition interrupts the previous one.
#[derive(Clone, Debug)]
pub struct LiveCueScheduler {
    cue_duration: f64,
    playing_since: Option<f64>,
}

impl LiveCueScheduler {
    /// Scheduler for a cue of `cue_duration` seconds.
    pub fn new(cue_duration: f64) -> Self {
        Self {
            cue_duration: cue_duration.max(0.0),
            playing_since: None,
        }
    }

    /// Feed each displayed frame in order; returns what the player should do.
    pub fn on_frame(&mut self, frame: &FrameSpec) -> Option<CueEvent> {
        let t = frame.timestamp_seconds;
        if let Some(start) = self.playing_since
            && (t < start || t >= start + self.cue_duration)
        {
            self.playing_since = None;
        }
        if !frame.is_word_transition {
            return None;
        }

        let frame_index = frame.frame_index;
        let event = if self.playing_since.is_some() {
            CueEvent::Restart { frame_index }
        } else {
            CueEvent::Play { frame_index }
        };
        self.playing_since = Some(t);
        Some(event)
    }

    /// `true` while an instance is considered audible.
    pub fn is_playing(&self) -> bool {
        self.playing_since.is_some()
    }

    /// Forget the playing instance (preview restarted or stopped).
    pub fn reset(&mut self) {
        self.playing_since = None;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/audio/sync.rs"]
mod tests;
