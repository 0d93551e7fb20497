use crate::config::Settings;
use crate::feed::occurrence::{DocumentId, DocumentOccurrences, OccurrenceRecord, WordBox};
use crate::foundation::core::{FrameIndex, Fps};
use crate::foundation::error::{AnimatorError, AnimatorResult};
use std::ops::Range;

/// Upper bound on timeline length: 24 hours at 60 fps.
pub const MAX_TIMELINE_FRAMES: u64 = 24 * 60 * 60 * 60;

/// One word placed on the timeline.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct TimelineWord {
    /// Index into [`Timeline::documents`].
    pub document: usize,
    /// Index into that document's records.
    pub record: usize,
    /// Index into that record's word boxes.
    pub word: usize,
    /// Seconds from the start of the video at which the word is revealed.
    pub reveal_secs: f64,
    /// First frame at or after `reveal_secs`.
    pub transition_frame: FrameIndex,
}

/// Schedule entry for one output frame.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct FrameSpec {
    /// Contiguous 0-based frame index.
    pub frame_index: FrameIndex,
    /// Index into [`Timeline::documents`].
    pub document: usize,
    /// Identity of the document on screen.
    pub document_id: DocumentId,
    /// Record holding the most recently revealed word.
    pub record: usize,
    /// Page of that record.
    pub page_index: u32,
    /// Flat word indices revealed so far within the current document, in reveal order.
    pub words_revealed: Range<usize>,
    /// Flat word indices whose transition lands on this frame (empty on hold frames).
    pub newly_revealed: Range<usize>,
    /// `true` when at least one word is revealed on this frame.
    pub is_word_transition: bool,
    /// Presentation timestamp.
    pub timestamp_seconds: f64,
}

impl FrameSpec {
    /// Flat index of the most recently revealed word.
    pub fn current_word(&self) -> usize {
        self.words_revealed.end - 1
    }
}

/// The reveal schedule for a set of documents at a given words-per-second rate.
///
/// Frame indices are contiguous from 0, timestamps are non-decreasing and every word owns exactly
/// one transition frame. An empty occurrence set yields an empty timeline.
#[derive(Clone, Debug)]
pub struct Timeline {
    fps: Fps,
    wps: f64,
    documents: Vec<DocumentOccurrences>,
    words: Vec<TimelineWord>,
    frames: Vec<FrameSpec>,
}

impl Timeline {
    /// Build a timeline from documents in presentation order.
    #[tracing::instrument(skip_all, fields(documents = documents.len(), wps))]
    pub fn build(documents: &[DocumentOccurrences], wps: f64, fps: Fps) -> AnimatorResult<Self> {
        Settings::validate_rate(wps)?;
        let fps = Fps::new(fps.num, fps.den)?;

        let mut words = Vec::new();
        let mut segment_start = 0.0f64;
        for (doc_idx, doc) in documents.iter().enumerate() {
            let mut i = 0usize;
            for (rec_idx, rec) in doc.records.iter().enumerate() {
                rec.validate_words()?;
                for word_idx in 0..rec.words.len() {
                    let reveal_secs = segment_start + (i as f64) / wps;
                    words.push(TimelineWord {
                        document: doc_idx,
                        record: rec_idx,
                        word: word_idx,
                        reveal_secs,
                        transition_frame: FrameIndex(fps.secs_to_frames_ceil(reveal_secs)),
                    });
                    i += 1;
                }
            }
            segment_start += (i as f64) / wps;
        }

        let frames = schedule_frames(documents, &words, segment_start, fps)?;
        tracing::debug!(words = words.len(), frames = frames.len(), "timeline built");

        Ok(Self {
            fps,
            wps,
            documents: documents.to_vec(),
            words,
            frames,
        })
    }

    /// Timeline frame rate.
    pub fn fps(&self) -> Fps {
        self.fps
    }

    /// Words per second used to build this timeline.
    pub fn wps(&self) -> f64 {
        self.wps
    }

    /// Documents in presentation order.
    pub fn documents(&self) -> &[DocumentOccurrences] {
        &self.documents
    }

    /// All words in reveal order.
    pub fn words(&self) -> &[TimelineWord] {
        &self.words
    }

    /// All frames in index order.
    pub fn frames(&self) -> &[FrameSpec] {
        &self.frames
    }

    /// Frame by index.
    pub fn frame(&self, index: FrameIndex) -> Option<&FrameSpec> {
        usize::try_from(index.0).ok().and_then(|i| self.frames.get(i))
    }

    /// Number of frames.
    pub fn len(&self) -> u64 {
        self.frames.len() as u64
    }

    /// `true` when there is nothing to render.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Video length in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.fps.frames_to_secs(self.len())
    }

    /// Frames on which at least one word is revealed.
    pub fn transitions(&self) -> impl Iterator<Item = &FrameSpec> + '_ {
        self.frames.iter().filter(|f| f.is_word_transition)
    }

    /// Record a flat word index belongs to.
    pub fn record_of(&self, word: usize) -> Option<&OccurrenceRecord> {
        let w = self.words.get(word)?;
        self.documents.get(w.document)?.records.get(w.record)
    }

    /// Word box for a flat word index.
    pub fn word_box(&self, word: usize) -> Option<&WordBox> {
        let w = self.words.get(word)?;
        self.record_of(word)?.words.get(w.word)
    }
}

fn schedule_frames(
    documents: &[DocumentOccurrences],
    words: &[TimelineWord],
    total_secs: f64,
    fps: Fps,
) -> AnimatorResult<Vec<FrameSpec>> {
    let Some(last) = words.last() else {
        return Ok(Vec::new());
    };

    let exact = total_secs * fps.as_f64();
    let total = fps
        .secs_to_frames_ceil(total_secs)
        .max(last.transition_frame.0.saturating_add(1));
    if !exact.is_finite() || exact > MAX_TIMELINE_FRAMES as f64 || total > MAX_TIMELINE_FRAMES {
        return Err(AnimatorError::invalid_config(format!(
            "timeline of {total_secs:.3}s at {} fps exceeds {MAX_TIMELINE_FRAMES} frames",
            fps.as_f64()
        )));
    }

    // Flat index of the first word of each document.
    let mut doc_first = vec![0usize; documents.len()];
    for (i, w) in words.iter().enumerate().rev() {
        doc_first[w.document] = i;
    }

    let mut frames = Vec::with_capacity(usize::try_from(total).unwrap_or(0));
    let mut next = 0usize;
    for f in 0..total {
        let start = next;
        while next < words.len() && words[next].transition_frame.0 <= f {
            next += 1;
        }
        if next == 0 {
            return Err(AnimatorError::evaluation(
                "first word must be revealed on frame 0",
            ));
        }

        let current = &words[next - 1];
        let doc = &documents[current.document];
        let record = &doc.records[current.record];
        frames.push(FrameSpec {
            frame_index: FrameIndex(f),
            document: current.document,
            document_id: doc.document_id.clone(),
            record: current.record,
            page_index: record.page_index,
            words_revealed: doc_first[current.document]..next,
            newly_revealed: start..next,
            is_word_transition: next > start,
            timestamp_seconds: fps.frames_to_secs(f),
        });
    }
    Ok(frames)
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/builder.rs"]
mod tests;
