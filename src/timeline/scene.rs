use crate::feed::occurrence::DocumentId;
use crate::foundation::core::Rect;
use crate::foundation::error::{AnimatorError, AnimatorResult};
use crate::timeline::builder::{FrameSpec, Timeline};

/// Geometry needed to composite one frame, in page pixel coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameScene {
    /// Document on screen.
    pub document_id: DocumentId,
    /// Index into [`Timeline::documents`].
    pub document: usize,
    /// Record whose page raster is the base image.
    pub record: usize,
    /// Page of that record.
    pub page_index: u32,
    /// Box the camera frames (the most recently revealed word).
    pub focus: Rect,
    /// Boxes styled as the most recent transition.
    pub current: Vec<Rect>,
    /// Earlier revealed boxes on the same page.
    pub previous: Vec<Rect>,
}

impl FrameScene {
    /// Resolve the word boxes visible on `spec`.
    pub fn resolve(timeline: &Timeline, spec: &FrameSpec) -> AnimatorResult<Self> {
        let current_word = spec.current_word();
        let focus = timeline
            .word_box(current_word)
            .ok_or_else(|| AnimatorError::evaluation("frame references an unknown word"))?
            .rect;

        let mut current = vec![focus];
        let mut previous = Vec::new();
        for w in spec.words_revealed.clone() {
            if w == current_word {
                continue;
            }
            let (Some(rec), Some(word)) = (timeline.record_of(w), timeline.word_box(w)) else {
                continue;
            };
            if rec.page_index != spec.page_index {
                continue;
            }
            if spec.newly_revealed.contains(&w) {
                current.push(word.rect);
            } else {
                previous.push(word.rect);
            }
        }

        Ok(Self {
            document_id: spec.document_id.clone(),
            document: spec.document,
            record: spec.record,
            page_index: spec.page_index,
            focus,
            current,
            previous,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/scene.rs"]
mod tests;
