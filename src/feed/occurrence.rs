use crate::foundation::core::{Canvas, Rect};
use crate::foundation::error::{AnimatorError, AnimatorResult};
use std::path::PathBuf;
use std::sync::Arc;

/// Stable identity of one source document (typically its file name).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct DocumentId(pub String);

impl DocumentId {
    /// Create a document id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the id as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One matched word: its box in page pixel coordinates and its text.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct WordBox {
    /// Bounding box in page raster pixels.
    pub rect: Rect,
    /// The word as it appears on the page.
    pub text: String,
}

impl WordBox {
    /// Create a word box.
    pub fn new(text: impl Into<String>, rect: Rect) -> Self {
        Self {
            rect,
            text: text.into(),
        }
    }
}

/// Where a page raster comes from.
#[derive(Clone, Debug)]
pub enum PageSource {
    /// Already rasterized page pixels.
    Pixels(Arc<image::RgbaImage>),
    /// Image file decoded on demand inside the generation worker.
    File(PathBuf),
}

impl PageSource {
    /// Obtain the page pixels, decoding from disk when needed.
    pub fn load(&self) -> AnimatorResult<Arc<image::RgbaImage>> {
        match self {
            Self::Pixels(img) => Ok(img.clone()),
            Self::File(path) => {
                let img = image::open(path).map_err(|e| {
                    AnimatorError::source_read(format!(
                        "failed to decode page image '{}': {e}",
                        path.display()
                    ))
                })?;
                Ok(Arc::new(img.to_rgba8()))
            }
        }
    }
}

/// One located instance of the search text on a page. Immutable once produced.
#[derive(Clone, Debug)]
pub struct OccurrenceRecord {
    /// Owning document.
    pub document_id: DocumentId,
    /// 0-based page number inside the document.
    pub page_index: u32,
    /// Page raster the word boxes refer to.
    pub page: PageSource,
    /// Declared page raster dimensions.
    pub page_size: Canvas,
    /// Matched words in reading order.
    pub words: Vec<WordBox>,
}

impl OccurrenceRecord {
    /// Check that every word box is finite, non-empty and lies inside the declared page.
    pub fn validate_words(&self) -> AnimatorResult<()> {
        let (pw, ph) = (
            f64::from(self.page_size.width),
            f64::from(self.page_size.height),
        );
        for w in &self.words {
            let r = w.rect;
            let finite = [r.x0, r.y0, r.x1, r.y1].iter().all(|v| v.is_finite());
            if !finite || r.x1 <= r.x0 || r.y1 <= r.y0 {
                return Err(AnimatorError::invalid_config(format!(
                    "word '{}' on page {} of '{}' has an empty or non-finite box",
                    w.text, self.page_index, self.document_id
                )));
            }
            if r.x0 < 0.0 || r.y0 < 0.0 || r.x1 > pw || r.y1 > ph {
                return Err(AnimatorError::invalid_config(format!(
                    "word '{}' on page {} of '{}' lies outside the {}x{} page",
                    w.text, self.page_index, self.document_id, self.page_size.width, self.page_size.height
                )));
            }
        }
        Ok(())
    }

    /// Load the page raster and check it against the declared dimensions.
    pub fn load_page(&self) -> AnimatorResult<Arc<image::RgbaImage>> {
        let img = self.page.load()?;
        if img.width() != self.page_size.width || img.height() != self.page_size.height {
            return Err(AnimatorError::source_read(format!(
                "page {} of '{}' is {}x{}, expected {}x{}",
                self.page_index,
                self.document_id,
                img.width(),
                img.height(),
                self.page_size.width,
                self.page_size.height
            )));
        }
        Ok(img)
    }
}

/// All occurrences found in one document, in page-then-reading order.
#[derive(Clone, Debug)]
pub struct DocumentOccurrences {
    /// Document identity.
    pub document_id: DocumentId,
    /// Ordered occurrence records.
    pub records: Vec<OccurrenceRecord>,
}

impl DocumentOccurrences {
    /// Total number of matched words across all records.
    pub fn word_count(&self) -> usize {
        self.records.iter().map(|r| r.words.len()).sum()
    }
}

/// Supplier of ordered occurrence sequences, one per source document.
pub trait OccurrenceFeed {
    /// Documents in the order they should appear in the video.
    fn documents(&self) -> &[DocumentOccurrences];
}

/// Feed backed by records built in memory.
#[derive(Clone, Debug, Default)]
pub struct InMemoryFeed {
    docs: Vec<DocumentOccurrences>,
}

impl InMemoryFeed {
    /// Create an empty feed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a document.
    pub fn push_document(&mut self, doc: DocumentOccurrences) {
        self.docs.push(doc);
    }

    /// Builder-style [`InMemoryFeed::push_document`].
    pub fn with_document(mut self, doc: DocumentOccurrences) -> Self {
        self.push_document(doc);
        self
    }
}

impl OccurrenceFeed for InMemoryFeed {
    fn documents(&self) -> &[DocumentOccurrences] {
        &self.docs
    }
}

#[cfg(test)]
#[path = "../../tests/unit/feed/occurrence.rs"]
mod tests;
