use crate::feed::occurrence::{
    DocumentId, DocumentOccurrences, OccurrenceFeed, OccurrenceRecord, PageSource, WordBox,
};
use crate::foundation::core::{Canvas, Rect};
use crate::foundation::error::{AnimatorError, AnimatorResult};
use std::path::{Path, PathBuf};

#[derive(serde::Deserialize, serde::Serialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
struct ManifestDef {
    documents: Vec<DocumentDef>,
}

#[derive(serde::Deserialize, serde::Serialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
struct DocumentDef {
    id: String,
    #[serde(default)]
    occurrences: Vec<OccurrenceDef>,
}

#[derive(serde::Deserialize, serde::Serialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
struct OccurrenceDef {
    page_index: u32,
    page_image: PathBuf,
    page_width: u32,
    page_height: u32,
    #[serde(default)]
    words: Vec<WordDef>,
}

#[derive(serde::Deserialize, serde::Serialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
struct WordDef {
    text: String,
    rect: Rect,
}

/// Occurrence feed loaded from a JSON manifest written by the PDF search layer.
///
/// ```json
/// { "documents": [ { "id": "a.pdf", "occurrences": [ {
///     "page_index": 0, "page_image": "pages/a-0.png", "page_width": 1240, "page_height": 1754,
///     "words": [ { "text": "Hello", "rect": { "x0": 10, "y0": 20, "x1": 80, "y1": 40 } } ]
/// } ] } ] }
/// ```
///
/// Page image paths are resolved relative to the manifest file and decoded lazily.
#[derive(Clone, Debug)]
pub struct ManifestFeed {
    docs: Vec<DocumentOccurrences>,
}

impl ManifestFeed {
    /// Read and validate a manifest from disk.
    pub fn from_path(path: impl AsRef<Path>) -> AnimatorResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            AnimatorError::source_read(format!(
                "failed to read occurrence manifest '{}': {e}",
                path.display()
            ))
        })?;
        let root = path.parent().unwrap_or_else(|| Path::new("."));
        Self::from_json_str(&text, root)
    }

    /// Parse a manifest, resolving relative page image paths against `root`.
    pub fn from_json_str(json: &str, root: &Path) -> AnimatorResult<Self> {
        let def: ManifestDef = serde_json::from_str(json).map_err(|e| {
            AnimatorError::invalid_config(format!("invalid occurrence manifest: {e}"))
        })?;

        let mut docs = Vec::with_capacity(def.documents.len());
        for d in def.documents {
            let document_id = DocumentId::new(d.id);
            let mut records = Vec::with_capacity(d.occurrences.len());
            for occ in d.occurrences {
                if occ.page_width == 0 || occ.page_height == 0 {
                    return Err(AnimatorError::invalid_config(format!(
                        "document '{document_id}' page {} has zero size",
                        occ.page_index
                    )));
                }
                let page_path = if occ.page_image.is_absolute() {
                    occ.page_image
                } else {
                    root.join(occ.page_image)
                };
                let record = OccurrenceRecord {
                    document_id: document_id.clone(),
                    page_index: occ.page_index,
                    page: PageSource::File(page_path),
                    page_size: Canvas {
                        width: occ.page_width,
                        height: occ.page_height,
                    },
                    words: occ
                        .words
                        .into_iter()
                        .map(|w| WordBox::new(w.text, w.rect))
                        .collect(),
                };
                record.validate_words()?;
                records.push(record);
            }
            docs.push(DocumentOccurrences {
                document_id,
                records,
            });
        }
        Ok(Self { docs })
    }
}

impl OccurrenceFeed for ManifestFeed {
    fn documents(&self) -> &[DocumentOccurrences] {
        &self.docs
    }
}

#[cfg(test)]
#[path = "../../tests/unit/feed/manifest.rs"]
mod tests;
