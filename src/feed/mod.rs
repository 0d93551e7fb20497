//! Occurrence feed: located search matches per document, as produced by the PDF layer.

/// JSON manifest adapter (page images on disk).
pub mod manifest;
/// Occurrence records and the feed trait.
pub mod occurrence;
