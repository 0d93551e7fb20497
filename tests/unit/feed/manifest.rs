use super::*;

const MANIFEST: &str = r#"
{
  "documents": [
    {
      "id": "a.pdf",
      "occurrences": [
        {
          "page_index": 0,
          "page_image": "pages/a-0.png",
          "page_width": 100,
          "page_height": 140,
          "words": [
            { "text": "Hello", "rect": { "x0": 10, "y0": 20, "x1": 40, "y1": 30 } },
            { "text": "World", "rect": { "x0": 45, "y0": 20, "x1": 80, "y1": 30 } }
          ]
        }
      ]
    },
    { "id": "b.pdf" }
  ]
}
"#;

#[test]
fn parses_documents_and_resolves_paths() {
    let feed = ManifestFeed::from_json_str(MANIFEST, Path::new("/data/run")).unwrap();
    let docs = feed.documents();
    assert_eq!(docs.len(), 2);
    assert_eq!(docs[0].document_id.as_str(), "a.pdf");
    assert_eq!(docs[0].word_count(), 2);
    assert_eq!(docs[0].records[0].words[1].text, "World");
    match &docs[0].records[0].page {
        PageSource::File(p) => assert_eq!(p, &PathBuf::from("/data/run/pages/a-0.png")),
        PageSource::Pixels(_) => panic!("manifest pages must be lazy file sources"),
    }
    assert!(docs[1].records.is_empty());
}

#[test]
fn rejects_zero_sized_pages() {
    let json = MANIFEST.replace("\"page_width\": 100", "\"page_width\": 0");
    let err = ManifestFeed::from_json_str(&json, Path::new(".")).unwrap_err();
    assert!(matches!(err, AnimatorError::InvalidConfiguration(_)));
}

#[test]
fn rejects_malformed_json() {
    let err = ManifestFeed::from_json_str("{ \"documents\": 3 }", Path::new(".")).unwrap_err();
    assert!(matches!(err, AnimatorError::InvalidConfiguration(_)));
}

#[test]
fn from_path_reads_relative_to_manifest() {
    let dir = PathBuf::from("target").join("manifest_feed_unit");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("occurrences.json");
    std::fs::write(&path, MANIFEST).unwrap();

    let feed = ManifestFeed::from_path(&path).unwrap();
    match &feed.documents()[0].records[0].page {
        PageSource::File(p) => assert_eq!(p, &dir.join("pages/a-0.png")),
        PageSource::Pixels(_) => panic!("expected file source"),
    }
}

#[test]
fn rejects_word_boxes_larger_than_the_page() {
    let json = MANIFEST.replace("\"x1\": 80", "\"x1\": 200000");
    let err = ManifestFeed::from_json_str(&json, Path::new(".")).unwrap_err();
    assert!(matches!(err, AnimatorError::InvalidConfiguration(_)));
}
