use super::*;
use crate::feed::occurrence::PageSource;
use crate::foundation::core::{Canvas, Rect};
use std::sync::Arc;

fn doc(id: &str, pages: &[&[&str]]) -> DocumentOccurrences {
    let img = Arc::new(image::RgbaImage::from_pixel(
        200,
        100,
        image::Rgba([255, 255, 255, 255]),
    ));
    let records = pages
        .iter()
        .enumerate()
        .map(|(p, words)| OccurrenceRecord {
            document_id: DocumentId::new(id),
            page_index: p as u32,
            page: PageSource::Pixels(img.clone()),
            page_size: Canvas {
                width: 200,
                height: 100,
            },
            words: words
                .iter()
                .enumerate()
                .map(|(i, w)| {
                    let x = 10.0 + 40.0 * i as f64;
                    WordBox::new(*w, Rect::new(x, 40.0, x + 30.0, 52.0))
                })
                .collect(),
        })
        .collect();
    DocumentOccurrences {
        document_id: DocumentId::new(id),
        records,
    }
}

fn fps30() -> Fps {
    Fps::new(30, 1).unwrap()
}

#[test]
fn hello_world_reveals_one_word_per_second() {
    let docs = [doc("a.pdf", &[&["Hello", "World", "!"]])];
    let tl = Timeline::build(&docs, 1.0, fps30()).unwrap();

    assert!(tl.len() >= 90);
    let transitions: Vec<u64> = tl.transitions().map(|f| f.frame_index.0).collect();
    assert_eq!(transitions, vec![0, 30, 60]);

    let f0 = tl.frame(FrameIndex(0)).unwrap();
    assert_eq!(f0.words_revealed, 0..1);
    assert_eq!(tl.word_box(f0.current_word()).unwrap().text, "Hello");

    let f59 = tl.frame(FrameIndex(59)).unwrap();
    assert_eq!(f59.words_revealed, 0..2);
    assert!(!f59.is_word_transition);

    let f60 = tl.frame(FrameIndex(60)).unwrap();
    assert_eq!(f60.newly_revealed, 2..3);
    assert!((f60.timestamp_seconds - 2.0).abs() < 1e-9);
}

#[test]
fn indices_are_contiguous_and_timestamps_monotonic() {
    let docs = [
        doc("a.pdf", &[&["one", "two"], &[], &["three"]]),
        doc("b.pdf", &[&["four", "five", "six", "seven"]]),
    ];
    for wps in [0.5, 1.0, 1.5, 7.0, 45.0] {
        let tl = Timeline::build(&docs, wps, fps30()).unwrap();
        let mut prev = -1.0f64;
        for (i, f) in tl.frames().iter().enumerate() {
            assert_eq!(f.frame_index.0, i as u64);
            assert!(f.timestamp_seconds >= prev);
            prev = f.timestamp_seconds;
        }
        let newly: usize = tl.frames().iter().map(|f| f.newly_revealed.len()).sum();
        assert_eq!(newly, tl.words().len());
    }
}

#[test]
fn each_document_restarts_its_reveal() {
    let docs = [doc("a.pdf", &[&["x", "y"]]), doc("b.pdf", &[&["z"]])];
    let tl = Timeline::build(&docs, 1.0, fps30()).unwrap();

    let f = tl.frame(FrameIndex(60)).unwrap();
    assert_eq!(f.document_id.as_str(), "b.pdf");
    assert_eq!(f.words_revealed, 2..3);
    assert_eq!(tl.words()[2].reveal_secs, 2.0);
    assert_eq!(tl.len(), 90);
}

#[test]
fn page_index_follows_the_current_word() {
    let docs = [doc("a.pdf", &[&["x"], &["y"]])];
    let tl = Timeline::build(&docs, 2.0, fps30()).unwrap();
    assert_eq!(tl.frame(FrameIndex(0)).unwrap().page_index, 0);
    assert_eq!(tl.frame(FrameIndex(15)).unwrap().page_index, 1);
}

#[test]
fn zero_occurrences_is_an_empty_timeline() {
    let tl = Timeline::build(&[], 1.5, fps30()).unwrap();
    assert!(tl.is_empty());
    assert_eq!(tl.duration_secs(), 0.0);

    let docs = [doc("a.pdf", &[&[]])];
    assert!(Timeline::build(&docs, 1.5, fps30()).unwrap().is_empty());
}

#[test]
fn non_positive_rate_is_invalid_configuration() {
    let docs = [doc("a.pdf", &[&["x"]])];
    for wps in [0.0, -2.0, f64::INFINITY] {
        let err = Timeline::build(&docs, wps, fps30()).unwrap_err();
        assert!(matches!(err, AnimatorError::InvalidConfiguration(_)));
    }
}

#[test]
fn fast_rates_share_transition_frames() {
    let docs = [doc("a.pdf", &[&["a", "b", "c", "d"]])];
    let tl = Timeline::build(&docs, 60.0, fps30()).unwrap();
    assert_eq!(tl.len(), 3);
    assert_eq!(tl.frames()[0].newly_revealed, 0..1);
    assert_eq!(tl.frames()[1].newly_revealed, 1..3);
    assert_eq!(tl.frames()[2].newly_revealed, 3..4);
}

#[test]
fn vanishing_rates_are_rejected_instead_of_allocating() {
    let docs = [doc("a.pdf", &[&["Hello", "World"]])];
    for wps in [1e-16, 1e-300, f64::MIN_POSITIVE] {
        let err = Timeline::build(&docs, wps, fps30()).unwrap_err();
        assert!(matches!(err, AnimatorError::InvalidConfiguration(_)));
    }
}

#[test]
fn timelines_past_a_day_at_60_fps_are_rejected() {
    // Two words spanning just over 24 hours.
    let fps60 = Fps::new(60, 1).unwrap();
    let docs = [doc("a.pdf", &[&["x", "y"]])];
    let one_per_half_day = 1.0 / (12.0 * 60.0 * 60.0);
    let err = Timeline::build(&docs, one_per_half_day * 0.99, fps60).unwrap_err();
    assert!(matches!(err, AnimatorError::InvalidConfiguration(_)));

    let tl = Timeline::build(&docs, 1.0 / 60.0, fps60).unwrap();
    assert_eq!(tl.len(), 2 * 60 * 60);
}

#[test]
fn word_boxes_outside_the_page_are_invalid_configuration() {
    let mut d = doc("a.pdf", &[&["x"]]);
    d.records[0].words[0].rect = Rect::new(150.0, 40.0, 260.0, 52.0);
    let err = Timeline::build(&[d], 1.0, fps30()).unwrap_err();
    assert!(matches!(err, AnimatorError::InvalidConfiguration(_)));

    let mut d = doc("a.pdf", &[&["x"]]);
    d.records[0].words[0].rect = Rect::new(10.0, 40.0, 10.0, f64::NAN);
    assert!(Timeline::build(&[d], 1.0, fps30()).is_err());
}
