use super::*;
use crate::cache::CacheLimits;
use crate::encode::sink::{InMemorySink, SinkConfig};
use crate::feed::occurrence::{DocumentId, OccurrenceRecord, PageSource, WordBox};
use crate::foundation::core::{Canvas, FrameIndex, FrameRGBA, Rect};
use std::time::Duration;

fn doc(id: &str, words: usize) -> DocumentOccurrences {
    let mut img = image::RgbaImage::from_pixel(320, 160, image::Rgba([250, 248, 240, 255]));
    for x in (0..320).step_by(4) {
        img.put_pixel(x, 78, image::Rgba([10, 10, 10, 255]));
    }
    let rec = OccurrenceRecord {
        document_id: DocumentId::new(id),
        page_index: 0,
        page: PageSource::Pixels(Arc::new(img)),
        page_size: Canvas {
            width: 320,
            height: 160,
        },
        words: (0..words)
            .map(|i| {
                let x = 10.0 + 30.0 * (i % 10) as f64;
                WordBox::new(format!("w{i}"), Rect::new(x, 70.0, x + 24.0, 86.0))
            })
            .collect(),
    };
    DocumentOccurrences {
        document_id: DocumentId::new(id),
        records: vec![rec],
    }
}

fn quick_settings() -> Settings {
    Settings {
        wps: 5.0,
        fps: 10,
        ..Settings::default()
    }
}

fn controller() -> GenerationController {
    GenerationController::with_opts(ControllerOpts {
        preview_cache: CacheLimits::PREVIEW,
        export_cache: CacheLimits::EXPORT,
    })
    .unwrap()
}

/// Sleeps on every frame so a job stays running long enough to be preempted.
struct SlowSink;

impl FrameSink for SlowSink {
    fn begin(&mut self, _cfg: SinkConfig) -> AnimatorResult<()> {
        Ok(())
    }

    fn push_frame(&mut self, _idx: FrameIndex, _frame: &Arc<FrameRGBA>) -> AnimatorResult<()> {
        std::thread::sleep(Duration::from_millis(20));
        Ok(())
    }

    fn end(&mut self) -> AnimatorResult<()> {
        Ok(())
    }
}

#[test]
fn new_preview_preempts_the_running_one() {
    let ctl = controller();
    let docs = [doc("a.pdf", 40)];
    let settings = Settings {
        wps: 1.0,
        ..Settings::default()
    };

    let first = ctl.submit_preview(&docs, &settings, Box::new(SlowSink)).unwrap();
    std::thread::sleep(Duration::from_millis(50));
    let second = ctl.submit_preview(&docs, &settings, Box::new(SlowSink)).unwrap();

    assert!(first.state().is_terminal());
    let report = first.wait();
    assert!(matches!(report.outcome, JobOutcome::Cancelled));
    assert_ne!(first.job_id(), second.job_id());
    assert!(!second.state().is_terminal() || second.state() == JobState::Cancelled);

    let cancelled = ctl.cancel_preview().unwrap();
    assert_eq!(cancelled.job_id, second.job_id());
    assert!(ctl.cancel_preview().is_none());
}

#[test]
fn preview_renders_only_the_first_document() {
    let ctl = controller();
    let docs = [doc("a.pdf", 2), doc("b.pdf", 8)];
    let sink = SizeProbe::default();
    let handle = ctl
        .submit_preview(&docs, &quick_settings(), Box::new(sink.clone()))
        .unwrap();
    let report = handle.wait();

    assert!(matches!(report.outcome, JobOutcome::Completed));
    assert_eq!(report.kind, JobKind::Preview);
    // 2 words at 5 wps and 10 fps.
    assert_eq!(report.frames_completed, 4);
    assert_eq!(sink.size(), Some((960, 540)));
}

#[derive(Clone, Default)]
struct SizeProbe(Arc<Mutex<Option<(u32, u32)>>>);

impl SizeProbe {
    fn size(&self) -> Option<(u32, u32)> {
        *self.0.lock().unwrap()
    }
}

impl FrameSink for SizeProbe {
    fn begin(&mut self, cfg: SinkConfig) -> AnimatorResult<()> {
        *self.0.lock().unwrap() = Some((cfg.width, cfg.height));
        Ok(())
    }

    fn push_frame(&mut self, _idx: FrameIndex, _frame: &Arc<FrameRGBA>) -> AnimatorResult<()> {
        Ok(())
    }

    fn end(&mut self) -> AnimatorResult<()> {
        Ok(())
    }
}

#[test]
fn toggling_theme_uses_distinct_cache_entries_and_reverting_hits() {
    let ctl = controller();
    let docs = [doc("a.pdf", 2)];
    let light = quick_settings();
    let dark = Settings {
        dark_theme: true,
        ..quick_settings()
    };

    let r1 = ctl
        .submit_preview(&docs, &light, Box::new(InMemorySink::new()))
        .unwrap()
        .wait();
    let after_light = ctl.preview_cache().len();
    assert_eq!(after_light as u64, r1.frames_completed);

    let r2 = ctl
        .submit_preview(&docs, &dark, Box::new(InMemorySink::new()))
        .unwrap()
        .wait();
    assert_eq!(r2.frames_from_cache, 0);
    assert_eq!(ctl.preview_cache().len(), after_light * 2);

    let r3 = ctl
        .submit_preview(&docs, &light, Box::new(InMemorySink::new()))
        .unwrap()
        .wait();
    assert!(matches!(r3.outcome, JobOutcome::Completed));
    assert_eq!(r3.frames_from_cache, r3.frames_completed);
}

#[test]
fn invalid_rate_is_rejected_without_touching_the_running_preview() {
    let ctl = controller();
    let docs = [doc("a.pdf", 40)];
    let slow = Settings {
        wps: 1.0,
        ..Settings::default()
    };
    let running = ctl.submit_preview(&docs, &slow, Box::new(SlowSink)).unwrap();

    let bad = Settings {
        wps: 0.0,
        ..Settings::default()
    };
    let err = ctl
        .submit_preview(&docs, &bad, Box::new(InMemorySink::new()))
        .unwrap_err();
    assert!(matches!(err, AnimatorError::InvalidConfiguration(_)));
    assert!(!running.state().is_terminal());

    let report = ctl.cancel_preview().unwrap();
    assert_eq!(report.job_id, running.job_id());
    assert!(matches!(report.outcome, JobOutcome::Cancelled));
}

#[test]
fn export_covers_every_document_at_full_resolution() {
    let ctl = controller();
    let docs = [doc("a.pdf", 2), doc("b.pdf", 3)];
    let mut sink = InMemorySink::new();
    let report = ctl
        .export_to_sink(
            &docs,
            &quick_settings(),
            &mut sink,
            &RunOpts::default(),
            CancelToken::new(),
        )
        .unwrap();

    assert!(matches!(report.outcome, JobOutcome::Completed));
    assert_eq!(report.kind, JobKind::Export);
    // 5 words at 5 wps and 10 fps.
    assert_eq!(sink.frames().len(), 10);
    let cfg = sink.config().unwrap();
    assert_eq!((cfg.width, cfg.height), (1920, 1080));
    assert!(cfg.audio.is_none());
    assert!(sink.is_ended());
}

#[test]
fn pre_cancelled_export_ends_cancelled() {
    let ctl = controller();
    let docs = [doc("a.pdf", 3)];
    let cancel = CancelToken::new();
    cancel.cancel();
    let mut sink = InMemorySink::new();
    let report = ctl
        .export_to_sink(&docs, &quick_settings(), &mut sink, &RunOpts::default(), cancel)
        .unwrap();

    assert!(matches!(report.outcome, JobOutcome::Cancelled));
    assert!(sink.frames().is_empty());
    assert!(!sink.is_ended());
}

#[test]
fn unreadable_audio_cue_fails_the_export() {
    let ctl = controller();
    let docs = [doc("a.pdf", 2)];
    let settings = Settings {
        audio_path: Some(std::env::temp_dir().join("paper_animator_missing_cue.wav")),
        ..quick_settings()
    };
    let mut sink = InMemorySink::new();
    let report = ctl
        .export_to_sink(&docs, &settings, &mut sink, &RunOpts::default(), CancelToken::new())
        .unwrap();

    assert!(matches!(
        report.outcome,
        JobOutcome::Failed(AnimatorError::SourceRead(_))
    ));
    assert!(sink.config().is_none());
}

#[test]
fn export_with_cue_passes_a_mixed_track_to_the_sink() {
    let dir = std::env::temp_dir().join(format!("paper_animator_cue_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let cue = dir.join("tick.wav");
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 48_000,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut w = hound::WavWriter::create(&cue, spec).unwrap();
    for i in 0..4_800 {
        w.write_sample(if i % 2 == 0 { 8_000i16 } else { -8_000 }).unwrap();
    }
    w.finalize().unwrap();

    let ctl = controller();
    let docs = [doc("a.pdf", 2)];
    let settings = Settings {
        audio_path: Some(cue.clone()),
        ..quick_settings()
    };
    let mut sink = InMemorySink::new();
    let report = ctl
        .export_to_sink(&docs, &settings, &mut sink, &RunOpts::default(), CancelToken::new())
        .unwrap();

    assert!(matches!(report.outcome, JobOutcome::Completed));
    let audio = sink.config().unwrap().audio.clone().unwrap();
    assert_eq!(audio.sample_rate, 48_000);
    assert_eq!(audio.channels, 2);
    // The temporary mix does not outlive the job.
    assert!(!audio.path.exists());

    let _ = std::fs::remove_dir_all(dir);
}
