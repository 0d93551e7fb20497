use super::*;

fn cfg(width: u32, height: u32) -> SinkConfig {
    SinkConfig {
        width,
        height,
        fps: Fps::default(),
        audio: None,
    }
}

#[test]
fn partial_path_keeps_the_extension_last() {
    assert_eq!(
        partial_path_for(Path::new("out/video.mp4")),
        PathBuf::from("out/.video.partial.mp4")
    );
    assert_eq!(
        partial_path_for(Path::new("clip")),
        PathBuf::from(".clip.partial")
    );
}

#[test]
fn odd_dimensions_are_rejected_before_spawning() {
    let mut sink = FfmpegSink::new(FfmpegSinkOpts::new("target/ffmpeg_unit/odd.mp4"));
    let err = sink.begin(cfg(15, 8)).unwrap_err();
    assert!(matches!(err, AnimatorError::InvalidConfiguration(_)));
}

#[test]
fn push_before_begin_is_an_error() {
    let mut sink = FfmpegSink::new(FfmpegSinkOpts::new("target/ffmpeg_unit/none.mp4"));
    let frame = Arc::new(FrameRGBA {
        width: 2,
        height: 2,
        data: vec![0; 16],
    });
    assert!(sink.push_frame(FrameIndex(0), &frame).is_err());
}

#[test]
fn abort_removes_partial_output() {
    if !is_ffmpeg_on_path() {
        return;
    }
    let out = PathBuf::from("target/ffmpeg_unit/aborted.mp4");
    let _ = std::fs::remove_file(&out);
    let mut sink = FfmpegSink::new(FfmpegSinkOpts::new(&out));
    sink.begin(cfg(16, 16)).unwrap();
    let frame = Arc::new(FrameRGBA {
        width: 16,
        height: 16,
        data: vec![255; 16 * 16 * 4],
    });
    sink.push_frame(FrameIndex(0), &frame).unwrap();
    sink.abort().unwrap();

    assert!(!sink.partial_path().exists());
    assert!(!out.exists());
}
