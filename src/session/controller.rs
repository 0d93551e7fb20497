use crate::audio::cue::AudioCue;
use crate::audio::mix::{build_cue_manifest, mix_manifest, write_mix_to_f32le_file};
use crate::cache::{CacheLimits, FrameCache};
use crate::config::Settings;
use crate::effects::config::Resolution;
use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts};
use crate::encode::sink::{AudioInputConfig, FrameSink};
use crate::feed::occurrence::DocumentOccurrences;
use crate::foundation::error::{AnimatorError, AnimatorResult};
use crate::session::job::{
    CancelToken, JobId, JobKind, JobOutcome, JobReport, JobShared, JobState,
};
use crate::session::runner::{JobInput, RunOpts, run_job};
use crate::timeline::Timeline;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

/// Cache sizing for a controller.
#[derive(Clone, Copy, Debug)]
pub struct ControllerOpts {
    /// Preview cache bounds.
    pub preview_cache: CacheLimits,
    /// Export cache bounds.
    pub export_cache: CacheLimits,
}

impl Default for ControllerOpts {
    fn default() -> Self {
        Self {
            preview_cache: CacheLimits::PREVIEW,
            export_cache: CacheLimits::EXPORT,
        }
    }
}

/// Observer for the running preview job.
#[derive(Clone, Debug)]
pub struct PreviewHandle {
    shared: Arc<JobShared>,
}

impl PreviewHandle {
    /// Job identity.
    pub fn job_id(&self) -> JobId {
        self.shared.id
    }

    /// Current lifecycle state.
    pub fn state(&self) -> JobState {
        self.shared.state()
    }

    /// Frames delivered so far.
    pub fn frames_completed(&self) -> u64 {
        self.shared.frames_completed()
    }

    /// Request cancellation without waiting.
    pub fn cancel(&self) {
        self.shared.cancel.cancel();
    }

    /// Block until the job reaches a terminal state.
    pub fn wait(&self) -> JobReport {
        self.shared.wait()
    }
}

struct ActivePreview {
    shared: Arc<JobShared>,
    worker: JoinHandle<()>,
}

/// Result of an MP4 export.
#[derive(Debug)]
pub enum ExportOutcome {
    /// The file at `path` is complete.
    Completed {
        /// Final output file.
        path: PathBuf,
        /// Job summary.
        report: JobReport,
    },
    /// Stopped on request; no output file was left behind.
    Cancelled(JobReport),
    /// Stopped on error; no output file was left behind.
    Failed(AnimatorError),
}

impl ExportOutcome {
    fn from_report(path: PathBuf, report: JobReport) -> Self {
        match report.outcome {
            JobOutcome::Completed => Self::Completed { path, report },
            JobOutcome::Cancelled => Self::Cancelled(report),
            JobOutcome::Failed(ref e) => Self::Failed(e.duplicate()),
        }
    }
}

/// A background export.
#[derive(Debug)]
pub struct ExportHandle {
    job_id: JobId,
    cancel: CancelToken,
    worker: JoinHandle<ExportOutcome>,
}

impl ExportHandle {
    /// Job identity.
    pub fn job_id(&self) -> JobId {
        self.job_id
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// A clone of the cancellation token, for another thread.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Wait for the export to finish.
    pub fn join(self) -> ExportOutcome {
        self.worker.join().unwrap_or_else(|_| {
            ExportOutcome::Failed(AnimatorError::evaluation("export worker panicked"))
        })
    }
}

/// Runs preview and export jobs against shared frame caches.
///
/// At most one preview job runs at a time: a new request cancels the previous one and waits for it
/// to stop before starting. Exports are independent of previews and of each other.
pub struct GenerationController {
    preview_cache: Arc<FrameCache>,
    export_cache: Arc<FrameCache>,
    active_preview: Mutex<Option<ActivePreview>>,
    next_id: AtomicU64,
}

impl GenerationController {
    /// Create a controller with default cache sizes.
    pub fn new() -> AnimatorResult<Self> {
        Self::with_opts(ControllerOpts::default())
    }

    /// Create a controller with explicit cache sizes.
    pub fn with_opts(opts: ControllerOpts) -> AnimatorResult<Self> {
        Ok(Self {
            preview_cache: Arc::new(FrameCache::new(opts.preview_cache)?),
            export_cache: Arc::new(FrameCache::new(opts.export_cache)?),
            active_preview: Mutex::new(None),
            next_id: AtomicU64::new(1),
        })
    }

    /// Cache used by preview jobs.
    pub fn preview_cache(&self) -> &Arc<FrameCache> {
        &self.preview_cache
    }

    /// Cache used by export jobs.
    pub fn export_cache(&self) -> &Arc<FrameCache> {
        &self.export_cache
    }

    fn next_job_id(&self) -> JobId {
        JobId(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Start a low-resolution preview of the first document on a worker thread.
    ///
    /// Invalid settings are rejected before the running preview is touched.
    #[tracing::instrument(skip_all, fields(documents = documents.len()))]
    pub fn submit_preview(
        &self,
        documents: &[DocumentOccurrences],
        settings: &Settings,
        sink: Box<dyn FrameSink>,
    ) -> AnimatorResult<PreviewHandle> {
        settings.validate()?;
        let first = &documents[..documents.len().min(1)];
        let timeline = Arc::new(Timeline::build(first, settings.wps, settings.timeline_fps()?)?);
        let config = settings.effects_config(Resolution::Preview);

        let mut active = self
            .active_preview
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        if let Some(old) = active.take() {
            tracing::debug!(job = %old.shared.id, "preempting preview");
            old.shared.cancel.cancel();
            if old.worker.join().is_err() {
                tracing::warn!(job = %old.shared.id, "preview worker panicked");
            }
        }

        let shared = Arc::new(JobShared::new(
            self.next_job_id(),
            JobKind::Preview,
            CancelToken::new(),
        ));
        let worker = {
            let shared = shared.clone();
            let cache = self.preview_cache.clone();
            let mut sink = sink;
            std::thread::Builder::new()
                .name(format!("preview-{}", shared.id.0))
                .spawn(move || {
                    let _guard = FailOnUnwind(&shared);
                    let opts = RunOpts::default();
                    let input = JobInput {
                        timeline: &timeline,
                        config,
                        cache: &cache,
                        audio: None,
                        opts: &opts,
                    };
                    run_job(&shared, input, sink.as_mut());
                })
                .map_err(|e| AnimatorError::evaluation(format!("failed to spawn preview worker: {e}")))?
        };

        *active = Some(ActivePreview {
            shared: shared.clone(),
            worker,
        });
        Ok(PreviewHandle { shared })
    }

    /// Cancel the running preview, if any, and wait for its report.
    pub fn cancel_preview(&self) -> Option<JobReport> {
        let old = self
            .active_preview
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()?;
        old.shared.cancel.cancel();
        let _ = old.worker.join();
        Some(old.shared.wait())
    }

    /// Render every document at export resolution into `sink` on the calling thread.
    ///
    /// `Err` means the request was rejected before the job started.
    #[tracing::instrument(skip_all, fields(documents = documents.len()))]
    pub fn export_to_sink(
        &self,
        documents: &[DocumentOccurrences],
        settings: &Settings,
        sink: &mut dyn FrameSink,
        opts: &RunOpts,
        cancel: CancelToken,
    ) -> AnimatorResult<JobReport> {
        settings.validate()?;
        let timeline = Timeline::build(documents, settings.wps, settings.timeline_fps()?)?;
        let shared = JobShared::new(self.next_job_id(), JobKind::Export, cancel);
        Ok(run_export(&shared, &timeline, settings, &self.export_cache, sink, opts))
    }

    /// Export an MP4 to `out_path` on the calling thread.
    pub fn export_mp4(
        &self,
        documents: &[DocumentOccurrences],
        settings: &Settings,
        out_path: &Path,
        opts: &RunOpts,
        cancel: CancelToken,
    ) -> ExportOutcome {
        let mut sink = FfmpegSink::new(FfmpegSinkOpts::new(out_path));
        match self.export_to_sink(documents, settings, &mut sink, opts, cancel) {
            Ok(report) => ExportOutcome::from_report(out_path.to_path_buf(), report),
            Err(e) => ExportOutcome::Failed(e),
        }
    }

    /// Export an MP4 on a background thread.
    pub fn spawn_export(
        &self,
        documents: Vec<DocumentOccurrences>,
        settings: Settings,
        out_path: PathBuf,
        opts: RunOpts,
    ) -> AnimatorResult<ExportHandle> {
        settings.validate()?;
        let job_id = self.next_job_id();
        let cancel = CancelToken::new();
        let cache = self.export_cache.clone();
        let worker_cancel = cancel.clone();
        let worker = std::thread::Builder::new()
            .name(format!("export-{}", job_id.0))
            .spawn(move || {
                let timeline = match settings
                    .timeline_fps()
                    .and_then(|fps| Timeline::build(&documents, settings.wps, fps))
                {
                    Ok(t) => t,
                    Err(e) => return ExportOutcome::Failed(e),
                };
                let shared = JobShared::new(job_id, JobKind::Export, worker_cancel);
                let mut sink = FfmpegSink::new(FfmpegSinkOpts::new(&out_path));
                let report = run_export(&shared, &timeline, &settings, &cache, &mut sink, &opts);
                ExportOutcome::from_report(out_path, report)
            })
            .map_err(|e| AnimatorError::evaluation(format!("failed to spawn export worker: {e}")))?;

        Ok(ExportHandle {
            job_id,
            cancel,
            worker,
        })
    }
}

impl Drop for GenerationController {
    fn drop(&mut self) {
        let active = self
            .active_preview
            .get_mut()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        if let Some(old) = active {
            old.shared.cancel.cancel();
            let _ = old.worker.join();
        }
    }
}

fn run_export(
    shared: &JobShared,
    timeline: &Timeline,
    settings: &Settings,
    cache: &FrameCache,
    sink: &mut dyn FrameSink,
    opts: &RunOpts,
) -> JobReport {
    let mut audio_tmp = TempFileGuard(None);
    let audio = match prepare_audio(shared.id, timeline, settings, &mut audio_tmp) {
        Ok(a) => a,
        Err(e) => {
            shared.set_running();
            return shared.finish(JobOutcome::Failed(e));
        }
    };

    let input = JobInput {
        timeline,
        config: settings.effects_config(Resolution::Export),
        cache,
        audio,
        opts,
    };
    let report = run_job(shared, input, sink);
    drop(audio_tmp);
    report
}

/// Mix the cue at every transition into a temporary `f32le` track the length of the video.
fn prepare_audio(
    job: JobId,
    timeline: &Timeline,
    settings: &Settings,
    guard: &mut TempFileGuard,
) -> AnimatorResult<Option<AudioInputConfig>> {
    let Some(path) = settings.audio_path.as_ref() else {
        return Ok(None);
    };
    if timeline.is_empty() {
        return Ok(None);
    }

    let cue = AudioCue::open(path)?;
    let manifest = build_cue_manifest(timeline, &cue);
    let mixed = mix_manifest(&manifest);
    let out = std::env::temp_dir().join(format!(
        "paper_animator_mix_{}_{}.f32le",
        std::process::id(),
        job.0
    ));
    write_mix_to_f32le_file(&mixed, &out)?;
    guard.0 = Some(out.clone());
    tracing::debug!(segments = manifest.segments.len(), "audio cue track mixed");

    Ok(Some(AudioInputConfig {
        path: out,
        sample_rate: manifest.sample_rate,
        channels: manifest.channels,
    }))
}

/// Publishes a `Failed` report if the worker unwinds before the job finished, so waiters wake up.
struct FailOnUnwind<'a>(&'a JobShared);

impl Drop for FailOnUnwind<'_> {
    fn drop(&mut self) {
        if !self.0.state().is_terminal() {
            self.0
                .finish(JobOutcome::Failed(AnimatorError::evaluation("job worker panicked")));
        }
    }
}

struct TempFileGuard(Option<PathBuf>);

impl Drop for TempFileGuard {
    fn drop(&mut self) {
        if let Some(path) = self.0.take() {
            let _ = std::fs::remove_file(path);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/controller.rs"]
mod tests;
