use crate::cache::{FrameCache, fingerprint_frame};
use crate::effects::chain::compose_frame;
use crate::effects::config::EffectsConfig;
use crate::encode::sink::{AudioInputConfig, FrameSink, SinkConfig};
use crate::foundation::core::{FrameIndex, FrameRGBA};
use crate::foundation::error::{AnimatorError, AnimatorResult};
use crate::session::job::{JobOutcome, JobReport, JobShared};
use crate::timeline::{FrameScene, FrameSpec, Timeline};
use rayon::prelude::*;
use std::sync::{Arc, Mutex, mpsc};

const MAX_REORDER_BUFFER_BYTES: u64 = 128 * 1024 * 1024;

/// Knobs for one job run.
#[derive(Clone, Debug)]
pub struct RunOpts {
    /// Compute frames on a rayon pool, emitting them in order.
    pub parallel: bool,
    /// Worker threads when `parallel`; `None` uses rayon defaults.
    pub threads: Option<usize>,
    /// Frames computed per parallel batch.
    pub chunk_size: usize,
    /// Bounded queue between frame production and the sink thread.
    pub channel_capacity: usize,
}

impl Default for RunOpts {
    fn default() -> Self {
        Self {
            parallel: false,
            threads: None,
            chunk_size: 16,
            channel_capacity: 2,
        }
    }
}

/// Everything a job needs besides its sink.
pub(crate) struct JobInput<'a> {
    pub(crate) timeline: &'a Timeline,
    pub(crate) config: EffectsConfig,
    pub(crate) cache: &'a FrameCache,
    pub(crate) audio: Option<AudioInputConfig>,
    pub(crate) opts: &'a RunOpts,
}

#[derive(Debug)]
struct FrameMsg {
    idx: FrameIndex,
    frame: Arc<FrameRGBA>,
}

enum Produced {
    Done,
    Cancelled,
    Failed(AnimatorError),
}

/// Last decoded page, so consecutive frames on one page decode it once.
#[derive(Default)]
struct PageMemo {
    last: Mutex<Option<((usize, usize), Arc<image::RgbaImage>)>>,
}

impl PageMemo {
    fn load(&self, timeline: &Timeline, document: usize, record: usize) -> AnimatorResult<Arc<image::RgbaImage>> {
        {
            let last = self.last.lock().unwrap_or_else(|e| e.into_inner());
            if let Some((key, img)) = last.as_ref()
                && *key == (document, record)
            {
                return Ok(img.clone());
            }
        }
        let rec = timeline
            .documents()
            .get(document)
            .and_then(|d| d.records.get(record))
            .ok_or_else(|| AnimatorError::evaluation("frame references an unknown record"))?;
        let img = rec.load_page()?;
        *self.last.lock().unwrap_or_else(|e| e.into_inner()) = Some(((document, record), img.clone()));
        Ok(img)
    }
}

/// Cached frame or a fresh composite. Failed frames never reach the cache.
fn produce_frame(
    input: &JobInput<'_>,
    pages: &PageMemo,
    spec: &FrameSpec,
) -> AnimatorResult<(Arc<FrameRGBA>, bool)> {
    let scene = FrameScene::resolve(input.timeline, spec)?;
    let fp = fingerprint_frame(spec.frame_index, &scene, &input.config);
    if let Some(hit) = input.cache.get(&fp) {
        return Ok((hit.frame, true));
    }

    let page = pages.load(input.timeline, scene.document, scene.record)?;
    let frame = Arc::new(compose_frame(&page, &scene, &input.config)?);
    let stored = input.cache.put(fp, frame, input.config.resolution);
    Ok((stored.frame, false))
}

/// Run a job to its terminal state, streaming frames in index order into `sink`.
///
/// The sink runs on its own scoped thread fed through a bounded channel; it stops delivering as
/// soon as the job is cancelled and then calls `abort` instead of `end`.
pub(crate) fn run_job(shared: &JobShared, input: JobInput<'_>, sink: &mut dyn FrameSink) -> JobReport {
    shared.set_running();
    tracing::info!(job = %shared.id, kind = ?shared.kind, frames = input.timeline.len(), "job started");

    if input.timeline.is_empty() {
        let report = shared.finish(JobOutcome::Completed);
        tracing::info!(job = %shared.id, "empty timeline, nothing to render");
        return report;
    }

    let outcome = match stream_frames(shared, &input, sink) {
        Err(e) => JobOutcome::Failed(e),
        Ok(Produced::Failed(e)) => JobOutcome::Failed(e),
        Ok(Produced::Cancelled) => JobOutcome::Cancelled,
        Ok(Produced::Done) if shared.cancel.is_cancelled() => JobOutcome::Cancelled,
        Ok(Produced::Done) => JobOutcome::Completed,
    };
    match &outcome {
        JobOutcome::Failed(e) => tracing::warn!(job = %shared.id, "job failed: {e}"),
        other => tracing::info!(job = %shared.id, state = ?other.state(), "job finished"),
    }
    shared.finish(outcome)
}

fn stream_frames(
    shared: &JobShared,
    input: &JobInput<'_>,
    sink: &mut dyn FrameSink,
) -> AnimatorResult<Produced> {
    let canvas = input.config.canvas();
    let cfg = SinkConfig {
        width: canvas.width,
        height: canvas.height,
        fps: input.timeline.fps(),
        audio: input.audio.clone(),
    };
    let total = input.timeline.len();
    let cancel = &shared.cancel;

    std::thread::scope(|scope| -> AnimatorResult<Produced> {
        let (tx, rx) = mpsc::sync_channel::<FrameMsg>(input.opts.channel_capacity.max(1));
        let sink_ref: &mut dyn FrameSink = sink;

        let enc = scope.spawn(move || -> AnimatorResult<()> {
            sink_ref.begin(cfg)?;
            let mut delivered = 0u64;
            match deliver(&rx, sink_ref, shared, &mut delivered) {
                Ok(()) if delivered == total && !cancel.is_cancelled() => sink_ref.end(),
                Ok(()) => sink_ref.abort(),
                Err(e) => {
                    if let Err(abort_err) = sink_ref.abort() {
                        tracing::warn!("sink abort failed: {abort_err}");
                    }
                    Err(e)
                }
            }
        });

        let produced = if input.opts.parallel {
            produce_parallel(shared, input, &tx)
        } else {
            produce_sequential(shared, input, &tx)
        };

        drop(tx);
        let enc_res = enc
            .join()
            .map_err(|_| AnimatorError::evaluation("sink thread panicked"))?;

        // Sink failures win: they usually explain why production stopped.
        enc_res?;
        produced
    })
}

fn deliver(
    rx: &mpsc::Receiver<FrameMsg>,
    sink: &mut dyn FrameSink,
    shared: &JobShared,
    delivered: &mut u64,
) -> AnimatorResult<()> {
    for msg in rx.iter() {
        if shared.cancel.is_cancelled() {
            break;
        }
        if msg.idx.0 != *delivered {
            return Err(AnimatorError::evaluation("sink received a frame out of order"));
        }
        sink.push_frame(msg.idx, &msg.frame)?;
        shared.add_completed();
        *delivered += 1;
    }
    Ok(())
}

fn send(tx: &mpsc::SyncSender<FrameMsg>, idx: FrameIndex, frame: Arc<FrameRGBA>) -> bool {
    tx.send(FrameMsg { idx, frame }).is_ok()
}

fn produce_sequential(
    shared: &JobShared,
    input: &JobInput<'_>,
    tx: &mpsc::SyncSender<FrameMsg>,
) -> AnimatorResult<Produced> {
    let pages = PageMemo::default();
    for spec in input.timeline.frames() {
        if shared.cancel.is_cancelled() {
            return Ok(Produced::Cancelled);
        }
        let (frame, from_cache) = match produce_frame(input, &pages, spec) {
            Ok(v) => v,
            Err(e) => return Ok(Produced::Failed(e)),
        };
        if from_cache {
            shared.add_from_cache();
        }
        if !send(tx, spec.frame_index, frame) {
            // Sink thread ended early; its result carries the reason.
            return Ok(Produced::Done);
        }
    }
    Ok(Produced::Done)
}

fn produce_parallel(
    shared: &JobShared,
    input: &JobInput<'_>,
    tx: &mpsc::SyncSender<FrameMsg>,
) -> AnimatorResult<Produced> {
    let pool = build_thread_pool(input.opts.threads)?;
    let pages = PageMemo::default();
    let frames = input.timeline.frames();

    let bytes_per_frame = (input.config.canvas().rgba_len() as u64).max(1);
    let max_chunk_by_mem = (MAX_REORDER_BUFFER_BYTES / bytes_per_frame).max(1) as usize;
    let chunk_size = input.opts.chunk_size.max(1).min(max_chunk_by_mem);

    for chunk in frames.chunks(chunk_size) {
        if shared.cancel.is_cancelled() {
            return Ok(Produced::Cancelled);
        }
        let results: Vec<Option<AnimatorResult<(Arc<FrameRGBA>, bool)>>> = pool.install(|| {
            chunk
                .par_iter()
                .map(|spec| {
                    if shared.cancel.is_cancelled() {
                        None
                    } else {
                        Some(produce_frame(input, &pages, spec))
                    }
                })
                .collect()
        });
        tracing::debug!(job = %shared.id, first = chunk[0].frame_index.0, len = chunk.len(), "chunk rendered");

        for (spec, res) in chunk.iter().zip(results) {
            let (frame, from_cache) = match res {
                None => return Ok(Produced::Cancelled),
                Some(Err(e)) => return Ok(Produced::Failed(e)),
                Some(Ok(v)) => v,
            };
            if shared.cancel.is_cancelled() {
                return Ok(Produced::Cancelled);
            }
            if from_cache {
                shared.add_from_cache();
            }
            if !send(tx, spec.frame_index, frame) {
                return Ok(Produced::Done);
            }
        }
    }
    Ok(Produced::Done)
}

fn build_thread_pool(threads: Option<usize>) -> AnimatorResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(AnimatorError::invalid_config(
            "parallel export 'threads' must be >= 1 when set",
        ));
    }
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| AnimatorError::evaluation(format!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/session/runner.rs"]
mod tests;
