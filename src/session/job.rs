use crate::foundation::error::AnimatorError;
use std::sync::atomic::{AtomicBool, AtomicU8, AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex};

/// Process-unique job identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JobId(pub u64);

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "job-{}", self.0)
    }
}

/// Which flow a job belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JobKind {
    /// Low resolution, first document, replaced by newer requests.
    Preview,
    /// Full resolution, all documents.
    Export,
}

/// Lifecycle: `Pending -> Running -> {Completed, Cancelled, Failed}`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JobState {
    /// Created, not started.
    Pending,
    /// Producing frames.
    Running,
    /// Every frame delivered.
    Completed,
    /// Stopped on request.
    Cancelled,
    /// Stopped on the first error.
    Failed,
}

impl JobState {
    fn to_u8(self) -> u8 {
        match self {
            Self::Pending => 0,
            Self::Running => 1,
            Self::Completed => 2,
            Self::Cancelled => 3,
            Self::Failed => 4,
        }
    }

    fn from_u8(v: u8) -> Self {
        match v {
            0 => Self::Pending,
            1 => Self::Running,
            2 => Self::Completed,
            3 => Self::Cancelled,
            _ => Self::Failed,
        }
    }

    /// `true` for the three end states.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled | Self::Failed)
    }
}

/// Cooperative cancellation flag, checked between frames.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Fresh, not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Has cancellation been requested?
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// How a job ended. Cancellation is a normal outcome, not an error.
#[derive(Debug)]
pub enum JobOutcome {
    /// Every frame delivered.
    Completed,
    /// Stopped on request.
    Cancelled,
    /// First error encountered.
    Failed(AnimatorError),
}

impl Clone for JobOutcome {
    fn clone(&self) -> Self {
        match self {
            Self::Completed => Self::Completed,
            Self::Cancelled => Self::Cancelled,
            Self::Failed(e) => Self::Failed(e.duplicate()),
        }
    }
}

impl JobOutcome {
    /// Matching terminal state.
    pub fn state(&self) -> JobState {
        match self {
            Self::Completed => JobState::Completed,
            Self::Cancelled => JobState::Cancelled,
            Self::Failed(_) => JobState::Failed,
        }
    }
}

/// Terminal summary of a job.
#[derive(Clone, Debug)]
pub struct JobReport {
    /// Job identity.
    pub job_id: JobId,
    /// Preview or export.
    pub kind: JobKind,
    /// How it ended.
    pub outcome: JobOutcome,
    /// Frames delivered to the sink.
    pub frames_completed: u64,
    /// Delivered frames served by the frame cache.
    pub frames_from_cache: u64,
}

/// State shared between a running job and the handles observing it.
#[derive(Debug)]
pub(crate) struct JobShared {
    pub(crate) id: JobId,
    pub(crate) kind: JobKind,
    pub(crate) cancel: CancelToken,
    state: AtomicU8,
    frames_completed: AtomicU64,
    frames_from_cache: AtomicU64,
    report: Mutex<Option<JobReport>>,
    done: Condvar,
}

impl JobShared {
    pub(crate) fn new(id: JobId, kind: JobKind, cancel: CancelToken) -> Self {
        Self {
            id,
            kind,
            cancel,
            state: AtomicU8::new(JobState::Pending.to_u8()),
            frames_completed: AtomicU64::new(0),
            frames_from_cache: AtomicU64::new(0),
            report: Mutex::new(None),
            done: Condvar::new(),
        }
    }

    pub(crate) fn state(&self) -> JobState {
        JobState::from_u8(self.state.load(Ordering::SeqCst))
    }

    pub(crate) fn set_running(&self) {
        self.state
            .store(JobState::Running.to_u8(), Ordering::SeqCst);
    }

    pub(crate) fn frames_completed(&self) -> u64 {
        self.frames_completed.load(Ordering::SeqCst)
    }

    pub(crate) fn add_completed(&self) {
        self.frames_completed.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn add_from_cache(&self) {
        self.frames_from_cache.fetch_add(1, Ordering::SeqCst);
    }

    /// Publish the terminal state and wake waiters.
    pub(crate) fn finish(&self, outcome: JobOutcome) -> JobReport {
        let report = JobReport {
            job_id: self.id,
            kind: self.kind,
            frames_completed: self.frames_completed(),
            frames_from_cache: self.frames_from_cache.load(Ordering::SeqCst),
            outcome,
        };
        self.state
            .store(report.outcome.state().to_u8(), Ordering::SeqCst);
        let mut slot = self.report.lock().unwrap_or_else(|e| e.into_inner());
        *slot = Some(report.clone());
        self.done.notify_all();
        report
    }

    /// Block until [`JobShared::finish`] ran.
    pub(crate) fn wait(&self) -> JobReport {
        let mut slot = self.report.lock().unwrap_or_else(|e| e.into_inner());
        loop {
            if let Some(r) = slot.as_ref() {
                return r.clone();
            }
            slot = self.done.wait(slot).unwrap_or_else(|e| e.into_inner());
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/job.rs"]
mod tests;
