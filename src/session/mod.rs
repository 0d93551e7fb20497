//! Job lifecycle: preview preemption, exports and cancellation.

/// Preview and export orchestration.
pub mod controller;
/// Job identity, state and reports.
pub mod job;
/// Frame production loop shared by all jobs.
pub mod runner;

pub use controller::{ControllerOpts, ExportHandle, ExportOutcome, GenerationController, PreviewHandle};
pub use job::{CancelToken, JobId, JobKind, JobOutcome, JobReport, JobState};
pub use runner::RunOpts;
