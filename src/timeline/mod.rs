//! Frame-indexed reveal schedule.

/// Word schedule and per-frame reveal state.
pub mod builder;
/// Geometry a single frame is composited from.
pub mod scene;

pub use builder::{FrameSpec, Timeline, TimelineWord};
pub use scene::FrameScene;
