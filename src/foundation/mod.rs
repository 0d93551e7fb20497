/// Frame, canvas and timing primitives.
pub mod core;
/// Error taxonomy.
pub mod error;
pub(crate) mod math;
