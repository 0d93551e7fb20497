//! Frame compositing: camera framing followed by a fixed sequence of pixel stages.

/// Separable and radial blur kernels.
pub mod blur;
/// Ordered stage pipeline and frame composition.
pub mod chain;
pub mod composite;
/// Effect toggles, presets and output geometry.
pub mod config;
pub mod framing;
/// Highlight boxes behind revealed words.
pub mod highlight;
pub mod stages;

pub use chain::{Effect, EffectChain, compose_frame};
pub use config::{BlurKind, BlurPreset, EffectsConfig, Orientation, Resolution};
