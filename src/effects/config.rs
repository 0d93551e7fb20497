use crate::foundation::core::Canvas;
use crate::foundation::error::{AnimatorError, AnimatorResult};
use std::str::FromStr;

/// Export canvas width for landscape output; pixel-unit effect parameters are specified at this
/// scale and shrink proportionally for smaller targets.
pub const EXPORT_LONG_EDGE: u32 = 1920;
/// Export canvas short edge.
pub const EXPORT_SHORT_EDGE: u32 = 1080;
/// Preview canvas long edge.
pub const PREVIEW_LONG_EDGE: u32 = 960;
/// Preview canvas short edge.
pub const PREVIEW_SHORT_EDGE: u32 = 540;

/// Blur variant applied as the last compositing stage.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlurKind {
    /// No blur.
    #[default]
    #[serde(alias = "None")]
    None,
    /// Isotropic gaussian blur.
    #[serde(alias = "Gaussian")]
    Gaussian,
    /// Motion blur along the vertical axis.
    #[serde(alias = "Vertical")]
    Vertical,
    /// Sharp center, blur increasing with distance from the center.
    #[serde(alias = "Radial", alias = "Radial (Center Clear)")]
    Radial,
}

impl BlurKind {
    /// Blur extent at export scale for an intensity in `[0, 1]`: the gaussian sigma for gaussian and
    /// radial blur, the kernel length in rows for vertical blur.
    ///
    /// Passes through the low, medium and high preset values at 0.0, 0.5 and 1.0 and is linear in
    /// between.
    pub fn extent(self, intensity: f32) -> f32 {
        let [low, medium, high] = match self {
            Self::None => return 0.0,
            Self::Gaussian => [2.0, 5.0, 10.0],
            Self::Vertical => [10.0, 25.0, 45.0],
            Self::Radial => [4.0, 8.0, 15.0],
        };
        let s = intensity.clamp(0.0, 1.0);
        if s <= 0.5 {
            low + (medium - low) * s * 2.0
        } else {
            medium + (high - medium) * (s - 0.5) * 2.0
        }
    }

    /// Stable tag used for hashing.
    pub(crate) fn tag(self) -> u8 {
        match self {
            Self::None => 0,
            Self::Gaussian => 1,
            Self::Vertical => 2,
            Self::Radial => 3,
        }
    }
}

impl FromStr for BlurKind {
    type Err = AnimatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "gaussian" => Ok(Self::Gaussian),
            "vertical" => Ok(Self::Vertical),
            "radial" | "radial (center clear)" => Ok(Self::Radial),
            other => Err(AnimatorError::invalid_config(format!(
                "unsupported blur type '{other}'"
            ))),
        }
    }
}

/// Named blur intensity presets; the pipeline itself works on the scalar.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlurPreset {
    /// 0.0
    Low,
    /// 0.5
    Medium,
    /// 1.0
    High,
}

impl BlurPreset {
    /// Scalar intensity in `[0, 1]`.
    pub fn scalar(self) -> f32 {
        match self {
            Self::Low => 0.0,
            Self::Medium => 0.5,
            Self::High => 1.0,
        }
    }
}

impl FromStr for BlurPreset {
    type Err = AnimatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(AnimatorError::invalid_config(format!(
                "unknown blur intensity '{other}'"
            ))),
        }
    }
}

/// Output aspect.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Orientation {
    /// 16:9 landscape.
    #[default]
    #[serde(rename = "16:9")]
    Landscape,
    /// 9:16 portrait.
    #[serde(rename = "9:16")]
    Portrait,
}

impl FromStr for Orientation {
    type Err = AnimatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "16:9" => Ok(Self::Landscape),
            "9:16" => Ok(Self::Portrait),
            other => Err(AnimatorError::invalid_config(format!(
                "unsupported orientation '{other}' (expected 16:9 or 9:16)"
            ))),
        }
    }
}

/// Target output size class.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Resolution {
    /// Low resolution interactive preview.
    Preview,
    /// Full resolution export.
    Export,
}

/// Immutable description of every pixel-affecting compositing setting.
///
/// Equality is field-wise; it drives both cache fingerprints and "settings changed" detection.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EffectsConfig {
    /// Invert the page colors.
    pub dark_theme: bool,
    /// Draw highlighter boxes over revealed words.
    pub highlight_enabled: bool,
    /// Offset red/blue channels.
    pub chromatic_enabled: bool,
    /// Blend a paper grain texture.
    pub paper_enabled: bool,
    /// Blur variant.
    pub blur_type: BlurKind,
    /// Blur strength in `[0, 1]`.
    pub blur_intensity: f32,
    /// Highlight box scale relative to the word box.
    pub highlight_size: f32,
    /// Output aspect.
    pub orientation: Orientation,
    /// Output size class.
    pub resolution: Resolution,
}

impl Default for EffectsConfig {
    fn default() -> Self {
        Self {
            dark_theme: false,
            highlight_enabled: true,
            chromatic_enabled: false,
            paper_enabled: false,
            blur_type: BlurKind::None,
            blur_intensity: 0.0,
            highlight_size: 1.0,
            orientation: Orientation::Landscape,
            resolution: Resolution::Export,
        }
    }
}

impl EffectsConfig {
    /// Reject values the compositor cannot honor.
    pub fn validate(&self) -> AnimatorResult<()> {
        if !self.blur_intensity.is_finite() || !(0.0..=1.0).contains(&self.blur_intensity) {
            return Err(AnimatorError::invalid_config(format!(
                "blur intensity must be within [0, 1], got {}",
                self.blur_intensity
            )));
        }
        if !self.highlight_size.is_finite() || self.highlight_size <= 0.0 {
            return Err(AnimatorError::invalid_config(format!(
                "highlight size multiplier must be > 0, got {}",
                self.highlight_size
            )));
        }
        Ok(())
    }

    /// Same settings at another resolution.
    pub fn with_resolution(mut self, resolution: Resolution) -> Self {
        self.resolution = resolution;
        self
    }

    /// Output canvas for this orientation and resolution.
    pub fn canvas(&self) -> Canvas {
        let (long, short) = match self.resolution {
            Resolution::Export => (EXPORT_LONG_EDGE, EXPORT_SHORT_EDGE),
            Resolution::Preview => (PREVIEW_LONG_EDGE, PREVIEW_SHORT_EDGE),
        };
        match self.orientation {
            Orientation::Landscape => Canvas {
                width: long,
                height: short,
            },
            Orientation::Portrait => Canvas {
                width: short,
                height: long,
            },
        }
    }

    /// Factor applied to pixel-unit parameters (blur radii, offsets, corner radii).
    pub fn pixel_scale(&self) -> f32 {
        match self.resolution {
            Resolution::Export => 1.0,
            Resolution::Preview => PREVIEW_LONG_EDGE as f32 / EXPORT_LONG_EDGE as f32,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/config.rs"]
mod tests;
