//! Settings snapshot handed to the pipeline by the control surface.

use crate::effects::config::{BlurKind, BlurPreset, EffectsConfig, Orientation, Resolution};
use crate::foundation::core::Fps;
use crate::foundation::error::{AnimatorError, AnimatorResult};
use std::path::{Path, PathBuf};

/// Default reveal speed in words per second.
pub const DEFAULT_WPS: f64 = 1.5;

/// User-facing settings. Missing JSON keys fall back to defaults.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Invert page colors.
    pub dark_theme: bool,
    /// Highlight revealed words.
    pub highlight: bool,
    /// Chromatic aberration.
    pub chromatic: bool,
    /// Paper grain overlay.
    pub paper: bool,
    /// Blur variant.
    pub blur_type: BlurKind,
    /// Blur strength: a number in `[0, 1]` or one of `low`, `medium`, `high`.
    #[serde(deserialize_with = "de_intensity")]
    pub blur_intensity: f32,
    /// Highlight box scale relative to the matched word.
    pub highlight_size: f32,
    /// Output aspect.
    pub orientation: Orientation,
    /// Reveal rate in words per second.
    pub wps: f64,
    /// Timeline frame rate.
    pub fps: u32,
    /// Optional sound cue played on every word transition.
    pub audio_path: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            dark_theme: false,
            highlight: true,
            chromatic: false,
            paper: false,
            blur_type: BlurKind::None,
            blur_intensity: BlurPreset::Low.scalar(),
            highlight_size: 1.0,
            orientation: Orientation::Landscape,
            wps: DEFAULT_WPS,
            fps: 30,
            audio_path: None,
        }
    }
}

impl Settings {
    /// Load settings from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> AnimatorResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            AnimatorError::invalid_config(format!(
                "failed to read settings '{}': {e}",
                path.display()
            ))
        })?;
        Self::from_json_str(&text)
    }

    /// Parse settings JSON (unknown labels fail with `InvalidConfiguration`).
    pub fn from_json_str(json: &str) -> AnimatorResult<Self> {
        let s: Self = serde_json::from_str(json)
            .map_err(|e| AnimatorError::invalid_config(format!("invalid settings: {e}")))?;
        s.validate()?;
        Ok(s)
    }

    /// Pretty JSON for saving.
    pub fn to_json_pretty(&self) -> AnimatorResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| AnimatorError::evaluation(format!("failed to serialize settings: {e}")))
    }

    /// Write settings as pretty JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> AnimatorResult<()> {
        let path = path.as_ref();
        let json = self.to_json_pretty()?;
        std::fs::write(path, json).map_err(|e| {
            AnimatorError::Other(anyhow::anyhow!(
                "failed to write settings '{}': {e}",
                path.display()
            ))
        })
    }

    /// Check the words-per-second rate.
    pub fn validate_rate(wps: f64) -> AnimatorResult<()> {
        if !wps.is_finite() || wps <= 0.0 {
            return Err(AnimatorError::invalid_config(format!(
                "words per second must be > 0, got {wps}"
            )));
        }
        Ok(())
    }

    /// Validate every field the pipeline consumes.
    pub fn validate(&self) -> AnimatorResult<()> {
        Self::validate_rate(self.wps)?;
        self.timeline_fps()?;
        self.effects_config(Resolution::Export).validate()
    }

    /// Timeline frame rate.
    pub fn timeline_fps(&self) -> AnimatorResult<Fps> {
        Fps::new(self.fps, 1)
    }

    /// Effects configuration at the given resolution.
    pub fn effects_config(&self, resolution: Resolution) -> EffectsConfig {
        EffectsConfig {
            dark_theme: self.dark_theme,
            highlight_enabled: self.highlight,
            chromatic_enabled: self.chromatic,
            paper_enabled: self.paper,
            blur_type: self.blur_type,
            blur_intensity: self.blur_intensity,
            highlight_size: self.highlight_size,
            orientation: self.orientation,
            resolution,
        }
    }
}

fn de_intensity<'de, D>(de: D) -> Result<f32, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(serde::Deserialize)]
    #[serde(untagged)]
    enum IntensityDef {
        Scalar(f32),
        Label(String),
    }

    match <IntensityDef as serde::Deserialize>::deserialize(de)? {
        IntensityDef::Scalar(v) => Ok(v),
        IntensityDef::Label(s) => s
            .parse::<BlurPreset>()
            .map(BlurPreset::scalar)
            .map_err(serde::de::Error::custom),
    }
}

#[cfg(test)]
#[path = "../tests/unit/config/settings.rs"]
mod tests;
