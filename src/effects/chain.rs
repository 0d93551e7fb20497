use crate::effects::blur::{gaussian_blur_rgba8, radial_blur_rgba8, vertical_blur_rgba8};
use crate::effects::config::{BlurKind, EffectsConfig};
use crate::effects::framing::Framing;
use crate::effects::highlight::{HighlightStyle, draw_highlights, highlight_box};
use crate::effects::stages::{CHROMATIC_OFFSET_PX, chromatic_shift, invert_rgb, paper_grain};
use crate::feed::occurrence::DocumentId;
use crate::foundation::core::{Canvas, FrameRGBA, Rect};
use crate::foundation::error::AnimatorResult;
use crate::foundation::math::{Fnv1a64, seed_from_str};
use crate::timeline::FrameScene;

/// One compositing stage. Stages run in declaration order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Effect {
    /// Dark theme inversion.
    Theme,
    /// Highlighter boxes over revealed words.
    Highlight,
    /// Paper grain.
    Paper,
    /// Red/blue channel offset.
    Chromatic,
    /// Final blur pass.
    Blur(BlurKind),
}

/// Canvas-space inputs shared by every stage of one frame.
#[derive(Clone, Debug)]
pub struct StageInput<'a> {
    /// Output canvas.
    pub canvas: Canvas,
    /// Settings for this frame.
    pub config: &'a EffectsConfig,
    /// Most recent word boxes, canvas coordinates.
    pub current: Vec<Rect>,
    /// Earlier word boxes, canvas coordinates.
    pub previous: Vec<Rect>,
    /// Paper grain seed.
    pub grain_seed: u64,
}

impl Effect {
    /// Apply this stage. Depends only on `frame` and `input`.
    pub fn apply(self, mut frame: Vec<u8>, input: &StageInput<'_>) -> AnimatorResult<Vec<u8>> {
        let cfg = input.config;
        let scale = cfg.pixel_scale();
        let (w, h) = (input.canvas.width, input.canvas.height);
        match self {
            Self::Theme => invert_rgb(&mut frame),
            Self::Highlight => {
                let style = HighlightStyle::for_theme(cfg.dark_theme, scale);
                draw_highlights(&mut frame, input.canvas, &input.current, &input.previous, style)?;
            }
            Self::Paper => paper_grain(&mut frame, input.canvas, input.grain_seed),
            Self::Chromatic => {
                let offset = (CHROMATIC_OFFSET_PX * scale).round().max(1.0) as u32;
                chromatic_shift(&mut frame, input.canvas, offset);
            }
            Self::Blur(kind) => {
                let extent = kind.extent(cfg.blur_intensity) * scale;
                frame = match kind {
                    BlurKind::None => frame,
                    BlurKind::Gaussian => gaussian_blur_rgba8(&frame, w, h, extent)?,
                    BlurKind::Vertical => vertical_blur_rgba8(&frame, w, h, extent.round() as u32)?,
                    BlurKind::Radial => radial_blur_rgba8(&frame, w, h, extent)?,
                };
            }
        }
        Ok(frame)
    }
}

/// Ordered list of the enabled stages for a configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EffectChain {
    stages: Vec<Effect>,
}

impl EffectChain {
    /// Theme, highlight, paper, chromatic, blur; disabled stages are left out.
    pub fn from_config(cfg: &EffectsConfig) -> Self {
        let mut stages = Vec::with_capacity(5);
        if cfg.dark_theme {
            stages.push(Effect::Theme);
        }
        if cfg.highlight_enabled {
            stages.push(Effect::Highlight);
        }
        if cfg.paper_enabled {
            stages.push(Effect::Paper);
        }
        if cfg.chromatic_enabled {
            stages.push(Effect::Chromatic);
        }
        if cfg.blur_type != BlurKind::None {
            stages.push(Effect::Blur(cfg.blur_type));
        }
        Self { stages }
    }

    /// Enabled stages in application order.
    pub fn stages(&self) -> &[Effect] {
        &self.stages
    }

    /// Run every stage over `frame`.
    pub fn apply(&self, mut frame: Vec<u8>, input: &StageInput<'_>) -> AnimatorResult<Vec<u8>> {
        for stage in &self.stages {
            frame = stage.apply(frame, input)?;
        }
        Ok(frame)
    }
}

/// Composite one output frame from its page raster.
///
/// The view is resampled straight to the configuration's canvas and every stage runs at that
/// size with pixel parameters scaled, so preview and export share one algorithm.
pub fn compose_frame(
    page: &image::RgbaImage,
    scene: &FrameScene,
    config: &EffectsConfig,
) -> AnimatorResult<FrameRGBA> {
    let canvas = config.canvas();
    let framing = Framing::around(scene.focus, canvas);
    let base = framing.extract(page)?;

    let map = |rects: &[Rect]| -> Vec<Rect> {
        rects
            .iter()
            .map(|r| framing.map_rect(highlight_box(*r, config.highlight_size)))
            .collect()
    };
    let input = StageInput {
        canvas,
        config,
        current: map(&scene.current),
        previous: map(&scene.previous),
        grain_seed: grain_seed(&scene.document_id, scene.page_index),
    };

    let data = EffectChain::from_config(config).apply(base.into_raw(), &input)?;
    Ok(FrameRGBA {
        width: canvas.width,
        height: canvas.height,
        data,
    })
}

fn grain_seed(document_id: &DocumentId, page_index: u32) -> u64 {
    let mut h = Fnv1a64::new(seed_from_str(document_id.as_str()));
    h.write_u64(u64::from(page_index));
    h.finish()
}

#[cfg(test)]
#[path = "../../tests/unit/effects/chain.rs"]
mod tests;
