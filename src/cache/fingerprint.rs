use crate::effects::config::{EffectsConfig, Orientation, Resolution};
use crate::foundation::core::{FrameIndex, Rect};
use crate::timeline::FrameScene;
use xxhash_rust::xxh3::Xxh3;

const XXH3_SEED: u64 = 0x5a17_c0de_93e1_4b2d;

/// Stable key over every pixel-affecting input of one frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameFingerprint {
    /// High 64 bits of the 128-bit digest.
    pub hi: u64,
    /// Low 64 bits of the 128-bit digest.
    pub lo: u64,
}

impl std::fmt::Display for FrameFingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:016x}{:016x}", self.hi, self.lo)
    }
}

/// Fingerprint of `(document, frame, scene, config)`.
///
/// The scene's word boxes are hashed alongside the frame index so that schedules built at
/// different rates never alias on the same index.
pub fn fingerprint_frame(
    frame: FrameIndex,
    scene: &FrameScene,
    config: &EffectsConfig,
) -> FrameFingerprint {
    let mut h = StableHasher::new();
    h.write_str(scene.document_id.as_str());
    h.write_u64(frame.0);
    h.write_u32(scene.page_index);
    write_rect(&mut h, scene.focus);
    h.write_u32(scene.current.len() as u32);
    for r in &scene.current {
        write_rect(&mut h, *r);
    }
    h.write_u32(scene.previous.len() as u32);
    for r in &scene.previous {
        write_rect(&mut h, *r);
    }
    write_config(&mut h, config);
    h.finish()
}

fn write_rect(h: &mut StableHasher, r: Rect) {
    h.write_f64(r.x0);
    h.write_f64(r.y0);
    h.write_f64(r.x1);
    h.write_f64(r.y1);
}

fn write_config(h: &mut StableHasher, config: &EffectsConfig) {
    // Destructured so a new field fails to compile until it is hashed.
    let EffectsConfig {
        dark_theme,
        highlight_enabled,
        chromatic_enabled,
        paper_enabled,
        blur_type,
        blur_intensity,
        highlight_size,
        orientation,
        resolution,
    } = *config;

    h.write_bool(dark_theme);
    h.write_bool(highlight_enabled);
    h.write_bool(chromatic_enabled);
    h.write_bool(paper_enabled);
    h.write_u8(blur_type.tag());
    h.write_f32(blur_intensity);
    h.write_f32(highlight_size);
    h.write_u8(match orientation {
        Orientation::Landscape => 0,
        Orientation::Portrait => 1,
    });
    h.write_u8(match resolution {
        Resolution::Preview => 0,
        Resolution::Export => 1,
    });
}

struct StableHasher {
    inner: Xxh3,
}

impl StableHasher {
    fn new() -> Self {
        Self {
            inner: Xxh3::with_seed(XXH3_SEED),
        }
    }

    fn write_bytes(&mut self, b: &[u8]) {
        self.inner.update(b);
    }

    fn write_u8(&mut self, v: u8) {
        self.write_bytes(&[v]);
    }

    fn write_bool(&mut self, v: bool) {
        self.write_u8(u8::from(v));
    }

    fn write_u32(&mut self, v: u32) {
        self.write_bytes(&v.to_le_bytes());
    }

    fn write_u64(&mut self, v: u64) {
        self.write_bytes(&v.to_le_bytes());
    }

    fn write_f32(&mut self, v: f32) {
        self.write_u32(v.to_bits());
    }

    fn write_f64(&mut self, v: f64) {
        self.write_u64(v.to_bits());
    }

    fn write_str(&mut self, s: &str) {
        self.write_u64(s.len() as u64);
        self.write_bytes(s.as_bytes());
    }

    fn finish(self) -> FrameFingerprint {
        let v = self.inner.digest128();
        FrameFingerprint {
            hi: (v >> 64) as u64,
            lo: v as u64,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/cache/fingerprint.rs"]
mod tests;
