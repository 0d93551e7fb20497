use super::*;
use crate::effects::config::{Orientation, Resolution};

fn page() -> image::RgbaImage {
    let mut img = image::RgbaImage::from_pixel(400, 200, image::Rgba([250, 248, 240, 255]));
    for y in 90..110 {
        for x in (60..340).filter(|x| x % 7 < 4) {
            img.put_pixel(x, y, image::Rgba([20, 20, 20, 255]));
        }
    }
    img
}

fn scene() -> FrameScene {
    FrameScene {
        document_id: DocumentId::new("a.pdf"),
        document: 0,
        record: 0,
        page_index: 0,
        focus: Rect::new(180.0, 88.0, 230.0, 112.0),
        current: vec![Rect::new(180.0, 88.0, 230.0, 112.0)],
        previous: vec![Rect::new(120.0, 88.0, 170.0, 112.0)],
    }
}

fn preview(cfg: EffectsConfig) -> EffectsConfig {
    cfg.with_resolution(Resolution::Preview)
}

#[test]
fn chain_order_is_fixed() {
    let cfg = EffectsConfig {
        dark_theme: true,
        highlight_enabled: true,
        chromatic_enabled: true,
        paper_enabled: true,
        blur_type: BlurKind::Radial,
        ..Default::default()
    };
    assert_eq!(
        EffectChain::from_config(&cfg).stages(),
        &[
            Effect::Theme,
            Effect::Highlight,
            Effect::Paper,
            Effect::Chromatic,
            Effect::Blur(BlurKind::Radial)
        ]
    );

    let plain = EffectsConfig {
        highlight_enabled: false,
        ..Default::default()
    };
    assert!(EffectChain::from_config(&plain).stages().is_empty());
}

#[test]
fn compose_is_pure() {
    let cfg = preview(EffectsConfig {
        paper_enabled: true,
        chromatic_enabled: true,
        blur_type: BlurKind::Gaussian,
        blur_intensity: 0.5,
        ..Default::default()
    });
    let a = compose_frame(&page(), &scene(), &cfg).unwrap();
    let b = compose_frame(&page(), &scene(), &cfg).unwrap();
    assert_eq!(a, b);
    assert_eq!((a.width, a.height), (960, 540));
    assert!(a.data.chunks_exact(4).all(|px| px[3] == 255));
}

#[test]
fn portrait_preview_has_portrait_canvas() {
    let cfg = preview(EffectsConfig {
        orientation: Orientation::Portrait,
        ..Default::default()
    });
    let f = compose_frame(&page(), &scene(), &cfg).unwrap();
    assert_eq!((f.width, f.height), (540, 960));
}

#[test]
fn every_toggle_changes_pixels() {
    let base_cfg = preview(EffectsConfig::default());
    let base = compose_frame(&page(), &scene(), &base_cfg).unwrap();
    let variants = [
        EffectsConfig {
            dark_theme: true,
            ..base_cfg
        },
        EffectsConfig {
            highlight_enabled: false,
            ..base_cfg
        },
        EffectsConfig {
            paper_enabled: true,
            ..base_cfg
        },
        EffectsConfig {
            chromatic_enabled: true,
            ..base_cfg
        },
        EffectsConfig {
            blur_type: BlurKind::Vertical,
            ..base_cfg
        },
        EffectsConfig {
            highlight_size: 1.6,
            ..base_cfg
        },
    ];
    for cfg in variants {
        let f = compose_frame(&page(), &scene(), &cfg).unwrap();
        assert_ne!(f, base, "{cfg:?}");
    }
}

#[test]
fn preview_tracks_downscaled_export() {
    let cfg = EffectsConfig::default();
    let export = compose_frame(&page(), &scene(), &cfg).unwrap();
    let preview = compose_frame(&page(), &scene(), &preview(cfg)).unwrap();

    let down = image::imageops::resize(
        &export.to_image().unwrap(),
        preview.width,
        preview.height,
        image::imageops::FilterType::Triangle,
    );
    let total: u64 = down
        .as_raw()
        .iter()
        .zip(&preview.data)
        .map(|(a, b)| u64::from(a.abs_diff(*b)))
        .sum();
    let mean = total as f64 / preview.data.len() as f64;
    assert!(mean < 4.0, "mean abs diff {mean}");
}
