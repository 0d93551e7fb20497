use super::*;

#[test]
fn canvas_follows_orientation_and_resolution() {
    let mut cfg = EffectsConfig::default();
    assert_eq!(
        cfg.canvas(),
        Canvas {
            width: 1920,
            height: 1080
        }
    );
    cfg.orientation = Orientation::Portrait;
    assert_eq!(
        cfg.canvas(),
        Canvas {
            width: 1080,
            height: 1920
        }
    );
    let preview = cfg.with_resolution(Resolution::Preview);
    assert_eq!(
        preview.canvas(),
        Canvas {
            width: 540,
            height: 960
        }
    );
    assert!((preview.pixel_scale() - 0.5).abs() < 1e-6);
}

#[test]
fn equality_is_field_wise() {
    let a = EffectsConfig::default();
    let mut b = a;
    assert_eq!(a, b);
    b.dark_theme = true;
    assert_ne!(a, b);
    assert_ne!(a, a.with_resolution(Resolution::Preview));
}

#[test]
fn validate_rejects_out_of_range_scalars() {
    let cfg = EffectsConfig {
        blur_intensity: 1.5,
        ..Default::default()
    };
    assert!(matches!(
        cfg.validate(),
        Err(AnimatorError::InvalidConfiguration(_))
    ));

    let cfg = EffectsConfig {
        highlight_size: 0.0,
        ..Default::default()
    };
    assert!(cfg.validate().is_err());
    assert!(EffectsConfig::default().validate().is_ok());
}

#[test]
fn labels_parse_and_unknown_blur_is_rejected() {
    assert_eq!("Gaussian".parse::<BlurKind>().unwrap(), BlurKind::Gaussian);
    assert_eq!(
        "Radial (Center Clear)".parse::<BlurKind>().unwrap(),
        BlurKind::Radial
    );
    assert!(matches!(
        "zoom".parse::<BlurKind>(),
        Err(AnimatorError::InvalidConfiguration(_))
    ));
    assert_eq!("9:16".parse::<Orientation>().unwrap(), Orientation::Portrait);
    assert_eq!("medium".parse::<BlurPreset>().unwrap().scalar(), 0.5);
}

#[test]
fn blur_extent_hits_the_preset_values() {
    let medium = BlurPreset::Medium.scalar();
    assert_eq!(BlurKind::Gaussian.extent(medium), 5.0);
    assert_eq!(BlurKind::Vertical.extent(medium), 25.0);
    assert_eq!(BlurKind::Radial.extent(medium), 8.0);

    let low = BlurPreset::Low.scalar();
    let high = BlurPreset::High.scalar();
    assert_eq!(
        [BlurKind::Gaussian.extent(low), BlurKind::Vertical.extent(low), BlurKind::Radial.extent(low)],
        [2.0, 10.0, 4.0]
    );
    assert_eq!(
        [BlurKind::Gaussian.extent(high), BlurKind::Vertical.extent(high), BlurKind::Radial.extent(high)],
        [10.0, 45.0, 15.0]
    );
    assert_eq!(BlurKind::None.extent(high), 0.0);
}

#[test]
fn blur_extent_is_linear_between_presets() {
    assert!((BlurKind::Gaussian.extent(0.25) - 3.5).abs() < 1e-6);
    assert!((BlurKind::Vertical.extent(0.75) - 35.0).abs() < 1e-6);
    assert!((BlurKind::Radial.extent(0.75) - 11.5).abs() < 1e-6);
}
