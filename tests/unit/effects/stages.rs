use super::*;

#[test]
fn invert_twice_is_identity() {
    let src = vec![0u8, 10, 200, 255, 30, 40, 50, 255];
    let mut f = src.clone();
    invert_rgb(&mut f);
    assert_eq!(f[..4], [255, 245, 55, 255]);
    invert_rgb(&mut f);
    assert_eq!(f, src);
}

#[test]
fn paper_grain_is_seeded_and_subtle() {
    let canvas = Canvas {
        width: 16,
        height: 8,
    };
    let white = [255u8, 255, 255, 255].repeat(16 * 8);

    let mut a = white.clone();
    let mut b = white.clone();
    let mut c = white.clone();
    paper_grain(&mut a, canvas, 1);
    paper_grain(&mut b, canvas, 1);
    paper_grain(&mut c, canvas, 2);
    assert_eq!(a, b);
    assert_ne!(a, c);
    assert!(a.chunks_exact(4).all(|px| px[0] >= 234 && px[3] == 255));
}

#[test]
fn chromatic_rolls_red_left_and_blue_right() {
    let canvas = Canvas {
        width: 4,
        height: 1,
    };
    let mut f = vec![
        10, 0, 110, 255, //
        20, 0, 120, 255, //
        30, 0, 130, 255, //
        40, 0, 140, 255,
    ];
    chromatic_shift(&mut f, canvas, 1);
    let red: Vec<u8> = f.chunks_exact(4).map(|p| p[0]).collect();
    let blue: Vec<u8> = f.chunks_exact(4).map(|p| p[2]).collect();
    assert_eq!(red, vec![20, 30, 40, 10]);
    assert_eq!(blue, vec![140, 110, 120, 130]);
}
