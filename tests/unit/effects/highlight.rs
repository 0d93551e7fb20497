use super::*;

const CANVAS: Canvas = Canvas {
    width: 64,
    height: 32,
};

fn white() -> Vec<u8> {
    [255u8, 255, 255, 255].repeat(CANVAS.rgba_len() / 4)
}

fn px(frame: &[u8], x: u32, y: u32) -> [u8; 4] {
    let i = ((y * CANVAS.width + x) * 4) as usize;
    [frame[i], frame[i + 1], frame[i + 2], frame[i + 3]]
}

#[test]
fn unit_size_keeps_the_word_box() {
    let r = Rect::new(10.0, 10.0, 30.0, 20.0);
    assert_eq!(highlight_box(r, 1.0), r);
}

#[test]
fn enlarged_boxes_get_padding_from_the_word_size() {
    // 1.5 * 20 plus 15% of 20 per side; 1.5 * 10 plus 15% of 10 per side.
    let r = highlight_box(Rect::new(0.0, 0.0, 20.0, 10.0), 1.5);
    assert!((r.width() - 36.0).abs() < 1e-9);
    assert!((r.height() - 18.0).abs() < 1e-9);
    assert_eq!(r.center(), crate::foundation::core::Point::new(10.0, 5.0));
}

#[test]
fn light_theme_tints_yellow_and_stays_opaque() {
    let mut frame = white();
    let style = HighlightStyle::for_theme(false, 1.0);
    draw_highlights(&mut frame, CANVAS, &[Rect::new(8.0, 8.0, 40.0, 24.0)], &[], style).unwrap();

    let inside = px(&frame, 24, 16);
    assert_eq!(inside[0], 255);
    assert!(inside[2] < 255);
    assert_eq!(inside[3], 255);
    assert_eq!(px(&frame, 2, 2), [255, 255, 255, 255]);
}

#[test]
fn current_word_is_stronger_than_previous() {
    let style = HighlightStyle::for_theme(true, 1.0);
    let mut frame = white();
    draw_highlights(
        &mut frame,
        CANVAS,
        &[Rect::new(34.0, 8.0, 60.0, 24.0)],
        &[Rect::new(2.0, 8.0, 28.0, 24.0)],
        style,
    )
    .unwrap();
    let prev = px(&frame, 15, 16);
    let cur = px(&frame, 47, 16);
    assert!(cur[0] < prev[0]);
    assert!(prev[0] < 255);
}

#[test]
fn nothing_to_draw_is_a_noop() {
    let mut frame = white();
    draw_highlights(&mut frame, CANVAS, &[], &[], HighlightStyle::for_theme(false, 1.0)).unwrap();
    assert_eq!(frame, white());
}

#[test]
fn padding_does_not_grow_with_the_multiplier() {
    let word = Rect::new(0.0, 0.0, 40.0, 10.0);
    let a = highlight_box(word, 2.0);
    let b = highlight_box(word, 3.0);
    assert!((a.width() - (80.0 + 12.0)).abs() < 1e-9);
    assert!(((b.width() - a.width()) - 40.0).abs() < 1e-9);
}
