#![allow(dead_code)]

use std::path::{Path, PathBuf};

/// Fresh scratch directory under `target/`.
pub fn scratch_dir(name: &str) -> PathBuf {
    let dir = PathBuf::from("target").join("it").join(name);
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

/// A 400x200 page with a few dark "text lines".
pub fn write_page(path: &Path) {
    let mut img = image::RgbaImage::from_pixel(400, 200, image::Rgba([250, 248, 240, 255]));
    for y in [40u32, 90, 140] {
        for x in 20..380 {
            if x % 7 != 0 {
                img.put_pixel(x, y, image::Rgba([20, 20, 20, 255]));
                img.put_pixel(x, y + 1, image::Rgba([20, 20, 20, 255]));
            }
        }
    }
    img.save(path).unwrap();
}

/// Manifest with two documents: `a.pdf` (3 words over two pages) and `b.pdf` (2 words).
pub fn write_manifest(dir: &Path) -> PathBuf {
    write_page(&dir.join("a-0.png"));
    write_page(&dir.join("a-1.png"));
    write_page(&dir.join("b-0.png"));

    let manifest = serde_json::json!({
        "documents": [
            { "id": "a.pdf", "occurrences": [
                { "page_index": 0, "page_image": "a-0.png", "page_width": 400, "page_height": 200,
                  "words": [
                      { "text": "Hello", "rect": { "x0": 20.0, "y0": 32.0, "x1": 80.0, "y1": 50.0 } },
                      { "text": "World", "rect": { "x0": 90.0, "y0": 32.0, "x1": 150.0, "y1": 50.0 } }
                  ] },
                { "page_index": 1, "page_image": "a-1.png", "page_width": 400, "page_height": 200,
                  "words": [
                      { "text": "!", "rect": { "x0": 30.0, "y0": 82.0, "x1": 40.0, "y1": 100.0 } }
                  ] }
            ] },
            { "id": "b.pdf", "occurrences": [
                { "page_index": 0, "page_image": "b-0.png", "page_width": 400, "page_height": 200,
                  "words": [
                      { "text": "Hello", "rect": { "x0": 200.0, "y0": 132.0, "x1": 260.0, "y1": 150.0 } },
                      { "text": "again", "rect": { "x0": 270.0, "y0": 132.0, "x1": 330.0, "y1": 150.0 } }
                  ] }
            ] }
        ]
    });
    let path = dir.join("manifest.json");
    std::fs::write(&path, serde_json::to_string_pretty(&manifest).unwrap()).unwrap();
    path
}
