//! Refine a synthetic classifier output with each strategy and save the
//! cutouts. No model or input file is needed.
//!
//! Usage: cargo run --example refine_synthetic [output_dir]

use std::path::PathBuf;

use image::{Rgb, RgbImage};
use maskrefine::{Pipeline, ProbabilityGrid, RefinementConfig, Strategy, compose};

const SIZE: u32 = 240;

/// A tilted box on a light canvas, with the top rows cut off by the
/// classifier, a bite out of one corner, faint fog and a stray speck.
fn scene() -> (RgbImage, ProbabilityGrid) {
    let (cx, cy) = (SIZE as f32 / 2.0, SIZE as f32 / 2.0 + 10.0);
    let (s, c) = 12f32.to_radians().sin_cos();
    let inside = |x: u32, y: u32| {
        let (dx, dy) = (x as f32 - cx, y as f32 - cy);
        let (u, v) = (dx * c + dy * s, -dx * s + dy * c);
        u.abs() <= 80.0 && v.abs() <= 55.0
    };

    let image = RgbImage::from_fn(SIZE, SIZE, |x, y| {
        if inside(x, y) { Rgb([150, 90, 60]) } else { Rgb([245, 245, 245]) }
    });
    let grid = ProbabilityGrid::from_fn(SIZE, SIZE, |x, y| {
        let speck = (200..206).contains(&x) && (20..26).contains(&y);
        if speck {
            0.8
        } else if inside(x, y) && y > 80 && !(x > 170 && y > 150) {
            0.92
        } else {
            0.15
        }
    });
    (image, grid)
}

fn main() -> anyhow::Result<()> {
    let out_dir = std::env::args()
        .nth(1)
        .map_or_else(|| PathBuf::from("refine_out"), PathBuf::from);
    std::fs::create_dir_all(&out_dir)?;

    let (image, grid) = scene();
    let rgba = image::DynamicImage::ImageRgb8(image.clone()).to_rgba8();

    for strategy in [Strategy::Natural, Strategy::RotatedRect, Strategy::ConvexHull] {
        let config = RefinementConfig::for_strategy(strategy);
        let pipeline = Pipeline::from_config(&config)?;
        let outcome = pipeline.refine(&grid, Some(&image))?;

        println!("=== {} ===", strategy);
        println!("  foreground pixels: {}", outcome.mask.binary.count());
        if let Some(b) = outcome.mask.bounding_box() {
            println!("  bounding box: {}x{} at ({}, {})", b.width, b.height, b.x, b.y);
        }
        for note in &outcome.degradations {
            println!("  degraded: {note}");
        }

        let cutout = compose::cutout(&rgba, &outcome.mask, true)?;
        let path = out_dir.join(format!("{strategy}.png"));
        cutout.save(&path)?;
        println!("  saved {}", path.display());
    }

    Ok(())
}
