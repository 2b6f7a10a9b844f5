//! Batch refinement with a stand-in classifier.
//!
//! A real deployment plugs a segmentation model in through `Segmenter`.
//! Here a color-distance heuristic plays that role, wrapped in a
//! `FocusCrop` so the frame edges are never classified.
//!
//! Usage: cargo run --example batch_segmenter <image>...

use std::path::{Path, PathBuf};
use std::time::Duration;

use image::RgbImage;
use maskrefine::refine::edge_recovery::{color_distance, sample_background};
use maskrefine::{
    BatchRunner, FnSegmenter, FocusCrop, ImageJob, ProbabilityGrid, RefinementConfig, compose,
};
use tracing_subscriber::EnvFilter;

/// Foreground probability grows with distance from the corner color.
fn color_heuristic(image: &RgbImage) -> maskrefine::Result<ProbabilityGrid> {
    let background = sample_background(image);
    let (w, h) = image.dimensions();
    Ok(ProbabilityGrid::from_fn(w, h, |x, y| {
        let p = image.get_pixel(x, y);
        color_distance([p[0], p[1], p[2]], background) as f32 / 60.0
    }))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let paths: Vec<PathBuf> = std::env::args().skip(1).map(PathBuf::from).collect();
    if paths.is_empty() {
        eprintln!("Usage: batch_segmenter <image>...");
        std::process::exit(1);
    }

    let segmenter = FocusCrop::new(FnSegmenter::new(color_heuristic), 0.15)?;
    let mut runner = BatchRunner::new(segmenter, &RefinementConfig::default())?
        .with_timeout(Duration::from_secs(10));

    let mut sources = Vec::new();
    for path in &paths {
        let img = image::open(path)?;
        runner.submit(ImageJob::new(path.display().to_string(), img.to_rgb8()));
        sources.push((path.clone(), img.to_rgba8()));
    }

    for report in runner.join_all().await {
        let (path, rgba) = &sources[report.index];
        match report.result {
            Ok(outcome) => {
                let out = cutout_path(path);
                compose::cutout(rgba, &outcome.mask, true)?.save(&out)?;
                println!("{} -> {}", report.id, out.display());
            }
            Err(e) => println!("{}: skipped ({e})", report.id),
        }
    }

    Ok(())
}

fn cutout_path(path: &Path) -> PathBuf {
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("image");
    path.with_file_name(format!("{stem}_cutout.png"))
}
