//! Assemble a pipeline by hand, including a step defined outside the crate,
//! and inspect intermediate states.
//!
//! Usage: cargo run --example custom_pipeline <image_with_alpha.png>
//!
//! The image's alpha channel stands in for the classifier output.

use std::env;
use std::sync::Arc;

use image::ImageReader;
use maskrefine::refine::steps::*;
use maskrefine::{
    BinaryMask, BorderEdge, MaskState, Pipeline, PipelineContext, ProbabilityGrid, RefineStep,
    Strategy,
};

/// Reports how much of the frame the mask covers. Leaves the state alone.
struct CoverageReport;

impl RefineStep for CoverageReport {
    fn process(&self, state: MaskState, _context: &PipelineContext) -> maskrefine::Result<MaskState> {
        let (w, h) = state.mask.dimensions();
        let coverage = state.mask.count() as f64 / (w as f64 * h as f64);
        println!("  coverage: {:.1}%", coverage * 100.0);
        Ok(state)
    }

    fn name(&self) -> &str {
        "Coverage Report"
    }
}

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <image_with_alpha.png>", args[0]);
        std::process::exit(1);
    }

    let img = ImageReader::open(&args[1])?
        .decode()
        .map_err(|e| anyhow::anyhow!("Failed to decode image: {}", e))?;
    let rgba = img.to_rgba8();
    let alpha = image::GrayImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        image::Luma([rgba.get_pixel(x, y)[3]])
    });
    let grid = Arc::new(ProbabilityGrid::from_alpha(&alpha));
    let rgb = Arc::new(img.to_rgb8());

    println!("Loaded image: {}x{}", img.width(), img.height());

    // Example 1: strict threshold, convex hull, recovery on two edges
    println!("\n=== Hand-built Pipeline ===");
    let pipeline = Pipeline::new()
        .with_verbose(true)
        .add_step_boxed(Box::new(ThresholdStep { cutoff: 0.6 }))
        .add_step_boxed(Box::new(ComponentFilterStep {
            min_area_fraction: 0.05,
            keep_single_region: false,
        }))
        .add_step_boxed(Box::new(CoverageReport))
        .add_step_boxed(Box::new(EdgeRecoveryStep {
            edges: vec![BorderEdge::Top, BorderEdge::Bottom],
            zone_fraction: 0.15,
            color_tolerance: 20,
            background: None,
        }))
        .add_step_boxed(Box::new(ShapeFitStep {
            strategy: Strategy::ConvexHull,
            hole_area_fraction: 0.002,
        }))
        .add_step_boxed(Box::new(CoverageReport))
        .add_step_boxed(Box::new(PolishStep {
            radius: 2,
            feather_sigma: 1.5,
            alpha_gamma: 0.8,
        }))
        .add_step_boxed(Box::new(BoundaryGuardStep { margin: 8 }));

    println!("Steps: {}", pipeline.step_names().join(" -> "));
    let outcome = pipeline.run(Arc::clone(&grid), Some(Arc::clone(&rgb)))?;
    println!("Final foreground: {} pixels", outcome.mask.binary.count());
    for note in &outcome.degradations {
        println!("  degraded: {note}");
    }

    // Example 2: partial execution, to see what the classifier alone gives
    println!("\n=== Partial Pipeline (Stop After Component Filter) ===");
    let state = pipeline.run_partial(grid, Some(rgb), 2)?;
    let raw: &BinaryMask = &state.mask;
    println!("Foreground before geometry: {} pixels", raw.count());
    if let Some(b) = raw.bounding_box() {
        println!("Bounding box: {}x{} at ({}, {})", b.width, b.height, b.x, b.y);
    }

    Ok(())
}
