use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::Parser;
use image::{DynamicImage, ImageReader, RgbaImage};
use tracing_subscriber::EnvFilter;

use maskrefine::{
    Pipeline, ProbabilityGrid, RefinementConfig, RefinementOutcome, Strategy, compose, refine_many,
};

#[derive(Parser)]
#[command(name = "maskrefine")]
#[command(about = "Refine classifier foreground masks into clean product cutouts")]
struct Cli {
    /// Input images. Without --probability, each image's own alpha channel
    /// is taken as the classifier output.
    #[arg(value_name = "IMAGE", required = true)]
    images: Vec<PathBuf>,

    /// Grayscale probability map for a single input image
    #[arg(long, value_name = "PATH")]
    probability: Option<PathBuf>,

    /// Geometric strategy: natural, rotated-rect or convex-hull
    #[arg(short, long, value_parser = parse_strategy)]
    strategy: Option<Strategy>,

    /// JSON refinement config (any subset of fields)
    #[arg(long, value_name = "JSON")]
    config: Option<PathBuf>,

    /// Override the binarization cutoff
    #[arg(long)]
    cutoff: Option<f32>,

    /// Override the transparent border margin in pixels
    #[arg(long)]
    margin: Option<u32>,

    /// Trim the output to the mask's bounding box
    #[arg(long)]
    crop: bool,

    /// Output file (single image only)
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Output directory (defaults to next to each input)
    #[arg(long, value_name = "DIR")]
    out_dir: Option<PathBuf>,

    /// Save per-stage masks to directory (must be empty)
    #[arg(long, value_name = "DIR")]
    debug_out: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn parse_strategy(s: &str) -> Result<Strategy, String> {
    s.parse().map_err(|e: maskrefine::RefineError| e.to_string())
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    let level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .init();

    if args.images.len() > 1 && (args.probability.is_some() || args.output.is_some()) {
        bail!("--probability and --output apply to a single image; use --out-dir for batches");
    }

    let config = build_config(&args)?;
    tracing::info!(strategy = %config.strategy, cutoff = config.confidence_cutoff, "configuration");

    let mut pipeline = Pipeline::from_config(&config)?.with_verbose(args.verbose);
    if let Some(debug_dir) = &args.debug_out {
        if args.images.len() > 1 {
            bail!("--debug-out supports a single image");
        }
        pipeline = pipeline.with_debug(debug_dir.clone())?;
    }

    // Load everything first so one unreadable file is reported, not fatal.
    let mut loaded = Vec::new();
    for path in &args.images {
        match load_input(path, args.probability.as_deref()) {
            Ok(input) => loaded.push((path.clone(), input)),
            Err(e) => tracing::error!(path = %path.display(), error = %e, "skipping image"),
        }
    }

    let inputs = loaded
        .iter()
        .map(|(_, (rgba, grid))| (grid.clone(), Some(DynamicImage::ImageRgba8(rgba.clone()).to_rgb8())))
        .collect();
    let results = refine_many(&pipeline, inputs);

    let failures = args.images.len() - loaded.len()
        + export_cutouts(&loaded, results, args.crop, args.output.as_deref(), args.out_dir.as_deref());

    if failures > 0 {
        tracing::warn!(failures, total = args.images.len(), "some images were skipped");
    }
    Ok(())
}

/// Write one cutout per successful refinement. A failing image is logged
/// and skipped; returns how many failed.
fn export_cutouts(
    loaded: &[(PathBuf, (RgbaImage, ProbabilityGrid))],
    results: Vec<maskrefine::Result<RefinementOutcome>>,
    crop: bool,
    output: Option<&Path>,
    out_dir: Option<&Path>,
) -> usize {
    let mut failures = 0;
    for ((path, (rgba, _)), result) in loaded.iter().zip(results) {
        let outcome = match result {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "refinement failed");
                failures += 1;
                continue;
            }
        };
        for note in &outcome.degradations {
            tracing::warn!(path = %path.display(), %note, "flag for review");
        }

        match save_cutout(path, rgba, &outcome, crop, output, out_dir) {
            Ok(out_path) => tracing::info!(output = %out_path.display(), "saved cutout"),
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "could not write cutout");
                failures += 1;
            }
        }
    }
    failures
}

fn save_cutout(
    path: &Path,
    rgba: &RgbaImage,
    outcome: &RefinementOutcome,
    crop: bool,
    output: Option<&Path>,
    out_dir: Option<&Path>,
) -> anyhow::Result<PathBuf> {
    let cut = compose::cutout(rgba, &outcome.mask, crop)?;
    let out_path = output_path(path, output, out_dir)?;
    cut.save(&out_path)
        .with_context(|| format!("failed to save {}", out_path.display()))?;
    Ok(out_path)
}

fn build_config(args: &Cli) -> anyhow::Result<RefinementConfig> {
    let mut config = match (&args.config, args.strategy) {
        (Some(path), _) => RefinementConfig::from_json_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        (None, Some(strategy)) => RefinementConfig::for_strategy(strategy),
        (None, None) => RefinementConfig::default(),
    };
    if let Some(strategy) = args.strategy {
        config.strategy = strategy;
    }
    if let Some(cutoff) = args.cutoff {
        config.confidence_cutoff = cutoff;
    }
    if let Some(margin) = args.margin {
        config.boundary_margin_px = margin;
    }
    config.validate()?;
    Ok(config)
}

fn load_input(path: &Path, probability: Option<&Path>) -> anyhow::Result<(RgbaImage, ProbabilityGrid)> {
    let img = ImageReader::open(path)?
        .decode()
        .with_context(|| format!("failed to decode {}", path.display()))?;
    let mut rgba = img.to_rgba8();

    let grid = match probability {
        Some(prob_path) => {
            let prob = ImageReader::open(prob_path)?
                .decode()
                .with_context(|| format!("failed to decode {}", prob_path.display()))?;
            ProbabilityGrid::from_alpha(&prob.to_luma8())
        }
        None => {
            if !img.color().has_alpha() {
                bail!("{} has no alpha channel and no --probability was given", path.display());
            }
            let alpha = image::GrayImage::from_fn(rgba.width(), rgba.height(), |x, y| {
                image::Luma([rgba.get_pixel(x, y)[3]])
            });
            // The refined mask replaces the classifier's alpha rather than
            // multiplying into it.
            for p in rgba.pixels_mut() {
                p[3] = 255;
            }
            ProbabilityGrid::from_alpha(&alpha)
        }
    };
    Ok((rgba, grid))
}

fn output_path(input: &Path, output: Option<&Path>, out_dir: Option<&Path>) -> anyhow::Result<PathBuf> {
    if let Some(output) = output {
        return Ok(output.to_path_buf());
    }
    let stem = input
        .file_stem()
        .with_context(|| format!("no file name in {}", input.display()))?
        .to_string_lossy();
    let name = format!("{stem}_cutout.png");
    Ok(match out_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            dir.join(name)
        }
        None => input.with_file_name(name),
    })
}
