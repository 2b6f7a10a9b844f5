use std::path::PathBuf;
use std::sync::Arc;

use image::{GrayImage, RgbImage};

use crate::config::RefinementConfig;
use crate::error::{Degradation, RefineError, Result};
use crate::models::{BinaryMask, FinalMask, ProbabilityGrid};

/// State that flows through the pipeline for one image.
#[derive(Clone)]
pub struct MaskState {
    /// Working mask, mutated by each stage.
    pub mask: BinaryMask,

    /// Classifier output (shared, never mutated).
    pub probability: Arc<ProbabilityGrid>,

    /// Source raster, needed only by edge recovery.
    pub image: Option<Arc<RgbImage>>,

    /// Soft alpha once the polisher has produced one.
    pub alpha: Option<GrayImage>,

    /// Non-fatal conditions met so far.
    pub degradations: Vec<Degradation>,
}

impl MaskState {
    /// Start from the classifier output. Fails if the image and the grid
    /// disagree on size.
    pub fn new(probability: Arc<ProbabilityGrid>, image: Option<Arc<RgbImage>>) -> Result<Self> {
        if let Some(image) = &image {
            if image.dimensions() != probability.dimensions() {
                return Err(RefineError::dimension_mismatch(
                    image.dimensions(),
                    probability.dimensions(),
                ));
            }
        }
        let (width, height) = probability.dimensions();
        Ok(Self {
            mask: BinaryMask::new(width, height),
            probability,
            image,
            alpha: None,
            degradations: Vec::new(),
        })
    }

    pub fn note(&mut self, degradation: Degradation) {
        tracing::warn!(%degradation, "degraded result");
        self.degradations.push(degradation);
    }

    /// Alpha for debug output and for the final mask: the soft alpha if any,
    /// clipped to the binary mask.
    fn current_alpha(&self) -> GrayImage {
        match &self.alpha {
            Some(alpha) => {
                let mut alpha = alpha.clone();
                for (x, y, p) in alpha.enumerate_pixels_mut() {
                    if !self.mask.get(x, y) {
                        p[0] = 0;
                    }
                }
                alpha
            }
            None => self.mask.as_gray().clone(),
        }
    }

    fn into_outcome(self) -> RefinementOutcome {
        let alpha = self.current_alpha();
        RefinementOutcome {
            mask: FinalMask { binary: self.mask, alpha },
            degradations: self.degradations,
        }
    }
}

/// What a pipeline run hands back to the caller.
#[derive(Debug, Clone)]
pub struct RefinementOutcome {
    pub mask: FinalMask,
    pub degradations: Vec<Degradation>,
}

impl RefinementOutcome {
    pub fn is_degraded(&self) -> bool {
        !self.degradations.is_empty()
    }
}

/// Debug configuration for pipeline execution
#[derive(Clone, Debug)]
pub struct DebugConfig {
    /// Directory receiving one PNG per stage
    pub output_dir: PathBuf,
    /// Whether debug mode is enabled
    pub enabled: bool,
}

/// Context available to all pipeline steps
#[derive(Clone, Default)]
pub struct PipelineContext {
    pub verbose: bool,
    pub debug: Option<DebugConfig>,
}

impl PipelineContext {
    fn save_stage(&self, index: usize, step_name: &str, state: &MaskState) -> Result<()> {
        let Some(debug_config) = &self.debug else {
            return Ok(());
        };
        if !debug_config.enabled {
            return Ok(());
        }

        let filename = format!("{:02}_{}.png", index, step_name.to_lowercase().replace(' ', "_"));
        let output_path = debug_config.output_dir.join(&filename);
        state.current_alpha().save(&output_path)?;

        tracing::debug!(file = %output_path.display(), "saved stage mask");
        Ok(())
    }
}

/// One stage of the refinement pipeline.
pub trait RefineStep: Send + Sync {
    /// Transform the state. Stages must keep the mask dimensions.
    fn process(&self, state: MaskState, context: &PipelineContext) -> Result<MaskState>;

    /// Human-readable name for this step (used in logs and debug files)
    fn name(&self) -> &str;
}

/// Composable pipeline builder
#[derive(Clone, Default)]
pub struct Pipeline {
    steps: Vec<Arc<dyn RefineStep>>,
    context: PipelineContext,
}

impl Pipeline {
    /// Create a new empty pipeline
    pub fn new() -> Self {
        Self::default()
    }

    /// The canonical stage order for a validated config:
    /// threshold, component filter, edge recovery, shape fit, polish,
    /// boundary guard.
    pub fn from_config(config: &RefinementConfig) -> Result<Self> {
        crate::refine::build_standard_pipeline(config)
    }

    /// Enable verbose progress logging
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.context.verbose = verbose;
        self
    }

    /// Enable debug mode with output directory.
    /// The directory must be empty or non-existent.
    pub fn with_debug(mut self, output_dir: PathBuf) -> Result<Self> {
        if output_dir.exists() {
            let entries = std::fs::read_dir(&output_dir)?;
            if entries.count() > 0 {
                return Err(RefineError::invalid_config(format!(
                    "debug directory is not empty: {}",
                    output_dir.display()
                )));
            }
        } else {
            std::fs::create_dir_all(&output_dir)?;
        }

        self.context.debug = Some(DebugConfig {
            output_dir,
            enabled: true,
        });

        Ok(self)
    }

    /// Add a processing step to the pipeline
    pub fn add_step(mut self, step: Arc<dyn RefineStep>) -> Self {
        self.steps.push(step);
        self
    }

    /// Helper method to add a step from a Box (for convenience)
    pub fn add_step_boxed(mut self, step: Box<dyn RefineStep>) -> Self {
        self.steps.push(Arc::from(step));
        self
    }

    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    /// Borrowing convenience over [`Pipeline::run`].
    pub fn refine(&self, grid: &ProbabilityGrid, image: Option<&RgbImage>) -> Result<RefinementOutcome> {
        self.run(Arc::new(grid.clone()), image.map(|i| Arc::new(i.clone())))
    }

    /// Run every stage in order and produce the final mask.
    pub fn run(
        &self,
        grid: Arc<ProbabilityGrid>,
        image: Option<Arc<RgbImage>>,
    ) -> Result<RefinementOutcome> {
        let state = self.run_partial(grid, image, self.steps.len())?;
        Ok(state.into_outcome())
    }

    /// Run only the first `num_steps` stages (useful for debugging).
    pub fn run_partial(
        &self,
        grid: Arc<ProbabilityGrid>,
        image: Option<Arc<RgbImage>>,
        num_steps: usize,
    ) -> Result<MaskState> {
        let mut state = MaskState::new(grid, image)?;
        let dimensions = state.mask.dimensions();

        for (i, step) in self.steps.iter().take(num_steps).enumerate() {
            if self.context.verbose {
                tracing::info!(step = i + 1, name = step.name(), "running step");
            }

            state = step.process(state, &self.context)?;
            if state.mask.dimensions() != dimensions {
                return Err(RefineError::dimension_mismatch(dimensions, state.mask.dimensions()));
            }

            self.context.save_stage(i + 1, step.name(), &state)?;

            if self.context.verbose {
                tracing::info!(foreground = state.mask.count(), "  done");
            }
        }

        Ok(state)
    }
}
