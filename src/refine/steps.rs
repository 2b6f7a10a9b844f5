use crate::error::{Degradation, Result};
use crate::models::{BorderEdge, Strategy};
use crate::pipeline::{MaskState, PipelineContext, RefineStep};
use crate::refine::{boundary, components, edge_recovery, morphology, shape, threshold};

/// Binarize the probability grid, dropping fog.
pub struct ThresholdStep {
    pub cutoff: f32,
}

impl RefineStep for ThresholdStep {
    fn process(&self, mut state: MaskState, _context: &PipelineContext) -> Result<MaskState> {
        state.mask = threshold::binarize(&state.probability, self.cutoff);
        tracing::debug!(foreground = state.mask.count(), cutoff = self.cutoff, "threshold");
        if state.mask.is_empty() {
            state.note(Degradation::EmptyMask { stage: self.name().to_string() });
        }
        Ok(state)
    }

    fn name(&self) -> &str {
        "Threshold"
    }
}

/// Keep the dominant region(s).
pub struct ComponentFilterStep {
    pub min_area_fraction: f32,
    pub keep_single_region: bool,
}

impl RefineStep for ComponentFilterStep {
    fn process(&self, mut state: MaskState, _context: &PipelineContext) -> Result<MaskState> {
        // Threshold already reported an empty mask.
        if state.mask.is_empty() {
            return Ok(state);
        }
        state.mask =
            components::filter_regions(&state.mask, self.min_area_fraction, self.keep_single_region);
        if state.mask.is_empty() {
            state.note(Degradation::EmptyMask { stage: self.name().to_string() });
        }
        Ok(state)
    }

    fn name(&self) -> &str {
        "Component Filter"
    }
}

/// Re-admit subject pixels near the selected edges.
pub struct EdgeRecoveryStep {
    pub edges: Vec<BorderEdge>,
    pub zone_fraction: f32,
    pub color_tolerance: u8,
    pub background: Option<[u8; 3]>,
}

impl RefineStep for EdgeRecoveryStep {
    fn process(&self, mut state: MaskState, _context: &PipelineContext) -> Result<MaskState> {
        let Some(image) = state.image.clone() else {
            tracing::debug!("no source image, edge recovery skipped");
            return Ok(state);
        };
        if state.mask.is_empty() {
            return Ok(state);
        }

        let background = self
            .background
            .unwrap_or_else(|| edge_recovery::sample_background(&image));
        let params = edge_recovery::RecoveryParams {
            zone_fraction: self.zone_fraction,
            color_tolerance: self.color_tolerance,
            background,
        };
        let recovered = edge_recovery::recover_edges(&mut state.mask, &image, &self.edges, &params);
        tracing::debug!(recovered, ?background, "edge recovery total");
        Ok(state)
    }

    fn name(&self) -> &str {
        "Edge Recovery"
    }
}

/// Apply the geometric strategy.
pub struct ShapeFitStep {
    pub strategy: Strategy,
    pub hole_area_fraction: f32,
}

impl RefineStep for ShapeFitStep {
    fn process(&self, mut state: MaskState, _context: &PipelineContext) -> Result<MaskState> {
        let fit = shape::fit_shape(&state.mask, self.strategy, self.hole_area_fraction);
        state.mask = fit.mask;
        if let Some(degradation) = fit.degradation {
            state.note(degradation);
        }
        Ok(state)
    }

    fn name(&self) -> &str {
        "Shape Fit"
    }
}

/// Close small gaps and soften the edge.
pub struct PolishStep {
    pub radius: u8,
    pub feather_sigma: f32,
    pub alpha_gamma: f32,
}

impl RefineStep for PolishStep {
    fn process(&self, mut state: MaskState, _context: &PipelineContext) -> Result<MaskState> {
        state.mask = morphology::close_within_silhouette(&state.mask, self.radius);
        state.alpha = if self.feather_sigma > 0.0 {
            Some(morphology::feather(&state.mask, self.feather_sigma, self.alpha_gamma))
        } else {
            None
        };
        Ok(state)
    }

    fn name(&self) -> &str {
        "Polish"
    }
}

/// Clear the safety margin. Always the last stage.
pub struct BoundaryGuardStep {
    pub margin: u32,
}

impl RefineStep for BoundaryGuardStep {
    fn process(&self, mut state: MaskState, _context: &PipelineContext) -> Result<MaskState> {
        boundary::guard_mask(&mut state.mask, self.margin);
        if let Some(alpha) = state.alpha.as_mut() {
            boundary::guard_alpha(alpha, self.margin);
        }
        Ok(state)
    }

    fn name(&self) -> &str {
        "Boundary Guard"
    }
}
