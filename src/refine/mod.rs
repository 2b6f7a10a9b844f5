pub mod threshold;
pub mod components;
pub mod edge_recovery;
pub mod geometry;
pub mod shape;
pub mod morphology;
pub mod boundary;
pub mod steps;

use std::sync::Arc;

use crate::config::RefinementConfig;
use crate::error::Result;
use crate::pipeline::Pipeline;

/// Build the standard refinement pipeline for a config.
///
/// Edge recovery runs before shape fitting, and the boundary guard is
/// always last.
pub fn build_standard_pipeline(config: &RefinementConfig) -> Result<Pipeline> {
    use self::steps::*;

    config.validate()?;

    let mut pipeline = Pipeline::new()
        .add_step(Arc::new(ThresholdStep { cutoff: config.confidence_cutoff }))
        .add_step(Arc::new(ComponentFilterStep {
            min_area_fraction: config.min_area_fraction,
            keep_single_region: config.keep_single_region,
        }));

    if config.edge_recovery_enabled {
        pipeline = pipeline.add_step(Arc::new(EdgeRecoveryStep {
            edges: config.edge_recovery_edges.clone(),
            zone_fraction: config.edge_recovery_zone_fraction,
            color_tolerance: config.edge_recovery_color_tolerance,
            background: config.background_color,
        }));
    }

    Ok(pipeline
        .add_step(Arc::new(ShapeFitStep {
            strategy: config.strategy,
            hole_area_fraction: config.hole_area_fraction,
        }))
        .add_step(Arc::new(PolishStep {
            radius: config.morphology_radius(),
            feather_sigma: config.edge_feather_sigma,
            alpha_gamma: config.alpha_gamma,
        }))
        .add_step(Arc::new(BoundaryGuardStep { margin: config.boundary_margin_px })))
}
