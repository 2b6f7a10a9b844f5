use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{RefineError, Result};
use crate::models::{BorderEdge, Strategy};

/// Numeric parameters for one refinement run.
///
/// All fields are public so a config can be written out literally, but a
/// config only reaches the pipeline through [`RefinementConfig::validate`]
/// (the builder, `from_json_file` and `Pipeline::from_config` all call it).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RefinementConfig {
    /// Probabilities strictly above this become foreground.
    pub confidence_cutoff: f32,
    /// Regions smaller than this fraction of the largest region are dropped.
    pub min_area_fraction: f32,
    /// Keep only the largest region regardless of `min_area_fraction`.
    pub keep_single_region: bool,
    pub strategy: Strategy,
    pub edge_recovery_enabled: bool,
    pub edge_recovery_edges: Vec<BorderEdge>,
    /// Depth of the border zone as a fraction of the dimension across it.
    pub edge_recovery_zone_fraction: f32,
    /// Max per-channel difference at which a pixel still counts as background.
    pub edge_recovery_color_tolerance: u8,
    /// Background color for recovery. Sampled from the image corners if unset.
    pub background_color: Option<[u8; 3]>,
    /// Internal holes below this fraction of the image area are filled
    /// (Natural strategy).
    pub hole_area_fraction: f32,
    /// Side length of the square closing kernel; 0 or 1 disables closing.
    pub morphology_kernel_size: u32,
    /// Gaussian sigma for the anti-alias pass; 0 keeps a hard edge.
    pub edge_feather_sigma: f32,
    /// Exponent applied to the soft alpha; below 1 thickens the edge.
    pub alpha_gamma: f32,
    /// Width of the forced-transparent ring at the raster border.
    pub boundary_margin_px: u32,
}

impl Default for RefinementConfig {
    fn default() -> Self {
        Self {
            confidence_cutoff: 0.5,
            min_area_fraction: 0.1,
            keep_single_region: false,
            strategy: Strategy::Natural,
            edge_recovery_enabled: true,
            edge_recovery_edges: vec![BorderEdge::Top],
            edge_recovery_zone_fraction: 0.2,
            edge_recovery_color_tolerance: 12,
            background_color: None,
            hole_area_fraction: 0.002,
            morphology_kernel_size: 5,
            edge_feather_sigma: 1.0,
            alpha_gamma: 1.0,
            boundary_margin_px: 10,
        }
    }
}

impl RefinementConfig {
    pub fn builder() -> RefinementConfigBuilder {
        RefinementConfigBuilder::default()
    }

    /// Preset tuned for a product family.
    pub fn for_strategy(strategy: Strategy) -> Self {
        match strategy {
            Strategy::Natural => Self::default(),
            Strategy::RotatedRect => Self {
                strategy,
                keep_single_region: true,
                morphology_kernel_size: 3,
                ..Self::default()
            },
            Strategy::ConvexHull => Self {
                strategy,
                min_area_fraction: 0.05,
                confidence_cutoff: 0.3,
                ..Self::default()
            },
        }
    }

    /// Load a (possibly partial) JSON config and validate it.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        // Type errors such as a negative margin surface here.
        let config: Self = serde_json::from_str(text)
            .map_err(|e| RefineError::invalid_config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        unit_range("confidence_cutoff", self.confidence_cutoff)?;
        unit_range("min_area_fraction", self.min_area_fraction)?;
        unit_range("hole_area_fraction", self.hole_area_fraction)?;
        if !(0.0..=0.5).contains(&self.edge_recovery_zone_fraction) {
            return Err(RefineError::invalid_config(format!(
                "edge_recovery_zone_fraction must be in [0, 0.5], got {}",
                self.edge_recovery_zone_fraction
            )));
        }
        if self.edge_recovery_enabled && self.edge_recovery_edges.is_empty() {
            return Err(RefineError::invalid_config(
                "edge recovery is enabled but no edge is selected",
            ));
        }
        if self.morphology_kernel_size > 255 {
            return Err(RefineError::invalid_config(format!(
                "morphology_kernel_size must be at most 255, got {}",
                self.morphology_kernel_size
            )));
        }
        if !self.edge_feather_sigma.is_finite() || self.edge_feather_sigma < 0.0 {
            return Err(RefineError::invalid_config(format!(
                "edge_feather_sigma must be finite and >= 0, got {}",
                self.edge_feather_sigma
            )));
        }
        if !self.alpha_gamma.is_finite() || self.alpha_gamma <= 0.0 {
            return Err(RefineError::invalid_config(format!(
                "alpha_gamma must be finite and > 0, got {}",
                self.alpha_gamma
            )));
        }
        Ok(())
    }

    /// Closing radius derived from the kernel size.
    pub fn morphology_radius(&self) -> u8 {
        (self.morphology_kernel_size / 2).min(u8::MAX as u32) as u8
    }
}

fn unit_range(name: &str, value: f32) -> Result<()> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(RefineError::invalid_config(format!(
            "{name} must be in [0, 1], got {value}"
        )))
    }
}

/// Builder that validates on `build`.
#[derive(Debug, Clone, Default)]
pub struct RefinementConfigBuilder {
    config: RefinementConfig,
}

impl RefinementConfigBuilder {
    pub fn strategy(mut self, strategy: Strategy) -> Self {
        self.config.strategy = strategy;
        self
    }

    pub fn confidence_cutoff(mut self, cutoff: f32) -> Self {
        self.config.confidence_cutoff = cutoff;
        self
    }

    pub fn min_area_fraction(mut self, fraction: f32) -> Self {
        self.config.min_area_fraction = fraction;
        self
    }

    pub fn keep_single_region(mut self, keep: bool) -> Self {
        self.config.keep_single_region = keep;
        self
    }

    pub fn edge_recovery(mut self, enabled: bool) -> Self {
        self.config.edge_recovery_enabled = enabled;
        self
    }

    pub fn edge_recovery_edges(mut self, edges: Vec<BorderEdge>) -> Self {
        self.config.edge_recovery_edges = edges;
        self
    }

    pub fn edge_recovery_zone_fraction(mut self, fraction: f32) -> Self {
        self.config.edge_recovery_zone_fraction = fraction;
        self
    }

    pub fn edge_recovery_color_tolerance(mut self, tolerance: u8) -> Self {
        self.config.edge_recovery_color_tolerance = tolerance;
        self
    }

    pub fn background_color(mut self, color: Option<[u8; 3]>) -> Self {
        self.config.background_color = color;
        self
    }

    pub fn hole_area_fraction(mut self, fraction: f32) -> Self {
        self.config.hole_area_fraction = fraction;
        self
    }

    pub fn morphology_kernel_size(mut self, size: u32) -> Self {
        self.config.morphology_kernel_size = size;
        self
    }

    pub fn edge_feather_sigma(mut self, sigma: f32) -> Self {
        self.config.edge_feather_sigma = sigma;
        self
    }

    pub fn alpha_gamma(mut self, gamma: f32) -> Self {
        self.config.alpha_gamma = gamma;
        self
    }

    pub fn boundary_margin_px(mut self, margin: u32) -> Self {
        self.config.boundary_margin_px = margin;
        self
    }

    pub fn build(self) -> Result<RefinementConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

impl From<RefinementConfig> for RefinementConfigBuilder {
    fn from(config: RefinementConfig) -> Self {
        Self { config }
    }
}
