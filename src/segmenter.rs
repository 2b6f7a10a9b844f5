//! The classifier seam.
//!
//! The segmentation model lives outside this crate. It is reached through
//! [`Segmenter`]: an image goes in, a probability grid of the same size
//! comes out. Model loading and session lifetime belong to the implementor.

use std::future::Future;

use image::RgbImage;
use image::imageops;

use crate::error::{RefineError, Result};
use crate::models::ProbabilityGrid;

/// Foreground/background classifier.
pub trait Segmenter: Send + Sync {
    fn segment(&self, image: &RgbImage) -> impl Future<Output = Result<ProbabilityGrid>> + Send;
}

/// Wraps a synchronous function as a [`Segmenter`].
pub struct FnSegmenter<F> {
    f: F,
}

impl<F> FnSegmenter<F>
where
    F: Fn(&RgbImage) -> Result<ProbabilityGrid> + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> Segmenter for FnSegmenter<F>
where
    F: Fn(&RgbImage) -> Result<ProbabilityGrid> + Send + Sync,
{
    fn segment(&self, image: &RgbImage) -> impl Future<Output = Result<ProbabilityGrid>> + Send {
        std::future::ready((self.f)(image))
    }
}

/// Runs the inner classifier on a centered crop and re-embeds its output
/// into a full-size grid. Text and icons near the frame edge then cannot be
/// classified as subject.
pub struct FocusCrop<S> {
    inner: S,
    margin_fraction: f32,
}

impl<S: Segmenter> FocusCrop<S> {
    /// `margin_fraction` of each dimension is removed on every side.
    pub fn new(inner: S, margin_fraction: f32) -> Result<Self> {
        if !(0.0..0.5).contains(&margin_fraction) {
            return Err(RefineError::invalid_config(format!(
                "focus crop margin must be in [0, 0.5), got {margin_fraction}"
            )));
        }
        Ok(Self { inner, margin_fraction })
    }

    /// Crop rectangle `(x, y, width, height)` for an image of the given size.
    pub fn crop_rect(&self, width: u32, height: u32) -> (u32, u32, u32, u32) {
        let x = (width as f32 * self.margin_fraction) as u32;
        let y = (height as f32 * self.margin_fraction) as u32;
        (x, y, width.saturating_sub(2 * x).max(1), height.saturating_sub(2 * y).max(1))
    }
}

impl<S: Segmenter> Segmenter for FocusCrop<S> {
    fn segment(&self, image: &RgbImage) -> impl Future<Output = Result<ProbabilityGrid>> + Send {
        let (width, height) = image.dimensions();
        let (x, y, w, h) = self.crop_rect(width, height);
        let cropped = imageops::crop_imm(image, x, y, w, h).to_image();
        async move {
            let grid = self.inner.segment(&cropped).await?;
            if grid.dimensions() != (w, h) {
                return Err(RefineError::dimension_mismatch((w, h), grid.dimensions()));
            }
            Ok(grid.embed(width, height, x, y))
        }
    }
}
