//! Output side: multiply the final mask into the source raster.

use image::{RgbaImage, imageops};

use crate::error::{RefineError, Result};
use crate::models::FinalMask;

/// Multiply the mask's alpha into the image's alpha channel.
pub fn apply_mask(image: &RgbaImage, mask: &FinalMask) -> Result<RgbaImage> {
    if image.dimensions() != mask.dimensions() {
        return Err(RefineError::dimension_mismatch(image.dimensions(), mask.dimensions()));
    }
    let mut out = image.clone();
    for (p, m) in out.pixels_mut().zip(mask.alpha.pixels()) {
        p[3] = ((p[3] as u16 * m[0] as u16 + 127) / 255) as u8;
    }
    Ok(out)
}

/// Masked image, optionally trimmed to the mask's bounding box. An empty
/// mask is never trimmed; the caller gets a fully transparent frame.
pub fn cutout(image: &RgbaImage, mask: &FinalMask, trim: bool) -> Result<RgbaImage> {
    let masked = apply_mask(image, mask)?;
    if !trim {
        return Ok(masked);
    }
    match mask.bounding_box() {
        Some(b) => Ok(imageops::crop_imm(&masked, b.x, b.y, b.width, b.height).to_image()),
        None => Ok(masked),
    }
}
