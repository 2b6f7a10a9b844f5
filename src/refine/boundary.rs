use image::GrayImage;

use crate::models::BinaryMask;

fn in_ring(x: u32, y: u32, width: u32, height: u32, margin: u32) -> bool {
    x < margin || y < margin || x.saturating_add(margin) >= width || y.saturating_add(margin) >= height
}

/// Force every pixel within `margin` of the raster border to background.
pub fn guard_mask(mask: &mut BinaryMask, margin: u32) {
    if margin == 0 {
        return;
    }
    let (width, height) = mask.dimensions();
    for y in 0..height {
        for x in 0..width {
            if in_ring(x, y, width, height, margin) {
                mask.set(x, y, false);
            }
        }
    }
}

/// Same ring, applied to an 8-bit alpha raster.
pub fn guard_alpha(alpha: &mut GrayImage, margin: u32) {
    if margin == 0 {
        return;
    }
    let (width, height) = alpha.dimensions();
    for (x, y, p) in alpha.enumerate_pixels_mut() {
        if in_ring(x, y, width, height, margin) {
            p[0] = 0;
        }
    }
}
