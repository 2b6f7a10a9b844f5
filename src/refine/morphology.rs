use image::{GrayImage, Luma};
use imageproc::distance_transform::Norm;
use imageproc::filter::gaussian_blur_f32;
use imageproc::morphology;

use crate::models::BinaryMask;
use crate::refine::shape::fill_holes;

/// Morphological closing that cannot grow the silhouette.
///
/// The closed mask is clipped to the input with all of its enclosed holes
/// filled, so cracks and pinholes inside the subject are bridged while
/// notches open to the outside stay open. Closing is extensive, so the
/// result always contains the input, and applying it again is a no-op.
pub fn close_within_silhouette(mask: &BinaryMask, radius: u8) -> BinaryMask {
    if radius == 0 || mask.is_empty() {
        return mask.clone();
    }
    let mut closed = BinaryMask::from_gray(&morphology::close(mask.as_gray(), Norm::LInf, radius));
    let envelope = fill_holes(mask, None);
    closed.intersect(&envelope);
    closed
}

/// Soft alpha for the final edge.
///
/// The mask is blurred with `sigma` and the result kept only inside the
/// mask, so anti-aliasing fades the boundary inward and never adds
/// coverage outside it. `gamma` below 1 thickens the fade. Every
/// foreground pixel keeps a nonzero alpha.
pub fn feather(mask: &BinaryMask, sigma: f32, gamma: f32) -> GrayImage {
    if sigma <= 0.0 {
        return mask.as_gray().clone();
    }
    let blurred = gaussian_blur_f32(mask.as_gray(), sigma);
    let (width, height) = mask.dimensions();
    GrayImage::from_fn(width, height, |x, y| {
        if !mask.get(x, y) {
            return Luma([0]);
        }
        let v = blurred.get_pixel(x, y)[0] as f32 / 255.0;
        let v = if (gamma - 1.0).abs() > f32::EPSILON { v.powf(gamma) } else { v };
        Luma([((v * 255.0).round() as u8).max(1)])
    })
}
