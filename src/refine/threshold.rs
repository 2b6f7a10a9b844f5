use crate::models::{BinaryMask, ProbabilityGrid};

/// Binarize a probability grid. A pixel is foreground iff its probability
/// is strictly above `cutoff`; everything at or below it is treated as fog.
pub fn binarize(grid: &ProbabilityGrid, cutoff: f32) -> BinaryMask {
    let width = grid.width();
    let values = grid.as_slice();
    BinaryMask::from_fn(width, grid.height(), |x, y| {
        values[(y * width + x) as usize] > cutoff
    })
}
