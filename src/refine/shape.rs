use imageproc::region_labelling::Connectivity;

use crate::error::Degradation;
use crate::models::{BinaryMask, Strategy};
use crate::refine::components::label_background;
use crate::refine::geometry::{
    hull_of, min_area_rect, outer_contour_points, rasterize_convex, rasterize_rect,
};

/// Result of fitting: the silhouette, plus a degradation note if the
/// strategy could not be applied.
#[derive(Debug, Clone)]
pub struct FitResult {
    pub mask: BinaryMask,
    pub degradation: Option<Degradation>,
}

/// Apply the geometric strategy to a coarse mask.
///
/// An empty mask comes back unchanged for every strategy.
pub fn fit_shape(mask: &BinaryMask, strategy: Strategy, hole_area_fraction: f32) -> FitResult {
    if mask.is_empty() {
        return FitResult { mask: mask.clone(), degradation: None };
    }
    let (width, height) = mask.dimensions();

    if strategy == Strategy::Natural {
        let max_hole = hole_area_fraction as f64 * width as f64 * height as f64;
        return FitResult { mask: fill_holes(mask, Some(max_hole)), degradation: None };
    }

    let points = outer_contour_points(mask);
    if points.is_empty() {
        tracing::warn!(%strategy, "no outer contour found, keeping input mask");
        return FitResult {
            mask: mask.clone(),
            degradation: Some(Degradation::DegenerateGeometry { strategy }),
        };
    }
    let hull = hull_of(&points);

    let fitted = if strategy == Strategy::RotatedRect {
        min_area_rect(&hull).map(|rect| {
            tracing::debug!(area = rect.area(), angle = rect.angle_degrees(), "fitted rotated rectangle");
            rasterize_rect(&rect, width, height)
        })
    } else {
        tracing::debug!(vertices = hull.len(), "fitted convex hull");
        Some(rasterize_convex(&hull, width, height))
    };

    match fitted {
        Some(fitted) => FitResult { mask: fitted, degradation: None },
        None => FitResult {
            mask: mask.clone(),
            degradation: Some(Degradation::DegenerateGeometry { strategy }),
        },
    }
}

/// Fill internal holes: background regions (4-connected) that do not touch
/// the raster border. With `max_area` set, only holes strictly smaller than
/// it are filled, so larger openings in concave subjects survive.
pub fn fill_holes(mask: &BinaryMask, max_area: Option<f64>) -> BinaryMask {
    let (width, height) = mask.dimensions();
    let (labeled, holes) = label_background(mask, Connectivity::Four);

    let mut fill = vec![false; holes.last().map_or(0, |r| r.label as usize + 1)];
    let mut filled = 0usize;
    for hole in &holes {
        if hole.touches_border(width, height) {
            continue;
        }
        if max_area.is_some_and(|max| hole.pixel_count as f64 >= max) {
            continue;
        }
        fill[hole.label as usize] = true;
        filled += 1;
    }
    if filled == 0 {
        return mask.clone();
    }
    tracing::debug!(holes = holes.len(), filled, "hole fill");

    BinaryMask::from_fn(width, height, |x, y| {
        let label = labeled.get_pixel(x, y)[0] as usize;
        mask.get(x, y) || (label != 0 && fill[label])
    })
}
