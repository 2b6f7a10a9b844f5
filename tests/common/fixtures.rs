use image::{Rgb, RgbImage};
use maskrefine::{BinaryMask, ProbabilityGrid};

/// True if (x, y) lies in the disk of radius `r` centered at (cx, cy).
pub fn in_disk(x: u32, y: u32, cx: f32, cy: f32, r: f32) -> bool {
    let dx = x as f32 - cx;
    let dy = y as f32 - cy;
    dx * dx + dy * dy <= r * r
}

/// Probability grid with a solid disk at `p` on a zero background.
pub fn disk_grid(width: u32, height: u32, cx: f32, cy: f32, r: f32, p: f32) -> ProbabilityGrid {
    ProbabilityGrid::from_fn(width, height, |x, y| if in_disk(x, y, cx, cy, r) { p } else { 0.0 })
}

pub fn disk_mask(width: u32, height: u32, cx: f32, cy: f32, r: f32) -> BinaryMask {
    BinaryMask::from_fn(width, height, |x, y| in_disk(x, y, cx, cy, r))
}

/// Axis-aligned filled rectangle, `x0..x1` by `y0..y1` (exclusive ends).
pub fn rect_mask(width: u32, height: u32, x0: u32, y0: u32, x1: u32, y1: u32) -> BinaryMask {
    BinaryMask::from_fn(width, height, |x, y| x >= x0 && x < x1 && y >= y0 && y < y1)
}

/// Union of two masks of equal size.
pub fn union(a: &BinaryMask, b: &BinaryMask) -> BinaryMask {
    let (w, h) = a.dimensions();
    BinaryMask::from_fn(w, h, |x, y| a.get(x, y) || b.get(x, y))
}

/// Coordinates of (x, y) in the frame of a rectangle centered at (cx, cy)
/// and rotated by `angle_deg`.
pub fn rotated_local(x: u32, y: u32, cx: f32, cy: f32, angle_deg: f32) -> (f32, f32) {
    let (s, c) = angle_deg.to_radians().sin_cos();
    let dx = x as f32 - cx;
    let dy = y as f32 - cy;
    (dx * c + dy * s, -dx * s + dy * c)
}

/// Rotated rectangle with half extents (hu, hv). When `notch` is set, the
/// corner where u > hu - notch and v > hv - notch is removed.
pub fn rotated_rect_mask(
    width: u32,
    height: u32,
    hu: f32,
    hv: f32,
    angle_deg: f32,
    notch: Option<f32>,
) -> BinaryMask {
    let (cx, cy) = (width as f32 / 2.0, height as f32 / 2.0);
    BinaryMask::from_fn(width, height, |x, y| {
        let (u, v) = rotated_local(x, y, cx, cy, angle_deg);
        let inside = u.abs() <= hu && v.abs() <= hv;
        let notched = notch.is_some_and(|n| u > hu - n && v > hv - n);
        inside && !notched
    })
}

/// Convert a mask to a grid at probability `p`.
pub fn grid_from_mask(mask: &BinaryMask, p: f32) -> ProbabilityGrid {
    let (w, h) = mask.dimensions();
    ProbabilityGrid::from_fn(w, h, |x, y| if mask.get(x, y) { p } else { 0.0 })
}

/// Solid canvas with a colored rectangle painted on it.
pub fn canvas_with_rect(
    width: u32,
    height: u32,
    background: [u8; 3],
    subject: [u8; 3],
    (x0, y0, x1, y1): (u32, u32, u32, u32),
) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        if x >= x0 && x < x1 && y >= y0 && y < y1 {
            Rgb(subject)
        } else {
            Rgb(background)
        }
    })
}

/// Number of 8-connected foreground regions.
pub fn region_count(mask: &BinaryMask) -> usize {
    let (_, regions) = maskrefine::refine::components::label_regions(
        mask,
        imageproc::region_labelling::Connectivity::Eight,
    );
    regions.len()
}
