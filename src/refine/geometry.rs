//! Contour pooling, convex hulls, minimum-area rectangles and their
//! rasterization.
//!
//! Coordinates are pixel centers. Rasterization includes a pixel when its
//! center lies inside the shape (with a tiny tolerance), so a shape fitted
//! around contour pixels always covers those pixels.

use imageproc::contours::{find_contours, BorderType};
use imageproc::geometry::convex_hull;
use imageproc::point::Point;

use crate::models::BinaryMask;

const EPS: f64 = 1e-6;

/// Every point of every outer contour, pooled into one cloud.
pub fn outer_contour_points(mask: &BinaryMask) -> Vec<Point<i32>> {
    find_contours::<i32>(mask.as_gray())
        .into_iter()
        .filter(|c| c.border_type == BorderType::Outer)
        .flat_map(|c| c.points)
        .collect()
}

/// Convex hull of a point cloud. Empty input gives an empty hull.
pub fn hull_of(points: &[Point<i32>]) -> Vec<Point<i32>> {
    if points.is_empty() {
        return Vec::new();
    }
    let mut unique = points.to_vec();
    unique.sort_by_key(|p| (p.x, p.y));
    unique.dedup();
    let mut hull = convex_hull(&unique[..]);
    hull.dedup();
    if hull.len() > 1 && hull.first() == hull.last() {
        hull.pop();
    }
    hull
}

/// A rectangle in an arbitrary orientation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotatedRect {
    pub center: (f64, f64),
    /// Unit vector along the first side.
    pub axis: (f64, f64),
    /// Half side lengths along `axis` and its perpendicular.
    pub half_extents: (f64, f64),
}

impl RotatedRect {
    pub fn area(&self) -> f64 {
        4.0 * self.half_extents.0 * self.half_extents.1
    }

    /// Rotation of `axis` in degrees, in `[0, 180)`.
    pub fn angle_degrees(&self) -> f64 {
        self.axis.1.atan2(self.axis.0).to_degrees().rem_euclid(180.0)
    }

    pub fn corners(&self) -> [(f64, f64); 4] {
        let (ux, uy) = self.axis;
        let (vx, vy) = (-uy, ux);
        let (hu, hv) = self.half_extents;
        let (cx, cy) = self.center;
        [
            (cx - ux * hu - vx * hv, cy - uy * hu - vy * hv),
            (cx + ux * hu - vx * hv, cy + uy * hu - vy * hv),
            (cx + ux * hu + vx * hv, cy + uy * hu + vy * hv),
            (cx - ux * hu + vx * hv, cy - uy * hu + vy * hv),
        ]
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        let (dx, dy) = (x - self.center.0, y - self.center.1);
        let (ux, uy) = self.axis;
        let along = dx * ux + dy * uy;
        let across = -dx * uy + dy * ux;
        along.abs() <= self.half_extents.0 + EPS && across.abs() <= self.half_extents.1 + EPS
    }
}

/// Minimum-area enclosing rectangle of a convex hull.
///
/// One side of the optimal rectangle is collinear with a hull edge, so
/// each edge direction is tried in turn. Ties keep the first edge found.
pub fn min_area_rect(hull: &[Point<i32>]) -> Option<RotatedRect> {
    let pts: Vec<(f64, f64)> = hull.iter().map(|p| (p.x as f64, p.y as f64)).collect();
    match pts.len() {
        0 => return None,
        1 => {
            return Some(RotatedRect {
                center: pts[0],
                axis: (1.0, 0.0),
                half_extents: (0.0, 0.0),
            });
        }
        _ => {}
    }

    let mut best: Option<RotatedRect> = None;
    for i in 0..pts.len() {
        let a = pts[i];
        let b = pts[(i + 1) % pts.len()];
        let (ex, ey) = (b.0 - a.0, b.1 - a.1);
        let len = (ex * ex + ey * ey).sqrt();
        if len < EPS {
            continue;
        }
        let axis = (ex / len, ey / len);
        let rect = enclosing_rect(&pts, axis);
        if best.is_none_or(|r| rect.area() < r.area() - EPS) {
            best = Some(rect);
        }
    }
    best
}

fn enclosing_rect(pts: &[(f64, f64)], axis: (f64, f64)) -> RotatedRect {
    let (ux, uy) = axis;
    let (mut min_u, mut max_u) = (f64::INFINITY, f64::NEG_INFINITY);
    let (mut min_v, mut max_v) = (f64::INFINITY, f64::NEG_INFINITY);
    for &(x, y) in pts {
        let u = x * ux + y * uy;
        let v = -x * uy + y * ux;
        min_u = min_u.min(u);
        max_u = max_u.max(u);
        min_v = min_v.min(v);
        max_v = max_v.max(v);
    }
    let (cu, cv) = ((min_u + max_u) / 2.0, (min_v + max_v) / 2.0);
    RotatedRect {
        center: (cu * ux - cv * uy, cu * uy + cv * ux),
        axis,
        half_extents: ((max_u - min_u) / 2.0, (max_v - min_v) / 2.0),
    }
}

/// Filled mask of a rotated rectangle.
///
/// Rectangles thinner than a pixel also take every pixel their sides pass
/// through, so a zero-width rectangle becomes a connected line.
pub fn rasterize_rect(rect: &RotatedRect, width: u32, height: u32) -> BinaryMask {
    let corners = rect.corners();
    let thin = rect.half_extents.0.min(rect.half_extents.1) < 1.0;
    fill_within(width, height, &corners, |x, y| {
        rect.contains(x, y) || (thin && on_outline(&corners, x, y))
    })
}

/// Filled mask bounded by a convex polygon given in either winding.
/// Degenerate and sub-pixel-thin hulls also take every pixel their edges
/// pass through, so the result stays connected.
pub fn rasterize_convex(hull: &[Point<i32>], width: u32, height: u32) -> BinaryMask {
    let pts: Vec<(f64, f64)> = hull.iter().map(|p| (p.x as f64, p.y as f64)).collect();
    if pts.is_empty() {
        return BinaryMask::new(width, height);
    }
    let twice_area = signed_area2(&pts);
    if twice_area.abs() < EPS {
        return fill_within(width, height, &pts, |x, y| on_outline(&pts, x, y));
    }
    let thin = min_area_rect(hull).is_some_and(|r| r.half_extents.0.min(r.half_extents.1) < 1.0);
    let orientation = twice_area.signum();
    fill_within(width, height, &pts, |x, y| {
        let inside = (0..pts.len()).all(|i| {
            let a = pts[i];
            let b = pts[(i + 1) % pts.len()];
            let cross = (b.0 - a.0) * (y - a.1) - (b.1 - a.1) * (x - a.0);
            orientation * cross >= -EPS * (1.0 + (b.0 - a.0).abs() + (b.1 - a.1).abs())
        });
        inside || (thin && on_outline(&pts, x, y))
    })
}

fn signed_area2(pts: &[(f64, f64)]) -> f64 {
    (0..pts.len())
        .map(|i| {
            let a = pts[i];
            let b = pts[(i + 1) % pts.len()];
            a.0 * b.1 - b.0 * a.1
        })
        .sum()
}

/// True if any edge of the closed outline touches the cell at `(x, y)`.
fn on_outline(pts: &[(f64, f64)], x: f64, y: f64) -> bool {
    (0..pts.len()).any(|i| segment_hits_cell(pts[i], pts[(i + 1) % pts.len()], x, y))
}

/// True if segment `a`-`b` touches the unit cell centered at `(x, y)`.
/// Liang-Barsky clipping against the cell.
fn segment_hits_cell(a: (f64, f64), b: (f64, f64), x: f64, y: f64) -> bool {
    let half = 0.5 + EPS;
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let checks = [
        (-dx, a.0 - (x - half)),
        (dx, (x + half) - a.0),
        (-dy, a.1 - (y - half)),
        (dy, (y + half) - a.1),
    ];
    let (mut t0, mut t1) = (0.0f64, 1.0f64);
    for (p, q) in checks {
        if p.abs() < EPS {
            if q < 0.0 {
                return false;
            }
        } else {
            let r = q / p;
            if p < 0.0 {
                t0 = t0.max(r);
            } else {
                t1 = t1.min(r);
            }
        }
    }
    t0 <= t1
}

/// Test every pixel center inside the clamped bounding box of `outline`.
fn fill_within(
    width: u32,
    height: u32,
    outline: &[(f64, f64)],
    inside: impl Fn(f64, f64) -> bool,
) -> BinaryMask {
    let mut mask = BinaryMask::new(width, height);
    if width == 0 || height == 0 || outline.is_empty() {
        return mask;
    }
    let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
    let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
    for &(x, y) in outline {
        min_x = min_x.min(x);
        min_y = min_y.min(y);
        max_x = max_x.max(x);
        max_y = max_y.max(y);
    }
    let x0 = min_x.floor().max(0.0) as u32;
    let y0 = min_y.floor().max(0.0) as u32;
    let x1 = (max_x.ceil().max(0.0) as u32).min(width - 1);
    let y1 = (max_y.ceil().max(0.0) as u32).min(height - 1);

    for y in y0..=y1 {
        for x in x0..=x1 {
            if inside(x as f64, y as f64) {
                mask.set(x, y, true);
            }
        }
    }
    mask
}
