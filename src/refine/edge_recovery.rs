//! Recovery of subject pixels lost at the raster border.
//!
//! When the subject's color is close to the canvas color (white book on a
//! white sweep) the classifier drops the part that runs into the frame
//! edge. For each line crossing a border zone we look for existing mask
//! coverage just inside the zone; only such anchored lines are recovered,
//! and only pixels whose color is distinguishable from the background.

use image::RgbImage;

use crate::models::{BinaryMask, BorderEdge};

/// Per-edge recovery parameters.
#[derive(Debug, Clone, Copy)]
pub struct RecoveryParams {
    /// Zone depth as a fraction of the dimension across the edge.
    pub zone_fraction: f32,
    /// Pixels within this per-channel distance of the background are left out.
    pub color_tolerance: u8,
    pub background: [u8; 3],
}

/// Maps (position along the edge, depth from the edge) to raster coordinates.
struct EdgeFrame {
    edge: BorderEdge,
    width: u32,
    height: u32,
}

impl EdgeFrame {
    fn length(&self) -> u32 {
        match self.edge {
            BorderEdge::Top | BorderEdge::Bottom => self.width,
            BorderEdge::Left | BorderEdge::Right => self.height,
        }
    }

    fn depth(&self) -> u32 {
        match self.edge {
            BorderEdge::Top | BorderEdge::Bottom => self.height,
            BorderEdge::Left | BorderEdge::Right => self.width,
        }
    }

    fn to_xy(&self, along: u32, depth: u32) -> (u32, u32) {
        match self.edge {
            BorderEdge::Top => (along, depth),
            BorderEdge::Bottom => (along, self.height - 1 - depth),
            BorderEdge::Left => (depth, along),
            BorderEdge::Right => (self.width - 1 - depth, along),
        }
    }
}

/// Largest per-channel difference between two colors.
pub fn color_distance(a: [u8; 3], b: [u8; 3]) -> u8 {
    a.iter()
        .zip(b.iter())
        .map(|(&p, &q)| p.abs_diff(q))
        .max()
        .unwrap_or(0)
}

/// Estimate the canvas color as the per-channel median of the four corner
/// patches.
pub fn sample_background(image: &RgbImage) -> [u8; 3] {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return [255, 255, 255];
    }
    let patch = (width.min(height) / 40).max(1);
    let xs = [0, width.saturating_sub(patch)];
    let ys = [0, height.saturating_sub(patch)];

    let mut channels: [Vec<u8>; 3] = [Vec::new(), Vec::new(), Vec::new()];
    for &x0 in &xs {
        for &y0 in &ys {
            for y in y0..(y0 + patch).min(height) {
                for x in x0..(x0 + patch).min(width) {
                    let p = image.get_pixel(x, y);
                    for c in 0..3 {
                        channels[c].push(p[c]);
                    }
                }
            }
        }
    }

    let mut color = [0u8; 3];
    for (c, values) in channels.iter_mut().enumerate() {
        values.sort_unstable();
        color[c] = values[values.len() / 2];
    }
    color
}

/// Recover the border zone along one edge. Returns the number of pixels
/// switched on.
///
/// The probe window has the same depth as the zone and sits immediately
/// inside it. Lines with no foreground in the probe window are untouched.
/// A zone pixel is recovered only when its color differs from the
/// background by more than `color_tolerance` in some channel.
pub fn recover_edge(
    mask: &mut BinaryMask,
    image: &RgbImage,
    edge: BorderEdge,
    params: &RecoveryParams,
) -> usize {
    let (width, height) = mask.dimensions();
    let frame = EdgeFrame { edge, width, height };
    let depth = frame.depth();
    let zone = ((params.zone_fraction * depth as f32).round() as u32).min(depth);
    if zone == 0 {
        return 0;
    }
    let probe_end = (zone * 2).min(depth);

    let mut recovered = 0;
    for along in 0..frame.length() {
        let anchored = (zone..probe_end).any(|d| {
            let (x, y) = frame.to_xy(along, d);
            mask.get(x, y)
        });
        if !anchored {
            continue;
        }

        for d in 0..zone {
            let (x, y) = frame.to_xy(along, d);
            if mask.get(x, y) {
                continue;
            }
            let p = image.get_pixel(x, y);
            if color_distance([p[0], p[1], p[2]], params.background) > params.color_tolerance {
                mask.set(x, y, true);
                recovered += 1;
            }
        }
    }

    tracing::debug!(?edge, zone, recovered, "edge recovery");
    recovered
}

/// Run [`recover_edge`] for every selected edge, in order.
pub fn recover_edges(
    mask: &mut BinaryMask,
    image: &RgbImage,
    edges: &[BorderEdge],
    params: &RecoveryParams,
) -> usize {
    edges
        .iter()
        .map(|&edge| recover_edge(mask, image, edge, params))
        .sum()
}
