use std::collections::HashMap;

use image::{GrayImage, ImageBuffer, Luma};
use imageproc::region_labelling::{connected_components, Connectivity};

use crate::models::{BinaryMask, Region};

pub type LabelImage = ImageBuffer<Luma<u32>, Vec<u32>>;

/// Label foreground regions and summarize each one. Regions are sorted by
/// label so results are deterministic.
pub fn label_regions(mask: &BinaryMask, connectivity: Connectivity) -> (LabelImage, Vec<Region>) {
    let labeled = label(mask.as_gray(), connectivity);
    let regions = summarize(&labeled);
    (labeled, regions)
}

/// Same as [`label_regions`] but over the background pixels, which is how
/// holes and the outer background are told apart.
pub fn label_background(mask: &BinaryMask, connectivity: Connectivity) -> (LabelImage, Vec<Region>) {
    let mut inverted = mask.as_gray().clone();
    for p in inverted.pixels_mut() {
        p[0] = if p[0] > 0 { 0 } else { 255 };
    }
    let labeled = label(&inverted, connectivity);
    let regions = summarize(&labeled);
    (labeled, regions)
}

fn label(gray: &GrayImage, connectivity: Connectivity) -> LabelImage {
    let (width, height) = gray.dimensions();
    // connected_components panics on a single foreground pixel.
    if width as u64 * height as u64 <= 1 {
        return LabelImage::from_fn(width, height, |x, y| Luma([u32::from(gray.get_pixel(x, y)[0] > 0)]));
    }
    connected_components(gray, connectivity, Luma([0u8]))
}

fn summarize(labeled: &LabelImage) -> Vec<Region> {
    let mut regions: HashMap<u32, (u32, u32, u32, u32, u32)> = HashMap::new();

    for (x, y, label) in labeled.enumerate_pixels() {
        let label_val = label[0];
        if label_val == 0 {
            continue;
        }

        regions
            .entry(label_val)
            .and_modify(|(min_x, min_y, max_x, max_y, count)| {
                *min_x = (*min_x).min(x);
                *min_y = (*min_y).min(y);
                *max_x = (*max_x).max(x);
                *max_y = (*max_y).max(y);
                *count += 1;
            })
            .or_insert((x, y, x, y, 1));
    }

    let mut regions: Vec<Region> = regions
        .into_iter()
        .map(|(label, (min_x, min_y, max_x, max_y, count))| Region {
            label,
            min_x,
            min_y,
            max_x,
            max_y,
            pixel_count: count,
        })
        .collect();
    regions.sort_by_key(|r| r.label);
    regions
}

/// Drop dust, scanner-bar fragments and stray shadow blobs.
///
/// Keeps every 8-connected region whose area is at least
/// `min_area_fraction` of the largest region, or only the largest region
/// when `keep_single` is set (ties go to the lowest label). An empty mask
/// is returned unchanged.
pub fn filter_regions(mask: &BinaryMask, min_area_fraction: f32, keep_single: bool) -> BinaryMask {
    let (labeled, regions) = label_regions(mask, Connectivity::Eight);

    let Some(largest) = regions
        .iter()
        .max_by(|a, b| a.pixel_count.cmp(&b.pixel_count).then(b.label.cmp(&a.label)))
    else {
        return mask.clone();
    };

    let keep: Vec<u32> = if keep_single {
        vec![largest.label]
    } else {
        let min_area = min_area_fraction as f64 * largest.pixel_count as f64;
        regions
            .iter()
            .filter(|r| r.pixel_count as f64 >= min_area)
            .map(|r| r.label)
            .collect()
    };

    tracing::debug!(
        regions = regions.len(),
        kept = keep.len(),
        largest = largest.pixel_count,
        "component filter"
    );

    let mut keep_flags = vec![false; regions.last().map_or(0, |r| r.label as usize + 1)];
    for label in keep {
        keep_flags[label as usize] = true;
    }

    let (width, height) = mask.dimensions();
    BinaryMask::from_fn(width, height, |x, y| {
        let label = labeled.get_pixel(x, y)[0] as usize;
        label != 0 && keep_flags[label]
    })
}
