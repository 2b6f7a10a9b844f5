mod common;
use common::*;

use maskrefine::refine::components::filter_regions;

/// 80x50 = 4000 px and 20x10 = 200 px.
fn two_blobs() -> BinaryMask {
    let big = rect_mask(200, 120, 10, 10, 90, 60);
    let small = rect_mask(200, 120, 150, 80, 170, 90);
    union(&big, &small)
}

#[test]
fn keeps_only_dominant_blob() {
    let mask = two_blobs();
    assert_eq!(mask.count(), 4200);

    let filtered = filter_regions(&mask, 0.5, false);
    assert_eq!(filtered, rect_mask(200, 120, 10, 10, 90, 60));
}

#[test]
fn low_fraction_keeps_both() {
    let mask = two_blobs();
    let filtered = filter_regions(&mask, 0.01, false);
    assert_eq!(filtered, mask);
}

#[test]
fn keep_single_region_ignores_fraction() {
    let mask = two_blobs();
    let filtered = filter_regions(&mask, 0.0, true);
    assert_eq!(filtered.count(), 4000);
}

#[test]
fn filtering_is_idempotent() {
    let mask = union(&two_blobs(), &disk_mask(200, 120, 150.0, 30.0, 18.0));
    for (fraction, single) in [(0.5, false), (0.05, false), (0.0, true)] {
        let once = filter_regions(&mask, fraction, single);
        let twice = filter_regions(&once, fraction, single);
        assert_eq!(once, twice, "fraction {fraction}, single {single}");
    }
}

#[test]
fn diagonal_neighbors_form_one_region() {
    // Two squares touching only at a corner are one 8-connected region.
    let a = rect_mask(30, 30, 5, 5, 15, 15);
    let b = rect_mask(30, 30, 15, 15, 25, 25);
    let mask = union(&a, &b);
    assert_eq!(region_count(&mask), 1);
    assert_eq!(filter_regions(&mask, 0.9, true).count(), 200);
}

#[test]
fn empty_mask_is_a_no_op() {
    let mask = BinaryMask::new(50, 40);
    assert_eq!(filter_regions(&mask, 0.5, false), mask);
    assert_eq!(filter_regions(&mask, 0.5, true), mask);
}

#[test]
fn single_pixel_raster_is_one_region() {
    use imageproc::region_labelling::Connectivity;
    use maskrefine::refine::components::{label_background, label_regions};

    let on = BinaryMask::from_fn(1, 1, |_, _| true);
    let (labels, regions) = label_regions(&on, Connectivity::Eight);
    assert_eq!(labels.get_pixel(0, 0)[0], 1);
    assert_eq!(regions.len(), 1);
    assert_eq!(regions[0].pixel_count, 1);
    assert_eq!(filter_regions(&on, 0.5, true), on);

    let (_, holes) = label_background(&on, Connectivity::Four);
    assert!(holes.is_empty());

    let off = BinaryMask::new(1, 1);
    let (_, background) = label_background(&off, Connectivity::Four);
    assert_eq!(background.len(), 1);
    assert_eq!(filter_regions(&off, 0.5, false), off);
}
