mod common;
use common::*;

use maskrefine::refine::morphology::{close_within_silhouette, feather};

/// Rectangle with a sealed internal crack and an open notch from the top.
fn cracked_and_notched() -> BinaryMask {
    let mut mask = rect_mask(100, 100, 20, 20, 80, 80);
    for y in 35..65 {
        mask.set(50, y, false);
    }
    for y in 20..40 {
        for x in 30..33 {
            mask.set(x, y, false);
        }
    }
    mask
}

#[test]
fn closing_bridges_internal_crack() {
    let mask = cracked_and_notched();
    let out = close_within_silhouette(&mask, 2);
    for y in 35..65 {
        assert!(out.get(50, y), "crack at y={y}");
    }
}

#[test]
fn closing_never_grows_past_silhouette() {
    let mask = cracked_and_notched();
    let out = close_within_silhouette(&mask, 2);
    // The notch touches the outside, so it is not part of the silhouette.
    for y in 20..40 {
        for x in 30..33 {
            assert!(!out.get(x, y), "notch at ({x}, {y})");
        }
    }
    assert!(!out.get(10, 10));
    assert_eq!(out.count(), mask.count() + 30);
}

#[test]
fn closing_never_shrinks() {
    let mask = union(&cracked_and_notched(), &disk_mask(100, 100, 85.0, 85.0, 10.0));
    let out = close_within_silhouette(&mask, 3);
    assert!(out.contains(&mask));
}

#[test]
fn polishing_twice_equals_once() {
    let masks = [
        cracked_and_notched(),
        disk_mask(100, 100, 50.0, 50.0, 30.0),
        rotated_rect_mask(100, 100, 30.0, 18.0, 15.0, Some(8.0)),
        union(&rect_mask(100, 100, 5, 5, 40, 40), &rect_mask(100, 100, 42, 5, 90, 40)),
    ];
    for (i, mask) in masks.iter().enumerate() {
        for radius in [1, 2, 4] {
            let once = close_within_silhouette(mask, radius);
            let twice = close_within_silhouette(&once, radius);
            assert_eq!(once, twice, "mask {i}, radius {radius}");
        }
    }
}

#[test]
fn zero_radius_is_identity() {
    let mask = cracked_and_notched();
    assert_eq!(close_within_silhouette(&mask, 0), mask);
}

#[test]
fn feather_stays_inside_mask() {
    let mask = disk_mask(100, 100, 50.0, 50.0, 30.0);
    let alpha = feather(&mask, 1.5, 1.0);
    for (x, y, a) in alpha.enumerate_pixels() {
        if mask.get(x, y) {
            assert!(a[0] > 0, "foreground pixel ({x}, {y}) lost");
        } else {
            assert_eq!(a[0], 0, "background pixel ({x}, {y}) gained alpha");
        }
    }
    assert!(alpha.get_pixel(50, 50)[0] >= 250);
    // The rim is softened.
    assert!(alpha.get_pixel(50, 20)[0] < 200);
}

#[test]
fn gamma_thickens_edge() {
    let mask = disk_mask(100, 100, 50.0, 50.0, 30.0);
    let linear = feather(&mask, 1.5, 1.0);
    let thick = feather(&mask, 1.5, 0.5);
    for (a, b) in linear.pixels().zip(thick.pixels()) {
        assert!(b[0] >= a[0]);
    }
}

#[test]
fn zero_sigma_keeps_hard_edge() {
    let mask = disk_mask(64, 64, 32.0, 32.0, 20.0);
    assert_eq!(&feather(&mask, 0.0, 1.0), mask.as_gray());
}
