mod common;
use common::*;

use image::GrayImage;
use maskrefine::refine::boundary::{guard_alpha, guard_mask};

fn full(width: u32, height: u32) -> BinaryMask {
    BinaryMask::from_fn(width, height, |_, _| true)
}

#[test]
fn ring_is_cleared_for_all_true_input() {
    for margin in [1, 5, 10, 15] {
        let mut mask = full(100, 80);
        guard_mask(&mut mask, margin);
        for y in 0..80 {
            for x in 0..100 {
                let in_ring = x < margin || y < margin || x >= 100 - margin || y >= 80 - margin;
                assert_eq!(mask.get(x, y), !in_ring, "margin {margin} at ({x}, {y})");
            }
        }
    }
}

#[test]
fn zero_margin_is_identity() {
    let mut mask = full(20, 20);
    guard_mask(&mut mask, 0);
    assert_eq!(mask.count(), 400);
}

#[test]
fn oversized_margin_clears_everything() {
    let mut mask = full(30, 20);
    guard_mask(&mut mask, 11);
    assert!(mask.is_empty());
}

#[test]
fn alpha_ring_matches_mask_ring() {
    let mut alpha = GrayImage::from_pixel(40, 30, image::Luma([200]));
    let mut mask = full(40, 30);
    guard_alpha(&mut alpha, 6);
    guard_mask(&mut mask, 6);
    assert_eq!(&BinaryMask::from_gray(&alpha), &mask);
}
