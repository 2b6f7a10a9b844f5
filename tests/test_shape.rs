mod common;
use common::*;

use maskrefine::refine::shape::{fill_holes, fit_shape};

#[test]
fn rotated_rect_fills_notch() {
    let truth = rotated_rect_mask(200, 200, 60.0, 35.0, 15.0, None);
    let notched = rotated_rect_mask(200, 200, 60.0, 35.0, 15.0, Some(15.0));
    assert!(notched.count() < truth.count());

    let fit = fit_shape(&notched, Strategy::RotatedRect, 0.0);
    assert!(fit.degradation.is_none());
    let out = fit.mask;

    // Never loses subject pixels.
    assert!(out.contains(&notched));
    // The notch is gone, up to a pixel of staircase at the very corner.
    let notch: Vec<(u32, u32)> = (0..200)
        .flat_map(|y| (0..200).map(move |x| (x, y)))
        .filter(|&(x, y)| truth.get(x, y) && !notched.get(x, y))
        .collect();
    let missing = notch.iter().filter(|&&(x, y)| !out.get(x, y)).count();
    assert!(notch.len() > 150);
    assert!(missing <= 12, "{missing} of {} notch pixels still missing", notch.len());
    // One solid convex quadrilateral, about 120 x 70.
    assert_eq!(region_count(&out), 1);
    assert_eq!(fill_holes(&out, None), out);
    let area = out.count() as f64;
    assert!((8000.0..=9200.0).contains(&area), "area {area}");
}

#[test]
fn rotated_rect_pools_all_regions() {
    let a = rect_mask(100, 100, 10, 10, 30, 30);
    let b = rect_mask(100, 100, 60, 60, 80, 80);
    let mask = union(&a, &b);

    let out = fit_shape(&mask, Strategy::RotatedRect, 0.0).mask;
    assert!(out.contains(&mask));
    assert_eq!(region_count(&out), 1);
    // The gap between the squares is bridged.
    assert!(out.get(45, 45));
}

#[test]
fn convex_hull_never_shrinks() {
    // An L shape: the hull fills the inner corner.
    let mask = union(
        &rect_mask(120, 120, 10, 10, 40, 110),
        &rect_mask(120, 120, 10, 80, 110, 110),
    );
    let out = fit_shape(&mask, Strategy::ConvexHull, 0.0).mask;

    assert!(out.count() >= mask.count());
    assert!(out.contains(&mask));
    assert!(out.get(60, 70), "inner corner is inside the hull");
    assert!(!out.get(100, 20), "far corner stays outside");
}

#[test]
fn convex_hull_of_disk_is_disk() {
    let mask = disk_mask(100, 100, 50.0, 50.0, 30.0);
    let out = fit_shape(&mask, Strategy::ConvexHull, 0.0).mask;
    assert!(out.contains(&mask));
    // A digital disk is nearly convex already.
    assert!(out.count() - mask.count() < 120);
}

#[test]
fn natural_fills_small_holes_only() {
    let mut mask = rect_mask(100, 100, 10, 10, 90, 90);
    // 3x3 pinhole and a 20x20 window.
    for y in 20..23 {
        for x in 20..23 {
            mask.set(x, y, false);
        }
    }
    for y in 50..70 {
        for x in 50..70 {
            mask.set(x, y, false);
        }
    }

    // 0.002 of 10000 px = 20 px.
    let out = fit_shape(&mask, Strategy::Natural, 0.002).mask;
    assert!(out.get(21, 21));
    assert!(!out.get(60, 60));
    assert_eq!(out.count(), mask.count() + 9);
}

#[test]
fn natural_keeps_concavities() {
    // A U shape opening to the top: its interior touches the outside.
    let mask = union(
        &union(&rect_mask(100, 100, 10, 10, 30, 90), &rect_mask(100, 100, 70, 10, 90, 90)),
        &rect_mask(100, 100, 10, 70, 90, 90),
    );
    let out = fit_shape(&mask, Strategy::Natural, 1.0).mask;
    assert_eq!(out, mask);
}

#[test]
fn empty_mask_passes_through_every_strategy() {
    let mask = BinaryMask::new(64, 64);
    for strategy in [Strategy::Natural, Strategy::RotatedRect, Strategy::ConvexHull] {
        let fit = fit_shape(&mask, strategy, 0.002);
        assert_eq!(fit.mask, mask);
        assert!(fit.degradation.is_none());
    }
}

#[test]
fn single_pixel_survives_fitting() {
    let mut mask = BinaryMask::new(20, 20);
    mask.set(7, 9, true);
    for strategy in [Strategy::RotatedRect, Strategy::ConvexHull] {
        let out = fit_shape(&mask, strategy, 0.0).mask;
        assert!(out.get(7, 9), "{strategy}");
        assert_eq!(out.count(), 1, "{strategy}");
    }
}

#[test]
fn distant_specks_fit_to_one_connected_region() {
    let mut specks = BinaryMask::new(30, 20);
    specks.set(5, 5, true);
    specks.set(20, 11, true);

    let mut sliver = BinaryMask::new(30, 20);
    sliver.set(2, 2, true);
    sliver.set(22, 13, true);
    sliver.set(12, 8, true);

    for mask in [&specks, &sliver] {
        for strategy in [Strategy::RotatedRect, Strategy::ConvexHull] {
            let out = fit_shape(mask, strategy, 0.0).mask;
            assert!(out.contains(mask), "{strategy}");
            assert_eq!(region_count(&out), 1, "{strategy}");
        }
    }
}
