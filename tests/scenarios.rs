//! Concrete galleries with hand-computed expectations.

use zenjustify::*;

fn items(ratios: &[f64]) -> Vec<Item> {
    ratios.iter().copied().map(Item::new).collect()
}

// ---- Partitioner ----

#[test]
fn three_items_fit_one_row() {
    let result = partition(&items(&[1.5, 1.0, 1.5]), 600.0, 250.0, AspectRatio::new(4, 3), 1.0);
    assert_eq!(result.positions.len(), 3);
    assert!(result.positions.iter().all(|p| p.y == 0.0));
    assert!(result.positions.windows(2).all(|w| w[1].x > w[0].x));
    // (600 - 2 * 1) / (1.5 + 1.0 + 1.5)
    let row_height = 149.5;
    assert!(result.positions.iter().all(|p| (p.height - row_height).abs() < 1e-9));
    assert!((result.total_height - row_height).abs() < 1e-9);
}

#[test]
fn empty_gallery_is_empty_success() {
    let result = partition(&[], 600.0, 250.0, AspectRatio::new(4, 3), 1.0);
    assert_eq!(result, LayoutResult::empty());
    assert_eq!(result.total_height, 0.0);

    let searched = find_height_for_target_ratio(&[], 600.0, AspectRatio::new(4, 3), 250.0);
    assert_eq!(searched, LayoutResult::empty());
}

#[test]
fn nan_item_yields_no_layout() {
    let gallery = items(&[f64::NAN]);
    let result = partition(&gallery, 600.0, 250.0, AspectRatio::new(4, 3), 1.0);
    assert!(result.positions.is_empty());
    assert_eq!(result.total_height, 0.0);
    // True failure: non-empty input, empty output.
    assert!(!gallery.is_empty() && result.is_empty());

    let searched = find_height_for_target_ratio(&gallery, 600.0, AspectRatio::new(4, 3), 250.0);
    assert!(searched.is_empty());
}

#[test]
fn gallery_of_one_fills_the_width() {
    let result = partition(&items(&[0.8]), 400.0, 250.0, AspectRatio::new(3, 4), 1.0);
    assert_eq!(result.positions.len(), 1);
    assert!((result.positions[0].width - 400.0).abs() < 1e-9);
    assert!((result.total_height - 500.0).abs() < 1e-9);
}

#[test]
fn gallery_of_panoramas_breaks_into_rows() {
    // Five 3:1 panoramas cannot share a row at any useful height.
    let gallery = items(&[3.0; 5]);
    let result = partition(&gallery, 900.0, 250.0, AspectRatio::new(4, 3), 0.0);
    assert_eq!(result.positions.len(), 5);
    assert!(result.row_count() >= 2);
}

// ---- Height search ----

#[test]
fn twelve_squares_widescreen() {
    let gallery = vec![Item::new(1.0); 12];
    let target = AspectRatio::new(16, 9);
    let config = LayoutConfig::default();
    let search = LayoutSearch::new(&config, 1000.0, target);
    let trace = search.search(&gallery, 250.0);

    assert_eq!(trace.result.positions.len(), 12);
    let ratio = trace.result.block_ratio(1000.0).unwrap();
    assert!(ratio > 1.0, "block should be wider than tall, got {ratio}");

    // Equal squares only reach a handful of block heights; whichever is
    // closest among the probes is what comes back.
    let min = trace
        .probes
        .iter()
        .filter_map(|p| p.error)
        .fold(f64::INFINITY, f64::min);
    assert_eq!(trace.result.ratio_error(1000.0, target), Some(min));

    let arranged = arrange(&LayoutRequest::new(gallery, 1000.0, target), &config);
    assert_eq!(arranged.positions.len(), 12);
    assert!(arranged.block_ratio(1000.0).unwrap() > 1.0);
}

#[test]
fn uniform_rows_hit_target_exactly() {
    // Four 4:3 items per 1000 px row (gap 0) give 187.5 px rows. Four such
    // rows stack to 750 px: exactly 4:3 for the whole block.
    let gallery = vec![Item::new(4.0 / 3.0); 16];
    let target = AspectRatio::new(4, 3);
    let config = LayoutConfig::default().gap(0.0);
    let search = LayoutSearch::new(&config, 1000.0, target);
    let trace = search.search(&gallery, 187.5);
    let exact = JustifiedLayout::new(&config, 1000.0, target).partition(&gallery, 187.5);

    let exact_err = exact.ratio_error(1000.0, target).unwrap();
    let err = trace.error().unwrap();
    assert!(err <= exact_err);
}

#[test]
fn search_handles_seed_far_outside_range() {
    let gallery = items(&[1.5, 0.67, 1.0, 1.33, 1.5, 0.75, 1.78, 1.0]);
    for seed in [1.0, 1.0e6, -10.0, f64::INFINITY] {
        let result =
            find_height_for_target_ratio(&gallery, 1000.0, AspectRatio::new(4, 3), seed);
        assert_eq!(result.positions.len(), gallery.len(), "seed {seed}");
    }
}

// ---- Ratio input ----

#[test]
fn ratio_strings_drive_layout() {
    let gallery = items(&[1.5, 0.67, 1.0, 1.33, 1.5, 0.75]);
    let parsed: AspectRatio = "3:4".parse().unwrap();
    let direct = AspectRatio::new(3, 4);
    let a = arrange(&LayoutRequest::new(gallery.clone(), 800.0, parsed), &LayoutConfig::default());
    let b = arrange(&LayoutRequest::new(gallery, 800.0, direct), &LayoutConfig::default());
    assert_eq!(a, b);
    assert!("3:0".parse::<AspectRatio>().is_err());
}
