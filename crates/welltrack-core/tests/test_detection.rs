mod common;

use common::{disk_frame, fixed, Disk};
use welltrack_core::detection::{detect_wells, Connectivity, DetectionConfig, ThresholdMethod};
use welltrack_core::frame::Frame;
use ndarray::Array2;

fn grid_disks() -> Vec<Disk> {
    // Deliberately listed out of reading order.
    vec![
        Disk::new(60, 50, 6, 200.0),
        Disk::new(20, 20, 6, 180.0),
        Disk::new(20, 50, 6, 220.0),
        Disk::new(60, 20, 6, 160.0),
        Disk::new(100, 20, 6, 240.0),
    ]
}

#[test]
fn test_detects_each_separated_blob() {
    let disks = grid_disks();
    let frame = disk_frame(80, 120, 10.0, &disks);
    let detection = detect_wells(&frame, &fixed(100.0, 20)).unwrap();

    assert_eq!(detection.regions.len(), 5);
    for (i, region) in detection.regions.iter().enumerate() {
        assert_eq!(region.id, i);
        assert_eq!(region.area, disks[0].area());
        assert!(region.area >= 20);
    }
}

#[test]
fn test_ids_follow_reading_order() {
    let frame = disk_frame(80, 120, 10.0, &grid_disks());
    let detection = detect_wells(&frame, &fixed(100.0, 20)).unwrap();

    let centroids: Vec<(f64, f64)> = detection.regions.iter().map(|r| r.centroid).collect();
    assert_eq!(
        centroids,
        vec![
            (20.0, 20.0),
            (60.0, 20.0),
            (100.0, 20.0),
            (20.0, 50.0),
            (60.0, 50.0)
        ]
    );
}

#[test]
fn test_region_geometry() {
    let frame = disk_frame(40, 40, 0.0, &[Disk::new(15, 18, 5, 200.0)]);
    let detection = detect_wells(&frame, &fixed(100.0, 5)).unwrap();
    let well = &detection.regions[0];

    assert_eq!(well.bbox.x, 10);
    assert_eq!(well.bbox.y, 13);
    assert_eq!(well.bbox.width, 11);
    assert_eq!(well.bbox.height, 11);
    assert_eq!(well.mask.dim(), (11, 11));
    assert!(well.contains(15, 18));
    assert!(!well.contains(10, 13));
    assert_eq!(well.pixels().count(), well.area);
    let run_total: usize = well.mask_runs().iter().map(|r| r[2]).sum();
    assert_eq!(run_total, well.area);
}

#[test]
fn test_min_area_filters_small_blobs() {
    let disks = [Disk::new(20, 20, 8, 200.0), Disk::new(60, 20, 2, 200.0)];
    let frame = disk_frame(40, 80, 0.0, &disks);

    let detection = detect_wells(&frame, &fixed(100.0, 30)).unwrap();
    assert_eq!(detection.regions.len(), 1);
    assert_eq!(detection.regions[0].centroid, (20.0, 20.0));

    let detection = detect_wells(&frame, &fixed(100.0, 1)).unwrap();
    assert_eq!(detection.regions.len(), 2);
}

#[test]
fn test_detection_is_deterministic() {
    let frame = disk_frame(80, 120, 10.0, &grid_disks());
    let config = fixed(100.0, 20);
    let a = detect_wells(&frame, &config).unwrap();
    let b = detect_wells(&frame, &config).unwrap();
    assert_eq!(a.regions, b.regions);
    assert_eq!(a.threshold, b.threshold);
}

#[test]
fn test_uniform_background_yields_no_wells() {
    let frame = Frame::new(Array2::from_elem((30, 30), 10.0), 8);
    let detection = detect_wells(&frame, &fixed(100.0, 5)).unwrap();
    assert!(detection.is_empty());
}

#[test]
fn test_out_of_range_threshold_is_clamped() {
    let frame = disk_frame(30, 30, 0.0, &[Disk::new(15, 15, 4, 255.0)]);

    let detection = detect_wells(&frame, &fixed(1000.0, 5)).unwrap();
    assert_eq!(detection.threshold, 255.0);
    assert_eq!(detection.regions.len(), 1);

    let detection = detect_wells(&frame, &fixed(-20.0, 5)).unwrap();
    assert_eq!(detection.threshold, 0.0);
    // Everything is foreground: one region covering the frame.
    assert_eq!(detection.regions.len(), 1);
    assert_eq!(detection.regions[0].area, 900);
}

#[test]
fn test_background_level_subtracted_before_threshold() {
    let frame = disk_frame(30, 30, 0.0, &[Disk::new(15, 15, 4, 120.0)]);
    let mut config = fixed(100.0, 5);
    assert_eq!(detect_wells(&frame, &config).unwrap().regions.len(), 1);

    config.background_level = 30.0;
    assert!(detect_wells(&frame, &config).unwrap().is_empty());
}

#[test]
fn test_otsu_separates_wells_from_background() {
    let disks = [Disk::new(15, 15, 5, 200.0), Disk::new(45, 15, 5, 190.0)];
    let frame = disk_frame(30, 60, 20.0, &disks);
    let config = DetectionConfig {
        threshold_method: ThresholdMethod::Otsu,
        min_area: 10,
        ..Default::default()
    };
    let detection = detect_wells(&frame, &config).unwrap();
    assert_eq!(detection.regions.len(), 2);
    assert!(detection.threshold > 20.0 && detection.threshold <= 190.0);
}

#[test]
fn test_connectivity_controls_diagonal_merging() {
    let mut data = Array2::<f32>::zeros((10, 10));
    for i in 2..7 {
        data[[i, i]] = 200.0;
    }
    let frame = Frame::new(data, 8);

    let mut config = fixed(100.0, 1);
    config.connectivity = Connectivity::Eight;
    assert_eq!(detect_wells(&frame, &config).unwrap().regions.len(), 1);

    config.connectivity = Connectivity::Four;
    assert_eq!(detect_wells(&frame, &config).unwrap().regions.len(), 5);
}

#[test]
fn test_opening_splits_touching_wells() {
    // Two squares joined by a one-pixel bridge.
    let mut data = Array2::<f32>::zeros((20, 30));
    for r in 5..15 {
        for c in 3..11 {
            data[[r, c]] = 200.0;
        }
        for c in 16..24 {
            data[[r, c]] = 200.0;
        }
    }
    for c in 11..16 {
        data[[10, c]] = 200.0;
    }
    let frame = Frame::new(data, 8);

    let mut config = fixed(100.0, 10);
    assert_eq!(detect_wells(&frame, &config).unwrap().regions.len(), 1);

    config.opening_iterations = 1;
    let detection = detect_wells(&frame, &config).unwrap();
    assert_eq!(detection.regions.len(), 2);
    assert_eq!(detection.regions[0].area, 80);
    assert_eq!(detection.regions[1].area, 80);
}

#[test]
fn test_invalid_min_area_rejected() {
    let frame = Frame::new(Array2::zeros((5, 5)), 8);
    assert!(detect_wells(&frame, &fixed(100.0, 0)).is_err());
}
