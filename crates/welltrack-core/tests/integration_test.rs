//! End-to-end runs over generated plates.

use welltrack_core::detection::{DetectionConfig, ThresholdMethod};
use welltrack_core::io::source::{open_source, FrameSource};
use welltrack_core::metrics::Metric;
use welltrack_core::pipeline::{analyze, analyze_quiet, AnalysisConfig, CancelToken, NoOpReporter};
use welltrack_core::synthetic::{PlateConfig, SyntheticPlate};

fn plate_config() -> PlateConfig {
    PlateConfig {
        width: 200,
        height: 120,
        frames: 40,
        fps: 10.0,
        rows: 2,
        cols: 3,
        radius: 10,
        glow_frames: 6.0,
        seed: 11,
        ..Default::default()
    }
}

fn analysis_config(metric: Metric, sample_rate: usize) -> AnalysisConfig {
    AnalysisConfig {
        detection: DetectionConfig {
            threshold_method: ThresholdMethod::Fixed(50.0),
            min_area: 50,
            ..Default::default()
        },
        metric,
        sample_rate,
    }
}

#[test]
fn test_generated_ser_finds_every_well_and_peak() {
    let plate = SyntheticPlate::new(plate_config()).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("plate.ser");
    plate.write_ser(&path).unwrap();

    let source = open_source(&path).unwrap();
    assert_eq!(source.frame_count(), 40);
    assert!((source.frame_rate().unwrap() - 10.0).abs() < 1e-6);

    let result = analyze_quiet(source.as_ref(), &analysis_config(Metric::Peak, 1))
        .unwrap()
        .into_result()
        .unwrap();

    assert_eq!(result.wells().len(), 6);
    for (id, well) in result.wells().iter().enumerate() {
        let (cx, cy) = plate.centers[id];
        assert!((well.centroid.0 - cx as f64).abs() < 0.5);
        assert!((well.centroid.1 - cy as f64).abs() < 0.5);
        let peak = result.peak_for(id).unwrap();
        assert_eq!(peak.frame_index, plate.peak_frames[id]);
        assert_eq!(peak.value, 255.0);
    }
    let duration = result.metadata().duration_seconds.unwrap();
    assert!((duration - 4.0).abs() < 1e-6);
}

#[test]
fn test_noisy_plate_still_tracks_peaks() {
    let config = PlateConfig {
        noise: 8.0,
        background: 20.0,
        ..plate_config()
    };
    let plate = SyntheticPlate::new(config).unwrap();
    let source = plate.to_sequence("noisy.ser");

    let mut analysis = analysis_config(Metric::Average, 1);
    analysis.detection.background_level = 20.0;
    analysis.detection.opening_iterations = 1;
    let result = analyze(&source, &analysis, &NoOpReporter, &CancelToken::new())
        .unwrap()
        .into_result()
        .unwrap();

    assert_eq!(result.wells().len(), 6);
    for id in 0..6 {
        let peak = result.peak_for(id).unwrap();
        let expected = plate.peak_frames[id] as i64;
        assert!(
            (peak.frame_index as i64 - expected).abs() <= 1,
            "well {id}: peak at {} expected near {expected}",
            peak.frame_index
        );
    }
}

#[test]
fn test_generated_still_detects_lit_wells() {
    let plate = SyntheticPlate::with_peak_frames(plate_config(), vec![0; 6]).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("plate.png");
    plate.write_still(&path).unwrap();

    let source = open_source(&path).unwrap();
    let result = analyze_quiet(source.as_ref(), &analysis_config(Metric::Average, 4))
        .unwrap()
        .into_result()
        .unwrap();

    let lit = plate.still().data.iter().any(|&v| v >= 50.0);
    assert_eq!(result.no_wells_detected(), !lit);
    assert_eq!(result.metadata().sample_rate, 1);
    for series in result.series().values() {
        assert_eq!(series.len(), 1);
    }
}
