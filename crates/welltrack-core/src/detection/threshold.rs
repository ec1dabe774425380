use ndarray::Array2;
use tracing::warn;

use crate::consts::OTSU_HISTOGRAM_BINS;

use super::config::ThresholdMethod;

/// Resolve the threshold for `data`, whose valid range is `[0, max_value]`.
///
/// Fixed thresholds outside the range are clamped, never rejected.
pub fn compute_threshold(data: &Array2<f32>, method: &ThresholdMethod, max_value: f32) -> f32 {
    match method {
        ThresholdMethod::Fixed(v) => clamp_threshold(*v, max_value),
        ThresholdMethod::Otsu => otsu_threshold(data, max_value),
    }
}

/// Clamp a threshold into `[0, max_value]`, warning when it had to move.
pub fn clamp_threshold(threshold: f32, max_value: f32) -> f32 {
    let clamped = threshold.clamp(0.0, max_value);
    if clamped != threshold {
        warn!(
            requested = threshold,
            clamped,
            max_value,
            "Threshold outside intensity range, clamped"
        );
    }
    clamped
}

/// Subtract a constant background level, saturating at zero.
pub fn subtract_background(data: &Array2<f32>, level: f32) -> Array2<f32> {
    if level <= 0.0 {
        return data.clone();
    }
    data.mapv(|v| (v - level).max(0.0))
}

/// Foreground mask: `true` where the pixel is at or above the threshold.
pub fn binarize(data: &Array2<f32>, threshold: f32) -> Array2<bool> {
    data.mapv(|v| v >= threshold)
}

/// Compute mean and standard deviation of pixel values.
pub fn compute_mean_stddev(data: &Array2<f32>) -> (f64, f64) {
    let n = data.len() as f64;
    if n == 0.0 {
        return (0.0, 0.0);
    }
    let sum: f64 = data.iter().map(|&v| v as f64).sum();
    let mean = sum / n;
    let var: f64 = data.iter().map(|&v| (v as f64 - mean).powi(2)).sum::<f64>() / n;
    (mean, var.sqrt())
}

/// Otsu's thresholding over `[0, max_value]`.
///
/// Returns the smallest sample above the optimal split, so that
/// `pixel >= threshold` selects exactly the pixels above it.
/// A flat image has no split and yields a threshold above every pixel.
pub fn otsu_threshold(data: &Array2<f32>, max_value: f32) -> f32 {
    let bins = OTSU_HISTOGRAM_BINS;
    let mut histogram = vec![0u64; bins];
    if data.is_empty() || max_value <= 0.0 {
        return max_value;
    }

    let bin_of = |v: f32| -> usize {
        let norm = (v / max_value).clamp(0.0, 1.0);
        ((norm * (bins - 1) as f32) as usize).min(bins - 1)
    };
    for &v in data.iter() {
        histogram[bin_of(v)] += 1;
    }

    let total = data.len() as f64;
    let mut sum_all: f64 = 0.0;
    for (i, &count) in histogram.iter().enumerate() {
        sum_all += i as f64 * count as f64;
    }

    let mut weight_bg: f64 = 0.0;
    let mut sum_bg: f64 = 0.0;
    let mut best_variance = 0.0_f64;
    let mut best_bin: Option<usize> = None;

    for (i, &count) in histogram.iter().enumerate() {
        weight_bg += count as f64;
        if weight_bg == 0.0 {
            continue;
        }
        let weight_fg = total - weight_bg;
        if weight_fg == 0.0 {
            break;
        }
        sum_bg += i as f64 * count as f64;
        let mean_bg = sum_bg / weight_bg;
        let mean_fg = (sum_all - sum_bg) / weight_fg;
        let between_variance = weight_bg * weight_fg * (mean_bg - mean_fg).powi(2);

        if between_variance > best_variance {
            best_variance = between_variance;
            best_bin = Some(i);
        }
    }

    // Smallest sample above the split, so binarize() reproduces it exactly.
    best_bin
        .and_then(|best| {
            data.iter()
                .copied()
                .filter(|&v| bin_of(v) > best)
                .min_by(|a, b| a.total_cmp(b))
        })
        .unwrap_or(max_value + 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_threshold_clamped_to_range() {
        let data = Array2::<f32>::zeros((4, 4));
        assert_eq!(compute_threshold(&data, &ThresholdMethod::Fixed(300.0), 255.0), 255.0);
        assert_eq!(compute_threshold(&data, &ThresholdMethod::Fixed(-5.0), 255.0), 0.0);
        assert_eq!(compute_threshold(&data, &ThresholdMethod::Fixed(100.0), 255.0), 100.0);
    }

    #[test]
    fn test_otsu_separates_bimodal() {
        let mut data = Array2::<f32>::from_elem((10, 10), 10.0);
        for row in 0..5 {
            for col in 0..10 {
                data[[row, col]] = 200.0;
            }
        }
        let t = otsu_threshold(&data, 255.0);
        assert!(t > 10.0 && t <= 200.0, "threshold {t}");
        let mask = binarize(&data, t);
        assert_eq!(mask.iter().filter(|&&m| m).count(), 50);
    }

    #[test]
    fn test_otsu_flat_image_selects_nothing() {
        let data = Array2::<f32>::from_elem((6, 6), 40.0);
        let t = otsu_threshold(&data, 255.0);
        assert!(binarize(&data, t).iter().all(|&m| !m));
    }

    #[test]
    fn test_subtract_background_saturates() {
        let data = Array2::from_shape_vec((1, 3), vec![5.0, 20.0, 100.0]).unwrap();
        let out = subtract_background(&data, 10.0);
        assert_eq!(out.as_slice().unwrap(), &[0.0, 10.0, 90.0]);
    }
}
