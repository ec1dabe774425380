//! Synthetic well plates for testing the analysis end to end.
//!
//! A plate is a `rows x cols` grid of filled circles on a flat background.
//! In a video, each well glows with a Gaussian pulse centred on its own
//! peak frame; the pulse's full width at half maximum is `glow_frames`.

use std::path::Path;

use ndarray::Array2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

use crate::consts::{FWHM_TO_SIGMA, SER_TICKS_PER_SECOND};
use crate::error::{Result, WelltrackError};
use crate::frame::Frame;
use crate::io::image_io::save_png;
use crate::io::ser::SerHeader;
use crate::io::ser_writer::SerWriter;
use crate::io::source::FrameSequence;

#[derive(Clone, Debug, PartialEq)]
pub struct PlateConfig {
    pub width: usize,
    pub height: usize,
    pub frames: usize,
    pub fps: f64,
    pub rows: usize,
    pub cols: usize,
    pub radius: usize,
    pub peak_brightness: f32,
    pub background: f32,
    /// Pulse FWHM in frames.
    pub glow_frames: f64,
    /// Uniform noise amplitude; 0 disables noise.
    pub noise: f32,
    pub seed: u64,
}

impl Default for PlateConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            frames: 300,
            fps: 30.0,
            rows: 3,
            cols: 4,
            radius: 30,
            peak_brightness: 255.0,
            background: 0.0,
            glow_frames: 60.0,
            noise: 0.0,
            seed: 0,
        }
    }
}

impl PlateConfig {
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: &str| Err(WelltrackError::InvalidConfiguration(msg.to_string()));
        if self.width == 0 || self.height == 0 {
            return invalid("plate dimensions must be positive");
        }
        if self.rows == 0 || self.cols == 0 {
            return invalid("well grid must have at least one row and column");
        }
        if self.radius == 0 {
            return invalid("well radius must be positive");
        }
        if !(self.glow_frames > 0.0) {
            return invalid("glow duration must be positive");
        }
        if !(self.fps > 0.0) {
            return invalid("frame rate must be positive");
        }
        if !(0.0..=255.0).contains(&self.peak_brightness)
            || !(0.0..=255.0).contains(&self.background)
            || !(0.0..=255.0).contains(&self.noise)
        {
            return invalid("intensities must lie in [0, 255]");
        }
        Ok(())
    }
}

/// A generated plate: well centres plus each well's peak frame.
#[derive(Clone, Debug)]
pub struct SyntheticPlate {
    pub config: PlateConfig,
    /// Centres `(x, y)` in reading order.
    pub centers: Vec<(usize, usize)>,
    /// Frame at which each well is brightest, same order as `centers`.
    pub peak_frames: Vec<usize>,
}

impl SyntheticPlate {
    /// Lay out the grid and pick each well's peak frame at random within
    /// the middle 80% of the run.
    pub fn new(config: PlateConfig) -> Result<Self> {
        config.validate()?;
        let mut rng = StdRng::seed_from_u64(config.seed);
        let count = config.rows * config.cols;
        let last = config.frames.saturating_sub(1);
        let lo = (0.1 * config.frames as f64) as usize;
        let hi = ((0.9 * config.frames as f64) as usize).clamp(lo, last.max(lo));
        let peak_frames = (0..count).map(|_| rng.gen_range(lo..=hi)).collect();
        Self::with_peak_frames(config, peak_frames)
    }

    /// Lay out the grid with explicit peak frames.
    pub fn with_peak_frames(config: PlateConfig, peak_frames: Vec<usize>) -> Result<Self> {
        config.validate()?;
        let count = config.rows * config.cols;
        if peak_frames.len() != count {
            return Err(WelltrackError::InvalidConfiguration(format!(
                "{count} wells but {} peak frames",
                peak_frames.len()
            )));
        }
        let x_spacing = config.width as f64 / (config.cols + 1) as f64;
        let y_spacing = config.height as f64 / (config.rows + 1) as f64;
        let centers = (0..config.rows)
            .flat_map(|r| (0..config.cols).map(move |c| (r, c)))
            .map(|(r, c)| {
                (
                    (x_spacing * (c + 1) as f64) as usize,
                    (y_spacing * (r + 1) as f64) as usize,
                )
            })
            .collect();
        Ok(Self {
            config,
            centers,
            peak_frames,
        })
    }

    /// Brightness of well `well` at frame `frame`, before noise.
    pub fn intensity_at(&self, well: usize, frame: usize) -> f32 {
        let sigma = self.config.glow_frames / FWHM_TO_SIGMA;
        let dt = frame as f64 - self.peak_frames[well] as f64;
        let level = self.config.peak_brightness as f64 * (-(dt * dt) / (2.0 * sigma * sigma)).exp();
        level.floor() as f32
    }

    fn render(&self, levels: &[f32], rng: &mut StdRng) -> Frame {
        let cfg = &self.config;
        let mut data = Array2::from_elem((cfg.height, cfg.width), cfg.background);
        let r = cfg.radius as isize;
        for (&(cx, cy), &level) in self.centers.iter().zip(levels) {
            for dy in -r..=r {
                for dx in -r..=r {
                    if dx * dx + dy * dy > r * r {
                        continue;
                    }
                    let (x, y) = (cx as isize + dx, cy as isize + dy);
                    if x < 0 || y < 0 || x as usize >= cfg.width || y as usize >= cfg.height {
                        continue;
                    }
                    let px = &mut data[[y as usize, x as usize]];
                    *px = px.max(level);
                }
            }
        }
        if cfg.noise > 0.0 {
            for v in data.iter_mut() {
                let n: f32 = rng.gen_range(-cfg.noise..cfg.noise);
                *v = (*v + n).round().clamp(0.0, 255.0);
            }
        }
        Frame::new(data, 8)
    }

    /// All video frames in order.
    pub fn frames(&self) -> Vec<Frame> {
        let mut rng = StdRng::seed_from_u64(self.config.seed.wrapping_add(1));
        (0..self.config.frames)
            .map(|i| {
                let levels: Vec<f32> = (0..self.centers.len())
                    .map(|w| self.intensity_at(w, i))
                    .collect();
                let mut frame = self.render(&levels, &mut rng);
                frame.metadata.frame_index = i;
                frame
            })
            .collect()
    }

    /// The video as an in-memory frame source.
    pub fn to_sequence(&self, name: &str) -> FrameSequence {
        FrameSequence::new(self.frames(), name).with_frame_rate(self.config.fps)
    }

    /// A single still where each well has a random brightness.
    pub fn still(&self) -> Frame {
        let mut rng = StdRng::seed_from_u64(self.config.seed);
        let peak = self.config.peak_brightness as u32;
        let levels: Vec<f32> = (0..self.centers.len())
            .map(|_| rng.gen_range(0..=peak) as f32)
            .collect();
        self.render(&levels, &mut rng)
    }

    /// Write the video as an 8-bit mono SER file with per-frame timestamps.
    pub fn write_ser(&self, path: &Path) -> Result<()> {
        let cfg = &self.config;
        let header = SerHeader::mono(cfg.width as u32, cfg.height as u32, 8, cfg.frames as u32);
        let mut writer = SerWriter::create(path, &header)?;
        for frame in self.frames() {
            writer.write_frame(&frame)?;
        }
        let tick = SER_TICKS_PER_SECOND / cfg.fps;
        let timestamps: Vec<u64> = (0..cfg.frames)
            .map(|i| (i as f64 * tick).round() as u64 + 1)
            .collect();
        writer.write_timestamps(&timestamps)?;
        writer.finalize()?;
        info!(
            path = %path.display(),
            frames = cfg.frames,
            wells = self.centers.len(),
            "Synthetic video written"
        );
        Ok(())
    }

    /// Write a still as 8-bit PNG.
    pub fn write_still(&self, path: &Path) -> Result<()> {
        save_png(&self.still(), path)?;
        info!(path = %path.display(), wells = self.centers.len(), "Synthetic image written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> PlateConfig {
        PlateConfig {
            width: 120,
            height: 80,
            frames: 20,
            rows: 2,
            cols: 3,
            radius: 6,
            glow_frames: 4.0,
            seed: 7,
            ..Default::default()
        }
    }

    #[test]
    fn test_layout_reading_order() {
        let plate = SyntheticPlate::new(small()).unwrap();
        assert_eq!(plate.centers.len(), 6);
        assert_eq!(plate.centers[0], (30, 26));
        assert_eq!(plate.centers[2], (90, 26));
        assert_eq!(plate.centers[3], (30, 53));
    }

    #[test]
    fn test_peaks_in_middle_of_run() {
        let plate = SyntheticPlate::new(small()).unwrap();
        for &p in &plate.peak_frames {
            assert!((2..=18).contains(&p), "peak {p}");
        }
    }

    #[test]
    fn test_intensity_peaks_at_peak_frame() {
        let plate = SyntheticPlate::with_peak_frames(small(), vec![5, 6, 7, 8, 9, 10]).unwrap();
        assert_eq!(plate.intensity_at(0, 5), 255.0);
        assert!(plate.intensity_at(0, 4) < 255.0);
        assert!(plate.intensity_at(0, 7) < plate.intensity_at(0, 6));
    }

    #[test]
    fn test_same_seed_same_plate() {
        let a = SyntheticPlate::new(small()).unwrap();
        let b = SyntheticPlate::new(small()).unwrap();
        assert_eq!(a.peak_frames, b.peak_frames);
    }
}
