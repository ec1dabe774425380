/// Minimum pixel count (h*w) to extract wells in parallel within one frame.
pub const PARALLEL_PIXEL_THRESHOLD: usize = 65_536;

/// Minimum sampled frame count to reduce the projection with Rayon.
pub const PARALLEL_FRAME_THRESHOLD: usize = 4;

/// Number of histogram bins for Otsu's thresholding.
pub const OTSU_HISTOGRAM_BINS: usize = 256;

/// Default fixed threshold, in 8-bit intensity units.
pub const DEFAULT_THRESHOLD: f32 = 50.0;

/// Default minimum well area in pixels.
pub const DEFAULT_MIN_WELL_AREA: usize = 100;

/// Default frame stride for video analysis.
pub const DEFAULT_SAMPLE_RATE: usize = 1;

/// Default background level subtracted before thresholding.
pub const DEFAULT_BACKGROUND_LEVEL: f32 = 0.0;

/// Default number of 3x3 opening passes applied to the well mask.
pub const DEFAULT_OPENING_ITERATIONS: usize = 0;

/// SER timestamps are expressed in 100 ns ticks.
pub const SER_TICKS_PER_SECOND: f64 = 10_000_000.0;

/// Colour used to outline wells in exported previews.
pub const WELL_OUTLINE_RGB: [u8; 3] = [0, 255, 0];

/// Outline thickness in pixels for exported previews.
pub const WELL_OUTLINE_THICKNESS: usize = 2;

/// ITU-R BT.601 luminance coefficient for the red channel.
pub const LUMINANCE_R: f32 = 0.299;

/// ITU-R BT.601 luminance coefficient for the green channel.
pub const LUMINANCE_G: f32 = 0.587;

/// ITU-R BT.601 luminance coefficient for the blue channel.
pub const LUMINANCE_B: f32 = 0.114;

/// Synthetic wells: FWHM to Gaussian sigma conversion factor.
pub const FWHM_TO_SIGMA: f64 = 2.355;
