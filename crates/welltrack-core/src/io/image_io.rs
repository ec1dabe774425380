use std::path::Path;

use image::{GrayImage, ImageFormat, Luma, Rgb, RgbImage};
use ndarray::Array2;

use crate::error::Result;
use crate::frame::Frame;

/// Load an image file as a grayscale Frame in native units.
///
/// 8-bit sources yield values in [0, 255] and 16-bit (or float) sources
/// values in [0, 65535]. Colour images are converted to luminance.
pub fn load_image(path: &Path) -> Result<Frame> {
    let img = image::open(path)?;
    let color = img.color();
    let wide = color.bytes_per_pixel() / color.channel_count() >= 2;

    let frame = if wide {
        let gray = img.to_luma16();
        let (w, h) = gray.dimensions();
        let data = Array2::from_shape_fn((h as usize, w as usize), |(row, col)| {
            gray.get_pixel(col as u32, row as u32).0[0] as f32
        });
        Frame::new(data, 16)
    } else {
        let gray = img.to_luma8();
        let (w, h) = gray.dimensions();
        let data = Array2::from_shape_fn((h as usize, w as usize), |(row, col)| {
            gray.get_pixel(col as u32, row as u32).0[0] as f32
        });
        Frame::new(data, 8)
    };

    Ok(frame)
}

/// Scale a frame's samples into 8 bits.
fn to_u8(frame: &Frame, value: f32) -> u8 {
    let scale = 255.0 / frame.max_value();
    (value * scale).round().clamp(0.0, 255.0) as u8
}

/// Save a frame as 8-bit grayscale PNG.
pub fn save_png(frame: &Frame, path: &Path) -> Result<()> {
    let h = frame.height();
    let w = frame.width();

    let mut img = GrayImage::new(w as u32, h as u32);
    for row in 0..h {
        for col in 0..w {
            let val = to_u8(frame, frame.data[[row, col]]);
            img.put_pixel(col as u32, row as u32, Luma([val]));
        }
    }

    img.save_with_format(path, ImageFormat::Png)?;
    Ok(())
}

/// Render a frame as an 8-bit RGB image for annotation.
pub fn frame_to_rgb(frame: &Frame) -> RgbImage {
    let h = frame.height();
    let w = frame.width();

    let mut img = RgbImage::new(w as u32, h as u32);
    for row in 0..h {
        for col in 0..w {
            let val = to_u8(frame, frame.data[[row, col]]);
            img.put_pixel(col as u32, row as u32, Rgb([val, val, val]));
        }
    }
    img
}

/// Save an RGB image as PNG.
pub fn save_rgb_png(img: &RgbImage, path: &Path) -> Result<()> {
    img.save_with_format(path, ImageFormat::Png)?;
    Ok(())
}
