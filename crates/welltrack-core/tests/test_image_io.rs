use image::{ImageBuffer, Luma};
use ndarray::Array2;

use welltrack_core::frame::{Frame, MediaKind};
use welltrack_core::io::image_io::{frame_to_rgb, load_image, save_png};
use welltrack_core::io::source::{open_source, StillImage};
use welltrack_core::FrameSource;

#[test]
fn test_png_roundtrip_keeps_8bit_units() {
    let mut data = Array2::<f32>::zeros((4, 6));
    data[[0, 0]] = 10.0;
    data[[1, 2]] = 128.0;
    data[[3, 5]] = 255.0;
    let frame = Frame::new(data, 8);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("plate.png");
    save_png(&frame, &path).unwrap();

    let loaded = load_image(&path).unwrap();
    assert_eq!(loaded.original_bit_depth, 8);
    assert_eq!(loaded.data.dim(), (4, 6));
    assert_eq!(loaded.data[[0, 0]], 10.0);
    assert_eq!(loaded.data[[1, 2]], 128.0);
    assert_eq!(loaded.data[[3, 5]], 255.0);
}

#[test]
fn test_16bit_png_loads_in_16bit_units() {
    let img: ImageBuffer<Luma<u16>, Vec<u16>> =
        ImageBuffer::from_fn(3, 2, |x, y| Luma([(x + y * 3) as u16 * 10_000]));
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("deep.png");
    img.save(&path).unwrap();

    let loaded = load_image(&path).unwrap();
    assert_eq!(loaded.original_bit_depth, 16);
    assert_eq!(loaded.max_value(), 65535.0);
    assert_eq!(loaded.data[[1, 2]], 50_000.0);
}

#[test]
fn test_open_source_treats_png_as_still() {
    let frame = Frame::new(Array2::from_elem((5, 5), 30.0), 8);
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("still.png");
    save_png(&frame, &path).unwrap();

    let source = open_source(&path).unwrap();
    assert_eq!(source.media_kind(), MediaKind::Image);
    assert_eq!(source.frame_count(), 1);
    assert!(source.frame_rate().is_none());
    assert!(source.read_frame(1).is_err());
}

#[test]
fn test_still_image_source() {
    let frame = Frame::new(Array2::from_elem((2, 3), 9.0), 8);
    let still = StillImage::new(frame, "mem.png");
    assert_eq!(still.dimensions(), (2, 3));
    assert_eq!(still.name(), "mem.png");
    assert_eq!(still.read_frame(0).unwrap().data[[1, 2]], 9.0);
}

#[test]
fn test_frame_to_rgb_scales_16bit() {
    let mut data = Array2::<f32>::zeros((1, 2));
    data[[0, 1]] = 65535.0;
    let img = frame_to_rgb(&Frame::new(data, 16));
    assert_eq!(img.get_pixel(0, 0).0, [0, 0, 0]);
    assert_eq!(img.get_pixel(1, 0).0, [255, 255, 255]);
}
