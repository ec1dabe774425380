#![allow(dead_code)]

use ndarray::Array2;
use welltrack_core::detection::{DetectionConfig, ThresholdMethod};
use welltrack_core::frame::Frame;
use welltrack_core::io::ser::SER_HEADER_SIZE;
use welltrack_core::io::source::FrameSequence;

/// Build a SER file header for mono frames.
///
/// Returns a `Vec<u8>` containing just the 178-byte header.
/// Append frame pixel data after calling this function.
pub fn build_ser_header(width: u32, height: u32, bit_depth: u32, num_frames: usize) -> Vec<u8> {
    let mut buf = Vec::with_capacity(SER_HEADER_SIZE);

    // Magic (14 bytes)
    buf.extend_from_slice(b"LUCAM-RECORDER");
    // LuID (4 bytes)
    buf.extend_from_slice(&0i32.to_le_bytes());
    // ColorID = MONO (4 bytes)
    buf.extend_from_slice(&0i32.to_le_bytes());
    // LittleEndian = 0 (little-endian per Siril convention)
    buf.extend_from_slice(&0i32.to_le_bytes());
    buf.extend_from_slice(&(width as i32).to_le_bytes());
    buf.extend_from_slice(&(height as i32).to_le_bytes());
    buf.extend_from_slice(&(bit_depth as i32).to_le_bytes());
    buf.extend_from_slice(&(num_frames as i32).to_le_bytes());
    // Observer, Instrument, Telescope (40 bytes each)
    let mut observer = [0u8; 40];
    observer[..5].copy_from_slice(b"Plate");
    buf.extend_from_slice(&observer);
    buf.extend_from_slice(&[0u8; 40]);
    buf.extend_from_slice(&[0u8; 40]);
    // DateTime, DateTimeUTC (8 bytes each)
    buf.extend_from_slice(&0u64.to_le_bytes());
    buf.extend_from_slice(&0u64.to_le_bytes());

    assert_eq!(buf.len(), SER_HEADER_SIZE);
    buf
}

/// Build a complete mono 8-bit SER file from `f32` frames (values 0-255).
pub fn build_ser_from_frames(frames: &[Frame]) -> Vec<u8> {
    let (h, w) = frames[0].data.dim();
    let mut buf = build_ser_header(w as u32, h as u32, 8, frames.len());
    for frame in frames {
        buf.extend(frame.data.iter().map(|&v| v.round().clamp(0.0, 255.0) as u8));
    }
    buf
}

/// Write bytes to a temporary file that lives as long as the handle.
pub fn write_temp(data: &[u8], suffix: &str) -> tempfile::NamedTempFile {
    use std::io::Write;
    let mut f = tempfile::Builder::new()
        .suffix(suffix)
        .tempfile()
        .expect("create temp file");
    f.write_all(data).expect("write data");
    f.flush().expect("flush");
    f
}

/// A filled disk to paint into a frame.
#[derive(Clone, Copy, Debug)]
pub struct Disk {
    pub cx: usize,
    pub cy: usize,
    pub radius: usize,
    pub value: f32,
}

impl Disk {
    pub fn new(cx: usize, cy: usize, radius: usize, value: f32) -> Self {
        Self {
            cx,
            cy,
            radius,
            value,
        }
    }

    pub fn contains(&self, x: usize, y: usize) -> bool {
        let dx = x as isize - self.cx as isize;
        let dy = y as isize - self.cy as isize;
        let r = self.radius as isize;
        dx * dx + dy * dy <= r * r
    }

    /// Pixel count of the disk when fully inside the frame.
    pub fn area(&self) -> usize {
        let r = self.radius as isize;
        (-r..=r)
            .flat_map(|dy| (-r..=r).map(move |dx| (dx, dy)))
            .filter(|(dx, dy)| dx * dx + dy * dy <= r * r)
            .count()
    }
}

/// 8-bit frame of `background` with the given disks painted on top.
pub fn disk_frame(height: usize, width: usize, background: f32, disks: &[Disk]) -> Frame {
    let data = Array2::from_shape_fn((height, width), |(y, x)| {
        disks
            .iter()
            .filter(|d| d.contains(x, y))
            .map(|d| d.value)
            .fold(background, f32::max)
    });
    Frame::new(data, 8)
}

/// Frames wrapped as an in-memory video.
pub fn video(frames: Vec<Frame>) -> FrameSequence {
    FrameSequence::new(frames, "synthetic.ser")
}

pub fn fixed(threshold: f32, min_area: usize) -> DetectionConfig {
    DetectionConfig {
        threshold_method: ThresholdMethod::Fixed(threshold),
        min_area,
        ..Default::default()
    }
}
