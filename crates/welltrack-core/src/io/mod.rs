pub mod image_io;
pub mod ser;
pub mod ser_writer;
pub mod source;

pub use source::{open_source, FrameSource, FrameSequence, StillImage};
