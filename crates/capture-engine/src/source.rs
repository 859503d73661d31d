//! Frame sources: where live video frames come from.
//!
//! The booth only ever reads the current frame; sources are previewed
//! and captured from, never mutated. A source with no stream attached
//! reports `None` and capture becomes a no-op.

use std::path::Path;

use image::{Rgba, RgbaImage};
use picapica_common::{BoothError, BoothResult};

/// One frame of live video at its native resolution.
#[derive(Debug, Clone)]
pub struct VideoFrame {
    image: RgbaImage,
}

impl VideoFrame {
    pub fn new(image: RgbaImage) -> Self {
        Self { image }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }
}

/// Supplier of live video frames.
pub trait FrameSource: Send {
    /// The current frame, or `None` if no stream is producing.
    fn current_frame(&mut self) -> Option<VideoFrame>;
}

/// A source with no stream attached — what the booth sees when camera
/// acquisition failed. Every read returns `None`.
#[derive(Debug, Default)]
pub struct NullSource;

impl FrameSource for NullSource {
    fn current_frame(&mut self) -> Option<VideoFrame> {
        None
    }
}

/// Deterministic synthetic source for demos and tests.
///
/// Produces a color gradient that shifts on every read, so successive
/// shots in a sequence are distinguishable.
#[derive(Debug)]
pub struct TestPatternSource {
    width: u32,
    height: u32,
    tick: u32,
}

impl TestPatternSource {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            tick: 0,
        }
    }
}

impl FrameSource for TestPatternSource {
    fn current_frame(&mut self) -> Option<VideoFrame> {
        let tick = self.tick;
        self.tick = self.tick.wrapping_add(1);

        let (w, h) = (self.width, self.height);
        let image = RgbaImage::from_fn(w, h, |x, y| {
            let r = ((x * 255) / w.max(1)) as u8;
            let g = ((y * 255) / h.max(1)) as u8;
            let b = (tick.wrapping_mul(40) % 256) as u8;
            Rgba([r, g, b, 255])
        });
        Some(VideoFrame::new(image))
    }
}

/// Source backed by pre-loaded still images, cycled in order.
///
/// Lets the CLI run a full booth sequence from photos on disk instead
/// of camera hardware.
#[derive(Debug, Default)]
pub struct StillSource {
    frames: Vec<RgbaImage>,
    next: usize,
}

impl StillSource {
    pub fn new(frames: Vec<RgbaImage>) -> Self {
        Self { frames, next: 0 }
    }

    /// Load every image file in `paths`, in order.
    pub fn from_paths<P: AsRef<Path>>(paths: &[P]) -> BoothResult<Self> {
        let mut frames = Vec::with_capacity(paths.len());
        for path in paths {
            let path = path.as_ref();
            let image = image::open(path)
                .map_err(|e| {
                    BoothError::capture(format!("failed to load {}: {e}", path.display()))
                })?
                .to_rgba8();
            frames.push(image);
        }
        Ok(Self::new(frames))
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl FrameSource for StillSource {
    fn current_frame(&mut self) -> Option<VideoFrame> {
        if self.frames.is_empty() {
            return None;
        }
        let image = self.frames[self.next % self.frames.len()].clone();
        self.next = self.next.wrapping_add(1);
        Some(VideoFrame::new(image))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_source_never_produces() {
        let mut source = NullSource;
        assert!(source.current_frame().is_none());
    }

    #[test]
    fn test_pattern_frames_differ_between_reads() {
        let mut source = TestPatternSource::new(32, 24);
        let a = source.current_frame().unwrap();
        let b = source.current_frame().unwrap();
        assert_eq!(a.width(), 32);
        assert_eq!(a.height(), 24);
        assert_ne!(a.image().as_raw(), b.image().as_raw());
    }

    #[test]
    fn still_source_cycles() {
        let red = RgbaImage::from_pixel(4, 4, Rgba([255, 0, 0, 255]));
        let blue = RgbaImage::from_pixel(4, 4, Rgba([0, 0, 255, 255]));
        let mut source = StillSource::new(vec![red.clone(), blue]);

        let first = source.current_frame().unwrap();
        let _second = source.current_frame().unwrap();
        let third = source.current_frame().unwrap();
        assert_eq!(first.image().as_raw(), third.image().as_raw());
        assert_eq!(first.image().as_raw(), red.as_raw());
    }

    #[test]
    fn empty_still_source_is_dry() {
        let mut source = StillSource::default();
        assert!(source.current_frame().is_none());
    }
}
