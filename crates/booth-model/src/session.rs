//! The per-visit capture session.

use std::io::Cursor;

use image::RgbaImage;

use crate::filter::FilterKind;
use crate::layout::Layout;

/// One captured shot: an immutable PNG-encoded bitmap with its pixel
/// dimensions.
///
/// Frames stay encoded so the compositor can decode them on demand
/// without consuming them — the session keeps every frame live for
/// re-composition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    png: Vec<u8>,
    width: u32,
    height: u32,
}

impl Frame {
    /// Wrap already-encoded PNG bytes.
    pub fn from_png(png: Vec<u8>, width: u32, height: u32) -> Self {
        Self { png, width, height }
    }

    /// Encode a bitmap into a frame.
    pub fn from_image(image: &RgbaImage) -> Result<Self, image::ImageError> {
        let mut png = Vec::new();
        image.write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)?;
        Ok(Self {
            png,
            width: image.width(),
            height: image.height(),
        })
    }

    /// Decode back into a bitmap.
    pub fn decode(&self) -> Result<RgbaImage, image::ImageError> {
        Ok(image::load_from_memory(&self.png)?.to_rgba8())
    }

    pub fn png_bytes(&self) -> &[u8] {
        &self.png
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }
}

/// Errors from session mutation.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("session already holds all {count} frames for layout {layout}")]
    FramesFull { layout: Layout, count: usize },
}

/// Ephemeral state for one booth visit.
///
/// Created when the booth mounts or the layout changes; discarded on
/// navigation away. Frames are append-only and never exceed the
/// layout's shot count.
#[derive(Debug, Clone, Default)]
pub struct CaptureSession {
    layout: Layout,
    frames: Vec<Frame>,
    filter: FilterKind,
    capturing: bool,
}

impl CaptureSession {
    pub fn new(layout: Layout) -> Self {
        Self {
            layout,
            frames: Vec::with_capacity(layout.shot_count()),
            filter: FilterKind::None,
            capturing: false,
        }
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// Switch layout. Changing to a different layout discards every
    /// captured frame — downstream geometry would no longer match.
    pub fn set_layout(&mut self, layout: Layout) {
        if layout != self.layout {
            self.layout = layout;
            self.frames.clear();
        }
    }

    pub fn filter(&self) -> FilterKind {
        self.filter
    }

    /// Select the filter for shots taken from now on. Frames already
    /// captured keep whatever filter was baked into them.
    pub fn set_filter(&mut self, filter: FilterKind) {
        self.filter = filter;
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn shot_count(&self) -> usize {
        self.layout.shot_count()
    }

    pub fn is_complete(&self) -> bool {
        self.frames.len() >= self.layout.shot_count()
    }

    /// Append a captured frame, preserving capture order.
    pub fn push_frame(&mut self, frame: Frame) -> Result<usize, SessionError> {
        if self.frames.len() >= self.layout.shot_count() {
            return Err(SessionError::FramesFull {
                layout: self.layout,
                count: self.layout.shot_count(),
            });
        }
        self.frames.push(frame);
        Ok(self.frames.len() - 1)
    }

    /// Discard all frames for a fresh run with the same layout.
    pub fn reset(&mut self) {
        self.frames.clear();
    }

    pub fn is_capturing(&self) -> bool {
        self.capturing
    }

    /// Claim the capture guard. Returns false if a countdown sequence
    /// is already running — at most one runs per session.
    pub fn begin_capturing(&mut self) -> bool {
        if self.capturing {
            return false;
        }
        self.capturing = true;
        true
    }

    /// Release the capture guard.
    pub fn finish_capturing(&mut self) {
        self.capturing = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid_frame(width: u32, height: u32) -> Frame {
        let img = RgbaImage::from_pixel(width, height, image::Rgba([10, 20, 30, 255]));
        Frame::from_image(&img).unwrap()
    }

    #[test]
    fn frame_round_trips_through_png() {
        let frame = solid_frame(8, 6);
        assert_eq!(frame.width(), 8);
        assert_eq!(frame.height(), 6);

        let decoded = frame.decode().unwrap();
        assert_eq!(decoded.dimensions(), (8, 6));
        assert_eq!(decoded.get_pixel(3, 3), &image::Rgba([10, 20, 30, 255]));
    }

    #[test]
    fn push_respects_shot_count() {
        let mut session = CaptureSession::new(Layout::TwoByTwo);
        for _ in 0..4 {
            session.push_frame(solid_frame(4, 4)).unwrap();
        }
        assert!(session.is_complete());
        assert!(matches!(
            session.push_frame(solid_frame(4, 4)),
            Err(SessionError::FramesFull { count: 4, .. })
        ));
    }

    #[test]
    fn layout_change_discards_frames() {
        let mut session = CaptureSession::new(Layout::ThreeByTwo);
        session.push_frame(solid_frame(4, 4)).unwrap();
        session.push_frame(solid_frame(4, 4)).unwrap();

        session.set_layout(Layout::TwoByTwo);
        assert!(session.frames().is_empty());

        // Re-selecting the current layout keeps frames.
        session.push_frame(solid_frame(4, 4)).unwrap();
        session.set_layout(Layout::TwoByTwo);
        assert_eq!(session.frames().len(), 1);
    }

    #[test]
    fn capture_guard_is_exclusive() {
        let mut session = CaptureSession::new(Layout::ThreeByTwo);
        assert!(session.begin_capturing());
        assert!(!session.begin_capturing());

        session.finish_capturing();
        assert!(session.begin_capturing());
    }

    #[test]
    fn filter_changes_do_not_touch_existing_frames() {
        let mut session = CaptureSession::new(Layout::ThreeByTwo);
        let frame = solid_frame(4, 4);
        let original_bytes = frame.png_bytes().to_vec();
        session.push_frame(frame).unwrap();

        session.set_filter(FilterKind::Sepia);
        assert_eq!(session.frames()[0].png_bytes(), &original_bytes[..]);
        assert_eq!(session.filter(), FilterKind::Sepia);
    }
}
