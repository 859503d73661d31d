//! The frame capturer: one video frame in, one layout-sized shot out.
//!
//! A shot is produced by cropping the live frame to the layout's
//! aspect, resampling into the layout's capture size, mirroring
//! horizontally (so the print matches the selfie preview), and baking
//! in the active filter.

use image::imageops::{self, FilterType};
use picapica_booth_model::{FilterKind, Frame, Layout};
use picapica_common::BoothResult;

use crate::filter;
use crate::source::{FrameSource, VideoFrame};

/// Crop rectangle in source-frame pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Compute the centered crop for `layout` within a `video_width` x
/// `video_height` frame.
///
/// Policy per layout:
/// - `ThreeByTwo`: largest centered square.
/// - `FourByTwo`: full width, height = width * 2/3, vertically centered.
/// - `TwoByTwo`: largest centered 590:832 region.
///
/// When the derived height overflows the frame, the crop is re-derived
/// from the limiting dimension instead.
pub fn crop_rect_for(layout: Layout, video_width: u32, video_height: u32) -> CropRect {
    let vw = video_width as f64;
    let vh = video_height as f64;

    let (cw, ch) = match layout {
        Layout::ThreeByTwo => {
            let size = vw.min(vh);
            (size, size)
        }
        Layout::FourByTwo => {
            let mut cw = vw;
            let mut ch = vw * 2.0 / 3.0;
            if ch > vh {
                ch = vh;
                cw = vh * 3.0 / 2.0;
            }
            (cw, ch)
        }
        Layout::TwoByTwo => {
            let target_ratio = 590.0 / 832.0;
            let mut cw = vw;
            let mut ch = vw / target_ratio;
            if ch > vh {
                ch = vh;
                cw = vh * target_ratio;
            }
            (cw, ch)
        }
    };

    let width = (cw.round() as u32).clamp(1, video_width);
    let height = (ch.round() as u32).clamp(1, video_height);
    CropRect {
        x: (video_width - width) / 2,
        y: (video_height - height) / 2,
        width,
        height,
    }
}

/// Produce a shot from one live frame.
pub fn capture_frame(
    frame: &VideoFrame,
    layout: Layout,
    filter_kind: FilterKind,
) -> BoothResult<Frame> {
    let (target_w, target_h) = layout.capture_size();
    let rect = crop_rect_for(layout, frame.width(), frame.height());

    let cropped =
        imageops::crop_imm(frame.image(), rect.x, rect.y, rect.width, rect.height).to_image();
    let resized = imageops::resize(&cropped, target_w, target_h, FilterType::Triangle);
    let mut mirrored = imageops::flip_horizontal(&resized);
    filter::apply(filter_kind, &mut mirrored);

    Ok(Frame::from_image(&mirrored)?)
}

/// Capture from a source, treating "no video" as a silent no-op.
///
/// Returns `None` when the source has no frame or the shot could not
/// be produced; the countdown sequence keeps running either way.
pub fn capture_from_source(
    source: &mut dyn FrameSource,
    layout: Layout,
    filter_kind: FilterKind,
) -> Option<Frame> {
    let frame = source.current_frame()?;
    if frame.width() == 0 || frame.height() == 0 {
        tracing::warn!("video frame has no pixels; shot skipped");
        return None;
    }
    match capture_frame(&frame, layout, filter_kind) {
        Ok(shot) => Some(shot),
        Err(e) => {
            tracing::warn!(error = %e, "shot capture failed; slot left empty");
            None
        }
    }
}
