//! Picapica Capture Engine
//!
//! Everything between the live video stream and the session's frame
//! list: frame sources, the per-layout frame capturer, capture-time
//! filters, and the countdown sequencer that paces a multi-shot run.

pub mod capturer;
pub mod filter;
pub mod sequencer;
pub mod source;

pub use capturer::{capture_frame, capture_from_source, crop_rect_for, CropRect};
pub use sequencer::{
    run_capture_sequence, BoothEvent, Phase, SequenceTiming, Sequencer, Step,
};
pub use source::{FrameSource, NullSource, StillSource, TestPatternSource, VideoFrame};
