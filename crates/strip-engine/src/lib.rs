//! Picapica Strip Engine
//!
//! Turns a session's captured frames into the final photo strip:
//! per-layout grid composition, wallpaper fill, sticker overlay,
//! watermark, and the debounced preview/export surface.

pub mod compositor;
pub mod glyphs;
pub mod preview;

pub use compositor::{compose, WATERMARK_TEXT};
pub use preview::{PreviewSurface, DOWNLOAD_FILE_NAME};
