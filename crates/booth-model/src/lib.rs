//! Picapica booth data model.
//!
//! The types every other crate agrees on: strip layouts and their
//! geometry constants, the per-visit capture session, composition
//! styling, and the record shapes exchanged with the hosted backend.

pub mod filter;
pub mod layout;
pub mod records;
pub mod session;
pub mod style;

pub use filter::FilterKind;
pub use layout::{Layout, STRIP_HEIGHT, STRIP_WIDTH};
pub use records::*;
pub use session::{CaptureSession, Frame, SessionError};
pub use style::{CompositionStyle, Sticker, WALLPAPERS};
