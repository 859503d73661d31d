//! Picapica Common Utilities
//!
//! Shared infrastructure for all Picapica crates:
//! - Error types and result aliases
//! - Clock and debounce utilities for booth timing
//! - Tracing/logging initialization
//! - Configuration loading

pub mod clock;
pub mod config;
pub mod error;
pub mod logging;

pub use clock::*;
pub use config::*;
pub use error::*;
