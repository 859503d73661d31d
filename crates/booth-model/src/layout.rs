//! Strip layouts and their fixed geometry.
//!
//! The layout tag is threaded explicitly through capture and
//! composition; both sides derive all geometry from it rather than
//! from ambient UI state.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Output strip width in pixels (~4.13" at 300 dpi).
pub const STRIP_WIDTH: u32 = 1240;

/// Output strip height in pixels (~6.15" at 300 dpi).
pub const STRIP_HEIGHT: u32 = 1845;

/// Grid arrangement of a photo strip.
///
/// Fixes the shot count, the per-shot capture dimensions, and the
/// composition geometry downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Layout {
    /// Single strip, 2 columns x 3 rows of square shots.
    #[serde(rename = "3x2")]
    ThreeByTwo,

    /// Two side-by-side sub-strips, 4 landscape shots each (the same
    /// 4 captures printed twice, to cut apart).
    #[serde(rename = "4x2")]
    FourByTwo,

    /// 2 columns x 2 rows of portrait shots over a blank footer.
    #[serde(rename = "2x2")]
    TwoByTwo,
}

impl Layout {
    pub const ALL: [Layout; 3] = [Layout::ThreeByTwo, Layout::FourByTwo, Layout::TwoByTwo];

    /// Number of photos captured for this layout.
    pub fn shot_count(&self) -> usize {
        match self {
            Layout::ThreeByTwo => 6,
            Layout::FourByTwo | Layout::TwoByTwo => 4,
        }
    }

    /// Pixel dimensions of a single captured shot.
    pub fn capture_size(&self) -> (u32, u32) {
        match self {
            Layout::ThreeByTwo => (600, 600),
            Layout::FourByTwo => (900, 600),
            Layout::TwoByTwo => (590, 832),
        }
    }

    /// Wire name used by the backend and the CLI.
    pub fn as_str(&self) -> &'static str {
        match self {
            Layout::ThreeByTwo => "3x2",
            Layout::FourByTwo => "4x2",
            Layout::TwoByTwo => "2x2",
        }
    }
}

impl Default for Layout {
    fn default() -> Self {
        Layout::ThreeByTwo
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Layout {
    type Err = UnknownLayout;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "3x2" => Ok(Layout::ThreeByTwo),
            "4x2" => Ok(Layout::FourByTwo),
            "2x2" => Ok(Layout::TwoByTwo),
            other => Err(UnknownLayout(other.to_string())),
        }
    }
}

/// Layout name that is not one of `3x2`, `4x2`, `2x2`.
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown layout {0:?} (expected 3x2, 4x2, or 2x2)")]
pub struct UnknownLayout(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shot_counts() {
        assert_eq!(Layout::ThreeByTwo.shot_count(), 6);
        assert_eq!(Layout::FourByTwo.shot_count(), 4);
        assert_eq!(Layout::TwoByTwo.shot_count(), 4);
    }

    #[test]
    fn wire_names_round_trip() {
        for layout in Layout::ALL {
            assert_eq!(layout.as_str().parse::<Layout>().unwrap(), layout);

            let json = serde_json::to_string(&layout).unwrap();
            assert_eq!(json, format!("\"{}\"", layout.as_str()));
            assert_eq!(serde_json::from_str::<Layout>(&json).unwrap(), layout);
        }
    }

    #[test]
    fn unknown_layout_is_rejected() {
        assert!("5x5".parse::<Layout>().is_err());
    }
}
