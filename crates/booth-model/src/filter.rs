//! Named capture filters.
//!
//! A filter is selected per session and baked into each shot at capture
//! time; changing it mid-session never rewrites frames that were
//! already taken. The pixel transforms themselves live in the capture
//! engine — this is only the selector.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Visual effect applied to shots at capture time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterKind {
    None,
    Grayscale,
    Sepia,
    Vintage,
    Soft,
}

impl FilterKind {
    pub const ALL: [FilterKind; 5] = [
        FilterKind::None,
        FilterKind::Grayscale,
        FilterKind::Sepia,
        FilterKind::Vintage,
        FilterKind::Soft,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FilterKind::None => "none",
            FilterKind::Grayscale => "grayscale",
            FilterKind::Sepia => "sepia",
            FilterKind::Vintage => "vintage",
            FilterKind::Soft => "soft",
        }
    }
}

impl Default for FilterKind {
    fn default() -> Self {
        FilterKind::None
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterKind {
    type Err = UnknownFilter;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(FilterKind::None),
            "grayscale" => Ok(FilterKind::Grayscale),
            "sepia" => Ok(FilterKind::Sepia),
            "vintage" => Ok(FilterKind::Vintage),
            "soft" => Ok(FilterKind::Soft),
            other => Err(UnknownFilter(other.to_string())),
        }
    }
}

/// Filter name outside the stock set.
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown filter {0:?}")]
pub struct UnknownFilter(pub String);
