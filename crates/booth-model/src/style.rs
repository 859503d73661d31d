//! Composition styling: background wallpaper and sticker overlay.
//!
//! Style is independent of the capture session and only affects
//! rendering; every mutation re-triggers composition downstream.

use image::{Rgba, RgbaImage};

/// Stock wallpaper palette offered by the booth, as `(name, hex)`.
pub const WALLPAPERS: [(&str, &str); 10] = [
    ("white", "#ffffff"),
    ("pink", "#ffd6d9"),
    ("mint", "#d6ffe8"),
    ("lavender", "#f0d6ff"),
    ("peach", "#fff0d6"),
    ("sky-blue", "#d6f0ff"),
    ("yellow", "#fff6d6"),
    ("lilac", "#e6d6ff"),
    ("aqua", "#d6fff6"),
    ("rose", "#ffd6ff"),
];

/// Parse a `#rrggbb` color into an opaque pixel.
pub fn parse_hex(hex: &str) -> Option<Rgba<u8>> {
    let hex = hex.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(Rgba([r, g, b, 255]))
}

/// Format a pixel as `#rrggbb` (alpha ignored).
pub fn to_hex(color: Rgba<u8>) -> String {
    format!("#{:02x}{:02x}{:02x}", color[0], color[1], color[2])
}

/// Decorative overlay image drawn atop the composited strip.
#[derive(Debug, Clone)]
pub struct Sticker {
    name: String,
    image: RgbaImage,
}

impl Sticker {
    pub fn new(name: impl Into<String>, image: RgbaImage) -> Self {
        Self {
            name: name.into(),
            image,
        }
    }

    /// Decode a sticker from encoded image bytes (PNG or similar).
    pub fn from_bytes(name: impl Into<String>, bytes: &[u8]) -> Result<Self, image::ImageError> {
        let image = image::load_from_memory(bytes)?.to_rgba8();
        Ok(Self::new(name, image))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }
}

/// Mutable rendering style for the preview surface.
#[derive(Debug, Clone)]
pub struct CompositionStyle {
    /// Wallpaper color behind and between the photo slots.
    pub background: Rgba<u8>,

    /// Optional sticker overlay.
    pub sticker: Option<Sticker>,
}

impl Default for CompositionStyle {
    fn default() -> Self {
        Self {
            background: Rgba([255, 255, 255, 255]),
            sticker: None,
        }
    }
}

impl CompositionStyle {
    pub fn with_background(background: Rgba<u8>) -> Self {
        Self {
            background,
            ..Self::default()
        }
    }

    /// Background as `#rrggbb`, the form the backend stores.
    pub fn background_hex(&self) -> String {
        to_hex(self.background)
    }

    pub fn sticker_name(&self) -> Option<&str> {
        self.sticker.as_ref().map(|s| s.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_parsing_round_trips() {
        for (_, hex) in WALLPAPERS {
            let color = parse_hex(hex).unwrap();
            assert_eq!(to_hex(color), hex);
        }
    }

    #[test]
    fn bad_hex_is_rejected() {
        assert!(parse_hex("ffd6d9").is_none());
        assert!(parse_hex("#ffd6").is_none());
        assert!(parse_hex("#zzzzzz").is_none());
    }

    #[test]
    fn default_style_is_plain_white() {
        let style = CompositionStyle::default();
        assert_eq!(style.background_hex(), "#ffffff");
        assert!(style.sticker.is_none());
    }
}
