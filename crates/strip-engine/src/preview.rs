//! The preview/export surface.
//!
//! Holds the composed canvas for a finished session and re-runs the
//! compositor when styling changes, debounced so a burst of wallpaper
//! or sticker toggles collapses into one recomposition. Export reads
//! the live canvas bytes exactly as they are.

use std::io::Cursor;
use std::time::Duration;

use image::{Rgba, RgbaImage};
use picapica_booth_model::{CompositionStyle, Frame, Layout, Sticker};
use picapica_common::clock::Debouncer;
use picapica_common::{BoothError, BoothResult};

use crate::compositor::compose;

/// Fixed name for downloaded strips.
pub const DOWNLOAD_FILE_NAME: &str = "photostrip.png";

/// Live preview of a composed strip with mutable styling.
pub struct PreviewSurface {
    frames: Vec<Frame>,
    layout: Layout,
    style: CompositionStyle,
    canvas: Option<RgbaImage>,
    debounce: Debouncer,
    recompositions: u64,
}

impl PreviewSurface {
    /// Create a surface for a finished session's frames. Call
    /// [`render`](Self::render) once to produce the initial canvas.
    pub fn new(frames: Vec<Frame>, layout: Layout, debounce_window: Duration) -> Self {
        Self {
            frames,
            layout,
            style: CompositionStyle::default(),
            canvas: None,
            debounce: Debouncer::new(debounce_window),
            recompositions: 0,
        }
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    pub fn style(&self) -> &CompositionStyle {
        &self.style
    }

    pub fn canvas(&self) -> Option<&RgbaImage> {
        self.canvas.as_ref()
    }

    /// How many times the compositor has run for this surface.
    pub fn recompositions(&self) -> u64 {
        self.recompositions
    }

    /// Compose immediately, bypassing the debounce window (initial
    /// render on mount). A surface with no frames is a no-op.
    pub async fn render(&mut self) -> BoothResult<()> {
        if self.frames.is_empty() {
            tracing::debug!("no frames to compose; preview left empty");
            return Ok(());
        }
        self.render_inner().await
    }

    /// Change the wallpaper color; recomposition happens after the
    /// quiet window via [`poll`](Self::poll).
    pub fn set_background(&mut self, color: Rgba<u8>, now: Duration) {
        self.style.background = color;
        self.debounce.poke(now);
    }

    /// Change or clear the sticker; debounced like the wallpaper.
    pub fn set_sticker(&mut self, sticker: Option<Sticker>, now: Duration) {
        self.style.sticker = sticker;
        self.debounce.poke(now);
    }

    /// Time until the pending recomposition is due, if one is pending.
    pub fn pending_in(&self, now: Duration) -> Option<Duration> {
        self.debounce.remaining(now)
    }

    /// Recompose if the debounce window has elapsed. Returns whether a
    /// recomposition ran.
    pub async fn poll(&mut self, now: Duration) -> BoothResult<bool> {
        if !self.debounce.fire(now) {
            return Ok(false);
        }
        if self.frames.is_empty() {
            return Ok(false);
        }
        self.render_inner().await?;
        Ok(true)
    }

    async fn render_inner(&mut self) -> BoothResult<()> {
        self.canvas = Some(compose(&self.frames, self.layout, &self.style).await?);
        self.recompositions += 1;
        tracing::debug!(
            background = %self.style.background_hex(),
            sticker = ?self.style.sticker_name(),
            "preview recomposed"
        );
        Ok(())
    }

    /// Encode the live canvas as PNG — exactly what the canvas holds
    /// at call time, no further transformation.
    pub fn export_png(&self) -> BoothResult<Vec<u8>> {
        let canvas = self
            .canvas
            .as_ref()
            .ok_or_else(|| BoothError::export("nothing composed yet"))?;
        let mut bytes = Vec::new();
        canvas.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)?;
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use picapica_booth_model::style::parse_hex;

    fn frames_for(layout: Layout) -> Vec<Frame> {
        let (w, h) = layout.capture_size();
        (0..layout.shot_count())
            .map(|_| {
                Frame::from_image(&RgbaImage::from_pixel(w, h, Rgba([0, 180, 0, 255]))).unwrap()
            })
            .collect()
    }

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[tokio::test]
    async fn style_storm_collapses_into_one_recomposition() {
        let mut preview = PreviewSurface::new(frames_for(Layout::TwoByTwo), Layout::TwoByTwo, ms(1000));
        preview.render().await.unwrap();
        assert_eq!(preview.recompositions(), 1);

        preview.set_background(parse_hex("#ffd6d9").unwrap(), ms(0));
        preview.set_background(parse_hex("#d6ffe8").unwrap(), ms(200));
        preview.set_sticker(None, ms(400));

        // Still inside the quiet window.
        assert!(!preview.poll(ms(1300)).await.unwrap());
        assert_eq!(preview.recompositions(), 1);

        // Window elapsed: exactly one recomposition.
        assert!(preview.poll(ms(1400)).await.unwrap());
        assert_eq!(preview.recompositions(), 2);
        assert!(!preview.poll(ms(5000)).await.unwrap());
        assert_eq!(preview.recompositions(), 2);

        // The last style in the storm won.
        let canvas = preview.canvas().unwrap();
        assert_eq!(canvas.get_pixel(5, 5), &parse_hex("#d6ffe8").unwrap());
    }

    #[tokio::test]
    async fn export_matches_canvas_exactly() {
        let mut preview =
            PreviewSurface::new(frames_for(Layout::ThreeByTwo), Layout::ThreeByTwo, ms(1000));
        preview.render().await.unwrap();

        let bytes = preview.export_png().unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap().to_rgba8();
        assert_eq!(decoded.as_raw(), preview.canvas().unwrap().as_raw());
    }

    #[tokio::test]
    async fn export_before_render_is_an_error() {
        let preview = PreviewSurface::new(frames_for(Layout::TwoByTwo), Layout::TwoByTwo, ms(1000));
        assert!(preview.export_png().is_err());
    }

    #[tokio::test]
    async fn empty_surface_never_composes() {
        let mut preview = PreviewSurface::new(Vec::new(), Layout::ThreeByTwo, ms(100));
        preview.render().await.unwrap();
        assert!(preview.canvas().is_none());

        preview.set_background(Rgba([0, 0, 0, 255]), ms(0));
        assert!(!preview.poll(ms(500)).await.unwrap());
        assert_eq!(preview.recompositions(), 0);
    }
}
