//! The strip compositor.
//!
//! Arranges a session's captured frames into the 1240x1845 print
//! canvas for one of the three booth layouts, over the wallpaper
//! color, with optional sticker overlay and the brand watermark.
//!
//! Composition is pure: the same `(frames, layout, style)` triple
//! always renders byte-identical pixels.

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use picapica_booth_model::{
    CompositionStyle, Frame, Layout, Sticker, STRIP_HEIGHT, STRIP_WIDTH,
};
use picapica_common::BoothResult;

use crate::glyphs;

/// Brand text drawn onto strips.
pub const WATERMARK_TEXT: &str = "Picapica © 2025";

const WATERMARK_COLOR: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Glyph scale for the single-strip watermark (roughly 30px type).
const WATERMARK_SCALE_SINGLE: u32 = 4;

/// Glyph scale for per-sub-strip watermarks (roughly 24px type).
const WATERMARK_SCALE_SUBSTRIP: u32 = 3;

/// Compose the photo strip.
///
/// Every slot's frame is decoded off the async thread first; results
/// are collected keyed by slot index (decode completion order is not
/// meaningful), and a slot whose bytes fail to decode is skipped,
/// leaving wallpaper. Overlays draw only after the full decode set has
/// resolved.
pub async fn compose(
    frames: &[Frame],
    layout: Layout,
    style: &CompositionStyle,
) -> BoothResult<RgbaImage> {
    let mut canvas = RgbaImage::from_pixel(STRIP_WIDTH, STRIP_HEIGHT, style.background);
    let slots = decode_slots(frames, layout).await;

    match layout {
        Layout::ThreeByTwo => draw_three_by_two(&mut canvas, &slots, style),
        Layout::FourByTwo => draw_four_by_two(&mut canvas, &slots),
        Layout::TwoByTwo => draw_two_by_two(&mut canvas, &slots, style),
    }

    Ok(canvas)
}

/// Decode up to `layout.shot_count()` frames concurrently, returning
/// bitmaps in slot order with `None` for failed decodes.
async fn decode_slots(frames: &[Frame], layout: Layout) -> Vec<Option<RgbaImage>> {
    let tasks: Vec<_> = frames
        .iter()
        .take(layout.shot_count())
        .map(|frame| {
            let bytes = frame.png_bytes().to_vec();
            tokio::task::spawn_blocking(move || {
                image::load_from_memory(&bytes).map(|img| img.to_rgba8())
            })
        })
        .collect();

    let mut slots = Vec::with_capacity(tasks.len());
    for (index, joined) in futures::future::join_all(tasks).await.into_iter().enumerate() {
        match joined {
            Ok(Ok(bitmap)) => slots.push(Some(bitmap)),
            Ok(Err(e)) => {
                tracing::warn!(slot = index, error = %e, "frame decode failed; slot left as wallpaper");
                slots.push(None);
            }
            Err(e) => {
                tracing::warn!(slot = index, error = %e, "frame decode task failed; slot left as wallpaper");
                slots.push(None);
            }
        }
    }
    slots
}

/// Scale a bitmap uniformly to fit a slot (never cropping) and draw it
/// centered within the slot.
fn draw_fitted(canvas: &mut RgbaImage, bitmap: &RgbaImage, x: f64, y: f64, w: f64, h: f64) {
    let ratio = (w / bitmap.width() as f64).min(h / bitmap.height() as f64);
    let draw_w = ((bitmap.width() as f64 * ratio).round() as u32).max(1);
    let draw_h = ((bitmap.height() as f64 * ratio).round() as u32).max(1);

    let resized = imageops::resize(bitmap, draw_w, draw_h, FilterType::Triangle);
    let offset_x = x + (w - draw_w as f64) / 2.0;
    let offset_y = y + (h - draw_h as f64) / 2.0;
    imageops::overlay(canvas, &resized, offset_x.round() as i64, offset_y.round() as i64);
}

/// Stretch a sticker over a region, alpha-blending onto the canvas.
fn draw_sticker(canvas: &mut RgbaImage, sticker: &Sticker, x: i64, y: i64, w: u32, h: u32) {
    let scaled = imageops::resize(sticker.image(), w, h, FilterType::Triangle);
    imageops::overlay(canvas, &scaled, x, y);
}

/// Single strip: 2 cols x 3 rows, 30px gaps, 80px watermark band.
fn draw_three_by_two(canvas: &mut RgbaImage, slots: &[Option<RgbaImage>], style: &CompositionStyle) {
    const COLS: usize = 2;
    const GAP: f64 = 30.0;
    const BOTTOM_GAP: f64 = 80.0;

    let strip_w = STRIP_WIDTH as f64;
    let strip_h = STRIP_HEIGHT as f64;
    let frame_w = (strip_w - (COLS as f64 + 1.0) * GAP) / COLS as f64;
    let frame_h = (strip_h - 4.0 * GAP - BOTTOM_GAP) / 3.0;

    for (index, slot) in slots.iter().enumerate() {
        let Some(bitmap) = slot else { continue };
        let col = (index % COLS) as f64;
        let row = (index / COLS) as f64;
        let x = GAP + col * (frame_w + GAP);
        let y = GAP + row * (frame_h + GAP);
        draw_fitted(canvas, bitmap, x, y, frame_w, frame_h);
    }

    // Overlays arrive with the final shot: nothing brands a strip that
    // never filled its last slot.
    let last_slot_present = slots.get(5).is_some_and(Option::is_some);
    if !last_slot_present {
        return;
    }

    if let Some(sticker) = &style.sticker {
        // Sticker covers the photo area but stays out of the
        // watermark band.
        draw_sticker(
            canvas,
            sticker,
            0,
            0,
            STRIP_WIDTH,
            STRIP_HEIGHT - BOTTOM_GAP as u32,
        );
    }

    glyphs::draw_text_centered(
        canvas,
        WATERMARK_TEXT,
        (STRIP_WIDTH / 2) as i64,
        (strip_h - BOTTOM_GAP / 2.0) as i64,
        WATERMARK_SCALE_SINGLE,
        WATERMARK_COLOR,
    );
}

/// Two sub-strips side by side, 4 rows each; the same four captures
/// are printed in both halves (two copies to cut apart), and each half
/// gets its own watermark. No sticker on this layout.
fn draw_four_by_two(canvas: &mut RgbaImage, slots: &[Option<RgbaImage>]) {
    const MIDDLE_GAP: f64 = 20.0;
    const ROWS: usize = 4;
    const SIDE_GAP: f64 = 10.0;
    const TOP_GAP: f64 = 10.0;
    const PHOTO_GAP: f64 = 1.0;
    const LOGO_HEIGHT: f64 = 10.0;

    let strip_h = STRIP_HEIGHT as f64;
    let single_strip_w = (STRIP_WIDTH as f64 - MIDDLE_GAP) / 2.0;
    let photo_stack_h = strip_h - TOP_GAP - LOGO_HEIGHT;
    let frame_w = single_strip_w - 2.0 * SIDE_GAP;
    // The stack is allowed to run 40px hot so the photos print larger;
    // the bottom row clips against the canvas edge.
    let frame_h = ((photo_stack_h + 40.0) - (ROWS as f64 - 1.0) * PHOTO_GAP) / ROWS as f64;

    for strip in 0..2 {
        let strip_offset_x = strip as f64 * (single_strip_w + MIDDLE_GAP);

        for (index, slot) in slots.iter().take(4).enumerate() {
            let Some(bitmap) = slot else { continue };
            let y = TOP_GAP + index as f64 * (frame_h + PHOTO_GAP);
            draw_fitted(canvas, bitmap, strip_offset_x + SIDE_GAP, y, frame_w, frame_h);
        }

        glyphs::draw_text_centered(
            canvas,
            WATERMARK_TEXT,
            (strip_offset_x + single_strip_w / 2.0) as i64,
            (strip_h - LOGO_HEIGHT / 2.0) as i64,
            WATERMARK_SCALE_SUBSTRIP,
            WATERMARK_COLOR,
        );
    }
}

/// 2 cols x 2 rows of fixed 590x732 slots over a blank 120px footer,
/// block centered horizontally. Sticker covers the whole canvas; no
/// watermark text on this layout.
fn draw_two_by_two(canvas: &mut RgbaImage, slots: &[Option<RgbaImage>], style: &CompositionStyle) {
    const COLS: usize = 2;
    const GAP: f64 = 20.0;
    const TOP_GAP: f64 = 60.0;
    const FRAME_W: f64 = 590.0;
    const FRAME_H: f64 = 732.0;

    let block_w = COLS as f64 * FRAME_W + (COLS as f64 - 1.0) * GAP;
    let start_x = (STRIP_WIDTH as f64 - block_w) / 2.0;
    let start_y = TOP_GAP;

    for (index, slot) in slots.iter().take(4).enumerate() {
        let Some(bitmap) = slot else { continue };
        let col = (index % COLS) as f64;
        let row = (index / COLS) as f64;

        let x = start_x + col * (FRAME_W + GAP);
        // The inter-row gap applies once, below the first row only.
        let y = start_y + row * FRAME_H + if row > 0.0 { GAP } else { 0.0 };
        draw_fitted(canvas, bitmap, x, y, FRAME_W, FRAME_H);
    }

    if let Some(sticker) = &style.sticker {
        draw_sticker(canvas, sticker, 0, 0, STRIP_WIDTH, STRIP_HEIGHT);
    }
}
