//! Capture-time pixel filters.
//!
//! Each named filter expands to a chain of the standard color
//! functions (grayscale, sepia, saturate, hue-rotate, brightness,
//! contrast, gaussian blur). The chain is baked into the shot during
//! capture; already-captured frames are never rewritten.

use image::RgbaImage;
use picapica_booth_model::FilterKind;

/// Apply `filter` to `image` in place.
pub fn apply(filter: FilterKind, image: &mut RgbaImage) {
    match filter {
        FilterKind::None => {}
        FilterKind::Grayscale => {
            grayscale(image, 1.0);
        }
        FilterKind::Sepia => {
            sepia(image, 1.0);
        }
        FilterKind::Vintage => {
            grayscale(image, 1.0);
            contrast(image, 1.2);
            brightness(image, 1.1);
            sepia(image, 0.3);
            hue_rotate(image, 10.0);
            blur(image, 0.4);
        }
        FilterKind::Soft => {
            brightness(image, 1.3);
            contrast(image, 1.05);
            saturate(image, 0.8);
            blur(image, 0.3);
        }
    }
}

/// Multiply each channel through a 3x3 color matrix plus per-channel
/// offset (offset in 0..=255 units). Alpha passes through.
fn color_matrix(image: &mut RgbaImage, m: [f32; 9], offset: f32) {
    for pixel in image.pixels_mut() {
        let [r, g, b, a] = pixel.0;
        let (rf, gf, bf) = (r as f32, g as f32, b as f32);
        let nr = m[0] * rf + m[1] * gf + m[2] * bf + offset;
        let ng = m[3] * rf + m[4] * gf + m[5] * bf + offset;
        let nb = m[6] * rf + m[7] * gf + m[8] * bf + offset;
        pixel.0 = [clamp_u8(nr), clamp_u8(ng), clamp_u8(nb), a];
    }
}

fn clamp_u8(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

/// Desaturate toward luma by `amount` in [0, 1].
fn grayscale(image: &mut RgbaImage, amount: f32) {
    let s = 1.0 - amount.clamp(0.0, 1.0);
    color_matrix(
        image,
        [
            0.2126 + 0.7874 * s,
            0.7152 - 0.7152 * s,
            0.0722 - 0.0722 * s,
            0.2126 - 0.2126 * s,
            0.7152 + 0.2848 * s,
            0.0722 - 0.0722 * s,
            0.2126 - 0.2126 * s,
            0.7152 - 0.7152 * s,
            0.0722 + 0.9278 * s,
        ],
        0.0,
    );
}

/// Shift toward sepia tones by `amount` in [0, 1].
fn sepia(image: &mut RgbaImage, amount: f32) {
    let s = 1.0 - amount.clamp(0.0, 1.0);
    color_matrix(
        image,
        [
            0.393 + 0.607 * s,
            0.769 - 0.769 * s,
            0.189 - 0.189 * s,
            0.349 - 0.349 * s,
            0.686 + 0.314 * s,
            0.168 - 0.168 * s,
            0.272 - 0.272 * s,
            0.534 - 0.534 * s,
            0.131 + 0.869 * s,
        ],
        0.0,
    );
}

/// Scale saturation by `amount` (1.0 = unchanged).
fn saturate(image: &mut RgbaImage, amount: f32) {
    let p = amount.max(0.0);
    color_matrix(
        image,
        [
            0.213 + 0.787 * p,
            0.715 - 0.715 * p,
            0.072 - 0.072 * p,
            0.213 - 0.213 * p,
            0.715 + 0.285 * p,
            0.072 - 0.072 * p,
            0.213 - 0.213 * p,
            0.715 - 0.715 * p,
            0.072 + 0.928 * p,
        ],
        0.0,
    );
}

/// Rotate hues by `degrees`.
fn hue_rotate(image: &mut RgbaImage, degrees: f32) {
    let rad = degrees.to_radians();
    let (sin, cos) = rad.sin_cos();
    color_matrix(
        image,
        [
            0.213 + cos * 0.787 - sin * 0.213,
            0.715 - cos * 0.715 - sin * 0.715,
            0.072 - cos * 0.072 + sin * 0.928,
            0.213 - cos * 0.213 + sin * 0.143,
            0.715 + cos * 0.285 + sin * 0.140,
            0.072 - cos * 0.072 - sin * 0.283,
            0.213 - cos * 0.213 - sin * 0.787,
            0.715 - cos * 0.715 + sin * 0.715,
            0.072 + cos * 0.928 + sin * 0.072,
        ],
        0.0,
    );
}

/// Multiply brightness by `amount` (1.0 = unchanged).
fn brightness(image: &mut RgbaImage, amount: f32) {
    let p = amount.max(0.0);
    color_matrix(image, [p, 0.0, 0.0, 0.0, p, 0.0, 0.0, 0.0, p], 0.0);
}

/// Scale contrast around mid-gray by `amount` (1.0 = unchanged).
fn contrast(image: &mut RgbaImage, amount: f32) {
    let p = amount.max(0.0);
    let offset = (0.5 - 0.5 * p) * 255.0;
    color_matrix(image, [p, 0.0, 0.0, 0.0, p, 0.0, 0.0, 0.0, p], offset);
}

/// Gaussian blur with the given sigma.
fn blur(image: &mut RgbaImage, sigma: f32) {
    *image = image::imageops::blur(image, sigma);
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn sample() -> RgbaImage {
        RgbaImage::from_fn(8, 8, |x, y| Rgba([(x * 30) as u8, (y * 30) as u8, 200, 255]))
    }

    #[test]
    fn none_is_identity() {
        let mut img = sample();
        let before = img.clone();
        apply(FilterKind::None, &mut img);
        assert_eq!(img, before);
    }

    #[test]
    fn grayscale_equalizes_channels() {
        let mut img = sample();
        apply(FilterKind::Grayscale, &mut img);
        for pixel in img.pixels() {
            let [r, g, b, a] = pixel.0;
            assert_eq!(r, g);
            assert_eq!(g, b);
            assert_eq!(a, 255);
        }
    }

    #[test]
    fn sepia_warms_white() {
        let mut img = RgbaImage::from_pixel(2, 2, Rgba([255, 255, 255, 255]));
        apply(FilterKind::Sepia, &mut img);
        let [r, g, b, _] = img.get_pixel(0, 0).0;
        // Full sepia of white: warm tone with red > green > blue.
        assert!(r > g && g > b, "expected warm ramp, got {r},{g},{b}");
        assert_eq!(r, 255);
    }

    #[test]
    fn soft_filter_brightens() {
        let mut img = RgbaImage::from_pixel(4, 4, Rgba([100, 100, 100, 255]));
        let before = img.get_pixel(2, 2).0[0];
        apply(FilterKind::Soft, &mut img);
        assert!(img.get_pixel(2, 2).0[0] > before);
    }

    #[test]
    fn vintage_stays_in_range_and_desaturates() {
        let mut img = sample();
        apply(FilterKind::Vintage, &mut img);
        for pixel in img.pixels() {
            let [r, g, b, _] = pixel.0;
            let spread = r.max(g).max(b) - r.min(g).min(b);
            // Grayscale-then-light-sepia keeps channels close together.
            assert!(spread < 90, "channel spread {spread} too wide");
        }
    }
}
