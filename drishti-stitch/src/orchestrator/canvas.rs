//! Equirectangular canvas normalization.

use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::{ImageResult, RgbImage};

/// Scale strips to the widest strip's width, preserving aspect, and stack
/// them top to bottom in the given order.
pub fn stack_rows(strips: &[RgbImage]) -> RgbImage {
    let width = strips.iter().map(|s| s.width()).max().unwrap_or(0).max(1);

    let scaled: Vec<RgbImage> = strips
        .iter()
        .map(|strip| {
            if strip.width() == width {
                strip.clone()
            } else {
                let scale = width as f64 / strip.width().max(1) as f64;
                let height = ((strip.height() as f64 * scale).round() as u32).max(1);
                imageops::resize(strip, width, height, FilterType::Lanczos3)
            }
        })
        .collect();

    let height = scaled.iter().map(|s| s.height()).sum::<u32>().max(1);
    let mut canvas = RgbImage::new(width, height);
    let mut y = 0i64;
    for strip in &scaled {
        imageops::replace(&mut canvas, strip, 0, y);
        y += strip.height() as i64;
    }
    canvas
}

/// Bounding box `(x, y, width, height)` of pixels brighter than `threshold`
/// in any channel.
pub fn content_bounds(image: &RgbImage, threshold: u8) -> Option<(u32, u32, u32, u32)> {
    let (mut min_x, mut min_y) = (u32::MAX, u32::MAX);
    let (mut max_x, mut max_y) = (0u32, 0u32);
    let mut found = false;

    for (x, y, px) in image.enumerate_pixels() {
        if px.0.iter().any(|&c| c > threshold) {
            found = true;
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
    }

    found.then(|| (min_x, min_y, max_x - min_x + 1, max_y - min_y + 1))
}

/// Crop to non-black content. An all-black image is returned unchanged.
pub fn crop_to_content(image: RgbImage, threshold: u8) -> RgbImage {
    match content_bounds(&image, threshold) {
        Some((x, y, w, h)) if (w, h) != image.dimensions() => {
            imageops::crop_imm(&image, x, y, w, h).to_image()
        }
        _ => image,
    }
}

/// Resize to the exact canvas size.
pub fn fit_canvas(image: &RgbImage, width: u32, height: u32) -> RgbImage {
    if image.dimensions() == (width, height) {
        return image.clone();
    }
    imageops::resize(image, width, height, FilterType::Lanczos3)
}

/// Encode as baseline JPEG.
pub fn encode_jpeg(image: &RgbImage, quality: u8) -> ImageResult<Vec<u8>> {
    let mut bytes = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut bytes, quality.clamp(1, 100));
    encoder.encode_image(image)?;
    Ok(bytes)
}
