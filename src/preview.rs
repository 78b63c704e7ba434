//! Watermarked gallery previews.
//!
//! Customers only ever see previews: the upload is downscaled, striped with a
//! diagonal watermark and re-encoded as a low-quality JPEG. Originals stay in
//! the private originals directory.

use image::{codecs::jpeg::JpegEncoder, imageops::FilterType, RgbImage};
use std::path::Path;
use thiserror::Error;

/// Longest edge of a preview, in pixels.
pub const PREVIEW_MAX_EDGE: u32 = 1200;
pub const PREVIEW_QUALITY: u8 = 60;

/// Diagonal stripe layout: one band `STRIPE_WIDTH` px wide every `STRIPE_PERIOD` px.
const STRIPE_PERIOD: u32 = 48;
const STRIPE_WIDTH: u32 = 8;
/// How far a watermarked pixel is pulled towards white.
const MARK_STRENGTH: f32 = 0.5;

#[derive(Debug, Error)]
pub enum PreviewError {
    #[error("Not a readable image: {0}")]
    Image(#[from] image::ImageError),
}

/// Decode an upload and produce the JPEG bytes of its preview.
pub fn render_preview(bytes: &[u8]) -> Result<Vec<u8>, PreviewError> {
    let img = image::load_from_memory(bytes)?;
    let img = if img.width() > PREVIEW_MAX_EDGE || img.height() > PREVIEW_MAX_EDGE {
        img.resize(PREVIEW_MAX_EDGE, PREVIEW_MAX_EDGE, FilterType::Lanczos3)
    } else {
        img
    };

    let mut rgb = img.to_rgb8();
    watermark(&mut rgb);

    let mut out = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut out, PREVIEW_QUALITY);
    encoder.encode_image(&rgb)?;
    Ok(out)
}

/// Lighten 45° bands across the whole image.
pub fn watermark(img: &mut RgbImage) {
    for (x, y, pixel) in img.enumerate_pixels_mut() {
        if (x + y) % STRIPE_PERIOD < STRIPE_WIDTH {
            for channel in pixel.0.iter_mut() {
                let c = *channel as f32;
                *channel = (c + (255.0 - c) * MARK_STRENGTH).round() as u8;
            }
        }
    }
}

/// Preview file name for an upload: same stem, `.jpg` extension.
pub fn preview_name(original_name: &str) -> String {
    let stem = Path::new(original_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("photo");
    format!("{}.jpg", stem)
}

/// Run `render_preview` off the async workers.
pub async fn render_preview_blocking(bytes: Vec<u8>) -> std::io::Result<Result<Vec<u8>, PreviewError>> {
    tokio::task::spawn_blocking(move || render_preview(&bytes))
        .await
        .map_err(std::io::Error::other)
}
