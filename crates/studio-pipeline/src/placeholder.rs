//! Blank placeholder image
//!
//! Stored in place of an ad image whenever the image generator fails:
//! a black 1024x1024 8-bit RGB PNG.

use image::{DynamicImage, ImageFormat, ImageResult, RgbImage};
use std::io::Cursor;

/// Placeholder width and height in pixels
pub const PLACEHOLDER_SIZE: u32 = 1024;

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'];

/// Black placeholder canvas
#[must_use]
pub fn placeholder_image() -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::new(PLACEHOLDER_SIZE, PLACEHOLDER_SIZE))
}

/// Encode the default placeholder
///
/// # Errors
/// Propagates PNG encoder failures.
pub fn placeholder_png() -> ImageResult<Vec<u8>> {
    encode_png(&placeholder_image())
}

/// Encode an all-black RGB PNG of the given size
///
/// # Errors
/// Propagates PNG encoder failures.
pub fn blank_png(width: u32, height: u32) -> ImageResult<Vec<u8>> {
    encode_png(&DynamicImage::ImageRgb8(RgbImage::new(width, height)))
}

/// Encode any image as PNG
///
/// # Errors
/// Propagates PNG encoder failures.
pub fn encode_png(image: &DynamicImage) -> ImageResult<Vec<u8>> {
    let mut out = Cursor::new(Vec::new());
    image.write_to(&mut out, ImageFormat::Png)?;
    Ok(out.into_inner())
}

/// Check for a PNG or JPEG signature
#[must_use]
pub fn looks_like_image(bytes: &[u8]) -> bool {
    bytes.starts_with(&PNG_SIGNATURE) || bytes.starts_with(&[0xff, 0xd8, 0xff])
}

/// Check for a PNG signature
#[must_use]
pub fn is_png(bytes: &[u8]) -> bool {
    bytes.starts_with(&PNG_SIGNATURE)
}
