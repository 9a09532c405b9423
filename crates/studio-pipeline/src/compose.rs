//! Brand overlay compositing
//!
//! Every stored ad is the generated image with the product photo (650x650
//! at 187,200) and the logo (230x230 at 390,20) pasted on top, alpha-blended,
//! and re-encoded as PNG. Assets are loaded and resized once per run. A
//! missing asset only drops its own overlay; undecodable generator output is
//! replaced by the black placeholder.

use crate::error::{PipelineError, PipelineResult};
use crate::placeholder::{encode_png, placeholder_image};
use image::imageops::{self, FilterType};
use image::{DynamicImage, RgbaImage};
use std::path::Path;

/// Product overlay edge length
pub const PRODUCT_SIZE: u32 = 650;

/// Logo overlay edge length
pub const LOGO_SIZE: u32 = 230;

const PRODUCT_AT: (i64, i64) = (187, 200);
const LOGO_AT: (i64, i64) = (390, 20);

/// Pastes the brand assets onto generated images
#[derive(Debug, Clone, Default)]
pub struct Compositor {
    product: Option<RgbaImage>,
    logo: Option<RgbaImage>,
}

impl Compositor {
    /// Compositor without overlays; images are only normalised to PNG
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load and resize the logo and product photo
    ///
    /// An asset that cannot be read is logged and skipped.
    #[must_use]
    pub fn load(logo: &Path, product: &Path) -> Self {
        Self::with_overlays(load_asset(product, "product"), load_asset(logo, "logo"))
    }

    /// Compositor over already-decoded assets
    #[must_use]
    pub fn with_overlays(product: Option<DynamicImage>, logo: Option<DynamicImage>) -> Self {
        let fit = |image: DynamicImage, size: u32| {
            image
                .resize_exact(size, size, FilterType::CatmullRom)
                .to_rgba8()
        };
        Self {
            product: product.map(|image| fit(image, PRODUCT_SIZE)),
            logo: logo.map(|image| fit(image, LOGO_SIZE)),
        }
    }

    /// Number of overlays that will be pasted
    #[must_use]
    pub fn overlays(&self) -> usize {
        usize::from(self.product.is_some()) + usize::from(self.logo.is_some())
    }

    /// Composite `generated` and encode the result as PNG
    ///
    /// # Errors
    /// [`PipelineError::Image`] if the PNG encoder fails.
    pub fn compose(&self, generated: &[u8]) -> PipelineResult<Vec<u8>> {
        let base = match image::load_from_memory(generated) {
            Ok(image) => image,
            Err(e) => {
                tracing::warn!(error = %e, "generated image does not decode; using placeholder");
                placeholder_image()
            }
        };

        let mut canvas = base.to_rgba8();
        if let Some(product) = &self.product {
            imageops::overlay(&mut canvas, product, PRODUCT_AT.0, PRODUCT_AT.1);
        }
        if let Some(logo) = &self.logo {
            imageops::overlay(&mut canvas, logo, LOGO_AT.0, LOGO_AT.1);
        }

        let flattened = DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(canvas).to_rgb8());
        encode_png(&flattened).map_err(PipelineError::Image)
    }
}

fn load_asset(path: &Path, role: &str) -> Option<DynamicImage> {
    match image::open(path) {
        Ok(image) => Some(image),
        Err(e) => {
            tracing::warn!(asset = role, path = %path.display(), error = %e, "brand asset unavailable; skipping overlay");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::placeholder::is_png;
    use image::{GenericImageView, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
    use std::io::Cursor;

    fn solid(width: u32, height: u32, colour: [u8; 3]) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb(colour)))
    }

    fn encoded(image: &DynamicImage, format: ImageFormat) -> Vec<u8> {
        let mut out = Cursor::new(Vec::new());
        image.write_to(&mut out, format).unwrap();
        out.into_inner()
    }

    #[test]
    fn overlays_land_at_fixed_positions() {
        let compositor = Compositor::with_overlays(
            Some(solid(10, 10, [0, 0, 255])),
            Some(solid(4, 4, [0, 255, 0])),
        );
        assert_eq!(compositor.overlays(), 2);

        let generated = encoded(&solid(1024, 1024, [255, 0, 0]), ImageFormat::Png);
        let out = image::load_from_memory(&compositor.compose(&generated).unwrap()).unwrap();

        assert_eq!(out.dimensions(), (1024, 1024));
        assert_eq!(out.get_pixel(5, 5).0, [255, 0, 0, 255]);
        assert_eq!(out.get_pixel(200, 400).0, [0, 0, 255, 255]);
        assert_eq!(out.get_pixel(400, 30).0, [0, 255, 0, 255]);
        // Logo is pasted over the product where they overlap
        assert_eq!(out.get_pixel(500, 220).0, [0, 255, 0, 255]);
        assert_eq!(out.get_pixel(900, 900).0, [255, 0, 0, 255]);
    }

    #[test]
    fn transparent_overlay_pixels_keep_the_base() {
        let clear = DynamicImage::ImageRgba8(RgbaImage::from_pixel(8, 8, Rgba([0, 0, 255, 0])));
        let compositor = Compositor::with_overlays(Some(clear), None);
        let generated = encoded(&solid(1024, 1024, [255, 0, 0]), ImageFormat::Png);

        let out = image::load_from_memory(&compositor.compose(&generated).unwrap()).unwrap();
        assert_eq!(out.get_pixel(300, 400).0, [255, 0, 0, 255]);
    }

    #[test]
    fn jpeg_output_is_stored_as_png() {
        let jpeg = encoded(&solid(64, 64, [200, 200, 200]), ImageFormat::Jpeg);
        assert!(!is_png(&jpeg));

        let out = Compositor::new().compose(&jpeg).unwrap();
        assert!(is_png(&out));
        assert_eq!(image::load_from_memory(&out).unwrap().dimensions(), (64, 64));
    }

    #[test]
    fn undecodable_output_becomes_placeholder() {
        let out = Compositor::new()
            .compose(&[0xff, 0xd8, 0xff, 0x00, 0x01])
            .unwrap();
        let decoded = image::load_from_memory(&out).unwrap();
        assert_eq!(decoded.dimensions(), (1024, 1024));
        assert_eq!(decoded.get_pixel(10, 10).0, [0, 0, 0, 255]);
    }

    #[test]
    fn missing_assets_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let logo = dir.path().join("logo.png");
        std::fs::write(&logo, encoded(&solid(2, 2, [0, 255, 0]), ImageFormat::Png)).unwrap();

        let compositor = Compositor::load(&logo, &dir.path().join("absent.png"));
        assert_eq!(compositor.overlays(), 1);
    }
}
