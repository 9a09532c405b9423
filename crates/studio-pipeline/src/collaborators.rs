//! External capabilities and their fallbacks
//!
//! The batch treats generation and extraction as opaque, fallible
//! capabilities. Each is constructed once per process and passed in through
//! [`Collaborators`]. A failing capability is logged and replaced by its
//! documented fallback; it never aborts the batch.
//!
//! | Capability          | Fallback                                    |
//! |---------------------|---------------------------------------------|
//! | image generation    | black 1024x1024 PNG                         |
//! | caption generation  | [`FALLBACK_CAPTION`]                        |
//! | logo text (OCR)     | [`FALLBACK_SLOGAN`], or [`UNDETECTED_SLOGAN`] for empty text |
//! | dominant colours    | [`FALLBACK_PALETTE`]                        |

use crate::error::{CollaboratorError, PipelineError, PipelineResult};
use crate::placeholder::{looks_like_image, placeholder_png};
use std::path::Path;
use studio_store::{BrandPalette, Rgb, RunBrief};

/// Caption used when caption generation fails
pub const FALLBACK_CAPTION: &str = "Caption generation failed.";

/// Slogan used when logo text extraction fails
pub const FALLBACK_SLOGAN: &str = "Creative Studio by AI";

/// Slogan used when the logo carries no readable text
pub const UNDETECTED_SLOGAN: &str = "Slogan not detected";

/// Palette used when colour extraction fails
pub const FALLBACK_PALETTE: BrandPalette = BrandPalette {
    primary: Rgb(128, 0, 128),
    secondary: Rgb(255, 255, 255),
};

/// Text-to-image generation
pub trait ImageGenerator {
    /// Encoded image for `prompt`
    ///
    /// # Errors
    /// Any failure to produce an image.
    fn generate(&self, prompt: &str) -> Result<Vec<u8>, CollaboratorError>;
}

/// Marketing caption generation
pub trait CaptionGenerator {
    /// Caption for the product, audience and tone
    ///
    /// # Errors
    /// Any failure to produce a caption.
    fn generate(&self, product: &str, audience: &str, tone: &str)
        -> Result<String, CollaboratorError>;
}

/// Text extraction from the logo image
pub trait LogoTextExtractor {
    /// All text found on the logo, possibly empty
    ///
    /// # Errors
    /// Any failure to read the image.
    fn extract(&self, logo: &Path) -> Result<String, CollaboratorError>;
}

/// Dominant colour extraction from the logo image
pub trait ColorExtractor {
    /// Up to `count` colours, most dominant first
    ///
    /// # Errors
    /// Any failure to read the image.
    fn extract(&self, logo: &Path, count: usize) -> Result<Vec<Rgb>, CollaboratorError>;
}

/// Capability that always reports [`CollaboratorError::Disabled`]
#[derive(Debug, Clone, Copy, Default)]
pub struct Disabled;

impl ImageGenerator for Disabled {
    fn generate(&self, _prompt: &str) -> Result<Vec<u8>, CollaboratorError> {
        Err(CollaboratorError::Disabled)
    }
}

impl CaptionGenerator for Disabled {
    fn generate(&self, _: &str, _: &str, _: &str) -> Result<String, CollaboratorError> {
        Err(CollaboratorError::Disabled)
    }
}

impl LogoTextExtractor for Disabled {
    fn extract(&self, _logo: &Path) -> Result<String, CollaboratorError> {
        Err(CollaboratorError::Disabled)
    }
}

impl ColorExtractor for Disabled {
    fn extract(&self, _logo: &Path, _count: usize) -> Result<Vec<Rgb>, CollaboratorError> {
        Err(CollaboratorError::Disabled)
    }
}

/// Logo text supplied by configuration instead of OCR
#[derive(Debug, Clone, Default)]
pub struct ConfiguredLogoText(pub Option<String>);

impl LogoTextExtractor for ConfiguredLogoText {
    fn extract(&self, _logo: &Path) -> Result<String, CollaboratorError> {
        self.0.clone().ok_or(CollaboratorError::Disabled)
    }
}

/// Palette supplied by configuration instead of colour quantisation
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfiguredPalette(pub Option<BrandPalette>);

impl ColorExtractor for ConfiguredPalette {
    fn extract(&self, _logo: &Path, count: usize) -> Result<Vec<Rgb>, CollaboratorError> {
        let palette = self.0.ok_or(CollaboratorError::Disabled)?;
        Ok([palette.primary, palette.secondary]
            .into_iter()
            .take(count)
            .collect())
    }
}

/// The capability set handed to a batch
pub struct Collaborators {
    /// Image generation
    pub images: Box<dyn ImageGenerator>,
    /// Caption generation
    pub captions: Box<dyn CaptionGenerator>,
    /// Logo text extraction
    pub logo_text: Box<dyn LogoTextExtractor>,
    /// Logo colour extraction
    pub colors: Box<dyn ColorExtractor>,
}

impl std::fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collaborators").finish_non_exhaustive()
    }
}

impl Collaborators {
    /// Bundle capabilities
    #[must_use]
    pub fn new(
        images: Box<dyn ImageGenerator>,
        captions: Box<dyn CaptionGenerator>,
        logo_text: Box<dyn LogoTextExtractor>,
        colors: Box<dyn ColorExtractor>,
    ) -> Self {
        Self {
            images,
            captions,
            logo_text,
            colors,
        }
    }

    /// Every capability disabled; batches run entirely on fallbacks
    #[must_use]
    pub fn offline() -> Self {
        Self::new(
            Box::new(Disabled),
            Box::new(Disabled),
            Box::new(Disabled),
            Box::new(Disabled),
        )
    }

    /// Generated image, or the blank placeholder
    ///
    /// Responses without a PNG or JPEG signature count as failures.
    ///
    /// # Errors
    /// [`PipelineError::Image`] if the placeholder cannot be encoded.
    pub fn image_or_placeholder(&self, prompt: &str) -> PipelineResult<Vec<u8>> {
        match self.images.generate(prompt) {
            Ok(bytes) if looks_like_image(&bytes) => Ok(bytes),
            Ok(bytes) => {
                tracing::warn!(len = bytes.len(), "image generator returned non-image data; using placeholder");
                placeholder_png().map_err(PipelineError::Image)
            }
            Err(e) => {
                tracing::warn!(error = %e, "image generation failed; using placeholder");
                placeholder_png().map_err(PipelineError::Image)
            }
        }
    }

    /// Generated caption, or [`FALLBACK_CAPTION`]
    #[must_use]
    pub fn caption_or_fallback(&self, brief: &RunBrief) -> String {
        match self
            .captions
            .generate(&brief.product, &brief.audience, &brief.tone)
        {
            Ok(caption) if !caption.trim().is_empty() => caption,
            Ok(_) => {
                tracing::warn!("caption generator returned empty text; using fallback");
                FALLBACK_CAPTION.to_string()
            }
            Err(e) => {
                tracing::warn!(error = %e, "caption generation failed; using fallback");
                FALLBACK_CAPTION.to_string()
            }
        }
    }

    /// Logo slogan, or a documented fallback
    #[must_use]
    pub fn slogan(&self, logo: &Path) -> String {
        match self.logo_text.extract(logo) {
            Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
            Ok(_) => UNDETECTED_SLOGAN.to_string(),
            Err(e) => {
                tracing::warn!(error = %e, logo = %logo.display(), "logo text extraction failed; using fallback");
                FALLBACK_SLOGAN.to_string()
            }
        }
    }

    /// Two dominant brand colours, padded from [`FALLBACK_PALETTE`]
    #[must_use]
    pub fn palette(&self, logo: &Path) -> BrandPalette {
        match self.colors.extract(logo, 2) {
            Ok(colors) => {
                if colors.len() < 2 {
                    tracing::warn!(found = colors.len(), "fewer than two brand colours; padding with fallback");
                }
                BrandPalette::new(
                    colors.first().copied().unwrap_or(FALLBACK_PALETTE.primary),
                    colors.get(1).copied().unwrap_or(FALLBACK_PALETTE.secondary),
                )
            }
            Err(e) => {
                tracing::warn!(error = %e, logo = %logo.display(), "colour extraction failed; using fallback");
                FALLBACK_PALETTE
            }
        }
    }
}
