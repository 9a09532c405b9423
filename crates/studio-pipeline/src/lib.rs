//! Studio Pipeline
//!
//! Turns a configuration and a set of collaborator capabilities into a
//! stored, ranked and archived run.
//!
//! # Core Concepts
//!
//! - [`Collaborators`]: image, caption, logo-text and colour capabilities,
//!   each with a documented fallback
//! - [`StudioConfig`]: TOML configuration
//! - [`Compositor`]: product and logo overlays on every stored ad
//! - [`BatchRunner`]: sequential batch orchestration
//!
//! # Example
//!
//! ```rust,ignore
//! use studio_pipeline::{BatchRunner, StudioConfig};
//! use studio_store::SystemClock;
//!
//! let config = StudioConfig::load("studio.toml")?;
//! let outcome = BatchRunner::new(&config).run(&config.collaborators(), &SystemClock)?;
//! println!("archive: {}", outcome.archive_path.display());
//! ```

#![warn(unreachable_pub)]

mod batch;
mod collaborators;
mod compose;
mod config;
mod error;
mod http;
mod placeholder;
mod prompt;

pub use batch::{BatchOutcome, BatchRunner};
pub use collaborators::{
    CaptionGenerator, Collaborators, ColorExtractor, ConfiguredLogoText, ConfiguredPalette,
    Disabled, ImageGenerator, LogoTextExtractor, FALLBACK_CAPTION, FALLBACK_PALETTE,
    FALLBACK_SLOGAN, UNDETECTED_SLOGAN,
};
pub use compose::{Compositor, LOGO_SIZE, PRODUCT_SIZE};
pub use config::{
    AssetsConfig, BatchConfig, BrandConfig, CaptionServiceConfig, ImageServiceConfig, PathsConfig,
    StudioConfig,
};
pub use error::{CollaboratorError, ConfigError, PipelineError, PipelineResult};
pub use http::{OllamaCaptionGenerator, PollinationsImageGenerator};
pub use placeholder::{
    blank_png, encode_png, is_png, looks_like_image, placeholder_image, placeholder_png,
    PLACEHOLDER_SIZE,
};
pub use prompt::{ad_prompt, caption_prompt, CAPTION_SYSTEM_PROMPT};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
