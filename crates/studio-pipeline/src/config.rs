//! Studio configuration
//!
//! Loaded from a TOML file; every section and field is optional and falls
//! back to its default.
//!
//! ```toml
//! [paths]
//! runs_root = "generated_runs"
//! history_file = "run_history.json"
//!
//! [assets]
//! logo = "uploads/logo.png"
//!
//! [brief]
//! product = "Wireless Earbuds"
//! style = "Luxury"
//!
//! [batch]
//! creatives = 12
//! seed = 42
//!
//! [image_service]
//! enabled = true
//! base_url = "https://image.pollinations.ai"
//! ```

use crate::collaborators::{Collaborators, ConfiguredLogoText, ConfiguredPalette, Disabled};
use crate::error::ConfigError;
use crate::http::{OllamaCaptionGenerator, PollinationsImageGenerator};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use studio_rank::RankingConfig;
use studio_store::{BrandPalette, RunBrief, ScoringConfig, DEFAULT_HISTORY_FILE, DEFAULT_RUNS_ROOT};

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StudioConfig {
    /// Output locations
    pub paths: PathsConfig,
    /// Input assets
    pub assets: AssetsConfig,
    /// Campaign brief
    pub brief: RunBrief,
    /// Batch size and seed
    pub batch: BatchConfig,
    /// Placeholder score bounds
    pub scoring: ScoringConfig,
    /// Ranking model parameters
    pub ranking: RankingConfig,
    /// Text-to-image service
    pub image_service: ImageServiceConfig,
    /// Caption service
    pub caption_service: CaptionServiceConfig,
    /// Static brand values used instead of logo extraction
    pub brand: BrandConfig,
}

impl StudioConfig {
    /// Default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Read and validate a TOML file
    ///
    /// # Errors
    /// [`ConfigError::Io`], [`ConfigError::Parse`], or a validation error.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        tracing::debug!(config = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Check values that parse but cannot drive a batch
    ///
    /// # Errors
    /// [`ConfigError::Invalid`] or [`ConfigError::Ranking`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.batch.creatives == 0 {
            return Err(ConfigError::Invalid(
                "batch.creatives must be at least 1".to_string(),
            ));
        }
        if self.image_service.enabled && self.image_service.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "image_service.base_url is empty".to_string(),
            ));
        }
        if self.caption_service.enabled && self.caption_service.model.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "caption_service.model is empty".to_string(),
            ));
        }
        self.ranking.validate()?;
        Ok(())
    }

    /// With creative count
    #[inline]
    #[must_use]
    pub fn with_creatives(mut self, creatives: u32) -> Self {
        self.batch.creatives = creatives;
        self
    }

    /// With run seed
    #[inline]
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.batch.seed = seed;
        self
    }

    /// With runs root
    #[inline]
    #[must_use]
    pub fn with_runs_root(mut self, runs_root: impl Into<PathBuf>) -> Self {
        self.paths.runs_root = runs_root.into();
        self
    }

    /// With both remote services switched off
    #[inline]
    #[must_use]
    pub fn offline(mut self) -> Self {
        self.image_service.enabled = false;
        self.caption_service.enabled = false;
        self
    }

    /// Collaborators described by this configuration
    ///
    /// Disabled services are replaced by [`Disabled`], so their fallbacks
    /// apply. Logo text and palette come from `[brand]` when set.
    #[must_use]
    pub fn collaborators(&self) -> Collaborators {
        let images: Box<dyn crate::ImageGenerator> = if self.image_service.enabled {
            Box::new(PollinationsImageGenerator::new(
                self.image_service.base_url.clone(),
                Duration::from_secs(self.image_service.timeout_secs),
            ))
        } else {
            Box::new(Disabled)
        };
        let captions: Box<dyn crate::CaptionGenerator> = if self.caption_service.enabled {
            Box::new(OllamaCaptionGenerator::new(
                self.caption_service.base_url.clone(),
                self.caption_service.model.clone(),
                Duration::from_secs(self.caption_service.timeout_secs),
            ))
        } else {
            Box::new(Disabled)
        };
        Collaborators::new(
            images,
            captions,
            Box::new(ConfiguredLogoText(self.brand.slogan.clone())),
            Box::new(ConfiguredPalette(self.brand.palette)),
        )
    }
}

/// `[paths]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Directory holding one subdirectory per run
    pub runs_root: PathBuf,
    /// Cross-run history ledger
    pub history_file: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            runs_root: PathBuf::from(DEFAULT_RUNS_ROOT),
            history_file: PathBuf::from(DEFAULT_HISTORY_FILE),
        }
    }
}

/// `[assets]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetsConfig {
    /// Logo read for slogan and brand colours
    pub logo: PathBuf,
    /// Product photo pasted onto every ad
    pub product_image: PathBuf,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            logo: PathBuf::from("uploads/logo.png"),
            product_image: PathBuf::from("uploads/product.png"),
        }
    }
}

/// `[batch]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Creatives per run
    pub creatives: u32,
    /// Run seed for scoring and ranking
    pub seed: u64,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            creatives: 12,
            seed: 42,
        }
    }
}

/// `[image_service]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageServiceConfig {
    /// Call the service at all
    pub enabled: bool,
    /// Service root
    pub base_url: String,
    /// Per-request timeout
    pub timeout_secs: u64,
}

impl Default for ImageServiceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: "https://image.pollinations.ai".to_string(),
            timeout_secs: 30,
        }
    }
}

/// `[caption_service]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptionServiceConfig {
    /// Call the service at all
    pub enabled: bool,
    /// Service root
    pub base_url: String,
    /// Chat model name
    pub model: String,
    /// Per-request timeout
    pub timeout_secs: u64,
}

impl Default for CaptionServiceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: "http://localhost:11434".to_string(),
            model: "llama3.2".to_string(),
            timeout_secs: 60,
        }
    }
}

/// `[brand]`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BrandConfig {
    /// Slogan to use instead of reading the logo
    pub slogan: Option<String>,
    /// Palette to use instead of sampling the logo
    pub palette: Option<BrandPalette>,
}
