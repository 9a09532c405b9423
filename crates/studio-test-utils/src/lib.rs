//! Testing utilities for the Creative Studio workspace
//!
//! Shared fixtures: fixed clocks, scripted collaborators and throwaway studio
//! directories.

#![allow(missing_docs)]

use chrono::{DateTime, TimeZone, Utc};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use studio_pipeline::{
    placeholder_png, CaptionGenerator, CollaboratorError, Collaborators, ColorExtractor,
    ImageGenerator, LogoTextExtractor, StudioConfig,
};
use studio_store::{BrandPalette, FixedClock, Rgb};
use tempfile::TempDir;

pub const TEST_SLOGAN: &str = "Hear more";

pub fn test_palette() -> BrandPalette {
    BrandPalette::new(Rgb(0x1e, 0x90, 0xff), Rgb(0xff, 0xd7, 0x00))
}

pub fn timestamp(hour: u32, minute: u32, second: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 14, hour, minute, second)
        .unwrap()
}

pub fn fixed_clock() -> FixedClock {
    FixedClock(timestamp(9, 30, 5))
}

/// Counts calls across clones
#[derive(Debug, Clone, Default)]
pub struct CallCounter(Arc<AtomicUsize>);

impl CallCounter {
    pub fn hit(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }

    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

/// Image generator returning a valid PNG
#[derive(Debug, Clone, Default)]
pub struct StubImages {
    pub calls: CallCounter,
}

impl ImageGenerator for StubImages {
    fn generate(&self, _prompt: &str) -> Result<Vec<u8>, CollaboratorError> {
        self.calls.hit();
        placeholder_png().map_err(|e| CollaboratorError::Transport(e.to_string()))
    }
}

/// Caption generator numbering its captions
#[derive(Debug, Clone, Default)]
pub struct StubCaptions {
    pub calls: CallCounter,
}

impl CaptionGenerator for StubCaptions {
    fn generate(
        &self,
        product: &str,
        audience: &str,
        _tone: &str,
    ) -> Result<String, CollaboratorError> {
        self.calls.hit();
        Ok(format!(
            "{product} for {audience} #{} 🎧",
            self.calls.count()
        ))
    }
}

#[derive(Debug, Clone, Default)]
pub struct StubLogoText {
    pub calls: CallCounter,
}

impl LogoTextExtractor for StubLogoText {
    fn extract(&self, _logo: &Path) -> Result<String, CollaboratorError> {
        self.calls.hit();
        Ok(TEST_SLOGAN.to_string())
    }
}

#[derive(Debug, Clone, Default)]
pub struct StubColors {
    pub calls: CallCounter,
}

impl ColorExtractor for StubColors {
    fn extract(&self, _logo: &Path, count: usize) -> Result<Vec<Rgb>, CollaboratorError> {
        self.calls.hit();
        let palette = test_palette();
        Ok([palette.primary, palette.secondary]
            .into_iter()
            .take(count)
            .collect())
    }
}

/// Capability failing on every call
#[derive(Debug, Clone, Default)]
pub struct Failing {
    pub calls: CallCounter,
}

impl Failing {
    fn fail(&self) -> CollaboratorError {
        self.calls.hit();
        CollaboratorError::Timeout
    }
}

impl ImageGenerator for Failing {
    fn generate(&self, _prompt: &str) -> Result<Vec<u8>, CollaboratorError> {
        Err(self.fail())
    }
}

impl CaptionGenerator for Failing {
    fn generate(&self, _: &str, _: &str, _: &str) -> Result<String, CollaboratorError> {
        Err(self.fail())
    }
}

impl LogoTextExtractor for Failing {
    fn extract(&self, _logo: &Path) -> Result<String, CollaboratorError> {
        Err(self.fail())
    }
}

impl ColorExtractor for Failing {
    fn extract(&self, _logo: &Path, _count: usize) -> Result<Vec<Rgb>, CollaboratorError> {
        Err(self.fail())
    }
}

/// Working stubs plus handles to their call counters
#[derive(Debug, Clone, Default)]
pub struct StubSet {
    pub images: StubImages,
    pub captions: StubCaptions,
    pub logo_text: StubLogoText,
    pub colors: StubColors,
}

impl StubSet {
    pub fn collaborators(&self) -> Collaborators {
        Collaborators::new(
            Box::new(self.images.clone()),
            Box::new(self.captions.clone()),
            Box::new(self.logo_text.clone()),
            Box::new(self.colors.clone()),
        )
    }
}

pub fn failing_collaborators() -> (Collaborators, Failing) {
    let failing = Failing::default();
    let collaborators = Collaborators::new(
        Box::new(failing.clone()),
        Box::new(failing.clone()),
        Box::new(failing.clone()),
        Box::new(failing.clone()),
    );
    (collaborators, failing)
}

/// Temporary studio directory with an offline configuration rooted in it
pub struct TestStudio {
    pub dir: TempDir,
    pub config: StudioConfig,
}

impl TestStudio {
    pub fn new(creatives: u32) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let mut config = StudioConfig::default()
            .offline()
            .with_runs_root(dir.path().join("generated_runs"))
            .with_creatives(creatives);
        config.paths.history_file = dir.path().join("run_history.json");
        config.assets.logo = dir.path().join("logo.png");
        Self { dir, config }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }
}
