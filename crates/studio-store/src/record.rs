//! Creative record assembly
//!
//! [`RunContext`] carries the values computed once per run (brief, slogan,
//! palette, seed). [`RecordBuilder`] turns one generated image + caption into
//! a stored [`CreativeRecord`], writing the caption and metadata artifacts.

use crate::error::{StoreError, StoreResult};
use crate::run::Run;
use crate::types::{ArtifactKind, BrandPalette, CreativeMetadata, CreativeRecord, RunBrief};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

/// Immutable per-run inputs threaded into every record
#[derive(Debug, Clone, PartialEq)]
pub struct RunContext {
    run: Run,
    brief: RunBrief,
    slogan: String,
    palette: BrandPalette,
    seed: u64,
}

impl RunContext {
    /// Freeze the per-run values
    #[must_use]
    pub fn new(
        run: Run,
        brief: RunBrief,
        slogan: impl Into<String>,
        palette: BrandPalette,
        seed: u64,
    ) -> Self {
        Self {
            run,
            brief,
            slogan: slogan.into(),
            palette,
            seed,
        }
    }

    /// Run being filled
    #[inline]
    #[must_use]
    pub fn run(&self) -> &Run {
        &self.run
    }

    /// Campaign brief
    #[inline]
    #[must_use]
    pub fn brief(&self) -> &RunBrief {
        &self.brief
    }

    /// Slogan extracted from the logo
    #[inline]
    #[must_use]
    pub fn slogan(&self) -> &str {
        &self.slogan
    }

    /// Brand palette extracted from the logo
    #[inline]
    #[must_use]
    pub fn palette(&self) -> BrandPalette {
        self.palette
    }

    /// Run-level seed
    #[inline]
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }
}

/// Supplies engagement scores for new records
pub trait ScoreSource {
    /// Score for the next creative
    fn next_score(&mut self) -> f64;
}

/// Inclusive bounds for placeholder scores
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Lowest score
    pub min: u32,
    /// Highest score
    pub max: u32,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self { min: 70, max: 99 }
    }
}

/// Placeholder scorer: uniform integers in `[min, max]` from a seeded RNG
///
/// Stands in until a calibrated engagement predictor exists. The same seed
/// always yields the same score sequence.
#[derive(Debug, Clone)]
pub struct SeededScorer {
    rng: StdRng,
    min: u32,
    max: u32,
}

impl SeededScorer {
    /// Scorer over `config` bounds; reversed bounds are swapped
    #[must_use]
    pub fn new(config: ScoringConfig, seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            min: config.min.min(config.max),
            max: config.min.max(config.max),
        }
    }
}

impl ScoreSource for SeededScorer {
    fn next_score(&mut self) -> f64 {
        f64::from(self.rng.random_range(self.min..=self.max))
    }
}

/// Builds the records of one run
#[derive(Debug)]
pub struct RecordBuilder<'a> {
    context: &'a RunContext,
    issued: BTreeSet<u32>,
}

impl<'a> RecordBuilder<'a> {
    /// Builder for the run in `context`
    #[inline]
    #[must_use]
    pub fn new(context: &'a RunContext) -> Self {
        Self {
            context,
            issued: BTreeSet::new(),
        }
    }

    /// Store caption and metadata for creative `index` and return its record
    ///
    /// `image_path` must point at an already-stored image. The caption is
    /// written before the metadata, so a metadata document on disk always has
    /// its caption beside it.
    ///
    /// # Errors
    /// [`StoreError::InvalidIndex`] for index 0, [`StoreError::DuplicateIndex`]
    /// for a reused index, [`StoreError::MissingArtifact`] when the image is
    /// absent, and IO or serialization failures.
    pub fn build_record(
        &mut self,
        index: u32,
        image_path: &Path,
        caption: &str,
        scores: &mut dyn ScoreSource,
    ) -> StoreResult<CreativeRecord> {
        if index == 0 {
            return Err(StoreError::InvalidIndex(index));
        }
        if self.issued.contains(&index) {
            return Err(StoreError::DuplicateIndex(index));
        }
        if !image_path.is_file() {
            return Err(StoreError::MissingArtifact {
                path: image_path.to_path_buf(),
            });
        }

        let run = self.context.run();
        let brief = self.context.brief();
        let caption_path = run.write_artifact(ArtifactKind::Caption, index, caption)?;

        let file = image_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| ArtifactKind::Ad.file_name(index));

        let metadata = CreativeMetadata {
            index,
            style: brief.style.clone(),
            tone: brief.tone.clone(),
            audience: brief.audience.clone(),
            slogan: self.context.slogan().to_string(),
            dominant_colors: self.context.palette(),
            engagement_score: scores.next_score(),
            file,
            caption: caption.to_string(),
        };

        let metadata_path = run.artifact_path(ArtifactKind::Metadata, index);
        let json = serde_json::to_vec_pretty(&metadata).map_err(|source| StoreError::Serialize {
            path: metadata_path.clone(),
            source,
        })?;
        run.write_artifact(ArtifactKind::Metadata, index, json)?;

        self.issued.insert(index);
        tracing::info!(
            run_id = %run.id(),
            index,
            score = metadata.engagement_score,
            "stored creative"
        );

        Ok(CreativeRecord {
            index,
            image_path: image_path.to_path_buf(),
            caption_path,
            metadata_path,
            metadata,
        })
    }

    /// Indices issued so far
    #[inline]
    #[must_use]
    pub fn issued(&self) -> usize {
        self.issued.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::run::RunStore;
    use crate::types::{FixedClock, Rgb};
    use chrono::{TimeZone, Utc};

    struct Constant(f64);

    impl ScoreSource for Constant {
        fn next_score(&mut self) -> f64 {
            self.0
        }
    }

    fn context(dir: &Path) -> RunContext {
        let clock = FixedClock(Utc.with_ymd_and_hms(2026, 10, 14, 9, 30, 5).unwrap());
        let run = RunStore::new(dir).create_run(&clock).unwrap();
        RunContext::new(
            run,
            RunBrief::default(),
            "Hear more",
            BrandPalette::new(Rgb(128, 0, 128), Rgb(255, 255, 255)),
            42,
        )
    }

    #[test]
    fn build_record_writes_caption_and_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path());
        let image = ctx.run().write_artifact(ArtifactKind::Ad, 1, b"png").unwrap();

        let mut builder = RecordBuilder::new(&ctx);
        let record = builder
            .build_record(1, &image, "Buy now 🎧", &mut Constant(88.0))
            .unwrap();

        assert_eq!(record.score(), 88.0);
        assert_eq!(record.image_file_name(), "ad_1.png");
        assert_eq!(
            std::fs::read_to_string(&record.caption_path).unwrap(),
            "Buy now 🎧"
        );

        let stored: CreativeMetadata =
            serde_json::from_slice(&std::fs::read(&record.metadata_path).unwrap()).unwrap();
        assert_eq!(stored, record.metadata);
        assert_eq!(stored.slogan, "Hear more");
        assert_eq!(stored.dominant_colors.hex(), ["#800080", "#ffffff"]);
    }

    #[test]
    fn build_record_rejects_bad_indices() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path());
        let image = ctx.run().write_artifact(ArtifactKind::Ad, 1, b"png").unwrap();
        let mut builder = RecordBuilder::new(&ctx);

        assert!(matches!(
            builder.build_record(0, &image, "c", &mut Constant(80.0)),
            Err(StoreError::InvalidIndex(0))
        ));
        builder
            .build_record(1, &image, "c", &mut Constant(80.0))
            .unwrap();
        assert!(matches!(
            builder.build_record(1, &image, "c", &mut Constant(80.0)),
            Err(StoreError::DuplicateIndex(1))
        ));
        assert_eq!(builder.issued(), 1);
    }

    #[test]
    fn build_record_requires_stored_image() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path());
        let mut builder = RecordBuilder::new(&ctx);
        let missing = ctx.run().artifact_path(ArtifactKind::Ad, 2);

        assert!(matches!(
            builder.build_record(2, &missing, "c", &mut Constant(80.0)),
            Err(StoreError::MissingArtifact { .. })
        ));
        assert!(!ctx.run().artifact_path(ArtifactKind::Metadata, 2).exists());
    }

    #[test]
    fn seeded_scorer_is_bounded_and_reproducible() {
        let config = ScoringConfig::default();
        let mut a = SeededScorer::new(config, 7);
        let mut b = SeededScorer::new(config, 7);
        let first: Vec<f64> = (0..50).map(|_| a.next_score()).collect();
        let second: Vec<f64> = (0..50).map(|_| b.next_score()).collect();

        assert_eq!(first, second);
        assert!(first.iter().all(|s| (70.0..=99.0).contains(s)));
        assert!(first.iter().all(|s| s.fract() == 0.0));
    }

    #[test]
    fn seeded_scorer_swaps_reversed_bounds() {
        let mut scorer = SeededScorer::new(ScoringConfig { min: 10, max: 5 }, 1);
        assert!((0..20).all(|_| (5.0..=10.0).contains(&scorer.next_score())));
    }
}
