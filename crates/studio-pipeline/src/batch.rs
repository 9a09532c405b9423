//! Batch orchestration
//!
//! One [`BatchRunner::run`] call produces one run:
//!
//! 1. create the run directory
//! 2. read slogan and palette from the logo and load the brand overlays, once
//! 3. for each slot, sequentially: image, overlays, caption, record
//! 4. rank the scores and write `ranking_report.txt`
//! 5. append the run summary to the history ledger
//! 6. pack `final_creatives.tar.gz`
//!
//! Collaborator failures are absorbed by fallbacks. Any storage failure ends
//! the batch with an error and no archive.

use crate::collaborators::Collaborators;
use crate::compose::Compositor;
use crate::config::StudioConfig;
use crate::error::PipelineResult;
use crate::prompt::ad_prompt;
use std::path::PathBuf;
use studio_rank::{rank, Ranking};
use studio_store::{
    scores_of, ArchiveBuilder, ArtifactKind, Clock, CreativeRecord, HistoryLedger, RankingReport,
    RecordBuilder, RunContext, RunId, RunMeta, RunStore, RunSummary, SeededScorer,
};

/// Everything a finished batch produced
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    /// Run identifier
    pub run_id: RunId,
    /// Run directory
    pub run_root: PathBuf,
    /// Records in index order
    pub records: Vec<CreativeRecord>,
    /// Ranking over `records`, best first
    pub ranking: Ranking,
    /// `ranking_report.txt`
    pub report_path: PathBuf,
    /// `final_creatives.tar.gz`
    pub archive_path: PathBuf,
    /// Entry appended to the history ledger
    pub summary: RunSummary,
}

impl BatchOutcome {
    /// Best-ranked record
    #[must_use]
    pub fn best(&self) -> Option<&CreativeRecord> {
        self.ranking.best().and_then(|i| self.records.get(i))
    }
}

/// Runs batches against a configuration
#[derive(Debug, Clone, Copy)]
pub struct BatchRunner<'a> {
    config: &'a StudioConfig,
    archive: ArchiveBuilder,
}

impl<'a> BatchRunner<'a> {
    /// Runner for `config`
    #[must_use]
    pub fn new(config: &'a StudioConfig) -> Self {
        Self {
            config,
            archive: ArchiveBuilder::new(),
        }
    }

    /// With archive builder
    #[must_use]
    pub fn with_archive(mut self, archive: ArchiveBuilder) -> Self {
        self.archive = archive;
        self
    }

    /// Produce one complete run
    ///
    /// # Errors
    /// [`PipelineError::Config`](crate::PipelineError::Config) before anything
    /// is written, [`PipelineError::Store`](crate::PipelineError::Store) for
    /// any storage failure.
    pub fn run(
        &self,
        collaborators: &Collaborators,
        clock: &dyn Clock,
    ) -> PipelineResult<BatchOutcome> {
        let config = self.config;
        config.validate()?;

        let store = RunStore::new(&config.paths.runs_root);
        let run = store.create_run(clock)?;
        let span = tracing::info_span!("batch", run_id = %run.id());
        let _entered = span.enter();
        tracing::info!(
            creatives = config.batch.creatives,
            seed = config.batch.seed,
            root = %run.root().display(),
            "starting batch"
        );

        let logo = &config.assets.logo;
        let context = RunContext::new(
            run,
            config.brief.clone(),
            collaborators.slogan(logo),
            collaborators.palette(logo),
            config.batch.seed,
        );
        let prompt = ad_prompt(context.brief(), context.palette(), context.slogan());
        let compositor = Compositor::load(logo, &config.assets.product_image);
        tracing::debug!(overlays = compositor.overlays(), "brand overlays loaded");

        let mut scorer = SeededScorer::new(config.scoring, context.seed());
        let mut builder = RecordBuilder::new(&context);
        let mut records = Vec::with_capacity(config.batch.creatives as usize);
        for index in 1..=config.batch.creatives {
            let image = compositor.compose(&collaborators.image_or_placeholder(&prompt)?)?;
            let image_path = context.run().write_artifact(ArtifactKind::Ad, index, image)?;
            let caption = collaborators.caption_or_fallback(context.brief());
            records.push(builder.build_record(index, &image_path, &caption, &mut scorer)?);
        }

        let ranking = rank(
            &scores_of(&records),
            &config.ranking.with_seed(context.seed()),
        );
        tracing::info!(mode = %ranking.mode(), "ranked creatives");

        let report = RankingReport::new(&records, &ranking)?;
        let report_path = context.run().write_ranking_report(&report)?;

        let ledger = HistoryLedger::open(&config.paths.history_file);
        let summary = ledger.append(
            context.run().id(),
            context.run().root(),
            RunMeta::from_records(&context, &records),
            clock,
        )?;

        let archive_path = self.archive.build(context.run(), &records, &ranking)?;
        tracing::info!(archive = %archive_path.display(), "batch complete");

        Ok(BatchOutcome {
            run_id: context.run().id().clone(),
            run_root: context.run().root().to_path_buf(),
            records,
            ranking,
            report_path,
            archive_path,
            summary,
        })
    }
}
